//! Response classification.
//!
//! Every body is first normalized into a `serde_json::Value` (JSON as-is, XML through an
//! element walk, anything else wrapped as text) and then checked twice: once against the
//! HTTP status, and once against an embedded `status` field for APIs that report errors
//! inside a 200 response.

use serde_json::{Map, Value, json};

use crate::core::net::TransportResponse;
use crate::core::{ApiError, ErrorKind};

/// Success sentinel of the legacy APIs' `status` field.
const STATUS_OK: &str = "OK";

/// Key under which XML attributes are stored.
pub const XML_ATTRIBUTES: &str = "@attributes";
/// Key holding element text when the element also has children or attributes.
pub const XML_TEXT: &str = "#text";

/// Classify a transport response into a structured body or a typed error.
pub fn classify(response: &TransportResponse) -> Result<Value, ApiError> {
    let body = normalize(response);

    if response.status >= 400 {
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("HTTP {}: {}", response.status, response.body.trim()));
        return Err(ApiError::new(kind_for_status(response.status), message)
            .with_status(response.status)
            .with_response(body));
    }

    if let Some(status) = body.get("status").and_then(Value::as_str)
        && status != STATUS_OK
    {
        return Err(error_for_api_status(status, &body));
    }

    Ok(body)
}

/// Map an HTTP status to an error kind.
pub fn kind_for_status(status: u16) -> ErrorKind {
    match status {
        400 => ErrorKind::InvalidRequest,
        403 => ErrorKind::PermissionDenied,
        404 => ErrorKind::NotFound,
        429 => ErrorKind::QuotaExceeded,
        s if s >= 500 => ErrorKind::InternalServer,
        _ => ErrorKind::Generic,
    }
}

fn error_for_api_status(status: &str, body: &Value) -> ApiError {
    let message = body
        .get("error_message")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| format!("API returned status: {status}"));

    let err = match status {
        "REQUEST_DENIED" => ApiError::new(ErrorKind::PermissionDenied, message),
        "OVER_QUERY_LIMIT" => ApiError::new(ErrorKind::QuotaExceeded, message),
        "NOT_FOUND" => ApiError::new(ErrorKind::NotFound, message),
        "ZERO_RESULTS" => ApiError::new(ErrorKind::NotFound, "No results found"),
        "INVALID_REQUEST" => ApiError::new(ErrorKind::InvalidRequest, message),
        other => ApiError::new(ErrorKind::Generic, format!("{message} ({other})")),
    };
    err.with_response(body.clone())
}

/// Normalize any response body into a structured value.
pub fn normalize(response: &TransportResponse) -> Value {
    let text = response.body.as_str();
    if let Ok(v) = serde_json::from_str::<Value>(text) {
        return v;
    }

    let looks_xml = response
        .content_type()
        .is_some_and(|ct| ct.contains("xml"))
        || text.trim_start().starts_with('<');
    if looks_xml && let Ok(v) = xml_to_value(text) {
        return v;
    }

    json!({
        "status": STATUS_OK,
        "content_type": response.content_type(),
        "text": text,
        "raw": text,
    })
}

/// Convert an XML document into a nested value rooted at the document element.
///
/// Attributes go under [`XML_ATTRIBUTES`], repeated child tags collapse into an array in
/// document order, and a leaf element becomes its trimmed text. Empty elements are `null`.
pub fn xml_to_value(text: &str) -> Result<Value, roxmltree::Error> {
    let doc = roxmltree::Document::parse(text)?;
    Ok(element_to_value(doc.root_element()))
}

fn element_to_value(node: roxmltree::Node<'_, '_>) -> Value {
    let mut out = Map::new();

    let attrs: Map<String, Value> = node
        .attributes()
        .map(|a| (a.name().to_string(), Value::String(a.value().to_string())))
        .collect();
    if !attrs.is_empty() {
        out.insert(XML_ATTRIBUTES.to_string(), Value::Object(attrs));
    }

    let mut has_children = false;
    for child in node.children().filter(roxmltree::Node::is_element) {
        has_children = true;
        let tag = child.tag_name().name().to_string();
        let value = element_to_value(child);
        match out.get_mut(&tag) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                out.insert(tag, value);
            }
        }
    }

    let text = node.text().map(str::trim).filter(|t| !t.is_empty());
    if let Some(text) = text {
        if !has_children && out.is_empty() {
            return Value::String(text.to_string());
        }
        out.insert(XML_TEXT.to_string(), Value::String(text.to_string()));
    }

    if out.is_empty() {
        Value::Null
    } else {
        Value::Object(out)
    }
}

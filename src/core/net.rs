//! HTTP transport seam.
//!
//! The executor only talks to a [`Transport`]; [`ReqwestTransport`] is the default,
//! backed by one pooled `reqwest::Client` shared by every task.

use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::RwLock;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use url::Url;

use crate::core::NetworkFailure;

/// Request body as handed to the transport.
#[derive(Clone, Debug, PartialEq)]
pub enum TransportBody {
    /// Structured payload, serialized as JSON by the transport.
    Json(Value),
    /// Pre-encoded bytes (e.g. a gzip-compressed JSON document).
    Bytes(Vec<u8>),
}

/// One attempt, fully prepared by the executor.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<TransportBody>,
    pub timeout: Duration,
}

impl TransportRequest {
    /// First value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw HTTP outcome of one attempt.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(k), Ok(v)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(k, v);
        }
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

/// Sends prepared requests. Implementations must be safe to share between tasks.
pub trait Transport: Send + Sync + fmt::Debug {
    fn send(&self, request: TransportRequest)
    -> BoxFuture<'_, Result<TransportResponse, NetworkFailure>>;

    /// Release pooled resources. Idempotent; later sends fail with [`NetworkFailure::Closed`].
    fn close(&self);

    fn is_closed(&self) -> bool;
}

/// Default transport over a pooled `reqwest::Client`.
#[derive(Debug)]
pub struct ReqwestTransport {
    http: RwLock<Option<reqwest::Client>>,
}

impl ReqwestTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http: RwLock::new(Some(http)),
        }
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<TransportResponse, NetworkFailure>> {
        // Client is an Arc internally; in-flight sends keep their clone across close().
        let http = self.http.read().clone();
        Box::pin(async move {
            let http = http.ok_or(NetworkFailure::Closed)?;

            let mut req = http
                .request(request.method, request.url)
                .query(&request.query)
                .timeout(request.timeout);
            for (k, v) in &request.headers {
                req = req.header(k.as_str(), v.as_str());
            }
            req = match request.body {
                Some(TransportBody::Json(v)) => req.json(&v),
                Some(TransportBody::Bytes(b)) => req.body(b),
                None => req,
            };

            let resp = req.send().await?;
            get_text(resp).await
        })
    }

    fn close(&self) {
        self.http.write().take();
    }

    fn is_closed(&self) -> bool {
        self.http.read().is_none()
    }
}

/// Read the response status, headers and body as text.
async fn get_text(resp: reqwest::Response) -> Result<TransportResponse, NetworkFailure> {
    let status = resp.status().as_u16();
    let headers = resp.headers().clone();
    let body = resp.text().await?;
    Ok(TransportResponse {
        status,
        headers,
        body,
    })
}

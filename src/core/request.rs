use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::core::client::cache::cache_key;

/// A query parameter value: a single string or a list sent as repeated pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    fn to_value(&self) -> Value {
        match self {
            Self::One(s) => Value::String(s.clone()),
            Self::Many(v) => Value::Array(v.iter().cloned().map(Value::String).collect()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::One(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::One(s)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        Self::Many(v)
    }
}

/// Immutable description of one logical API call.
///
/// Built by the API modules and consumed by a single `execute` call. The correlation id
/// is not part of the request: a fresh one is generated for every attempt.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub params: BTreeMap<String, ParamValue>,
    pub headers: Vec<(String, String)>,
    /// Header names whose values participate in the cache key, like HTTP `Vary`.
    pub vary: Vec<String>,
    pub body: Option<Value>,
    /// Per-call timeout; the client default applies when unset.
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            params: BTreeMap::new(),
            headers: Vec::new(),
            vary: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a header that also distinguishes cached responses.
    pub fn vary_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.vary.push(name.clone());
        self.headers.push((name, value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Parameters flattened into query pairs; list values repeat their key.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.params.len());
        for (k, v) in &self.params {
            match v {
                ParamValue::One(s) => out.push((k.clone(), s.clone())),
                ParamValue::Many(items) => {
                    out.extend(items.iter().map(|s| (k.clone(), s.clone())));
                }
            }
        }
        out
    }

    /// Fingerprint of method, URL, parameters and body. Headers only participate when
    /// added with [`vary_header`](Self::vary_header).
    pub fn cache_key(&self) -> String {
        let mut params: serde_json::Map<String, Value> = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.to_value()))
            .collect();
        for (name, value) in &self.headers {
            if self.vary.iter().any(|v| v.eq_ignore_ascii_case(name)) {
                params.insert(
                    format!("header:{}", name.to_ascii_lowercase()),
                    Value::String(value.clone()),
                );
            }
        }
        cache_key(
            self.method.as_str(),
            self.url.as_str(),
            &Value::Object(params),
            self.body.as_ref(),
        )
    }
}

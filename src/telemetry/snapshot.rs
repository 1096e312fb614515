//! Read-only views of a request/response at interception time.

use axum::http::StatusCode;
use serde_json::Value;

use crate::telemetry::event::{dimensions, CustomDimensions};

/// Rendered when a request carries no query or form values.
pub const NO_VALUES: &str = "(None)";

/// Request metadata captured for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSnapshot {
    method: String,
    url: String,
    values: Vec<(String, String)>,
    body: Option<Value>,
}

impl RequestSnapshot {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            values: Vec::new(),
            body: None,
        }
    }

    /// Sets the query/form pairs. Repeated keys keep their first value.
    pub fn with_values(mut self, pairs: Vec<(String, String)>) -> Self {
        self.values = first_value_per_key(pairs);
        self
    }

    pub fn with_json_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn values(&self) -> &[(String, String)] {
        &self.values
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// `"key: value, "` for every pair, or `"(None)"`.
    pub fn values_summary(&self) -> String {
        if self.values.is_empty() {
            return NO_VALUES.to_string();
        }
        self.values
            .iter()
            .map(|(key, value)| format!("{}: {}, ", key, value))
            .collect()
    }

    pub fn dimensions(&self) -> CustomDimensions {
        let mut dims = CustomDimensions::new();
        dims.insert(dimensions::REQUEST_METHOD, self.method.clone());
        dims.insert(dimensions::REQUEST_URL, self.url.clone());
        dims.insert(dimensions::VALUES, self.values_summary());
        if let Some(body) = &self.body {
            dims.insert(dimensions::BODY, body.to_string());
        }
        dims
    }
}

/// Response metadata captured for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
    status: StatusCode,
    body: String,
}

impl ResponseSnapshot {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decodes the body lossily; invalid UTF-8 never fails capture.
    pub fn from_bytes(status: StatusCode, body: &[u8]) -> Self {
        Self::new(status, String::from_utf8_lossy(body))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn dimensions(&self) -> CustomDimensions {
        let mut dims = CustomDimensions::new();
        dims.insert(dimensions::RESPONSE_STATUS, self.status.to_string());
        dims.insert(dimensions::RESPONSE_BODY, self.body.clone());
        dims
    }
}

/// Parses `bytes` as JSON. Any failure, and a bare `null`, yields `None`.
pub fn try_parse_json(bytes: &[u8]) -> Option<Value> {
    serde_json::from_slice::<Value>(bytes)
        .ok()
        .filter(|value| !value.is_null())
}

/// True for `application/json`, ignoring case and media-type parameters.
pub fn is_json_content_type(content_type: &str) -> bool {
    media_type(content_type).eq_ignore_ascii_case("application/json")
}

pub fn is_form_content_type(content_type: &str) -> bool {
    media_type(content_type).eq_ignore_ascii_case("application/x-www-form-urlencoded")
}

/// Decodes `application/x-www-form-urlencoded` pairs (query strings use the same encoding).
pub fn form_pairs(input: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(input).into_owned().collect()
}

fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}

fn first_value_per_key(pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        if !out.iter().any(|(existing, _)| *existing == key) {
            out.push((key, value));
        }
    }
    out
}

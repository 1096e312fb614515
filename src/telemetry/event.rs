//! Telemetry events and their structured context.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::telemetry::identity::ApplicationIdentity;
use crate::telemetry::snapshot::{RequestSnapshot, ResponseSnapshot};

/// Well-known `customDimensions` keys.
pub mod dimensions {
    pub const APPLICATION_NAME: &str = "ApplicationName";
    pub const ENVIRONMENT: &str = "Environment";
    pub const REQUEST_METHOD: &str = "request_method";
    pub const REQUEST_URL: &str = "request_url";
    pub const VALUES: &str = "values";
    pub const BODY: &str = "body";
    pub const RESPONSE_STATUS: &str = "response_status";
    pub const RESPONSE_BODY: &str = "response_body";
}

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Maps a `tracing` level. DEBUG and TRACE have no counterpart and are not forwarded.
    pub fn from_level(level: &tracing::Level) -> Option<Self> {
        match *level {
            tracing::Level::ERROR => Some(Severity::Error),
            tracing::Level::WARN => Some(Severity::Warning),
            tracing::Level::INFO => Some(Severity::Info),
            _ => None,
        }
    }

    /// Application Insights `severityLevel` value.
    pub fn level_number(self) -> u8 {
        match self {
            Severity::Info => 1,
            Severity::Warning => 2,
            Severity::Error => 3,
        }
    }
}

/// Free-form string context attached to an event.
///
/// Merging is last-writer-wins per key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomDimensions(BTreeMap<String, String>);

impl CustomDimensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlays `other` onto `self`; keys in `other` win.
    pub fn merge(mut self, other: CustomDimensions) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn extend(&mut self, other: CustomDimensions) {
        self.0.extend(other.0);
    }

    /// True when every key/value of `other` is also present here.
    pub fn is_superset_of(&self, other: &CustomDimensions) -> bool {
        other.iter().all(|(k, v)| self.get(k) == Some(v))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CustomDimensions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The unit forwarded to the sink's log stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
    pub custom_dimensions: CustomDimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

impl TelemetryEvent {
    /// Builds an event whose dimensions start from the identity fields.
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        identity: &ApplicationIdentity,
        fields: CustomDimensions,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            message: message.into(),
            custom_dimensions: identity.base_dimensions().merge(fields),
            operation_id: None,
        }
    }

    pub fn with_operation_id(mut self, operation_id: Option<String>) -> Self {
        self.operation_id = operation_id;
        self
    }

    /// Event emitted before a request is handled.
    pub fn before_request(identity: &ApplicationIdentity, request: &RequestSnapshot) -> Self {
        Self::new(
            Severity::Warning,
            format!("request {} {}", request.method(), request.url()),
            identity,
            request.dimensions(),
        )
    }

    /// Event emitted after a response has been produced.
    pub fn after_response(
        identity: &ApplicationIdentity,
        request: &RequestSnapshot,
        response: &ResponseSnapshot,
    ) -> Self {
        Self::new(
            Severity::Warning,
            format!("response: {}", response.status()),
            identity,
            request.dimensions().merge(response.dimensions()),
        )
    }
}

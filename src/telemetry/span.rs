//! Trace-stream records: inbound requests and outbound dependency calls.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::observability::tracing::TraceContext;
use crate::telemetry::event::{CustomDimensions, TelemetryEvent};

/// One inbound request handled by a service.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpan {
    pub trace: TraceContext,
    pub name: String,
    pub url: String,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub response_code: u16,
    pub properties: CustomDimensions,
}

impl RequestSpan {
    /// Server errors count as failures; client errors do not.
    pub fn success(&self) -> bool {
        self.response_code < 500
    }
}

/// One outbound call made by a client.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencySpan {
    pub trace: TraceContext,
    pub name: String,
    pub target: String,
    pub url: String,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    /// `None` when no response was received.
    pub result_code: Option<u16>,
    pub properties: CustomDimensions,
}

impl DependencySpan {
    pub fn success(&self) -> bool {
        matches!(self.result_code, Some(code) if code < 400)
    }
}

/// Anything the client can forward.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryItem {
    Event(TelemetryEvent),
    Request(RequestSpan),
    Dependency(DependencySpan),
}

impl TelemetryItem {
    pub fn kind(&self) -> &'static str {
        match self {
            TelemetryItem::Event(_) => "event",
            TelemetryItem::Request(_) => "request",
            TelemetryItem::Dependency(_) => "dependency",
        }
    }
}

impl From<TelemetryEvent> for TelemetryItem {
    fn from(event: TelemetryEvent) -> Self {
        TelemetryItem::Event(event)
    }
}

impl From<RequestSpan> for TelemetryItem {
    fn from(span: RequestSpan) -> Self {
        TelemetryItem::Request(span)
    }
}

impl From<DependencySpan> for TelemetryItem {
    fn from(span: DependencySpan) -> Self {
        TelemetryItem::Dependency(span)
    }
}

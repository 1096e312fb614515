//! Distributed tracing support.
//!
//! # Responsibilities
//! - Extract trace context from incoming requests
//! - Propagate trace context to outbound requests
//! - Mint trace/span ids for new operations
//!
//! # Design Decisions
//! - W3C Trace Context (`traceparent`) only; `tracestate` is not carried
//! - Ids are lowercase hex derived from UUID v4
//! - An unparsable `traceparent` starts a fresh root trace

use uuid::Uuid;

/// W3C trace context header.
pub const TRACEPARENT: &str = "traceparent";

const VERSION: &str = "00";
const SAMPLED: &str = "01";

/// Identifies one span within a distributed trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: String,
    span_id: String,
    parent_span_id: Option<String>,
}

impl TraceContext {
    /// Start a new trace.
    pub fn new_root() -> Self {
        Self {
            trace_id: Uuid::new_v4().simple().to_string(),
            span_id: new_span_id(),
            parent_span_id: None,
        }
    }

    /// A new span in the same trace, parented to this one.
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: new_span_id(),
            parent_span_id: Some(self.span_id.clone()),
        }
    }

    /// Continue the caller's trace if `header` is a valid `traceparent`, otherwise start a new one.
    pub fn continue_from(header: Option<&str>) -> Self {
        header
            .and_then(Self::from_traceparent)
            .map(|remote| remote.child())
            .unwrap_or_else(Self::new_root)
    }

    /// Parse `version-traceid-spanid-flags`.
    pub fn from_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let flags = parts.next()?;

        if !is_hex(version, 2) || version.eq_ignore_ascii_case("ff") || !is_hex(flags, 2) {
            return None;
        }
        // Version 00 has exactly four fields.
        if version == VERSION && parts.next().is_some() {
            return None;
        }
        if !is_hex(trace_id, 32) || is_all_zero(trace_id) {
            return None;
        }
        if !is_hex(span_id, 16) || is_all_zero(span_id) {
            return None;
        }

        Some(Self {
            trace_id: trace_id.to_ascii_lowercase(),
            span_id: span_id.to_ascii_lowercase(),
            parent_span_id: None,
        })
    }

    pub fn to_traceparent(&self) -> String {
        format!("{}-{}-{}-{}", VERSION, self.trace_id, self.span_id, SAMPLED)
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    pub fn parent_span_id(&self) -> Option<&str> {
        self.parent_span_id.as_deref()
    }
}

fn new_span_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(16);
    id
}

fn is_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_all_zero(s: &str) -> bool {
    s.bytes().all(|b| b == b'0')
}

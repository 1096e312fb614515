//! Telemetry middleware.
//!
//! Emits a before-event when a request arrives and an after-event once the
//! inner service has produced a response, then records the request span.
//! The handler sees the original request and the caller sees the handler's
//! response unchanged.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::Instrument;

use crate::http::request::intercept_request;
use crate::http::response::intercept_response;
use crate::observability::metrics;
use crate::observability::tracing::{TraceContext, TRACEPARENT};
use crate::telemetry::{RequestSpan, TelemetryClient};

/// State for [`telemetry_middleware`].
#[derive(Clone)]
pub struct TelemetryState {
    pub telemetry: TelemetryClient,
    /// Largest request body buffered for logging.
    pub max_body_bytes: usize,
}

pub async fn telemetry_middleware(
    State(state): State<TelemetryState>,
    request: Request,
    next: Next,
) -> Response {
    let started_at = Utc::now();
    let start = Instant::now();

    let trace = TraceContext::continue_from(
        request
            .headers()
            .get(TRACEPARENT)
            .and_then(|v| v.to_str().ok()),
    );
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let span_name = format!("{} {}", request.method(), request.uri().path());

    let span = tracing::info_span!(
        "request",
        operation_id = %trace.trace_id(),
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let (request, snapshot) = intercept_request(request, state.max_body_bytes).await;
        state.telemetry.on_before_request(&snapshot, Some(&trace));

        let response = next.run(request).await;

        let (response, response_snapshot) = intercept_response(response).await;
        state
            .telemetry
            .on_after_response(&snapshot, &response_snapshot, Some(&trace));

        let status = response_snapshot.status().as_u16();
        let mut properties = state.telemetry.identity().base_dimensions();
        properties.insert("request_id", request_id);
        state.telemetry.track(RequestSpan {
            trace,
            name: span_name,
            url: snapshot.url().to_string(),
            started_at,
            duration: start.elapsed(),
            response_code: status,
            properties,
        });
        metrics::record_request(status);

        response
    }
    .instrument(span)
    .await
}

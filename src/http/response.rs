//! Response capture for logging.
//!
//! # Responsibilities
//! - Buffer the handler's response so its body can be logged
//! - Return a response identical to the one the handler produced
//!
//! # Design Decisions
//! - Status, headers and body bytes pass through unchanged
//! - Body decoded lossily for logging; the client receives the raw bytes
//! - A body stream that fails while buffering is replaced by one that yields
//!   the same error, so the failure still reaches hyper; bytes read before
//!   the error are not replayed

use axum::body::{Body, Bytes};
use axum::response::Response;
use futures_util::stream;

use crate::telemetry::snapshot::ResponseSnapshot;
use crate::telemetry::INTERNAL_TARGET;

/// Snapshot a response and hand back an equivalent one.
pub async fn intercept_response(response: Response) -> (Response, ResponseSnapshot) {
    let (parts, body) = response.into_parts();

    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            let snapshot = ResponseSnapshot::from_bytes(parts.status, &bytes);
            (Response::from_parts(parts, Body::from(bytes)), snapshot)
        }
        Err(e) => {
            tracing::debug!(target: INTERNAL_TARGET, error = %e, "Response body unreadable");
            let snapshot = ResponseSnapshot::new(parts.status, "");
            (Response::from_parts(parts, failed_body(e)), snapshot)
        }
    }
}

/// A body whose first frame is `error`.
pub(crate) fn failed_body(error: axum::Error) -> Body {
    Body::from_stream(stream::iter([Err::<Bytes, _>(error)]))
}

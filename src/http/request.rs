//! Request capture for logging.
//!
//! # Responsibilities
//! - Reconstruct the absolute request URL
//! - Collect query and form values
//! - Sniff a JSON body when the request declares one
//!
//! # Design Decisions
//! - Capture never fails: anything unreadable becomes an absent field
//! - Only the buffered copy of the body is inspected; the handler gets the original bytes
//! - A body that fails while buffering reaches the handler as a body yielding that error

use axum::body::{Body, HttpBody};
use axum::extract::Request;
use axum::http::{header, request::Parts};

use crate::http::response::failed_body;
use crate::telemetry::snapshot::{
    form_pairs, is_form_content_type, is_json_content_type, try_parse_json, RequestSnapshot,
};
use crate::telemetry::INTERNAL_TARGET;

/// Snapshot a request and hand back an equivalent one for the handler.
///
/// The body is buffered only when its length is known and at most `limit`
/// bytes; otherwise it streams through untouched and is not captured.
pub async fn intercept_request(request: Request, limit: usize) -> (Request, RequestSnapshot) {
    let (parts, body) = request.into_parts();

    let within_limit = body.size_hint().upper().is_some_and(|len| len <= limit as u64);
    if !within_limit {
        let snapshot = capture_request(&parts, &[]);
        return (Request::from_parts(parts, body), snapshot);
    }

    match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => {
            let snapshot = capture_request(&parts, &bytes);
            (Request::from_parts(parts, Body::from(bytes)), snapshot)
        }
        Err(e) => {
            tracing::debug!(target: INTERNAL_TARGET, error = %e, "Request body unreadable");
            let snapshot = capture_request(&parts, &[]);
            (Request::from_parts(parts, failed_body(e)), snapshot)
        }
    }
}

/// Build a snapshot from request head and buffered body.
pub fn capture_request(parts: &Parts, body: &[u8]) -> RequestSnapshot {
    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let mut values = parts
        .uri
        .query()
        .map(|query| form_pairs(query.as_bytes()))
        .unwrap_or_default();
    if is_form_content_type(content_type) {
        values.extend(form_pairs(body));
    }

    let json_body = if is_json_content_type(content_type) {
        try_parse_json(body)
    } else {
        None
    };

    RequestSnapshot::new(parts.method.as_str(), request_url(parts))
        .with_values(values)
        .with_json_body(json_body)
}

/// Absolute URL as the client addressed it.
pub fn request_url(parts: &Parts) -> String {
    if parts.uri.scheme().is_some() {
        return parts.uri.to_string();
    }

    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    match parts.headers.get(header::HOST).and_then(|v| v.to_str().ok()) {
        Some(host) => format!("http://{}{}", host, path),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(request: axum::http::Request<()>) -> Parts {
        request.into_parts().0
    }

    #[tokio::test]
    async fn test_intercept_keeps_body() {
        let request = axum::http::Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"a":1}"#))
            .unwrap();

        let (request, snapshot) = intercept_request(request, 1024).await;
        assert_eq!(snapshot.dimensions().get("body"), Some(r#"{"a":1}"#));

        let bytes = axum::body::to_bytes(request.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_intercept_skips_oversized_body() {
        let request = axum::http::Request::post("/?x=5")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"a":1}"#))
            .unwrap();

        let (request, snapshot) = intercept_request(request, 3).await;
        assert!(snapshot.body().is_none());
        assert_eq!(snapshot.values_summary(), "x: 5, ");

        let bytes = axum::body::to_bytes(request.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], br#"{"a":1}"#);
    }

    #[test]
    fn test_url_from_host_header() {
        let p = parts(
            axum::http::Request::get("/api/v1/status?x=5")
                .header("host", "localhost:5000")
                .body(())
                .unwrap(),
        );
        assert_eq!(request_url(&p), "http://localhost:5000/api/v1/status?x=5");
    }

    #[test]
    fn test_url_without_host() {
        let p = parts(axum::http::Request::get("/api/v1/status").body(()).unwrap());
        assert_eq!(request_url(&p), "/api/v1/status");
    }

    #[test]
    fn test_query_and_form_values() {
        let p = parts(
            axum::http::Request::post("/submit?a=1")
                .header("host", "localhost")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(())
                .unwrap(),
        );
        let snapshot = capture_request(&p, b"b=2&a=3");
        assert_eq!(snapshot.values_summary(), "a: 1, b: 2, ");
        assert!(snapshot.body().is_none());
    }

    #[test]
    fn test_json_body_requires_content_type() {
        let json = parts(
            axum::http::Request::post("/")
                .header("content-type", "application/json")
                .body(())
                .unwrap(),
        );
        let text = parts(
            axum::http::Request::post("/")
                .header("content-type", "text/plain")
                .body(())
                .unwrap(),
        );

        assert_eq!(
            capture_request(&json, br#"{"ok":true}"#).dimensions().get("body"),
            Some(r#"{"ok":true}"#)
        );
        assert!(capture_request(&json, b"{broken").body().is_none());
        assert!(capture_request(&text, br#"{"ok":true}"#).body().is_none());
    }
}

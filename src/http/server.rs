//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the status handler
//! - Wire up middleware (request ID, tracing, telemetry, timeout)
//! - Bind server to listener
//! - Stop on the shutdown signal

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::health::endpoint::{health_check, STATUS_PATH};
use crate::http::middleware::{telemetry_middleware, TelemetryState};
use crate::telemetry::TelemetryClient;

/// HTTP server for the health service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig, telemetry: TelemetryClient) -> Self {
        let state = TelemetryState {
            telemetry,
            max_body_bytes: config.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The last layer added is the outermost.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: TelemetryState) -> Router {
        Router::new()
            .route(STATUS_PATH, get(health_check))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(middleware::from_fn_with_state(state, telemetry_middleware))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::TelemetryConfig;
    use crate::telemetry::envelope::{EnvelopeData, MessageData};
    use crate::telemetry::{ApplicationIdentity, MemorySink};

    fn server(sink: &MemorySink) -> (HttpServer, TelemetryClient) {
        let telemetry = TelemetryClient::new(
            ApplicationIdentity::new("HealthService", "Development"),
            Arc::new(sink.clone()),
            &TelemetryConfig::default(),
        );
        (HttpServer::new(ServiceConfig::default(), telemetry.clone()), telemetry)
    }

    fn messages(sink: &MemorySink) -> Vec<MessageData> {
        sink.envelopes()
            .into_iter()
            .filter_map(|e| match e.data {
                EnvelopeData::MessageData(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_status_ok_with_request_id() {
        let sink = MemorySink::new();
        let (server, _telemetry) = server(&sink);

        let response = server
            .router()
            .oneshot(Request::get(STATUS_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"Health ok!");
    }

    #[tokio::test]
    async fn test_ignores_query_and_body() {
        let sink = MemorySink::new();
        let (server, telemetry) = server(&sink);

        let response = server
            .router()
            .oneshot(
                Request::get("/api/v1/status?x=5")
                    .header("host", "localhost:5000")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"probe": true}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"Health ok!");

        telemetry.flush().await;
        let delivered = messages(&sink);
        assert_eq!(delivered.len(), 2);
        let before = &delivered[0].properties;
        assert_eq!(before.get("values"), Some("x: 5, "));
        assert_eq!(before.get("body"), Some(r#"{"probe":true}"#));
        assert_eq!(before.get("request_url"), Some("http://localhost:5000/api/v1/status?x=5"));
    }

    #[tokio::test]
    async fn test_unknown_route_passes_through() {
        let sink = MemorySink::new();
        let (server, _telemetry) = server(&sink);

        let response = server
            .router()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! Process logs forwarded through the tracing layer.
//!
//! `#[tokio::test]` runs on a current-thread runtime, so spawned tasks see the
//! thread-local subscriber installed with `set_default`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use tracing_subscriber::layer::SubscriberExt;

use health_telemetry::config::{PollerConfig, ServiceConfig};
use health_telemetry::health::Poller;
use health_telemetry::telemetry::envelope::tags;
use health_telemetry::telemetry::{TelemetryClient, TelemetryLayer};
use health_telemetry::HttpServer;

fn install_layer(telemetry: &TelemetryClient) -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::registry().with(TelemetryLayer::new(telemetry.clone()));
    tracing::subscriber::set_default(subscriber)
}

#[tokio::test]
async fn test_handler_log_is_forwarded_between_before_and_after() {
    let (telemetry, sink) = common::memory_telemetry("HealthService");
    let _guard = install_layer(&telemetry);
    let server = HttpServer::new(ServiceConfig::default(), telemetry.clone());

    let response = server
        .router()
        .oneshot(Request::get("/api/v1/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    telemetry.flush().await;

    let envelopes: Vec<_> = sink
        .envelopes()
        .into_iter()
        .filter(|e| matches!(e.data, health_telemetry::telemetry::envelope::EnvelopeData::MessageData(_)))
        .collect();
    let messages = common::messages(&envelopes);
    let texts: Vec<&str> = messages.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(texts, ["request GET /api/v1/status", "Health ok!", "response: 200 OK"]);

    let health = &messages[1];
    assert_eq!(health.severity_level, 1);
    assert_eq!(health.properties.get("ApplicationName"), Some("HealthService"));
    assert_eq!(messages[0].severity_level, 2);
    assert_eq!(messages[2].severity_level, 2);

    // The handler log shares the request's operation id.
    let before_operation = envelopes[0].tag(tags::OPERATION_ID);
    assert!(before_operation.is_some());
    assert_eq!(envelopes[1].tag(tags::OPERATION_ID), before_operation);
    assert_eq!(health.properties.get("operation_id"), before_operation);
}

#[tokio::test]
async fn test_poller_logs_carry_iteration() {
    let service = common::start_service().await;
    let (telemetry, sink) = common::memory_telemetry("HealthPoller");
    let _guard = install_layer(&telemetry);

    let config = PollerConfig {
        base_url: service.base_url(),
        interval_ms: 10,
        ..PollerConfig::default()
    };
    let mut poller = Poller::new(&config, config.status_url().unwrap(), telemetry.clone());
    poller.tick().await.unwrap();
    poller.tick().await.unwrap();
    telemetry.flush().await;

    let messages = common::messages(&sink.envelopes());
    let doing_get: Vec<_> = messages.iter().filter(|m| m.message == "doing GET").collect();
    let responses: Vec<_> = messages.iter().filter(|m| m.message == "response").collect();
    assert_eq!(doing_get.len(), 2);
    assert_eq!(responses.len(), 2);

    for (expected, (get, response)) in ["1", "2"].iter().zip(doing_get.iter().zip(&responses)) {
        assert_eq!(get.severity_level, 1);
        assert_eq!(get.properties.get("iteration"), Some(*expected));
        assert_eq!(get.properties.get("ApplicationName"), Some("HealthPoller"));

        assert_eq!(response.severity_level, 1);
        assert_eq!(response.properties.get("iteration"), Some(*expected));
        assert!(response
            .properties
            .get("response")
            .is_some_and(|r| r.contains("Health ok!")));
    }

    service.shutdown.trigger();
}

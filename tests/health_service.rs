//! End-to-end tests for the health service over a real socket.

mod common;

use health_telemetry::telemetry::envelope::{tags, EnvelopeData};

#[tokio::test]
async fn test_status_returns_health_ok() {
    let service = common::start_service().await;

    let response = reqwest::get(service.status_url()).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "Health ok!");

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_one_before_and_one_after_event_per_request() {
    let service = common::start_service().await;

    reqwest::get(service.status_url()).await.unwrap();
    service.telemetry.flush().await;

    let envelopes = service.sink.envelopes();
    let messages = common::messages(&envelopes);
    assert_eq!(messages.len(), 2);

    let before = &messages[0];
    assert!(before.message.starts_with("request GET "));
    assert_eq!(before.properties.get("request_method"), Some("GET"));
    assert_eq!(before.properties.get("values"), Some("(None)"));
    assert_eq!(before.properties.get("ApplicationName"), Some("HealthService"));
    assert_eq!(before.properties.get("Environment"), Some("Test"));
    assert!(!before.properties.contains_key("body"));

    let after = &messages[1];
    assert_eq!(after.message, "response: 200 OK");
    assert_eq!(after.properties.get("response_status"), Some("200 OK"));
    assert_eq!(after.properties.get("response_body"), Some("Health ok!"));
    assert!(after.properties.is_superset_of(&before.properties));

    for envelope in &envelopes {
        assert_eq!(envelope.tag(tags::CLOUD_ROLE), Some("HealthService"));
    }

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_query_values_are_captured() {
    let service = common::start_service().await;

    let body = reqwest::get(format!("{}?x=5", service.status_url()))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "Health ok!");
    service.telemetry.flush().await;

    let messages = common::messages(&service.sink.envelopes());
    assert_eq!(messages[0].properties.get("values"), Some("x: 5, "));

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_traceparent_links_operation() {
    let service = common::start_service().await;
    let trace_id = "4bf92f3577b34da6a3ce929d0e0e4736";

    reqwest::Client::new()
        .get(service.status_url())
        .header(
            "traceparent",
            format!("00-{}-00f067aa0ba902b7-01", trace_id),
        )
        .send()
        .await
        .unwrap();
    service.telemetry.flush().await;

    let envelopes = service.sink.envelopes();
    assert!(!envelopes.is_empty());
    for envelope in &envelopes {
        assert_eq!(envelope.tag(tags::OPERATION_ID), Some(trace_id));
    }

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_request_span_is_recorded() {
    let service = common::start_service().await;

    reqwest::get(service.status_url()).await.unwrap();
    service.telemetry.flush().await;

    let requests: Vec<_> = service
        .sink
        .envelopes()
        .into_iter()
        .filter_map(|e| match e.data {
            EnvelopeData::RequestData(r) => Some(r),
            _ => None,
        })
        .collect();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].response_code, "200");
    assert!(requests[0].success);
    assert!(requests[0].properties.contains_key("request_id"));

    service.shutdown.trigger();
}

//! Poller against a live health service and against a dead address.

mod common;

use health_telemetry::config::PollerConfig;
use health_telemetry::health::{Poller, PollerError};
use health_telemetry::telemetry::envelope::{tags, EnvelopeData};
use url::Url;

fn poller_config(base_url: String) -> PollerConfig {
    let mut config = PollerConfig {
        base_url,
        interval_ms: 10,
        ..PollerConfig::default()
    };
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_ms = 5;
    config
}

#[tokio::test]
async fn test_iterations_increase_by_one() {
    let service = common::start_service().await;
    let (telemetry, _sink) = common::memory_telemetry("HealthPoller");
    let config = poller_config(service.base_url());
    let mut poller = Poller::new(&config, config.status_url().unwrap(), telemetry);

    assert_eq!(poller.iteration(), 0);
    for expected in 1..=3 {
        let response = poller.tick().await.unwrap();
        assert_eq!(poller.iteration(), expected);
        assert_eq!(response.status, reqwest::StatusCode::OK);
        assert_eq!(response.body, "Health ok!");
    }

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_poll_propagates_trace_to_service() {
    let service = common::start_service().await;
    let (telemetry, sink) = common::memory_telemetry("HealthPoller");
    let config = poller_config(service.base_url());
    let mut poller = Poller::new(&config, config.status_url().unwrap(), telemetry.clone());

    poller.tick().await.unwrap();
    telemetry.flush().await;
    service.telemetry.flush().await;

    let dependency = sink
        .envelopes()
        .into_iter()
        .find(|e| matches!(e.data, EnvelopeData::RemoteDependencyData(_)))
        .unwrap();
    let operation_id = dependency.tag(tags::OPERATION_ID).unwrap().to_string();

    let served = service.sink.envelopes();
    assert!(!served.is_empty());
    for envelope in &served {
        assert_eq!(envelope.tag(tags::OPERATION_ID), Some(operation_id.as_str()));
    }

    match dependency.data {
        EnvelopeData::RemoteDependencyData(d) => {
            assert_eq!(d.result_code, "200");
            assert!(d.success);
        }
        _ => unreachable!(),
    }

    service.shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_target_stops_on_first_error() {
    let addr = common::unused_addr().await;
    let (telemetry, sink) = common::memory_telemetry("HealthPoller");
    let config = poller_config(format!("http://{}", addr));
    let target = config.status_url().unwrap();
    let poller = Poller::new(&config, target, telemetry.clone());

    let err = poller.run().await.unwrap_err();
    match err {
        PollerError::Request {
            iteration,
            attempts,
            ..
        } => {
            assert_eq!(iteration, 1);
            assert_eq!(attempts, 1);
        }
    }

    telemetry.flush().await;
    let envelopes = sink.envelopes();
    let messages = common::messages(&envelopes);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].properties.get("request_method"), Some("GET"));

    let failed = envelopes.iter().find_map(|e| match &e.data {
        EnvelopeData::RemoteDependencyData(d) => Some(d.clone()),
        _ => None,
    });
    let failed = failed.unwrap();
    assert!(!failed.success);
    assert!(failed.properties.contains_key("error"));
}

#[tokio::test]
async fn test_retry_policy_bounds_attempts() {
    let addr = common::unused_addr().await;
    let (telemetry, _sink) = common::memory_telemetry("HealthPoller");
    let mut config = poller_config(format!("http://{}", addr));
    config.retry.max_attempts = 3;
    let mut poller = Poller::new(&config, Url::parse(&config.base_url).unwrap(), telemetry);

    let PollerError::Request { attempts, .. } = poller.tick().await.unwrap_err();
    assert_eq!(attempts, 3);
    assert_eq!(poller.iteration(), 1);
}

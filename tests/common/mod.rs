//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use health_telemetry::config::{ServiceConfig, TelemetryConfig};
use health_telemetry::telemetry::envelope::{Envelope, EnvelopeData, MessageData};
use health_telemetry::telemetry::{ApplicationIdentity, MemorySink};
use health_telemetry::{HttpServer, Shutdown, TelemetryClient};

/// A health service running on an ephemeral port, reporting into memory.
pub struct TestService {
    pub addr: SocketAddr,
    pub sink: MemorySink,
    pub telemetry: TelemetryClient,
    pub shutdown: Shutdown,
}

impl TestService {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn status_url(&self) -> String {
        format!("{}/api/v1/status", self.base_url())
    }
}

/// Telemetry client that records into the returned sink.
pub fn memory_telemetry(application_name: &str) -> (TelemetryClient, MemorySink) {
    let sink = MemorySink::new();
    let telemetry = TelemetryClient::new(
        ApplicationIdentity::new(application_name, "Test"),
        Arc::new(sink.clone()),
        &TelemetryConfig::default(),
    );
    (telemetry, sink)
}

pub async fn start_service() -> TestService {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (telemetry, sink) = memory_telemetry("HealthService");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(ServiceConfig::default(), telemetry.clone());
    tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestService {
        addr,
        sink,
        telemetry,
        shutdown,
    }
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn messages(envelopes: &[Envelope]) -> Vec<MessageData> {
    envelopes
        .iter()
        .filter_map(|e| match &e.data {
            EnvelopeData::MessageData(m) => Some(m.clone()),
            _ => None,
        })
        .collect()
}

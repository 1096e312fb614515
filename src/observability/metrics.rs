//! Metrics collection and exposition.
//!
//! # Metrics
//! - `telemetry_items_total` (counter): items queued for the sink, by kind
//! - `telemetry_items_dropped_total` (counter): items dropped on a full queue, by kind
//! - `telemetry_batches_total` (counter): deliveries, by outcome
//! - `telemetry_batch_items` (histogram): envelopes per delivery
//! - `health_requests_total` (counter): intercepted requests, by status
//! - `poller_iterations_total` (counter): poll passes, by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - The Prometheus listener is opt-in

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

pub fn record_telemetry_queued(kind: &'static str) {
    counter!("telemetry_items_total", "kind" => kind).increment(1);
}

pub fn record_telemetry_dropped(kind: &'static str) {
    counter!("telemetry_items_dropped_total", "kind" => kind).increment(1);
}

pub fn record_batch_delivered(size: usize) {
    counter!("telemetry_batches_total", "outcome" => "delivered").increment(1);
    histogram!("telemetry_batch_items").record(size as f64);
}

pub fn record_batch_failed(size: usize) {
    counter!("telemetry_batches_total", "outcome" => "failed").increment(1);
    histogram!("telemetry_batch_items").record(size as f64);
}

pub fn record_request(status: u16) {
    counter!("health_requests_total", "status" => status.to_string()).increment(1);
}

pub fn record_poll(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("poller_iterations_total", "outcome" => outcome).increment(1);
}

//! Startup orchestration shared by both binaries.
//!
//! # Responsibilities
//! - Resolve the process identity
//! - Build the telemetry client and install logging
//! - Start the optional metrics endpoint
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Telemetry comes up before logging so no log line misses the sink

use std::net::SocketAddr;

use crate::config::AppConfig;
use crate::observability::{logging, metrics};
use crate::telemetry::TelemetryClient;

/// Application name of the health service unless configured otherwise.
pub const SERVICE_APPLICATION_NAME: &str = "HealthService";

/// Application name of the poller unless configured otherwise.
pub const POLLER_APPLICATION_NAME: &str = "HealthPoller";

/// Bring up telemetry, logging and metrics for a process.
pub fn init(
    config: &AppConfig,
    default_name: &str,
) -> Result<TelemetryClient, Box<dyn std::error::Error>> {
    let identity = config.telemetry.identity(default_name);
    let telemetry = TelemetryClient::from_config(identity, &config.telemetry)?;
    logging::init_logging(&config.observability, &telemetry)?;

    tracing::info!(
        application_name = %telemetry.identity().application_name(),
        environment = %telemetry.identity().environment(),
        sink_configured = config.telemetry.connection_string.is_some(),
        "Telemetry initialized"
    );
    if config.telemetry.connection_string.is_none() {
        tracing::warn!("No connection string configured; telemetry is discarded");
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    Ok(telemetry)
}

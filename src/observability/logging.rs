//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the logging subsystem once per process
//! - Attach the telemetry layer so log events reach the sink
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - RUST_LOG takes precedence over the configured level

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::telemetry::{TelemetryClient, TelemetryLayer};

/// Install the global subscriber: env filter, console output, telemetry forwarding.
pub fn init_logging(
    config: &ObservabilityConfig,
    telemetry: &TelemetryClient,
) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let console = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(TelemetryLayer::new(telemetry.clone()))
        .try_init()
}

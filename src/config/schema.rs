//! Configuration schema definitions.
//!
//! This module defines the configuration shared by both binaries. All types
//! derive Serde traits for deserialization from config files, and every field
//! has a default so an empty file (or no file) is valid.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::health::endpoint::STATUS_PATH;
use crate::telemetry::identity::{ApplicationIdentity, DEFAULT_ENVIRONMENT};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Telemetry sink and application identity.
    pub telemetry: TelemetryConfig,

    /// Health service listener settings.
    pub service: ServiceConfig,

    /// Poller client settings.
    pub poller: PollerConfig,

    /// Local logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Telemetry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Monitoring backend connection string. Telemetry is discarded when unset.
    pub connection_string: Option<String>,

    /// Cloud role name. Each binary supplies its own default.
    pub application_name: Option<String>,

    /// Environment label attached to every event.
    pub environment: String,

    /// Queue depth between callers and the forwarder task.
    pub channel_capacity: usize,

    /// Envelopes per delivery.
    pub max_batch_size: usize,

    /// Maximum time an envelope waits in the forwarder, in milliseconds.
    pub flush_interval_ms: u64,

    /// Timeout for one delivery to the backend, in seconds.
    pub sink_timeout_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            application_name: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            channel_capacity: 10_000,
            max_batch_size: 64,
            flush_interval_ms: 5_000,
            sink_timeout_secs: 10,
        }
    }
}

impl TelemetryConfig {
    /// Resolve the identity, falling back to the binary's default name.
    pub fn identity(&self, default_name: &str) -> ApplicationIdentity {
        let name = self.application_name.as_deref().unwrap_or(default_name);
        ApplicationIdentity::new(name, self.environment.clone())
    }
}

/// Health service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Largest request body buffered for logging, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Poller configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Base URL of the health service.
    pub base_url: String,

    /// Pause before each GET, in milliseconds.
    pub interval_ms: u64,

    /// Retry policy for a single iteration.
    pub retry: RetryConfig,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            interval_ms: 3_000,
            retry: RetryConfig::default(),
        }
    }
}

impl PollerConfig {
    /// Full URL of the status endpoint.
    pub fn status_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.base_url)?.join(STATUS_PATH)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per iteration, including the first. 1 disables retries.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 500,
            max_delay_ms: 5_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when RUST_LOG is unset.
    pub log_level: String,

    /// Console log format.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

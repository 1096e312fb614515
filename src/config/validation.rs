//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::AppConfig;
use crate::telemetry::connection::{ConnectionString, ConnectionStringError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("service.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),

    #[error("poller.base_url `{0}` is not an http(s) URL")]
    BaseUrl(String),

    #[error("poller.interval_ms must be greater than zero")]
    ZeroInterval,

    #[error("poller.retry.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("poller.retry.base_delay_ms exceeds max_delay_ms")]
    BackoffRange,

    #[error("telemetry.{0} must be greater than zero")]
    ZeroTelemetrySetting(&'static str),

    #[error("telemetry.application_name must not be empty")]
    EmptyApplicationName,

    #[error("telemetry.connection_string: {0}")]
    ConnectionString(#[from] ConnectionStringError),
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.service.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    match url::Url::parse(&config.poller.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::BaseUrl(config.poller.base_url.clone())),
    }

    if config.poller.interval_ms == 0 {
        errors.push(ValidationError::ZeroInterval);
    }

    let retry = &config.poller.retry;
    if retry.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    if retry.base_delay_ms > retry.max_delay_ms {
        errors.push(ValidationError::BackoffRange);
    }

    let telemetry = &config.telemetry;
    if telemetry.channel_capacity == 0 {
        errors.push(ValidationError::ZeroTelemetrySetting("channel_capacity"));
    }
    if telemetry.max_batch_size == 0 {
        errors.push(ValidationError::ZeroTelemetrySetting("max_batch_size"));
    }
    if telemetry.flush_interval_ms == 0 {
        errors.push(ValidationError::ZeroTelemetrySetting("flush_interval_ms"));
    }
    if matches!(&telemetry.application_name, Some(name) if name.trim().is_empty()) {
        errors.push(ValidationError::EmptyApplicationName);
    }
    if let Some(raw) = &telemetry.connection_string {
        if let Err(e) = raw.parse::<ConnectionString>() {
            errors.push(e.into());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

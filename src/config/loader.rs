//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Optional path to a TOML config file.
pub const CONFIG_PATH_ENV: &str = "HEALTH_TELEMETRY_CONFIG";

/// Environment variables that override file values.
pub mod env {
    pub const CONNECTION_STRING: &str = "APPLICATION_INSIGHTS_CONNECTIONSTRING";
    pub const APPLICATION_NAME: &str = "APPLICATION_NAME";
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    pub const HEALTH_SERVICE_URL: &str = "HEALTH_SERVICE_URL";
    pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the process configuration: optional file, then environment overrides, then validation.
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        }
        Err(_) => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values onto `config`. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(value) = get(env::CONNECTION_STRING) {
        config.telemetry.connection_string = Some(value);
    }
    if let Some(value) = get(env::APPLICATION_NAME) {
        config.telemetry.application_name = Some(value);
    }
    if let Some(value) = get(env::ENVIRONMENT) {
        config.telemetry.environment = value;
    }
    if let Some(value) = get(env::HEALTH_SERVICE_URL) {
        config.poller.base_url = value;
    }
    if let Some(value) = get(env::BIND_ADDRESS) {
        config.service.bind_address = value;
    }
}

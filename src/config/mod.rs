//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional, path from HEALTH_TELEMETRY_CONFIG)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (connection string, identity, URLs)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::AppConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::PollerConfig;
pub use schema::RetryConfig;
pub use schema::ServiceConfig;
pub use schema::TelemetryConfig;

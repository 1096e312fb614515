//! Health service, poller client, and the telemetry interception they share.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod telemetry;

pub use config::AppConfig;
pub use health::Poller;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use telemetry::TelemetryClient;

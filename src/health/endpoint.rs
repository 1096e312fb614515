//! Liveness endpoint.
//!
//! Returns 200 whenever the process can answer HTTP. No dependency checks.

/// Route of the status endpoint.
pub const STATUS_PATH: &str = "/api/v1/status";

/// Constant body returned by the status endpoint.
pub const HEALTH_OK: &str = "Health ok!";

pub async fn health_check() -> &'static str {
    tracing::info!("Health ok!");
    HEALTH_OK
}

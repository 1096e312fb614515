//! Health Service
//!
//! Serves `GET /api/v1/status` behind the telemetry middleware.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                HEALTH SERVICE                │
//!                       │                                              │
//!     GET /api/v1/status│  ┌──────────┐  ┌────────────┐  ┌─────────┐   │
//!     ──────────────────┼─▶│request id│─▶│ telemetry  │─▶│ handler │   │
//!                       │  │ + trace  │  │ middleware │  │"Health  │   │
//!     200 "Health ok!"  │  └──────────┘  └─────┬──────┘  │  ok!"   │   │
//!     ◀─────────────────┼───────────────────────┤        └─────────┘   │
//!                       │                      ▼                       │
//!                       │              ┌───────────────┐               │
//!                       │              │TelemetryClient│──────────────┼──▶ Monitoring
//!                       │              │ tag + batch   │               │     backend
//!                       │              └───────────────┘               │
//!                       └──────────────────────────────────────────────┘
//! ```

use tokio::net::TcpListener;

use health_telemetry::config;
use health_telemetry::http::HttpServer;
use health_telemetry::lifecycle::{signals, startup, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_from_env()?;
    let telemetry = startup::init(&config, startup::SERVICE_APPLICATION_NAME)?;

    tracing::info!(
        bind_address = %config.service.bind_address,
        request_timeout_secs = config.service.request_timeout_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.service.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config.service.clone(), telemetry.clone());
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let result = shutdown
        .run_until(server_task, signals::shutdown_signal())
        .await?;

    telemetry.flush().await;
    tracing::info!("Shutdown complete");
    result?;
    Ok(())
}

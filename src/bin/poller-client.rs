//! Poller Client
//!
//! GETs the health service status endpoint on a fixed interval, forever.
//! A transport failure ends the process with a non-zero exit status.

use health_telemetry::config;
use health_telemetry::health::Poller;
use health_telemetry::lifecycle::{signals, startup};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_from_env()?;
    let telemetry = startup::init(&config, startup::POLLER_APPLICATION_NAME)?;

    let target = config.poller.status_url()?;
    let poller = Poller::new(&config.poller, target, telemetry.clone());

    let result = tokio::select! {
        result = poller.run() => result,
        _ = signals::shutdown_signal() => Ok(()),
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Poller terminated");
    }
    telemetry.flush().await;

    result?;
    Ok(())
}

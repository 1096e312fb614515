//! Active health polling.
//!
//! # Responsibilities
//! - Periodically GET the health service status endpoint
//! - Log each attempt and its outcome, tagged with the iteration number
//!
//! # Design Decisions
//! - Strictly sequential: one request in flight, sleep first, then GET
//! - No request timeout
//! - A transport failure ends the loop unless a retry policy allows another attempt

use std::time::Duration;

use tokio::time;
use tracing::Instrument;
use url::Url;

use crate::config::PollerConfig;
use crate::http::client::{InstrumentedClient, ProbeResponse};
use crate::observability::metrics;
use crate::resilience::retries::RetryPolicy;
use crate::telemetry::TelemetryClient;

#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error("iteration {iteration}: GET {url} failed after {attempts} attempt(s): {source}")]
    Request {
        iteration: u64,
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
}

pub struct Poller {
    client: InstrumentedClient,
    target: Url,
    interval: Duration,
    retry: RetryPolicy,
    iteration: u64,
}

impl Poller {
    pub fn new(config: &PollerConfig, target: Url, telemetry: TelemetryClient) -> Self {
        Self {
            client: InstrumentedClient::new(telemetry),
            target,
            interval: Duration::from_millis(config.interval_ms),
            retry: RetryPolicy::from_config(&config.retry),
            iteration: 0,
        }
    }

    /// Iterations started so far.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    /// Poll forever. Returns only when an iteration fails.
    pub async fn run(mut self) -> Result<(), PollerError> {
        tracing::info!(
            target_url = %self.target,
            interval_ms = self.interval.as_millis() as u64,
            max_attempts = self.retry.max_attempts(),
            "Poller starting"
        );

        loop {
            self.tick().await?;
        }
    }

    /// One pass: sleep, count, GET, log.
    pub async fn tick(&mut self) -> Result<ProbeResponse, PollerError> {
        time::sleep(self.interval).await;
        self.iteration += 1;
        let iteration = self.iteration;

        let span = tracing::info_span!("poll", iteration);
        async {
            tracing::info!(iteration, "doing GET");
            match self.get_with_retry().await {
                Ok(response) => {
                    metrics::record_poll(true);
                    tracing::info!(iteration, response = ?response, "response");
                    Ok(response)
                }
                Err((attempts, source)) => {
                    metrics::record_poll(false);
                    tracing::error!(iteration, attempts, error = %source, "GET failed");
                    Err(PollerError::Request {
                        iteration,
                        url: self.target.to_string(),
                        attempts,
                        source,
                    })
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn get_with_retry(&self) -> Result<ProbeResponse, (u32, reqwest::Error)> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(&self.target).await {
                Ok(response) => return Ok(response),
                Err(e) if self.retry.should_retry(attempt) => {
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(attempt, delay = ?delay, error = %e, "GET failed, retrying");
                    time::sleep(delay).await;
                }
                Err(e) => return Err((attempt, e)),
            }
        }
    }
}

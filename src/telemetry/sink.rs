//! Delivery targets for envelope batches.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::telemetry::connection::ConnectionString;
use crate::telemetry::envelope::Envelope;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ingestion rejected batch with status {0}")]
    Rejected(reqwest::StatusCode),

    #[error("invalid ingestion url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Receives batches from the client's forwarder task.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn deliver(&self, batch: Vec<Envelope>) -> Result<(), SinkError>;
}

/// Posts batches to an Application Insights compatible ingestion endpoint.
pub struct AppInsightsSink {
    client: reqwest::Client,
    track_url: Url,
    instrumentation_key: String,
}

impl AppInsightsSink {
    pub fn new(connection: &ConnectionString, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            track_url: connection.track_url()?,
            instrumentation_key: connection.instrumentation_key.clone(),
        })
    }
}

#[async_trait]
impl TelemetrySink for AppInsightsSink {
    async fn deliver(&self, mut batch: Vec<Envelope>) -> Result<(), SinkError> {
        for envelope in &mut batch {
            envelope.i_key = Some(self.instrumentation_key.clone());
        }

        let response = self
            .client
            .post(self.track_url.clone())
            .json(&batch)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected(status));
        }
        Ok(())
    }
}

/// Keeps delivered envelopes in memory.
#[derive(Clone, Default)]
pub struct MemorySink {
    envelopes: Arc<Mutex<Vec<Envelope>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, in delivery order.
    pub fn envelopes(&self) -> Vec<Envelope> {
        match self.envelopes.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl TelemetrySink for MemorySink {
    async fn deliver(&self, batch: Vec<Envelope>) -> Result<(), SinkError> {
        match self.envelopes.lock() {
            Ok(mut guard) => guard.extend(batch),
            Err(poisoned) => poisoned.into_inner().extend(batch),
        }
        Ok(())
    }
}

/// Discards everything. Used when no backend is configured.
pub struct NullSink;

#[async_trait]
impl TelemetrySink for NullSink {
    async fn deliver(&self, _batch: Vec<Envelope>) -> Result<(), SinkError> {
        Ok(())
    }
}

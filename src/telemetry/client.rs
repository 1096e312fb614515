//! The telemetry client: identity, tagging, and non-blocking delivery.
//!
//! `track` converts an item to an envelope, tags it, and hands it to a
//! bounded channel. A background task batches envelopes and delivers them to
//! the configured sink. Nothing on the caller's path waits for the sink.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::config::TelemetryConfig;
use crate::observability::metrics;
use crate::observability::tracing::TraceContext;
use crate::telemetry::connection::{ConnectionString, ConnectionStringError};
use crate::telemetry::envelope::{tag, Envelope};
use crate::telemetry::event::{Severity, TelemetryEvent};
use crate::telemetry::identity::ApplicationIdentity;
use crate::telemetry::sink::{AppInsightsSink, NullSink, SinkError, TelemetrySink};
use crate::telemetry::snapshot::{RequestSnapshot, ResponseSnapshot};
use crate::telemetry::span::TelemetryItem;

/// Log target for the pipeline's own diagnostics. Never forwarded to the sink.
pub const INTERNAL_TARGET: &str = "health_telemetry::telemetry::internal";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error(transparent)]
    ConnectionString(#[from] ConnectionStringError),

    #[error("failed to build sink: {0}")]
    Sink(#[from] SinkError),
}

enum Command {
    Track(Box<Envelope>),
    Flush(oneshot::Sender<()>),
}

struct ClientInner {
    identity: ApplicationIdentity,
    tx: mpsc::Sender<Command>,
}

/// Handle to the telemetry pipeline. Cheap to clone.
///
/// Must be created inside a Tokio runtime.
#[derive(Clone)]
pub struct TelemetryClient {
    inner: Arc<ClientInner>,
}

impl TelemetryClient {
    pub fn new(
        identity: ApplicationIdentity,
        sink: Arc<dyn TelemetrySink>,
        config: &TelemetryConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        tokio::spawn(forward(
            rx,
            sink,
            config.max_batch_size.max(1),
            Duration::from_millis(config.flush_interval_ms.max(1)),
        ));

        Self {
            inner: Arc::new(ClientInner { identity, tx }),
        }
    }

    /// Uses the ingestion sink when a connection string is configured, otherwise discards.
    pub fn from_config(
        identity: ApplicationIdentity,
        config: &TelemetryConfig,
    ) -> Result<Self, TelemetryError> {
        let sink: Arc<dyn TelemetrySink> = match &config.connection_string {
            Some(raw) => {
                let connection: ConnectionString = raw.parse()?;
                Arc::new(AppInsightsSink::new(
                    &connection,
                    Duration::from_secs(config.sink_timeout_secs),
                )?)
            }
            None => Arc::new(NullSink),
        };
        Ok(Self::new(identity, sink, config))
    }

    pub fn identity(&self) -> &ApplicationIdentity {
        &self.inner.identity
    }

    /// Queue an item for delivery. Drops it if the queue is full.
    pub fn track(&self, item: impl Into<TelemetryItem>) {
        let item = item.into();
        let kind = item.kind();
        let envelope = tag(Envelope::from_item(&item), &self.inner.identity);

        match self.inner.tx.try_send(Command::Track(Box::new(envelope))) {
            Ok(()) => metrics::record_telemetry_queued(kind),
            Err(_) => metrics::record_telemetry_dropped(kind),
        }
    }

    /// Records the before-event for an intercepted request.
    pub fn on_before_request(
        &self,
        request: &RequestSnapshot,
        trace: Option<&TraceContext>,
    ) -> TelemetryEvent {
        let event = TelemetryEvent::before_request(&self.inner.identity, request)
            .with_operation_id(trace.map(|t| t.trace_id().to_string()));
        self.emit(&event);
        event
    }

    /// Records the after-event for an intercepted request.
    pub fn on_after_response(
        &self,
        request: &RequestSnapshot,
        response: &ResponseSnapshot,
        trace: Option<&TraceContext>,
    ) -> TelemetryEvent {
        let event = TelemetryEvent::after_response(&self.inner.identity, request, response)
            .with_operation_id(trace.map(|t| t.trace_id().to_string()));
        self.emit(&event);
        event
    }

    /// Waits until everything queued before this call has been handed to the sink.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.inner.tx.send(Command::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }

    fn emit(&self, event: &TelemetryEvent) {
        let dimensions = &event.custom_dimensions;
        match event.severity {
            Severity::Error => tracing::error!(target: INTERNAL_TARGET, ?dimensions, "{}", event.message),
            Severity::Warning => tracing::warn!(target: INTERNAL_TARGET, ?dimensions, "{}", event.message),
            Severity::Info => tracing::info!(target: INTERNAL_TARGET, ?dimensions, "{}", event.message),
        }
        self.track(event.clone());
    }
}

async fn forward(
    mut rx: mpsc::Receiver<Command>,
    sink: Arc<dyn TelemetrySink>,
    max_batch_size: usize,
    flush_interval: Duration,
) {
    let mut buffer = Vec::with_capacity(max_batch_size);
    let mut ticker = tokio::time::interval(flush_interval);
    // First tick fires immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                deliver(sink.as_ref(), &mut buffer).await;
            }
            command = rx.recv() => match command {
                Some(Command::Track(envelope)) => {
                    buffer.push(*envelope);
                    if buffer.len() >= max_batch_size {
                        deliver(sink.as_ref(), &mut buffer).await;
                    }
                }
                Some(Command::Flush(ack)) => {
                    deliver(sink.as_ref(), &mut buffer).await;
                    let _ = ack.send(());
                }
                None => {
                    deliver(sink.as_ref(), &mut buffer).await;
                    tracing::debug!(target: INTERNAL_TARGET, "Telemetry forwarder stopped");
                    return;
                }
            }
        }
    }
}

async fn deliver(sink: &dyn TelemetrySink, buffer: &mut Vec<Envelope>) {
    if buffer.is_empty() {
        return;
    }
    let batch = std::mem::take(buffer);
    let size = batch.len();

    match sink.deliver(batch).await {
        Ok(()) => metrics::record_batch_delivered(size),
        Err(e) => {
            metrics::record_batch_failed(size);
            tracing::warn!(target: INTERNAL_TARGET, error = %e, size, "Telemetry batch dropped");
        }
    }
}

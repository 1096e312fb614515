//! Telemetry interception and forwarding.
//!
//! # Data Flow
//! ```text
//! Inbound request (http/middleware/telemetry.rs)
//! Outbound call   (http/client.rs)
//! tracing events  (layer.rs)
//!     → snapshot.rs (RequestSnapshot / ResponseSnapshot)
//!     → event.rs / span.rs (TelemetryEvent, RequestSpan, DependencySpan)
//!     → client.rs (identity merge, envelope.rs tag, bounded queue)
//!     → forwarder task (batching)
//!     → sink.rs (ingestion endpoint, memory, null)
//! ```
//!
//! # Design Decisions
//! - One `TelemetryClient` per process, passed explicitly to its users
//! - Identity fields are merged into every event before call-site fields
//! - Every envelope is tagged with the cloud role before delivery
//! - Enrichment is best effort: failures become absent fields

pub mod client;
pub mod connection;
pub mod envelope;
pub mod event;
pub mod identity;
pub mod layer;
pub mod sink;
pub mod snapshot;
pub mod span;

pub use client::{TelemetryClient, TelemetryError, INTERNAL_TARGET};
pub use event::{CustomDimensions, Severity, TelemetryEvent};
pub use identity::ApplicationIdentity;
pub use layer::TelemetryLayer;
pub use sink::{MemorySink, TelemetrySink};
pub use snapshot::{try_parse_json, RequestSnapshot, ResponseSnapshot};
pub use span::{DependencySpan, RequestSpan, TelemetryItem};

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, forwarded by telemetry::layer)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (W3C trace context for correlation)
//!
//! Consumers:
//!     → Console (pretty or JSON)
//!     → Monitoring backend (via telemetry::client)
//!     → Metrics endpoint (optional Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Trace id flows from poller to service through `traceparent`
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
pub mod tracing;

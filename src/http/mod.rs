//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound (health service):
//!     TCP connection
//!     → server.rs (Axum setup, layers)
//!     → middleware/telemetry.rs
//!         → request.rs (capture, re-attach body)
//!         → handler
//!         → response.rs (capture, re-attach body)
//!     → Send to client
//!
//! Outbound (poller):
//!     client.rs (traceparent, capture, dependency span)
//! ```

pub mod client;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use client::{InstrumentedClient, ProbeResponse};
pub use server::HttpServer;

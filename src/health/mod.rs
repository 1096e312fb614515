//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Liveness endpoint (endpoint.rs):
//!     GET /api/v1/status
//!     → telemetry middleware (before-event)
//!     → "Health ok!"
//!     → telemetry middleware (after-event)
//!
//! Active polling (active.rs):
//!     Sleep interval
//!     → GET status endpoint (instrumented client)
//!     → Log outcome, or stop on transport failure
//! ```
//!
//! # Design Decisions
//! - Liveness only: the endpoint never checks dependencies
//! - The poller is sequential and runs until its first unrecovered failure

pub mod active;
pub mod endpoint;

pub use active::{Poller, PollerError};

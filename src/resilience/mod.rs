//! Resilience for outbound calls.
//!
//! # Data Flow
//! ```text
//! Poll attempt fails (transport error)
//!     → retries.rs (attempts left?)
//!     → backoff.rs (exponential delay + jitter)
//!     → next attempt, or the error ends the poll loop
//! ```

pub mod backoff;
pub mod retries;

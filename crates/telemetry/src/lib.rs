//! Telemetry for the log buffer.
//!
//! Structured logging setup plus lock-free counters that sit outside the
//! engine's buffer guard.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::*;
pub use tracing_setup::*;

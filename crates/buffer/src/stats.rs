//! Engine statistics.

use serde::{Deserialize, Serialize};

/// Counters kept under the engine's buffer guard.
///
/// Never reset during the engine's lifetime.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Statistics {
    pub total_processed: u64,
    pub total_written: u64,
    pub total_errors: u64,
}

/// A consistent, point-in-time view of an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Events in the live batch, waiting for the next flush
    pub buffer_size: usize,
    /// Events detached for a flush whose outcome is not yet known
    pub in_flight: usize,
    pub total_processed: u64,
    pub total_written: u64,
    pub total_errors: u64,
    /// Identifier of the sink target
    pub sink: String,
}

impl StatsSnapshot {
    /// Events accepted but not yet durably written.
    pub fn unwritten(&self) -> usize {
        self.buffer_size + self.in_flight
    }
}

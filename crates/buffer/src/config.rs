//! Buffer configuration.

use std::path::PathBuf;
use std::time::Duration;

use engine_core::error::ConfigErrorCode;
use engine_core::limits::DEFAULT_FLUSH_THRESHOLD;
use engine_core::{Error, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BufferConfig {
    /// Buffered event count that triggers an automatic flush
    #[serde(default = "default_flush_threshold")]
    #[validate(range(min = 1))]
    pub flush_threshold: usize,
    /// Path of the append-only log file
    #[serde(default = "default_sink_path")]
    pub sink_path: PathBuf,
    /// Periodic flush interval in milliseconds (0 disables it)
    #[serde(default)]
    pub flush_interval_ms: u64,
}

fn default_flush_threshold() -> usize {
    DEFAULT_FLUSH_THRESHOLD
}

fn default_sink_path() -> PathBuf {
    PathBuf::from("logs.txt")
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            flush_threshold: default_flush_threshold(),
            sink_path: default_sink_path(),
            flush_interval_ms: 0,
        }
    }
}

impl BufferConfig {
    pub fn with_flush_threshold(mut self, flush_threshold: usize) -> Self {
        self.flush_threshold = flush_threshold;
        self
    }

    pub fn with_sink_path(mut self, sink_path: impl Into<PathBuf>) -> Self {
        self.sink_path = sink_path.into();
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval_ms = interval.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Periodic flush interval, if enabled.
    pub fn flush_interval(&self) -> Option<Duration> {
        (self.flush_interval_ms > 0).then(|| Duration::from_millis(self.flush_interval_ms))
    }

    /// Validates the configuration.
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| Error::config(ConfigErrorCode::Invalid, e.to_string()))
    }
}

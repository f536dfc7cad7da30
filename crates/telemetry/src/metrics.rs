//! Lock-free flush metrics.
//!
//! These complement the engine's guarded statistics: they are updated
//! without taking the buffer guard and may lag it slightly.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for flush latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_duration(&self, elapsed: Duration) {
        self.observe(elapsed.as_millis().try_into().unwrap_or(u64::MAX));
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Per-engine flush metrics.
#[derive(Debug, Default)]
pub struct FlushMetrics {
    /// Flushes that handed a non-empty batch to the sink
    pub flushes: Counter,
    /// Flushes whose sink append failed
    pub sink_failures: Counter,
    /// Records dropped because they could not be encoded
    pub encode_failures: Counter,
    /// Bytes accepted by the sink, separators included
    pub bytes_written: Counter,
    pub flush_latency_ms: Histogram,
}

/// A snapshot of flush metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlushMetricsSnapshot {
    pub flushes: u64,
    pub sink_failures: u64,
    pub encode_failures: u64,
    pub bytes_written: u64,
    pub flush_latency_mean_ms: f64,
}

impl FlushMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> FlushMetricsSnapshot {
        FlushMetricsSnapshot {
            flushes: self.flushes.get(),
            sink_failures: self.sink_failures.get(),
            encode_failures: self.encode_failures.get(),
            bytes_written: self.bytes_written.get(),
            flush_latency_mean_ms: self.flush_latency_ms.mean(),
        }
    }
}

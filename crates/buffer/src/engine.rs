//! Buffer engine: validation, batching, and the flush protocol.
//!
//! # Locking
//!
//! One guard (`state`) covers the live batch, the hand-off queue of
//! detached batches, and the statistics. It is held only for appends,
//! detaches, reconciliation, and snapshots, never across sink I/O.
//!
//! A second lock (`lane`) serializes sink writes. A writer takes the lane,
//! then pops the oldest detached batch from the hand-off queue, so batches
//! reach the sink in the order they were detached even when several
//! threads flush at once. Lock order is always `lane` then `state`.
//!
//! # Threshold flushes
//!
//! The `process` call whose append brings the batch to the threshold
//! detaches the whole batch in the same critical section, then performs
//! the write after releasing the guard. Any other producer sees the batch
//! already emptied, so each threshold crossing fires exactly one flush.
//!
//! # Failure reconciliation
//!
//! Records that cannot be encoded are dropped and counted as errors; they
//! are never retried. If the sink append fails, the remaining events go
//! back to the front of the live batch, ahead of anything that arrived
//! during the failed write, so a later retry preserves acceptance order.
//! A batch detached after the failed one may still reach the sink first.

use std::collections::VecDeque;
use std::io;
use std::time::Instant;

use engine_core::error::{ConfigErrorCode, SinkErrorCode};
use engine_core::{encode_record, Error, Event, Result, Value};
use parking_lot::Mutex;
use sink::{FileSink, SinkWriter};
use telemetry::{FlushMetrics, FlushMetricsSnapshot};
use tracing::{debug, error, warn};

use crate::batch::{DetachedBatch, EventBatch};
use crate::config::BufferConfig;
use crate::stats::{Statistics, StatsSnapshot};

/// Failure returned by [`Engine::flush`].
#[derive(Debug, thiserror::Error)]
pub enum FlushError {
    /// The sink rejected the batch. Its encodable events were restored to
    /// the live batch for a later attempt.
    #[error("[SINK_002] append to {target} failed, {restored} events restored: {source}")]
    Sink {
        target: String,
        restored: usize,
        #[source]
        source: io::Error,
    },
}

impl FlushError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Sink { .. } => SinkErrorCode::WriteFailed.code(),
        }
    }

    /// Events put back into the live batch.
    pub fn restored(&self) -> usize {
        match self {
            Self::Sink { restored, .. } => *restored,
        }
    }
}

/// State behind the buffer guard.
#[derive(Debug, Default)]
struct State {
    batch: EventBatch,
    handoff: VecDeque<DetachedBatch>,
    next_seq: u64,
    in_flight: usize,
    stats: Statistics,
}

impl State {
    /// Moves the live batch onto the hand-off queue.
    fn detach(&mut self) {
        let events = self.batch.take();
        if events.is_empty() {
            return;
        }
        self.in_flight += events.len();
        self.handoff.push_back(DetachedBatch {
            seq: self.next_seq,
            events,
        });
        self.next_seq += 1;
    }
}

/// Concurrent batching buffer in front of a sink.
pub struct Engine<S = FileSink> {
    flush_threshold: usize,
    sink: S,
    sink_target: String,
    state: Mutex<State>,
    lane: Mutex<()>,
    metrics: FlushMetrics,
}

impl Engine<FileSink> {
    /// Builds an engine writing to the file named in `config`.
    pub fn open(config: &BufferConfig) -> Result<Self> {
        config.check()?;
        let sink = FileSink::open(&config.sink_path)?;
        Self::new(sink, config.flush_threshold)
    }
}

impl<S: SinkWriter> Engine<S> {
    /// Creates an engine with an empty batch.
    pub fn new(sink: S, flush_threshold: usize) -> Result<Self> {
        Self::with_initial_batch(sink, flush_threshold, Vec::new())
    }

    /// Creates an engine whose batch starts with `initial` events.
    ///
    /// Initial events are not counted as processed.
    pub fn with_initial_batch(sink: S, flush_threshold: usize, initial: Vec<Event>) -> Result<Self> {
        if flush_threshold == 0 {
            return Err(Error::config(
                ConfigErrorCode::InvalidThreshold,
                "flush threshold must be at least 1",
            ));
        }

        let sink_target = sink.target();
        Ok(Self {
            flush_threshold,
            sink,
            sink_target,
            state: Mutex::new(State {
                batch: EventBatch::from_events(initial),
                ..State::default()
            }),
            lane: Mutex::new(()),
            metrics: FlushMetrics::new(),
        })
    }

    pub fn flush_threshold(&self) -> usize {
        self.flush_threshold
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Validates and buffers one event.
    ///
    /// Returns false only when the candidate is not a non-empty mapping.
    /// If the event fills the batch, the batch is flushed before this call
    /// returns; a failure of that flush is recorded in the statistics and
    /// the events stay buffered.
    pub fn process(&self, candidate: impl Into<Value>) -> bool {
        let event = match Event::new(candidate) {
            Ok(event) => event,
            Err(e) => {
                self.state.lock().stats.total_errors += 1;
                debug!(error = %e, "Rejected event");
                return false;
            }
        };

        let triggered = {
            let mut state = self.state.lock();
            state.batch.push(event);
            state.stats.total_processed += 1;
            if state.batch.len() >= self.flush_threshold {
                state.detach();
                true
            } else {
                false
            }
        };

        if triggered {
            // Already logged and counted.
            let _ = self.drain();
        }
        true
    }

    /// Writes the current batch to the sink.
    ///
    /// Returns the number of records the sink accepted in this call, or
    /// [`FlushError::Sink`] if the append failed. A single attempt is made;
    /// callers retry by flushing again.
    pub fn flush(&self) -> std::result::Result<usize, FlushError> {
        {
            let mut state = self.state.lock();
            if state.batch.is_empty() && state.handoff.is_empty() {
                return Ok(0);
            }
            state.detach();
        }
        self.drain()
    }

    /// Flushes until nothing is buffered or queued for writing.
    ///
    /// Stops at the first sink failure, leaving the remaining events
    /// buffered. Returns the total number of records written.
    pub fn flush_all(&self) -> std::result::Result<usize, FlushError> {
        let mut written = 0;
        loop {
            {
                let state = self.state.lock();
                if state.batch.is_empty() && state.handoff.is_empty() {
                    return Ok(written);
                }
            }
            written += self.flush()?;
        }
    }

    /// Consistent snapshot of the counters and batch size.
    pub fn stats(&self) -> StatsSnapshot {
        let state = self.state.lock();
        StatsSnapshot {
            buffer_size: state.batch.len(),
            in_flight: state.in_flight,
            total_processed: state.stats.total_processed,
            total_written: state.stats.total_written,
            total_errors: state.stats.total_errors,
            sink: self.sink_target.clone(),
        }
    }

    /// Number of events in the live batch.
    pub fn buffer_len(&self) -> usize {
        self.state.lock().batch.len()
    }

    pub fn flush_metrics(&self) -> FlushMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Writes the oldest detached batch, if any.
    fn drain(&self) -> std::result::Result<usize, FlushError> {
        let _lane = self.lane.lock();
        let Some(batch) = self.state.lock().handoff.pop_front() else {
            return Ok(0);
        };
        self.write_batch(batch)
    }

    /// Encodes and appends one batch, then reconciles the outcome. Caller
    /// holds the lane.
    fn write_batch(&self, batch: DetachedBatch) -> std::result::Result<usize, FlushError> {
        let start = Instant::now();
        let DetachedBatch { seq, events } = batch;
        let detached = events.len();

        let mut records = Vec::with_capacity(detached);
        let mut encoded = Vec::with_capacity(detached);
        let mut dropped: u64 = 0;

        for event in events {
            match encode_record(&event) {
                Ok(record) => {
                    records.push(record);
                    encoded.push(event);
                }
                Err(e) => {
                    dropped += 1;
                    warn!(seq, error = %e, "Dropping unencodable event");
                }
            }
        }

        self.metrics.flushes.inc();
        self.metrics.encode_failures.inc_by(dropped);

        if records.is_empty() {
            let mut state = self.state.lock();
            state.in_flight -= detached;
            state.stats.total_errors += dropped;
            return Ok(0);
        }

        let outcome = self.sink.append(&records);
        self.metrics.flush_latency_ms.observe_duration(start.elapsed());

        match outcome {
            Ok(bytes) => {
                let written = records.len();
                {
                    let mut state = self.state.lock();
                    state.in_flight -= detached;
                    state.stats.total_written += written as u64;
                    state.stats.total_errors += dropped;
                }
                self.metrics.bytes_written.inc_by(bytes as u64);

                debug!(
                    seq,
                    count = written,
                    dropped,
                    bytes,
                    latency_ms = %start.elapsed().as_millis(),
                    "Flushed batch"
                );
                Ok(written)
            }
            Err(source) => {
                let restored = encoded.len();
                {
                    let mut state = self.state.lock();
                    state.in_flight -= detached;
                    state.batch.restore_front(encoded);
                    state.stats.total_errors += dropped + 1;
                }
                self.metrics.sink_failures.inc();

                error!(
                    seq,
                    target = %self.sink_target,
                    restored,
                    error = %source,
                    "Failed to append batch, events restored"
                );
                Err(FlushError::Sink {
                    target: self.sink_target.clone(),
                    restored,
                    source,
                })
            }
        }
    }
}

impl<S> std::fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("flush_threshold", &self.flush_threshold)
            .field("sink", &self.sink_target)
            .finish_non_exhaustive()
    }
}

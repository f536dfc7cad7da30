//! Periodic background flushing.

use std::sync::Arc;
use std::time::Duration;

use sink::SinkWriter;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

use crate::engine::Engine;

/// Starts a task that flushes `engine` every `interval`.
///
/// Ticks with an empty buffer do nothing. Flushes run on the blocking pool
/// since sink writes are synchronous. A failed flush leaves its events
/// buffered for the next tick. Abort the returned handle to stop the task.
pub fn start_flush_task<S>(engine: Arc<Engine<S>>, interval: Duration) -> tokio::task::JoinHandle<()>
where
    S: SinkWriter + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if engine.buffer_len() == 0 {
                continue;
            }

            let engine = engine.clone();
            match tokio::task::spawn_blocking(move || engine.flush()).await {
                Ok(Ok(count)) => debug!(count, "Periodic flush"),
                Ok(Err(e)) => warn!(error = %e, "Periodic flush failed"),
                Err(e) => error!(error = %e, "Periodic flush task panicked"),
            }
        }
    })
}

//! Batching buffer and flush engine for the log buffer.
//!
//! Producers hand events to [`Engine::process`]; they are buffered under a
//! single guard and written to a [`sink::SinkWriter`] in batches, either
//! when the buffer reaches its threshold or when [`Engine::flush`] is
//! called.

pub mod batch;
pub mod config;
pub mod engine;
pub mod flusher;
pub mod stats;

pub use config::*;
pub use engine::*;
pub use flusher::*;
pub use stats::*;

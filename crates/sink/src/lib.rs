//! Append-only record sinks for the log buffer.

pub mod file;
pub mod writer;

pub use file::FileSink;
pub use writer::SinkWriter;

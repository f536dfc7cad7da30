//! Sink writer abstraction.

use std::io;
use std::sync::Arc;

/// Durable target that accepts encoded records.
///
/// `append` receives every record of one batch, each without its separator,
/// and must write them as a single operation in the given order. It returns
/// the number of bytes written, separators included. The engine never calls
/// `append` concurrently on the same sink.
pub trait SinkWriter: Send + Sync {
    fn append(&self, records: &[Vec<u8>]) -> io::Result<usize>;

    /// Identifier of the durable target, e.g. a file path.
    fn target(&self) -> String;
}

impl<S: SinkWriter + ?Sized> SinkWriter for Arc<S> {
    fn append(&self, records: &[Vec<u8>]) -> io::Result<usize> {
        (**self).append(records)
    }

    fn target(&self) -> String {
        (**self).target()
    }
}

impl<S: SinkWriter + ?Sized> SinkWriter for Box<S> {
    fn append(&self, records: &[Vec<u8>]) -> io::Result<usize> {
        (**self).append(records)
    }

    fn target(&self) -> String {
        (**self).target()
    }
}

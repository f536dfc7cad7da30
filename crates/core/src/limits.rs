//! Limits applied by the record encoder and the buffer defaults.

/// Nesting limit for lists and mappings in an encoded record.
///
/// Matches serde_json's recursion limit on the decode side. A record holds
/// strictly fewer nested containers than this, so every record we write can
/// be read back.
pub const MAX_ENCODE_DEPTH: usize = 128;

/// Default number of buffered events that triggers an automatic flush.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 100;

/// Separator written after every record in the persisted stream.
pub const RECORD_SEPARATOR: u8 = b'\n';

//! Event validation.
//!
//! Only the shape is checked here: a candidate must be a mapping with at
//! least one entry. Whether its values can be encoded is decided later,
//! when the batch is flushed.

use crate::error::{Error, Result, ValidationErrorCode};
use crate::value::Value;

/// Validates a candidate event.
pub fn validate(candidate: &Value) -> Result<()> {
    match candidate.field_count() {
        None => Err(Error::validation(
            ValidationErrorCode::NotAMapping,
            format!("expected a mapping, got {}", candidate.kind()),
        )),
        Some(0) => Err(Error::validation(
            ValidationErrorCode::EmptyMapping,
            "mapping has no entries",
        )),
        Some(_) => Ok(()),
    }
}

/// Pure predicate form of [`validate`].
pub fn is_valid(candidate: &Value) -> bool {
    validate(candidate).is_ok()
}

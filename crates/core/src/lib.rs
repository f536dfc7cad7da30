//! Core types, validation, and record encoding for the log buffer.

pub mod error;
pub mod event;
pub mod limits;
pub mod validation;
pub mod value;

pub use error::{Error, Result};
pub use event::*;
pub use validation::*;
pub use value::*;

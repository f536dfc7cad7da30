//! Unified error types for the log buffer.
//!
//! Error codes:
//! - VALID_001-002: Validation errors
//! - ENC_001-003: Record encoding errors
//! - SINK_001-002: Sink errors
//! - CONFIG_001-002: Configuration errors

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// VALID_001: Candidate is not a mapping
    NotAMapping,
    /// VALID_002: Mapping has no entries
    EmptyMapping,
}

impl ValidationErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAMapping => "VALID_001",
            Self::EmptyMapping => "VALID_002",
        }
    }
}

/// Encoding error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeErrorCode {
    /// ENC_001: Self-referential structure
    Cyclic,
    /// ENC_002: NaN or infinite float
    NonFinite,
    /// ENC_003: Nesting exceeds the encoder depth limit
    TooDeep,
}

impl EncodeErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Cyclic => "ENC_001",
            Self::NonFinite => "ENC_002",
            Self::TooDeep => "ENC_003",
        }
    }
}

/// Sink error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkErrorCode {
    /// SINK_001: Sink target could not be prepared
    Unreachable,
    /// SINK_002: Append to the sink failed
    WriteFailed,
}

impl SinkErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unreachable => "SINK_001",
            Self::WriteFailed => "SINK_002",
        }
    }
}

/// Configuration error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    /// CONFIG_001: Flush threshold must be positive
    InvalidThreshold,
    /// CONFIG_002: Configuration failed validation
    Invalid,
}

impl ConfigErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidThreshold => "CONFIG_001",
            Self::Invalid => "CONFIG_002",
        }
    }
}

/// Unified error type for the log buffer.
#[derive(Debug, Error)]
pub enum Error {
    /// Validation error with code.
    #[error("[{code}] {message}")]
    Validation {
        code: &'static str,
        message: String,
    },

    /// Encoding error with code.
    #[error("[{code}] {message}")]
    Encode {
        code: &'static str,
        message: String,
    },

    /// Sink error with code.
    #[error("[{code}] {message}: {source}")]
    Sink {
        code: &'static str,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error with code.
    #[error("[{code}] {message}")]
    Config {
        code: &'static str,
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error.
    pub fn validation(code: ValidationErrorCode, msg: impl Into<String>) -> Self {
        Self::Validation {
            code: code.code(),
            message: msg.into(),
        }
    }

    /// Create an encoding error.
    pub fn encode(code: EncodeErrorCode, msg: impl Into<String>) -> Self {
        Self::Encode {
            code: code.code(),
            message: msg.into(),
        }
    }

    /// Create a sink error wrapping the underlying I/O failure.
    pub fn sink(code: SinkErrorCode, msg: impl Into<String>, source: std::io::Error) -> Self {
        Self::Sink {
            code: code.code(),
            message: msg.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(code: ConfigErrorCode, msg: impl Into<String>) -> Self {
        Self::Config {
            code: code.code(),
            message: msg.into(),
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Validation { code, .. } => Some(code),
            Self::Encode { code, .. } => Some(code),
            Self::Sink { code, .. } => Some(code),
            Self::Config { code, .. } => Some(code),
            Self::Serialization(_) => None,
        }
    }
}

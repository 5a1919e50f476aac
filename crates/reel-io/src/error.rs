//! Error types for header codec operations.
//!
//! Provides unified error handling for all format codecs.

use std::io;
use thiserror::Error;

/// Header codec error.
#[derive(Debug, Error)]
pub enum IoError {
    /// Stream error: short read/write, seek failure, permission failure.
    /// A header read is all-or-nothing; a truncated header is always an
    /// error, never silently zero-filled.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed numeric or string field.
    #[error("parse error: {0}")]
    Parse(String),

    /// Magic or version not recognized, or an unsupported sub-variant.
    #[error("format error: {0}")]
    Format(String),

    /// Recognized format but an encoding this codec does not implement.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Result type for header codec operations.
pub type IoResult<T> = Result<T, IoError>;

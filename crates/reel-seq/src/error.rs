//! Error types for sequence operations.

use std::io;
use thiserror::Error;

/// Sequence operation error.
#[derive(Debug, Error)]
pub enum SeqError {
    /// Malformed frame number or sequence notation.
    #[error("parse error: {0}")]
    Parse(String),

    /// Directory listing error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for sequence operations.
pub type SeqResult<T> = Result<T, SeqError>;

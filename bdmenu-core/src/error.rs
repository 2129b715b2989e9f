//! Error types for byte-cursor parsing.

use thiserror::Error;

/// Errors raised by the bounds-checked byte cursor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    /// Read past the end of the buffer.
    #[error("Unexpected end of data at offset {offset}: need {needed} bytes, have {available}")]
    UnexpectedEnd {
        /// Cursor position when the read was attempted.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes remaining in the buffer.
        available: usize,
    },
}

/// Result type for byte-cursor operations.
pub type Result<T> = std::result::Result<T, ReaderError>;

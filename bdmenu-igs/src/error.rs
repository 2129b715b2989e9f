//! IGS decoding error types.

use bdmenu_core::ReaderError;
use bdmenu_ts::TsError;
use thiserror::Error;

/// Errors raised while decoding an Interactive Graphics Stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IgsError {
    /// A palette or picture segment arrived before any menu segment, or the
    /// stream ended without one. The menu height selects the palette color
    /// matrix, so nothing can decode without it.
    #[error("No menu segment decoded")]
    MissingMenu,

    /// RLE data disagrees with the picture dimensions.
    #[error("RLE decode mismatch: {0}")]
    DecodeMismatch(String),

    /// A continuation segment named a different picture than the one being
    /// reassembled.
    #[error("Picture continuation for id {actual}, expected {expected}")]
    PictureIdMismatch {
        /// Id of the picture currently reassembling.
        expected: u16,
        /// Id carried by the continuation segment.
        actual: u16,
    },

    /// A menu referenced a window, picture, or palette that does not exist.
    #[error("Dangling {kind} reference: id {id}")]
    DanglingReference {
        /// What kind of object the reference names.
        kind: &'static str,
        /// The unresolved id.
        id: u16,
    },

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(String),

    /// Transport stream demultiplexing failed.
    #[error(transparent)]
    Ts(#[from] TsError),

    /// Bounds-checked read past the end of a segment buffer.
    #[error(transparent)]
    Reader(#[from] ReaderError),

    /// Underlying read failure.
    #[error("I/O error: {0}")]
    Io(String),
}

impl IgsError {
    /// Create an RLE decode mismatch error.
    pub fn decode_mismatch(msg: impl Into<String>) -> Self {
        IgsError::DecodeMismatch(msg.into())
    }

    /// Create a dangling reference error.
    pub fn dangling(kind: &'static str, id: u16) -> Self {
        IgsError::DanglingReference { kind, id }
    }
}

impl From<std::io::Error> for IgsError {
    fn from(err: std::io::Error) -> Self {
        IgsError::Io(err.to_string())
    }
}

/// Result type for IGS operations.
pub type Result<T> = std::result::Result<T, IgsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IgsError::dangling("picture", 7);
        assert_eq!(err.to_string(), "Dangling picture reference: id 7");

        let err = IgsError::PictureIdMismatch {
            expected: 1,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Picture continuation for id 2, expected 1");
    }
}

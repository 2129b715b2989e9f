//! Transport Stream error types.

use bdmenu_core::ReaderError;
use thiserror::Error;

/// Errors raised while demultiplexing a transport stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TsError {
    /// No sync byte found within the scan window; the stream is corrupt.
    #[error("No sync byte (0x47) found within {0} bytes")]
    SyncByteNotFound(usize),

    /// Packet shorter than the fixed transport packet size.
    #[error("Packet too short: expected {expected} bytes, got {actual}")]
    PacketTooShort {
        /// Bytes a full packet requires.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// A packet carried a PID the demuxer has no role for.
    ///
    /// Recoverable: the demuxer skips the packet and the next call
    /// continues from the following one.
    #[error("Unknown PID 0x{0:04X}")]
    UnknownPid(u16),

    /// PES packet did not begin with the 0x000001 start code.
    #[error("Invalid PES start code: 0x{0:06X}")]
    InvalidStartCode(u32),

    /// Reassembled PES payload length disagrees with the declared length.
    #[error("PES length mismatch: declared {declared} bytes, assembled {actual}")]
    PesLengthMismatch {
        /// Length declared in the PES header.
        declared: usize,
        /// Length of the assembled payload.
        actual: usize,
    },

    /// Malformed PES header.
    #[error("Invalid PES packet: {0}")]
    InvalidPes(String),

    /// Malformed PSI section.
    #[error("Invalid PSI table: {0}")]
    InvalidPsi(String),

    /// Malformed Program Association Table.
    #[error("Invalid PAT: {0}")]
    InvalidPat(String),

    /// Malformed Program Map Table.
    #[error("Invalid PMT: {0}")]
    InvalidPmt(String),

    /// PSI section CRC check failed.
    #[error("CRC mismatch: stored 0x{stored:08X}, calculated 0x{calculated:08X}")]
    CrcMismatch {
        /// CRC stored in the section.
        stored: u32,
        /// CRC calculated over the section body.
        calculated: u32,
    },

    /// Underlying read failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Bounds-checked read past the end of a buffer.
    #[error(transparent)]
    Reader(#[from] ReaderError),
}

impl TsError {
    /// Create an invalid PES error.
    pub fn invalid_pes(msg: impl Into<String>) -> Self {
        TsError::InvalidPes(msg.into())
    }

    /// Create an invalid PSI error.
    pub fn invalid_psi(msg: impl Into<String>) -> Self {
        TsError::InvalidPsi(msg.into())
    }

    /// Create an invalid PAT error.
    pub fn invalid_pat(msg: impl Into<String>) -> Self {
        TsError::InvalidPat(msg.into())
    }

    /// Create an invalid PMT error.
    pub fn invalid_pmt(msg: impl Into<String>) -> Self {
        TsError::InvalidPmt(msg.into())
    }

    /// Whether the demuxer remains usable after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TsError::UnknownPid(_))
    }
}

impl From<std::io::Error> for TsError {
    fn from(err: std::io::Error) -> Self {
        TsError::Io(err.to_string())
    }
}

/// Result type for transport stream operations.
pub type Result<T> = std::result::Result<T, TsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TsError::UnknownPid(0x1011);
        assert_eq!(err.to_string(), "Unknown PID 0x1011");

        let err = TsError::PesLengthMismatch {
            declared: 100,
            actual: 96,
        };
        assert_eq!(
            err.to_string(),
            "PES length mismatch: declared 100 bytes, assembled 96"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(TsError::UnknownPid(0x100).is_recoverable());
        assert!(!TsError::SyncByteNotFound(203).is_recoverable());
        assert!(!TsError::InvalidStartCode(0xBADBAD).is_recoverable());
    }
}

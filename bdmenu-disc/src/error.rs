//! Disc-level error types.

use bdmenu_core::ReaderError;
use bdmenu_igs::IgsError;
use thiserror::Error;

/// Errors raised while reading a Blu-ray disc structure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscError {
    /// The path does not look like a mounted Blu-ray disc.
    #[error("Failed to open disc: {0}")]
    DiscOpen(String),

    /// A playlist file could not be read or parsed.
    #[error("Failed to read playlist {playlist_id}: {reason}")]
    PlaylistRead {
        /// Numeric playlist id (the `.mpls` file stem).
        playlist_id: u32,
        /// What went wrong.
        reason: String,
    },

    /// Malformed `index.bdmv`.
    #[error("Invalid index table: {0}")]
    InvalidIndex(String),

    /// Malformed `MovieObject.bdmv`.
    #[error("Invalid movie object file: {0}")]
    InvalidMovieObject(String),

    /// Malformed `.mpls` playlist.
    #[error("Invalid playlist: {0}")]
    InvalidPlaylist(String),

    /// Worker pool initialization failed.
    #[error("Worker pool initialization failed: {0}")]
    WorkerPool(String),

    /// Menu extraction failed.
    #[error(transparent)]
    Igs(#[from] IgsError),

    /// Bounds-checked read past the end of a file buffer.
    #[error(transparent)]
    Reader(#[from] ReaderError),

    /// Underlying read failure.
    #[error("I/O error: {0}")]
    Io(String),
}

impl DiscError {
    /// Create a playlist read error.
    pub fn playlist_read(playlist_id: u32, reason: impl Into<String>) -> Self {
        DiscError::PlaylistRead {
            playlist_id,
            reason: reason.into(),
        }
    }

    /// Create an invalid index error.
    pub fn invalid_index(msg: impl Into<String>) -> Self {
        DiscError::InvalidIndex(msg.into())
    }

    /// Create an invalid movie object error.
    pub fn invalid_mobj(msg: impl Into<String>) -> Self {
        DiscError::InvalidMovieObject(msg.into())
    }

    /// Create an invalid playlist error.
    pub fn invalid_playlist(msg: impl Into<String>) -> Self {
        DiscError::InvalidPlaylist(msg.into())
    }
}

impl From<std::io::Error> for DiscError {
    fn from(err: std::io::Error) -> Self {
        DiscError::Io(err.to_string())
    }
}

/// Result type for disc operations.
pub type Result<T> = std::result::Result<T, DiscError>;

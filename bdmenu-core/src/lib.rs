//! # bdmenu Core
//!
//! Core utilities shared across the bdmenu workspace:
//! - Bounds-checked byte cursor for big-endian binary parsing
//! - Reader error types
//!
//! Blu-ray HDMV structures (transport packets, IGS segments, playlist and
//! index files) are all sequential big-endian binary layouts, so every other
//! crate in the workspace parses through [`ByteReader`].

pub mod error;
pub mod reader;

pub use error::{ReaderError, Result};
pub use reader::ByteReader;

//! # bdmenu
//!
//! Blu-ray HDMV interactive menu extraction.
//!
//! Blu-ray pop-up menus ship as an Interactive Graphics Stream multiplexed
//! into the disc's `.m2ts` clips: a menu tree of pages and buttons, RLE
//! coded button bitmaps, and YCbCr palettes. This crate pulls all of it
//! out, from one clip or from a whole mounted disc, and renders every
//! button picture to a PNG data URI, ready for a host UI to display and
//! serialize as JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! fn main() -> bdmenu::Result<()> {
//!     // One menu clip.
//!     let igs = bdmenu::extract_menu("BDMV/STREAM/00086.m2ts")?;
//!     println!("{} pages", igs.menu.pages.len());
//!
//!     // A whole disc.
//!     let tree = bdmenu::open_disc("/mnt/bluray")?;
//!     println!("{} playlists", tree.playlists.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several crates:
//! - `bdmenu-core`: the bounds-checked big-endian byte cursor and its errors
//! - `bdmenu-ts`: MPEG-TS demultiplexing down to reassembled IGS segments
//! - `bdmenu-igs`: segment decoding, menu tree building, PNG compositing
//! - `bdmenu-disc`: BDMV metadata and the parallel disc scanner
//!
//! This crate re-exports the public types and provides the two high-level
//! entry points.

pub mod prelude;

// Re-export core types
pub use bdmenu_core::{ByteReader, ReaderError};

// Re-export transport stream types
pub use bdmenu_ts::{IgsDemuxer, PesAssembler, Segment, TsError, STREAM_TYPE_HDMV_IGS};

// Re-export IGS types
pub use bdmenu_igs::{
    Bog, Button, ButtonNavigation, ButtonState, Color, Effect, EffectObject, HdmvInstruction,
    IgsError, IgsMenu, Menu, Page, Palette, Picture, RenderedPicture, SegmentProcessor, Window,
    WindowEffect, REF_NONE, SEG_MENU, SEG_PALETTE, SEG_PICTURE,
};

// Re-export disc types
pub use bdmenu_disc::{
    DiscError, DiscHandle, DiscTree, IndexTable, Mark, MovieObject, MovieObjects, PlayItem,
    Playlist, PlaylistEntry, SubPath, SubPlayItem, TitleObject, MAX_WORKERS, NO_OBJECT,
};

/// Result type of the high-level API, using the disc error (the widest in
/// the hierarchy).
pub type Result<T> = std::result::Result<T, DiscError>;

/// Extract the interactive menu from a single `.m2ts` clip.
pub fn extract_menu(path: impl AsRef<std::path::Path>) -> Result<IgsMenu> {
    Ok(bdmenu_igs::extract_menu(path)?)
}

/// Scan a mounted Blu-ray disc into a [`DiscTree`].
pub fn open_disc(root: impl AsRef<std::path::Path>) -> Result<DiscTree> {
    bdmenu_disc::open_disc(root)
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string.
pub fn version() -> &'static str {
    VERSION
}

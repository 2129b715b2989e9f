//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust
//! use bdmenu::prelude::*;
//! ```

// Error and result types
pub use crate::{DiscError, IgsError, ReaderError, Result, TsError};

// High-level API
pub use crate::{extract_menu, open_disc};

// Menu tree types
pub use crate::{
    Bog, Button, ButtonNavigation, ButtonState, Color, Effect, EffectObject, HdmvInstruction,
    IgsMenu, Menu, Page, Palette, RenderedPicture, Window, WindowEffect, REF_NONE,
};

// Disc tree types
pub use crate::{DiscTree, IndexTable, Mark, MovieObjects, PlayItem, PlaylistEntry, TitleObject};

// Stream plumbing
pub use crate::{ByteReader, IgsDemuxer, Segment};

//! # bdmenu IGS
//!
//! HDMV Interactive Graphics Stream decoding: the segment formats that make
//! up a Blu-ray pop-up menu, and a compositor turning them into something a
//! host UI can display.
//!
//! A menu stream interleaves three segment kinds:
//!
//! - **Menu** (`0x18`): the interactive composition — pages, transition
//!   effects, button overlap groups, buttons, navigation commands
//! - **Palette** (`0x14`): YCbCr+alpha color records, converted to RGB with
//!   matrix coefficients chosen by the menu resolution
//! - **Picture** (`0x15`): run-length coded button bitmaps, possibly split
//!   across several segments
//!
//! [`extract_menu`] runs the whole pipeline over an `.m2ts` clip: demux,
//! segment decode, and per-palette PNG rendering of every picture a button
//! references, returned as an [`IgsMenu`] ready for JSON serialization.
//!
//! ```no_run
//! let igs = bdmenu_igs::extract_menu("BDMV/STREAM/00001.m2ts").unwrap();
//! for page in &igs.menu.pages {
//!     println!("page {} with {} buttons", page.id, page.buttons().count());
//! }
//! ```

pub mod command;
pub mod error;
pub mod extract;
pub mod menu;
pub mod palette;
pub mod picture;
pub mod render;

pub use command::HdmvInstruction;
pub use error::{IgsError, Result};
pub use extract::{
    extract_menu, extract_menu_from, SegmentProcessor, SEG_MENU, SEG_PALETTE, SEG_PICTURE,
};
pub use menu::{
    Bog, Button, ButtonNavigation, ButtonState, Effect, EffectObject, Menu, Page, Window,
    WindowEffect, REF_NONE,
};
pub use palette::{Color, Palette};
pub use picture::{decode_rle, Picture, PictureAssembler};
pub use render::{IgsMenu, RenderedPicture};

//! # bdmenu disc
//!
//! Blu-ray disc structure: the BDMV metadata files and a scanner that turns
//! a mounted disc into a navigable tree of playlists with their extracted
//! menus.
//!
//! - [`IndexTable`] — `index.bdmv`: first playback, top menu, titles
//! - [`MovieObjects`] — `MovieObject.bdmv`: HDMV command programs
//! - [`Playlist`] — `.mpls`: clips, marks, and the sub path that names the
//!   menu stream
//! - [`open_disc`] — the whole scan, with per-batch parallel menu
//!   extraction
//!
//! ```no_run
//! let tree = bdmenu_disc::open_disc("/mnt/bluray").unwrap();
//! for playlist in &tree.playlists {
//!     println!(
//!         "{:05}.mpls: {} clips, menu: {}",
//!         playlist.playlist_id,
//!         playlist.clips.len(),
//!         playlist.igs_menu.is_some()
//!     );
//! }
//! ```

pub mod disc;
pub mod error;
pub mod index;
pub mod mobj;
pub mod mpls;

pub use disc::{open_disc, DiscHandle, DiscTree, PlaylistEntry, MAX_WORKERS};
pub use error::{DiscError, Result};
pub use index::{IndexTable, TitleObject, NO_OBJECT};
pub use mobj::{MovieObject, MovieObjects};
pub use mpls::{Mark, PlayItem, Playlist, SubPath, SubPlayItem};

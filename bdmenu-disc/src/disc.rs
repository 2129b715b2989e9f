//! Disc scanning and the batched-parallel menu tree builder.
//!
//! [`open_disc`] walks a mounted BDMV directory: the index table, the movie
//! objects, and every playlist. Playlists are processed in fixed-size
//! batches on a worker pool, one worker per playlist, with a full join
//! between batches; menu extraction (the expensive part, a whole `.m2ts`
//! demux and render) runs without holding the disc lock.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use bdmenu_igs::{extract_menu, IgsMenu};

use crate::error::{DiscError, Result};
use crate::index::{IndexTable, TitleObject};
use crate::mobj::MovieObjects;
use crate::mpls::{Mark, PlayItem, Playlist};

/// Playlists decoded concurrently per batch.
pub const MAX_WORKERS: usize = 15;

/// One playlist's place in the disc tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistEntry {
    /// Numeric playlist id (the `.mpls` file stem).
    pub playlist_id: u32,
    /// Main path clips.
    pub clips: Vec<PlayItem>,
    /// Chapter and link marks.
    pub marks: Vec<Mark>,
    /// The playlist's interactive menu, when it has one and it decoded.
    pub igs_menu: Option<IgsMenu>,
}

/// The full result of scanning one disc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscTree {
    /// Disc name, from the root directory.
    pub disc_name: String,
    /// Playlists ordered by id.
    pub playlists: Vec<PlaylistEntry>,
    /// Object run on disc insertion.
    pub first_play: Option<TitleObject>,
    /// Object run on the top menu key.
    pub top_menu: Option<TitleObject>,
    /// Title number to movie object reference.
    pub title_map: Vec<u32>,
    /// The disc's HDMV command programs.
    pub movie_objects: MovieObjects,
    /// The disc carries BD-J titles; menu extraction was skipped.
    pub bdj_detected: bool,
}

/// An opened disc: the root path, its index table, and a playlist cache.
///
/// The handle is not safe for concurrent use; [`open_disc`] shares one
/// behind a mutex and workers hold the lock only for metadata lookups,
/// never while decoding a menu stream.
#[derive(Debug)]
pub struct DiscHandle {
    root: PathBuf,
    index: IndexTable,
    playlist_cache: BTreeMap<u32, Playlist>,
}

impl DiscHandle {
    /// Open a mounted disc by its root directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let index_path = root.join("BDMV").join("index.bdmv");
        let data = fs::read(&index_path)
            .map_err(|e| DiscError::DiscOpen(format!("{}: {}", index_path.display(), e)))?;
        let index = IndexTable::parse(&data)?;

        Ok(Self {
            root,
            index,
            playlist_cache: BTreeMap::new(),
        })
    }

    /// The disc's index table.
    pub fn index(&self) -> &IndexTable {
        &self.index
    }

    /// Read and parse one playlist, caching the result.
    pub fn playlist(&mut self, playlist_id: u32) -> Result<Playlist> {
        if let Some(playlist) = self.playlist_cache.get(&playlist_id) {
            return Ok(playlist.clone());
        }

        let path = self
            .root
            .join("BDMV")
            .join("PLAYLIST")
            .join(format!("{:05}.mpls", playlist_id));
        let data =
            fs::read(&path).map_err(|e| DiscError::playlist_read(playlist_id, e.to_string()))?;
        let playlist = Playlist::parse(&data)
            .map_err(|e| DiscError::playlist_read(playlist_id, e.to_string()))?;

        self.playlist_cache.insert(playlist_id, playlist.clone());
        Ok(playlist)
    }

    /// Ids of every playlist on the disc, ascending.
    pub fn playlist_ids(&self) -> Result<Vec<u32>> {
        let dir = self.root.join("BDMV").join("PLAYLIST");
        let entries = fs::read_dir(&dir)
            .map_err(|e| DiscError::DiscOpen(format!("{}: {}", dir.display(), e)))?;

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("mpls") {
                continue;
            }
            match path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u32>().ok())
            {
                Some(id) => ids.push(id),
                None => debug!(path = %path.display(), "Skipping non-numeric playlist name"),
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Path of a clip's stream file.
    pub fn stream_path(&self, clip_id: &str) -> PathBuf {
        self.root
            .join("BDMV")
            .join("STREAM")
            .join(format!("{}.m2ts", clip_id))
    }
}

/// Scan a mounted disc into a [`DiscTree`].
///
/// Playlists are processed in batches of [`MAX_WORKERS`]; a playlist whose
/// menu fails to decode degrades to an entry without a menu and never
/// aborts its siblings. When the index table names any BD-J title, menu
/// extraction is skipped for the whole disc.
pub fn open_disc(root: impl AsRef<Path>) -> Result<DiscTree> {
    let root = root.as_ref();
    let handle = DiscHandle::open(root)?;

    let index = handle.index().clone();
    let bdj_detected = index.bdj_detected();
    if bdj_detected {
        warn!("BD-J disc, skipping menu extraction");
    }

    let ids = handle.playlist_ids()?;
    debug!(playlists = ids.len(), "Scanning disc");

    let mobj_path = root.join("BDMV").join("MovieObject.bdmv");
    let movie_objects = MovieObjects::parse(&fs::read(&mobj_path)?)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(MAX_WORKERS)
        .thread_name(|idx| format!("bdmenu-disc-{}", idx))
        .build()
        .map_err(|e| DiscError::WorkerPool(e.to_string()))?;

    let handle = Mutex::new(handle);
    let mut playlists = Vec::with_capacity(ids.len());
    for batch in ids.chunks(MAX_WORKERS) {
        let mut entries: Vec<PlaylistEntry> = pool.install(|| {
            batch
                .par_iter()
                .map(|&id| playlist_entry(&handle, id, bdj_detected))
                .collect()
        });
        playlists.append(&mut entries);
    }
    playlists.sort_unstable_by_key(|entry| entry.playlist_id);

    let disc_name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string());

    Ok(DiscTree {
        disc_name,
        playlists,
        first_play: index.first_play.clone(),
        top_menu: index.top_menu.clone(),
        title_map: index.title_map(),
        movie_objects,
        bdj_detected,
    })
}

/// Build one playlist's entry. Failures degrade, they never propagate.
fn playlist_entry(handle: &Mutex<DiscHandle>, playlist_id: u32, bdj_detected: bool) -> PlaylistEntry {
    // Metadata under the lock, stream decode outside it.
    let looked_up = {
        let mut handle = handle.lock();
        handle.playlist(playlist_id).map(|playlist| {
            let menu_path = playlist.menu_clip_id().map(|clip| handle.stream_path(clip));
            (playlist, menu_path)
        })
    };

    let (playlist, menu_path) = match looked_up {
        Ok(pair) => pair,
        Err(e) => {
            warn!(playlist_id, error = %e, "Skipping unreadable playlist");
            return PlaylistEntry {
                playlist_id,
                clips: Vec::new(),
                marks: Vec::new(),
                igs_menu: None,
            };
        }
    };

    let igs_menu = match menu_path {
        Some(path) if !bdj_detected => match extract_menu(&path) {
            Ok(menu) => Some(menu),
            Err(e) => {
                warn!(playlist_id, path = %path.display(), error = %e, "Menu extraction failed");
                None
            }
        },
        _ => None,
    };

    PlaylistEntry {
        playlist_id,
        clips: playlist.play_items,
        marks: playlist.marks,
        igs_menu,
    }
}

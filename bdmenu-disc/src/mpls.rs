//! `.mpls` playlist parsing.
//!
//! A movie playlist names the clips that play back to back, chapter-style
//! marks, and sub paths. The interactive menu rides on a sub path: the
//! first sub play item of the first sub path names the `.m2ts` clip whose
//! IGS stream carries the menu. A playlist without that chain simply has no
//! menu.

use bdmenu_core::ByteReader;
use serde::Serialize;

use crate::error::{DiscError, Result};

const MPLS_MAGIC: &[u8; 4] = b"MPLS";

/// One main-path clip reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayItem {
    /// 5-character clip id (the `.m2ts`/`.clpi` file stem).
    pub clip_id: String,
    /// Start of playback in 45 kHz ticks.
    pub in_time: u32,
    /// End of playback in 45 kHz ticks.
    pub out_time: u32,
}

/// A chapter or link mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mark {
    /// Mark type (1 = entry mark / chapter, 2 = link point).
    pub mark_type: u8,
    /// Index of the play item the mark falls in.
    pub play_item_ref: u16,
    /// Position in 45 kHz ticks.
    pub timestamp: u32,
    /// Elementary stream the mark points into, or `0xFFFF`.
    pub entry_es_pid: u16,
    /// Duration in 45 kHz ticks, 0 for none.
    pub duration: u32,
}

/// One sub-path clip reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubPlayItem {
    /// 5-character clip id.
    pub clip_id: String,
}

/// An auxiliary presentation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubPath {
    /// Sub path type tag.
    pub sub_path_type: u8,
    /// The path's clips.
    pub sub_play_items: Vec<SubPlayItem>,
}

/// A parsed movie playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Playlist {
    /// Main path clips.
    pub play_items: Vec<PlayItem>,
    /// Auxiliary paths.
    pub sub_paths: Vec<SubPath>,
    /// Chapter and link marks.
    pub marks: Vec<Mark>,
}

impl Playlist {
    /// Parse an `.mpls` file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);

        let magic = reader.read_array::<4>()?;
        if &magic != MPLS_MAGIC {
            return Err(DiscError::invalid_playlist("Missing MPLS signature"));
        }
        let _version = reader.read_array::<4>()?;
        let playlist_start = reader.read_u32()? as usize;
        let mark_start = reader.read_u32()? as usize;

        reader.seek(playlist_start)?;
        let _length = reader.read_u32()?;
        reader.skip(2)?;
        let play_item_count = reader.read_u16()?;
        let sub_path_count = reader.read_u16()?;

        let mut play_items = Vec::with_capacity(play_item_count as usize);
        for _ in 0..play_item_count {
            let length = reader.read_u16()? as usize;
            let mut item = ByteReader::new(reader.read_bytes(length)?);

            let clip_id = read_clip_id(&mut item)?;
            let _codec_id = item.read_array::<4>()?;
            item.skip(3)?; // flags + STC id
            let in_time = item.read_u32()?;
            let out_time = item.read_u32()?;

            play_items.push(PlayItem {
                clip_id,
                in_time,
                out_time,
            });
        }

        let mut sub_paths = Vec::with_capacity(sub_path_count as usize);
        for _ in 0..sub_path_count {
            let length = reader.read_u32()? as usize;
            let mut path = ByteReader::new(reader.read_bytes(length)?);

            path.skip(1)?;
            let sub_path_type = path.read_u8()?;
            path.skip(3)?; // repeat flag + reserved
            let item_count = path.read_u8()?;

            let mut sub_play_items = Vec::with_capacity(item_count as usize);
            for _ in 0..item_count {
                let item_length = path.read_u16()? as usize;
                let mut item = ByteReader::new(path.read_bytes(item_length)?);
                sub_play_items.push(SubPlayItem {
                    clip_id: read_clip_id(&mut item)?,
                });
            }

            sub_paths.push(SubPath {
                sub_path_type,
                sub_play_items,
            });
        }

        reader.seek(mark_start)?;
        let _length = reader.read_u32()?;
        let mark_count = reader.read_u16()?;

        let mut marks = Vec::with_capacity(mark_count as usize);
        for _ in 0..mark_count {
            reader.skip(1)?;
            marks.push(Mark {
                mark_type: reader.read_u8()?,
                play_item_ref: reader.read_u16()?,
                timestamp: reader.read_u32()?,
                entry_es_pid: reader.read_u16()?,
                duration: reader.read_u32()?,
            });
        }

        Ok(Self {
            play_items,
            sub_paths,
            marks,
        })
    }

    /// Clip id of the menu stream, when the playlist carries one.
    ///
    /// The menu clip is the first sub play item of the first sub path; any
    /// missing link means the playlist has no menu.
    pub fn menu_clip_id(&self) -> Option<&str> {
        self.sub_paths
            .first()?
            .sub_play_items
            .first()
            .map(|item| item.clip_id.as_str())
    }

    /// Serialize to `.mpls` bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut items = Vec::new();
        for item in &self.play_items {
            let mut entry = Vec::new();
            entry.extend_from_slice(&clip_id_bytes(&item.clip_id));
            entry.extend_from_slice(b"M2TS");
            entry.extend_from_slice(&[0x00, 0x01, 0x00]);
            entry.extend_from_slice(&item.in_time.to_be_bytes());
            entry.extend_from_slice(&item.out_time.to_be_bytes());
            items.extend_from_slice(&(entry.len() as u16).to_be_bytes());
            items.extend_from_slice(&entry);
        }

        let mut sub_paths = Vec::new();
        for path in &self.sub_paths {
            let mut entry = Vec::new();
            entry.push(0x00);
            entry.push(path.sub_path_type);
            entry.extend_from_slice(&[0x00, 0x00, 0x00]);
            entry.push(path.sub_play_items.len() as u8);
            for item in &path.sub_play_items {
                let mut sub = Vec::new();
                sub.extend_from_slice(&clip_id_bytes(&item.clip_id));
                sub.extend_from_slice(b"M2TS");
                entry.extend_from_slice(&(sub.len() as u16).to_be_bytes());
                entry.extend_from_slice(&sub);
            }
            sub_paths.extend_from_slice(&(entry.len() as u32).to_be_bytes());
            sub_paths.extend_from_slice(&entry);
        }

        let playlist_block_len = 6 + items.len() + sub_paths.len();
        let playlist_start = 40usize;
        let mark_start = playlist_start + 4 + playlist_block_len;

        let mut out = Vec::new();
        out.extend_from_slice(MPLS_MAGIC);
        out.extend_from_slice(b"0200");
        out.extend_from_slice(&(playlist_start as u32).to_be_bytes());
        out.extend_from_slice(&(mark_start as u32).to_be_bytes());
        out.extend_from_slice(&[0u8; 24]); // ext data start + reserved

        out.extend_from_slice(&(playlist_block_len as u32).to_be_bytes());
        out.extend_from_slice(&[0x00, 0x00]);
        out.extend_from_slice(&(self.play_items.len() as u16).to_be_bytes());
        out.extend_from_slice(&(self.sub_paths.len() as u16).to_be_bytes());
        out.extend_from_slice(&items);
        out.extend_from_slice(&sub_paths);

        let mark_block_len = 2 + self.marks.len() * 14;
        out.extend_from_slice(&(mark_block_len as u32).to_be_bytes());
        out.extend_from_slice(&(self.marks.len() as u16).to_be_bytes());
        for mark in &self.marks {
            out.push(0x00);
            out.push(mark.mark_type);
            out.extend_from_slice(&mark.play_item_ref.to_be_bytes());
            out.extend_from_slice(&mark.timestamp.to_be_bytes());
            out.extend_from_slice(&mark.entry_es_pid.to_be_bytes());
            out.extend_from_slice(&mark.duration.to_be_bytes());
        }

        out
    }
}

fn read_clip_id(reader: &mut ByteReader<'_>) -> Result<String> {
    let bytes = reader.read_array::<5>()?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn clip_id_bytes(clip_id: &str) -> [u8; 5] {
    let mut bytes = [b'0'; 5];
    for (dst, src) in bytes.iter_mut().zip(clip_id.bytes()) {
        *dst = src;
    }
    bytes
}

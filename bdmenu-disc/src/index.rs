//! `index.bdmv` parsing.
//!
//! The index table is the disc's entry point: what plays on insert (first
//! playback), what the top menu key jumps to, and one entry per title. Each
//! entry names either an HDMV movie object by number or a BD-J application
//! by name. Any BD-J entry marks the whole disc as BD-J, which menu
//! extraction cannot handle.

use bdmenu_core::ByteReader;
use serde::Serialize;

use crate::error::{DiscError, Result};

const INDX_MAGIC: &[u8; 4] = b"INDX";

/// Sentinel in [`IndexTable::title_map`] for titles without an HDMV object.
pub const NO_OBJECT: u32 = 0xFFFF_FFFF;

/// What an index entry points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TitleObject {
    /// An HDMV movie object, by index into `MovieObject.bdmv`.
    Hdmv {
        /// Movie object number.
        id_ref: u16,
    },
    /// A BD-J application, by 5-character name.
    Bdj {
        /// Application name.
        name: String,
    },
}

impl TitleObject {
    /// HDMV object number, or [`NO_OBJECT`] for BD-J entries.
    pub fn object_ref(&self) -> u32 {
        match self {
            TitleObject::Hdmv { id_ref } => *id_ref as u32,
            TitleObject::Bdj { .. } => NO_OBJECT,
        }
    }
}

/// A parsed `index.bdmv`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexTable {
    /// Object run on disc insertion.
    pub first_play: Option<TitleObject>,
    /// Object run on the top menu key.
    pub top_menu: Option<TitleObject>,
    /// One object per title, in title order.
    pub titles: Vec<TitleObject>,
}

impl IndexTable {
    /// Parse an `index.bdmv` file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);

        let magic = reader.read_array::<4>()?;
        if &magic != INDX_MAGIC {
            return Err(DiscError::invalid_index("Missing INDX signature"));
        }
        let _version = reader.read_array::<4>()?;
        let indexes_start = reader.read_u32()? as usize;

        reader.seek(indexes_start)?;
        let _length = reader.read_u32()?;
        let first_play = parse_object(&mut reader)?;
        let top_menu = parse_object(&mut reader)?;

        let title_count = reader.read_u16()?;
        let mut titles = Vec::with_capacity(title_count as usize);
        for _ in 0..title_count {
            let object = parse_object(&mut reader)?
                .ok_or_else(|| DiscError::invalid_index("Title entry with no object"))?;
            titles.push(object);
        }

        Ok(Self {
            first_play,
            top_menu,
            titles,
        })
    }

    /// Whether any entry is a BD-J application.
    pub fn bdj_detected(&self) -> bool {
        self.first_play
            .iter()
            .chain(self.top_menu.iter())
            .chain(self.titles.iter())
            .any(|object| matches!(object, TitleObject::Bdj { .. }))
    }

    /// Title-number-indexed object references: entry 0 is the top menu,
    /// entries 1.. are the titles. BD-J and absent entries map to
    /// [`NO_OBJECT`].
    pub fn title_map(&self) -> Vec<u32> {
        let mut map = Vec::with_capacity(self.titles.len() + 1);
        map.push(
            self.top_menu
                .as_ref()
                .map_or(NO_OBJECT, TitleObject::object_ref),
        );
        for title in &self.titles {
            map.push(title.object_ref());
        }
        map
    }

    /// Serialize to `index.bdmv` bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let indexes_start = 40usize;
        let length = 12 + 12 + 2 + self.titles.len() * 12;

        let mut out = Vec::new();
        out.extend_from_slice(INDX_MAGIC);
        out.extend_from_slice(b"0200");
        out.extend_from_slice(&(indexes_start as u32).to_be_bytes());
        out.extend_from_slice(&[0u8; 28]); // ext data start + reserved

        out.extend_from_slice(&(length as u32).to_be_bytes());
        serialize_object(&mut out, self.first_play.as_ref());
        serialize_object(&mut out, self.top_menu.as_ref());
        out.extend_from_slice(&(self.titles.len() as u16).to_be_bytes());
        for title in &self.titles {
            serialize_object(&mut out, Some(title));
        }
        out
    }
}

/// Decode one 12-byte index entry.
fn parse_object(reader: &mut ByteReader<'_>) -> Result<Option<TitleObject>> {
    let head = reader.read_u32()?;
    let object_type = (head >> 30) as u8;
    reader.skip(2)?; // playback type + reserved

    match object_type {
        0 => {
            reader.skip(6)?;
            Ok(None)
        }
        1 => {
            let id_ref = reader.read_u16()?;
            reader.skip(4)?;
            Ok(Some(TitleObject::Hdmv { id_ref }))
        }
        2 => {
            let name = reader.read_array::<5>()?;
            reader.skip(1)?;
            Ok(Some(TitleObject::Bdj {
                name: String::from_utf8_lossy(&name).into_owned(),
            }))
        }
        other => Err(DiscError::invalid_index(format!(
            "Unknown object type {}",
            other
        ))),
    }
}

fn serialize_object(out: &mut Vec<u8>, object: Option<&TitleObject>) {
    match object {
        None => out.extend_from_slice(&[0u8; 12]),
        Some(TitleObject::Hdmv { id_ref }) => {
            out.extend_from_slice(&(1u32 << 30).to_be_bytes());
            out.extend_from_slice(&[0x00, 0x00]);
            out.extend_from_slice(&id_ref.to_be_bytes());
            out.extend_from_slice(&[0u8; 4]);
        }
        Some(TitleObject::Bdj { name }) => {
            out.extend_from_slice(&(2u32 << 30).to_be_bytes());
            out.extend_from_slice(&[0x00, 0x00]);
            let mut bytes = [b'0'; 5];
            for (dst, src) in bytes.iter_mut().zip(name.bytes()) {
                *dst = src;
            }
            out.extend_from_slice(&bytes);
            out.push(0x00);
        }
    }
}

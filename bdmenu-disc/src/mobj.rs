//! `MovieObject.bdmv` parsing.
//!
//! Movie objects are the HDMV command programs index entries point at.
//! Each object is a flag triple plus a list of 12-byte instructions, the
//! same encoding buttons carry. Nothing here executes them.

use bdmenu_core::ByteReader;
use bdmenu_igs::HdmvInstruction;
use serde::Serialize;

use crate::error::{DiscError, Result};

const MOBJ_MAGIC: &[u8; 4] = b"MOBJ";

/// One HDMV movie object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieObject {
    /// Playback resumes into this object after a menu call.
    pub resume_intention: bool,
    /// Menu call is masked while this object runs.
    pub menu_call_mask: bool,
    /// Title search is masked while this object runs.
    pub title_search_mask: bool,
    /// The object's command program.
    pub commands: Vec<HdmvInstruction>,
}

/// A parsed `MovieObject.bdmv`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MovieObjects {
    /// Objects in file order; index entries reference them by position.
    pub objects: Vec<MovieObject>,
}

impl MovieObjects {
    /// Parse a `MovieObject.bdmv` file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);

        let magic = reader.read_array::<4>()?;
        if &magic != MOBJ_MAGIC {
            return Err(DiscError::invalid_mobj("Missing MOBJ signature"));
        }
        let _version = reader.read_array::<4>()?;
        reader.skip(32)?; // ext data start + reserved

        let _length = reader.read_u32()?;
        reader.skip(4)?;
        let object_count = reader.read_u16()?;

        let mut objects = Vec::with_capacity(object_count as usize);
        for _ in 0..object_count {
            let flags = reader.read_u16()?;
            let command_count = reader.read_u16()?;

            let mut commands = Vec::with_capacity(command_count as usize);
            for _ in 0..command_count {
                commands.push(HdmvInstruction::parse(&mut reader)?);
            }

            objects.push(MovieObject {
                resume_intention: flags & 0x8000 != 0,
                menu_call_mask: flags & 0x4000 != 0,
                title_search_mask: flags & 0x2000 != 0,
                commands,
            });
        }

        Ok(Self { objects })
    }

    /// Serialize to `MovieObject.bdmv` bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for object in &self.objects {
            let mut flags = 0u16;
            if object.resume_intention {
                flags |= 0x8000;
            }
            if object.menu_call_mask {
                flags |= 0x4000;
            }
            if object.title_search_mask {
                flags |= 0x2000;
            }
            body.extend_from_slice(&flags.to_be_bytes());
            body.extend_from_slice(&(object.commands.len() as u16).to_be_bytes());
            for command in &object.commands {
                body.extend_from_slice(&command.encode());
            }
        }

        let mut out = Vec::new();
        out.extend_from_slice(MOBJ_MAGIC);
        out.extend_from_slice(b"0200");
        out.extend_from_slice(&[0u8; 32]);
        out.extend_from_slice(&((body.len() + 6) as u32).to_be_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&(self.objects.len() as u16).to_be_bytes());
        out.extend_from_slice(&body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdmenu_core::ByteReader as Reader;

    fn sample_command() -> HdmvInstruction {
        let data = [
            0x4A, 0x85, 0x03, 0x11, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x2A,
        ];
        HdmvInstruction::parse(&mut Reader::new(&data)).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let mobj = MovieObjects {
            objects: vec![
                MovieObject {
                    resume_intention: true,
                    menu_call_mask: false,
                    title_search_mask: true,
                    commands: vec![sample_command(), sample_command()],
                },
                MovieObject {
                    resume_intention: false,
                    menu_call_mask: true,
                    title_search_mask: false,
                    commands: Vec::new(),
                },
            ],
        };

        let parsed = MovieObjects::parse(&mobj.serialize()).unwrap();
        assert_eq!(parsed, mobj);
    }

    #[test]
    fn test_bad_signature() {
        assert!(matches!(
            MovieObjects::parse(b"XOBJ0200"),
            Err(DiscError::InvalidMovieObject(_))
        ));
    }
}

//! Segment dispatch and the high-level extraction entry point.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bdmenu_ts::{IgsDemuxer, Segment};
use tracing::{debug, warn};

use crate::error::{IgsError, Result};
use crate::menu::Menu;
use crate::palette::Palette;
use crate::picture::{Picture, PictureAssembler};
use crate::render::{compose, IgsMenu};

/// Palette segment tag.
pub const SEG_PALETTE: u8 = 0x14;

/// Picture (object) segment tag.
pub const SEG_PICTURE: u8 = 0x15;

/// Menu (interactive composition) segment tag.
pub const SEG_MENU: u8 = 0x18;

/// Accumulates decoded segments until the stream ends.
///
/// Dispatch is purely on the tag byte; tags without a decoder are ignored.
/// The menu segment must decode before any palette: its height selects the
/// palette color matrix.
#[derive(Debug, Default)]
pub struct SegmentProcessor {
    menu: Option<Menu>,
    palettes: Vec<Palette>,
    pictures: BTreeMap<u16, Picture>,
    assembler: PictureAssembler,
}

impl SegmentProcessor {
    /// Create an empty processor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one segment into the accumulated state.
    pub fn process(&mut self, segment: &Segment) -> Result<()> {
        match segment.segment_type {
            SEG_MENU => {
                self.menu = Some(Menu::parse(&segment.data)?);
            }
            SEG_PALETTE => {
                let menu = self.menu.as_ref().ok_or(IgsError::MissingMenu)?;
                self.palettes.push(Palette::parse(&segment.data, menu.height)?);
            }
            SEG_PICTURE => {
                if let Some(picture) = self.assembler.add(&segment.data)? {
                    if self.pictures.contains_key(&picture.id) {
                        warn!(picture_id = picture.id, "Duplicate picture id, keeping the latest");
                    }
                    self.pictures.insert(picture.id, picture);
                }
            }
            tag => {
                debug!(tag, "Ignoring unhandled segment type");
            }
        }
        Ok(())
    }

    /// Finish the stream: resolve references and render button pictures.
    pub fn finish(self) -> Result<IgsMenu> {
        let menu = self.menu.ok_or(IgsError::MissingMenu)?;
        compose(menu, self.palettes, &self.pictures)
    }
}

/// Extract the interactive menu from a transport stream reader.
pub fn extract_menu_from(reader: impl Read) -> Result<IgsMenu> {
    let mut demuxer = IgsDemuxer::new(reader);
    let mut processor = SegmentProcessor::new();

    loop {
        match demuxer.next_segment() {
            Ok(Some(segment)) => processor.process(&segment)?,
            Ok(None) => break,
            Err(e) if e.is_recoverable() => {
                debug!(error = %e, "Skipping packet");
            }
            Err(e) => return Err(e.into()),
        }
    }

    processor.finish()
}

/// Extract the interactive menu from an `.m2ts` clip on disk.
pub fn extract_menu(path: impl AsRef<Path>) -> Result<IgsMenu> {
    let file = File::open(path.as_ref())?;
    extract_menu_from(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::testing::{encode_menu, simple_button};
    use crate::picture::testing::{encode_picture, picture_segments};

    fn menu_segment(palette_id: u8, picture_id: u16) -> Segment {
        let data = encode_menu(1920, 1080, palette_id, &[simple_button(1, picture_id)]);
        Segment {
            segment_type: SEG_MENU,
            data,
        }
    }

    fn palette_segment() -> Segment {
        Segment {
            segment_type: SEG_PALETTE,
            data: vec![0x14, 0, 0, 0, 0, 1, 235, 128, 128, 255],
        }
    }

    #[test]
    fn test_full_stream() {
        let mut processor = SegmentProcessor::new();
        processor.process(&menu_segment(0, 7)).unwrap();
        processor.process(&palette_segment()).unwrap();

        let buffer = encode_picture(4, 2, &[1u8; 8]);
        for data in picture_segments(7, &buffer, 2) {
            processor
                .process(&Segment {
                    segment_type: SEG_PICTURE,
                    data,
                })
                .unwrap();
        }

        let igs = processor.finish().unwrap();
        assert_eq!(igs.menu.pages.len(), 1);
        assert_eq!(igs.palettes.len(), 1);
        assert_eq!(igs.pictures.len(), 1);
        assert!(igs.pictures[&7].renders[&0].starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_palette_before_menu() {
        let mut processor = SegmentProcessor::new();
        assert_eq!(
            processor.process(&palette_segment()).unwrap_err(),
            IgsError::MissingMenu
        );
    }

    #[test]
    fn test_no_menu_segment() {
        let processor = SegmentProcessor::new();
        assert_eq!(processor.finish().unwrap_err(), IgsError::MissingMenu);
    }

    #[test]
    fn test_unknown_tag_ignored() {
        let mut processor = SegmentProcessor::new();
        processor
            .process(&Segment {
                segment_type: 0x17,
                data: vec![0x17, 0xAA],
            })
            .unwrap();
    }
}

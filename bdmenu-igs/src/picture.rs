//! Picture segment reassembly and RLE decoding.
//!
//! A picture may span several segments: the first carries the picture id,
//! the declared run-length data size, and a 4-byte width/height header;
//! continuations append raw bytes. Once the declared size has accumulated,
//! the run-length data decodes into one byte of palette color id per pixel.

use bdmenu_core::ByteReader;
use tracing::warn;

use crate::error::{IgsError, Result};

/// A decoded button picture: one palette color id per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    /// Picture id, referenced by button states.
    pub id: u16,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Palette color ids, `width * height` bytes.
    pub data: Vec<u8>,
}

/// Decode a reassembled picture buffer.
///
/// Layout: width (u16), height (u16), then run-length data. The encoding:
/// a nonzero byte is one pixel of that color; `0x00` escapes to a flags
/// byte where bits 5..0 are the run length (extended by one more byte when
/// bit 6 is set) and bit 7 selects an explicit fill color byte (otherwise
/// color 0). A zero run length marks end-of-row and is only valid on an
/// exact row boundary.
///
/// Fewer pixels than `width * height` is fatal; surplus pixels are
/// truncated with a warning.
pub fn decode_rle(id: u16, buffer: &[u8]) -> Result<Picture> {
    let mut reader = ByteReader::new(buffer);
    let width = reader.read_u16()?;
    let height = reader.read_u16()?;
    let expected = width as usize * height as usize;

    let mut data = Vec::with_capacity(expected);
    while !reader.is_empty() {
        let byte = reader.read_u8()?;
        if byte != 0 {
            data.push(byte);
            continue;
        }

        let flags = reader.read_u8()?;
        let mut run = (flags & 0x3F) as usize;
        if flags & 0x40 != 0 {
            run = (run << 8) | reader.read_u8()? as usize;
        }
        let color = if flags & 0x80 != 0 {
            reader.read_u8()?
        } else {
            0
        };

        if run == 0 {
            // End-of-row marker.
            if width == 0 || data.len() % width as usize != 0 {
                return Err(IgsError::decode_mismatch(format!(
                    "End-of-row marker after {} pixels with row width {}",
                    data.len(),
                    width
                )));
            }
            continue;
        }

        data.extend(std::iter::repeat(color).take(run));
    }

    if data.len() < expected {
        return Err(IgsError::decode_mismatch(format!(
            "Picture {}: decoded {} of {} pixels",
            id,
            data.len(),
            expected
        )));
    }
    if data.len() > expected {
        warn!(
            picture_id = id,
            expected,
            decoded = data.len(),
            "Truncating surplus RLE pixels"
        );
        data.truncate(expected);
    }

    Ok(Picture {
        id,
        width,
        height,
        data,
    })
}

/// Reassembles multi-segment pictures.
///
/// The first segment of a picture declares a 24-bit run-length data size;
/// the picture decodes once that many bytes (the width/height header
/// included) have accumulated across the first segment and its
/// continuations.
#[derive(Debug, Default)]
pub struct PictureAssembler {
    picture_id: u16,
    declared: usize,
    buffer: Vec<u8>,
    active: bool,
}

impl PictureAssembler {
    /// Create a new assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one picture segment buffer (tag byte at offset 0).
    ///
    /// Returns the decoded picture once the declared length has
    /// accumulated.
    pub fn add(&mut self, segment: &[u8]) -> Result<Option<Picture>> {
        let mut reader = ByteReader::new(segment);
        reader.skip(3)?;
        let id = reader.read_u16()?;
        reader.skip(1)?;
        let continuation = reader.read_u8()? & 0x80 == 0;

        if continuation {
            if !self.active {
                return Err(IgsError::decode_mismatch(format!(
                    "Continuation for picture {} without a first segment",
                    id
                )));
            }
            if id != self.picture_id {
                return Err(IgsError::PictureIdMismatch {
                    expected: self.picture_id,
                    actual: id,
                });
            }
        } else {
            if self.active {
                warn!(
                    picture_id = self.picture_id,
                    "Dropping incomplete picture, new first segment arrived"
                );
            }
            self.declared = reader.read_u24()? as usize;
            self.picture_id = id;
            self.buffer.clear();
            self.active = true;
        }

        self.buffer.extend_from_slice(reader.rest());

        if self.active && self.buffer.len() >= self.declared {
            self.active = false;
            if self.buffer.len() > self.declared {
                warn!(
                    picture_id = self.picture_id,
                    declared = self.declared,
                    assembled = self.buffer.len(),
                    "Picture data overshot its declared length"
                );
                self.buffer.truncate(self.declared);
            }
            let buffer = std::mem::take(&mut self.buffer);
            return decode_rle(self.picture_id, &buffer).map(Some);
        }
        Ok(None)
    }

    /// Whether a picture is partially reassembled.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

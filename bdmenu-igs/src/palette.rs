//! Palette segment decoding.
//!
//! Palette segments carry 5-byte YCbCr+alpha records. Colors are converted
//! to RGB at decode time with video-range scaling; the matrix coefficients
//! depend on the menu resolution, which is why a palette cannot decode
//! before the menu segment has been seen.

use bdmenu_core::ByteReader;
use serde::Serialize;

use crate::error::Result;

/// BT.709 luma coefficients, used for HD menus (height >= 600).
const BT709: (f64, f64, f64) = (0.2126, 0.7152, 0.0722);

/// BT.601 luma coefficients, used for SD menus.
const BT601: (f64, f64, f64) = (0.299, 0.587, 0.114);

/// One palette entry, already converted to RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    /// Color id, the value RLE picture data indexes with.
    pub id: u8,
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (0 transparent, 255 opaque).
    pub alpha: u8,
}

/// A decoded palette.
///
/// Palettes are kept in stream arrival order; a page's `palette_id` indexes
/// that order. Within a palette, colors are keyed by their `id` field, not
/// by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Palette {
    /// Palette entries in record order.
    pub colors: Vec<Color>,
}

impl Palette {
    /// Decode a palette segment buffer (tag byte at offset 0).
    ///
    /// Skips the 5-byte segment header, then reads 5-byte
    /// `{id, y, cr, cb, alpha}` records until fewer than 5 bytes remain.
    /// `menu_height` selects BT.709 coefficients for HD menus and BT.601
    /// otherwise.
    pub fn parse(data: &[u8], menu_height: u16) -> Result<Self> {
        let (kr, kg, kb) = if menu_height >= 600 { BT709 } else { BT601 };

        let mut reader = ByteReader::new(data);
        reader.skip(5)?;

        let mut colors = Vec::with_capacity(reader.remaining() / 5);
        while reader.remaining() >= 5 {
            let [id, y, cr, cb, alpha] = reader.read_array::<5>()?;
            let (r, g, b) = ycbcr_to_rgb(y, cr, cb, kr, kg, kb);
            colors.push(Color { id, r, g, b, alpha });
        }

        Ok(Self { colors })
    }

    /// Expand into a 256-entry RGBA table keyed by color id.
    ///
    /// Ids without a record stay fully transparent black.
    pub fn color_table(&self) -> [[u8; 4]; 256] {
        let mut table = [[0u8; 4]; 256];
        for color in &self.colors {
            table[color.id as usize] = [color.r, color.g, color.b, color.alpha];
        }
        table
    }
}

/// Video-range YCbCr to RGB with the given luma coefficients.
fn ycbcr_to_rgb(y: u8, cr: u8, cb: u8, kr: f64, kg: f64, kb: f64) -> (u8, u8, u8) {
    let sy = (255.0 / 219.0) * (y as f64 - 16.0);
    let scb = (255.0 / 112.0) * (cb as f64 - 128.0);
    let scr = (255.0 / 112.0) * (cr as f64 - 128.0);

    let r = sy + scr * (1.0 - kr);
    let g = sy - scb * (1.0 - kb) * kb / kg - scr * (1.0 - kr) * kr / kg;
    let b = sy + scb * (1.0 - kb);

    (clamp_channel(r), clamp_channel(g), clamp_channel(b))
}

fn clamp_channel(value: f64) -> u8 {
    (value as i32).clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette_segment(records: &[[u8; 5]]) -> Vec<u8> {
        let mut data = vec![0x14, 0x00, 0x00, 0x00, 0x00];
        for record in records {
            data.extend_from_slice(record);
        }
        data
    }

    #[test]
    fn test_grayscale_endpoints() {
        // Video-range black and white map exactly regardless of the matrix.
        let data = palette_segment(&[[0, 16, 128, 128, 255], [1, 235, 128, 128, 128]]);
        let palette = Palette::parse(&data, 1080).unwrap();

        assert_eq!(palette.colors.len(), 2);
        assert_eq!(
            palette.colors[0],
            Color {
                id: 0,
                r: 0,
                g: 0,
                b: 0,
                alpha: 255
            }
        );
        assert_eq!(
            palette.colors[1],
            Color {
                id: 1,
                r: 255,
                g: 255,
                b: 255,
                alpha: 128
            }
        );
    }

    #[test]
    fn test_matrix_selected_by_height() {
        // Pure Cr excursion: r = 255 * (1 - kr), g clamps to 0, b = 0.
        let data = palette_segment(&[[5, 16, 240, 128, 255]]);

        let sd = Palette::parse(&data, 599).unwrap();
        assert_eq!(sd.colors[0].r, 178); // 255 * (1 - 0.299)
        assert_eq!(sd.colors[0].g, 0);
        assert_eq!(sd.colors[0].b, 0);

        let hd = Palette::parse(&data, 600).unwrap();
        assert_eq!(hd.colors[0].r, 200); // 255 * (1 - 0.2126)
        assert_eq!(hd.colors[0].g, 0);
        assert_eq!(hd.colors[0].b, 0);
    }

    #[test]
    fn test_trailing_partial_record_ignored() {
        let mut data = palette_segment(&[[0, 128, 128, 128, 255]]);
        data.extend_from_slice(&[0x01, 0x02, 0x03]);

        let palette = Palette::parse(&data, 480).unwrap();
        assert_eq!(palette.colors.len(), 1);
    }

    #[test]
    fn test_color_table_keyed_by_id() {
        let data = palette_segment(&[[200, 235, 128, 128, 255]]);
        let palette = Palette::parse(&data, 480).unwrap();

        let table = palette.color_table();
        assert_eq!(table[200], [255, 255, 255, 255]);
        // Unset entries stay transparent.
        assert_eq!(table[0], [0, 0, 0, 0]);
        assert_eq!(table[199], [0, 0, 0, 0]);
    }

    #[test]
    fn test_truncated_header() {
        assert!(Palette::parse(&[0x14, 0x00], 480).is_err());
    }
}

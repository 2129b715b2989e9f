//! Button picture compositing.
//!
//! Every picture a button state references gets rasterized once per palette
//! that displays it: the picture's color ids index the palette's 256-entry
//! RGBA table, the raster encodes as PNG, and the result embeds as a
//! `data:image/png;base64,...` URI ready for a web view. Encodings are
//! memoized per `(picture, palette)` pair.

use std::collections::BTreeMap;
use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, Rgba, RgbaImage};
use serde::Serialize;
use tracing::debug;

use crate::error::{IgsError, Result};
use crate::menu::{Menu, REF_NONE};
use crate::palette::Palette;
use crate::picture::Picture;

/// A picture with its per-palette PNG renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPicture {
    /// Picture id.
    pub id: u16,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Palette index to `data:image/png;base64,...` URI.
    pub renders: BTreeMap<u8, String>,
}

/// The complete extraction result for one menu stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgsMenu {
    /// The menu tree.
    pub menu: Menu,
    /// Palettes in stream arrival order.
    pub palettes: Vec<Palette>,
    /// Rendered button pictures keyed by picture id.
    pub pictures: BTreeMap<u16, RenderedPicture>,
}

/// Rasterize every button picture referenced by the menu.
///
/// Walks all pages and buttons, collecting the six state picture ids of
/// each button. The sentinel `0xFFFF` is skipped; any other id that does
/// not resolve to a decoded picture, or a page palette index past the
/// decoded palettes, is [`IgsError::DanglingReference`].
pub fn compose(
    menu: Menu,
    palettes: Vec<Palette>,
    pictures: &BTreeMap<u16, Picture>,
) -> Result<IgsMenu> {
    let mut rendered: BTreeMap<u16, RenderedPicture> = BTreeMap::new();

    for page in &menu.pages {
        for button in page.buttons() {
            for picture_id in button.picture_ids() {
                if picture_id == REF_NONE {
                    continue;
                }

                let picture = pictures
                    .get(&picture_id)
                    .ok_or(IgsError::dangling("picture", picture_id))?;

                let entry = rendered
                    .entry(picture_id)
                    .or_insert_with(|| RenderedPicture {
                        id: picture.id,
                        width: picture.width,
                        height: picture.height,
                        renders: BTreeMap::new(),
                    });
                if entry.renders.contains_key(&page.palette_id) {
                    continue;
                }

                let palette = palettes
                    .get(page.palette_id as usize)
                    .ok_or(IgsError::dangling("palette", page.palette_id as u16))?;

                debug!(
                    picture_id,
                    palette_id = page.palette_id,
                    "Rendering button picture"
                );
                let uri = render_data_uri(picture, palette)?;
                entry.renders.insert(page.palette_id, uri);
            }
        }
    }

    Ok(IgsMenu {
        menu,
        palettes,
        pictures: rendered,
    })
}

/// Encode one picture through one palette as a PNG data URI.
fn render_data_uri(picture: &Picture, palette: &Palette) -> Result<String> {
    let table = palette.color_table();

    let mut img = RgbaImage::new(picture.width as u32, picture.height as u32);
    for (i, &index) in picture.data.iter().enumerate() {
        let x = (i % picture.width as usize) as u32;
        let y = (i / picture.width as usize) as u32;
        img.put_pixel(x, y, Rgba(table[index as usize]));
    }

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| IgsError::PngEncode(e.to_string()))?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}

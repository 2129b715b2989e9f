//! Menu segment decoding.
//!
//! The menu segment describes the whole interactive composition: pages,
//! their in/out transition effects, button overlap groups (BOGs), buttons
//! with their three visual states, and the navigation commands attached to
//! each button. Picture and window references stay raw ids here; the
//! compositor resolves them later. `0xFFFF` is the "no reference" sentinel
//! and is never resolved.

use bdmenu_core::ByteReader;
use serde::Serialize;
use tracing::debug;

use crate::command::HdmvInstruction;
use crate::error::{IgsError, Result};

/// Sentinel id meaning "no picture / no window / no button".
pub const REF_NONE: u16 = 0xFFFF;

/// A rectangular region effects composite into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    /// Window id.
    pub id: u8,
    /// Left edge in pixels.
    pub x: u16,
    /// Top edge in pixels.
    pub y: u16,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
}

/// One object placed by an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectObject {
    /// Object id.
    pub id: u16,
    /// Referenced window id, or [`REF_NONE`].
    pub window_id: u16,
    /// Horizontal position.
    pub x: u16,
    /// Vertical position.
    pub y: u16,
}

/// One animation step of a page transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Effect {
    /// Duration in 90 kHz ticks.
    pub duration: u32,
    /// Palette index for this step.
    pub palette_id: u8,
    /// Objects placed during this step.
    pub objects: Vec<EffectObject>,
}

/// A page's in or out transition: windows plus the effects drawn in them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WindowEffect {
    /// Windows the effects reference.
    pub windows: Vec<Window>,
    /// Animation steps.
    pub effects: Vec<Effect>,
}

/// Picture ids bounding one button state animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonState {
    /// First picture id, or [`REF_NONE`].
    pub start: u16,
    /// Last picture id, or [`REF_NONE`].
    pub stop: u16,
}

/// Neighboring button ids for directional navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonNavigation {
    /// Button selected on "up".
    pub up: u16,
    /// Button selected on "down".
    pub down: u16,
    /// Button selected on "left".
    pub left: u16,
    /// Button selected on "right".
    pub right: u16,
}

/// A selectable menu button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    /// Button id, the value navigation fields reference.
    pub button_id: u16,
    /// Numeric select value.
    pub value: u16,
    /// Raw flags byte.
    pub flags: u8,
    /// Activates immediately when selected.
    pub auto_action: bool,
    /// Left edge in pixels.
    pub x: u16,
    /// Top edge in pixels.
    pub y: u16,
    /// Directional neighbors.
    pub navigation: ButtonNavigation,
    /// Pictures shown while idle.
    pub normal: ButtonState,
    /// Raw normal-state flags.
    pub normal_flags: u16,
    /// Pictures shown while selected.
    pub selected: ButtonState,
    /// Raw selected-state flags.
    pub selected_flags: u16,
    /// Pictures shown on activation.
    pub activated: ButtonState,
    /// Commands run on activation.
    pub commands: Vec<HdmvInstruction>,
}

impl Button {
    /// All six state picture ids, sentinel included.
    pub fn picture_ids(&self) -> [u16; 6] {
        [
            self.normal.start,
            self.normal.stop,
            self.selected.start,
            self.selected.stop,
            self.activated.start,
            self.activated.stop,
        ]
    }
}

/// Button overlap group: buttons sharing screen space, at most one visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bog {
    /// Button shown by default, or [`REF_NONE`].
    pub default_button: u16,
    /// The group's buttons.
    pub buttons: Vec<Button>,
}

/// One menu page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Page id.
    pub id: u8,
    /// User operation mask.
    pub uo_mask: u64,
    /// Transition played when the page appears.
    pub in_effects: WindowEffect,
    /// Transition played when the page leaves.
    pub out_effects: WindowEffect,
    /// Animation frame rate divider.
    pub framerate_divider: u8,
    /// Button selected when the page appears, or [`REF_NONE`].
    pub default_button: u16,
    /// Button auto-activated when the page appears, or [`REF_NONE`].
    pub default_activated: u16,
    /// Index into the stream's palettes, in arrival order.
    pub palette_id: u8,
    /// Button overlap groups.
    pub bogs: Vec<Bog>,
}

impl Page {
    /// Iterate over every button on the page.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.bogs.iter().flat_map(|bog| bog.buttons.iter())
    }
}

/// A decoded interactive composition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Menu {
    /// Menu width in pixels.
    pub width: u16,
    /// Menu height in pixels.
    pub height: u16,
    /// Menu pages.
    pub pages: Vec<Page>,
}

impl Menu {
    /// Decode a menu segment buffer (tag byte at offset 0).
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        reader.skip(3)?;

        let width = reader.read_u16()?;
        let height = reader.read_u16()?;

        // Byte 15 of the segment carries the stream model bit; when it is
        // clear the composition header also holds timeout values (10 more
        // bytes). Either way the next 3 bytes before the page count are
        // composition state.
        let header_len = if reader.peek_at(8)? & 0x80 != 0 { 9 } else { 19 };
        reader.skip(header_len)?;

        reader.skip(3)?;
        let page_count = reader.read_u8()?;
        debug!(width, height, page_count, "Decoding menu");

        let mut pages = Vec::with_capacity(page_count as usize);
        for _ in 0..page_count {
            pages.push(parse_page(&mut reader)?);
        }

        Ok(Self {
            width,
            height,
            pages,
        })
    }
}

fn parse_page(reader: &mut ByteReader<'_>) -> Result<Page> {
    let id = reader.read_u8()?;
    reader.skip(1)?;
    let uo_mask = reader.read_u64()?;

    let in_effects = parse_window_effect(reader)?;
    let out_effects = parse_window_effect(reader)?;

    let framerate_divider = reader.read_u8()?;
    let default_button = reader.read_u16()?;
    let default_activated = reader.read_u16()?;
    let palette_id = reader.read_u8()?;
    let bog_count = reader.read_u8()?;

    let mut bogs = Vec::with_capacity(bog_count as usize);
    for _ in 0..bog_count {
        bogs.push(parse_bog(reader)?);
    }

    Ok(Page {
        id,
        uo_mask,
        in_effects,
        out_effects,
        framerate_divider,
        default_button,
        default_activated,
        palette_id,
        bogs,
    })
}

fn parse_window_effect(reader: &mut ByteReader<'_>) -> Result<WindowEffect> {
    let window_count = reader.read_u8()?;
    let mut windows = Vec::with_capacity(window_count as usize);
    for _ in 0..window_count {
        windows.push(Window {
            id: reader.read_u8()?,
            x: reader.read_u16()?,
            y: reader.read_u16()?,
            width: reader.read_u16()?,
            height: reader.read_u16()?,
        });
    }

    let effect_count = reader.read_u8()?;
    let mut effects = Vec::with_capacity(effect_count as usize);
    for _ in 0..effect_count {
        let duration = reader.read_u24()?;
        let palette_id = reader.read_u8()?;
        let object_count = reader.read_u8()?;

        let mut objects = Vec::with_capacity(object_count as usize);
        for _ in 0..object_count {
            let object = EffectObject {
                id: reader.read_u16()?,
                window_id: reader.read_u16()?,
                x: reader.read_u16()?,
                y: reader.read_u16()?,
            };
            // Window references resolve within this block only.
            if object.window_id != REF_NONE
                && !windows.iter().any(|w| w.id as u16 == object.window_id)
            {
                return Err(IgsError::dangling("window", object.window_id));
            }
            objects.push(object);
        }

        effects.push(Effect {
            duration,
            palette_id,
            objects,
        });
    }

    Ok(WindowEffect { windows, effects })
}

fn parse_bog(reader: &mut ByteReader<'_>) -> Result<Bog> {
    let default_button = reader.read_u16()?;
    let button_count = reader.read_u8()?;

    let mut buttons = Vec::with_capacity(button_count as usize);
    for _ in 0..button_count {
        buttons.push(parse_button(reader)?);
    }

    Ok(Bog {
        default_button,
        buttons,
    })
}

fn parse_button(reader: &mut ByteReader<'_>) -> Result<Button> {
    let button_id = reader.read_u16()?;
    let value = reader.read_u16()?;
    let flags = reader.read_u8()?;
    let x = reader.read_u16()?;
    let y = reader.read_u16()?;

    let navigation = ButtonNavigation {
        up: reader.read_u16()?,
        down: reader.read_u16()?,
        left: reader.read_u16()?,
        right: reader.read_u16()?,
    };

    let normal = ButtonState {
        start: reader.read_u16()?,
        stop: reader.read_u16()?,
    };
    let normal_flags = reader.read_u16()?;
    let selected = ButtonState {
        start: reader.read_u16()?,
        stop: reader.read_u16()?,
    };
    let selected_flags = reader.read_u16()?;
    let activated = ButtonState {
        start: reader.read_u16()?,
        stop: reader.read_u16()?,
    };

    let command_count = reader.read_u16()?;
    let mut commands = Vec::with_capacity(command_count as usize);
    for _ in 0..command_count {
        commands.push(HdmvInstruction::parse(reader)?);
    }

    Ok(Button {
        button_id,
        value,
        flags,
        auto_action: flags & 0x80 != 0,
        x,
        y,
        navigation,
        normal,
        normal_flags,
        selected,
        selected_flags,
        activated,
        commands,
    })
}


#[cfg(test)]
mod tests {
    use super::testing::{encode_menu, simple_button};
    use super::*;

    #[test]
    fn test_single_page_menu() {
        let buttons = vec![simple_button(1, 4), simple_button(2, REF_NONE)];
        let data = encode_menu(1920, 1080, 3, &buttons);

        let menu = Menu::parse(&data).unwrap();
        assert_eq!(menu.width, 1920);
        assert_eq!(menu.height, 1080);
        assert_eq!(menu.pages.len(), 1);

        let page = &menu.pages[0];
        assert_eq!(page.palette_id, 3);
        assert_eq!(page.default_button, REF_NONE);
        assert_eq!(page.buttons().count(), 2);

        let button = &page.bogs[0].buttons[0];
        assert_eq!(button.button_id, 1);
        assert_eq!(button.normal.start, 4);
        assert_eq!(button.picture_ids(), [4; 6]);
    }

    #[test]
    fn test_long_composition_header() {
        // Clearing the stream model bit stretches the header by 10 bytes,
        // moving the page count from byte 19 to byte 29.
        let mut data = encode_menu(1280, 720, 0, &[]);
        data[15] = 0x00;
        data.splice(16..16, std::iter::repeat(0u8).take(10));

        let menu = Menu::parse(&data).unwrap();
        assert_eq!(menu.pages.len(), 1);
        assert_eq!(menu.pages[0].palette_id, 0);
    }

    #[test]
    fn test_header_byte_offsets() {
        // Hand-built segment with the fixed offsets spelled out: stream
        // model bit at byte 15, page count at byte 19, first page at 20.
        let mut data = vec![0u8; 15];
        data[0] = 0x18;
        data[3..5].copy_from_slice(&1920u16.to_be_bytes());
        data[5..7].copy_from_slice(&1080u16.to_be_bytes());
        data.push(0x80); // byte 15
        data.extend_from_slice(&[0, 0, 0]);
        data.push(1); // page count at byte 19

        data.push(5); // page id
        data.push(0);
        data.extend_from_slice(&0u64.to_be_bytes()); // uo mask
        data.extend_from_slice(&[0, 0]); // empty in effects
        data.extend_from_slice(&[0, 0]); // empty out effects
        data.push(1); // framerate divider
        data.extend_from_slice(&REF_NONE.to_be_bytes());
        data.extend_from_slice(&REF_NONE.to_be_bytes());
        data.push(2); // palette
        data.push(0); // bog count

        let menu = Menu::parse(&data).unwrap();
        assert_eq!((menu.width, menu.height), (1920, 1080));
        assert_eq!(menu.pages.len(), 1);
        assert_eq!(menu.pages[0].id, 5);
        assert_eq!(menu.pages[0].palette_id, 2);
    }

    #[test]
    fn test_window_effect_dangling_reference() {
        let mut data = vec![0x18, 0x00, 0x00];
        data.extend_from_slice(&1920u16.to_be_bytes());
        data.extend_from_slice(&1080u16.to_be_bytes());
        let mut header = [0u8; 9];
        header[8] = 0x80;
        data.extend_from_slice(&header);
        data.extend_from_slice(&[0x00, 0x00, 0x00]);
        data.push(1); // page count

        data.push(0); // page id
        data.push(0);
        data.extend_from_slice(&0u64.to_be_bytes());
        // In effects: one window (id 1), one effect with an object naming
        // window 9.
        data.push(1);
        data.extend_from_slice(&[1, 0, 0, 0, 0, 0, 16, 0, 16]);
        data.push(1);
        data.extend_from_slice(&[0, 0, 0]); // duration
        data.push(0); // palette
        data.push(1); // object count
        data.extend_from_slice(&0u16.to_be_bytes()); // object id
        data.extend_from_slice(&9u16.to_be_bytes()); // window ref
        data.extend_from_slice(&[0, 0, 0, 0]);

        assert_eq!(
            Menu::parse(&data).unwrap_err(),
            IgsError::dangling("window", 9)
        );
    }

    #[test]
    fn test_sentinel_window_reference_allowed() {
        let mut data = vec![0x18, 0x00, 0x00];
        data.extend_from_slice(&1920u16.to_be_bytes());
        data.extend_from_slice(&1080u16.to_be_bytes());
        let mut header = [0u8; 9];
        header[8] = 0x80;
        data.extend_from_slice(&header);
        data.extend_from_slice(&[0x00, 0x00, 0x00]);
        data.push(1);

        data.push(0);
        data.push(0);
        data.extend_from_slice(&0u64.to_be_bytes());
        // In effects: no windows, one object referencing the sentinel.
        data.push(0);
        data.push(1);
        data.extend_from_slice(&[0, 0, 0]);
        data.push(0);
        data.push(1);
        data.extend_from_slice(&0u16.to_be_bytes());
        data.extend_from_slice(&REF_NONE.to_be_bytes());
        data.extend_from_slice(&[0, 0, 0, 0]);
        // Out effects, page tail, no bogs.
        data.extend_from_slice(&[0, 0]);
        data.push(1);
        data.extend_from_slice(&REF_NONE.to_be_bytes());
        data.extend_from_slice(&REF_NONE.to_be_bytes());
        data.push(0);
        data.push(0);

        let menu = Menu::parse(&data).unwrap();
        assert_eq!(menu.pages[0].in_effects.effects[0].objects[0].window_id, REF_NONE);
    }

    #[test]
    fn test_truncated_menu() {
        let data = [0x18, 0x00, 0x00, 0x07, 0x80];
        assert!(matches!(Menu::parse(&data), Err(IgsError::Reader(_))));
    }
}

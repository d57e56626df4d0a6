//! Terminal color representation: default, 256-color indexed, and truecolor.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cell's foreground or background color.
///
/// `Default` means "whatever the renderer's default is" — it is distinct
/// from any concrete color and is what `Style::default()` uses for both
/// channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Color {
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Default for Color {
    fn default() -> Self {
        Color::Default
    }
}

/// Map a 256-color palette index to an RGB triple.
///
/// 0-15 are the standard/bright ANSI colors (here, a fixed reference
/// palette — real renderers typically substitute a theme), 16-231 are a
/// 6x6x6 color cube, and 232-255 are a 24-step grayscale ramp. Used to
/// answer OSC 4 color queries (`CSI 4;<idx>;?`).
pub fn indexed_to_rgb(index: u8) -> (u8, u8, u8) {
    const ANSI16: [(u8, u8, u8); 16] = [
        (0x00, 0x00, 0x00),
        (0xcd, 0x00, 0x00),
        (0x00, 0xcd, 0x00),
        (0xcd, 0xcd, 0x00),
        (0x00, 0x00, 0xee),
        (0xcd, 0x00, 0xcd),
        (0x00, 0xcd, 0xcd),
        (0xe5, 0xe5, 0xe5),
        (0x7f, 0x7f, 0x7f),
        (0xff, 0x00, 0x00),
        (0x00, 0xff, 0x00),
        (0xff, 0xff, 0x00),
        (0x5c, 0x5c, 0xff),
        (0xff, 0x00, 0xff),
        (0x00, 0xff, 0xff),
        (0xff, 0xff, 0xff),
    ];

    match index {
        0..=15 => ANSI16[index as usize],
        16..=231 => {
            let idx = index - 16;
            let r = idx / 36;
            let g = (idx % 36) / 6;
            let b = idx % 6;
            let to_val = |v: u8| if v == 0 { 0 } else { 55 + 40 * v };
            (to_val(r), to_val(g), to_val(b))
        }
        232..=255 => {
            let v = 8 + 10 * (index - 232);
            (v, v, v)
        }
    }
}

//! SGR (Select Graphic Rendition) attribute bitset and parameter decoder.
//!
//! `Style` is an immutable value: two colors plus an attribute bitset. It
//! never mutates in place — `merge_sgr` takes a style by value and returns
//! the updated one, so callers (the Screen's cursor state) simply reassign.

use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::Color;

bitflags! {
    /// Per-cell text attributes as a compact bitflag set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attrs: u16 {
        const BOLD              = 1 << 0;
        const DIM                = 1 << 1;
        const ITALIC             = 1 << 2;
        const UNDERLINE          = 1 << 3;
        const BLINK              = 1 << 4;
        const REVERSE            = 1 << 5;
        const CONCEAL            = 1 << 6;
        const STRIKE             = 1 << 7;
        const DOUBLE_UNDERLINE   = 1 << 8;
    }
}

/// Immutable per-cell text style: foreground, background, and attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attrs,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            attrs: Attrs::empty(),
        }
    }
}

impl Style {
    /// A style carrying only this style's background, with foreground and
    /// attributes reset to default. Used by erase operations, which per
    /// ECMA-48 fill with the *current background* but no other attribute.
    pub fn background_only(self) -> Style {
        Style {
            fg: Color::Default,
            bg: self.bg,
            attrs: Attrs::empty(),
        }
    }
}

/// One SGR sub-command slot as produced by the parameter parser.
///
/// `value` is the slot's own numeric value (`None` for an empty slot, which
/// is treated as `0`). `subparams` holds any colon-separated values attached
/// to this same slot (CSI `38:2:R:G:B` form); it is empty for the
/// semicolon-separated form (CSI `38;2;R;G;B`), where the sub-values instead
/// appear as their own top-level `SgrParam` entries that follow this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SgrParam<'a> {
    pub value: Option<u16>,
    pub subparams: &'a [Option<u16>],
}

impl<'a> SgrParam<'a> {
    pub fn new(value: Option<u16>) -> Self {
        Self {
            value,
            subparams: &[],
        }
    }

    fn val(&self) -> u16 {
        self.value.unwrap_or(0)
    }
}

/// Apply one SGR command (the full parameter list of one `CSI ... m`) to a
/// style, returning the updated style. Unknown codes are ignored; malformed
/// truncations of 38/48 leave the style unchanged from that point and stop
/// processing the rest of that subcommand (but not subsequent ones).
pub fn merge_sgr(style: Style, params: &[SgrParam<'_>]) -> Style {
    if params.is_empty() {
        return merge_sgr(style, &[SgrParam::new(None)]);
    }

    let mut s = style;
    let mut i = 0;
    while i < params.len() {
        let code = params[i].val();
        match code {
            0 => s = Style::default(),
            1 => s.attrs.insert(Attrs::BOLD),
            2 => s.attrs.insert(Attrs::DIM),
            3 => s.attrs.insert(Attrs::ITALIC),
            4 => s.attrs.insert(Attrs::UNDERLINE),
            5 | 6 => s.attrs.insert(Attrs::BLINK),
            7 => s.attrs.insert(Attrs::REVERSE),
            8 => s.attrs.insert(Attrs::CONCEAL),
            9 => s.attrs.insert(Attrs::STRIKE),
            21 => s.attrs.insert(Attrs::DOUBLE_UNDERLINE),
            22 => {
                s.attrs.remove(Attrs::BOLD);
                s.attrs.remove(Attrs::DIM);
            }
            23 => s.attrs.remove(Attrs::ITALIC),
            24 => {
                s.attrs.remove(Attrs::UNDERLINE);
                s.attrs.remove(Attrs::DOUBLE_UNDERLINE);
            }
            25 => s.attrs.remove(Attrs::BLINK),
            27 => s.attrs.remove(Attrs::REVERSE),
            28 => s.attrs.remove(Attrs::CONCEAL),
            29 => s.attrs.remove(Attrs::STRIKE),
            30..=37 => s.fg = Color::Indexed((code - 30) as u8),
            38 => {
                if let Some((color, consumed)) = parse_extended_color(params, i) {
                    s.fg = color;
                    i += consumed;
                } else {
                    break;
                }
            }
            39 => s.fg = Color::Default,
            40..=47 => s.bg = Color::Indexed((code - 40) as u8),
            48 => {
                if let Some((color, consumed)) = parse_extended_color(params, i) {
                    s.bg = color;
                    i += consumed;
                } else {
                    break;
                }
            }
            49 => s.bg = Color::Default,
            // Overlined (53) and not-overlined (55) are accepted but have no
            // bit of their own in `Attrs` — the attribute set only models the
            // nine ECMA-48 attributes this core's screen model renders.
            53 | 55 => {}
            90..=97 => s.fg = Color::Indexed((code - 90 + 8) as u8),
            100..=107 => s.bg = Color::Indexed((code - 100 + 8) as u8),
            _ => {}
        }
        i += 1;
    }
    s
}

/// Parse the `5;N` / `2;R;G;B` (or colon-form `5:N` / `2:R:G:B`) tail that
/// follows a `38` or `48` code, starting at `params[at]` (the 38/48 slot
/// itself). Returns the decoded color and the number of *additional*
/// top-level slots consumed (0 if the colon form kept everything in one
/// slot), or `None` if the tail is truncated/malformed.
fn parse_extended_color(params: &[SgrParam<'_>], at: usize) -> Option<(Color, usize)> {
    let colon = params[at].subparams;
    if !colon.is_empty() {
        // Colon form: 38:5:N or 38:2:R:G:B, all within one top-level slot.
        let mode = colon.first().copied().flatten()?;
        return match mode {
            5 => {
                let n = colon.get(1).copied().flatten()?;
                Some((Color::Indexed(n as u8), 0))
            }
            2 => {
                // Colon form optionally carries a colorspace ID before R;
                // tolerate both 2:R:G:B and 2::R:G:B (skip empty slot).
                let mut rest = &colon[1..];
                if rest.first().copied().flatten().is_none() && rest.len() > 3 {
                    rest = &rest[1..];
                }
                let r = rest.first().copied().flatten()?;
                let g = rest.get(1).copied().flatten()?;
                let b = rest.get(2).copied().flatten()?;
                Some((Color::Rgb(r as u8, g as u8, b as u8), 0))
            }
            _ => None,
        };
    }

    // Semicolon form: the mode and its arguments are separate top-level slots.
    let mode = params.get(at + 1)?.val();
    match mode {
        5 => {
            let n = params.get(at + 2)?.val();
            Some((Color::Indexed(n as u8), 2))
        }
        2 => {
            let r = params.get(at + 2)?.val();
            let g = params.get(at + 3)?.val();
            let b = params.get(at + 4)?.val();
            Some((Color::Rgb(r as u8, g as u8, b as u8), 4))
        }
        _ => None,
    }
}

/// Produce the SGR parameter list that, applied to `a`, yields `b`. Always
/// starts with an explicit reset (`0`) so the result is correct regardless
/// of the starting style — callers that want a minimal diff for a known
/// common ancestor can special-case `a == Style::default()`.
pub fn diff(_a: Style, b: Style) -> Vec<u16> {
    if b == Style::default() {
        return vec![0];
    }

    let mut out = vec![0u16];
    if b.attrs.contains(Attrs::BOLD) {
        out.push(1);
    }
    if b.attrs.contains(Attrs::DIM) {
        out.push(2);
    }
    if b.attrs.contains(Attrs::ITALIC) {
        out.push(3);
    }
    if b.attrs.contains(Attrs::UNDERLINE) {
        out.push(4);
    }
    if b.attrs.contains(Attrs::BLINK) {
        out.push(5);
    }
    if b.attrs.contains(Attrs::REVERSE) {
        out.push(7);
    }
    if b.attrs.contains(Attrs::CONCEAL) {
        out.push(8);
    }
    if b.attrs.contains(Attrs::STRIKE) {
        out.push(9);
    }
    if b.attrs.contains(Attrs::DOUBLE_UNDERLINE) {
        out.push(21);
    }
    match b.fg {
        Color::Default => {}
        Color::Indexed(n) if n < 8 => out.push(30 + n as u16),
        Color::Indexed(n) if n < 16 => out.push(90 + (n - 8) as u16),
        Color::Indexed(n) => out.extend([38, 5, n as u16]),
        Color::Rgb(r, g, b) => out.extend([38, 2, r as u16, g as u16, b as u16]),
    }
    match b.bg {
        Color::Default => {}
        Color::Indexed(n) if n < 8 => out.push(40 + n as u16),
        Color::Indexed(n) if n < 16 => out.push(100 + (n - 8) as u16),
        Color::Indexed(n) => out.extend([48, 5, n as u16]),
        Color::Rgb(r, g, b) => out.extend([48, 2, r as u16, g as u16, b as u16]),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_yields_default() {
        let s = merge_sgr(
            Style {
                fg: Color::Indexed(1),
                bg: Color::Indexed(2),
                attrs: Attrs::BOLD,
            },
            &[SgrParam::new(Some(0))],
        );
        assert_eq!(s, Style::default());
    }

    #[test]
    fn bold_sets_attr() {
        let s = merge_sgr(Style::default(), &[SgrParam::new(Some(1))]);
        assert!(s.attrs.contains(Attrs::BOLD));
    }

    #[test]
    fn basic_fg_indexed() {
        let s = merge_sgr(Style::default(), &[SgrParam::new(Some(31))]);
        assert_eq!(s.fg, Color::Indexed(1));
    }

    #[test]
    fn bright_fg_indexed() {
        let s = merge_sgr(Style::default(), &[SgrParam::new(Some(91))]);
        assert_eq!(s.fg, Color::Indexed(9));
    }

    #[test]
    fn semicolon_rgb_foreground() {
        let s = merge_sgr(
            Style::default(),
            &[
                SgrParam::new(Some(38)),
                SgrParam::new(Some(2)),
                SgrParam::new(Some(255)),
                SgrParam::new(Some(128)),
                SgrParam::new(Some(0)),
            ],
        );
        assert_eq!(s.fg, Color::Rgb(255, 128, 0));
    }

    #[test]
    fn colon_rgb_foreground() {
        let sub = [Some(2), Some(255), Some(128), Some(0)];
        let s = merge_sgr(
            Style::default(),
            &[SgrParam {
                value: Some(38),
                subparams: &sub,
            }],
        );
        assert_eq!(s.fg, Color::Rgb(255, 128, 0));
    }

    #[test]
    fn colon_indexed_background() {
        let sub = [Some(5), Some(17)];
        let s = merge_sgr(
            Style::default(),
            &[SgrParam {
                value: Some(48),
                subparams: &sub,
            }],
        );
        assert_eq!(s.bg, Color::Indexed(17));
    }

    #[test]
    fn truncated_extended_color_is_ignored() {
        // 38;5 with no number: leaves style unchanged, stops this subcommand.
        let s = merge_sgr(
            Style::default(),
            &[SgrParam::new(Some(38)), SgrParam::new(Some(5))],
        );
        assert_eq!(s.fg, Color::Default);
    }

    #[test]
    fn unknown_code_is_ignored_and_parsing_continues() {
        let s = merge_sgr(
            Style::default(),
            &[SgrParam::new(Some(59)), SgrParam::new(Some(1))],
        );
        assert!(s.attrs.contains(Attrs::BOLD));
    }

    #[test]
    fn empty_param_means_zero() {
        let s = merge_sgr(
            Style {
                attrs: Attrs::BOLD,
                ..Style::default()
            },
            &[SgrParam::new(None)],
        );
        assert_eq!(s, Style::default());
    }

    #[test]
    fn diff_round_trips_through_merge_sgr() {
        let target = Style {
            fg: Color::Rgb(10, 20, 30),
            bg: Color::Indexed(5),
            attrs: Attrs::BOLD | Attrs::UNDERLINE,
        };
        let codes = diff(Style::default(), target);
        let params: Vec<SgrParam<'_>> = codes.iter().map(|&c| SgrParam::new(Some(c))).collect();
        let result = merge_sgr(Style::default(), &params);
        assert_eq!(result, target);
    }

    #[test]
    fn merge_sgr_reset_is_total() {
        for attrs in [Attrs::empty(), Attrs::all()] {
            let s = Style {
                fg: Color::Indexed(3),
                bg: Color::Rgb(1, 2, 3),
                attrs,
            };
            assert_eq!(merge_sgr(s, &[SgrParam::new(Some(0))]), Style::default());
        }
    }
}

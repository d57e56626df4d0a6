//! The terminal's atomic display unit: a single Unicode scalar value plus
//! the style it is painted with.

use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::style::Style;

bitflags! {
    /// Per-cell flags unrelated to SGR attributes: wide-character tracking
    /// and soft line-wrap markers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct CellFlags: u8 {
        /// This cell holds the leading column of a 2-column-wide character.
        const WIDE_CHAR   = 1 << 0;
        /// This cell is the trailing spacer column of a wide character.
        const WIDE_SPACER = 1 << 1;
        /// The line soft-wrapped at this cell (set on the last column when
        /// autowrap carried a write onto the next line).
        const WRAP        = 1 << 2;
    }
}

/// A single grid cell: one Unicode scalar value and the style painted under
/// it. No grapheme clustering happens at this layer — a cell is exactly one
/// code point, per the core's data model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    pub c: char,
    pub style: Style,
    pub flags: CellFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            c: ' ',
            style: Style::default(),
            flags: CellFlags::empty(),
        }
    }
}

impl Cell {
    /// The empty cell used to fill newly exposed grid area: (space, default style).
    pub fn blank() -> Self {
        Self::default()
    }

    /// An empty cell carrying `style` — used by erase operations, which
    /// paint with the current background but otherwise reset the cell.
    pub fn erased_with(style: Style) -> Self {
        Self {
            c: ' ',
            style,
            flags: CellFlags::empty(),
        }
    }

    /// The trailing half of a wide character: a blank, non-printing spacer.
    pub fn wide_spacer(style: Style) -> Self {
        Self {
            c: ' ',
            style,
            flags: CellFlags::WIDE_SPACER,
        }
    }
}

//! Cursor position and the style/charset state a write applies.

use crate::charset::CharsetState;
use crate::style::Style;

/// The active cursor: position, current SGR style, and the handful of
/// per-cursor flags that travel with DECSC/DECRC save-restore.
#[derive(Debug, Clone)]
pub struct Cursor {
    pub x: u16,
    pub y: u16,
    pub style: Style,
    pub charset: CharsetState,
    /// DECOM: cursor motion and addressing are relative to the scroll
    /// region's top margin rather than the screen's row 0.
    pub origin_mode: bool,
    /// Set when a printable character lands in the last column with
    /// autowrap enabled; the wrap is deferred until the *next* printable
    /// character arrives, per the "last column" terminal convention.
    pub pending_wrap: bool,
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            style: Style::default(),
            charset: CharsetState::default(),
            origin_mode: false,
            pending_wrap: false,
        }
    }

    /// The subset of cursor state DECSC/DECRC saves and restores: position,
    /// style, charset state, origin mode, and the latched wrap flag — all
    /// six fields the data model's "Saved cursor state" names.
    pub fn to_saved(&self) -> SavedCursor {
        SavedCursor {
            x: self.x,
            y: self.y,
            style: self.style,
            charset: self.charset,
            origin_mode: self.origin_mode,
            pending_wrap: self.pending_wrap,
        }
    }

    pub fn restore(&mut self, saved: &SavedCursor) {
        self.x = saved.x;
        self.y = saved.y;
        self.style = saved.style;
        self.charset = saved.charset;
        self.origin_mode = saved.origin_mode;
        self.pending_wrap = saved.pending_wrap;
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

/// A DECSC snapshot. The primary and alternate buffers each keep their own
/// slot for this — switching screens must not disturb the other screen's
/// saved cursor, which a single shared slot (as some implementations use)
/// would get wrong.
#[derive(Debug, Clone, Copy)]
pub struct SavedCursor {
    pub x: u16,
    pub y: u16,
    pub style: Style,
    pub charset: CharsetState,
    pub origin_mode: bool,
    pub pending_wrap: bool,
}

impl Default for SavedCursor {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            style: Style::default(),
            charset: CharsetState::default(),
            origin_mode: false,
            pending_wrap: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_restore_round_trip() {
        let mut cursor = Cursor::new();
        cursor.x = 5;
        cursor.y = 3;
        cursor.origin_mode = true;
        cursor.pending_wrap = true;

        let saved = cursor.to_saved();
        cursor.x = 0;
        cursor.y = 0;
        cursor.origin_mode = false;

        cursor.restore(&saved);
        assert_eq!(cursor.x, 5);
        assert_eq!(cursor.y, 3);
        assert!(cursor.origin_mode);
        assert!(cursor.pending_wrap, "pending_wrap is part of the saved snapshot");
    }
}

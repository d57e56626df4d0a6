//! Terminal mode storage: a sparse map from mode number to its boolean
//! state, with typed accessors layered over the handful of modes the
//! screen model actually branches on.
//!
//! A dense struct-of-bools (the more ergonomic choice) can't represent
//! "this mode was never mentioned" versus "this mode was explicitly reset,"
//! and silently drops any mode nobody thought to add a field for. Modeling
//! modes as a map instead means an unrecognized `CSI ? 2026 h` is stored and
//! will echo back correctly from DECRPM even though this crate never acts
//! on it.

use std::collections::HashMap;

/// The two mode numbering spaces a parameter can live in: plain ANSI mode
/// numbers (`CSI Pn h`) and DEC-private mode numbers (`CSI ? Pn h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Ansi,
    Dec,
}

pub type ModeId = (Namespace, u16);

// Well-known mode numbers, named for readability at call sites.
pub const IRM: ModeId = (Namespace::Ansi, 4);
pub const LNM: ModeId = (Namespace::Ansi, 20);

pub const DECCKM: ModeId = (Namespace::Dec, 1);
pub const DECCOLM: ModeId = (Namespace::Dec, 3);
pub const DECSCNM: ModeId = (Namespace::Dec, 5);
pub const DECOM: ModeId = (Namespace::Dec, 6);
pub const DECAWM: ModeId = (Namespace::Dec, 7);
pub const DECTCEM: ModeId = (Namespace::Dec, 25);
pub const X10_MOUSE: ModeId = (Namespace::Dec, 9);
pub const VT200_MOUSE: ModeId = (Namespace::Dec, 1000);
pub const BTN_EVENT_MOUSE: ModeId = (Namespace::Dec, 1002);
pub const ANY_EVENT_MOUSE: ModeId = (Namespace::Dec, 1003);
pub const FOCUS_EVENT: ModeId = (Namespace::Dec, 1004);
pub const UTF8_MOUSE: ModeId = (Namespace::Dec, 1005);
pub const SGR_MOUSE: ModeId = (Namespace::Dec, 1006);
pub const ALT_SCREEN_47: ModeId = (Namespace::Dec, 47);
pub const ALT_SCREEN_1047: ModeId = (Namespace::Dec, 1047);
pub const SAVE_CURSOR: ModeId = (Namespace::Dec, 1048);
pub const ALT_SCREEN_BUF: ModeId = (Namespace::Dec, 1049);
pub const BRACKETED_PASTE: ModeId = (Namespace::Dec, 2004);
pub const SYNCHRONIZED_OUTPUT: ModeId = (Namespace::Dec, 2026);

/// Sparse mode table. `get` defaults to `false` for any mode never set,
/// matching every real terminal's power-on state.
#[derive(Debug, Clone, Default)]
pub struct Modes {
    set: HashMap<ModeId, bool>,
}

impl Modes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ModeId) -> bool {
        self.set.get(&id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, id: ModeId, value: bool) {
        self.set.insert(id, value);
    }

    /// Whether `id` has ever been explicitly set or reset, regardless of
    /// its current value — DECRPM reports "not recognized" (value 0)
    /// rather than "reset" (value 2) for modes that have never appeared.
    pub fn is_known(&self, id: ModeId) -> bool {
        self.set.contains_key(&id)
    }

    pub fn decckm(&self) -> bool {
        self.get(DECCKM)
    }
    pub fn deccolm(&self) -> bool {
        self.get(DECCOLM)
    }
    pub fn decscnm(&self) -> bool {
        self.get(DECSCNM)
    }
    pub fn decom(&self) -> bool {
        self.get(DECOM)
    }
    pub fn decawm(&self) -> bool {
        self.get(DECAWM)
    }
    pub fn dectcem(&self) -> bool {
        // Cursor visibility defaults to shown; it's only ever hidden by an
        // explicit reset, so treat "never set" as visible.
        !self.set.contains_key(&DECTCEM) || self.get(DECTCEM)
    }
    pub fn irm(&self) -> bool {
        self.get(IRM)
    }
    pub fn lnm(&self) -> bool {
        self.get(LNM)
    }
    pub fn bracketed_paste(&self) -> bool {
        self.get(BRACKETED_PASTE)
    }
    pub fn focus_event(&self) -> bool {
        self.get(FOCUS_EVENT)
    }
    pub fn synchronized_output(&self) -> bool {
        self.get(SYNCHRONIZED_OUTPUT)
    }

    /// Any of the three mouse-tracking enable modes (X10, VT200 button
    /// event, or any-event) is active.
    pub fn mouse_tracking_enabled(&self) -> bool {
        self.get(X10_MOUSE) || self.get(VT200_MOUSE) || self.get(BTN_EVENT_MOUSE) || self.get(ANY_EVENT_MOUSE)
    }

    pub fn mouse_any_event(&self) -> bool {
        self.get(ANY_EVENT_MOUSE)
    }

    pub fn mouse_button_event(&self) -> bool {
        self.get(BTN_EVENT_MOUSE)
    }

    pub fn mouse_sgr_encoding(&self) -> bool {
        self.get(SGR_MOUSE)
    }

    pub fn mouse_utf8_encoding(&self) -> bool {
        self.get(UTF8_MOUSE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_mode_defaults_false() {
        let modes = Modes::new();
        assert!(!modes.decawm());
        assert!(!modes.is_known(DECAWM));
    }

    #[test]
    fn unknown_mode_roundtrips() {
        let mut modes = Modes::new();
        let unknown: ModeId = (Namespace::Dec, 99999);
        modes.set(unknown, true);
        assert!(modes.get(unknown));
        assert!(modes.is_known(unknown));
    }

    #[test]
    fn cursor_visible_by_default() {
        let modes = Modes::new();
        assert!(modes.dectcem());
    }
}

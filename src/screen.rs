//! `Screen`: the single mutation point for terminal state. Owns the
//! primary and alternate buffers, the cursor, modes, and tab stops, and
//! implements [`Perform`] so a [`crate::parser::Parser`] can drive it
//! directly from a raw byte stream.

use unicode_width::UnicodeWidthChar;

use crate::buffer::Buffer;
use crate::cell::{Cell, CellFlags};
use crate::charset::Slot;
use crate::color::Color;
use crate::cursor::{Cursor, SavedCursor};
use crate::modes::{self, Modes, Namespace};
use crate::parser::params::Param;
use crate::parser::Perform;
use crate::response::ResponseQueue;
use crate::style::{merge_sgr, SgrParam, Style};

fn p(params: &[Param], index: usize) -> Option<u16> {
    params.get(index).and_then(|p| p.value)
}

fn p_or(params: &[Param], index: usize, default: u16) -> u16 {
    match p(params, index) {
        Some(0) | None => default,
        Some(v) => v,
    }
}

/// A fixed-size rectangle of `Cell`s zero-dimensions cannot describe; used
/// to reject `resize(0, _)`/`resize(_, 0)` as the screen model's one
/// fallible operation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResizeError {
    #[error("screen dimensions must be non-zero, got {cols}x{rows}")]
    ZeroDimension { cols: u16, rows: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DcsAction {
    None,
    Decrqss,
}

/// The complete, embeddable terminal screen model.
pub struct Screen {
    primary: Buffer,
    alternate: Buffer,
    using_alt: bool,
    cursor: Cursor,
    saved_primary: SavedCursor,
    saved_alt: SavedCursor,
    modes: Modes,
    scroll_top: u16,
    scroll_bottom: u16,
    tab_stops: Vec<bool>,
    title: String,
    responses: ResponseQueue,
    dirty_all: bool,
    dcs_intermediates: Vec<u8>,
    dcs_action: DcsAction,
    dcs_buffer: Vec<u8>,
    last_printed_char: Option<char>,
}

impl Screen {
    pub fn new(cols: u16, rows: u16) -> Result<Self, ResizeError> {
        if cols == 0 || rows == 0 {
            return Err(ResizeError::ZeroDimension { cols, rows });
        }
        let mut tab_stops = vec![false; cols as usize];
        let mut i = 0;
        while i < tab_stops.len() {
            tab_stops[i] = true;
            i += 8;
        }
        let mut modes = Modes::new();
        modes.set(modes::DECAWM, true);
        Ok(Self {
            primary: Buffer::new(cols, rows),
            alternate: Buffer::new(cols, rows),
            using_alt: false,
            cursor: Cursor::new(),
            saved_primary: SavedCursor::default(),
            saved_alt: SavedCursor::default(),
            modes,
            scroll_top: 0,
            scroll_bottom: rows - 1,
            tab_stops,
            title: String::new(),
            responses: ResponseQueue::new(),
            dirty_all: false,
            dcs_intermediates: Vec::new(),
            dcs_action: DcsAction::None,
            dcs_buffer: Vec::new(),
            last_printed_char: None,
        })
    }

    pub fn cols(&self) -> u16 {
        self.buffer().cols()
    }

    pub fn rows(&self) -> u16 {
        self.buffer().rows()
    }

    pub fn cursor_position(&self) -> (u16, u16) {
        (self.cursor.x, self.cursor.y)
    }

    pub fn cell(&self, x: u16, y: u16) -> Cell {
        self.buffer().get(x, y)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    pub fn in_alt_screen(&self) -> bool {
        self.using_alt
    }

    pub fn take_responses(&mut self) -> Vec<Vec<u8>> {
        self.responses.take()
    }

    /// Collect and clear the dirty flag of every row touched since the
    /// last call, for a renderer that wants to repaint incrementally
    /// rather than re-read the whole grid every frame.
    pub fn take_dirty_rows(&mut self) -> Vec<(u16, crate::buffer::Row)> {
        if self.dirty_all {
            self.buffer_mut().mark_all_dirty();
            self.dirty_all = false;
        }
        self.buffer_mut().take_dirty()
    }

    fn buffer(&self) -> &Buffer {
        if self.using_alt {
            &self.alternate
        } else {
            &self.primary
        }
    }

    fn buffer_mut(&mut self) -> &mut Buffer {
        if self.using_alt {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    /// Resize both buffers to `(cols, rows)`. Tab stops reset to the
    /// default every-8-columns pattern and the scroll region resets to the
    /// full screen — a resized terminal has no principled way to keep
    /// either meaningful, so this mirrors DEC hardware's own behavior on
    /// a column-mode change.
    pub fn resize(&mut self, cols: u16, rows: u16) -> Result<(), ResizeError> {
        if cols == 0 || rows == 0 {
            return Err(ResizeError::ZeroDimension { cols, rows });
        }
        let style = self.cursor.style;
        self.primary.resize(cols, rows, style);
        self.alternate.resize(cols, rows, style);
        self.scroll_top = 0;
        self.scroll_bottom = rows - 1;
        self.tab_stops = vec![false; cols as usize];
        let mut i = 0;
        while i < self.tab_stops.len() {
            self.tab_stops[i] = true;
            i += 8;
        }
        self.cursor.x = self.cursor.x.min(cols - 1);
        self.cursor.y = self.cursor.y.min(rows - 1);
        self.cursor.pending_wrap = false;
        self.dirty_all = true;
        Ok(())
    }

    fn region(&self) -> (u16, u16) {
        (self.scroll_top, self.scroll_bottom)
    }

    /// The row the cursor is logically addressed from: row 0 normally, or
    /// the scroll region's top margin under DECOM.
    fn origin_row(&self) -> u16 {
        if self.cursor.origin_mode {
            self.scroll_top
        } else {
            0
        }
    }

    fn clamp_y_for_origin(&self, y: u16) -> u16 {
        if self.cursor.origin_mode {
            (self.scroll_top + y).min(self.scroll_bottom)
        } else {
            y.min(self.rows() - 1)
        }
    }

    fn move_cursor_to(&mut self, x: u16, y: u16) {
        self.cursor.x = x.min(self.cols() - 1);
        self.cursor.y = y;
        self.cursor.pending_wrap = false;
    }

    fn scroll_up_region(&mut self, n: u16) {
        let (top, bottom) = self.region();
        let style = self.cursor.style.background_only();
        self.buffer_mut().scroll_up(top, bottom, n, style);
        self.dirty_all = true;
    }

    fn scroll_down_region(&mut self, n: u16) {
        let (top, bottom) = self.region();
        let style = self.cursor.style.background_only();
        self.buffer_mut().scroll_down(top, bottom, n, style);
        self.dirty_all = true;
    }

    fn line_feed(&mut self) {
        if self.cursor.y == self.scroll_bottom {
            self.scroll_up_region(1);
        } else if self.cursor.y < self.rows() - 1 {
            self.cursor.y += 1;
        }
        self.cursor.pending_wrap = false;
    }

    fn reverse_line_feed(&mut self) {
        if self.cursor.y == self.scroll_top {
            self.scroll_down_region(1);
        } else if self.cursor.y > 0 {
            self.cursor.y -= 1;
        }
        self.cursor.pending_wrap = false;
    }

    fn carriage_return(&mut self) {
        self.cursor.x = 0;
        self.cursor.pending_wrap = false;
    }

    fn backspace(&mut self) {
        if self.cursor.x > 0 {
            self.cursor.x -= 1;
        }
        self.cursor.pending_wrap = false;
    }

    fn tab_forward(&mut self) {
        let mut x = self.cursor.x + 1;
        while (x as usize) < self.tab_stops.len() && !self.tab_stops[x as usize] {
            x += 1;
        }
        self.cursor.x = x.min(self.cols() - 1);
    }

    /// CHT (`CSI Ps I`): advance `n` tab stops forward.
    fn tab_forward_n(&mut self, n: u16) {
        for _ in 0..n {
            self.tab_forward();
        }
        self.cursor.pending_wrap = false;
    }

    /// CBT (`CSI Ps Z`): move back `n` tab stops.
    fn tab_backward_n(&mut self, n: u16) {
        for _ in 0..n {
            if self.cursor.x == 0 {
                break;
            }
            let mut x = self.cursor.x - 1;
            while x > 0 && !self.tab_stops[x as usize] {
                x -= 1;
            }
            self.cursor.x = x;
        }
        self.cursor.pending_wrap = false;
    }

    /// Write one already-translated printable character at the cursor,
    /// handling wide characters, pending autowrap, and insert mode.
    fn write_char(&mut self, c: char) {
        let width = UnicodeWidthChar::width(c).unwrap_or(1).max(1) as u16;

        if self.cursor.pending_wrap {
            if self.modes.get(modes::DECAWM) {
                let y = self.cursor.y;
                let last_x = self.cols() - 1;
                let mut cell = self.buffer().get(last_x, y);
                cell.flags |= CellFlags::WRAP;
                self.buffer_mut().set(last_x, y, cell);
                self.carriage_return();
                self.line_feed();
            } else {
                self.cursor.x = self.cols() - 1;
            }
            self.cursor.pending_wrap = false;
        }

        if self.modes.get(modes::IRM) {
            self.buffer_mut()
                .insert_cells(self.cursor.x, self.cursor.y, width, self.cursor.style);
        }

        let style = self.cursor.style;
        let x = self.cursor.x;
        let y = self.cursor.y;

        if width == 2 && x + 1 < self.cols() {
            self.buffer_mut().set(
                x,
                y,
                Cell { c, style, flags: CellFlags::WIDE_CHAR },
            );
            self.buffer_mut().set(x + 1, y, Cell::wide_spacer(style));
        } else {
            self.buffer_mut().set(x, y, Cell { c, style, flags: CellFlags::empty() });
        }

        let advance = width.max(1);
        if x + advance >= self.cols() {
            self.cursor.x = self.cols() - 1;
            self.cursor.pending_wrap = true;
        } else {
            self.cursor.x += advance;
        }
    }

    fn erase_in_display(&mut self, mode: u16) {
        let style = self.cursor.style.background_only();
        let (cols, rows) = (self.cols(), self.rows());
        match mode {
            0 => {
                self.buffer_mut().clear_region(self.cursor.x, self.cursor.y, cols, self.cursor.y, style);
                if self.cursor.y + 1 < rows {
                    self.buffer_mut().clear_region(0, self.cursor.y + 1, cols, rows - 1, style);
                }
            }
            1 => {
                if self.cursor.y > 0 {
                    self.buffer_mut().clear_region(0, 0, cols, self.cursor.y - 1, style);
                }
                self.buffer_mut().clear_region(0, self.cursor.y, self.cursor.x + 1, self.cursor.y, style);
            }
            2 => {
                self.buffer_mut().clear_region(0, 0, cols, rows - 1, style);
            }
            3 => {
                self.buffer_mut().clear_region(0, 0, cols, rows - 1, style);
                self.buffer_mut().clear_scrollback();
            }
            _ => {}
        }
        self.dirty_all = true;
    }

    fn erase_in_line(&mut self, mode: u16) {
        let style = self.cursor.style.background_only();
        let cols = self.cols();
        let y = self.cursor.y;
        match mode {
            0 => self.buffer_mut().clear_region(self.cursor.x, y, cols, y, style),
            1 => self.buffer_mut().clear_region(0, y, self.cursor.x + 1, y, style),
            2 => self.buffer_mut().clear_region(0, y, cols, y, style),
            _ => {}
        }
    }

    fn set_mode(&mut self, id: modes::ModeId, value: bool) {
        match id {
            modes::ALT_SCREEN_BUF => self.set_alt_screen(value, true),
            modes::ALT_SCREEN_1047 | modes::ALT_SCREEN_47 => self.set_alt_screen(value, false),
            modes::SAVE_CURSOR => {
                if value {
                    self.save_cursor();
                } else {
                    self.restore_cursor();
                }
            }
            modes::DECCOLM => {
                let target_cols = if value { 132 } else { 80 };
                let rows = self.rows();
                // xterm clears and homes on DECCOLM even if the column
                // count doesn't change, so this is unconditional.
                let _ = self.resize(target_cols, rows);
                let style = self.cursor.style.background_only();
                let cols = self.cols();
                self.buffer_mut().clear_region(0, 0, cols, rows - 1, style);
                self.cursor.x = 0;
                self.cursor.y = 0;
                self.cursor.pending_wrap = false;
            }
            modes::DECOM => {
                self.cursor.origin_mode = value;
                let y = self.origin_row();
                self.move_cursor_to(0, y);
            }
            _ => {}
        }
        self.modes.set(id, value);
    }

    fn current_saved_mut(&mut self) -> &mut SavedCursor {
        if self.using_alt {
            &mut self.saved_alt
        } else {
            &mut self.saved_primary
        }
    }

    fn save_cursor(&mut self) {
        let saved = self.cursor.to_saved();
        *self.current_saved_mut() = saved;
    }

    fn restore_cursor(&mut self) {
        let saved = *self.current_saved_mut();
        self.cursor.restore(&saved);
        self.cursor.x = self.cursor.x.min(self.cols() - 1);
        self.cursor.y = self.cursor.y.min(self.rows() - 1);
    }

    /// Switch to/from the alternate screen buffer. `save_restore_cursor`
    /// distinguishes mode 1049 (save cursor + clear on entry, restore
    /// cursor on exit) from the plain mode 47 (buffer swap only).
    fn set_alt_screen(&mut self, enable: bool, save_restore_cursor: bool) {
        if enable == self.using_alt {
            return;
        }
        if enable {
            if save_restore_cursor {
                self.save_cursor();
            }
            self.using_alt = true;
            let style = self.cursor.style.background_only();
            let (cols, rows) = (self.cols(), self.rows());
            self.alternate.clear_region(0, 0, cols, rows - 1, style);
        } else {
            self.using_alt = false;
            if save_restore_cursor {
                self.restore_cursor();
            }
        }
        self.dirty_all = true;
    }

    fn device_status_report(&mut self, arg: u16) {
        match arg {
            5 => self.responses.push(b"\x1b[0n".to_vec()),
            6 => {
                let (row, col) = if self.cursor.origin_mode {
                    (self.cursor.y - self.scroll_top + 1, self.cursor.x + 1)
                } else {
                    (self.cursor.y + 1, self.cursor.x + 1)
                };
                self.responses.push(format!("\x1b[{};{}R", row, col).into_bytes());
            }
            _ => {}
        }
    }

    fn device_attributes(&mut self) {
        self.responses.push(b"\x1b[?6c".to_vec());
    }

    fn csi_sgr(&mut self, params: &[Param]) {
        let sgr: Vec<SgrParam> = if params.is_empty() {
            vec![SgrParam::new(None)]
        } else {
            params
                .iter()
                .map(|p| SgrParam { value: p.value, subparams: p.subparams.as_slice() })
                .collect()
        };
        self.cursor.style = merge_sgr(self.cursor.style, &sgr);
    }

    fn decrqss_reply(&mut self, query: &[u8]) {
        let mut out = Vec::new();
        out.extend_from_slice(b"\x1bP1$r");
        match query {
            b"m" => out.extend_from_slice(render_sgr(self.cursor.style).as_bytes()),
            b"r" => out.extend_from_slice(format!("{};{}r", self.scroll_top + 1, self.scroll_bottom + 1).as_bytes()),
            _ => {}
        }
        out.extend_from_slice(b"\x1b\\");
        self.responses.push(out);
    }

    /// Encode and queue a mouse event for the host, in whichever wire
    /// format the active tracking mode calls for. `x`/`y` are 0-based
    /// grid coordinates; `button` is the raw button number (0-2 for
    /// left/middle/right, 64+ for wheel); `pressed` distinguishes a
    /// press/motion report from a release. No-op if mouse tracking
    /// hasn't been enabled by the host application.
    pub fn report_mouse(&mut self, x: u16, y: u16, button: u8, pressed: bool, modifiers: u8) {
        if !self.modes.mouse_tracking_enabled() {
            return;
        }

        if self.modes.mouse_sgr_encoding() {
            let cb = button | modifiers;
            let c = if pressed { 'M' } else { 'm' };
            self.responses
                .push(format!("\x1b[<{};{};{}{}", cb, x + 1, y + 1, c).into_bytes());
            return;
        }

        // Default X10/normal encoding: one-byte-encoded values offset by
        // +32. Release is reported as button code 3 for non-SGR modes.
        let cb = if pressed { button | modifiers } else { 3 } + 32;
        let cx = (x + 1).min(223) + 32;
        let cy = (y + 1).min(223) + 32;

        let mut out = vec![0x1B, b'[', b'M'];
        if self.modes.mouse_utf8_encoding() {
            let mut buf = [0u8; 4];
            out.extend_from_slice(char::from_u32(cb as u32).unwrap_or('\u{FFFD}').encode_utf8(&mut buf).as_bytes());
            out.extend_from_slice(char::from_u32(cx as u32).unwrap_or('\u{FFFD}').encode_utf8(&mut buf).as_bytes());
            out.extend_from_slice(char::from_u32(cy as u32).unwrap_or('\u{FFFD}').encode_utf8(&mut buf).as_bytes());
        } else {
            out.push(cb as u8);
            out.push(cx as u8);
            out.push(cy as u8);
        }
        self.responses.push(out);
    }
}

fn render_sgr(style: Style) -> String {
    let codes = crate::style::diff(Style::default(), style);
    let parts: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
    format!("{}m", parts.join(";"))
}

impl Perform for Screen {
    fn print(&mut self, c: char) {
        let translated = self.cursor.charset.translate(c);
        self.write_char(translated);
        self.last_printed_char = Some(translated);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            0x08 => self.backspace(),
            0x09 => self.tab_forward(),
            0x0A | 0x0B | 0x0C => self.line_feed(),
            0x0D => self.carriage_return(),
            0x07 => {}
            0x0E => self.cursor.charset.lock_shift(Slot::G1),
            0x0F => self.cursor.charset.lock_shift(Slot::G0),
            _ => {}
        }
    }

    fn csi_dispatch(&mut self, params: &[Param], intermediates: &[u8], _ignored: bool, c: char) {
        let private = intermediates.contains(&b'?');
        match (private, c) {
            (false, 'A') => {
                let n = p_or(params, 0, 1);
                let floor = if self.cursor.y >= self.scroll_top { self.scroll_top } else { 0 };
                self.cursor.y = self.cursor.y.saturating_sub(n).max(floor);
                self.cursor.pending_wrap = false;
            }
            (false, 'B' | 'e') => {
                let n = p_or(params, 0, 1);
                let ceiling = if self.cursor.y <= self.scroll_bottom { self.scroll_bottom } else { self.rows() - 1 };
                self.cursor.y = (self.cursor.y + n).min(ceiling);
                self.cursor.pending_wrap = false;
            }
            (false, 'C' | 'a') => {
                let n = p_or(params, 0, 1);
                self.cursor.x = (self.cursor.x + n).min(self.cols() - 1);
                self.cursor.pending_wrap = false;
            }
            (false, 'D') => {
                let n = p_or(params, 0, 1);
                self.cursor.x = self.cursor.x.saturating_sub(n);
                self.cursor.pending_wrap = false;
            }
            (false, 'E') => {
                let n = p_or(params, 0, 1);
                let ceiling = if self.cursor.y <= self.scroll_bottom { self.scroll_bottom } else { self.rows() - 1 };
                self.cursor.y = (self.cursor.y + n).min(ceiling);
                self.cursor.x = 0;
                self.cursor.pending_wrap = false;
            }
            (false, 'F') => {
                let n = p_or(params, 0, 1);
                let floor = if self.cursor.y >= self.scroll_top { self.scroll_top } else { 0 };
                self.cursor.y = self.cursor.y.saturating_sub(n).max(floor);
                self.cursor.x = 0;
                self.cursor.pending_wrap = false;
            }
            (false, 'G' | '`') => {
                let col = p_or(params, 0, 1).saturating_sub(1);
                self.cursor.x = col.min(self.cols() - 1);
                self.cursor.pending_wrap = false;
            }
            (false, 'd') => {
                let row = p_or(params, 0, 1).saturating_sub(1);
                let y = self.clamp_y_for_origin(row);
                self.cursor.y = y;
                self.cursor.pending_wrap = false;
            }
            (false, 'H' | 'f') => {
                let row = p_or(params, 0, 1).saturating_sub(1);
                let col = p_or(params, 1, 1).saturating_sub(1);
                let y = self.clamp_y_for_origin(row);
                self.move_cursor_to(col, y);
            }
            (false, 'J') => self.erase_in_display(p_or(params, 0, 0)),
            (false, 'K') => self.erase_in_line(p_or(params, 0, 0)),
            (false, 'L') => {
                let n = p_or(params, 0, 1);
                let (top, bottom) = self.region();
                let style = self.cursor.style.background_only();
                self.buffer_mut().insert_lines(self.cursor.y, n, top, bottom, style);
            }
            (false, 'M') => {
                let n = p_or(params, 0, 1);
                let (top, bottom) = self.region();
                let style = self.cursor.style.background_only();
                self.buffer_mut().delete_lines(self.cursor.y, n, top, bottom, style);
            }
            (false, 'P') => {
                let n = p_or(params, 0, 1);
                let style = self.cursor.style.background_only();
                self.buffer_mut().delete_cells(self.cursor.x, self.cursor.y, n, style);
            }
            (false, '@') => {
                let n = p_or(params, 0, 1);
                let style = self.cursor.style.background_only();
                self.buffer_mut().insert_cells(self.cursor.x, self.cursor.y, n, style);
            }
            (false, 'I') => self.tab_forward_n(p_or(params, 0, 1)),
            (false, 'Z') => self.tab_backward_n(p_or(params, 0, 1)),
            (false, 'X') => {
                let n = p_or(params, 0, 1);
                let y = self.cursor.y;
                let x1 = (self.cursor.x + n).min(self.cols());
                let style = self.cursor.style.background_only();
                self.buffer_mut().clear_region(self.cursor.x, y, x1, y, style);
            }
            (false, 'S') => self.scroll_up_region(p_or(params, 0, 1)),
            (false, 'T') => self.scroll_down_region(p_or(params, 0, 1)),
            (false, 'b') => {
                let n = p_or(params, 0, 1);
                if let Some(c) = self.last_printed_char {
                    for _ in 0..n {
                        self.write_char(c);
                    }
                }
            }
            (false, 'g') => {
                match p_or(params, 0, 0) {
                    0 => {
                        if (self.cursor.x as usize) < self.tab_stops.len() {
                            self.tab_stops[self.cursor.x as usize] = false;
                        }
                    }
                    3 => self.tab_stops.iter_mut().for_each(|t| *t = false),
                    _ => {}
                }
            }
            (false, 'm') => self.csi_sgr(params),
            (false, 'n') => self.device_status_report(p_or(params, 0, 0)),
            (false, 'c') => {
                if intermediates.contains(&b'>') {
                    self.responses.push(b"\x1b[>1;10;0c".to_vec());
                } else if p(params, 0).unwrap_or(0) == 0 {
                    self.device_attributes();
                }
            }
            (false, 'r') => {
                let top = p_or(params, 0, 1).saturating_sub(1);
                let bottom = p(params, 1).filter(|&v| v != 0).map(|v| v - 1).unwrap_or(self.rows() - 1);
                if top < bottom && bottom < self.rows() {
                    self.scroll_top = top;
                    self.scroll_bottom = bottom;
                } else {
                    self.scroll_top = 0;
                    self.scroll_bottom = self.rows() - 1;
                }
                let y = self.origin_row();
                self.move_cursor_to(0, y);
            }
            (false, 's') => self.save_cursor(),
            (false, 'u') => self.restore_cursor(),
            (true, 'h') | (true, 'l') => {
                let enable = c == 'h';
                for param in params {
                    if let Some(v) = param.value {
                        self.set_mode((Namespace::Dec, v), enable);
                    }
                }
            }
            (false, 'h') | (false, 'l') => {
                let enable = c == 'h';
                for param in params {
                    if let Some(v) = param.value {
                        self.set_mode((Namespace::Ansi, v), enable);
                    }
                }
            }
            (true, 'n') => {
                // DECRPM query, mode reported via a DSR-shaped reply.
                if let Some(v) = p(params, 0) {
                    let id = (Namespace::Dec, v);
                    let state = if !self.modes.is_known(id) {
                        0
                    } else if self.modes.get(id) {
                        1
                    } else {
                        2
                    };
                    self.responses.push(format!("\x1b[?{};{}$y", v, state).into_bytes());
                }
            }
            _ => {
                tracing::debug!(final_byte = %c, private, ?params, "unhandled CSI sequence, ignored");
            }
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], _ignored: bool, byte: char) {
        match (intermediates, byte) {
            ([], 'c') => {
                *self = Screen::new(self.cols(), self.rows()).expect("dimensions already validated");
            }
            ([], '7') => self.save_cursor(),
            ([], '8') => self.restore_cursor(),
            ([], 'D') => self.line_feed(),
            ([], 'M') => self.reverse_line_feed(),
            ([], 'E') => {
                self.carriage_return();
                self.line_feed();
            }
            ([], 'H') => {
                if (self.cursor.x as usize) < self.tab_stops.len() {
                    self.tab_stops[self.cursor.x as usize] = true;
                }
            }
            ([], '=') | ([], '>') => {}
            ([b'('], c) => self.cursor.charset.designate(Slot::G0, c as u8),
            ([b')'], c) => self.cursor.charset.designate(Slot::G1, c as u8),
            ([b'*'], c) => self.cursor.charset.designate(Slot::G2, c as u8),
            ([b'+'], c) => self.cursor.charset.designate(Slot::G3, c as u8),
            ([], 'N') => self.cursor.charset.single_shift(Slot::G2),
            ([], 'O') => self.cursor.charset.single_shift(Slot::G3),
            _ => {
                tracing::debug!(final_byte = %byte, ?intermediates, "unhandled ESC sequence, ignored");
            }
        }
    }

    fn hook(&mut self, _params: &[Param], intermediates: &[u8], _ignored: bool, c: char) {
        self.dcs_buffer.clear();
        self.dcs_intermediates = intermediates.to_vec();
        self.dcs_action = if self.dcs_intermediates.first() == Some(&b'$') && c == 'q' {
            DcsAction::Decrqss
        } else {
            DcsAction::None
        };
    }

    fn put(&mut self, byte: u8) {
        self.dcs_buffer.push(byte);
    }

    fn unhook(&mut self) {
        if self.dcs_action == DcsAction::Decrqss {
            let query = self.dcs_buffer.clone();
            self.decrqss_reply(&query);
        }
        self.dcs_buffer.clear();
        self.dcs_action = DcsAction::None;
    }

    fn osc_start(&mut self) {
        self.dcs_buffer.clear();
    }

    fn osc_put(&mut self, byte: u8) {
        self.dcs_buffer.push(byte);
    }

    fn osc_end(&mut self) {
        let payload = std::mem::take(&mut self.dcs_buffer);
        let text = String::from_utf8_lossy(&payload);
        let mut parts = text.splitn(2, ';');
        let ps = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("");
        match ps {
            "0" | "2" => self.title = rest.to_string(),
            "52" => {
                // Clipboard set: accepted and ignored at this layer — an
                // embedder wanting clipboard integration reacts to the
                // parsed OSC itself, which is outside the screen model.
            }
            _ => {
                tracing::debug!(ps, "unhandled OSC code, ignored");
            }
        }
    }
}

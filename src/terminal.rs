//! `Terminal`: the crate's single embedder-facing entry point, bundling a
//! [`Parser`] and a [`Screen`] so callers feed raw bytes in and read
//! rendered state back out without touching either piece directly.

use crate::cell::Cell;
use crate::modes::Modes;
use crate::parser::Parser;
use crate::screen::{ResizeError, Screen};

/// A complete terminal instance: byte parser plus screen model. Not
/// `Send`/`Sync` by construction — an embedder driving this from multiple
/// threads (e.g. a PTY reader thread feeding bytes while a UI thread reads
/// a snapshot) is expected to hold its own external lock around a shared
/// `Terminal`, matching the core's single-threaded, synchronous design.
pub struct Terminal {
    parser: Parser,
    screen: Screen,
}

impl Terminal {
    /// Create a terminal with a `cols` x `rows` screen. Fails only if
    /// either dimension is zero.
    pub fn create(cols: u16, rows: u16) -> Result<Self, ResizeError> {
        Ok(Self {
            parser: Parser::new(),
            screen: Screen::new(cols, rows)?,
        })
    }

    /// Feed a chunk of raw terminal output bytes. Can be called with
    /// arbitrarily sized chunks, including ones that split a UTF-8
    /// character or an escape sequence mid-way — the parser carries any
    /// partial state to the next call.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.parser.feed(bytes, &mut self.screen);
    }

    /// Resize the screen, preserving the top-left overlap of both the
    /// primary and alternate buffers.
    pub fn resize(&mut self, cols: u16, rows: u16) -> Result<(), ResizeError> {
        self.screen.resize(cols, rows)
    }

    pub fn cols(&self) -> u16 {
        self.screen.cols()
    }

    pub fn rows(&self) -> u16 {
        self.screen.rows()
    }

    pub fn cursor_position(&self) -> (u16, u16) {
        self.screen.cursor_position()
    }

    pub fn cell(&self, x: u16, y: u16) -> Cell {
        self.screen.cell(x, y)
    }

    pub fn title(&self) -> &str {
        self.screen.title()
    }

    pub fn modes(&self) -> &Modes {
        self.screen.modes()
    }

    pub fn in_alt_screen(&self) -> bool {
        self.screen.in_alt_screen()
    }

    /// Drain and return any host-bound responses (DSR/DA/DECRPM/DECRQSS
    /// replies) queued since the last call, in the order they were
    /// generated.
    pub fn take_responses(&mut self) -> Vec<Vec<u8>> {
        self.screen.take_responses()
    }

    /// Collect and clear the dirty flag of every row touched since the
    /// last call.
    pub fn take_dirty_rows(&mut self) -> Vec<(u16, crate::buffer::Row)> {
        self.screen.take_dirty_rows()
    }

    /// Encode and queue a mouse event, if tracking is currently enabled.
    /// See [`Screen::report_mouse`] for the wire-format details.
    pub fn report_mouse(&mut self, x: u16, y: u16, button: u8, pressed: bool, modifiers: u8) {
        self.screen.report_mouse(x, y, button, pressed, modifiers);
    }

    /// Wrap pasted text in the bracketed-paste delimiters (`ESC [ 2 0 0 ~`
    /// / `ESC [ 2 0 1 ~`) if mode 2004 is active, otherwise return it
    /// unwrapped. Bracketed paste is host-to-child: the embedder calls
    /// this when forwarding clipboard text typed by the user, not
    /// something the Parser ever sees on the output stream.
    pub fn bracket_paste(&self, text: &[u8]) -> Vec<u8> {
        if !self.screen.modes().bracketed_paste() {
            return text.to_vec();
        }
        let mut out = Vec::with_capacity(text.len() + 12);
        out.extend_from_slice(b"\x1b[200~");
        out.extend_from_slice(text);
        out.extend_from_slice(b"\x1b[201~");
        out
    }

    /// Render the current screen as a snapshot of `(char, Style)` rows,
    /// top to bottom. Intended for a test harness or a renderer that wants
    /// a full picture rather than per-cell queries.
    pub fn snapshot(&self) -> Vec<String> {
        (0..self.rows())
            .map(|y| (0..self.cols()).map(|x| self.cell(x, y).c).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_zero_dimensions() {
        assert!(Terminal::create(0, 10).is_err());
    }

    #[test]
    fn feed_across_multiple_calls_accumulates() {
        let mut term = Terminal::create(10, 3).unwrap();
        term.feed(b"AB");
        term.feed(b"C");
        assert_eq!(&term.snapshot()[0][..3], "ABC");
    }

    #[test]
    fn resize_preserves_overlap() {
        let mut term = Terminal::create(10, 3).unwrap();
        term.feed(b"Hello");
        term.resize(5, 3).unwrap();
        assert_eq!(&term.snapshot()[0][..5], "Hello");
    }
}

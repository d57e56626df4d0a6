//! A headless ANSI/ECMA-48 terminal emulator core.
//!
//! This crate owns three things and nothing else: a byte-stream [`parser`]
//! that turns raw PTY output into printable characters and dispatched
//! control sequences, a [`screen`] model that applies those to a 2-D grid
//! of [`cell::Cell`]s, and a [`style`] engine for SGR attributes and
//! colors. It does not spawn processes, render pixels, translate
//! keyboard input, or persist scrollback beyond an in-memory ring —
//! embedding applications build those on top.

pub mod buffer;
pub mod cell;
pub mod charset;
pub mod color;
pub mod cursor;
pub mod modes;
pub mod parser;
pub mod response;
pub mod screen;
pub mod style;
pub mod terminal;

pub use cell::{Cell, CellFlags};
pub use color::Color;
pub use modes::Modes;
pub use screen::{ResizeError, Screen};
pub use style::{Attrs, Style};
pub use terminal::Terminal;

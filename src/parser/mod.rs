//! A from-scratch implementation of the Paul Williams DEC-compatible VT
//! parser state machine: fourteen states, byte-at-a-time, dispatching
//! through the [`Perform`] trait. No escape sequence is ever matched with
//! a regex or string search — every byte moves the state machine exactly
//! one step, which is what makes `feed` safe to call with arbitrarily
//! split chunks of a byte stream.

pub mod action;
pub mod params;
mod state;

pub use action::Perform;
pub use params::{Param, ParamAccumulator};
pub use state::State;

use smallvec::SmallVec;

const MAX_INTERMEDIATES: usize = 2;
const MAX_STRING_LEN: usize = 4096;

/// The result of feeding one more byte into an in-progress UTF-8 decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Utf8Step {
    /// More continuation bytes are still expected.
    Incomplete,
    /// The sequence completed and decoded to this character.
    Complete(char),
    /// The byte wasn't a valid continuation byte, or the completed sequence
    /// wasn't valid UTF-8 (overlong encoding, surrogate, out of range).
    Invalid,
}

/// Tracks an in-progress UTF-8 decode across `feed` calls, so a multi-byte
/// character split across two chunks (e.g. by a PTY read boundary) still
/// decodes to one character rather than being dropped or mis-parsed.
#[derive(Debug, Clone, Copy, Default)]
struct Utf8Decode {
    bytes: [u8; 4],
    len: u8,
    expected: u8,
}

impl Utf8Decode {
    fn start(lead: u8) -> Option<Self> {
        let expected = match lead {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return None,
        };
        let mut bytes = [0u8; 4];
        bytes[0] = lead;
        Some(Self { bytes, len: 1, expected })
    }

    fn push(&mut self, byte: u8) -> Utf8Step {
        if byte & 0xC0 != 0x80 {
            return Utf8Step::Invalid;
        }
        self.bytes[self.len as usize] = byte;
        self.len += 1;
        if self.len < self.expected {
            Utf8Step::Incomplete
        } else {
            match std::str::from_utf8(&self.bytes[..self.len as usize]).ok().and_then(|s| s.chars().next()) {
                Some(c) => Utf8Step::Complete(c),
                None => Utf8Step::Invalid,
            }
        }
    }
}

/// The parser's mutable state: current automaton state, accumulated
/// parameters/intermediates for the sequence in progress, and any
/// in-flight UTF-8 decode. Holds no reference to the `Screen` it feeds —
/// that's passed in per call via the [`Perform`] trait.
#[derive(Debug)]
pub struct Parser {
    state: State,
    params: ParamAccumulator,
    intermediates: SmallVec<[u8; MAX_INTERMEDIATES]>,
    ignored: bool,
    utf8: Option<Utf8Decode>,
    string_len: usize,
    /// Set after seeing `ESC` while collecting an OSC/DCS/SOS-PM-APC
    /// string, to recognize the two-byte `ESC \` string terminator.
    awaiting_st: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            params: ParamAccumulator::default(),
            intermediates: SmallVec::new(),
            ignored: false,
            utf8: None,
            string_len: 0,
            awaiting_st: false,
        }
    }

    /// Feed a chunk of bytes through the state machine, dispatching to
    /// `perform` as sequences complete. Safe to call repeatedly with
    /// arbitrarily sized chunks of a continuous stream: no sequence or
    /// UTF-8 character is ever split across calls without being correctly
    /// resumed.
    pub fn feed(&mut self, bytes: &[u8], perform: &mut impl Perform) {
        for &byte in bytes {
            self.advance(byte, perform);
        }
    }

    fn clear_sequence(&mut self) {
        self.params.clear();
        self.intermediates.clear();
        self.ignored = false;
    }

    fn collect_intermediate(&mut self, byte: u8) {
        if self.intermediates.len() < MAX_INTERMEDIATES {
            self.intermediates.push(byte);
        } else {
            tracing::debug!(byte, "intermediate bytes overflowed, marking sequence ignored");
            self.ignored = true;
        }
    }

    fn advance(&mut self, byte: u8, perform: &mut impl Perform) {
        if let Some(decoder) = &mut self.utf8 {
            match decoder.push(byte) {
                Utf8Step::Complete(c) => {
                    self.utf8 = None;
                    perform.print(c);
                }
                Utf8Step::Incomplete => {}
                Utf8Step::Invalid => {
                    // Either a bad continuation byte (this byte was never
                    // consumed into the sequence) or a completed-but-invalid
                    // encoding (overlong/surrogate/out-of-range, this byte
                    // was consumed). Either way the in-progress decode is
                    // abandoned and replaced with U+FFFD; a bad continuation
                    // byte still gets reprocessed fresh since it was never
                    // folded into the broken sequence.
                    let reprocess = byte & 0xC0 != 0x80;
                    self.utf8 = None;
                    perform.print('\u{FFFD}');
                    if reprocess {
                        self.advance(byte, perform);
                    }
                }
            }
            return;
        }

        if byte >= 0xC2 && byte <= 0xF4 && self.state == State::Ground {
            self.utf8 = Utf8Decode::start(byte);
            return;
        }

        // C1 controls, 8-bit encoded (0x80-0x9F): map onto their 7-bit
        // ESC-introduced equivalents so the rest of the table only needs
        // to handle the 7-bit forms.
        if (0x80..=0x9F).contains(&byte) {
            self.dispatch_c1(byte, perform);
            return;
        }

        if self.awaiting_st {
            self.awaiting_st = false;
            if byte == b'\\' {
                self.terminate_string(perform);
                return;
            }
            // Not a real string terminator: fall through and let the
            // pending ESC start a fresh sequence from Ground.
            self.state = State::Ground;
            self.advance(0x1B, perform);
            self.advance(byte, perform);
            return;
        }

        match byte {
            0x18 | 0x1A => {
                // CAN / SUB: abort whatever is in progress.
                if self.state == State::DcsPassthrough {
                    perform.unhook();
                }
                perform.execute(byte);
                self.clear_sequence();
                self.state = State::Ground;
            }
            0x1B => self.on_escape(perform),
            _ => self.dispatch(byte, perform),
        }
    }

    /// Every 8-bit C1 control (0x80-0x9F) dispatches identically to its
    /// 7-bit `ESC`-introduced equivalent — not just the structural ones
    /// (CSI/OSC/DCS/ST/SOS-PM-APC) but also single-byte controls like IND
    /// (0x84), NEL (0x85), HTS (0x88), and RI (0x8D). Rather than duplicate
    /// every `esc_dispatch`/state-transition case here, reprocess the C1
    /// byte as the two bytes it's defined to be equivalent to: `ESC` then
    /// `byte - 0x40` (the final byte that would follow `ESC`).
    fn dispatch_c1(&mut self, byte: u8, perform: &mut impl Perform) {
        self.advance(0x1B, perform);
        self.advance(byte - 0x40, perform);
    }

    fn on_escape(&mut self, _perform: &mut impl Perform) {
        match self.state {
            State::OscString | State::DcsPassthrough | State::DcsIgnore | State::SosPmApcString => {
                self.awaiting_st = true;
            }
            _ => {
                self.clear_sequence();
                self.state = State::Escape;
            }
        }
    }

    fn terminate_string(&mut self, perform: &mut impl Perform) {
        match self.state {
            State::OscString => perform.osc_end(),
            State::DcsPassthrough => perform.unhook(),
            State::DcsIgnore | State::SosPmApcString => {}
            _ => {}
        }
        self.state = State::Ground;
    }

    fn dispatch(&mut self, byte: u8, perform: &mut impl Perform) {
        match self.state {
            State::Ground => self.ground(byte, perform),
            State::Escape => self.escape(byte, perform),
            State::EscapeIntermediate => self.escape_intermediate(byte, perform),
            State::CsiEntry => self.csi_entry(byte, perform),
            State::CsiParam => self.csi_param(byte, perform),
            State::CsiIntermediate => self.csi_intermediate(byte, perform),
            State::CsiIgnore => self.csi_ignore(byte, perform),
            State::DcsEntry => self.dcs_entry(byte, perform),
            State::DcsParam => self.dcs_param(byte, perform),
            State::DcsIntermediate => self.dcs_intermediate(byte, perform),
            State::DcsPassthrough => self.dcs_passthrough(byte, perform),
            State::DcsIgnore => self.dcs_ignore(byte),
            State::OscString => self.osc_string(byte, perform),
            State::SosPmApcString => {}
        }
    }

    fn ground(&mut self, byte: u8, perform: &mut impl Perform) {
        match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => perform.execute(byte),
            0x20..=0x7E => perform.print(byte as char),
            // 0xC2-0xF4 (valid UTF-8 leads) and 0x80-0x9F (C1 controls) are
            // intercepted earlier in `advance` and never reach here. What's
            // left — a stray continuation byte (0xA0-0xBF) or a byte that
            // can never lead a valid UTF-8 sequence (0xC0/0xC1/0xF5-0xFF) —
            // is invalid UTF-8 on its own, so it decodes to U+FFFD.
            0xA0..=0xFF => perform.print('\u{FFFD}'),
            _ => {}
        }
    }

    fn escape(&mut self, byte: u8, perform: &mut impl Perform) {
        match byte {
            0x00..=0x1F => perform.execute(byte),
            0x20..=0x2F => {
                self.collect_intermediate(byte);
                self.state = State::EscapeIntermediate;
            }
            b'[' => self.state = State::CsiEntry,
            b']' => {
                self.state = State::OscString;
                self.string_len = 0;
                perform.osc_start();
            }
            b'P' => self.state = State::DcsEntry,
            b'X' | b'^' | b'_' => self.state = State::SosPmApcString,
            0x30..=0x7E => {
                perform.esc_dispatch(&self.intermediates, self.ignored, byte as char);
                self.clear_sequence();
                self.state = State::Ground;
            }
            _ => {}
        }
    }

    fn escape_intermediate(&mut self, byte: u8, perform: &mut impl Perform) {
        match byte {
            0x00..=0x1F => perform.execute(byte),
            0x20..=0x2F => self.collect_intermediate(byte),
            0x30..=0x7E => {
                perform.esc_dispatch(&self.intermediates, self.ignored, byte as char);
                self.clear_sequence();
                self.state = State::Ground;
            }
            _ => {}
        }
    }

    fn csi_entry(&mut self, byte: u8, perform: &mut impl Perform) {
        match byte {
            0x00..=0x1F => perform.execute(byte),
            0x20..=0x2F => {
                self.collect_intermediate(byte);
                self.state = State::CsiIntermediate;
            }
            0x30..=0x39 => {
                self.params.digit(byte);
                self.state = State::CsiParam;
            }
            b';' => {
                self.params.semicolon();
                self.state = State::CsiParam;
            }
            b':' => {
                self.params.colon();
                self.state = State::CsiParam;
            }
            0x3C..=0x3F => {
                self.collect_intermediate(byte);
                self.state = State::CsiParam;
            }
            0x40..=0x7E => {
                perform.csi_dispatch(self.params.params(), &self.intermediates, self.ignored, byte as char);
                self.clear_sequence();
                self.state = State::Ground;
            }
            _ => self.state = State::CsiIgnore,
        }
    }

    fn csi_param(&mut self, byte: u8, perform: &mut impl Perform) {
        match byte {
            0x00..=0x1F => perform.execute(byte),
            0x30..=0x39 => self.params.digit(byte),
            b';' => self.params.semicolon(),
            b':' => self.params.colon(),
            0x20..=0x2F => {
                self.collect_intermediate(byte);
                self.state = State::CsiIntermediate;
            }
            0x3C..=0x3F => self.state = State::CsiIgnore,
            0x40..=0x7E => {
                perform.csi_dispatch(self.params.params(), &self.intermediates, self.ignored, byte as char);
                self.clear_sequence();
                self.state = State::Ground;
            }
            _ => self.state = State::CsiIgnore,
        }
    }

    fn csi_intermediate(&mut self, byte: u8, perform: &mut impl Perform) {
        match byte {
            0x00..=0x1F => perform.execute(byte),
            0x20..=0x2F => self.collect_intermediate(byte),
            0x40..=0x7E => {
                perform.csi_dispatch(self.params.params(), &self.intermediates, self.ignored, byte as char);
                self.clear_sequence();
                self.state = State::Ground;
            }
            _ => self.state = State::CsiIgnore,
        }
    }

    fn csi_ignore(&mut self, byte: u8, perform: &mut impl Perform) {
        match byte {
            0x00..=0x1F => perform.execute(byte),
            0x40..=0x7E => {
                self.clear_sequence();
                self.state = State::Ground;
            }
            _ => {}
        }
    }

    fn dcs_entry(&mut self, byte: u8, perform: &mut impl Perform) {
        match byte {
            0x00..=0x1F => {}
            0x20..=0x2F => {
                self.collect_intermediate(byte);
                self.state = State::DcsIntermediate;
            }
            0x30..=0x39 => {
                self.params.digit(byte);
                self.state = State::DcsParam;
            }
            b';' => {
                self.params.semicolon();
                self.state = State::DcsParam;
            }
            b':' => {
                self.params.colon();
                self.state = State::DcsParam;
            }
            0x3C..=0x3F => {
                self.collect_intermediate(byte);
                self.state = State::DcsParam;
            }
            0x40..=0x7E => {
                perform.hook(self.params.params(), &self.intermediates, self.ignored, byte as char);
                self.state = State::DcsPassthrough;
            }
            _ => self.state = State::DcsIgnore,
        }
    }

    fn dcs_param(&mut self, byte: u8, perform: &mut impl Perform) {
        match byte {
            0x00..=0x1F => {}
            0x30..=0x39 => self.params.digit(byte),
            b';' => self.params.semicolon(),
            b':' => self.params.colon(),
            0x20..=0x2F => {
                self.collect_intermediate(byte);
                self.state = State::DcsIntermediate;
            }
            0x3C..=0x3F => self.state = State::DcsIgnore,
            0x40..=0x7E => {
                perform.hook(self.params.params(), &self.intermediates, self.ignored, byte as char);
                self.state = State::DcsPassthrough;
            }
            _ => self.state = State::DcsIgnore,
        }
    }

    fn dcs_intermediate(&mut self, byte: u8, perform: &mut impl Perform) {
        match byte {
            0x00..=0x1F => {}
            0x20..=0x2F => self.collect_intermediate(byte),
            0x40..=0x7E => {
                perform.hook(self.params.params(), &self.intermediates, self.ignored, byte as char);
                self.state = State::DcsPassthrough;
            }
            _ => self.state = State::DcsIgnore,
        }
    }

    fn dcs_passthrough(&mut self, byte: u8, perform: &mut impl Perform) {
        if self.string_len < MAX_STRING_LEN {
            perform.put(byte);
            self.string_len += 1;
            if self.string_len == MAX_STRING_LEN {
                tracing::debug!(limit = MAX_STRING_LEN, "DCS payload hit the length cap, rest is dropped");
            }
        }
    }

    fn dcs_ignore(&mut self, _byte: u8) {}

    fn osc_string(&mut self, byte: u8, perform: &mut impl Perform) {
        match byte {
            0x07 => self.terminate_string(perform),
            0x00..=0x06 | 0x08..=0x1F => {}
            _ => {
                if self.string_len < MAX_STRING_LEN {
                    perform.osc_put(byte);
                    self.string_len += 1;
                    if self.string_len == MAX_STRING_LEN {
                        tracing::debug!(limit = MAX_STRING_LEN, "OSC payload hit the length cap, rest is dropped");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        printed: String,
        csi: Vec<(String, char)>,
        executed: Vec<u8>,
        osc: Vec<Vec<u8>>,
        osc_buf: Vec<u8>,
        in_osc: bool,
    }

    impl Perform for Recorder {
        fn print(&mut self, c: char) {
            self.printed.push(c);
        }
        fn execute(&mut self, byte: u8) {
            self.executed.push(byte);
        }
        fn csi_dispatch(&mut self, params: &[Param], _intermediates: &[u8], _ignored: bool, c: char) {
            let rendered: Vec<String> = params
                .iter()
                .map(|p| p.value.map(|v| v.to_string()).unwrap_or_default())
                .collect();
            self.csi.push((rendered.join(";"), c));
        }
        fn esc_dispatch(&mut self, _intermediates: &[u8], _ignored: bool, _byte: char) {}
        fn hook(&mut self, _params: &[Param], _intermediates: &[u8], _ignored: bool, _c: char) {}
        fn put(&mut self, _byte: u8) {}
        fn unhook(&mut self) {}
        fn osc_start(&mut self) {
            self.in_osc = true;
            self.osc_buf.clear();
        }
        fn osc_put(&mut self, byte: u8) {
            self.osc_buf.push(byte);
        }
        fn osc_end(&mut self) {
            self.in_osc = false;
            self.osc.push(self.osc_buf.clone());
        }
    }

    #[test]
    fn prints_plain_text() {
        let mut parser = Parser::new();
        let mut rec = Recorder::default();
        parser.feed(b"hello", &mut rec);
        assert_eq!(rec.printed, "hello");
    }

    #[test]
    fn decodes_utf8_across_chunk_boundary() {
        let mut parser = Parser::new();
        let mut rec = Recorder::default();
        let bytes = "é".as_bytes(); // 2-byte UTF-8
        parser.feed(&bytes[..1], &mut rec);
        parser.feed(&bytes[1..], &mut rec);
        assert_eq!(rec.printed, "é");
    }

    #[test]
    fn truncated_multibyte_sequence_emits_replacement_char() {
        let mut parser = Parser::new();
        let mut rec = Recorder::default();
        // A 3-byte lead followed by a plain ASCII byte instead of the
        // continuation bytes it promised.
        parser.feed(&[0xE2, b'A'], &mut rec);
        assert_eq!(rec.printed, "\u{FFFD}A");
    }

    #[test]
    fn bad_continuation_byte_emits_replacement_char() {
        let mut parser = Parser::new();
        let mut rec = Recorder::default();
        // A 2-byte lead followed by a byte that isn't a continuation byte.
        parser.feed(&[0xC2, 0x41], &mut rec);
        assert_eq!(rec.printed, "\u{FFFD}A");
    }

    #[test]
    fn overlong_encoding_emits_replacement_char() {
        let mut parser = Parser::new();
        let mut rec = Recorder::default();
        // 0xC0 0x80 is an overlong (invalid) encoding of NUL.
        parser.feed(&[0xC0, 0x80], &mut rec);
        assert_eq!(rec.printed, "\u{FFFD}");
    }

    #[test]
    fn lone_continuation_byte_emits_replacement_char() {
        let mut parser = Parser::new();
        let mut rec = Recorder::default();
        parser.feed(&[0xA0, b'B'], &mut rec);
        assert_eq!(rec.printed, "\u{FFFD}B");
    }

    #[test]
    fn csi_cup_dispatches_with_params() {
        let mut parser = Parser::new();
        let mut rec = Recorder::default();
        parser.feed(b"\x1b[5;10H", &mut rec);
        assert_eq!(rec.csi, vec![("5;10".to_string(), 'H')]);
    }

    #[test]
    fn csi_sequence_split_across_feeds() {
        let mut parser = Parser::new();
        let mut rec = Recorder::default();
        parser.feed(b"\x1b[3", &mut rec);
        parser.feed(b"1m", &mut rec);
        assert_eq!(rec.csi, vec![("31".to_string(), 'm')]);
    }

    #[test]
    fn c0_control_executed_in_ground() {
        let mut parser = Parser::new();
        let mut rec = Recorder::default();
        parser.feed(b"a\nb", &mut rec);
        assert_eq!(rec.printed, "ab");
        assert_eq!(rec.executed, vec![b'\n']);
    }

    #[test]
    fn osc_terminated_by_bel() {
        let mut parser = Parser::new();
        let mut rec = Recorder::default();
        parser.feed(b"\x1b]0;title\x07", &mut rec);
        assert_eq!(rec.osc, vec![b"0;title".to_vec()]);
    }

    #[test]
    fn osc_terminated_by_st() {
        let mut parser = Parser::new();
        let mut rec = Recorder::default();
        parser.feed(b"\x1b]0;title\x1b\\", &mut rec);
        assert_eq!(rec.osc, vec![b"0;title".to_vec()]);
    }

    #[test]
    fn can_cancels_sequence_in_progress() {
        let mut parser = Parser::new();
        let mut rec = Recorder::default();
        parser.feed(b"\x1b[31\x18m", &mut rec);
        // CAN aborts the CSI; the trailing `m` prints as plain text.
        assert!(rec.csi.is_empty());
        assert_eq!(rec.printed, "m");
        assert_eq!(rec.executed, vec![0x18]);
    }

    #[test]
    fn eight_bit_csi_dispatches_like_esc_bracket() {
        let mut parser = Parser::new();
        let mut rec = Recorder::default();
        // 0x9B is the 8-bit CSI introducer, equivalent to ESC [.
        parser.feed(&[0x9B, b'5', b';', b'1', b'0', b'H'], &mut rec);
        assert_eq!(rec.csi, vec![("5;10".to_string(), 'H')]);
    }

    #[test]
    fn eight_bit_nel_dispatches_like_esc_e() {
        // 0x85 (NEL) is equivalent to ESC E, a single-byte esc_dispatch
        // with no CSI machinery at all.
        struct EscRecorder {
            calls: Vec<char>,
        }
        impl Perform for EscRecorder {
            fn print(&mut self, _c: char) {}
            fn execute(&mut self, _byte: u8) {}
            fn csi_dispatch(&mut self, _: &[Param], _: &[u8], _: bool, _: char) {}
            fn esc_dispatch(&mut self, _intermediates: &[u8], _ignored: bool, byte: char) {
                self.calls.push(byte);
            }
            fn hook(&mut self, _: &[Param], _: &[u8], _: bool, _: char) {}
            fn put(&mut self, _byte: u8) {}
            fn unhook(&mut self) {}
            fn osc_start(&mut self) {}
            fn osc_put(&mut self, _byte: u8) {}
            fn osc_end(&mut self) {}
        }
        let mut parser = Parser::new();
        let mut rec = EscRecorder { calls: Vec::new() };
        parser.feed(&[0x85], &mut rec);
        assert_eq!(rec.calls, vec!['E']);
    }
}

//! End-to-end escape-sequence scenarios against the public `Terminal` API.

use vtcore::Terminal;

#[test]
fn plain_text_and_crlf_wrap_lines() {
    let mut term = Terminal::create(10, 5).unwrap();
    term.feed(b"ABC\r\nDE");
    let snap = term.snapshot();
    assert_eq!(&snap[0][..3], "ABC");
    assert_eq!(&snap[1][..2], "DE");
    assert_eq!(term.cursor_position(), (2, 1));
}

#[test]
fn clear_screen_home_sgr_and_erase_char() {
    let mut term = Terminal::create(10, 5).unwrap();
    term.feed(b"garbage everywhere");
    term.feed(b"\x1b[2J\x1b[H\x1b[31mHello\x1b[5X");
    let snap = term.snapshot();
    assert_eq!(&snap[0][..5], "Hello");
    // 5X erased 5 cells starting at the cursor (col 5).
    assert_eq!(&snap[0][5..10], "     ");
}

#[test]
fn absolute_cursor_positioning() {
    let mut term = Terminal::create(20, 20).unwrap();
    term.feed(b"\x1b[5;10H");
    assert_eq!(term.cursor_position(), (9, 4));
}

#[test]
fn alt_screen_round_trip_leaves_primary_untouched() {
    let mut term = Terminal::create(10, 4).unwrap();
    term.feed(b"primary content");
    let before = term.snapshot();
    term.feed(b"\x1b[?1049h\x1b[2Jsomething else entirely");
    assert!(term.in_alt_screen());
    term.feed(b"\x1b[?1049l");
    assert!(!term.in_alt_screen());
    assert_eq!(term.snapshot(), before);
}

#[test]
fn device_status_report_replies_with_cursor_position() {
    let mut term = Terminal::create(80, 24).unwrap();
    term.feed(b"\x1b[6n");
    assert_eq!(term.take_responses(), vec![b"\x1b[1;1R".to_vec()]);
}

#[test]
fn rgb_sgr_sets_true_color_foreground() {
    let mut term = Terminal::create(10, 3).unwrap();
    term.feed(b"\x1b[38;2;255;128;0mX");
    let cell = term.cell(0, 0);
    assert_eq!(cell.style.fg, vtcore::Color::Rgb(255, 128, 0));
}

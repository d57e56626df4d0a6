//! Property-based tests for the invariants the core is expected to hold
//! for arbitrary input, not just hand-picked examples.

use proptest::prelude::*;
use vtcore::style::{diff, merge_sgr, Attrs, SgrParam, Style};
use vtcore::{Color, Terminal};

fn arb_color() -> impl Strategy<Value = Color> {
    prop_oneof![
        Just(Color::Default),
        any::<u8>().prop_map(Color::Indexed),
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Color::Rgb(r, g, b)),
    ]
}

fn arb_style() -> impl Strategy<Value = Style> {
    (arb_color(), arb_color(), 0u16..512).prop_map(|(fg, bg, bits)| Style {
        fg,
        bg,
        attrs: Attrs::from_bits_truncate(bits),
    })
}

proptest! {
    #[test]
    fn reset_sgr_always_yields_default(style in arb_style()) {
        let reset = merge_sgr(style, &[SgrParam::new(Some(0))]);
        prop_assert_eq!(reset, Style::default());
    }

    #[test]
    fn sgr_diff_round_trips(style in arb_style()) {
        let codes = diff(Style::default(), style);
        let params: Vec<SgrParam<'_>> = codes.iter().map(|&c| SgrParam::new(Some(c))).collect();
        let result = merge_sgr(Style::default(), &params);
        prop_assert_eq!(result, style);
    }

    #[test]
    fn cursor_stays_in_bounds_after_arbitrary_motion(
        cols in 1u16..40, rows in 1u16..40,
        dr in 0u16..200, dc in 0u16..200,
        row in 0u16..200, col in 0u16..200,
    ) {
        let mut term = Terminal::create(cols, rows).unwrap();
        let seq = format!(
            "\x1b[{};{}H\x1b[{}A\x1b[{}B\x1b[{}C\x1b[{}D",
            row + 1, col + 1, dr, dr, dc, dc
        );
        term.feed(seq.as_bytes());
        let (x, y) = term.cursor_position();
        prop_assert!(x < cols);
        prop_assert!(y < rows);
    }

    #[test]
    fn feed_is_independent_of_chunk_boundaries(
        a in "[ -~]{0,12}", b in "[ -~]{0,12}", c in "[ -~]{0,12}"
    ) {
        let whole = format!("{a}{b}{c}");
        let mut one_shot = Terminal::create(40, 10).unwrap();
        one_shot.feed(whole.as_bytes());

        let mut chunked = Terminal::create(40, 10).unwrap();
        chunked.feed(a.as_bytes());
        chunked.feed(b.as_bytes());
        chunked.feed(c.as_bytes());

        prop_assert_eq!(one_shot.snapshot(), chunked.snapshot());
        prop_assert_eq!(one_shot.cursor_position(), chunked.cursor_position());
    }

    #[test]
    fn region_scroll_never_touches_cells_outside_region(
        top in 0u16..10, height in 1u16..10, n in 0u16..5,
    ) {
        let rows = top + height + 3;
        let bottom = top + height - 1;
        let mut term = Terminal::create(10, rows).unwrap();
        let seq = format!("\x1b[{};{}r", top + 1, bottom + 1);
        term.feed(seq.as_bytes());
        // Paint a marker in every row, including outside the region.
        for y in 0..rows {
            term.feed(format!("\x1b[{};1H#", y + 1).as_bytes());
        }
        let before = term.snapshot();
        term.feed(format!("\x1b[{}S", n).as_bytes());
        let after = term.snapshot();
        for y in 0..rows {
            if y < top || y > bottom {
                prop_assert_eq!(&after[y as usize], &before[y as usize]);
            }
        }
    }
}

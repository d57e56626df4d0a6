//! The 2-D cell grid. `Buffer` owns exactly one W×H rectangle of `Cell`s and
//! the row-and-region operations the Screen drives it with; it never
//! interprets escape sequences or holds cursor/mode state itself.

use std::collections::VecDeque;

use crate::cell::Cell;
use crate::style::Style;

/// One row of cells. Rows track their own dirty bit so an external renderer
/// can diff against the last snapshot instead of repainting everything.
#[derive(Debug, Clone)]
pub struct Row {
    pub cells: Vec<Cell>,
    pub dirty: bool,
}

impl Row {
    pub fn new(cols: u16) -> Self {
        Self {
            cells: vec![Cell::default(); cols as usize],
            dirty: true,
        }
    }

    fn fill(&mut self, cell: Cell) {
        for c in &mut self.cells {
            *c = cell;
        }
        self.dirty = true;
    }

    fn resize(&mut self, cols: u16, fill: Cell) {
        let new_len = cols as usize;
        if self.cells.len() != new_len {
            self.cells.resize(new_len, fill);
            self.dirty = true;
        }
    }
}

/// A rectangular W×H grid of cells, plus a bounded scrollback ring for rows
/// scrolled off the top. Every `(x, y)` with `0 <= x < cols`, `0 <= y < rows`
/// is always defined.
#[derive(Debug)]
pub struct Buffer {
    rows: Vec<Row>,
    cols: u16,
    height: u16,
    /// Rows evicted from the top of the visible grid by a full-region
    /// scroll-up (i.e. `scroll_up` with `top == 0`), oldest first.
    scrollback: VecDeque<Row>,
    scrollback_limit: usize,
}

impl Buffer {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            rows: (0..rows).map(|_| Row::new(cols)).collect(),
            cols,
            height: rows,
            scrollback: VecDeque::new(),
            scrollback_limit: 10_000,
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.height
    }

    fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.cols && y < self.height
    }

    pub fn get(&self, x: u16, y: u16) -> Cell {
        debug_assert!(self.in_bounds(x, y));
        self.rows[y as usize].cells[x as usize]
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if !self.in_bounds(x, y) {
            return;
        }
        let row = &mut self.rows[y as usize];
        row.cells[x as usize] = cell;
        row.dirty = true;
    }

    pub fn row(&self, y: u16) -> &Row {
        &self.rows[y as usize]
    }

    pub fn row_mut(&mut self, y: u16) -> &mut Row {
        &mut self.rows[y as usize]
    }

    /// Fill the rectangle `[x0, x1) x [y0, y1]` with `(space, style)`.
    /// `x1`/`y1` are clamped to the grid; out-of-range input is simply
    /// clamped rather than rejected, matching the core's no-panic policy.
    pub fn clear_region(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, style: Style) {
        let x1 = x1.min(self.cols);
        let y1 = y1.min(self.height.saturating_sub(1));
        let fill = Cell::erased_with(style);
        for y in y0..=y1 {
            if y >= self.height {
                break;
            }
            let row = &mut self.rows[y as usize];
            let end = x1 as usize;
            for x in (x0 as usize)..end.min(row.cells.len()) {
                row.cells[x] = fill;
            }
            row.dirty = true;
        }
    }

    /// Scroll rows `[top, bottom]` up by `n`, filling the bottom `n` rows
    /// with `(space, fill_style)`. Rows outside the region are untouched. If
    /// `n` exceeds the region height the whole region is cleared. When
    /// `top == 0`, the evicted rows are returned (oldest first) and pushed
    /// into the scrollback ring; scroll operations on a sub-region (top > 0)
    /// never touch scrollback, since that content never reached true row 0.
    pub fn scroll_up(&mut self, top: u16, bottom: u16, n: u16, fill_style: Style) -> Vec<Row> {
        self.scroll_up_impl(top, bottom, n, fill_style, true)
    }

    fn scroll_up_impl(
        &mut self,
        top: u16,
        bottom: u16,
        n: u16,
        fill_style: Style,
        capture_scrollback: bool,
    ) -> Vec<Row> {
        if top >= self.height || bottom >= self.height || top > bottom {
            return Vec::new();
        }
        let region_height = bottom - top + 1;
        let n = n.min(region_height);
        if n == 0 {
            return Vec::new();
        }

        let mut evicted = Vec::new();
        for _ in 0..n {
            let removed = self.rows.remove(top as usize);
            let mut fresh = Row::new(self.cols);
            fresh.fill(Cell::erased_with(fill_style));
            self.rows.insert(bottom as usize, fresh);
            evicted.push(removed);
        }

        for y in top..=bottom {
            self.rows[y as usize].dirty = true;
        }

        if capture_scrollback && top == 0 {
            for row in &evicted {
                self.scrollback.push_back(row.clone());
            }
            while self.scrollback.len() > self.scrollback_limit {
                self.scrollback.pop_front();
            }
            evicted
        } else {
            Vec::new()
        }
    }

    /// Scroll rows `[top, bottom]` down by `n`, filling the top `n` rows
    /// with `(space, fill_style)`. Symmetric to `scroll_up`; content that
    /// leaves the bottom of the region is discarded (scrollback only
    /// accumulates rows leaving the *top* of the screen).
    pub fn scroll_down(&mut self, top: u16, bottom: u16, n: u16, fill_style: Style) {
        if top >= self.height || bottom >= self.height || top > bottom {
            return;
        }
        let region_height = bottom - top + 1;
        let n = n.min(region_height);
        for _ in 0..n {
            self.rows.remove(bottom as usize);
            let mut fresh = Row::new(self.cols);
            fresh.fill(Cell::erased_with(fill_style));
            self.rows.insert(top as usize, fresh);
        }
        for y in top..=bottom {
            self.rows[y as usize].dirty = true;
        }
    }

    /// Insert `n` blank lines at `y`, shifting `[y, bottom]` down; lines
    /// pushed past `bottom` are discarded. No-op if `y` is outside
    /// `[top, bottom]`.
    pub fn insert_lines(&mut self, y: u16, n: u16, top: u16, bottom: u16, fill_style: Style) {
        if y < top || y > bottom {
            return;
        }
        self.scroll_down(y, bottom, n, fill_style);
    }

    /// Delete `n` lines at `y`, shifting `[y, bottom]` up and filling the
    /// exposed bottom rows. No-op if `y` is outside `[top, bottom]`.
    pub fn delete_lines(&mut self, y: u16, n: u16, top: u16, bottom: u16, fill_style: Style) {
        if y < top || y > bottom {
            return;
        }
        // An explicit DL is a region-local edit, not content leaving the
        // screen, so it never feeds the scrollback ring even when y == 0.
        let _ = self.scroll_up_impl(y, bottom, n, fill_style, false);
    }

    /// Insert `n` blank cells at `(x, y)`, shifting the rest of the row
    /// right; cells pushed past the row's last column are discarded.
    pub fn insert_cells(&mut self, x: u16, y: u16, n: u16, fill_style: Style) {
        if y >= self.height {
            return;
        }
        let row = &mut self.rows[y as usize];
        let x = (x as usize).min(row.cells.len());
        let n = (n as usize).min(row.cells.len() - x);
        let fill = Cell::erased_with(fill_style);
        for _ in 0..n {
            row.cells.pop();
            row.cells.insert(x, fill);
        }
        row.dirty = true;
    }

    /// Delete `n` cells at `(x, y)`, shifting the remainder of the row left
    /// and filling the exposed right edge.
    pub fn delete_cells(&mut self, x: u16, y: u16, n: u16, fill_style: Style) {
        if y >= self.height {
            return;
        }
        let row = &mut self.rows[y as usize];
        let x = (x as usize).min(row.cells.len());
        let n = n as usize;
        let fill = Cell::erased_with(fill_style);
        let to_remove = n.min(row.cells.len().saturating_sub(x));
        for _ in 0..to_remove {
            row.cells.remove(x);
            row.cells.push(fill);
        }
        row.dirty = true;
    }

    /// Resize to `(new_cols, new_rows)`, preserving the top-left overlap and
    /// filling any newly exposed area with `(space, default_style)`.
    pub fn resize(&mut self, new_cols: u16, new_rows: u16, default_style: Style) {
        let fill = Cell::erased_with(default_style);
        for row in &mut self.rows {
            row.resize(new_cols, fill);
        }
        if new_rows as usize > self.rows.len() {
            for _ in self.rows.len()..new_rows as usize {
                let mut row = Row::new(new_cols);
                row.fill(fill);
                self.rows.push(row);
            }
        } else {
            self.rows.truncate(new_rows as usize);
        }
        self.cols = new_cols;
        self.height = new_rows;
    }

    pub fn mark_all_dirty(&mut self) {
        for row in &mut self.rows {
            row.dirty = true;
        }
    }

    /// Collect and clear the dirty flag of every dirty row, returning
    /// `(row_index, &Row)` pairs in top-to-bottom order.
    pub fn take_dirty(&mut self) -> Vec<(u16, Row)> {
        let mut out = Vec::new();
        for (i, row) in self.rows.iter_mut().enumerate() {
            if row.dirty {
                out.push((i as u16, row.clone()));
                row.dirty = false;
            }
        }
        out
    }

    pub fn scrollback_len(&self) -> usize {
        self.scrollback.len()
    }

    /// Discard the entire scrollback ring — ED 3 ("erase saved lines").
    pub fn clear_scrollback(&mut self) {
        self.scrollback.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(buf: &Buffer, y: u16) -> String {
        buf.row(y).cells.iter().map(|c| c.c).collect()
    }

    #[test]
    fn new_buffer_is_all_blank() {
        let buf = Buffer::new(5, 3);
        for y in 0..3 {
            assert_eq!(text(&buf, y), "     ");
        }
    }

    #[test]
    fn scroll_up_preserves_outside_region() {
        let mut buf = Buffer::new(3, 5);
        for y in 0..5u16 {
            buf.set(0, y, Cell {
                c: (b'A' + y as u8) as char,
                ..Cell::default()
            });
        }
        buf.scroll_up(1, 3, 1, Style::default());
        assert_eq!(text(&buf, 0), "A  ", "row above region untouched");
        assert_eq!(text(&buf, 4), "E  ", "row below region untouched");
        assert_eq!(text(&buf, 1), "C  ", "region shifted up by one");
        assert_eq!(text(&buf, 2), "D  ");
        assert_eq!(text(&buf, 3), "   ", "bottom of region is blank");
    }

    #[test]
    fn scroll_up_overflowing_region_clears_it() {
        let mut buf = Buffer::new(2, 4);
        buf.set(0, 1, Cell { c: 'X', ..Cell::default() });
        buf.scroll_up(0, 2, 99, Style::default());
        assert_eq!(text(&buf, 0), "  ");
        assert_eq!(text(&buf, 1), "  ");
        assert_eq!(text(&buf, 2), "  ");
        assert_eq!(text(&buf, 3), "  ", "row 3 outside the region is untouched by construction");
    }

    #[test]
    fn scroll_up_top_zero_captures_scrollback() {
        let mut buf = Buffer::new(2, 3);
        buf.set(0, 0, Cell { c: 'Z', ..Cell::default() });
        let evicted = buf.scroll_up(0, 2, 1, Style::default());
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].cells[0].c, 'Z');
        assert_eq!(buf.scrollback_len(), 1);
    }

    #[test]
    fn scroll_up_nonzero_top_does_not_touch_scrollback() {
        let mut buf = Buffer::new(2, 5);
        let evicted = buf.scroll_up(1, 3, 1, Style::default());
        assert!(evicted.is_empty());
        assert_eq!(buf.scrollback_len(), 0);
    }

    #[test]
    fn resize_preserves_top_left_rectangle() {
        let mut buf = Buffer::new(5, 3);
        for (x, c) in "Hello".chars().enumerate() {
            buf.set(x as u16, 0, Cell { c, ..Cell::default() });
        }
        buf.resize(3, 2, Style::default());
        assert_eq!(text(&buf, 0), "Hel");
        assert_eq!(buf.rows(), 2);
        assert_eq!(buf.cols(), 3);

        buf.resize(8, 4, Style::default());
        assert_eq!(&text(&buf, 0)[..3], "Hel");
        assert_eq!(buf.rows(), 4);
    }

    #[test]
    fn insert_and_delete_cells_are_row_local() {
        let mut buf = Buffer::new(5, 1);
        for (x, c) in "ABCDE".chars().enumerate() {
            buf.set(x as u16, 0, Cell { c, ..Cell::default() });
        }
        buf.insert_cells(1, 0, 2, Style::default());
        assert_eq!(text(&buf, 0), "A  BC");

        buf.delete_cells(0, 0, 2, Style::default());
        assert_eq!(text(&buf, 0), " BC  ");
    }
}

//! Window: the scrolling viewport over a byte source.
//!
//! A [`Window`] owns one [`ByteSource`] and tracks which part of it is on
//! screen. The data is laid out in rows of `width` bytes; the viewport shows
//! `height` rows starting at `offset`, and `cursor` selects one byte.
//!
//! ```text
//!  offset ──▶ ┌────────────────────────┐ row 0
//!             │ .. .. .. .. .. .. .. .. │
//!             │ .. .. [cursor] .. .. .. │
//!             │ .. .. .. .. .. .. .. .. │ row height-1
//!             └────────────────────────┘
//!             offset + height * width
//! ```
//!
//! Every motion keeps two properties:
//!
//! - `offset` is a multiple of `width` and never past
//!   `max(rows - height, 0) * width`, so the last page is always full when
//!   the data is long enough.
//! - `offset <= cursor < offset + height * width`, and `cursor` is a valid
//!   address (or 0 for empty data).
//!
//! Motions never fail. Out-of-range requests clamp, and a motion at an
//! extreme position is a no-op. Only reads from the source can fail.

use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::command::Command;
use crate::error::{Error, Result};
use crate::jumplist::{Jump, JumpStack};
use crate::key::Resolved;
use crate::mode::Mode;
use crate::source::{ByteSource, FileSource};
use crate::state::State;

/// Bytes scanned on each side of the cursor by [`Window::jump_to`].
const JUMP_SCAN: u64 = 50;

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Viewport and cursor over one byte source.
pub struct Window {
    source: Box<dyn ByteSource>,
    name: String,
    width: u64,
    height: u64,
    offset: u64,
    cursor: u64,
    length: u64,
    jumps: JumpStack,
    mode: Mode,
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("offset", &self.offset)
            .field("cursor", &self.cursor)
            .field("length", &self.length)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Window {
    /// Open the file at `path` read-only.
    ///
    /// The display name is the path's file name.
    ///
    /// # Errors
    ///
    /// [`Error::Open`] if the file can't be opened or its length can't be
    /// read. The file is closed before returning.
    pub fn open(path: impl AsRef<Path>, width: u64) -> Result<Self> {
        let path = path.as_ref();
        let open_error = |source| Error::Open {
            path: path.to_path_buf(),
            source,
        };
        let source = FileSource::open(path).map_err(open_error)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self::new(name, source, width).map_err(|err| match err {
            Error::Io(source) => open_error(source),
            other @ Error::Open { .. } => other,
        })
    }

    /// Wrap an already-open source. `width` is floored at 1.
    ///
    /// # Errors
    ///
    /// Returns the error from reading the source's length. The source is
    /// closed before returning.
    pub fn new(name: impl Into<String>, source: impl ByteSource + 'static, width: u64) -> Result<Self> {
        let mut source: Box<dyn ByteSource> = Box::new(source);
        let length = match source.length() {
            Ok(length) => length,
            Err(err) => {
                let _ = source.close();
                return Err(err.into());
            }
        };
        let name = name.into();
        info!(%name, length, width, "window opened");
        Ok(Self {
            source,
            name,
            width: width.max(1),
            height: 1,
            offset: 0,
            cursor: 0,
            length,
            jumps: JumpStack::new(),
            mode: Mode::Normal,
        })
    }

    /// Release the byte source.
    ///
    /// # Errors
    ///
    /// Returns the error from closing the source.
    pub fn close(mut self) -> Result<()> {
        info!(name = %self.name, "window closed");
        self.source.close()?;
        Ok(())
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn width(&self) -> u64 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u64 {
        self.height
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub const fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Length as of the last [`state`](Self::state) (or open).
    #[must_use]
    pub const fn length(&self) -> u64 {
        self.length
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub const fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Saved positions for [`jump_back`](Self::jump_back).
    #[must_use]
    pub const fn jumps(&self) -> &JumpStack {
        &self.jumps
    }

    /// Set the number of visible rows (floored at 1) and re-clamp.
    pub fn set_height(&mut self, height: u64) {
        self.height = height.max(1);
        self.clamp();
    }

    // -- Geometry -----------------------------------------------------------

    /// Last valid cursor address.
    const fn last(&self) -> u64 {
        self.length.saturating_sub(1)
    }

    /// Bytes on one screen.
    const fn page(&self) -> u64 {
        self.height.saturating_mul(self.width)
    }

    /// Largest offset that keeps the last page full.
    const fn max_offset(&self) -> u64 {
        self.length
            .div_ceil(self.width)
            .saturating_sub(self.height)
            .saturating_mul(self.width)
    }

    /// First byte of the last row.
    const fn last_row_head(&self) -> u64 {
        self.last() / self.width * self.width
    }

    /// Scroll up to the cursor's row if it went above the window.
    const fn follow_up(&mut self) {
        if self.cursor < self.offset {
            self.offset = self.cursor / self.width * self.width;
        }
    }

    /// Scroll down so the cursor's row is the last visible one if it went
    /// below the window.
    const fn follow_down(&mut self) {
        if self.cursor >= self.offset.saturating_add(self.page()) {
            self.offset = (self.cursor - self.page() + self.width) / self.width * self.width;
        }
    }

    /// Pull cursor and offset back into bounds after the length or height
    /// changed. A no-op when both are already valid.
    fn clamp(&mut self) {
        self.cursor = self.cursor.min(self.last());
        self.offset = self.offset.min(self.max_offset()) / self.width * self.width;
        self.follow_up();
        self.follow_down();
    }

    // -- Cursor motions -----------------------------------------------------

    /// Up `n` rows, stopping at the first row.
    pub fn cursor_up(&mut self, n: u64) {
        let rows = n.max(1).min(self.cursor / self.width);
        self.cursor -= rows * self.width;
        self.follow_up();
    }

    /// Down `n` rows, stopping at the last row and the last byte.
    pub fn cursor_down(&mut self, n: u64) {
        let rows = n.max(1).min(self.last() / self.width - self.cursor / self.width);
        self.cursor += rows.saturating_mul(self.width).min(self.last() - self.cursor);
        self.follow_down();
    }

    /// Left `n` bytes within the row.
    pub fn cursor_left(&mut self, n: u64) {
        self.cursor -= n.max(1).min(self.cursor % self.width);
    }

    /// Right `n` bytes within the row, stopping at the last byte.
    pub fn cursor_right(&mut self, n: u64) {
        let room = (self.width - 1 - self.cursor % self.width).min(self.last() - self.cursor);
        self.cursor += n.max(1).min(room);
    }

    /// Back `n` bytes, across rows.
    pub fn cursor_prev(&mut self, n: u64) {
        self.cursor -= n.max(1).min(self.cursor);
        self.follow_up();
    }

    /// Forward `n` bytes, across rows.
    pub fn cursor_next(&mut self, n: u64) {
        self.cursor += n.max(1).min(self.last() - self.cursor);
        self.follow_down();
    }

    /// First byte of the row.
    pub const fn cursor_head(&mut self) {
        self.cursor -= self.cursor % self.width;
    }

    /// Last byte of the `n`th row counting the current one as the first.
    pub fn cursor_end(&mut self, n: u64) {
        let end = (self.cursor / self.width)
            .saturating_add(n.max(1))
            .saturating_mul(self.width)
            - 1;
        self.cursor = end.min(self.last());
        self.follow_down();
    }

    // -- Scrolling ----------------------------------------------------------

    /// Scroll the view up `n` rows. The cursor moves only if it would fall
    /// off the bottom.
    pub fn scroll_up(&mut self, n: u64) {
        self.offset -= n.max(1).min(self.offset / self.width) * self.width;
        let end = self.offset + self.page();
        if self.cursor >= end {
            self.cursor -= ((self.cursor - end) / self.width + 1) * self.width;
        }
    }

    /// Scroll the view down `n` rows. The cursor moves only if it would
    /// fall off the top.
    pub fn scroll_down(&mut self, n: u64) {
        let max_row = self.max_offset() / self.width;
        let rows = n.max(1).min(max_row.saturating_sub(self.offset / self.width));
        self.offset += rows * self.width;
        if self.cursor < self.offset {
            let gap = (self.offset - self.cursor).div_ceil(self.width) * self.width;
            self.cursor += gap.min(self.last() - self.cursor);
        }
    }

    /// Back one screen, keeping two rows of context.
    pub fn page_up(&mut self) {
        self.shift_up(self.height.saturating_sub(2).max(1));
    }

    /// Forward one screen, keeping two rows of context.
    pub fn page_down(&mut self) {
        self.shift_down(self.height.saturating_sub(2).max(1));
    }

    /// Back half a screen.
    pub fn page_up_half(&mut self) {
        self.shift_up((self.height / 2).max(1));
    }

    /// Forward half a screen.
    pub fn page_down_half(&mut self) {
        self.shift_down((self.height / 2).max(1));
    }

    fn shift_up(&mut self, rows: u64) {
        self.offset = self.offset.saturating_sub(rows.saturating_mul(self.width));
        if self.offset == 0 {
            self.cursor = 0;
        } else if self.cursor >= self.offset + self.page() {
            self.cursor = self.offset + (self.height - 1) * self.width;
        }
    }

    fn shift_down(&mut self, rows: u64) {
        let max = self.max_offset();
        self.offset = self
            .offset
            .saturating_add(rows.saturating_mul(self.width))
            .min(max);
        if self.cursor < self.offset {
            self.cursor = self.offset;
        } else if self.offset == max {
            self.cursor = self.last_row_head();
        }
    }

    /// First byte, first page.
    pub const fn page_top(&mut self) {
        self.offset = 0;
        self.cursor = 0;
    }

    /// Last page, cursor on the first byte of the last row.
    pub const fn page_end(&mut self) {
        self.offset = self.max_offset();
        self.cursor = self.last_row_head();
    }

    // -- Jumps --------------------------------------------------------------

    /// Jump to the decimal address written in the bytes around the cursor.
    ///
    /// Looks at [`JUMP_SCAN`] bytes on each side of the cursor, skips
    /// whitespace and NULs from the cursor forward, and reads the run of
    /// digits found there (extending backwards too). The address must be
    /// strictly between 0 and the length. On success the old position is
    /// pushed for [`jump_back`](Self::jump_back) and the target lands a
    /// third of a page from the top. Anything else is a no-op.
    pub fn jump_to(&mut self) {
        let start = self.cursor.saturating_sub(JUMP_SCAN);
        // Zero padding past a short read reads as NUL, which ends a run.
        let mut window = [0u8; 2 * JUMP_SCAN as usize];
        if let Err(err) = self.source.read_at(start, &mut window) {
            warn!(error = %err, "jump: read failed");
            return;
        }
        #[allow(clippy::cast_possible_truncation)]
        let at = (self.cursor - start) as usize;
        let Some(address) = scan_address(&window, at) else {
            debug!(cursor = self.cursor, "jump: no address under cursor");
            return;
        };
        if address == 0 || address >= self.length {
            debug!(address, length = self.length, "jump: address out of range");
            return;
        }
        self.jumps.push(Jump {
            cursor: self.cursor,
            offset: self.offset,
        });
        self.cursor = address;
        self.offset = (address / self.width)
            .saturating_sub(self.height / 3)
            .saturating_mul(self.width)
            .min(self.max_offset());
        debug!(address, depth = self.jumps.len(), "jump");
    }

    /// Return to the position saved by the latest [`jump_to`](Self::jump_to).
    pub fn jump_back(&mut self) {
        let Some(Jump { cursor, offset }) = self.jumps.pop() else {
            return;
        };
        self.cursor = cursor;
        self.offset = offset;
        // The data or the screen may have shrunk since the jump.
        self.clamp();
        debug!(cursor, depth = self.jumps.len(), "jump back");
    }

    // -- Dispatch -----------------------------------------------------------

    /// Apply a navigation command. Returns `false` (and does nothing) for
    /// commands that aren't navigation.
    pub fn apply(&mut self, resolved: Resolved) -> bool {
        let n = resolved.count_or_one();
        match resolved.command {
            Command::CursorUp => self.cursor_up(n),
            Command::CursorDown => self.cursor_down(n),
            Command::CursorLeft => self.cursor_left(n),
            Command::CursorRight => self.cursor_right(n),
            Command::CursorPrev => self.cursor_prev(n),
            Command::CursorNext => self.cursor_next(n),
            Command::CursorHead => self.cursor_head(),
            Command::CursorEnd => self.cursor_end(n),
            Command::ScrollUp => self.scroll_up(n),
            Command::ScrollDown => self.scroll_down(n),
            Command::PageUp => self.page_up(),
            Command::PageDown => self.page_down(),
            Command::PageUpHalf => self.page_up_half(),
            Command::PageDownHalf => self.page_down_half(),
            Command::PageTop => self.page_top(),
            Command::PageEnd => self.page_end(),
            Command::JumpTo => self.jump_to(),
            Command::JumpBack => self.jump_back(),
            _ => return false,
        }
        true
    }

    // -- Snapshot -----------------------------------------------------------

    /// Read the visible page and capture everything needed to draw it.
    ///
    /// The length is re-read first; if it changed, cursor and offset are
    /// clamped to the new data. The snapshot's `pending` is left empty for
    /// the caller to fill.
    ///
    /// # Errors
    ///
    /// Returns the source's I/O error. The window is unchanged in that case
    /// apart from a possibly refreshed length.
    pub fn state(&mut self) -> Result<State> {
        let length = self.source.length()?;
        if length != self.length {
            debug!(old = self.length, new = length, "length changed");
            self.length = length;
            self.clamp();
        }
        let page = usize::try_from(self.page())
            .map_err(|_| io::Error::other("viewport larger than address space"))?;
        let mut bytes = vec![0u8; page];
        let size = self.source.read_at(self.offset, &mut bytes)?;
        Ok(State {
            name: self.name.clone(),
            width: usize::try_from(self.width).unwrap_or(usize::MAX),
            offset: self.offset,
            cursor: self.cursor,
            bytes,
            size,
            length: self.length,
            mode: self.mode,
            pending: Vec::new(),
        })
    }
}

/// Find the decimal number at or after `at` in `window`.
///
/// Whitespace and NULs before the number are skipped. Returns `None` if no
/// digit follows, if the run reaches the end of the window (it may continue
/// past it), or if the value overflows.
fn scan_address(window: &[u8], at: usize) -> Option<u64> {
    const fn is_blank(b: u8) -> bool {
        matches!(b, b'\0' | b'\t' | b'\n' | b'\r' | b' ')
    }
    let mut start = at + window.get(at..)?.iter().take_while(|b| is_blank(**b)).count();
    if !window.get(start)?.is_ascii_digit() {
        return None;
    }
    while start > 0 && window[start - 1].is_ascii_digit() {
        start -= 1;
    }
    let end = start + window[start..].iter().take_while(|b| b.is_ascii_digit()).count();
    if end == window.len() {
        return None;
    }
    std::str::from_utf8(&window[start..end]).ok()?.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn window(length: usize, width: u64, height: u64) -> Window {
        window_with(vec![b' '; length], width, height)
    }

    fn window_with(bytes: Vec<u8>, width: u64, height: u64) -> Window {
        let mut w = Window::new("test", MemorySource::new(bytes), width).unwrap();
        w.set_height(height);
        w
    }

    fn at(w: &Window) -> (u64, u64) {
        (w.cursor(), w.offset())
    }

    fn assert_invariants(w: &Window) {
        let width = w.width();
        let page = w.height() * width;
        assert_eq!(w.offset() % width, 0, "offset not row aligned: {w:?}");
        assert!(w.offset() <= w.max_offset(), "offset past bound: {w:?}");
        assert!(w.cursor() <= w.last(), "cursor past data: {w:?}");
        assert!(w.offset() <= w.cursor(), "cursor above window: {w:?}");
        assert!(w.cursor() < w.offset() + page, "cursor below window: {w:?}");
    }

    /// Shares its bytes with the test so the data can change under the
    /// window.
    struct SharedSource(Rc<RefCell<Vec<u8>>>);

    impl ByteSource for SharedSource {
        fn length(&mut self) -> io::Result<u64> {
            Ok(self.0.borrow().len() as u64)
        }

        fn read_at(&mut self, start: u64, buf: &mut [u8]) -> io::Result<usize> {
            MemorySource::new(self.0.borrow().clone()).read_at(start, buf)
        }
    }

    struct FailingSource;

    impl ByteSource for FailingSource {
        fn length(&mut self) -> io::Result<u64> {
            Err(io::Error::other("disk on fire"))
        }

        fn read_at(&mut self, _: u64, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    // ── Construction ──────────────────────────────────────────────────────

    #[test]
    fn new_starts_at_top() {
        let w = window(400, 16, 10);
        assert_eq!(at(&w), (0, 0));
        assert_eq!(w.length(), 400);
        assert_eq!(w.mode(), Mode::Normal);
        assert!(w.jumps().is_empty());
    }

    #[test]
    fn zero_width_is_floored() {
        let w = window(10, 0, 0);
        assert_eq!(w.width(), 1);
        assert_eq!(w.height(), 1);
    }

    #[test]
    fn new_fails_when_length_fails() {
        let err = Window::new("x", FailingSource, 16).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn open_reads_file_and_names_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, [7u8; 40]).unwrap();
        let mut w = Window::open(&path, 16).unwrap();
        assert_eq!(w.name(), "data.bin");
        assert_eq!(w.length(), 40);
        let state = w.state().unwrap();
        assert_eq!(state.size, 16);
        w.close().unwrap();
    }

    #[test]
    fn open_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.bin");
        match Window::open(&path, 16).unwrap_err() {
            Error::Open { path: p, source } => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other @ Error::Io(_) => panic!("expected Open, got {other:?}"),
        }
    }

    // ── Cursor motions ────────────────────────────────────────────────────

    #[test]
    fn cursor_up_at_top_is_noop() {
        let mut w = window(400, 16, 10);
        for _ in 0..5 {
            w.cursor_up(1);
            w.cursor_up(100);
            assert_eq!(at(&w), (0, 0));
        }
    }

    #[test]
    fn cursor_down_three_rows() {
        let mut w = window(100, 8, 10);
        w.cursor_down(3);
        assert_eq!(at(&w), (24, 0));
    }

    #[test]
    fn cursor_down_zero_count_moves_one() {
        let mut w = window(100, 8, 10);
        w.cursor_down(0);
        assert_eq!(w.cursor(), 8);
    }

    #[test]
    fn cursor_down_clamps_to_last_byte() {
        // 100 bytes, width 8: the last row holds 96..=99.
        let mut w = window(100, 8, 4);
        w.cursor_end(1);
        assert_eq!(w.cursor(), 7);
        w.cursor_down(1000);
        assert_eq!(w.cursor(), 99);
        assert_eq!(w.offset(), 72);
        assert_invariants(&w);
    }

    #[test]
    fn cursor_down_scrolls_to_keep_cursor_on_last_row() {
        let mut w = window(400, 16, 10);
        w.cursor_down(10);
        assert_eq!(at(&w), (160, 16));
    }

    #[test]
    fn cursor_up_snaps_offset_to_cursor_row() {
        let mut w = window(400, 16, 10);
        w.page_end();
        w.cursor_up(20);
        assert_eq!(at(&w), (64, 64));
    }

    #[test]
    fn cursor_left_right_stay_in_row() {
        let mut w = window(400, 16, 10);
        w.cursor_down(1);
        w.cursor_right(5);
        assert_eq!(w.cursor(), 21);
        w.cursor_right(100);
        assert_eq!(w.cursor(), 31);
        w.cursor_left(3);
        assert_eq!(w.cursor(), 28);
        w.cursor_left(100);
        assert_eq!(w.cursor(), 16);
    }

    #[test]
    fn cursor_right_stops_at_last_byte() {
        let mut w = window(10, 16, 10);
        w.cursor_right(100);
        assert_eq!(w.cursor(), 9);
    }

    #[test]
    fn cursor_prev_next_cross_rows() {
        let mut w = window(400, 16, 10);
        w.cursor_next(20);
        assert_eq!(w.cursor(), 20);
        w.cursor_prev(5);
        assert_eq!(w.cursor(), 15);
        w.cursor_prev(100);
        assert_eq!(w.cursor(), 0);
        w.cursor_next(10_000);
        assert_eq!(at(&w), (399, 240));
    }

    #[test]
    fn cursor_head_and_end() {
        let mut w = window(400, 16, 10);
        w.cursor_next(37);
        w.cursor_head();
        assert_eq!(w.cursor(), 32);
        w.cursor_end(1);
        assert_eq!(w.cursor(), 47);
        w.cursor_end(3);
        assert_eq!(w.cursor(), 79);
        w.cursor_end(u64::MAX);
        assert_eq!(at(&w), (399, 240));
    }

    // ── Scrolling ─────────────────────────────────────────────────────────

    #[test]
    fn scroll_down_pushes_cursor() {
        let mut w = window(400, 16, 10);
        w.scroll_down(1);
        assert_eq!(at(&w), (16, 16));
        w.scroll_down(100);
        assert_eq!(at(&w), (240, 240));
    }

    #[test]
    fn scroll_down_leaves_visible_cursor_alone() {
        let mut w = window(400, 16, 10);
        w.cursor_down(5);
        w.scroll_down(2);
        assert_eq!(at(&w), (80, 32));
    }

    #[test]
    fn scroll_up_pulls_cursor() {
        let mut w = window(400, 16, 10);
        w.scroll_down(100);
        w.scroll_up(100);
        assert_eq!(at(&w), (144, 0));
    }

    #[test]
    fn scroll_short_data_is_noop() {
        let mut w = window(10, 16, 10);
        w.scroll_down(5);
        assert_eq!(at(&w), (0, 0));
        w.scroll_up(5);
        assert_eq!(at(&w), (0, 0));
    }

    // ── Paging ────────────────────────────────────────────────────────────

    #[test]
    fn page_end_then_top() {
        let mut w = window(400, 16, 10);
        w.page_end();
        assert_eq!(at(&w), (384, 240));
        w.page_top();
        assert_eq!(at(&w), (0, 0));
    }

    #[test]
    fn page_down_and_up() {
        let mut w = window(400, 16, 10);
        w.page_down();
        assert_eq!(at(&w), (128, 128));
        w.page_down();
        assert_eq!(at(&w), (240, 240));
        w.page_down();
        assert_eq!(at(&w), (384, 240));
        w.page_up();
        assert_eq!(at(&w), (256, 112));
        w.page_up();
        assert_eq!(at(&w), (0, 0));
    }

    #[test]
    fn half_pages() {
        let mut w = window(400, 16, 10);
        w.page_down_half();
        assert_eq!(at(&w), (80, 80));
        w.page_up_half();
        assert_eq!(at(&w), (0, 0));
    }

    #[test]
    fn tiny_viewport_still_pages() {
        let mut w = window(400, 16, 1);
        w.page_down();
        assert_eq!(at(&w), (16, 16));
        w.page_down_half();
        assert_eq!(at(&w), (32, 32));
        assert_invariants(&w);
    }

    #[test]
    fn page_end_of_empty_data() {
        let mut w = window(0, 16, 10);
        w.page_end();
        assert_eq!(at(&w), (0, 0));
        w.cursor_down(3);
        w.cursor_next(3);
        w.cursor_end(1);
        assert_eq!(at(&w), (0, 0));
    }

    // ── Jumps ─────────────────────────────────────────────────────────────

    fn with_text(len: usize, at: usize, text: &[u8]) -> Vec<u8> {
        let mut bytes = vec![b' '; len];
        bytes[at..at + text.len()].copy_from_slice(text);
        bytes
    }

    #[test]
    fn jump_to_and_back() {
        let mut w = window_with(with_text(400, 0, b"200"), 16, 10);
        w.jump_to();
        assert_eq!(at(&w), (200, 144));
        assert_eq!(w.jumps().len(), 1);
        w.jump_back();
        assert_eq!(at(&w), (0, 0));
        assert!(w.jumps().is_empty());
    }

    #[test]
    fn jump_skips_leading_blanks() {
        let mut w = window_with(with_text(400, 6, b"\t\n 123x"), 16, 10);
        w.cursor_next(5);
        w.jump_to();
        assert_eq!(w.cursor(), 123);
    }

    #[test]
    fn jump_reads_digits_before_cursor() {
        let mut w = window_with(with_text(400, 20, b"345"), 16, 10);
        w.cursor_next(22);
        w.jump_to();
        assert_eq!(w.cursor(), 345);
    }

    #[test]
    fn nested_jumps_unwind_in_order() {
        let mut bytes = with_text(400, 0, b"200");
        bytes[200..203].copy_from_slice(b"300");
        let mut w = window_with(bytes, 16, 10);
        w.jump_to();
        w.jump_to();
        assert_eq!(at(&w), (300, 240));
        w.jump_back();
        assert_eq!(at(&w), (200, 144));
        w.jump_back();
        assert_eq!(at(&w), (0, 0));
        w.jump_back();
        assert_eq!(at(&w), (0, 0));
    }

    #[test]
    fn jump_without_address_is_noop() {
        for text in [&b"abc"[..], b"0", b"400", b"99999999999999999999999"] {
            let mut w = window_with(with_text(400, 0, text), 16, 10);
            w.jump_to();
            assert_eq!(at(&w), (0, 0), "{:?}", String::from_utf8_lossy(text));
            assert!(w.jumps().is_empty());
        }
    }

    #[test]
    fn jump_run_touching_window_end_is_noop() {
        // Digits from the cursor to the end of the 100-byte scan window.
        let mut bytes = vec![b'1'; 400];
        bytes[..50].fill(b' ');
        let mut w = window_with(bytes, 16, 10);
        w.cursor_next(50);
        let before = at(&w);
        w.jump_to();
        assert_eq!(at(&w), before);
    }

    #[test]
    fn jump_at_end_of_short_data() {
        let mut w = window_with(b"  42".to_vec(), 4, 2);
        w.jump_to();
        assert_eq!(w.jumps().len(), 0, "42 is past the 4-byte length");
        let mut w = window_with(with_text(60, 56, b"12"), 4, 3);
        w.page_end();
        w.jump_to();
        assert_eq!(w.cursor(), 12);
        assert_invariants(&w);
    }

    #[test]
    fn jump_offset_is_clamped() {
        let mut w = window_with(with_text(400, 0, b"399"), 16, 10);
        w.jump_to();
        assert_eq!(at(&w), (399, 240));
    }

    #[test]
    fn scan_address_cases() {
        assert_eq!(scan_address(b"  12 ", 0), Some(12));
        assert_eq!(scan_address(b"x12 ", 2), Some(12));
        assert_eq!(scan_address(b"x  ", 0), None);
        assert_eq!(scan_address(b"   ", 0), None);
        assert_eq!(scan_address(b" 12", 0), None);
        assert_eq!(scan_address(b"\0\r7\0", 0), Some(7));
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    #[test]
    fn apply_navigation_with_count() {
        let mut w = window(100, 8, 10);
        assert!(w.apply(Resolved {
            command: Command::CursorDown,
            count: 3
        }));
        assert_eq!(w.cursor(), 24);
        assert!(w.apply(Resolved::new(Command::CursorRight)));
        assert_eq!(w.cursor(), 25);
    }

    #[test]
    fn apply_ignores_editing_commands() {
        let mut w = window(100, 8, 10);
        for cmd in [Command::DeleteByte, Command::Quit, Command::StartInsert] {
            assert!(!w.apply(Resolved::new(cmd)));
        }
        assert_eq!(at(&w), (0, 0));
    }

    // ── Height and length changes ─────────────────────────────────────────

    #[test]
    fn shrinking_height_keeps_cursor_visible() {
        let mut w = window(400, 16, 10);
        w.cursor_down(9);
        w.set_height(4);
        assert_eq!(at(&w), (144, 96));
        assert_invariants(&w);
    }

    #[test]
    fn growing_height_reclamps_offset() {
        let mut w = window(400, 16, 10);
        w.page_end();
        w.set_height(20);
        assert_eq!(at(&w), (384, 80));
        assert_invariants(&w);
    }

    #[test]
    fn state_reads_page() {
        let bytes: Vec<u8> = (0..=255).collect();
        let mut w = window_with(bytes, 16, 4);
        w.cursor_down(5);
        let state = w.state().unwrap();
        assert_eq!(state.name, "test");
        assert_eq!(state.width, 16);
        assert_eq!(state.offset, 32);
        assert_eq!(state.cursor, 80);
        assert_eq!(state.size, 64);
        assert_eq!(state.bytes[0], 32);
        assert_eq!(state.length, 256);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn state_short_last_page() {
        let mut w = window(20, 16, 4);
        let state = w.state().unwrap();
        assert_eq!(state.bytes.len(), 64);
        assert_eq!(state.size, 20);
    }

    #[test]
    fn state_refreshes_length() {
        let data = Rc::new(RefCell::new(vec![0u8; 400]));
        let mut w = Window::new("shared", SharedSource(Rc::clone(&data)), 16).unwrap();
        w.set_height(10);
        w.page_end();
        data.borrow_mut().truncate(100);
        let state = w.state().unwrap();
        assert_eq!(state.length, 100);
        assert_eq!(state.cursor, 99);
        assert_eq!(state.offset, 0);
        assert_invariants(&w);
    }

    #[test]
    fn state_propagates_read_errors() {
        struct Flaky;
        impl ByteSource for Flaky {
            fn length(&mut self) -> io::Result<u64> {
                Ok(10)
            }
            fn read_at(&mut self, _: u64, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("bad sector"))
            }
        }
        let mut w = Window::new("flaky", Flaky, 16).unwrap();
        assert!(matches!(w.state(), Err(Error::Io(_))));
        w.jump_to();
        assert_eq!(at(&w), (0, 0));
    }

    // ── Invariants ────────────────────────────────────────────────────────

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Apply(Command, u64),
        Height(u64),
    }

    const MOTIONS: [Command; 18] = [
        Command::CursorUp,
        Command::CursorDown,
        Command::CursorLeft,
        Command::CursorRight,
        Command::CursorPrev,
        Command::CursorNext,
        Command::CursorHead,
        Command::CursorEnd,
        Command::ScrollUp,
        Command::ScrollDown,
        Command::PageUp,
        Command::PageDown,
        Command::PageUpHalf,
        Command::PageDownHalf,
        Command::PageTop,
        Command::PageEnd,
        Command::JumpTo,
        Command::JumpBack,
    ];

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            8 => (0..MOTIONS.len(), 0u64..40).prop_map(|(i, n)| Op::Apply(MOTIONS[i], n)),
            1 => (0u64..30).prop_map(Op::Height),
        ]
    }

    proptest! {
        #[test]
        fn motions_keep_cursor_in_view(
            bytes in proptest::collection::vec(
                prop_oneof![Just(b' '), (b'0'..=b'9'), any::<u8>()],
                0..1500,
            ),
            width in 1u64..33,
            height in 1u64..25,
            ops in proptest::collection::vec(op(), 0..60),
        ) {
            let mut w = window_with(bytes, width, height);
            assert_invariants(&w);
            for op in ops {
                match op {
                    Op::Apply(command, count) => {
                        w.apply(Resolved { command, count });
                    }
                    Op::Height(h) => w.set_height(h),
                }
                assert_invariants(&w);
            }
        }

        #[test]
        fn cursor_up_from_top_is_idempotent(count in 0u64..1000, width in 1u64..33) {
            let mut w = window(500, width, 5);
            w.cursor_up(count);
            prop_assert_eq!(at(&w), (0, 0));
        }
    }
}

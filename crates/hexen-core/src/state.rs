//! Render snapshots.
//!
//! A [`State`] is everything a front end needs to draw one frame. It is
//! built by [`Window::state`](crate::window::Window::state) and owned by the
//! caller; later navigation doesn't change it.

use crate::key::Key;
use crate::mode::Mode;

/// An immutable view of the window for one redraw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    /// Display name (the file's base name).
    pub name: String,
    /// Bytes per row.
    pub width: usize,
    /// Address of `bytes[0]`.
    pub offset: u64,
    /// Absolute address of the selected byte.
    pub cursor: u64,
    /// One page of bytes starting at `offset`, zero-padded past `size`.
    pub bytes: Vec<u8>,
    /// How many of `bytes` hold real data.
    pub size: usize,
    /// Total length of the data.
    pub length: u64,
    pub mode: Mode,
    /// Keys of a half-typed chord, oldest first.
    pub pending: Vec<Key>,
}

impl State {
    /// The bytes that hold real data.
    #[must_use]
    pub fn visible(&self) -> &[u8] {
        &self.bytes[..self.size.min(self.bytes.len())]
    }

    /// Number of rows in the page (including rows past the end of data).
    #[must_use]
    pub const fn rows(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.bytes.len() / self.width
        }
    }

    /// Index of the cursor within [`bytes`](Self::bytes), if it is on this
    /// page.
    #[must_use]
    pub fn cursor_index(&self) -> Option<usize> {
        let rel = self.cursor.checked_sub(self.offset)?;
        let rel = usize::try_from(rel).ok()?;
        (rel < self.bytes.len()).then_some(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> State {
        State {
            name: "a.bin".into(),
            width: 4,
            offset: 8,
            cursor: 10,
            bytes: vec![1, 2, 3, 4, 5, 0, 0, 0],
            size: 5,
            length: 13,
            mode: Mode::Normal,
            pending: Vec::new(),
        }
    }

    #[test]
    fn visible_stops_at_size() {
        assert_eq!(page().visible(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn rows_counts_padding() {
        assert_eq!(page().rows(), 2);
        assert_eq!(State::default().rows(), 0);
    }

    #[test]
    fn cursor_index_relative_to_offset() {
        assert_eq!(page().cursor_index(), Some(2));
        let before = State {
            cursor: 3,
            ..page()
        };
        assert_eq!(before.cursor_index(), None);
        let after = State {
            cursor: 16,
            ..page()
        };
        assert_eq!(after.cursor_index(), None);
    }
}

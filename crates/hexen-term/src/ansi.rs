// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. The hex
// view repaints whole rows, so there is no cell diffing here: just the
// byte-level encoding of the handful of commands the renderer needs.
//
// Cursor positions are 0-indexed in the API and converted to the 1-indexed
// coordinates the terminal expects.

use std::io::{self, Write};

use bitflags::bitflags;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` (CUP).
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the whole screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Clear from the cursor to the end of the line (EL 0).
#[inline]
pub fn clear_to_eol(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Reset all SGR attributes.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Stop wrapping at the right margin (DECAWM reset): rows wider than the
/// terminal are clipped.
#[inline]
pub fn disable_autowrap(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?7l")
}

/// Wrap at the right margin again.
#[inline]
pub fn enable_autowrap(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?7h")
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags! {
    /// SGR text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attr: u8 {
        const BOLD      = 0b0001;
        const DIM       = 0b0010;
        const UNDERLINE = 0b0100;
        const INVERSE   = 0b1000;
    }
}

/// Emit SGR codes for `attr` as one CSI sequence (`\x1b[1;7m`). Writes
/// nothing for an empty set.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }
    let codes: Vec<&str> = [
        (Attr::BOLD, "1"),
        (Attr::DIM, "2"),
        (Attr::UNDERLINE, "4"),
        (Attr::INVERSE, "7"),
    ]
    .into_iter()
    .filter(|(flag, _)| attr.contains(*flag))
    .map(|(_, code)| code)
    .collect();
    write!(w, "\x1b[{}m", codes.join(";"))
}

// ─── Synchronized Output ─────────────────────────────────────────────────────

/// Begin synchronized output (DEC 2026): the terminal holds the frame until
/// [`end_sync`].
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Alternate Screen ───────────────────────────────────────────────────────

/// Enter the alternate screen buffer (DEC 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Leave the alternate screen and restore what was there before.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Cursor Shape ───────────────────────────────────────────────────────────

/// Terminal cursor shape (DECSCUSR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    /// Terminal default.
    #[default]
    Default,
    SteadyBlock,
    SteadyUnderline,
    SteadyBar,
}

/// Set the cursor shape.
#[inline]
pub fn set_cursor_shape(w: &mut impl Write, shape: CursorShape) -> io::Result<()> {
    let n: u8 = match shape {
        CursorShape::Default => 0,
        CursorShape::SteadyBlock => 2,
        CursorShape::SteadyUnderline => 4,
        CursorShape::SteadyBar => 6,
    };
    write!(w, "\x1b[{n} q")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

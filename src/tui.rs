// SPDX-License-Identifier: MIT
//
// Terminal front end: draws the hex dump and feeds keys to the editor.
//
// Layout:
//
//   ┌───────────────────────────────────────────────────────────────────┐
//   │ 00000000  7f 45 4c 46 02 01 01 00  00 00 00 00 00 00 00 00  .ELF...│  ← rows − 1
//   │ 00000010  03 00 3e 00 01 00 00 00  40 10 00 00 00 00 00 00  ..>....│
//   ├───────────────────────────────────────────────────────────────────┤
//   │ NORMAL  a.out                    2g  00000010 (16) / 14328        │  ← status (INVERSE)
//   └───────────────────────────────────────────────────────────────────┘
//
// Every frame repaints every row into one buffer and writes it inside a
// synchronized-output block. Rows past the end of the data are blank.
//
// Input comes from hexen-term's reader thread: key events are named
// ("j", "c-f", "pgdn") and sent to the editor as key tokens; resizes are
// sent as the new number of data rows.

use std::io::{self, Write};
use std::sync::mpsc::Sender;

use hexen_core::Result;
use hexen_core::key::Key;
use hexen_core::mode::{CursorShape as ModeShape, Mode};
use hexen_core::state::State;
use hexen_core::ui::{Frontend, Input};
use hexen_term::ansi::{self, Attr, CursorShape};
use hexen_term::input::key_name;
use hexen_term::reader::{Event, StdinReader};
use hexen_term::terminal::{Size, Terminal, get_size};
use tracing::{debug, trace};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Columns taken by the address and the gap after it.
const ADDRESS_WIDTH: usize = 10;

// ─── TerminalUi ─────────────────────────────────────────────────────────────

/// The interactive front end on stdin/stdout.
pub struct TerminalUi {
    term: Terminal,
    reader: Option<StdinReader>,
    frame: Vec<u8>,
}

impl TerminalUi {
    #[must_use]
    pub fn new() -> Self {
        Self {
            term: Terminal::new(),
            reader: None,
            frame: Vec::with_capacity(16 * 1024),
        }
    }
}

impl Frontend for TerminalUi {
    fn init(&mut self, events: Sender<Input>) -> Result<()> {
        self.term.enter()?;
        debug!(size = ?self.term.size(), "terminal entered");

        let reader = StdinReader::spawn(move |event| {
            let input = match event {
                Event::Key(key) => {
                    let Some(name) = key_name(&key) else {
                        trace!(?key, "key has no name");
                        return true;
                    };
                    Input::Key(Key::from(name))
                }
                Event::Resize(size) => Input::Resize(data_rows(size)),
            };
            events.send(input).is_ok()
        })?;
        self.reader = Some(reader);
        Ok(())
    }

    fn height(&self) -> u64 {
        data_rows(self.term.size())
    }

    fn redraw(&mut self, state: &State) -> Result<()> {
        if let Some(size) = get_size() {
            self.term.set_size(size);
        }
        self.frame.clear();
        render(&mut self.frame, state, self.term.size())?;

        let mut out = io::stdout().lock();
        out.write_all(&self.frame)?;
        out.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut reader) = self.reader.take() {
            reader.stop();
        }
        self.term.leave()?;
        debug!("terminal restored");
        Ok(())
    }
}

impl Default for TerminalUi {
    fn default() -> Self {
        Self::new()
    }
}

/// Rows available for data: everything but the status line, at least one.
fn data_rows(size: Size) -> u64 {
    u64::from(size.rows.saturating_sub(1).max(1))
}

// ─── Rendering ──────────────────────────────────────────────────────────────

/// Paint one full frame for `state` on a terminal of `size`.
fn render(w: &mut impl Write, state: &State, size: Size) -> io::Result<()> {
    ansi::begin_sync(w)?;
    ansi::cursor_hide(w)?;

    let status_row = size.rows.saturating_sub(1);
    let cursor = state.cursor_index();
    for y in 0..status_row {
        ansi::cursor_to(w, 0, y)?;
        let row = usize::from(y);
        if row < state.rows() {
            write_row(w, state, row, cursor)?;
        }
        ansi::clear_to_eol(w)?;
    }

    ansi::cursor_to(w, 0, status_row)?;
    ansi::attrs(w, Attr::INVERSE)?;
    w.write_all(status_line(state, usize::from(size.cols)).as_bytes())?;
    ansi::reset(w)?;
    ansi::clear_to_eol(w)?;

    if let Some(index) = cursor.filter(|_| state.width > 0) {
        let x = hex_column(index % state.width, state.width);
        let y = index / state.width;
        ansi::cursor_to(
            w,
            u16::try_from(x).unwrap_or(u16::MAX),
            u16::try_from(y).unwrap_or(u16::MAX),
        )?;
        ansi::set_cursor_shape(w, cursor_shape(state.mode))?;
        ansi::cursor_show(w)?;
    }

    ansi::end_sync(w)
}

/// One dump row: address, hex cells split in the middle, ASCII column.
fn write_row(w: &mut impl Write, state: &State, row: usize, cursor: Option<usize>) -> io::Result<()> {
    let width = state.width;
    let start = row * width;
    let half = width / 2;
    write!(w, "{:08x}  ", state.offset + start as u64)?;

    for col in 0..width {
        if col > 0 {
            w.write_all(if col == half { b"  " } else { b" " })?;
        }
        let i = start + col;
        let hex = if i < state.size {
            format!("{:02x}", state.bytes[i])
        } else {
            "  ".to_owned()
        };
        cell(w, &hex, cursor == Some(i))?;
    }

    w.write_all(b"  ")?;
    for i in start..(start + width).min(state.size) {
        let mut buf = [0u8; 4];
        cell(w, printable(state.bytes[i]).encode_utf8(&mut buf), cursor == Some(i))?;
    }
    Ok(())
}

fn cell(w: &mut impl Write, text: &str, selected: bool) -> io::Result<()> {
    if selected {
        ansi::attrs(w, Attr::INVERSE)?;
        w.write_all(text.as_bytes())?;
        ansi::reset(w)
    } else {
        w.write_all(text.as_bytes())
    }
}

/// Screen column of the hex cell for byte `col` of a row.
const fn hex_column(col: usize, width: usize) -> usize {
    let half = width / 2;
    let gap = if half > 0 && col >= half { 1 } else { 0 };
    ADDRESS_WIDTH + col * 3 + gap
}

const fn printable(byte: u8) -> char {
    if byte.is_ascii_graphic() || byte == b' ' {
        byte as char
    } else {
        '.'
    }
}

const fn cursor_shape(mode: Mode) -> CursorShape {
    match mode.cursor_shape() {
        ModeShape::SteadyBlock => CursorShape::SteadyBlock,
        ModeShape::SteadyBar => CursorShape::SteadyBar,
        ModeShape::SteadyUnderline => CursorShape::SteadyUnderline,
    }
}

// ─── Status Line ────────────────────────────────────────────────────────────

/// Mode and file name on the left; pending keys, cursor address and length
/// on the right. Exactly `cols` columns wide; the name gives way first.
fn status_line(state: &State, cols: usize) -> String {
    let mode = format!(" {} ", state.mode.display_name());
    let pending: String = state.pending.iter().map(Key::as_str).collect();
    let position = format!(
        " {pending}  {:08x} ({}) / {} ",
        state.cursor, state.cursor, state.length
    );

    let room = cols.saturating_sub(mode.width() + position.width() + 1);
    let mut line = format!("{mode} {}", truncate(&state.name, room));
    let gap = cols.saturating_sub(line.width() + position.width());
    line.push_str(&" ".repeat(gap));
    line.push_str(&position);

    let mut line = truncate(&line, cols);
    let fill = cols.saturating_sub(line.width());
    line.push_str(&" ".repeat(fill));
    line
}

/// Cut `s` to at most `max` display columns, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_owned();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

// ─── Tests ──────────────────────────────────────────────────────────────────

// SPDX-License-Identifier: MIT
//
// Terminal input parser and key naming.
//
// Turns raw stdin bytes into key events, then key events into the key
// tokens the editor core binds ("j", "c-a", "pgdn", "escape"). Handles:
//
// - ASCII and UTF-8 characters
// - C0 control bytes as Ctrl+key (0x08 kept apart from DEL as a second
//   backspace, 0x0A kept apart from CR as Ctrl+J)
// - Legacy CSI sequences (arrows, Home/End, PageUp/PageDown, Delete, F-keys)
// - SS3 sequences (arrows, F1-F4 from some terminals)
// - Alt+key (ESC followed by a printable character)
//
// The parser keeps a small buffer because an escape sequence can be split
// across reads. A lone ESC stays pending until `flush` is called after a
// short idle timeout, at which point it becomes the Escape key.

use bitflags::bitflags;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// A key press with Ctrl held.
    #[must_use]
    pub const fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::CTRL,
        }
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A character (for Ctrl combinations, the character the control byte
    /// is named after: `'a'` for 0x01, `']'` for 0x1D).
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Function keys ───────────────────────────────────────────
    /// F1 through F20.
    F(u8),
}

bitflags! {
    /// Keyboard modifier flags, in xterm's `param = 1 + bitmask` encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
    }
}

// ─── Key Names ──────────────────────────────────────────────────────────────

/// The editor's name for a key, or `None` for keys it has no name for
/// (Alt combinations).
///
/// Printable characters name themselves, except space. Control keys are
/// `c-<char>`. Shift on named keys is dropped: terminals report Shift+Up
/// and Up differently, but the editor binds neither apart.
#[must_use]
pub fn key_name(key: &KeyEvent) -> Option<String> {
    if key.modifiers.contains(Modifiers::ALT) {
        return None;
    }
    let ctrl = key.modifiers.contains(Modifiers::CTRL);
    let name = match key.code {
        KeyCode::Char(c) if ctrl => format!("c-{}", c.to_ascii_lowercase()),
        KeyCode::Char(' ') => "space".into(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Backspace if ctrl => "backspace2".into(),
        KeyCode::Backspace => "backspace".into(),
        KeyCode::Enter => "enter".into(),
        KeyCode::Tab => "tab".into(),
        KeyCode::Escape => "escape".into(),
        KeyCode::Delete => "delete".into(),
        KeyCode::Insert => "insert".into(),
        KeyCode::Up => "up".into(),
        KeyCode::Down => "down".into(),
        KeyCode::Left => "left".into(),
        KeyCode::Right => "right".into(),
        KeyCode::Home => "home".into(),
        KeyCode::End => "end".into(),
        KeyCode::PageUp => "pgup".into(),
        KeyCode::PageDown => "pgdn".into(),
        KeyCode::F(n) => format!("f{n}"),
    };
    Some(name)
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Terminal input parser.
///
/// Feed raw bytes via [`advance`](Parser::advance). Incomplete sequences
/// are kept and resumed when more bytes arrive.
#[derive(Debug, Default)]
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(16),
        }
    }

    /// Feed raw bytes and return every key that can be decoded so far.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        self.buf.drain(..pos);
        keys
    }

    /// Are there bytes waiting for the rest of a sequence?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Give up waiting: a pending ESC becomes the Escape key and any other
    /// leftover bytes become literal keys.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let keys = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(KeyEvent::plain(KeyCode::Escape)),
                b @ 0x20..=0x7E => Some(KeyEvent::plain(KeyCode::Char(b as char))),
                _ => None,
            })
            .collect();
        self.buf.clear();
        keys
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────

/// Result of trying to parse one key from the front of the buffer.
enum Parsed {
    Key(KeyEvent, usize),
    Incomplete,
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Skip(0);
    };

    match first {
        0x1B => parse_escape(buf),
        0x00 => Parsed::Key(KeyEvent::ctrl(KeyCode::Char('@')), 1),
        0x08 => Parsed::Key(KeyEvent::ctrl(KeyCode::Backspace), 1),
        0x09 => Parsed::Key(KeyEvent::plain(KeyCode::Tab), 1),
        0x0D => Parsed::Key(KeyEvent::plain(KeyCode::Enter), 1),
        b @ 0x01..=0x1A => Parsed::Key(KeyEvent::ctrl(KeyCode::Char((b - 1 + b'a') as char)), 1),
        0x1C => Parsed::Key(KeyEvent::ctrl(KeyCode::Char('\\')), 1),
        0x1D => Parsed::Key(KeyEvent::ctrl(KeyCode::Char(']')), 1),
        0x1E => Parsed::Key(KeyEvent::ctrl(KeyCode::Char('^')), 1),
        0x1F => Parsed::Key(KeyEvent::ctrl(KeyCode::Char('_')), 1),
        0x7F => Parsed::Key(KeyEvent::plain(KeyCode::Backspace), 1),
        b @ 0x20..=0x7E => Parsed::Key(KeyEvent::plain(KeyCode::Char(b as char)), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&second) = buf.get(1) else {
        return Parsed::Incomplete;
    };
    match second {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        b @ 0x20..=0x7E => Parsed::Key(
            KeyEvent {
                code: KeyCode::Char(b as char),
                modifiers: Modifiers::ALT,
            },
            2,
        ),
        // ESC ESC, or ESC before a control byte: the first is a real Escape.
        _ => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
    }
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    // Parameter bytes 0x30..=0x3F, intermediates 0x20..=0x2F, then one
    // final byte 0x40..=0x7E.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Parsed::Incomplete;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    let params = parse_csi_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params
        .get(1)
        .map_or(Modifiers::empty(), |p| decode_modifiers(*p));

    let code = if buf[end] == b'~' {
        match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            n @ 11..=15 => KeyCode::F(function_key(n, 11, 1)),
            n @ 17..=21 => KeyCode::F(function_key(n, 17, 6)),
            n @ 23..=26 => KeyCode::F(function_key(n, 23, 11)),
            n @ 28..=29 => KeyCode::F(function_key(n, 28, 15)),
            n @ 31..=34 => KeyCode::F(function_key(n, 31, 17)),
            _ => return Parsed::Skip(consumed),
        }
    } else {
        match buf[end] {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            b'P' => KeyCode::F(1),
            b'Q' => KeyCode::F(2),
            b'R' => KeyCode::F(3),
            b'S' => KeyCode::F(4),
            b'Z' => {
                return Parsed::Key(
                    KeyEvent {
                        code: KeyCode::Tab,
                        modifiers: Modifiers::SHIFT,
                    },
                    consumed,
                );
            }
            _ => return Parsed::Skip(consumed),
        }
    };

    Parsed::Key(KeyEvent { code, modifiers }, consumed)
}

/// Map a `CSI n ~` code in a contiguous block to its F-key number.
#[allow(clippy::cast_possible_truncation)]
const fn function_key(n: u16, block_start: u16, first_key: u8) -> u8 {
    // Blocks are at most five codes wide.
    (n - block_start) as u8 + first_key
}

// ── SS3 (Single Shift 3) ───────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
    };
    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };
    Parsed::Key(KeyEvent::plain(code), 3)
}

// ── UTF-8 ──────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);
    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }
    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| {
            Parsed::Key(KeyEvent::plain(KeyCode::Char(ch)), expected)
        })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Parse semicolon-separated CSI parameters. Colon sub-parameters are
/// skipped. An empty parameter reads as 0.
fn parse_csi_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|b| *b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// Decode an xterm modifier parameter (`1 + bitmask`). Unknown bits are
/// dropped.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

/// Expected byte length of a UTF-8 character from its lead byte, 0 if the
/// byte can't start one.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

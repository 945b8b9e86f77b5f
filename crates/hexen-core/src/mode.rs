//! Interaction modes.
//!
//! The window is always in exactly one [`Mode`], and each mode has its own
//! key bindings (see [`keymap`](crate::keymap)):
//!
//! | Mode        | Cursor shape | Counts | Purpose                        |
//! |-------------|--------------|--------|--------------------------------|
//! | Normal      | Block        | yes    | Navigation, byte commands      |
//! | Insert      | Bar          | no     | Typing new bytes               |
//! | Replace     | Underline    | no     | Overwriting bytes              |
//! | CommandLine | Bar          | no     | `:` commands                   |
//!
//! Mode changes are a pure function of the current mode and the resolved
//! command, [`Mode::transition`], so they can be tested without a window.

use std::fmt;

use crate::command::Command;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// The current interaction mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Keys are commands.
    #[default]
    Normal,
    /// Keys insert bytes before the cursor.
    Insert,
    /// Keys overwrite the byte under the cursor.
    Replace,
    /// Keys edit the `:` command line at the bottom of the screen.
    CommandLine,
}

impl Mode {
    /// All modes, in display order.
    pub const ALL: [Self; 4] = [Self::Normal, Self::Insert, Self::Replace, Self::CommandLine];

    /// Human-readable name for the status line.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Replace => "REPLACE",
            Self::CommandLine => "COMMAND",
        }
    }

    /// The terminal cursor shape for this mode.
    #[must_use]
    pub const fn cursor_shape(self) -> CursorShape {
        match self {
            Self::Normal => CursorShape::SteadyBlock,
            Self::Insert | Self::CommandLine => CursorShape::SteadyBar,
            Self::Replace => CursorShape::SteadyUnderline,
        }
    }

    /// True if the mode's key manager parses repeat counts.
    #[inline]
    #[must_use]
    pub const fn counts(self) -> bool {
        matches!(self, Self::Normal)
    }

    /// True if navigation commands move the byte cursor in this mode.
    ///
    /// In command-line mode the arrow keys move within the command text.
    #[inline]
    #[must_use]
    pub const fn navigates(self) -> bool {
        !matches!(self, Self::CommandLine)
    }

    /// The mode after `command` is applied in `self`.
    ///
    /// Commands that don't change mode (and mode commands issued from the
    /// wrong mode) leave the mode as it is.
    #[must_use]
    pub const fn transition(self, command: Command) -> Self {
        match (self, command) {
            (
                Self::Normal,
                Command::StartInsert
                | Command::StartInsertHead
                | Command::StartAppend
                | Command::StartAppendEnd,
            ) => Self::Insert,
            (Self::Normal, Command::StartReplaceByte | Command::StartReplace) => Self::Replace,
            (Self::Normal, Command::StartCmdline) => Self::CommandLine,
            (Self::Insert | Self::Replace, Command::ExitInsert)
            | (Self::CommandLine, Command::ExitCmdline | Command::ExecuteCmdline) => Self::Normal,
            (mode, _) => mode,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// CursorShape
// ---------------------------------------------------------------------------

/// Cursor shape for terminal display.
///
/// Kept here so the core doesn't depend on the terminal crate. The front end
/// maps it to its own cursor style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorShape {
    /// `█` solid block.
    SteadyBlock,
    /// `▏` thin vertical bar.
    SteadyBar,
    /// `▁` underline.
    SteadyUnderline,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

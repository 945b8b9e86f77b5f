//! Commands produced by the key resolver.
//!
//! A [`Command`] names *what* the user asked for; the repeat count that
//! travels with it lives in [`Resolved`](crate::key::Resolved). Navigation
//! commands are applied by the [`Window`](crate::window::Window), mode
//! commands by [`Mode::transition`](crate::mode::Mode::transition), and the
//! rest belong to the editing and command-line layers.

/// Every command the default bindings can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// `ZQ`: leave the editor.
    Quit,

    // -- Cursor motion ------------------------------------------------------
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    /// Back by bytes, crossing row boundaries (`b`).
    CursorPrev,
    /// Forward by bytes, crossing row boundaries (`w`).
    CursorNext,
    /// Start of the current row (`0`, `^`).
    CursorHead,
    /// End of the current row, or of a later one with a count (`$`).
    CursorEnd,

    // -- Scrolling and paging -----------------------------------------------
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    PageUpHalf,
    PageDownHalf,
    PageTop,
    PageEnd,

    // -- Address jumps ------------------------------------------------------
    /// Jump to the decimal address written in the bytes under the cursor.
    JumpTo,
    /// Return to where the last [`JumpTo`](Command::JumpTo) started.
    JumpBack,

    // -- Byte editing -------------------------------------------------------
    DeleteByte,
    DeletePrevByte,
    Increment,
    Decrement,

    // -- Insert / replace ---------------------------------------------------
    StartInsert,
    StartInsertHead,
    StartAppend,
    StartAppendEnd,
    StartReplaceByte,
    StartReplace,
    ExitInsert,
    Backspace,
    Delete,

    // -- Command line -------------------------------------------------------
    StartCmdline,
    SpaceCmdline,
    BackspaceCmdline,
    DeleteCmdline,
    DeleteWordCmdline,
    ClearToHeadCmdline,
    ClearCmdline,
    ExitCmdline,
    ExecuteCmdline,
}

impl Command {
    /// True for commands the viewport engine applies.
    #[must_use]
    pub const fn is_navigation(self) -> bool {
        matches!(
            self,
            Self::CursorUp
                | Self::CursorDown
                | Self::CursorLeft
                | Self::CursorRight
                | Self::CursorPrev
                | Self::CursorNext
                | Self::CursorHead
                | Self::CursorEnd
                | Self::ScrollUp
                | Self::ScrollDown
                | Self::PageUp
                | Self::PageDown
                | Self::PageUpHalf
                | Self::PageDownHalf
                | Self::PageTop
                | Self::PageEnd
                | Self::JumpTo
                | Self::JumpBack
        )
    }

    /// True for commands that edit the command-line text.
    #[must_use]
    pub const fn is_cmdline_edit(self) -> bool {
        matches!(
            self,
            Self::SpaceCmdline
                | Self::BackspaceCmdline
                | Self::DeleteCmdline
                | Self::DeleteWordCmdline
                | Self::ClearToHeadCmdline
                | Self::ClearCmdline
        )
    }
}

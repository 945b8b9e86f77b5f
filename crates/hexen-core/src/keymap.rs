//! Default key bindings.
//!
//! [`default_keymaps`] builds a fresh resolver for every [`Mode`]. The
//! caller owns the result; there is no process-wide table. Registration
//! order matters (see [`key`](crate::key)): within a mode, a chord must be
//! registered before any shorter binding that is a prefix of it.

use std::collections::HashMap;

use crate::command::Command;
use crate::key::KeyManager;
use crate::mode::Mode;

/// One resolver per mode.
pub type Keymaps = HashMap<Mode, KeyManager>;

/// Build the default bindings for every mode.
#[must_use]
pub fn default_keymaps() -> Keymaps {
    let mut keymaps = HashMap::with_capacity(Mode::ALL.len());
    keymaps.insert(Mode::Normal, normal());
    keymaps.insert(Mode::Insert, insert());
    keymaps.insert(Mode::Replace, insert());
    keymaps.insert(Mode::CommandLine, command_line());
    keymaps
}

fn normal() -> KeyManager {
    let mut km = KeyManager::new(Mode::Normal.counts());
    km.register(Command::Quit, &["Z", "Q"]);
    km.register(Command::CursorUp, &["up"]);
    km.register(Command::CursorDown, &["down"]);
    km.register(Command::CursorLeft, &["left"]);
    km.register(Command::CursorRight, &["right"]);
    km.register(Command::PageUp, &["pgup"]);
    km.register(Command::PageDown, &["pgdn"]);
    km.register(Command::PageTop, &["home"]);
    km.register(Command::PageEnd, &["end"]);
    km.register(Command::CursorUp, &["k"]);
    km.register(Command::CursorDown, &["j"]);
    km.register(Command::CursorLeft, &["h"]);
    km.register(Command::CursorRight, &["l"]);
    km.register(Command::CursorPrev, &["b"]);
    km.register(Command::CursorNext, &["w"]);
    km.register(Command::CursorHead, &["0"]);
    km.register(Command::CursorHead, &["^"]);
    km.register(Command::CursorEnd, &["$"]);
    km.register(Command::ScrollUp, &["c-y"]);
    km.register(Command::ScrollDown, &["c-e"]);
    km.register(Command::PageUp, &["c-b"]);
    km.register(Command::PageDown, &["c-f"]);
    km.register(Command::PageUpHalf, &["c-u"]);
    km.register(Command::PageDownHalf, &["c-d"]);
    km.register(Command::PageTop, &["g", "g"]);
    km.register(Command::PageEnd, &["G"]);
    km.register(Command::JumpTo, &["c-]"]);
    km.register(Command::JumpBack, &["c-t"]);
    km.register(Command::DeleteByte, &["x"]);
    km.register(Command::DeletePrevByte, &["X"]);
    km.register(Command::Increment, &["c-a"]);
    km.register(Command::Increment, &["+"]);
    km.register(Command::Decrement, &["c-x"]);
    km.register(Command::Decrement, &["-"]);

    km.register(Command::StartInsert, &["i"]);
    km.register(Command::StartInsertHead, &["I"]);
    km.register(Command::StartAppend, &["a"]);
    km.register(Command::StartAppendEnd, &["A"]);
    km.register(Command::StartReplaceByte, &["r"]);
    km.register(Command::StartReplace, &["R"]);

    km.register(Command::StartCmdline, &[":"]);
    km
}

/// Shared by insert and replace mode; each mode gets its own instance.
fn insert() -> KeyManager {
    let mut km = KeyManager::new(false);
    km.register(Command::ExitInsert, &["escape"]);
    km.register(Command::ExitInsert, &["c-c"]);
    km.register(Command::CursorUp, &["up"]);
    km.register(Command::CursorDown, &["down"]);
    km.register(Command::CursorLeft, &["left"]);
    km.register(Command::CursorRight, &["right"]);
    km.register(Command::PageUp, &["pgup"]);
    km.register(Command::PageDown, &["pgdn"]);
    km.register(Command::PageTop, &["home"]);
    km.register(Command::PageEnd, &["end"]);
    km.register(Command::Backspace, &["backspace"]);
    km.register(Command::Backspace, &["backspace2"]);
    km.register(Command::Delete, &["delete"]);
    km
}

fn command_line() -> KeyManager {
    let mut km = KeyManager::new(Mode::CommandLine.counts());
    km.register(Command::SpaceCmdline, &["space"]);
    km.register(Command::CursorLeft, &["left"]);
    km.register(Command::CursorLeft, &["c-b"]);
    km.register(Command::CursorRight, &["right"]);
    km.register(Command::CursorRight, &["c-f"]);
    km.register(Command::CursorHead, &["home"]);
    km.register(Command::CursorHead, &["c-a"]);
    km.register(Command::CursorEnd, &["end"]);
    km.register(Command::CursorEnd, &["c-e"]);
    km.register(Command::BackspaceCmdline, &["c-h"]);
    km.register(Command::BackspaceCmdline, &["backspace"]);
    km.register(Command::BackspaceCmdline, &["backspace2"]);
    km.register(Command::DeleteCmdline, &["delete"]);
    km.register(Command::DeleteWordCmdline, &["c-w"]);
    km.register(Command::ClearToHeadCmdline, &["c-u"]);
    km.register(Command::ClearCmdline, &["c-k"]);
    km.register(Command::ExitCmdline, &["escape"]);
    km.register(Command::ExitCmdline, &["c-c"]);
    km.register(Command::ExecuteCmdline, &["enter"]);
    km.register(Command::ExecuteCmdline, &["c-j"]);
    km.register(Command::ExecuteCmdline, &["c-m"]);
    km
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{Key, Press, Resolved};
    use pretty_assertions::assert_eq;

    fn press_all(km: &mut KeyManager, keys: &[&'static str]) -> Press {
        let mut last = Press::Discarded;
        for k in keys {
            last = km.press(Key::from_static(k));
        }
        last
    }

    fn resolves(mode: Mode, keys: &[&'static str]) -> Option<Resolved> {
        let mut keymaps = default_keymaps();
        let km = keymaps.get_mut(&mode)?;
        match press_all(km, keys) {
            Press::Resolved(r) => Some(r),
            Press::Pending | Press::Discarded => None,
        }
    }

    #[test]
    fn every_mode_has_a_manager() {
        let keymaps = default_keymaps();
        for mode in Mode::ALL {
            let km = &keymaps[&mode];
            assert!(!km.is_empty(), "{mode} has no bindings");
            assert_eq!(km.counts(), mode.counts());
        }
    }

    #[test]
    fn fresh_maps_are_independent() {
        let mut a = default_keymaps();
        let b = default_keymaps();
        if let Some(km) = a.get_mut(&Mode::Normal) {
            km.press(Key::from("g"));
        }
        assert_eq!(a[&Mode::Normal].pending().len(), 1);
        assert!(b[&Mode::Normal].pending().is_empty());
    }

    #[test]
    fn insert_and_replace_bind_the_same_keys() {
        let keymaps = default_keymaps();
        assert_eq!(keymaps[&Mode::Insert].len(), keymaps[&Mode::Replace].len());
    }

    #[test]
    fn normal_count_motion() {
        assert_eq!(
            resolves(Mode::Normal, &["1", "2", "j"]),
            Some(Resolved {
                command: Command::CursorDown,
                count: 12
            })
        );
    }

    #[test]
    fn normal_zero_is_row_head() {
        assert_eq!(
            resolves(Mode::Normal, &["0"]).map(|r| r.command),
            Some(Command::CursorHead)
        );
    }

    #[test]
    fn normal_gg_and_g_x() {
        assert_eq!(
            resolves(Mode::Normal, &["g", "g"]).map(|r| r.command),
            Some(Command::PageTop)
        );
        assert_eq!(
            resolves(Mode::Normal, &["g", "x"]).map(|r| r.command),
            Some(Command::DeleteByte)
        );
    }

    #[test]
    fn normal_quit_and_jumps() {
        assert_eq!(
            resolves(Mode::Normal, &["Z", "Q"]).map(|r| r.command),
            Some(Command::Quit)
        );
        assert_eq!(
            resolves(Mode::Normal, &["c-]"]).map(|r| r.command),
            Some(Command::JumpTo)
        );
        assert_eq!(
            resolves(Mode::Normal, &["c-t"]).map(|r| r.command),
            Some(Command::JumpBack)
        );
    }

    #[test]
    fn insert_digits_are_literal() {
        // No count parsing and no digit bindings outside normal mode.
        assert_eq!(resolves(Mode::Insert, &["1"]), None);
        assert_eq!(
            resolves(Mode::Insert, &["escape"]).map(|r| r.command),
            Some(Command::ExitInsert)
        );
        assert_eq!(
            resolves(Mode::Replace, &["backspace2"]).map(|r| r.command),
            Some(Command::Backspace)
        );
    }

    #[test]
    fn command_line_aliases() {
        for keys in [["enter"], ["c-j"], ["c-m"]] {
            assert_eq!(
                resolves(Mode::CommandLine, &keys).map(|r| r.command),
                Some(Command::ExecuteCmdline)
            );
        }
        assert_eq!(
            resolves(Mode::CommandLine, &["c-a"]).map(|r| r.command),
            Some(Command::CursorHead)
        );
        assert_eq!(
            resolves(Mode::CommandLine, &["c-w"]).map(|r| r.command),
            Some(Command::DeleteWordCmdline)
        );
    }
}

// SPDX-License-Identifier: MIT
//
// hexen-term: terminal backend for hexen.
//
// Raw termios, ANSI escape output and a stdin key parser, written directly
// against the terminal with no TUI framework in between. The hex view
// repaints whole rows each frame, so there is no cell buffer or diffing.

pub mod ansi;
pub mod input;
pub mod reader;
pub mod terminal;

//! Editor: the control loop.
//!
//! The [`Editor`] owns a [`Window`], one key resolver per mode, and a
//! [`Frontend`]. Inputs arrive in order on one channel; each key goes to the
//! active mode's resolver, and a resolved command is then either a mode
//! change, a navigation applied to the window, or an editing command that
//! this layer doesn't carry out.
//!
//! ```text
//! front end ──Input──▶ resolver[mode] ──Resolved──▶ transition / Window
//!     ▲                                                   │
//!     └────────────────────── redraw(State) ◀─────────────┘
//! ```

use std::sync::mpsc;

use tracing::{debug, info, trace, warn};

use crate::command::Command;
use crate::error::Result;
use crate::key::{Key, Press, Resolved};
use crate::keymap::{Keymaps, default_keymaps};
use crate::ui::{Frontend, Input};
use crate::window::Window;

/// What the loop does after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep reading input.
    Continue,
    /// Leave the loop.
    Quit,
}

/// Window, key resolvers and front end, wired together.
pub struct Editor<F> {
    window: Window,
    keymaps: Keymaps,
    frontend: F,
}

impl<F: Frontend> Editor<F> {
    /// An editor with the default key bindings.
    pub fn new(window: Window, frontend: F) -> Self {
        Self::with_keymaps(window, default_keymaps(), frontend)
    }

    /// An editor with caller-supplied key bindings.
    pub const fn with_keymaps(window: Window, keymaps: Keymaps, frontend: F) -> Self {
        Self {
            window,
            keymaps,
            frontend,
        }
    }

    #[must_use]
    pub const fn window(&self) -> &Window {
        &self.window
    }

    /// Run until quit or until the front end stops sending input.
    ///
    /// The front end and the window are closed on every path out, and the
    /// first error wins.
    ///
    /// # Errors
    ///
    /// Returns the first error from the front end or the window's source.
    pub fn run(mut self) -> Result<()> {
        let result = self.event_loop();
        if let Err(err) = &result {
            warn!(error = %err, "editor stopped on error");
        }
        let Self {
            window,
            mut frontend,
            ..
        } = self;
        let ui_closed = frontend.close();
        let window_closed = window.close();
        result.and(ui_closed).and(window_closed)
    }

    fn event_loop(&mut self) -> Result<()> {
        let (tx, rx) = mpsc::channel();
        self.frontend.init(tx)?;
        self.window.set_height(self.frontend.height());
        self.redraw()?;

        for input in rx {
            let action = match input {
                Input::Key(key) => self.press(key),
                Input::Resize(height) => {
                    debug!(height, "resize");
                    self.window.set_height(height);
                    Action::Continue
                }
            };
            if action == Action::Quit {
                return Ok(());
            }
            self.redraw()?;
        }
        debug!("input closed");
        Ok(())
    }

    /// Feed one key to the active mode's resolver and dispatch the result.
    pub fn press(&mut self, key: Key) -> Action {
        let mode = self.window.mode();
        let Some(km) = self.keymaps.get_mut(&mode) else {
            warn!(%mode, "no key bindings for mode");
            return Action::Continue;
        };
        match km.press(key) {
            Press::Resolved(resolved) => self.dispatch(resolved),
            Press::Pending | Press::Discarded => Action::Continue,
        }
    }

    /// Carry out a resolved command.
    pub fn dispatch(&mut self, resolved: Resolved) -> Action {
        let mode = self.window.mode();
        if resolved.command == Command::Quit {
            info!("quit");
            return Action::Quit;
        }

        let next = mode.transition(resolved.command);
        if next != mode {
            debug!(from = %mode, to = %next, "mode change");
            self.window.set_mode(next);
            // A chord half-typed before leaving the mode doesn't carry over.
            if let Some(km) = self.keymaps.get_mut(&next) {
                km.reset();
            }
            return Action::Continue;
        }

        if mode.navigates() && self.window.apply(resolved) {
            debug!(command = ?resolved.command, count = resolved.count, "navigate");
        } else {
            trace!(command = ?resolved.command, %mode, "editing command not handled here");
        }
        Action::Continue
    }

    fn redraw(&mut self) -> Result<()> {
        let mut state = self.window.state()?;
        if let Some(km) = self.keymaps.get(&state.mode) {
            state.pending = km.pending().to_vec();
        }
        self.frontend.redraw(&state)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

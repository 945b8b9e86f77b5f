//! Front-end boundary.
//!
//! The control loop talks to whatever draws the screen and reads the keyboard
//! through [`Frontend`]. The terminal front end lives in the binary; the
//! [`Headless`] front end here replays a fixed script and records every
//! frame, for tests and scripted runs.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use crate::error::Result;
use crate::key::Key;
use crate::state::State;

/// One event from the front end, delivered in order on a single channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A keystroke token.
    Key(Key),
    /// The viewport now has this many rows.
    Resize(u64),
}

impl From<Key> for Input {
    fn from(key: Key) -> Self {
        Self::Key(key)
    }
}

/// A display and input device.
///
/// The control loop calls [`init`](Self::init) once, reads
/// [`height`](Self::height), then calls [`redraw`](Self::redraw) after each
/// input and [`close`](Self::close) exactly once on the way out.
pub trait Frontend {
    /// Start producing input. The front end sends every [`Input`] on
    /// `events`; dropping all senders ends the control loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the device can't be set up.
    fn init(&mut self, events: Sender<Input>) -> Result<()>;

    /// Rows available for data.
    fn height(&self) -> u64;

    /// Draw one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails. The control loop stops.
    fn redraw(&mut self, state: &State) -> Result<()>;

    /// Stop input and restore the device.
    ///
    /// # Errors
    ///
    /// Returns an error if restoring the device fails.
    fn close(&mut self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Headless
// ---------------------------------------------------------------------------

/// What a [`Headless`] front end saw.
#[derive(Debug, Default)]
pub struct Recording {
    /// Every frame passed to `redraw`, in order.
    pub frames: Vec<State>,
    pub closed: bool,
}

impl Recording {
    /// The most recent frame.
    #[must_use]
    pub fn last(&self) -> Option<&State> {
        self.frames.last()
    }
}

/// A front end with no terminal: replays scripted input and records frames.
#[derive(Debug)]
pub struct Headless {
    height: u64,
    script: Vec<Input>,
    recording: Rc<RefCell<Recording>>,
}

impl Headless {
    /// A front end `height` rows tall that will send `script` on init and
    /// then hang up.
    pub fn new(height: u64, script: impl IntoIterator<Item = Input>) -> Self {
        Self {
            height,
            script: script.into_iter().collect(),
            recording: Rc::default(),
        }
    }

    /// Shorthand for a script of key tokens only.
    pub fn keys(height: u64, keys: &[&'static str]) -> Self {
        Self::new(height, keys.iter().map(|k| Input::Key(Key::from_static(k))))
    }

    /// A handle to the recording that stays valid after the front end is
    /// moved into the control loop.
    #[must_use]
    pub fn recording(&self) -> Rc<RefCell<Recording>> {
        Rc::clone(&self.recording)
    }
}

impl Frontend for Headless {
    fn init(&mut self, events: Sender<Input>) -> Result<()> {
        for input in self.script.drain(..) {
            // The receiver lives as long as the loop; a send can only fail
            // after it has already stopped.
            if events.send(input).is_err() {
                break;
            }
        }
        Ok(())
    }

    fn height(&self) -> u64 {
        self.height
    }

    fn redraw(&mut self, state: &State) -> Result<()> {
        self.recording.borrow_mut().frames.push(state.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.recording.borrow_mut().closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn headless_sends_script_then_hangs_up() {
        let mut ui = Headless::keys(10, &["j", "k"]);
        let (tx, rx) = mpsc::channel();
        ui.init(tx).unwrap();
        let got: Vec<Input> = rx.iter().collect();
        assert_eq!(
            got,
            vec![Input::Key(Key::from("j")), Input::Key(Key::from("k"))]
        );
    }

    #[test]
    fn headless_records_frames_and_close() {
        let mut ui = Headless::new(5, []);
        let rec = ui.recording();
        ui.redraw(&State::default()).unwrap();
        ui.redraw(&State::default()).unwrap();
        ui.close().unwrap();
        assert_eq!(rec.borrow().frames.len(), 2);
        assert!(rec.borrow().closed);
    }

    #[test]
    fn input_from_key() {
        assert_eq!(Input::from(Key::from("x")), Input::Key(Key::from("x")));
    }
}

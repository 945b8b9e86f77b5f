// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background input thread: stdin bytes and window resizes, as events.
//
// A dedicated thread polls stdin, feeds what it reads to the input parser,
// and hands each decoded key to a sink closure. Between polls it checks the
// SIGWINCH flag and reports the new terminal size through the same sink, so
// keys and resizes reach the consumer in the order they happened.
//
// A lone ESC byte is held by the parser until a poll times out with nothing
// more to read. At that point it is flushed as the Escape key. The poll
// timeout is therefore also the Escape latency.
//
// Shutdown: the thread checks an `AtomicBool` stop flag between polls, and
// exits on its own when the sink returns `false`, stdin hits EOF, or a read
// fails.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::input::{KeyEvent, Parser};
use crate::terminal::{Size, get_size};

/// Bytes per read. A keypress is 1-6 bytes; a paste can be much more.
const READ_BUF_SIZE: usize = 4096;

/// Poll timeout in milliseconds. Bounds both shutdown and Escape latency.
const POLL_TIMEOUT_MS: i32 = 25;

/// What the reader thread reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// The terminal was resized to this size.
    Resize(Size),
}

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Set by the SIGWINCH handler, cleared by the reader thread.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install a SIGWINCH handler that sets [`SIGWINCH_RECEIVED`]. Storing to an
/// atomic is async-signal-safe.
#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

/// Take the resize flag, returning the new size if one is pending.
fn take_resize() -> Option<Size> {
    if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
        get_size()
    } else {
        None
    }
}

// ─── Reader ─────────────────────────────────────────────────────────────────

/// Background input thread.
///
/// Runs until [`stop`](Self::stop) is called, the `StdinReader` is dropped,
/// or the sink asks it to stop.
///
/// ```no_run
/// use hexen_term::reader::{Event, StdinReader};
///
/// let reader = StdinReader::spawn(|event| {
///     if let Event::Key(key) = event {
///         println!("{key:?}");
///     }
///     true
/// })?;
/// # drop(reader);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Install the resize handler and spawn the reader thread.
    ///
    /// `sink` receives every event in order. Returning `false` from it ends
    /// the thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS cannot spawn the thread.
    pub fn spawn<F>(sink: F) -> io::Result<Self>
    where
        F: FnMut(Event) -> bool + Send + 'static,
    {
        install_sigwinch_handler();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || {
                reader_loop(sink, &stop_flag);
                debug!("stdin reader stopped");
            })?;

        Ok(Self {
            handle: Some(handle),
            stop,
        })
    }

    /// Signal the thread to stop and wait for it. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Outcome of one poll of stdin.
enum Poll {
    /// This many bytes were read into the buffer.
    Data(usize),
    /// Nothing arrived before the timeout.
    Idle,
    /// EOF or a read error.
    Closed,
}

#[cfg(unix)]
fn poll_stdin(buf: &mut [u8]) -> Poll {
    use std::os::unix::io::AsRawFd;

    let fd = io::stdin().as_raw_fd();
    let ready = unsafe {
        let mut pfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };
        libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
    };
    if ready <= 0 {
        // Timeout, or EINTR from SIGWINCH.
        return Poll::Idle;
    }

    let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
    match usize::try_from(n) {
        Ok(0) | Err(_) => Poll::Closed,
        Ok(n) => Poll::Data(n),
    }
}

#[cfg(not(unix))]
fn poll_stdin(buf: &mut [u8]) -> Poll {
    use std::io::Read;

    match io::stdin().lock().read(buf) {
        Ok(0) | Err(_) => Poll::Closed,
        Ok(n) => Poll::Data(n),
    }
}

fn reader_loop<F>(mut sink: F, stop: &AtomicBool)
where
    F: FnMut(Event) -> bool,
{
    let mut parser = Parser::new();
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        if let Some(size) = take_resize() {
            if !sink(Event::Resize(size)) {
                return;
            }
        }

        let keys = match poll_stdin(&mut buf) {
            Poll::Data(n) => parser.advance(&buf[..n]),
            Poll::Idle if parser.has_pending() => parser.flush(),
            Poll::Idle => continue,
            Poll::Closed => {
                debug!("stdin closed");
                return;
            }
        };

        for key in keys {
            if !sink(Event::Key(key)) {
                return;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn poll_timeout_reasonable() {
        assert!(POLL_TIMEOUT_MS >= 10);
        assert!(POLL_TIMEOUT_MS <= 100);
    }

    #[test]
    fn spawn_and_stop() {
        // stdin is not a terminal under the test harness; the thread must
        // still start and stop without hanging.
        let mut reader = StdinReader::spawn(|_| true).unwrap();
        reader.stop();
        reader.stop();
    }

    #[test]
    fn drop_stops_reader() {
        let (tx, _rx) = mpsc::channel::<Event>();
        let reader = StdinReader::spawn(move |e| tx.send(e).is_ok()).unwrap();
        drop(reader);
    }

    #[test]
    fn resize_flag_is_taken_once() {
        SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
        // The size query fails without a terminal, but the flag is cleared.
        let _ = take_resize();
        assert!(!SIGWINCH_RECEIVED.load(Ordering::Relaxed));
        assert_eq!(take_resize(), None);
    }
}

// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, alternate screen, RAII cleanup.
//
// Safety: termios (tcgetattr, tcsetattr), ioctl (TIOCGWINSZ), isatty and a
// raw fd write need `unsafe`. Each block is one POSIX call.
#![allow(unsafe_code)]
//
// Entering puts stdin in raw mode and switches to the alternate screen with
// the cursor hidden. Leaving undoes both, and so does dropping the handle.
//
// A panic while raw mode is on would leave the shell without echo. The panic
// hook writes a fixed restore sequence straight to fd 1 (the stdout lock
// may be held by the frame being drawn), puts the saved termios back, then
// hands over to the previous hook so the message prints normally.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Size assumed when the terminal can't be queried.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the terminal size via `ioctl(TIOCGWINSZ)` on stdout.
///
/// `None` if stdout is not a terminal or reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    (result == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Is stdin a terminal?
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-Safe Restore ─────────────────────────────────────────────────────

/// Saved termios for the panic hook, which can't reach the [`Terminal`].
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

/// Undoes everything [`Terminal::enter`] and the renderer turn on. Leaving
/// the alternate screen comes last so the shell comes back clean.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[0m\
    \x1b[0 q\
    \x1b[?7h\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK_INSTALLED: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle. Restores the terminal on drop.
pub struct Terminal {
    #[cfg(unix)]
    original_termios: Option<libc::termios>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// A handle sized to the current terminal, or [`Size::FALLBACK`] when
    /// there is none. Does not touch the terminal until [`enter`](Self::enter).
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            original_termios: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Record a size reported by the input thread.
    pub const fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Raw mode, alternate screen, hidden cursor, no autowrap, cleared
    /// screen. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or the terminal write fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        self.enable_raw_mode()?;

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::enter_alt_screen(&mut lock)?;
        ansi::cursor_hide(&mut lock)?;
        ansi::disable_autowrap(&mut lock)?;
        ansi::clear_screen(&mut lock)?;
        lock.flush()?;

        self.active = true;
        Ok(())
    }

    /// Undo [`enter`](Self::enter). Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal write or termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::end_sync(&mut lock)?;
        ansi::reset(&mut lock)?;
        ansi::set_cursor_shape(&mut lock, ansi::CursorShape::Default)?;
        ansi::enable_autowrap(&mut lock)?;
        ansi::cursor_show(&mut lock)?;
        ansi::exit_alt_screen(&mut lock)?;
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()?;
        self.active = false;
        Ok(())
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if !is_tty() {
            return Ok(());
        }
        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }
            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            // cfmakeraw. ISIG off: Ctrl+C and Ctrl+Z arrive as keys.
            termios.c_iflag &= !(libc::IGNBRK
                | libc::BRKINT
                | libc::PARMRK
                | libc::ISTRIP
                | libc::INLCR
                | libc::IGNCR
                | libc::ICRNL
                | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_lflag &=
                !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
            termios.c_cflag |= libc::CS8;
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if let Some(original) = self.original_termios.take() {
            let fd = io::stdin().as_raw_fd();
            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_do_not_panic() {
        let _ = get_size();
        let _ = is_tty();
    }

    #[test]
    fn emergency_restore_leaves_alt_screen_last() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.starts_with("\x1b[?2026l"));
        assert!(s.contains("\x1b[0 q"), "must reset cursor shape");
        assert!(s.contains("\x1b[?7h"), "must re-enable autowrap");
        assert!(s.contains("\x1b[?25h"), "must show cursor");
        assert!(s.ends_with("\x1b[?1049l"));
    }

    #[test]
    fn new_terminal_is_inactive_with_a_size() {
        let term = Terminal::new();
        assert!(!term.is_active());
        assert!(term.size().cols > 0);
        assert!(term.size().rows > 0);
    }

    #[test]
    fn set_size_is_recorded() {
        let mut term = Terminal::new();
        term.set_size(Size { cols: 100, rows: 30 });
        assert_eq!(term.size(), Size { cols: 100, rows: 30 });
    }

    #[test]
    fn enter_leave_cycle_is_idempotent() {
        let mut term = Terminal::new();
        term.leave().unwrap();
        for _ in 0..2 {
            term.enter().unwrap();
            term.enter().unwrap();
            assert!(term.is_active());
            term.leave().unwrap();
            term.leave().unwrap();
            assert!(!term.is_active());
        }
    }

    #[test]
    fn drop_after_enter_restores() {
        let mut term = Terminal::new();
        term.enter().unwrap();
        drop(term);
    }
}

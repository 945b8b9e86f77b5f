//! Error type for the editor core.
//!
//! Only the byte source can fail. Key resolution and viewport arithmetic
//! clamp instead of erroring, so every variant here wraps an I/O failure.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the core.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing file could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// Reading the length or a window of bytes failed, or closing did.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_error_names_the_path() {
        let err = Error::Open {
            path: PathBuf::from("/no/such/file.bin"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "cannot open /no/such/file.bin: not found");
    }

    #[test]
    fn io_error_is_transparent() {
        let err = Error::from(io::Error::other("disk on fire"));
        assert_eq!(err.to_string(), "disk on fire");
        assert!(matches!(err, Error::Io(_)));
    }
}

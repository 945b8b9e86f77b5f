//! Byte sources: random access to the bytes under the window.
//!
//! The window never loads its data wholesale. It asks a [`ByteSource`] for
//! the total length and for small windows of bytes at a time, so opening a
//! multi-gigabyte file costs one `stat`.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Read-only random access to a byte sequence.
pub trait ByteSource {
    /// Total number of bytes. May change between calls if the data is
    /// modified underneath.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn length(&mut self) -> io::Result<u64>;

    /// Read up to `buf.len()` bytes starting at `start`.
    ///
    /// Returns how many bytes were read. Reading at or past the end is a
    /// short (or empty) read, not an error.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read_at(&mut self, start: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Release the underlying resource. Further reads fail.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn closed() -> io::Error {
    io::Error::other("byte source is closed")
}

// ---------------------------------------------------------------------------
// FileSource
// ---------------------------------------------------------------------------

/// A file opened read-only.
#[derive(Debug)]
pub struct FileSource {
    file: Option<File>,
}

impl FileSource {
    /// Open `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns the error from [`File::open`].
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::from_file(File::open(path)?))
    }

    /// Wrap an already-open file.
    #[must_use]
    pub const fn from_file(file: File) -> Self {
        Self { file: Some(file) }
    }

    fn file(&mut self) -> io::Result<&mut File> {
        self.file.as_mut().ok_or_else(closed)
    }
}

impl ByteSource for FileSource {
    fn length(&mut self) -> io::Result<u64> {
        Ok(self.file()?.metadata()?.len())
    }

    fn read_at(&mut self, start: u64, buf: &mut [u8]) -> io::Result<usize> {
        let file = self.file()?;
        file.seek(SeekFrom::Start(start))?;
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(filled)
    }

    fn close(&mut self) -> io::Result<()> {
        // Dropping the handle closes the descriptor.
        drop(self.file.take());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// Bytes held in memory (piped input, tests).
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    bytes: Vec<u8>,
    closed: bool,
}

impl MemorySource {
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            closed: false,
        }
    }

    /// Slurp everything from a reader.
    ///
    /// # Errors
    ///
    /// Returns the error from the reader.
    pub fn from_reader(mut reader: impl Read) -> io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::new(bytes))
    }
}

impl ByteSource for MemorySource {
    fn length(&mut self) -> io::Result<u64> {
        if self.closed {
            return Err(closed());
        }
        Ok(self.bytes.len() as u64)
    }

    fn read_at(&mut self, start: u64, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(closed());
        }
        let start = usize::try_from(start).unwrap_or(usize::MAX).min(self.bytes.len());
        let n = buf.len().min(self.bytes.len() - start);
        buf[..n].copy_from_slice(&self.bytes[start..start + n]);
        Ok(n)
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Seekable byte sources and sinks.
//!
//! The reader walks a [`ByteCursor`] one byte at a time and seeks back when a
//! [`RangeView`](crate::RangeView) is materialized, so every source must be
//! cheap to `get`, `unget` and `seek`.

use alloc::vec::Vec;

use crate::error::StreamError;

/// A seekable, byte-oriented input source.
pub trait ByteCursor {
    /// Returns the next byte and advances, or `None` at end of stream.
    fn get(&mut self) -> Option<u8>;

    /// Steps back one byte. Has no effect at offset 0.
    fn unget(&mut self);

    /// Reads up to `buf.len()` bytes, returning how many were copied.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source fails.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError>;

    /// Current absolute offset.
    fn tell(&self) -> u64;

    /// Moves the cursor to an absolute offset.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::OutOfBounds`] when `pos` lies past the end.
    fn seek(&mut self, pos: u64) -> Result<(), StreamError>;

    /// Total length of the source in bytes.
    fn len(&self) -> u64;

    /// Whether the cursor sits at the end of the source.
    fn is_eof(&self) -> bool {
        self.tell() >= self.len()
    }

    /// Whether the source holds no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fills `buf` completely.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::OutOfBounds`] if the source ends first.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), StreamError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(StreamError::OutOfBounds);
            }
            filled += n;
        }
        Ok(())
    }
}

impl<C: ByteCursor + ?Sized> ByteCursor for &mut C {
    #[inline(always)]
    fn get(&mut self) -> Option<u8> {
        (**self).get()
    }

    #[inline(always)]
    fn unget(&mut self) {
        (**self).unget();
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        (**self).read(buf)
    }

    fn tell(&self) -> u64 {
        (**self).tell()
    }

    fn seek(&mut self, pos: u64) -> Result<(), StreamError> {
        (**self).seek(pos)
    }

    fn len(&self) -> u64 {
        (**self).len()
    }
}

// ------------------------------------------------------------------------------------------------
// In-memory source
// ------------------------------------------------------------------------------------------------

/// A cursor over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct MemoryStream<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> MemoryStream<'a> {
    /// Wraps `bytes`, positioned at offset 0.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// The full underlying slice.
    #[must_use]
    pub fn as_slice(&self) -> &'a [u8] {
        self.bytes
    }

    /// The bytes from the cursor to the end.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }
}

impl ByteCursor for MemoryStream<'_> {
    #[inline(always)]
    fn get(&mut self) -> Option<u8> {
        let byte = self.bytes.get(self.pos).copied()?;
        self.pos += 1;
        Some(byte)
    }

    #[inline(always)]
    fn unget(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        let src = self.remaining();
        let n = src.len().min(buf.len());
        buf[..n].copy_from_slice(&src[..n]);
        self.pos += n;
        Ok(n)
    }

    fn tell(&self) -> u64 {
        self.pos as u64
    }

    fn seek(&mut self, pos: u64) -> Result<(), StreamError> {
        let pos = usize::try_from(pos).map_err(|_| StreamError::OutOfBounds)?;
        if pos > self.bytes.len() {
            return Err(StreamError::OutOfBounds);
        }
        self.pos = pos;
        Ok(())
    }

    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// ------------------------------------------------------------------------------------------------
// Windowed source
// ------------------------------------------------------------------------------------------------

/// A view of `len` bytes of another cursor starting at `base`.
///
/// Offsets are relative to `base`, so a reader driven over a window sees a
/// self-contained stream. Used to parse a GLB JSON chunk in place.
#[derive(Debug)]
pub struct Window<S> {
    inner: S,
    base: u64,
    len: u64,
}

impl<S: ByteCursor> Window<S> {
    /// Restricts `inner` to `base..base + len` and seeks to the window start.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::OutOfBounds`] if the window extends past the
    /// end of `inner`.
    pub fn new(mut inner: S, base: u64, len: u64) -> Result<Self, StreamError> {
        let end = base.checked_add(len).ok_or(StreamError::OutOfBounds)?;
        if end > inner.len() {
            return Err(StreamError::OutOfBounds);
        }
        inner.seek(base)?;
        Ok(Self { inner, base, len })
    }

    /// Gives back the wrapped cursor.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: ByteCursor> ByteCursor for Window<S> {
    #[inline(always)]
    fn get(&mut self) -> Option<u8> {
        if self.tell() >= self.len {
            return None;
        }
        self.inner.get()
    }

    fn unget(&mut self) {
        if self.tell() > 0 {
            self.inner.unget();
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        let left = usize::try_from(self.len - self.tell()).unwrap_or(usize::MAX);
        let n = buf.len().min(left);
        self.inner.read(&mut buf[..n])
    }

    fn tell(&self) -> u64 {
        self.inner.tell().saturating_sub(self.base)
    }

    fn seek(&mut self, pos: u64) -> Result<(), StreamError> {
        if pos > self.len {
            return Err(StreamError::OutOfBounds);
        }
        self.inner.seek(self.base + pos)
    }

    fn len(&self) -> u64 {
        self.len
    }
}

// ------------------------------------------------------------------------------------------------
// File-backed source
// ------------------------------------------------------------------------------------------------

#[cfg(feature = "std")]
pub use file::FileStream;

#[cfg(feature = "std")]
mod file {
    use std::{
        fs::File,
        io::{BufReader, Read, Seek, SeekFrom},
        path::Path,
    };

    use super::ByteCursor;
    use crate::error::StreamError;

    /// A buffered cursor over an open file, or any other seekable reader.
    ///
    /// Seeks that land inside the current buffer keep it, so materializing a
    /// range that was just scanned does not touch the underlying reader.
    ///
    /// `get` swallows I/O errors and reports them as end of stream; the next
    /// `read` or `seek` surfaces the underlying error.
    #[derive(Debug)]
    pub struct FileStream<R = File> {
        inner: BufReader<R>,
        pos: u64,
        len: u64,
    }

    impl FileStream<File> {
        /// Opens `path` for reading.
        ///
        /// # Errors
        ///
        /// Returns the error from opening or inspecting the file.
        pub fn open(path: impl AsRef<Path>) -> Result<Self, StreamError> {
            let file = File::open(path)?;
            Self::from_file(file)
        }

        /// Wraps an already open file, positioned at its start.
        ///
        /// # Errors
        ///
        /// Returns the error from reading the file's metadata or seeking.
        pub fn from_file(file: File) -> Result<Self, StreamError> {
            let len = file.metadata()?.len();
            Self::from_reader(file, len)
        }
    }

    impl<R: Read + Seek> FileStream<R> {
        /// Wraps a reader holding `len` bytes, rewinding it to its start.
        ///
        /// # Errors
        ///
        /// Returns the error from seeking the reader.
        pub fn from_reader(mut reader: R, len: u64) -> Result<Self, StreamError> {
            reader.seek(SeekFrom::Start(0))?;
            Ok(Self {
                inner: BufReader::new(reader),
                pos: 0,
                len,
            })
        }

        /// The wrapped reader.
        #[must_use]
        pub fn into_inner(self) -> R {
            self.inner.into_inner()
        }
    }

    impl<R: Read + Seek> ByteCursor for FileStream<R> {
        fn get(&mut self) -> Option<u8> {
            let mut byte = [0u8; 1];
            match self.inner.read(&mut byte) {
                Ok(1) => {
                    self.pos += 1;
                    Some(byte[0])
                }
                _ => None,
            }
        }

        fn unget(&mut self) {
            if self.pos > 0 && self.inner.seek_relative(-1).is_ok() {
                self.pos -= 1;
            }
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
            let n = self.inner.read(buf)?;
            self.pos += n as u64;
            Ok(n)
        }

        fn tell(&self) -> u64 {
            self.pos
        }

        fn seek(&mut self, pos: u64) -> Result<(), StreamError> {
            if pos > self.len {
                return Err(StreamError::OutOfBounds);
            }
            // `seek_relative` keeps the buffer when the target is inside it.
            match (i64::try_from(pos), i64::try_from(self.pos)) {
                (Ok(to), Ok(from)) => self.inner.seek_relative(to - from)?,
                _ => {
                    self.inner.seek(SeekFrom::Start(pos))?;
                }
            }
            self.pos = pos;
            Ok(())
        }

        fn len(&self) -> u64 {
            self.len
        }
    }

}

// ------------------------------------------------------------------------------------------------
// Output sinks
// ------------------------------------------------------------------------------------------------

/// A byte destination for the writers.
pub trait ByteSink {
    /// Appends all of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination rejects the write.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), StreamError>;

    /// Appends a single byte.
    ///
    /// # Errors
    ///
    /// Same as [`ByteSink::write_all`].
    fn write_byte(&mut self, byte: u8) -> Result<(), StreamError> {
        self.write_all(&[byte])
    }
}

impl ByteSink for Vec<u8> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        (**self).write_all(bytes)
    }
}

/// Adapts any [`std::io::Write`] into a [`ByteSink`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoSink<W>(pub W);

#[cfg(feature = "std")]
impl<W: std::io::Write> ByteSink for IoSink<W> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        self.0.write_all(bytes)?;
        Ok(())
    }
}

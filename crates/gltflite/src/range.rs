//! Lazy byte spans over a stream.

use alloc::{string::String, vec::Vec};

use bstr::ByteSlice;

use crate::{error::StreamError, stream::ByteCursor};

/// A detached span of bytes within a stream.
///
/// Ranges are produced by the reader for every token and never own bytes.
/// Pair one with its stream through [`Range::view`] to materialize it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    /// Absolute offset of the first byte.
    pub start: u64,
    /// Length in bytes.
    pub len: u64,
}

impl Range {
    /// Creates a range covering `start..start + len`.
    #[must_use]
    pub const fn new(start: u64, len: u64) -> Self {
        Self { start, len }
    }

    /// Creates a range covering `start..end`.
    #[must_use]
    pub const fn between(start: u64, end: u64) -> Self {
        Self {
            start,
            len: end.saturating_sub(start),
        }
    }

    /// One past the last byte.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.start + self.len
    }

    /// Whether the range covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrows `stream` to read this range.
    pub fn view<S: ByteCursor>(self, stream: &mut S) -> RangeView<'_, S> {
        RangeView {
            stream,
            range: self,
        }
    }
}

/// A [`Range`] bound to the stream it points into.
///
/// Every read seeks to the range, copies, and then restores the stream's
/// previous cursor. The exclusive borrow means two views over one stream can
/// never be read interleaved.
#[derive(Debug)]
pub struct RangeView<'s, S> {
    stream: &'s mut S,
    range: Range,
}

impl<S: ByteCursor> RangeView<'_, S> {
    /// The span this view covers.
    #[must_use]
    pub fn range(&self) -> Range {
        self.range
    }

    /// Appends the covered bytes to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error when the range lies outside the stream.
    pub fn read_into(&mut self, out: &mut Vec<u8>) -> Result<(), StreamError> {
        let saved = self.stream.tell();
        let result = self.copy_out(out);
        self.stream.seek(saved)?;
        result
    }

    fn copy_out(&mut self, out: &mut Vec<u8>) -> Result<(), StreamError> {
        let len = usize::try_from(self.range.len).map_err(|_| StreamError::OutOfBounds)?;
        self.stream.seek(self.range.start)?;
        let from = out.len();
        out.resize(from + len, 0);
        if let Err(err) = self.stream.read_exact(&mut out[from..]) {
            out.truncate(from);
            return Err(err);
        }
        Ok(())
    }

    /// The covered bytes as a fresh vector.
    ///
    /// # Errors
    ///
    /// Same as [`RangeView::read_into`].
    pub fn to_vec(&mut self) -> Result<Vec<u8>, StreamError> {
        let mut out = Vec::new();
        self.read_into(&mut out)?;
        Ok(out)
    }

    /// The covered bytes as text, replacing invalid UTF-8.
    ///
    /// # Errors
    ///
    /// Same as [`RangeView::read_into`].
    pub fn to_string_lossy(&mut self) -> Result<String, StreamError> {
        Ok(self.to_vec()?.to_str_lossy().into_owned())
    }

    /// Parses the covered bytes as a base-10 integer.
    ///
    /// Returns `Ok(None)` if the text is not an integer that fits in `i64`.
    ///
    /// # Errors
    ///
    /// Same as [`RangeView::read_into`].
    pub fn read_as_int(&mut self) -> Result<Option<i64>, StreamError> {
        Ok(parse_int(&self.to_vec()?))
    }

    /// Parses the covered bytes as a float, independent of any locale.
    ///
    /// # Errors
    ///
    /// Same as [`RangeView::read_into`].
    pub fn read_as_float(&mut self) -> Result<Option<f64>, StreamError> {
        Ok(parse_float(&self.to_vec()?))
    }
}

/// Parses ASCII decimal digits with an optional leading `-`.
pub(crate) fn parse_int(text: &[u8]) -> Option<i64> {
    text.to_str().ok()?.parse().ok()
}

/// Parses JSON number text as `f64`.
pub(crate) fn parse_float(text: &[u8]) -> Option<f64> {
    text.to_str().ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    #[test]
    fn view_restores_cursor() {
        let mut s = MemoryStream::new(b"[12, 3.5]");
        s.seek(7).unwrap();
        let int = Range::new(1, 2).view(&mut s).read_as_int().unwrap();
        assert_eq!(int, Some(12));
        assert_eq!(s.tell(), 7);
        let float = Range::new(5, 3).view(&mut s).read_as_float().unwrap();
        assert_eq!(float, Some(3.5));
        assert_eq!(s.tell(), 7);
    }

    #[test]
    fn out_of_bounds_view_fails_and_restores() {
        let mut s = MemoryStream::new(b"abc");
        s.seek(1).unwrap();
        let err = Range::new(2, 5).view(&mut s).to_vec();
        assert_eq!(err, Err(StreamError::OutOfBounds));
        assert_eq!(s.tell(), 1);
    }

    #[test]
    fn int_overflow_is_none() {
        assert_eq!(parse_int(b"99999999999999999999"), None);
        assert_eq!(parse_int(b"-42"), Some(-42));
    }
}

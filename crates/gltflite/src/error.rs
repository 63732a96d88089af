//! Error types for every layer of the pipeline.
//!
//! Each layer reports through its own enum so callers can match on exactly
//! the failures that layer can produce; [`Error`] unifies them for the
//! high-level load and save entry points.

#![allow(missing_docs)]
use thiserror::Error;

/// A grammar-level failure found by the JSON event reader.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("invalid unicode escape sequence")]
    InvalidUnicodeEscape,
    #[error("invalid utf-8 byte 0x{0:02X}")]
    InvalidUtf8(u8),
    #[error("control character 0x{0:02X} in string")]
    ControlCharacterInString(u8),
    #[error("invalid number")]
    InvalidNumber,
    #[error("invalid literal")]
    InvalidLiteral,
    #[error("trailing comma")]
    TrailingComma,
    #[error("expected ':' after object key")]
    ExpectedColon,
    #[error("root value must be an object or an array")]
    RootNotContainer,
    #[error("unexpected bytes after the root value")]
    TrailingBytes,
    #[error("nesting depth exceeds the limit of {0}")]
    DepthLimitExceeded(usize),
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),
    #[error("handler rejected event: {0}")]
    Handler(#[from] BuildError),
}

/// The single error reported by one call to [`JsonReader::read`].
///
/// [`JsonReader::read`]: crate::JsonReader::read
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{source} at {line}:{column}")]
pub struct ParserError {
    pub(crate) source: SyntaxError,
    pub(crate) line: usize,
    pub(crate) column: usize,
    pub(crate) offset: u64,
}

impl ParserError {
    /// What went wrong.
    #[must_use]
    pub fn kind(&self) -> SyntaxError {
        self.source
    }

    /// 1-based line of the failing byte.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column of the failing byte.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Absolute stream offset of the failing byte.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

/// Failure of a byte stream operation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    #[error("seek or read outside of the stream")]
    OutOfBounds,
    #[cfg(feature = "std")]
    #[error("i/o error: {0}")]
    Io(std::io::ErrorKind),
}

#[cfg(feature = "std")]
impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::Io(err.kind())
    }
}

/// An event sequence that breaks the builder's contract.
///
/// The reader never produces these on its own; they surface when a handler is
/// driven by hand out of order.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    #[error("value event with no open container")]
    NoOpenContainer,
    #[error("event does not match the kind of the open container")]
    KindMismatch,
    #[error("container value announced before it was closed")]
    ChildNotClosed,
    #[error("closed container was never attached to a parent")]
    UnclaimedChild,
    #[error("end event does not match an open container")]
    UnbalancedEnd,
    #[error("number text could not be converted")]
    InvalidNumber,
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),
}

/// Failure while reading or framing a GLB container.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ContainerError {
    #[error("container is truncated")]
    Truncated,
    #[error("bad magic 0x{0:08X}")]
    BadMagic(u32),
    #[error("unsupported container version {0}")]
    UnsupportedVersion(u32),
    #[error("container has no JSON chunk")]
    MissingJsonChunk,
    #[error("buffers declare more bytes than the BIN chunk holds")]
    ChunkOverrun,
    #[error("JSON chunk: {0}")]
    Json(#[from] ParserError),
    #[error("JSON chunk: {0}")]
    Build(#[from] BuildError),
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),
}

/// A required field missing from a mapped document.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{record}[{index}] is missing required field `{field}`")]
pub struct RequirementError {
    /// Top-level collection name, for example `"accessors"`.
    pub record: &'static str,
    /// Index within that collection.
    pub index: usize,
    /// The missing property, as it is spelled in the document.
    pub field: &'static str,
}

/// Umbrella error returned by the high-level load and save helpers.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParserError),
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error(transparent)]
    Requirement(#[from] RequirementError),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error("document is empty")]
    EmptyDocument,
    #[error("document root is not an object")]
    RootNotObject,
    #[error("buffer uri {0:?} does not name a file inside the document's directory")]
    UriOutsideDirectory(alloc::string::String),
    #[cfg(feature = "std")]
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

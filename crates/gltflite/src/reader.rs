//! Recursive-descent JSON scanner that emits structural events.
//!
//! The reader never copies value bytes. It tracks offsets, hands each token to
//! a [`JsonHandler`] as a [`Range`], and leaves materialization to the
//! handler, which receives the stream alongside every event.
//!
//! Grammar notes:
//!
//! - whitespace is space, tab, CR and LF only;
//! - the root must be an object or an array, and an empty or all-whitespace
//!   input reads successfully with no root;
//! - string escapes are validated (`\uXXXX` needs four hex digits) but not
//!   decoded, and surrogate pairing is not checked;
//! - raw UTF-8 in strings is validated by lead-byte class, which also admits
//!   the legacy 5- and 6-byte forms;
//! - the first error ends the read and is reported exactly once.

use alloc::vec::Vec;

use log::{debug, warn};

use crate::{
    error::{BuildError, ParserError, SyntaxError},
    options::ReaderOptions,
    range::Range,
    stream::ByteCursor,
};

/// The kind of value a token holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum JsonKind {
    Object,
    Array,
    String,
    Integer,
    Float,
    True,
    False,
    Null,
}

impl JsonKind {
    /// Whether the kind is an object or an array.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, JsonKind::Object | JsonKind::Array)
    }
}

/// Receives the reader's events in document order.
///
/// Containers are announced depth-first: a child object or array is opened,
/// filled, and closed before the parent's [`key_value`](Self::key_value) or
/// [`value`](Self::value) event for it fires. Object and array ranges span the
/// brackets; string ranges exclude the quotes.
///
/// Returning an error from any callback aborts the read, and the error is
/// reported through [`on_error`](Self::on_error) like a syntax error.
#[allow(unused_variables)]
pub trait JsonHandler<S: ByteCursor> {
    /// Called once at the start of every read.
    fn begin(&mut self, stream: &mut S) -> Result<(), BuildError> {
        Ok(())
    }

    /// Called after [`root`](Self::root) on success.
    fn end(&mut self, stream: &mut S) -> Result<(), BuildError> {
        Ok(())
    }

    /// An object was opened.
    fn begin_object(&mut self, stream: &mut S) -> Result<(), BuildError> {
        Ok(())
    }

    /// The innermost open object was closed.
    fn end_object(&mut self, stream: &mut S, range: Range) -> Result<(), BuildError> {
        Ok(())
    }

    /// An array was opened.
    fn begin_array(&mut self, stream: &mut S) -> Result<(), BuildError> {
        Ok(())
    }

    /// The innermost open array was closed.
    fn end_array(&mut self, stream: &mut S, range: Range) -> Result<(), BuildError> {
        Ok(())
    }

    /// The top-level container is complete.
    fn root(&mut self, stream: &mut S, kind: JsonKind, range: Range) -> Result<(), BuildError> {
        Ok(())
    }

    /// An element of the innermost open array.
    fn value(&mut self, stream: &mut S, kind: JsonKind, range: Range) -> Result<(), BuildError> {
        Ok(())
    }

    /// A member of the innermost open object.
    fn key_value(
        &mut self,
        stream: &mut S,
        key: Range,
        kind: JsonKind,
        value: Range,
    ) -> Result<(), BuildError> {
        Ok(())
    }

    /// The read failed. Fires at most once per read.
    fn on_error(&mut self, error: &ParserError) {}
}

/// Streams events for one document out of a [`ByteCursor`].
#[derive(Debug)]
pub struct JsonReader<S> {
    stream: S,
    options: ReaderOptions,
    depth: usize,
}

impl<S: ByteCursor> JsonReader<S> {
    /// Creates a reader with default options.
    pub fn new(stream: S) -> Self {
        Self::with_options(stream, ReaderOptions::default())
    }

    /// Creates a reader with the given options.
    pub fn with_options(stream: S, options: ReaderOptions) -> Self {
        Self {
            stream,
            options,
            depth: 0,
        }
    }

    /// The underlying stream.
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Gives back the stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Reads one document from the current stream position.
    ///
    /// Returns the kind of the root, or `None` when the input holds nothing
    /// but whitespace.
    ///
    /// # Errors
    ///
    /// Returns the first syntax or handler error, located by line and column.
    /// The handler's [`on_error`](JsonHandler::on_error) sees the same error.
    pub fn read<H: JsonHandler<S>>(
        &mut self,
        handler: &mut H,
    ) -> Result<Option<JsonKind>, ParserError> {
        self.depth = 0;
        let start = self.stream.tell();
        match self.read_document(handler) {
            Ok(kind) => {
                #[cfg(any(test, feature = "fuzzing"))]
                assert_eq!(self.depth, 0, "Internal error: nesting depth not unwound");
                debug!(
                    "read {} bytes of JSON, root {:?}",
                    self.stream.tell() - start,
                    kind
                );
                Ok(kind)
            }
            Err(source) => {
                let error = self.locate(source);
                debug!("JSON read failed: {error}");
                handler.on_error(&error);
                Err(error)
            }
        }
    }

    fn read_document<H: JsonHandler<S>>(
        &mut self,
        handler: &mut H,
    ) -> Result<Option<JsonKind>, SyntaxError> {
        handler.begin(&mut self.stream)?;
        if !self.skip_space() {
            return Ok(None);
        }
        match self.peek() {
            Some(b'{' | b'[') => {}
            _ => return Err(SyntaxError::RootNotContainer),
        }
        let (kind, range) = self.value(handler)?;
        if self.skip_space() {
            if self.options.reject_trailing_bytes {
                return Err(SyntaxError::TrailingBytes);
            }
            warn!(
                "ignoring {} bytes after the root value",
                self.stream.len() - self.stream.tell()
            );
        }
        handler.root(&mut self.stream, kind, range)?;
        handler.end(&mut self.stream)?;
        Ok(Some(kind))
    }

    // --------------------------------------------------------------------------------------------
    // Values
    // --------------------------------------------------------------------------------------------

    fn value<H: JsonHandler<S>>(
        &mut self,
        handler: &mut H,
    ) -> Result<(JsonKind, Range), SyntaxError> {
        let start = self.stream.tell();
        match self.next()? {
            b'{' => {
                self.object(handler, start)?;
                Ok((JsonKind::Object, self.span_from(start)))
            }
            b'[' => {
                self.array(handler, start)?;
                Ok((JsonKind::Array, self.span_from(start)))
            }
            b'"' => Ok((JsonKind::String, self.string()?)),
            b't' => {
                self.literal(b"rue")?;
                Ok((JsonKind::True, self.span_from(start)))
            }
            b'f' => {
                self.literal(b"alse")?;
                Ok((JsonKind::False, self.span_from(start)))
            }
            b'n' => {
                self.literal(b"ull")?;
                Ok((JsonKind::Null, self.span_from(start)))
            }
            b'-' | b'0'..=b'9' => {
                self.stream.unget();
                self.number()
            }
            c => Err(SyntaxError::InvalidCharacter(char::from(c))),
        }
    }

    fn object<H: JsonHandler<S>>(&mut self, handler: &mut H, start: u64) -> Result<(), SyntaxError> {
        self.enter()?;
        handler.begin_object(&mut self.stream)?;
        self.require_space()?;
        if self.peek() == Some(b'}') {
            self.stream.get();
        } else {
            loop {
                match self.next()? {
                    b'"' => {}
                    b'}' => return Err(SyntaxError::TrailingComma),
                    c => return Err(SyntaxError::InvalidCharacter(char::from(c))),
                }
                let key = self.string()?;
                self.require_space()?;
                if self.next()? != b':' {
                    return Err(SyntaxError::ExpectedColon);
                }
                self.require_space()?;
                let (kind, value) = self.value(handler)?;
                handler.key_value(&mut self.stream, key, kind, value)?;
                self.require_space()?;
                match self.next()? {
                    b',' => self.require_space()?,
                    b'}' => break,
                    c => return Err(SyntaxError::InvalidCharacter(char::from(c))),
                }
            }
        }
        let range = self.span_from(start);
        handler.end_object(&mut self.stream, range)?;
        self.leave();
        Ok(())
    }

    fn array<H: JsonHandler<S>>(&mut self, handler: &mut H, start: u64) -> Result<(), SyntaxError> {
        self.enter()?;
        handler.begin_array(&mut self.stream)?;
        self.require_space()?;
        match self.peek() {
            Some(b']') => {
                self.stream.get();
            }
            Some(b',') => return Err(SyntaxError::InvalidCharacter(',')),
            _ => loop {
                if self.peek() == Some(b']') {
                    return Err(SyntaxError::TrailingComma);
                }
                let (kind, value) = self.value(handler)?;
                handler.value(&mut self.stream, kind, value)?;
                self.require_space()?;
                match self.next()? {
                    b',' => self.require_space()?,
                    b']' => break,
                    c => return Err(SyntaxError::InvalidCharacter(char::from(c))),
                }
            },
        }
        let range = self.span_from(start);
        handler.end_array(&mut self.stream, range)?;
        self.leave();
        Ok(())
    }

    /// Scans a string body after its opening quote.
    fn string(&mut self) -> Result<Range, SyntaxError> {
        let start = self.stream.tell();
        loop {
            let c = self.next()?;
            match c {
                b'"' => return Ok(Range::between(start, self.stream.tell() - 1)),
                b'\\' => match self.next()? {
                    b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => {}
                    b'u' => {
                        for _ in 0..4 {
                            if !self.next()?.is_ascii_hexdigit() {
                                return Err(SyntaxError::InvalidUnicodeEscape);
                            }
                        }
                    }
                    _ => return Err(SyntaxError::InvalidEscape),
                },
                0x00..=0x1F => return Err(SyntaxError::ControlCharacterInString(c)),
                0x20..=0x7F => {}
                _ => {
                    let trailing = utf8_trailing_len(c).ok_or(SyntaxError::InvalidUtf8(c))?;
                    for _ in 0..trailing {
                        let b = self.next()?;
                        if b >> 6 != 0b10 {
                            return Err(SyntaxError::InvalidUtf8(b));
                        }
                    }
                }
            }
        }
    }

    fn number(&mut self) -> Result<(JsonKind, Range), SyntaxError> {
        let start = self.stream.tell();
        let mut kind = JsonKind::Integer;
        let mut c = self.next()?;
        if c == b'-' {
            c = self.next()?;
        }
        if !c.is_ascii_digit() {
            return Err(SyntaxError::InvalidNumber);
        }
        if c != b'0' {
            self.digits();
        }
        if self.peek() == Some(b'.') {
            self.stream.get();
            self.require_digit()?;
            kind = JsonKind::Float;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.stream.get();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.stream.get();
            }
            self.require_digit()?;
            kind = JsonKind::Float;
        }
        Ok((kind, self.span_from(start)))
    }

    fn literal(&mut self, rest: &[u8]) -> Result<(), SyntaxError> {
        for &expected in rest {
            if self.next()? != expected {
                return Err(SyntaxError::InvalidLiteral);
            }
        }
        Ok(())
    }

    // --------------------------------------------------------------------------------------------
    // Cursor helpers
    // --------------------------------------------------------------------------------------------

    #[inline(always)]
    fn next(&mut self) -> Result<u8, SyntaxError> {
        self.stream.get().ok_or(SyntaxError::UnexpectedEndOfInput)
    }

    #[inline(always)]
    fn peek(&mut self) -> Option<u8> {
        let c = self.stream.get()?;
        self.stream.unget();
        Some(c)
    }

    /// Skips whitespace, returning whether a non-whitespace byte follows.
    fn skip_space(&mut self) -> bool {
        while let Some(c) = self.stream.get() {
            if !matches!(c, b' ' | b'\t' | b'\r' | b'\n') {
                self.stream.unget();
                return true;
            }
        }
        false
    }

    fn require_space(&mut self) -> Result<(), SyntaxError> {
        if self.skip_space() {
            Ok(())
        } else {
            Err(SyntaxError::UnexpectedEndOfInput)
        }
    }

    fn digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.stream.get();
        }
    }

    fn require_digit(&mut self) -> Result<(), SyntaxError> {
        if !matches!(self.peek(), Some(b'0'..=b'9')) {
            return Err(SyntaxError::InvalidNumber);
        }
        self.digits();
        Ok(())
    }

    fn span_from(&self, start: u64) -> Range {
        Range::between(start, self.stream.tell())
    }

    fn enter(&mut self) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(SyntaxError::DepthLimitExceeded(self.options.max_depth));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // --------------------------------------------------------------------------------------------
    // Diagnostics
    // --------------------------------------------------------------------------------------------

    /// Attaches a line and column to `source` by rescanning from offset 0.
    fn locate(&mut self, source: SyntaxError) -> ParserError {
        let offset = self.stream.tell();
        let (line, column) = self.line_column(offset).unwrap_or((0, 0));
        ParserError {
            source,
            line,
            column,
            offset,
        }
    }

    fn line_column(&mut self, offset: u64) -> Option<(usize, usize)> {
        self.stream.seek(0).ok()?;
        let mut line = 0;
        let mut column = 0;
        while self.stream.tell() < offset {
            let Some(c) = self.stream.get() else { break };
            match c {
                b'\r' => {
                    if self.stream.tell() < offset && self.peek() == Some(b'\n') {
                        self.stream.get();
                    }
                    line += 1;
                    column = 0;
                }
                b'\n' => {
                    line += 1;
                    column = 0;
                }
                _ => column += 1,
            }
        }
        self.stream.seek(offset).ok()?;
        Some((line + 1, column))
    }
}

/// Number of continuation bytes implied by a UTF-8 lead byte.
fn utf8_trailing_len(lead: u8) -> Option<usize> {
    match lead {
        _ if lead >> 5 == 0b110 => Some(1),
        _ if lead >> 4 == 0b1110 => Some(2),
        _ if lead >> 3 == 0b1_1110 => Some(3),
        _ if lead >> 2 == 0b11_1110 => Some(4),
        _ if lead >> 1 == 0b111_1110 => Some(5),
        _ => None,
    }
}

// ------------------------------------------------------------------------------------------------
// Event recording
// ------------------------------------------------------------------------------------------------

/// One reader callback, as recorded by [`EventCollector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Event {
    Begin,
    End,
    BeginObject,
    EndObject(Range),
    BeginArray,
    EndArray(Range),
    Root(JsonKind, Range),
    Value(JsonKind, Range),
    KeyValue(Range, JsonKind, Range),
    Error { line: usize, column: usize },
}

/// A handler that records every event it receives.
#[derive(Debug, Default, Clone)]
pub struct EventCollector {
    /// Events in the order they arrived.
    pub events: Vec<Event>,
}

impl EventCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded [`Event::Error`]s.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Error { .. }))
            .count()
    }
}

impl<S: ByteCursor> JsonHandler<S> for EventCollector {
    fn begin(&mut self, _: &mut S) -> Result<(), BuildError> {
        self.events.push(Event::Begin);
        Ok(())
    }

    fn end(&mut self, _: &mut S) -> Result<(), BuildError> {
        self.events.push(Event::End);
        Ok(())
    }

    fn begin_object(&mut self, _: &mut S) -> Result<(), BuildError> {
        self.events.push(Event::BeginObject);
        Ok(())
    }

    fn end_object(&mut self, _: &mut S, range: Range) -> Result<(), BuildError> {
        self.events.push(Event::EndObject(range));
        Ok(())
    }

    fn begin_array(&mut self, _: &mut S) -> Result<(), BuildError> {
        self.events.push(Event::BeginArray);
        Ok(())
    }

    fn end_array(&mut self, _: &mut S, range: Range) -> Result<(), BuildError> {
        self.events.push(Event::EndArray(range));
        Ok(())
    }

    fn root(&mut self, _: &mut S, kind: JsonKind, range: Range) -> Result<(), BuildError> {
        self.events.push(Event::Root(kind, range));
        Ok(())
    }

    fn value(&mut self, _: &mut S, kind: JsonKind, range: Range) -> Result<(), BuildError> {
        self.events.push(Event::Value(kind, range));
        Ok(())
    }

    fn key_value(
        &mut self,
        _: &mut S,
        key: Range,
        kind: JsonKind,
        value: Range,
    ) -> Result<(), BuildError> {
        self.events.push(Event::KeyValue(key, kind, value));
        Ok(())
    }

    fn on_error(&mut self, error: &ParserError) {
        self.events.push(Event::Error {
            line: error.line(),
            column: error.column(),
        });
    }
}

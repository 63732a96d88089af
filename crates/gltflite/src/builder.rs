//! Generic document tree assembled from reader events.
//!
//! The builder keeps a stack of the objects and arrays that are still open.
//! Each one owns a block of [`KeyedValue`] slots in an [`Arena`] that doubles
//! when full. Closing a container parks it in a one-slot handoff until the
//! parent's `value` or `key_value` event claims it, which is why the reader's
//! depth-first event order is required.
//!
//! Object keys are decoded, interned to codes and never stored. String values are
//! decoded into a [`StringTable`].

use alloc::vec::Vec;

use bstr::BStr;
use log::debug;

use crate::{
    arena::{Arena, ArenaStats, Block},
    error::BuildError,
    keys::{self, Key},
    range::{Range, parse_float, parse_int},
    reader::{JsonHandler, JsonKind},
    stream::ByteCursor,
    strings::{self, StrRef, StringTable},
};

/// Slots given to a freshly opened container.
pub const INITIAL_CAPACITY: usize = 2;

/// Contiguous children of an object or array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seq {
    block: Block,
    len: u32,
}

impl Seq {
    /// Number of live children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// One node of the generic tree.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[allow(missing_docs)]
pub enum AnyValue {
    #[default]
    Null,
    True,
    False,
    Integer(i64),
    Float(f64),
    String(StrRef),
    Object(Seq),
    Array(Seq),
}

impl AnyValue {
    /// The reader kind this node was built from.
    #[must_use]
    pub fn kind(&self) -> JsonKind {
        match self {
            AnyValue::Null => JsonKind::Null,
            AnyValue::True => JsonKind::True,
            AnyValue::False => JsonKind::False,
            AnyValue::Integer(_) => JsonKind::Integer,
            AnyValue::Float(_) => JsonKind::Float,
            AnyValue::String(_) => JsonKind::String,
            AnyValue::Object(_) => JsonKind::Object,
            AnyValue::Array(_) => JsonKind::Array,
        }
    }

    /// Number of children for containers, zero otherwise.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            AnyValue::Object(seq) | AnyValue::Array(seq) => seq.len(),
            _ => 0,
        }
    }

    /// The value as a float, for either numeric kind.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            AnyValue::Integer(i) => Some(i as f64),
            AnyValue::Float(f) => Some(f),
            _ => None,
        }
    }

    /// The value as an integer. Floats with no fractional part qualify.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            AnyValue::Integer(i) => Some(i),
            AnyValue::Float(f) if (-9.0e15..9.0e15).contains(&f) => {
                let i = f as i64;
                (i as f64 == f).then_some(i)
            }
            _ => None,
        }
    }

    /// The value of a `true` or `false` literal.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnyValue::True => Some(true),
            AnyValue::False => Some(false),
            _ => None,
        }
    }
}

/// An object member, or an array element with the key [`keys::UNKNOWN`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyedValue {
    /// Interned key code.
    pub key: i32,
    /// The member's value.
    pub value: AnyValue,
}

impl Default for KeyedValue {
    fn default() -> Self {
        Self {
            key: keys::UNKNOWN,
            value: AnyValue::Null,
        }
    }
}

impl KeyedValue {
    /// The key, if it is part of the vocabulary.
    #[must_use]
    pub fn known_key(&self) -> Option<Key> {
        Key::from_code(self.key)
    }
}

// ------------------------------------------------------------------------------------------------
// Document
// ------------------------------------------------------------------------------------------------

/// A fully built generic tree.
///
/// Read-only: consumers walk it through [`root`](Self::root),
/// [`members`](Self::members), [`elements`](Self::elements) and
/// [`lookup`](Self::lookup).
#[derive(Debug, Default)]
pub struct Document {
    arena: Arena<KeyedValue>,
    strings: StringTable,
    root: Option<AnyValue>,
}

impl Document {
    /// The top-level container, if a document was read.
    #[must_use]
    pub fn root(&self) -> Option<AnyValue> {
        self.root
    }

    /// Members of an object. Empty for any other kind.
    #[must_use]
    pub fn members(&self, object: AnyValue) -> &[KeyedValue] {
        match object {
            AnyValue::Object(seq) => self.children(seq),
            _ => &[],
        }
    }

    /// Elements of an array. Empty for any other kind.
    pub fn elements(&self, array: AnyValue) -> impl ExactSizeIterator<Item = AnyValue> + '_ {
        let slots = match array {
            AnyValue::Array(seq) => self.children(seq),
            _ => &[],
        };
        slots.iter().map(|slot| slot.value)
    }

    fn children(&self, seq: Seq) -> &[KeyedValue] {
        let slots = self.arena.slice(seq.block);
        &slots[..seq.len().min(slots.len())]
    }

    /// First member of `object` whose key has the code `key`.
    #[must_use]
    pub fn lookup(&self, key: i32, object: AnyValue) -> Option<AnyValue> {
        self.members(object)
            .iter()
            .find(|member| member.key == key)
            .map(|member| member.value)
    }

    /// Bytes of a stored string.
    #[must_use]
    pub fn string(&self, s: StrRef) -> &BStr {
        self.strings.get(s)
    }

    /// The value as UTF-8 text, when it is a string holding valid UTF-8.
    #[must_use]
    pub fn as_str(&self, value: AnyValue) -> Option<&str> {
        match value {
            AnyValue::String(s) => core::str::from_utf8(self.strings.get(s)).ok(),
            _ => None,
        }
    }

    /// The decoded-string table.
    #[must_use]
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Allocator counters, for diagnostics.
    #[must_use]
    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }
}

// ------------------------------------------------------------------------------------------------
// Builder
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Open {
    kind: JsonKind,
    block: Block,
    len: usize,
}

impl Open {
    fn close(self) -> AnyValue {
        let seq = Seq {
            block: self.block,
            len: u32::try_from(self.len).unwrap_or(u32::MAX),
        };
        match self.kind {
            JsonKind::Array => AnyValue::Array(seq),
            _ => AnyValue::Object(seq),
        }
    }
}

/// Builds a [`Document`] from reader events.
///
/// Reusable: every read starts with [`begin`](Self::begin), which returns all
/// memory of the previous document to the arena in one step.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    doc: Document,
    stack: Vec<Open>,
    closed: Option<AnyValue>,
    scratch: Vec<u8>,
    unescaped: Vec<u8>,
}

impl DocumentBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards the current document and all open containers.
    pub fn begin(&mut self) {
        self.doc.arena.reset();
        self.doc.strings.clear();
        self.doc.root = None;
        self.stack.clear();
        self.closed = None;
    }

    /// The document built so far.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Takes the built document, leaving the builder empty.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Depth of the open-container stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn open(&mut self, kind: JsonKind) -> Result<(), BuildError> {
        if self.closed.is_some() {
            return Err(BuildError::UnclaimedChild);
        }
        let block = self.doc.arena.alloc(INITIAL_CAPACITY);
        self.stack.push(Open { kind, block, len: 0 });
        Ok(())
    }

    fn close(&mut self, kind: JsonKind) -> Result<(), BuildError> {
        if self.closed.is_some() {
            return Err(BuildError::UnclaimedChild);
        }
        match self.stack.pop() {
            Some(open) if open.kind == kind => {
                self.closed = Some(open.close());
                Ok(())
            }
            Some(_) => Err(BuildError::KindMismatch),
            None => Err(BuildError::UnbalancedEnd),
        }
    }

    /// Turns an event's payload into a node.
    fn materialize<S: ByteCursor>(
        &mut self,
        stream: &mut S,
        kind: JsonKind,
        range: Range,
    ) -> Result<AnyValue, BuildError> {
        let value = match kind {
            JsonKind::Object | JsonKind::Array => {
                return match self.closed.take() {
                    Some(value) if value.kind() == kind => Ok(value),
                    Some(_) => Err(BuildError::KindMismatch),
                    None => Err(BuildError::ChildNotClosed),
                };
            }
            _ if self.closed.is_some() => return Err(BuildError::UnclaimedChild),
            JsonKind::Null => AnyValue::Null,
            JsonKind::True => AnyValue::True,
            JsonKind::False => AnyValue::False,
            JsonKind::String => {
                self.load(stream, range)?;
                AnyValue::String(self.doc.strings.push_unescaped(&self.scratch))
            }
            JsonKind::Integer => {
                self.load(stream, range)?;
                match parse_int(&self.scratch) {
                    Some(i) => AnyValue::Integer(i),
                    // Too wide for i64.
                    None => AnyValue::Float(
                        parse_float(&self.scratch).ok_or(BuildError::InvalidNumber)?,
                    ),
                }
            }
            JsonKind::Float => {
                self.load(stream, range)?;
                AnyValue::Float(parse_float(&self.scratch).ok_or(BuildError::InvalidNumber)?)
            }
        };
        Ok(value)
    }

    fn load<S: ByteCursor>(&mut self, stream: &mut S, range: Range) -> Result<(), BuildError> {
        self.scratch.clear();
        range.view(stream).read_into(&mut self.scratch)?;
        Ok(())
    }

    /// Appends a slot to the innermost open container, doubling it if full.
    fn push_slot(&mut self, expect: JsonKind, slot: KeyedValue) -> Result<(), BuildError> {
        let top = match self.stack.last_mut() {
            Some(top) if top.kind == expect => top,
            Some(_) => return Err(BuildError::KindMismatch),
            None => return Err(BuildError::NoOpenContainer),
        };
        if top.len == top.block.capacity() {
            top.block = self.doc.arena.grow(top.block, top.len, top.len * 2);
        }
        if let Some(dst) = self.doc.arena.slice_mut(top.block).get_mut(top.len) {
            *dst = slot;
            top.len += 1;
        }
        Ok(())
    }
}

impl<S: ByteCursor> JsonHandler<S> for DocumentBuilder {
    fn begin(&mut self, _: &mut S) -> Result<(), BuildError> {
        DocumentBuilder::begin(self);
        Ok(())
    }

    fn begin_object(&mut self, _: &mut S) -> Result<(), BuildError> {
        self.open(JsonKind::Object)
    }

    fn end_object(&mut self, _: &mut S, _: Range) -> Result<(), BuildError> {
        self.close(JsonKind::Object)
    }

    fn begin_array(&mut self, _: &mut S) -> Result<(), BuildError> {
        self.open(JsonKind::Array)
    }

    fn end_array(&mut self, _: &mut S, _: Range) -> Result<(), BuildError> {
        self.close(JsonKind::Array)
    }

    fn root(&mut self, _: &mut S, kind: JsonKind, _: Range) -> Result<(), BuildError> {
        if !self.stack.is_empty() {
            return Err(BuildError::UnbalancedEnd);
        }
        match self.closed.take() {
            Some(value) if value.kind() == kind => {
                debug!(
                    "built document: {} top-level members, {} string bytes",
                    value.count(),
                    self.doc.strings.len()
                );
                self.doc.root = Some(value);
                Ok(())
            }
            Some(_) => Err(BuildError::KindMismatch),
            None => Err(BuildError::ChildNotClosed),
        }
    }

    fn value(&mut self, stream: &mut S, kind: JsonKind, range: Range) -> Result<(), BuildError> {
        let value = self.materialize(stream, kind, range)?;
        self.push_slot(
            JsonKind::Array,
            KeyedValue {
                key: keys::UNKNOWN,
                value,
            },
        )
    }

    fn key_value(
        &mut self,
        stream: &mut S,
        key: Range,
        kind: JsonKind,
        value: Range,
    ) -> Result<(), BuildError> {
        let value = self.materialize(stream, kind, value)?;
        self.load(stream, key)?;
        if self.scratch.contains(&b'\\') {
            self.unescaped.clear();
            strings::unescape_into(&mut self.unescaped, &self.scratch);
            core::mem::swap(&mut self.scratch, &mut self.unescaped);
        }
        self.scratch.make_ascii_uppercase();
        let key = keys::code_for(&self.scratch);
        self.push_slot(JsonKind::Object, KeyedValue { key, value })
    }
}

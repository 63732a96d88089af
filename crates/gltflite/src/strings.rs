//! Append-only storage for decoded string values.

use alloc::vec::Vec;

use bstr::{BStr, ByteSlice};

/// Handle to one string in a [`StringTable`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StrRef {
    offset: u32,
    len: u32,
}

impl StrRef {
    /// Byte length, excluding the terminator.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether the string is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte offset of the first byte within the table.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset as usize
    }
}

/// A contiguous buffer of NUL-terminated strings.
///
/// Offsets stay valid until [`clear`](StringTable::clear); nothing is ever
/// removed or moved within the logical buffer.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    bytes: Vec<u8>,
}

impl StringTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes held, terminators included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no string has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Drops every string, keeping the allocation.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Stores `bytes` verbatim.
    pub fn push(&mut self, bytes: &[u8]) -> StrRef {
        let offset = self.bytes.len();
        self.bytes.extend_from_slice(bytes);
        self.finish(offset)
    }

    /// Stores the body of a JSON string with its escape sequences decoded.
    ///
    /// `raw` must already have passed the reader's escape validation. An
    /// unpaired surrogate escape decodes to U+FFFD.
    pub fn push_unescaped(&mut self, raw: &[u8]) -> StrRef {
        let offset = self.bytes.len();
        unescape_into(&mut self.bytes, raw);
        self.finish(offset)
    }

    fn finish(&mut self, offset: usize) -> StrRef {
        let len = self.bytes.len() - offset;
        self.bytes.push(0);
        StrRef {
            offset: u32::try_from(offset).unwrap_or(u32::MAX),
            len: u32::try_from(len).unwrap_or(u32::MAX),
        }
    }

    /// The bytes of `s`, without the terminator. Empty if `s` is stale.
    #[must_use]
    pub fn get(&self, s: StrRef) -> &BStr {
        let start = s.offset();
        self.bytes
            .get(start..start + s.len())
            .unwrap_or_default()
            .as_bstr()
    }

    /// The bytes of `s` followed by its NUL terminator.
    #[must_use]
    pub fn get_with_nul(&self, s: StrRef) -> &[u8] {
        let start = s.offset();
        self.bytes
            .get(start..=start + s.len())
            .unwrap_or_default()
    }
}

/// Appends the body of a JSON string to `out` with its escape sequences
/// decoded.
pub(crate) fn unescape_into(out: &mut Vec<u8>, raw: &[u8]) {
    let mut rest = raw;
    while let Some(pos) = rest.find_byte(b'\\') {
        out.extend_from_slice(&rest[..pos]);
        rest = decode_escape(out, &rest[pos + 1..]);
    }
    out.extend_from_slice(rest);
}

/// Decodes one escape whose backslash was already consumed and returns the
/// remaining input.
fn decode_escape<'a>(out: &mut Vec<u8>, input: &'a [u8]) -> &'a [u8] {
    let Some((&tag, rest)) = input.split_first() else {
        return input;
    };
    let byte = match tag {
        b'b' => 0x08,
        b'f' => 0x0C,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'u' => {
            let (ch, rest) = decode_unicode_escape(rest);
            let mut utf8 = [0u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            return rest;
        }
        other => other,
    };
    out.push(byte);
    rest
}

/// Decodes the four hex digits after `\u`, joining a following low-surrogate
/// escape when the first one is a high surrogate.
fn decode_unicode_escape(input: &[u8]) -> (char, &[u8]) {
    let Some(unit) = hex4(input) else {
        return (char::REPLACEMENT_CHARACTER, input);
    };
    let rest = &input[4..];
    match unit {
        0xD800..=0xDBFF => {
            if let Some(low @ 0xDC00..=0xDFFF) = rest.strip_prefix(b"\\u").and_then(hex4) {
                let code = 0x1_0000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                let ch = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
                return (ch, &rest[6..]);
            }
            (char::REPLACEMENT_CHARACTER, rest)
        }
        _ => (
            char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER),
            rest,
        ),
    }
}

fn hex4(input: &[u8]) -> Option<u32> {
    let digits = input.get(..4)?;
    let text = core::str::from_utf8(digits).ok()?;
    u32::from_str_radix(text, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(raw: &str) -> alloc::string::String {
        let mut table = StringTable::new();
        let s = table.push_unescaped(raw.as_bytes());
        table.get(s).to_str_lossy().into_owned()
    }

    #[test]
    fn entries_are_nul_terminated_and_stable() {
        let mut table = StringTable::new();
        let a = table.push(b"abc");
        let b = table.push(b"");
        let c = table.push(b"de");
        assert_eq!(table.get_with_nul(a), b"abc\0");
        assert_eq!(table.get(b), "");
        assert_eq!(table.get(c), "de");
        assert_eq!(table.len(), 4 + 1 + 3);
        assert_eq!(c.offset(), 5);
    }

    #[test]
    fn simple_escapes() {
        assert_eq!(unescape(r#"a\"b\\c\/d\n\t"#), "a\"b\\c/d\n\t");
        assert_eq!(unescape(r"\b\f\r"), "\u{8}\u{c}\r");
    }

    #[test]
    fn unicode_escapes() {
        assert_eq!(unescape(r"\u00e9t\u00E9"), "\u{e9}t\u{e9}");
        assert_eq!(unescape(r"\uD83D\uDE00"), "\u{1F600}");
    }

    #[test]
    fn lone_surrogates_become_replacement() {
        assert_eq!(unescape(r"\uD83D"), "\u{FFFD}");
        assert_eq!(unescape(r"\uDE00x"), "\u{FFFD}x");
        assert_eq!(unescape(r"\uD83DA"), "\u{FFFD}A");
    }

    #[test]
    fn raw_utf8_passes_through() {
        assert_eq!(unescape("猫\\n"), "猫\n");
    }
}

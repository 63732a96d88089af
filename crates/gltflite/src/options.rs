//! Reader and writer configuration.

/// Configuration options for the JSON event reader.
///
/// # Default
///
/// A nesting limit of 512 and trailing bytes tolerated.
#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    /// Maximum nesting depth of objects and arrays, the root included.
    ///
    /// Deeper input is rejected with
    /// [`SyntaxError::DepthLimitExceeded`](crate::SyntaxError::DepthLimitExceeded)
    /// before the call stack can grow without bound.
    ///
    /// # Default
    ///
    /// `512`
    pub max_depth: usize,

    /// Whether bytes other than whitespace after the root value fail the read.
    ///
    /// When `false`, anything after the closing bracket of the root is left
    /// unread and logged at `warn` level.
    ///
    /// # Examples
    ///
    /// ```json
    /// {"asset":{"version":"2.0"}} garbage
    /// ```
    ///
    /// # Default
    ///
    /// `false`
    pub reject_trailing_bytes: bool,
}

/// Nesting limit applied when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 512;

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            reject_trailing_bytes: false,
        }
    }
}

/// Configuration options for the document writer.
///
/// # Default
///
/// Compact output with a four-space indent used once pretty printing is
/// switched on.
#[derive(Debug, Clone, Copy)]
pub struct WriterOptions {
    /// Whether to break lines and indent nested values.
    ///
    /// # Default
    ///
    /// `false`
    pub pretty_print: bool,

    /// Spaces per nesting level when pretty printing.
    ///
    /// # Default
    ///
    /// `4`
    pub indent: u8,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            pretty_print: false,
            indent: 4,
        }
    }
}

/// The two encodings of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileKind {
    /// JSON text.
    #[default]
    Gltf,
    /// Binary container holding a JSON chunk and an optional BIN chunk.
    Glb,
}

impl FileKind {
    /// Guesses the encoding from the first bytes of a file.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.len() >= 4 && bytes[..4] == crate::container::MAGIC.to_le_bytes() {
            FileKind::Glb
        } else {
            FileKind::Gltf
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_by_magic() {
        assert_eq!(FileKind::detect(b"glTF\x02\0\0\0"), FileKind::Glb);
        assert_eq!(FileKind::detect(b"{\"asset\":{}}"), FileKind::Gltf);
        assert_eq!(FileKind::detect(b"gl"), FileKind::Gltf);
    }
}

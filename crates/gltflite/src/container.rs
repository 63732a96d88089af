//! The GLB binary container.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! header: magic u32 | version u32 | total_length u32
//! chunk:  length u32 | type u32 | bytes[length]      (repeated)
//! ```
//!
//! Exactly one JSON chunk is required. A BIN chunk is optional, and chunks
//! of any other type are skipped. The reader indexes every chunk by walking
//! the length fields, so chunk order does not matter.

use alloc::vec::Vec;

use log::{debug, trace, warn};

use crate::{
    builder::DocumentBuilder,
    error::{ContainerError, StreamError},
    options::ReaderOptions,
    range::Range,
    reader::{JsonKind, JsonReader},
    stream::{ByteCursor, ByteSink, Window},
};

/// `glTF` in ASCII.
pub const MAGIC: u32 = 0x4654_6C67;
/// The only container version understood.
pub const VERSION: u32 = 2;
/// Type tag of the structural JSON chunk (`JSON`).
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// Type tag of the binary payload chunk (`BIN\0`).
pub const CHUNK_BIN: u32 = 0x004E_4942;
/// Bytes in the file header.
pub const HEADER_LEN: u64 = 12;
/// Bytes in each chunk header.
pub const CHUNK_HEADER_LEN: u64 = 8;

/// The fixed file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Must equal [`MAGIC`].
    pub magic: u32,
    /// Must equal [`VERSION`].
    pub version: u32,
    /// Declared length of the whole file.
    pub total_length: u32,
}

/// Location of one chunk's body within the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Type tag.
    pub kind: u32,
    /// Body span, excluding the chunk header.
    pub body: Range,
}

/// What a successful container read leaves behind besides the built tree.
#[derive(Debug, Clone, Default)]
pub struct GlbContents {
    /// Root kind of the JSON chunk, `None` if it held only whitespace.
    pub root: Option<JsonKind>,
    /// Span of the JSON chunk body.
    pub json: Range,
    /// Body of the BIN chunk, if present.
    pub bin: Option<Vec<u8>>,
}

/// Reads GLB containers into a [`DocumentBuilder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlbReader {
    options: ReaderOptions,
}

impl GlbReader {
    /// Creates a reader whose JSON chunk is parsed with `options`.
    #[must_use]
    pub fn new(options: ReaderOptions) -> Self {
        Self { options }
    }

    /// Reads the container starting at offset 0 of `stream`.
    ///
    /// # Errors
    ///
    /// Fails on a bad header before any chunk is read, on a chunk whose
    /// length runs past the end of the stream, when there is no JSON chunk,
    /// and on any error parsing the JSON chunk.
    pub fn read<S: ByteCursor>(
        &self,
        stream: &mut S,
        builder: &mut DocumentBuilder,
    ) -> Result<GlbContents, ContainerError> {
        let header = read_header(stream)?;
        if u64::from(header.total_length) != stream.len() {
            warn!(
                "GLB header declares {} bytes but the stream holds {}",
                header.total_length,
                stream.len()
            );
        }

        let chunks = scan_chunks(stream)?;
        let json = chunks
            .iter()
            .find(|c| c.kind == CHUNK_JSON)
            .ok_or(ContainerError::MissingJsonChunk)?
            .body;
        let bin = chunks.iter().find(|c| c.kind == CHUNK_BIN).map(|c| c.body);

        let root = {
            let window = Window::new(&mut *stream, json.start, json.len)?;
            JsonReader::with_options(window, self.options).read(builder)?
        };

        let bin = match bin {
            Some(body) => Some(body.view(stream).to_vec()?),
            None => None,
        };
        debug!(
            "read GLB: {} chunks, JSON {} bytes, BIN {:?} bytes",
            chunks.len(),
            json.len,
            bin.as_ref().map(Vec::len)
        );
        Ok(GlbContents { root, json, bin })
    }
}

/// Reads and validates the 12-byte header.
///
/// # Errors
///
/// [`ContainerError::Truncated`], [`ContainerError::BadMagic`] or
/// [`ContainerError::UnsupportedVersion`].
pub fn read_header<S: ByteCursor>(stream: &mut S) -> Result<Header, ContainerError> {
    stream.seek(0)?;
    let magic = read_u32(stream)?;
    if magic != MAGIC {
        return Err(ContainerError::BadMagic(magic));
    }
    let version = read_u32(stream)?;
    if version != VERSION {
        return Err(ContainerError::UnsupportedVersion(version));
    }
    let total_length = read_u32(stream)?;
    Ok(Header {
        magic,
        version,
        total_length,
    })
}

/// Walks the chunk headers after the file header.
///
/// Trailing bytes too short to hold a chunk header are ignored.
///
/// # Errors
///
/// [`ContainerError::Truncated`] when a chunk body runs past the end.
pub fn scan_chunks<S: ByteCursor>(stream: &mut S) -> Result<Vec<Chunk>, ContainerError> {
    let end = stream.len();
    let mut pos = HEADER_LEN;
    let mut chunks = Vec::new();
    while pos + CHUNK_HEADER_LEN <= end {
        stream.seek(pos)?;
        let length = u64::from(read_u32(stream)?);
        let kind = read_u32(stream)?;
        let body = Range::new(pos + CHUNK_HEADER_LEN, length);
        if body.end() > end {
            return Err(ContainerError::Truncated);
        }
        trace!("GLB chunk 0x{kind:08X} at {} ({length} bytes)", body.start);
        if kind != CHUNK_JSON && kind != CHUNK_BIN {
            warn!("skipping unknown GLB chunk type 0x{kind:08X}");
        }
        chunks.push(Chunk { kind, body });
        pos = body.end();
    }
    if pos < end {
        warn!("ignoring {} bytes after the last GLB chunk", end - pos);
    }
    Ok(chunks)
}

fn read_u32<S: ByteCursor>(stream: &mut S) -> Result<u32, ContainerError> {
    let mut bytes = [0u8; 4];
    stream.read_exact(&mut bytes).map_err(|err| match err {
        StreamError::OutOfBounds => ContainerError::Truncated,
        other => ContainerError::Stream(other),
    })?;
    Ok(u32::from_le_bytes(bytes))
}

// ------------------------------------------------------------------------------------------------
// Writing
// ------------------------------------------------------------------------------------------------

fn padded(len: usize) -> usize {
    len.next_multiple_of(4)
}

fn to_u32(len: usize) -> Result<u32, StreamError> {
    u32::try_from(len).map_err(|_| StreamError::OutOfBounds)
}

/// Frames `json` and `bin` as a GLB file.
///
/// Chunk bodies are padded to 4-byte boundaries, JSON with spaces and BIN
/// with zeros, and every length field counts the padding. An empty `bin`
/// omits the BIN chunk.
///
/// # Errors
///
/// Fails if the sink rejects a write or the file would exceed 4 GiB.
pub fn write_glb<W: ByteSink + ?Sized>(
    sink: &mut W,
    json: &[u8],
    bin: &[u8],
) -> Result<(), StreamError> {
    const HEADER: usize = HEADER_LEN as usize;
    const CHUNK_HEADER: usize = CHUNK_HEADER_LEN as usize;

    let json_len = padded(json.len());
    let bin_len = padded(bin.len());
    let mut total = HEADER + CHUNK_HEADER + json_len;
    if !bin.is_empty() {
        total += CHUNK_HEADER + bin_len;
    }

    sink.write_all(&MAGIC.to_le_bytes())?;
    sink.write_all(&VERSION.to_le_bytes())?;
    sink.write_all(&to_u32(total)?.to_le_bytes())?;

    sink.write_all(&to_u32(json_len)?.to_le_bytes())?;
    sink.write_all(&CHUNK_JSON.to_le_bytes())?;
    sink.write_all(json)?;
    sink.write_all(&b"   "[..json_len - json.len()])?;

    if !bin.is_empty() {
        sink.write_all(&to_u32(bin_len)?.to_le_bytes())?;
        sink.write_all(&CHUNK_BIN.to_le_bytes())?;
        sink.write_all(bin)?;
        sink.write_all(&[0u8; 3][..bin_len - bin.len()])?;
    }
    Ok(())
}

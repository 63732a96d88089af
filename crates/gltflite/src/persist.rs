//! One-call loading and saving of whole documents.

use alloc::vec::Vec;

use log::info;

use crate::{
    builder::DocumentBuilder,
    container::{GlbReader, MAGIC},
    error::Error,
    options::{FileKind, ReaderOptions, WriterOptions},
    reader::{JsonKind, JsonReader},
    schema::{Gltf, Mapper},
    stream::{ByteCursor, MemoryStream},
    writer::GltfWriter,
};

/// Reads a document from any seekable stream, telling JSON text and GLB
/// apart by the first four bytes.
///
/// Buffers without a `uri` are bound to the BIN chunk of a GLB file.
///
/// # Errors
///
/// Any parse or container error; [`Error::EmptyDocument`] when the input
/// holds only whitespace; [`Error::RootNotObject`] for an array root.
pub fn load_from_stream<S: ByteCursor>(
    mut stream: S,
    options: ReaderOptions,
) -> Result<Gltf, Error> {
    let kind = detect(&mut stream)?;
    let mut builder = DocumentBuilder::new();
    let (root, bin) = match kind {
        FileKind::Glb => {
            let contents = GlbReader::new(options).read(&mut stream, &mut builder)?;
            (contents.root, contents.bin)
        }
        FileKind::Gltf => {
            let root = JsonReader::with_options(stream, options).read(&mut builder)?;
            (root, None)
        }
    };
    match root {
        None => return Err(Error::EmptyDocument),
        Some(JsonKind::Object) => {}
        Some(_) => return Err(Error::RootNotObject),
    }

    let mut gltf = Mapper::new(builder.document())
        .map()
        .ok_or(Error::RootNotObject)?;
    if let Some(bin) = bin {
        gltf.bind_glb_buffers(bin)?;
    }
    info!(
        "loaded {kind:?} document with {} nodes and {} buffers",
        gltf.nodes.len(),
        gltf.buffers.len()
    );
    Ok(gltf)
}

fn detect<S: ByteCursor>(stream: &mut S) -> Result<FileKind, Error> {
    let mut magic = [0u8; 4];
    stream.seek(0)?;
    let n = stream.read(&mut magic)?;
    stream.seek(0)?;
    Ok(if n == 4 && u32::from_le_bytes(magic) == MAGIC {
        FileKind::Glb
    } else {
        FileKind::Gltf
    })
}

/// Reads a document held in memory.
///
/// # Errors
///
/// See [`load_from_stream`].
pub fn load_from_slice(bytes: &[u8], options: ReaderOptions) -> Result<Gltf, Error> {
    load_from_stream(MemoryStream::new(bytes), options)
}

/// Reads a document from a file, then loads any buffers stored in files next
/// to it.
///
/// # Errors
///
/// See [`load_from_stream`] and [`Gltf::load_external_buffers`].
#[cfg(feature = "std")]
pub fn load_from_file(
    path: impl AsRef<std::path::Path>,
    options: ReaderOptions,
) -> Result<Gltf, Error> {
    let path = path.as_ref();
    let mut gltf = load_from_stream(crate::stream::FileStream::open(path)?, options)?;
    let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    gltf.load_external_buffers(dir)?;
    Ok(gltf)
}

/// Renders a document into a fresh byte vector.
///
/// # Errors
///
/// Only fails for a GLB that would exceed 4 GiB.
pub fn save_to_vec(gltf: &Gltf, kind: FileKind, options: WriterOptions) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    GltfWriter::new(options).write(gltf, kind, &mut out)?;
    Ok(out)
}

/// Writes a document to a file, replacing any previous contents.
///
/// # Errors
///
/// Fails if the file cannot be created or written.
#[cfg(feature = "std")]
pub fn save_to_file(
    gltf: &Gltf,
    path: impl AsRef<std::path::Path>,
    kind: FileKind,
    options: WriterOptions,
) -> Result<(), Error> {
    use std::io::Write as _;

    let file = std::fs::File::create(path.as_ref())?;
    let mut sink = crate::stream::IoSink(std::io::BufWriter::new(file));
    GltfWriter::new(options).write(gltf, kind, &mut sink)?;
    sink.0.flush()?;
    info!("saved {kind:?} document to {}", path.as_ref().display());
    Ok(())
}

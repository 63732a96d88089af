//! A compact reader and writer for glTF 2.0 documents and GLB containers.
//!
//! The pipeline is layered:
//!
//! - [`JsonReader`] scans a [`ByteCursor`] and reports structural events to
//!   a [`JsonHandler`] without copying any value bytes;
//! - [`DocumentBuilder`] turns those events into a generic [`Document`] whose
//!   nodes live in a slab [`Arena`] and whose keys are interned to [`Key`]
//!   codes;
//! - [`GlbReader`] frames the same pipeline inside a binary container;
//! - [`Mapper`] fills the typed [`Gltf`] model, and [`GltfWriter`] renders it
//!   back as JSON text or GLB.
//!
//! Most callers only need [`load_from_slice`] and [`save_to_vec`]:
//!
//! ```rust
//! use gltflite::{FileKind, ReaderOptions, WriterOptions, load_from_slice, save_to_vec};
//!
//! let gltf = load_from_slice(
//!     br#"{"asset":{"version":"2.0"},"nodes":[{"name":"root"}]}"#,
//!     ReaderOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(gltf.nodes[0].name, "root");
//!
//! let glb = save_to_vec(&gltf, FileKind::Glb, WriterOptions::default()).unwrap();
//! assert_eq!(&glb[..4], b"glTF");
//! ```

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod arena;
mod builder;
pub mod container;
mod error;
pub mod keys;
mod options;
mod persist;
mod range;
mod reader;
pub mod schema;
pub mod stream;
mod strings;
mod writer;

#[cfg(test)]
mod tests;

pub use arena::{Arena, ArenaStats, Block};
pub use builder::{AnyValue, Document, DocumentBuilder, KeyedValue, Seq};
pub use container::{GlbContents, GlbReader, write_glb};
pub use error::{
    BuildError, ContainerError, Error, ParserError, RequirementError, StreamError, SyntaxError,
};
pub use keys::{Key, UNKNOWN, code_for, code_for_ignore_case};
pub use options::{DEFAULT_MAX_DEPTH, FileKind, ReaderOptions, WriterOptions};
pub use persist::{load_from_slice, load_from_stream, save_to_vec};
#[cfg(feature = "std")]
pub use persist::{load_from_file, save_to_file};
pub use range::{Range, RangeView};
pub use reader::{Event, EventCollector, JsonHandler, JsonKind, JsonReader};
pub use schema::{Gltf, Mapper, NodeOrder};
#[cfg(feature = "std")]
pub use stream::{FileStream, IoSink};
pub use stream::{ByteCursor, ByteSink, MemoryStream, Window};
pub use strings::{StrRef, StringTable};
pub use writer::GltfWriter;

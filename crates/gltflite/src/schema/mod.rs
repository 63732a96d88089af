//! Typed document model and the mapping from the generic tree.

use alloc::{string::String, vec::Vec};
use core::ops::Range as Span;

use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ContainerError;

mod mapper;
pub mod model;
mod nodes;
mod requirements;

pub use mapper::Mapper;
pub use model::*;
pub use nodes::NodeOrder;

/// Where the bytes of one buffer live.
#[derive(Debug, Clone, Default, PartialEq)]
enum Binding {
    #[default]
    Unbound,
    /// A slice of the BIN chunk.
    Bin(Span<usize>),
    /// Loaded from an external file.
    Owned(Vec<u8>),
}

/// A whole document: every top-level collection plus any binary payload.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub struct Gltf {
    pub extensions_used: Vec<String>,
    pub extensions_required: Vec<String>,
    pub accessors: Vec<Accessor>,
    pub animations: Vec<Animation>,
    pub asset: Asset,
    pub buffers: Vec<Buffer>,
    pub buffer_views: Vec<BufferView>,
    pub cameras: Vec<Camera>,
    pub images: Vec<Image>,
    pub materials: Vec<Material>,
    pub meshes: Vec<Mesh>,
    pub nodes: Vec<Node>,
    pub samplers: Vec<Sampler>,
    /// Default scene.
    pub scene: Option<Index>,
    pub scenes: Vec<Scene>,
    pub skins: Vec<Skin>,
    pub textures: Vec<Texture>,

    #[cfg_attr(feature = "serde", serde(skip))]
    bin: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(skip))]
    bindings: Vec<Binding>,
}

impl Gltf {
    /// Payload written as the BIN chunk of a GLB file.
    #[must_use]
    pub fn bin(&self) -> &[u8] {
        &self.bin
    }

    /// Replaces the BIN payload without rebinding any buffer.
    pub fn set_bin(&mut self, bin: Vec<u8>) {
        self.bin = bin;
    }

    /// Binds every buffer without a `uri` to consecutive slices of `bin`.
    ///
    /// # Errors
    ///
    /// [`ContainerError::ChunkOverrun`] if the declared byte lengths add up
    /// to more than `bin` holds.
    pub fn bind_glb_buffers(&mut self, bin: Vec<u8>) -> Result<(), ContainerError> {
        let mut bindings = Vec::with_capacity(self.buffers.len());
        let mut offset = 0usize;
        for buffer in &self.buffers {
            if buffer.uri.is_some() {
                bindings.push(Binding::Unbound);
                continue;
            }
            let len = buffer
                .byte_length
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(0);
            let end = offset
                .checked_add(len)
                .filter(|&end| end <= bin.len())
                .ok_or(ContainerError::ChunkOverrun)?;
            bindings.push(Binding::Bin(offset..end));
            offset = end;
        }
        debug!(
            "bound {offset} of {} BIN bytes to {} buffers",
            bin.len(),
            self.buffers.len()
        );
        self.bin = bin;
        self.bindings = bindings;
        Ok(())
    }

    /// Bytes of buffer `i`, if they have been bound or loaded.
    #[must_use]
    pub fn buffer_data(&self, i: usize) -> Option<&[u8]> {
        match self.bindings.get(i)? {
            Binding::Unbound => None,
            Binding::Bin(span) => self.bin.get(span.clone()),
            Binding::Owned(bytes) => Some(bytes),
        }
    }

    /// Reads every buffer whose `uri` names a file relative to `dir`.
    ///
    /// URIs are resolved against `dir` and percent-decoded. Data URIs and
    /// other schemes are not fetched and stay unbound.
    ///
    /// # Errors
    ///
    /// [`Error::UriOutsideDirectory`](crate::Error::UriOutsideDirectory) for
    /// an absolute URI or one that climbs out of `dir`; otherwise fails if a
    /// file cannot be read, or holds fewer bytes than the buffer declares.
    #[cfg(feature = "std")]
    pub fn load_external_buffers(&mut self, dir: &std::path::Path) -> Result<(), crate::Error> {
        use crate::error::StreamError;

        let base = directory_url(dir)?;
        self.bindings.resize(self.buffers.len(), Binding::Unbound);
        for (buffer, binding) in self.buffers.iter().zip(&mut self.bindings) {
            let Some(uri) = &buffer.uri else { continue };
            let Some(path) = resolve_uri(&base, uri)? else {
                continue;
            };
            let bytes = std::fs::read(&path)?;
            let declared = buffer
                .byte_length
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(bytes.len());
            if bytes.len() < declared {
                return Err(StreamError::OutOfBounds.into());
            }
            debug!("loaded {} bytes from {}", bytes.len(), path.display());
            *binding = Binding::Owned(bytes);
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
fn directory_url(dir: &std::path::Path) -> Result<url::Url, crate::Error> {
    use alloc::string::ToString;

    let dir = std::path::absolute(dir)?;
    url::Url::from_directory_path(&dir)
        .map_err(|()| crate::Error::UriOutsideDirectory(dir.display().to_string()))
}

/// The file `uri` names below `base`, or `None` for a scheme that is not
/// fetched from disk.
#[cfg(feature = "std")]
fn resolve_uri(base: &url::Url, uri: &str) -> Result<Option<std::path::PathBuf>, crate::Error> {
    use alloc::string::ToString;

    let outside = || crate::Error::UriOutsideDirectory(uri.to_string());
    let target = base.join(uri).map_err(|_| outside())?;
    if target.scheme() != "file" {
        log::warn!("buffer uri with scheme {:?} left unbound", target.scheme());
        return Ok(None);
    }
    if target.host() != base.host() || !target.path().starts_with(base.path()) {
        return Err(outside());
    }
    target.to_file_path().map(Some).map_err(|()| outside())
}

#[cfg(test)]
mod tests {
    use alloc::{borrow::ToOwned, vec};

    use super::*;

    fn with_buffers(lengths: &[(Option<&str>, u64)]) -> Gltf {
        Gltf {
            buffers: lengths
                .iter()
                .map(|&(uri, n)| Buffer {
                    uri: uri.map(ToOwned::to_owned),
                    byte_length: Some(n),
                    ..Buffer::default()
                })
                .collect(),
            ..Gltf::default()
        }
    }

    #[test]
    fn glb_buffers_take_cumulative_slices() {
        let mut gltf = with_buffers(&[(None, 3), (Some("ext.bin"), 100), (None, 2)]);
        gltf.bind_glb_buffers(vec![1, 2, 3, 4, 5, 0, 0, 0]).unwrap();
        assert_eq!(gltf.buffer_data(0), Some(&[1, 2, 3][..]));
        assert_eq!(gltf.buffer_data(1), None);
        assert_eq!(gltf.buffer_data(2), Some(&[4, 5][..]));
        assert_eq!(gltf.buffer_data(3), None);
    }

    #[test]
    fn glb_buffers_overrunning_the_chunk_fail() {
        let mut gltf = with_buffers(&[(None, 4), (None, 4)]);
        assert_eq!(
            gltf.bind_glb_buffers(vec![0; 6]),
            Err(ContainerError::ChunkOverrun)
        );
    }
}

#![no_main]

use gltflite::{FileKind, ReaderOptions, WriterOptions, load_from_slice, save_to_vec};
use libfuzzer_sys::fuzz_target;

/// Loads any bytes as GLB, and when that succeeds checks that the document
/// survives a write and a second load unchanged.
fn glb(data: &[u8]) {
    let mut bytes = b"glTF\x02\0\0\0".to_vec();
    bytes.extend_from_slice(&u32::try_from(data.len() + 12).unwrap_or(0).to_le_bytes());
    bytes.extend_from_slice(data);

    let Ok(gltf) = load_from_slice(&bytes, ReaderOptions::default()) else {
        return;
    };
    let saved = save_to_vec(&gltf, FileKind::Glb, WriterOptions::default())
        .expect("a loaded document can be written");
    let reloaded = load_from_slice(&saved, ReaderOptions::default())
        .expect("a written document loads again");
    assert_eq!(reloaded.nodes.len(), gltf.nodes.len());
    assert_eq!(reloaded.accessors.len(), gltf.accessors.len());
    assert_eq!(reloaded.buffers.len(), gltf.buffers.len());
}

fuzz_target!(|data: &[u8]| glb(data));

#![allow(missing_docs)]
#![allow(dead_code)]

use gltflite::container::{CHUNK_BIN, CHUNK_JSON, MAGIC, VERSION};

/// One triangle, its vertex data in a single 44-byte buffer.
pub const TRIANGLE: &str = r#"
{
    "asset": { "version": "2.0", "generator": "hand" },
    "scene": 0,
    "scenes": [ { "nodes": [ 0 ] } ],
    "nodes": [ { "mesh": 0, "name": "triangle" } ],
    "meshes": [ {
        "primitives": [ { "attributes": { "POSITION": 1 }, "indices": 0 } ]
    } ],
    "buffers": [ { "byteLength": 44 } ],
    "bufferViews": [
        { "buffer": 0, "byteOffset": 0, "byteLength": 6, "target": 34963 },
        { "buffer": 0, "byteOffset": 8, "byteLength": 36, "target": 34962 }
    ],
    "accessors": [
        {
            "bufferView": 0, "componentType": 5123, "count": 3,
            "type": "SCALAR", "max": [ 2 ], "min": [ 0 ]
        },
        {
            "bufferView": 1, "componentType": 5126, "count": 3,
            "type": "VEC3", "max": [ 1.0, 1.0, 0.0 ], "min": [ 0.0, 0.0, 0.0 ]
        }
    ]
}
"#;

/// A small scene graph with a textured, skinned and animated box.
pub const TEXTURED_BOX: &str = r#"
{
    "asset": { "version": "2.0", "copyright": "none", "minVersion": "2.0" },
    "extensionsUsed": [ "KHR_materials_unlit" ],
    "scene": 0,
    "scenes": [ { "name": "main", "nodes": [ 0, 3 ] } ],
    "nodes": [
        { "name": "root", "children": [ 1, 2 ], "translation": [ 0.0, 1.5, -2.0 ] },
        { "name": "box", "mesh": 0, "skin": 0, "rotation": [ 0.0, 0.0, 0.7071068, 0.7071068 ] },
        { "name": "joint", "scale": [ 2.0, 2.0, 2.0 ] },
        { "name": "eye", "camera": 0 }
    ],
    "cameras": [
        { "type": "perspective",
          "perspective": { "aspectRatio": 1.5, "yfov": 0.66, "znear": 0.01, "zfar": 100.0 } }
    ],
    "meshes": [ {
        "name": "box",
        "primitives": [ {
            "attributes": { "POSITION": 0, "NORMAL": 1, "TEXCOORD_0": 2, "JOINTS_0": 3, "WEIGHTS_0": 4 },
            "material": 0,
            "mode": 4
        } ]
    } ],
    "materials": [ {
        "name": "checker",
        "pbrMetallicRoughness": {
            "baseColorFactor": [ 1.0, 0.5, 0.25, 1.0 ],
            "baseColorTexture": { "index": 0 },
            "metallicFactor": 0.0
        },
        "alphaMode": "MASK",
        "alphaCutoff": 0.25,
        "doubleSided": true,
        "extensions": { "KHR_materials_unlit": {} }
    } ],
    "textures": [ { "sampler": 0, "source": 0 } ],
    "images": [ { "uri": "checker.png", "name": "checker" } ],
    "samplers": [ { "magFilter": 9728, "minFilter": 9986, "wrapS": 33071 } ],
    "skins": [ { "joints": [ 2 ], "skeleton": 0 } ],
    "animations": [ {
        "name": "spin",
        "channels": [ { "sampler": 0, "target": { "node": 1, "path": "rotation" } } ],
        "samplers": [ { "input": 5, "output": 6, "interpolation": "STEP" } ]
    } ],
    "buffers": [ { "byteLength": 8 } ],
    "bufferViews": [ { "buffer": 0, "byteLength": 8 } ],
    "accessors": [
        { "bufferView": 0, "componentType": 5126, "count": 24, "type": "VEC3" },
        { "bufferView": 0, "componentType": 5126, "count": 24, "type": "VEC3" },
        { "bufferView": 0, "componentType": 5126, "count": 24, "type": "VEC2" },
        { "bufferView": 0, "componentType": 5121, "count": 24, "type": "VEC4" },
        { "bufferView": 0, "componentType": 5126, "count": 24, "type": "VEC4" },
        { "bufferView": 0, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [ 0.0 ], "max": [ 1.0 ] },
        { "bufferView": 0, "componentType": 5126, "count": 2, "type": "VEC4" }
    ]
}
"#;

/// Vertex data for [`TRIANGLE`]: three `u16` indices, two bytes of padding
/// and three `f32` positions.
#[must_use]
pub fn triangle_bin() -> Vec<u8> {
    let mut bin = Vec::new();
    for i in [0u16, 1, 2, 0] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    for f in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0] {
        bin.extend_from_slice(&f.to_le_bytes());
    }
    bin
}

/// Frames one chunk, padding its body with `pad` to a multiple of four.
#[must_use]
pub fn chunk(kind: u32, body: &[u8], pad: u8) -> Vec<u8> {
    let mut body = body.to_vec();
    while body.len() % 4 != 0 {
        body.push(pad);
    }
    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(&u32::try_from(body.len()).unwrap().to_le_bytes());
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(&body);
    out
}

#[must_use]
pub fn json_chunk(json: &str) -> Vec<u8> {
    chunk(CHUNK_JSON, json.as_bytes(), b' ')
}

#[must_use]
pub fn bin_chunk(bin: &[u8]) -> Vec<u8> {
    chunk(CHUNK_BIN, bin, 0)
}

/// Prepends a valid header to already framed chunks.
#[must_use]
pub fn glb(chunks: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = chunks.concat();
    let mut out = Vec::with_capacity(body.len() + 12);
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&u32::try_from(body.len() + 12).unwrap().to_le_bytes());
    out.extend_from_slice(&body);
    out
}

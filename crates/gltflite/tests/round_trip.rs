#![allow(missing_docs)]

mod common;

use common::{TEXTURED_BOX, TRIANGLE};
use gltflite::{
    Error, FileKind, Gltf, GltfWriter, ReaderOptions, RequirementError, WriterOptions,
    load_from_slice, save_to_vec,
    schema::{AlphaMode, CameraType, ComponentType, Interpolation, Semantic, TargetPath},
};
use rstest::rstest;

fn load(text: &str) -> Gltf {
    load_from_slice(text.as_bytes(), ReaderOptions::default()).unwrap()
}

fn pretty(indent: u8) -> WriterOptions {
    WriterOptions {
        pretty_print: true,
        indent,
    }
}

#[rstest]
#[case(TRIANGLE, WriterOptions::default())]
#[case(TRIANGLE, pretty(2))]
#[case(TEXTURED_BOX, WriterOptions::default())]
#[case(TEXTURED_BOX, pretty(4))]
fn text_round_trip_preserves_every_record(#[case] text: &str, #[case] options: WriterOptions) {
    let original = load(text);
    let saved = save_to_vec(&original, FileKind::Gltf, options).unwrap();
    let reloaded = load_from_slice(&saved, ReaderOptions::default()).unwrap();
    assert_eq!(reloaded, original);

    // Writing is deterministic.
    let again = save_to_vec(&reloaded, FileKind::Gltf, options).unwrap();
    assert_eq!(again, saved);
}

#[test]
fn written_text_is_valid_json() {
    let gltf = load(TEXTURED_BOX);
    let text = GltfWriter::new(pretty(2)).to_json(&gltf);
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        [
            "extensionsUsed",
            "accessors",
            "animations",
            "asset",
            "buffers",
            "bufferViews",
            "cameras",
            "images",
            "materials",
            "meshes",
            "nodes",
            "samplers",
            "scene",
            "scenes",
            "skins",
            "textures",
        ]
    );
    assert_eq!(value["materials"][0]["alphaMode"], "MASK");
    assert!(value["materials"][0].get("extensions").is_none());
}

#[test]
fn textured_box_maps_typed_records() {
    let gltf = load(TEXTURED_BOX);
    assert_eq!(gltf.asset.version, "2.0");
    assert_eq!(gltf.extensions_used, ["KHR_materials_unlit"]);
    assert_eq!(gltf.scene, Some(0));

    let primitive = &gltf.meshes[0].primitives[0];
    assert_eq!(primitive.attributes.len(), 5);
    assert_eq!(primitive.attribute(Semantic::TexCoord(0)), Some(2));
    assert_eq!(primitive.attribute(Semantic::Joints(0)), Some(3));
    assert_eq!(primitive.material, Some(0));

    let material = &gltf.materials[0];
    assert_eq!(material.alpha_mode, AlphaMode::Mask);
    assert!((material.alpha_cutoff - 0.25).abs() < f32::EPSILON);
    assert!(material.double_sided);
    let pbr = material.pbr_metallic_roughness.as_ref().unwrap();
    assert_eq!(pbr.base_color_texture.and_then(|t| t.index), Some(0));

    assert_eq!(gltf.cameras[0].kind, Some(CameraType::Perspective));
    assert_eq!(gltf.accessors[3].component_type, Some(ComponentType::UnsignedByte));
    assert_eq!(
        gltf.animations[0].samplers[0].interpolation,
        Interpolation::Step
    );
    assert_eq!(
        gltf.animations[0].channels[0].target.path,
        Some(TargetPath::Rotation)
    );
    assert_eq!(gltf.nodes[1].rotation, Some([0.0, 0.0, 0.707_106_8, 0.707_106_8]));
    assert_eq!(gltf.nodes[2].translation, None);
}

#[rstest]
#[case(TRIANGLE)]
#[case(TEXTURED_BOX)]
fn samples_meet_requirements(#[case] text: &str) {
    assert_eq!(load(text).check_requirements(), Ok(()));
}

#[test]
fn missing_required_field_is_named() {
    let mut gltf = load(TRIANGLE);
    gltf.accessors[1].count = None;
    assert_eq!(
        gltf.check_requirements(),
        Err(RequirementError {
            record: "accessors",
            index: 1,
            field: "count",
        })
    );
}

#[test]
fn sorted_nodes_put_parents_first() {
    let gltf = load(TEXTURED_BOX);
    let order = gltf.sorted_nodes();
    let old: Vec<u32> = order.iter().map(|o| o.old_index).collect();
    assert_eq!(old, [0, 3, 1, 2]);
    assert_eq!(order[0].parent, None);
    assert_eq!(order[0].child_count, 2);
    assert_eq!(order[0].children_start, 2);
    assert_eq!(order[2].parent, Some(0));
    assert_eq!(order[3].parent, Some(0));
}

#[test]
fn array_root_is_rejected() {
    let err = load_from_slice(b"[{}]", ReaderOptions::default()).unwrap_err();
    assert!(matches!(err, Error::RootNotObject));
}

#[test]
fn whitespace_is_an_empty_document() {
    let err = load_from_slice(b" \n ", ReaderOptions::default()).unwrap_err();
    assert!(matches!(err, Error::EmptyDocument));
}

#[cfg(feature = "serde")]
#[test]
fn records_serialize_with_serde() {
    let gltf = load(TEXTURED_BOX);
    let value = serde_json::to_value(&gltf).unwrap();
    assert_eq!(value["nodes"][0]["name"], "root");
    assert_eq!(value["materials"][0]["alpha_mode"], "Mask");
    assert!(value.get("bin").is_none());
}

#[cfg(feature = "std")]
mod files {
    use std::{fs, path::PathBuf};

    use gltflite::{
        Error, FileKind, ReaderOptions, WriterOptions, load_from_file, save_to_file,
    };

    use super::common::{TRIANGLE, triangle_bin};

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gltflite-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn external_buffers_load_next_to_the_document() {
        let dir = scratch("external");
        let text = TRIANGLE.replace(
            r#""byteLength": 44 }"#,
            r#""byteLength": 44, "uri": "triangle.bin" }"#,
        );
        fs::write(dir.join("triangle.gltf"), text).unwrap();
        fs::write(dir.join("triangle.bin"), triangle_bin()).unwrap();

        let gltf = load_from_file(dir.join("triangle.gltf"), ReaderOptions::default()).unwrap();
        assert_eq!(gltf.buffers[0].uri.as_deref(), Some("triangle.bin"));
        assert_eq!(gltf.buffer_data(0), Some(&triangle_bin()[..]));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn percent_encoded_uris_are_decoded() {
        let dir = scratch("encoded");
        let text = TRIANGLE.replace(
            r#""byteLength": 44 }"#,
            r#""byteLength": 44, "uri": "tri%20angle.bin" }"#,
        );
        fs::write(dir.join("encoded.gltf"), text).unwrap();
        fs::write(dir.join("tri angle.bin"), triangle_bin()).unwrap();

        let gltf = load_from_file(dir.join("encoded.gltf"), ReaderOptions::default()).unwrap();
        assert_eq!(gltf.buffer_data(0), Some(&triangle_bin()[..]));
        fs::remove_dir_all(dir).unwrap();
    }

    #[rstest::rstest]
    #[case("../outside.bin")]
    #[case("sub/../../outside.bin")]
    #[case("%2e%2e/outside.bin")]
    #[case("/outside.bin")]
    #[case("file:///outside.bin")]
    fn uris_outside_the_directory_are_rejected(#[case] uri: &str) {
        let root = scratch(&format!("escape-{}", uri.len()));
        let dir = root.join("doc");
        fs::create_dir_all(&dir).unwrap();
        fs::write(root.join("outside.bin"), triangle_bin()).unwrap();
        let text = TRIANGLE.replace(
            r#""byteLength": 44 }"#,
            &format!(r#""byteLength": 44, "uri": "{uri}" }}"#),
        );
        fs::write(dir.join("escape.gltf"), text).unwrap();

        let err = load_from_file(dir.join("escape.gltf"), ReaderOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UriOutsideDirectory(_)), "{err:?}");
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn data_uris_stay_unbound() {
        let dir = scratch("data");
        let text = TRIANGLE.replace(
            r#""byteLength": 44 }"#,
            r#""byteLength": 44, "uri": "data:application/octet-stream;base64,AAAA" }"#,
        );
        fs::write(dir.join("data.gltf"), text).unwrap();

        let gltf = load_from_file(dir.join("data.gltf"), ReaderOptions::default()).unwrap();
        assert_eq!(gltf.buffer_data(0), None);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn short_external_buffer_fails() {
        let dir = scratch("short");
        let text = TRIANGLE.replace(
            r#""byteLength": 44 }"#,
            r#""byteLength": 44, "uri": "short.bin" }"#,
        );
        fs::write(dir.join("short.gltf"), text).unwrap();
        fs::write(dir.join("short.bin"), [0u8; 10]).unwrap();

        assert!(load_from_file(dir.join("short.gltf"), ReaderOptions::default()).is_err());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn saved_files_reload() {
        let dir = scratch("save");
        let mut gltf = super::load(TRIANGLE);
        gltf.bind_glb_buffers(triangle_bin()).unwrap();

        for (name, kind) in [("out.gltf", FileKind::Gltf), ("out.glb", FileKind::Glb)] {
            let path = dir.join(name);
            save_to_file(&gltf, &path, kind, WriterOptions::default()).unwrap();
            let reloaded = load_from_file(&path, ReaderOptions::default()).unwrap();
            assert_eq!(reloaded.nodes, gltf.nodes);
            assert_eq!(reloaded.accessors, gltf.accessors);
            assert_eq!(reloaded.buffer_data(0).is_some(), kind == FileKind::Glb);
        }
        fs::remove_dir_all(dir).unwrap();
    }
}

//! Post-mapping check that required properties are present.

use super::{
    Accessor, Animation, Buffer, BufferView, Camera, CameraType, Gltf, Material, Mesh, Skin,
};
use crate::error::RequirementError;

type Check = Result<(), &'static str>;

fn present<T>(value: Option<T>, field: &'static str) -> Check {
    value.map(|_| ()).ok_or(field)
}

fn nonempty<T>(items: &[T], field: &'static str) -> Check {
    if items.is_empty() { Err(field) } else { Ok(()) }
}

fn positive(value: Option<f32>, field: &'static str) -> Check {
    match value {
        Some(v) if v > 0.0 => Ok(()),
        _ => Err(field),
    }
}

fn far_beyond_near(zfar: Option<f32>, znear: Option<f32>) -> Check {
    match (zfar, znear) {
        (Some(far), Some(near)) if far > near => Ok(()),
        (_, None) => Err("znear"),
        _ => Err("zfar"),
    }
}

fn accessor(a: &Accessor) -> Check {
    present(a.component_type, "componentType")?;
    present(a.count, "count")?;
    present(a.kind, "type")?;
    if let Some(sparse) = &a.sparse {
        present(sparse.count, "sparse.count")?;
        let indices = sparse.indices.as_ref().ok_or("sparse.indices")?;
        present(indices.buffer_view, "sparse.indices.bufferView")?;
        present(indices.component_type, "sparse.indices.componentType")?;
        let values = sparse.values.as_ref().ok_or("sparse.values")?;
        present(values.buffer_view, "sparse.values.bufferView")?;
    }
    Ok(())
}

fn animation(a: &Animation) -> Check {
    nonempty(&a.channels, "channels")?;
    nonempty(&a.samplers, "samplers")?;
    for channel in &a.channels {
        present(channel.sampler, "channels.sampler")?;
        present(channel.target.path, "channels.target.path")?;
    }
    for sampler in &a.samplers {
        present(sampler.input, "samplers.input")?;
        present(sampler.output, "samplers.output")?;
    }
    Ok(())
}

fn buffer(b: &Buffer) -> Check {
    present(b.byte_length, "byteLength")
}

fn buffer_view(v: &BufferView) -> Check {
    present(v.buffer, "buffer")?;
    present(v.byte_length, "byteLength")
}

fn camera(c: &Camera) -> Check {
    match c.kind.ok_or("type")? {
        CameraType::Orthographic => {
            let o = c.orthographic.ok_or("orthographic")?;
            positive(o.xmag, "orthographic.xmag")?;
            positive(o.ymag, "orthographic.ymag")?;
            far_beyond_near(o.zfar, o.znear).map_err(|f| match f {
                "znear" => "orthographic.znear",
                _ => "orthographic.zfar",
            })
        }
        CameraType::Perspective => {
            let p = c.perspective.ok_or("perspective")?;
            positive(p.aspect_ratio, "perspective.aspectRatio")?;
            positive(p.yfov, "perspective.yfov")?;
            present(p.znear, "perspective.znear")?;
            // zfar may be absent for an infinite projection.
            match (p.zfar, p.znear) {
                (Some(far), Some(near)) if far <= near => Err("perspective.zfar"),
                _ => Ok(()),
            }
        }
    }
}

fn material(m: &Material) -> Check {
    if let Some(pbr) = &m.pbr_metallic_roughness {
        if let Some(t) = pbr.base_color_texture {
            present(t.index, "pbrMetallicRoughness.baseColorTexture.index")?;
        }
        if let Some(t) = pbr.metallic_roughness_texture {
            present(t.index, "pbrMetallicRoughness.metallicRoughnessTexture.index")?;
        }
    }
    if let Some(t) = m.normal_texture {
        present(t.index, "normalTexture.index")?;
    }
    if let Some(t) = m.occlusion_texture {
        present(t.index, "occlusionTexture.index")?;
    }
    if let Some(t) = m.emissive_texture {
        present(t.index, "emissiveTexture.index")?;
    }
    Ok(())
}

fn mesh(m: &Mesh) -> Check {
    nonempty(&m.primitives, "primitives")?;
    for p in &m.primitives {
        nonempty(&p.attributes, "primitives.attributes")?;
    }
    Ok(())
}

fn skin(s: &Skin) -> Check {
    nonempty(&s.joints, "joints")
}

fn each<T>(record: &'static str, items: &[T], check: fn(&T) -> Check) -> Result<(), RequirementError> {
    for (index, item) in items.iter().enumerate() {
        check(item).map_err(|field| RequirementError {
            record,
            index,
            field,
        })?;
    }
    Ok(())
}

impl Gltf {
    /// Verifies that every record carries the properties the format requires.
    ///
    /// Reports the first record that fails. Cross-references between records
    /// are not resolved.
    ///
    /// # Errors
    ///
    /// A [`RequirementError`] naming the collection, the index within it and
    /// the missing or invalid property.
    pub fn check_requirements(&self) -> Result<(), RequirementError> {
        each("accessors", &self.accessors, accessor)?;
        each("animations", &self.animations, animation)?;
        each("buffers", &self.buffers, buffer)?;
        each("bufferViews", &self.buffer_views, buffer_view)?;
        each("cameras", &self.cameras, camera)?;
        each("materials", &self.materials, material)?;
        each("meshes", &self.meshes, mesh)?;
        each("skins", &self.skins, skin)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::schema::{
        AccessorType, Attribute, ComponentType, Perspective, Primitive, Semantic, Sparse,
    };

    fn accessor() -> Accessor {
        Accessor {
            component_type: Some(ComponentType::Float),
            count: Some(3),
            kind: Some(AccessorType::Vec3),
            ..Accessor::default()
        }
    }

    #[test]
    fn empty_document_passes() {
        assert_eq!(Gltf::default().check_requirements(), Ok(()));
    }

    #[test]
    fn reports_record_index_and_field() {
        let mut gltf = Gltf::default();
        gltf.accessors = vec![accessor(), Accessor {
            count: None,
            ..accessor()
        }];
        let err = gltf.check_requirements().unwrap_err();
        assert_eq!(err.record, "accessors");
        assert_eq!(err.index, 1);
        assert_eq!(err.field, "count");
    }

    #[test]
    fn sparse_needs_its_buffer_views() {
        let mut gltf = Gltf::default();
        gltf.accessors = vec![Accessor {
            sparse: Some(Sparse {
                count: Some(1),
                ..Sparse::default()
            }),
            ..accessor()
        }];
        assert_eq!(gltf.check_requirements().unwrap_err().field, "sparse.indices");
    }

    #[test]
    fn perspective_may_omit_zfar() {
        let mut gltf = Gltf::default();
        let mut camera = Camera {
            kind: Some(CameraType::Perspective),
            perspective: Some(Perspective {
                aspect_ratio: Some(1.0),
                yfov: Some(0.8),
                zfar: None,
                znear: Some(0.1),
            }),
            ..Camera::default()
        };
        gltf.cameras = vec![camera.clone()];
        assert_eq!(gltf.check_requirements(), Ok(()));

        camera.perspective = camera.perspective.map(|p| Perspective {
            zfar: Some(0.05),
            ..p
        });
        gltf.cameras = vec![camera];
        assert_eq!(gltf.check_requirements().unwrap_err().field, "perspective.zfar");
    }

    #[test]
    fn camera_without_type_fails() {
        let mut gltf = Gltf::default();
        gltf.cameras = vec![Camera::default()];
        assert_eq!(gltf.check_requirements().unwrap_err().field, "type");
    }

    #[test]
    fn mesh_primitives_need_attributes() {
        let mut gltf = Gltf::default();
        gltf.meshes = vec![Mesh {
            primitives: vec![Primitive::default()],
            ..Mesh::default()
        }];
        assert_eq!(
            gltf.check_requirements().unwrap_err().field,
            "primitives.attributes"
        );

        gltf.meshes[0].primitives[0].attributes.push(Attribute {
            semantic: Semantic::Position,
            accessor: 0,
        });
        assert_eq!(gltf.check_requirements(), Ok(()));
    }
}

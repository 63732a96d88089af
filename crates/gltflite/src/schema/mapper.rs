//! Walks a built [`Document`] and fills the typed records.
//!
//! Dispatch is on interned key codes. Members whose key is unknown, or whose
//! value has the wrong JSON kind, are skipped; enumeration strings that are
//! not part of the format are logged and left unset.

use alloc::{string::String, vec::Vec};

use bstr::ByteSlice;
use log::{debug, warn};

use super::{Gltf, model::*};
use crate::{
    builder::{AnyValue, Document},
    keys::Key,
};

/// Maps one document. Cheap to construct; holds only a borrow.
#[derive(Debug, Clone, Copy)]
pub struct Mapper<'d> {
    doc: &'d Document,
}

impl<'d> Mapper<'d> {
    /// Creates a mapper over `doc`.
    #[must_use]
    pub fn new(doc: &'d Document) -> Self {
        Self { doc }
    }

    /// Maps the document root, or returns `None` if nothing was read or the
    /// root is not an object.
    #[must_use]
    pub fn map(&self) -> Option<Gltf> {
        match self.doc.root()? {
            root @ AnyValue::Object(_) => Some(self.gltf(root)),
            _ => None,
        }
    }

    /// Members of `object` with a known key.
    fn members(&self, object: AnyValue) -> impl Iterator<Item = (Key, AnyValue)> + 'd {
        self.doc
            .members(object)
            .iter()
            .filter_map(|m| Some((m.known_key()?, m.value)))
    }

    fn list<T>(&self, array: AnyValue, mut f: impl FnMut(&Self, AnyValue) -> T) -> Vec<T> {
        self.doc.elements(array).map(|v| f(self, v)).collect()
    }

    fn string(&self, value: AnyValue) -> Option<String> {
        match value {
            AnyValue::String(s) => Some(self.doc.string(s).to_str_lossy().into_owned()),
            _ => None,
        }
    }

    fn strings(&self, array: AnyValue) -> Vec<String> {
        self.doc
            .elements(array)
            .filter_map(|v| self.string(v))
            .collect()
    }

    fn floats(&self, array: AnyValue) -> Vec<f32> {
        self.doc.elements(array).filter_map(f32v).collect()
    }

    fn doubles(&self, array: AnyValue) -> Vec<f64> {
        self.doc
            .elements(array)
            .take(16)
            .filter_map(|v| v.as_f64())
            .collect()
    }

    fn indices(&self, array: AnyValue) -> Vec<Index> {
        self.doc.elements(array).filter_map(index).collect()
    }

    /// Fixed-size float array. Missing trailing components keep `fill`.
    fn fixed<const N: usize>(&self, array: AnyValue, fill: [f32; N]) -> [f32; N] {
        let mut out = fill;
        for (dst, v) in out.iter_mut().zip(self.doc.elements(array)) {
            if let Some(f) = f32v(v) {
                *dst = f;
            }
        }
        out
    }

    /// An enumeration string, logged and dropped when unrecognized.
    fn named<T>(&self, value: AnyValue, what: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
        let text = self.doc.as_str(value)?;
        let parsed = parse(text);
        if parsed.is_none() {
            warn!("unknown {what} {text:?}");
        }
        parsed
    }

    // --------------------------------------------------------------------------------------------
    // Top level
    // --------------------------------------------------------------------------------------------

    fn gltf(&self, root: AnyValue) -> Gltf {
        let mut out = Gltf::default();
        for (key, v) in self.members(root) {
            match key {
                Key::ExtensionsUsed => out.extensions_used = self.strings(v),
                Key::ExtensionsRequired => out.extensions_required = self.strings(v),
                Key::Accessors => out.accessors = self.list(v, Self::accessor),
                Key::Animations => out.animations = self.list(v, Self::animation),
                Key::Asset => out.asset = self.asset(v),
                Key::Buffers => out.buffers = self.list(v, Self::buffer),
                Key::BufferViews => out.buffer_views = self.list(v, Self::buffer_view),
                Key::Cameras => out.cameras = self.list(v, Self::camera),
                Key::Images => out.images = self.list(v, Self::image),
                Key::Materials => out.materials = self.list(v, Self::material),
                Key::Meshes => out.meshes = self.list(v, Self::mesh),
                Key::Nodes => out.nodes = self.list(v, Self::node),
                Key::Samplers => out.samplers = self.list(v, Self::sampler),
                Key::Scene => out.scene = index(v),
                Key::Scenes => out.scenes = self.list(v, Self::scene),
                Key::Skins => out.skins = self.list(v, Self::skin),
                Key::Textures => out.textures = self.list(v, Self::texture),
                _ => {}
            }
        }
        debug!(
            "mapped document: {} nodes, {} meshes, {} accessors, {} buffers",
            out.nodes.len(),
            out.meshes.len(),
            out.accessors.len(),
            out.buffers.len()
        );
        out
    }

    // --------------------------------------------------------------------------------------------
    // Records
    // --------------------------------------------------------------------------------------------

    fn accessor(&self, object: AnyValue) -> Accessor {
        let mut out = Accessor::default();
        for (key, v) in self.members(object) {
            match key {
                Key::BufferView => out.buffer_view = index(v),
                Key::ByteOffset => out.byte_offset = u64v(v).unwrap_or(0),
                Key::ComponentType => out.component_type = self.component_type(v),
                Key::Normalized => out.normalized = v.as_bool().unwrap_or(false),
                Key::Count => out.count = u64v(v),
                Key::Type => out.kind = self.named(v, "accessor type", AccessorType::from_name),
                Key::Max => out.max = self.doubles(v),
                Key::Min => out.min = self.doubles(v),
                Key::Sparse => out.sparse = Some(self.sparse(v)),
                Key::Name => out.name = self.string(v).unwrap_or_default(),
                _ => {}
            }
        }
        out
    }

    fn component_type(&self, value: AnyValue) -> Option<ComponentType> {
        let code = value.as_i64()?;
        let parsed = ComponentType::from_gl(code);
        if parsed.is_none() {
            warn!("unknown component type {code}");
        }
        parsed
    }

    fn sparse(&self, object: AnyValue) -> Sparse {
        let mut out = Sparse::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Count => out.count = u64v(v),
                Key::Indices => {
                    let mut indices = SparseIndices::default();
                    for (key, v) in self.members(v) {
                        match key {
                            Key::BufferView => indices.buffer_view = index(v),
                            Key::ByteOffset => indices.byte_offset = u64v(v).unwrap_or(0),
                            Key::ComponentType => indices.component_type = self.component_type(v),
                            _ => {}
                        }
                    }
                    out.indices = Some(indices);
                }
                Key::Values => {
                    let mut values = SparseValues::default();
                    for (key, v) in self.members(v) {
                        match key {
                            Key::BufferView => values.buffer_view = index(v),
                            Key::ByteOffset => values.byte_offset = u64v(v).unwrap_or(0),
                            _ => {}
                        }
                    }
                    out.values = Some(values);
                }
                _ => {}
            }
        }
        out
    }

    fn animation(&self, object: AnyValue) -> Animation {
        let mut out = Animation::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Channels => out.channels = self.list(v, Self::channel),
                Key::Samplers => out.samplers = self.list(v, Self::animation_sampler),
                Key::Name => out.name = self.string(v).unwrap_or_default(),
                _ => {}
            }
        }
        out
    }

    fn channel(&self, object: AnyValue) -> Channel {
        let mut out = Channel::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Sampler => out.sampler = index(v),
                Key::Target => {
                    for (key, v) in self.members(v) {
                        match key {
                            Key::Node => out.target.node = index(v),
                            Key::Path => {
                                out.target.path = self.named(v, "target path", TargetPath::from_name);
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn animation_sampler(&self, object: AnyValue) -> AnimationSampler {
        let mut out = AnimationSampler::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Input => out.input = index(v),
                Key::Output => out.output = index(v),
                Key::Interpolation => {
                    out.interpolation = self
                        .named(v, "interpolation", Interpolation::from_name)
                        .unwrap_or_default();
                }
                _ => {}
            }
        }
        out
    }

    fn asset(&self, object: AnyValue) -> Asset {
        let mut out = Asset::default();
        for (key, v) in self.members(object) {
            let Some(text) = self.string(v) else { continue };
            match key {
                Key::Copyright => out.copyright = text,
                Key::Generator => out.generator = text,
                Key::Version => out.version = text,
                Key::MinVersion => out.min_version = text,
                _ => {}
            }
        }
        out
    }

    fn buffer(&self, object: AnyValue) -> Buffer {
        let mut out = Buffer::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Uri => out.uri = self.string(v),
                Key::ByteLength => out.byte_length = u64v(v),
                Key::Name => out.name = self.string(v).unwrap_or_default(),
                _ => {}
            }
        }
        out
    }

    fn buffer_view(&self, object: AnyValue) -> BufferView {
        let mut out = BufferView::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Buffer => out.buffer = index(v),
                Key::ByteOffset => out.byte_offset = u64v(v).unwrap_or(0),
                Key::ByteLength => out.byte_length = u64v(v),
                Key::ByteStride => out.byte_stride = index(v),
                Key::Target => out.target = index(v),
                Key::Name => out.name = self.string(v).unwrap_or_default(),
                _ => {}
            }
        }
        out
    }

    fn camera(&self, object: AnyValue) -> Camera {
        let mut out = Camera::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Type => out.kind = self.named(v, "camera type", CameraType::from_name),
                Key::Orthographic => {
                    let mut ortho = Orthographic::default();
                    for (key, v) in self.members(v) {
                        match key {
                            Key::XMag => ortho.xmag = f32v(v),
                            Key::YMag => ortho.ymag = f32v(v),
                            Key::ZFar => ortho.zfar = f32v(v),
                            Key::ZNear => ortho.znear = f32v(v),
                            _ => {}
                        }
                    }
                    out.orthographic = Some(ortho);
                }
                Key::Perspective => {
                    let mut persp = Perspective::default();
                    for (key, v) in self.members(v) {
                        match key {
                            Key::AspectRatio => persp.aspect_ratio = f32v(v),
                            Key::YFov => persp.yfov = f32v(v),
                            Key::ZFar => persp.zfar = f32v(v),
                            Key::ZNear => persp.znear = f32v(v),
                            _ => {}
                        }
                    }
                    out.perspective = Some(persp);
                }
                Key::Name => out.name = self.string(v).unwrap_or_default(),
                _ => {}
            }
        }
        out
    }

    fn image(&self, object: AnyValue) -> Image {
        let mut out = Image::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Uri => out.uri = self.string(v),
                Key::MimeType => out.mime_type = self.string(v),
                Key::BufferView => out.buffer_view = index(v),
                Key::Name => out.name = self.string(v).unwrap_or_default(),
                _ => {}
            }
        }
        out
    }

    fn texture_info(&self, object: AnyValue) -> TextureInfo {
        let mut out = TextureInfo::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Index => out.index = index(v),
                Key::TexCoord => out.tex_coord = index(v).unwrap_or(0),
                _ => {}
            }
        }
        out
    }

    fn material(&self, object: AnyValue) -> Material {
        let mut out = Material::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Name => out.name = self.string(v).unwrap_or_default(),
                Key::PbrMetallicRoughness => out.pbr_metallic_roughness = Some(self.pbr(v)),
                Key::NormalTexture => {
                    let mut info = NormalTextureInfo::default();
                    for (key, v) in self.members(v) {
                        match key {
                            Key::Index => info.index = index(v),
                            Key::TexCoord => info.tex_coord = index(v).unwrap_or(0),
                            Key::Scale => info.scale = f32v(v).unwrap_or(1.0),
                            _ => {}
                        }
                    }
                    out.normal_texture = Some(info);
                }
                Key::OcclusionTexture => {
                    let mut info = OcclusionTextureInfo::default();
                    for (key, v) in self.members(v) {
                        match key {
                            Key::Index => info.index = index(v),
                            Key::TexCoord => info.tex_coord = index(v).unwrap_or(0),
                            Key::Strength => info.strength = f32v(v).unwrap_or(1.0),
                            _ => {}
                        }
                    }
                    out.occlusion_texture = Some(info);
                }
                Key::EmissiveTexture => out.emissive_texture = Some(self.texture_info(v)),
                Key::EmissiveFactor => out.emissive_factor = self.fixed(v, [0.0; 3]),
                Key::AlphaMode => {
                    out.alpha_mode = self
                        .named(v, "alpha mode", AlphaMode::from_name)
                        .unwrap_or_default();
                }
                Key::AlphaCutoff => out.alpha_cutoff = f32v(v).unwrap_or(0.5),
                Key::DoubleSided => out.double_sided = v.as_bool().unwrap_or(false),
                _ => {}
            }
        }
        out
    }

    fn pbr(&self, object: AnyValue) -> PbrMetallicRoughness {
        let mut out = PbrMetallicRoughness::default();
        for (key, v) in self.members(object) {
            match key {
                Key::BaseColorFactor => out.base_color_factor = self.fixed(v, [1.0; 4]),
                Key::BaseColorTexture => out.base_color_texture = Some(self.texture_info(v)),
                Key::MetallicFactor => out.metallic_factor = f32v(v).unwrap_or(1.0),
                Key::RoughnessFactor => out.roughness_factor = f32v(v).unwrap_or(1.0),
                Key::MetallicRoughnessTexture => {
                    out.metallic_roughness_texture = Some(self.texture_info(v));
                }
                _ => {}
            }
        }
        out
    }

    fn mesh(&self, object: AnyValue) -> Mesh {
        let mut out = Mesh::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Primitives => out.primitives = self.list(v, Self::primitive),
                Key::Weights => out.weights = self.floats(v),
                Key::Name => out.name = self.string(v).unwrap_or_default(),
                _ => {}
            }
        }
        out
    }

    fn primitive(&self, object: AnyValue) -> Primitive {
        let mut out = Primitive::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Attributes => out.attributes = self.attributes(v),
                Key::Indices => out.indices = index(v),
                Key::Material => out.material = index(v),
                Key::Mode => out.mode = index(v).unwrap_or(MODE_TRIANGLES),
                Key::Targets => out.targets = self.list(v, Self::attributes),
                _ => {}
            }
        }
        out
    }

    fn attributes(&self, object: AnyValue) -> Vec<Attribute> {
        let mut out = Vec::new();
        for member in self.doc.members(object) {
            let semantic = member.known_key().and_then(semantic);
            match (semantic, index(member.value)) {
                (Some(semantic), Some(accessor)) => out.push(Attribute { semantic, accessor }),
                (None, _) => debug!("skipping attribute with unsupported semantic"),
                (_, None) => warn!("attribute without a valid accessor index"),
            }
        }
        out
    }

    fn node(&self, object: AnyValue) -> Node {
        let mut out = Node::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Camera => out.camera = index(v),
                Key::Children => out.children = self.indices(v),
                Key::Skin => out.skin = index(v),
                Key::Matrix => out.matrix = Some(self.fixed(v, IDENTITY_MATRIX)),
                Key::Mesh => out.mesh = index(v),
                Key::Rotation => out.rotation = Some(self.fixed(v, [0.0, 0.0, 0.0, 1.0])),
                Key::Scale => out.scale = Some(self.fixed(v, [1.0; 3])),
                Key::Translation => out.translation = Some(self.fixed(v, [0.0; 3])),
                Key::Weights => out.weights = self.floats(v),
                Key::Name => out.name = self.string(v).unwrap_or_default(),
                _ => {}
            }
        }
        out
    }

    fn sampler(&self, object: AnyValue) -> Sampler {
        let mut out = Sampler::default();
        for (key, v) in self.members(object) {
            match key {
                Key::MagFilter => out.mag_filter = index(v).unwrap_or(FILTER_LINEAR),
                Key::MinFilter => out.min_filter = index(v).unwrap_or(FILTER_LINEAR),
                Key::WrapS => out.wrap_s = index(v).unwrap_or(WRAP_REPEAT),
                Key::WrapT => out.wrap_t = index(v).unwrap_or(WRAP_REPEAT),
                Key::Name => out.name = self.string(v).unwrap_or_default(),
                _ => {}
            }
        }
        out
    }

    fn scene(&self, object: AnyValue) -> Scene {
        let mut out = Scene::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Nodes => out.nodes = self.indices(v),
                Key::Name => out.name = self.string(v).unwrap_or_default(),
                _ => {}
            }
        }
        out
    }

    fn skin(&self, object: AnyValue) -> Skin {
        let mut out = Skin::default();
        for (key, v) in self.members(object) {
            match key {
                Key::InverseBindMatrices => out.inverse_bind_matrices = index(v),
                Key::Skeleton => out.skeleton = index(v),
                Key::Joints => out.joints = self.indices(v),
                Key::Name => out.name = self.string(v).unwrap_or_default(),
                _ => {}
            }
        }
        out
    }

    fn texture(&self, object: AnyValue) -> Texture {
        let mut out = Texture::default();
        for (key, v) in self.members(object) {
            match key {
                Key::Sampler => out.sampler = index(v),
                Key::Source => out.source = index(v),
                Key::Name => out.name = self.string(v).unwrap_or_default(),
                _ => {}
            }
        }
        out
    }
}

// ------------------------------------------------------------------------------------------------
// Scalars
// ------------------------------------------------------------------------------------------------

fn index(value: AnyValue) -> Option<Index> {
    value.as_i64().and_then(|i| Index::try_from(i).ok())
}

fn u64v(value: AnyValue) -> Option<u64> {
    value.as_i64().and_then(|i| u64::try_from(i).ok())
}

#[allow(clippy::cast_possible_truncation)]
fn f32v(value: AnyValue) -> Option<f32> {
    value.as_f64().map(|f| f as f32)
}

fn semantic(key: Key) -> Option<Semantic> {
    Some(match key {
        Key::Position => Semantic::Position,
        Key::Normal => Semantic::Normal,
        Key::Tangent => Semantic::Tangent,
        Key::TexCoord0 => Semantic::TexCoord(0),
        Key::TexCoord1 => Semantic::TexCoord(1),
        Key::TexCoord2 => Semantic::TexCoord(2),
        Key::TexCoord3 => Semantic::TexCoord(3),
        Key::Color0 => Semantic::Color(0),
        Key::Color1 => Semantic::Color(1),
        Key::Color2 => Semantic::Color(2),
        Key::Color3 => Semantic::Color(3),
        Key::Joints0 => Semantic::Joints(0),
        Key::Joints1 => Semantic::Joints(1),
        Key::Joints2 => Semantic::Joints(2),
        Key::Joints3 => Semantic::Joints(3),
        Key::Weights0 => Semantic::Weights(0),
        Key::Weights1 => Semantic::Weights(1),
        Key::Weights2 => Semantic::Weights(2),
        Key::Weights3 => Semantic::Weights(3),
        _ => return None,
    })
}

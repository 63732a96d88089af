//! Typed records of a glTF 2.0 document.
//!
//! Required properties are `Option`s so that a mapped document can be
//! checked afterwards by [`Gltf::check_requirements`](super::Gltf::check_requirements);
//! optional properties with a default hold the default when absent.

#![allow(missing_docs)]

use alloc::{format, string::String, vec::Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Index into one of the document's top-level arrays.
pub type Index = u32;

// ------------------------------------------------------------------------------------------------
// Enumerations
// ------------------------------------------------------------------------------------------------

/// Scalar type of accessor components, by GL enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    UnsignedInt,
    Float,
}

impl ComponentType {
    #[must_use]
    pub fn from_gl(code: i64) -> Option<Self> {
        Some(match code {
            5120 => Self::Byte,
            5121 => Self::UnsignedByte,
            5122 => Self::Short,
            5123 => Self::UnsignedShort,
            5125 => Self::UnsignedInt,
            5126 => Self::Float,
            _ => return None,
        })
    }

    #[must_use]
    pub fn gl(self) -> u32 {
        match self {
            Self::Byte => 5120,
            Self::UnsignedByte => 5121,
            Self::Short => 5122,
            Self::UnsignedShort => 5123,
            Self::UnsignedInt => 5125,
            Self::Float => 5126,
        }
    }

    /// Size of one component in bytes.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::UnsignedInt | Self::Float => 4,
        }
    }

    /// Whether values of this type are written as integers.
    #[must_use]
    pub fn is_integer(self) -> bool {
        self != Self::Float
    }
}

/// Shape of one accessor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AccessorType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "SCALAR" => Self::Scalar,
            "VEC2" => Self::Vec2,
            "VEC3" => Self::Vec3,
            "VEC4" => Self::Vec4,
            "MAT2" => Self::Mat2,
            "MAT3" => Self::Mat3,
            "MAT4" => Self::Mat4,
            _ => return None,
        })
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }

    /// Components per element; also the length of `min` and `max`.
    #[must_use]
    pub fn component_count(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    CatmullRomSpline,
    CubicSpline,
}

impl Interpolation {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "LINEAR" => Self::Linear,
            "STEP" => Self::Step,
            "CATMULLROMSPLINE" => Self::CatmullRomSpline,
            "CUBICSPLINE" => Self::CubicSpline,
            _ => return None,
        })
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "LINEAR",
            Self::Step => "STEP",
            Self::CatmullRomSpline => "CATMULLROMSPLINE",
            Self::CubicSpline => "CUBICSPLINE",
        }
    }
}

/// Node property driven by an animation channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl TargetPath {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "translation" => Self::Translation,
            "rotation" => Self::Rotation,
            "scale" => Self::Scale,
            "weights" => Self::Weights,
            _ => return None,
        })
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Translation => "translation",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
            Self::Weights => "weights",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "OPAQUE" => Self::Opaque,
            "MASK" => Self::Mask,
            "BLEND" => Self::Blend,
            _ => return None,
        })
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Opaque => "OPAQUE",
            Self::Mask => "MASK",
            Self::Blend => "BLEND",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CameraType {
    Perspective,
    Orthographic,
}

impl CameraType {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "perspective" => Self::Perspective,
            "orthographic" => Self::Orthographic,
            _ => return None,
        })
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Perspective => "perspective",
            Self::Orthographic => "orthographic",
        }
    }
}

/// Vertex attribute semantic, with the set index for numbered semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Semantic {
    Position,
    Normal,
    Tangent,
    TexCoord(u8),
    Color(u8),
    Joints(u8),
    Weights(u8),
}

impl Semantic {
    /// Property name as spelled in a document, for example `TEXCOORD_0`.
    #[must_use]
    pub fn name(self) -> String {
        match self {
            Self::Position => "POSITION".into(),
            Self::Normal => "NORMAL".into(),
            Self::Tangent => "TANGENT".into(),
            Self::TexCoord(i) => format!("TEXCOORD_{i}"),
            Self::Color(i) => format!("COLOR_{i}"),
            Self::Joints(i) => format!("JOINTS_{i}"),
            Self::Weights(i) => format!("WEIGHTS_{i}"),
        }
    }
}

/// Primitive topology mode meaning triangles.
pub const MODE_TRIANGLES: u32 = 4;
/// Sampler filter `LINEAR`.
pub const FILTER_LINEAR: u32 = 9729;
/// Sampler wrap mode `REPEAT`.
pub const WRAP_REPEAT: u32 = 10497;

// ------------------------------------------------------------------------------------------------
// Records
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Accessor {
    pub buffer_view: Option<Index>,
    pub byte_offset: u64,
    pub component_type: Option<ComponentType>,
    pub normalized: bool,
    pub count: Option<u64>,
    pub kind: Option<AccessorType>,
    /// Up to 16 values; integer component types hold whole numbers.
    pub max: Vec<f64>,
    pub min: Vec<f64>,
    pub sparse: Option<Sparse>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sparse {
    pub count: Option<u64>,
    pub indices: Option<SparseIndices>,
    pub values: Option<SparseValues>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SparseIndices {
    pub buffer_view: Option<Index>,
    pub byte_offset: u64,
    pub component_type: Option<ComponentType>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SparseValues {
    pub buffer_view: Option<Index>,
    pub byte_offset: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Animation {
    pub channels: Vec<Channel>,
    pub samplers: Vec<AnimationSampler>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Channel {
    pub sampler: Option<Index>,
    pub target: ChannelTarget,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelTarget {
    pub node: Option<Index>,
    pub path: Option<TargetPath>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnimationSampler {
    pub input: Option<Index>,
    pub interpolation: Interpolation,
    pub output: Option<Index>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Asset {
    pub copyright: String,
    pub generator: String,
    /// Required; empty when absent.
    pub version: String,
    pub min_version: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Buffer {
    pub uri: Option<String>,
    pub byte_length: Option<u64>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BufferView {
    pub buffer: Option<Index>,
    pub byte_offset: u64,
    pub byte_length: Option<u64>,
    pub byte_stride: Option<u32>,
    pub target: Option<u32>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Camera {
    pub kind: Option<CameraType>,
    pub orthographic: Option<Orthographic>,
    pub perspective: Option<Perspective>,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Orthographic {
    pub xmag: Option<f32>,
    pub ymag: Option<f32>,
    pub zfar: Option<f32>,
    pub znear: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Perspective {
    pub aspect_ratio: Option<f32>,
    pub yfov: Option<f32>,
    /// Absent means an infinite projection.
    pub zfar: Option<f32>,
    pub znear: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Image {
    pub uri: Option<String>,
    pub mime_type: Option<String>,
    pub buffer_view: Option<Index>,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextureInfo {
    pub index: Option<Index>,
    pub tex_coord: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NormalTextureInfo {
    pub index: Option<Index>,
    pub tex_coord: u32,
    pub scale: f32,
}

impl Default for NormalTextureInfo {
    fn default() -> Self {
        Self {
            index: None,
            tex_coord: 0,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OcclusionTextureInfo {
    pub index: Option<Index>,
    pub tex_coord: u32,
    pub strength: f32,
}

impl Default for OcclusionTextureInfo {
    fn default() -> Self {
        Self {
            index: None,
            tex_coord: 0,
            strength: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PbrMetallicRoughness {
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness_texture: Option<TextureInfo>,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0; 4],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Material {
    pub name: String,
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
    pub normal_texture: Option<NormalTextureInfo>,
    pub occlusion_texture: Option<OcclusionTextureInfo>,
    pub emissive_texture: Option<TextureInfo>,
    pub emissive_factor: [f32; 3],
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            pbr_metallic_roughness: None,
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: [0.0; 3],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    pub primitives: Vec<Primitive>,
    pub weights: Vec<f32>,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Attribute {
    pub semantic: Semantic,
    pub accessor: Index,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Primitive {
    pub attributes: Vec<Attribute>,
    pub indices: Option<Index>,
    pub material: Option<Index>,
    pub mode: u32,
    /// Morph targets; each holds `POSITION`, `NORMAL` or `TANGENT` displacements.
    pub targets: Vec<Vec<Attribute>>,
}

impl Default for Primitive {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            indices: None,
            material: None,
            mode: MODE_TRIANGLES,
            targets: Vec::new(),
        }
    }
}

impl Primitive {
    /// Accessor bound to `semantic`, if any.
    #[must_use]
    pub fn attribute(&self, semantic: Semantic) -> Option<Index> {
        self.attributes
            .iter()
            .find(|a| a.semantic == semantic)
            .map(|a| a.accessor)
    }
}

/// Identity transform in column-major order.
pub const IDENTITY_MATRIX: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    pub camera: Option<Index>,
    pub children: Vec<Index>,
    pub skin: Option<Index>,
    pub matrix: Option<[f32; 16]>,
    pub mesh: Option<Index>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    pub translation: Option<[f32; 3]>,
    pub weights: Vec<f32>,
    pub name: String,
}

impl Node {
    /// The local matrix, identity when absent.
    #[must_use]
    pub fn matrix_or_identity(&self) -> [f32; 16] {
        self.matrix.unwrap_or(IDENTITY_MATRIX)
    }

    /// The local rotation quaternion, identity when absent.
    #[must_use]
    pub fn rotation_or_identity(&self) -> [f32; 4] {
        self.rotation.unwrap_or([0.0, 0.0, 0.0, 1.0])
    }

    /// The local scale, one when absent.
    #[must_use]
    pub fn scale_or_one(&self) -> [f32; 3] {
        self.scale.unwrap_or([1.0; 3])
    }

    /// The local translation, zero when absent.
    #[must_use]
    pub fn translation_or_zero(&self) -> [f32; 3] {
        self.translation.unwrap_or([0.0; 3])
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sampler {
    pub mag_filter: u32,
    pub min_filter: u32,
    pub wrap_s: u32,
    pub wrap_t: u32,
    pub name: String,
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            mag_filter: FILTER_LINEAR,
            min_filter: FILTER_LINEAR,
            wrap_s: WRAP_REPEAT,
            wrap_t: WRAP_REPEAT,
            name: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scene {
    pub nodes: Vec<Index>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Skin {
    pub inverse_bind_matrices: Option<Index>,
    pub skeleton: Option<Index>,
    pub joints: Vec<Index>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Texture {
    pub sampler: Option<Index>,
    pub source: Option<Index>,
    pub name: String,
}

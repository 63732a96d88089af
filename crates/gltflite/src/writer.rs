//! Serializes a [`Gltf`] as JSON text or as a GLB container.
//!
//! Optional properties equal to their default are omitted; required ones are
//! always written. Node transforms are written whenever they are present, so
//! a written document maps back to an equal one.

use alloc::string::String;
use core::fmt::Write as _;

use log::debug;

use crate::{
    container::write_glb,
    error::StreamError,
    options::{FileKind, WriterOptions},
    schema::*,
    stream::ByteSink,
};

/// Writes documents with a fixed set of [`WriterOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfWriter {
    options: WriterOptions,
}

impl GltfWriter {
    /// Creates a writer.
    #[must_use]
    pub fn new(options: WriterOptions) -> Self {
        Self { options }
    }

    /// Renders `gltf` as JSON text.
    #[must_use]
    pub fn to_json(&self, gltf: &Gltf) -> String {
        let mut json = Json::new(self.options);
        json.gltf(gltf);
        json.out
    }

    /// Writes `gltf` to `sink` in the encoding `kind`.
    ///
    /// For [`FileKind::Glb`] the JSON is rendered in full first so the chunk
    /// lengths are known, and [`Gltf::bin`] becomes the BIN chunk.
    ///
    /// # Errors
    ///
    /// Fails if the sink rejects a write or a GLB would exceed 4 GiB.
    pub fn write<W: ByteSink + ?Sized>(
        &self,
        gltf: &Gltf,
        kind: FileKind,
        sink: &mut W,
    ) -> Result<(), StreamError> {
        let json = self.to_json(gltf);
        debug!("rendered {} bytes of JSON as {kind:?}", json.len());
        match kind {
            FileKind::Gltf => sink.write_all(json.as_bytes()),
            FileKind::Glb => write_glb(sink, json.as_bytes(), gltf.bin()),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Emitter
// ------------------------------------------------------------------------------------------------

struct Json {
    out: String,
    options: WriterOptions,
    /// One entry per open container: whether it has no items yet.
    fresh: alloc::vec::Vec<bool>,
}

impl Json {
    fn new(options: WriterOptions) -> Self {
        Self {
            out: String::new(),
            options,
            fresh: alloc::vec::Vec::new(),
        }
    }

    fn newline(&mut self) {
        if self.options.pretty_print {
            self.out.push('\n');
            let width = self.fresh.len() * usize::from(self.options.indent);
            self.out.extend(core::iter::repeat_n(' ', width));
        }
    }

    fn open(&mut self, bracket: char) {
        self.out.push(bracket);
        self.fresh.push(true);
    }

    fn close(&mut self, bracket: char) {
        if self.fresh.pop() == Some(false) {
            self.newline();
        }
        self.out.push(bracket);
    }

    /// Separator and indentation before the next member or element.
    fn item(&mut self) {
        if let Some(fresh) = self.fresh.last_mut() {
            if !*fresh {
                self.out.push(',');
            }
            *fresh = false;
        }
        self.newline();
    }

    fn object(&mut self, f: impl FnOnce(&mut Self)) {
        self.open('{');
        f(self);
        self.close('}');
    }

    fn array<T>(&mut self, items: &[T], mut f: impl FnMut(&mut Self, &T)) {
        self.open('[');
        for item in items {
            self.item();
            f(self, item);
        }
        self.close(']');
    }

    fn key(&mut self, key: &str) -> &mut Self {
        self.item();
        self.string(key);
        self.out.push(':');
        if self.options.pretty_print {
            self.out.push(' ');
        }
        self
    }

    fn string(&mut self, s: &str) {
        self.out.push('"');
        for c in s.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                '\u{8}' => self.out.push_str("\\b"),
                '\u{c}' => self.out.push_str("\\f"),
                c if u32::from(c) < 0x20 => {
                    let _ = write!(self.out, "\\u{:04x}", u32::from(c));
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    fn uint(&mut self, n: impl Into<u64>) {
        let _ = write!(self.out, "{}", n.into());
    }

    fn bool(&mut self, b: bool) {
        self.out.push_str(if b { "true" } else { "false" });
    }

    /// Shortest text that reads back as the same `f32`.
    fn f32(&mut self, f: f32) {
        if f.is_finite() {
            let _ = write!(self.out, "{f}");
        } else {
            self.out.push_str("null");
        }
    }

    fn f64(&mut self, f: f64) {
        if f.is_finite() {
            let _ = write!(self.out, "{f}");
        } else {
            self.out.push_str("null");
        }
    }

    fn floats(&mut self, values: &[f32]) {
        self.array(values, |j, &f| j.f32(f));
    }

    fn indices(&mut self, values: &[Index]) {
        self.array(values, |j, &i| j.uint(i));
    }

    // --------------------------------------------------------------------------------------------
    // Optional members
    // --------------------------------------------------------------------------------------------

    fn opt_index(&mut self, key: &str, value: Option<Index>) {
        if let Some(i) = value {
            self.key(key).uint(i);
        }
    }

    fn opt_u64(&mut self, key: &str, value: Option<u64>) {
        if let Some(n) = value {
            self.key(key).uint(n);
        }
    }

    fn nonzero(&mut self, key: &str, value: u64) {
        if value != 0 {
            self.key(key).uint(value);
        }
    }

    fn name(&mut self, name: &str) {
        if !name.is_empty() {
            self.key("name").string(name);
        }
    }

    fn opt_string(&mut self, key: &str, value: Option<&String>) {
        if let Some(s) = value {
            self.key(key).string(s);
        }
    }

    fn opt_f32(&mut self, key: &str, value: Option<f32>) {
        if let Some(f) = value {
            self.key(key).f32(f);
        }
    }

    #[allow(clippy::float_cmp)]
    fn f32_unless(&mut self, key: &str, value: f32, default: f32) {
        if value != default {
            self.key(key).f32(value);
        }
    }

    fn list<T>(&mut self, key: &str, items: &[T], f: impl FnMut(&mut Self, &T)) {
        if !items.is_empty() {
            self.key(key).array(items, f);
        }
    }

    // --------------------------------------------------------------------------------------------
    // Records
    // --------------------------------------------------------------------------------------------

    fn gltf(&mut self, g: &Gltf) {
        self.object(|j| {
            j.list("extensionsUsed", &g.extensions_used, |j, s| j.string(s));
            j.list("extensionsRequired", &g.extensions_required, |j, s| j.string(s));
            j.list("accessors", &g.accessors, Self::accessor);
            j.list("animations", &g.animations, Self::animation);
            j.key("asset").asset(&g.asset);
            j.list("buffers", &g.buffers, Self::buffer);
            j.list("bufferViews", &g.buffer_views, Self::buffer_view);
            j.list("cameras", &g.cameras, Self::camera);
            j.list("images", &g.images, Self::image);
            j.list("materials", &g.materials, Self::material);
            j.list("meshes", &g.meshes, Self::mesh);
            j.list("nodes", &g.nodes, Self::node);
            j.list("samplers", &g.samplers, Self::sampler);
            j.opt_index("scene", g.scene);
            j.list("scenes", &g.scenes, Self::scene);
            j.list("skins", &g.skins, Self::skin);
            j.list("textures", &g.textures, Self::texture);
        });
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::float_cmp
    )]
    fn accessor(&mut self, a: &Accessor) {
        self.object(|j| {
            j.opt_index("bufferView", a.buffer_view);
            j.nonzero("byteOffset", a.byte_offset);
            if let Some(t) = a.component_type {
                j.key("componentType").uint(t.gl());
            }
            if a.normalized {
                j.key("normalized").bool(true);
            }
            j.opt_u64("count", a.count);
            if let Some(t) = a.kind {
                j.key("type").string(t.name());
            }
            let width = a.kind.map_or(16, AccessorType::component_count);
            let integral = a.component_type.is_some_and(ComponentType::is_integer);
            for (key, bounds) in [("max", &a.max), ("min", &a.min)] {
                let bounds = &bounds[..bounds.len().min(width)];
                j.list(key, bounds, |j, &v| {
                    if integral && (-9.0e15..9.0e15).contains(&v) && (v as i64) as f64 == v {
                        let _ = write!(j.out, "{}", v as i64);
                    } else {
                        j.f64(v);
                    }
                });
            }
            if let Some(sparse) = &a.sparse {
                j.key("sparse").sparse(sparse);
            }
            j.name(&a.name);
        });
    }

    fn sparse(&mut self, s: &Sparse) {
        self.object(|j| {
            j.opt_u64("count", s.count);
            if let Some(indices) = &s.indices {
                j.key("indices").object(|j| {
                    j.opt_index("bufferView", indices.buffer_view);
                    j.nonzero("byteOffset", indices.byte_offset);
                    if let Some(t) = indices.component_type {
                        j.key("componentType").uint(t.gl());
                    }
                });
            }
            if let Some(values) = &s.values {
                j.key("values").object(|j| {
                    j.opt_index("bufferView", values.buffer_view);
                    j.nonzero("byteOffset", values.byte_offset);
                });
            }
        });
    }

    fn animation(&mut self, a: &Animation) {
        self.object(|j| {
            j.key("channels").array(&a.channels, |j, c| {
                j.object(|j| {
                    j.opt_index("sampler", c.sampler);
                    j.key("target").object(|j| {
                        j.opt_index("node", c.target.node);
                        if let Some(path) = c.target.path {
                            j.key("path").string(path.name());
                        }
                    });
                });
            });
            j.key("samplers").array(&a.samplers, |j, s| {
                j.object(|j| {
                    j.opt_index("input", s.input);
                    if s.interpolation != Interpolation::Linear {
                        j.key("interpolation").string(s.interpolation.name());
                    }
                    j.opt_index("output", s.output);
                });
            });
            j.name(&a.name);
        });
    }

    fn asset(&mut self, a: &Asset) {
        self.object(|j| {
            if !a.copyright.is_empty() {
                j.key("copyright").string(&a.copyright);
            }
            if !a.generator.is_empty() {
                j.key("generator").string(&a.generator);
            }
            j.key("version").string(&a.version);
            if !a.min_version.is_empty() {
                j.key("minVersion").string(&a.min_version);
            }
        });
    }

    fn buffer(&mut self, b: &Buffer) {
        self.object(|j| {
            j.opt_string("uri", b.uri.as_ref());
            j.opt_u64("byteLength", b.byte_length);
            j.name(&b.name);
        });
    }

    fn buffer_view(&mut self, v: &BufferView) {
        self.object(|j| {
            j.opt_index("buffer", v.buffer);
            j.nonzero("byteOffset", v.byte_offset);
            j.opt_u64("byteLength", v.byte_length);
            j.opt_index("byteStride", v.byte_stride);
            j.opt_index("target", v.target);
            j.name(&v.name);
        });
    }

    fn camera(&mut self, c: &Camera) {
        self.object(|j| {
            if let Some(kind) = c.kind {
                j.key("type").string(kind.name());
            }
            if let Some(o) = &c.orthographic {
                j.key("orthographic").object(|j| {
                    j.opt_f32("xmag", o.xmag);
                    j.opt_f32("ymag", o.ymag);
                    j.opt_f32("zfar", o.zfar);
                    j.opt_f32("znear", o.znear);
                });
            }
            if let Some(p) = &c.perspective {
                j.key("perspective").object(|j| {
                    j.opt_f32("aspectRatio", p.aspect_ratio);
                    j.opt_f32("yfov", p.yfov);
                    j.opt_f32("zfar", p.zfar);
                    j.opt_f32("znear", p.znear);
                });
            }
            j.name(&c.name);
        });
    }

    fn image(&mut self, i: &Image) {
        self.object(|j| {
            j.opt_string("uri", i.uri.as_ref());
            j.opt_string("mimeType", i.mime_type.as_ref());
            j.opt_index("bufferView", i.buffer_view);
            j.name(&i.name);
        });
    }

    fn texture_ref(&mut self, index: Option<Index>, tex_coord: u32) {
        self.opt_index("index", index);
        self.nonzero("texCoord", u64::from(tex_coord));
    }

    fn texture_info(&mut self, key: &str, info: Option<TextureInfo>) {
        if let Some(t) = info {
            self.key(key).object(|j| j.texture_ref(t.index, t.tex_coord));
        }
    }

    #[allow(clippy::float_cmp)]
    fn material(&mut self, m: &Material) {
        self.object(|j| {
            j.name(&m.name);
            if let Some(pbr) = &m.pbr_metallic_roughness {
                j.key("pbrMetallicRoughness").object(|j| {
                    if pbr.base_color_factor != [1.0; 4] {
                        j.key("baseColorFactor").floats(&pbr.base_color_factor);
                    }
                    j.texture_info("baseColorTexture", pbr.base_color_texture);
                    j.f32_unless("metallicFactor", pbr.metallic_factor, 1.0);
                    j.f32_unless("roughnessFactor", pbr.roughness_factor, 1.0);
                    j.texture_info("metallicRoughnessTexture", pbr.metallic_roughness_texture);
                });
            }
            if let Some(t) = &m.normal_texture {
                j.key("normalTexture").object(|j| {
                    j.texture_ref(t.index, t.tex_coord);
                    j.f32_unless("scale", t.scale, 1.0);
                });
            }
            if let Some(t) = &m.occlusion_texture {
                j.key("occlusionTexture").object(|j| {
                    j.texture_ref(t.index, t.tex_coord);
                    j.f32_unless("strength", t.strength, 1.0);
                });
            }
            j.texture_info("emissiveTexture", m.emissive_texture);
            if m.emissive_factor != [0.0; 3] {
                j.key("emissiveFactor").floats(&m.emissive_factor);
            }
            if m.alpha_mode != AlphaMode::Opaque {
                j.key("alphaMode").string(m.alpha_mode.name());
            }
            j.f32_unless("alphaCutoff", m.alpha_cutoff, 0.5);
            if m.double_sided {
                j.key("doubleSided").bool(true);
            }
        });
    }

    fn attributes(&mut self, attributes: &[Attribute]) {
        self.object(|j| {
            for a in attributes {
                j.key(&a.semantic.name()).uint(a.accessor);
            }
        });
    }

    fn mesh(&mut self, m: &Mesh) {
        self.object(|j| {
            j.key("primitives").array(&m.primitives, |j, p| {
                j.object(|j| {
                    j.key("attributes").attributes(&p.attributes);
                    j.opt_index("indices", p.indices);
                    j.opt_index("material", p.material);
                    if p.mode != MODE_TRIANGLES {
                        j.key("mode").uint(p.mode);
                    }
                    j.list("targets", &p.targets, |j, t| j.attributes(t));
                });
            });
            j.list("weights", &m.weights, |j, &w| j.f32(w));
            j.name(&m.name);
        });
    }

    fn node(&mut self, n: &Node) {
        self.object(|j| {
            j.opt_index("camera", n.camera);
            j.list("children", &n.children, |j, &c| j.uint(c));
            j.opt_index("skin", n.skin);
            if let Some(m) = &n.matrix {
                j.key("matrix").floats(m);
            }
            j.opt_index("mesh", n.mesh);
            if let Some(r) = &n.rotation {
                j.key("rotation").floats(r);
            }
            if let Some(s) = &n.scale {
                j.key("scale").floats(s);
            }
            if let Some(t) = &n.translation {
                j.key("translation").floats(t);
            }
            j.list("weights", &n.weights, |j, &w| j.f32(w));
            j.name(&n.name);
        });
    }

    fn sampler(&mut self, s: &Sampler) {
        self.object(|j| {
            for (key, value, default) in [
                ("magFilter", s.mag_filter, FILTER_LINEAR),
                ("minFilter", s.min_filter, FILTER_LINEAR),
                ("wrapS", s.wrap_s, WRAP_REPEAT),
                ("wrapT", s.wrap_t, WRAP_REPEAT),
            ] {
                if value != default {
                    j.key(key).uint(value);
                }
            }
            j.name(&s.name);
        });
    }

    fn scene(&mut self, s: &Scene) {
        self.object(|j| {
            if !s.nodes.is_empty() {
                j.key("nodes").indices(&s.nodes);
            }
            j.name(&s.name);
        });
    }

    fn skin(&mut self, s: &Skin) {
        self.object(|j| {
            j.opt_index("inverseBindMatrices", s.inverse_bind_matrices);
            j.opt_index("skeleton", s.skeleton);
            j.key("joints").indices(&s.joints);
            j.name(&s.name);
        });
    }

    fn texture(&mut self, t: &Texture) {
        self.object(|j| {
            j.opt_index("sampler", t.sampler);
            j.opt_index("source", t.source);
            j.name(&t.name);
        });
    }
}

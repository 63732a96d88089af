//! Interning of the document format's property names.
//!
//! Object keys are upper-cased and mapped to the dense codes of [`Key`] so the
//! schema mapper can dispatch on integers. Lookup hashes the key with 32-bit
//! FNV-1a into an open-addressed table that is built at compile time, then
//! confirms the match by comparing bytes. Keys outside the vocabulary map to
//! [`UNKNOWN`].

/// Code returned for keys outside the vocabulary.
pub const UNKNOWN: i32 = -1;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a over `bytes`.
#[must_use]
pub const fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

macro_rules! keys {
    ( $( $variant:ident => $name:literal, )* ) => {
        /// A known property name. The discriminant is the interned code.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(i32)]
        #[allow(missing_docs)]
        pub enum Key {
            $( $variant, )*
        }

        impl Key {
            /// Every key, in code order.
            pub const ALL: &'static [Key] = &[ $( Key::$variant, )* ];

            /// Upper-cased spelling of every key, in code order.
            pub const NAMES: &'static [&'static str] = &[ $( $name, )* ];
        }
    };
}

keys! {
    BufferView => "BUFFERVIEW",
    ByteOffset => "BYTEOFFSET",
    ComponentType => "COMPONENTTYPE",
    Normalized => "NORMALIZED",
    Count => "COUNT",
    Type => "TYPE",
    Max => "MAX",
    Min => "MIN",
    Sparse => "SPARSE",
    Name => "NAME",
    Extensions => "EXTENSIONS",
    Extras => "EXTRAS",
    Channels => "CHANNELS",
    Samplers => "SAMPLERS",
    Input => "INPUT",
    Interpolation => "INTERPOLATION",
    Output => "OUTPUT",
    Copyright => "COPYRIGHT",
    Generator => "GENERATOR",
    Version => "VERSION",
    MinVersion => "MINVERSION",
    Uri => "URI",
    ByteLength => "BYTELENGTH",
    Buffer => "BUFFER",
    ByteStride => "BYTESTRIDE",
    Target => "TARGET",
    Orthographic => "ORTHOGRAPHIC",
    Perspective => "PERSPECTIVE",
    Sampler => "SAMPLER",
    ExtensionsUsed => "EXTENSIONSUSED",
    ExtensionsRequired => "EXTENSIONSREQUIRED",
    Accessors => "ACCESSORS",
    Animations => "ANIMATIONS",
    Asset => "ASSET",
    Buffers => "BUFFERS",
    BufferViews => "BUFFERVIEWS",
    Cameras => "CAMERAS",
    Images => "IMAGES",
    Materials => "MATERIALS",
    Meshes => "MESHES",
    Nodes => "NODES",
    Scene => "SCENE",
    Scenes => "SCENES",
    Skins => "SKINS",
    Textures => "TEXTURES",
    MimeType => "MIMETYPE",
    PbrMetallicRoughness => "PBRMETALLICROUGHNESS",
    NormalTexture => "NORMALTEXTURE",
    OcclusionTexture => "OCCLUSIONTEXTURE",
    EmissiveTexture => "EMISSIVETEXTURE",
    EmissiveFactor => "EMISSIVEFACTOR",
    AlphaMode => "ALPHAMODE",
    AlphaCutoff => "ALPHACUTOFF",
    DoubleSided => "DOUBLESIDED",
    Primitives => "PRIMITIVES",
    Weights => "WEIGHTS",
    Camera => "CAMERA",
    Children => "CHILDREN",
    Skin => "SKIN",
    Matrix => "MATRIX",
    Mesh => "MESH",
    Rotation => "ROTATION",
    Scale => "SCALE",
    Translation => "TRANSLATION",
    Index => "INDEX",
    TexCoord => "TEXCOORD",
    Strength => "STRENGTH",
    XMag => "XMAG",
    YMag => "YMAG",
    ZFar => "ZFAR",
    ZNear => "ZNEAR",
    BaseColorFactor => "BASECOLORFACTOR",
    BaseColorTexture => "BASECOLORTEXTURE",
    MetallicFactor => "METALLICFACTOR",
    RoughnessFactor => "ROUGHNESSFACTOR",
    MetallicRoughnessTexture => "METALLICROUGHNESSTEXTURE",
    AspectRatio => "ASPECTRATIO",
    YFov => "YFOV",
    Attributes => "ATTRIBUTES",
    Indices => "INDICES",
    Material => "MATERIAL",
    Mode => "MODE",
    Targets => "TARGETS",
    MagFilter => "MAGFILTER",
    MinFilter => "MINFILTER",
    WrapS => "WRAPS",
    WrapT => "WRAPT",
    InverseBindMatrices => "INVERSEBINDMATRICES",
    Skeleton => "SKELETON",
    Joints => "JOINTS",
    Values => "VALUES",
    Node => "NODE",
    Path => "PATH",
    Source => "SOURCE",
    Position => "POSITION",
    Normal => "NORMAL",
    Tangent => "TANGENT",
    TexCoord0 => "TEXCOORD_0",
    TexCoord1 => "TEXCOORD_1",
    TexCoord2 => "TEXCOORD_2",
    TexCoord3 => "TEXCOORD_3",
    Color0 => "COLOR_0",
    Color1 => "COLOR_1",
    Color2 => "COLOR_2",
    Color3 => "COLOR_3",
    Joints0 => "JOINTS_0",
    Joints1 => "JOINTS_1",
    Joints2 => "JOINTS_2",
    Joints3 => "JOINTS_3",
    Weights0 => "WEIGHTS_0",
    Weights1 => "WEIGHTS_1",
    Weights2 => "WEIGHTS_2",
    Weights3 => "WEIGHTS_3",
}

impl Key {
    /// Number of known keys.
    pub const COUNT: usize = Key::ALL.len();

    /// The interned code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// The upper-cased spelling.
    #[must_use]
    pub const fn name(self) -> &'static str {
        Key::NAMES[self as usize]
    }

    /// The key with the given code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Key> {
        usize::try_from(code).ok().and_then(|i| Key::ALL.get(i).copied())
    }

    /// Looks up an already upper-cased key.
    #[must_use]
    pub fn lookup(upper: &[u8]) -> Option<Key> {
        Key::from_code(code_for(upper))
    }
}

// ------------------------------------------------------------------------------------------------
// Hash table
// ------------------------------------------------------------------------------------------------

const TABLE_SIZE: usize = 256;
const TABLE_MASK: usize = TABLE_SIZE - 1;
const EMPTY: i16 = -1;

const HASHES: [u32; Key::COUNT] = {
    let mut hashes = [0u32; Key::COUNT];
    let mut i = 0;
    while i < Key::COUNT {
        hashes[i] = fnv1a(Key::NAMES[i].as_bytes());
        i += 1;
    }
    hashes
};

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const TABLE: [i16; TABLE_SIZE] = {
    let mut table = [EMPTY; TABLE_SIZE];
    let mut i = 0;
    while i < Key::COUNT {
        let mut slot = HASHES[i] as usize & TABLE_MASK;
        while table[slot] != EMPTY {
            slot = (slot + 1) & TABLE_MASK;
        }
        table[slot] = i as i16;
        i += 1;
    }
    table
};

/// Code of an upper-cased key, or [`UNKNOWN`].
#[must_use]
pub fn code_for(upper: &[u8]) -> i32 {
    let hash = fnv1a(upper);
    let mut slot = hash as usize & TABLE_MASK;
    loop {
        let entry = TABLE[slot];
        if entry == EMPTY {
            return UNKNOWN;
        }
        let index = entry as usize;
        if HASHES[index] == hash && Key::NAMES[index].as_bytes() == upper {
            return i32::from(entry);
        }
        slot = (slot + 1) & TABLE_MASK;
    }
}

/// Code of a key in any ASCII casing, or [`UNKNOWN`].
///
/// Keys longer than the longest known name are rejected without hashing.
#[must_use]
pub fn code_for_ignore_case(key: &[u8]) -> i32 {
    const LONGEST: usize = 32;
    if key.len() > LONGEST {
        return UNKNOWN;
    }
    let mut buf = [0u8; LONGEST];
    let upper = &mut buf[..key.len()];
    upper.copy_from_slice(key);
    upper.make_ascii_uppercase();
    code_for(upper)
}

/// Texture description types for the graphics device

/// Texture dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// Single 2D image
    Tex2D,
    /// Six-face cube map
    Cube,
}

/// Texel formats
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 8-bit RGBA, normalized
    R8G8B8A8_UNORM,
    /// 8-bit BGRA, normalized (every decoded image uses this byte order)
    B8G8R8A8_UNORM,
    /// 32-bit float RGBA (offscreen color targets)
    R32G32B32A32_SFLOAT,
    /// 32-bit float depth
    D32_FLOAT,
}

impl TextureFormat {
    /// Bytes per texel
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8G8B8A8_UNORM | TextureFormat::B8G8R8A8_UNORM => 4,
            TextureFormat::R32G32B32A32_SFLOAT => 16,
            TextureFormat::D32_FLOAT => 4,
        }
    }

    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::D32_FLOAT)
    }
}

/// Sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Initial texel data
#[derive(Debug, Clone, PartialEq)]
pub enum TextureData {
    /// One image (2D textures)
    Single(Vec<u8>),
    /// Six images in +X, -X, +Y, -Y, +Z, -Z order (cube textures)
    CubeFaces(Vec<Vec<u8>>),
}

/// Texture creation descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub kind: TextureKind,
    pub format: TextureFormat,
    /// `None` allocates storage without uploading (render targets)
    pub data: Option<TextureData>,
    /// Generate a full mip chain after upload
    pub mipmaps: bool,
    pub filter: TextureFilter,
}

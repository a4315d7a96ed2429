/// Conversions from engine device enums to OpenGL enums
///
/// Pure functions with no GL calls, so they are testable without a context.

use lumen_3d_engine::lumen3d::device::{
    AttributeType, BufferUsage, ClearFlags, CullMode, PrimitiveTopology, ShaderStage,
    TextureFilter, TextureFormat, TextureKind,
};

/// Upload parameters of a texel format for `glTexImage2D`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GlTexelFormat {
    pub internal_format: i32,
    pub format: u32,
    pub ty: u32,
}

pub(crate) fn texel_format(format: TextureFormat) -> GlTexelFormat {
    let (internal_format, format, ty) = match format {
        TextureFormat::R8G8B8A8_UNORM => (glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
        TextureFormat::B8G8R8A8_UNORM => (glow::RGBA8, glow::BGRA, glow::UNSIGNED_BYTE),
        TextureFormat::R32G32B32A32_SFLOAT => (glow::RGBA32F, glow::RGBA, glow::FLOAT),
        TextureFormat::D32_FLOAT => (glow::DEPTH_COMPONENT32F, glow::DEPTH_COMPONENT, glow::FLOAT),
    };
    GlTexelFormat { internal_format: internal_format as i32, format, ty }
}

pub(crate) fn texture_target(kind: TextureKind) -> u32 {
    match kind {
        TextureKind::Tex2D => glow::TEXTURE_2D,
        TextureKind::Cube => glow::TEXTURE_CUBE_MAP,
    }
}

/// Upload target of one image of a texture (`face` is ignored for 2D)
pub(crate) fn image_target(kind: TextureKind, face: usize) -> u32 {
    match kind {
        TextureKind::Tex2D => glow::TEXTURE_2D,
        TextureKind::Cube => glow::TEXTURE_CUBE_MAP_POSITIVE_X + face as u32,
    }
}

/// (minification, magnification) filters
pub(crate) fn filters(filter: TextureFilter, mipmaps: bool) -> (i32, i32) {
    let (min, mag) = match (filter, mipmaps) {
        (TextureFilter::Linear, true) => (glow::LINEAR_MIPMAP_LINEAR, glow::LINEAR),
        (TextureFilter::Linear, false) => (glow::LINEAR, glow::LINEAR),
        (TextureFilter::Nearest, true) => (glow::NEAREST_MIPMAP_NEAREST, glow::NEAREST),
        (TextureFilter::Nearest, false) => (glow::NEAREST, glow::NEAREST),
    };
    (min as i32, mag as i32)
}

/// Cube maps clamp so face seams do not bleed; 2D textures tile
pub(crate) fn wrap_mode(kind: TextureKind) -> i32 {
    match kind {
        TextureKind::Tex2D => glow::REPEAT as i32,
        TextureKind::Cube => glow::CLAMP_TO_EDGE as i32,
    }
}

pub(crate) fn shader_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
    }
}

pub(crate) fn buffer_target(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::Vertex => glow::ARRAY_BUFFER,
        BufferUsage::Index => glow::ELEMENT_ARRAY_BUFFER,
    }
}

pub(crate) fn attribute_type(kind: AttributeType) -> u32 {
    match kind {
        AttributeType::Float32 => glow::FLOAT,
        AttributeType::Int32 => glow::INT,
    }
}

pub(crate) fn draw_mode(topology: PrimitiveTopology) -> u32 {
    match topology {
        PrimitiveTopology::TriangleList => glow::TRIANGLES,
        PrimitiveTopology::TriangleStrip => glow::TRIANGLE_STRIP,
        PrimitiveTopology::PointList => glow::POINTS,
    }
}

/// Face to cull, `None` disables culling
pub(crate) fn cull_face(mode: CullMode) -> Option<u32> {
    match mode {
        CullMode::None => None,
        CullMode::Front => Some(glow::FRONT),
        CullMode::Back => Some(glow::BACK),
    }
}

pub(crate) fn clear_mask(flags: ClearFlags) -> u32 {
    let mut mask = 0;
    if flags.contains(ClearFlags::COLOR) {
        mask |= glow::COLOR_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::DEPTH) {
        mask |= glow::DEPTH_BUFFER_BIT;
    }
    mask
}

/// Readable name of a `glCheckFramebufferStatus` result
pub(crate) fn framebuffer_status_name(status: u32) -> &'static str {
    match status {
        glow::FRAMEBUFFER_COMPLETE => "complete",
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => "incomplete attachment",
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => "missing attachment",
        glow::FRAMEBUFFER_UNSUPPORTED => "unsupported attachment combination",
        _ => "unknown status",
    }
}

#[cfg(test)]
#[path = "gl_format_tests.rs"]
mod tests;

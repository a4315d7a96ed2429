/// Shader stage and uniform types for the graphics device

use glam::{Mat4, Vec3};

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

impl ShaderStage {
    /// Stages in link order
    pub const ALL: [ShaderStage; 3] = [ShaderStage::Vertex, ShaderStage::Fragment, ShaderStage::Geometry];

    /// File-name suffix used by shader source files
    pub fn file_suffix(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vert",
            ShaderStage::Fragment => "frag",
            ShaderStage::Geometry => "geom",
        }
    }
}

/// Source text of one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderStageSource {
    pub stage: ShaderStage,
    pub source: String,
}

/// Value written to a uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3(Vec3),
    Mat4(Mat4),
}

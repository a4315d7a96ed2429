/// Shader program resource.
///
/// A shader is built from up to three stages (vertex, fragment, geometry).
/// File-based shaders find their stages by appending `vert.glsl`,
/// `frag.glsl` and `geom.glsl` to a path prefix; a missing or empty file is
/// an absent stage.
///
/// Compile and link failures never propagate: they are logged and the shader
/// settles with no program, which draws treat as "skip shading".

use std::fs;
use crate::error::Result;
use crate::graphics_device::{
    lock_device, lock_device_for_release, GraphicsDevice, ProgramHandle, ShaderStage,
    ShaderStageSource, SharedDevice,
};
use crate::resource::Resource;

/// Where a shader's stage sources come from
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderOrigin {
    /// `<prefix>vert.glsl`, `<prefix>frag.glsl`, `<prefix>geom.glsl`
    Files(String),
    /// Sources held in memory
    Embedded(Vec<ShaderStageSource>),
}

/// Linked GPU program
pub struct Shader {
    name: String,
    origin: ShaderOrigin,
    program: Option<ProgramHandle>,
    device: SharedDevice,
}

impl Shader {
    /// Load and link a shader from files sharing `prefix`
    pub fn load(device: &SharedDevice, prefix: &str) -> Result<Self> {
        let mut shader = Self {
            name: prefix.to_string(),
            origin: ShaderOrigin::Files(prefix.to_string()),
            program: None,
            device: device.clone(),
        };
        shader.build()?;
        Ok(shader)
    }

    /// Link a shader from in-memory stage sources
    pub fn from_sources(device: &SharedDevice, name: &str, stages: Vec<ShaderStageSource>) -> Result<Self> {
        let mut shader = Self {
            name: name.to_string(),
            origin: ShaderOrigin::Embedded(stages),
            program: None,
            device: device.clone(),
        };
        shader.build()?;
        Ok(shader)
    }

    /// Destroy the current program and build a new one from the same origin
    ///
    /// The shader keeps its identity; only the program handle changes.
    pub fn reload(&mut self) -> Result<()> {
        {
            let mut device = lock_device(&self.device)?;
            if let Some(program) = self.program.take() {
                device.destroy_program(program);
            }
        }
        self.build()
    }

    fn build(&mut self) -> Result<()> {
        let stages = self.stage_sources();
        let mut device = lock_device(&self.device)?;
        self.program = link(&mut *device, &self.name, &stages);
        Ok(())
    }

    /// Stage sources that are present, in link order
    fn stage_sources(&self) -> Vec<ShaderStageSource> {
        match &self.origin {
            ShaderOrigin::Embedded(stages) => stages
                .iter()
                .filter(|s| !s.source.trim().is_empty())
                .cloned()
                .collect(),
            ShaderOrigin::Files(prefix) => ShaderStage::ALL
                .iter()
                .filter_map(|&stage| {
                    let path = format!("{}{}.glsl", prefix, stage.file_suffix());
                    match fs::read_to_string(&path) {
                        Ok(source) if !source.trim().is_empty() => Some(ShaderStageSource { stage, source }),
                        Ok(_) => None,
                        Err(_) => {
                            crate::engine_trace!("lumen3d::Shader", "No {:?} stage at '{}'", stage, path);
                            None
                        }
                    }
                })
                .collect(),
        }
    }

    // ===== ACCESSORS =====

    /// Linked program, `None` when compilation or linking failed
    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }

    pub fn is_valid(&self) -> bool {
        self.program.is_some()
    }

    /// File prefix, `None` for embedded shaders
    pub fn prefix(&self) -> Option<&str> {
        match &self.origin {
            ShaderOrigin::Files(prefix) => Some(prefix),
            ShaderOrigin::Embedded(_) => None,
        }
    }

    pub fn origin(&self) -> &ShaderOrigin {
        &self.origin
    }
}

fn link(device: &mut dyn GraphicsDevice, name: &str, stages: &[ShaderStageSource]) -> Option<ProgramHandle> {
    if stages.is_empty() {
        crate::engine_error!("lumen3d::Shader", "Shader '{}' unusable: no stage sources", name);
        return None;
    }
    match device.create_program(stages) {
        Ok(program) => {
            crate::engine_debug!("lumen3d::Shader", "Linked '{}' ({} stage(s))", name, stages.len());
            Some(program)
        }
        Err(error) => {
            crate::engine_error!("lumen3d::Shader", "Shader '{}' unusable: {}", name, error);
            None
        }
    }
}

impl Resource for Shader {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        if let Some(program) = self.program.take() {
            lock_device_for_release(&self.device).destroy_program(program);
        }
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;

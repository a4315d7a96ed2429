/// Material resource.
///
/// A Material is a named bundle of Phong coefficients, an optional shader and
/// an ordered list of textures. Shader and textures are held by key: the
/// material never owns them and never keeps them alive.
///
/// `apply` binds the program and the textures, then writes each coefficient
/// uniform the program actually declares. A uniform the program lacks is
/// skipped silently, so one material works under several shaders.

use glam::Vec3;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{GraphicsDevice, ProgramHandle, UniformValue};
use crate::resource::{Resource, ResourceManager, Shader, ShaderKey, Texture, TextureKey};

/// Most textures a material can bind (one per texture unit)
pub const MAX_MATERIAL_TEXTURES: usize = 8;

/// Uniform names written by `Material::apply`
pub mod uniforms {
    pub const AMBIENT: &str = "Ka";
    pub const DIFFUSE: &str = "Kd";
    pub const SPECULAR: &str = "Ks";
    pub const SHININESS: &str = "Ph";
    pub const OPACITY: &str = "Trans";
    pub const HAS_TEXTURE: &str = "IsTexture";
}

// ===== DESCRIPTOR =====

/// Material creation descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    pub name: String,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
    /// 1.0 is fully opaque
    pub opacity: f32,
    pub shader: Option<ShaderKey>,
    pub textures: Vec<TextureKey>,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: Vec3::ONE,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            shininess: 1.0,
            opacity: 1.0,
            shader: None,
            textures: Vec::new(),
        }
    }
}

// ===== MATERIAL =====

/// Surface description applied before drawing a primitive
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    name: String,
    ambient: Vec3,
    diffuse: Vec3,
    specular: Vec3,
    shininess: f32,
    opacity: f32,
    shader: Option<ShaderKey>,
    textures: Vec<TextureKey>,
}

impl Material {
    /// Create material from descriptor
    pub fn from_desc(desc: MaterialDesc) -> Result<Self> {

        // ========== VALIDATION 1: Opacity in [0, 1] ==========
        if !(0.0..=1.0).contains(&desc.opacity) {
            engine_bail!("lumen3d::Material",
                "Material '{}': opacity {} outside [0, 1]", desc.name, desc.opacity);
        }

        // ========== VALIDATION 2: Texture units ==========
        if desc.textures.len() > MAX_MATERIAL_TEXTURES {
            engine_bail!("lumen3d::Material",
                "Material '{}': {} textures exceed the {} available units",
                desc.name, desc.textures.len(), MAX_MATERIAL_TEXTURES);
        }

        Ok(Self {
            name: desc.name,
            ambient: desc.ambient,
            diffuse: desc.diffuse,
            specular: desc.specular,
            shininess: desc.shininess,
            opacity: desc.opacity,
            shader: desc.shader,
            textures: desc.textures,
        })
    }

    /// Material with default coefficients using `shader`
    pub fn with_shader(name: &str, shader: Option<ShaderKey>) -> Self {
        Self {
            name: name.to_string(),
            ambient: Vec3::ONE,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            shininess: 1.0,
            opacity: 1.0,
            shader,
            textures: Vec::new(),
        }
    }

    /// Bind program, textures and coefficient uniforms
    ///
    /// Returns the bound program, or `None` (the "unshaded" sentinel) when the
    /// material has no shader, the shader key is dead or the shader failed to
    /// link. In that case no GPU call is made.
    ///
    /// # Errors
    ///
    /// `Error::StaleHandle` if one of the textures has been deleted.
    pub fn apply(
        &self,
        device: &mut dyn GraphicsDevice,
        shaders: &ResourceManager<ShaderKey, Shader>,
        textures: &ResourceManager<TextureKey, Texture>,
    ) -> Result<Option<ProgramHandle>> {
        let Some(program) = self.shader.and_then(|key| shaders.get(key)).and_then(Shader::program) else {
            return Ok(None);
        };

        // Resolve every texture before touching GPU state
        let mut bound = Vec::with_capacity(self.textures.len());
        for &key in &self.textures {
            let texture = textures.try_get(key)?;
            if let Some(handle) = texture.handle() {
                bound.push((texture.kind(), handle));
            }
        }

        device.use_program(Some(program));
        for (unit, (kind, handle)) in bound.iter().enumerate() {
            device.bind_texture(unit as u32, *kind, *handle);
        }

        let values = [
            (uniforms::AMBIENT, UniformValue::Vec3(self.ambient)),
            (uniforms::DIFFUSE, UniformValue::Vec3(self.diffuse)),
            (uniforms::SPECULAR, UniformValue::Vec3(self.specular)),
            (uniforms::SHININESS, UniformValue::Float(self.shininess)),
            (uniforms::OPACITY, UniformValue::Float(self.opacity)),
            (uniforms::HAS_TEXTURE, UniformValue::Int(!self.textures.is_empty() as i32)),
        ];
        for (name, value) in values {
            if let Some(location) = device.uniform_location(program, name) {
                device.set_uniform(location, value);
            }
        }

        Ok(Some(program))
    }

    // ===== ACCESSORS =====

    /// Ambient coefficient
    pub fn ambient(&self) -> Vec3 {
        self.ambient
    }

    /// Diffuse coefficient
    pub fn diffuse(&self) -> Vec3 {
        self.diffuse
    }

    /// Specular coefficient
    pub fn specular(&self) -> Vec3 {
        self.specular
    }

    /// Phong exponent
    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    /// Opacity (1.0 = opaque)
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Whether the material counts as opaque when sorting draws
    pub fn is_opaque(&self) -> bool {
        self.opacity >= 1.0
    }

    pub fn shader(&self) -> Option<ShaderKey> {
        self.shader
    }

    pub fn textures(&self) -> &[TextureKey] {
        &self.textures
    }

    // ===== MUTATORS =====

    /// Replace all coefficients at once
    pub fn set_coefficients(&mut self, ambient: Vec3, diffuse: Vec3, specular: Vec3, shininess: f32, opacity: f32) {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self.shininess = shininess;
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_shader(&mut self, shader: Option<ShaderKey>) {
        self.shader = shader;
    }

    /// Append a texture on the next free unit
    pub fn add_texture(&mut self, texture: TextureKey) -> Result<()> {
        if self.textures.len() >= MAX_MATERIAL_TEXTURES {
            engine_bail!("lumen3d::Material",
                "Material '{}': all {} texture units are used", self.name, MAX_MATERIAL_TEXTURES);
        }
        self.textures.push(texture);
        Ok(())
    }
}

impl Resource for Material {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;

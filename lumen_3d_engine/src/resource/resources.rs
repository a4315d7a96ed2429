/// Resource pools bundled behind one device.
///
/// `Resources` owns one `ResourceManager` per resource kind and the shared
/// device the GPU-backed kinds are created on. It is the creation point for
/// everything the scene refers to by key, including the composite resources
/// built from asset files (model primitive sets, fonts).
///
/// Teardown order matters only in one direction: keys held by later pools
/// (fonts, sets, primitives, materials) point at earlier ones (shaders,
/// textures), never the reverse. `shutdown` clears pools holders-first.

use std::path::Path;
use glam::Mat4;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::graphics_device::{ShaderStageSource, SharedDevice};
use crate::resource::{
    Font, FontAsset, FontKey, Image, Material, MaterialDesc, MaterialKey, ModelAsset, Primitive,
    PrimitiveKey, PrimitiveSet, PrimitiveSetKey, ResourceManager, Shader, ShaderKey, Texture,
    TextureKey, Topology, MAX_MATERIAL_TEXTURES,
};

/// Every resource pool of a render context
pub struct Resources {
    device: SharedDevice,
    pub shaders: ResourceManager<ShaderKey, Shader>,
    pub textures: ResourceManager<TextureKey, Texture>,
    pub materials: ResourceManager<MaterialKey, Material>,
    pub primitives: ResourceManager<PrimitiveKey, Primitive>,
    pub primitive_sets: ResourceManager<PrimitiveSetKey, PrimitiveSet>,
    pub fonts: ResourceManager<FontKey, Font>,
}

/// Keys created while building a composite resource, removed again on failure
#[derive(Default)]
struct Created {
    textures: Vec<TextureKey>,
    materials: Vec<MaterialKey>,
    primitives: Vec<PrimitiveKey>,
}

impl Resources {
    /// Empty pools on `device`
    pub fn new(device: SharedDevice) -> Self {
        Self {
            device,
            shaders: ResourceManager::new("shader"),
            textures: ResourceManager::new("texture"),
            materials: ResourceManager::new("material"),
            primitives: ResourceManager::new("primitive"),
            primitive_sets: ResourceManager::new("primitive set"),
            fonts: ResourceManager::new("font"),
        }
    }

    pub fn device(&self) -> &SharedDevice {
        &self.device
    }

    // ===== SHADERS =====

    /// Load a shader from `<prefix>vert.glsl`, `<prefix>frag.glsl`, `<prefix>geom.glsl`
    pub fn create_shader(&mut self, prefix: &str) -> Result<ShaderKey> {
        let shader = Shader::load(&self.device, prefix)?;
        Ok(self.shaders.add(shader))
    }

    /// Shader from in-memory stage sources
    pub fn create_shader_from_sources(&mut self, name: &str, stages: Vec<ShaderStageSource>) -> Result<ShaderKey> {
        let shader = Shader::from_sources(&self.device, name, stages)?;
        Ok(self.shaders.add(shader))
    }

    /// Rebuild every shader from its origin, returning how many now link
    pub fn reload_shaders(&mut self) -> Result<usize> {
        let mut linked = 0;
        for (_, shader) in self.shaders.iter_mut() {
            shader.reload()?;
            linked += shader.is_valid() as usize;
        }
        crate::engine_debug!("lumen3d::Resources", "Reloaded {} shader(s), {} linked", self.shaders.len(), linked);
        Ok(linked)
    }

    // ===== TEXTURES =====

    /// 2D texture from BGRA8 pixels
    pub fn create_texture(&mut self, name: &str, width: u32, height: u32, pixels: Vec<u8>) -> Result<TextureKey> {
        let texture = Texture::from_pixels(&self.device, name, width, height, pixels)?;
        Ok(self.textures.add(texture))
    }

    /// 2D texture from a decoded image
    pub fn create_texture_from_image(&mut self, name: &str, image: &Image) -> Result<TextureKey> {
        let texture = Texture::from_image(&self.device, name, image)?;
        Ok(self.textures.add(texture))
    }

    /// 2D texture from an image file
    pub fn load_texture<P: AsRef<Path>>(&mut self, name: &str, path: P) -> Result<TextureKey> {
        let texture = Texture::load(&self.device, name, path)?;
        Ok(self.textures.add(texture))
    }

    /// Cube map from six faces (+X, -X, +Y, -Y, +Z, -Z)
    pub fn create_cube_texture(&mut self, name: &str, faces: &[Image; 6]) -> Result<TextureKey> {
        let texture = Texture::cube_from_images(&self.device, name, faces)?;
        Ok(self.textures.add(texture))
    }

    // ===== MATERIALS / PRIMITIVES =====

    pub fn create_material(&mut self, desc: MaterialDesc) -> Result<MaterialKey> {
        let material = Material::from_desc(desc)?;
        Ok(self.materials.add(material))
    }

    /// Upload a topology as a new primitive
    pub fn create_primitive(&mut self, name: &str, topology: &Topology) -> Result<PrimitiveKey> {
        let primitive = Primitive::new(&self.device, name, topology)?;
        Ok(self.primitives.add(primitive))
    }

    /// Group existing primitives; bounds are computed from the live members
    pub fn create_primitive_set(&mut self, name: &str, primitives: Vec<PrimitiveKey>) -> PrimitiveSetKey {
        let mut set = PrimitiveSet::new(name, primitives);
        set.update_bounds(&self.primitives);
        self.primitive_sets.add(set)
    }

    // ===== MODELS =====

    /// Load a G3DM model as one primitive set
    ///
    /// Positions and normals are baked through `load_transform`. Every
    /// material gets `shader`.
    pub fn load_primitive_set<P: AsRef<Path>>(
        &mut self,
        path: P,
        shader: Option<ShaderKey>,
        load_transform: &Mat4,
    ) -> Result<PrimitiveSetKey> {
        let path = path.as_ref();
        let model = ModelAsset::load(path)?;
        self.build_primitive_set(&path.display().to_string(), &model, shader, load_transform)
    }

    /// Register a decoded model as one primitive set
    ///
    /// Materials and textures are created once per file-local index, and
    /// only when some part refers to them. Nothing stays registered if any
    /// part fails.
    pub fn build_primitive_set(
        &mut self,
        name: &str,
        model: &ModelAsset,
        shader: Option<ShaderKey>,
        load_transform: &Mat4,
    ) -> Result<PrimitiveSetKey> {
        let mut created = Created::default();
        match self.build_model_parts(name, model, shader, load_transform, &mut created) {
            Ok(primitives) => {
                let key = self.create_primitive_set(name, primitives);
                crate::engine_info!("lumen3d::Resources", "Loaded model '{}': {} part(s), {} material(s), {} texture(s)",
                    name, created.primitives.len(), created.materials.len(), created.textures.len());
                Ok(key)
            }
            Err(error) => {
                self.discard(created);
                Err(error)
            }
        }
    }

    fn build_model_parts(
        &mut self,
        name: &str,
        model: &ModelAsset,
        shader: Option<ShaderKey>,
        load_transform: &Mat4,
        created: &mut Created,
    ) -> Result<Vec<PrimitiveKey>> {
        // File-local index -> registered key
        let mut material_keys: FxHashMap<usize, MaterialKey> = FxHashMap::default();
        let mut texture_keys: FxHashMap<usize, TextureKey> = FxHashMap::default();
        let mut primitives = Vec::with_capacity(model.parts.len());

        for (index, part) in model.parts.iter().enumerate() {
            let material_index = part.material_index as usize;
            let material = match model.materials.get(material_index) {
                Some(record) => match material_keys.get(&material_index) {
                    Some(&key) => Some(key),
                    None => {
                        let mut textures = Vec::new();
                        for t in record.texture_indices().take(MAX_MATERIAL_TEXTURES) {
                            let Some(texture) = model.textures.get(t) else {
                                crate::engine_warn!("lumen3d::Resources",
                                    "Model '{}': material '{}' refers to missing texture {}", name, record.name, t);
                                continue;
                            };
                            let key = match texture_keys.get(&t) {
                                Some(&key) => key,
                                None => {
                                    let key = self.create_texture(&texture.name, texture.width, texture.height, texture.pixels.clone())?;
                                    created.textures.push(key);
                                    texture_keys.insert(t, key);
                                    key
                                }
                            };
                            textures.push(key);
                        }
                        let key = self.create_material(MaterialDesc {
                            name: format!("{}:{}", name, record.name),
                            ambient: record.ambient,
                            diffuse: record.diffuse,
                            specular: record.specular,
                            shininess: record.shininess,
                            opacity: record.opacity.clamp(0.0, 1.0),
                            shader,
                            textures,
                        })?;
                        created.materials.push(key);
                        material_keys.insert(material_index, key);
                        Some(key)
                    }
                },
                None => None,
            };

            let key = self.create_primitive(&format!("{}#{}", name, index), &part.topology(load_transform))?;
            created.primitives.push(key);
            if let Some(primitive) = self.primitives.get_mut(key) {
                primitive.set_material(material);
            }
            primitives.push(key);
        }

        Ok(primitives)
    }

    // ===== FONTS =====

    /// Load a G3DF font
    ///
    /// # Errors
    ///
    /// `Error::AssetNotFound` if the file does not exist.
    pub fn load_font<P: AsRef<Path>>(&mut self, path: P, shader: Option<ShaderKey>) -> Result<FontKey> {
        let path = path.as_ref();
        let asset = FontAsset::load(path)?;
        self.build_font(&path.display().to_string(), &asset, shader)
    }

    /// Register a decoded font: atlas texture, one material, 256 glyph quads
    pub fn build_font(&mut self, name: &str, asset: &FontAsset, shader: Option<ShaderKey>) -> Result<FontKey> {
        let mut created = Created::default();
        match self.build_font_parts(name, asset, shader, &mut created) {
            Ok((texture, material)) => {
                let font = Font::new(name, asset, created.primitives.clone(), material, texture);
                Ok(self.fonts.add(font))
            }
            Err(error) => {
                self.discard(created);
                Err(error)
            }
        }
    }

    fn build_font_parts(
        &mut self,
        name: &str,
        asset: &FontAsset,
        shader: Option<ShaderKey>,
        created: &mut Created,
    ) -> Result<(TextureKey, MaterialKey)> {
        let texture = self.create_texture(name, asset.width, asset.height, asset.pixels.clone())?;
        created.textures.push(texture);
        let material = self.create_material(MaterialDesc {
            name: name.to_string(),
            shader,
            textures: vec![texture],
            ..Default::default()
        })?;
        created.materials.push(material);

        for code in 0..asset.glyphs.len() {
            let key = self.create_primitive(&format!("{}#{}", name, code), &asset.glyph_topology(code as u8))?;
            created.primitives.push(key);
            if let Some(primitive) = self.primitives.get_mut(key) {
                primitive.set_material(Some(material));
            }
        }
        Ok((texture, material))
    }

    fn discard(&mut self, created: Created) {
        for key in created.primitives {
            self.primitives.remove(key);
        }
        for key in created.materials {
            self.materials.remove(key);
        }
        for key in created.textures {
            self.textures.remove(key);
        }
    }

    // ===== TEARDOWN =====

    /// Destroy every resource, key holders before the resources they refer to
    ///
    /// Returns the number of resources destroyed; a second call returns 0.
    pub fn shutdown(&mut self) -> usize {
        self.fonts.clear()
            + self.primitive_sets.clear()
            + self.primitives.clear()
            + self.materials.clear()
            + self.shaders.clear()
            + self.textures.clear()
    }
}

#[cfg(test)]
#[path = "resources_tests.rs"]
mod tests;

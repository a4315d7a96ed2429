//! Resource management module
//!
//! GPU-backed resources (shaders, textures, primitives), the plain data that
//! refers to them (materials, primitive sets, fonts), the builders and asset
//! decoders that produce them, and the pools that own them.

mod binary_reader;
mod resource_manager;
pub mod font;
pub mod image;
pub mod material;
pub mod model;
pub mod primitive;
pub mod resources;
pub mod shader;
pub mod texture;
pub mod topology;

pub use resource_manager::{
    FontKey, MaterialKey, PrimitiveKey, PrimitiveSetKey, Resource, ResourceManager, ShaderKey,
    TextureKey,
};
pub use font::{Font, FontAsset, GLYPH_COUNT};
pub use self::image::Image;
pub use material::{uniforms, Material, MaterialDesc, MAX_MATERIAL_TEXTURES};
pub use model::{ModelAsset, ModelMaterial, ModelPart, ModelTexture, MODEL_TEXTURE_SLOTS};
pub use primitive::{Primitive, PrimitiveSet};
pub use resources::Resources;
pub use shader::{Shader, ShaderOrigin};
pub use texture::Texture;
pub use topology::{Topology, TopologyKind, Vertex, RESTART_INDEX};

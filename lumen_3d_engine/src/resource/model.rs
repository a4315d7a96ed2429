//! G3DM model asset decoding.
//!
//! A G3DM file holds every part of one model, the materials the parts refer
//! to by file-local index and the textures the materials refer to the same
//! way. All fields are little-endian.
//!
//! ```text
//! "G3DM"  u32 parts  u32 materials  u32 textures
//! parts ×     u32 vertex_count  u32 index_count  u32 material_index
//!             vertex_count × Vertex (48 bytes)  index_count × i32
//! materials × name[300]  ka kd ks (3 × f32)  ph  trans  tex[8] i32
//!             shader[300]  i32 shader_index                 (680 bytes)
//! textures ×  name[300]  u32 width  u32 height  u32 id
//!             width × height × 4 BGRA bytes
//! ```
//!
//! Decoding is pure; `Resources::load_primitive_set` turns a `ModelAsset`
//! into GPU resources.

use std::fs;
use std::path::Path;
use glam::{Mat4, Vec3};
use crate::error::{Error, Result};
use crate::resource::binary_reader::BinaryReader;
use crate::resource::{Topology, Vertex};

/// Bytes in a fixed-size name field
const NAME_LEN: usize = 300;
/// Texture slots per material record
pub const MODEL_TEXTURE_SLOTS: usize = 8;
const MATERIAL_RECORD_LEN: usize = NAME_LEN * 2 + 4 * (9 + 2 + MODEL_TEXTURE_SLOTS + 1);
const VERTEX_LEN: usize = std::mem::size_of::<Vertex>();

/// One drawable part
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPart {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<i32>,
    /// File-local material index
    pub material_index: u32,
}

impl ModelPart {
    /// Triangle-list topology with `transform` baked into positions and normals
    pub fn topology(&self, transform: &Mat4) -> Topology {
        let mut topology = Topology::trimesh(self.vertices.clone(), self.indices.clone());
        if *transform != Mat4::IDENTITY {
            topology.transform(transform);
        }
        topology
    }
}

/// Material record
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMaterial {
    pub name: String,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
    pub opacity: f32,
    /// File-local texture indices, -1 for an empty slot
    pub textures: [i32; MODEL_TEXTURE_SLOTS],
    pub shader: String,
    pub shader_index: i32,
}

impl ModelMaterial {
    /// Texture indices of the used slots, in slot order
    pub fn texture_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.textures.iter().filter(|&&t| t >= 0).map(|&t| t as usize)
    }
}

/// Texture record
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub id: u32,
    pub pixels: Vec<u8>,
}

/// Decoded G3DM file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelAsset {
    pub parts: Vec<ModelPart>,
    pub materials: Vec<ModelMaterial>,
    pub textures: Vec<ModelTexture>,
}

impl ModelAsset {
    /// Read and decode a G3DM file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::AssetNotFound(format!("{}: {}", path.display(), e)))?;
        Self::decode(&bytes)
    }

    /// Decode G3DM bytes
    ///
    /// # Errors
    ///
    /// `Error::InvalidAsset` on a bad signature, a truncated record or a
    /// part index outside its vertex range.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(bytes, "G3DM");
        reader.magic(b"G3DM")?;
        let part_count = reader.count()?;
        let material_count = reader.count()?;
        let texture_count = reader.count()?;

        let parts = reader.array(part_count, 12, |r| {
            let vertex_count = r.count()?;
            let index_count = r.count()?;
            let material_index = r.u32()?;
            let vertices = r.array(vertex_count, VERTEX_LEN, BinaryReader::vertex)?;
            let indices = r.array(index_count, 4, BinaryReader::i32)?;
            if let Some(bad) = indices.iter().find(|&&i| i < 0 || i as usize >= vertex_count) {
                return Err(Error::InvalidAsset(format!(
                    "G3DM: index {} out of range for {} vertices",
                    bad, vertex_count
                )));
            }
            Ok(ModelPart { vertices, indices, material_index })
        })?;

        let materials = reader.array(material_count, MATERIAL_RECORD_LEN, |r| {
            let name = r.fixed_str(NAME_LEN)?;
            let ambient = r.vec3()?;
            let diffuse = r.vec3()?;
            let specular = r.vec3()?;
            let shininess = r.f32()?;
            let opacity = r.f32()?;
            let mut textures = [-1; MODEL_TEXTURE_SLOTS];
            for slot in &mut textures {
                *slot = r.i32()?;
            }
            Ok(ModelMaterial {
                name,
                ambient,
                diffuse,
                specular,
                shininess,
                opacity,
                textures,
                shader: r.fixed_str(NAME_LEN)?,
                shader_index: r.i32()?,
            })
        })?;

        let textures = reader.array(texture_count, NAME_LEN + 12, |r| {
            let name = r.fixed_str(NAME_LEN)?;
            let width = r.u32()?;
            let height = r.u32()?;
            let id = r.u32()?;
            let size = (width as usize)
                .checked_mul(height as usize)
                .and_then(|n| n.checked_mul(4))
                .ok_or_else(|| Error::InvalidAsset(format!("G3DM: texture '{}' is too large", name)))?;
            let pixels = r.take(size)?.to_vec();
            Ok(ModelTexture { name, width, height, id, pixels })
        })?;

        if reader.remaining() != 0 {
            crate::engine_warn!("lumen3d::ModelAsset", "{} trailing bytes after G3DM data", reader.remaining());
        }

        Ok(Self { parts, materials, textures })
    }

    /// Bounding box of every part, optionally through a load transform
    pub fn bounds(&self, transform: &Mat4) -> (Vec3, Vec3) {
        let mut points = self
            .parts
            .iter()
            .flat_map(|part| part.vertices.iter())
            .map(|v| transform.transform_point3(v.position()));
        match points.next() {
            Some(first) => points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))),
            None => (Vec3::ZERO, Vec3::ZERO),
        }
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;

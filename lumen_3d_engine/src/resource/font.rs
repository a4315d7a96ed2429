//! Bitmap fonts (G3DF).
//!
//! ```text
//! "G3DF"  u32 line_height  u32 base_height
//! 256 × f32 advance
//! 256 × 4 × Vertex (one quad per character code)
//! u32 width  u32 height  width × height × 4 BGRA atlas
//! ```
//!
//! `FontAsset` is the decoded file. `Font` is the registered resource: one
//! glyph primitive per character code, all sharing one atlas material.

use std::fs;
use std::path::Path;
use crate::error::{Error, Result};
use crate::resource::binary_reader::BinaryReader;
use crate::resource::{MaterialKey, PrimitiveKey, Resource, TextureKey, Topology, TopologyKind, Vertex};

/// Character codes covered by a font
pub const GLYPH_COUNT: usize = 256;

/// Decoded G3DF file
#[derive(Debug, Clone, PartialEq)]
pub struct FontAsset {
    pub line_height: u32,
    pub base_height: u32,
    /// Horizontal advance per character code
    pub advance: Vec<f32>,
    /// Glyph quad per character code, in strip order
    pub glyphs: Vec<[Vertex; 4]>,
    pub width: u32,
    pub height: u32,
    /// BGRA atlas, bottom row first
    pub pixels: Vec<u8>,
}

impl FontAsset {
    /// Read and decode a G3DF file
    ///
    /// # Errors
    ///
    /// `Error::AssetNotFound` if the file cannot be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| Error::AssetNotFound(format!("font file {}: {}", path.display(), e)))?;
        Self::decode(&bytes)
    }

    /// Decode G3DF bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(bytes, "G3DF");
        reader.magic(b"G3DF")?;
        let line_height = reader.u32()?;
        let base_height = reader.u32()?;
        let advance = reader.array(GLYPH_COUNT, 4, BinaryReader::f32)?;
        let glyphs = reader.array(GLYPH_COUNT, std::mem::size_of::<[Vertex; 4]>(), |r| {
            Ok([r.vertex()?, r.vertex()?, r.vertex()?, r.vertex()?])
        })?;
        let width = reader.u32()?;
        let height = reader.u32()?;
        let size = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| Error::InvalidAsset(format!("G3DF: {}x{} atlas is too large", width, height)))?;
        let pixels = reader.take(size)?.to_vec();

        Ok(Self { line_height, base_height, advance, glyphs, width, height, pixels })
    }

    /// Strip topology of one glyph quad
    pub fn glyph_topology(&self, code: u8) -> Topology {
        Topology::new(TopologyKind::TriangleStrip, self.glyphs[code as usize].to_vec(), vec![0, 1, 2, 3])
    }
}

/// Registered font: glyph primitives plus their shared atlas material
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    name: String,
    line_height: u32,
    base_height: u32,
    advance: Vec<f32>,
    glyphs: Vec<PrimitiveKey>,
    material: MaterialKey,
    texture: TextureKey,
}

impl Font {
    pub(crate) fn new(
        name: &str,
        asset: &FontAsset,
        glyphs: Vec<PrimitiveKey>,
        material: MaterialKey,
        texture: TextureKey,
    ) -> Self {
        Self {
            name: name.to_string(),
            line_height: asset.line_height,
            base_height: asset.base_height,
            advance: asset.advance.clone(),
            glyphs,
            material,
            texture,
        }
    }

    /// Glyph primitive for a character code
    pub fn glyph(&self, code: u8) -> Option<PrimitiveKey> {
        self.glyphs.get(code as usize).copied()
    }

    /// Horizontal advance for a character code
    pub fn advance(&self, code: u8) -> f32 {
        self.advance.get(code as usize).copied().unwrap_or(0.0)
    }

    pub fn line_height(&self) -> u32 {
        self.line_height
    }

    pub fn base_height(&self) -> u32 {
        self.base_height
    }

    pub fn glyphs(&self) -> &[PrimitiveKey] {
        &self.glyphs
    }

    pub fn material(&self) -> MaterialKey {
        self.material
    }

    pub fn texture(&self) -> TextureKey {
        self.texture
    }
}

impl Resource for Font {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "font_tests.rs"]
mod tests;

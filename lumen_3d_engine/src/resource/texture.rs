/// Texture resource.
///
/// Wraps one GPU image, 2D or cube map. A texture is immutable once created:
/// resizing means creating a new texture. The GPU handle is released when
/// the texture is dropped.

use std::path::Path;
use crate::error::{Error, Result};
use crate::graphics_device::{
    lock_device, lock_device_for_release, SharedDevice, TextureData, TextureDesc,
    TextureFilter, TextureFormat, TextureHandle, TextureKind,
};
use crate::resource::{Image, Resource};

/// GPU texture
pub struct Texture {
    name: String,
    width: u32,
    height: u32,
    kind: TextureKind,
    format: TextureFormat,
    handle: Option<TextureHandle>,
    device: SharedDevice,
}

impl Texture {
    /// Create a texture from a descriptor (internal use by the constructors below)
    fn create(device: &SharedDevice, name: &str, desc: TextureDesc) -> Result<Self> {
        let handle = lock_device(device)?.create_texture(&desc)?;
        crate::engine_trace!("lumen3d::Texture", "Created '{}' {}x{} {:?}", name, desc.width, desc.height, desc.kind);
        Ok(Self {
            name: name.to_string(),
            width: desc.width,
            height: desc.height,
            kind: desc.kind,
            format: desc.format,
            handle: Some(handle),
            device: device.clone(),
        })
    }

    /// 2D texture from BGRA8 pixels (bottom row first), mipmapped with linear filtering
    pub fn from_pixels(device: &SharedDevice, name: &str, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::InvalidResource(format!(
                "texture '{}': {}x{} needs {} bytes, got {}",
                name, width, height, expected, pixels.len()
            )));
        }
        Self::create(device, name, TextureDesc {
            width,
            height,
            kind: TextureKind::Tex2D,
            format: TextureFormat::B8G8R8A8_UNORM,
            data: Some(TextureData::Single(pixels)),
            mipmaps: true,
            filter: TextureFilter::Linear,
        })
    }

    /// 2D texture from a decoded image
    pub fn from_image(device: &SharedDevice, name: &str, image: &Image) -> Result<Self> {
        Self::from_pixels(device, name, image.width, image.height, image.pixels.clone())
    }

    /// 2D texture from an image file (BMP, G24 or G32)
    pub fn load<P: AsRef<Path>>(device: &SharedDevice, name: &str, path: P) -> Result<Self> {
        let image = Image::load(path)?;
        Self::from_image(device, name, &image)
    }

    /// Empty floating-point color target
    pub fn render_target(device: &SharedDevice, name: &str, width: u32, height: u32) -> Result<Self> {
        Self::create(device, name, TextureDesc {
            width,
            height,
            kind: TextureKind::Tex2D,
            format: TextureFormat::R32G32B32A32_SFLOAT,
            data: None,
            mipmaps: false,
            filter: TextureFilter::Nearest,
        })
    }

    /// Empty depth target
    pub fn depth_target(device: &SharedDevice, name: &str, width: u32, height: u32) -> Result<Self> {
        Self::create(device, name, TextureDesc {
            width,
            height,
            kind: TextureKind::Tex2D,
            format: TextureFormat::D32_FLOAT,
            data: None,
            mipmaps: false,
            filter: TextureFilter::Nearest,
        })
    }

    /// Cube map from six equally sized faces given as +X, -X, +Y, -Y, +Z, -Z
    ///
    /// The Y faces are uploaded swapped (+Y image into the -Y slot and back).
    pub fn cube_from_images(device: &SharedDevice, name: &str, faces: &[Image; 6]) -> Result<Self> {
        let (width, height) = (faces[0].width, faces[0].height);
        if faces.iter().any(|f| f.width != width || f.height != height) {
            return Err(Error::InvalidResource(format!("cube map '{}': faces differ in size", name)));
        }
        let order = [0usize, 1, 3, 2, 4, 5];
        let data = order.iter().map(|&i| faces[i].pixels.clone()).collect();
        Self::create(device, name, TextureDesc {
            width,
            height,
            kind: TextureKind::Cube,
            format: TextureFormat::B8G8R8A8_UNORM,
            data: Some(TextureData::CubeFaces(data)),
            mipmaps: true,
            filter: TextureFilter::Linear,
        })
    }

    // ===== ACCESSORS =====

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// GPU handle
    pub fn handle(&self) -> Option<TextureHandle> {
        self.handle
    }
}

impl Resource for Texture {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            lock_device_for_release(&self.device).destroy_texture(handle);
        }
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;

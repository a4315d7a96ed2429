//! Decoded image: width, height and tightly packed BGRA8 pixels.
//!
//! Every source ends up in the layout a 32-bit DIB has in memory: bytes in
//! B, G, R, A order and the bottom row first. Textures upload it as
//! `B8G8R8A8_UNORM`.
//!
//! ```text
//! BMP  "BM" header            decoded through the `image` crate, then reordered
//! G24  u16 w, u16 h, w*h*3    BGR as stored, alpha forced to 255
//! G32  u16 w, u16 h, w*h*4    BGRA as stored
//! ```
//!
//! G24 and G32 share their header and are told apart by the payload size.

use std::fs;
use std::path::Path;
use image::ImageFormat;
use crate::error::{Error, Result};

/// BGRA8 image in memory
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, bottom row first
    pub pixels: Vec<u8>,
}

impl Image {
    /// Build an image from BGRA pixels, checking the buffer size
    pub fn from_bgra(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::InvalidAsset(format!(
                "{}x{} image needs {} bytes, got {}",
                width, height, expected, pixels.len()
            )));
        }
        Ok(Self { width, height, pixels })
    }

    /// Read and decode an image file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| Error::AssetNotFound(format!("{}: {}", path.display(), e)))?;
        Self::decode(&bytes).map_err(|e| match e {
            Error::InvalidAsset(msg) => Error::InvalidAsset(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Decode an image from memory
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(b"BM") {
            return decode_bmp(bytes);
        }
        decode_raw(bytes)
    }
}

/// `image` yields top-down RGB(A); rows are reversed and red/blue swapped
fn decode_bmp(bytes: &[u8]) -> Result<Image> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Bmp)
        .map_err(|e| Error::InvalidAsset(format!("BMP: {}", e)))?
        .to_rgb8();
    let (width, height) = decoded.dimensions();
    let row_bytes = width as usize * 3;
    let pixels = decoded
        .as_raw()
        .chunks_exact(row_bytes.max(1))
        .rev()
        .flat_map(|row| row.chunks_exact(3).flat_map(|rgb| [rgb[2], rgb[1], rgb[0], 255]))
        .collect();
    Ok(Image { width, height, pixels })
}

fn decode_raw(bytes: &[u8]) -> Result<Image> {
    if bytes.len() < 4 {
        return Err(Error::InvalidAsset("file too short for a G24/G32 header".to_string()));
    }
    let width = u16::from_le_bytes([bytes[0], bytes[1]]) as u32;
    let height = u16::from_le_bytes([bytes[2], bytes[3]]) as u32;
    let payload = &bytes[4..];
    let texels = width as usize * height as usize;

    if payload.len() == texels * 4 {
        return Ok(Image { width, height, pixels: payload.to_vec() });
    }
    if payload.len() == texels * 3 {
        let pixels = payload
            .chunks_exact(3)
            .flat_map(|bgr| [bgr[0], bgr[1], bgr[2], 255])
            .collect();
        return Ok(Image { width, height, pixels });
    }
    Err(Error::InvalidAsset(format!(
        "unrecognized image: {}x{} header with {} payload bytes",
        width, height, payload.len()
    )))
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;

//! Little-endian cursor over an in-memory asset file

use crate::error::{Error, Result};
use crate::resource::Vertex;

pub(crate) struct BinaryReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    asset: &'static str,
}

impl<'a> BinaryReader<'a> {
    pub(crate) fn new(bytes: &'a [u8], asset: &'static str) -> Self {
        Self { bytes, offset: 0, asset }
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(len).filter(|&end| end <= self.bytes.len()).ok_or_else(|| {
            Error::InvalidAsset(format!(
                "{}: truncated at byte {} (wanted {} more, {} left)",
                self.asset,
                self.offset,
                len,
                self.bytes.len() - self.offset
            ))
        })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub(crate) fn magic(&mut self, expected: &[u8; 4]) -> Result<()> {
        let found = self.take(4)?;
        if found != expected {
            return Err(Error::InvalidAsset(format!(
                "{}: bad signature {:?}",
                self.asset,
                String::from_utf8_lossy(found)
            )));
        }
        Ok(())
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn i32(&mut self) -> Result<i32> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn f32(&mut self) -> Result<f32> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn vec3(&mut self) -> Result<glam::Vec3> {
        Ok(glam::Vec3::new(self.f32()?, self.f32()?, self.f32()?))
    }

    /// Count field used to size a following array
    pub(crate) fn count(&mut self) -> Result<usize> {
        Ok(self.u32()? as usize)
    }

    /// Zero-terminated string stored in a fixed-size field
    pub(crate) fn fixed_str(&mut self, len: usize) -> Result<String> {
        let raw = self.take(len)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }

    pub(crate) fn vertex(&mut self) -> Result<Vertex> {
        let mut floats = [0.0f32; 12];
        for f in &mut floats {
            *f = self.f32()?;
        }
        Ok(Vertex {
            position: [floats[0], floats[1], floats[2]],
            texcoord: [floats[3], floats[4]],
            normal: [floats[5], floats[6], floats[7]],
            color: [floats[8], floats[9], floats[10], floats[11]],
        })
    }

    /// `count` items read with `read`, checking first that the bytes exist
    pub(crate) fn array<T>(
        &mut self,
        count: usize,
        item_size: usize,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let needed = count.checked_mul(item_size).unwrap_or(usize::MAX);
        if needed > self.remaining() {
            return Err(Error::InvalidAsset(format!(
                "{}: {} items of {} bytes do not fit in the {} bytes left",
                self.asset,
                count,
                item_size,
                self.remaining()
            )));
        }
        (0..count).map(|_| read(self)).collect()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }
}

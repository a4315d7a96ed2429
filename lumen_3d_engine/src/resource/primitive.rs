//! Drawable primitives.
//!
//! A `Primitive` is a topology uploaded to the GPU: one vertex buffer, an
//! optional index buffer and the vertex array tying them to the standard
//! vertex layout. It draws with a local transform and an optional material.
//!
//! A `PrimitiveSet` groups primitive keys under a common transform, the way a
//! loaded model groups its parts.
//!
//! ```text
//! PrimitiveSet "car"
//! ├── transform
//! ├── bounds (min, max)
//! └── primitives
//!     ├── PrimitiveKey → Primitive "car#0" (material "paint")
//!     └── PrimitiveKey → Primitive "car#1" (material "glass")
//! ```

use glam::{Mat4, Vec3};
use crate::error::{Error, Result};
use crate::graphics_device::{
    lock_device, lock_device_for_release, BufferHandle, BufferUsage, GraphicsDevice,
    SharedDevice, VertexArrayHandle,
};
use crate::resource::{
    MaterialKey, PrimitiveKey, Resource, ResourceManager, Topology, TopologyKind, Vertex,
    RESTART_INDEX,
};

// ============================================================================
// PRIMITIVE
// ============================================================================

/// GPU geometry with a transform and a material
pub struct Primitive {
    name: String,
    kind: TopologyKind,
    vertex_count: u32,
    index_count: u32,
    transform: Mat4,
    material: Option<MaterialKey>,
    min: Vec3,
    max: Vec3,
    vertex_buffer: Option<BufferHandle>,
    index_buffer: Option<BufferHandle>,
    vertex_array: Option<VertexArrayHandle>,
    device: SharedDevice,
}

impl Primitive {
    /// Upload a topology
    ///
    /// Indices are stored as 32-bit unsigned values, so the restart sentinel
    /// `-1` becomes `u32::MAX`. No index buffer is created for an empty index
    /// list.
    ///
    /// # Errors
    ///
    /// `Error::InvalidResource` if an index is neither `-1` nor a valid
    /// vertex number, or the GPU error if an object cannot be created.
    pub fn new(device: &SharedDevice, name: &str, topology: &Topology) -> Result<Self> {
        let vertex_count = topology.vertices.len();
        if let Some(bad) = topology
            .indices
            .iter()
            .find(|&&i| i != RESTART_INDEX && (i < 0 || i as usize >= vertex_count))
        {
            return Err(Error::InvalidResource(format!(
                "primitive '{}': index {} out of range for {} vertices",
                name, bad, vertex_count
            )));
        }

        let layout = Vertex::layout()?;
        let (min, max) = topology.bounds();
        let mut primitive = Self {
            name: name.to_string(),
            kind: topology.kind,
            vertex_count: vertex_count as u32,
            index_count: topology.indices.len() as u32,
            transform: Mat4::IDENTITY,
            material: None,
            min,
            max,
            vertex_buffer: None,
            index_buffer: None,
            vertex_array: None,
            device: device.clone(),
        };

        // On failure `primitive` drops here and releases whatever was created
        {
            let mut gpu = lock_device(device)?;
            let vertex_buffer = gpu.create_buffer(BufferUsage::Vertex, bytemuck::cast_slice(&topology.vertices))?;
            primitive.vertex_buffer = Some(vertex_buffer);

            if !topology.indices.is_empty() {
                let indices: Vec<u32> = topology.indices.iter().map(|&i| i as u32).collect();
                primitive.index_buffer = Some(gpu.create_buffer(BufferUsage::Index, bytemuck::cast_slice(&indices))?);
            }

            primitive.vertex_array = Some(gpu.create_vertex_array(vertex_buffer, primitive.index_buffer, &layout)?);
        }

        crate::engine_trace!("lumen3d::Primitive", "Created '{}' ({} vertices, {} indices)",
            name, primitive.vertex_count, primitive.index_count);
        Ok(primitive)
    }

    /// Issue the draw call for the bound program
    ///
    /// Indexed primitives draw `index_count` indices, others `vertex_count`
    /// vertices. Leaves no vertex array bound.
    pub fn submit(&self, device: &mut dyn GraphicsDevice) {
        let Some(vertex_array) = self.vertex_array else {
            return;
        };
        device.bind_vertex_array(Some(vertex_array));
        if self.index_buffer.is_some() {
            device.draw_indexed(self.kind.primitive_topology(), self.index_count);
        } else {
            device.draw(self.kind.primitive_topology(), 0, self.vertex_count);
        }
        device.bind_vertex_array(None);
    }

    // ===== ACCESSORS =====

    pub fn kind(&self) -> TopologyKind {
        self.kind
    }

    /// Local transform applied after the owner's world transform
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    /// Material applied before drawing (`None` draws nothing)
    pub fn material(&self) -> Option<MaterialKey> {
        self.material
    }

    pub fn set_material(&mut self, material: Option<MaterialKey>) {
        self.material = material;
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// max(vertex_count, index_count)
    pub fn element_count(&self) -> u32 {
        self.vertex_count.max(self.index_count)
    }

    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    /// Object-space bounds of the uploaded vertices
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.min, self.max)
    }

    pub fn vertex_array(&self) -> Option<VertexArrayHandle> {
        self.vertex_array
    }

    pub fn vertex_buffer(&self) -> Option<BufferHandle> {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> Option<BufferHandle> {
        self.index_buffer
    }
}

impl Resource for Primitive {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Primitive {
    fn drop(&mut self) {
        let mut gpu = lock_device_for_release(&self.device);
        if let Some(vertex_array) = self.vertex_array.take() {
            gpu.destroy_vertex_array(vertex_array);
        }
        if let Some(buffer) = self.vertex_buffer.take() {
            gpu.destroy_buffer(buffer);
        }
        if let Some(buffer) = self.index_buffer.take() {
            gpu.destroy_buffer(buffer);
        }
    }
}

// ============================================================================
// PRIMITIVE SET
// ============================================================================

/// Named group of primitives drawn with a shared transform
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSet {
    name: String,
    primitives: Vec<PrimitiveKey>,
    transform: Mat4,
    min: Vec3,
    max: Vec3,
}

impl PrimitiveSet {
    pub fn new(name: &str, primitives: Vec<PrimitiveKey>) -> Self {
        Self {
            name: name.to_string(),
            primitives,
            transform: Mat4::IDENTITY,
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }

    /// Transform applied between the owner's world transform and each primitive
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    pub fn primitives(&self) -> &[PrimitiveKey] {
        &self.primitives
    }

    pub fn push(&mut self, primitive: PrimitiveKey) {
        self.primitives.push(primitive);
    }

    /// Union of member bounds (each under its own transform)
    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.min, self.max)
    }

    /// Recompute bounds from the live members; dead keys are ignored
    pub fn update_bounds(&mut self, primitives: &ResourceManager<PrimitiveKey, Primitive>) {
        let mut bounds: Option<(Vec3, Vec3)> = None;
        for primitive in self.primitives.iter().filter_map(|&key| primitives.get(key)) {
            let (lo, hi) = primitive.bounds();
            let a = primitive.transform().transform_point3(lo);
            let b = primitive.transform().transform_point3(hi);
            let (lo, hi) = (a.min(b), a.max(b));
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            });
        }
        (self.min, self.max) = bounds.unwrap_or((Vec3::ZERO, Vec3::ZERO));
    }
}

impl Resource for PrimitiveSet {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "primitive_tests.rs"]
mod tests;

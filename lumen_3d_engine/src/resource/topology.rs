//! Topology: transient vertex + index description used to build a Primitive.
//!
//! ```text
//! Topology
//! ├── kind        TriangleList | TriangleStrip
//! ├── vertices    Vec<Vertex>          (position, texcoord, normal, color)
//! ├── indices     Vec<i32>             (-1 restarts a strip)
//! └── grid        Option<(w, h)>       (row access + normals for grids)
//! ```
//!
//! Grid-shaped builders (grid, plane, sphere) lay vertices out row by row
//! and emit one triangle strip per pair of rows, separated by the restart
//! sentinel. The cube emits six such grids, one per face.

use std::f32::consts::PI;
use std::fs;
use std::path::Path;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::error::{Error, Result};
use crate::graphics_device::{PrimitiveTopology, VertexLayout};

/// Index value that restarts a triangle strip
pub const RESTART_INDEX: i32 = -1;

// ============================================================================
// Vertex
// ============================================================================

/// Standard vertex: position, texcoord, normal, color (48 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    /// Format descriptor matching the in-memory layout
    pub const FORMAT: &'static str = "f3f2f3f4";

    pub fn new(position: Vec3, texcoord: Vec2, normal: Vec3, color: Vec4) -> Self {
        Self {
            position: position.to_array(),
            texcoord: texcoord.to_array(),
            normal: normal.to_array(),
            color: color.to_array(),
        }
    }

    /// White vertex at `position`
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Vec2::ZERO, Vec3::ZERO, Vec4::ONE)
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }

    pub fn texcoord(&self) -> Vec2 {
        Vec2::from_array(self.texcoord)
    }

    /// Vertex layout parsed from `FORMAT`, checked against `size_of::<Vertex>()`
    pub fn layout() -> Result<VertexLayout> {
        let layout = VertexLayout::from_format(Self::FORMAT)?;
        let size = std::mem::size_of::<Vertex>() as u32;
        if layout.stride != size {
            return Err(Error::InvalidResource(format!(
                "vertex format '{}' describes {} bytes but Vertex is {} bytes",
                Self::FORMAT, layout.stride, size
            )));
        }
        Ok(layout)
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

// ============================================================================
// Topology
// ============================================================================

/// How indices are assembled into triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyKind {
    TriangleList,
    TriangleStrip,
}

impl TopologyKind {
    /// Graphics-device primitive mode
    pub fn primitive_topology(self) -> PrimitiveTopology {
        match self {
            TopologyKind::TriangleList => PrimitiveTopology::TriangleList,
            TopologyKind::TriangleStrip => PrimitiveTopology::TriangleStrip,
        }
    }
}

/// Vertex + index lists consumed once by `Primitive::new`
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    pub kind: TopologyKind,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<i32>,
    grid: Option<(usize, usize)>,
}

impl Topology {
    /// Arbitrary topology
    pub fn new(kind: TopologyKind, vertices: Vec<Vertex>, indices: Vec<i32>) -> Self {
        Self { kind, vertices, indices, grid: None }
    }

    /// Triangle list
    pub fn trimesh(vertices: Vec<Vertex>, indices: Vec<i32>) -> Self {
        Self::new(TopologyKind::TriangleList, vertices, indices)
    }

    /// `width` x `height` grid of default vertices, one strip per row pair
    ///
    /// Rows are separated by `RESTART_INDEX`; a 2x2 grid yields `[2, 0, 3, 1]`.
    pub fn grid(width: usize, height: usize) -> Self {
        let mut indices = Vec::with_capacity(height.saturating_sub(1) * (width * 2 + 1));
        let mut v = 0i32;
        for i in 0..height.saturating_sub(1) {
            for _ in 0..width {
                indices.push(v + width as i32);
                indices.push(v);
                v += 1;
            }
            if i + 2 < height {
                indices.push(RESTART_INDEX);
            }
        }
        Self {
            kind: TopologyKind::TriangleStrip,
            vertices: vec![Vertex::default(); width * height],
            indices,
            grid: Some((width, height)),
        }
    }

    /// Flat grid from `corner` spanning `side_w` (columns) and `side_h` (rows)
    pub fn plane(corner: Vec3, side_w: Vec3, side_h: Vec3, width: usize, height: usize) -> Self {
        let mut topology = Self::grid(width, height);
        let normal = side_w.cross(side_h).normalize_or_zero();
        let (du, dv) = (step(width), step(height));
        for i in 0..height {
            for j in 0..width {
                let (u, v) = (j as f32 * du, i as f32 * dv);
                topology.vertices[i * width + j] =
                    Vertex::new(corner + side_h * v + side_w * u, Vec2::new(u, v), normal, Vec4::ONE);
            }
        }
        topology
    }

    /// Latitude/longitude sphere of `radius` centered at the origin
    pub fn sphere(radius: f32, width: usize, height: usize) -> Self {
        let mut topology = Self::grid(width, height);
        let (du, dv) = (step(width), step(height));
        for i in 0..height {
            let theta = (height - 1 - i) as f32 * dv * PI;
            for j in 0..width {
                let phi = j as f32 * du * 2.0 * PI;
                let n = Vec3::new(theta.sin() * phi.sin(), theta.cos(), theta.sin() * phi.cos());
                topology.vertices[i * width + j] =
                    Vertex::new(n * radius, Vec2::new(j as f32 * du, i as f32 * dv), n, Vec4::ONE);
            }
        }
        topology
    }

    /// Box of the given extents centered at the origin, `fragments` x `fragments` per face
    pub fn cube(len_x: f32, len_y: f32, len_z: f32, fragments: usize) -> Self {
        let f = fragments.max(2);
        let mut vertices = Vec::with_capacity(f * f * 6);
        let mut indices = Vec::new();
        let d = step(f);

        for side in 0..6 {
            let shift = (side * f * f) as i32;
            let mut v = 0i32;
            for _ in 0..f - 1 {
                for _ in 0..f {
                    indices.push(shift + v + f as i32);
                    indices.push(shift + v);
                    v += 1;
                }
                indices.push(RESTART_INDEX);
            }

            let axis = side / 2;
            let sign = ((side % 2) * 2) as f32 - 1.0;
            for i in 0..f {
                for j in 0..f {
                    let (a, b) = (i as f32 * d, j as f32 * d);
                    let (position, normal) = match axis {
                        0 => (
                            Vec3::new(len_x * sign * 0.5, len_y * (a - 0.5), len_z * (b - 0.5)),
                            Vec3::new(sign, 0.0, 0.0),
                        ),
                        1 => (
                            Vec3::new(len_x * (a - 0.5), len_y * sign * 0.5, len_z * (b - 0.5)),
                            Vec3::new(0.0, sign, 0.0),
                        ),
                        _ => (
                            Vec3::new(len_x * (a - 0.5), len_y * (b - 0.5), len_z * sign * 0.5),
                            Vec3::new(0.0, 0.0, sign),
                        ),
                    };
                    vertices.push(Vertex::new(position, Vec2::new(a, b), normal, Vec4::ONE));
                }
            }
        }

        Self::new(TopologyKind::TriangleStrip, vertices, indices)
    }

    /// Triangle mesh from Wavefront OBJ text (`v` and `f` records only)
    ///
    /// Faces with more than three corners are fanned around their first corner.
    /// Negative corner indices count back from the last vertex read so far.
    pub fn from_obj(text: &str) -> Result<Self> {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for (number, line) in text.lines().enumerate() {
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    let coords: Vec<f32> = tokens
                        .take(3)
                        .map(|t| t.parse::<f32>())
                        .collect::<std::result::Result<_, _>>()
                        .map_err(|e| Error::InvalidAsset(format!("OBJ line {}: {}", number + 1, e)))?;
                    if coords.len() != 3 {
                        return Err(Error::InvalidAsset(format!("OBJ line {}: vertex needs 3 coordinates", number + 1)));
                    }
                    vertices.push(Vertex::at(Vec3::new(coords[0], coords[1], coords[2])));
                }
                Some("f") => {
                    let corners: Vec<i32> = tokens
                        .map(|t| obj_corner(t, vertices.len(), number + 1))
                        .collect::<Result<_>>()?;
                    if corners.len() < 3 {
                        return Err(Error::InvalidAsset(format!("OBJ line {}: face needs 3 corners", number + 1)));
                    }
                    for k in 1..corners.len() - 1 {
                        indices.extend_from_slice(&[corners[0], corners[k], corners[k + 1]]);
                    }
                }
                _ => {}
            }
        }

        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(Error::InvalidAsset(format!(
                "OBJ face references vertex {} of {}",
                bad + 1, vertices.len()
            )));
        }
        Ok(Self::trimesh(vertices, indices))
    }

    /// Triangle mesh from an OBJ file
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::AssetNotFound(format!("{}: {}", path.display(), e)))?;
        Self::from_obj(&text)
    }

    // ===== GRID ACCESS =====

    /// Grid dimensions (width, height) for grid-shaped topologies
    ///
    /// `None` once `vertices` no longer holds exactly `width * height` entries.
    pub fn grid_size(&self) -> Option<(usize, usize)> {
        self.grid.filter(|&(w, h)| w * h == self.vertices.len())
    }

    /// One row of a grid
    pub fn row(&self, row: usize) -> Option<&[Vertex]> {
        let (w, h) = self.grid_size()?;
        (row < h).then(|| &self.vertices[row * w..(row + 1) * w])
    }

    /// One row of a grid, mutable
    pub fn row_mut(&mut self, row: usize) -> Option<&mut [Vertex]> {
        let (w, h) = self.grid_size()?;
        if row < h {
            Some(&mut self.vertices[row * w..(row + 1) * w])
        } else {
            None
        }
    }

    /// Recompute grid normals as the flat average of adjacent quad triangles
    ///
    /// Does nothing for topologies that are not (or no longer) grids.
    pub fn eval_normals(&mut self) {
        let Some((w, h)) = self.grid_size() else {
            return;
        };
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        let p = |v: &[Vertex], i: usize, j: usize| v[i * w + j].position();

        for i in 0..h.saturating_sub(1) {
            for j in 0..w.saturating_sub(1) {
                let (p00, p01, p10, p11) = (
                    p(&self.vertices, i, j),
                    p(&self.vertices, i, j + 1),
                    p(&self.vertices, i + 1, j),
                    p(&self.vertices, i + 1, j + 1),
                );
                let n = (p00 - p10).cross(p11 - p10).normalize_or_zero();
                normals[i * w + j] += n;
                normals[(i + 1) * w + j] += n;
                normals[(i + 1) * w + j + 1] += n;

                let n = (p11 - p01).cross(p00 - p01).normalize_or_zero();
                normals[i * w + j] += n;
                normals[i * w + j + 1] += n;
                normals[(i + 1) * w + j + 1] += n;
            }
        }

        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = normal.normalize_or_zero().to_array();
        }
    }

    // ===== QUERIES / EDITS =====

    /// max(#vertices, #indices)
    pub fn element_count(&self) -> usize {
        self.vertices.len().max(self.indices.len())
    }

    /// Axis-aligned bounds of all vertex positions (zero when empty)
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut iter = self.vertices.iter().map(Vertex::position);
        match iter.next() {
            Some(first) => iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))),
            None => (Vec3::ZERO, Vec3::ZERO),
        }
    }

    /// Bake a transform into positions and normals
    pub fn transform(&mut self, matrix: &Mat4) {
        for vertex in &mut self.vertices {
            vertex.position = matrix.transform_point3(vertex.position()).to_array();
            vertex.normal = matrix.transform_vector3(vertex.normal()).normalize_or_zero().to_array();
        }
    }
}

/// Zero-based vertex index of one OBJ face corner (`v`, `v/vt`, `v//vn`, `v/vt/vn`)
///
/// `read_so_far` resolves negative indices; positive ones are range-checked
/// once the whole file is read.
fn obj_corner(token: &str, read_so_far: usize, line: usize) -> Result<i32> {
    let n: i64 = token
        .split('/')
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|e| Error::InvalidAsset(format!("OBJ line {}: {}", line, e)))?;
    let index = match n {
        0 => -1,
        n if n > 0 => n - 1,
        n => read_so_far as i64 + n,
    };
    i32::try_from(index)
        .ok()
        .filter(|&i| i >= 0)
        .ok_or_else(|| Error::InvalidAsset(format!("OBJ line {}: invalid vertex index {}", line, n)))
}

/// Parameter step for `count` samples spanning [0, 1]
fn step(count: usize) -> f32 {
    if count > 1 {
        1.0 / (count - 1) as f32
    } else {
        0.0
    }
}

#[cfg(test)]
#[path = "topology_tests.rs"]
mod tests;

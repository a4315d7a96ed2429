//! Scene graph nodes.
//!
//! A `SceneNode` owns its children by value, its emitters, and refers to
//! primitive sets by key. Transforms are column-vector (glam) matrices:
//!
//! ```text
//! world(node) = parent_transform(node) * local(node)
//! parent_transform(child) = world(node)
//! ```
//!
//! Propagation is eager: every `set_matrix`, `apply_matrix` and `add_child`
//! pushes the new world transform down the whole subtree before returning,
//! so `world()` is never stale.

use glam::Mat4;
use slotmap::new_key_type;
use crate::error::Result;
use crate::render::DrawContext;
use crate::resource::{PrimitiveSetKey, Resource};
use crate::scene::Emitter;
use crate::timer::FrameTime;

new_key_type! {
    /// Key of a root `SceneNode` in the render façade
    pub struct NodeKey;
}

/// Node of the transform hierarchy
pub struct SceneNode {
    name: String,
    local: Mat4,
    parent: Mat4,
    world: Mat4,
    children: Vec<SceneNode>,
    primitive_sets: Vec<PrimitiveSetKey>,
    emitters: Vec<Emitter>,
}

impl SceneNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            local: Mat4::IDENTITY,
            parent: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
            children: Vec::new(),
            primitive_sets: Vec::new(),
            emitters: Vec::new(),
        }
    }

    // ===== TRANSFORMS =====

    /// Replace the local transform
    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.local = matrix;
        self.propagate();
    }

    /// Compose `matrix` onto the local transform (applied after it)
    pub fn apply_matrix(&mut self, matrix: Mat4) {
        self.local = matrix * self.local;
        self.propagate();
    }

    /// Local transform
    pub fn local(&self) -> Mat4 {
        self.local
    }

    /// Accumulated transform of all ancestors
    pub fn parent_transform(&self) -> Mat4 {
        self.parent
    }

    /// Effective transform (`parent_transform * local`)
    pub fn world(&self) -> Mat4 {
        self.world
    }

    fn set_parent(&mut self, parent: Mat4) {
        self.parent = parent;
        self.propagate();
    }

    fn propagate(&mut self) {
        self.world = self.parent * self.local;
        let world = self.world;
        for child in &mut self.children {
            child.set_parent(world);
        }
    }

    // ===== CONTENT =====

    /// Take ownership of `child`, placing its subtree under this node
    ///
    /// Returns the index of the child.
    pub fn add_child(&mut self, mut child: SceneNode) -> usize {
        child.set_parent(self.world);
        self.children.push(child);
        self.children.len() - 1
    }

    pub fn add_primitive_set(&mut self, set: PrimitiveSetKey) {
        self.primitive_sets.push(set);
    }

    pub fn add_emitter(&mut self, emitter: Emitter) {
        self.emitters.push(emitter);
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    /// Children may be re-transformed freely: each keeps this node's world
    /// as its parent transform.
    pub fn children_mut(&mut self) -> &mut [SceneNode] {
        &mut self.children
    }

    pub fn primitive_sets(&self) -> &[PrimitiveSetKey] {
        &self.primitive_sets
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    pub fn emitters_mut(&mut self) -> &mut [Emitter] {
        &mut self.emitters
    }

    /// Depth-first search of this subtree by name
    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(name))
    }

    /// Number of nodes in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(SceneNode::subtree_len).sum::<usize>()
    }

    // ===== FRAME =====

    /// Update emitters with this node's world transform, then the children
    pub fn respond(&mut self, time: &FrameTime) {
        for emitter in &mut self.emitters {
            emitter.respond(&self.world, time);
        }
        for child in &mut self.children {
            child.respond(time);
        }
    }

    /// Draw primitive sets, then emitters, then children (pre-order)
    pub fn draw(&self, ctx: &mut DrawContext<'_>) -> Result<()> {
        for &set in &self.primitive_sets {
            ctx.draw_prims(set, &self.world)?;
        }
        for emitter in &self.emitters {
            emitter.draw(ctx)?;
        }
        for child in &self.children {
            child.draw(ctx)?;
        }
        Ok(())
    }
}

impl Resource for SceneNode {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;

/// Per-frame draw entry points.
///
/// A `DrawContext` borrows everything one draw needs: the locked device,
/// the resource pools, the camera and the frame time. Every higher level
/// draw (primitive sets, text, particles, scene nodes, emitters) ends in
/// `DrawContext::draw` or `DrawContext::draw_particle`.
///
/// Draws never fail because a program is missing: a material without a
/// linked shader skips the primitive. Keys that no longer resolve are
/// reported as `Error::StaleHandle`.

use glam::{Mat4, Vec3};
use crate::camera::Camera;
use crate::error::Result;
use crate::graphics_device::{
    CullMode, GraphicsDevice, PrimitiveTopology, ProgramHandle, TextureKind, UniformValue,
};
use crate::resource::{FontKey, Material, PrimitiveKey, PrimitiveSetKey, Resource, Resources};
use crate::scene::Particle;
use crate::timer::FrameTime;

/// Uniform names set by the draw paths (material coefficients excluded)
pub mod uniforms {
    /// World * view * projection
    pub const WVP: &str = "MatrWVP";
    /// World transform
    pub const WORLD: &str = "MatrW";
    /// View * projection
    pub const VIEW_PROJECTION: &str = "MatrVP";
    /// Pausable time in seconds
    pub const TIME: &str = "Time";
    pub const CAMERA_LOCATION: &str = "CamLoc";
    pub const CAMERA_DIRECTION: &str = "CamDir";
    pub const ROTATION: &str = "Rotation";
    pub const SIZE: &str = "Size";
    pub const POSITION: &str = "Position";
}

/// Set a uniform of `program` if the program uses it
pub(crate) fn set_uniform_if_present(
    device: &mut dyn GraphicsDevice,
    program: ProgramHandle,
    name: &str,
    value: UniformValue,
) {
    if let Some(location) = device.uniform_location(program, name) {
        device.set_uniform(location, value);
    }
}

/// Borrowed state of one draw pass
pub struct DrawContext<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub resources: &'a Resources,
    pub camera: &'a Camera,
    pub time: &'a FrameTime,
}

impl<'a> DrawContext<'a> {
    pub fn new(
        device: &'a mut dyn GraphicsDevice,
        resources: &'a Resources,
        camera: &'a Camera,
        time: &'a FrameTime,
    ) -> Self {
        Self { device, resources, camera, time }
    }

    /// Draw one primitive at `world`
    ///
    /// Applies the primitive's material, sets the transform, time and camera
    /// uniforms the program declares, then submits the primitive. Primitives
    /// without a material or whose material has no usable shader are skipped.
    pub fn draw(&mut self, primitive: PrimitiveKey, world: &Mat4) -> Result<()> {
        let resources = self.resources;
        let primitive = resources.primitives.try_get(primitive)?;
        let Some(material) = primitive.material() else {
            return Ok(());
        };
        let material = resources.materials.try_get(material)?;

        let Some(program) = material.apply(&mut *self.device, &resources.shaders, &resources.textures)? else {
            crate::engine_trace!("lumen3d::DrawContext", "Skipping unshaded primitive '{}'", primitive.name());
            return Ok(());
        };

        let wvp = self.camera.view_projection() * *world;
        let values = [
            (uniforms::WVP, UniformValue::Mat4(wvp)),
            (uniforms::WORLD, UniformValue::Mat4(*world)),
            (uniforms::TIME, UniformValue::Float(self.time.time as f32)),
            (uniforms::CAMERA_LOCATION, UniformValue::Vec3(self.camera.location())),
            (uniforms::CAMERA_DIRECTION, UniformValue::Vec3(self.camera.direction())),
        ];
        for (name, value) in values {
            set_uniform_if_present(&mut *self.device, program, name, value);
        }

        primitive.submit(&mut *self.device);
        self.device.use_program(None);
        Ok(())
    }

    /// Draw a primitive set at `world`
    ///
    /// Opaque primitives are drawn once. Transparent ones are drawn after
    /// them twice, back faces first (front-face culling) then front faces
    /// (back-face culling). A primitive without a material counts as opaque.
    pub fn draw_prims(&mut self, set: PrimitiveSetKey, world: &Mat4) -> Result<()> {
        let resources = self.resources;
        let set = resources.primitive_sets.try_get(set)?;
        let set_world = *world * set.transform();

        let mut opaque = Vec::with_capacity(set.primitives().len());
        let mut transparent = Vec::new();
        for &key in set.primitives() {
            let primitive = resources.primitives.try_get(key)?;
            let is_opaque = primitive
                .material()
                .and_then(|m| resources.materials.get(m))
                .map_or(true, Material::is_opaque);
            let entry = (key, set_world * primitive.transform());
            if is_opaque {
                opaque.push(entry);
            } else {
                transparent.push(entry);
            }
        }

        for (key, world) in &opaque {
            self.draw(*key, world)?;
        }

        self.device.set_cull_mode(CullMode::Front);
        for (key, world) in &transparent {
            self.draw(*key, world)?;
        }
        self.device.set_cull_mode(CullMode::Back);
        for (key, world) in &transparent {
            self.draw(*key, world)?;
        }
        self.device.set_cull_mode(CullMode::None);
        Ok(())
    }

    /// Draw `text` with one glyph quad per byte
    ///
    /// `\n` returns to x = 0 one unit lower. Characters outside Latin-1 are
    /// drawn as `?`.
    pub fn draw_text(&mut self, font: FontKey, text: &str, world: &Mat4) -> Result<()> {
        let resources = self.resources;
        let font = resources.fonts.try_get(font)?;
        let mut position = Vec3::ZERO;

        for ch in text.chars() {
            if ch == '\n' {
                position.x = 0.0;
                position.y -= 1.0;
                continue;
            }
            let code = u8::try_from(u32::from(ch)).unwrap_or(b'?');
            if let Some(glyph) = font.glyph(code) {
                self.draw(glyph, &(*world * Mat4::from_translation(position)))?;
            }
            position.x += font.advance(code);
        }
        Ok(())
    }

    /// Draw one particle as a single point expanded by its shader
    ///
    /// Particles without a linked shader or without a texture are skipped.
    pub fn draw_particle(&mut self, particle: &Particle) -> Result<()> {
        let resources = self.resources;
        let Some(program) = particle
            .shader
            .and_then(|key| resources.shaders.get(key))
            .and_then(|shader| shader.program())
        else {
            return Ok(());
        };
        let Some(texture) = particle
            .texture
            .and_then(|key| resources.textures.get(key))
            .and_then(|texture| texture.handle())
        else {
            return Ok(());
        };

        self.device.use_program(Some(program));
        self.device.bind_texture(0, TextureKind::Tex2D, texture);

        let values = [
            (uniforms::WORLD, UniformValue::Mat4(particle.transform)),
            (uniforms::VIEW_PROJECTION, UniformValue::Mat4(self.camera.view_projection())),
            (crate::resource::uniforms::OPACITY, UniformValue::Float(particle.opacity.value)),
            (uniforms::ROTATION, UniformValue::Float(particle.rotation.value)),
            (uniforms::SIZE, UniformValue::Float(particle.size.value)),
            (uniforms::POSITION, UniformValue::Vec3(particle.position.value)),
            (uniforms::CAMERA_LOCATION, UniformValue::Vec3(self.camera.location())),
        ];
        for (name, value) in values {
            set_uniform_if_present(&mut *self.device, program, name, value);
        }

        self.device.bind_vertex_array(None);
        self.device.draw(PrimitiveTopology::PointList, 0, 1);
        self.device.use_program(None);
        Ok(())
    }
}

#[cfg(test)]
#[path = "draw_context_tests.rs"]
mod tests;

/// Skybox - a unit cube drawn around the camera with a cube-map texture.
///
/// The cube, its shader and its material live in the shared resource pools
/// like any other resource; the skybox only keeps their keys.

use glam::Mat4;
use crate::config::SkyboxFaces;
use crate::error::Result;
use crate::graphics_device::{TextureKind, UniformValue};
use crate::render::draw_context::{set_uniform_if_present, uniforms, DrawContext};
use crate::resource::{
    Image, MaterialDesc, MaterialKey, PrimitiveKey, Resources, ShaderKey, TextureKey, Topology,
};

pub struct Skybox {
    shader: ShaderKey,
    material: MaterialKey,
    cube: PrimitiveKey,
    textures: Vec<TextureKey>,
}

impl Skybox {
    /// Load the skybox shader and build the cube
    pub fn new(resources: &mut Resources, shader_prefix: &str) -> Result<Self> {
        let shader = resources.create_shader(shader_prefix)?;
        let material = resources.create_material(MaterialDesc {
            name: "skybox".to_string(),
            shader: Some(shader),
            ..Default::default()
        })?;
        let cube = resources.create_primitive("skybox", &Topology::cube(1.0, 1.0, 1.0, 2))?;
        if let Some(primitive) = resources.primitives.get_mut(cube) {
            primitive.set_material(Some(material));
        }
        Ok(Self { shader, material, cube, textures: Vec::new() })
    }

    /// Load six face images as a new cube map
    ///
    /// Only the first cube map added is drawn.
    pub fn add_sky_texture(&mut self, resources: &mut Resources, faces: &SkyboxFaces) -> Result<TextureKey> {
        let [xp, xn, yp, yn, zp, zn] = faces.paths();
        let images = [
            Image::load(xp)?,
            Image::load(xn)?,
            Image::load(yp)?,
            Image::load(yn)?,
            Image::load(zp)?,
            Image::load(zn)?,
        ];
        let key = resources.create_cube_texture(&faces.directory.display().to_string(), &images)?;
        self.textures.push(key);
        crate::engine_debug!("lumen3d::Skybox", "Added sky texture from '{}'", faces.directory.display());
        Ok(key)
    }

    /// Draw the cube with depth writes disabled
    ///
    /// Nothing is drawn until a sky texture has been added or when the
    /// skybox shader failed to link.
    pub fn draw(&self, ctx: &mut DrawContext<'_>) -> Result<()> {
        let resources = ctx.resources;
        let Some(program) = resources.shaders.get(self.shader).and_then(|s| s.program()) else {
            return Ok(());
        };
        let Some(texture) = self
            .textures
            .first()
            .and_then(|&key| resources.textures.get(key))
            .and_then(|t| t.handle())
        else {
            return Ok(());
        };
        let cube = resources.primitives.try_get(self.cube)?;

        ctx.device.use_program(Some(program));
        ctx.device.bind_texture(0, TextureKind::Cube, texture);

        let wvp: Mat4 = ctx.camera.view_projection();
        set_uniform_if_present(&mut *ctx.device, program, uniforms::WVP, UniformValue::Mat4(wvp));
        set_uniform_if_present(&mut *ctx.device, program, uniforms::TIME, UniformValue::Float(ctx.time.time as f32));
        set_uniform_if_present(
            &mut *ctx.device,
            program,
            uniforms::CAMERA_LOCATION,
            UniformValue::Vec3(ctx.camera.location()),
        );

        ctx.device.set_depth_write(false);
        cube.submit(&mut *ctx.device);
        ctx.device.set_depth_write(true);
        ctx.device.use_program(None);
        Ok(())
    }

    pub fn shader(&self) -> ShaderKey {
        self.shader
    }

    pub fn material(&self) -> MaterialKey {
        self.material
    }

    pub fn cube(&self) -> PrimitiveKey {
        self.cube
    }

    pub fn textures(&self) -> &[TextureKey] {
        &self.textures
    }
}

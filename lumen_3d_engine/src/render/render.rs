/// Render façade.
///
/// `Render` composes the resource pools, the scene pools (root nodes and
/// free emitters), the pipeline and the camera. It is created once by the
/// application and passed explicitly to whatever builds or drives scene
/// content; nothing in the engine reaches it through a global.
///
/// Frame sequence (`render_frame`):
///
/// ```text
/// hot reload -> unit.respond() -> pipeline.start -> unit.draw() -> pipeline.end
/// ```
///
/// `shutdown` (also run on drop) destroys everything in dependency order:
/// nodes, emitters, fonts, primitive sets, primitives, materials, shaders,
/// textures and finally the offscreen targets.

use std::path::Path;
use glam::{Mat4, Vec3};
use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::graphics_device::{lock_device, ShaderStageSource, SharedDevice};
use crate::render::{DrawContext, Pipeline};
use crate::resource::{
    FontKey, Image, MaterialDesc, MaterialKey, PrimitiveKey, PrimitiveSetKey, ResourceManager,
    Resources, ShaderKey, TextureKey, Topology,
};
use crate::scene::{Emitter, EmitterKey, NodeKey, SceneNode, Unit};
use crate::timer::FrameTime;

pub struct Render {
    device: SharedDevice,
    config: RenderConfig,
    resources: Resources,
    nodes: ResourceManager<NodeKey, SceneNode>,
    emitters: ResourceManager<EmitterKey, Emitter>,
    pipeline: Pipeline,
    camera: Camera,
    time: FrameTime,
    last_shader_reload: f64,
}

impl Render {
    /// Set up global render state, the default camera and the pipeline
    pub fn new(device: SharedDevice, config: RenderConfig) -> Result<Self> {
        let (width, height) = (config.frame_width, config.frame_height);
        {
            let mut gpu = lock_device(&device)?;
            gpu.set_depth_test(true);
            gpu.set_alpha_blend(true);
            gpu.set_primitive_restart(Some(config.primitive_restart_index));
            gpu.set_clear_color(config.clear_color);
            gpu.set_viewport(0, 0, width, height);
        }

        let mut camera = Camera::new(&config.camera);
        camera.set_view(Vec3::splat(5.0), Vec3::ZERO, Vec3::Y);
        camera.set_projection(width, height);

        let mut resources = Resources::new(device.clone());
        let mut pipeline = Pipeline::new(device.clone(), width, height);
        pipeline.init(&mut resources, &config)?;

        crate::engine_info!("lumen3d::Render", "Render ready ({}x{})", width, height);
        Ok(Self {
            device,
            config,
            resources,
            nodes: ResourceManager::new("node"),
            emitters: ResourceManager::new("emitter"),
            pipeline,
            camera,
            time: FrameTime::default(),
            last_shader_reload: 0.0,
        })
    }

    // ===== ACCESSORS =====

    pub fn device(&self) -> &SharedDevice {
        &self.device
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Time of the frame being rendered
    pub fn time(&self) -> &FrameTime {
        &self.time
    }

    // ===== RESOURCE FORWARDERS =====

    pub fn create_shader(&mut self, prefix: &str) -> Result<ShaderKey> {
        self.resources.create_shader(prefix)
    }

    pub fn create_shader_from_sources(&mut self, name: &str, stages: Vec<ShaderStageSource>) -> Result<ShaderKey> {
        self.resources.create_shader_from_sources(name, stages)
    }

    pub fn create_texture(&mut self, name: &str, width: u32, height: u32, pixels: Vec<u8>) -> Result<TextureKey> {
        self.resources.create_texture(name, width, height, pixels)
    }

    pub fn create_texture_from_image(&mut self, name: &str, image: &Image) -> Result<TextureKey> {
        self.resources.create_texture_from_image(name, image)
    }

    pub fn load_texture<P: AsRef<Path>>(&mut self, name: &str, path: P) -> Result<TextureKey> {
        self.resources.load_texture(name, path)
    }

    pub fn create_cube_texture(&mut self, name: &str, faces: &[Image; 6]) -> Result<TextureKey> {
        self.resources.create_cube_texture(name, faces)
    }

    pub fn create_material(&mut self, desc: MaterialDesc) -> Result<MaterialKey> {
        self.resources.create_material(desc)
    }

    pub fn create_primitive(&mut self, name: &str, topology: &Topology) -> Result<PrimitiveKey> {
        self.resources.create_primitive(name, topology)
    }

    pub fn create_primitive_set(&mut self, name: &str, primitives: Vec<PrimitiveKey>) -> PrimitiveSetKey {
        self.resources.create_primitive_set(name, primitives)
    }

    pub fn load_primitive_set<P: AsRef<Path>>(
        &mut self,
        path: P,
        shader: Option<ShaderKey>,
        load_transform: &Mat4,
    ) -> Result<PrimitiveSetKey> {
        self.resources.load_primitive_set(path, shader, load_transform)
    }

    pub fn load_font<P: AsRef<Path>>(&mut self, path: P, shader: Option<ShaderKey>) -> Result<FontKey> {
        self.resources.load_font(path, shader)
    }

    pub fn find_shader(&self, name: &str) -> Option<ShaderKey> {
        self.resources.shaders.find(name)
    }

    pub fn find_texture(&self, name: &str) -> Option<TextureKey> {
        self.resources.textures.find(name)
    }

    pub fn find_material(&self, name: &str) -> Option<MaterialKey> {
        self.resources.materials.find(name)
    }

    pub fn find_primitive(&self, name: &str) -> Option<PrimitiveKey> {
        self.resources.primitives.find(name)
    }

    pub fn find_primitive_set(&self, name: &str) -> Option<PrimitiveSetKey> {
        self.resources.primitive_sets.find(name)
    }

    pub fn find_font(&self, name: &str) -> Option<FontKey> {
        self.resources.fonts.find(name)
    }

    pub fn delete_shader(&mut self, name: &str) -> bool {
        self.resources.shaders.delete(name)
    }

    pub fn delete_texture(&mut self, name: &str) -> bool {
        self.resources.textures.delete(name)
    }

    pub fn delete_material(&mut self, name: &str) -> bool {
        self.resources.materials.delete(name)
    }

    pub fn delete_primitive(&mut self, name: &str) -> bool {
        self.resources.primitives.delete(name)
    }

    pub fn delete_primitive_set(&mut self, name: &str) -> bool {
        self.resources.primitive_sets.delete(name)
    }

    pub fn delete_font(&mut self, name: &str) -> bool {
        self.resources.fonts.delete(name)
    }

    // ===== SCENE =====

    /// Register a new root node
    pub fn create_node(&mut self, name: &str) -> NodeKey {
        self.nodes.add(SceneNode::new(name))
    }

    /// Register an emitter not yet attached to a node
    pub fn create_emitter(&mut self, emitter: Emitter) -> EmitterKey {
        self.emitters.add(emitter)
    }

    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    pub fn find_node(&self, name: &str) -> Option<NodeKey> {
        self.nodes.find(name)
    }

    pub fn delete_node(&mut self, name: &str) -> bool {
        self.nodes.delete(name)
    }

    pub fn emitter(&self, key: EmitterKey) -> Option<&Emitter> {
        self.emitters.get(key)
    }

    /// Move `child` under `parent`
    ///
    /// The child leaves the root pool: its key is no longer valid and the
    /// node is reached through its parent from now on.
    pub fn add_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<()> {
        if parent == child {
            return Err(Error::InvalidState("a node cannot be its own child".to_string()));
        }
        self.nodes.try_get(parent)?;
        let Some(child) = self.nodes.remove(child) else {
            return Err(Error::StaleHandle("child node".to_string()));
        };
        self.nodes.try_get_mut(parent)?.add_child(child);
        Ok(())
    }

    /// Move a free emitter onto `node`
    pub fn add_emitter(&mut self, node: NodeKey, emitter: EmitterKey) -> Result<()> {
        self.nodes.try_get(node)?;
        self.emitters.try_get(emitter)?;
        let Some(emitter) = self.emitters.remove(emitter) else {
            return Err(Error::StaleHandle("emitter".to_string()));
        };
        self.nodes.try_get_mut(node)?.add_emitter(emitter);
        Ok(())
    }

    pub fn add_primitive_set(&mut self, node: NodeKey, set: PrimitiveSetKey) -> Result<()> {
        self.resources.primitive_sets.try_get(set)?;
        self.nodes.try_get_mut(node)?.add_primitive_set(set);
        Ok(())
    }

    /// Update a root node and its subtree for the current frame
    pub fn respond_node(&mut self, key: NodeKey) -> Result<()> {
        let time = self.time;
        self.nodes.try_get_mut(key)?.respond(&time);
        Ok(())
    }

    /// Update a free emitter placed at `world`
    pub fn respond_emitter(&mut self, key: EmitterKey, world: &Mat4) -> Result<()> {
        let time = self.time;
        self.emitters.try_get_mut(key)?.respond(world, &time);
        Ok(())
    }

    // ===== DRAWING =====

    /// Run `f` with a draw context over the locked device
    pub fn with_draw_context<R>(&self, f: impl FnOnce(&mut DrawContext<'_>) -> Result<R>) -> Result<R> {
        let mut device = lock_device(&self.device)?;
        let mut ctx = DrawContext::new(&mut *device, &self.resources, &self.camera, &self.time);
        f(&mut ctx)
    }

    pub fn draw(&self, primitive: PrimitiveKey, world: &Mat4) -> Result<()> {
        self.with_draw_context(|ctx| ctx.draw(primitive, world))
    }

    pub fn draw_prims(&self, set: PrimitiveSetKey, world: &Mat4) -> Result<()> {
        self.with_draw_context(|ctx| ctx.draw_prims(set, world))
    }

    pub fn draw_text(&self, font: FontKey, text: &str, world: &Mat4) -> Result<()> {
        self.with_draw_context(|ctx| ctx.draw_text(font, text, world))
    }

    pub fn draw_node(&self, key: NodeKey) -> Result<()> {
        let node = self.nodes.try_get(key)?;
        self.with_draw_context(|ctx| node.draw(ctx))
    }

    pub fn draw_emitter(&self, key: EmitterKey) -> Result<()> {
        let emitter = self.emitters.try_get(key)?;
        self.with_draw_context(|ctx| emitter.draw(ctx))
    }

    // ===== FRAME =====

    /// Adapt viewport, projection and offscreen targets to a new frame size
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        lock_device(&self.device)?.set_viewport(0, 0, width, height);
        self.config.frame_width = width;
        self.config.frame_height = height;
        self.camera.set_projection(width, height);
        self.pipeline.resize(width, height)
    }

    /// Reload every shader once the configured interval has elapsed
    ///
    /// Returns whether a reload happened.
    pub fn hot_reload(&mut self) -> Result<bool> {
        let Some(interval) = self.config.shader_reload_interval else {
            return Ok(false);
        };
        if self.time.global_time - self.last_shader_reload <= interval {
            return Ok(false);
        }
        self.last_shader_reload = self.time.global_time;
        self.resources.reload_shaders()?;
        Ok(true)
    }

    /// Bind the offscreen target and draw the sky
    pub fn start_frame(&mut self) -> Result<()> {
        let mut device = lock_device(&self.device)?;
        let mut ctx = DrawContext::new(&mut *device, &self.resources, &self.camera, &self.time);
        self.pipeline.start(&mut ctx)
    }

    /// Composite the frame onto the screen
    pub fn end_frame(&mut self) -> Result<()> {
        let mut device = lock_device(&self.device)?;
        let mut ctx = DrawContext::new(&mut *device, &self.resources, &self.camera, &self.time);
        self.pipeline.end(&mut ctx)
    }

    /// Render one frame driven by `units`
    ///
    /// The frame is always closed once started, even if a unit fails to
    /// draw; the first error is returned.
    pub fn render_frame(&mut self, time: FrameTime, units: &mut [Box<dyn Unit>]) -> Result<()> {
        self.time = time;
        self.hot_reload()?;

        for unit in units.iter_mut() {
            unit.respond(self, &time)?;
        }

        self.start_frame()?;
        let drawn = units.iter_mut().try_for_each(|unit| unit.draw(self));
        let ended = self.end_frame();
        drawn.and(ended)
    }

    // ===== TEARDOWN =====

    /// Destroy every scene object and resource, then the offscreen targets
    ///
    /// Returns the number of objects destroyed; a second call returns 0.
    pub fn shutdown(&mut self) -> usize {
        let destroyed = self.nodes.clear()
            + self.emitters.clear()
            + self.resources.shutdown()
            + self.pipeline.release_targets();
        if destroyed > 0 {
            crate::engine_info!("lumen3d::Render", "Shut down, {} object(s) destroyed", destroyed);
        }
        destroyed
    }
}

impl Drop for Render {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;

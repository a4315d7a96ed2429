/// Two-pass frame pipeline.
///
/// The scene is rendered into an offscreen target (one float color texture
/// plus a depth texture), then composited onto the on-screen framebuffer by
/// a full-screen shader drawn from a single point.
///
/// ```text
/// Uninitialized --init--> Ready --start--> Recording --end--> Ready
///                           ^  \--resize--/
/// ```
///
/// `end` waits for the offscreen pass (`finish`) before the composite reads
/// it, and again after the composite draw.

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::graphics_device::{
    lock_device, lock_device_for_release, ClearFlags, FramebufferHandle, PrimitiveTopology,
    SharedDevice, TextureKind, UniformValue,
};
use crate::render::draw_context::{set_uniform_if_present, uniforms, DrawContext};
use crate::render::Skybox;
use crate::resource::{Resources, ShaderKey, Texture};

/// Pipeline lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Created, `init` not called yet
    Uninitialized,
    /// Between frames
    Ready,
    /// Between `start` and `end`
    Recording,
}

// ============================================================================
// OFFSCREEN TARGET
// ============================================================================

/// Framebuffer with one color and one depth attachment
pub struct OffscreenTarget {
    framebuffer: FramebufferHandle,
    color: Texture,
    depth: Texture,
    device: SharedDevice,
}

impl OffscreenTarget {
    /// Allocate both attachments and the framebuffer at `width` x `height`
    ///
    /// # Errors
    ///
    /// `Error::BackendError` when the framebuffer is incomplete. The
    /// attachments are released before returning.
    pub fn new(device: &SharedDevice, width: u32, height: u32) -> Result<Self> {
        let color = Texture::render_target(device, "offscreen color", width, height)?;
        let depth = Texture::depth_target(device, "offscreen depth", width, height)?;
        let (Some(color_handle), Some(depth_handle)) = (color.handle(), depth.handle()) else {
            return Err(Error::InvalidResource("offscreen attachment has no handle".to_string()));
        };
        let framebuffer = {
            let mut device = lock_device(device)?;
            device.create_framebuffer(&[color_handle], Some(depth_handle))?
        };
        Ok(Self { framebuffer, color, depth, device: device.clone() })
    }

    pub fn framebuffer(&self) -> FramebufferHandle {
        self.framebuffer
    }

    pub fn color(&self) -> &Texture {
        &self.color
    }

    pub fn depth(&self) -> &Texture {
        &self.depth
    }

    pub fn width(&self) -> u32 {
        self.color.width()
    }

    pub fn height(&self) -> u32 {
        self.color.height()
    }
}

impl Drop for OffscreenTarget {
    fn drop(&mut self) {
        lock_device_for_release(&self.device).destroy_framebuffer(self.framebuffer);
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline {
    device: SharedDevice,
    state: PipelineState,
    width: u32,
    height: u32,
    target: Option<OffscreenTarget>,
    composite: Option<ShaderKey>,
    skybox: Option<Skybox>,
}

impl Pipeline {
    pub fn new(device: SharedDevice, width: u32, height: u32) -> Self {
        Self {
            device,
            state: PipelineState::Uninitialized,
            width,
            height,
            target: None,
            composite: None,
            skybox: None,
        }
    }

    /// Allocate the offscreen target, load the composite shader and the skybox
    ///
    /// An incomplete framebuffer is logged and leaves the pipeline without a
    /// target; frames then render straight to the screen. Missing skybox
    /// faces are logged and leave the skybox untextured.
    pub fn init(&mut self, resources: &mut Resources, config: &RenderConfig) -> Result<()> {
        if self.state != PipelineState::Uninitialized {
            return Err(Error::InvalidState(format!("pipeline init in state {:?}", self.state)));
        }

        self.recreate_target();
        self.composite = Some(resources.create_shader(&config.composite_shader)?);

        let mut skybox = Skybox::new(resources, &config.skybox_shader)?;
        if let Some(faces) = &config.skybox_faces {
            if let Err(error) = skybox.add_sky_texture(resources, faces) {
                crate::engine_warn!("lumen3d::Pipeline", "Skybox faces unavailable: {}", error);
            }
        }
        self.skybox = Some(skybox);

        self.state = PipelineState::Ready;
        crate::engine_info!("lumen3d::Pipeline", "Initialized at {}x{}", self.width, self.height);
        Ok(())
    }

    /// Reallocate the offscreen target at the new frame size
    ///
    /// Same dimensions with a live target is a no-op. Before `init` only the
    /// size is recorded.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if self.state == PipelineState::Recording {
            return Err(Error::InvalidState("pipeline resize while recording a frame".to_string()));
        }
        if self.width == width && self.height == height && self.target.is_some() {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        if self.state == PipelineState::Ready {
            self.recreate_target();
        }
        Ok(())
    }

    fn recreate_target(&mut self) {
        // Old attachments go before the new ones are allocated
        self.target = None;
        self.target = match OffscreenTarget::new(&self.device, self.width, self.height) {
            Ok(target) => Some(target),
            Err(error) => {
                crate::engine_error!("lumen3d::Pipeline", "Offscreen target unavailable: {}", error);
                None
            }
        };
    }

    /// Bind and clear the offscreen target, then draw the skybox into it
    pub fn start(&mut self, ctx: &mut DrawContext<'_>) -> Result<()> {
        if self.state != PipelineState::Ready {
            return Err(Error::InvalidState(format!("pipeline start in state {:?}", self.state)));
        }

        ctx.device.bind_framebuffer(self.target.as_ref().map(OffscreenTarget::framebuffer));
        ctx.device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);
        if let Some(skybox) = &self.skybox {
            skybox.draw(ctx)?;
        }

        self.state = PipelineState::Recording;
        Ok(())
    }

    /// Composite the offscreen target onto the screen
    pub fn end(&mut self, ctx: &mut DrawContext<'_>) -> Result<()> {
        if self.state != PipelineState::Recording {
            return Err(Error::InvalidState(format!("pipeline end in state {:?}", self.state)));
        }
        self.state = PipelineState::Ready;

        ctx.device.finish();
        ctx.device.bind_framebuffer(None);
        ctx.device.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

        let program = self
            .composite
            .and_then(|key| ctx.resources.shaders.get(key))
            .and_then(|shader| shader.program());
        let attachments = self
            .target
            .as_ref()
            .and_then(|target| Some((target.color.handle()?, target.depth.handle()?)));

        if let (Some(program), Some((color, depth))) = (program, attachments) {
            ctx.device.use_program(Some(program));
            ctx.device.bind_texture(0, TextureKind::Tex2D, color);
            ctx.device.bind_texture(1, TextureKind::Tex2D, depth);
            set_uniform_if_present(&mut *ctx.device, program, uniforms::TIME, UniformValue::Float(ctx.time.time as f32));
            ctx.device.draw(PrimitiveTopology::PointList, 0, 1);
            ctx.device.use_program(None);
        }

        ctx.device.finish();
        Ok(())
    }

    /// Release the offscreen target, returning how many targets were freed
    pub fn release_targets(&mut self) -> usize {
        self.target.take().map_or(0, |_| 1)
    }

    // ===== ACCESSORS =====

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn target(&self) -> Option<&OffscreenTarget> {
        self.target.as_ref()
    }

    pub fn composite_shader(&self) -> Option<ShaderKey> {
        self.composite
    }

    pub fn skybox(&self) -> Option<&Skybox> {
        self.skybox.as_ref()
    }

    pub fn skybox_mut(&mut self) -> Option<&mut Skybox> {
        self.skybox.as_mut()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

/// GraphicsDevice trait - the single seam between the engine and a GPU API
///
/// Every GPU call made by resources, the pipeline and the render façade goes
/// through this trait. Backends (OpenGL, Vulkan, a recording mock in tests)
/// implement it; the engine shares one instance as
/// `Arc<Mutex<dyn GraphicsDevice>>`.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard};
use bitflags::bitflags;
use crate::error::{Error, Result};
use crate::graphics_device::{
    BufferUsage, ShaderStageSource, TextureDesc, TextureKind, UniformValue, VertexLayout,
};

// ============================================================================
// Opaque handles
// ============================================================================

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Wrap a raw backend identifier (0 is never a valid handle)
            pub fn new(raw: u32) -> Option<Self> {
                NonZeroU32::new(raw).map(Self)
            }

            /// Raw backend identifier
            pub fn raw(self) -> u32 {
                self.0.get()
            }
        }
    };
}

gpu_handle!(
    /// Linked GPU program
    ProgramHandle
);
gpu_handle!(
    /// GPU image (2D or cube)
    TextureHandle
);
gpu_handle!(
    /// GPU vertex or index buffer
    BufferHandle
);
gpu_handle!(
    /// Vertex attribute binding object
    VertexArrayHandle
);
gpu_handle!(
    /// Off-screen framebuffer
    FramebufferHandle
);

/// Location of a uniform inside a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

// ============================================================================
// Render state
// ============================================================================

/// Primitive assembly mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    TriangleList,
    TriangleStrip,
    PointList,
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    Front,
    Back,
}

bitflags! {
    /// Buffers cleared by `GraphicsDevice::clear`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const COLOR = 0b01;
        const DEPTH = 0b10;
    }
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Immediate-mode graphics device
///
/// All methods act on a single GPU context. Creation methods return an error
/// carrying the backend diagnostic when the object cannot be built; destroy
/// methods never fail.
pub trait GraphicsDevice: Send {
    // ===== PROGRAMS =====

    /// Compile every stage and link them into a program
    ///
    /// # Errors
    ///
    /// `Error::BackendError` with the compile or link log.
    fn create_program(&mut self, stages: &[ShaderStageSource]) -> Result<ProgramHandle>;

    /// Destroy a program together with its attached stages
    fn destroy_program(&mut self, program: ProgramHandle);

    /// Bind a program (`None` unbinds)
    fn use_program(&mut self, program: Option<ProgramHandle>);

    /// Location of an active uniform, `None` when the program does not use it
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Set a uniform of the currently bound program
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    // ===== TEXTURES =====

    /// Create a texture, uploading initial data when present
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle>;

    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Bind a texture to a texture unit
    fn bind_texture(&mut self, unit: u32, kind: TextureKind, texture: TextureHandle);

    // ===== BUFFERS =====

    /// Create a buffer initialized with `data`
    fn create_buffer(&mut self, usage: BufferUsage, data: &[u8]) -> Result<BufferHandle>;

    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Create a vertex array mapping `layout` onto the given buffers
    fn create_vertex_array(
        &mut self,
        vertex_buffer: BufferHandle,
        index_buffer: Option<BufferHandle>,
        layout: &VertexLayout,
    ) -> Result<VertexArrayHandle>;

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>);

    // ===== FRAMEBUFFERS =====

    /// Create a framebuffer from color attachments and an optional depth texture
    ///
    /// # Errors
    ///
    /// `Error::BackendError` when the attachment combination is incomplete.
    fn create_framebuffer(
        &mut self,
        color_attachments: &[TextureHandle],
        depth_attachment: Option<TextureHandle>,
    ) -> Result<FramebufferHandle>;

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Bind a framebuffer (`None` binds the on-screen framebuffer)
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>);

    // ===== STATE =====

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    fn set_clear_color(&mut self, color: [f32; 4]);

    fn clear(&mut self, flags: ClearFlags);

    fn set_cull_mode(&mut self, mode: CullMode);

    fn set_depth_test(&mut self, enabled: bool);

    fn set_depth_write(&mut self, enabled: bool);

    fn set_alpha_blend(&mut self, enabled: bool);

    /// Enable primitive restart with the given index (`None` disables it)
    fn set_primitive_restart(&mut self, index: Option<u32>);

    // ===== DRAWING =====

    /// Non-indexed draw of `count` vertices starting at `first`
    fn draw(&mut self, topology: PrimitiveTopology, first: u32, count: u32);

    /// Indexed draw of `count` indices from the bound vertex array
    fn draw_indexed(&mut self, topology: PrimitiveTopology, count: u32);

    /// Block until every submitted command has completed
    fn finish(&mut self);
}

// ============================================================================
// Shared device access
// ============================================================================

/// Device shared between the façade and every GPU-owning resource
pub type SharedDevice = Arc<Mutex<dyn GraphicsDevice>>;

/// Lock the shared device
///
/// # Errors
///
/// `Error::BackendError` if a previous holder panicked.
pub fn lock_device(device: &SharedDevice) -> Result<MutexGuard<'_, dyn GraphicsDevice + 'static>> {
    device
        .lock()
        .map_err(|_| Error::BackendError("Graphics device lock poisoned".to_string()))
}

/// Lock the shared device for releasing handles, even after a panic elsewhere
pub(crate) fn lock_device_for_release(device: &SharedDevice) -> MutexGuard<'_, dyn GraphicsDevice + 'static> {
    match device.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

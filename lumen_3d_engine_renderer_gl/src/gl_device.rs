/// GlGraphicsDevice - OpenGL 4.3 core implementation of the GraphicsDevice trait
///
/// Every engine handle is the raw GL object name, so handles convert to and
/// from glow's native types without bookkeeping. The context must be current
/// on the thread that drives the device.

use std::cell::RefCell;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use glow::HasContext;
use rustc_hash::FxHashMap;
use lumen_3d_engine::lumen3d::device::{
    AttributeType, BufferHandle, BufferUsage, ClearFlags, CullMode, FramebufferHandle,
    GraphicsDevice, PrimitiveTopology, ProgramHandle, ShaderStageSource, SharedDevice,
    TextureData, TextureDesc, TextureHandle, TextureKind, UniformLocation, UniformValue,
    VertexArrayHandle, VertexLayout,
};
use lumen_3d_engine::lumen3d::{Error, Result};
use lumen_3d_engine::{engine_bail, engine_debug, engine_info, engine_warn};
use crate::gl_format;

const SOURCE: &str = "lumen3d::gl";

macro_rules! native_conversions {
    ($to_native:ident, $from_native:ident, $handle:ty, $native:ident) => {
        fn $to_native(handle: $handle) -> Option<glow::$native> {
            NonZeroU32::new(handle.raw()).map(glow::$native)
        }

        fn $from_native(native: glow::$native) -> Result<$handle> {
            <$handle>::new(native.0.get())
                .ok_or_else(|| Error::BackendError(format!("{} name 0", stringify!($native))))
        }
    };
}

native_conversions!(native_program, program_handle, ProgramHandle, NativeProgram);
native_conversions!(native_texture, texture_handle, TextureHandle, NativeTexture);
native_conversions!(native_buffer, buffer_handle, BufferHandle, NativeBuffer);
native_conversions!(native_vertex_array, vertex_array_handle, VertexArrayHandle, NativeVertexArray);
native_conversions!(native_framebuffer, framebuffer_handle, FramebufferHandle, NativeFramebuffer);

/// OpenGL graphics device
pub struct GlGraphicsDevice {
    gl: glow::Context,
    /// Bound for draws without geometry (core profile needs one)
    empty_vertex_array: glow::NativeVertexArray,
    bound_vertex_array: Option<glow::NativeVertexArray>,
    bound_framebuffer: Option<glow::NativeFramebuffer>,
    uniform_locations: RefCell<FxHashMap<ProgramHandle, FxHashMap<String, Option<UniformLocation>>>>,
}

impl GlGraphicsDevice {
    /// Wrap a context that is current on this thread
    ///
    /// # Errors
    ///
    /// `Error::InitializationFailed` for OpenGL ES or desktop GL older than 4.3.
    pub fn new(gl: glow::Context) -> Result<Self> {
        let version = gl.version();
        if version.is_embedded || (version.major, version.minor) < (4, 3) {
            return Err(Error::InitializationFailed(format!(
                "desktop OpenGL 4.3 required, context is {}{}.{}",
                if version.is_embedded { "ES " } else { "" },
                version.major, version.minor
            )));
        }
        engine_info!(SOURCE, "OpenGL {}.{} context", version.major, version.minor);

        let empty_vertex_array = unsafe {
            let vertex_array = gl
                .create_vertex_array()
                .map_err(|e| Error::InitializationFailed(format!("vertex array: {}", e)))?;
            gl.bind_vertex_array(Some(vertex_array));
            gl.enable(glow::PROGRAM_POINT_SIZE);
            gl.enable(glow::TEXTURE_CUBE_MAP_SEAMLESS);
            vertex_array
        };

        Ok(Self {
            gl,
            empty_vertex_array,
            bound_vertex_array: Some(empty_vertex_array),
            bound_framebuffer: None,
            uniform_locations: RefCell::new(FxHashMap::default()),
        })
    }

    /// Move the device behind the shared handle the engine works with
    pub fn into_shared(self) -> SharedDevice {
        Arc::new(Mutex::new(self))
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Turn a pending GL error into an engine error
    fn check_error(&self, what: &str) -> Result<()> {
        match unsafe { self.gl.get_error() } {
            glow::NO_ERROR => Ok(()),
            glow::OUT_OF_MEMORY => Err(Error::OutOfMemory),
            code => engine_bail!(SOURCE, "{} failed with GL error 0x{:04X}", what, code),
        }
    }

    /// Compile one stage, returning the info log on failure
    unsafe fn compile_stage(&self, stage: &ShaderStageSource) -> Result<glow::NativeShader> {
        let gl = &self.gl;
        let shader = gl
            .create_shader(gl_format::shader_stage(stage.stage))
            .map_err(Error::BackendError)?;
        gl.shader_source(shader, &stage.source);
        gl.compile_shader(shader);
        if gl.get_shader_compile_status(shader) {
            return Ok(shader);
        }
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        engine_bail!(SOURCE, "compile error in {:?} stage: {}", stage.stage, log.trim())
    }
}

impl GraphicsDevice for GlGraphicsDevice {
    // ===== PROGRAMS =====

    fn create_program(&mut self, stages: &[ShaderStageSource]) -> Result<ProgramHandle> {
        if stages.is_empty() {
            engine_bail!(SOURCE, "link error: program has no attached stages");
        }
        unsafe {
            let program = self.gl.create_program().map_err(Error::BackendError)?;
            let mut shaders = Vec::with_capacity(stages.len());
            for stage in stages {
                match self.compile_stage(stage) {
                    Ok(shader) => {
                        self.gl.attach_shader(program, shader);
                        shaders.push(shader);
                    }
                    Err(error) => {
                        for shader in shaders {
                            self.gl.delete_shader(shader);
                        }
                        self.gl.delete_program(program);
                        return Err(error);
                    }
                }
            }

            self.gl.link_program(program);
            let linked = self.gl.get_program_link_status(program);
            let log = if linked { String::new() } else { self.gl.get_program_info_log(program) };
            for shader in shaders {
                self.gl.detach_shader(program, shader);
                self.gl.delete_shader(shader);
            }
            if !linked {
                self.gl.delete_program(program);
                engine_bail!(SOURCE, "link error: {}", log.trim());
            }
            program_handle(program)
        }
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        self.uniform_locations.borrow_mut().remove(&program);
        if let Some(native) = native_program(program) {
            unsafe { self.gl.delete_program(native) }
        }
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        unsafe { self.gl.use_program(program.and_then(native_program)) }
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        if let Some(&cached) = self.uniform_locations.borrow().get(&program).and_then(|names| names.get(name)) {
            return cached;
        }
        let location = native_program(program)
            .and_then(|native| unsafe { self.gl.get_uniform_location(native, name) })
            .map(|location| UniformLocation(location.0 as i32));
        self.uniform_locations
            .borrow_mut()
            .entry(program)
            .or_default()
            .insert(name.to_string(), location);
        location
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let location = glow::NativeUniformLocation(location.0 as u32);
        let location = Some(&location);
        unsafe {
            match value {
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(location, v.x, v.y, v.z),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, &m.to_cols_array()),
            }
        }
    }

    // ===== TEXTURES =====

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!(SOURCE, "texture size {}x{} is invalid", desc.width, desc.height);
        }
        let images: Vec<Option<&[u8]>> = match (desc.kind, &desc.data) {
            (TextureKind::Tex2D, None) => vec![None],
            (TextureKind::Tex2D, Some(TextureData::Single(pixels))) => vec![Some(pixels.as_slice())],
            (TextureKind::Cube, None) => vec![None; 6],
            (TextureKind::Cube, Some(TextureData::CubeFaces(faces))) if faces.len() == 6 => {
                faces.iter().map(|face| Some(face.as_slice())).collect()
            }
            (kind, _) => engine_bail!(SOURCE, "{:?} texture given mismatched image data", kind),
        };
        let expected = desc.width as usize * desc.height as usize * desc.format.bytes_per_pixel() as usize;
        if let Some(bad) = images.iter().flatten().find(|pixels| pixels.len() != expected) {
            engine_bail!(SOURCE, "texture data is {} bytes, {}x{} {:?} needs {}",
                bad.len(), desc.width, desc.height, desc.format, expected);
        }

        let target = gl_format::texture_target(desc.kind);
        let texel = gl_format::texel_format(desc.format);
        let (min_filter, mag_filter) = gl_format::filters(desc.filter, desc.mipmaps);
        let wrap = gl_format::wrap_mode(desc.kind);

        let texture = unsafe {
            let texture = self.gl.create_texture().map_err(Error::BackendError)?;
            self.gl.bind_texture(target, Some(texture));
            for (face, pixels) in images.iter().enumerate() {
                self.gl.tex_image_2d(
                    gl_format::image_target(desc.kind, face),
                    0,
                    texel.internal_format,
                    desc.width as i32,
                    desc.height as i32,
                    0,
                    texel.format,
                    texel.ty,
                    glow::PixelUnpackData::Slice(*pixels),
                );
            }
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, min_filter);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, mag_filter);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, wrap);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, wrap);
            if desc.kind == TextureKind::Cube {
                self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_R, wrap);
            }
            if desc.mipmaps && desc.data.is_some() {
                self.gl.generate_mipmap(target);
            }
            self.gl.bind_texture(target, None);
            texture
        };

        if let Err(error) = self.check_error("texture upload") {
            unsafe { self.gl.delete_texture(texture) }
            return Err(error);
        }
        texture_handle(texture)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if let Some(native) = native_texture(texture) {
            unsafe { self.gl.delete_texture(native) }
        }
    }

    fn bind_texture(&mut self, unit: u32, kind: TextureKind, texture: TextureHandle) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(gl_format::texture_target(kind), native_texture(texture));
        }
    }

    // ===== BUFFERS =====

    fn create_buffer(&mut self, usage: BufferUsage, data: &[u8]) -> Result<BufferHandle> {
        let target = gl_format::buffer_target(usage);
        let buffer = unsafe {
            let buffer = self.gl.create_buffer().map_err(Error::BackendError)?;
            // Index bindings are vertex array state: keep them off the bound array
            self.gl.bind_vertex_array(Some(self.empty_vertex_array));
            self.gl.bind_buffer(target, Some(buffer));
            self.gl.buffer_data_u8_slice(target, data, glow::STATIC_DRAW);
            self.gl.bind_buffer(target, None);
            self.gl.bind_vertex_array(self.bound_vertex_array);
            buffer
        };

        if let Err(error) = self.check_error("buffer upload") {
            unsafe { self.gl.delete_buffer(buffer) }
            return Err(error);
        }
        buffer_handle(buffer)
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if let Some(native) = native_buffer(buffer) {
            unsafe { self.gl.delete_buffer(native) }
        }
    }

    fn create_vertex_array(
        &mut self,
        vertex_buffer: BufferHandle,
        index_buffer: Option<BufferHandle>,
        layout: &VertexLayout,
    ) -> Result<VertexArrayHandle> {
        let vertex_array = unsafe {
            let vertex_array = self.gl.create_vertex_array().map_err(Error::BackendError)?;
            self.gl.bind_vertex_array(Some(vertex_array));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, native_buffer(vertex_buffer));
            for attribute in &layout.attributes {
                self.gl.enable_vertex_attrib_array(attribute.location);
                let data_type = gl_format::attribute_type(attribute.kind);
                match attribute.kind {
                    AttributeType::Float32 => self.gl.vertex_attrib_pointer_f32(
                        attribute.location,
                        attribute.components as i32,
                        data_type,
                        false,
                        layout.stride as i32,
                        attribute.offset as i32,
                    ),
                    AttributeType::Int32 => self.gl.vertex_attrib_pointer_i32(
                        attribute.location,
                        attribute.components as i32,
                        data_type,
                        layout.stride as i32,
                        attribute.offset as i32,
                    ),
                }
            }
            if let Some(index_buffer) = index_buffer {
                self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, native_buffer(index_buffer));
            }
            self.gl.bind_vertex_array(self.bound_vertex_array);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
            vertex_array
        };
        vertex_array_handle(vertex_array)
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        let Some(native) = native_vertex_array(vertex_array) else {
            return;
        };
        if self.bound_vertex_array == Some(native) {
            self.bind_vertex_array(None);
        }
        unsafe { self.gl.delete_vertex_array(native) }
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        let native = vertex_array
            .and_then(native_vertex_array)
            .unwrap_or(self.empty_vertex_array);
        self.bound_vertex_array = Some(native);
        unsafe { self.gl.bind_vertex_array(Some(native)) }
    }

    // ===== FRAMEBUFFERS =====

    fn create_framebuffer(
        &mut self,
        color_attachments: &[TextureHandle],
        depth_attachment: Option<TextureHandle>,
    ) -> Result<FramebufferHandle> {
        let (framebuffer, status) = unsafe {
            let framebuffer = self.gl.create_framebuffer().map_err(Error::BackendError)?;
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
            let mut draw_buffers = Vec::with_capacity(color_attachments.len());
            for (i, &color) in color_attachments.iter().enumerate() {
                let attachment = glow::COLOR_ATTACHMENT0 + i as u32;
                self.gl.framebuffer_texture_2d(glow::FRAMEBUFFER, attachment, glow::TEXTURE_2D, native_texture(color), 0);
                draw_buffers.push(attachment);
            }
            if let Some(depth) = depth_attachment {
                self.gl.framebuffer_texture_2d(glow::FRAMEBUFFER, glow::DEPTH_ATTACHMENT, glow::TEXTURE_2D, native_texture(depth), 0);
            }
            if draw_buffers.is_empty() {
                draw_buffers.push(glow::NONE);
            }
            self.gl.draw_buffers(&draw_buffers);
            let status = self.gl.check_framebuffer_status(glow::FRAMEBUFFER);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, self.bound_framebuffer);
            (framebuffer, status)
        };

        if status != glow::FRAMEBUFFER_COMPLETE {
            unsafe { self.gl.delete_framebuffer(framebuffer) }
            engine_bail!(SOURCE, "framebuffer incomplete: {}", gl_format::framebuffer_status_name(status));
        }
        engine_debug!(SOURCE, "Framebuffer with {} color attachment(s)", color_attachments.len());
        framebuffer_handle(framebuffer)
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        let Some(native) = native_framebuffer(framebuffer) else {
            return;
        };
        if self.bound_framebuffer == Some(native) {
            self.bind_framebuffer(None);
        }
        unsafe { self.gl.delete_framebuffer(native) }
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        self.bound_framebuffer = framebuffer.and_then(native_framebuffer);
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, self.bound_framebuffer) }
    }

    // ===== STATE =====

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        unsafe { self.gl.viewport(x, y, width as i32, height as i32) }
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        unsafe { self.gl.clear_color(color[0], color[1], color[2], color[3]) }
    }

    fn clear(&mut self, flags: ClearFlags) {
        unsafe { self.gl.clear(gl_format::clear_mask(flags)) }
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        unsafe {
            match gl_format::cull_face(mode) {
                Some(face) => {
                    self.gl.enable(glow::CULL_FACE);
                    self.gl.cull_face(face);
                }
                None => self.gl.disable(glow::CULL_FACE),
            }
        }
    }

    fn set_depth_test(&mut self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::DEPTH_TEST);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
        }
    }

    fn set_depth_write(&mut self, enabled: bool) {
        unsafe { self.gl.depth_mask(enabled) }
    }

    fn set_alpha_blend(&mut self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::BLEND);
                self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            } else {
                self.gl.disable(glow::BLEND);
            }
        }
    }

    /// Only the all-ones index is supported (fixed-index restart)
    fn set_primitive_restart(&mut self, index: Option<u32>) {
        unsafe {
            match index {
                Some(index) => {
                    if index != u32::MAX {
                        engine_warn!(SOURCE, "restart index {} unsupported, using 0xFFFFFFFF", index);
                    }
                    self.gl.enable(glow::PRIMITIVE_RESTART_FIXED_INDEX);
                }
                None => self.gl.disable(glow::PRIMITIVE_RESTART_FIXED_INDEX),
            }
        }
    }

    // ===== DRAWING =====

    fn draw(&mut self, topology: PrimitiveTopology, first: u32, count: u32) {
        unsafe { self.gl.draw_arrays(gl_format::draw_mode(topology), first as i32, count as i32) }
    }

    fn draw_indexed(&mut self, topology: PrimitiveTopology, count: u32) {
        unsafe { self.gl.draw_elements(gl_format::draw_mode(topology), count as i32, glow::UNSIGNED_INT, 0) }
    }

    fn finish(&mut self) {
        unsafe { self.gl.finish() }
    }
}

impl Drop for GlGraphicsDevice {
    fn drop(&mut self) {
        unsafe {
            self.gl.bind_vertex_array(None);
            self.gl.delete_vertex_array(self.empty_vertex_array);
        }
    }
}

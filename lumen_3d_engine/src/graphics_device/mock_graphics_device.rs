/// Mock graphics device for unit tests (no GPU required)
///
/// Records every call as a `DeviceCommand`, keeps the set of live handles per
/// object kind and "compiles" shader sources by scanning their `uniform`
/// declarations. Tests keep a clone of the shared state to inspect it after
/// the device itself has been moved behind `Arc<Mutex<dyn GraphicsDevice>>`.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::{
    BufferHandle, BufferUsage, ClearFlags, CullMode, FramebufferHandle, GraphicsDevice,
    PrimitiveTopology, ProgramHandle, ShaderStageSource, TextureDesc, TextureHandle,
    TextureKind, UniformLocation, UniformValue, VertexArrayHandle, VertexLayout,
};

// ============================================================================
// Recorded commands
// ============================================================================

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CreateProgram(ProgramHandle),
    DestroyProgram(ProgramHandle),
    UseProgram(Option<ProgramHandle>),
    SetUniform { name: String, value: UniformValue },
    CreateTexture(TextureHandle),
    DestroyTexture(TextureHandle),
    BindTexture { unit: u32, kind: TextureKind, texture: TextureHandle },
    CreateBuffer { buffer: BufferHandle, usage: BufferUsage, size: usize },
    DestroyBuffer(BufferHandle),
    CreateVertexArray(VertexArrayHandle),
    DestroyVertexArray(VertexArrayHandle),
    BindVertexArray(Option<VertexArrayHandle>),
    CreateFramebuffer(FramebufferHandle),
    DestroyFramebuffer(FramebufferHandle),
    BindFramebuffer(Option<FramebufferHandle>),
    SetViewport { width: u32, height: u32 },
    SetClearColor([f32; 4]),
    Clear(ClearFlags),
    SetCullMode(CullMode),
    SetDepthTest(bool),
    SetDepthWrite(bool),
    SetAlphaBlend(bool),
    SetPrimitiveRestart(Option<u32>),
    Draw { topology: PrimitiveTopology, first: u32, count: u32, vertex_array: Option<VertexArrayHandle> },
    DrawIndexed { topology: PrimitiveTopology, count: u32, vertex_array: Option<VertexArrayHandle> },
    Finish,
}

impl DeviceCommand {
    /// True for `Draw` and `DrawIndexed`
    pub fn is_draw(&self) -> bool {
        matches!(self, DeviceCommand::Draw { .. } | DeviceCommand::DrawIndexed { .. })
    }

    /// Vertex array bound when a draw was issued
    pub fn draw_vertex_array(&self) -> Option<VertexArrayHandle> {
        match self {
            DeviceCommand::Draw { vertex_array, .. } => *vertex_array,
            DeviceCommand::DrawIndexed { vertex_array, .. } => *vertex_array,
            _ => None,
        }
    }
}

// ============================================================================
// Shared state
// ============================================================================

/// Texture as seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockTexture {
    pub desc: TextureDesc,
}

/// Vertex array as seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockVertexArray {
    pub vertex_buffer: BufferHandle,
    pub index_buffer: Option<BufferHandle>,
    pub layout: VertexLayout,
}

/// Framebuffer as seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockFramebuffer {
    pub color_attachments: Vec<TextureHandle>,
    pub depth_attachment: Option<TextureHandle>,
}

/// Everything the mock knows, shared with the test
#[derive(Debug, Default)]
pub struct MockDeviceState {
    pub commands: Vec<DeviceCommand>,
    pub programs: FxHashMap<ProgramHandle, Vec<(String, UniformLocation)>>,
    pub textures: FxHashMap<TextureHandle, MockTexture>,
    pub buffers: FxHashMap<BufferHandle, Vec<u8>>,
    pub vertex_arrays: FxHashMap<VertexArrayHandle, MockVertexArray>,
    pub framebuffers: FxHashMap<FramebufferHandle, MockFramebuffer>,
    /// When set, `create_framebuffer` reports an incomplete framebuffer
    pub reject_framebuffers: bool,
    /// `create_program` calls, failed ones included
    pub program_requests: usize,
    uniform_names: FxHashMap<i32, String>,
    bound_vertex_array: Option<VertexArrayHandle>,
    next_id: u32,
}

impl MockDeviceState {
    fn next_raw(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Number of live GPU objects of every kind
    pub fn live_handle_count(&self) -> usize {
        self.programs.len()
            + self.textures.len()
            + self.buffers.len()
            + self.vertex_arrays.len()
            + self.framebuffers.len()
    }

    /// Recorded draw commands, in submission order
    pub fn draws(&self) -> Vec<DeviceCommand> {
        self.commands.iter().filter(|c| c.is_draw()).cloned().collect()
    }

    /// Number of draws issued with the given vertex array bound
    pub fn draw_count_for(&self, vertex_array: VertexArrayHandle) -> usize {
        self.commands
            .iter()
            .filter(|c| c.is_draw() && c.draw_vertex_array() == Some(vertex_array))
            .count()
    }

    /// Names of the uniforms set so far, in order
    pub fn uniform_names_set(&self) -> Vec<String> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::SetUniform { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Count recorded commands matching a predicate
    pub fn count(&self, predicate: impl Fn(&DeviceCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }

    /// Forget recorded commands (live objects are kept)
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

/// Scan GLSL-like source for `uniform <type> <name>;` declarations
fn declared_uniforms(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in source.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if let Some(pos) = tokens.iter().position(|t| *t == "uniform") {
            if let Some(raw) = tokens.get(pos + 2) {
                let name = raw
                    .trim_end_matches(';')
                    .split('[')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                if !name.is_empty() {
                    names.push(name);
                }
            }
        }
    }
    names
}

// ============================================================================
// Mock device
// ============================================================================

/// Recording graphics device
pub struct MockGraphicsDevice {
    state: Arc<Mutex<MockDeviceState>>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockDeviceState::default())),
        }
    }

    /// Shared state handle for inspection
    pub fn state(&self) -> Arc<Mutex<MockDeviceState>> {
        self.state.clone()
    }

    fn with<R>(&self, f: impl FnOnce(&mut MockDeviceState) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a shared mock device and a handle on its state
pub fn create_mock_device() -> (Arc<Mutex<dyn GraphicsDevice>>, Arc<Mutex<MockDeviceState>>) {
    let mock = MockGraphicsDevice::new();
    let state = mock.state();
    (Arc::new(Mutex::new(mock)), state)
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_program(&mut self, stages: &[ShaderStageSource]) -> Result<ProgramHandle> {
        self.with(|s| s.program_requests += 1);
        if stages.is_empty() {
            engine_bail!("lumen3d::mock", "link error: program has no attached stages");
        }
        if let Some(bad) = stages.iter().find(|s| s.source.contains("#error")) {
            engine_bail!("lumen3d::mock", "compile error in {:?} stage: #error directive", bad.stage);
        }
        Ok(self.with(|s| {
            let raw = s.next_raw();
            let handle = ProgramHandle::new(raw).unwrap();
            let mut uniforms = Vec::new();
            for stage in stages {
                for name in declared_uniforms(&stage.source) {
                    if uniforms.iter().any(|(n, _)| *n == name) {
                        continue;
                    }
                    let location = UniformLocation(s.next_raw() as i32);
                    s.uniform_names.insert(location.0, name.clone());
                    uniforms.push((name, location));
                }
            }
            s.programs.insert(handle, uniforms);
            s.commands.push(DeviceCommand::CreateProgram(handle));
            handle
        }))
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        self.with(|s| {
            s.programs.remove(&program);
            s.commands.push(DeviceCommand::DestroyProgram(program));
        })
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.with(|s| s.commands.push(DeviceCommand::UseProgram(program)))
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.with(|s| {
            s.programs
                .get(&program)
                .and_then(|uniforms| uniforms.iter().find(|(n, _)| n == name))
                .map(|(_, location)| *location)
        })
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.with(|s| {
            let name = s.uniform_names.get(&location.0).cloned().unwrap_or_default();
            s.commands.push(DeviceCommand::SetUniform { name, value });
        })
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureHandle> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!("lumen3d::mock", "texture size {}x{} is invalid", desc.width, desc.height);
        }
        Ok(self.with(|s| {
            let handle = TextureHandle::new(s.next_raw()).unwrap();
            s.textures.insert(handle, MockTexture { desc: desc.clone() });
            s.commands.push(DeviceCommand::CreateTexture(handle));
            handle
        }))
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.with(|s| {
            s.textures.remove(&texture);
            s.commands.push(DeviceCommand::DestroyTexture(texture));
        })
    }

    fn bind_texture(&mut self, unit: u32, kind: TextureKind, texture: TextureHandle) {
        self.with(|s| s.commands.push(DeviceCommand::BindTexture { unit, kind, texture }))
    }

    fn create_buffer(&mut self, usage: BufferUsage, data: &[u8]) -> Result<BufferHandle> {
        Ok(self.with(|s| {
            let handle = BufferHandle::new(s.next_raw()).unwrap();
            s.buffers.insert(handle, data.to_vec());
            s.commands.push(DeviceCommand::CreateBuffer { buffer: handle, usage, size: data.len() });
            handle
        }))
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.with(|s| {
            s.buffers.remove(&buffer);
            s.commands.push(DeviceCommand::DestroyBuffer(buffer));
        })
    }

    fn create_vertex_array(
        &mut self,
        vertex_buffer: BufferHandle,
        index_buffer: Option<BufferHandle>,
        layout: &VertexLayout,
    ) -> Result<VertexArrayHandle> {
        Ok(self.with(|s| {
            let handle = VertexArrayHandle::new(s.next_raw()).unwrap();
            s.vertex_arrays.insert(handle, MockVertexArray {
                vertex_buffer,
                index_buffer,
                layout: layout.clone(),
            });
            s.commands.push(DeviceCommand::CreateVertexArray(handle));
            handle
        }))
    }

    fn destroy_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.with(|s| {
            s.vertex_arrays.remove(&vertex_array);
            s.commands.push(DeviceCommand::DestroyVertexArray(vertex_array));
        })
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        self.with(|s| {
            s.bound_vertex_array = vertex_array;
            s.commands.push(DeviceCommand::BindVertexArray(vertex_array));
        })
    }

    fn create_framebuffer(
        &mut self,
        color_attachments: &[TextureHandle],
        depth_attachment: Option<TextureHandle>,
    ) -> Result<FramebufferHandle> {
        if self.with(|s| s.reject_framebuffers) {
            engine_bail!("lumen3d::mock", "framebuffer incomplete: missing attachment");
        }
        Ok(self.with(|s| {
            let handle = FramebufferHandle::new(s.next_raw()).unwrap();
            s.framebuffers.insert(handle, MockFramebuffer {
                color_attachments: color_attachments.to_vec(),
                depth_attachment,
            });
            s.commands.push(DeviceCommand::CreateFramebuffer(handle));
            handle
        }))
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.with(|s| {
            s.framebuffers.remove(&framebuffer);
            s.commands.push(DeviceCommand::DestroyFramebuffer(framebuffer));
        })
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        self.with(|s| s.commands.push(DeviceCommand::BindFramebuffer(framebuffer)))
    }

    fn set_viewport(&mut self, _x: i32, _y: i32, width: u32, height: u32) {
        self.with(|s| s.commands.push(DeviceCommand::SetViewport { width, height }))
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.with(|s| s.commands.push(DeviceCommand::SetClearColor(color)))
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.with(|s| s.commands.push(DeviceCommand::Clear(flags)))
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.with(|s| s.commands.push(DeviceCommand::SetCullMode(mode)))
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.with(|s| s.commands.push(DeviceCommand::SetDepthTest(enabled)))
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.with(|s| s.commands.push(DeviceCommand::SetDepthWrite(enabled)))
    }

    fn set_alpha_blend(&mut self, enabled: bool) {
        self.with(|s| s.commands.push(DeviceCommand::SetAlphaBlend(enabled)))
    }

    fn set_primitive_restart(&mut self, index: Option<u32>) {
        self.with(|s| s.commands.push(DeviceCommand::SetPrimitiveRestart(index)))
    }

    fn draw(&mut self, topology: PrimitiveTopology, first: u32, count: u32) {
        self.with(|s| {
            let vertex_array = s.bound_vertex_array;
            s.commands.push(DeviceCommand::Draw { topology, first, count, vertex_array });
        })
    }

    fn draw_indexed(&mut self, topology: PrimitiveTopology, count: u32) {
        self.with(|s| {
            let vertex_array = s.bound_vertex_array;
            s.commands.push(DeviceCommand::DrawIndexed { topology, count, vertex_array });
        })
    }

    fn finish(&mut self) {
        self.with(|s| s.commands.push(DeviceCommand::Finish))
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;

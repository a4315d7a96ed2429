/// Unit tests for MockGraphicsDevice
///
/// The mock stands in for the GPU in every behavioural test of the crate, so
/// its bookkeeping is checked on its own first.

use super::*;
use crate::graphics_device::{
    ShaderStage, TextureFilter, TextureFormat, AttributeType, VertexAttribute,
};

// ============================================================================
// Helpers
// ============================================================================

fn stage(stage: ShaderStage, source: &str) -> ShaderStageSource {
    ShaderStageSource { stage, source: source.to_string() }
}

fn rgba_desc(width: u32, height: u32) -> TextureDesc {
    TextureDesc {
        width,
        height,
        kind: TextureKind::Tex2D,
        format: TextureFormat::R8G8B8A8_UNORM,
        data: None,
        mipmaps: false,
        filter: TextureFilter::Linear,
    }
}

// ============================================================================
// Programs
// ============================================================================

#[test]
fn test_declared_uniforms_parsing() {
    let names = declared_uniforms(
        "uniform mat4 MatrWVP;\nlayout(binding = 0) uniform sampler2D Tex;\nuniform vec3 Lights[4];\nvoid main() {}",
    );
    assert_eq!(names, vec!["MatrWVP", "Tex", "Lights"]);
}

#[test]
fn test_program_uniform_locations() {
    let mut device = MockGraphicsDevice::new();
    let program = device
        .create_program(&[
            stage(ShaderStage::Vertex, "uniform mat4 MatrWVP;"),
            stage(ShaderStage::Fragment, "uniform float Time;\nuniform mat4 MatrWVP;"),
        ])
        .unwrap();

    assert!(device.uniform_location(program, "MatrWVP").is_some());
    assert!(device.uniform_location(program, "Time").is_some());
    assert!(device.uniform_location(program, "CamLoc").is_none());
}

#[test]
fn test_program_compile_error() {
    let mut device = MockGraphicsDevice::new();
    let result = device.create_program(&[stage(ShaderStage::Vertex, "#error broken")]);
    assert!(result.is_err());
    assert_eq!(device.state().lock().unwrap().live_handle_count(), 0);
}

#[test]
fn test_program_without_stages_fails_to_link() {
    let mut device = MockGraphicsDevice::new();
    assert!(device.create_program(&[]).is_err());
}

#[test]
fn test_set_uniform_records_name() {
    let mut device = MockGraphicsDevice::new();
    let program = device.create_program(&[stage(ShaderStage::Vertex, "uniform float Time;")]).unwrap();
    let location = device.uniform_location(program, "Time").unwrap();
    device.set_uniform(location, UniformValue::Float(2.5));

    let state = device.state();
    let state = state.lock().unwrap();
    assert_eq!(state.uniform_names_set(), vec!["Time".to_string()]);
}

// ============================================================================
// Live handle tracking
// ============================================================================

#[test]
fn test_live_handle_count_follows_create_and_destroy() {
    let mut device = MockGraphicsDevice::new();
    let texture = device.create_texture(&rgba_desc(4, 4)).unwrap();
    let buffer = device.create_buffer(BufferUsage::Vertex, &[0u8; 48]).unwrap();
    let layout = VertexLayout {
        stride: 12,
        attributes: vec![VertexAttribute { location: 0, kind: AttributeType::Float32, components: 3, offset: 0 }],
    };
    let vertex_array = device.create_vertex_array(buffer, None, &layout).unwrap();
    let framebuffer = device.create_framebuffer(&[texture], None).unwrap();

    let state = device.state();
    assert_eq!(state.lock().unwrap().live_handle_count(), 4);

    device.destroy_framebuffer(framebuffer);
    device.destroy_vertex_array(vertex_array);
    device.destroy_buffer(buffer);
    device.destroy_texture(texture);
    assert_eq!(state.lock().unwrap().live_handle_count(), 0);
}

#[test]
fn test_zero_sized_texture_rejected() {
    let mut device = MockGraphicsDevice::new();
    assert!(device.create_texture(&rgba_desc(0, 4)).is_err());
}

#[test]
fn test_rejected_framebuffer() {
    let mut device = MockGraphicsDevice::new();
    device.state().lock().unwrap().reject_framebuffers = true;
    let texture = device.create_texture(&rgba_desc(4, 4)).unwrap();
    assert!(device.create_framebuffer(&[texture], None).is_err());
}

#[test]
fn test_handles_are_unique() {
    let mut device = MockGraphicsDevice::new();
    let a = device.create_buffer(BufferUsage::Vertex, &[1]).unwrap();
    let b = device.create_buffer(BufferUsage::Index, &[2]).unwrap();
    assert_ne!(a, b);
}

// ============================================================================
// Draw recording
// ============================================================================

#[test]
fn test_draw_records_bound_vertex_array() {
    let mut device = MockGraphicsDevice::new();
    let buffer = device.create_buffer(BufferUsage::Vertex, &[0u8; 12]).unwrap();
    let layout = VertexLayout { stride: 12, attributes: vec![] };
    let vertex_array = device.create_vertex_array(buffer, None, &layout).unwrap();

    device.bind_vertex_array(Some(vertex_array));
    device.draw(PrimitiveTopology::TriangleList, 0, 3);
    device.bind_vertex_array(None);
    device.draw(PrimitiveTopology::PointList, 0, 1);

    let state = device.state();
    let state = state.lock().unwrap();
    assert_eq!(state.draws().len(), 2);
    assert_eq!(state.draw_count_for(vertex_array), 1);
    assert_eq!(state.draws()[1].draw_vertex_array(), None);
}

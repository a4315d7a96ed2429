/// Tests for Primitive and PrimitiveSet

use super::*;
use crate::graphics_device::mock_graphics_device::{create_mock_device, DeviceCommand};
use crate::graphics_device::PrimitiveTopology;

fn as_u32(bytes: &[u8]) -> Vec<u32> {
    bytes.chunks_exact(4).map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]])).collect()
}

#[test]
fn test_grid_upload() {
    let (device, state) = create_mock_device();
    let primitive = Primitive::new(&device, "grid", &Topology::grid(2, 2)).unwrap();

    assert_eq!(primitive.vertex_count(), 4);
    assert_eq!(primitive.index_count(), 4);
    assert_eq!(primitive.element_count(), 4);
    assert!(primitive.is_indexed());

    let state = state.lock().unwrap();
    let vertices = &state.buffers[&primitive.vertex_buffer().unwrap()];
    assert_eq!(vertices.len(), 4 * 48);
    let indices = as_u32(&state.buffers[&primitive.index_buffer().unwrap()]);
    assert_eq!(indices, vec![2, 0, 3, 1]);

    let va = &state.vertex_arrays[&primitive.vertex_array().unwrap()];
    assert_eq!(va.layout.stride, 48);
    assert_eq!(va.index_buffer, primitive.index_buffer());
}

#[test]
fn test_restart_index_becomes_u32_max() {
    let (device, state) = create_mock_device();
    let primitive = Primitive::new(&device, "grid", &Topology::grid(2, 3)).unwrap();

    let state = state.lock().unwrap();
    let indices = as_u32(&state.buffers[&primitive.index_buffer().unwrap()]);
    assert_eq!(indices[4], u32::MAX);
}

#[test]
fn test_no_index_buffer_without_indices() {
    let (device, state) = create_mock_device();
    let topology = Topology::trimesh(vec![Vertex::default(); 3], Vec::new());
    let primitive = Primitive::new(&device, "tri", &topology).unwrap();

    assert!(!primitive.is_indexed());
    assert_eq!(state.lock().unwrap().buffers.len(), 1);
}

#[test]
fn test_rejects_out_of_range_index() {
    let (device, state) = create_mock_device();
    let topology = Topology::trimesh(vec![Vertex::default(); 3], vec![0, 1, 3]);

    let result = Primitive::new(&device, "bad", &topology);

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(state.lock().unwrap().live_handle_count(), 0);
}

#[test]
fn test_submit_indexed_uses_index_count() {
    let (device, state) = create_mock_device();
    let primitive = Primitive::new(&device, "grid", &Topology::grid(3, 3)).unwrap();
    state.lock().unwrap().clear_commands();

    primitive.submit(&mut *device.lock().unwrap());

    let state = state.lock().unwrap();
    assert_eq!(state.draws(), vec![DeviceCommand::DrawIndexed {
        topology: PrimitiveTopology::TriangleStrip,
        count: 13,
        vertex_array: primitive.vertex_array(),
    }]);
    assert_eq!(state.commands.last(), Some(&DeviceCommand::BindVertexArray(None)));
}

#[test]
fn test_submit_non_indexed_uses_vertex_count() {
    let (device, state) = create_mock_device();
    let topology = Topology::trimesh(vec![Vertex::default(); 6], Vec::new());
    let primitive = Primitive::new(&device, "tris", &topology).unwrap();
    state.lock().unwrap().clear_commands();

    primitive.submit(&mut *device.lock().unwrap());

    assert_eq!(state.lock().unwrap().draws(), vec![DeviceCommand::Draw {
        topology: PrimitiveTopology::TriangleList,
        first: 0,
        count: 6,
        vertex_array: primitive.vertex_array(),
    }]);
}

#[test]
fn test_drop_releases_all_objects() {
    let (device, state) = create_mock_device();
    let primitive = Primitive::new(&device, "cube", &Topology::cube(1.0, 1.0, 1.0, 2)).unwrap();
    assert_eq!(state.lock().unwrap().live_handle_count(), 3);

    drop(primitive);

    assert_eq!(state.lock().unwrap().live_handle_count(), 0);
}

#[test]
fn test_set_bounds_follow_member_transforms() {
    let (device, _state) = create_mock_device();
    let mut primitives: ResourceManager<PrimitiveKey, Primitive> = ResourceManager::new("primitive");
    let a = primitives.add(Primitive::new(&device, "a", &Topology::cube(2.0, 2.0, 2.0, 2)).unwrap());
    let mut moved = Primitive::new(&device, "b", &Topology::cube(2.0, 2.0, 2.0, 2)).unwrap();
    moved.set_transform(Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
    let b = primitives.add(moved);

    let mut set = PrimitiveSet::new("pair", vec![a, b]);
    set.update_bounds(&primitives);

    assert_eq!(set.bounds(), (Vec3::new(-1.0, -1.0, -1.0), Vec3::new(11.0, 1.0, 1.0)));

    primitives.remove(b);
    set.update_bounds(&primitives);
    assert_eq!(set.bounds(), (Vec3::new(-1.0, -1.0, -1.0), Vec3::ONE));
}

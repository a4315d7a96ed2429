//! Unit tests for buffer.rs

use super::*;

#[test]
fn test_standard_vertex_format() {
    let layout = VertexLayout::from_format("f3f2f3f4").unwrap();

    assert_eq!(layout.stride, 48);
    let offsets: Vec<u32> = layout.attributes.iter().map(|a| a.offset).collect();
    let components: Vec<u32> = layout.attributes.iter().map(|a| a.components).collect();
    let locations: Vec<u32> = layout.attributes.iter().map(|a| a.location).collect();
    assert_eq!(offsets, vec![0, 12, 20, 32]);
    assert_eq!(components, vec![3, 2, 3, 4]);
    assert_eq!(locations, vec![0, 1, 2, 3]);
}

#[test]
fn test_integer_attribute() {
    let layout = VertexLayout::from_format("f3i1").unwrap();
    assert_eq!(layout.attributes[1].kind, AttributeType::Int32);
    assert_eq!(layout.attributes[1].offset, 12);
    assert_eq!(layout.stride, 16);
}

#[test]
fn test_malformed_formats() {
    assert!(VertexLayout::from_format("").is_err());
    assert!(VertexLayout::from_format("f3f").is_err());
    assert!(VertexLayout::from_format("d3").is_err());
    assert!(VertexLayout::from_format("f5").is_err());
    assert!(VertexLayout::from_format("f0").is_err());
}

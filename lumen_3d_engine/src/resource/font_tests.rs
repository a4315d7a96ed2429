/// Tests for G3DF decoding

use super::*;
use glam::Vec3;

fn font_bytes(atlas: (u32, u32)) -> Vec<u8> {
    let mut out = b"G3DF".to_vec();
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&12u32.to_le_bytes());
    for code in 0..GLYPH_COUNT {
        out.extend_from_slice(&(code as f32 / 256.0).to_le_bytes());
    }
    for code in 0..GLYPH_COUNT {
        for corner in 0..4 {
            let v = Vertex::at(Vec3::new(corner as f32, code as f32, 0.0));
            out.extend_from_slice(bytemuck::bytes_of(&v));
        }
    }
    out.extend_from_slice(&atlas.0.to_le_bytes());
    out.extend_from_slice(&atlas.1.to_le_bytes());
    out.extend(std::iter::repeat(255u8).take((atlas.0 * atlas.1 * 4) as usize));
    out
}

#[test]
fn test_decode() {
    let font = FontAsset::decode(&font_bytes((4, 2))).unwrap();

    assert_eq!(font.line_height, 16);
    assert_eq!(font.base_height, 12);
    assert_eq!(font.advance.len(), GLYPH_COUNT);
    assert_eq!(font.advance[128], 0.5);
    assert_eq!(font.glyphs.len(), GLYPH_COUNT);
    assert_eq!(font.glyphs[65][3].position(), Vec3::new(3.0, 65.0, 0.0));
    assert_eq!((font.width, font.height), (4, 2));
    assert_eq!(font.pixels.len(), 32);
}

#[test]
fn test_glyph_topology_is_a_quad_strip() {
    let font = FontAsset::decode(&font_bytes((1, 1))).unwrap();
    let quad = font.glyph_topology(b'A');

    assert_eq!(quad.kind, TopologyKind::TriangleStrip);
    assert_eq!(quad.indices, vec![0, 1, 2, 3]);
    assert_eq!(quad.vertices[0].position().y, 65.0);
}

#[test]
fn test_truncated_atlas() {
    let mut bytes = font_bytes((4, 4));
    bytes.pop();
    assert!(matches!(FontAsset::decode(&bytes), Err(Error::InvalidAsset(_))));
}

#[test]
fn test_wrong_signature() {
    let mut bytes = font_bytes((1, 1));
    bytes[..4].copy_from_slice(b"G3DM");
    assert!(matches!(FontAsset::decode(&bytes), Err(Error::InvalidAsset(_))));
}

#[test]
fn test_missing_font_is_asset_not_found() {
    assert!(matches!(FontAsset::load("/no/such/font.g3df"), Err(Error::AssetNotFound(_))));
}

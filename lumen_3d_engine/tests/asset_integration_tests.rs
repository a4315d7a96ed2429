//! Integration tests for asset decoding through the public API
//!
//! Assets are written to a temporary directory and read back with the
//! loaders the resource managers use. No GPU required.
//!
//! Run with: cargo test --test asset_integration_tests

use std::fs;
use std::path::PathBuf;
use lumen_3d_engine::glam::{Mat4, Vec2, Vec3, Vec4};
use lumen_3d_engine::lumen3d::resource::{
    FontAsset, Image, ModelAsset, Topology, TopologyKind, Vertex, GLYPH_COUNT,
};
use lumen_3d_engine::lumen3d::{Error, SkyboxFaces};

fn asset_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("lumen3d_assets_{}_{}", label, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Little-endian writer for hand-built asset files
#[derive(Default)]
struct AssetWriter(Vec<u8>);

impl AssetWriter {
    fn bytes(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    fn u32(self, value: u32) -> Self {
        self.bytes(&value.to_le_bytes())
    }

    fn i32(self, value: i32) -> Self {
        self.bytes(&value.to_le_bytes())
    }

    fn f32s(self, values: &[f32]) -> Self {
        values.iter().fold(self, |w, v| w.bytes(&v.to_le_bytes()))
    }

    fn vertex(self, vertex: &Vertex) -> Self {
        self.bytes(bytemuck::bytes_of(vertex))
    }

    /// Zero-padded 300-byte name field
    fn name(self, name: &str) -> Self {
        let mut field = [0u8; 300];
        field[..name.len()].copy_from_slice(name.as_bytes());
        self.bytes(&field)
    }
}

fn corner(x: f32, y: f32) -> Vertex {
    Vertex::new(Vec3::new(x, y, 0.0), Vec2::new(x, y), Vec3::Z, Vec4::ONE)
}

// ============================================================================
// IMAGES
// ============================================================================

#[test]
fn test_integration_bmp_decodes_to_bottom_up_bgra() {
    let dir = asset_dir("bmp");
    let path = dir.join("two.bmp");
    // Top row red, bottom row blue
    let pixels = vec![255, 0, 0, 0, 0, 255];
    image::RgbImage::from_raw(1, 2, pixels)
        .unwrap()
        .save_with_format(&path, image::ImageFormat::Bmp)
        .unwrap();

    let loaded = Image::load(&path).unwrap();

    assert_eq!((loaded.width, loaded.height), (1, 2));
    assert_eq!(loaded.pixels, [255, 0, 0, 255, 0, 0, 255, 255]);
}

#[test]
fn test_integration_g24_gets_opaque_alpha() {
    let dir = asset_dir("g24");
    let path = dir.join("tile.g24");
    fs::write(&path, [1, 0, 2, 0, 10, 20, 30, 40, 50, 60]).unwrap();

    let loaded = Image::load(&path).unwrap();

    assert_eq!((loaded.width, loaded.height), (1, 2));
    assert_eq!(loaded.pixels, [10, 20, 30, 255, 40, 50, 60, 255]);
}

#[test]
fn test_integration_missing_and_corrupt_images() {
    let dir = asset_dir("broken");
    fs::write(dir.join("short.g32"), [4, 0, 4, 0, 1, 2, 3]).unwrap();

    assert!(matches!(Image::load(dir.join("absent.bmp")), Err(Error::AssetNotFound(_))));
    assert!(matches!(Image::load(dir.join("short.g32")), Err(Error::InvalidAsset(_))));
}

#[test]
fn test_integration_skybox_face_paths() {
    let faces = SkyboxFaces::bmp_in("sky/day");

    let paths = faces.paths();

    assert_eq!(paths.len(), 6);
    assert!(paths.iter().all(|p| p.starts_with("sky/day")));
    assert!(paths.iter().all(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("bmp"))));
}

// ============================================================================
// GEOMETRY
// ============================================================================

#[test]
fn test_integration_obj_quad_is_fanned() {
    let dir = asset_dir("obj");
    let path = dir.join("quad.obj");
    fs::write(
        &path,
        "# quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1 4//1\n",
    )
    .unwrap();

    let topology = Topology::load_obj(&path).unwrap();

    assert_eq!(topology.kind, TopologyKind::TriangleList);
    assert_eq!(topology.vertices.len(), 4);
    assert_eq!(topology.indices, [0, 1, 2, 0, 2, 3]);
    assert_eq!(topology.bounds(), (Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0)));
}

#[test]
fn test_integration_obj_missing_file() {
    let result = Topology::load_obj(asset_dir("obj_missing").join("none.obj"));

    assert!(matches!(result, Err(Error::AssetNotFound(_))));
}

#[test]
fn test_integration_sphere_normals_point_outward() {
    let mut sphere = Topology::sphere(2.0, 16, 8);
    sphere.eval_normals();

    for vertex in &sphere.vertices {
        let position = vertex.position();
        assert!((position.length() - 2.0).abs() < 1e-3);
        // Poles are degenerate, skip them
        if position.y.abs() < 1.9 {
            assert!(vertex.normal().dot(position) > 0.0, "inward normal at {:?}", position);
        }
    }
}

// ============================================================================
// MODELS AND FONTS
// ============================================================================

/// One triangle part using a half-transparent textured material
fn triangle_model() -> Vec<u8> {
    let mut writer = AssetWriter::default().bytes(b"G3DM").u32(1).u32(1).u32(1);

    writer = writer.u32(3).u32(3).u32(0);
    for vertex in [corner(0.0, 0.0), corner(1.0, 0.0), corner(0.0, 2.0)] {
        writer = writer.vertex(&vertex);
    }
    writer = writer.i32(0).i32(1).i32(2);

    writer = writer
        .name("glass")
        .f32s(&[0.1, 0.1, 0.1, 0.5, 0.6, 0.7, 1.0, 1.0, 1.0, 30.0, 0.5])
        .i32(0);
    for _ in 1..8 {
        writer = writer.i32(-1);
    }
    writer = writer.name("shaders/default/").i32(0);

    writer.name("glass.g32").u32(1).u32(1).u32(7).bytes(&[200, 220, 255, 128]).0
}

#[test]
fn test_integration_model_file_decodes() {
    let dir = asset_dir("model");
    let path = dir.join("triangle.g3dm");
    fs::write(&path, triangle_model()).unwrap();

    let model = ModelAsset::load(&path).unwrap();

    assert_eq!(model.parts.len(), 1);
    assert_eq!(model.parts[0].indices, [0, 1, 2]);
    let material = &model.materials[0];
    assert_eq!(material.name, "glass");
    assert_eq!(material.diffuse, Vec3::new(0.5, 0.6, 0.7));
    assert_eq!(material.opacity, 0.5);
    assert_eq!(material.texture_indices().collect::<Vec<_>>(), [0]);
    assert_eq!(material.shader, "shaders/default/");
    assert_eq!(model.textures[0].pixels, [200, 220, 255, 128]);
    let scale = Mat4::from_scale(Vec3::splat(2.0));
    assert_eq!(model.bounds(&scale), (Vec3::ZERO, Vec3::new(2.0, 4.0, 0.0)));
}

#[test]
fn test_integration_truncated_model_is_invalid() {
    let mut bytes = triangle_model();
    bytes.truncate(bytes.len() - 10);

    assert!(matches!(ModelAsset::decode(&bytes), Err(Error::InvalidAsset(_))));
}

#[test]
fn test_integration_font_file_decodes() {
    let dir = asset_dir("font");
    let path = dir.join("mono.g3df");
    let mut writer = AssetWriter::default().bytes(b"G3DF").u32(16).u32(12);
    writer = writer.f32s(&vec![0.5; GLYPH_COUNT]);
    for _ in 0..GLYPH_COUNT {
        for vertex in [corner(0.0, 0.0), corner(0.0, 1.0), corner(1.0, 0.0), corner(1.0, 1.0)] {
            writer = writer.vertex(&vertex);
        }
    }
    let bytes = writer.u32(2).u32(1).bytes(&[255; 8]).0;
    fs::write(&path, bytes).unwrap();

    let font = FontAsset::load(&path).unwrap();

    assert_eq!((font.line_height, font.base_height), (16, 12));
    assert_eq!(font.glyphs.len(), GLYPH_COUNT);
    assert_eq!((font.width, font.height), (2, 1));
    let glyph = font.glyph_topology(b'A');
    assert_eq!(glyph.kind, TopologyKind::TriangleStrip);
    assert_eq!(glyph.indices, [0, 1, 2, 3]);
}

#[test]
fn test_integration_missing_font_is_asset_not_found() {
    let result = FontAsset::load(asset_dir("font_missing").join("absent.g3df"));

    assert!(matches!(result, Err(Error::AssetNotFound(_))));
}

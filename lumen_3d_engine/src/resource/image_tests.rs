/// Tests for image decoding

use super::*;
use crate::test_utils::temp_dir;

fn raw_header(width: u16, height: u16) -> Vec<u8> {
    let mut bytes = width.to_le_bytes().to_vec();
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes
}

/// Minimal 24-bit bottom-up BMP from its stored rows (BGR triples, unpadded)
fn bmp_24(width: u32, stored_rows: &[&[u8]]) -> Vec<u8> {
    let stride = (width as usize * 3 + 3) & !3;
    let size = (stride * stored_rows.len()) as u32;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&(54 + size).to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&54u32.to_le_bytes());
    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(stored_rows.len() as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&size.to_le_bytes());
    bytes.extend_from_slice(&2835i32.to_le_bytes());
    bytes.extend_from_slice(&2835i32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    for row in stored_rows {
        let mut padded = row.to_vec();
        padded.resize(stride, 0);
        bytes.extend_from_slice(&padded);
    }
    bytes
}

#[test]
fn test_decode_g32() {
    let mut bytes = raw_header(2, 1);
    bytes.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

    let image = Image::decode(&bytes).unwrap();
    assert_eq!((image.width, image.height), (2, 1));
    assert_eq!(image.pixels, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_decode_g24_adds_opaque_alpha() {
    let mut bytes = raw_header(2, 1);
    bytes.extend_from_slice(&[10, 20, 30, 40, 50, 60]);

    let image = Image::decode(&bytes).unwrap();
    assert_eq!(image.pixels, vec![10, 20, 30, 255, 40, 50, 60, 255]);
}

#[test]
fn test_decode_bmp_keeps_stored_byte_order() {
    // Pure red then pure blue, stored as BGR
    let image = Image::decode(&bmp_24(2, &[&[0, 0, 255, 255, 0, 0]])).unwrap();
    assert_eq!((image.width, image.height), (2, 1));
    assert_eq!(image.pixels, vec![0, 0, 255, 255, 255, 0, 0, 255]);
}

#[test]
fn test_bmp_and_g24_with_same_stored_bytes_match() {
    let bmp = Image::decode(&bmp_24(1, &[&[10, 20, 30], &[40, 50, 60]])).unwrap();
    let mut g24 = raw_header(1, 2);
    g24.extend_from_slice(&[10, 20, 30, 40, 50, 60]);
    let g24 = Image::decode(&g24).unwrap();

    assert_eq!((bmp.width, bmp.height), (1, 2));
    assert_eq!(bmp.pixels, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    assert_eq!(bmp, g24);
}

#[test]
fn test_wrong_payload_size_is_invalid() {
    let mut bytes = raw_header(4, 4);
    bytes.extend_from_slice(&[0; 7]);
    assert!(matches!(Image::decode(&bytes), Err(Error::InvalidAsset(_))));
}

#[test]
fn test_too_short() {
    assert!(matches!(Image::decode(&[1, 2]), Err(Error::InvalidAsset(_))));
}

#[test]
fn test_load_missing_file() {
    let dir = temp_dir("image_missing");
    let result = Image::load(dir.join("nope.g32"));
    assert!(matches!(result, Err(Error::AssetNotFound(_))));
}

#[test]
fn test_load_from_file() {
    let dir = temp_dir("image_load");
    let path = dir.join("dot.g32");
    let mut bytes = raw_header(1, 1);
    bytes.extend_from_slice(&[9, 8, 7, 6]);
    std::fs::write(&path, bytes).unwrap();

    let image = Image::load(&path).unwrap();
    assert_eq!(image.pixels, vec![9, 8, 7, 6]);
}

#[test]
fn test_from_bgra_checks_size() {
    assert!(Image::from_bgra(2, 2, vec![0; 16]).is_ok());
    assert!(Image::from_bgra(2, 2, vec![0; 15]).is_err());
}

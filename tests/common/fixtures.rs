#![allow(dead_code)]

use std::io::Cursor;
use std::ops::Range;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use floortile::SegmentRecord;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};

pub const RED: Rgb<u8> = Rgb([255, 0, 0]);

/// A photo whose pixels all differ by position, so untouched areas can be
/// compared pixel by pixel.
pub fn gradient_photo(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 100])
    })
}

pub fn solid_image(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

/// Mask with every pixel in `rows` set to 255
pub fn band_mask(width: u32, height: u32, rows: Range<u32>) -> GrayImage {
    GrayImage::from_fn(width, height, |_, y| {
        if rows.contains(&y) { Luma([255]) } else { Luma([0]) }
    })
}

/// Mask with each `(x, y, width, height)` rectangle set to 255
pub fn rect_mask(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let inside = rects
            .iter()
            .any(|&(rx, ry, rw, rh)| x >= rx && x < rx + rw && y >= ry && y < ry + rh);
        if inside { Luma([255]) } else { Luma([0]) }
    })
}

pub fn encode_png(image: DynamicImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .expect("Failed to encode test image");
    buf.into_inner()
}

/// A segmentation record the way the model returns it: base64 PNG mask
pub fn mask_record(label: &str, mask: &GrayImage) -> SegmentRecord {
    SegmentRecord {
        label: label.to_string(),
        mask: STANDARD.encode(encode_png(DynamicImage::ImageLuma8(mask.clone()))),
        score: Some(0.98),
    }
}

/// Writes a model response JSON file and returns its path
pub fn write_response(dir: &Path, records: &[SegmentRecord]) -> PathBuf {
    let path = dir.join("segmentation.json");
    let json = serde_json::to_vec(records).expect("Failed to serialize records");
    std::fs::write(&path, json).expect("Failed to write response");
    path
}

pub fn write_png(dir: &Path, name: &str, image: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    image
        .save_with_format(&path, ImageFormat::Png)
        .expect("Failed to save test image");
    path
}

pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

use image::{Rgb, RgbImage, imageops};
use tracing::debug;

use crate::error::{FloorError, Result};

/// Resize by averaging every source pixel a destination pixel covers,
/// weighted by the covered fraction. Works for enlarging too, where each
/// destination pixel covers part of a single source pixel.
pub fn resize_area(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (src_w, src_h) = src.dimensions();
    let scale_x = src_w as f64 / width as f64;
    let scale_y = src_h as f64 / height as f64;

    RgbImage::from_fn(width, height, |x, y| {
        let x0 = x as f64 * scale_x;
        let x1 = x0 + scale_x;
        let y0 = y as f64 * scale_y;
        let y1 = y0 + scale_y;

        let col_end = (x1.ceil() as u32).min(src_w);
        let row_end = (y1.ceil() as u32).min(src_h);

        let mut acc = [0f64; 3];
        let mut total = 0f64;
        for sy in (y0.floor() as u32)..row_end {
            let wy = y1.min(sy as f64 + 1.0) - y0.max(sy as f64);
            if wy <= 0.0 {
                continue;
            }
            for sx in (x0.floor() as u32)..col_end {
                let wx = x1.min(sx as f64 + 1.0) - x0.max(sx as f64);
                if wx <= 0.0 {
                    continue;
                }
                let w = wx * wy;
                let p = src.get_pixel(sx, sy);
                for c in 0..3 {
                    acc[c] += w * p[c] as f64;
                }
                total += w;
            }
        }

        if total <= 0.0 {
            return Rgb([0, 0, 0]);
        }
        Rgb(acc.map(|v| (v / total).round().clamp(0.0, 255.0) as u8))
    })
}

/// Area-averaged square copy of the tile. `thumbnail` covers pure
/// downscaling; it interpolates when enlarging, so any axis that grows goes
/// through [`resize_area`].
fn normalize_tile(tile: &RgbImage, tile_size: u32) -> RgbImage {
    if tile.width() >= tile_size && tile.height() >= tile_size {
        imageops::thumbnail(tile, tile_size, tile_size)
    } else {
        resize_area(tile, tile_size, tile_size)
    }
}

/// Build a `width`×`height` texture by repeating the tile sample.
///
/// The tile is always normalized to `tile_size`×`tile_size` first, then laid
/// out `floor(target / tile_size) + 1` times per axis and cropped. Repeats
/// meet with hard edges.
pub fn synthesize(tile: &RgbImage, width: u32, height: u32, tile_size: u32) -> Result<RgbImage> {
    if width == 0 || height == 0 {
        return Err(FloorError::DegenerateGeometry(format!(
            "cannot synthesize a {}x{} texture",
            width, height
        )));
    }
    if tile.width() == 0 || tile.height() == 0 {
        return Err(FloorError::DegenerateGeometry("tile sample is empty".into()));
    }
    if tile_size == 0 {
        return Err(FloorError::InvalidConfig("tile size must be positive".into()));
    }

    let normalized = normalize_tile(tile, tile_size);

    let repeats_x = width / tile_size + 1;
    let repeats_y = height / tile_size + 1;
    let mut canvas = RgbImage::new(repeats_x * tile_size, repeats_y * tile_size);
    for ry in 0..repeats_y {
        for rx in 0..repeats_x {
            imageops::replace(
                &mut canvas,
                &normalized,
                (rx * tile_size) as i64,
                (ry * tile_size) as i64,
            );
        }
    }

    debug!(
        tile_w = tile.width(),
        tile_h = tile.height(),
        repeats_x,
        repeats_y,
        "tiled texture canvas"
    );

    Ok(imageops::crop_imm(&canvas, 0, 0, width, height).to_image())
}

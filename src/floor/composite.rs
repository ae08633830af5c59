use image::{GrayImage, Rgb, RgbImage};

use super::mask::FOREGROUND;
use crate::error::{FloorError, Result};

fn ensure_same_size(what: &str, expected: (u32, u32), actual: (u32, u32)) -> Result<()> {
    if expected != actual {
        return Err(FloorError::DegenerateGeometry(format!(
            "{} is {}x{}, expected {}x{}",
            what, actual.0, actual.1, expected.0, expected.1
        )));
    }
    Ok(())
}

/// Per-pixel selection: warped texture where the mask is foreground,
/// original photo everywhere else.
pub fn select_masked(original: &RgbImage, mask: &GrayImage, warped: &RgbImage) -> Result<RgbImage> {
    let dims = original.dimensions();
    ensure_same_size("mask", dims, mask.dimensions())?;
    ensure_same_size("warped texture", dims, warped.dimensions())?;

    Ok(RgbImage::from_fn(dims.0, dims.1, |x, y| {
        if mask.get_pixel(x, y)[0] == FOREGROUND {
            *warped.get_pixel(x, y)
        } else {
            *original.get_pixel(x, y)
        }
    }))
}

/// `round(alpha * original + (1 - alpha) * masked)` per channel.
pub fn blend(original: &RgbImage, masked: &RgbImage, alpha: f32) -> Result<RgbImage> {
    let dims = original.dimensions();
    ensure_same_size("masked image", dims, masked.dimensions())?;
    if !(0.0..=1.0).contains(&alpha) {
        return Err(FloorError::InvalidConfig(format!(
            "blend alpha must be within [0, 1], got {}",
            alpha
        )));
    }

    let beta = 1.0 - alpha;
    Ok(RgbImage::from_fn(dims.0, dims.1, |x, y| {
        let o = original.get_pixel(x, y);
        let m = masked.get_pixel(x, y);
        let mut out = [0u8; 3];
        for c in 0..3 {
            let value = alpha * o[c] as f32 + beta * m[c] as f32;
            out[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    }))
}

/// Merge the warped texture into the photo under the mask, then soften the
/// replacement by blending the original back in with weight `alpha`.
pub fn composite(
    original: &RgbImage,
    mask: &GrayImage,
    warped: &RgbImage,
    alpha: f32,
) -> Result<RgbImage> {
    let masked = select_masked(original, mask, warped)?;
    blend(original, &masked, alpha)
}

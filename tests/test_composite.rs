//! Integration tests for mask selection and blending.

mod common;

use floortile::floor::composite::{blend, composite, select_masked};
use image::{GrayImage, Rgb, RgbImage};

use common::*;

fn fixtures() -> (RgbImage, GrayImage, RgbImage) {
    let original = gradient_photo(64, 48);
    let mask = band_mask(64, 48, 20..48);
    let warped = RgbImage::from_fn(64, 48, |x, y| Rgb([200, (x * 3) as u8, (y * 5) as u8]));
    (original, mask, warped)
}

#[test]
fn test_selection_follows_mask() -> anyhow::Result<()> {
    let (original, mask, warped) = fixtures();
    let masked = select_masked(&original, &mask, &warped)?;

    for (x, y, p) in masked.enumerate_pixels() {
        if y >= 20 {
            assert_eq!(p, warped.get_pixel(x, y));
        } else {
            assert_eq!(p, original.get_pixel(x, y));
        }
    }
    Ok(())
}

#[test]
fn test_alpha_zero_returns_masked_floor() -> anyhow::Result<()> {
    let (original, mask, warped) = fixtures();
    let masked = select_masked(&original, &mask, &warped)?;
    assert_eq!(composite(&original, &mask, &warped, 0.0)?, masked);
    Ok(())
}

#[test]
fn test_alpha_one_returns_original() -> anyhow::Result<()> {
    let (original, mask, warped) = fixtures();
    assert_eq!(composite(&original, &mask, &warped, 1.0)?, original);
    Ok(())
}

#[test]
fn test_default_alpha_weights_each_channel() -> anyhow::Result<()> {
    let (original, mask, warped) = fixtures();
    let masked = select_masked(&original, &mask, &warped)?;
    let blended = blend(&original, &masked, 0.3)?;

    for (x, y, p) in blended.enumerate_pixels() {
        let o = original.get_pixel(x, y);
        let m = masked.get_pixel(x, y);
        for c in 0..3 {
            let expected = (0.3 * o[c] as f64 + 0.7 * m[c] as f64).round();
            assert!(
                (p[c] as f64 - expected).abs() <= 1.0,
                "channel {} at ({}, {}): {} vs {}",
                c,
                x,
                y,
                p[c],
                expected
            );
        }
    }
    Ok(())
}

#[test]
fn test_unmasked_pixels_are_untouched_by_blend() -> anyhow::Result<()> {
    let (original, mask, warped) = fixtures();
    let out = composite(&original, &mask, &warped, 0.3)?;
    for y in 0..20 {
        for x in 0..64 {
            assert_eq!(out.get_pixel(x, y), original.get_pixel(x, y));
        }
    }
    Ok(())
}

#[test]
fn test_size_mismatch_is_rejected() {
    let (original, mask, _) = fixtures();
    let small = solid_image(10, 10, RED);
    assert!(composite(&original, &mask, &small, 0.3).is_err());
}

//! Integration tests for floor region extraction.
//!
//! Tests cover:
//! - Largest connected region wins
//! - Empty masks fail with the empty-mask error
//! - Masks are resized to the photo and binarized

mod common;

use floortile::floor::mask::{FOREGROUND, extract_floor_region, outer_contours};
use image::{GrayImage, Luma};

use common::*;

#[test]
fn test_two_regions_keep_the_larger() -> anyhow::Result<()> {
    // 10x10 = 100 pixels and 20x25 = 500 pixels, well apart
    let mask = rect_mask(100, 60, &[(5, 5, 10, 10), (40, 10, 20, 25)]);

    let region = extract_floor_region(&mask, 100, 60, 127)?;

    assert_eq!(region.contour.bounds(), Some((40, 10, 59, 34)));
    assert_eq!(region.contour.len(), 4, "rectangle should compress to its corners");
    assert_eq!(region.contour.area(), 19.0 * 24.0);

    // Only the kept region remains foreground
    assert_eq!(region.mask.get_pixel(45, 20)[0], FOREGROUND);
    assert_eq!(region.mask.get_pixel(8, 8)[0], 0);
    let foreground = region.mask.pixels().filter(|p| p[0] == FOREGROUND).count();
    assert_eq!(foreground, 20 * 25);
    Ok(())
}

#[test]
fn test_all_background_mask_is_empty() {
    let mask = GrayImage::new(64, 48);
    let err = extract_floor_region(&mask, 64, 48, 127).unwrap_err();
    assert!(err.is_empty_mask(), "unexpected error: {}", err);
    assert!(matches!(
        err,
        FloorError::NoFloorDetected(NoFloorCause::EmptyMask)
    ));
}

#[test]
fn test_values_below_threshold_are_background() {
    let mask = GrayImage::from_pixel(32, 32, Luma([100]));
    let err = extract_floor_region(&mask, 32, 32, 127).unwrap_err();
    assert!(err.is_empty_mask());
}

#[test]
fn test_single_pixel_still_yields_a_contour() -> anyhow::Result<()> {
    let mask = rect_mask(20, 20, &[(7, 9, 1, 1)]);
    let region = extract_floor_region(&mask, 20, 20, 127)?;
    assert!(!region.contour.is_empty());
    assert_eq!(region.contour.bounds(), Some((7, 9, 7, 9)));
    assert_eq!(region.contour.area(), 0.0);
    Ok(())
}

#[test]
fn test_mask_is_resized_to_photo_and_binarized() -> anyhow::Result<()> {
    // Model masks usually arrive at a lower resolution than the photo
    let small = band_mask(40, 30, 15..30);

    let region = extract_floor_region(&small, 400, 300, 127)?;

    assert_eq!(region.mask.dimensions(), (400, 300));
    assert!(region.mask.pixels().all(|p| p[0] == 0 || p[0] == FOREGROUND));

    let (min_x, min_y, max_x, max_y) = region.contour.bounds().expect("non-empty contour");
    assert_eq!((min_x, max_x), (0, 399));
    assert_eq!(max_y, 299);
    assert!((140..=160).contains(&min_y), "floor should start near row 150, got {}", min_y);
    Ok(())
}

#[test]
fn test_holes_do_not_count_as_contours() -> anyhow::Result<()> {
    // 30x30 square with a 10x10 hole punched in the middle
    let mut mask = rect_mask(50, 50, &[(10, 10, 30, 30)]);
    for y in 20..30 {
        for x in 20..30 {
            mask.put_pixel(x, y, Luma([0]));
        }
    }

    let contours = outer_contours(&mask);
    assert_eq!(contours.len(), 1);

    let region = extract_floor_region(&mask, 50, 50, 127)?;
    assert_eq!(region.contour.bounds(), Some((10, 10, 39, 39)));
    assert_eq!(region.contour.area(), 29.0 * 29.0);
    assert_eq!(region.mask.get_pixel(25, 25)[0], 0);
    assert_eq!(region.mask.get_pixel(12, 12)[0], FOREGROUND);
    Ok(())
}

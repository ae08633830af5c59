use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};
use imageproc::map::map_colors;
use imageproc::point::Point;
use imageproc::region_labelling::{Connectivity, connected_components};
use tracing::debug;

use crate::error::{FloorError, Result};
use crate::models::Contour;

/// Mask value marking floor pixels after binarization
pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// The binarized mask of the dominant floor region together with its contour
#[derive(Debug, Clone)]
pub struct FloorRegion {
    pub mask: GrayImage,
    pub contour: Contour,
}

/// Resize a mask to the photo's dimensions using bilinear interpolation
pub fn resize_mask(mask: &GrayImage, width: u32, height: u32) -> GrayImage {
    if mask.dimensions() == (width, height) {
        return mask.clone();
    }
    imageops::resize(mask, width, height, FilterType::Triangle)
}

/// Threshold a mask into a strict two-level grid
pub fn binarize(mask: &GrayImage, threshold: u8) -> GrayImage {
    map_colors(mask, |p: Luma<u8>| {
        if p[0] > threshold {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

/// Outer boundaries of every connected foreground region.
/// Holes are ignored and each boundary keeps only its turning points.
pub fn outer_contours(binary: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| Contour::new(compress_chain(&c.points)))
        .collect()
}

/// Drop points that continue a horizontal, vertical or diagonal run,
/// keeping only the points where the boundary changes direction.
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let step = |from: Point<i32>, to: Point<i32>| ((to.x - from.x).signum(), (to.y - from.y).signum());

    let kept: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            step(prev, cur) != step(cur, next)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() { points.to_vec() } else { kept }
}

/// Clear every foreground pixel not 8-connected to `seed`.
pub fn retain_component(binary: &GrayImage, seed: Point<i32>) -> GrayImage {
    let labels = connected_components(binary, Connectivity::Eight, Luma([BACKGROUND]));
    let keep = labels.get_pixel(seed.x as u32, seed.y as u32)[0];
    map_colors(&labels, |label: Luma<u32>| {
        if keep != 0 && label[0] == keep {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

/// Turn a raw segmentation mask into the single largest floor contour.
///
/// The mask is resized to `width`×`height`, binarized at `threshold`, and its
/// outer contours are ranked by enclosed area. Only the winning region stays
/// foreground in the returned mask. Fails with an empty-mask
/// error when no foreground pixel survives thresholding.
pub fn extract_floor_region(
    mask: &GrayImage,
    width: u32,
    height: u32,
    threshold: u8,
) -> Result<FloorRegion> {
    let resized = resize_mask(mask, width, height);
    let binary = binarize(&resized, threshold);

    let contours = outer_contours(&binary);
    debug!(count = contours.len(), "found outer contours");

    let contour = contours
        .into_iter()
        .max_by(|a, b| a.area().total_cmp(&b.area()))
        .ok_or_else(FloorError::empty_mask)?;

    debug!(area = contour.area(), points = contour.len(), "selected floor contour");

    let mask = match contour.points.first() {
        Some(&seed) => retain_component(&binary, seed),
        None => binary,
    };
    Ok(FloorRegion { mask, contour })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_keeps_rectangle_corners() {
        let mut points = Vec::new();
        for x in 0..5 {
            points.push(Point::new(x, 0));
        }
        for y in 1..3 {
            points.push(Point::new(4, y));
        }
        for x in (0..5).rev() {
            points.push(Point::new(x, 3));
        }
        for y in (1..3).rev() {
            points.push(Point::new(0, y));
        }

        let compressed = compress_chain(&points);
        assert_eq!(
            compressed,
            vec![
                Point::new(0, 0),
                Point::new(4, 0),
                Point::new(4, 3),
                Point::new(0, 3),
            ]
        );
    }

    #[test]
    fn compress_collapses_line_to_endpoints() {
        let points = vec![
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(2, 0),
            Point::new(1, 0),
        ];
        assert_eq!(
            compress_chain(&points),
            vec![Point::new(0, 0), Point::new(2, 0)]
        );
    }

    #[test]
    fn binarize_is_strictly_two_level() {
        let mask = GrayImage::from_fn(4, 1, |x, _| Luma([[0, 127, 128, 255][x as usize]]));
        let binary = binarize(&mask, 127);
        let values: Vec<u8> = binary.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![0, 0, 255, 255]);
    }
}

//! Perspective mapping of the tiled texture onto the floor's oriented
//! bounding rectangle.
//!
//! The homography is solved exactly from four correspondences (8×8 linear
//! system with `h33 = 1`) and handed to `imageproc`'s projective warp, which
//! inverse maps every output pixel back into texture space.

use image::{Rgb, Rgb32FImage, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use imageproc::geometry::convex_hull;
use imageproc::map::map_colors;
use imageproc::point::Point;
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

use crate::error::{FloorError, Result};
use crate::models::{Contour, OrientedQuad};

/// Cross products below this are treated as collinear.
const COLLINEAR_EPS: f64 = 1e-9;

/// A 3×3 projective transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    pub matrix: Matrix3<f64>,
}

impl Homography {
    /// Solve for the homography mapping each `src[i]` onto `dst[i]` exactly.
    pub fn from_correspondences(src: &[(f64, f64); 4], dst: &[(f64, f64); 4]) -> Result<Self> {
        ensure_non_degenerate(src, "source")?;
        ensure_non_degenerate(dst, "destination")?;

        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for (i, (&(x, y), &(u, v))) in src.iter().zip(dst.iter()).enumerate() {
            let r = 2 * i;
            a[(r, 0)] = x;
            a[(r, 1)] = y;
            a[(r, 2)] = 1.0;
            a[(r, 6)] = -u * x;
            a[(r, 7)] = -u * y;
            b[r] = u;

            a[(r + 1, 3)] = x;
            a[(r + 1, 4)] = y;
            a[(r + 1, 5)] = 1.0;
            a[(r + 1, 6)] = -v * x;
            a[(r + 1, 7)] = -v * y;
            b[r + 1] = v;
        }

        let h = a.lu().solve(&b).ok_or_else(|| {
            FloorError::DegenerateGeometry("corner correspondences are singular".into())
        })?;

        Ok(Self {
            matrix: Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0),
        })
    }

    /// Map a point; `None` when it lands on the line at infinity.
    pub fn apply(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let p = self.matrix * Vector3::new(x, y, 1.0);
        if p[2].abs() < 1e-12 {
            return None;
        }
        Some((p[0] / p[2], p[1] / p[2]))
    }

    pub fn inverse(&self) -> Result<Self> {
        self.matrix
            .try_inverse()
            .map(|matrix| Self { matrix })
            .ok_or_else(|| FloorError::DegenerateGeometry("homography is not invertible".into()))
    }
}

/// Fails when any three of the four points are collinear (or coincide).
fn ensure_non_degenerate(points: &[(f64, f64); 4], which: &str) -> Result<()> {
    for skip in 0..4 {
        let tri: Vec<(f64, f64)> = (0..4).filter(|&i| i != skip).map(|i| points[i]).collect();
        let (ax, ay) = tri[0];
        let (bx, by) = tri[1];
        let (cx, cy) = tri[2];
        let cross = (bx - ax) * (cy - ay) - (by - ay) * (cx - ax);
        if cross.abs() < COLLINEAR_EPS {
            return Err(FloorError::DegenerateGeometry(format!(
                "{} corners are collinear: {:?}",
                which, points
            )));
        }
    }
    Ok(())
}

/// Rotating calipers over the integer convex hull: the smallest enclosing
/// rectangle has one side flush with a hull edge, so every hull edge
/// direction is tried. Corners stay in floating point.
/// Returns `None` when the points do not span an area.
pub fn min_area_rect(points: &[Point<i32>]) -> Option<[(f64, f64); 4]> {
    let mut unique = points.to_vec();
    unique.sort_by_key(|p| (p.x, p.y));
    unique.dedup();

    let hull: Vec<(f64, f64)> = convex_hull(unique)
        .into_iter()
        .map(|p| (p.x as f64, p.y as f64))
        .collect();
    if hull.len() < 3 {
        return None;
    }

    let mut best: Option<(f64, [(f64, f64); 4])> = None;
    for i in 0..hull.len() {
        let p = hull[i];
        let q = hull[(i + 1) % hull.len()];
        let len = (q.0 - p.0).hypot(q.1 - p.1);
        if len == 0.0 {
            continue;
        }
        let edge = ((q.0 - p.0) / len, (q.1 - p.1) / len);
        let normal = (-edge.1, edge.0);

        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in &hull {
            let u = x * edge.0 + y * edge.1;
            let v = x * normal.0 + y * normal.1;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        let area = (max_u - min_u) * (max_v - min_v);
        if best.as_ref().is_none_or(|(best_area, _)| area < *best_area) {
            let corners = [(min_u, min_v), (max_u, min_v), (max_u, max_v), (min_u, max_v)]
                .map(|(u, v)| (u * edge.0 + v * normal.0, u * edge.1 + v * normal.1));
            best = Some((area, corners));
        }
    }

    best.filter(|(area, _)| *area > 0.0).map(|(_, corners)| corners)
}

/// Minimum-area rotated rectangle around the contour, in canonical winding.
pub fn oriented_quad(contour: &Contour) -> Result<OrientedQuad> {
    if contour.area() <= 0.0 {
        return Err(FloorError::DegenerateGeometry(format!(
            "floor contour of {} points encloses no area",
            contour.len()
        )));
    }

    let corners = min_area_rect(&contour.points).ok_or_else(|| {
        FloorError::DegenerateGeometry("floor contour points are collinear".into())
    })?;
    let quad = OrientedQuad::from_unordered(corners);

    if quad.area() <= 0.0 {
        return Err(FloorError::DegenerateGeometry("oriented rectangle has no area".into()));
    }
    Ok(quad)
}

/// Corners of a `width`×`height` texture: top-left, top-right, bottom-right,
/// bottom-left.
pub fn texture_corners(width: u32, height: u32) -> [(f64, f64); 4] {
    let (w, h) = (width as f64, height as f64);
    [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
}

/// Copy of `texture` as floating point samples with its edge pixels
/// repeated one pixel out on every side.
fn pad_edges(texture: &RgbImage) -> Rgb32FImage {
    let (w, h) = texture.dimensions();
    Rgb32FImage::from_fn(w + 2, h + 2, |x, y| {
        let sx = x.saturating_sub(1).min(w - 1);
        let sy = y.saturating_sub(1).min(h - 1);
        Rgb(texture.get_pixel(sx, sy).0.map(f32::from))
    })
}

/// Resample `texture` through `homography` onto a `width`×`height` canvas
/// with bilinear interpolation. Output pixels whose pre-image falls outside
/// the texture stay black.
pub fn warp_texture(
    texture: &RgbImage,
    homography: &Homography,
    width: u32,
    height: u32,
) -> Result<RgbImage> {
    let (tw, th) = texture.dimensions();
    if tw == 0 || th == 0 {
        return Err(FloorError::DegenerateGeometry("texture is empty".into()));
    }

    let m = &homography.matrix;
    let to_output = Projection::from_matrix([
        m[(0, 0)] as f32,
        m[(0, 1)] as f32,
        m[(0, 2)] as f32,
        m[(1, 0)] as f32,
        m[(1, 1)] as f32,
        m[(1, 2)] as f32,
        m[(2, 0)] as f32,
        m[(2, 1)] as f32,
        m[(2, 2)] as f32,
    ])
    .ok_or_else(|| FloorError::DegenerateGeometry("homography is not invertible".into()))?;

    // Texture coordinates put pixel centres at half-integers; the padded
    // image has them at integers, shifted by the one pixel border.
    let projection = Projection::translate(-0.5, -0.5).and_then(to_output);

    let padded = pad_edges(texture);
    let mut warped = Rgb32FImage::new(width, height);
    warp_into(
        &padded,
        &projection,
        Interpolation::Bilinear,
        Rgb([0.0, 0.0, 0.0]),
        &mut warped,
    );

    Ok(map_colors(&warped, |p: Rgb<f32>| {
        Rgb(p.0.map(|v| v.round().clamp(0.0, 255.0) as u8))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_correspondence_gives_identity() {
        let corners = texture_corners(40, 30);
        let h = Homography::from_correspondences(&corners, &corners).unwrap();
        assert!((h.matrix - Matrix3::identity()).abs().max() < 1e-9);
    }

    #[test]
    fn collinear_destination_is_rejected() {
        let src = texture_corners(10, 10);
        let dst = [(0.0, 0.0), (5.0, 5.0), (10.0, 10.0), (0.0, 10.0)];
        let err = Homography::from_correspondences(&src, &dst).unwrap_err();
        assert_eq!(err.kind(), "degenerate_geometry");
    }

    #[test]
    fn coincident_points_are_rejected() {
        let src = texture_corners(10, 10);
        let dst = [(3.0, 3.0); 4];
        assert!(Homography::from_correspondences(&src, &dst).is_err());
    }

    #[test]
    fn min_area_rect_of_rotated_rectangle() {
        let corners = [(2.0, 0.0), (8.0, 3.0), (6.0, 7.0), (0.0, 4.0)];
        let points = [(6, 7), (2, 0), (4, 3), (0, 4), (8, 3), (2, 0)].map(|(x, y)| Point::new(x, y));
        let rect = min_area_rect(&points).unwrap();
        let quad = OrientedQuad::from_unordered(rect);
        assert!((quad.area() - 30.0).abs() < 1e-9);
        for (got, want) in quad.corners.iter().zip(corners) {
            assert!((got.0 - want.0).abs() < 1e-9 && (got.1 - want.1).abs() < 1e-9);
        }
    }

    #[test]
    fn min_area_rect_needs_area() {
        let diagonal = [Point::new(0, 0), Point::new(1, 1), Point::new(2, 2)];
        assert!(min_area_rect(&diagonal).is_none());
        assert!(min_area_rect(&[Point::new(5, 5); 3]).is_none());
    }

    #[test]
    fn warp_interpolates_between_texels() {
        let texture = RgbImage::from_fn(2, 1, |x, _| if x == 0 { Rgb([0, 0, 0]) } else { Rgb([100, 100, 100]) });
        // Stretch 2x1 onto 4x1: output pixels sample u = 0.25, 0.75, 1.25, 1.75
        let h = Homography::from_correspondences(
            &texture_corners(2, 1),
            &[(-0.5, -0.5), (3.5, -0.5), (3.5, 0.5), (-0.5, 0.5)],
        )
        .unwrap();
        let warped = warp_texture(&texture, &h, 4, 1).unwrap();
        assert_eq!(*warped.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*warped.get_pixel(3, 0), Rgb([100, 100, 100]));
        let mid = warped.get_pixel(1, 0)[0];
        assert!(mid > 0 && mid < 100, "{}", mid);
    }
}

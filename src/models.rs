use imageproc::geometry::contour_area;
use imageproc::point::Point;

/// Outer boundary of one connected mask region, reduced to its turning points.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed polygon area (shoelace formula).
    pub fn area(&self) -> f64 {
        contour_area(&self.points)
    }

    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let first = self.points.first()?;
        Some(self.points.iter().fold(
            (first.x, first.y, first.x, first.y),
            |(min_x, min_y, max_x, max_y), p| {
                (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
            },
        ))
    }
}

/// Corners of a rotated rectangle in top-left, top-right, bottom-right,
/// bottom-left order (clockwise on screen).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedQuad {
    pub corners: [(f64, f64); 4],
}

impl OrientedQuad {
    /// Re-orders four corners into the canonical winding.
    ///
    /// Corners are sorted by angle around their centroid (y grows downward, so
    /// increasing angle runs clockwise on screen) and rotated so the corner
    /// with the smallest `x + y` comes first.
    pub fn from_unordered(mut corners: [(f64, f64); 4]) -> Self {
        let cx = corners.iter().map(|c| c.0).sum::<f64>() / 4.0;
        let cy = corners.iter().map(|c| c.1).sum::<f64>() / 4.0;
        corners.sort_by(|a, b| {
            let ta = (a.1 - cy).atan2(a.0 - cx);
            let tb = (b.1 - cy).atan2(b.0 - cx);
            ta.total_cmp(&tb)
        });

        let start = (0..4)
            .min_by(|&i, &j| {
                let si = corners[i].0 + corners[i].1;
                let sj = corners[j].0 + corners[j].1;
                si.total_cmp(&sj)
                    .then_with(|| corners[i].1.total_cmp(&corners[j].1))
            })
            .unwrap_or(0);
        corners.rotate_left(start);

        Self { corners }
    }

    pub fn area(&self) -> f64 {
        let mut twice_area = 0.0;
        for i in 0..4 {
            let (x0, y0) = self.corners[i];
            let (x1, y1) = self.corners[(i + 1) % 4];
            twice_area += x0 * y1 - x1 * y0;
        }
        (twice_area / 2.0).abs()
    }
}

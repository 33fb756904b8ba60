//! Quadrilateral bookkeeping for page rectification: corner role
//! assignment, contour area, and the paper-likeness score.

use imageproc::point::Point;

/// ISO-216 paper sides are in a 1:sqrt(2) ratio; a warped page whose aspect
/// lands on that ratio scores exactly 100.
pub const PAPER_RATIO: f32 = std::f32::consts::SQRT_2;

/// Lower edge of the acceptance window: the rectified aspect may be at most
/// 1.2x the paper ratio.
pub const LIKENESS_MIN: f32 = 100.0 / 1.2;

/// Upper edge of the acceptance window: the rectified aspect may be at most
/// 0.8x the paper ratio.
pub const LIKENESS_MAX: f32 = 100.0 / 0.8;

/// The four corners of a located page, in role order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corners {
    pub top_left: (f32, f32),
    pub top_right: (f32, f32),
    pub bottom_right: (f32, f32),
    pub bottom_left: (f32, f32),
}

impl Corners {
    /// Assign corner roles to four points of a convex quadrilateral.
    ///
    /// The point with the smallest x+y is the top-left corner and the
    /// largest x+y the bottom-right; of the remaining two, the smaller y-x
    /// is the top-right corner (image coordinates grow downward). Equal
    /// sums are broken by x, so the assignment depends only on the point
    /// set, not its order.
    pub fn order(points: [Point<i32>; 4]) -> Corners {
        let mut by_sum = points;
        by_sum.sort_by_key(|p| (p.x + p.y, p.x));
        let top_left = by_sum[0];
        let bottom_right = by_sum[3];

        let (a, b) = (by_sum[1], by_sum[2]);
        let (top_right, bottom_left) = if a.y - a.x <= b.y - b.x {
            (a, b)
        } else {
            (b, a)
        };

        Corners {
            top_left: to_f32(top_left),
            top_right: to_f32(top_right),
            bottom_right: to_f32(bottom_right),
            bottom_left: to_f32(bottom_left),
        }
    }

    /// Width and height of the axis-aligned target rectangle: the larger of
    /// each pair of opposing side lengths.
    pub fn target_size(&self) -> (f32, f32) {
        let width = distance(self.bottom_right, self.bottom_left)
            .max(distance(self.top_right, self.top_left));
        let height = distance(self.top_right, self.bottom_right)
            .max(distance(self.top_left, self.bottom_left));
        (width.max(1.0), height.max(1.0))
    }
}

fn to_f32(p: Point<i32>) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

/// Euclidean distance between two points.
pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Enclosed area of a closed contour by the shoelace formula.
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut doubled = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        doubled += i64::from(p.x) * i64::from(q.y) - i64::from(q.x) * i64::from(p.y);
    }
    (doubled.abs() as f64) / 2.0
}

/// How closely a width/height pair matches the ISO-216 paper ratio.
///
/// Symmetric in its arguments; equals 100 when the aspect ratio is exactly
/// 1:sqrt(2) and falls off as the rectangle gets more stretched.
pub fn likeness(width: f32, height: f32) -> f32 {
    let ratio = width.max(height) / width.min(height).max(f32::EPSILON);
    PAPER_RATIO / ratio * 100.0
}

/// Whether a likeness score is close enough to the paper reference for the
/// warped image to be trusted over the original.
pub fn within_acceptance(likeness: f32) -> bool {
    (LIKENESS_MIN..=LIKENESS_MAX).contains(&likeness)
}

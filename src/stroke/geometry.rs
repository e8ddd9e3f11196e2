use crate::foundation::core::Point;

/// Euclidean distance between two points.
pub fn dist(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Total arc length of a polyline (sum of consecutive segment lengths).
///
/// Empty and single-point polylines have length 0.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| dist(w[0], w[1])).sum()
}

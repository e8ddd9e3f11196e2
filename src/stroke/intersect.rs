use crate::foundation::core::Point;

/// Two strokes touch when any pair of their points is closer than this many pixels.
pub const ERASE_RADIUS: f64 = 10.0;

/// Return `true` when any point of `a` lies strictly within [`ERASE_RADIUS`] of any point of `b`.
///
/// Pairwise scan; stops at the first hit.
pub fn intersects(a: &[Point], b: &[Point]) -> bool {
    let r2 = ERASE_RADIUS * ERASE_RADIUS;
    a.iter()
        .any(|p| b.iter().any(|q| (p.x - q.x).powi(2) + (p.y - q.y).powi(2) < r2))
}

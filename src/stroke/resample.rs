use crate::foundation::core::Point;
use crate::stroke::geometry::{dist, polyline_length};

/// Arc length between consecutive output points the target count is derived from.
pub const SAMPLE_SPACING: f64 = 5.0;
/// Lower clamp for the target point count.
pub const MIN_POINTS: usize = 30;
/// Upper clamp for the target point count.
pub const MAX_POINTS: usize = 300;

/// Target point count for a polyline of arc length `len`: `clamp(floor(len / 5), 30, 300)`.
pub fn target_point_count(len: f64) -> usize {
    let raw = (len / SAMPLE_SPACING).floor();
    if !raw.is_finite() || raw <= MIN_POINTS as f64 {
        return MIN_POINTS;
    }
    (raw as usize).min(MAX_POINTS)
}

/// Redistribute `raw` so consecutive output points sit at equal arc-length intervals.
///
/// Inputs with no more points than the target count are returned unchanged (no upsampling).
/// Otherwise the first and last output points are exactly the first and last raw points and
/// interior points are linearly interpolated along the raw segments. If the walk runs off the
/// end of the raw polyline before every target is placed (zero-length trailing segments), the
/// final raw point is still appended and the output is shorter than the target count.
pub fn resample(raw: &[Point]) -> Vec<Point> {
    let total = polyline_length(raw);
    let n = target_point_count(total);
    if raw.len() <= n {
        return raw.to_vec();
    }

    let spacing = total / (n - 1) as f64;
    let mut out = Vec::with_capacity(n);
    out.push(raw[0]);

    // `walked` is the arc length from raw[0] to `prev`, the last raw vertex passed.
    let mut walked = 0.0;
    let mut next = 1;
    let mut prev = raw[0];
    for k in 1..n - 1 {
        let target = spacing * k as f64;
        while next < raw.len() && walked + dist(prev, raw[next]) < target {
            walked += dist(prev, raw[next]);
            prev = raw[next];
            next += 1;
        }
        if next >= raw.len() {
            break;
        }

        let seg = dist(prev, raw[next]);
        if seg <= f64::EPSILON {
            out.push(prev);
            continue;
        }
        let frac = (target - walked) / seg;
        out.push(prev.lerp(raw[next], frac));
    }

    out.push(raw[raw.len() - 1]);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/stroke/resample.rs"]
mod tests;

use crate::foundation::core::{Point, Rgba8, Vec2};
use crate::params::GlobalParameters;
use crate::stroke::model::VectorStroke;

/// Animation time of a stroke: `t_secs * speed + phase`.
pub fn effective_time(t_secs: f64, speed: f64, phase: f64) -> f64 {
    t_secs * speed + phase
}

/// Rotational jitter offset of point `i` at animation time `tau`.
pub fn rotation_offset(i: usize, tau: f64, intensity: f64) -> Vec2 {
    let fi = i as f64;
    let theta = tau + fi * 0.6;
    let r = intensity * (0.5 + 0.5 * (theta * 1.3 + fi).sin());
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Slow drift offset of point `i` at animation time `tau`.
pub fn float_offset(i: usize, tau: f64, intensity: f64) -> Vec2 {
    let fi = i as f64;
    Vec2::new(
        (tau * 0.2 + fi * 0.1).sin() * intensity,
        (tau * 0.15 + fi * 0.08).cos() * intensity,
    )
}

/// Final drawn position of point `i`.
pub fn jiggle_point(p: Point, i: usize, tau: f64, params: &GlobalParameters) -> Point {
    p + rotation_offset(i, tau, params.jiggle_intensity)
        + float_offset(i, tau, params.float_intensity)
}

/// Displaced copy of every point of `stroke` at animation time `tau`.
pub fn jiggle_points(stroke: &VectorStroke, tau: f64, params: &GlobalParameters) -> Vec<Point> {
    stroke
        .points()
        .iter()
        .enumerate()
        .map(|(i, &p)| jiggle_point(p, i, tau, params))
        .collect()
}

/// Width of the breathing outline pass.
pub fn breathing_width(size: f64, thickness_intensity: f64, tau: f64) -> f64 {
    size + thickness_intensity * tau.sin()
}

/// One polyline to stroke with round joins and caps.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokePass {
    pub points: Vec<Point>,
    pub width: f64,
    pub color: Rgba8,
}

/// Everything drawn for one stroke in one frame, in draw order.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeGeometry {
    pub passes: Vec<StrokePass>,
}

/// Pure mapping from `(stroke, seconds, params)` to drawn geometry.
///
/// The first pass is the jiggled path at the stroke's base width. When thickness is enabled a
/// second pass redraws the undisplaced path with an oscillating width; it is skipped for frames
/// where that width is not positive.
pub fn stroke_geometry(
    stroke: &VectorStroke,
    t_secs: f64,
    params: &GlobalParameters,
) -> StrokeGeometry {
    let tau = effective_time(t_secs, params.jiggle_speed, stroke.phase());
    let mut passes = Vec::with_capacity(2);
    passes.push(StrokePass {
        points: jiggle_points(stroke, tau, params),
        width: stroke.size(),
        color: stroke.color(),
    });

    if params.thickness_intensity > 0.0 {
        let width = breathing_width(stroke.size(), params.thickness_intensity, tau);
        if width > 0.0 {
            passes.push(StrokePass {
                points: stroke.points().to_vec(),
                width,
                color: stroke.color(),
            });
        }
    }

    StrokeGeometry { passes }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/jiggle.rs"]
mod tests;

use crate::animation::jiggle::stroke_geometry;
use crate::foundation::core::{Point, Rgba8};
use crate::params::GlobalParameters;
use crate::render::surface::{LineStyle, Surface};
use crate::stroke::model::{StrokeSet, VectorStroke};

/// In-progress gesture drawn on top of the committed strokes, without animation.
#[derive(Clone, Copy, Debug)]
pub struct Preview<'a> {
    pub points: &'a [Point],
    pub style: LineStyle,
}

/// Draw one stroke at `t_secs` seconds of animation time.
///
/// Mutates only `surface`.
pub fn render_stroke(
    surface: &mut dyn Surface,
    stroke: &VectorStroke,
    t_secs: f64,
    params: &GlobalParameters,
) {
    for pass in stroke_geometry(stroke, t_secs, params).passes {
        surface.stroke_polyline(
            &pass.points,
            &LineStyle {
                width: pass.width,
                color: pass.color,
            },
        );
    }
}

/// Repaint the whole surface: background, every stroke in set order, then the preview.
///
/// Nothing carries over between frames, so only the current iteration order of `strokes`
/// matters.
pub fn render_scene(
    surface: &mut dyn Surface,
    strokes: &StrokeSet,
    preview: Option<Preview<'_>>,
    t_secs: f64,
    params: &GlobalParameters,
    background: Rgba8,
) {
    surface.clear(background);
    for stroke in strokes {
        render_stroke(surface, stroke, t_secs, params);
    }
    if let Some(preview) = preview {
        surface.stroke_polyline(preview.points, &preview.style);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;

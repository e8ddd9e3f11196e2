use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{SketchError, SketchResult};
use crate::foundation::math::Rng64;
use crate::stroke::resample::resample;
use serde::{Deserialize, Serialize};

/// Exclusive upper bound of a stroke's animation phase.
pub const PHASE_RANGE: f64 = 1000.0;

/// Color assumed for serialized strokes that predate per-stroke color.
pub const LEGACY_COLOR: Rgba8 = Rgba8::BLACK;
/// Width assumed for serialized strokes that predate per-stroke size.
pub const LEGACY_SIZE: f64 = 3.0;

/// A committed, resampled stroke.
///
/// Immutable once created: only its membership in a [`StrokeSet`] changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VectorStrokeDef")]
pub struct VectorStroke {
    points: Vec<Point>,
    phase: f64,
    color: Rgba8,
    size: f64,
}

#[derive(Deserialize)]
struct VectorStrokeDef {
    points: Vec<Point>,
    phase: f64,
    #[serde(default = "legacy_color")]
    color: Rgba8,
    #[serde(default = "legacy_size")]
    size: f64,
}

fn legacy_color() -> Rgba8 {
    LEGACY_COLOR
}

fn legacy_size() -> f64 {
    LEGACY_SIZE
}

impl TryFrom<VectorStrokeDef> for VectorStroke {
    type Error = SketchError;

    fn try_from(def: VectorStrokeDef) -> SketchResult<Self> {
        Self::new(def.points, def.phase, def.color, def.size)
    }
}

impl VectorStroke {
    /// Build a stroke from already-vectorized points.
    pub fn new(points: Vec<Point>, phase: f64, color: Rgba8, size: f64) -> SketchResult<Self> {
        if points.len() < 2 {
            return Err(SketchError::validation("stroke needs at least 2 points"));
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(SketchError::validation("stroke points must be finite"));
        }
        if !(0.0..PHASE_RANGE).contains(&phase) {
            return Err(SketchError::validation(format!(
                "stroke phase must be in [0, {PHASE_RANGE}), got {phase}"
            )));
        }
        if !size.is_finite() || size <= 0.0 {
            return Err(SketchError::validation("stroke size must be > 0"));
        }
        Ok(Self {
            points,
            phase,
            color,
            size,
        })
    }

    /// Resample a raw gesture and stamp it with a random phase and the given style.
    pub fn from_raw(raw: &[Point], rng: &mut Rng64, color: Rgba8, size: f64) -> SketchResult<Self> {
        if raw.len() < 2 {
            return Err(SketchError::validation(
                "degenerate gesture: need at least 2 raw points",
            ));
        }
        Self::new(resample(raw), rng.next_f64_01() * PHASE_RANGE, color, size)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }

    pub fn size(&self) -> f64 {
        self.size
    }
}

/// Ordered set of visible strokes; order is paint order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeSet(Vec<VectorStroke>);

impl StrokeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stroke: VectorStroke) {
        self.0.push(stroke);
    }

    /// Remove every stroke for which `keep` returns `false`; returns how many were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&VectorStroke) -> bool) -> usize {
        let before = self.0.len();
        self.0.retain(|s| keep(s));
        before - self.0.len()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VectorStroke> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[VectorStroke] {
        &self.0
    }
}

impl FromIterator<VectorStroke> for StrokeSet {
    fn from_iter<I: IntoIterator<Item = VectorStroke>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a StrokeSet {
    type Item = &'a VectorStroke;
    type IntoIter = std::slice::Iter<'a, VectorStroke>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stroke/model.rs"]
mod tests;

//! Vector strokes: capture geometry, arc-length resampling and the eraser hit test.

pub mod geometry;
pub mod intersect;
pub mod model;
pub mod resample;

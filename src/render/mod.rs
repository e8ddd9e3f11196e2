//! Rendering surfaces and the per-frame scene renderer.

/// `vello_cpu` raster surface.
pub mod cpu;
/// Whole-surface repaint of the stroke set.
pub mod scene;
/// Surface contract and the command-recording surface.
pub mod surface;

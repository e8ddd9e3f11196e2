//! Jiggle turns freehand pointer gestures into resampled vector strokes and animates them with a
//! deterministic hand-drawn wobble.
//!
//! The public API is session-oriented:
//!
//! - Create a [`Sketch`] from a [`SketchConfig`]
//! - Feed it pointer and key events, then [`Sketch::tick`] it onto a [`Surface`]
//! - Export a fixed-length clip through an [`EncodingRuntime`] into an [`ExportSink`]
#![forbid(unsafe_code)]

mod foundation;

/// Time bases and the jiggle transform.
pub mod animation;
/// Session configuration.
pub mod config;
/// Video format negotiation and frame encoders.
pub mod encode;
/// Offline export loop.
pub mod export;
/// Bounded undo/redo.
pub mod history;
/// Pointer mapping and key bindings.
pub mod input;
/// Global animation and drawing parameters.
pub mod params;
/// Drawing surfaces and scene rendering.
pub mod render;
/// Scripted replay of input sessions.
pub mod script;
/// The interactive sketch session.
pub mod session;
/// Stroke model, resampling and hit testing.
pub mod stroke;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Point, Rgba8, Vec2};
pub use crate::foundation::error::{SketchError, SketchResult};
pub use crate::foundation::math::Rng64;

pub use crate::animation::clock::{FrameClock, WallClock};
pub use crate::config::SketchConfig;
pub use crate::encode::ffmpeg::{FfmpegRuntime, is_ffmpeg_on_path};
pub use crate::encode::sink::{
    EncodeConfig, EncodedVideo, EncodingRuntime, FrameEncoder, InMemoryRuntime, VideoFormat,
};
pub use crate::export::driver::{ExportJob, ExportSettings, ExportStep, export_animation};
pub use crate::export::sink::{
    ExportSink, FileExportSink, Notifier, StderrNotifier, export_filename,
};
pub use crate::history::HistoryStack;
pub use crate::input::mapping::SurfaceMapping;
pub use crate::input::shortcuts::{Command, KeyChord, command_for};
pub use crate::params::{ExportQuality, GlobalParameters, ToolMode};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::scene::{render_scene, render_stroke};
pub use crate::render::surface::{FrameRGBA, LineStyle, RecordingSurface, Surface};
pub use crate::script::{ScriptAction, SketchScript, replay};
pub use crate::session::{ExportStatus, GestureOutcome, Sketch};
pub use crate::stroke::model::{StrokeSet, VectorStroke};

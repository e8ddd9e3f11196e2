use crate::animation::clock::WallClock;
use crate::config::SketchConfig;
use crate::encode::sink::EncodingRuntime;
use crate::export::driver::{ExportJob, ExportSettings, ExportStep};
use crate::export::sink::{ExportSink, Notifier, export_filename};
use crate::foundation::core::{Canvas, Point, Rgba8};
use crate::foundation::error::{SketchError, SketchResult};
use crate::foundation::math::Rng64;
use crate::history::HistoryStack;
use crate::input::shortcuts::{Command, KeyChord, command_for};
use crate::params::{GlobalParameters, ToolMode};
use crate::render::cpu::CpuSurface;
use crate::render::scene::{Preview, render_scene};
use crate::render::surface::{LineStyle, Surface};
use crate::stroke::intersect::{ERASE_RADIUS, intersects};
use crate::stroke::model::{StrokeSet, VectorStroke};
use crate::stroke::resample::resample;
use std::time::Instant;

/// Trail drawn under the pointer while erasing.
const ERASER_PREVIEW: LineStyle = LineStyle {
    width: ERASE_RADIUS * 2.0,
    color: Rgba8::rgba(128, 128, 128, 96),
};

/// What committing a gesture did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureOutcome {
    /// A new stroke was appended.
    Drawn,
    /// `removed` strokes were erased. A miss reports 0 and still records a history entry.
    Erased { removed: usize },
    /// The gesture had at most one point and was discarded.
    Dropped,
}

/// State of the export pipeline after [`Sketch::pump_export`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportStatus {
    Idle,
    Waiting,
    Rendering { rendered: u64, total: u64 },
    Completed { filename: String, frames: u64 },
    Failed { message: String },
}

/// One drawing session: committed strokes, undo history, live parameters and the export job.
///
/// Everything is mutated from one thread in host-event order. The interactive loop is
/// suppressed exactly while an export job is held.
pub struct Sketch {
    canvas: Canvas,
    background: Rgba8,
    strokes: StrokeSet,
    history: HistoryStack,
    params: GlobalParameters,
    gesture: Option<Vec<Point>>,
    rng: Rng64,
    clock: WallClock,
    export_settings: ExportSettings,
    export: Option<ExportJob>,
}

impl Sketch {
    /// New empty session. The history starts with the empty stroke set as its only entry.
    pub fn new(config: SketchConfig) -> SketchResult<Self> {
        config.validate()?;
        let strokes = StrokeSet::new();
        let mut history = HistoryStack::new(config.history_capacity);
        history.snapshot(&strokes);
        Ok(Self {
            canvas: config.canvas,
            background: config.background,
            strokes,
            history,
            params: config.params,
            gesture: None,
            rng: Rng64::from_time(),
            clock: WallClock::start_now(),
            export_settings: config.export,
            export: None,
        })
    }

    /// Use a fixed phase generator.
    pub fn with_rng(mut self, rng: Rng64) -> Self {
        self.rng = rng;
        self
    }

    /// Use a fixed interactive time base.
    pub fn with_clock(mut self, clock: WallClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn background(&self) -> Rgba8 {
        self.background
    }

    pub fn strokes(&self) -> &StrokeSet {
        &self.strokes
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn params(&self) -> &GlobalParameters {
        &self.params
    }

    /// Live parameters for control handlers. Changes apply on the next rendered frame.
    pub fn params_mut(&mut self) -> &mut GlobalParameters {
        &mut self.params
    }

    pub fn set_params(&mut self, params: GlobalParameters) -> SketchResult<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn export_settings_mut(&mut self) -> &mut ExportSettings {
        &mut self.export_settings
    }

    pub fn is_exporting(&self) -> bool {
        self.export.is_some()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Replace the stroke set with a loaded one, as a single undoable step.
    pub fn load(&mut self, strokes: StrokeSet) {
        self.strokes = strokes;
        self.history.snapshot(&self.strokes);
    }

    pub fn pointer_down(&mut self, p: Point) {
        self.gesture = Some(vec![p]);
    }

    /// Extend the active gesture. Ignored when no gesture is active.
    pub fn pointer_move(&mut self, p: Point) {
        if let Some(g) = self.gesture.as_mut() {
            g.push(p);
        }
    }

    /// Commit the active gesture, if any.
    pub fn pointer_up(&mut self) -> Option<GestureOutcome> {
        let raw = self.gesture.take()?;
        Some(self.commit(&raw))
    }

    /// Leaving the surface mid-gesture commits it like a release.
    pub fn pointer_leave(&mut self) -> Option<GestureOutcome> {
        self.pointer_up()
    }

    pub fn pointer_enter(&mut self) {}

    fn commit(&mut self, raw: &[Point]) -> GestureOutcome {
        if raw.len() <= 1 {
            return GestureOutcome::Dropped;
        }
        match self.params.tool {
            ToolMode::Draw => {
                let stroke = match VectorStroke::from_raw(
                    raw,
                    &mut self.rng,
                    self.params.color,
                    self.params.size,
                ) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping unusable gesture");
                        return GestureOutcome::Dropped;
                    }
                };
                tracing::debug!(
                    raw = raw.len(),
                    points = stroke.points().len(),
                    "stroke committed"
                );
                self.strokes.push(stroke);
                self.history.snapshot(&self.strokes);
                GestureOutcome::Drawn
            }
            ToolMode::Erase => {
                let path = resample(raw);
                let removed = self.strokes.retain(|s| !intersects(s.points(), &path));
                self.history.snapshot(&self.strokes);
                tracing::debug!(removed, remaining = self.strokes.len(), "erase committed");
                GestureOutcome::Erased { removed }
            }
        }
    }

    /// Step back one snapshot. Returns `false` at the oldest entry.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(set) => {
                self.strokes = set;
                true
            }
            None => false,
        }
    }

    /// Step forward one snapshot. Returns `false` at the newest entry.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(set) => {
                self.strokes = set;
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::PenMode => self.params.tool = ToolMode::Draw,
            Command::EraserMode => self.params.tool = ToolMode::Erase,
        }
    }

    /// Dispatch a key press through the default bindings.
    pub fn key(&mut self, chord: &KeyChord) -> Option<Command> {
        let command = command_for(chord)?;
        self.apply(command);
        Some(command)
    }

    /// Render one interactive frame at wall-clock `now`, with the in-progress gesture on top.
    ///
    /// Returns `false` without touching `surface` while an export is running.
    pub fn tick(&self, now: Instant, surface: &mut dyn Surface) -> bool {
        if self.is_exporting() {
            return false;
        }
        let preview = self
            .gesture
            .as_deref()
            .filter(|g| g.len() > 1)
            .map(|points| Preview {
                points,
                style: match self.params.tool {
                    ToolMode::Draw => LineStyle {
                        width: self.params.size,
                        color: self.params.color,
                    },
                    ToolMode::Erase => ERASER_PREVIEW,
                },
            });
        render_scene(
            surface,
            &self.strokes,
            preview,
            self.clock.seconds_at(now),
            &self.params,
            self.background,
        );
        true
    }

    /// Start exporting onto an offline CPU surface of the canvas size.
    pub fn start_export(
        &mut self,
        runtime: &dyn EncodingRuntime,
        now: Instant,
        notifier: &mut dyn Notifier,
    ) -> SketchResult<()> {
        let surface = match CpuSurface::new(self.canvas) {
            Ok(s) => s,
            Err(e) => {
                notifier.notify_failure(&format!("export failed: {e}"));
                return Err(e);
            }
        };
        self.start_export_on(runtime, Box::new(surface), now, notifier)
    }

    /// Start exporting onto `surface`.
    ///
    /// Starting while another export runs is refused. Any failure is reported through
    /// `notifier` once and leaves the session not exporting.
    #[tracing::instrument(skip_all)]
    pub fn start_export_on(
        &mut self,
        runtime: &dyn EncodingRuntime,
        surface: Box<dyn Surface>,
        now: Instant,
        notifier: &mut dyn Notifier,
    ) -> SketchResult<()> {
        if self.is_exporting() {
            return Err(SketchError::validation("an export is already running"));
        }
        match ExportJob::start(runtime, surface, &self.export_settings, now) {
            Ok(job) => {
                self.export = Some(job);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "export could not start");
                notifier.notify_failure(&format!("export failed: {e}"));
                Err(e)
            }
        }
    }

    /// Advance a running export by at most one frame and hand a finished video to `sink`.
    pub fn pump_export(
        &mut self,
        now: Instant,
        sink: &mut dyn ExportSink,
        notifier: &mut dyn Notifier,
    ) -> ExportStatus {
        let Some(job) = self.export.as_mut() else {
            return ExportStatus::Idle;
        };

        let step = job.step(now, &self.strokes, &self.params, self.background);
        let (rendered, total) = job.progress();
        match step {
            Ok(ExportStep::Waiting) => ExportStatus::Waiting,
            Ok(ExportStep::Rendered(_)) => ExportStatus::Rendering { rendered, total },
            Ok(ExportStep::Finished(video)) => {
                self.export = None;
                let filename = export_filename(&video.format);
                match sink.save(&video, &filename) {
                    Ok(()) => ExportStatus::Completed {
                        filename,
                        frames: video.frames,
                    },
                    Err(e) => self.fail_export(notifier, &e.to_string()),
                }
            }
            Err(e) => self.fail_export(notifier, &e.to_string()),
        }
    }

    /// Abandon a running export without notifying.
    pub fn cancel_export(&mut self) {
        if let Some(mut job) = self.export.take() {
            job.abort();
        }
    }

    fn fail_export(&mut self, notifier: &mut dyn Notifier, message: &str) -> ExportStatus {
        if let Some(mut job) = self.export.take() {
            job.abort();
        }
        tracing::error!(error = message, "export failed");
        let message = format!("export failed: {message}");
        notifier.notify_failure(&message);
        ExportStatus::Failed { message }
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;

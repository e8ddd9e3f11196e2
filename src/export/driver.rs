use crate::animation::clock::FrameClock;
use crate::encode::sink::{
    EncodeConfig, EncodedVideo, EncodingRuntime, FrameEncoder, PREFERRED_FORMATS, VideoFormat,
    negotiate_format,
};
use crate::foundation::core::{Fps, FrameIndex, FrameRange, Rgba8};
use crate::foundation::error::{SketchError, SketchResult};
use crate::params::{ExportQuality, GlobalParameters};
use crate::render::scene::render_scene;
use crate::render::surface::Surface;
use crate::stroke::model::StrokeSet;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Export length, rate and quality.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub duration_secs: u32,
    pub fps: u32,
    pub quality: ExportQuality,
    /// Delay between encoder start and the first rendered frame.
    pub grace_ms: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            duration_secs: 5,
            fps: 30,
            quality: ExportQuality::High,
            grace_ms: 100,
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> SketchResult<()> {
        if self.duration_secs == 0 {
            return Err(SketchError::validation("export duration must be > 0"));
        }
        Fps::new(self.fps, 1)?;
        Ok(())
    }

    pub fn total_frames(&self) -> u64 {
        u64::from(self.duration_secs) * u64::from(self.fps)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

/// Result of one [`ExportJob::step`].
#[derive(Clone, Debug, PartialEq)]
pub enum ExportStep {
    /// Still inside the start-up grace period; nothing rendered.
    Waiting,
    /// One frame rendered and handed to the encoder.
    Rendered(FrameIndex),
    /// The last frame was rendered and the encoder finalized.
    Finished(EncodedVideo),
}

/// Cooperative export loop: one frame per [`ExportJob::step`].
///
/// Frame `i` is rendered at `i / fps` seconds of animation time no matter when `step` is called,
/// so the output depends only on the stroke set and parameters seen at each step. Those are read
/// live on every step rather than frozen at start.
pub struct ExportJob {
    encoder: Box<dyn FrameEncoder>,
    format: VideoFormat,
    surface: Box<dyn Surface>,
    clock: FrameClock,
    range: FrameRange,
    next: FrameIndex,
    render_from: Instant,
    finished: bool,
}

impl ExportJob {
    /// Negotiate a format, start its encoder and arm the grace period.
    #[tracing::instrument(skip(runtime, surface))]
    pub fn start(
        runtime: &dyn EncodingRuntime,
        surface: Box<dyn Surface>,
        settings: &ExportSettings,
        now: Instant,
    ) -> SketchResult<Self> {
        settings.validate()?;
        let fps = Fps::new(settings.fps, 1)?;
        let format = negotiate_format(runtime, PREFERRED_FORMATS)?;
        let canvas = surface.canvas();

        let mut encoder = runtime.encoder(format)?;
        let cfg = EncodeConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
            bitrate_bps: settings.quality.bitrate_bps(),
        };
        if let Err(e) = encoder.begin(cfg) {
            encoder.abort();
            return Err(e);
        }

        tracing::info!(
            format = format.name,
            frames = settings.total_frames(),
            bitrate = cfg.bitrate_bps,
            "export started"
        );

        Ok(Self {
            encoder,
            format,
            surface,
            clock: FrameClock::new(fps),
            range: FrameRange::new(FrameIndex(0), FrameIndex(settings.total_frames()))?,
            next: FrameIndex(0),
            render_from: now + settings.grace(),
            finished: false,
        })
    }

    pub fn format(&self) -> VideoFormat {
        self.format
    }

    /// `(frames rendered, total frames)`.
    pub fn progress(&self) -> (u64, u64) {
        (self.next.0, self.range.len_frames())
    }

    /// Time left in the grace period at `now`.
    pub fn remaining_grace(&self, now: Instant) -> Duration {
        self.render_from.saturating_duration_since(now)
    }

    /// Advance the loop by at most one frame.
    ///
    /// On error the encoder is aborted and its partial output discarded; the job must not be
    /// stepped again.
    pub fn step(
        &mut self,
        now: Instant,
        strokes: &StrokeSet,
        params: &GlobalParameters,
        background: Rgba8,
    ) -> SketchResult<ExportStep> {
        if self.finished {
            return Err(SketchError::encoder("export job already finished"));
        }
        let result = self.step_inner(now, strokes, params, background);
        if result.is_err() {
            self.finished = true;
            self.encoder.abort();
        }
        result
    }

    fn step_inner(
        &mut self,
        now: Instant,
        strokes: &StrokeSet,
        params: &GlobalParameters,
        background: Rgba8,
    ) -> SketchResult<ExportStep> {
        if now < self.render_from {
            return Ok(ExportStep::Waiting);
        }

        let idx = self.next;
        let t = self.clock.seconds_at(idx);
        render_scene(
            self.surface.as_mut(),
            strokes,
            None,
            t,
            params,
            background,
        );
        let frame = self.surface.read_frame()?;
        self.encoder.push_frame(idx, &frame)?;
        self.next = FrameIndex(idx.0 + 1);

        if self.next.0 < self.range.end.0 {
            return Ok(ExportStep::Rendered(idx));
        }

        self.finished = true;
        let video = self.encoder.finish()?;
        tracing::info!(
            format = self.format.name,
            frames = video.frames,
            bytes = video.bytes.len(),
            "export finished"
        );
        Ok(ExportStep::Finished(video))
    }

    /// Stop early and discard partial output.
    pub fn abort(&mut self) {
        if !self.finished {
            self.finished = true;
            self.encoder.abort();
            tracing::warn!(rendered = self.next.0, "export aborted");
        }
    }
}

/// Run a whole export synchronously over a fixed stroke set.
#[tracing::instrument(skip_all)]
pub fn export_animation(
    runtime: &dyn EncodingRuntime,
    surface: Box<dyn Surface>,
    strokes: &StrokeSet,
    params: &GlobalParameters,
    background: Rgba8,
    settings: &ExportSettings,
) -> SketchResult<EncodedVideo> {
    let mut job = ExportJob::start(runtime, surface, settings, Instant::now())?;
    loop {
        let now = Instant::now();
        match job.step(now, strokes, params, background)? {
            ExportStep::Waiting => std::thread::sleep(job.remaining_grace(now)),
            ExportStep::Rendered(_) => {}
            ExportStep::Finished(video) => return Ok(video),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/driver.rs"]
mod tests;

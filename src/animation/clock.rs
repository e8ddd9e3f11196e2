use crate::foundation::core::{Fps, FrameIndex};
use std::time::Instant;

/// Wall-clock time base for the interactive loop.
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    epoch: Instant,
}

impl WallClock {
    pub fn new(epoch: Instant) -> Self {
        Self { epoch }
    }

    pub fn start_now() -> Self {
        Self::new(Instant::now())
    }

    /// Seconds elapsed since the epoch (0 for instants before it).
    pub fn seconds_at(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.epoch).as_secs_f64()
    }
}

/// Synthetic time base for offline export: frame `i` is at `i / fps` seconds regardless of how
/// long rendering actually takes.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    fps: Fps,
}

impl FrameClock {
    pub fn new(fps: Fps) -> Self {
        Self { fps }
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn seconds_at(&self, frame: FrameIndex) -> f64 {
        self.fps.frames_to_secs(frame.0)
    }
}

use crate::foundation::core::Rgba8;
use crate::foundation::error::{SketchError, SketchResult};
use serde::{Deserialize, Serialize};

/// Active pointer tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    #[default]
    Draw,
    Erase,
}

/// Export bitrate tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExportQuality {
    #[default]
    High,
    Medium,
    Low,
}

impl ExportQuality {
    /// Target video bitrate in bits per second.
    pub fn bitrate_bps(self) -> u32 {
        match self {
            Self::High => 2_500_000,
            Self::Medium => 1_500_000,
            Self::Low => 1_000_000,
        }
    }
}

/// Process-wide values read by the renderer every tick.
///
/// Owned by the sketch session and mutated only by control handlers; renderers take it by
/// reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalParameters {
    /// Rotational jitter radius in pixels.
    pub jiggle_intensity: f64,
    /// Animation time multiplier.
    pub jiggle_speed: f64,
    /// Amplitude of the breathing outline width; 0 disables the second pass.
    pub thickness_intensity: f64,
    /// Slow positional drift amplitude in pixels.
    pub float_intensity: f64,
    /// Color stamped on new strokes.
    pub color: Rgba8,
    /// Width stamped on new strokes.
    pub size: f64,
    pub tool: ToolMode,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            jiggle_intensity: 2.0,
            jiggle_speed: 3.0,
            thickness_intensity: 0.0,
            float_intensity: 0.0,
            color: Rgba8::BLACK,
            size: 3.0,
            tool: ToolMode::Draw,
        }
    }
}

impl GlobalParameters {
    pub fn validate(&self) -> SketchResult<()> {
        let non_negative = [
            ("jiggle_intensity", self.jiggle_intensity),
            ("jiggle_speed", self.jiggle_speed),
            ("thickness_intensity", self.thickness_intensity),
            ("float_intensity", self.float_intensity),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(SketchError::validation(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(SketchError::validation("size must be finite and > 0"));
        }
        Ok(())
    }
}

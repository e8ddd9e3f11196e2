use crate::export::driver::ExportSettings;
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{SketchError, SketchResult};
use crate::history::MAX_HISTORY;
use crate::params::GlobalParameters;
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Session configuration. Every field has a default, so `{}` is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub canvas: Canvas,
    pub background: Rgba8,
    /// Initial parameter values.
    pub params: GlobalParameters,
    pub export: ExportSettings,
    /// Snapshots kept for undo.
    pub history_capacity: usize,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            background: Rgba8::WHITE,
            params: GlobalParameters::default(),
            export: ExportSettings::default(),
            history_capacity: MAX_HISTORY,
        }
    }
}

impl SketchConfig {
    pub fn from_json_str(s: &str) -> SketchResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> SketchResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> SketchResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(SketchError::validation("canvas width/height must be > 0"));
        }
        if self.canvas.width > u32::from(u16::MAX) || self.canvas.height > u32::from(u16::MAX) {
            return Err(SketchError::validation("canvas width/height must fit in u16"));
        }
        if self.history_capacity == 0 {
            return Err(SketchError::validation("history_capacity must be > 0"));
        }
        self.params.validate()?;
        self.export.validate()?;
        Ok(())
    }
}

use crate::config::SketchConfig;
use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{SketchError, SketchResult};
use crate::foundation::math::Rng64;
use crate::input::shortcuts::KeyChord;
use crate::params::{GlobalParameters, ToolMode};
use crate::session::Sketch;
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A recorded sketching session: configuration plus the input actions to replay.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SketchScript {
    #[serde(default)]
    pub config: SketchConfig,
    /// Phase seed. When absent the phases come from the current time.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub actions: Vec<ScriptAction>,
}

/// One replayed input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptAction {
    /// Pen gesture through `[x, y]` canvas pixels.
    Draw { points: Vec<[f64; 2]> },
    /// Eraser gesture through `[x, y]` canvas pixels.
    Erase { points: Vec<[f64; 2]> },
    Undo,
    Redo,
    Color { value: Rgba8 },
    Size { value: f64 },
    /// Replace all parameters; omitted fields take their defaults.
    Params { params: GlobalParameters },
    Key { chord: KeyChord },
}

impl SketchScript {
    pub fn from_json_str(s: &str) -> SketchResult<Self> {
        let script: Self = serde_json::from_str(s)?;
        script.config.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> SketchResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read sketch script '{}'", path.display()))?;
        Self::from_json_str(&text)
    }
}

/// Feed every action through a fresh [`Sketch`] as pointer, key and control events.
#[tracing::instrument(skip_all, fields(actions = script.actions.len()))]
pub fn replay(script: &SketchScript) -> SketchResult<Sketch> {
    let mut sketch = Sketch::new(script.config.clone())?;
    if let Some(seed) = script.seed {
        sketch = sketch.with_rng(Rng64::new(seed));
    }

    for (i, action) in script.actions.iter().enumerate() {
        match action {
            ScriptAction::Draw { points } => gesture(&mut sketch, ToolMode::Draw, points),
            ScriptAction::Erase { points } => gesture(&mut sketch, ToolMode::Erase, points),
            ScriptAction::Undo => {
                sketch.undo();
            }
            ScriptAction::Redo => {
                sketch.redo();
            }
            ScriptAction::Color { value } => sketch.params_mut().color = *value,
            ScriptAction::Size { value } => {
                if !value.is_finite() || *value <= 0.0 {
                    return Err(SketchError::validation(format!(
                        "action {i}: size must be finite and > 0"
                    )));
                }
                sketch.params_mut().size = *value;
            }
            ScriptAction::Params { params } => sketch
                .set_params(params.clone())
                .map_err(|e| SketchError::validation(format!("action {i}: {e}")))?,
            ScriptAction::Key { chord } => {
                sketch.key(chord);
            }
        }
    }

    tracing::debug!(strokes = sketch.strokes().len(), "script replayed");
    Ok(sketch)
}

fn gesture(sketch: &mut Sketch, tool: ToolMode, points: &[[f64; 2]]) {
    let mut points = points.iter().map(|&[x, y]| Point::new(x, y));
    let Some(first) = points.next() else {
        return;
    };
    sketch.params_mut().tool = tool;
    sketch.pointer_down(first);
    for p in points {
        sketch.pointer_move(p);
    }
    sketch.pointer_up();
}

#[cfg(test)]
#[path = "../tests/unit/script.rs"]
mod tests;

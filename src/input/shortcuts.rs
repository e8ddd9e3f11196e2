use serde::{Deserialize, Serialize};

/// Editing command a host control can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Undo,
    Redo,
    PenMode,
    EraserMode,
}

/// A key press with modifier state, as reported by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyChord {
    /// Logical key, e.g. `"z"` or `"Z"`.
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyChord {
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Default key bindings.
///
/// Ctrl or Cmd + Z undoes, adding Shift (or pressing Ctrl/Cmd + Y) redoes. Unmodified `P` and `E`
/// switch tools. Letters match case-insensitively.
pub fn command_for(chord: &KeyChord) -> Option<Command> {
    let key = chord.key.to_ascii_lowercase();
    let primary = chord.ctrl || chord.meta;
    match (primary, chord.shift, key.as_str()) {
        (true, false, "z") => Some(Command::Undo),
        (true, true, "z") | (true, _, "y") => Some(Command::Redo),
        (false, _, "p") => Some(Command::PenMode),
        (false, _, "e") => Some(Command::EraserMode),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/shortcuts.rs"]
mod tests;

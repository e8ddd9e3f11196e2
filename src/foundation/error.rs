/// Result alias used across the crate.
pub type SketchResult<T> = Result<T, SketchError>;

/// Crate error taxonomy.
///
/// No-op boundary conditions (undo past the oldest snapshot, erasing nothing, dropping a
/// degenerate gesture) are not errors and never surface here.
#[derive(thiserror::Error, Debug)]
pub enum SketchError {
    #[error("validation error: {0}")]
    Validation(String),

    /// None of the preferred video formats is supported by the encoding runtime.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// The encoding pipeline failed mid-stream.
    #[error("encoder error: {0}")]
    Encoder(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SketchError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unsupported_encoding(msg: impl Into<String>) -> Self {
        Self::UnsupportedEncoding(msg.into())
    }

    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for SketchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

use crate::encode::sink::{EncodedVideo, VideoFormat};
use crate::foundation::error::SketchResult;
use anyhow::Context as _;
use std::path::{Path, PathBuf};

/// Base name of exported files.
pub const EXPORT_BASENAME: &str = "jiggly_vectorizer_export";

/// Suggested file name for an export in `format`.
pub fn export_filename(format: &VideoFormat) -> String {
    format!("{EXPORT_BASENAME}.{}", format.extension)
}

/// Receives a finished export and persists it.
pub trait ExportSink {
    fn save(&mut self, video: &EncodedVideo, suggested_name: &str) -> SketchResult<()>;
}

/// User-visible failure reporting.
pub trait Notifier {
    fn notify_failure(&mut self, message: &str);
}

/// Writes exports into a directory under their suggested name.
#[derive(Clone, Debug)]
pub struct FileExportSink {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl FileExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    /// Paths written so far, oldest first.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl ExportSink for FileExportSink {
    fn save(&mut self, video: &EncodedVideo, suggested_name: &str) -> SketchResult<()> {
        let path = self.dir.join(suggested_name);
        ensure_parent_dir(&path)?;
        std::fs::write(&path, &video.bytes)
            .with_context(|| format!("failed to write export '{}'", path.display()))?;
        tracing::info!(path = %path.display(), bytes = video.bytes.len(), "export saved");
        self.saved.push(path);
        Ok(())
    }
}

/// Reports failures on stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify_failure(&mut self, message: &str) {
        eprintln!("error: {message}");
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SketchResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

use crate::encode::sink::{EncodeConfig, EncodedVideo, EncodingRuntime, FrameEncoder, VideoFormat};
use crate::foundation::core::{FrameIndex, Rgba8};
use crate::foundation::error::{SketchError, SketchResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameRGBA;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// Encoding runtime backed by the system `ffmpeg` binary.
///
/// Supported formats are the encoders `ffmpeg -encoders` advertises at probe time; a missing
/// binary supports nothing.
#[derive(Clone, Debug)]
pub struct FfmpegRuntime {
    program: PathBuf,
    encoders: BTreeSet<String>,
    bg_rgba: Rgba8,
}

impl FfmpegRuntime {
    /// Probe the `ffmpeg` on `PATH`.
    pub fn probe(bg_rgba: Rgba8) -> Self {
        Self::probe_program("ffmpeg", bg_rgba)
    }

    pub fn probe_program(program: impl Into<PathBuf>, bg_rgba: Rgba8) -> Self {
        let program = program.into();
        let encoders = match list_encoders(&program) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(program = %program.display(), error = %e, "ffmpeg probe failed");
                BTreeSet::new()
            }
        };
        tracing::debug!(count = encoders.len(), "ffmpeg encoders probed");
        Self {
            program,
            encoders,
            bg_rgba,
        }
    }
}

impl EncodingRuntime for FfmpegRuntime {
    fn supports(&self, format: &VideoFormat) -> bool {
        self.encoders.contains(format.codec)
    }

    fn encoder(&self, format: VideoFormat) -> SketchResult<Box<dyn FrameEncoder>> {
        if !self.supports(&format) {
            return Err(SketchError::unsupported_encoding(format!(
                "ffmpeg does not provide encoder '{}'",
                format.codec
            )));
        }
        Ok(Box::new(FfmpegEncoder::new(
            self.program.clone(),
            format,
            self.bg_rgba,
        )))
    }
}

fn list_encoders(program: &Path) -> SketchResult<BTreeSet<String>> {
    let output = Command::new(program)
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| SketchError::encoder(format!("failed to run ffmpeg: {e}")))?;
    if !output.status.success() {
        return Err(SketchError::encoder(format!(
            "ffmpeg -encoders exited with status {}",
            output.status
        )));
    }
    Ok(parse_encoder_list(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse the table printed by `ffmpeg -encoders`: a legend, a `------` rule, then one
/// `<flags> <name> <description>` row per encoder.
fn parse_encoder_list(text: &str) -> BTreeSet<String> {
    text.lines()
        .skip_while(|l| !l.trim_start().starts_with("---"))
        .skip(1)
        .filter_map(|l| {
            let mut cols = l.split_whitespace();
            let flags = cols.next()?;
            // Video encoders only.
            if !flags.starts_with('V') {
                return None;
            }
            cols.next().map(str::to_owned)
        })
        .collect()
}

/// Streams raw frames into a spawned `ffmpeg` that writes a temp file, read back on finish.
pub struct FfmpegEncoder {
    program: PathBuf,
    format: VideoFormat,
    bg_rgba: Rgba8,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    out: TempFileGuard,

    scratch: Vec<u8>,
    cfg: Option<EncodeConfig>,
    last_idx: Option<FrameIndex>,
    frames: u64,
}

impl FfmpegEncoder {
    pub fn new(program: PathBuf, format: VideoFormat, bg_rgba: Rgba8) -> Self {
        Self {
            program,
            format,
            bg_rgba,
            child: None,
            stdin: None,
            stderr_drain: None,
            out: TempFileGuard(None),
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            frames: 0,
        }
    }

    fn output_args(&self, cfg: &EncodeConfig) -> Vec<String> {
        let mut args = vec![
            "-an".to_owned(),
            "-c:v".to_owned(),
            self.format.codec.to_owned(),
            "-b:v".to_owned(),
            cfg.bitrate_bps.to_string(),
            "-pix_fmt".to_owned(),
            "yuv420p".to_owned(),
        ];
        if self.format.container == "mp4" {
            args.extend(["-movflags".to_owned(), "+faststart".to_owned()]);
        }
        args.extend(["-f".to_owned(), self.format.container.to_owned()]);
        args
    }
}

impl FrameEncoder for FfmpegEncoder {
    #[tracing::instrument(skip(self), fields(codec = self.format.codec))]
    fn begin(&mut self, cfg: EncodeConfig) -> SketchResult<()> {
        cfg.validate()?;

        let out_path = std::env::temp_dir().join(format!(
            "jiggle_export_{}_{}.{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            self.format.extension
        ));

        let mut cmd = Command::new(&self.program);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Frames arrive as straight, opaque RGBA after flattening.
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
        ]);
        cmd.args(self.output_args(&cfg));
        cmd.arg(&out_path);

        let mut child = cmd.spawn().map_err(|e| {
            SketchError::encoder(format!("could not start {}: {e}", self.program.display()))
        })?;
        self.out.0 = Some(out_path);

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SketchError::encoder("ffmpeg stdin unavailable"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SketchError::encoder("ffmpeg stderr unavailable"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.frames = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SketchResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| SketchError::encoder("ffmpeg encoder not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(SketchError::encoder(
                "ffmpeg encoder received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(SketchError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(SketchError::validation(
                "frame data length does not match width * height * 4",
            ));
        }

        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.bg_rgba,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SketchError::encoder("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            SketchError::encoder(format!("writing frame {} to ffmpeg: {e}", idx.0))
        })?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> SketchResult<EncodedVideo> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| SketchError::encoder("ffmpeg encoder not started"))?;

        let status = child.wait().map_err(|e| {
            SketchError::encoder(format!("waiting for ffmpeg: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SketchError::encoder("ffmpeg stderr reader panicked"))?
                .map_err(|e| SketchError::encoder(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(SketchError::encoder(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let path = self
            .out
            .0
            .as_ref()
            .ok_or_else(|| SketchError::encoder("ffmpeg output path missing"))?;
        let bytes = std::fs::read(path).map_err(|e| {
            SketchError::encoder(format!(
                "failed to read ffmpeg output '{}': {e}",
                path.display()
            ))
        })?;
        self.out.remove();

        Ok(EncodedVideo {
            format: self.format,
            bytes,
            frames: self.frames,
        })
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        self.out.remove();
        self.cfg = None;
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg: Rgba8,
) -> SketchResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SketchError::validation(
            "flatten needs equal-length RGBA8 buffers",
        ));
    }

    let bg_r = u16::from(bg.r);
    let bg_g = u16::from(bg.g);
    let bg_b = u16::from(bg.b);

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let (r, g, b) = if src_is_premul {
            (
                u16::from(s[0]) + mul_div255_u16(bg_r, inv),
                u16::from(s[1]) + mul_div255_u16(bg_g, inv),
                u16::from(s[2]) + mul_div255_u16(bg_b, inv),
            )
        } else {
            (
                mul_div255_u16(u16::from(s[0]), a) + mul_div255_u16(bg_r, inv),
                mul_div255_u16(u16::from(s[1]), a) + mul_div255_u16(bg_g, inv),
                mul_div255_u16(u16::from(s[2]), a) + mul_div255_u16(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

struct TempFileGuard(Option<PathBuf>);

impl TempFileGuard {
    fn remove(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;

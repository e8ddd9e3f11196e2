use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{SketchError, SketchResult};
use crate::render::surface::FrameRGBA;

/// A container/codec pairing the exporter can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VideoFormat {
    /// Stable identifier, e.g. `"vp9-webm"`.
    pub name: &'static str,
    /// Encoder name as the runtime advertises it.
    pub codec: &'static str,
    pub container: &'static str,
    pub mime: &'static str,
    /// File extension without the dot.
    pub extension: &'static str,
}

pub const VP9_WEBM: VideoFormat = VideoFormat {
    name: "vp9-webm",
    codec: "libvpx-vp9",
    container: "webm",
    mime: "video/webm;codecs=vp9",
    extension: "webm",
};

pub const VP8_WEBM: VideoFormat = VideoFormat {
    name: "vp8-webm",
    codec: "libvpx",
    container: "webm",
    mime: "video/webm;codecs=vp8",
    extension: "webm",
};

pub const H264_MP4: VideoFormat = VideoFormat {
    name: "h264-mp4",
    codec: "libx264",
    container: "mp4",
    mime: "video/mp4",
    extension: "mp4",
};

/// Formats in order of preference; the first one the runtime supports wins.
pub const PREFERRED_FORMATS: &[VideoFormat] = &[VP9_WEBM, VP8_WEBM, H264_MP4];

/// Configuration provided to a [`FrameEncoder`] before any frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Target video bitrate in bits per second.
    pub bitrate_bps: u32,
}

impl EncodeConfig {
    pub fn validate(&self) -> SketchResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SketchError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(SketchError::validation("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // Output targets yuv420p, which needs even dimensions.
            return Err(SketchError::validation(
                "encode width/height must be even (required for yuv420p output)",
            ));
        }
        if self.bitrate_bps == 0 {
            return Err(SketchError::validation("encode bitrate must be non-zero"));
        }
        Ok(())
    }
}

/// Finished, encoded sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedVideo {
    pub format: VideoFormat,
    pub bytes: Vec<u8>,
    pub frames: u64,
}

/// Encoder contract.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order between
/// one `begin` and one `finish`/`abort`.
pub trait FrameEncoder {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: EncodeConfig) -> SketchResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SketchResult<()>;
    /// Finalize and return the encoded container.
    fn finish(&mut self) -> SketchResult<EncodedVideo>;
    /// Stop early and discard any partial output. Never fails.
    fn abort(&mut self);
}

/// What the host can encode.
pub trait EncodingRuntime {
    fn supports(&self, format: &VideoFormat) -> bool;
    fn encoder(&self, format: VideoFormat) -> SketchResult<Box<dyn FrameEncoder>>;
}

/// First format of `prefs` that `runtime` supports.
pub fn negotiate_format(
    runtime: &dyn EncodingRuntime,
    prefs: &[VideoFormat],
) -> SketchResult<VideoFormat> {
    prefs
        .iter()
        .find(|f| runtime.supports(f))
        .copied()
        .ok_or_else(|| {
            let names: Vec<&str> = prefs.iter().map(|f| f.name).collect();
            SketchError::unsupported_encoding(format!(
                "none of the video formats [{}] is supported on this system",
                names.join(", ")
            ))
        })
}

/// In-process runtime for tests and debugging.
///
/// Its encoder "encodes" by concatenating the raw frame bytes, so two exports are equal exactly
/// when every frame is pixel-identical.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRuntime {
    supported: Vec<&'static str>,
    fail_at: Option<u64>,
}

impl InMemoryRuntime {
    /// Runtime supporting every format in [`PREFERRED_FORMATS`].
    pub fn new() -> Self {
        Self::supporting(&PREFERRED_FORMATS.iter().map(|f| f.name).collect::<Vec<_>>())
    }

    /// Runtime supporting only the named formats.
    pub fn supporting(names: &[&'static str]) -> Self {
        Self {
            supported: names.to_vec(),
            fail_at: None,
        }
    }

    /// Make encoders fail when frame `idx` is pushed.
    pub fn failing_at(mut self, idx: u64) -> Self {
        self.fail_at = Some(idx);
        self
    }
}

impl EncodingRuntime for InMemoryRuntime {
    fn supports(&self, format: &VideoFormat) -> bool {
        self.supported.contains(&format.name)
    }

    fn encoder(&self, format: VideoFormat) -> SketchResult<Box<dyn FrameEncoder>> {
        if !self.supports(&format) {
            return Err(SketchError::unsupported_encoding(format.name));
        }
        Ok(Box::new(InMemoryEncoder::new(format, self.fail_at)))
    }
}

/// Encoder backing [`InMemoryRuntime`].
#[derive(Debug)]
pub struct InMemoryEncoder {
    format: VideoFormat,
    fail_at: Option<u64>,
    cfg: Option<EncodeConfig>,
    bytes: Vec<u8>,
    frames: u64,
    last_idx: Option<FrameIndex>,
}

impl InMemoryEncoder {
    pub fn new(format: VideoFormat, fail_at: Option<u64>) -> Self {
        Self {
            format,
            fail_at,
            cfg: None,
            bytes: Vec::new(),
            frames: 0,
            last_idx: None,
        }
    }
}

impl FrameEncoder for InMemoryEncoder {
    fn begin(&mut self, cfg: EncodeConfig) -> SketchResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.bytes.clear();
        self.frames = 0;
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SketchResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| SketchError::encoder("in-memory encoder not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(SketchError::encoder(
                "encoder received out-of-order frame index",
            ));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(SketchError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if self.fail_at == Some(idx.0) {
            return Err(SketchError::encoder(format!(
                "injected failure at frame {}",
                idx.0
            )));
        }
        self.last_idx = Some(idx);
        self.bytes.extend_from_slice(&frame.data);
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> SketchResult<EncodedVideo> {
        self.cfg
            .take()
            .ok_or_else(|| SketchError::encoder("in-memory encoder not started"))?;
        Ok(EncodedVideo {
            format: self.format,
            bytes: std::mem::take(&mut self.bytes),
            frames: self.frames,
        })
    }

    fn abort(&mut self) {
        self.cfg = None;
        self.bytes.clear();
        self.frames = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;

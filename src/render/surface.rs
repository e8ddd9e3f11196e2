use crate::foundation::core::{Canvas, Point, Rgba8};
use crate::foundation::error::SketchResult;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**; the flag makes this explicit at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize) * 4],
            premultiplied: true,
        }
    }

    /// Premultiplied RGBA at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Convert to straight alpha in place, as image files expect.
    pub fn unpremultiply(&mut self) {
        if !self.premultiplied {
            return;
        }
        for px in self.data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        self.premultiplied = false;
    }
}

/// Stroke style of one polyline. Joins and caps are always round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub width: f64,
    pub color: Rgba8,
}

/// Something a frame can be painted onto: the visible canvas or an offline export target.
pub trait Surface {
    /// Backing size in pixels.
    fn canvas(&self) -> Canvas;

    /// Repaint the whole surface with `color`, discarding everything drawn before.
    fn clear(&mut self, color: Rgba8);

    /// Stroke an open polyline. Polylines with fewer than 2 points draw nothing.
    fn stroke_polyline(&mut self, points: &[Point], style: &LineStyle);

    /// Read back the current contents.
    fn read_frame(&mut self) -> SketchResult<FrameRGBA>;
}

/// Command captured by [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Rgba8),
    Polyline { points: Vec<Point>, style: LineStyle },
}

/// Surface that records draw commands instead of rasterizing. Used for tests and debugging.
///
/// `read_frame` yields a transparent frame of the surface size.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    canvas: Canvas,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            commands: Vec::new(),
        }
    }

    /// Commands since the last clear (including that clear).
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Only the polyline commands.
    pub fn polylines(&self) -> impl Iterator<Item = (&[Point], &LineStyle)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Polyline { points, style } => Some((points.as_slice(), style)),
            DrawCommand::Clear(_) => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn clear(&mut self, color: Rgba8) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn stroke_polyline(&mut self, points: &[Point], style: &LineStyle) {
        if points.len() < 2 {
            return;
        }
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            style: *style,
        });
    }

    fn read_frame(&mut self) -> SketchResult<FrameRGBA> {
        Ok(FrameRGBA::transparent(
            self.canvas.width,
            self.canvas.height,
        ))
    }
}

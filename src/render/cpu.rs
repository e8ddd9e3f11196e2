use crate::foundation::core::{Canvas, Point, Rgba8};
use crate::foundation::error::{SketchError, SketchResult};
use crate::render::surface::{FrameRGBA, LineStyle, Surface};

/// CPU raster surface powered by `vello_cpu`.
///
/// Draw calls are buffered in a render context and rasterized into the pixmap on
/// [`Surface::read_frame`].
pub struct CpuSurface {
    canvas: Canvas,
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl CpuSurface {
    pub fn new(canvas: Canvas) -> SketchResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(SketchError::validation(
                "surface width/height must be non-zero",
            ));
        }
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| SketchError::render("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| SketchError::render("surface height exceeds u16"))?;

        Ok(Self {
            canvas,
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }
}

impl Surface for CpuSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn clear(&mut self, color: Rgba8) {
        self.ctx.reset();
        self.ctx.set_paint(cpu_color(color));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
    }

    fn stroke_polyline(&mut self, points: &[Point], style: &LineStyle) {
        let Some(path) = polyline_to_cpu(points) else {
            return;
        };
        let stroke = vello_cpu::kurbo::Stroke::new(style.width)
            .with_join(vello_cpu::kurbo::Join::Round)
            .with_caps(vello_cpu::kurbo::Cap::Round);
        self.ctx.set_stroke(stroke);
        self.ctx.set_paint(cpu_color(style.color));
        self.ctx.stroke_path(&path);
    }

    fn read_frame(&mut self) -> SketchResult<FrameRGBA> {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn cpu_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn polyline_to_cpu(points: &[Point]) -> Option<vello_cpu::kurbo::BezPath> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let mut out = vello_cpu::kurbo::BezPath::new();
    out.move_to(vello_cpu::kurbo::Point::new(first.x, first.y));
    for p in rest {
        out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y));
    }
    Some(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

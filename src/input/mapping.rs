use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{SketchError, SketchResult};
use kurbo::Size;

/// Maps device coordinates to canvas backing pixels when the canvas is displayed scaled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceMapping {
    backing: Canvas,
    display_origin: Point,
    display_size: Size,
}

impl SurfaceMapping {
    pub fn new(backing: Canvas, display_origin: Point, display_size: Size) -> SketchResult<Self> {
        if !(display_size.width.is_finite() && display_size.height.is_finite())
            || display_size.width <= 0.0
            || display_size.height <= 0.0
        {
            return Err(SketchError::validation(
                "displayed canvas size must be finite and > 0",
            ));
        }
        if backing.width == 0 || backing.height == 0 {
            return Err(SketchError::validation("canvas width/height must be > 0"));
        }
        Ok(Self {
            backing,
            display_origin,
            display_size,
        })
    }

    /// Canvas shown unscaled at the device origin.
    pub fn identity(backing: Canvas) -> Self {
        Self {
            backing,
            display_origin: Point::ORIGIN,
            display_size: Size::new(f64::from(backing.width), f64::from(backing.height)),
        }
    }

    pub fn backing(&self) -> Canvas {
        self.backing
    }

    /// Device point to backing point. Points outside the displayed rect map outside the canvas.
    pub fn to_surface(&self, device: Point) -> Point {
        let sx = f64::from(self.backing.width) / self.display_size.width;
        let sy = f64::from(self.backing.height) / self.display_size.height;
        Point::new(
            (device.x - self.display_origin.x) * sx,
            (device.y - self.display_origin.y) * sy,
        )
    }
}

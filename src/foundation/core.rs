use std::sync::Arc;

use crate::foundation::error::{PosterError, PosterResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Axis-aligned rectangle stored as origin plus extent.
///
/// Editor geometry is specified in `left/top/width/height` terms, and keeping the extent as a
/// stored field (instead of `x1 - x0`) keeps ratios such as the overlay's 2:3 exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Bounds {
    /// Unit rectangle `{0, 0, 1, 1}`, also the fallback for degenerate geometry.
    pub const UNIT: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Construct from `left, top, width, height`.
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Area, never negative.
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// `true` when either extent is zero/negative or any field is non-finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// `true` when `other` lies entirely inside `self`, allowing `eps` slack on every edge.
    pub fn contains_bounds(&self, other: &Bounds, eps: f64) -> bool {
        other.left >= self.left - eps
            && other.top >= self.top - eps
            && other.right() <= self.right() + eps
            && other.bottom() <= self.bottom() + eps
    }

    /// Convert into a kurbo rectangle for drawing.
    pub fn to_rect(self) -> Rect {
        Rect::from_origin_size((self.left, self.top), (self.width, self.height))
    }
}

impl From<Rect> for Bounds {
    fn from(r: Rect) -> Self {
        let r = r.abs();
        Self::new(r.x0, r.y0, r.width(), r.height())
    }
}

/// Pixel dimensions of a raster surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Construct a canvas size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size as floating-point extent.
    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Byte length of a tightly packed RGBA8 buffer of this size.
    pub fn rgba_len(self) -> PosterResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| PosterError::validation("raster buffer size overflow"))
    }
}

/// Straight-alpha RGBA8 raster, row-major and tightly packed.
///
/// Pixel storage is shared so source frames and captured backgrounds can be handed between the
/// editor, snapshot and caches without copying.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes.
    pub rgba8: Arc<Vec<u8>>,
}

impl Raster {
    /// Wrap an RGBA8 buffer, validating its length.
    pub fn new(width: u32, height: u32, rgba8: Vec<u8>) -> PosterResult<Self> {
        let expected = Canvas::new(width, height).rgba_len()?;
        if rgba8.len() != expected {
            return Err(PosterError::validation(format!(
                "raster expects {expected} bytes for {width}x{height}, got {}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        })
    }

    /// Uniformly filled raster.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> PosterResult<Self> {
        let px_count = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| PosterError::validation("raster buffer size overflow"))?;
        Self::new(width, height, rgba.repeat(px_count))
    }

    /// Dimensions as a [`Canvas`].
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    /// `true` when the raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Read one pixel; `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba8.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy into an `image` buffer for resampling/encoding.
    pub fn to_image(&self) -> PosterResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba8.as_ref().clone())
            .ok_or_else(|| PosterError::validation("raster byte length mismatch"))
    }

    /// Take ownership of an `image` buffer.
    pub fn from_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            rgba8: Arc::new(img.into_raw()),
        }
    }
}

/// Object-local 2D transform: `translate * rotate * scale`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    /// Translation in surface pixels.
    pub translate: Vec2,
    /// Clockwise rotation in degrees (y-down surface space).
    pub rotation_deg: f64,
    /// Non-uniform scale, default `(1, 1)`.
    pub scale: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation_deg: 0.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl Transform2D {
    /// Pure translation.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            translate: Vec2::new(x, y),
            ..Self::default()
        }
    }

    /// Compose into an affine matrix.
    pub fn to_affine(self) -> Affine {
        let t_translate = Affine::translate(self.translate);
        let t_rotate = Affine::rotate(self.rotation_deg.to_radians());
        let t_scale = Affine::scale_non_uniform(self.scale.x, self.scale.y);
        t_translate * t_rotate * t_scale
    }

    /// Map a local point into surface space.
    pub fn apply(self, p: Point) -> Point {
        self.to_affine() * p
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

use crate::{
    background::color::Color,
    foundation::core::{Canvas, Raster},
    foundation::error::{PosterError, PosterResult},
    foundation::math::lerp_channel_trunc,
};

/// What the poster background is made of.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    /// A cropped video frame.
    #[default]
    Image,
    /// A single flat color.
    Solid,
    /// A two-stop linear gradient.
    Gradient,
}

impl BackgroundMode {
    /// `true` when the background comes from a source frame.
    pub fn is_image(self) -> bool {
        matches!(self, Self::Image)
    }
}

/// Gradient axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientDirection {
    /// Top to bottom.
    #[default]
    Vertical,
    /// Left to right.
    Horizontal,
    /// Top-left to bottom-right.
    Diagonal,
}

/// Two-stop gradient definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GradientSpec {
    /// Start and end colors.
    pub colors: [Color; 2],
    /// Interpolation axis.
    pub direction: GradientDirection,
}

impl Default for GradientSpec {
    fn default() -> Self {
        Self {
            colors: [Color::BLACK, Color::rgb(0x33, 0x33, 0x33)],
            direction: GradientDirection::Vertical,
        }
    }
}

impl GradientSpec {
    /// Interpolation ratio for pixel `(x, y)` on a `w × h` surface.
    ///
    /// Diagonal gradients run along anti-diagonals (`x + y` constant).
    pub fn ratio_at(&self, x: u32, y: u32, w: u32, h: u32) -> f64 {
        match self.direction {
            GradientDirection::Vertical => f64::from(y) / f64::from(h.max(1)),
            GradientDirection::Horizontal => f64::from(x) / f64::from(w.max(1)),
            GradientDirection::Diagonal => {
                f64::from(x + y) / (f64::from(w) + f64::from(h)).max(1.0)
            }
        }
    }

    /// Color at pixel `(x, y)`, channels truncated toward zero.
    pub fn color_at(&self, x: u32, y: u32, w: u32, h: u32) -> Color {
        let ratio = self.ratio_at(x, y, w, h);
        let [from, to] = self.colors;
        Color::rgb(
            lerp_channel_trunc(from.r, to.r, ratio),
            lerp_channel_trunc(from.g, to.g, ratio),
            lerp_channel_trunc(from.b, to.b, ratio),
        )
    }
}

/// Live background controls shared by the editor and the locked snapshot.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BackgroundSettings {
    /// Background source.
    pub mode: BackgroundMode,
    /// Fill for [`BackgroundMode::Solid`].
    pub color: Color,
    /// Fill for [`BackgroundMode::Gradient`].
    pub gradient: GradientSpec,
    /// Blur amount applied to image backgrounds (0 = none).
    pub blur: f64,
}

impl BackgroundSettings {
    /// The non-image fill these settings describe, if any.
    pub fn fill(&self) -> Option<BackgroundFill> {
        match self.mode {
            BackgroundMode::Image => None,
            BackgroundMode::Solid => Some(BackgroundFill::Solid(self.color)),
            BackgroundMode::Gradient => Some(BackgroundFill::Gradient(self.gradient)),
        }
    }
}

/// A procedural background owned by the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackgroundFill {
    /// Flat color.
    Solid(Color),
    /// Two-stop gradient.
    Gradient(GradientSpec),
}

impl BackgroundFill {
    /// Rasterize at `canvas` size.
    pub fn render(&self, canvas: Canvas) -> PosterResult<Raster> {
        match self {
            Self::Solid(c) => render_solid(*c, canvas),
            Self::Gradient(g) => render_gradient(g, canvas),
        }
    }
}

/// Render a flat color.
pub fn render_solid(color: Color, canvas: Canvas) -> PosterResult<Raster> {
    let opaque = Color { a: 255, ..color };
    Raster::filled(canvas.width, canvas.height, opaque.to_array())
}

/// Render a gradient with one interpolated color per pixel.
pub fn render_gradient(spec: &GradientSpec, canvas: Canvas) -> PosterResult<Raster> {
    let (w, h) = (canvas.width, canvas.height);
    if w == 0 || h == 0 {
        return Err(PosterError::validation("gradient canvas must be non-empty"));
    }
    let mut data = Vec::with_capacity(canvas.rgba_len()?);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&spec.color_at(x, y, w, h).to_array());
        }
    }
    Raster::new(w, h, data)
}

/// Render the non-image fill selected by `settings`; `None` for image mode.
pub fn render_fill(settings: &BackgroundSettings, canvas: Canvas) -> PosterResult<Option<Raster>> {
    settings.fill().map(|f| f.render(canvas)).transpose()
}

#[cfg(test)]
#[path = "../../tests/unit/background/fill.rs"]
mod tests;

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    background::{
        color::Color,
        fill::{BackgroundMode, GradientDirection, GradientSpec},
    },
    foundation::{
        core::Bounds,
        error::{PosterError, PosterResult},
    },
    media::provider::SourceRef,
    scene::model::{FontStyle, FontWeight, HorizontalAlign},
};

/// Fixed poster width.
pub const OUTPUT_WIDTH: u32 = 1000;
/// Fixed poster height.
pub const OUTPUT_HEIGHT: u32 = 1500;

/// Normalized layout handed to the rasterizer.
///
/// Positions and extents are fractions of the reference rectangle, whose size travels along
/// as `canvasWidth`/`canvasHeight` so pixel quantities (font size, stroke) can be rescaled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PosterExportModel {
    /// Background source.
    pub background_mode: BackgroundMode,
    /// Solid fill color.
    pub background_color: Color,
    /// Gradient stops.
    pub gradient_colors: [Color; 2],
    /// Gradient axis.
    pub gradient_direction: GradientDirection,
    /// Video to crop, image mode only.
    pub source_ref: Option<SourceRef>,
    /// Frame timestamp in seconds.
    pub timestamp: f64,
    /// Crop as fractions of the displayed frame.
    pub crop_rect: Bounds,
    /// Blur amount in reference pixels.
    pub blur: f64,
    /// Poster width in pixels.
    pub output_width: u32,
    /// Poster height in pixels.
    pub output_height: u32,
    /// Reference width.
    pub canvas_width: f64,
    /// Reference height.
    pub canvas_height: f64,
    /// Text elements, bottom to top.
    pub text_layers: Vec<TextLayerExport>,
    /// Line elements, bottom to top.
    pub line_elements: Vec<LineElementExport>,
    /// Requested output name, unsanitized.
    pub filename: String,
}

impl Default for PosterExportModel {
    fn default() -> Self {
        let gradient = GradientSpec::default();
        Self {
            background_mode: BackgroundMode::Image,
            background_color: Color::BLACK,
            gradient_colors: gradient.colors,
            gradient_direction: gradient.direction,
            source_ref: None,
            timestamp: 0.0,
            crop_rect: Bounds::UNIT,
            blur: 0.0,
            output_width: OUTPUT_WIDTH,
            output_height: OUTPUT_HEIGHT,
            canvas_width: 400.0,
            canvas_height: 600.0,
            text_layers: Vec::new(),
            line_elements: Vec::new(),
            filename: "poster".to_owned(),
        }
    }
}

impl PosterExportModel {
    /// Gradient colors and direction as one value.
    pub fn gradient(&self) -> GradientSpec {
        GradientSpec {
            colors: self.gradient_colors,
            direction: self.gradient_direction,
        }
    }

    /// Parse from JSON.
    pub fn from_reader(r: impl std::io::Read) -> PosterResult<Self> {
        serde_json::from_reader(r).map_err(|e| PosterError::serde(e.to_string()))
    }

    /// Parse from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> PosterResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path)
            .with_context(|| format!("open export model '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(f))
    }

    /// Pretty JSON.
    pub fn to_json_pretty(&self) -> PosterResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PosterError::serde(e.to_string()))
    }
}

/// One text element, bbox normalized to the reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayerExport {
    /// Wrapped lines joined by `\n`.
    pub content: String,
    /// Visible left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Measured width of the widest line.
    pub width: f64,
    /// Line count × line height.
    pub height: f64,
    /// Family name.
    pub font_family: String,
    /// Size in reference pixels, before `scale_y`.
    pub font_size: f64,
    /// Glyph color.
    pub fill: Color,
    /// Weight.
    pub font_weight: FontWeight,
    /// Slant.
    pub font_style: FontStyle,
    /// Underline each line.
    pub underline: bool,
    /// Line alignment inside the bbox.
    pub text_align: HorizontalAlign,
    /// Rotation in degrees.
    pub angle: f64,
    /// Horizontal scale.
    pub scale_x: f64,
    /// Vertical scale.
    pub scale_y: f64,
}

/// One line element with absolute, normalized endpoints.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineElementExport {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: Color,
    /// Fraction of the reference width.
    pub stroke_width: f64,
}

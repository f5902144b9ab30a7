use serde::{Deserialize, Serialize};

use crate::{
    background::{color::Color, fill::BackgroundFill},
    foundation::core::{Bounds, Point, Raster, Transform2D},
    text::measure::{FixedAdvanceMeasurer, FontSpec, wrap_lines},
};

/// Line spacing used by the editor's textboxes and the rasterizer.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Generational arena handle; stale handles never alias a newer object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Discriminant of a [`SceneObject`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Source frame or captured crop.
    ImageBackground,
    /// Solid or gradient fill.
    FillBackground,
    /// Crop selector rectangle.
    Overlay,
    /// One of the four dimming rectangles.
    Mask,
    /// Text element.
    Text,
    /// Line element.
    Line,
}

/// Which dimming rectangle a mask object is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaskSide {
    /// Above the overlay.
    Top,
    /// Below the overlay.
    Bottom,
    /// Left of the overlay, overlay rows only.
    Left,
    /// Right of the overlay, overlay rows only.
    Right,
}

/// Fixed z layers; ties inside a layer break by mask side, then insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Layer {
    Background,
    Mask,
    Overlay,
    Element,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl HorizontalAlign {
    /// Fraction of `(container - measured)` the visible left edge is shifted by.
    pub fn offset_factor(self) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center => 0.5,
            Self::Right => 1.0,
        }
    }
}

/// Typographic attributes of a text element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font family name, resolved by the font library.
    pub font_family: String,
    /// Size in surface pixels.
    pub font_size: f64,
    /// Glyph color.
    pub fill: Color,
    /// Weight.
    pub weight: FontWeight,
    /// Slant.
    pub style: FontStyle,
    /// Draw an underline under each line.
    pub underline: bool,
    /// Alignment of lines inside the textbox.
    pub align: HorizontalAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_owned(),
            font_size: 32.0,
            fill: Color::WHITE,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            underline: false,
            align: HorizontalAlign::Center,
        }
    }
}

/// Textbox: content wrapped at `wrap_width`, positioned by `transform` (origin top-left).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    /// Raw content; `\n` forces a break.
    pub content: String,
    /// Typography.
    pub style: TextStyle,
    /// Placement.
    pub transform: Transform2D,
    /// Container width in local units.
    pub wrap_width: f64,
}

impl TextElement {
    /// Element at `(left, top)` with default style.
    pub fn new(content: impl Into<String>, left: f64, top: f64, wrap_width: f64) -> Self {
        Self {
            content: content.into(),
            style: TextStyle::default(),
            transform: Transform2D::at(left, top),
            wrap_width,
        }
    }

    /// Wrapped line count under [`FixedAdvanceMeasurer`] metrics; at least one.
    pub fn line_count(&self) -> usize {
        let font = FontSpec::from_style(&self.style);
        let mut measurer = FixedAdvanceMeasurer::default();
        wrap_lines(&self.content, self.wrap_width, &font, &mut measurer)
            .map_or(1, |lines| lines.len().max(1))
    }

    /// Container height in local units.
    pub fn container_height(&self) -> f64 {
        self.line_count() as f64 * self.style.font_size * LINE_HEIGHT_FACTOR
    }
}

/// Straight segment between two local endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineElement {
    /// First endpoint, local space.
    pub start: Point,
    /// Second endpoint, local space.
    pub end: Point,
    /// Placement.
    pub transform: Transform2D,
    /// Stroke color.
    pub stroke: Color,
    /// Stroke width in local units.
    pub stroke_width: f64,
}

impl LineElement {
    /// White 2px line placed at `(x, y)`.
    pub fn new(start: Point, end: Point, x: f64, y: f64) -> Self {
        Self {
            start,
            end,
            transform: Transform2D::at(x, y),
            stroke: Color::WHITE,
            stroke_width: 2.0,
        }
    }

    /// Both endpoints in surface space.
    pub fn surface_endpoints(&self) -> (Point, Point) {
        (self.transform.apply(self.start), self.transform.apply(self.end))
    }
}

/// Everything the scene can hold.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneObject {
    /// Source frame (selection) or captured crop (composition).
    ImageBackground {
        /// Pixels.
        raster: Raster,
        /// Where the raster is drawn.
        bounds: Bounds,
    },
    /// Procedural fill covering `bounds`.
    FillBackground {
        /// Fill description.
        fill: BackgroundFill,
        /// Covered area.
        bounds: Bounds,
    },
    /// Crop selector.
    Overlay {
        /// Rectangle in canvas space.
        bounds: Bounds,
    },
    /// Dimming rectangle.
    Mask {
        /// Which side.
        side: MaskSide,
        /// Rectangle in canvas space.
        bounds: Bounds,
    },
    /// Text element.
    Text(TextElement),
    /// Line element.
    Line(LineElement),
}

impl SceneObject {
    /// Discriminant.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::ImageBackground { .. } => ObjectKind::ImageBackground,
            Self::FillBackground { .. } => ObjectKind::FillBackground,
            Self::Overlay { .. } => ObjectKind::Overlay,
            Self::Mask { .. } => ObjectKind::Mask,
            Self::Text(_) => ObjectKind::Text,
            Self::Line(_) => ObjectKind::Line,
        }
    }

    pub(crate) fn layer(&self) -> Layer {
        match self {
            Self::ImageBackground { .. } | Self::FillBackground { .. } => Layer::Background,
            Self::Mask { .. } => Layer::Mask,
            Self::Overlay { .. } => Layer::Overlay,
            Self::Text(_) | Self::Line(_) => Layer::Element,
        }
    }

    pub(crate) fn mask_side(&self) -> Option<MaskSide> {
        match self {
            Self::Mask { side, .. } => Some(*side),
            _ => None,
        }
    }

    /// Only user elements can become active.
    pub fn is_selectable(&self) -> bool {
        matches!(self, Self::Text(_) | Self::Line(_))
    }

    /// Overlay and mask objects never reach the export model.
    pub fn is_exportable(&self) -> bool {
        !matches!(self, Self::Overlay { .. } | Self::Mask { .. })
    }

    /// `true` for either background variant.
    pub fn is_background(&self) -> bool {
        self.layer() == Layer::Background
    }

    /// Axis-aligned surface-space extent, used for hit testing.
    ///
    /// Text uses its wrapped container; rotation is folded in by taking the hull of the
    /// transformed corners.
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::ImageBackground { bounds, .. }
            | Self::FillBackground { bounds, .. }
            | Self::Overlay { bounds }
            | Self::Mask { bounds, .. } => *bounds,
            Self::Text(t) => {
                let h = t.container_height();
                hull(
                    t.transform,
                    &[
                        Point::new(0.0, 0.0),
                        Point::new(t.wrap_width, 0.0),
                        Point::new(0.0, h),
                        Point::new(t.wrap_width, h),
                    ],
                )
            }
            Self::Line(l) => {
                let (a, b) = l.surface_endpoints();
                let pad = (l.stroke_width * l.transform.scale.x.abs()) / 2.0;
                Bounds::new(
                    a.x.min(b.x) - pad,
                    a.y.min(b.y) - pad,
                    (a.x - b.x).abs() + 2.0 * pad,
                    (a.y - b.y).abs() + 2.0 * pad,
                )
            }
        }
    }

    /// `true` when `p` lies inside [`Self::bounds`].
    pub fn hit_test(&self, p: Point) -> bool {
        let b = self.bounds();
        p.x >= b.left && p.x <= b.right() && p.y >= b.top && p.y <= b.bottom()
    }
}

fn hull(t: Transform2D, pts: &[Point]) -> Bounds {
    let affine = t.to_affine();
    let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
    let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &p in pts {
        let q = affine * p;
        x0 = x0.min(q.x);
        y0 = y0.min(q.y);
        x1 = x1.max(q.x);
        y1 = y1.max(q.y);
    }
    Bounds::new(x0, y0, x1 - x0, y1 - y0)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;

//! Scene → [`PosterExportModel`].
//!
//! Everything is normalized against a reference rectangle chosen by the caller: the full surface
//! once the background is locked, the crop overlay before that.

use crate::{
    background::fill::BackgroundSettings,
    export::model::{LineElementExport, PosterExportModel, TextLayerExport},
    foundation::{
        core::{Bounds, Canvas},
        error::PosterResult,
    },
    geometry::transform::{canvas_to_normalized, normalize_point},
    media::provider::SourceRef,
    scene::{
        graph::Scene,
        model::{LINE_HEIGHT_FACTOR, LineElement, SceneObject, TextElement},
    },
    text::measure::{FontSpec, TextMeasurer, widest_line, wrap_lines},
};

/// Background description copied into the export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportBackground {
    /// Mode, colors and blur.
    pub settings: BackgroundSettings,
    /// Source video, image mode only.
    pub source: Option<SourceRef>,
    /// Frame timestamp.
    pub timestamp: f64,
    /// Crop normalized to the displayed frame.
    pub crop: Bounds,
}

/// Serialize every exportable element of `scene` against `reference`, for an `output` poster.
#[tracing::instrument(skip_all, fields(
    elements = scene.len(),
    ref_w = reference.width,
    ref_h = reference.height,
))]
pub fn export_model(
    scene: &Scene,
    reference: Bounds,
    background: &ExportBackground,
    output: Canvas,
    filename: &str,
    measurer: &mut dyn TextMeasurer,
) -> PosterResult<PosterExportModel> {
    let mut text_layers = Vec::new();
    let mut line_elements = Vec::new();
    for (_, object) in scene.iter_ordered() {
        if !object.is_exportable() {
            continue;
        }
        match object {
            SceneObject::Text(t) => text_layers.push(export_text(t, reference, measurer)?),
            SceneObject::Line(l) => line_elements.push(export_line(l, reference)),
            SceneObject::ImageBackground { .. } | SceneObject::FillBackground { .. } => {}
            SceneObject::Overlay { .. } | SceneObject::Mask { .. } => {}
        }
    }

    let s = &background.settings;
    Ok(PosterExportModel {
        background_mode: s.mode,
        background_color: s.color,
        gradient_colors: s.gradient.colors,
        gradient_direction: s.gradient.direction,
        source_ref: background.source.clone(),
        timestamp: background.timestamp,
        crop_rect: background.crop,
        blur: s.blur,
        output_width: output.width,
        output_height: output.height,
        canvas_width: reference.width,
        canvas_height: reference.height,
        text_layers,
        line_elements,
        filename: filename.to_owned(),
    })
}

/// Measured, alignment-adjusted text bbox normalized to `reference`.
///
/// The content is wrapped exactly as the textbox wraps it and exported line by line, so the
/// rasterizer never re-wraps.
pub fn export_text(
    text: &TextElement,
    reference: Bounds,
    measurer: &mut dyn TextMeasurer,
) -> PosterResult<TextLayerExport> {
    let font = FontSpec::from_style(&text.style);
    let lines = wrap_lines(&text.content, text.wrap_width, &font, measurer)?;
    let t = text.transform;
    let (sx, sy) = (t.scale.x.abs(), t.scale.y.abs());

    let measured = widest_line(&lines, &font, measurer)? * sx;
    let container = if text.wrap_width.is_finite() && text.wrap_width > 0.0 {
        text.wrap_width * sx
    } else {
        measured
    };
    let visible_left = t.translate.x + text.style.align.offset_factor() * (container - measured);
    let height = lines.len() as f64 * text.style.font_size * LINE_HEIGHT_FACTOR * sy;

    let bbox = canvas_to_normalized(
        Bounds::new(visible_left, t.translate.y, measured, height),
        reference,
    );
    Ok(TextLayerExport {
        content: lines.join("\n"),
        left: bbox.left,
        top: bbox.top,
        width: bbox.width,
        height: bbox.height,
        font_family: text.style.font_family.clone(),
        font_size: text.style.font_size,
        fill: text.style.fill,
        font_weight: text.style.weight,
        font_style: text.style.style,
        underline: text.style.underline,
        text_align: text.style.align,
        angle: t.rotation_deg,
        scale_x: t.scale.x,
        scale_y: t.scale.y,
    })
}

/// Transformed endpoints and stroke normalized to `reference`.
pub fn export_line(line: &LineElement, reference: Bounds) -> LineElementExport {
    let (a, b) = line.surface_endpoints();
    let (x1, y1) = normalize_point(a.x, a.y, reference);
    let (x2, y2) = normalize_point(b.x, b.y, reference);
    let stroke_width = if reference.is_degenerate() {
        0.0
    } else {
        line.stroke_width * line.transform.scale.x.abs() / reference.width
    };
    LineElementExport {
        x1,
        y1,
        x2,
        y2,
        stroke: line.stroke,
        stroke_width,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/serializer.rs"]
mod tests;

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use image::imageops::FilterType;

use crate::{
    background::{
        blur::gaussian_blur_rgba8,
        capture::crop_and_resize,
        fill::{BackgroundMode, render_gradient, render_solid},
    },
    export::model::{LineElementExport, PosterExportModel, TextLayerExport},
    foundation::{
        core::{Bounds, Canvas, Raster},
        error::{PosterError, PosterResult},
        math::premul_rgba8,
    },
    media::provider::{FrameVariant, MediaProvider},
    scene::model::LINE_HEIGHT_FACTOR,
    text::{
        fonts::{FontLibrary, LoadedFont},
        layout::ParleyTextMeasurer,
    },
};

/// Where a rendered poster was written.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SavedPoster {
    /// File name inside the output directory.
    pub filename: String,
    /// Full path.
    pub path: PathBuf,
}

/// Turns an export model into a saved image.
pub trait PosterRasterizer {
    /// Render `model` and save it.
    fn render(&mut self, model: &PosterExportModel) -> PosterResult<SavedPoster>;
}

/// Software rasterizer: `image` for the background, `vello_cpu` for lines and glyphs.
///
/// Output is opaque: anything translucent is flattened over black.
pub struct CpuPosterRasterizer<P> {
    provider: P,
    text: ParleyTextMeasurer,
    font_data: HashMap<PathBuf, vello_cpu::peniko::FontData>,
    output_dir: PathBuf,
}

impl<P> std::fmt::Debug for CpuPosterRasterizer<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuPosterRasterizer")
            .field("output_dir", &self.output_dir)
            .field("fonts", &self.font_data.len())
            .finish_non_exhaustive()
    }
}

impl<P: MediaProvider> CpuPosterRasterizer<P> {
    /// Rasterizer fetching frames from `provider` and writing into `output_dir`.
    pub fn new(provider: P, fonts: FontLibrary, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            text: ParleyTextMeasurer::new(fonts),
            font_data: HashMap::new(),
            output_dir: output_dir.into(),
        }
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render `model` without saving.
    #[tracing::instrument(skip_all, fields(
        mode = ?model.background_mode,
        texts = model.text_layers.len(),
        lines = model.line_elements.len(),
    ))]
    pub fn rasterize(&mut self, model: &PosterExportModel) -> PosterResult<Raster> {
        let out = Canvas::new(model.output_width, model.output_height);
        let width: u16 = out
            .width
            .try_into()
            .map_err(|_| PosterError::render("poster width exceeds u16"))?;
        let height: u16 = out
            .height
            .try_into()
            .map_err(|_| PosterError::render("poster height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(PosterError::render("poster size must be non-zero"));
        }

        let background = self.background(model, out)?;
        let mut ctx = vello_cpu::RenderContext::new(width, height);
        draw_raster(&mut ctx, &background)?;

        let (w, h) = (f64::from(out.width), f64::from(out.height));
        for line in &model.line_elements {
            draw_line(&mut ctx, line, w, h);
        }
        let font_scale = if model.canvas_height > 0.0 {
            h / model.canvas_height
        } else {
            1.0
        };
        for text in &model.text_layers {
            self.draw_text(&mut ctx, text, w, h, font_scale)?;
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        // Premultiplied color with alpha dropped is the composite over black.
        let mut rgba = pixmap.data_as_u8_slice().to_vec();
        for px in rgba.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Raster::new(out.width, out.height, rgba)
    }

    fn background(&mut self, model: &PosterExportModel, out: Canvas) -> PosterResult<Raster> {
        match model.background_mode {
            BackgroundMode::Gradient => render_gradient(&model.gradient(), out),
            BackgroundMode::Solid => render_solid(model.background_color, out),
            BackgroundMode::Image => match &model.source_ref {
                Some(source) => {
                    match self
                        .provider
                        .fetch_frame(source, model.timestamp, FrameVariant::Full)
                    {
                        Ok(frame) => image_background(&frame, model, out),
                        Err(err) => {
                            tracing::warn!(%err, "frame fetch failed; background left black");
                            Raster::filled(out.width, out.height, [0, 0, 0, 255])
                        }
                    }
                }
                None => {
                    tracing::debug!("image mode without a source; using the solid color");
                    render_solid(model.background_color, out)
                }
            },
        }
    }

    fn font_data(
        &mut self,
        text: &TextLayerExport,
    ) -> PosterResult<(LoadedFont, vello_cpu::peniko::FontData)> {
        let (fonts, _) = self.text.parts_mut();
        let loaded = fonts.load(&text.font_family, text.font_weight, text.font_style)?;
        let data = self
            .font_data
            .entry(loaded.path.clone())
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(loaded.bytes.as_ref().clone()),
                    0,
                )
            })
            .clone();
        Ok((loaded, data))
    }

    /// One layout per `\n` line, aligned inside the exported bbox. Blank lines keep their slot.
    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &TextLayerExport,
        w: f64,
        h: f64,
        font_scale: f64,
    ) -> PosterResult<()> {
        let scale_y = if text.scale_y.is_finite() && text.scale_y != 0.0 {
            text.scale_y.abs()
        } else {
            1.0
        };
        let size = text.font_size * font_scale * scale_y;
        if !size.is_finite() || size <= 0.0 {
            tracing::debug!(size, "skipping text with non-positive size");
            return Ok(());
        }
        if text.content.trim().is_empty() {
            return Ok(());
        }

        let (loaded, font) = match self.font_data(text) {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(
                    family = %text.font_family,
                    %err,
                    "no usable font; text layer skipped"
                );
                return Ok(());
            }
        };
        let paint = vello_cpu::peniko::Color::from_rgba8(
            text.fill.r,
            text.fill.g,
            text.fill.b,
            text.fill.a,
        );
        let (box_left, box_top, box_width) = (text.left * w, text.top * h, text.width * w);
        let line_height = size * LINE_HEIGHT_FACTOR;

        for (i, line) in text.content.split('\n').enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (_, engine) = self.text.parts_mut();
            let layout = engine.layout_line(line, &loaded, size as f32, text.fill)?;
            let line_width = f64::from(layout.width());
            let x = box_left + text.text_align.offset_factor() * (box_width - line_width);
            let y = box_top + i as f64 * line_height;

            ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
            for layout_line in layout.lines() {
                for item in layout_line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));
                    let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }

            if text.underline {
                let thickness = (size / 16.0).floor().max(1.0);
                let uy = y + size + 2.0;
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    x,
                    uy - thickness / 2.0,
                    x + line_width,
                    uy + thickness / 2.0,
                ));
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

impl<P: MediaProvider> PosterRasterizer for CpuPosterRasterizer<P> {
    #[tracing::instrument(skip_all, fields(filename = %model.filename))]
    fn render(&mut self, model: &PosterExportModel) -> PosterResult<SavedPoster> {
        let raster = self.rasterize(model)?;
        save_png(&raster, &self.output_dir, &model.filename)
    }
}

/// Crop by the normalized rect, Lanczos3 to the poster size, then blur in poster pixels.
fn image_background(
    frame: &Raster,
    model: &PosterExportModel,
    out: Canvas,
) -> PosterResult<Raster> {
    let (fw, fh) = (f64::from(frame.width), f64::from(frame.height));
    let c = model.crop_rect;
    let src = Bounds::new(c.left * fw, c.top * fh, c.width * fw, c.height * fh);
    let scaled = crop_and_resize(frame, src, out, FilterType::Lanczos3)?;
    if model.blur <= 0.0 || model.canvas_width <= 0.0 {
        return Ok(scaled);
    }
    let sigma = model.blur / 2.0 * f64::from(out.width) / model.canvas_width;
    let blurred = gaussian_blur_rgba8(&scaled.rgba8, scaled.width, scaled.height, sigma)?;
    Raster::new(scaled.width, scaled.height, blurred)
}

fn draw_raster(ctx: &mut vello_cpu::RenderContext, raster: &Raster) -> PosterResult<()> {
    let w: u16 = raster
        .width
        .try_into()
        .map_err(|_| PosterError::render("background width exceeds u16"))?;
    let h: u16 = raster
        .height
        .try_into()
        .map_err(|_| PosterError::render("background height exceeds u16"))?;

    let mut may_have_opacities = false;
    let pixels = raster
        .rgba8
        .chunks_exact(4)
        .map(|px| {
            let [r, g, b, a] = premul_rgba8([px[0], px[1], px[2], px[3]]);
            may_have_opacities |= a != 255;
            vello_cpu::peniko::color::PremulRgba8 { r, g, b, a }
        })
        .collect::<Vec<_>>();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);

    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    });
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(raster.width),
        f64::from(raster.height),
    ));
    Ok(())
}

/// Stroke as a filled quad, at least one pixel wide.
fn draw_line(ctx: &mut vello_cpu::RenderContext, line: &LineElementExport, w: f64, h: f64) {
    let (x1, y1, x2, y2) = (line.x1 * w, line.y1 * h, line.x2 * w, line.y2 * h);
    let (dx, dy) = (x2 - x1, y2 - y1);
    let len = dx.hypot(dy);
    if !len.is_finite() || len == 0.0 {
        tracing::debug!("skipping zero-length line");
        return;
    }
    let half = (line.stroke_width * w).max(1.0) / 2.0;
    let (nx, ny) = (-dy / len * half, dx / len * half);

    let mut path = vello_cpu::kurbo::BezPath::new();
    path.move_to((x1 + nx, y1 + ny));
    path.line_to((x2 + nx, y2 + ny));
    path.line_to((x2 - nx, y2 - ny));
    path.line_to((x1 - nx, y1 - ny));
    path.close_path();

    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    let c = line.stroke;
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
    ctx.fill_path(&path);
}

/// Keep `[A-Za-z0-9_-]`; an empty result becomes `poster`.
pub fn sanitize_filename(name: &str) -> String {
    let safe: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        .collect();
    if safe.is_empty() {
        "poster".to_owned()
    } else {
        safe
    }
}

/// First of `stem.png`, `stem_1.png`, `stem_2.png`, … not present in `dir`.
pub fn unique_output_path(dir: &Path, stem: &str) -> PathBuf {
    let mut path = dir.join(format!("{stem}.png"));
    let mut n = 1u32;
    while path.exists() {
        path = dir.join(format!("{stem}_{n}.png"));
        n += 1;
    }
    path
}

/// Write `raster` as an RGB PNG under a sanitized, collision-free name.
pub fn save_png(raster: &Raster, dir: &Path, filename: &str) -> PosterResult<SavedPoster> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))?;
    let path = unique_output_path(dir, &sanitize_filename(filename));
    let rgb: Vec<u8> = raster
        .rgba8
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    image::save_buffer_with_format(
        &path,
        &rgb,
        raster.width,
        raster.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    tracing::info!(path = %path.display(), "poster saved");
    Ok(SavedPoster { filename, path })
}

#[cfg(test)]
#[path = "../../tests/unit/render/rasterizer.rs"]
mod tests;

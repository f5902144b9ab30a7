use image::imageops::{self, FilterType};

use crate::{
    background::blur::gaussian_blur_rgba8,
    foundation::core::{Bounds, Canvas, Raster},
    foundation::error::{PosterError, PosterResult},
    geometry::transform::{FrameDisplayInfo, canvas_to_original},
};

/// Crops the overlay region out of a source frame and scales it to the composition surface.
#[derive(Clone, Copy, Debug)]
pub struct BackgroundCaptureService {
    output: Canvas,
}

impl BackgroundCaptureService {
    /// Service producing rasters of `output` size.
    pub fn new(output: Canvas) -> Self {
        Self { output }
    }

    /// Target raster size.
    pub fn output(&self) -> Canvas {
        self.output
    }

    /// Capture with all inputs present; `None` when any of them is missing or the capture fails.
    ///
    /// A missing result means "no background image", so failures are logged and swallowed.
    pub fn capture(
        &self,
        frame: Option<&Raster>,
        info: Option<&FrameDisplayInfo>,
        overlay: Option<Bounds>,
        blur: f64,
    ) -> Option<Raster> {
        let (Some(frame), Some(info), Some(overlay)) = (frame, info, overlay) else {
            tracing::debug!("capture skipped: frame, display info or overlay missing");
            return None;
        };
        match self.try_capture(frame, info, overlay, blur) {
            Ok(raster) => Some(raster),
            Err(err) => {
                tracing::warn!(%err, "background capture failed");
                None
            }
        }
    }

    /// Map `overlay` into source pixels, crop, resample bilinearly, then blur with
    /// `sigma = blur / 2` output pixels.
    #[tracing::instrument(
        skip(self, frame, info),
        fields(out_w = self.output.width, out_h = self.output.height)
    )]
    pub fn try_capture(
        &self,
        frame: &Raster,
        info: &FrameDisplayInfo,
        overlay: Bounds,
        blur: f64,
    ) -> PosterResult<Raster> {
        if frame.is_empty() {
            return Err(PosterError::capture("source frame is empty"));
        }
        if info.is_degenerate() {
            return Err(PosterError::capture("frame display info is degenerate"));
        }

        let mut src = canvas_to_original(overlay, info);
        // The decoded frame can differ from the probed size (previews are downscaled).
        if info.original_width > 0.0 && f64::from(frame.width) != info.original_width {
            let sx = f64::from(frame.width) / info.original_width;
            let sy = f64::from(frame.height) / info.original_height;
            src = Bounds::new(src.left * sx, src.top * sy, src.width * sx, src.height * sy);
        }

        let mut out = crop_and_resize(frame, src, self.output, FilterType::Triangle)?;
        if blur > 0.0 {
            let blurred = gaussian_blur_rgba8(&out.rgba8, out.width, out.height, blur / 2.0)?;
            out = Raster::new(out.width, out.height, blurred)?;
        }
        Ok(out)
    }
}

/// Integer pixel window of `rect` clamped to a `width × height` frame, as `(x, y, w, h)`.
pub(crate) fn pixel_window(rect: Bounds, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    if rect.is_degenerate() || width == 0 || height == 0 {
        return None;
    }
    let (fw, fh) = (f64::from(width), f64::from(height));
    let x0 = rect.left.max(0.0).min(fw).round();
    let y0 = rect.top.max(0.0).min(fh).round();
    let x1 = rect.right().max(0.0).min(fw).round();
    let y1 = rect.bottom().max(0.0).min(fh).round();
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

/// Crop `src` (source pixels) out of `frame` and resample it to `output`.
pub(crate) fn crop_and_resize(
    frame: &Raster,
    src: Bounds,
    output: Canvas,
    filter: FilterType,
) -> PosterResult<Raster> {
    if output.width == 0 || output.height == 0 {
        return Err(PosterError::capture("capture output must be non-empty"));
    }
    let (x, y, w, h) = pixel_window(src, frame.width, frame.height).ok_or_else(|| {
        PosterError::capture(format!(
            "crop {src:?} does not intersect {}x{} frame",
            frame.width, frame.height
        ))
    })?;

    let img = frame.to_image()?;
    let cropped = imageops::crop_imm(&img, x, y, w, h).to_image();
    let scaled = if (w, h) == (output.width, output.height) {
        cropped
    } else {
        imageops::resize(&cropped, output.width, output.height, filter)
    };
    Ok(Raster::from_image(scaled))
}

#[cfg(test)]
#[path = "../../tests/unit/background/capture.rs"]
mod tests;

//! Mappings between the three coordinate spaces used by the editor.
//!
//! - **Original**: source frame pixels.
//! - **Canvas**: on-screen editing surface, where the frame is letterboxed.
//! - **Normalized**: `[0, 1]²` relative to a reference rectangle, the bridge to the output raster.
//!
//! All functions are pure. Degenerate input (zero-size frame or reference, non-finite values)
//! maps to [`Bounds::UNIT`] instead of failing.

use crate::foundation::core::Bounds;

/// How a source frame is letterboxed inside the editing canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameDisplayInfo {
    /// Displayed frame width in canvas units.
    pub display_width: f64,
    /// Displayed frame height in canvas units.
    pub display_height: f64,
    /// Horizontal centering offset.
    pub display_left: f64,
    /// Vertical centering offset.
    pub display_top: f64,
    /// Source frame width in pixels.
    pub original_width: f64,
    /// Source frame height in pixels.
    pub original_height: f64,
    /// `display_width / original_width`.
    pub scale: f64,
}

impl FrameDisplayInfo {
    fn degenerate(original_width: f64, original_height: f64) -> Self {
        Self {
            display_width: 0.0,
            display_height: 0.0,
            display_left: 0.0,
            display_top: 0.0,
            original_width,
            original_height,
            scale: 0.0,
        }
    }

    /// Displayed frame rectangle in canvas space.
    pub fn display_bounds(&self) -> Bounds {
        Bounds::new(
            self.display_left,
            self.display_top,
            self.display_width,
            self.display_height,
        )
    }

    /// `true` when no frame is effectively displayed.
    pub fn is_degenerate(&self) -> bool {
        !(self.scale.is_finite() && self.scale > 0.0) || self.display_bounds().is_degenerate()
    }
}

/// Fit a frame entirely inside the canvas, preserving aspect ratio and centering it on the
/// non-limiting axis.
///
/// One displayed extent always equals the corresponding canvas extent.
pub fn fit_frame(
    original_width: f64,
    original_height: f64,
    canvas_width: f64,
    canvas_height: f64,
) -> FrameDisplayInfo {
    let finite_positive = |v: f64| v.is_finite() && v > 0.0;
    if ![original_width, original_height, canvas_width, canvas_height]
        .into_iter()
        .all(finite_positive)
    {
        tracing::debug!(
            original_width,
            original_height,
            canvas_width,
            canvas_height,
            "degenerate frame fit"
        );
        return FrameDisplayInfo::degenerate(original_width, original_height);
    }

    let frame_aspect = original_width / original_height;
    let canvas_aspect = canvas_width / canvas_height;
    let (display_width, display_height) = if frame_aspect > canvas_aspect {
        (canvas_width, canvas_width / frame_aspect)
    } else {
        (canvas_height * frame_aspect, canvas_height)
    };

    FrameDisplayInfo {
        display_width,
        display_height,
        display_left: (canvas_width - display_width) / 2.0,
        display_top: (canvas_height - display_height) / 2.0,
        original_width,
        original_height,
        scale: display_width / original_width,
    }
}

/// Map a canvas-space rectangle into source pixel space.
pub fn canvas_to_original(rect: Bounds, info: &FrameDisplayInfo) -> Bounds {
    if info.is_degenerate() {
        return Bounds::UNIT;
    }
    Bounds::new(
        (rect.left - info.display_left) / info.scale,
        (rect.top - info.display_top) / info.scale,
        rect.width / info.scale,
        rect.height / info.scale,
    )
}

/// Inverse of [`canvas_to_original`].
pub fn original_to_canvas(rect: Bounds, info: &FrameDisplayInfo) -> Bounds {
    if info.is_degenerate() {
        return Bounds::UNIT;
    }
    Bounds::new(
        rect.left * info.scale + info.display_left,
        rect.top * info.scale + info.display_top,
        rect.width * info.scale,
        rect.height * info.scale,
    )
}

/// Express `rect` as fractions of `reference`.
pub fn canvas_to_normalized(rect: Bounds, reference: Bounds) -> Bounds {
    if reference.is_degenerate() {
        return Bounds::UNIT;
    }
    Bounds::new(
        (rect.left - reference.left) / reference.width,
        (rect.top - reference.top) / reference.height,
        rect.width / reference.width,
        rect.height / reference.height,
    )
}

/// Inverse of [`canvas_to_normalized`].
pub fn normalized_to_canvas(rect: Bounds, reference: Bounds) -> Bounds {
    if reference.is_degenerate() {
        return Bounds::UNIT;
    }
    Bounds::new(
        rect.left * reference.width + reference.left,
        rect.top * reference.height + reference.top,
        rect.width * reference.width,
        rect.height * reference.height,
    )
}

/// Normalize a single point against `reference`; degenerate references map to the origin.
pub fn normalize_point(x: f64, y: f64, reference: Bounds) -> (f64, f64) {
    if reference.is_degenerate() {
        return (0.0, 0.0);
    }
    (
        (x - reference.left) / reference.width,
        (y - reference.top) / reference.height,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/transform.rs"]
mod tests;

use crate::{
    foundation::core::{Bounds, Size},
    geometry::transform::FrameDisplayInfo,
    scene::model::MaskSide,
};

/// Overlay width / height.
pub const OVERLAY_ASPECT: f64 = 2.0 / 3.0;
/// Smallest zoom factor.
pub const MIN_ZOOM: f64 = 0.5;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 1.5;

/// The four rectangles dimming the canvas outside the overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DimmingMask {
    /// Full-width band above the overlay.
    pub top: Bounds,
    /// Full-width band below the overlay.
    pub bottom: Bounds,
    /// Left of the overlay, overlay rows only.
    pub left: Bounds,
    /// Right of the overlay, overlay rows only.
    pub right: Bounds,
}

impl DimmingMask {
    /// Derive the mask from an overlay on a `canvas`-sized surface. Extents are floored at 0.
    pub fn from_overlay(overlay: Bounds, canvas: Size) -> Self {
        let (cw, ch) = (canvas.width, canvas.height);
        let bottom_edge = overlay.top + overlay.height;
        let right_edge = overlay.left + overlay.width;
        let h = overlay.height.max(0.0);
        Self {
            top: Bounds::new(0.0, 0.0, cw, overlay.top.max(0.0)),
            bottom: Bounds::new(0.0, bottom_edge, cw, (ch - bottom_edge).max(0.0)),
            left: Bounds::new(0.0, overlay.top, overlay.left.max(0.0), h),
            right: Bounds::new(right_edge, overlay.top, (cw - right_edge).max(0.0), h),
        }
    }

    /// Rectangles paired with their side, in z-order.
    pub fn rects(&self) -> [(MaskSide, Bounds); 4] {
        [
            (MaskSide::Top, self.top),
            (MaskSide::Bottom, self.bottom),
            (MaskSide::Left, self.left),
            (MaskSide::Right, self.right),
        ]
    }

    /// Sum of the four areas.
    pub fn area(&self) -> f64 {
        self.rects().iter().map(|(_, b)| b.area()).sum()
    }
}

/// Value returned by every controller mutation; the scene stores it by object id.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayGeometry {
    /// Overlay rectangle in canvas space.
    pub overlay: Bounds,
    /// Mask derived from `overlay`.
    pub mask: DimmingMask,
}

/// Owns the crop overlay: 2:3, zoom-sized, kept inside the displayed frame.
#[derive(Clone, Debug)]
pub struct OverlayController {
    frame: FrameDisplayInfo,
    canvas: Size,
    base_height: f64,
    zoom: f64,
    overlay: Bounds,
}

impl OverlayController {
    /// Overlay at zoom 1.0, centered on the frame.
    pub fn new(frame: FrameDisplayInfo, canvas: Size, base_height: f64) -> Self {
        let mut this = Self {
            frame,
            canvas,
            base_height,
            zoom: 1.0,
            overlay: Bounds::default(),
        };
        let (w, h) = this.sized();
        this.overlay.width = w;
        this.overlay.height = h;
        this.reset();
        this
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current overlay rectangle.
    pub fn overlay(&self) -> Bounds {
        self.overlay
    }

    /// Frame the overlay is constrained to.
    pub fn frame(&self) -> &FrameDisplayInfo {
        &self.frame
    }

    /// Overlay plus derived mask.
    pub fn geometry(&self) -> OverlayGeometry {
        OverlayGeometry {
            overlay: self.overlay,
            mask: DimmingMask::from_overlay(self.overlay, self.canvas),
        }
    }

    /// Resize to `base_height × clamp(percent / 100)`, keeping the previous center.
    pub fn set_zoom(&mut self, percent: f64) -> OverlayGeometry {
        if !percent.is_finite() {
            tracing::debug!(percent, "ignoring non-finite zoom");
            return self.geometry();
        }
        self.zoom = (percent / 100.0).max(MIN_ZOOM).min(MAX_ZOOM);
        let center = self.overlay.center();
        let (w, h) = self.sized();
        self.overlay = Bounds::new(center.x - w / 2.0, center.y - h / 2.0, w, h);
        self.contain();
        self.geometry()
    }

    /// Drag the overlay to `(left, top)`, then clamp it into the frame.
    pub fn move_to(&mut self, left: f64, top: f64) -> OverlayGeometry {
        if left.is_finite() {
            self.overlay.left = left;
        }
        if top.is_finite() {
            self.overlay.top = top;
        }
        self.contain();
        self.geometry()
    }

    /// Center on the frame, then clamp.
    pub fn reset(&mut self) -> OverlayGeometry {
        let c = self.frame.display_bounds().center();
        self.overlay.left = c.x - self.overlay.width / 2.0;
        self.overlay.top = c.y - self.overlay.height / 2.0;
        self.contain();
        self.geometry()
    }

    fn sized(&self) -> (f64, f64) {
        let h = self.base_height * self.zoom;
        (h * OVERLAY_ASPECT, h)
    }

    // Lower bound first, then upper; an overlay larger than the frame ends on the far edge.
    fn contain(&mut self) {
        let f = self.frame.display_bounds();
        let o = &mut self.overlay;
        if o.left < f.left {
            o.left = f.left;
        }
        if o.left > f.right() - o.width {
            o.left = f.right() - o.width;
        }
        if o.top < f.top {
            o.top = f.top;
        }
        if o.top > f.bottom() - o.height {
            o.top = f.bottom() - o.height;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/controller.rs"]
mod tests;

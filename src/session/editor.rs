//! The editing session: one [`Scene`] driven through background selection and element
//! composition.
//!
//! Callers mutate through methods and read back through queries (`active_object`,
//! `scene_snapshot`, `overlay_geometry`); nothing is pushed to observers.

use std::time::Instant;

use crate::{
    background::{
        capture::BackgroundCaptureService,
        color::Color,
        fill::{BackgroundMode, BackgroundSettings, GradientSpec},
    },
    config::settings::PosterConfig,
    export::{
        model::PosterExportModel,
        serializer::{ExportBackground, export_model},
    },
    foundation::{
        core::{Bounds, Canvas, Point, Raster},
        error::{PosterError, PosterResult},
    },
    geometry::transform::{FrameDisplayInfo, canvas_to_normalized, fit_frame},
    media::{
        provider::{FrameVariant, MediaInfo, MediaProvider, SourceRef},
        scrub::{FetchOutcome, FetchTicket, FrameScrubber},
    },
    overlay::controller::{OverlayController, OverlayGeometry},
    scene::{
        graph::{Scene, SceneSnapshot},
        model::{LineElement, MaskSide, ObjectId, SceneObject, TextElement},
    },
    session::phase::{LockedBackgroundSnapshot, PhaseStateMachine, WorkflowPhase},
    text::measure::TextMeasurer,
};

#[derive(Debug)]
struct OverlayHandles {
    controller: OverlayController,
    overlay: ObjectId,
    masks: [(MaskSide, ObjectId); 4],
}

/// Interactive poster editor.
#[derive(Debug)]
pub struct PosterEditor {
    selection_surface: Canvas,
    composition_surface: Canvas,
    poster: Canvas,
    overlay_base_height: f64,
    scene: Scene,
    phases: PhaseStateMachine,
    settings: BackgroundSettings,
    source: Option<SourceRef>,
    media: Option<MediaInfo>,
    timestamp: f64,
    frame: Option<Raster>,
    display: Option<FrameDisplayInfo>,
    overlay: Option<OverlayHandles>,
    background: Option<ObjectId>,
    capture: BackgroundCaptureService,
    scrubber: FrameScrubber,
}

impl PosterEditor {
    /// Empty editor in background selection, image mode, no source.
    pub fn new(cfg: &PosterConfig) -> Self {
        let mut this = Self {
            selection_surface: cfg.selection_surface,
            composition_surface: cfg.composition_surface,
            poster: cfg.poster,
            overlay_base_height: cfg.overlay_base_height(),
            scene: Scene::new(cfg.selection_surface),
            phases: PhaseStateMachine::new(),
            settings: BackgroundSettings::default(),
            source: None,
            media: None,
            timestamp: 0.0,
            frame: None,
            display: None,
            overlay: None,
            background: None,
            capture: BackgroundCaptureService::new(cfg.composition_surface),
            scrubber: FrameScrubber::new(cfg.scrub_debounce()),
        };
        this.rebuild_selection();
        this
    }

    // ---- queries ----

    /// Current phase.
    pub fn phase(&self) -> WorkflowPhase {
        self.phases.phase()
    }

    /// Locked background while composing.
    pub fn snapshot(&self) -> Option<&LockedBackgroundSnapshot> {
        self.phases.snapshot()
    }

    /// Live background controls.
    pub fn settings(&self) -> &BackgroundSettings {
        &self.settings
    }

    /// Selected video.
    pub fn source(&self) -> Option<&SourceRef> {
        self.source.as_ref()
    }

    /// Probed dimensions of the selected video.
    pub fn media_info(&self) -> Option<MediaInfo> {
        self.media
    }

    /// Timestamp of the frame on screen.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Last frame applied.
    pub fn frame(&self) -> Option<&Raster> {
        self.frame.as_ref()
    }

    /// Frame letterboxing; selection phase only.
    pub fn frame_display(&self) -> Option<&FrameDisplayInfo> {
        self.display.as_ref()
    }

    /// Overlay and mask; selection phase only.
    pub fn overlay_geometry(&self) -> Option<OverlayGeometry> {
        self.overlay.as_ref().map(|h| h.controller.geometry())
    }

    /// Overlay zoom factor.
    pub fn zoom(&self) -> Option<f64> {
        self.overlay.as_ref().map(|h| h.controller.zoom())
    }

    /// Current surface size.
    pub fn surface(&self) -> Canvas {
        self.scene.surface()
    }

    /// Read access to the scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Owned copy of the scene contents.
    pub fn scene_snapshot(&self) -> SceneSnapshot {
        self.scene.snapshot()
    }

    /// Selected element.
    pub fn active_object(&self) -> Option<(ObjectId, &SceneObject)> {
        self.scene.active_object()
    }

    /// Frame fetch scheduler.
    pub fn scrubber(&self) -> &FrameScrubber {
        &self.scrubber
    }

    /// Overlay normalized to the displayed frame, `{0,0,1,1}` without one.
    pub fn current_crop(&self) -> Bounds {
        match (&self.display, &self.overlay) {
            (Some(d), Some(h)) => canvas_to_normalized(h.controller.overlay(), d.display_bounds()),
            _ => Bounds::UNIT,
        }
    }

    // ---- media ----

    /// Select a video and queue its first frame.
    pub fn set_source(&mut self, source: SourceRef, info: MediaInfo) {
        tracing::debug!(base = %source.base, path = %source.path, "source selected");
        self.source = Some(source);
        self.media = Some(info);
        self.frame = None;
        self.timestamp = 0.0;
        if self.phase() == WorkflowPhase::BackgroundSelection {
            self.rebuild_selection();
        }
        self.scrubber.request_immediate(0.0);
    }

    /// Show `raster` as the frame at `timestamp`.
    ///
    /// The overlay survives when the letterboxing is unchanged.
    pub fn set_frame(&mut self, timestamp: f64, raster: Raster) {
        self.timestamp = timestamp;
        self.frame = Some(raster);
        if self.phase() != WorkflowPhase::BackgroundSelection || !self.settings.mode.is_image() {
            return;
        }
        let display = self.image_display();
        let same_fit = match (&self.overlay, &display) {
            (Some(h), Some(d)) => h.controller.frame() == d,
            _ => false,
        };
        if let (true, Some(id), Some(d), Some(raster)) =
            (same_fit, self.background, display, self.frame.clone())
        {
            self.scene.replace(
                id,
                SceneObject::ImageBackground {
                    raster,
                    bounds: d.display_bounds(),
                },
            );
        } else {
            self.rebuild_selection();
        }
    }

    /// Slider scrub; fetched after the quiet period. Ignored while composing.
    pub fn scrub_to(&mut self, timestamp: f64, now: Instant) -> bool {
        if !self.can_edit_background() {
            return false;
        }
        self.scrubber.request_debounced(self.clamp_time(timestamp), now);
        true
    }

    /// Button step; fetched on the next poll. Ignored while composing.
    pub fn step_to(&mut self, timestamp: f64) -> bool {
        if !self.can_edit_background() {
            return false;
        }
        self.scrubber.request_immediate(self.clamp_time(timestamp));
        true
    }

    /// Next fetch to issue, if any.
    pub fn poll_fetch(&mut self, now: Instant) -> Option<FetchTicket> {
        self.scrubber.poll(now)
    }

    /// Deliver a fetch result; `Ok(true)` when the frame was applied.
    ///
    /// Failures leave the current frame in place and are returned to the caller.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: PosterResult<Raster>,
        now: Instant,
    ) -> PosterResult<bool> {
        match result {
            Ok(raster) => match self.scrubber.complete(ticket, now) {
                FetchOutcome::Apply => {
                    self.set_frame(ticket.timestamp, raster);
                    Ok(true)
                }
                FetchOutcome::Superseded => Ok(false),
            },
            Err(err) => {
                tracing::warn!(timestamp = ticket.timestamp, %err, "frame fetch failed");
                self.scrubber.fail(ticket);
                Err(err)
            }
        }
    }

    /// Poll, fetch through `provider` and deliver in one step.
    pub fn fetch_due_frame(
        &mut self,
        provider: &mut dyn MediaProvider,
        variant: FrameVariant,
        now: Instant,
    ) -> PosterResult<bool> {
        let Some(ticket) = self.scrubber.poll(now) else {
            return Ok(false);
        };
        let Some(source) = self.source.clone() else {
            self.scrubber.fail(ticket);
            return Err(PosterError::validation("no source video selected"));
        };
        let result = provider.fetch_frame(&source, ticket.timestamp, variant);
        self.complete_fetch(ticket, result, now)
    }

    // ---- background controls (selection phase) ----

    /// Switch background source. Ignored while composing.
    pub fn set_background_mode(&mut self, mode: BackgroundMode) -> bool {
        if !self.can_edit_background() {
            return false;
        }
        if self.settings.mode != mode {
            self.settings.mode = mode;
            self.rebuild_selection();
            if mode.is_image() && self.frame.is_none() && self.source.is_some() {
                self.scrubber.request_immediate(self.timestamp);
            }
        }
        true
    }

    /// Solid fill color. Ignored while composing.
    pub fn set_background_color(&mut self, color: Color) -> bool {
        if !self.can_edit_background() {
            return false;
        }
        self.settings.color = color;
        self.refresh_fill();
        true
    }

    /// Gradient stops and axis. Ignored while composing.
    pub fn set_gradient(&mut self, gradient: GradientSpec) -> bool {
        if !self.can_edit_background() {
            return false;
        }
        self.settings.gradient = gradient;
        self.refresh_fill();
        true
    }

    /// Blur amount; negative or non-finite values become 0. Ignored while composing.
    pub fn set_blur(&mut self, blur: f64) -> bool {
        if !self.can_edit_background() {
            return false;
        }
        self.settings.blur = if blur.is_finite() { blur.max(0.0) } else { 0.0 };
        true
    }

    // ---- overlay ----

    /// Zoom the overlay to `percent`.
    pub fn set_zoom(&mut self, percent: f64) -> Option<OverlayGeometry> {
        let g = self.overlay.as_mut()?.controller.set_zoom(percent);
        self.sync_overlay(g);
        Some(g)
    }

    /// Drag the overlay.
    pub fn move_overlay(&mut self, left: f64, top: f64) -> Option<OverlayGeometry> {
        let g = self.overlay.as_mut()?.controller.move_to(left, top);
        self.sync_overlay(g);
        Some(g)
    }

    /// Re-center the overlay on the frame.
    pub fn reset_overlay(&mut self) -> Option<OverlayGeometry> {
        let g = self.overlay.as_mut()?.controller.reset();
        self.sync_overlay(g);
        Some(g)
    }

    // ---- elements (composition phase) ----

    /// Add and select a text element.
    pub fn add_text(&mut self, text: TextElement) -> Option<ObjectId> {
        self.add_element(SceneObject::Text(text))
    }

    /// Add and select a line element.
    pub fn add_line(&mut self, line: LineElement) -> Option<ObjectId> {
        self.add_element(SceneObject::Line(line))
    }

    /// Mutate a text or line element in place.
    pub fn update_element(&mut self, id: ObjectId, f: impl FnOnce(&mut SceneObject)) -> bool {
        self.is_element(id) && self.scene.update(id, f)
    }

    /// Delete a text or line element.
    pub fn remove_element(&mut self, id: ObjectId) -> bool {
        self.is_element(id) && self.scene.remove(id).is_some()
    }

    /// Delete the selected element.
    pub fn remove_active(&mut self) -> bool {
        self.scene.active().is_some_and(|id| self.remove_element(id))
    }

    /// Select an element, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<ObjectId>) -> bool {
        self.scene.set_active(id)
    }

    /// Topmost element under `p`, without selecting it.
    pub fn hit_test(&self, p: Point) -> Option<ObjectId> {
        self.scene.hit_test(p)
    }

    /// Select the topmost element under `p`, or clear the selection.
    pub fn select_at(&mut self, p: Point) -> Option<ObjectId> {
        let hit = self.scene.hit_test(p);
        self.scene.set_active(hit);
        hit
    }

    // ---- transitions ----

    /// Lock the background and switch to composition.
    ///
    /// `Ok(false)` outside selection, or in image mode while no frame and overlay are shown.
    #[tracing::instrument(
        skip(self),
        fields(mode = ?self.settings.mode, blur = self.settings.blur)
    )]
    pub fn confirm(&mut self) -> PosterResult<bool> {
        if self.phase() != WorkflowPhase::BackgroundSelection {
            tracing::debug!("confirm ignored outside background selection");
            return Ok(false);
        }
        let crop = self.current_crop();
        let full = Bounds::from_size(self.composition_surface.size());

        let background = match self.settings.fill() {
            Some(fill) => SceneObject::FillBackground { fill, bounds: full },
            None => {
                let (Some(frame), Some(display), Some(h)) =
                    (&self.frame, &self.display, &self.overlay)
                else {
                    tracing::warn!("confirm ignored: no frame to capture");
                    return Ok(false);
                };
                let raster = self.capture.try_capture(
                    frame,
                    display,
                    h.controller.overlay(),
                    self.settings.blur,
                )?;
                SceneObject::ImageBackground {
                    raster,
                    bounds: full,
                }
            }
        };
        let raster = match &background {
            SceneObject::ImageBackground { raster, .. } => Some(raster.clone()),
            _ => None,
        };

        self.clear_selection_objects();
        self.scene.set_surface(self.composition_surface);
        self.background = Some(self.scene.add(background));
        self.phases.lock(LockedBackgroundSnapshot {
            settings: self.settings.clone(),
            crop,
            source: self.source.clone(),
            timestamp: self.timestamp,
            raster,
        });
        tracing::info!(
            crop_left = crop.left,
            crop_top = crop.top,
            crop_width = crop.width,
            crop_height = crop.height,
            "background locked"
        );
        Ok(true)
    }

    /// Drop every element and the snapshot, and rebuild the selection scene.
    ///
    /// In image mode the frame at the locked timestamp is fetched again.
    #[tracing::instrument(skip(self), fields(elements = self.scene.len()))]
    pub fn revert(&mut self) -> PosterResult<bool> {
        if self.phase() != WorkflowPhase::ElementComposition {
            tracing::debug!("revert ignored outside element composition");
            return Ok(false);
        }
        self.scene.remove_where(|_| true);
        self.background = None;
        if let Some(s) = self.phases.unlock().filter(|s| s.source == self.source) {
            self.timestamp = s.timestamp;
        }
        self.scene.set_surface(self.selection_surface);
        self.rebuild_selection();
        if self.settings.mode.is_image() && self.source.is_some() {
            self.scrubber.request_immediate(self.timestamp);
        }
        Ok(true)
    }

    // ---- export ----

    /// Serialize the poster layout.
    ///
    /// Composing: normalized to the full surface, background from the snapshot. Selecting:
    /// normalized to the overlay (full surface without one), background from live state.
    #[tracing::instrument(skip(self, measurer), fields(phase = ?self.phase()))]
    pub fn export(
        &self,
        measurer: &mut dyn TextMeasurer,
        filename: &str,
    ) -> PosterResult<PosterExportModel> {
        let full = Bounds::from_size(self.scene.surface().size());
        let (reference, background) = match self.phases.snapshot() {
            Some(s) => (
                full,
                ExportBackground {
                    settings: s.settings.clone(),
                    source: s.source.clone(),
                    timestamp: s.timestamp,
                    crop: s.crop,
                },
            ),
            None => (
                self.overlay
                    .as_ref()
                    .map_or(full, |h| h.controller.overlay()),
                ExportBackground {
                    settings: self.settings.clone(),
                    source: self.source.clone(),
                    timestamp: self.timestamp,
                    crop: self.current_crop(),
                },
            ),
        };
        if background.settings.mode.is_image() && background.source.is_none() {
            return Err(PosterError::validation(
                "image background requires a source video",
            ));
        }
        export_model(
            &self.scene,
            reference,
            &background,
            self.poster,
            filename,
            measurer,
        )
    }

    // ---- internals ----

    fn can_edit_background(&self) -> bool {
        let ok = self.phase() == WorkflowPhase::BackgroundSelection;
        if !ok {
            tracing::debug!("background is locked while composing");
        }
        ok
    }

    fn is_element(&self, id: ObjectId) -> bool {
        self.scene.get(id).is_some_and(SceneObject::is_selectable)
    }

    fn add_element(&mut self, object: SceneObject) -> Option<ObjectId> {
        if self.phase() != WorkflowPhase::ElementComposition {
            tracing::debug!(kind = ?object.kind(), "elements can only be added while composing");
            return None;
        }
        let id = self.scene.add(object);
        self.scene.set_active(Some(id));
        Some(id)
    }

    fn clamp_time(&self, timestamp: f64) -> f64 {
        let t = if timestamp.is_finite() { timestamp.max(0.0) } else { 0.0 };
        match self.media {
            Some(m) if m.duration.is_finite() && m.duration > 0.0 => t.min(m.duration),
            _ => t,
        }
    }

    /// Letterboxing of the held frame, sized by the probed dimensions when known.
    fn image_display(&self) -> Option<FrameDisplayInfo> {
        let frame = self.frame.as_ref()?;
        let (w, h) = self
            .media
            .map(|m| (m.width, m.height))
            .filter(|&(w, h)| w > 0 && h > 0)
            .unwrap_or((frame.width, frame.height));
        let surface = self.selection_surface.size();
        Some(fit_frame(
            f64::from(w),
            f64::from(h),
            surface.width,
            surface.height,
        ))
    }

    fn clear_selection_objects(&mut self) {
        self.scene.remove_where(|o| {
            o.is_background() || matches!(o, SceneObject::Overlay { .. } | SceneObject::Mask { .. })
        });
        self.background = None;
        self.overlay = None;
        self.display = None;
    }

    /// Rebuild frame, overlay and mask from scratch for the current mode.
    fn rebuild_selection(&mut self) {
        self.clear_selection_objects();
        let surface = self.selection_surface.size();
        let full = Bounds::from_size(surface);

        let (display, background) = match self.settings.fill() {
            Some(fill) => (
                Some(fit_frame(
                    surface.width,
                    surface.height,
                    surface.width,
                    surface.height,
                )),
                Some(SceneObject::FillBackground { fill, bounds: full }),
            ),
            None => match (self.image_display(), &self.frame) {
                (Some(d), Some(raster)) => (
                    Some(d),
                    Some(SceneObject::ImageBackground {
                        raster: raster.clone(),
                        bounds: d.display_bounds(),
                    }),
                ),
                _ => (None, None),
            },
        };

        self.background = background.map(|o| self.scene.add(o));
        if let Some(d) = display.filter(|d| !d.is_degenerate()) {
            let controller = OverlayController::new(d, surface, self.overlay_base_height);
            let g = controller.geometry();
            let overlay = self.scene.add(SceneObject::Overlay { bounds: g.overlay });
            let masks = g.mask.rects().map(|(side, bounds)| {
                (side, self.scene.add(SceneObject::Mask { side, bounds }))
            });
            self.overlay = Some(OverlayHandles {
                controller,
                overlay,
                masks,
            });
        }
        self.display = display;
    }

    fn sync_overlay(&mut self, g: OverlayGeometry) {
        let Some(h) = &self.overlay else {
            return;
        };
        self.scene
            .replace(h.overlay, SceneObject::Overlay { bounds: g.overlay });
        for (&(side, id), (_, bounds)) in h.masks.iter().zip(g.mask.rects()) {
            self.scene.replace(id, SceneObject::Mask { side, bounds });
        }
    }

    fn refresh_fill(&mut self) {
        let (Some(fill), Some(id)) = (self.settings.fill(), self.background) else {
            return;
        };
        self.scene.update(id, |o| {
            if let SceneObject::FillBackground { fill: f, .. } = o {
                *f = fill;
            }
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;

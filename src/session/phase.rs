use crate::{
    background::fill::BackgroundSettings,
    foundation::core::{Bounds, Raster},
    media::provider::SourceRef,
};

/// Which half of the workflow the editor is in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WorkflowPhase {
    /// Picking a frame or fill and positioning the crop.
    #[default]
    BackgroundSelection,
    /// Placing text and lines over the locked background.
    ElementComposition,
}

/// Background state frozen at confirm time.
///
/// Owned outright: later edits to the live settings never reach it.
#[derive(Clone, Debug, PartialEq)]
pub struct LockedBackgroundSnapshot {
    /// Mode, colors and blur as confirmed.
    pub settings: BackgroundSettings,
    /// Crop normalized to the displayed frame.
    pub crop: Bounds,
    /// Source video, when one was selected.
    pub source: Option<SourceRef>,
    /// Timestamp of the captured frame.
    pub timestamp: f64,
    /// Captured crop, image mode only.
    pub raster: Option<Raster>,
}

/// Two-state machine holding the locked snapshot while composing.
///
/// Transitions from the wrong state return `false` and change nothing.
#[derive(Clone, Debug, Default)]
pub struct PhaseStateMachine {
    snapshot: Option<LockedBackgroundSnapshot>,
}

impl PhaseStateMachine {
    /// Start in [`WorkflowPhase::BackgroundSelection`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> WorkflowPhase {
        if self.snapshot.is_some() {
            WorkflowPhase::ElementComposition
        } else {
            WorkflowPhase::BackgroundSelection
        }
    }

    /// Locked background, present exactly while composing.
    pub fn snapshot(&self) -> Option<&LockedBackgroundSnapshot> {
        self.snapshot.as_ref()
    }

    /// Enter composition with `snapshot`.
    pub fn lock(&mut self, snapshot: LockedBackgroundSnapshot) -> bool {
        if self.snapshot.is_some() {
            return false;
        }
        self.snapshot = Some(snapshot);
        true
    }

    /// Return to selection, handing back the discarded snapshot.
    pub fn unlock(&mut self) -> Option<LockedBackgroundSnapshot> {
        self.snapshot.take()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/phase.rs"]
mod tests;

//! Crop overlay sizing, containment and the dimming mask.

/// Zoom, drag containment and mask derivation.
pub mod controller;

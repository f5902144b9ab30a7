//! Posterframe is an interactive poster composition engine.
//!
//! A session runs in two phases:
//!
//! - Pick a video frame (or a solid/gradient fill) and position a 2:3 crop overlay on it
//! - Confirm to lock the cropped background, then place text and line elements on top
//!
//! At any point the [`PosterEditor`] can export a [`PosterExportModel`] whose coordinates are
//! normalized so the [`CpuPosterRasterizer`] reproduces the on-screen layout at 1000×1500.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod background;
pub mod config;
pub mod export;
pub mod geometry;
pub mod media;
pub mod overlay;
pub mod render;
pub mod scene;
pub mod session;
pub mod text;

pub use crate::foundation::core::{
    Affine, Bounds, Canvas, Point, Raster, Rect, Size, Transform2D, Vec2,
};
pub use crate::foundation::error::{PosterError, PosterResult};

pub use crate::background::color::Color;
pub use crate::background::fill::{
    BackgroundMode, BackgroundSettings, GradientDirection, GradientSpec,
};
pub use crate::config::settings::PosterConfig;
pub use crate::export::model::{LineElementExport, PosterExportModel, TextLayerExport};
pub use crate::geometry::transform::{FrameDisplayInfo, fit_frame};
pub use crate::media::provider::{
    FrameVariant, FsMediaProvider, MediaInfo, MediaProvider, SourceRef,
};
pub use crate::overlay::controller::{OverlayController, OverlayGeometry};
pub use crate::render::rasterizer::{CpuPosterRasterizer, PosterRasterizer, SavedPoster};
pub use crate::scene::model::{LineElement, ObjectId, ObjectKind, SceneObject, TextElement};
pub use crate::session::editor::PosterEditor;
pub use crate::session::phase::WorkflowPhase;
pub use crate::text::measure::{FixedAdvanceMeasurer, TextMeasurer};

//! Final poster rasterization.

/// Export model → PNG.
pub mod rasterizer;

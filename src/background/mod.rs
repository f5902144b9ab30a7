//! Background sources: cropped frame captures, flat fills and gradients.

/// Separable Gaussian blur over RGBA8.
pub mod blur;
/// Overlay crop → composition-sized raster.
pub mod capture;
/// Hex-serialized RGBA color.
pub mod color;
/// Background modes and procedural fills.
pub mod fill;

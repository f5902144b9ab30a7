//! Normalized export model and the serializer that produces it.

/// Wire format shared with the rasterizer.
pub mod model;
pub mod serializer;

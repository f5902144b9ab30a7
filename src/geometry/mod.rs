//! Pure coordinate geometry.

/// Original ↔ canvas ↔ normalized mappings.
pub mod transform;

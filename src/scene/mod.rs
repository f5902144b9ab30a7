//! Scene objects and the arena that orders them.

/// Generational arena with deterministic z-order.
pub mod graph;
/// Object variants and element styles.
pub mod model;

//! Text measurement, word wrapping and font resolution.

/// Font file lookup with system fallbacks.
pub mod fonts;
/// Parley shaping and the font-backed measurer.
pub mod layout;
/// Measuring contract and greedy word wrap.
pub mod measure;

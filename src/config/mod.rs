//! Runtime configuration.

/// [`settings::PosterConfig`] and its loaders.
pub mod settings;

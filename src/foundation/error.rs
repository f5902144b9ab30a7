/// Crate-wide result alias.
pub type PosterResult<T> = Result<T, PosterError>;

/// Error taxonomy for the composition engine and its reference collaborators.
///
/// Geometric degeneracy and out-of-phase transitions have no variant: they resolve to fallbacks
/// or silent no-ops.
#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    /// Missing or malformed caller input, reported before any provider call is made.
    #[error("validation error: {0}")]
    Validation(String),

    /// Transient I/O failure while fetching frames, thumbnails or media metadata.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Failure while cropping, scaling or blurring a background raster.
    #[error("capture error: {0}")]
    Capture(String),

    /// Failure while rasterizing or saving a final poster.
    #[error("render error: {0}")]
    Render(String),

    /// JSON encode/decode failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Context-wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PosterError {
    /// Build a [`PosterError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PosterError::Fetch`].
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`PosterError::Capture`].
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`PosterError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PosterError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for transient fetch failures the UI may offer to retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

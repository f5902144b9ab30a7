use std::{path::Path, path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    foundation::{
        core::Canvas,
        error::{PosterError, PosterResult},
    },
    media::provider::FsMediaOptions,
    text::fonts::FontLibrary,
};

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "POSTERFRAME_";

/// Runtime settings for the editor and its reference collaborators.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PosterConfig {
    /// Library roots; missing directories are skipped at use.
    pub media_roots: Vec<PathBuf>,
    /// Where rendered posters are written.
    pub output_dir: PathBuf,
    /// Custom font directory, searched before the system fallbacks.
    pub fonts_dir: Option<PathBuf>,
    /// Preview cache budget in megabytes.
    pub max_cache_size_mb: u64,
    /// Preview frames are scaled down to this width.
    pub preview_max_width: u32,
    /// Preview quality, 1..=100.
    pub thumbnail_quality: u8,
    /// Final poster size, carried into every export as the output dimensions.
    pub poster: Canvas,
    /// Recognized extensions, lowercase with the leading dot.
    pub video_extensions: Vec<String>,
    /// Wide surface used while picking the background.
    pub selection_surface: Canvas,
    /// 2:3 surface used while composing elements.
    pub composition_surface: Canvas,
    /// Overlay height at 100% zoom, as a fraction of the selection surface height.
    pub overlay_base_fraction: f64,
    /// Quiet period before a slider scrub issues a fetch.
    pub scrub_debounce_ms: u64,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            media_roots: ["/videos/source1", "/videos/source2", "/videos/source3"]
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            output_dir: PathBuf::from("/output"),
            fonts_dir: Some(PathBuf::from("/app/static/fonts")),
            max_cache_size_mb: 500,
            preview_max_width: 640,
            thumbnail_quality: 85,
            poster: Canvas::new(1000, 1500),
            video_extensions: [".mp4", ".mkv", ".avi", ".mov", ".webm", ".m4v", ".wmv", ".flv"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            selection_surface: Canvas::new(800, 500),
            composition_surface: Canvas::new(400, 600),
            overlay_base_fraction: 0.8,
            scrub_debounce_ms: 150,
        }
    }
}

impl PosterConfig {
    /// Parse from JSON and validate.
    pub fn from_reader(r: impl std::io::Read) -> PosterResult<Self> {
        let cfg: Self =
            serde_json::from_reader(r).map_err(|e| PosterError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse from a JSON file and validate.
    pub fn from_path(path: impl AsRef<Path>) -> PosterResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path)
            .with_context(|| format!("open config '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(f))
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> PosterResult<Self> {
        let mut cfg = Self::default();
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Overlay `POSTERFRAME_*` variables read through `lookup`.
    ///
    /// `VIDEO_PATHS` is comma separated; `/dev/null` and empty items are dropped.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> PosterResult<()> {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = get("VIDEO_PATHS") {
            self.media_roots = v
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty() && *p != "/dev/null")
                .map(PathBuf::from)
                .collect();
        }
        if let Some(v) = get("OUTPUT_PATH") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get("FONTS_DIR") {
            self.fonts_dir = (!v.trim().is_empty()).then(|| PathBuf::from(v));
        }
        if let Some(v) = get("MAX_CACHE_SIZE_MB") {
            self.max_cache_size_mb = parse_env("MAX_CACHE_SIZE_MB", &v)?;
        }
        if let Some(v) = get("PREVIEW_MAX_WIDTH") {
            self.preview_max_width = parse_env("PREVIEW_MAX_WIDTH", &v)?;
        }
        if let Some(v) = get("THUMBNAIL_QUALITY") {
            self.thumbnail_quality = parse_env("THUMBNAIL_QUALITY", &v)?;
        }
        if let Some(v) = get("SCRUB_DEBOUNCE_MS") {
            self.scrub_debounce_ms = parse_env("SCRUB_DEBOUNCE_MS", &v)?;
        }
        self.validate()
    }

    /// Reject settings the editor cannot work with.
    pub fn validate(&self) -> PosterResult<()> {
        for (name, c) in [
            ("poster", self.poster),
            ("selection_surface", self.selection_surface),
            ("composition_surface", self.composition_surface),
        ] {
            if c.width == 0 || c.height == 0 {
                return Err(PosterError::validation(format!(
                    "{name} must be non-empty, got {}x{}",
                    c.width, c.height
                )));
            }
        }
        if !(self.overlay_base_fraction.is_finite()
            && self.overlay_base_fraction > 0.0
            && self.overlay_base_fraction <= 1.0)
        {
            return Err(PosterError::validation(
                "overlay_base_fraction must be in (0, 1]",
            ));
        }
        if !(1..=100).contains(&self.thumbnail_quality) {
            return Err(PosterError::validation(
                "thumbnail_quality must be in 1..=100",
            ));
        }
        if let Some(bad) = self.video_extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(PosterError::validation(format!(
                "video extension \"{bad}\" must start with '.'"
            )));
        }
        Ok(())
    }

    /// Configured roots that exist on disk.
    pub fn existing_media_roots(&self) -> Vec<PathBuf> {
        self.media_roots.iter().filter(|p| p.is_dir()).cloned().collect()
    }

    /// Options for [`crate::media::provider::FsMediaProvider`].
    pub fn media_options(&self) -> FsMediaOptions {
        FsMediaOptions {
            roots: self.existing_media_roots(),
            video_extensions: self
                .video_extensions
                .iter()
                .map(|e| e.to_ascii_lowercase())
                .collect(),
            preview_max_width: self.preview_max_width,
            thumbnail_quality: self.thumbnail_quality,
            cache_bytes: usize::try_from(self.max_cache_size_mb.saturating_mul(1024 * 1024))
                .unwrap_or(usize::MAX),
        }
    }

    /// Font resolver rooted at `fonts_dir`.
    pub fn font_library(&self) -> FontLibrary {
        FontLibrary::new(self.fonts_dir.clone())
    }

    /// Scrub quiet period.
    pub fn scrub_debounce(&self) -> Duration {
        Duration::from_millis(self.scrub_debounce_ms)
    }

    /// Overlay height at 100% zoom.
    pub fn overlay_base_height(&self) -> f64 {
        f64::from(self.selection_surface.height) * self.overlay_base_fraction
    }
}

fn parse_env<T: FromStr>(name: &str, raw: &str) -> PosterResult<T> {
    raw.trim().parse().map_err(|_| {
        PosterError::validation(format!("{ENV_PREFIX}{name}: cannot parse \"{raw}\""))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    foundation::{
        core::Raster,
        error::{PosterError, PosterResult},
    },
    media::{
        cache::{FrameCache, frame_key},
        ffmpeg::{self, VideoProbe},
    },
};

/// A video identified by its library root and a path relative to it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    /// Library root the video lives under.
    pub base: String,
    /// Path relative to `base`.
    pub path: String,
}

impl SourceRef {
    /// Construct a reference.
    pub fn new(base: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            path: path.into(),
        }
    }
}

/// Listing entry type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Directory containing at least one video somewhere below it.
    Directory,
    /// Video file.
    Video,
}

/// One row of a media listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    /// File or directory name.
    pub name: String,
    /// Path relative to `base`.
    pub path: String,
    /// Entry type.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Library root.
    pub base: String,
    /// File size in bytes, videos only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Source dimensions and length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Duration in seconds.
    pub duration: f64,
}

impl From<VideoProbe> for MediaInfo {
    fn from(p: VideoProbe) -> Self {
        Self {
            width: p.width,
            height: p.height,
            duration: p.duration,
        }
    }
}

/// Frame quality tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameVariant {
    /// Native resolution, used for capture and final rendering.
    Full,
    /// Downscaled, cached, used while scrubbing.
    Preview,
}

impl FrameVariant {
    fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Preview => "preview",
        }
    }
}

/// Decoded source frame.
pub type SourceFrame = Raster;

/// Supplies listings, metadata and frames. Failures surface as [`PosterError::Fetch`].
pub trait MediaProvider {
    /// Directories with videos and video files under `path` (library roots when `None`).
    fn list_entries(&self, path: Option<&str>) -> PosterResult<Vec<MediaEntry>>;

    /// Probe a source.
    fn info(&self, source: &SourceRef) -> PosterResult<MediaInfo>;

    /// Address a UI can load the frame from.
    fn frame_uri(&self, source: &SourceRef, timestamp: f64, variant: FrameVariant) -> String;

    /// Decode one frame.
    fn fetch_frame(
        &mut self,
        source: &SourceRef,
        timestamp: f64,
        variant: FrameVariant,
    ) -> PosterResult<SourceFrame>;

    /// `count` preview frames at `i × duration / count`.
    fn thumbnails(&mut self, source: &SourceRef, count: u32) -> PosterResult<Vec<Raster>>;
}

/// Settings for [`FsMediaProvider`].
#[derive(Clone, Debug)]
pub struct FsMediaOptions {
    /// Library roots.
    pub roots: Vec<PathBuf>,
    /// Lowercase extensions with leading dot.
    pub video_extensions: Vec<String>,
    /// Preview frames are scaled to this width.
    pub preview_max_width: u32,
    /// Preview quality, part of the cache key.
    pub thumbnail_quality: u8,
    /// Preview cache budget.
    pub cache_bytes: usize,
}

/// Filesystem library with `ffprobe`/`ffmpeg` decoding.
#[derive(Debug)]
pub struct FsMediaProvider {
    opts: FsMediaOptions,
    cache: FrameCache,
}

impl FsMediaProvider {
    /// Provider over `opts.roots`.
    pub fn new(opts: FsMediaOptions) -> Self {
        let cache = FrameCache::new(opts.cache_bytes);
        Self { opts, cache }
    }

    /// Preview cache, for inspection.
    pub fn cache(&self) -> &FrameCache {
        &self.cache
    }

    fn is_video(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .is_some_and(|e| self.opts.video_extensions.contains(&e))
    }

    fn contains_video(&self, dir: &Path) -> bool {
        let Ok(rd) = std::fs::read_dir(dir) else {
            return false;
        };
        rd.flatten().any(|entry| {
            let p = entry.path();
            if p.is_dir() {
                self.contains_video(&p)
            } else {
                p.is_file() && self.is_video(&p)
            }
        })
    }

    fn scan_directory(&self, dir: &Path, base: &Path) -> Vec<MediaEntry> {
        let Ok(rd) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut items = Vec::new();
        for entry in rd.flatten() {
            let p = entry.path();
            let Ok(rel) = p.strip_prefix(base) else {
                continue;
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let rel = rel.to_string_lossy().replace('\\', "/");
            let base_str = base.to_string_lossy().into_owned();
            if p.is_dir() {
                if self.contains_video(&p) {
                    items.push(MediaEntry {
                        name,
                        path: rel,
                        kind: EntryKind::Directory,
                        base: base_str,
                        size: None,
                    });
                }
            } else if p.is_file() && self.is_video(&p) {
                items.push(MediaEntry {
                    name,
                    path: rel,
                    kind: EntryKind::Video,
                    base: base_str,
                    size: entry.metadata().ok().map(|m| m.len()),
                });
            }
        }
        items
    }

    /// Absolute path of `source`, which must name a file under a configured root.
    pub fn resolve(&self, source: &SourceRef) -> PosterResult<PathBuf> {
        let base = Path::new(&source.base);
        if !self.opts.roots.iter().any(|r| r == base) {
            return Err(PosterError::validation(format!(
                "unknown media root \"{}\"",
                source.base
            )));
        }
        let rel = normalize_rel_path(&source.path)?;
        let full = base.join(rel);
        if !full.is_file() {
            return Err(PosterError::fetch(format!(
                "video not found: {}",
                full.display()
            )));
        }
        Ok(full)
    }

    fn probe(&self, source: &SourceRef) -> PosterResult<(PathBuf, VideoProbe)> {
        let full = self.resolve(source)?;
        let probe = ffmpeg::probe_video(&full)?;
        Ok((full, probe))
    }
}

impl MediaProvider for FsMediaProvider {
    fn list_entries(&self, path: Option<&str>) -> PosterResult<Vec<MediaEntry>> {
        let sub = path
            .filter(|p| !p.trim().is_empty())
            .map(normalize_rel_path)
            .transpose()?;
        let mut out = Vec::new();
        for base in &self.opts.roots {
            let dir = match &sub {
                Some(rel) => base.join(rel),
                None => base.clone(),
            };
            if !dir.is_dir() {
                continue;
            }
            out.extend(self.scan_directory(&dir, base));
        }
        out.sort_by_key(|e| e.name.to_lowercase());
        Ok(out)
    }

    fn info(&self, source: &SourceRef) -> PosterResult<MediaInfo> {
        self.probe(source).map(|(_, p)| p.into())
    }

    fn frame_uri(&self, source: &SourceRef, timestamp: f64, variant: FrameVariant) -> String {
        format!(
            "/api/frames/{}?base={}&path={}&t={}",
            variant.as_str(),
            percent_encode(&source.base),
            percent_encode(&source.path),
            timestamp.max(0.0)
        )
    }

    #[tracing::instrument(skip(self), fields(base = %source.base, path = %source.path))]
    fn fetch_frame(
        &mut self,
        source: &SourceRef,
        timestamp: f64,
        variant: FrameVariant,
    ) -> PosterResult<SourceFrame> {
        let (full, probe) = self.probe(source)?;
        match variant {
            FrameVariant::Full => ffmpeg::decode_frame_rgba8(&full, &probe, timestamp, None),
            FrameVariant::Preview => {
                let key = frame_key(
                    &full.to_string_lossy(),
                    timestamp,
                    self.opts.preview_max_width,
                    self.opts.thumbnail_quality,
                );
                if let Some(hit) = self.cache.get(key) {
                    return Ok(hit);
                }
                let frame = ffmpeg::decode_frame_rgba8(
                    &full,
                    &probe,
                    timestamp,
                    Some(self.opts.preview_max_width),
                )?;
                self.cache.insert(key, frame.clone());
                Ok(frame)
            }
        }
    }

    fn thumbnails(&mut self, source: &SourceRef, count: u32) -> PosterResult<Vec<Raster>> {
        let info = self.info(source)?;
        if info.duration <= 0.0 {
            return Err(PosterError::fetch("could not determine video duration"));
        }
        let mut out = Vec::new();
        for t in thumbnail_times(info.duration, count) {
            match self.fetch_frame(source, t, FrameVariant::Preview) {
                Ok(frame) => out.push(frame),
                Err(err) => tracing::warn!(%err, t, "skipping thumbnail"),
            }
        }
        Ok(out)
    }
}

/// Evenly spaced timestamps `i × duration / count`.
pub fn thumbnail_times(duration: f64, count: u32) -> Vec<f64> {
    if !(duration.is_finite() && duration > 0.0) || count == 0 {
        return Vec::new();
    }
    let step = duration / f64::from(count);
    (0..count).map(|i| f64::from(i) * step).collect()
}

/// Normalize a relative media path, rejecting absolute paths and `..`.
pub fn normalize_rel_path(source: &str) -> PosterResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PosterError::validation("media paths must be relative"));
    }
    if s.is_empty() {
        return Err(PosterError::validation("media path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PosterError::validation("media paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PosterError::validation("media path must name an entry"));
    }

    Ok(out.join("/"))
}

// RFC 3986 unreserved characters pass through.
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/media/provider.rs"]
mod tests;

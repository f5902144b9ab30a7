use std::path::Path;

use crate::foundation::{
    core::Raster,
    error::{PosterError, PosterResult},
};

/// Metadata reported by `ffprobe`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoProbe {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Duration in seconds.
    pub duration: f64,
    /// Frames per second, `24.0` when unparseable.
    pub fps: f64,
}

/// Parse an ffprobe rate such as `24000/1001` or `25`.
pub fn parse_frame_rate(s: &str) -> Option<f64> {
    let v = match s.split_once('/') {
        Some((num, den)) => {
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num.trim().parse::<f64>().ok()? / den
        }
        None => s.trim().parse().ok()?,
    };
    (v.is_finite() && v > 0.0).then_some(v)
}

/// Output size when scaling `(w, h)` to `target_width`, keeping aspect.
pub fn scaled_dims(w: u32, h: u32, target_width: Option<u32>) -> (u32, u32) {
    match target_width {
        Some(tw) if tw > 0 && w > 0 => {
            let th = (f64::from(h) * f64::from(tw) / f64::from(w)).round().max(1.0);
            (tw, th as u32)
        }
        _ => (w, h),
    }
}

/// Probe a video through `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> PosterResult<VideoProbe> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| PosterError::fetch(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(PosterError::fetch(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| PosterError::fetch(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| PosterError::fetch("no video stream found"))?;
    let (Some(width), Some(height)) = (video.width, video.height) else {
        return Err(PosterError::fetch("missing video dimensions from ffprobe"));
    };
    let duration = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);
    let fps = video
        .r_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .unwrap_or(24.0);

    Ok(VideoProbe {
        width,
        height,
        duration,
        fps,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe a video through `ffprobe`.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn probe_video(_source_path: &Path) -> PosterResult<VideoProbe> {
    Err(PosterError::fetch(
        "video probing requires the 'media-ffmpeg' feature",
    ))
}

/// Decode the frame at `timestamp` as RGBA8, optionally scaled to `target_width`.
///
/// Seeks coarsely to one second before the target, then precisely after opening the input.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_frame_rgba8(
    source_path: &Path,
    probe: &VideoProbe,
    timestamp: f64,
    target_width: Option<u32>,
) -> PosterResult<Raster> {
    let timestamp = timestamp.max(0.0);
    let fast_seek = (timestamp - 1.0).max(0.0);
    let precise_seek = timestamp - fast_seek;
    let (w, h) = scaled_dims(probe.width, probe.height, target_width);

    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{fast_seek:.6}")])
        .arg("-i")
        .arg(source_path)
        .args([
            "-ss",
            &format!("{precise_seek:.6}"),
            "-frames:v",
            "1",
            "-vf",
            &format!("scale={w}:{h}"),
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| PosterError::fetch(format!("failed to run ffmpeg for frame decode: {e}")))?;

    if !out.status.success() {
        return Err(PosterError::fetch(format!(
            "ffmpeg frame decode failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = w as usize * h as usize * 4;
    if expected_len == 0 || out.stdout.len() < expected_len {
        return Err(PosterError::fetch(format!(
            "decoded frame has invalid size: got {} bytes, expected {expected_len}",
            out.stdout.len()
        )));
    }
    let mut data = out.stdout;
    data.truncate(expected_len);
    Raster::new(w, h, data)
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Decode the frame at `timestamp` as RGBA8.
///
/// Returns an error when `media-ffmpeg` feature is disabled.
pub fn decode_frame_rgba8(
    _source_path: &Path,
    _probe: &VideoProbe,
    _timestamp: f64,
    _target_width: Option<u32>,
) -> PosterResult<Raster> {
    Err(PosterError::fetch(
        "frame decoding requires the 'media-ffmpeg' feature",
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;

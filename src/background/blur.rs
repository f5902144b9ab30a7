use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::math::{premul_rgba8, unpremul_rgba8};

/// Fixed-point one.
const Q16: u32 = 1 << 16;

/// Kernel half-width covering `±3σ`, saturating at `u32::MAX`.
pub fn kernel_radius_for_sigma(sigma: f64) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil().min(f64::from(u32::MAX)) as u32
}

/// Gaussian blur of a straight-alpha RGBA8 buffer with `σ` in pixels.
///
/// Blurring happens in premultiplied space so transparent pixels do not bleed color.
pub fn gaussian_blur_rgba8(
    src: &[u8],
    width: u32,
    height: u32,
    sigma: f64,
) -> PosterResult<Vec<u8>> {
    let premul: Vec<u8> = src
        .chunks_exact(4)
        .flat_map(|px| premul_rgba8([px[0], px[1], px[2], px[3]]))
        .collect();
    let radius = kernel_radius_for_sigma(sigma);
    let mut out = blur_rgba8_premul(&premul, width, height, radius, sigma)?;
    for px in out.chunks_exact_mut(4) {
        let straight = unpremul_rgba8([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&straight);
    }
    Ok(out)
}

/// Separable Gaussian blur over premultiplied RGBA8; edges repeat the border pixel.
///
/// `radius` is capped at the longer image side.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f64,
) -> PosterResult<Vec<u8>> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| PosterError::capture("blur buffer size overflow"))?;
    if src.len() != len {
        return Err(PosterError::capture(format!(
            "blur buffer holds {} bytes, expected {len} for {width}x{height}",
            src.len()
        )));
    }
    if radius == 0 || len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = kernel_q16(radius.min(width.max(height)), sigma)?;
    let (w, h) = (width as usize, height as usize);
    let mut rows = vec![0u8; len];
    let mut out = vec![0u8; len];
    convolve(src, &mut rows, &kernel, Axis::rows(w, h));
    convolve(&rows, &mut out, &kernel, Axis::columns(w, h));
    Ok(out)
}

/// Normalized Gaussian taps in Q16 that sum to exactly [`Q16`].
fn kernel_q16(radius: u32, sigma: f64) -> PosterResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PosterError::validation("blur sigma must be > 0"));
    }
    let r = i64::from(radius);
    let denom = 2.0 * sigma * sigma;
    let raw: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return Err(PosterError::capture("gaussian kernel sums to zero"));
    }

    let mut taps: Vec<u32> = raw
        .iter()
        .map(|w| ((w / total) * f64::from(Q16)).round().clamp(0.0, f64::from(Q16)) as u32)
        .collect();
    // Rounding drift lands on the center tap.
    let sum: i64 = taps.iter().map(|&t| i64::from(t)).sum();
    let mid = taps.len() / 2;
    taps[mid] = (i64::from(taps[mid]) + i64::from(Q16) - sum).clamp(0, i64::from(Q16)) as u32;
    Ok(taps)
}

/// Pixel layout of one convolution direction.
#[derive(Clone, Copy)]
struct Axis {
    lines: usize,
    len: usize,
    line_step: usize,
    step: usize,
}

impl Axis {
    /// `h` lines of `w` pixels one apart.
    fn rows(w: usize, h: usize) -> Self {
        Self {
            lines: h,
            len: w,
            line_step: w,
            step: 1,
        }
    }

    /// `w` lines of `h` pixels `w` apart.
    fn columns(w: usize, h: usize) -> Self {
        Self {
            lines: w,
            len: h,
            line_step: 1,
            step: w,
        }
    }
}

fn convolve(src: &[u8], dst: &mut [u8], kernel: &[u32], axis: Axis) {
    let radius = kernel.len() / 2;
    let last = axis.len - 1;
    for line in 0..axis.lines {
        let base = line * axis.line_step;
        for i in 0..axis.len {
            let mut acc = [0u64; 4];
            for (k, &weight) in kernel.iter().enumerate() {
                let j = (i + k).saturating_sub(radius).min(last);
                let at = (base + j * axis.step) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(weight) * u64::from(src[at + c]);
                }
            }
            let at = (base + i * axis.step) * 4;
            for (c, a) in acc.into_iter().enumerate() {
                dst[at + c] = ((a + u64::from(Q16 / 2)) >> 16).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/background/blur.rs"]
mod tests;

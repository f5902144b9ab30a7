use super::*;

fn opaque(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    px.repeat((w * h) as usize)
}

#[test]
fn zero_radius_copies_input() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap(), src);
}

#[test]
fn flat_buffer_is_unchanged() {
    let src = opaque(4, 3, [10, 20, 30, 40]);
    assert_eq!(blur_rgba8_premul(&src, 4, 3, 3, 2.0).unwrap(), src);
}

#[test]
fn point_energy_is_spread_and_conserved() {
    let (w, h) = (7u32, 7u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((3 * w + 3) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255; 4]);

    let out = blur_rgba8_premul(&src, w, h, 2, 1.2).unwrap();
    let lit = out.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(lit > 1);
    let alpha: i32 = out.chunks_exact(4).map(|px| i32::from(px[3])).sum();
    assert!((alpha - 255).abs() <= 6, "{alpha}");
    // Symmetric kernel: mirrored neighbours match.
    let at = |x: u32, y: u32| out[((y * w + x) * 4 + 3) as usize];
    assert_eq!(at(2, 3), at(4, 3));
    assert_eq!(at(3, 2), at(3, 4));
}

#[test]
fn radius_covers_three_sigma() {
    assert_eq!(kernel_radius_for_sigma(0.0), 0);
    assert_eq!(kernel_radius_for_sigma(f64::NAN), 0);
    assert_eq!(kernel_radius_for_sigma(1.0), 3);
    assert_eq!(kernel_radius_for_sigma(2.5), 8);
}

#[test]
fn kernel_sums_to_one() {
    let k = kernel_q16(4, 1.5).unwrap();
    assert_eq!(k.len(), 9);
    assert_eq!(k.iter().sum::<u32>(), Q16);
    assert!(k[4] > k[3] && k[3] > k[2]);
    assert!(kernel_q16(2, 0.0).is_err());
}

#[test]
fn opaque_color_survives_straight_alpha_blur() {
    let src = opaque(6, 4, [200, 40, 90, 255]);
    assert_eq!(gaussian_blur_rgba8(&src, 6, 4, 1.5).unwrap(), src);
}

#[test]
fn short_buffer_is_rejected() {
    assert!(matches!(
        blur_rgba8_premul(&[0u8; 7], 1, 2, 1, 1.0),
        Err(PosterError::Capture(_))
    ));
}

#[test]
fn huge_sigma_saturates_radius() {
    assert_eq!(kernel_radius_for_sigma(1e10), u32::MAX);
    assert_eq!(kernel_radius_for_sigma(f64::INFINITY), 0);
}

#[test]
fn huge_sigma_blurs_with_a_bounded_kernel() {
    let (w, h) = (6u32, 4u32);
    let mut src = opaque(w, h, [0, 0, 0, 255]);
    src[..4].copy_from_slice(&[255, 255, 255, 255]);
    let out = gaussian_blur_rgba8(&src, w, h, 5e9).unwrap();
    assert_eq!(out.len(), src.len());
    assert!(out.chunks_exact(4).all(|px| px[3] == 255));
    // Near-box kernel: the bright corner is spread across the whole buffer.
    assert!(out[0] < 255);
    assert!(out.chunks_exact(4).all(|px| px[0] == px[1] && px[1] == px[2]));
}

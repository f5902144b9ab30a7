use super::*;

#[test]
fn fnv1a64_known_vector() {
    let mut h = Fnv1a64::new_default();
    h.write_bytes(b"a");
    assert_eq!(h.finish(), 0xaf63_dc4c_8601_ec8c);
}

#[test]
fn fnv1a64_separates_string_fields() {
    let mut a = Fnv1a64::new_default();
    a.write_str("ab");
    a.write_str("c");
    let mut b = Fnv1a64::new_default();
    b.write_str("a");
    b.write_str("bc");
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn premul_roundtrip_is_close() {
    let px = [200u8, 100, 50, 128];
    let back = unpremul_rgba8(premul_rgba8(px));
    for c in 0..3 {
        assert!((i32::from(back[c]) - i32::from(px[c])).abs() <= 2);
    }
    assert_eq!(premul_rgba8([9, 9, 9, 0]), [0, 0, 0, 0]);
    assert_eq!(unpremul_rgba8([0, 0, 0, 0]), [0, 0, 0, 0]);
}

#[test]
fn lerp_truncates() {
    assert_eq!(lerp_channel_trunc(0, 255, 0.0), 0);
    assert_eq!(lerp_channel_trunc(0, 255, 0.5), 127);
    assert_eq!(lerp_channel_trunc(255, 0, 0.5), 127);
    assert_eq!(lerp_channel_trunc(10, 20, 1.0), 20);
}

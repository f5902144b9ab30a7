use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn bounds_close(a: Bounds, b: Bounds) -> bool {
    close(a.left, b.left)
        && close(a.top, b.top)
        && close(a.width, b.width)
        && close(a.height, b.height)
}

#[test]
fn wide_frame_is_letterboxed_vertically() {
    let info = fit_frame(1920.0, 800.0, 800.0, 500.0);
    assert_eq!(info.display_width, 800.0);
    assert!(close(info.display_height, 333.333_333));
    assert_eq!(info.display_left, 0.0);
    assert!(close(info.display_top, 83.333_333));
    assert!(close(info.scale, 800.0 / 1920.0));
}

#[test]
fn tall_frame_is_pillarboxed_horizontally() {
    let info = fit_frame(600.0, 900.0, 800.0, 500.0);
    assert_eq!(info.display_height, 500.0);
    assert!(close(info.display_width, 500.0 * 600.0 / 900.0));
    assert!(close(info.display_left, (800.0 - info.display_width) / 2.0));
    assert_eq!(info.display_top, 0.0);
}

#[test]
fn fit_preserves_aspect_and_stays_inside_canvas() {
    for &(ow, oh) in &[(1920.0, 1080.0), (1080.0, 1920.0), (640.0, 640.0), (4096.0, 1716.0)] {
        let info = fit_frame(ow, oh, 800.0, 500.0);
        assert!(info.display_width <= 800.0 + 1e-9);
        assert!(info.display_height <= 500.0 + 1e-9);
        assert!(close(info.display_width, 800.0) || close(info.display_height, 500.0));
        assert!(close(info.display_width / info.display_height, ow / oh));
    }
}

#[test]
fn degenerate_input_falls_back_to_unit_rect() {
    let info = fit_frame(0.0, 800.0, 800.0, 500.0);
    assert!(info.is_degenerate());
    let r = Bounds::new(10.0, 10.0, 50.0, 50.0);
    assert_eq!(canvas_to_original(r, &info), Bounds::UNIT);
    assert_eq!(original_to_canvas(r, &info), Bounds::UNIT);
    assert_eq!(canvas_to_normalized(r, Bounds::new(0.0, 0.0, 0.0, 10.0)), Bounds::UNIT);
    assert_eq!(normalized_to_canvas(r, Bounds::new(0.0, 0.0, 10.0, 0.0)), Bounds::UNIT);
}

#[test]
fn canvas_to_original_maps_display_rect_to_full_frame() {
    let info = fit_frame(1920.0, 800.0, 800.0, 500.0);
    let full = canvas_to_original(info.display_bounds(), &info);
    assert!(bounds_close(full, Bounds::new(0.0, 0.0, 1920.0, 800.0)));
}

#[test]
fn original_roundtrip_then_normalize_recovers_crop() {
    let info = fit_frame(1920.0, 800.0, 800.0, 500.0);
    let overlay = Bounds::new(120.0, 90.0, 133.333, 200.0);

    let original = canvas_to_original(overlay, &info);
    let back = original_to_canvas(original, &info);
    assert!(bounds_close(back, overlay));

    let reference = info.display_bounds();
    let direct = canvas_to_normalized(overlay, reference);
    let via_original = canvas_to_normalized(back, reference);
    assert!(bounds_close(direct, via_original));
    assert!(bounds_close(normalized_to_canvas(direct, reference), overlay));
}

#[test]
fn normalize_point_against_reference() {
    let reference = Bounds::new(0.0, 0.0, 400.0, 600.0);
    assert_eq!(normalize_point(50.0, 300.0, reference), (0.125, 0.5));
    assert_eq!(normalize_point(5.0, 5.0, Bounds::default()), (0.0, 0.0));
}

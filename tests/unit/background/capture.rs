use super::*;
use crate::geometry::transform::fit_frame;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn split_frame(w: u32, h: u32) -> Raster {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for _y in 0..h {
        for x in 0..w {
            data.extend_from_slice(if x < w / 2 { &RED } else { &BLUE });
        }
    }
    Raster::new(w, h, data).unwrap()
}

#[test]
fn captures_overlay_region_at_output_size() {
    let frame = split_frame(20, 10);
    let info = fit_frame(20.0, 10.0, 40.0, 20.0);
    let svc = BackgroundCaptureService::new(Canvas::new(4, 6));

    let out = svc
        .try_capture(&frame, &info, Bounds::new(0.0, 0.0, 20.0, 20.0), 0.0)
        .unwrap();
    assert_eq!((out.width, out.height), (4, 6));
    assert!(out.rgba8.chunks_exact(4).all(|px| px == RED));

    let out = svc
        .try_capture(&frame, &info, Bounds::new(20.0, 0.0, 20.0, 20.0), 0.0)
        .unwrap();
    assert!(out.rgba8.chunks_exact(4).all(|px| px == BLUE));
}

#[test]
fn rescales_crop_when_frame_is_a_downscaled_preview() {
    let preview = split_frame(10, 5);
    let info = fit_frame(20.0, 10.0, 40.0, 20.0);
    let svc = BackgroundCaptureService::new(Canvas::new(2, 3));
    let out = svc
        .try_capture(&preview, &info, Bounds::new(20.0, 0.0, 20.0, 20.0), 0.0)
        .unwrap();
    assert!(out.rgba8.chunks_exact(4).all(|px| px == BLUE));
}

#[test]
fn blur_keeps_flat_region_flat() {
    let frame = split_frame(20, 10);
    let info = fit_frame(20.0, 10.0, 40.0, 20.0);
    let svc = BackgroundCaptureService::new(Canvas::new(4, 6));
    let out = svc
        .try_capture(&frame, &info, Bounds::new(0.0, 0.0, 20.0, 20.0), 6.0)
        .unwrap();
    assert!(out.rgba8.chunks_exact(4).all(|px| px == RED));
}

#[test]
fn missing_inputs_yield_none() {
    let frame = split_frame(20, 10);
    let info = fit_frame(20.0, 10.0, 40.0, 20.0);
    let svc = BackgroundCaptureService::new(Canvas::new(4, 6));
    let overlay = Bounds::new(0.0, 0.0, 20.0, 20.0);

    assert!(svc.capture(None, Some(&info), Some(overlay), 0.0).is_none());
    assert!(svc.capture(Some(&frame), None, Some(overlay), 0.0).is_none());
    assert!(svc.capture(Some(&frame), Some(&info), None, 0.0).is_none());
    assert!(svc.capture(Some(&frame), Some(&info), Some(overlay), 0.0).is_some());
}

#[test]
fn pixel_window_clamps_to_frame() {
    assert_eq!(
        pixel_window(Bounds::new(-5.0, 2.0, 10.0, 100.0), 20, 10),
        Some((0, 2, 5, 8))
    );
    assert_eq!(pixel_window(Bounds::new(30.0, 0.0, 5.0, 5.0), 20, 10), None);
}

#[test]
fn enormous_blur_still_captures() {
    let frame = split_frame(20, 10);
    let info = fit_frame(20.0, 10.0, 40.0, 20.0);
    let svc = BackgroundCaptureService::new(Canvas::new(4, 6));
    let out = svc
        .try_capture(&frame, &info, Bounds::new(10.0, 0.0, 20.0, 20.0), 1e10)
        .unwrap();
    assert_eq!((out.width, out.height), (4, 6));
    assert!(out.rgba8.chunks_exact(4).all(|px| px[3] == 255));
}

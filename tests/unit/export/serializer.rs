use super::*;
use crate::{
    background::{color::Color, fill::BackgroundMode},
    foundation::core::{Canvas, Point},
    scene::model::HorizontalAlign,
    text::measure::FixedAdvanceMeasurer,
};

const REF: Bounds = Bounds::new(0.0, 0.0, 400.0, 600.0);

fn approx(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

fn text(content: &str, align: HorizontalAlign) -> TextElement {
    let mut t = TextElement::new(content, 60.0, 120.0, 300.0);
    t.style.font_size = 20.0;
    t.style.align = align;
    t
}

#[test]
fn right_aligned_text_exports_visible_left_edge() {
    // 18 chars × 0.5em × 20px = 180px.
    let el = text("Eighteen chars abc", HorizontalAlign::Right);
    let out = export_text(&el, REF, &mut FixedAdvanceMeasurer::default()).unwrap();
    approx(out.left, (60.0 + 300.0 - 180.0) / 400.0);
    approx(out.width, 180.0 / 400.0);
    approx(out.top, 120.0 / 600.0);
    approx(out.height, 20.0 * 1.2 / 600.0);
    assert_eq!(out.content, "Eighteen chars abc");
    assert_eq!(out.text_align, HorizontalAlign::Right);
}

#[test]
fn alignment_shifts_by_half_or_nothing() {
    let mut m = FixedAdvanceMeasurer::default();
    let left =
        export_text(&text("Eighteen chars abc", HorizontalAlign::Left), REF, &mut m).unwrap();
    let center =
        export_text(&text("Eighteen chars abc", HorizontalAlign::Center), REF, &mut m).unwrap();
    approx(left.left, 60.0 / 400.0);
    approx(center.left, (60.0 + 60.0) / 400.0);
}

#[test]
fn wrapped_text_is_exported_line_by_line() {
    let mut el = text("aaaa bbbb cccc", HorizontalAlign::Left);
    // 4 chars → 40px; "aaaa bbbb" = 90px > 80.
    el.wrap_width = 80.0;
    let out = export_text(&el, REF, &mut FixedAdvanceMeasurer::default()).unwrap();
    assert_eq!(out.content, "aaaa\nbbbb\ncccc");
    approx(out.height, 3.0 * 20.0 * 1.2 / 600.0);
    approx(out.width, 40.0 / 400.0);
}

#[test]
fn scale_enters_extents_but_rotation_is_separate() {
    let mut el = text("abcd", HorizontalAlign::Left);
    el.transform.scale = kurbo::Vec2::new(-2.0, 1.5);
    el.transform.rotation_deg = 30.0;
    let out = export_text(&el, REF, &mut FixedAdvanceMeasurer::default()).unwrap();
    approx(out.width, 80.0 / 400.0);
    approx(out.height, 20.0 * 1.2 * 1.5 / 600.0);
    approx(out.angle, 30.0);
    approx(out.scale_x, -2.0);
    approx(out.font_size, 20.0);
}

#[test]
fn vertical_line_normalizes_against_reference() {
    let line = LineElement::new(Point::new(0.0, 0.0), Point::new(0.0, 200.0), 50.0, 50.0);
    let out = export_line(&line, REF);
    approx(out.x1, 50.0 / 400.0);
    approx(out.y1, 50.0 / 600.0);
    approx(out.x2, 50.0 / 400.0);
    approx(out.y2, 250.0 / 600.0);
    approx(out.stroke_width, 2.0 / 400.0);
    assert_eq!(out.stroke, Color::WHITE);
}

#[test]
fn line_against_offset_reference() {
    let line = LineElement::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 300.0, 100.0);
    let overlay = Bounds::new(200.0, 50.0, 200.0, 300.0);
    let out = export_line(&line, overlay);
    approx(out.x1, 0.5);
    approx(out.y1, 50.0 / 300.0);
    approx(out.x2, 1.0);
    approx(out.stroke_width, 2.0 / 200.0);
}

#[test]
fn degenerate_reference_zeroes_stroke() {
    let line = LineElement::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 0.0, 0.0);
    let out = export_line(&line, Bounds::new(0.0, 0.0, 0.0, 10.0));
    assert_eq!(out.stroke_width, 0.0);
    assert_eq!((out.x1, out.y1), (0.0, 0.0));
}

#[test]
fn model_skips_overlay_and_masks() {
    let mut scene = Scene::new(Canvas::new(400, 600));
    scene.add(SceneObject::Overlay {
        bounds: Bounds::new(0.0, 0.0, 100.0, 150.0),
    });
    scene.add(SceneObject::Text(text("hi", HorizontalAlign::Left)));
    scene.add(SceneObject::Line(LineElement::new(
        Point::new(0.0, 0.0),
        Point::new(0.0, 10.0),
        5.0,
        5.0,
    )));
    let bg = ExportBackground {
        settings: BackgroundSettings {
            mode: BackgroundMode::Solid,
            color: Color::rgb(10, 20, 30),
            ..BackgroundSettings::default()
        },
        source: None,
        timestamp: 0.0,
        crop: Bounds::UNIT,
    };
    let model = export_model(
        &scene,
        REF,
        &bg,
        Canvas::new(1000, 1500),
        "my poster",
        &mut FixedAdvanceMeasurer::default(),
    )
    .unwrap();
    assert_eq!(model.text_layers.len(), 1);
    assert_eq!(model.line_elements.len(), 1);
    assert_eq!(model.background_mode, BackgroundMode::Solid);
    assert_eq!(model.background_color, Color::rgb(10, 20, 30));
    assert_eq!((model.canvas_width, model.canvas_height), (400.0, 600.0));
    assert_eq!((model.output_width, model.output_height), (1000, 1500));
    assert_eq!(model.filename, "my poster");
}

#[test]
fn measurer_errors_propagate() {
    let mut el = text("x", HorizontalAlign::Left);
    el.style.font_size = 0.0;
    assert!(export_text(&el, REF, &mut FixedAdvanceMeasurer::default()).is_err());
}

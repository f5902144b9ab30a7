use super::*;
use crate::{
    background::{color::Color, fill::GradientDirection},
    media::provider::{MediaEntry, MediaInfo, SourceRef},
    scene::model::{FontStyle, FontWeight, HorizontalAlign},
};

/// Serves one uniform frame, or fails every fetch.
struct StubProvider {
    frame: Option<Raster>,
    fetches: usize,
}

impl MediaProvider for StubProvider {
    fn list_entries(&self, _path: Option<&str>) -> PosterResult<Vec<MediaEntry>> {
        Ok(Vec::new())
    }

    fn info(&self, _source: &SourceRef) -> PosterResult<MediaInfo> {
        Err(PosterError::fetch("no info"))
    }

    fn frame_uri(&self, _source: &SourceRef, _timestamp: f64, _variant: FrameVariant) -> String {
        String::new()
    }

    fn fetch_frame(
        &mut self,
        _source: &SourceRef,
        _timestamp: f64,
        variant: FrameVariant,
    ) -> PosterResult<Raster> {
        assert_eq!(variant, FrameVariant::Full);
        self.fetches += 1;
        self.frame
            .clone()
            .ok_or_else(|| PosterError::fetch("offline"))
    }

    fn thumbnails(&mut self, _source: &SourceRef, _count: u32) -> PosterResult<Vec<Raster>> {
        Ok(Vec::new())
    }
}

fn rasterizer(frame: Option<Raster>, dir: &Path) -> CpuPosterRasterizer<StubProvider> {
    let fonts = FontLibrary::with_system_dirs(Some(dir.join("no-fonts")), Vec::new());
    CpuPosterRasterizer::new(StubProvider { frame, fetches: 0 }, fonts, dir)
}

fn small_model() -> PosterExportModel {
    PosterExportModel {
        output_width: 40,
        output_height: 60,
        ..PosterExportModel::default()
    }
}

#[test]
fn solid_background_fills_every_pixel() {
    let dir = tempfile::tempdir().unwrap();
    let mut r = rasterizer(None, dir.path());
    let model = PosterExportModel {
        background_mode: BackgroundMode::Solid,
        background_color: Color::rgb(10, 120, 200),
        ..small_model()
    };
    let out = r.rasterize(&model).unwrap();
    assert_eq!((out.width, out.height), (40, 60));
    assert_eq!(out.pixel(0, 0), Some([10, 120, 200, 255]));
    assert_eq!(out.pixel(39, 59), Some([10, 120, 200, 255]));
}

#[test]
fn vertical_gradient_runs_top_to_bottom() {
    let dir = tempfile::tempdir().unwrap();
    let mut r = rasterizer(None, dir.path());
    let model = PosterExportModel {
        background_mode: BackgroundMode::Gradient,
        gradient_colors: [Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)],
        gradient_direction: GradientDirection::Vertical,
        ..small_model()
    };
    let out = r.rasterize(&model).unwrap();
    assert_eq!(out.pixel(5, 0), Some([0, 0, 0, 255]));
    let bottom = out.pixel(5, 59).unwrap();
    assert!(bottom[0] > 240, "{bottom:?}");
}

#[test]
fn lines_are_at_least_one_pixel_wide() {
    let dir = tempfile::tempdir().unwrap();
    let mut r = rasterizer(None, dir.path());
    let model = PosterExportModel {
        background_mode: BackgroundMode::Solid,
        background_color: Color::BLACK,
        line_elements: vec![LineElementExport {
            x1: 0.5,
            y1: 0.1,
            x2: 0.5,
            y2: 0.9,
            stroke: Color::WHITE,
            stroke_width: 0.1,
        }],
        ..small_model()
    };
    let out = r.rasterize(&model).unwrap();
    // 0.1 × 40 = 4px wide, centered on x = 20.
    assert_eq!(out.pixel(20, 30), Some([255, 255, 255, 255]));
    assert_eq!(out.pixel(18, 30), Some([255, 255, 255, 255]));
    assert_eq!(out.pixel(5, 30), Some([0, 0, 0, 255]));
    assert_eq!(out.pixel(20, 2), Some([0, 0, 0, 255]));
}

#[test]
fn image_background_crops_fetched_frame() {
    let dir = tempfile::tempdir().unwrap();
    let frame = Raster::filled(64, 32, [30, 60, 90, 255]).unwrap();
    let mut r = rasterizer(Some(frame), dir.path());
    let model = PosterExportModel {
        source_ref: Some(SourceRef::new("/videos", "a.mp4")),
        crop_rect: Bounds::new(0.25, 0.0, 0.5, 1.0),
        ..small_model()
    };
    let out = r.rasterize(&model).unwrap();
    assert_eq!(out.pixel(20, 30), Some([30, 60, 90, 255]));
    assert_eq!(r.provider.fetches, 1);
}

#[test]
fn failed_fetch_leaves_black_background() {
    let dir = tempfile::tempdir().unwrap();
    let mut r = rasterizer(None, dir.path());
    let model = PosterExportModel {
        source_ref: Some(SourceRef::new("/videos", "a.mp4")),
        ..small_model()
    };
    let out = r.rasterize(&model).unwrap();
    assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 255]));
}

#[test]
fn missing_font_skips_the_layer_but_keeps_the_poster() {
    let dir = tempfile::tempdir().unwrap();
    let mut r = rasterizer(None, dir.path());
    let model = PosterExportModel {
        background_mode: BackgroundMode::Solid,
        background_color: Color::rgb(70, 20, 110),
        text_layers: vec![TextLayerExport {
            content: "Title".to_owned(),
            left: 0.1,
            top: 0.1,
            width: 0.5,
            height: 0.1,
            font_family: "Nope".to_owned(),
            font_size: 32.0,
            fill: Color::WHITE,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            underline: false,
            text_align: HorizontalAlign::Center,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }],
        ..small_model()
    };
    let out = r.rasterize(&model).unwrap();
    assert!(out.rgba8.chunks_exact(4).all(|px| px == [70, 20, 110, 255]));
    let saved = r.render(&model).unwrap();
    assert!(saved.path.exists());
}

#[test]
fn filenames_are_sanitized() {
    assert_eq!(sanitize_filename("My Poster!.png"), "MyPosterpng");
    assert_eq!(sanitize_filename("a_b-c"), "a_b-c");
    assert_eq!(sanitize_filename("../../"), "poster");
    assert_eq!(sanitize_filename(""), "poster");
}

#[test]
fn render_saves_with_collision_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let mut r = rasterizer(None, dir.path());
    let model = PosterExportModel {
        background_mode: BackgroundMode::Solid,
        filename: "night shot".to_owned(),
        ..small_model()
    };
    let first = r.render(&model).unwrap();
    let second = r.render(&model).unwrap();
    let third = r.render(&model).unwrap();
    assert_eq!(first.filename, "nightshot.png");
    assert_eq!(second.filename, "nightshot_1.png");
    assert_eq!(third.filename, "nightshot_2.png");

    let img = image::open(&first.path).unwrap();
    assert_eq!((img.width(), img.height()), (40, 60));
    assert!(matches!(img, image::DynamicImage::ImageRgb8(_)));
}

//! Export Integration Tests
//!
//! Runs an editor session on the resvg backend and checks the framed PNG:
//! - Output dimensions follow content, padding and multiplier
//! - Exports are deterministic
//! - Uploads decode and land on the canvas

use std::sync::Arc;

use snapstyle_core::{Color, EditorConfig, EditorSession, Paint, RasterImage, SceneObject};
use snapstyle_renderer::{
    decode_uploads, encode_png, export_png, load_image_from_bytes, FrameExporter,
    SvgRasterBackend,
};

fn session(multiplier: f64) -> EditorSession {
    let config = EditorConfig {
        export_multiplier: multiplier,
        ..EditorConfig::default()
    };
    let backend = SvgRasterBackend::with_fontdb(Arc::new(usvg::fontdb::Database::new()));
    EditorSession::with_backend(config, Box::new(backend))
}

fn decode(png: &[u8]) -> RasterImage {
    load_image_from_bytes(png).expect("exported PNG decodes")
}

// ============================================================================
// Dimension Tests
// ============================================================================

#[test]
fn test_export_dimensions_follow_content_and_padding() {
    let mut session = session(1.0);
    session
        .add_image(RasterImage::transparent(2000, 1000))
        .expect("upload");
    assert_eq!(session.content_size(), (1000, 500));

    let pad = session.frame().padding;
    let exported = export_png(&session).expect("export");
    let expected = (1000.0 + 2.0 * pad, 500.0 + 2.0 * pad);
    assert_eq!(
        (f64::from(exported.width), f64::from(exported.height)),
        expected
    );
    assert_eq!(&exported.png[0..4], &[137, 80, 78, 71]);
    assert_eq!(exported.filename, "snapstyle-export.png");

    let image = decode(&exported.png);
    assert_eq!((image.width(), image.height()), (exported.width, exported.height));
}

#[test]
fn test_multiplier_scales_output() {
    let mut session = session(2.0);
    session.resize_canvas(100, 50).expect("resize");
    let exported = FrameExporter::new(2.0, "x.png").export(&session).expect("export");
    let pad = session.frame().padding;
    assert_eq!(f64::from(exported.width), (100.0 + 2.0 * pad) * 2.0);
    assert_eq!(f64::from(exported.height), (50.0 + 2.0 * pad) * 2.0);
}

// ============================================================================
// Content Tests
// ============================================================================

#[test]
fn test_export_is_deterministic() {
    let mut session = session(1.0);
    session.resize_canvas(120, 80).expect("resize");
    let rect = SceneObject::rectangle(40.0, 30.0)
        .with_position(10.0, 10.0)
        .with_paint(
            Paint::Solid(Color::rgba(51, 102, 255, 0.5)),
            Paint::Solid(Color::BLACK),
            2.0,
        );
    session.add_object(rect);
    session.add_object(SceneObject::ellipse(15.0).with_position(70.0, 30.0));

    let first = export_png(&session).expect("first");
    let second = export_png(&session).expect("second");
    assert_eq!(decode(&first.png).data(), decode(&second.png).data());
}

#[test]
fn test_content_lands_inside_padding() {
    let mut session = session(1.0);
    session.resize_canvas(20, 20).expect("resize");
    session.add_object(
        SceneObject::rectangle(20.0, 20.0)
            .with_paint(Paint::Solid(Color::rgb(0, 255, 0)), Paint::None, 0.0),
    );
    let mut frame = session.frame().clone();
    frame.set_solid(Paint::Solid(Color::rgb(255, 0, 0)));
    frame.padding = 10.0;
    frame.border_radius = 0.0;
    session.set_frame(frame).expect("frame");

    let image = decode(&export_png(&session).expect("export").png);
    assert_eq!(image.pixel(2, 2), Some([255, 0, 0, 255]));
    assert_eq!(image.pixel(20, 20), Some([0, 255, 0, 255]));
}

#[test]
fn test_transparent_frame_keeps_empty_corners() {
    let mut session = session(1.0);
    session.resize_canvas(10, 10).expect("resize");
    let mut frame = session.frame().clone();
    frame.background_color = Paint::None;
    session.set_frame(frame).expect("frame");

    let image = decode(&export_png(&session).expect("export").png);
    assert_eq!(image.pixel(0, 0).map(|p| p[3]), Some(0));
}

// ============================================================================
// Upload Tests
// ============================================================================

#[test]
fn test_uploads_skip_bad_files_and_reach_scene() {
    let png = encode_png(&RasterImage::transparent(300, 200)).expect("encode");
    let files: [&[u8]; 2] = [b"not an image", png.as_slice()];
    let images = decode_uploads(files);
    assert_eq!(images.len(), 1);

    let mut session = session(1.0);
    let ids = session.add_images(images).expect("upload");
    assert_eq!(ids.len(), 1);
    assert_eq!(session.content_size(), (300, 200));
}

//! Loading a base image into a session, including the decode-failure policy.

use casecanvas::io::{encode_png, png_data_url};
use casecanvas::{BaseImage, CanvasError, EditorConfig, EditorSession, Point};
use image::{DynamicImage, Rgba, RgbaImage};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

fn wide_blue_png() -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(400, 200, BLUE)).unwrap()
}

#[test]
fn test_wide_image_fits_tall_surface_centred() {
    let mut session = EditorSession::new(EditorConfig::default()).unwrap();
    let fit = session
        .load_base_image(BaseImage::Bytes(&wide_blue_png()))
        .unwrap();

    assert_eq!((fit.width, fit.height), (750, 375));
    assert_eq!(fit.x, 0);
    let top_margin = fit.y as u32;
    let bottom_margin = 1590 - (top_margin + fit.height);
    assert!(top_margin.abs_diff(bottom_margin) <= 1);

    let img = session.export_image();
    assert_eq!(*img.get_pixel(375, 0), WHITE);
    assert_eq!(*img.get_pixel(375, top_margin - 1), WHITE);
    assert_eq!(*img.get_pixel(375, 795), BLUE);
    assert_eq!(*img.get_pixel(0, 795), BLUE);
    assert_eq!(*img.get_pixel(749, 795), BLUE);
    assert_eq!(*img.get_pixel(375, 1589), WHITE);

    // The loaded image is the initial snapshot
    assert_eq!(session.history().len(), 1);
    assert!(!session.can_undo());
}

#[test]
fn test_base_image_from_data_url() {
    let url = png_data_url(&wide_blue_png());
    let session = EditorSession::with_base_image(EditorConfig::default(), BaseImage::DataUrl(&url)).unwrap();
    assert_eq!(*session.export_image().get_pixel(375, 795), BLUE);
}

#[test]
fn test_undo_after_load_returns_to_base_image() {
    let config = EditorConfig {
        width: 100,
        height: 200,
        display_width: 100.0,
        display_height: 200.0,
        ..EditorConfig::default()
    };
    let mut session = EditorSession::new(config).unwrap();
    session
        .load_base_image(BaseImage::Image(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            10, 10, BLUE,
        ))))
        .unwrap();
    let base = session.export_image();

    session.set_zoom(1.0);
    session.pointer_down(Point::new(50.0, 100.0));
    session.pointer_move(Point::new(50.0, 150.0));
    session.pointer_up();
    assert_ne!(session.export_image(), base);

    session.undo();
    assert_eq!(session.export_image(), base);
}

#[test]
fn test_undecodable_base_image_leaves_blank_usable_session() {
    let mut session = EditorSession::new(EditorConfig::default()).unwrap();
    session
        .load_base_image(BaseImage::Bytes(&wide_blue_png()))
        .unwrap();

    let result = session.load_base_image(BaseImage::Bytes(b"\x89PNG but not really"));
    assert!(matches!(result, Err(CanvasError::Decode(_))));

    let img = session.export_image();
    assert!(img.pixels().all(|p| *p == WHITE));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.undo(), None);

    // Still drawable
    session.set_zoom(1.0);
    session.set_viewport(casecanvas::Viewport::new(750.0, 1590.0));
    assert!(session.pointer_down(Point::new(10.0, 10.0)));
    assert!(session.pointer_up());
    assert_eq!(session.history().len(), 2);
}

#[test]
fn test_malformed_data_url_is_reported() {
    let mut session = EditorSession::new(EditorConfig::default()).unwrap();
    let result = session.load_base_image(BaseImage::DataUrl("data:image/png;base64,!!!"));
    assert!(matches!(result, Err(CanvasError::InvalidDataUrl(_))));
    assert!(session.export_image().pixels().all(|p| *p == WHITE));
}

#[test]
fn test_with_base_image_propagates_decode_error() {
    let result = EditorSession::with_base_image(EditorConfig::default(), BaseImage::Bytes(&[0, 1, 2, 3]));
    assert!(matches!(result, Err(CanvasError::Decode(_))));
}

#[test]
fn test_download_writes_png_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(casecanvas::io::DEFAULT_EXPORT_FILE_NAME);
    let session = EditorSession::new(EditorConfig::default()).unwrap();
    session.save_png(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), session.export_png().unwrap());
}

use image::GenericImageView;
use sketchboard::canvas::{Canvas, CanvasError};
use sketchboard::mode::Mode;
use sketchboard::orchestrator::{ActionError, ActionInput};
use sketchboard::payload::{CaptureError, ImageSource, capture_image, select_source};
use std::fs;
use std::path::Path;

use test_utils::{RecordingModel, orchestrator_with, sketched_canvas, temp_dir, write_test_png};

#[test]
fn test_canvas_pixels_survive_encoding() {
    let dir = temp_dir();
    let canvas = sketched_canvas();

    let payload =
        capture_image(ImageSource::Canvas(&canvas), dir.path()).expect("canvas should encode");
    let decoded = payload.decode_image().expect("payload should decode").to_rgba8();

    assert_eq!(decoded.dimensions(), (400, 300));
    assert_eq!(decoded.get_pixel(100, 100).0, [0, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(5, 5).0, [255, 255, 255, 255]);
    assert_eq!(decoded.get_pixel(300, 250).0, [255, 255, 255, 255]);

    let rendered = canvas.to_png().expect("canvas should render");
    assert_eq!(payload.decode_bytes().expect("valid base64"), rendered);
}

#[test]
fn test_uploaded_png_is_lossless() {
    let dir = temp_dir();
    let path = dir.path().join("drawing.png");
    let original = write_test_png(&path);

    let payload = capture_image(ImageSource::Upload(&path), dir.path()).expect("upload should encode");
    let decoded = payload.decode_image().expect("payload should decode");

    assert_eq!(decoded.dimensions(), original.dimensions());
    assert_eq!(decoded.to_rgb8().as_raw(), original.as_raw());
    assert!(payload.data_url().starts_with("data:image/png;base64,"));
}

#[test]
fn test_jpeg_upload_is_sent_as_png() {
    let dir = temp_dir();
    let path = dir.path().join("formula.jpg");
    image::RgbImage::from_pixel(20, 10, image::Rgb([250, 250, 250]))
        .save(&path)
        .expect("Failed to write test JPEG");

    let payload = capture_image(ImageSource::Upload(&path), dir.path()).expect("jpeg should encode");
    let decoded = payload.decode_image().expect("payload should decode as PNG");
    assert_eq!(decoded.dimensions(), (20, 10));
}

#[test]
fn test_transient_file_is_removed() {
    let dir = temp_dir();
    let scratch = dir.path().join("scratch");
    let canvas = sketched_canvas();

    capture_image(ImageSource::Canvas(&canvas), &scratch).expect("canvas should encode");

    let leftovers = fs::read_dir(&scratch).expect("scratch dir exists").count();
    assert_eq!(leftovers, 0);
}

#[test]
fn test_upload_wins_over_canvas() {
    let canvas = sketched_canvas();
    let upload = Path::new("photo.png");

    assert!(matches!(
        select_source(&canvas, Some(upload)),
        Some(ImageSource::Upload(p)) if p == upload
    ));
    assert!(matches!(
        select_source(&canvas, None),
        Some(ImageSource::Canvas(_))
    ));
    assert!(select_source(&Canvas::default(), None).is_none());
}

#[test]
fn test_unsupported_upload_is_rejected() {
    let dir = temp_dir();
    let path = dir.path().join("drawing.gif");
    fs::write(&path, b"GIF89a").expect("Failed to write file");

    let result = capture_image(ImageSource::Upload(&path), dir.path());
    assert!(matches!(result, Err(CaptureError::UnsupportedFormat(_))));
}

#[test]
fn test_corrupt_upload_is_a_decode_error() {
    let dir = temp_dir();
    let path = dir.path().join("broken.png");
    fs::write(&path, b"definitely not a png").expect("Failed to write file");

    let result = capture_image(ImageSource::Upload(&path), dir.path());
    assert!(matches!(result, Err(CaptureError::Decode(_))));
}

#[tokio::test]
async fn test_bad_upload_makes_no_remote_call() {
    let dir = temp_dir();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "x + 1 = 3").expect("Failed to write file");
    let mut orchestrator = orchestrator_with(RecordingModel::default(), &dir);

    let input = ActionInput {
        image: Some(ImageSource::Upload(&path)),
        ..ActionInput::default()
    };
    let result = orchestrator.run_mode(Mode::FormulaSolving, input).await;

    assert!(matches!(result, Err(ActionError::Capture(_))));
    assert_eq!(orchestrator.model().call_count(), 0);
}

#[test]
fn test_sketch_file_loading() {
    let dir = temp_dir();
    let path = dir.path().join("sketch.json");
    fs::write(
        &path,
        r##"{
            "width": 200,
            "height": 100,
            "stroke_width": 8,
            "stroke_color": "#FF0000",
            "strokes": [[[10, 10], [190, 90]], [[50, 50]]]
        }"##,
    )
    .expect("Failed to write sketch");

    let canvas = Canvas::load(&path).expect("sketch should load");
    assert_eq!((canvas.width(), canvas.height()), (200, 100));
    assert_eq!(canvas.strokes().len(), 2);
    assert_eq!(canvas.pen_width(), 8);

    let pixmap = canvas.render().expect("sketch should render");
    let pixel = pixmap.pixel(100, 50).expect("pixel in bounds");
    assert_eq!((pixel.red(), pixel.green(), pixel.blue()), (255, 0, 0));
}

#[test]
fn test_sketch_file_with_bad_colour() {
    let dir = temp_dir();
    let path = dir.path().join("sketch.json");
    fs::write(&path, r##"{"stroke_color": "red", "strokes": []}"##).expect("Failed to write sketch");

    assert!(matches!(
        Canvas::load(&path),
        Err(CanvasError::InvalidColor(_))
    ));
}

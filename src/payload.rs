//! Image capture and base64 payloads
//!
//! Whatever the source, the image is normalised to PNG, written to a transient
//! file in the scratch directory, read back and base64 encoded for upload.

use crate::canvas::{Canvas, CanvasError};
use crate::log_debug;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use image::ImageFormat;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

/// Extensions accepted for uploads
pub const UPLOAD_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("No image to send: draw on the canvas or upload a PNG/JPEG file")]
    NoSource,

    #[error("Unsupported upload '{0}': only PNG and JPEG files are accepted")]
    UnsupportedFormat(String),

    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error("Could not write transient image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Where the image for the next request comes from
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    Canvas(&'a Canvas),
    Upload(&'a Path),
}

/// Base64-encoded PNG ready to embed in a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    encoded: String,
}

impl ImagePayload {
    pub fn from_png_bytes(bytes: &[u8]) -> Self {
        Self {
            encoded: BASE64_STANDARD.encode(bytes),
        }
    }

    pub fn as_base64(&self) -> &str {
        &self.encoded
    }

    pub const fn mime_type(&self) -> &'static str {
        "image/png"
    }

    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }

    /// `data:` URL accepted by the chat endpoint's `image_url` part
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.encoded)
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>, CaptureError> {
        Ok(BASE64_STANDARD.decode(&self.encoded)?)
    }

    /// Decode back to pixels
    pub fn decode_image(&self) -> Result<image::DynamicImage, CaptureError> {
        let bytes = self.decode_bytes()?;
        Ok(image::load_from_memory_with_format(&bytes, ImageFormat::Png)?)
    }
}

/// Reject anything that is not a PNG or JPEG by extension
pub fn check_upload_extension(path: &Path) -> Result<(), CaptureError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if UPLOAD_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(CaptureError::UnsupportedFormat(path.display().to_string()))
    }
}

/// Pick the source for a request: an upload wins over canvas strokes.
pub fn select_source<'a>(canvas: &'a Canvas, upload: Option<&'a Path>) -> Option<ImageSource<'a>> {
    match upload {
        Some(path) => Some(ImageSource::Upload(path)),
        None if !canvas.is_blank() => Some(ImageSource::Canvas(canvas)),
        None => None,
    }
}

fn source_png(source: ImageSource<'_>) -> Result<Vec<u8>, CaptureError> {
    match source {
        ImageSource::Canvas(canvas) => {
            if canvas.is_blank() {
                return Err(CaptureError::NoSource);
            }
            Ok(canvas.to_png()?)
        }
        ImageSource::Upload(path) => {
            if !path.is_file() {
                return Err(CaptureError::NoSource);
            }
            check_upload_extension(path)?;
            let image = image::open(path)?;
            let mut bytes = Vec::new();
            image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
            Ok(bytes)
        }
    }
}

/// Capture the image, round-trip it through a transient PNG file and encode it.
pub fn capture_image(
    source: ImageSource<'_>,
    scratch_dir: &Path,
) -> Result<ImagePayload, CaptureError> {
    let png = source_png(source)?;

    fs::create_dir_all(scratch_dir)?;
    let mut transient = tempfile::Builder::new()
        .prefix("sketchboard-")
        .suffix(".png")
        .tempfile_in(scratch_dir)?;
    transient.write_all(&png)?;
    transient.flush()?;
    log_debug!(
        "Wrote {} byte transient image to {}",
        png.len(),
        transient.path().display()
    );

    let bytes = fs::read(transient.path())?;
    Ok(ImagePayload::from_png_bytes(&bytes))
}

/// Default scratch directory for transient images
pub fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("sketchboard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_prefix() {
        let payload = ImagePayload::from_png_bytes(b"abc");
        assert_eq!(payload.data_url(), "data:image/png;base64,YWJj");
        assert_eq!(payload.decode_bytes().ok(), Some(b"abc".to_vec()));
    }

    #[test]
    fn test_upload_extension_filter() {
        assert!(check_upload_extension(Path::new("formula.PNG")).is_ok());
        assert!(check_upload_extension(Path::new("photo.jpeg")).is_ok());
        assert!(check_upload_extension(Path::new("scan.gif")).is_err());
        assert!(check_upload_extension(Path::new("noext")).is_err());
    }

    #[test]
    fn test_select_source_prefers_upload() {
        let mut canvas = Canvas::default();
        assert!(select_source(&canvas, None).is_none());

        canvas.add_stroke(vec![(1.0, 1.0), (5.0, 5.0)]);
        assert!(matches!(
            select_source(&canvas, None),
            Some(ImageSource::Canvas(_))
        ));
        assert!(matches!(
            select_source(&canvas, Some(Path::new("x.png"))),
            Some(ImageSource::Upload(_))
        ));
    }
}

//! Freehand drawing canvas
//!
//! Strokes are kept as point lists and rasterized on demand with tiny-skia, so the
//! line width and colour can change between strokes without redrawing by hand.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tiny_skia::{Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 300;
pub const DEFAULT_STROKE_WIDTH: u32 = 5;
pub const MIN_STROKE_WIDTH: u32 = 1;
pub const MAX_STROKE_WIDTH: u32 = 30;
pub const DEFAULT_STROKE_COLOR: &str = "#000000";
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("Invalid colour '{0}', expected #RRGGBB")]
    InvalidColor(String),

    #[error("Invalid canvas dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Failed to encode canvas as PNG: {0}")]
    Encode(String),

    #[error("Failed to read sketch file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid sketch file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An RGB colour parsed from `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn parse(hex: &str) -> Result<Self, CanvasError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CanvasError::InvalidColor(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| CanvasError::InvalidColor(hex.to_string()))
        };
        Ok(Self(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    fn to_skia(self) -> Color {
        Color::from_rgba8(self.0, self.1, self.2, 255)
    }
}

/// One continuous pen movement
#[derive(Debug, Clone, PartialEq)]
pub struct PenStroke {
    pub points: Vec<(f32, f32)>,
    pub width: u32,
    pub color: Rgb,
}

/// Serialized sketch, as read from `--sketch` files and the board's `load` command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SketchFile {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub stroke_width: Option<u32>,
    #[serde(default)]
    pub stroke_color: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub strokes: Vec<Vec<[f32; 2]>>,
}

/// Freehand canvas with a current pen
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    background: Rgb,
    pen_width: u32,
    pen_color: Rgb,
    strokes: Vec<PenStroke>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: Rgb(255, 255, 255),
            pen_width: DEFAULT_STROKE_WIDTH,
            pen_color: Rgb(0, 0, 0),
            strokes: Vec::new(),
        }
    }
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            ..Self::default()
        })
    }

    /// Build a canvas from a parsed sketch file, filling gaps with defaults
    pub fn from_sketch(sketch: &SketchFile) -> Result<Self, CanvasError> {
        let mut canvas = Self::new(
            sketch.width.unwrap_or(DEFAULT_WIDTH),
            sketch.height.unwrap_or(DEFAULT_HEIGHT),
        )?;
        if let Some(bg) = &sketch.background {
            canvas.set_background(bg)?;
        }
        if let Some(color) = &sketch.stroke_color {
            canvas.set_pen_color(color)?;
        }
        if let Some(width) = sketch.stroke_width {
            canvas.set_pen_width(width);
        }
        for points in &sketch.strokes {
            canvas.add_stroke(points.iter().map(|[x, y]| (*x, *y)).collect());
        }
        Ok(canvas)
    }

    pub fn load(path: &Path) -> Result<Self, CanvasError> {
        let content = fs::read_to_string(path)?;
        let sketch: SketchFile = serde_json::from_str(&content)?;
        Self::from_sketch(&sketch)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pen_width(&self) -> u32 {
        self.pen_width
    }

    /// Set the pen width, clamped to the supported range
    pub fn set_pen_width(&mut self, width: u32) {
        self.pen_width = width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH);
    }

    pub fn set_pen_color(&mut self, hex: &str) -> Result<(), CanvasError> {
        self.pen_color = Rgb::parse(hex)?;
        Ok(())
    }

    pub fn set_background(&mut self, hex: &str) -> Result<(), CanvasError> {
        self.background = Rgb::parse(hex)?;
        Ok(())
    }

    /// Record a stroke with the current pen. Empty point lists are ignored.
    pub fn add_stroke(&mut self, points: Vec<(f32, f32)>) {
        if points.is_empty() {
            return;
        }
        self.strokes.push(PenStroke {
            points,
            width: self.pen_width,
            color: self.pen_color,
        });
    }

    pub fn strokes(&self) -> &[PenStroke] {
        &self.strokes
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// A canvas without strokes counts as "no input"
    pub fn is_blank(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Rasterize background and strokes
    pub fn render(&self) -> Result<Pixmap, CanvasError> {
        let mut pixmap = Pixmap::new(self.width, self.height).ok_or(
            CanvasError::InvalidDimensions {
                width: self.width,
                height: self.height,
            },
        )?;
        pixmap.fill(self.background.to_skia());

        for stroke in &self.strokes {
            let mut paint = Paint::default();
            paint.set_color(stroke.color.to_skia());
            paint.anti_alias = true;

            #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
            let width = stroke.width as f32;

            if let [(x, y)] = stroke.points.as_slice() {
                // A single tap leaves a round dot
                if let Some(dot) = PathBuilder::from_circle(*x, *y, width / 2.0) {
                    pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
                }
                continue;
            }

            let mut pb = PathBuilder::new();
            let mut points = stroke.points.iter();
            if let Some((x, y)) = points.next() {
                pb.move_to(*x, *y);
            }
            for (x, y) in points {
                pb.line_to(*x, *y);
            }
            let Some(path) = pb.finish() else {
                continue;
            };

            let pen = Stroke {
                width,
                line_cap: LineCap::Round,
                line_join: LineJoin::Round,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint, &pen, Transform::identity(), None);
        }

        Ok(pixmap)
    }

    /// Render and encode as PNG bytes
    pub fn to_png(&self) -> Result<Vec<u8>, CanvasError> {
        self.render()?
            .encode_png()
            .map_err(|e| CanvasError::Encode(e.to_string()))
    }
}

/// Parse `x,y x,y ...` into a point list
pub fn parse_points(input: &str) -> Result<Vec<(f32, f32)>, String> {
    input
        .split_whitespace()
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| format!("Expected x,y but got '{pair}'"))?;
            let x: f32 = x.trim().parse().map_err(|_| format!("Bad x in '{pair}'"))?;
            let y: f32 = y.trim().parse().map_err(|_| format!("Bad y in '{pair}'"))?;
            Ok((x, y))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_parse() {
        assert_eq!(Rgb::parse("#FF8000").ok(), Some(Rgb(255, 128, 0)));
        assert_eq!(Rgb::parse("00ff00").ok(), Some(Rgb(0, 255, 0)));
        assert!(Rgb::parse("#12345").is_err());
        assert!(Rgb::parse("#GG0000").is_err());
    }

    #[test]
    fn test_pen_width_is_clamped() {
        let mut canvas = Canvas::default();
        canvas.set_pen_width(0);
        assert_eq!(canvas.pen_width(), MIN_STROKE_WIDTH);
        canvas.set_pen_width(99);
        assert_eq!(canvas.pen_width(), MAX_STROKE_WIDTH);
    }

    #[test]
    fn test_blank_until_stroke() {
        let mut canvas = Canvas::default();
        assert!(canvas.is_blank());
        canvas.add_stroke(Vec::new());
        assert!(canvas.is_blank());
        canvas.add_stroke(vec![(10.0, 10.0), (50.0, 50.0)]);
        assert!(!canvas.is_blank());
        canvas.clear();
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_parse_points() {
        let points = parse_points("1,2 3.5,4").expect("valid points");
        assert_eq!(points, vec![(1.0, 2.0), (3.5, 4.0)]);
        assert!(parse_points("1;2").is_err());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            Canvas::new(0, 10),
            Err(CanvasError::InvalidDimensions { .. })
        ));
    }
}

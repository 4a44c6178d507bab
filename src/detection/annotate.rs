use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::detection::error::DetectionError;
use crate::models::{Anomaly, BoundingBox};

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BANNER_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const STROKE_WIDTH: i32 = 2;
const LABEL_SCALE: f32 = 18.0;
const BANNER_SCALE: f32 = 28.0;

/// Where the annotated copy of `input` goes: `photo.jpg` → `photo_annotated.jpg`.
pub fn annotated_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => input.with_file_name(format!("{stem}_annotated.{ext}")),
        None => input.with_file_name(format!("{stem}_annotated")),
    }
}

/// Draw the detection overlay on a copy of the original image.
///
/// Each anomaly gets a red rectangle with a `#<index>` label above its
/// top-left corner; a green summary banner sits at the top-left of the
/// frame. The input buffer is left untouched.
pub fn render(original: &RgbImage, anomalies: &[Anomaly]) -> RgbImage {
    let mut canvas = original.clone();
    let font = load_font();

    for (idx, anomaly) in anomalies.iter().enumerate() {
        let bbox = &anomaly.bounding_box;
        draw_thick_rect(&mut canvas, bbox, BOX_COLOR);

        if let Some(font) = &font {
            let label = format!("#{}", idx + 1);
            let label_x = bbox.x as i32;
            let label_y = (bbox.y as i32 - 20).max(0);
            draw_text_mut(&mut canvas, BOX_COLOR, label_x, label_y, LABEL_SCALE, font, &label);
        }
    }

    if let Some(font) = &font {
        let banner = format!("Anomalies detectees: {}", anomalies.len());
        draw_text_mut(&mut canvas, BANNER_COLOR, 10, 10, BANNER_SCALE, font, &banner);
    }

    canvas
}

/// Stroke a rectangle by nesting hollow rects outward; drawing clips at the
/// image bounds.
fn draw_thick_rect(canvas: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>) {
    for t in 0..STROKE_WIDTH {
        let rect = Rect::at(bbox.x as i32 - t, bbox.y as i32 - t)
            .of_size(bbox.width + 2 * t as u32, bbox.height + 2 * t as u32);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

fn load_font() -> Option<FontVec> {
    let font_paths = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    for path in &font_paths {
        if let Ok(font_data) = std::fs::read(path)
            && let Ok(font) = FontVec::try_from_vec(font_data)
        {
            return Some(font);
        }
    }

    None
}

/// Receives the rendered overlay; the one filesystem side effect of a
/// pipeline call. Kept behind a trait so the numeric core stays testable
/// without touching disk.
pub trait AnnotationSink {
    fn write(&self, path: &Path, image: &RgbImage) -> Result<(), DetectionError>;
}

/// Default sink: encode next to the input file.
pub struct FileAnnotationSink;

impl AnnotationSink for FileAnnotationSink {
    fn write(&self, path: &Path, image: &RgbImage) -> Result<(), DetectionError> {
        image
            .save(path)
            .map_err(|source| DetectionError::AnnotationWrite {
                path: path.to_path_buf(),
                source,
            })
    }
}

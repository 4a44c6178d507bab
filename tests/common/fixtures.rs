#![allow(dead_code)]

use image::{Rgb, RgbImage};
use tempfile::{NamedTempFile, TempDir};

use railscan::core::db::{InspectionDb, NewInspection};

/// Uniform light-gray frame with solid black rectangles, the shape of a
/// track photo with that many isolated surface breaks. Rectangles are
/// `(x, y, width, height)`.
pub fn defect_image(width: u32, height: u32, defects: &[(u32, u32, u32, u32)]) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, Rgb([200, 200, 200]));
    for &(x, y, w, h) in defects {
        for dy in 0..h {
            for dx in 0..w {
                img.put_pixel(x + dx, y + dy, Rgb([0, 0, 0]));
            }
        }
    }
    img
}

/// The canonical scenario: an 800x600 frame with three well-separated
/// 50x100 defects (5000 px² each).
pub fn three_defect_image() -> RgbImage {
    defect_image(
        800,
        600,
        &[(100, 100, 50, 100), (300, 300, 50, 100), (500, 150, 50, 100)],
    )
}

/// Save an image to a temp PNG file. The file is cleaned up when dropped;
/// annotated siblings are not.
pub fn save_temp_png(img: &RgbImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Fresh database in a temp directory. Keep the dir alive alongside the db.
pub async fn create_test_db() -> (InspectionDb, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let db = InspectionDb::new(dir.path().join("inspections.db"))
        .await
        .expect("Failed to open test database");
    (db, dir)
}

pub fn make_new_inspection(filename: &str, anomalies: i64, score: f64) -> NewInspection {
    NewInspection {
        filename: filename.to_string(),
        original_filename: format!("orig_{filename}"),
        status: "completed".to_string(),
        anomalies_count: anomalies,
        criticality_score: score,
        processing_time: 0.42,
        notes: Some("test note".to_string()),
    }
}

//! End-to-end pipeline tests on synthetic track images.
//!
//! Covers the three-defect scenario, the clean-image zero case, determinism,
//! the minimum-area filter, annotation output, and both failure modes.

mod common;

use std::path::Path;

use common::*;
use image::RgbImage;
use railscan::detection::annotate::{self, AnnotationSink};
use railscan::detection::error::DetectionError;
use railscan::{CriticalityLevel, Detector, DetectorConfig};

#[test]
fn detects_three_separated_defects() -> anyhow::Result<()> {
    let file = save_temp_png(&three_defect_image());
    let report = Detector::new().process_image(file.path())?;

    assert_eq!(report.anomalies_count, 3);
    assert!((report.criticality_score - 0.14).abs() < 1e-9);
    assert_eq!(
        CriticalityLevel::from_score(report.criticality_score),
        CriticalityLevel::Low
    );
    assert_eq!(report.image_dimensions, (800, 600));
    assert!(report.processing_time >= 0.0);
    assert!(report.notes.starts_with("INFO: 3 anomalies mineures"));

    let annotated = annotate::annotated_path(file.path());
    assert!(annotated.exists());
    std::fs::remove_file(annotated)?;
    Ok(())
}

#[test]
fn uniform_image_yields_no_anomalies() -> anyhow::Result<()> {
    let file = save_temp_png(&defect_image(400, 300, &[]));
    let report = Detector::new().process_image(file.path())?;

    assert_eq!(report.anomalies_count, 0);
    assert_eq!(report.criticality_score, 0.0);
    assert_eq!(report.notes, "OK: Pas d'anomalies significatives détectées.");

    std::fs::remove_file(annotate::annotated_path(file.path()))?;
    Ok(())
}

#[test]
fn repeated_runs_are_deterministic() -> anyhow::Result<()> {
    let file = save_temp_png(&three_defect_image());
    let detector = Detector::new();

    let first = detector.process_image(file.path())?;
    let second = detector.process_image(file.path())?;

    assert_eq!(first.anomalies_count, second.anomalies_count);
    assert_eq!(first.criticality_score, second.criticality_score);

    std::fs::remove_file(annotate::annotated_path(file.path()))?;
    Ok(())
}

#[test]
fn retained_anomalies_respect_min_area() -> anyhow::Result<()> {
    let file = save_temp_png(&three_defect_image());
    let config = DetectorConfig::default();
    let anomalies = Detector::with_config(config).detect_anomalies(file.path())?;

    assert!(!anomalies.is_empty());
    for anomaly in &anomalies {
        assert!(
            anomaly.area >= config.min_contour_area,
            "anomaly area {} below threshold {}",
            anomaly.area,
            config.min_contour_area
        );
    }
    Ok(())
}

#[test]
fn annotated_copy_marks_each_bounding_box() -> anyhow::Result<()> {
    let file = save_temp_png(&three_defect_image());
    let detector = Detector::new();

    let anomalies = detector.detect_anomalies(file.path())?;
    assert_eq!(anomalies.len(), 3);

    let report = detector.process_image(file.path())?;
    let original = image::open(file.path())?.to_rgb8();
    let annotated = image::open(&report.annotated_image_path)?.to_rgb8();

    assert_eq!(annotated.dimensions(), original.dimensions());
    for anomaly in &anomalies {
        let bbox = anomaly.bounding_box;
        assert_ne!(
            annotated.get_pixel(bbox.x, bbox.y),
            original.get_pixel(bbox.x, bbox.y),
            "border pixel at ({}, {}) unchanged",
            bbox.x,
            bbox.y
        );
    }

    std::fs::remove_file(report.annotated_image_path)?;
    Ok(())
}

#[test]
fn missing_input_fails_without_output() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("no_such_image.png");

    let err = Detector::new().process_image(&missing).unwrap_err();
    assert!(matches!(err, DetectionError::ImageRead { .. }));
    assert!(!annotate::annotated_path(&missing).exists());
}

struct FailingSink;

impl AnnotationSink for FailingSink {
    fn write(&self, path: &Path, _image: &RgbImage) -> Result<(), DetectionError> {
        Err(DetectionError::AnnotationWrite {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )),
        })
    }
}

#[test]
fn annotation_write_failure_aborts_the_call() {
    let file = save_temp_png(&three_defect_image());

    let err = Detector::new()
        .process_image_with_sink(file.path(), &FailingSink)
        .unwrap_err();

    assert!(matches!(err, DetectionError::AnnotationWrite { .. }));
    assert!(!annotate::annotated_path(file.path()).exists());
}

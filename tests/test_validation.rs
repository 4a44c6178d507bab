//! Upload validation, filename handling, and CSV export.

use std::path::Path;

use railscan::core::db::Inspection;
use railscan::detection::annotate::annotated_path;
use railscan::exporters::export_inspections_to_csv;
use railscan::validators::{
    MAX_FILE_SIZE, sanitize_filename, timestamped_filename, validate_image_upload, validate_limit,
};
use time::OffsetDateTime;

#[test]
fn accepts_supported_extensions() {
    for name in ["rail.png", "rail.jpg", "rail.jpeg", "RAIL.PNG"] {
        assert!(validate_image_upload(name, 1024).is_ok(), "rejected {name}");
    }
}

#[test]
fn rejects_bad_uploads() {
    assert!(validate_image_upload("", 1024).is_err());
    assert!(validate_image_upload("rail.gif", 1024).is_err());
    assert!(validate_image_upload("rail", 1024).is_err());
    assert!(validate_image_upload("rail.png", MAX_FILE_SIZE + 1).is_err());
    assert!(validate_image_upload("rail.png", MAX_FILE_SIZE).is_ok());
}

#[test]
fn limit_falls_back_to_default() {
    assert_eq!(validate_limit(None, 100, 500), 100);
    assert_eq!(validate_limit(Some("abc"), 100, 500), 100);
    assert_eq!(validate_limit(Some("0"), 100, 500), 100);
    assert_eq!(validate_limit(Some("-3"), 100, 500), 100);
    assert_eq!(validate_limit(Some("50"), 100, 500), 50);
    assert_eq!(validate_limit(Some("9999"), 100, 500), 500);
}

#[test]
fn sanitize_strips_directories_and_odd_characters() {
    assert_eq!(sanitize_filename("rail.png"), "rail.png");
    assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
    assert_eq!(sanitize_filename("dir\\photo 1!.jpg"), "photo1.jpg");
    assert_eq!(sanitize_filename("éé"), "upload");
}

#[test]
fn stored_filenames_are_unique_and_keep_the_extension() {
    let a = timestamped_filename("rail.JPG");
    let b = timestamped_filename("rail.JPG");
    assert_ne!(a, b);
    assert!(a.ends_with(".jpg"));
    // YYYYmmdd_HHMMSS prefix
    assert_eq!(a.as_bytes()[8], b'_');
}

#[test]
fn annotated_path_inserts_suffix_before_extension() {
    assert_eq!(
        annotated_path(Path::new("uploads/photo.jpg")),
        Path::new("uploads/photo_annotated.jpg")
    );
    assert_eq!(
        annotated_path(Path::new("photo.PNG")),
        Path::new("photo_annotated.PNG")
    );
    assert_eq!(
        annotated_path(Path::new("photo")),
        Path::new("photo_annotated")
    );
}

fn sample_inspection(id: i64, notes: &str) -> anyhow::Result<Inspection> {
    Ok(Inspection {
        id,
        filename: format!("20260805_000000_{id}.png"),
        original_filename: format!("rail_{id}.png"),
        upload_date: OffsetDateTime::from_unix_timestamp(1_754_000_000)?,
        status: "completed".to_string(),
        anomalies_count: 3,
        criticality_score: 0.14,
        processing_time: 0.2,
        notes: Some(notes.to_string()),
    })
}

#[test]
fn csv_export_quotes_fields_with_commas() -> anyhow::Result<()> {
    let inspections = vec![
        sample_inspection(1, "plain note")?,
        sample_inspection(2, "INFO: 3 anomalies, re-check")?,
    ];

    let csv = export_inspections_to_csv(&inspections)?;
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "ID,Filename,Upload Date,Anomalies Count,Criticality Score,\
         Criticality Level,Processing Time (s),Notes"
    );
    assert!(lines[1].starts_with("1,rail_1.png,"));
    assert!(lines[1].contains(",low,"));
    assert!(lines[2].ends_with("\"INFO: 3 anomalies, re-check\""));

    Ok(())
}

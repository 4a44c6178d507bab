//! Upload validation and filename handling for the API layer.
//!
//! The pipeline trusts its input path; everything here runs before a byte
//! reaches disk.

use std::path::Path;

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// An upload the API refuses to accept.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ValidationError(String);

fn allowed_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reject uploads the pipeline cannot process.
pub fn validate_image_upload(filename: &str, size: usize) -> Result<(), ValidationError> {
    if filename.is_empty() {
        return Err(ValidationError("No file selected".to_string()));
    }
    if !allowed_file(filename) {
        return Err(ValidationError(format!(
            "Invalid file type. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    if size > MAX_FILE_SIZE {
        return Err(ValidationError(format!(
            "File too large. Max size: {}MB",
            MAX_FILE_SIZE / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Clamp a `?limit=` query parameter into [1, `max_limit`]. Anything
/// unparseable falls back to the default rather than failing the request.
pub fn validate_limit(raw: Option<&str>, default: u32, max_limit: u32) -> u32 {
    match raw.and_then(|value| value.parse::<u32>().ok()) {
        Some(0) | None => default,
        Some(limit) => limit.min(max_limit),
    }
}

/// Strip directories and anything that could escape the uploads namespace;
/// keep the name readable.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Unique on-disk name for an upload: timestamp, uuid, original extension.
/// Uniqueness is what lets concurrent uploads share one directory without
/// coordination.
pub fn timestamped_filename(original: &str) -> String {
    let stamp = compact_timestamp(OffsetDateTime::now_utc());
    let ext = Path::new(original)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "png".to_string());
    format!("{stamp}_{}.{ext}", Uuid::new_v4())
}

/// `YYYYmmdd_HHMMSS`, used for stored filenames and export attachments.
pub fn compact_timestamp(at: OffsetDateTime) -> String {
    format!(
        "{:04}{:02}{:02}_{:02}{:02}{:02}",
        at.year(),
        at.month() as u8,
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

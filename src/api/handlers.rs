use std::io::ErrorKind;
use std::path::Path as FsPath;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::db::{Inspection, InspectionRepository, NewInspection};
use crate::detection::annotate;
use crate::exporters;
use crate::validators;

use super::AppState;
use super::error::ApiError;

const SERVICE_NAME: &str = "Railway Track Monitoring API";

pub async fn health_check() -> impl IntoResponse {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    Json(json!({
        "status": "ok",
        "timestamp": timestamp,
        "service": SERVICE_NAME,
    }))
}

/// Upload + analyze one image. The stored upload, the annotated overlay, and
/// the database record stand or fall together: a pipeline failure removes
/// the upload and persists nothing.
pub async fn upload_inspection(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let (original, data) = read_image_field(&mut multipart).await?;
    validators::validate_image_upload(&original, data.len())?;

    let original_filename = validators::sanitize_filename(&original);
    let filename = validators::timestamped_filename(&original_filename);
    let filepath = state.upload_dir.join(&filename);

    tokio::fs::write(&filepath, &data)
        .await
        .map_err(|err| ApiError::Internal(err.into()))?;
    tracing::info!("file saved: {}", filepath.display());

    let detector = state.detector.clone();
    let analysis_path = filepath.clone();
    let analysis = tokio::task::spawn_blocking(move || detector.process_image(&analysis_path))
        .await
        .map_err(|err| ApiError::Internal(err.into()))?;

    let report = match analysis {
        Ok(report) => report,
        Err(err) => {
            if let Err(remove_err) = tokio::fs::remove_file(&filepath).await {
                tracing::warn!(
                    "could not remove failed upload {}: {remove_err}",
                    filepath.display()
                );
            }
            return Err(ApiError::Processing(err));
        }
    };

    let new_inspection = NewInspection {
        filename,
        original_filename,
        status: "completed".to_string(),
        anomalies_count: i64::from(report.anomalies_count),
        criticality_score: report.criticality_score,
        processing_time: report.processing_time,
        notes: Some(report.notes),
    };
    let inspection = state
        .db
        .add_inspection(&new_inspection)
        .await
        .map_err(|err| {
            tracing::error!("failed to save inspection: {err:?}");
            ApiError::Database("Failed to save inspection".to_string())
        })?;
    tracing::info!("inspection saved with id {}", inspection.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "inspection": inspection.to_payload()?,
            "message": "Image analyzed successfully",
        })),
    )
        .into_response())
}

async fn read_image_field(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            let original = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await?;
            return Ok((original, data));
        }
    }
    Err(ApiError::Validation("No image file provided".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    limit: Option<String>,
}

pub async fn get_inspections(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let limit = validators::validate_limit(query.limit.as_deref(), 100, 500);
    let inspections = state.db.get_inspections(limit).await.map_err(|err| {
        tracing::error!("failed to list inspections: {err:?}");
        ApiError::Database("Failed to retrieve inspections".to_string())
    })?;

    let payloads = inspections
        .iter()
        .map(Inspection::to_payload)
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(json!({
        "success": true,
        "count": payloads.len(),
        "inspections": payloads,
    }))
    .into_response())
}

pub async fn get_inspection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let inspection = state
        .db
        .get_inspection_by_id(id)
        .await
        .map_err(|err| {
            tracing::error!("failed to get inspection {id}: {err:?}");
            ApiError::Database("Failed to retrieve inspection".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound(format!("Inspection {id} not found")))?;

    Ok(Json(json!({
        "success": true,
        "inspection": inspection.to_payload()?,
    }))
    .into_response())
}

/// Remove an inspection and its image files. File cleanup is best-effort:
/// the record goes away even when a file is already gone.
pub async fn delete_inspection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let inspection = state
        .db
        .get_inspection_by_id(id)
        .await
        .map_err(|err| {
            tracing::error!("failed to get inspection {id}: {err:?}");
            ApiError::Database("Failed to retrieve inspection".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound(format!("Inspection {id} not found")))?;

    let original_path = state.upload_dir.join(&inspection.filename);
    let annotated_path = annotate::annotated_path(&original_path);
    for path in [original_path, annotated_path] {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::info!("deleted file: {}", path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => tracing::warn!("could not delete {}: {err}", path.display()),
        }
    }

    state.db.delete_inspection(id).await.map_err(|err| {
        tracing::error!("failed to delete inspection {id}: {err:?}");
        ApiError::Database("Failed to delete inspection".to_string())
    })?;
    tracing::info!("inspection {id} deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Inspection deleted successfully",
        "id": id,
    }))
    .into_response())
}

pub async fn get_statistics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let stats = state.db.get_stats().await.map_err(|err| {
        tracing::error!("failed to compute statistics: {err:?}");
        ApiError::Database("Failed to retrieve statistics".to_string())
    })?;

    Ok(Json(json!({
        "success": true,
        "statistics": stats,
    }))
    .into_response())
}

pub async fn export_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let inspections = state.db.get_inspections(10_000).await.map_err(|err| {
        tracing::error!("failed to list inspections for export: {err:?}");
        ApiError::Database("Failed to retrieve inspections".to_string())
    })?;

    if inspections.is_empty() {
        return Err(ApiError::NotFound("No inspections to export".to_string()));
    }

    let csv = exporters::export_inspections_to_csv(&inspections)?;
    let stamp = validators::compact_timestamp(OffsetDateTime::now_utc());
    tracing::info!("exported {} inspections to CSV", inspections.len());

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/csv; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=inspections_{stamp}.csv"),
            ),
        ],
        csv,
    )
        .into_response())
}

/// Serve stored originals and annotated overlays.
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    if filename.contains(['/', '\\']) || filename.contains("..") {
        return Err(ApiError::Validation("Invalid filename".to_string()));
    }

    let path = state.upload_dir.join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ApiError::NotFound("File not found".to_string()));
        }
        Err(err) => return Err(ApiError::Internal(err.into())),
    };

    let content_type = match FsPath::new(&filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };

    Ok(([(header::CONTENT_TYPE, content_type.to_string())], bytes).into_response())
}

use anyhow::Context;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::InspectionDb;
use crate::models::CriticalityLevel;

/// A persisted track inspection.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub id: i64,
    /// Stored (timestamp-qualified) filename under the upload directory.
    pub filename: String,
    /// Filename as submitted by the client, sanitized.
    pub original_filename: String,
    pub upload_date: OffsetDateTime,
    pub status: String,
    pub anomalies_count: i64,
    pub criticality_score: f64,
    pub processing_time: f64,
    pub notes: Option<String>,
}

impl Inspection {
    pub fn criticality_level(&self) -> CriticalityLevel {
        CriticalityLevel::from_score(self.criticality_score)
    }

    /// JSON shape served by the API. Scores are rounded to two decimals and
    /// processing times to three; consumers render these as-is.
    pub fn to_payload(&self) -> anyhow::Result<InspectionPayload> {
        Ok(InspectionPayload {
            id: self.id,
            filename: self.filename.clone(),
            original_filename: self.original_filename.clone(),
            upload_date: self.upload_date.format(&Rfc3339)?,
            status: self.status.clone(),
            anomalies_count: self.anomalies_count,
            criticality_score: round_to(self.criticality_score, 100.0),
            criticality_level: self.criticality_level(),
            processing_time: round_to(self.processing_time, 1000.0),
            notes: self.notes.clone(),
        })
    }
}

fn round_to(value: f64, factor: f64) -> f64 {
    (value * factor).round() / factor
}

/// Serialized form of an [`Inspection`], including the derived level.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionPayload {
    pub id: i64,
    pub filename: String,
    pub original_filename: String,
    pub upload_date: String,
    pub status: String,
    pub anomalies_count: i64,
    pub criticality_score: f64,
    pub criticality_level: CriticalityLevel,
    pub processing_time: f64,
    pub notes: Option<String>,
}

/// Insert shape for a completed analysis.
#[derive(Debug, Clone)]
pub struct NewInspection {
    pub filename: String,
    pub original_filename: String,
    pub status: String,
    pub anomalies_count: i64,
    pub criticality_score: f64,
    pub processing_time: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CriticalityDistribution {
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectionStats {
    pub total_inspections: i64,
    pub criticality_distribution: CriticalityDistribution,
    pub average_anomalies: f64,
}

/// Raw row shape; dates live as RFC3339 text in the database.
#[derive(FromRow)]
struct InspectionRow {
    id: i64,
    filename: String,
    original_filename: String,
    upload_date: String,
    status: String,
    anomalies_count: i64,
    criticality_score: f64,
    processing_time: f64,
    notes: Option<String>,
}

impl TryFrom<InspectionRow> for Inspection {
    type Error = anyhow::Error;

    fn try_from(row: InspectionRow) -> anyhow::Result<Self> {
        let upload_date = OffsetDateTime::parse(&row.upload_date, &Rfc3339)
            .with_context(|| format!("Invalid upload_date on inspection {}", row.id))?;
        Ok(Self {
            id: row.id,
            filename: row.filename,
            original_filename: row.original_filename,
            upload_date,
            status: row.status,
            anomalies_count: row.anomalies_count,
            criticality_score: row.criticality_score,
            processing_time: row.processing_time,
            notes: row.notes,
        })
    }
}

pub trait InspectionRepository {
    async fn add_inspection(&self, new: &NewInspection) -> anyhow::Result<Inspection>;
    async fn get_inspections(&self, limit: u32) -> anyhow::Result<Vec<Inspection>>;
    async fn get_inspection_by_id(&self, id: i64) -> anyhow::Result<Option<Inspection>>;
    /// Returns false when no row with that id existed.
    async fn delete_inspection(&self, id: i64) -> anyhow::Result<bool>;
    async fn get_stats(&self) -> anyhow::Result<InspectionStats>;
}

impl InspectionRepository for InspectionDb {
    async fn add_inspection(&self, new: &NewInspection) -> anyhow::Result<Inspection> {
        let upload_date = OffsetDateTime::now_utc();
        let upload_date_str = upload_date.format(&Rfc3339)?;

        let id = sqlx::query(
            "INSERT INTO inspections (filename, original_filename, upload_date, status, \
             anomalies_count, criticality_score, processing_time, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&new.filename)
        .bind(&new.original_filename)
        .bind(&upload_date_str)
        .bind(&new.status)
        .bind(new.anomalies_count)
        .bind(new.criticality_score)
        .bind(new.processing_time)
        .bind(&new.notes)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(Inspection {
            id,
            filename: new.filename.clone(),
            original_filename: new.original_filename.clone(),
            upload_date,
            status: new.status.clone(),
            anomalies_count: new.anomalies_count,
            criticality_score: new.criticality_score,
            processing_time: new.processing_time,
            notes: new.notes.clone(),
        })
    }

    async fn get_inspections(&self, limit: u32) -> anyhow::Result<Vec<Inspection>> {
        let rows: Vec<InspectionRow> = sqlx::query_as(
            "SELECT id, filename, original_filename, upload_date, status, anomalies_count, \
             criticality_score, processing_time, notes FROM inspections \
             ORDER BY upload_date DESC, id DESC LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Inspection::try_from).collect()
    }

    async fn get_inspection_by_id(&self, id: i64) -> anyhow::Result<Option<Inspection>> {
        let row: Option<InspectionRow> = sqlx::query_as(
            "SELECT id, filename, original_filename, upload_date, status, anomalies_count, \
             criticality_score, processing_time, notes FROM inspections WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Inspection::try_from).transpose()
    }

    async fn delete_inspection(&self, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM inspections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_stats(&self) -> anyhow::Result<InspectionStats> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM inspections")
            .fetch_one(&self.pool)
            .await?;

        let (high, medium, low): (i64, i64, i64) = sqlx::query_as(
            "SELECT \
             COALESCE(SUM(CASE WHEN criticality_score >= 0.7 THEN 1 ELSE 0 END), 0), \
             COALESCE(SUM(CASE WHEN criticality_score >= 0.4 AND criticality_score < 0.7 \
                 THEN 1 ELSE 0 END), 0), \
             COALESCE(SUM(CASE WHEN criticality_score < 0.4 THEN 1 ELSE 0 END), 0) \
             FROM inspections",
        )
        .fetch_one(&self.pool)
        .await?;

        let (average,): (Option<f64>,) =
            sqlx::query_as("SELECT AVG(anomalies_count) FROM inspections")
                .fetch_one(&self.pool)
                .await?;

        Ok(InspectionStats {
            total_inspections: total,
            criticality_distribution: CriticalityDistribution { high, medium, low },
            average_anomalies: (average.unwrap_or(0.0) * 100.0).round() / 100.0,
        })
    }
}

use std::path::PathBuf;

use serde::Serialize;

/// Axis-aligned bounding rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One detected surface defect candidate.
#[derive(Debug, Clone)]
pub struct Anomaly {
    /// Enclosed contour area in px².
    pub area: f64,
    pub bounding_box: BoundingBox,
}

/// Everything a pipeline invocation hands back to its caller.
///
/// Internal buffers (decoded image, edge map, contours) are released when the
/// call returns; this is the only value that outlives it.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub anomalies_count: u32,
    /// Normalized severity in [0.0, 1.0].
    pub criticality_score: f64,
    /// Wall-clock seconds spent in the pipeline call.
    pub processing_time: f64,
    pub annotated_image_path: PathBuf,
    /// (width, height) of the decoded input.
    pub image_dimensions: (u32, u32),
    pub notes: String,
}

/// Categorical severity bucket derived from a criticality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalityLevel {
    Low,
    Medium,
    High,
}

impl CriticalityLevel {
    /// Bucket thresholds shared by the API payloads and the statistics query.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            Self::High
        } else if score >= 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for CriticalityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

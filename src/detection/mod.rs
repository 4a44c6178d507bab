pub mod annotate;
pub mod contours;
pub mod error;
pub mod preprocessing;
pub mod scoring;

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;

use crate::models::{AnalysisReport, Anomaly};

use annotate::{AnnotationSink, FileAnnotationSink};
use error::DetectionError;

/// Detection thresholds.
///
/// Immutable for the lifetime of a `Detector`, so concurrent calls never
/// observe a half-updated configuration.
#[derive(Debug, Clone, Copy)]
pub struct DetectorConfig {
    /// Gradient magnitude below which candidate edges are rejected.
    pub low_threshold: f32,
    /// Gradient magnitude above which edges are accepted outright.
    pub high_threshold: f32,
    /// Smallest enclosed contour area (px²) reported as an anomaly.
    pub min_contour_area: f64,
    /// Gaussian kernel size the blur σ is derived from.
    pub blur_kernel_size: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 150.0,
            min_contour_area: 100.0,
            blur_kernel_size: 5,
        }
    }
}

impl DetectorConfig {
    pub fn blur_sigma(&self) -> f32 {
        preprocessing::sigma_for_kernel(self.blur_kernel_size)
    }
}

/// Railway surface anomaly detector.
///
/// Stateless per call: each invocation owns its buffers exclusively and
/// releases them on return, on every failure path included.
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Analyze the image at `path`, writing the annotated copy next to it.
    pub fn process_image(&self, path: &Path) -> Result<AnalysisReport, DetectionError> {
        self.process_image_with_sink(path, &FileAnnotationSink)
    }

    /// Full pipeline: decode → grayscale → blur → edges → contours →
    /// annotate → score. `sink` receives the rendered overlay; everything
    /// else is pure computation. Either a complete report comes back or the
    /// call fails outright.
    pub fn process_image_with_sink(
        &self,
        path: &Path,
        sink: &impl AnnotationSink,
    ) -> Result<AnalysisReport, DetectionError> {
        let start = Instant::now();

        let decoded = self.open_image(path)?;
        let original = decoded.to_rgb8();
        let (width, height) = original.dimensions();

        let anomalies = self.run_stages(&decoded);

        let annotated = annotate::render(&original, &anomalies);
        let annotated_image_path = annotate::annotated_path(path);
        sink.write(&annotated_image_path, &annotated)?;

        let anomalies_count = anomalies.len() as u32;
        let criticality_score = scoring::criticality_score(anomalies_count);
        let notes = scoring::generate_notes(anomalies_count, criticality_score);

        Ok(AnalysisReport {
            anomalies_count,
            criticality_score,
            processing_time: start.elapsed().as_secs_f64(),
            annotated_image_path,
            image_dimensions: (width, height),
            notes,
        })
    }

    /// Detected anomalies only, without rendering or touching the filesystem.
    pub fn detect_anomalies(&self, path: &Path) -> Result<Vec<Anomaly>, DetectionError> {
        let decoded = self.open_image(path)?;
        Ok(self.run_stages(&decoded))
    }

    fn open_image(&self, path: &Path) -> Result<DynamicImage, DetectionError> {
        image::open(path).map_err(|source| DetectionError::ImageRead {
            path: path.to_path_buf(),
            source,
        })
    }

    fn run_stages(&self, decoded: &DynamicImage) -> Vec<Anomaly> {
        let gray = preprocessing::to_grayscale(decoded);
        let blurred = preprocessing::apply_blur(&gray, self.config.blur_sigma());
        let edges = preprocessing::detect_edges(
            &blurred,
            self.config.low_threshold,
            self.config.high_threshold,
        );
        contours::find_anomalies(&edges, self.config.min_contour_area)
    }
}

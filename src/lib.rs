pub mod api;
pub mod core;
pub mod detection;
pub mod exporters;
pub mod models;
pub mod validators;

pub use detection::{Detector, DetectorConfig};
pub use models::{AnalysisReport, Anomaly, BoundingBox, CriticalityLevel};

//! Criticality scoring and operator-facing notes.
//!
//! Pure functions of the anomaly count; no pipeline state involved.

/// Map an anomaly count onto a normalized [0.0, 1.0] severity score.
///
/// Piecewise-linear: a gentle ramp up to 10 anomalies, a steeper medium zone
/// through 30, then a ramp clamped at 1.0. Monotonic non-decreasing in the
/// count.
pub fn criticality_score(anomalies_count: u32) -> f64 {
    match anomalies_count {
        0 => 0.0,
        n @ 1..=10 => 0.05 + 0.03 * f64::from(n),
        n @ 11..=30 => 0.4 + 0.015 * f64::from(n - 10),
        n => (0.7 + 0.01 * f64::from(n - 30)).min(1.0),
    }
}

/// Fixed note attached to each inspection record.
///
/// API consumers render these verbatim; the wording is part of the external
/// contract and must not drift.
pub fn generate_notes(anomalies_count: u32, criticality_score: f64) -> String {
    if criticality_score >= 0.7 {
        format!(
            "CRITICAL: {anomalies_count} anomalies détectées. Inspection immédiate recommandée."
        )
    } else if criticality_score >= 0.4 {
        format!("WARNING: {anomalies_count} anomalies détectées. Planifier une inspection bientôt.")
    } else if anomalies_count > 0 {
        format!(
            "INFO: {anomalies_count} anomalies mineures détectées. Surveiller lors de la prochaine maintenance."
        )
    } else {
        "OK: Pas d'anomalies significatives détectées.".to_string()
    }
}

//! Properties of the criticality score, level buckets, and note templates.

use railscan::CriticalityLevel;
use railscan::detection::scoring::{criticality_score, generate_notes};

#[test]
fn score_zero_for_clean_image() {
    assert_eq!(criticality_score(0), 0.0);
}

#[test]
fn score_table_at_branch_boundaries() {
    assert!((criticality_score(1) - 0.08).abs() < 1e-9);
    assert!((criticality_score(3) - 0.14).abs() < 1e-9);
    assert!((criticality_score(10) - 0.35).abs() < 1e-9);
    assert!((criticality_score(11) - 0.415).abs() < 1e-9);
    assert!((criticality_score(30) - 0.7).abs() < 1e-9);
    assert!((criticality_score(31) - 0.71).abs() < 1e-9);
}

#[test]
fn score_is_monotonic_and_bounded() {
    let mut prev = criticality_score(0);
    for n in 1..=200 {
        let score = criticality_score(n);
        assert!(score >= prev, "score decreased at n = {n}");
        assert!((0.0..=1.0).contains(&score), "score out of range at n = {n}");
        prev = score;
    }
}

#[test]
fn score_saturates_at_one() {
    assert!(criticality_score(59) < 1.0);
    assert_eq!(criticality_score(60), 1.0);
    assert_eq!(criticality_score(61), 1.0);
    assert_eq!(criticality_score(100_000), 1.0);
}

#[test]
fn level_thresholds() {
    assert_eq!(CriticalityLevel::from_score(0.0), CriticalityLevel::Low);
    assert_eq!(CriticalityLevel::from_score(0.39), CriticalityLevel::Low);
    assert_eq!(CriticalityLevel::from_score(0.4), CriticalityLevel::Medium);
    assert_eq!(CriticalityLevel::from_score(0.69), CriticalityLevel::Medium);
    assert_eq!(CriticalityLevel::from_score(0.70), CriticalityLevel::High);
    assert_eq!(CriticalityLevel::from_score(1.0), CriticalityLevel::High);

    assert_eq!(CriticalityLevel::Low.as_str(), "low");
    assert_eq!(CriticalityLevel::Medium.as_str(), "medium");
    assert_eq!(CriticalityLevel::High.as_str(), "high");
}

#[test]
fn note_templates_follow_severity() {
    assert_eq!(
        generate_notes(0, criticality_score(0)),
        "OK: Pas d'anomalies significatives détectées."
    );
    assert_eq!(
        generate_notes(3, criticality_score(3)),
        "INFO: 3 anomalies mineures détectées. Surveiller lors de la prochaine maintenance."
    );
    assert_eq!(
        generate_notes(15, criticality_score(15)),
        "WARNING: 15 anomalies détectées. Planifier une inspection bientôt."
    );
    assert_eq!(
        generate_notes(40, criticality_score(40)),
        "CRITICAL: 40 anomalies détectées. Inspection immédiate recommandée."
    );
}

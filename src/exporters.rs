//! Flat-file exports of the inspection history.

use time::format_description::well_known::Rfc3339;

use crate::core::db::Inspection;

const CSV_HEADER: &str = "ID,Filename,Upload Date,Anomalies Count,Criticality Score,\
Criticality Level,Processing Time (s),Notes";

/// Render inspections as CSV, in the order given.
pub fn export_inspections_to_csv(inspections: &[Inspection]) -> anyhow::Result<String> {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for inspection in inspections {
        let fields = [
            inspection.id.to_string(),
            inspection.original_filename.clone(),
            inspection.upload_date.format(&Rfc3339)?,
            inspection.anomalies_count.to_string(),
            inspection.criticality_score.to_string(),
            inspection.criticality_level().to_string(),
            inspection.processing_time.to_string(),
            inspection.notes.clone().unwrap_or_default(),
        ];
        let row: Vec<String> = fields.iter().map(|field| csv_escape(field)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    Ok(out)
}

/// Quote a field when it contains a comma, quote, or line break.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

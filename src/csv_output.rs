//! CSV output format for dose reports and count series
//!
//! `--format csv` for spreadsheet analysis of survey results

use crate::geiger_log::GeigerLog;
use crate::vault::DoseReport;

/// Escape CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Dose report as CSV, one row per point
pub fn report_to_csv(report: &DoseReport) -> String {
    let mut output = String::new();

    output.push_str(
        "index,location,total_mrem_per_week,limit_mrem_per_week,primary,leakage,scatter,exceeds_limit\n",
    );

    for row in &report.rows {
        let fields = [
            row.index.to_string(),
            escape_field(&row.location),
            row.total_mrem_per_week.to_string(),
            row.limit_mrem_per_week.to_string(),
            row.primary.to_string(),
            row.leakage.to_string(),
            row.scatter.to_string(),
            row.exceeds_limit().to_string(),
        ];
        output.push_str(&fields.join(","));
        output.push('\n');
    }

    output
}

/// Count series as CSV with the beam-on classification of each sample
pub fn series_to_csv(log: &GeigerLog, threshold: u64) -> String {
    let mut output = String::new();

    output.push_str("timestamp,cpm,cp5s,beam_on\n");

    for record in log.records() {
        output.push_str(&record.timestamp.to_rfc3339());
        output.push(',');
        output.push_str(&record.counts_per_minute.to_string());
        output.push(',');
        output.push_str(&record.counts_per_5s.to_string());
        output.push(',');
        output.push(if record.counts_per_minute >= threshold {
            '1'
        } else {
            '0'
        });
        output.push('\n');
    }

    output
}

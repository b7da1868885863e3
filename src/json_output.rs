//! JSON output format for dose reports and beam analyses
//!
//! `--format json` for the `report` and `threshold` subcommands

use crate::geiger_log::GeigerLog;
use crate::threshold::{BeamPeriod, BeamSummary};
use crate::vault::{DoseReport, WeeklyWorkload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point of the dose report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDoseRow {
    pub index: usize,
    pub location: String,
    /// Total weekly dose, mrem/week
    pub total_mrem_per_week: f64,
    /// Weekly limit of the area, mrem/week
    pub limit_mrem_per_week: f64,
    pub primary: f64,
    pub leakage: f64,
    pub scatter: f64,
    pub exceeds_limit: bool,
}

/// Summary of a dose report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReportSummary {
    pub points: usize,
    /// Points whose total exceeds their limit
    pub violations: usize,
}

/// Complete JSON dose report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDoseReport {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    pub workload: WeeklyWorkload,
    pub rows: Vec<JsonDoseRow>,
    pub summary: JsonReportSummary,
}

impl JsonDoseReport {
    pub fn from_report(report: &DoseReport) -> Self {
        let rows: Vec<JsonDoseRow> = report
            .rows
            .iter()
            .map(|row| JsonDoseRow {
                index: row.index,
                location: row.location.clone(),
                total_mrem_per_week: row.total_mrem_per_week,
                limit_mrem_per_week: row.limit_mrem_per_week,
                primary: row.primary,
                leakage: row.leakage,
                scatter: row.scatter,
                exceeds_limit: row.exceeds_limit(),
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "vaultshield-report-v1".to_string(),
            workload: report.workload,
            summary: JsonReportSummary {
                points: rows.len(),
                violations: rows.iter().filter(|r| r.exceeds_limit).count(),
            },
            rows,
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A single log sample with its classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSample {
    pub timestamp: DateTime<Utc>,
    pub cpm: u64,
    pub beam_on: bool,
}

/// Complete JSON beam analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonBeamAnalysis {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    /// Threshold in counts per minute
    pub threshold: u64,
    pub between_class_variance: u128,
    pub total_samples: usize,
    pub beam_on_samples: usize,
    pub periods: Vec<BeamPeriod>,
    pub samples: Vec<JsonSample>,
}

impl JsonBeamAnalysis {
    pub fn new(log: &GeigerLog, summary: &BeamSummary) -> Self {
        let samples = log
            .records()
            .iter()
            .map(|record| JsonSample {
                timestamp: record.timestamp,
                cpm: record.counts_per_minute,
                beam_on: record.counts_per_minute >= summary.threshold.value,
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "vaultshield-threshold-v1".to_string(),
            threshold: summary.threshold.value,
            between_class_variance: summary.threshold.between_class_variance,
            total_samples: summary.total_samples,
            beam_on_samples: summary.beam_on_samples,
            periods: summary.periods.clone(),
            samples,
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

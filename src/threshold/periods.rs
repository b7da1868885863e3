// Contiguous beam-on periods from a binarized log

use super::otsu::{binarize, otsu_threshold, Threshold};
use super::Result;
use crate::geiger_log::{GeigerLog, LogRecord};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A run of consecutive beam-on samples
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamPeriod {
    /// Timestamp of the first beam-on sample
    pub start: DateTime<Utc>,
    /// Timestamp of the last beam-on sample
    pub end: DateTime<Utc>,
    pub samples: usize,
    pub peak_cpm: u64,
}

impl BeamPeriod {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Group runs of 1 in `labels` into periods
///
/// `labels` is paired with `records` by position; extra entries on either
/// side are ignored.
pub fn beam_periods(records: &[LogRecord], labels: &[u8]) -> Vec<BeamPeriod> {
    let mut periods = Vec::new();
    let mut current: Option<BeamPeriod> = None;

    for (record, &label) in records.iter().zip(labels) {
        if label == 0 {
            periods.extend(current.take());
            continue;
        }
        match current.as_mut() {
            Some(period) => {
                period.end = record.timestamp;
                period.samples += 1;
                period.peak_cpm = period.peak_cpm.max(record.counts_per_minute);
            }
            None => {
                current = Some(BeamPeriod {
                    start: record.timestamp,
                    end: record.timestamp,
                    samples: 1,
                    peak_cpm: record.counts_per_minute,
                });
            }
        }
    }
    periods.extend(current);

    periods
}

/// Threshold, beam-on sample count and periods of a log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSummary {
    pub threshold: Threshold,
    pub total_samples: usize,
    pub beam_on_samples: usize,
    pub periods: Vec<BeamPeriod>,
}

impl BeamSummary {
    /// Threshold the 1-minute counts of `log` and collect its beam periods
    pub fn from_log(log: &GeigerLog) -> Result<Self> {
        let counts = log.counts_per_minute();
        let threshold = otsu_threshold(&counts)?;
        let labels = binarize(&counts, threshold.value);
        let periods = beam_periods(log.records(), &labels);
        let beam_on_samples = labels.iter().filter(|&&l| l == 1).count();

        tracing::debug!(
            threshold = threshold.value,
            samples = counts.len(),
            beam_on_samples,
            periods = periods.len(),
            "beam periods"
        );

        Ok(Self {
            threshold,
            total_samples: counts.len(),
            beam_on_samples,
            periods,
        })
    }

    /// Time covered by beam-on periods, first to last sample of each
    pub fn total_beam_on(&self) -> Duration {
        self.periods
            .iter()
            .fold(Duration::zero(), |acc, p| acc + p.duration())
    }
}

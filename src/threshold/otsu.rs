// Otsu threshold over a non-negative integer series

use super::{Result, ThresholdError};
use serde::{Deserialize, Serialize};

/// Largest histogram the thresholder will allocate (one bin per value)
pub const MAX_HISTOGRAM_BINS: usize = 1 << 24;

/// Selected cut and the between-class variance it achieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub value: u64,
    pub between_class_variance: u128,
}

fn histogram(series: &[u64]) -> Result<Vec<u64>> {
    let max = *series.iter().max().ok_or(ThresholdError::EmptySeries)?;
    if max >= MAX_HISTOGRAM_BINS as u64 {
        return Err(ThresholdError::HistogramTooLarge {
            max,
            limit: MAX_HISTOGRAM_BINS,
        });
    }

    let mut hist = vec![0u64; max as usize + 1];
    for &value in series {
        hist[value as usize] += 1;
    }
    Ok(hist)
}

/// Threshold maximizing `w_b * w_f * (m_b - m_f)^2`
///
/// Class means use floor division. Scanning stops once the foreground is
/// empty; ties keep the lowest candidate, and a series with no split (all
/// values equal) yields 0.
pub fn otsu_threshold(series: &[u64]) -> Result<Threshold> {
    let hist = histogram(series)?;

    let total = series.len() as u128;
    let sum_total: u128 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as u128 * u128::from(h))
        .sum();

    let mut best = Threshold {
        value: 0,
        between_class_variance: 0,
    };
    let mut weight_b: u128 = 0;
    let mut sum_b: u128 = 0;

    for (i, &h) in hist.iter().enumerate() {
        weight_b += u128::from(h);
        if weight_b == 0 {
            continue;
        }
        let weight_f = total - weight_b;
        if weight_f == 0 {
            break;
        }

        sum_b += i as u128 * u128::from(h);
        let mean_b = sum_b / weight_b;
        let mean_f = (sum_total - sum_b) / weight_f;
        let spread = mean_b.abs_diff(mean_f);

        let between = weight_b
            .saturating_mul(weight_f)
            .saturating_mul(spread.saturating_mul(spread));
        if between > best.between_class_variance {
            best = Threshold {
                value: i as u64,
                between_class_variance: between,
            };
        }
    }

    tracing::trace!(
        samples = series.len(),
        threshold = best.value,
        variance = %best.between_class_variance,
        "otsu threshold"
    );

    Ok(best)
}

/// 1 where the value is at or above `threshold`, else 0
pub fn binarize(series: &[u64], threshold: u64) -> Vec<u8> {
    series.iter().map(|&v| u8::from(v >= threshold)).collect()
}

/// Thresholder bound to one series
///
/// # Example
/// ```
/// use vaultshield::threshold::CountSeriesThresholder;
///
/// let cpm = [22, 21, 140, 380, 402, 391, 24];
/// let thresholder = CountSeriesThresholder::new(&cpm);
/// assert_eq!(thresholder.threshold().unwrap().value, 140);
/// assert_eq!(thresholder.binarize().unwrap(), vec![0, 0, 1, 1, 1, 1, 0]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CountSeriesThresholder<'a> {
    series: &'a [u64],
}

impl<'a> CountSeriesThresholder<'a> {
    pub fn new(series: &'a [u64]) -> Self {
        Self { series }
    }

    pub fn series(&self) -> &'a [u64] {
        self.series
    }

    /// Recomputed on every call
    pub fn threshold(&self) -> Result<Threshold> {
        otsu_threshold(self.series)
    }

    pub fn binarize(&self) -> Result<Vec<u8>> {
        let threshold = self.threshold()?;
        Ok(binarize(self.series, threshold.value))
    }

    /// Number of samples at or above the threshold
    pub fn high_count(&self) -> Result<usize> {
        let threshold = self.threshold()?.value;
        Ok(self.series.iter().filter(|&&v| v >= threshold).count())
    }
}

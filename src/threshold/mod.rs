// Beam-on / beam-off separation of count-rate series
//
// A survey meter parked outside the vault logs counts per minute while the
// unit treats. Beam-on minutes form a high cluster well above background,
// so a single cut found by Otsu's method (maximum between-class variance
// over the integer histogram) separates them without calibration.
//
// Reference:
// Otsu, N. (1979). A threshold selection method from gray-level histograms.
//     IEEE Trans. Systems, Man, and Cybernetics 9(1), 62-66.
//
// Class means use integer floor division and, among equal between-class
// variances, the lowest cut wins. Both choices are fixed so a series always
// yields the same cut on every platform.

mod otsu;
mod periods;

pub use otsu::{binarize, otsu_threshold, CountSeriesThresholder, Threshold, MAX_HISTOGRAM_BINS};
pub use periods::{beam_periods, BeamPeriod, BeamSummary};

use thiserror::Error;

/// Errors raised by the thresholder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("Cannot threshold an empty series")]
    EmptySeries,

    #[error("Maximum value {max} needs a histogram larger than {limit} bins")]
    HistogramTooLarge { max: u64, limit: usize },
}

pub type Result<T> = std::result::Result<T, ThresholdError>;

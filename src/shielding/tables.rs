// Published leakage, extrapolation and scatter data
//
// Values are copied verbatim from the site planning guide. Some entries
// disagree between tables (e.g. the 135 and 180 degree leakage' column of
// the scatter table); they are kept as published.

use crate::numeric::interp_linear;

/// Tabulated gantry angles, degrees relative to the isocenter->couch direction
pub const LEAKAGE_ANGLES: [f64; 13] = [
    0.0, 15.0, 30.0, 45.0, 60.0, 75.0, 90.0, 105.0, 120.0, 135.0, 150.0, 165.0, 180.0,
];

/// Tabulated distances from isocenter, meters
pub const LEAKAGE_DISTANCES: [f64; 6] = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5];

/// Measured leakage fraction, rows follow `LEAKAGE_ANGLES`, columns `LEAKAGE_DISTANCES`
///
/// `None` marks positions that were not measured.
pub const LEAKAGE_MEASURED: [[Option<f64>; 6]; 13] = [
    [Some(3.59e-5), Some(1.91e-5), Some(1.09e-5), Some(7.35e-6), Some(6.11e-6), Some(5.08e-6)],
    [Some(3.35e-5), Some(1.99e-5), Some(1.36e-5), Some(1.04e-5), Some(8.23e-6), Some(6.62e-6)],
    [Some(6.72e-5), Some(3.55e-5), Some(2.27e-5), Some(1.57e-5), Some(1.21e-5), Some(9.32e-6)],
    [Some(5.93e-5), Some(3.45e-5), Some(2.33e-5), Some(1.76e-5), Some(1.37e-5), Some(1.10e-5)],
    [Some(1.35e-4), Some(6.14e-5), Some(3.42e-5), Some(2.36e-5), Some(1.61e-5), Some(1.16e-5)],
    [Some(1.94e-4), Some(7.96e-5), Some(4.25e-5), Some(2.59e-5), Some(1.73e-5), Some(1.24e-5)],
    [Some(3.47e-4), Some(1.29e-4), Some(5.74e-5), Some(3.31e-5), Some(2.13e-5), Some(1.49e-5)],
    [Some(3.17e-4), Some(1.19e-4), Some(6.05e-5), Some(3.38e-5), Some(2.20e-5), Some(1.57e-5)],
    [Some(1.14e-4), Some(5.54e-5), Some(3.26e-5), Some(2.30e-5), Some(1.65e-5), Some(1.20e-5)],
    [Some(2.24e-5), Some(1.49e-5), Some(1.11e-5), Some(9.05e-6), Some(7.61e-6), Some(6.28e-6)],
    [Some(1.60e-5), Some(1.05e-5), Some(7.80e-6), Some(6.23e-6), Some(5.13e-6), Some(4.38e-6)],
    [None, None, Some(2.98e-6), None, None, None],
    [None, None, Some(2.30e-6), None, None, None],
];

/// Power-law fit `value(d) = coefficient * d^exponent` for one gantry angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawFit {
    pub angle: f64,
    pub coefficient: f64,
    pub exponent: f64,
}

impl PowerLawFit {
    pub fn eval(&self, distance: f64) -> f64 {
        self.coefficient * distance.powf(self.exponent)
    }
}

const fn fit(angle: f64, coefficient: f64, exponent: f64) -> PowerLawFit {
    PowerLawFit {
        angle,
        coefficient,
        exponent,
    }
}

/// Leakage falloff fits, every tabulated angle up to 150 degrees
pub const LEAKAGE_FITS: [PowerLawFit; 11] = [
    fit(0.0, 3.52e-5, -1.6058),
    fit(15.0, 3.35e-5, -1.2863),
    fit(30.0, 6.72e-5, -1.5736),
    fit(45.0, 5.93e-5, -1.3392),
    fit(60.0, 1.35e-4, -1.9428),
    fit(75.0, 1.94e-4, -2.1981),
    fit(90.0, 3.47e-4, -2.5360),
    fit(105.0, 3.17e-4, -2.4154),
    fit(120.0, 1.14e-4, -1.7800),
    fit(135.0, 2.24e-5, -1.0010),
    fit(150.0, 1.60e-5, -1.3007),
];

/// Distances at which fitted samples are synthesized, meters
pub const EXTRAPOLATION_DISTANCES: [f64; 3] = [0.5, 4.0, 7.0];

/// No falloff data exists at 180 degrees; the 2 m value is assumed flat.
pub const FLAT_FALLOFF_ANGLE: f64 = 180.0;
pub const FLAT_FALLOFF_DISTANCES: [f64; 5] = [0.5, 1.5, 2.5, 3.0, 3.5];
pub const FLAT_FALLOFF_VALUE: f64 = 2.30e-6;

/// Leakage and leakage+scatter fractions measured at 2 m for one angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterRatio {
    pub angle: f64,
    pub leakage: f64,
    pub leakage_and_scatter: f64,
}

impl ScatterRatio {
    /// Multiplier applied to the leakage fraction
    pub fn ratio(&self) -> f64 {
        self.leakage_and_scatter / self.leakage
    }
}

const fn ratio(angle: f64, leakage: f64, leakage_and_scatter: f64) -> ScatterRatio {
    ScatterRatio {
        angle,
        leakage,
        leakage_and_scatter,
    }
}

pub const SCATTER_RATIOS: [ScatterRatio; 13] = [
    ratio(0.0, 1.09e-5, 7.81e-5),
    ratio(15.0, 1.36e-5, 8.21e-5),
    ratio(30.0, 2.27e-5, 1.01e-4),
    ratio(45.0, 2.33e-5, 1.14e-4),
    ratio(60.0, 3.42e-5, 1.22e-4),
    ratio(75.0, 4.25e-5, 1.31e-4),
    ratio(90.0, 5.74e-5, 8.44e-5),
    ratio(105.0, 6.05e-5, 8.43e-5),
    ratio(120.0, 3.26e-5, 3.92e-5),
    ratio(135.0, 1.11e-6, 2.68e-5),
    ratio(150.0, 7.80e-6, 5.73e-5),
    ratio(165.0, 2.98e-6, 7.59e-5),
    ratio(180.0, 2.30e-5, 5.79e-5),
];

/// Tenth-value layers in concrete at 6 MV, centimeters
pub const TVL_PRIMARY_CM: f64 = 34.0;
pub const TVL_LEAKAGE_CM: f64 = 29.0;
pub const TVL_SCATTER_CM: f64 = 17.3;

/// A leakage fraction keyed by gantry angle (degrees) and distance (meters)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleDistanceSample {
    pub angle: f64,
    pub distance: f64,
    pub value: f64,
}

impl AngleDistanceSample {
    fn new(angle: f64, distance: f64, value: f64) -> Self {
        Self {
            angle,
            distance,
            value,
        }
    }
}

/// Assemble the leakage interpolation input set
///
/// Measured entries (unmeasured ones skipped), fitted samples at
/// `EXTRAPOLATION_DISTANCES` for every fitted angle, and the flat 180 degree
/// samples.
pub fn leakage_samples() -> Vec<AngleDistanceSample> {
    let mut samples = Vec::with_capacity(
        LEAKAGE_ANGLES.len() * LEAKAGE_DISTANCES.len()
            + LEAKAGE_FITS.len() * EXTRAPOLATION_DISTANCES.len()
            + FLAT_FALLOFF_DISTANCES.len(),
    );

    for (angle, row) in LEAKAGE_ANGLES.iter().zip(LEAKAGE_MEASURED.iter()) {
        for (distance, value) in LEAKAGE_DISTANCES.iter().zip(row.iter()) {
            if let Some(value) = value {
                samples.push(AngleDistanceSample::new(*angle, *distance, *value));
            }
        }
    }

    for fit in &LEAKAGE_FITS {
        for &distance in &EXTRAPOLATION_DISTANCES {
            samples.push(AngleDistanceSample::new(
                fit.angle,
                distance,
                fit.eval(distance),
            ));
        }
    }

    for &distance in &FLAT_FALLOFF_DISTANCES {
        samples.push(AngleDistanceSample::new(
            FLAT_FALLOFF_ANGLE,
            distance,
            FLAT_FALLOFF_VALUE,
        ));
    }

    samples
}

/// Scatter-to-leakage ratio at `angle`, linear between tabulated angles
///
/// `None` outside [0, 180] degrees.
pub fn scatter_ratio(angle: f64) -> Option<f64> {
    let angles = SCATTER_RATIOS.map(|r| r.angle);
    let ratios = SCATTER_RATIOS.map(|r| r.ratio());
    interp_linear(&angles, &ratios, angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_set_size() {
        // 11 full rows + 2 single entries, 11 fits x 3, 5 flat
        assert_eq!(leakage_samples().len(), 11 * 6 + 2 + 33 + 5);
    }

    #[test]
    fn test_unmeasured_entries_are_skipped() {
        let samples = leakage_samples();
        assert!(!samples
            .iter()
            .any(|s| s.angle == 165.0 && s.distance != 2.0));
        assert!(samples
            .iter()
            .all(|s| s.value > 0.0 && s.value.is_finite()));
    }

    #[test]
    fn test_every_angle_but_the_last_two_has_a_fit() {
        for angle in &LEAKAGE_ANGLES[..11] {
            assert!(LEAKAGE_FITS.iter().any(|f| f.angle == *angle));
        }
        assert!(!LEAKAGE_FITS.iter().any(|f| f.angle >= 165.0));
    }

    #[test]
    fn test_fit_reproduces_first_column_roughly() {
        // The fits were made against the measured columns; at 1 m the
        // coefficient is the fitted value itself.
        let fit = LEAKAGE_FITS[3];
        assert_eq!(fit.eval(1.0), 5.93e-5);
        assert!(fit.eval(4.0) < 1.10e-5);
    }

    #[test]
    fn test_scatter_ratio_at_knots_is_exact() {
        assert_eq!(scatter_ratio(45.0), Some(1.14e-4 / 2.33e-5));
        assert_eq!(scatter_ratio(180.0), Some(5.79e-5 / 2.30e-5));
    }

    #[test]
    fn test_scatter_ratio_out_of_range() {
        assert_eq!(scatter_ratio(-1.0), None);
        assert_eq!(scatter_ratio(181.0), None);
    }
}

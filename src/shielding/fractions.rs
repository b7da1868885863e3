// Leakage, scatter and primary fractions and concrete transmission
//
// Angles are measured relative to the isocenter->couch direction, in
// degrees; distances from isocenter, in meters.

use super::clough_tocher::CloughTocher;
use super::tables::{
    leakage_samples, scatter_ratio, TVL_LEAKAGE_CM, TVL_PRIMARY_CM, TVL_SCATTER_CM,
};
use super::{Result, ShieldError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Half-width of the primary beam cone, degrees
///
/// 5 cm maximum field width at 85 cm SAD subtends 3.37 degrees.
pub const BEAM_HALF_ANGLE_DEG: f64 = 1.685;

/// Fraction of beam-on time used clinically (T-SPG-0000 B, pg 33)
const CLINICAL_DUTY_FACTOR: f64 = 1.0 / 16.0;

/// Primary transmission through the beamstopper (T-SPG-0000 B, pg 33)
const BEAMSTOPPER_TRANSMISSION: f64 = 4.0 / 100.0;

/// Source-to-axis distance, meters
const SOURCE_AXIS_DISTANCE_M: f64 = 0.85;

/// Radiation component selecting the tenth-value layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamKind {
    Prim,
    Leak,
    Scat,
}

impl BeamKind {
    pub const ALL: [BeamKind; 3] = [BeamKind::Prim, BeamKind::Leak, BeamKind::Scat];

    /// Tenth-value layer in concrete, centimeters
    pub fn tvl_cm(self) -> f64 {
        match self {
            BeamKind::Prim => TVL_PRIMARY_CM,
            BeamKind::Leak => TVL_LEAKAGE_CM,
            BeamKind::Scat => TVL_SCATTER_CM,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BeamKind::Prim => "prim",
            BeamKind::Leak => "leak",
            BeamKind::Scat => "scat",
        }
    }
}

impl fmt::Display for BeamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BeamKind {
    type Err = ShieldError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prim" => Ok(BeamKind::Prim),
            "leak" => Ok(BeamKind::Leak),
            "scat" => Ok(BeamKind::Scat),
            other => Err(ShieldError::InvalidKind(other.to_string())),
        }
    }
}

/// Transmission through `thickness_cm` of concrete
///
/// Pure exponential attenuation: `exp(-ln(10) / TVL * thickness)`.
pub fn transmission(kind: BeamKind, thickness_cm: f64) -> f64 {
    let atten_coeff = std::f64::consts::LN_10 / kind.tvl_cm();
    (-atten_coeff * thickness_cm).exp()
}

/// Transmission for a kind given by name (`prim`, `leak` or `scat`)
pub fn transmission_for(kind: &str, thickness_cm: f64) -> Result<f64> {
    Ok(transmission(kind.parse()?, thickness_cm))
}

fn check_distance(angle: f64, distance: f64) -> Result<()> {
    if !angle.is_finite() || !distance.is_finite() {
        return Err(ShieldError::DomainViolation {
            angle,
            distance,
            reason: "non-finite input",
        });
    }
    if distance <= 0.0 {
        return Err(ShieldError::DomainViolation {
            angle,
            distance,
            reason: "distance must be positive",
        });
    }
    Ok(())
}

/// Validate a query against the tabulated domain (0..=180 deg, d > 0)
fn check_tabulated(angle: f64, distance: f64) -> Result<()> {
    check_distance(angle, distance)?;
    if !(0.0..=180.0).contains(&angle) {
        return Err(ShieldError::DomainViolation {
            angle,
            distance,
            reason: "angle must lie in [0, 180] degrees",
        });
    }
    Ok(())
}

/// Shielding model with the leakage interpolant built from the published tables
///
/// Immutable once built; share it freely between threads.
#[derive(Debug, Clone)]
pub struct ShieldingModel {
    leakage: CloughTocher,
}

impl ShieldingModel {
    /// Build the leakage interpolant from the constant tables
    pub fn new() -> Result<Self> {
        let samples = leakage_samples();
        let points = samples.iter().map(|s| [s.angle, s.distance]).collect();
        let values = samples.iter().map(|s| s.value).collect();
        let leakage = CloughTocher::new(points, values)?;

        tracing::debug!(
            samples = samples.len(),
            triangles = leakage.mesh().triangles().len(),
            "leakage interpolant built"
        );

        Ok(Self { leakage })
    }

    /// Leakage fraction at `(angle, distance)`
    ///
    /// # Errors
    /// - `DomainViolation` for angles outside [0, 180], non-positive distance
    ///   or non-finite input
    /// - `OutsideSupport` beyond the sampled region (distances under 0.5 m or
    ///   over 7 m, or the 165-180 degree corner beyond 3.5 m)
    pub fn leak_fraction(&self, angle: f64, distance: f64) -> Result<f64> {
        check_tabulated(angle, distance)?;
        self.leakage
            .evaluate(angle, distance)
            .ok_or(ShieldError::OutsideSupport { angle, distance })
    }

    /// Scatter fraction: scatter/leakage ratio at `angle` times the leakage fraction
    pub fn scat_fraction(&self, angle: f64, distance: f64) -> Result<f64> {
        check_tabulated(angle, distance)?;
        let scatter_per_leakage =
            scatter_ratio(angle).ok_or(ShieldError::DomainViolation {
                angle,
                distance,
                reason: "angle outside the scatter ratio table",
            })?;
        Ok(scatter_per_leakage * self.leak_fraction(angle, distance)?)
    }

    /// Primary fraction, cGy/MU, see [`prim_fraction`]
    pub fn prim_fraction(&self, angle: f64, distance: f64) -> Result<f64> {
        prim_fraction(angle, distance)
    }
}

/// Leakage fraction from a freshly built model
pub fn leak_fraction(angle: f64, distance: f64) -> Result<f64> {
    check_tabulated(angle, distance)?;
    ShieldingModel::new()?.leak_fraction(angle, distance)
}

/// Scatter fraction from a freshly built model
pub fn scat_fraction(angle: f64, distance: f64) -> Result<f64> {
    check_tabulated(angle, distance)?;
    ShieldingModel::new()?.scat_fraction(angle, distance)
}

/// Primary fraction in cGy/MU with inverse square and beamstopper attenuation
///
/// Non-zero only inside the beam cones around 90 and 270 degrees (bounds
/// inclusive). Accepts angles in [0, 360).
pub fn prim_fraction(angle: f64, distance: f64) -> Result<f64> {
    check_distance(angle, distance)?;
    if !(0.0..360.0).contains(&angle) {
        return Err(ShieldError::DomainViolation {
            angle,
            distance,
            reason: "angle must lie in [0, 360) degrees",
        });
    }

    let in_cone = |center: f64| {
        angle >= center - BEAM_HALF_ANGLE_DEG && angle <= center + BEAM_HALF_ANGLE_DEG
    };
    if !in_cone(90.0) && !in_cone(270.0) {
        return Ok(0.0);
    }

    let mut primary = CLINICAL_DUTY_FACTOR;
    primary *= BEAMSTOPPER_TRANSMISSION;
    primary *= (SOURCE_AXIS_DISTANCE_M / distance).powi(2);
    Ok(primary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beam_kind_round_trip_names() {
        for kind in BeamKind::ALL {
            assert_eq!(kind.as_str().parse::<BeamKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_invalid_kind() {
        let err = "neutron".parse::<BeamKind>().unwrap_err();
        assert_eq!(err, ShieldError::InvalidKind("neutron".to_string()));
        assert!(transmission_for("PRIM", 10.0).is_err());
    }

    #[test]
    fn test_transmission_decreases_with_thickness() {
        for kind in BeamKind::ALL {
            assert!(transmission(kind, 10.0) > transmission(kind, 20.0));
        }
    }

    #[test]
    fn test_scatter_attenuates_fastest() {
        let t = 50.0;
        assert!(transmission(BeamKind::Scat, t) < transmission(BeamKind::Leak, t));
        assert!(transmission(BeamKind::Leak, t) < transmission(BeamKind::Prim, t));
    }

    #[test]
    fn test_prim_fraction_cone_bounds() {
        assert!(prim_fraction(90.0 - BEAM_HALF_ANGLE_DEG, 1.0).unwrap() > 0.0);
        assert!(prim_fraction(90.0 + BEAM_HALF_ANGLE_DEG, 1.0).unwrap() > 0.0);
        assert_eq!(prim_fraction(88.3, 1.0).unwrap(), 0.0);
        assert_eq!(prim_fraction(91.7, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_prim_fraction_at_sad() {
        // At the source-axis distance only duty factor and beamstopper remain
        let p = prim_fraction(90.0, 0.85).unwrap();
        assert!((p - 0.0025).abs() < 1e-15);
    }

    #[test]
    fn test_prim_fraction_domain() {
        assert!(prim_fraction(360.0, 1.0).is_err());
        assert!(prim_fraction(-1.0, 1.0).is_err());
        assert!(prim_fraction(90.0, 0.0).is_err());
        assert!(prim_fraction(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_check_tabulated() {
        assert!(check_tabulated(0.0, 0.1).is_ok());
        assert!(check_tabulated(180.0, 7.0).is_ok());
        assert!(matches!(
            check_tabulated(180.5, 1.0),
            Err(ShieldError::DomainViolation { .. })
        ));
        assert!(matches!(
            check_tabulated(45.0, -2.0),
            Err(ShieldError::DomainViolation { .. })
        ));
    }
}

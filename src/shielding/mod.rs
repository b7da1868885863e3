// Treatment vault shielding model
//
// Leakage, scatter and primary-beam fractions for a helical tomotherapy
// unit, plus concrete transmission by tenth-value layer.
//
// Data sources:
// - Accuray TomoTherapy Site Planning Guide (T-SPG-0000 B): leakage table
//   (pg 31), power-law extrapolation fits (pg 32), scatter ratios and
//   primary beam factors (pg 33), primary/leakage TVLs (pg 35)
// - NCRP 49, Fig. 10: scatter TVL at 90 degrees
//
// Leakage is only measured on a sparse grid between 1 m and 3.5 m, with
// holes at 165/180 degrees. The grid is extended with power-law samples at
// 0.5, 4 and 7 m and interpolated as scattered data with a Clough-Tocher
// cubic over a Delaunay triangulation of the raw (angle, distance) pairs.

mod clough_tocher;
mod fractions;
mod tables;
mod triangulation;

pub use clough_tocher::CloughTocher;
pub use fractions::{
    leak_fraction, prim_fraction, scat_fraction, transmission, transmission_for, BeamKind,
    ShieldingModel, BEAM_HALF_ANGLE_DEG,
};
pub use tables::{leakage_samples, scatter_ratio, AngleDistanceSample, PowerLawFit, ScatterRatio};
pub use triangulation::Triangulation;

use thiserror::Error;

/// Errors raised by the shielding model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShieldError {
    #[error("Invalid kind: '{0}' (expected prim, leak or scat)")]
    InvalidKind(String),

    #[error("Domain violation at angle={angle} deg, distance={distance} m: {reason}")]
    DomainViolation {
        angle: f64,
        distance: f64,
        reason: &'static str,
    },

    #[error("Point (angle={angle} deg, distance={distance} m) lies outside the leakage data support")]
    OutsideSupport { angle: f64, distance: f64 },

    #[error("Triangulation failed: {0}")]
    Triangulation(String),
}

pub type Result<T> = std::result::Result<T, ShieldError>;

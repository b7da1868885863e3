// Vault plan: workload plus the points of interest around the bunker
//
// Plans are TOML files with an optional [workload] table and one [[point]]
// table per location. The reference plan is embedded in the binary.

use super::config::WorkloadConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Embedded reference plan (TomoTherapy HDA vault)
const REFERENCE_PLAN_TOML: &str = include_str!("../../vault-reference.toml");

/// A point of interest outside the vault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultPoint {
    /// Human-readable label, not required to be unique
    pub location: String,

    /// Distance from isocenter, meters
    pub distance: f64,

    /// Angle from the isocenter->couch direction, degrees
    pub angle: f64,

    /// Concrete between isocenter and the point, centimeters
    pub thickness: f64,

    /// Occupancy factor
    pub occupancy: f64,

    /// Controlled area (radiation workers) or uncontrolled (public)
    pub controlled: bool,
}

impl VaultPoint {
    /// Weekly dose limit for the area, mrem/week
    pub fn weekly_limit(&self) -> f64 {
        if self.controlled {
            super::report::CONTROLLED_LIMIT_MREM_PER_WEEK
        } else {
            super::report::UNCONTROLLED_LIMIT_MREM_PER_WEEK
        }
    }

    /// Validate point geometry
    pub fn validate(&self) -> Result<(), String> {
        if !self.distance.is_finite() || self.distance <= 0.0 {
            return Err(format!(
                "{}: distance must be positive, got {}",
                self.location, self.distance
            ));
        }

        if !(0.0..=180.0).contains(&self.angle) {
            return Err(format!(
                "{}: angle must be in [0, 180], got {}",
                self.location, self.angle
            ));
        }

        if !self.thickness.is_finite() || self.thickness < 0.0 {
            return Err(format!(
                "{}: thickness must be non-negative, got {}",
                self.location, self.thickness
            ));
        }

        if self.occupancy.is_nan() || self.occupancy <= 0.0 || self.occupancy > 1.0 {
            return Err(format!(
                "{}: occupancy must be in (0, 1], got {}",
                self.location, self.occupancy
            ));
        }

        Ok(())
    }
}

/// Workload and ordered points of a vault
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VaultPlan {
    #[serde(default)]
    pub workload: WorkloadConfig,

    #[serde(default, rename = "point")]
    pub points: Vec<VaultPoint>,
}

impl VaultPlan {
    /// Parse and validate a plan from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let plan: VaultPlan = toml::from_str(content).context("Failed to parse vault plan")?;
        plan.validate().map_err(anyhow::Error::msg)?;
        Ok(plan)
    }

    /// Load a plan from a TOML file
    pub fn from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read vault plan {}", path.display()))?;
        let plan = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid vault plan {}", path.display()))?;

        tracing::debug!(
            path = %path.display(),
            points = plan.points.len(),
            "vault plan loaded"
        );

        Ok(plan)
    }

    /// The embedded reference plan
    pub fn reference() -> Result<Self> {
        Self::from_toml_str(REFERENCE_PLAN_TOML).context("Embedded reference plan is invalid")
    }

    /// Validate the workload and every point
    pub fn validate(&self) -> Result<(), String> {
        self.workload.validate()?;

        if self.points.is_empty() {
            return Err("plan has no points".to_string());
        }

        for point in &self.points {
            point.validate()?;
        }

        Ok(())
    }
}

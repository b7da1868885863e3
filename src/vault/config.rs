// Treatment workload configuration
//
// Weekly monitor units drive primary and leakage; weekly cGy at isocenter
// drives patient scatter.

use serde::{Deserialize, Serialize};

/// Clinic workload used to derive the weekly dose basis
///
/// # Example
/// ```
/// use vaultshield::vault::WorkloadConfig;
///
/// let workload = WorkloadConfig::default().weekly_workload();
/// assert_eq!(workload.cgy, 50_000.0);
/// assert_eq!(workload.monitor_units, 800_000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Average prescribed dose per patient, cGy
    pub patient_dose_cgy: f64,

    /// Patients treated per day, average
    pub patients_per_day: u32,

    /// Treatment days per week
    pub days_per_week: u32,

    /// Monitor units delivered per cGy at isocenter
    ///
    /// Helical delivery is inefficient; the planning guide (pg 32) uses 16.
    pub mu_per_cgy: f64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            patient_dose_cgy: 200.0,
            patients_per_day: 50,
            days_per_week: 5,
            mu_per_cgy: 16.0,
        }
    }
}

impl WorkloadConfig {
    /// Weekly cGy and MU derived from the workload
    pub fn weekly_workload(&self) -> WeeklyWorkload {
        let cgy =
            self.patient_dose_cgy * f64::from(self.patients_per_day) * f64::from(self.days_per_week);
        WeeklyWorkload {
            monitor_units: cgy * self.mu_per_cgy,
            cgy,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.patient_dose_cgy.is_finite() || self.patient_dose_cgy <= 0.0 {
            return Err(format!(
                "patient_dose_cgy must be positive, got {}",
                self.patient_dose_cgy
            ));
        }

        if self.days_per_week == 0 || self.days_per_week > 7 {
            return Err(format!(
                "days_per_week must be in [1, 7], got {}",
                self.days_per_week
            ));
        }

        if !self.mu_per_cgy.is_finite() || self.mu_per_cgy <= 0.0 {
            return Err(format!(
                "mu_per_cgy must be positive, got {}",
                self.mu_per_cgy
            ));
        }

        Ok(())
    }
}

/// Weekly dose basis for a vault report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyWorkload {
    /// Monitor units per week
    pub monitor_units: f64,
    /// cGy at isocenter per week
    pub cgy: f64,
}

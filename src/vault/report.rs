// Weekly dose report for the points of a vault plan

use super::config::WeeklyWorkload;
use super::plan::VaultPoint;
use crate::shielding::{transmission, BeamKind, ShieldingModel};
use serde::{Deserialize, Serialize};

/// Weekly dose limit for controlled areas, mrem/week
pub const CONTROLLED_LIMIT_MREM_PER_WEEK: f64 = 100.0;

/// Weekly dose limit for uncontrolled areas, mrem/week
pub const UNCONTROLLED_LIMIT_MREM_PER_WEEK: f64 = 2.0;

const MREM_PER_CGY: f64 = 1000.0;

/// Header line of the text report
pub const REPORT_HEADER: &str = "# Location   mrem/wk   Limit    Primary  Leakage    Scatter";

/// Dose contributions at one point, mrem/week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseRow {
    /// 1-based position in the plan
    pub index: usize,
    pub location: String,
    pub total_mrem_per_week: f64,
    pub limit_mrem_per_week: f64,
    pub primary: f64,
    pub leakage: f64,
    pub scatter: f64,
}

impl DoseRow {
    pub fn exceeds_limit(&self) -> bool {
        self.total_mrem_per_week > self.limit_mrem_per_week
    }

    /// Fixed-width text line
    pub fn to_report_line(&self) -> String {
        format!(
            "{:<2}{:<9}{:>9.4}{:>8}{:>11.4}{:>11.4}{:>11.4}",
            self.index,
            self.location,
            self.total_mrem_per_week,
            self.limit_mrem_per_week,
            self.primary,
            self.leakage,
            self.scatter
        )
    }
}

/// Report rows in plan order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseReport {
    pub workload: WeeklyWorkload,
    pub rows: Vec<DoseRow>,
}

impl DoseReport {
    /// Rows whose total exceeds the area limit
    pub fn violations(&self) -> impl Iterator<Item = &DoseRow> {
        self.rows.iter().filter(|row| row.exceeds_limit())
    }

    /// Header plus one fixed-width line per row
    pub fn to_report_string(&self) -> String {
        let mut output = String::new();
        output.push_str(REPORT_HEADER);
        output.push('\n');
        for row in &self.rows {
            output.push_str(&row.to_report_line());
            output.push('\n');
        }
        output
    }
}

/// Compute the weekly dose at every point
///
/// Primary and leakage scale with monitor units, patient scatter with cGy
/// delivered at isocenter. Each component is attenuated through the point's
/// concrete with its own TVL and weighted by occupancy.
pub fn generate_report(
    model: &ShieldingModel,
    workload: &WeeklyWorkload,
    points: &[VaultPoint],
) -> crate::shielding::Result<DoseReport> {
    let mut rows = Vec::with_capacity(points.len());

    for (i, point) in points.iter().enumerate() {
        let weight = point.occupancy * MREM_PER_CGY;

        let primary = workload.monitor_units
            * model.prim_fraction(point.angle, point.distance)?
            * transmission(BeamKind::Prim, point.thickness)
            * weight;
        let leakage = workload.monitor_units
            * model.leak_fraction(point.angle, point.distance)?
            * transmission(BeamKind::Leak, point.thickness)
            * weight;
        let scatter = workload.cgy
            * model.scat_fraction(point.angle, point.distance)?
            * transmission(BeamKind::Scat, point.thickness)
            * weight;

        let row = DoseRow {
            index: i + 1,
            location: point.location.clone(),
            total_mrem_per_week: primary + leakage + scatter,
            limit_mrem_per_week: point.weekly_limit(),
            primary,
            leakage,
            scatter,
        };

        tracing::debug!(
            index = row.index,
            location = %row.location,
            total = row.total_mrem_per_week,
            limit = row.limit_mrem_per_week,
            "dose row"
        );
        if row.exceeds_limit() {
            tracing::warn!(
                location = %row.location,
                total = row.total_mrem_per_week,
                limit = row.limit_mrem_per_week,
                "weekly dose exceeds limit"
            );
        }

        rows.push(row);
    }

    Ok(DoseReport {
        workload: *workload,
        rows,
    })
}

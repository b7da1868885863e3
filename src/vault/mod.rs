// Vault Dose Report
//
// Weekly dose equivalent at points of interest around a helical tomotherapy
// vault. Each point receives three contributions:
//
// - Primary:  MU/week x prim_fraction x T_prim(thickness) x occupancy
// - Leakage:  MU/week x leak_fraction x T_leak(thickness) x occupancy
// - Scatter: cGy/week x scat_fraction x T_scat(thickness) x occupancy
//
// converted from cGy to mrem and compared against the weekly limit of the
// area (100 mrem/week controlled, 2 mrem/week uncontrolled).
//
// Workload and geometry come from a TOML plan; the survey of the reference
// installation is embedded and used when no plan is given.

mod config;
mod plan;
mod report;

pub use config::{WeeklyWorkload, WorkloadConfig};
pub use plan::{VaultPlan, VaultPoint};
pub use report::{
    generate_report, DoseReport, DoseRow, CONTROLLED_LIMIT_MREM_PER_WEEK, REPORT_HEADER,
    UNCONTROLLED_LIMIT_MREM_PER_WEEK,
};

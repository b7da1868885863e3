//! Vaultshield - shielding estimates for helical tomotherapy vaults
//!
//! This library computes weekly dose at points around a treatment vault from
//! the published leakage, scatter and primary-beam tables, and separates
//! beam-on from beam-off periods in survey meter logs.

pub mod cli;
pub mod csv_output;
pub mod geiger_log;
pub mod json_output;
pub mod numeric;
pub mod shielding;
pub mod threshold;
pub mod vault;

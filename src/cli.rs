//! CLI argument parsing for vaultshield

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for reports and analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "vaultshield")]
#[command(version)]
#[command(
    about = "Treatment vault shielding estimates and beam-on detection for survey logs",
    long_about = None
)]
pub struct Cli {
    /// Enable debug tracing output (to stderr)
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Weekly dose at the points of a vault plan
    Report {
        /// Vault plan (TOML); the embedded reference vault when omitted
        #[arg(long = "plan", value_name = "FILE")]
        plan: Option<PathBuf>,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Separate beam-on from beam-off minutes in a bGeigie log
    Threshold {
        /// bGeigie Nano log file
        #[arg(value_name = "LOG")]
        log: PathBuf,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Check the model against reference values and print the reference report
    SelfTest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_report_defaults() {
        let cli = Cli::parse_from(["vaultshield", "report"]);
        assert!(!cli.debug);
        match cli.command {
            Command::Report { plan, format } => {
                assert!(plan.is_none());
                assert_eq!(format, OutputFormat::Text);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_report_with_plan_and_format() {
        let cli = Cli::parse_from([
            "vaultshield",
            "report",
            "--plan",
            "vault.toml",
            "--format",
            "json",
        ]);
        match cli.command {
            Command::Report { plan, format } => {
                assert_eq!(plan, Some(PathBuf::from("vault.toml")));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_threshold() {
        let cli = Cli::parse_from(["vaultshield", "threshold", "long_room.log", "--format", "csv"]);
        match cli.command {
            Command::Threshold { log, format } => {
                assert_eq!(log, PathBuf::from("long_room.log"));
                assert_eq!(format, OutputFormat::Csv);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_debug_is_global() {
        let cli = Cli::parse_from(["vaultshield", "self-test", "--debug"]);
        assert!(cli.debug);
        assert!(matches!(cli.command, Command::SelfTest));

        let cli = Cli::parse_from(["vaultshield", "--debug", "report"]);
        assert!(cli.debug);
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["vaultshield"]).is_err());
    }

    #[test]
    fn test_cli_threshold_requires_log() {
        assert!(Cli::try_parse_from(["vaultshield", "threshold"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["vaultshield", "report", "--format", "xml"]).is_err());
    }
}

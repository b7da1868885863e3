use anyhow::{ensure, Context, Result};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use vaultshield::cli::{Cli, Command, OutputFormat};
use vaultshield::csv_output;
use vaultshield::geiger_log::GeigerLog;
use vaultshield::json_output::{JsonBeamAnalysis, JsonDoseReport};
use vaultshield::shielding::{prim_fraction, transmission, BeamKind, ShieldingModel};
use vaultshield::threshold::BeamSummary;
use vaultshield::vault::{generate_report, DoseReport, VaultPlan};

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn build_report(plan: &VaultPlan) -> Result<DoseReport> {
    let model = ShieldingModel::new().context("Failed to build shielding model")?;
    let report = generate_report(&model, &plan.workload.weekly_workload(), &plan.points)?;
    Ok(report)
}

fn run_report(plan_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let plan = match plan_path {
        Some(path) => VaultPlan::from_toml(path)?,
        None => VaultPlan::reference()?,
    };
    let report = build_report(&plan)?;

    match format {
        OutputFormat::Text => print!("{}", report.to_report_string()),
        OutputFormat::Json => println!("{}", JsonDoseReport::from_report(&report).to_json()?),
        OutputFormat::Csv => print!("{}", csv_output::report_to_csv(&report)),
    }
    Ok(())
}

fn print_beam_summary(summary: &BeamSummary) {
    println!("Threshold: {} cpm", summary.threshold.value);
    println!(
        "Samples: {} ({} beam-on)",
        summary.total_samples, summary.beam_on_samples
    );
    println!("Beam periods: {}", summary.periods.len());
    for period in &summary.periods {
        println!(
            "  {} .. {}  {:>4} samples  peak {} cpm",
            period.start.format("%Y-%m-%d %H:%M:%S"),
            period.end.format("%H:%M:%S"),
            period.samples,
            period.peak_cpm
        );
    }
}

fn run_threshold(log_path: &Path, format: OutputFormat) -> Result<()> {
    let log = GeigerLog::from_file(log_path)
        .with_context(|| format!("Failed to read log {}", log_path.display()))?;
    let summary = BeamSummary::from_log(&log)
        .with_context(|| format!("Cannot threshold {}", log_path.display()))?;

    match format {
        OutputFormat::Text => print_beam_summary(&summary),
        OutputFormat::Json => println!("{}", JsonBeamAnalysis::new(&log, &summary).to_json()?),
        OutputFormat::Csv => print!(
            "{}",
            csv_output::series_to_csv(&log, summary.threshold.value)
        ),
    }
    Ok(())
}

/// Regression checks against published values, then the reference report
fn run_self_test() -> Result<()> {
    let model = ShieldingModel::new().context("Failed to build shielding model")?;

    let leak = model.leak_fraction(45.0, 2.0)?;
    ensure!(leak == 2.33e-5, "leak_fraction(45, 2) = {} (expected 2.33e-5)", leak);

    let scat = model.scat_fraction(45.0, 2.0)?;
    ensure!(scat == 1.14e-4, "scat_fraction(45, 2) = {} (expected 1.14e-4)", scat);

    for (kind, tvl) in [(BeamKind::Prim, 34.0), (BeamKind::Leak, 29.0), (BeamKind::Scat, 17.3)] {
        let t = transmission(kind, tvl);
        ensure!((t - 0.1).abs() < 1e-12, "transmission({}, {}) = {}", kind, tvl, t);
        ensure!(transmission(kind, 0.0) == 1.0, "transmission({}, 0) != 1", kind);
    }

    ensure!(
        prim_fraction(90.0, 1.0)? > 0.0 && prim_fraction(270.0, 1.0)? > 0.0,
        "primary beam missing at 90/270 degrees"
    );
    ensure!(
        prim_fraction(95.0, 1.0)? == 0.0,
        "primary beam outside the beam cone"
    );

    let plan = VaultPlan::reference()?;
    let report = generate_report(&model, &plan.workload.weekly_workload(), &plan.points)?;
    let maze = report
        .rows
        .iter()
        .find(|row| row.location == "Maze")
        .context("reference plan has no Maze point")?;
    ensure!(
        maze.exceeds_limit(),
        "Maze total {:.4} mrem/wk should exceed its limit",
        maze.total_mrem_per_week
    );

    print!("{}", report.to_report_string());
    eprintln!("Self-test passed");
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    match args.command {
        Command::Report { plan, format } => run_report(plan.as_deref(), format),
        Command::Threshold { log, format } => run_threshold(&log, format),
        Command::SelfTest => run_self_test(),
    }
}

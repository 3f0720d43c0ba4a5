//! SlotSim command-line driver
//!
//! Replays scripted workloads against the simulated allocator and prints
//! the resulting utilization.
//!
//! # Examples
//!
//! ```bash
//! # Replay a workload in paged mode
//! slotsim run --workload demo.json
//!
//! # Same workload, both strategies side by side
//! slotsim compare --workload demo.json --seed 7
//!
//! # Show the effective configuration
//! slotsim --config slotsim.toml config
//! ```

use clap::{Args, Parser, Subcommand};
use slotsim::memory::{AllocationMode, Simulator, UtilizationReport};
use slotsim::workload::{StepResult, Workload};
use slotsim::SimulatorConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// SlotSim - static vs. paged memory allocation simulator
#[derive(Parser, Debug)]
#[command(name = "slotsim")]
#[command(version = slotsim::VERSION)]
#[command(about = "Static vs. paged memory allocation simulator", long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(long, global = true, env = "SLOTSIM_CONFIG")]
    config: Option<PathBuf>,

    /// Allocation mode (standard, paged); overrides the configuration
    #[arg(long, global = true)]
    mode: Option<AllocationMode>,

    /// Page selection seed; overrides the configuration
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log directory path
    #[arg(long, global = true, default_value = "logs", env = "SLOTSIM_LOG_DIR")]
    log_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a workload in the configured mode
    Run(WorkloadArgs),

    /// Replay a workload in both modes and compare the reports
    Compare(WorkloadArgs),

    /// Print the effective configuration
    Config,

    /// Show version
    Version,
}

#[derive(Args, Debug)]
struct WorkloadArgs {
    /// Workload file (JSON)
    #[arg(short, long)]
    workload: PathBuf,

    /// Print every step result
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    let mut config = SimulatorConfig::load(cli.config.as_deref())?;
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    match &cli.command {
        Commands::Run(args) => run_command(&cli, config, args),
        Commands::Compare(args) => compare_command(&cli, config, args),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Commands::Version => {
            println!("SlotSim {}", slotsim::VERSION);
            Ok(())
        }
    }
}

/// Setup logging with rolling files and console output
fn setup_logging(cli: &Cli) -> anyhow::Result<()> {
    std::fs::create_dir_all(&cli.log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &cli.log_dir, "slotsim.log");

    let log_level = cli
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!cli.no_color),
        )
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    Ok(())
}

/// Run command - replay one workload
fn run_command(cli: &Cli, config: SimulatorConfig, args: &WorkloadArgs) -> anyhow::Result<()> {
    let workload = Workload::from_file(&args.workload)?;
    let mut simulator = Simulator::new(config)?;
    info!(mode = %simulator.mode(), "Replaying workload");

    let results = workload.replay(&mut simulator);
    if args.verbose {
        print_steps(cli, &results)?;
    }

    let report = simulator.report();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Mode: {}", simulator.mode());
        println!("{}", report);
        println!("Evictions: {}", count_evictions(&results));
    }
    Ok(())
}

/// Compare command - replay one workload per mode
fn compare_command(cli: &Cli, config: SimulatorConfig, args: &WorkloadArgs) -> anyhow::Result<()> {
    let workload = Workload::from_file(&args.workload)?;

    let mut reports = Vec::new();
    for mode in [AllocationMode::Standard, AllocationMode::Paged] {
        let mut simulator = Simulator::new(SimulatorConfig {
            mode,
            ..config.clone()
        })?;
        let results = workload.replay(&mut simulator);
        if args.verbose {
            println!("── {} ──", mode);
            print_steps(cli, &results)?;
        }
        reports.push((mode, simulator.report(), count_evictions(&results)));
    }

    if cli.json {
        let json: serde_json::Map<String, serde_json::Value> = reports
            .iter()
            .map(|(mode, report, _)| -> anyhow::Result<(String, serde_json::Value)> {
                Ok((mode.to_string(), serde_json::to_value(report)?))
            })
            .collect::<anyhow::Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!(
        "{:<10} {:>10} {:>6} {:>6} {:>7} {:>10} {:>9}",
        "mode", "occupied", "data", "waste", "waste%", "efficiency", "evictions"
    );
    println!("───────────────────────────────────────────────────────────────────");
    for (mode, report, evictions) in &reports {
        print_row(*mode, report, *evictions);
    }
    Ok(())
}

fn print_row(mode: AllocationMode, report: &UtilizationReport, evictions: usize) {
    println!(
        "{:<10} {:>10} {:>6} {:>6} {:>6}% {:>10} {:>9}",
        mode.to_string(),
        format!("{}/{}", report.occupied_slots, report.total_slots),
        report.actual_data_slots,
        report.waste_slots,
        report.waste_rate_pct,
        report.efficiency_score,
        evictions
    );
}

fn print_steps(cli: &Cli, results: &[StepResult]) -> anyhow::Result<()> {
    for result in results {
        if cli.json {
            println!("{}", serde_json::to_string(result)?);
            continue;
        }
        match result {
            StepResult::Admitted { id, outcome } => {
                let ranges: Vec<String> =
                    outcome.allocated_slots.iter().map(ToString::to_string).collect();
                println!("  + {} at {}", id, ranges.join(" "));
                for victim in &outcome.evicted_request_ids {
                    println!("    evicted {}", victim);
                }
            }
            StepResult::Released { id } => println!("  - {}", id),
            StepResult::Idle => println!("  - (nothing live)"),
            StepResult::Reset { mode } => println!("  * reset to {}", mode),
            StepResult::Failed { error } => println!("  ! {}", error),
        }
    }
    Ok(())
}

fn count_evictions(results: &[StepResult]) -> usize {
    results
        .iter()
        .map(|r| match r {
            StepResult::Admitted { outcome, .. } => outcome.evicted_request_ids.len(),
            _ => 0,
        })
        .sum()
}

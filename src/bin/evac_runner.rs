//! Headless Evacuation Runner
//!
//! Runs one evacuation of an ASCII building and prints a summary.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use evac_ca::agent::Individual;
use evac_ca::core::types::AgentId;
use evac_ca::grid::parse_layout;
use evac_ca::simulation::RunSummary;
use evac_ca::stats::{CellStatistics, CellStatisticsSummary};
use evac_ca::{EvacError, Simulation, SimulationConfig};

/// Headless Evacuation Runner - one run, summary on stdout
#[derive(Parser, Debug)]
#[command(name = "evac_runner")]
#[command(about = "Run a cellular automaton evacuation of an ASCII building")]
struct Args {
    /// ASCII building: `.` room, `@` start, `E` exit, `S` save, `D` door
    #[arg(long)]
    layout: PathBuf,

    /// TOML configuration; defaults are used for missing keys
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed, overrides the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Step limit, overrides the configuration
    #[arg(long)]
    max_steps: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Write the action log as JSON
    #[arg(long)]
    log: Option<PathBuf>,
}

/// JSON output structure
#[derive(Serialize)]
struct RunReport {
    seed: u64,
    summary: RunSummary,
    statistics: CellStatisticsSummary,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("evac_ca=info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), EvacError> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(max_steps) = args.max_steps {
        config.max_steps = max_steps;
    }
    config.validate()?;

    let text = std::fs::read_to_string(&args.layout)?;
    let layout = parse_layout(&text)?;
    let seed = config.seed;

    let mut sim = Simulation::new(layout.grid, config)?.with_statistics(CellStatistics::new());
    for (i, &cell) in layout.starts.iter().enumerate() {
        sim.add_individual(Individual::new(AgentId(i as u32)), cell)?;
    }

    let summary = sim.run()?;

    if let Some(path) = &args.log {
        let json = serde_json::to_string_pretty(sim.log())
            .map_err(|e| EvacError::InvalidConfig(format!("cannot encode action log: {}", e)))?;
        std::fs::write(path, json)?;
    }

    let report = RunReport {
        seed,
        summary,
        statistics: sim.statistics().summary(),
    };

    if args.format == "json" {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: cannot encode report: {}", e),
        }
    } else {
        let s = &report.summary;
        println!("=== Evacuation (seed {}) ===", report.seed);
        println!("Steps: {}", s.steps);
        println!("Individuals: {}", s.individuals);
        println!("Evacuated: {}", s.evacuated);
        println!("Safe: {}", s.safe);
        println!(
            "Dead: {} (exit unreachable {}, not enough time {})",
            s.died_exit_unreachable + s.died_not_enough_time,
            s.died_exit_unreachable,
            s.died_not_enough_time
        );
        if let Some(time) = s.last_evacuation {
            println!("Last evacuation at: {:.2}", time);
        }
        println!("Waiting steps: {}", report.statistics.total_waiting_steps);
        println!("Actions logged: {}", s.actions);
    }
    Ok(())
}

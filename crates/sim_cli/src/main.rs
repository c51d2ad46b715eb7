use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sim_core::scenario::ScenarioParams;
use sim_core::simulation::Simulation;

mod report;

/// Discrete-event simulation of a mining haul fleet cycling against a fixed
/// pool of unloading stations.
#[derive(Parser)]
#[command(name = "haulsim")]
struct Cli {
    /// Number of trucks in the simulation. Must be >= 1.
    #[arg(short = 'n', long = "trucks", value_parser = clap::value_parser!(u64).range(1..))]
    trucks: u64,

    /// Number of unloading stations in the simulation. Must be >= 1.
    #[arg(short = 'm', long = "stations", value_parser = clap::value_parser!(u64).range(1..))]
    stations: u64,

    /// Seed for the mining duration generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    println!(
        "Starting simulation with trucks={}, stations={}",
        cli.trucks, cli.stations
    );

    let params = ScenarioParams::new(cli.trucks as usize, cli.stations as usize).with_seed(cli.seed);
    let mut sim = match Simulation::new(params) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let begin = Instant::now();
    match sim.run() {
        Ok(elapsed) => {
            report::print_summary(&sim, elapsed, begin.elapsed());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("simulation aborted: {err}");
            ExitCode::FAILURE
        }
    }
}

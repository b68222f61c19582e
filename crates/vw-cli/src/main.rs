//! Command-line driver for Virtual World simulations.

mod commands;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "vw",
    about = "Virtual World - a discrete-event tile world simulator",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log filter (e.g. "debug", "vw_simulation=trace"); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a seeded demo world and run it for a number of driver steps
    Simulate(commands::simulate::SimulateArgs),

    /// Print the default simulation configuration as JSON
    Defaults,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result = match cli.command {
        Commands::Simulate(args) => commands::simulate::run(&args),
        Commands::Defaults => commands::defaults::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

//! Flock CLI - boid flocking search from the command line.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{InstanceKind, VariantKind};

#[derive(Parser)]
#[command(name = "flock")]
#[command(author, version, about = "Flock - boid flocking search for paths and tours", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default flocking.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Run one solve and print the converged tour
    Solve {
        /// Instance to generate (overrides the config file)
        #[arg(short, long, value_enum)]
        instance: Option<InstanceKind>,

        /// Number of cities for generated instances
        #[arg(short, long)]
        cities: Option<usize>,

        /// Look for a path ending at this node instead of a closed tour
        #[arg(short, long)]
        end_node: Option<usize>,

        /// Solve seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Tick budget
        #[arg(short = 'n', long)]
        max_iterations: Option<u64>,

        /// Simulation variant
        #[arg(long, value_enum)]
        variant: Option<VariantKind>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sweep one parameter and report success rate and tour cost
    Sweep {
        /// Parameter to vary
        #[arg(short, long, value_enum)]
        param: commands::sweep::SweepParam,

        /// First value
        #[arg(long, default_value = "0.0")]
        from: f64,

        /// Last value (inclusive)
        #[arg(long, default_value = "2.0")]
        to: f64,

        /// Increment between values
        #[arg(long, default_value = "0.1")]
        step: f64,

        /// Solves per value
        #[arg(short, long, default_value = "10")]
        runs: u32,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Solve { instance, cities, end_node, seed, max_iterations, variant, json } => {
            let overrides = commands::solve::Overrides { instance, cities, end_node, seed, max_iterations, variant };
            commands::solve::run(overrides, json, cli.verbose)
        }
        Commands::Sweep { param, from, to, step, runs } => commands::sweep::run(param, from, to, step, runs),
    }
}

//! ContractFlow command-line front end
//!
//! Lists the blueprint catalog and contracts, shows contract detail, and
//! replays scripted lifecycle operations against an in-memory store.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use contractflow_logging::LogConfig;
use contractflow_store::ContractStore;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

mod cli;

use cli::config::AppConfig;
use cli::error::HelpfulError;

#[derive(Parser, Debug)]
#[command(name = "contractflow", version, about = "Contract blueprints and lifecycle management")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.contractflow/config.toml)
    #[arg(long, global = true, env = "CONTRACTFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Start with an empty store instead of the sample catalog
    #[arg(long, global = true)]
    no_seed: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List blueprints, newest first
    Blueprints(cli::blueprints::BlueprintsArgs),

    /// List contracts, optionally filtered
    Contracts(cli::contracts::ContractsArgs),

    /// Show one contract with its values and history
    Show(cli::contracts::ShowArgs),

    /// Show contract counters
    Stats(cli::stats::StatsArgs),

    /// Replay a JSON script of store operations
    Run(cli::script::RunArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(helpful) = err.downcast_ref::<HelpfulError>() {
                eprint!("{}", helpful);
            } else {
                eprintln!("ERROR: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;

    contractflow_logging::init_logging(LogConfig {
        app_name: "contractflow",
        verbose: cli.verbose,
        log_to_file: config.logging.file,
        filter: config.logging.filter.as_deref(),
    })
    .context("Failed to initialize logging")?;

    let mut store_config = config.store.clone();
    if cli.no_seed {
        store_config.seed_samples = false;
    }
    let mut store = ContractStore::from_config(&store_config).context("Failed to build store")?;
    debug!(?store, "store ready");

    match cli.command {
        Commands::Blueprints(args) => cli::blueprints::run(args, &store),
        Commands::Contracts(args) => cli::contracts::run_list(args, &store),
        Commands::Show(args) => cli::contracts::run_show(args, &store),
        Commands::Stats(args) => cli::stats::run(args, &store),
        Commands::Run(args) => cli::script::run(args, &mut store),
    }
}

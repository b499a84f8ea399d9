//! mwledger CLI Application
//!
//! Builds, inspects and validates encoded blocks.

use clap::{Parser, Subcommand};
use mw_ledger::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mwledger")]
#[command(version = "0.1.0")]
#[command(about = "MimbleWimble block and transaction validation core", long_about = None)]
struct Cli {
    /// JSON file overriding consensus parameters
    #[arg(short, long, global = true)]
    params: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and mine a sample block
    Demo {
        /// Output file for the encoded block
        #[arg(short, long)]
        output: PathBuf,

        /// Coinbase reward
        #[arg(short, long, default_value = "60")]
        reward: u64,
    },

    /// Decode a block file and print its contents
    Inspect {
        /// Encoded block file
        file: PathBuf,
    },

    /// Validate a block file against the consensus rules
    Validate {
        /// Encoded block file
        file: PathBuf,
    },

    /// Print the effective consensus parameters
    Params,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let params = cli::load_params(cli.params.as_deref())?;

    match cli.command {
        Commands::Demo { output, reward } => cli::cmd_demo(&params, &output, reward),
        Commands::Inspect { file } => cli::cmd_inspect(&file),
        Commands::Validate { file } => cli::cmd_validate(&params, &file),
        Commands::Params => cli::cmd_params(&params),
    }
}

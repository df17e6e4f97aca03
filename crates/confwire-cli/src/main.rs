//! confwire CLI
//!
//! Command-line front end for bootstrap resolution and change-batch replay

use clap::{Parser, Subcommand};
use confwire_core::logging_facility;
use confwire_core::ConfwireConfig;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "confwire")]
#[command(about = "confwire - config-center change tracking", long_about = None)]
struct Cli {
    /// TOML configuration file (logging, bootstrap and publisher sections)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve bootstrap attributes and print the system properties they set
    Bootstrap(commands::bootstrap::BootstrapArgs),
    /// Replay recorded change batches and print each published event
    Replay(commands::replay::ReplayArgs),
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfwireConfig::from_file(path),
        None => Ok(ConfwireConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", confwire_core::ExError::from(e));
            std::process::exit(1);
        }
    };

    logging_facility::init(config.logging.profile);

    let result = match cli.command {
        Commands::Bootstrap(args) => commands::bootstrap::execute(args, &config),
        Commands::Replay(args) => commands::replay::execute(args, &config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

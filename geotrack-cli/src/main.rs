//! GeoTrack CLI - Command-line interface
//!
//! Drives the GeoTrack library: simulates a population of tracked users,
//! benchmarks synchronous against pool-backed queries, and manages the
//! configuration file.

mod commands;
mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use geotrack::config::ConfigFile;
use geotrack::logging::{init_logging, LoggingGuard};
use tracing::debug;

use commands::bench::BenchArgs;
use commands::config::ConfigCommands;
use commands::simulate::SimulateArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "geotrack")]
#[command(version, about = "Track user positions and find who else is nearby", long_about = None)]
struct Cli {
    /// Path to config.ini (defaults to ~/.geotrack/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of the configured level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Place users around a center point and run one proximity query
    Simulate(SimulateArgs),

    /// Time synchronous against pool-backed proximity queries
    Bench(BenchArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(geotrack::config::config_file_path);

    match cli.command {
        // Config commands must work even when the file is invalid.
        Commands::Config(command) => commands::config::run(command, &config_path),
        Commands::Simulate(args) => {
            let (config, _guard) = load_and_start_logging(&config_path, cli.verbose)?;
            commands::simulate::run(args, &config)
        }
        Commands::Bench(args) => {
            let (config, _guard) = load_and_start_logging(&config_path, cli.verbose)?;
            commands::bench::run(args, &config)
        }
    }
}

fn load_and_start_logging(
    config_path: &Path,
    verbose: bool,
) -> Result<(ConfigFile, LoggingGuard), CliError> {
    let config = ConfigFile::load_from(config_path)?;
    let guard = start_logging(&config, verbose)?;
    debug!(path = %config_path.display(), "Configuration loaded");
    Ok((config, guard))
}

fn start_logging(config: &ConfigFile, verbose: bool) -> Result<LoggingGuard, CliError> {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    init_logging(&config.logging.directory, &config.logging.file, level)
        .map_err(|e| CliError::LoggingInit(e.to_string()))
}

//! Configuration management CLI commands.
//!
//! Provides `config init`, `config show`, and `config path`.

use std::path::Path;

use clap::Subcommand;
use geotrack::config::ConfigFile;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a config file with default values if none exists
    Init,

    /// Show the effective configuration
    Show,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against the file at `path`.
pub fn run(command: ConfigCommands, path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init => run_init(path),
        ConfigCommands::Show => run_show(path),
        ConfigCommands::Path => run_path(path),
    }
}

fn run_init(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }
    ConfigFile::ensure_exists_at(path)?;
    println!("Created {}", path.display());
    Ok(())
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path)?;
    print!("{}", render(&config));
    Ok(())
}

fn run_path(path: &Path) -> Result<(), CliError> {
    println!("{}", path.display());
    Ok(())
}

/// Effective settings, one `key = value` line per setting.
fn render(config: &ConfigFile) -> String {
    format!(
        "[pool]\n  workers = {}\n  shutdown = {}\n\n\
         [query]\n  width = {}\n  height = {}\n\n\
         [logging]\n  directory = {}\n  file = {}\n  level = {}\n",
        config.pool.workers,
        config.pool.shutdown,
        config.query.width,
        config.query.height,
        config.logging.directory.display(),
        config.logging.file,
        config.logging.level,
    )
}

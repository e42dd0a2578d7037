//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;
use std::time::Duration;

use geotrack::config::ConfigFileError;
use geotrack::pool::PoolError;
use geotrack::server::GeoServerError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Command-line argument outside its valid range
    InvalidArgument(String),
    /// Worker pool could not be started
    Pool(PoolError),
    /// Proximity query failed
    Query(GeoServerError),
    /// Asynchronous work did not finish in time
    Timeout(Duration),
    /// Failed to serialize output
    Output(serde_json::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Run 'geotrack config path' to locate the file, or");
                eprintln!("'geotrack config init' to write one with defaults.");
            }
            CliError::Pool(_) => {
                eprintln!();
                eprintln!("Try fewer workers with --workers or [pool] workers in config.ini");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Pool(e) => write!(f, "Thread pool error: {}", e),
            CliError::Query(e) => write!(f, "Query failed: {}", e),
            CliError::Timeout(waited) => write!(
                f,
                "Pool did not finish queued work within {:.1}s",
                waited.as_secs_f64()
            ),
            CliError::Output(e) => write!(f, "Failed to format output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Pool(e) => Some(e),
            CliError::Query(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<PoolError> for CliError {
    fn from(e: PoolError) -> Self {
        CliError::Pool(e)
    }
}

impl From<GeoServerError> for CliError {
    fn from(e: GeoServerError) -> Self {
        CliError::Query(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}

//! Configuration file handling for `~/.geotrack/config.ini`.
//!
//! Settings structs live in [`settings`], parsing in `parser`, and
//! serialization in `writer`. A missing file yields defaults; invalid values
//! are reported with the section and key they came from.
//!
//! # Example
//!
//! ```
//! use geotrack::config::ConfigFile;
//! use geotrack::pool::ShutdownMode;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.pool.workers, 1);
//! assert_eq!(config.pool.shutdown, ShutdownMode::Drain);
//! ```

mod file;
mod parser;
pub mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, LoggingSettings, PoolSettings, QuerySettings, DEFAULT_LOG_DIRECTORY,
    DEFAULT_LOG_FILE, DEFAULT_LOG_LEVEL, DEFAULT_QUERY_HEIGHT_METERS, DEFAULT_QUERY_WIDTH_METERS,
    MAX_WORKERS,
};

//! Settings structs for each configuration section, with their defaults.
//!
//! Each struct represents one `[section]` of the INI config file. These are
//! pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::pool::{PoolConfig, ShutdownMode, DEFAULT_WORKER_COUNT};

/// Upper bound on configured workers; larger values are clamped.
pub const MAX_WORKERS: usize = 256;

/// Default query box width in meters.
pub const DEFAULT_QUERY_WIDTH_METERS: f64 = 2010.0;

/// Default query box height in meters.
pub const DEFAULT_QUERY_HEIGHT_METERS: f64 = 4010.0;

/// Default directory for log files, relative to the working directory.
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "geotrack.log";

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Worker pool settings
    pub pool: PoolSettings,
    /// Default proximity query settings
    pub query: QuerySettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// `[pool]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Worker threads to start.
    pub workers: usize,
    /// What happens to queued work on stop.
    pub shutdown: ShutdownMode,
}

/// `[query]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySettings {
    /// Box width in meters.
    pub width: f64,
    /// Box height in meters.
    pub height: f64,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info", "geotrack=debug").
    pub level: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            pool: PoolSettings::default(),
            query: QuerySettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKER_COUNT,
            shutdown: ShutdownMode::default(),
        }
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_QUERY_WIDTH_METERS,
            height: DEFAULT_QUERY_HEIGHT_METERS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            file: DEFAULT_LOG_FILE.to_string(),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ConfigFile {
    /// Pool configuration derived from the `[pool]` section.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::default()
            .with_workers(self.pool.workers)
            .with_shutdown(self.pool.shutdown)
    }
}

/// Clamps the worker count to `1..=MAX_WORKERS`, warning when it changes.
pub(super) fn clamp_workers(value: usize) -> usize {
    let clamped = value.clamp(1, MAX_WORKERS);
    if clamped != value {
        tracing::warn!(
            requested = value,
            min = 1,
            max = MAX_WORKERS,
            "pool workers out of range, clamping to {}",
            clamped
        );
    }
    clamped
}

//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::{clamp_workers, ConfigFile};
use crate::pool::ShutdownMode;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [pool] section
    if let Some(section) = ini.section(Some("pool")) {
        if let Some(v) = section.get("workers") {
            let workers: usize = v.trim().parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "pool".to_string(),
                key: "workers".to_string(),
                value: v.to_string(),
                reason: "must be a positive integer".to_string(),
            })?;
            config.pool.workers = clamp_workers(workers);
        }
        if let Some(v) = section.get("shutdown") {
            config.pool.shutdown =
                v.parse::<ShutdownMode>()
                    .map_err(|reason| ConfigFileError::InvalidValue {
                        section: "pool".to_string(),
                        key: "shutdown".to_string(),
                        value: v.to_string(),
                        reason,
                    })?;
        }
    }

    // [query] section
    if let Some(section) = ini.section(Some("query")) {
        if let Some(v) = section.get("width") {
            config.query.width = parse_meters("width", v)?;
        }
        if let Some(v) = section.get("height") {
            config.query.height = parse_meters("height", v)?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
        if let Some(v) = section.get("level") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.level = v.to_string();
            }
        }
    }

    Ok(config)
}

/// Query dimensions must be finite and strictly positive.
fn parse_meters(key: &str, value: &str) -> Result<f64, ConfigFileError> {
    let invalid = || ConfigFileError::InvalidValue {
        section: "query".to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: "must be a positive number of meters".to_string(),
    };

    let meters: f64 = value.trim().parse().map_err(|_| invalid())?;
    if !meters.is_finite() || meters <= 0.0 {
        return Err(invalid());
    }
    Ok(meters)
}

pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

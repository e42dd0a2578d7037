//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[pool]
; Worker threads used for asynchronous proximity queries (1-256)
workers = {}
; What happens to queued work when the pool stops:
;   drain   - remaining items run before workers exit
;   discard - remaining items are dropped
shutdown = {}

[query]
; Default proximity box, in meters
width = {}
height = {}

[logging]
; Directory for the session log file (truncated on each run)
directory = {}
file = {}
; Filter used when RUST_LOG is not set (e.g. info, debug, geotrack=trace)
level = {}
"#,
        config.pool.workers,
        config.pool.shutdown,
        config.query.width,
        config.query.height,
        path_to_string(&config.logging.directory),
        config.logging.file,
        config.logging.level,
    )
}

fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

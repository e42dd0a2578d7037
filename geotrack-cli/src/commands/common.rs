//! Common types and utilities shared across CLI commands.

use std::sync::Arc;
use std::time::Duration;

use geotrack::config::ConfigFile;
use geotrack::geo::Location;
use geotrack::pool::ThreadPool;
use geotrack::server::GeoServer;
use tracing::info;

use crate::error::CliError;

/// How long a command waits for the pool to finish a query.
pub const POOL_WAIT: Duration = Duration::from_secs(30);

/// Angle between consecutive users on the placement spiral, in degrees.
const GOLDEN_ANGLE_DEGREES: f64 = 137.507_764;

/// Default center used when no coordinates are given.
pub const DEFAULT_LATITUDE: f64 = 38.0;
pub const DEFAULT_LONGITUDE: f64 = -103.0;

/// Name of the `index`-th simulated user.
pub fn user_name(index: usize) -> String {
    format!("user-{:04}", index)
}

/// Deterministic placement of `count` users on a sunflower spiral.
///
/// User 0 sits on `center`; the rest fill a disc of radius `spread` meters
/// with roughly uniform density.
pub fn spiral_placement(center: Location, count: usize, spread: f64) -> Vec<(String, Location)> {
    (0..count)
        .map(|i| {
            let meters = spread * (i as f64 / count as f64).sqrt();
            let bearing = (i as f64 * GOLDEN_ANGLE_DEGREES) % 360.0;
            (user_name(i), center.go(meters, bearing))
        })
        .collect()
}

/// Validates a command-line coordinate pair.
pub fn center_location(lat: f64, lon: f64) -> Result<Location, CliError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CliError::InvalidArgument(format!(
            "latitude {} is outside -90..=90",
            lat
        )));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(CliError::InvalidArgument(format!(
            "longitude {} is outside -180..=180",
            lon
        )));
    }
    Ok(Location::new(lat, lon))
}

/// Query box dimensions: flags override the `[query]` section.
pub fn query_box(
    width: Option<f64>,
    height: Option<f64>,
    config: &ConfigFile,
) -> Result<(f64, f64), CliError> {
    let width = positive_meters("width", width.unwrap_or(config.query.width))?;
    let height = positive_meters("height", height.unwrap_or(config.query.height))?;
    Ok((width, height))
}

fn positive_meters(name: &str, value: f64) -> Result<f64, CliError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CliError::InvalidArgument(format!(
            "{} must be a positive number of meters, got {}",
            name, value
        )))
    }
}

/// Start a pool sized by `workers` (or the config) and attach it to a new
/// server tracking every placed user.
pub fn build_server(
    config: &ConfigFile,
    workers: Option<usize>,
    placements: &[(String, Location)],
) -> Result<GeoServer, CliError> {
    let mut pool_config = config.pool_config();
    if let Some(workers) = workers {
        if workers == 0 {
            return Err(CliError::InvalidArgument(
                "--workers must be at least 1".to_string(),
            ));
        }
        pool_config = pool_config.with_workers(workers);
    }

    let pool = Arc::new(ThreadPool::with_config(pool_config));
    pool.start_configured()?;

    let mut server = GeoServer::new();
    server.use_thread_pool(pool);
    for (name, location) in placements {
        server.track(name);
        server.update_location(name, *location);
    }

    info!(
        users = placements.len(),
        workers = pool_config.workers,
        "Server populated"
    );
    Ok(server)
}

/// Stop the server's pool, if any.
pub fn shutdown(server: &GeoServer) {
    if let Some(pool) = server.thread_pool() {
        pool.stop();
    }
}

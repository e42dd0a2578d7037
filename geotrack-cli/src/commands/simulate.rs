//! `geotrack simulate`: populate a server and run one proximity query.

use std::sync::Arc;

use clap::Args;
use geotrack::config::ConfigFile;
use geotrack::pool::PoolSnapshot;
use geotrack::server::{GeoServer, MatchCollector, User};
use serde_json::json;
use tracing::info;

use super::common::{
    build_server, center_location, query_box, shutdown, spiral_placement, user_name,
    DEFAULT_LATITUDE, DEFAULT_LONGITUDE, POOL_WAIT,
};
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Number of users to place
    #[arg(long, default_value = "100")]
    pub users: usize,

    /// Worker threads (defaults to [pool] workers)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Query box width in meters (defaults to [query] width)
    #[arg(long)]
    pub width: Option<f64>,

    /// Query box height in meters (defaults to [query] height)
    #[arg(long)]
    pub height: Option<f64>,

    /// Center latitude in decimal degrees
    #[arg(long, default_value_t = DEFAULT_LATITUDE, allow_negative_numbers = true)]
    pub lat: f64,

    /// Center longitude in decimal degrees
    #[arg(long, default_value_t = DEFAULT_LONGITUDE, allow_negative_numbers = true)]
    pub lon: f64,

    /// Radius in meters over which users are spread
    #[arg(long, default_value = "3000")]
    pub spread: f64,

    /// Run the query on the thread pool
    #[arg(long = "async")]
    pub use_pool: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of one simulated query.
#[derive(Debug)]
pub struct SimulationReport {
    pub user: String,
    pub width: f64,
    pub height: f64,
    pub pooled: bool,
    pub matches: Vec<User>,
    pub metrics: PoolSnapshot,
}

pub fn run(args: SimulateArgs, config: &ConfigFile) -> Result<(), CliError> {
    let report = simulate(&args, config)?;
    if args.json {
        println!("{}", to_json(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Build the population, run the query from the first user, stop the pool.
pub fn simulate(args: &SimulateArgs, config: &ConfigFile) -> Result<SimulationReport, CliError> {
    if args.users == 0 {
        return Err(CliError::InvalidArgument(
            "--users must be at least 1".to_string(),
        ));
    }
    if !args.spread.is_finite() || args.spread < 0.0 {
        return Err(CliError::InvalidArgument(format!(
            "--spread must be a non-negative number of meters, got {}",
            args.spread
        )));
    }

    let center = center_location(args.lat, args.lon)?;
    let (width, height) = query_box(args.width, args.height, config)?;
    let placements = spiral_placement(center, args.users, args.spread);
    let server = build_server(config, args.workers, &placements)?;
    let user = user_name(0);

    let result = if args.use_pool {
        query_on_pool(&server, &user, width, height)
    } else {
        Ok(server.users_in_box(&user, width, height))
    };
    shutdown(&server);
    let mut matches = result?;
    matches.sort_by(|a, b| a.name().cmp(b.name()));

    let metrics = server
        .thread_pool()
        .map(|pool| pool.metrics())
        .unwrap_or_default();
    info!(
        user = %user,
        matches = matches.len(),
        pooled = args.use_pool,
        "Simulation finished"
    );

    Ok(SimulationReport {
        user,
        width,
        height,
        pooled: args.use_pool,
        matches,
        metrics,
    })
}

fn query_on_pool(
    server: &GeoServer,
    user: &str,
    width: f64,
    height: f64,
) -> Result<Vec<User>, CliError> {
    let collector = Arc::new(MatchCollector::new());
    server.users_in_box_async(user, width, height, collector.clone())?;

    let idle = server
        .thread_pool()
        .map(|pool| pool.wait_idle(POOL_WAIT))
        .unwrap_or(true);
    if !idle {
        return Err(CliError::Timeout(POOL_WAIT));
    }
    Ok(collector.matches())
}

fn to_json(report: &SimulationReport) -> Result<String, CliError> {
    let value = json!({
        "user": report.user,
        "width": report.width,
        "height": report.height,
        "mode": if report.pooled { "async" } else { "sync" },
        "matches": report.matches,
        "metrics": {
            "submitted": report.metrics.submitted,
            "executed": report.metrics.executed,
            "panicked": report.metrics.panicked,
            "discarded": report.metrics.discarded,
        },
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

fn print_report(report: &SimulationReport) {
    println!(
        "Users within {} x {} m of {} ({}): {}",
        report.width,
        report.height,
        report.user,
        if report.pooled { "async" } else { "sync" },
        report.matches.len()
    );
    for user in &report.matches {
        println!("  {}", user);
    }
    if report.pooled {
        println!();
        println!(
            "Pool: {} submitted, {} executed, {} panicked, {} discarded",
            report.metrics.submitted,
            report.metrics.executed,
            report.metrics.panicked,
            report.metrics.discarded
        );
    }
}

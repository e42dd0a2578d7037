//! `geotrack bench`: time synchronous against pool-backed queries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use geotrack::config::ConfigFile;
use geotrack::geo::Location;
use geotrack::server::{GeoServer, GeoServerError, MatchCollector};
use tracing::info;

use super::common::{
    build_server, query_box, shutdown, spiral_placement, user_name, DEFAULT_LATITUDE,
    DEFAULT_LONGITUDE, POOL_WAIT,
};
use crate::error::CliError;

/// Radius over which benchmark users are spread.
const BENCH_SPREAD_METERS: f64 = 5_000.0;

#[derive(Debug, Args)]
pub struct BenchArgs {
    /// Number of users to place
    #[arg(long, default_value = "1000")]
    pub users: usize,

    /// Worker threads (defaults to [pool] workers)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Queries per mode
    #[arg(long, default_value = "20")]
    pub iterations: usize,
}

/// Timing for one query mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeTiming {
    pub mode: &'static str,
    pub elapsed: Duration,
    pub iterations: usize,
    /// Matches seen by the last query.
    pub matches: usize,
}

impl ModeTiming {
    pub fn millis_per_query(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.elapsed.as_secs_f64() * 1000.0 / self.iterations as f64
    }
}

pub fn run(args: BenchArgs, config: &ConfigFile) -> Result<(), CliError> {
    let timings = bench(&args, config)?;

    println!(
        "{} users, {} iterations per mode",
        args.users, args.iterations
    );
    for timing in &timings {
        println!(
            "  {:<5} {:>10.2} ms total {:>10.3} ms/query  ({} matches)",
            timing.mode,
            timing.elapsed.as_secs_f64() * 1000.0,
            timing.millis_per_query(),
            timing.matches
        );
    }
    Ok(())
}

pub fn bench(args: &BenchArgs, config: &ConfigFile) -> Result<Vec<ModeTiming>, CliError> {
    if args.users == 0 || args.iterations == 0 {
        return Err(CliError::InvalidArgument(
            "--users and --iterations must be at least 1".to_string(),
        ));
    }

    let center = Location::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE);
    let (width, height) = query_box(None, None, config)?;
    let placements = spiral_placement(center, args.users, BENCH_SPREAD_METERS);
    let server = build_server(config, args.workers, &placements)?;
    let user = user_name(0);

    let sync = time_sync(&server, &user, width, height, args.iterations);
    let pooled = time_async(&server, &user, width, height, args.iterations);
    shutdown(&server);
    let timings = vec![sync, pooled?];

    for timing in &timings {
        info!(
            mode = timing.mode,
            elapsed_ms = timing.elapsed.as_millis() as u64,
            iterations = timing.iterations,
            "Benchmark mode finished"
        );
    }
    Ok(timings)
}

fn time_sync(
    server: &GeoServer,
    user: &str,
    width: f64,
    height: f64,
    iterations: usize,
) -> ModeTiming {
    let started = Instant::now();
    let mut matches = 0;
    for _ in 0..iterations {
        matches = server.users_in_box(user, width, height).len();
    }
    ModeTiming {
        mode: "sync",
        elapsed: started.elapsed(),
        iterations,
        matches,
    }
}

fn time_async(
    server: &GeoServer,
    user: &str,
    width: f64,
    height: f64,
    iterations: usize,
) -> Result<ModeTiming, CliError> {
    let pool = server.thread_pool().ok_or(GeoServerError::NoThreadPool)?;
    let started = Instant::now();
    let mut matches = 0;
    for _ in 0..iterations {
        let collector = Arc::new(MatchCollector::new());
        server.users_in_box_async(user, width, height, collector.clone())?;
        if !pool.wait_idle(POOL_WAIT) {
            return Err(CliError::Timeout(POOL_WAIT));
        }
        matches = collector.len();
    }
    Ok(ModeTiming {
        mode: "async",
        elapsed: started.elapsed(),
        iterations,
        matches,
    })
}

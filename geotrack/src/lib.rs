//! GeoTrack - location tracking with bounding-box proximity queries.
//!
//! Users report positions to a [`GeoServer`], which answers "who is inside
//! this rectangle around me" either directly or by fanning the tests out to
//! a [`ThreadPool`] and reporting each match to a listener.
//!
//! # Modules
//!
//! - [`geo`]: locations, bearings, distances and bounding boxes
//! - [`pool`]: FIFO work queue and worker threads
//! - [`directory`]: concurrent user → location map
//! - [`server`]: tracking operations and proximity queries
//! - [`config`]: `~/.geotrack/config.ini`
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod directory;
pub mod geo;
pub mod logging;
pub mod pool;
pub mod server;

pub use directory::PositionDirectory;
pub use geo::{Area, Location};
pub use pool::{ThreadPool, Work};
pub use server::{GeoServer, MatchCollector, ProximityListener, User};

//! Geographic primitives.
//!
//! Provides the [`Location`] value type (a latitude/longitude pair with an
//! "unknown" sentinel) and the [`Area`] bounding box used as the membership
//! test for proximity queries.
//!
//! # Bearings
//!
//! Bearings passed to [`Location::go`] are in degrees and follow the
//! convention `NORTH = 0`, `WEST = 90`, `SOUTH = 180`, `EAST = 270`.
//!
//! # Example
//!
//! ```
//! use geotrack::geo::{Area, Location, EAST};
//!
//! let center = Location::new(38.0, -103.0);
//! let area = Area::new(center, 2000.0, 4000.0);
//!
//! assert!(area.in_bounds(&center.go(990.0, EAST)));
//! assert!(!area.in_bounds(&center.go(1010.0, EAST)));
//! ```

mod area;
mod location;

pub use area::Area;
pub use location::Location;

/// Mean radius of the Earth used by the geodesic formulas.
pub const RADIUS_OF_EARTH_METERS: f64 = 6_372_000.0;

/// Approximate length of one degree of latitude.
pub const METERS_PER_DEGREE_AT_EQUATOR: f64 = 111_111.0;

/// Distance under which two locations are considered the same spot.
pub const CLOSE_METERS: f64 = 3.0;

/// Bearing pointing north, in degrees.
pub const NORTH: f64 = 0.0;
/// Bearing pointing west, in degrees.
pub const WEST: f64 = 90.0;
/// Bearing pointing south, in degrees.
pub const SOUTH: f64 = 180.0;
/// Bearing pointing east, in degrees.
pub const EAST: f64 = 270.0;

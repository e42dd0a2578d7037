//! Latitude/longitude value type.

use std::f64::consts::PI;
use std::fmt;

use serde::Serialize;

use super::{CLOSE_METERS, RADIUS_OF_EARTH_METERS};

/// A position on the Earth's surface, in degrees.
///
/// Locations are immutable values. A default-constructed location is the
/// "unknown" sentinel (both coordinates infinite), which is what lookups
/// return for users that are not tracked or have never reported a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self::unknown()
    }
}

impl Location {
    /// Create a location from latitude and longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// The unknown-location sentinel.
    pub fn unknown() -> Self {
        Self {
            latitude: f64::INFINITY,
            longitude: f64::INFINITY,
        }
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns true for the unknown-location sentinel.
    pub fn is_unknown(&self) -> bool {
        self.latitude == f64::INFINITY
    }

    /// Travel `meters` along the great circle starting at `bearing` degrees.
    ///
    /// See the aviation formulary (williams.best.vwh.net/avform.htm#LL).
    /// Bearings use the crate convention where west is 90 and east is 270.
    pub fn go(&self, meters: f64, bearing: f64) -> Location {
        let bearing = to_radians(bearing);
        let distance = meters / RADIUS_OF_EARTH_METERS;
        let lat = self.latitude_as_radians();

        let new_lat =
            (lat.sin() * distance.cos() + lat.cos() * distance.sin() * bearing.cos()).asin();

        let mut new_lon = self.longitude_as_radians();
        if lat.cos() != 0.0 {
            new_lon = (self.longitude_as_radians()
                - (bearing.sin() * distance.sin() / new_lat.cos()).asin()
                + PI)
                % (2.0 * PI)
                - PI;
        }

        Location::new(to_degrees(new_lat), to_degrees(new_lon))
    }

    /// Great-circle distance to `there` in meters (haversine).
    pub fn distance_in_meters(&self, there: &Location) -> f64 {
        RADIUS_OF_EARTH_METERS * self.haversine_distance(there)
    }

    /// Returns true if `there` is within a few meters of this location.
    pub fn is_very_close_to(&self, there: &Location) -> bool {
        self.distance_in_meters(there) <= CLOSE_METERS
    }

    fn latitude_as_radians(&self) -> f64 {
        to_radians(self.latitude)
    }

    fn longitude_as_radians(&self) -> f64 {
        to_radians(self.longitude)
    }

    fn haversine_distance(&self, there: &Location) -> f64 {
        let delta_lon = self.longitude_as_radians() - there.longitude_as_radians();
        let delta_lat = self.latitude_as_radians() - there.latitude_as_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + self.latitude_as_radians().cos()
                * there.latitude_as_radians().cos()
                * (delta_lon / 2.0).sin().powi(2);
        2.0 * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.latitude, self.longitude)
    }
}

#[inline]
fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

#[inline]
fn to_degrees(radians: f64) -> f64 {
    radians * (180.0 / PI)
}

//! Bounding box derived from a center point and a size in meters.

use super::{Location, EAST, NORTH, SOUTH, WEST};

/// Axis-aligned (in latitude/longitude) rectangle around a center point.
///
/// The edges are computed once at construction by travelling half the width
/// east and west, and half the height north and south, from the center.
/// Membership is inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Area {
    /// Build the box centered on `center`, `width` by `height` meters.
    ///
    /// An unknown center yields an area that contains nothing.
    pub fn new(center: Location, width: f64, height: f64) -> Self {
        Self {
            left: center.go(width / 2.0, WEST).longitude(),
            right: center.go(width / 2.0, EAST).longitude(),
            top: center.go(height / 2.0, NORTH).latitude(),
            bottom: center.go(height / 2.0, SOUTH).latitude(),
        }
    }

    pub fn upper_left(&self) -> Location {
        Location::new(self.top, self.left)
    }

    pub fn upper_right(&self) -> Location {
        Location::new(self.top, self.right)
    }

    pub fn lower_right(&self) -> Location {
        Location::new(self.bottom, self.right)
    }

    pub fn lower_left(&self) -> Location {
        Location::new(self.bottom, self.left)
    }

    /// Returns true if `location` lies inside the box, edges included.
    ///
    /// Comparisons against NaN edges are false, so an area around an unknown
    /// center never matches.
    pub fn in_bounds(&self, location: &Location) -> bool {
        location.latitude() <= self.top
            && location.latitude() >= self.bottom
            && location.longitude() <= self.right
            && location.longitude() >= self.left
    }
}

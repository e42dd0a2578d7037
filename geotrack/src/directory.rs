//! Mapping from user identity to last known location.
//!
//! Entries are replaced wholesale on update, never mutated in place. The map
//! is a [`DashMap`], so each entry is read and written atomically and a
//! concurrent update can never produce a torn location. Iteration is a live
//! per-shard read rather than a snapshot: a scan racing with updates may see
//! the old or the new location of any given user.

use dashmap::DashMap;
use tracing::debug;

use crate::geo::Location;

/// Last known location of every tracked user.
///
/// A user is tracked from [`track`](Self::track) until
/// [`untrack`](Self::untrack). Lookups for untracked users are not errors;
/// they yield [`Location::unknown`].
///
/// # Example
///
/// ```
/// use geotrack::directory::PositionDirectory;
/// use geotrack::geo::Location;
///
/// let directory = PositionDirectory::new();
/// directory.track("ada");
/// assert!(directory.position_of("ada").is_unknown());
///
/// directory.update_position("ada", Location::new(38.0, -104.0));
/// assert_eq!(directory.position_of("ada"), Location::new(38.0, -104.0));
/// ```
#[derive(Debug, Default)]
pub struct PositionDirectory {
    entries: DashMap<String, Location>,
}

impl PositionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `user` with an unknown location.
    ///
    /// Re-tracking an already tracked user clears its location.
    pub fn track(&self, user: &str) {
        if self
            .entries
            .insert(user.to_string(), Location::unknown())
            .is_some()
        {
            debug!(user, "Re-tracked user, location reset");
        } else {
            debug!(user, "Tracking user");
        }
    }

    /// Stop tracking `user`. No-op if it was not tracked.
    pub fn untrack(&self, user: &str) {
        if self.entries.remove(user).is_some() {
            debug!(user, "Stopped tracking user");
        }
    }

    pub fn is_tracking(&self, user: &str) -> bool {
        self.entries.contains_key(user)
    }

    /// Record the latest location of `user`.
    ///
    /// Updating an untracked user re-creates its entry.
    pub fn update_position(&self, user: &str, location: Location) {
        if self
            .entries
            .insert(user.to_string(), location)
            .is_none()
        {
            debug!(user, "Location update for untracked user, now tracking it");
        }
    }

    /// Last known location of `user`, or [`Location::unknown`].
    pub fn position_of(&self, user: &str) -> Location {
        self.entries
            .get(user)
            .map(|entry| *entry.value())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of every tracked user, in unspecified order.
    pub fn users(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Visit every entry in unspecified order.
    ///
    /// `visit` runs while the entry's shard is read-locked, so it must not
    /// call back into this directory to mutate it.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &Location),
    {
        for entry in self.entries.iter() {
            visit(entry.key(), entry.value());
        }
    }
}

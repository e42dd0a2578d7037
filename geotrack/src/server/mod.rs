//! Location tracking and proximity queries.
//!
//! [`GeoServer`] answers "who else is near this user" over a
//! [`PositionDirectory`], either synchronously (a list of [`User`]s) or by
//! fanning the work out to a [`ThreadPool`] and reporting each match to a
//! [`ProximityListener`].
//!
//! # Query flow
//!
//! ```text
//! users_in_box(user, w, h)
//!   │
//!   ├─ Area::new(location_of(user), w, h)      frozen for the whole query
//!   │
//!   └─ for each (name, location) in directory  live read
//!        ├─ sync:  skip self, in_bounds? ─► Vec<User>
//!        └─ async: pool.add(Work { skip self, in_bounds? ─► listener.updated })
//! ```
//!
//! # Example
//!
//! ```
//! use geotrack::geo::{Location, EAST};
//! use geotrack::server::GeoServer;
//!
//! let server = GeoServer::new();
//! let home = Location::new(38.0, -103.0);
//! server.track("a");
//! server.track("b");
//! server.update_location("a", home);
//! server.update_location("b", home.go(500.0, EAST));
//!
//! let nearby = server.users_in_box("a", 2_000.0, 2_000.0);
//! assert_eq!(nearby.len(), 1);
//! assert_eq!(nearby[0].name(), "b");
//! ```

mod listener;
mod user;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::directory::PositionDirectory;
use crate::geo::{Area, Location};
use crate::pool::{ThreadPool, Work};

pub use listener::{MatchCollector, ProximityListener};
pub use user::User;

/// Errors raised by proximity queries.
#[derive(Debug, Error)]
pub enum GeoServerError {
    /// An asynchronous query was issued before a pool was attached.
    #[error("No thread pool attached; call use_thread_pool before querying asynchronously")]
    NoThreadPool,
}

/// Tracks user locations and finds users near one another.
///
/// All methods take `&self`; the directory is internally synchronized, so a
/// server can be shared as `Arc<GeoServer>` between updating and querying
/// threads.
#[derive(Debug, Default)]
pub struct GeoServer {
    directory: PositionDirectory,
    pool: Option<Arc<ThreadPool>>,
}

impl GeoServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch asynchronous queries to `pool`.
    ///
    /// The pool must be started by the caller; items submitted to a pool
    /// without workers wait in its queue until one is started.
    pub fn use_thread_pool(&mut self, pool: Arc<ThreadPool>) {
        self.pool = Some(pool);
    }

    pub fn thread_pool(&self) -> Option<&Arc<ThreadPool>> {
        self.pool.as_ref()
    }

    pub fn directory(&self) -> &PositionDirectory {
        &self.directory
    }

    pub fn track(&self, user: &str) {
        self.directory.track(user);
    }

    pub fn stop_tracking(&self, user: &str) {
        self.directory.untrack(user);
    }

    pub fn is_tracking(&self, user: &str) -> bool {
        self.directory.is_tracking(user)
    }

    pub fn update_location(&self, user: &str, location: Location) {
        self.directory.update_position(user, location);
    }

    pub fn location_of(&self, user: &str) -> Location {
        self.directory.position_of(user)
    }

    /// Every other user inside the `width` x `height` meter box centered on
    /// `user`, in unspecified order.
    ///
    /// Returns an empty list when `user` has no known location.
    pub fn users_in_box(&self, user: &str, width: f64, height: f64) -> Vec<User> {
        let Some(area) = self.area_around(user, width, height) else {
            return Vec::new();
        };

        let mut users = Vec::new();
        self.directory.for_each(|name, location| {
            if is_different_user_in_bounds(name, location, user, &area) {
                users.push(User::new(name, *location));
            }
        });

        debug!(user, width, height, matches = users.len(), "Proximity query");
        users
    }

    /// Like [`users_in_box`](Self::users_in_box), but each candidate is
    /// tested on the thread pool and every match is reported to `listener`.
    ///
    /// Submits one work item per directory entry examined and returns how
    /// many were submitted, without waiting for any of them to run. Callers
    /// that need to know when all matches arrived must synchronize through
    /// the listener (see [`MatchCollector`]).
    pub fn users_in_box_async(
        &self,
        user: &str,
        width: f64,
        height: f64,
        listener: Arc<dyn ProximityListener>,
    ) -> Result<usize, GeoServerError> {
        let pool = self.pool.as_ref().ok_or(GeoServerError::NoThreadPool)?;
        let Some(area) = self.area_around(user, width, height) else {
            return Ok(0);
        };

        let mut submitted = 0;
        self.directory.for_each(|name, location| {
            let candidate = User::new(name, *location);
            let querying_user = user.to_string();
            let listener = Arc::clone(&listener);
            pool.add(Work::new(move || {
                if is_different_user_in_bounds(
                    candidate.name(),
                    &candidate.location(),
                    &querying_user,
                    &area,
                ) {
                    listener.updated(&candidate);
                }
            }));
            submitted += 1;
        });

        debug!(user, width, height, submitted, "Proximity query dispatched");
        Ok(submitted)
    }

    fn area_around(&self, user: &str, width: f64, height: f64) -> Option<Area> {
        let center = self.location_of(user);
        if center.is_unknown() {
            debug!(user, "Proximity query for user without a known location");
            return None;
        }
        Some(Area::new(center, width, height))
    }
}

fn is_different_user_in_bounds(name: &str, location: &Location, user: &str, area: &Area) -> bool {
    name != user && area.in_bounds(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::EAST;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(10);
    const TEN_METERS: f64 = 10.0;
    const WIDTH: f64 = 2000.0 + TEN_METERS;
    const HEIGHT: f64 = 4000.0 + TEN_METERS;
    const A_USER: &str = "auser";
    const B_USER: &str = "buser";
    const C_USER: &str = "cuser";

    fn a_user_location() -> Location {
        Location::new(38.0, -103.0)
    }

    fn server_with_three_users() -> GeoServer {
        let server = GeoServer::new();
        server.track(A_USER);
        server.track(B_USER);
        server.track(C_USER);
        server.update_location(A_USER, a_user_location());
        server
    }

    fn names(users: &[User]) -> Vec<String> {
        let mut names: Vec<String> = users.iter().map(|u| u.name().to_string()).collect();
        names.sort();
        names
    }

    fn started_pool(workers: usize) -> Arc<ThreadPool> {
        let pool = Arc::new(ThreadPool::new());
        pool.start(workers).unwrap();
        pool
    }

    #[test]
    fn test_tracking_delegates_to_directory() {
        let server = GeoServer::new();
        server.track(A_USER);
        assert!(server.is_tracking(A_USER));

        server.stop_tracking(A_USER);
        assert!(!server.is_tracking(A_USER));
        assert!(server.location_of(A_USER).is_unknown());
    }

    #[test]
    fn test_updates_location_of_user() {
        let server = GeoServer::new();
        server.track(A_USER);
        server.update_location(A_USER, Location::new(38.0, -104.0));
        assert_eq!(server.location_of(A_USER), Location::new(38.0, -104.0));
    }

    #[test]
    fn test_answers_users_in_specified_range() {
        let server = server_with_three_users();
        server.update_location(B_USER, a_user_location().go(WIDTH / 2.0 - TEN_METERS, EAST));

        let users = server.users_in_box(A_USER, WIDTH, HEIGHT);

        assert_eq!(names(&users), vec![B_USER]);
    }

    #[test]
    fn test_answers_only_users_within_specified_range() {
        let server = server_with_three_users();
        server.update_location(B_USER, a_user_location().go(WIDTH / 2.0 + TEN_METERS, EAST));
        server.update_location(C_USER, a_user_location().go(WIDTH / 2.0 - TEN_METERS, EAST));

        let users = server.users_in_box(A_USER, WIDTH, HEIGHT);

        assert_eq!(names(&users), vec![C_USER]);
    }

    #[test]
    fn test_excludes_querying_user() {
        let server = server_with_three_users();
        let users = server.users_in_box(A_USER, WIDTH, HEIGHT);
        assert!(users.iter().all(|u| u.name() != A_USER));
    }

    #[test]
    fn test_excludes_users_without_location() {
        let server = server_with_three_users();
        assert!(server.users_in_box(A_USER, 1.0e7, 1.0e7).is_empty());
    }

    #[test]
    fn test_matches_carry_the_matched_location() {
        let server = server_with_three_users();
        let b_location = a_user_location().go(100.0, EAST);
        server.update_location(B_USER, b_location);

        let users = server.users_in_box(A_USER, WIDTH, HEIGHT);

        assert_eq!(users, vec![User::new(B_USER, b_location)]);
    }

    #[test]
    fn test_query_from_user_without_location_is_empty() {
        let server = server_with_three_users();
        server.update_location(B_USER, a_user_location());
        assert!(server.users_in_box(C_USER, WIDTH, HEIGHT).is_empty());
        assert!(server.users_in_box("stranger", WIDTH, HEIGHT).is_empty());
    }

    #[test]
    fn test_async_query_without_pool_fails() {
        let server = server_with_three_users();
        let result = server.users_in_box_async(A_USER, WIDTH, HEIGHT, Arc::new(MatchCollector::new()));
        assert!(matches!(result, Err(GeoServerError::NoThreadPool)));
    }

    #[test]
    fn test_async_query_submits_one_item_per_entry() {
        let mut server = server_with_three_users();
        let pool = Arc::new(ThreadPool::new());
        server.use_thread_pool(Arc::clone(&pool));

        let submitted = server
            .users_in_box_async(A_USER, WIDTH, HEIGHT, Arc::new(MatchCollector::new()))
            .unwrap();

        assert_eq!(submitted, 3);
        assert_eq!(pool.pending(), 3);
    }

    #[test]
    fn test_async_query_reports_matches_to_listener() {
        let mut server = server_with_three_users();
        server.use_thread_pool(started_pool(2));
        server.update_location(B_USER, a_user_location().go(WIDTH / 2.0 + TEN_METERS, EAST));
        server.update_location(C_USER, a_user_location().go(WIDTH / 2.0 - TEN_METERS, EAST));
        let collector = Arc::new(MatchCollector::new());

        server
            .users_in_box_async(A_USER, WIDTH, HEIGHT, collector.clone())
            .unwrap();

        assert!(collector.wait_for(1, WAIT));
        let pool = server.thread_pool().unwrap();
        assert!(pool.wait_idle(WAIT));
        assert_eq!(collector.names(), vec![C_USER]);
    }

    #[test]
    fn test_async_query_accepts_closure_listener() {
        let mut server = server_with_three_users();
        server.use_thread_pool(started_pool(1));
        server.update_location(B_USER, a_user_location().go(10.0, EAST));
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        server
            .users_in_box_async(
                A_USER,
                WIDTH,
                HEIGHT,
                Arc::new(move |user: &User| sink.lock().push(user.name().to_string())),
            )
            .unwrap();

        assert!(server.thread_pool().unwrap().wait_idle(WAIT));
        assert_eq!(*seen.lock(), vec![B_USER.to_string()]);
    }

    #[test]
    fn test_async_query_from_user_without_location_submits_nothing() {
        let mut server = server_with_three_users();
        server.use_thread_pool(Arc::new(ThreadPool::new()));

        let submitted = server
            .users_in_box_async(C_USER, WIDTH, HEIGHT, Arc::new(MatchCollector::new()))
            .unwrap();

        assert_eq!(submitted, 0);
    }
}

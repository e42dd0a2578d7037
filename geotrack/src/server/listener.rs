//! Receivers for asynchronous proximity matches.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::User;

/// Receives one call per proximity match.
///
/// `updated` runs on whichever pool worker executed the match, so
/// implementations that mutate shared state must synchronize it themselves.
/// Any `Fn(&User) + Send + Sync` closure is a listener.
pub trait ProximityListener: Send + Sync {
    /// Called once for every user found inside the queried box.
    fn updated(&self, user: &User);
}

impl<F> ProximityListener for F
where
    F: Fn(&User) + Send + Sync,
{
    fn updated(&self, user: &User) {
        self(user)
    }
}

/// Listener that records matches and lets a caller wait for them.
///
/// # Example
///
/// ```
/// use geotrack::geo::Location;
/// use geotrack::server::{MatchCollector, ProximityListener, User};
/// use std::time::Duration;
///
/// let collector = MatchCollector::new();
/// collector.updated(&User::new("ada", Location::new(1.0, 2.0)));
///
/// assert!(collector.wait_for(1, Duration::from_secs(1)));
/// assert_eq!(collector.names(), vec!["ada".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct MatchCollector {
    matches: Mutex<Vec<User>>,
    arrived: Condvar,
}

impl MatchCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until at least `count` matches arrived.
    ///
    /// Returns false if `timeout` elapses first.
    pub fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut matches = self.matches.lock();
        while matches.len() < count {
            if self.arrived.wait_until(&mut matches, deadline).timed_out() {
                return matches.len() >= count;
            }
        }
        true
    }

    /// Copy of every match received so far, in arrival order.
    pub fn matches(&self) -> Vec<User> {
        self.matches.lock().clone()
    }

    /// Names of every match, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .matches
            .lock()
            .iter()
            .map(|user| user.name().to_string())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.matches.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.lock().is_empty()
    }
}

impl ProximityListener for MatchCollector {
    fn updated(&self, user: &User) {
        self.matches.lock().push(user.clone());
        self.arrived.notify_all();
    }
}

//! Worker pool for deferred work.
//!
//! A [`ThreadPool`] owns a FIFO [`WorkQueue`] of [`Work`] items and a set of
//! OS worker threads that pull and execute them. Submitting never waits for
//! execution; callers that need a completion point bring their own
//! synchronization (or use [`ThreadPool::wait_idle`] for diagnostics).
//!
//! # Architecture
//!
//! ```text
//!   add(work) ──► ┌───────────────────────┐
//!                 │ WorkQueue             │  Mutex<VecDeque<Work>>
//!                 │  push ─► notify_one   │  (append / pop / empty-check only)
//!                 └──────────┬────────────┘
//!                            │ pop under lock
//!              ┌─────────────┼─────────────┐
//!              ▼             ▼             ▼
//!         worker-0      worker-1  ...  worker-N     execute unlocked,
//!                                                   panics caught + logged
//! ```
//!
//! # Ordering
//!
//! With one worker, items execute in submission order. With several, each
//! item still executes exactly once, but completion order is unspecified.

mod metrics;
mod queue;
mod thread_pool;
mod work;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use metrics::{PoolMetrics, PoolSnapshot};
pub use queue::WorkQueue;
pub use thread_pool::ThreadPool;
pub use work::{Work, WorkId};

/// Default number of workers spawned by [`ThreadPool::start_default`].
pub const DEFAULT_WORKER_COUNT: usize = 1;

/// Errors raised by the pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The operating system refused to spawn a worker thread.
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// What happens to queued, not-yet-started items when the pool stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Workers run every queued item before exiting.
    #[default]
    Drain,
    /// Queued items are dropped; only items already executing finish.
    Discard,
}

impl fmt::Display for ShutdownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownMode::Drain => write!(f, "drain"),
            ShutdownMode::Discard => write!(f, "discard"),
        }
    }
}

impl FromStr for ShutdownMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drain" => Ok(ShutdownMode::Drain),
            "discard" => Ok(ShutdownMode::Discard),
            other => Err(format!("unknown shutdown mode '{}'", other)),
        }
    }
}

/// Configuration for a [`ThreadPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Workers spawned by [`ThreadPool::start_configured`].
    pub workers: usize,
    /// Behaviour of queued items on stop.
    pub shutdown: ShutdownMode,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKER_COUNT,
            shutdown: ShutdownMode::default(),
        }
    }
}

impl PoolConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownMode) -> Self {
        self.shutdown = shutdown;
        self
    }
}

//! Lock-free counters describing what a pool has done.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters updated by the pool and its workers.
///
/// Uses relaxed atomics; the numbers are for diagnostics and display,
/// never for synchronization.
#[derive(Debug, Default)]
pub struct PoolMetrics {
    submitted: AtomicU64,
    executed: AtomicU64,
    panicked: AtomicU64,
    discarded: AtomicU64,
}

impl PoolMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn work_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn work_executed(&self) {
        self.executed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn work_panicked(&self) {
        self.panicked.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn work_discarded(&self, count: u64) {
        self.discarded.fetch_add(count, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of the counters.
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PoolMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSnapshot {
    /// Items handed to `add`.
    pub submitted: u64,
    /// Items that ran to completion (panicking items excluded).
    pub executed: u64,
    /// Items whose action panicked.
    pub panicked: u64,
    /// Items dropped by a discarding shutdown.
    pub discarded: u64,
}

impl PoolSnapshot {
    /// Items submitted but not yet accounted for.
    pub fn pending(&self) -> u64 {
        self.submitted
            .saturating_sub(self.executed + self.panicked + self.discarded)
    }
}

//! FIFO work queue shared between submitters and workers.
//!
//! The queue is the only state in the pool that needs a lock. Every
//! operation holds it for a single append, pop or emptiness check; work is
//! never executed while the lock is held.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use super::work::Work;

/// Queue state guarded by the mutex.
#[derive(Debug, Default)]
pub(super) struct QueueState {
    pub(super) items: VecDeque<Work>,
    /// Generation handed to newly spawned workers. `stop` bumps it; a
    /// worker whose generation is older exits once it observes that.
    pub(super) generation: u64,
    /// Items currently executing on a worker.
    pub(super) active: usize,
}

/// Thread-safe FIFO of [`Work`] items.
///
/// `push` wakes one idle worker through a condition variable instead of
/// having workers poll the queue.
#[derive(Debug, Default)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
    /// Signalled when work arrives or workers are retired.
    available: Condvar,
    /// Signalled when the queue drains and nothing is executing.
    idle: Condvar,
}

impl WorkQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `work` to the tail and wake one waiting worker.
    pub fn push(&self, work: Work) {
        self.state.lock().items.push_back(work);
        self.available.notify_one();
    }

    /// Remove the head item, if any.
    pub fn try_pull(&self) -> Option<Work> {
        let mut state = self.state.lock();
        let work = state.items.pop_front();
        if work.is_some() {
            self.notify_if_idle(&state);
        }
        work
    }

    /// Remove the head item, or hand out a no-op on underrun.
    pub fn pull(&self) -> Work {
        self.try_pull().unwrap_or_default()
    }

    /// Best-effort check for pending items.
    pub fn has_work(&self) -> bool {
        !self.state.lock().items.is_empty()
    }

    /// Number of pending items.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Drop every pending item, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        let discarded = state.items.len();
        state.items.clear();
        self.notify_if_idle(&state);
        discarded
    }

    /// Block until the queue is empty and no item is executing.
    ///
    /// Returns false if `timeout` elapses first.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while !state.items.is_empty() || state.active > 0 {
            if self.idle.wait_until(&mut state, deadline).timed_out() {
                return state.items.is_empty() && state.active == 0;
            }
        }
        true
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock()
    }

    /// Park the calling worker until work arrives or the queue stops.
    pub(super) fn wait_for_work(&self, state: &mut MutexGuard<'_, QueueState>) {
        self.available.wait(state);
    }

    /// Generation new workers should be spawned with.
    pub(super) fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Retire every worker spawned so far and wake them all.
    pub(super) fn retire_workers(&self) {
        self.state.lock().generation += 1;
        self.available.notify_all();
    }

    /// Record that a worker finished executing an item.
    pub(super) fn finish_one(&self) {
        let mut state = self.state.lock();
        state.active = state.active.saturating_sub(1);
        self.notify_if_idle(&state);
    }

    fn notify_if_idle(&self, state: &QueueState) {
        if state.items.is_empty() && state.active == 0 {
            self.idle.notify_all();
        }
    }
}

//! Fixed set of OS worker threads draining a shared [`WorkQueue`].

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::metrics::{PoolMetrics, PoolSnapshot};
use super::queue::WorkQueue;
use super::work::Work;
use super::{PoolConfig, PoolError, ShutdownMode, DEFAULT_WORKER_COUNT};

/// State shared between the pool handle and its workers.
#[derive(Debug)]
struct Shared {
    queue: WorkQueue,
    metrics: PoolMetrics,
    shutdown: ShutdownMode,
}

/// A queue of [`Work`] plus the worker threads that execute it.
///
/// Items may be added before [`start`](Self::start); they accumulate until a
/// worker exists. With exactly one worker items run in submission order; with
/// several, each item still runs exactly once but completion order is free.
///
/// All methods take `&self`, so a pool is usually shared as
/// `Arc<ThreadPool>`. Dropping the last handle stops the workers.
///
/// # Example
///
/// ```
/// use geotrack::pool::{ThreadPool, Work};
/// use std::time::Duration;
///
/// let pool = ThreadPool::new();
/// pool.start(2).unwrap();
/// pool.add(Work::new(|| println!("hello from a worker")));
///
/// assert!(pool.wait_idle(Duration::from_secs(5)));
/// pool.stop();
/// ```
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    /// Stopped workers that could not be joined because `stop` ran on them.
    retiring: Mutex<Vec<JoinHandle<()>>>,
    next_worker_id: AtomicUsize,
    config: PoolConfig,
}

impl ThreadPool {
    /// Create a pool with default configuration and no workers.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: WorkQueue::new(),
                metrics: PoolMetrics::new(),
                shutdown: config.shutdown,
            }),
            workers: Mutex::new(Vec::new()),
            retiring: Mutex::new(Vec::new()),
            next_worker_id: AtomicUsize::new(0),
            config,
        }
    }

    /// Spawn a single worker.
    pub fn start_default(&self) -> Result<(), PoolError> {
        self.start(DEFAULT_WORKER_COUNT)
    }

    /// Spawn the number of workers named in the pool's configuration.
    pub fn start_configured(&self) -> Result<(), PoolError> {
        self.start(self.config.workers)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Spawn `worker_count` additional workers.
    ///
    /// Calling this on a running pool adds workers; it never removes any.
    pub fn start(&self, worker_count: usize) -> Result<(), PoolError> {
        let mut workers = self.workers.lock();
        let generation = self.shared.queue.generation();

        for _ in 0..worker_count {
            let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
            let shared = Arc::clone(&self.shared);
            let handle = thread::Builder::new()
                .name(format!("geotrack-worker-{}", id))
                .spawn(move || worker_loop(&shared, generation))
                .map_err(PoolError::Spawn)?;
            workers.push(handle);
        }

        info!(
            added = worker_count,
            total = workers.len(),
            "Thread pool workers started"
        );
        Ok(())
    }

    /// Append `work` to the queue and return immediately.
    pub fn add(&self, work: Work) {
        self.shared.metrics.work_submitted();
        self.shared.queue.push(work);
    }

    /// Best-effort check for queued items. Diagnostics only.
    pub fn has_work(&self) -> bool {
        self.shared.queue.has_work()
    }

    /// Number of queued items not yet picked up by a worker.
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    /// Remove the head item without executing it.
    ///
    /// Returns a no-op [`Work`] when the queue is empty.
    pub fn pull_work(&self) -> Work {
        self.shared.queue.pull()
    }

    /// Block until the queue is empty and no worker is executing an item.
    ///
    /// Returns false if `timeout` elapses first. Queries never call this;
    /// it exists for callers and tests that need a completion point.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.shared.queue.wait_idle(timeout)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.lock().len()
    }

    pub fn is_running(&self) -> bool {
        self.worker_count() > 0
    }

    pub fn metrics(&self) -> PoolSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Signal every worker to exit and wait for them.
    ///
    /// Items already executing always finish. With [`ShutdownMode::Drain`]
    /// workers also run everything still queued; with
    /// [`ShutdownMode::Discard`] queued items are dropped. Calling `stop`
    /// again is a no-op, and `start` may be called afterwards.
    ///
    /// Joins happen without holding any pool lock, so running items may
    /// call back into the pool while it stops. When `stop` runs on a
    /// worker, that worker is retired but joined by a later `stop`.
    pub fn stop(&self) {
        let stopped = {
            let mut workers = self.workers.lock();
            if !workers.is_empty() {
                self.shared.queue.retire_workers();
                if self.shared.shutdown == ShutdownMode::Discard {
                    let discarded = self.shared.queue.clear();
                    if discarded > 0 {
                        self.shared.metrics.work_discarded(discarded as u64);
                        warn!(discarded, "Thread pool stopped with queued work discarded");
                    }
                }
            }
            std::mem::take(&mut *workers)
        };
        let retiring = std::mem::take(&mut *self.retiring.lock());
        if stopped.is_empty() && retiring.is_empty() {
            return;
        }

        let current = thread::current().id();
        for handle in stopped.into_iter().chain(retiring) {
            if handle.thread().id() == current {
                self.retiring.lock().push(handle);
                continue;
            }
            if handle.join().is_err() {
                error!("Thread pool worker exited abnormally");
            }
        }

        info!("Thread pool stopped");
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("workers", &self.worker_count())
            .field("pending", &self.pending())
            .field("shutdown", &self.shared.shutdown)
            .finish_non_exhaustive()
    }
}

fn worker_loop(shared: &Shared, generation: u64) {
    debug!(generation, "Worker started");
    loop {
        let work = {
            let mut state = shared.queue.lock();
            while state.items.is_empty() && state.generation == generation {
                shared.queue.wait_for_work(&mut state);
            }
            let retired = state.generation != generation;
            if retired && (state.items.is_empty() || shared.shutdown == ShutdownMode::Discard) {
                break;
            }
            match state.items.pop_front() {
                Some(work) => {
                    state.active += 1;
                    work
                }
                None => continue,
            }
        };

        run(shared, &work);
        shared.queue.finish_one();
    }
    debug!("Worker exiting");
}

/// Execute one item outside the queue lock, containing any panic.
fn run(shared: &Shared, work: &Work) {
    match panic::catch_unwind(AssertUnwindSafe(|| work.execute())) {
        Ok(()) => shared.metrics.work_executed(),
        Err(payload) => {
            shared.metrics.work_panicked();
            error!(
                work_id = work.id(),
                panic = %panic_message(payload.as_ref()),
                "Work item panicked; worker continues"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    const WAIT: Duration = Duration::from_secs(10);

    fn counting_work(counter: &Arc<AtomicU64>) -> Work {
        let counter = Arc::clone(counter);
        Work::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_has_no_work_on_creation() {
        let pool = ThreadPool::new();
        assert!(!pool.has_work());
        assert!(!pool.is_running());
    }

    #[test]
    fn test_has_work_after_add() {
        let pool = ThreadPool::new();
        pool.add(Work::default());
        assert!(pool.has_work());
    }

    #[test]
    fn test_answers_work_added_on_pull() {
        let pool = ThreadPool::new();
        pool.add(Work::identified(1));
        assert_eq!(pool.pull_work().id(), 1);
    }

    #[test]
    fn test_pulls_elements_in_fifo_order() {
        let pool = ThreadPool::new();
        pool.add(Work::identified(1));
        pool.add(Work::identified(2));
        pool.add(Work::identified(3));

        assert_eq!(pool.pull_work().id(), 1);
        assert_eq!(pool.pull_work().id(), 2);
        assert_eq!(pool.pull_work().id(), 3);
    }

    #[test]
    fn test_has_no_work_after_last_element_removed() {
        let pool = ThreadPool::new();
        pool.add(Work::default());
        pool.pull_work();
        assert!(!pool.has_work());
    }

    #[test]
    fn test_has_work_after_work_removed_but_work_remains() {
        let pool = ThreadPool::new();
        pool.add(Work::default());
        pool.add(Work::default());
        pool.pull_work();
        assert!(pool.has_work());
    }

    #[test]
    fn test_pull_on_empty_pool_is_harmless() {
        let pool = ThreadPool::new();
        let work = pool.pull_work();
        work.execute();
        assert_eq!(work.id(), 0);
    }

    #[test]
    fn test_pulls_work_in_a_thread() {
        let pool = ThreadPool::new();
        pool.start_default().unwrap();
        let counter = Arc::new(AtomicU64::new(0));

        pool.add(counting_work(&counter));

        assert!(pool.wait_idle(WAIT));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_work_added_before_start_runs_after_start() {
        let pool = ThreadPool::new();
        let counter = Arc::new(AtomicU64::new(0));
        pool.add(counting_work(&counter));
        pool.add(counting_work(&counter));

        pool.start(1).unwrap();

        assert!(pool.wait_idle(WAIT));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_single_worker_executes_in_submission_order() {
        let pool = ThreadPool::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for id in 1..=20 {
            let order = Arc::clone(&order);
            pool.add(Work::new(move || order.lock().push(id)).with_id(id));
        }

        pool.start(1).unwrap();

        assert!(pool.wait_idle(WAIT));
        assert_eq!(*order.lock(), (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_start_configured_uses_config_worker_count() {
        let pool = ThreadPool::with_config(PoolConfig::default().with_workers(3));
        pool.start_configured().unwrap();
        assert_eq!(pool.worker_count(), 3);
    }

    #[test]
    fn test_start_is_additive() {
        let pool = ThreadPool::new();
        pool.start(2).unwrap();
        pool.start(3).unwrap();
        assert_eq!(pool.worker_count(), 5);
    }

    #[test]
    fn test_executes_each_item_exactly_once_with_many_workers() {
        let pool = ThreadPool::new();
        pool.start(4).unwrap();
        let counter = Arc::new(AtomicU64::new(0));

        for _ in 0..500 {
            pool.add(counting_work(&counter));
        }

        assert!(pool.wait_idle(WAIT));
        assert_eq!(counter.load(Ordering::SeqCst), 500);
        assert_eq!(pool.metrics().executed, 500);
        assert_eq!(pool.metrics().pending(), 0);
    }

    #[test]
    fn test_stop_twice_is_a_no_op() {
        let pool = ThreadPool::new();
        pool.start(2).unwrap();
        pool.stop();
        pool.stop();
        assert_eq!(pool.worker_count(), 0);
    }

    #[test]
    fn test_stop_without_start_is_a_no_op() {
        let pool = ThreadPool::new();
        pool.stop();
        assert!(!pool.is_running());
    }

    #[test]
    fn test_stop_in_drain_mode_runs_queued_work() {
        let pool = ThreadPool::new();
        let counter = Arc::new(AtomicU64::new(0));
        for _ in 0..50 {
            pool.add(counting_work(&counter));
        }
        pool.start(1).unwrap();

        pool.stop();

        assert_eq!(counter.load(Ordering::SeqCst), 50);
        assert!(!pool.has_work());
    }

    /// One-shot signal for sequencing test threads.
    #[derive(Default)]
    struct Gate {
        open: Mutex<bool>,
        changed: parking_lot::Condvar,
    }

    impl Gate {
        fn open(&self) {
            *self.open.lock() = true;
            self.changed.notify_all();
        }

        fn wait(&self) {
            let mut open = self.open.lock();
            while !*open {
                self.changed.wait(&mut open);
            }
        }
    }

    #[test]
    fn test_stop_in_discard_mode_drops_queued_work() {
        let pool = Arc::new(ThreadPool::with_config(
            PoolConfig::default().with_shutdown(ShutdownMode::Discard),
        ));
        let started = Arc::new(Gate::default());
        let release = Arc::new(Gate::default());
        let counter = Arc::new(AtomicU64::new(0));

        pool.add(Work::new({
            let started = Arc::clone(&started);
            let release = Arc::clone(&release);
            move || {
                started.open();
                release.wait();
            }
        }));
        for _ in 0..10 {
            pool.add(counting_work(&counter));
        }
        pool.start(1).unwrap();
        started.wait();

        let stopper = thread::spawn({
            let pool = Arc::clone(&pool);
            move || pool.stop()
        });
        while pool.has_work() {
            thread::yield_now();
        }
        release.open();
        stopper.join().unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(pool.metrics().discarded, 10);
        assert_eq!(pool.metrics().executed, 1);
    }

    #[test]
    fn test_running_item_can_query_pool_while_it_stops() {
        let pool = Arc::new(ThreadPool::new());
        let started = Arc::new(Gate::default());
        let release = Arc::new(Gate::default());
        let answered = Arc::new(Gate::default());

        pool.add(Work::new({
            let pool = Arc::clone(&pool);
            let started = Arc::clone(&started);
            let release = Arc::clone(&release);
            let answered = Arc::clone(&answered);
            move || {
                started.open();
                release.wait();
                let _ = pool.is_running();
                let _ = pool.worker_count();
                let _ = format!("{:?}", pool);
                answered.open();
            }
        }));
        pool.start(1).unwrap();
        started.wait();

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        let stopper = thread::spawn({
            let pool = Arc::clone(&pool);
            move || {
                pool.stop();
                let _ = done_tx.send(());
            }
        });
        thread::sleep(Duration::from_millis(50));
        release.open();

        assert!(
            done_rx.recv_timeout(WAIT).is_ok(),
            "stop did not return while an item called back into the pool"
        );
        answered.wait();
        stopper.join().unwrap();
        assert!(!pool.is_running());
    }

    #[test]
    fn test_stop_and_restart_from_a_worker_leaves_no_stray_worker() {
        let pool = Arc::new(ThreadPool::with_config(
            PoolConfig::default().with_shutdown(ShutdownMode::Discard),
        ));
        let restarted = Arc::new(Gate::default());

        pool.add(Work::new({
            let pool = Arc::clone(&pool);
            let restarted = Arc::clone(&restarted);
            move || {
                pool.stop();
                pool.start(1).unwrap();
                restarted.open();
            }
        }));
        pool.start(1).unwrap();
        restarted.wait();
        assert_eq!(pool.worker_count(), 1);

        let ran_on = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..20 {
            let ran_on = Arc::clone(&ran_on);
            pool.add(Work::new(move || {
                let name = thread::current().name().map(String::from);
                ran_on.lock().push(name);
            }));
        }
        assert!(pool.wait_idle(WAIT));
        pool.stop();

        let ran_on = ran_on.lock();
        assert_eq!(ran_on.len(), 20);
        assert!(ran_on
            .iter()
            .all(|name| name.as_deref() == Some("geotrack-worker-1")));
        assert_eq!(pool.worker_count(), 0);
        assert!(pool.retiring.lock().is_empty());
    }

    #[test]
    fn test_restart_after_stop() {
        let pool = ThreadPool::new();
        pool.start(1).unwrap();
        pool.stop();

        let counter = Arc::new(AtomicU64::new(0));
        pool.start(1).unwrap();
        pool.add(counting_work(&counter));

        assert!(pool.wait_idle(WAIT));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_work_does_not_kill_the_worker() {
        let pool = ThreadPool::new();
        pool.start(1).unwrap();
        let counter = Arc::new(AtomicU64::new(0));

        pool.add(Work::new(|| panic!("listener failed")).with_id(9));
        pool.add(counting_work(&counter));

        assert!(pool.wait_idle(WAIT));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(pool.metrics().panicked, 1);
        assert_eq!(pool.worker_count(), 1);
    }

    #[test]
    fn test_drop_stops_workers() {
        let counter = Arc::new(AtomicU64::new(0));
        {
            let pool = ThreadPool::new();
            pool.start(2).unwrap();
            for _ in 0..10 {
                pool.add(counting_work(&counter));
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_panic_message_extracts_strings() {
        let static_payload: Box<dyn Any + Send> = Box::new("static");
        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other_payload: Box<dyn Any + Send> = Box::new(5_u8);

        assert_eq!(panic_message(static_payload.as_ref()), "static");
        assert_eq!(panic_message(owned_payload.as_ref()), "owned");
        assert_eq!(
            panic_message(other_payload.as_ref()),
            "non-string panic payload"
        );
    }
}

//! Deferred unit of execution.

use std::fmt;
use std::sync::Arc;

/// Identifier attached to a [`Work`] item for tests and diagnostics.
pub type WorkId = u64;

type Action = Arc<dyn Fn() + Send + Sync + 'static>;

/// A queueable action plus an optional identity tag.
///
/// `Work` is cheap to clone: the action is shared, and no clone holds any
/// reference to the queue it was submitted to. The default value is a no-op
/// with id 0, which is also what the queue hands out on underrun.
///
/// # Example
///
/// ```
/// use geotrack::pool::Work;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let count = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&count);
/// let work = Work::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// })
/// .with_id(7);
///
/// work.execute();
/// assert_eq!(work.id(), 7);
/// assert_eq!(count.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone)]
pub struct Work {
    id: WorkId,
    action: Action,
}

impl Work {
    /// Wrap `action` as a work item with id 0.
    pub fn new<F>(action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            id: 0,
            action: Arc::new(action),
        }
    }

    /// A no-op work item carrying `id`.
    pub fn identified(id: WorkId) -> Self {
        Self::default().with_id(id)
    }

    /// Replace the id of this work item.
    pub fn with_id(mut self, id: WorkId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> WorkId {
        self.id
    }

    /// Run the action on the calling thread.
    pub fn execute(&self) {
        (self.action)();
    }
}

impl Default for Work {
    fn default() -> Self {
        Self::new(|| {})
    }
}

impl fmt::Debug for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Work")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_default_executes_as_no_op() {
        let work = Work::default();
        work.execute();
        assert_eq!(work.id(), 0);
    }

    #[test]
    fn test_identified_executes_as_no_op() {
        let work = Work::identified(1);
        work.execute();
        assert_eq!(work.id(), 1);
    }

    #[test]
    fn test_id_defaults_to_zero_when_action_given() {
        let work = Work::new(|| {});
        assert_eq!(work.id(), 0);
    }

    #[test]
    fn test_can_be_constructed_with_action_and_id() {
        let work = Work::new(|| {}).with_id(1);
        assert_eq!(work.id(), 1);
    }

    #[test]
    fn test_executes_stored_action() {
        let executed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&executed);
        let work = Work::new(move || flag.store(true, Ordering::SeqCst));

        work.execute();

        assert!(executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_executes_on_captured_data() {
        let data = vec!["a".to_string(), "b".to_string()];
        let result = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&result);
        let work = Work::new(move || {
            let joined = format!("{}{}", data[0], data[1]);
            sink.lock().unwrap().push_str(&joined);
        });

        work.execute();

        assert_eq!(*result.lock().unwrap(), "ab");
    }

    #[test]
    fn test_clones_share_the_action() {
        let executed = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&executed);
        let work = Work::new(move || *counter.lock().unwrap() += 1).with_id(3);
        let copy = work.clone();

        work.execute();
        copy.execute();

        assert_eq!(copy.id(), 3);
        assert_eq!(*executed.lock().unwrap(), 2);
    }

    #[test]
    fn test_debug_shows_id() {
        let debug = format!("{:?}", Work::identified(42));
        assert!(debug.contains("42"), "got {}", debug);
    }
}

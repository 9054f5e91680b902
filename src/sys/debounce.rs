//! One-shot debounced tasks, at most one in flight per key.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::common::collections::HashMap;

/// Scheduling a task under a key aborts whatever is still pending or running
/// under that key, so only the most recent request ever completes.
pub struct Debouncer<K> {
    tasks: Arc<Mutex<HashMap<K, JoinHandle<()>>>>,
}

impl<K> Clone for Debouncer<K> {
    fn clone(&self) -> Self { Self { tasks: self.tasks.clone() } }
}

impl<K> Default for Debouncer<K> {
    fn default() -> Self { Self { tasks: Arc::default() } }
}

impl<K> Debouncer<K>
where K: Eq + Hash + Clone + std::fmt::Debug + Send + 'static
{
    pub fn new() -> Self { Self::default() }

    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: K, delay: Duration, task: F)
    where F: Future<Output = ()> + Send + 'static {
        let mut tasks = self.tasks.lock();
        if let Some(previous) = tasks.remove(&key) {
            trace!(?key, "superseding debounced task");
            previous.abort();
        }
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        tasks.insert(key, handle);
    }

    pub fn cancel(&self, key: &K) {
        if let Some(handle) = self.tasks.lock().remove(key) {
            handle.abort();
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.tasks.lock().get(key).is_some_and(|h| !h.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn later_request_supersedes_earlier() {
        let debouncer = Debouncer::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));

        for i in 1..=3 {
            let hits = hits.clone();
            let last = last.clone();
            debouncer.schedule("layout", Duration::from_millis(100), async move {
                hits.fetch_add(1, Ordering::SeqCst);
                last.store(i, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_runs() {
        let debouncer = Debouncer::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        debouncer.schedule(1u8, Duration::from_millis(50), async move {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.is_pending(&1));
        debouncer.cancel(&1);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!debouncer.is_pending(&1));
    }
}

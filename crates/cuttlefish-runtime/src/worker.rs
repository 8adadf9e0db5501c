//! Dispatch pool

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Runs submitted dispatches as tasks on the ambient tokio runtime.
///
/// Dispatches are unbounded. A slow downstream never delays another
/// exchange. Parallelism comes from the runtime's worker threads
/// (`gateway.workers`).
#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    active: Arc<AtomicUsize>,
}

/// Counts a dispatch as active until dropped
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl WorkerPool {
    /// Create a new worker pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches submitted and not yet finished
    pub fn active_dispatches(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Submit a dispatch. Returns immediately; the submitter never observes
    /// the outcome.
    pub fn submit<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.active.fetch_add(1, Ordering::SeqCst);
        let guard = ActiveGuard(Arc::clone(&self.active));
        tokio::spawn(async move {
            let _guard = guard;
            task.await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_submit_runs_task() {
        let pool = WorkerPool::new();
        let (tx, rx) = oneshot::channel();
        pool.submit(async move {
            let _ = tx.send(42);
        });
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_dispatch_does_not_delay_others() {
        let pool = WorkerPool::new();

        for _ in 0..64 {
            pool.submit(tokio::time::sleep(Duration::from_secs(3600)));
        }
        assert_eq!(pool.active_dispatches(), 64);

        let (tx, rx) = oneshot::channel();
        pool.submit(async move {
            let _ = tx.send(());
        });
        tokio::time::timeout(Duration::from_millis(1), rx)
            .await
            .expect("fast dispatch was held back")
            .unwrap();
        assert_eq!(pool.active_dispatches(), 64);
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_count_drops_when_done() {
        let pool = WorkerPool::new();
        pool.submit(tokio::time::sleep(Duration::from_secs(1)));
        assert_eq!(pool.active_dispatches(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(pool.active_dispatches(), 0);
    }
}

// Bounded worker pool for store operations.
//
// The host's event loop must never wait on disk. Every ledger/auction call is
// handed to this pool, which runs it on the tokio runtime with at most
// `workers` operations in flight, and returns a handle the caller can await
// or drop.

use super::DbError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct TaskPool {
    runtime: Handle,
    permits: Arc<Semaphore>,
    workers: usize,
}

impl TaskPool {
    pub fn new(runtime: Handle, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            runtime,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// Build a pool on the runtime we are currently running in.
    pub fn from_current(workers: usize) -> Result<Self, DbError> {
        let runtime = Handle::try_current().map_err(|e| DbError::TaskFailed(e.to_string()))?;
        Ok(Self::new(runtime, workers))
    }

    /// Queue `work` on the pool. It starts once a worker slot frees up.
    ///
    /// There is no cancellation; dropping the handle detaches the task and the
    /// work still runs to completion.
    pub fn submit<F, T>(&self, work: F) -> TaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let inner = self.runtime.spawn(async move {
            // The semaphore is never closed, so a failed acquire cannot happen.
            let _permit = permits.acquire_owned().await.ok();
            work.await
        });
        TaskHandle { inner }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Operations currently holding a worker slot.
    pub fn in_flight(&self) -> usize {
        self.workers - self.permits.available_permits()
    }
}

/// Completion handle for work submitted to a [`TaskPool`].
pub struct TaskHandle<T> {
    inner: JoinHandle<T>,
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T, DbError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner)
            .poll(cx)
            .map(|joined| joined.map_err(|e| DbError::TaskFailed(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_submit_returns_result() {
        let pool = TaskPool::from_current(2).unwrap();
        let value = pool.submit(async { 21 * 2 }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_panicking_task_reports_failure() {
        let pool = TaskPool::from_current(1).unwrap();
        let result = pool
            .submit(async {
                panic!("boom");
            })
            .await;
        let failed: Result<(), DbError> = result;
        assert!(matches!(failed, Err(DbError::TaskFailed(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let pool = TaskPool::from_current(2).unwrap();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                pool.submit(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(pool.in_flight(), 0);
    }
}

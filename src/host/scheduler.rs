// Host-thread scheduling.
//
// The host owns its state on a single task and never blocks on storage.
// Work goes to the TaskPool; results come back as continuations queued on
// the HostQueue, which only the host loop drains.

use crate::infra::database::{DbError, TaskPool};
use std::future::Future;
use tokio::sync::mpsc;

/// A closure the host runs against its own state.
pub type Continuation<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// Receiving end, owned by the host loop.
pub struct HostQueue<S> {
    tx: mpsc::UnboundedSender<Continuation<S>>,
    rx: mpsc::UnboundedReceiver<Continuation<S>>,
}

impl<S: 'static> HostQueue<S> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn handle(&self) -> HostHandle<S> {
        HostHandle {
            tx: self.tx.clone(),
        }
    }

    /// Wait for the next continuation.
    ///
    /// The queue holds a sender of its own, so this only returns `None` if the
    /// channel is closed out from under it.
    pub async fn recv(&mut self) -> Option<Continuation<S>> {
        self.rx.recv().await
    }

    /// Run everything already queued without waiting. Returns how many ran.
    pub fn run_pending(&mut self, state: &mut S) -> usize {
        let mut ran = 0;
        while let Ok(continuation) = self.rx.try_recv() {
            continuation(state);
            ran += 1;
        }
        ran
    }
}

impl<S: 'static> Default for HostQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable sending end, safe to move onto worker tasks.
pub struct HostHandle<S> {
    tx: mpsc::UnboundedSender<Continuation<S>>,
}

impl<S> Clone for HostHandle<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S: 'static> HostHandle<S> {
    /// Queue `f` for the host thread. Returns false once the host has shut down.
    pub fn post<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        if self.tx.send(Box::new(f)).is_err() {
            tracing::warn!("Host queue closed, dropping continuation");
            return false;
        }
        true
    }
}

/// Runs store work on the pool and hands results back to the host.
pub struct TaskBridge<S> {
    tasks: TaskPool,
    host: HostHandle<S>,
}

impl<S> Clone for TaskBridge<S> {
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
            host: self.host.clone(),
        }
    }
}

impl<S: 'static> TaskBridge<S> {
    pub fn new(tasks: TaskPool, host: HostHandle<S>) -> Self {
        Self { tasks, host }
    }

    /// Run `work` off the host thread, then `then` on it with the outcome.
    ///
    /// `then` sees `Err(DbError::TaskFailed)` if the work panicked.
    pub fn dispatch<F, T, C>(&self, work: F, then: C)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(&mut S, Result<T, DbError>) + Send + 'static,
    {
        let pending = self.tasks.submit(work);
        let host = self.host.clone();

        tokio::spawn(async move {
            let outcome = pending.await;
            if let Err(e) = &outcome {
                tracing::error!("Host dispatch failed: {}", e);
            }
            host.post(move |state| then(state, outcome));
        });
    }
}

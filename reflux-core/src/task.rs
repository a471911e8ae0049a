// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Background workers with cooperative cancellation.
//!
//! Sources push items from a [`WorkerTask`] spawned on the tokio runtime. Stopping
//! a worker signals its [`CancellationToken`] (the worker checks it between
//! items). A worker still running after [`STOP_GRACE`] is aborted, so a worker
//! parked on a slow observer does not outlive its registration.

use crate::CancellationToken;
use core::future::Future;
use core::time::Duration;
use tokio::task::JoinHandle;

/// How long a stopped worker may keep running before it is aborted.
pub const STOP_GRACE: Duration = Duration::from_millis(20);

/// Handle to a spawned worker. Dropping the handle stops the worker.
///
/// # Example
///
/// ```rust
/// use reflux_core::WorkerTask;
///
/// # #[tokio::main]
/// # async fn main() {
/// let task = WorkerTask::spawn(|cancel| async move {
///     cancel.cancelled().await;
/// });
///
/// task.stop();
/// assert!(task.is_stopped());
/// # }
/// ```
#[derive(Debug)]
pub struct WorkerTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl WorkerTask {
    /// Spawn a worker on the current tokio runtime.
    ///
    /// The closure receives the token that [`stop`](Self::stop) cancels.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime, like `tokio::spawn`.
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(f(cancel.clone()));

        Self { cancel, handle }
    }

    /// Signals the worker to stop. A worker still running after
    /// [`STOP_GRACE`] is aborted; outside a runtime it is aborted at once.
    pub fn stop(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        if self.handle.is_finished() {
            return;
        }

        let abort = self.handle.abort_handle();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    tokio::time::sleep(STOP_GRACE).await;
                    abort.abort();
                });
            }
            Err(_) => abort.abort(),
        }
    }

    /// Returns `true` once [`stop`](Self::stop) was called or the handle dropped.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns `true` once the worker's future completed or was aborted.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for WorkerTask {
    fn drop(&mut self) {
        self.stop();
    }
}

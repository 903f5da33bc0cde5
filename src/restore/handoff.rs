//! Single-result background task
//!
//! A spawned task that produces exactly one value, handed back over a
//! oneshot channel. The waiter races the value against the caller's
//! cancellation token and a deadline. Whatever wins, the task is told to
//! stop and the waiter returns only after the task has finished, so any
//! cleanup the task does (closing a stream) is done by then.
//!
//! The work must observe the token it is given.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How waiting on a [`SingleResultTask`] ended.
#[derive(Debug, PartialEq, Eq)]
pub enum TaskOutcome<T> {
    Completed(T),
    /// The caller's token fired first
    Cancelled,
    /// The deadline passed first
    TimedOut,
    /// The task ended without producing a value
    Abandoned,
}

pub struct SingleResultTask<T> {
    rx: oneshot::Receiver<T>,
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl<T: Send + 'static> SingleResultTask<T> {
    /// Spawn `work` on the runtime. `work` receives the token that asks it
    /// to stop.
    pub fn spawn<F, Fut>(work: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let stop = CancellationToken::new();
        let (tx, rx) = oneshot::channel();
        let fut = work(stop.clone());
        let handle = tokio::spawn(async move {
            let value = fut.await;
            // receiver gone means nobody wants the value anymore
            let _ = tx.send(value);
        });
        Self { rx, stop, handle }
    }

    /// Wait for the value, the caller's cancellation, or `timeout`.
    pub async fn wait(mut self, cancel: &CancellationToken, timeout: Duration) -> TaskOutcome<T> {
        let outcome = tokio::select! {
            biased;
            res = &mut self.rx => match res {
                Ok(value) => TaskOutcome::Completed(value),
                Err(_) => TaskOutcome::Abandoned,
            },
            _ = cancel.cancelled() => TaskOutcome::Cancelled,
            _ = tokio::time::sleep(timeout) => TaskOutcome::TimedOut,
        };
        self.stop.cancel();
        let _ = (&mut self.handle).await;
        outcome
    }
}

impl<T> Drop for SingleResultTask<T> {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

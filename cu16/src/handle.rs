//! Asynchronously resolved command results

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::error::{Error, Result};

/// Outcome of one queued command
///
/// Await it from async code, call [`wait`](Self::wait) from a plain thread,
/// or poll it with [`try_take`](Self::try_take). Dropping the handle discards
/// the result; the command itself still runs.
#[must_use = "a command handle does nothing unless its result is taken"]
#[derive(Debug)]
pub struct CommandHandle<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> CommandHandle<T> {
    pub(crate) fn channel() -> (oneshot::Sender<Result<T>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }
    
    /// A handle that is already resolved
    pub(crate) fn ready(result: Result<T>) -> Self {
        let (tx, handle) = Self::channel();
        let _ = tx.send(result);
        handle
    }
    
    /// Block the current thread until the command finishes
    ///
    /// # Panics
    ///
    /// Panics when called from within an async runtime; `.await` the handle there.
    pub fn wait(self) -> Result<T> {
        self.rx.blocking_recv().unwrap_or(Err(Error::WorkerLost))
    }
    
    /// Take the result if the command already finished
    pub fn try_take(&mut self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(Error::WorkerLost)),
        }
    }
}

impl<T> Future for CommandHandle<T> {
    type Output = Result<T>;
    
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(Error::WorkerLost)))
    }
}

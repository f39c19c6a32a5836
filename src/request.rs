//! Background execution of blocking account calls

use tokio::task::JoinHandle;

use crate::error::{OperationFailure, Result};

/// A blocking account call running on tokio's blocking pool
pub struct Request<T> {
    handle: JoinHandle<Result<T>>,
}

impl<T: Send + 'static> Request<T> {
    /// Start `job` on the blocking pool. Must be called inside a tokio runtime.
    pub fn spawn<F>(job: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        Self {
            handle: tokio::task::spawn_blocking(job),
        }
    }

    /// Wait for the call to finish
    pub async fn run(self) -> Result<T> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(OperationFailure::Interrupted(e.to_string()).into()),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

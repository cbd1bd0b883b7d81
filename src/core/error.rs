//! Error types for worker operations.

use std::any::Any;

use thiserror::Error;

/// Errors produced when driving a worker's lifecycle.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// `run()` was called on an instance that has already been started.
    #[error("worker has already been started")]
    AlreadyRunning,
    /// Worker configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The native thread could not be spawned.
    #[error("failed to spawn worker thread")]
    Spawn(#[from] std::io::Error),
}

/// Failure outcomes carried by a completion handle in place of a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The task was dropped before the worker executed it.
    #[error("task was cancelled before completion")]
    Cancelled,
    /// The work contract panicked while processing the task.
    #[error("work panicked: {0}")]
    Panicked(String),
    /// A bounded wait elapsed before the task resolved.
    #[error("timed out waiting for completion")]
    Timeout,
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

/// Best-effort extraction of a human-readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_owned()
    }
}

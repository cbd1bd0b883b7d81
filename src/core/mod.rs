//! Core execution abstractions: workers, contracts, and completion handles.

pub mod active_worker;
pub mod contract;
pub mod error;
pub mod handle;
pub(crate) mod lifecycle;
pub mod loop_worker;

pub use active_worker::ActiveWorker;
pub use contract::{work_fn, LoopContract, WorkContract};
pub use error::{AppResult, TaskError, WorkerError};
pub use handle::{completion_pair, CompletionHandle, Promise};
pub use lifecycle::RunState;
pub use loop_worker::LoopWorker;

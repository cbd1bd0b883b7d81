//! # Threadwork
//!
//! Dedicated-thread execution primitives: loop workers, active objects, and
//! cross-platform thread priority control.
//!
//! This library provides two reusable execution abstractions, both built on
//! a single owned OS thread:
//!
//! - **`LoopWorker`**: repeatedly invokes one unit of work on a dedicated
//!   thread until cooperatively stopped.
//! - **`ActiveWorker`**: an active object: a dedicated thread that
//!   serially drains a FIFO queue of externally submitted tasks, each task
//!   resolving its own awaitable completion handle.
//!
//! Both normalize thread identity and scheduling priority across host
//! operating systems into one interface: a single `Priority` descriptor
//! covers the Windows fixed-class family and the POSIX policy-plus-level
//! family, translated to native calls at the thread boundary. Combinations
//! a host cannot represent are explicit errors, never silent
//! approximations.
//!
//! ## Core Guarantees
//!
//! - **Run-once lifecycle**: `run()` succeeds at most once per worker;
//!   `stop()` is idempotent, non-blocking, and cooperative.
//! - **FIFO execution**: an `ActiveWorker` executes tasks in the order
//!   their `notify()` calls acquired the queue lock, one at a time, on one
//!   thread, so the work contract gets mutual exclusion for free.
//! - **No abandoned waiters**: every completion handle resolves exactly
//!   once. Tasks still queued when a worker stops resolve with a
//!   cancellation outcome; a panicking work contract fails only the
//!   affected task's handle.
//! - **Join on drop**: dropping a worker stops it and joins the backing
//!   thread, so the work contract is never invoked after the worker is
//!   gone.
//!
//! ## LoopWorker
//!
//! ```rust,ignore
//! use threadwork::LoopWorker;
//!
//! let worker = LoopWorker::new(|| {
//!     // one bounded iteration of work
//! });
//! let done = worker.run()?;
//! // ... later ...
//! worker.stop();
//! done.wait()?;
//! ```
//!
//! ## ActiveWorker
//!
//! ```rust,ignore
//! use threadwork::{work_fn, ActiveWorker};
//!
//! let worker = ActiveWorker::new(work_fn(|x: i32| x * x));
//! let run = worker.run()?;
//!
//! let squared = worker.notify(3);
//! assert_eq!(squared.wait()?, 9);
//!
//! worker.stop();
//! run.wait()?;
//! ```
//!
//! Completion handles can be blocked on (`wait`, `wait_for`), polled
//! (`try_take`), or awaited: they implement `std::future::Future` directly,
//! with no runtime dependency.
//!
//! ## Thread Priority
//!
//! ```rust,ignore
//! use threadwork::{Priority, PriorityClass, WorkerConfig};
//!
//! let config = WorkerConfig::new()
//!     .with_name("audio-mixer")
//!     .with_priority(Priority::realtime(PriorityClass::Fifo, 40));
//! let worker = threadwork::ActiveWorker::with_config(mixer, config)?;
//! ```
//!
//! For complete examples, see the integration tests under `tests/`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core execution abstractions: workers, contracts, and completion handles.
pub mod core;
/// Configuration models for workers.
pub mod config;
/// Native thread ownership and the host priority boundary.
pub mod os;
/// Shared utilities.
pub mod util;

pub use crate::config::WorkerConfig;
pub use crate::core::{
    completion_pair, work_fn, ActiveWorker, AppResult, CompletionHandle, LoopContract, LoopWorker,
    Promise, RunState, TaskError, WorkContract, WorkerError,
};
pub use crate::os::{spawn_detached, Priority, PriorityClass, PriorityError, ThreadHandle};

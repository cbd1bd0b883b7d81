//! Native thread ownership: lifecycle, priority, and naming behind one
//! interface.
//!
//! [`ThreadHandle`] owns exactly one OS thread. The priority and name stored
//! on the handle are applied inside the new thread before its work function
//! runs; both can also be changed while the thread is live, translated to
//! the host's native calls by the platform modules in this directory.

pub mod priority;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
use unix as native;
#[cfg(windows)]
use windows as native;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::core::error::{panic_message, TaskError, WorkerError};
use crate::core::handle::{completion_pair, CompletionHandle};

pub use priority::{Priority, PriorityClass, PriorityError};

#[cfg(unix)]
type NativeId = std::os::unix::thread::RawPthread;
#[cfg(windows)]
type NativeId = std::os::windows::io::RawHandle;

#[cfg(unix)]
fn native_id(handle: &JoinHandle<()>) -> NativeId {
    use std::os::unix::thread::JoinHandleExt;
    handle.as_pthread_t()
}

#[cfg(windows)]
fn native_id(handle: &JoinHandle<()>) -> NativeId {
    use std::os::windows::io::AsRawHandle;
    handle.as_raw_handle()
}

/// Owner of one native OS thread.
///
/// The handle is created idle; `start` spawns the thread at most once and
/// returns a completion handle resolved when the work function returns.
/// Dropping the handle joins the thread, so a live thread can never outlive
/// the state its work function borrowed from its spawner.
#[derive(Debug, Default)]
pub struct ThreadHandle {
    name: String,
    priority: Priority,
    thread: Option<JoinHandle<()>>,
    started: bool,
}

impl ThreadHandle {
    /// Create an idle handle with the host-default priority and no name.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the native thread executing `work`.
    ///
    /// The configured priority and name are applied inside the new thread
    /// before `work` runs; a native priority failure at this point is logged
    /// and does not prevent the thread from running. The returned handle
    /// resolves with `Ok(())` when `work` returns, or with
    /// [`TaskError::Panicked`] if it unwinds.
    ///
    /// # Errors
    ///
    /// [`WorkerError::AlreadyRunning`] if `start` was already called on this
    /// handle; [`WorkerError::Spawn`] if the OS refuses the thread.
    pub fn start<F>(&mut self, work: F) -> Result<CompletionHandle<()>, WorkerError>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.started {
            return Err(WorkerError::AlreadyRunning);
        }

        let (promise, completion) = completion_pair();
        let priority = self.priority;
        let mut builder = thread::Builder::new();
        if !self.name.is_empty() {
            builder = builder.name(self.name.clone());
        }
        let joined = builder.spawn(move || {
            if !priority.is_default() {
                if let Err(error) = native::apply_priority_self(&priority) {
                    warn!(%error, "failed to apply thread priority at start");
                }
            }
            match catch_unwind(AssertUnwindSafe(work)) {
                Ok(()) => promise.resolve(()),
                Err(payload) => promise.fail(TaskError::Panicked(panic_message(payload.as_ref()))),
            }
        })?;

        self.thread = Some(joined);
        self.started = true;
        Ok(completion)
    }

    /// Release ownership of the native thread without waiting for it.
    ///
    /// After detaching, `join` is no longer possible and the thread runs to
    /// completion on its own.
    pub fn detach(&mut self) {
        if let Some(handle) = self.thread.take() {
            drop(handle);
            debug!(name = %self.name, "thread detached");
        }
    }

    /// Block until the native thread terminates. No-op if the thread was
    /// never started, already joined, or detached.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!(name = %self.name, "thread panicked before join");
            }
        }
    }

    /// Set the scheduling priority.
    ///
    /// Before `start`, the descriptor is validated against this host and
    /// stored for use at spawn time. On a live thread, the host-default
    /// descriptor is already satisfied and stored without a native call;
    /// any other descriptor triggers a native priority change. On failure
    /// the stored descriptor is left at its last valid value, so it never
    /// disagrees with what the native thread actually has.
    ///
    /// # Errors
    ///
    /// [`PriorityError::Unsupported`] / [`PriorityError::InvalidLevel`] for
    /// descriptors this host cannot represent; [`PriorityError::Native`] if
    /// the native call fails (e.g. insufficient privilege).
    pub fn set_priority(&mut self, priority: Priority) -> Result<(), PriorityError> {
        native::supported(&priority)?;
        match &self.thread {
            None => {
                self.priority = priority;
                Ok(())
            }
            Some(_) if priority.is_default() => {
                self.priority = priority;
                Ok(())
            }
            Some(handle) => match native::apply_priority(native_id(handle), &priority) {
                Ok(()) => {
                    self.priority = priority;
                    Ok(())
                }
                Err(error) => {
                    warn!(%error, name = %self.name, "native priority change failed");
                    Err(error)
                }
            },
        }
    }

    /// The currently stored priority descriptor.
    #[must_use]
    pub fn get_priority(&self) -> Priority {
        self.priority
    }

    /// Set the thread name. A live thread is retagged where the host
    /// supports it; a retag failure is logged and otherwise ignored.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        if let Some(handle) = &self.thread {
            if let Err(error) = native::apply_name(native_id(handle), &self.name) {
                warn!(%error, name = %self.name, "failed to rename live thread");
            }
        }
    }

    /// The currently stored thread name.
    #[must_use]
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

impl Drop for ThreadHandle {
    fn drop(&mut self) {
        self.join();
    }
}

/// Run `work` on a throwaway detached thread.
///
/// Fire-and-forget with an observable outcome: the thread is never joined,
/// but the returned handle still resolves when `work` returns (or carries
/// the panic if it unwinds).
///
/// # Errors
///
/// [`WorkerError::Spawn`] if the OS refuses the thread.
pub fn spawn_detached<F>(work: F) -> Result<CompletionHandle<()>, WorkerError>
where
    F: FnOnce() + Send + 'static,
{
    let mut handle = ThreadHandle::new();
    let completion = handle.start(work)?;
    handle.detach();
    Ok(completion)
}

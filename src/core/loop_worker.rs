//! Continuously-looping worker on a dedicated thread.

use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::config::WorkerConfig;
use crate::core::contract::LoopContract;
use crate::core::error::WorkerError;
use crate::core::handle::CompletionHandle;
use crate::core::lifecycle::{Lifecycle, RunState};
use crate::os::{Priority, PriorityError, ThreadHandle};

/// A worker that repeatedly invokes its loop contract on one dedicated
/// thread until stopped.
///
/// `run` may be called at most once per instance. Termination is
/// cooperative: `stop` raises a flag that the loop observes after the
/// current `work` invocation completes. The contract runs exclusively on
/// the spawned thread; nothing else ever invokes it.
///
/// Dropping a `LoopWorker` requests stop and joins the backing thread, so
/// the contract is never called after the worker is gone.
pub struct LoopWorker<C: LoopContract> {
    lifecycle: Arc<Lifecycle>,
    contract: Mutex<Option<C>>,
    thread: Mutex<ThreadHandle>,
}

impl<C: LoopContract> LoopWorker<C> {
    /// Create a worker around `contract` with default settings.
    pub fn new(contract: C) -> Self {
        Self {
            lifecycle: Arc::new(Lifecycle::new()),
            contract: Mutex::new(Some(contract)),
            thread: Mutex::new(ThreadHandle::new()),
        }
    }

    /// Create a worker with a validated configuration applied.
    ///
    /// # Errors
    ///
    /// [`WorkerError::InvalidConfig`] if the configuration fails validation
    /// or its priority is not representable on this host.
    pub fn with_config(contract: C, config: WorkerConfig) -> Result<Self, WorkerError> {
        config.validate().map_err(WorkerError::InvalidConfig)?;
        let worker = Self::new(contract);
        {
            let mut thread = worker.thread.lock();
            thread.set_name(config.name);
            thread
                .set_priority(config.priority)
                .map_err(|error| WorkerError::InvalidConfig(error.to_string()))?;
        }
        Ok(worker)
    }

    /// Start the dedicated thread and loop the contract on it.
    ///
    /// Returns a completion handle resolved when the loop exits: with
    /// `Ok(())` after a cooperative stop, or carrying the failure if the
    /// contract panics (which also ends the loop).
    ///
    /// # Errors
    ///
    /// [`WorkerError::AlreadyRunning`] on any call after the first;
    /// [`WorkerError::Spawn`] if the OS refuses the thread, in which case
    /// the instance is left stopped.
    pub fn run(&self) -> Result<CompletionHandle<()>, WorkerError> {
        if !self.lifecycle.try_start() {
            return Err(WorkerError::AlreadyRunning);
        }
        let Some(mut contract) = self.contract.lock().take() else {
            return Err(WorkerError::AlreadyRunning);
        };

        let lifecycle = Arc::clone(&self.lifecycle);
        let started = self.thread.lock().start(move || {
            debug!("loop worker started");
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                while lifecycle.is_running() {
                    contract.work();
                }
            }));
            lifecycle.enter_stopped();
            debug!("loop worker exiting");
            if let Err(payload) = outcome {
                // Surface the failure through the run's completion handle.
                resume_unwind(payload);
            }
        });

        match started {
            Ok(completion) => Ok(completion),
            Err(error) => {
                self.lifecycle.enter_stopped();
                Err(error)
            }
        }
    }

    /// Request cooperative termination. Non-blocking and idempotent; the
    /// in-flight `work` invocation completes before the loop exits.
    pub fn stop(&self) {
        self.lifecycle.request_stop();
    }

    /// True iff `run` has been called and stop has not yet been requested.
    #[must_use]
    pub fn status(&self) -> bool {
        self.lifecycle.is_running()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.lifecycle.current()
    }

    /// Set the scheduling priority, applied natively if the thread is live.
    ///
    /// # Errors
    ///
    /// See [`ThreadHandle::set_priority`]; on failure the stored descriptor
    /// is unchanged.
    pub fn set_priority(&self, priority: Priority) -> Result<(), PriorityError> {
        self.thread.lock().set_priority(priority)
    }

    /// The currently stored priority descriptor.
    #[must_use]
    pub fn get_priority(&self) -> Priority {
        self.thread.lock().get_priority()
    }

    /// Set the thread name, retagging the live thread where supported.
    pub fn set_name(&self, name: impl Into<String>) {
        self.thread.lock().set_name(name);
    }

    /// The currently stored thread name.
    #[must_use]
    pub fn get_name(&self) -> String {
        self.thread.lock().get_name().to_owned()
    }
}

impl<C: LoopContract> Drop for LoopWorker<C> {
    fn drop(&mut self) {
        self.stop();
        self.thread.lock().join();
    }
}

//! Active-object worker: one dedicated consumer thread serially draining a
//! FIFO queue of tasks submitted by any number of producer threads.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::config::WorkerConfig;
use crate::core::contract::WorkContract;
use crate::core::error::{panic_message, TaskError, WorkerError};
use crate::core::handle::{completion_pair, CompletionHandle, Promise};
use crate::core::lifecycle::{Lifecycle, RunState};
use crate::os::{Priority, PriorityError, ThreadHandle};

/// One queued unit of work: the input plus the promise resolved with its
/// output. Consumed exactly once by the worker thread.
struct Task<In, Out> {
    input: In,
    promise: Promise<Out>,
}

/// Queue state shared between producers and the consumer thread.
///
/// The lifecycle flag is read under the queue lock on both the producer and
/// consumer paths, so a stop can never race a submission into the void: a
/// producer either enqueues before the stop transition or observes it and
/// cancels immediately.
struct Channel<In, Out> {
    lifecycle: Lifecycle,
    queue: Mutex<VecDeque<Task<In, Out>>>,
    ready: Condvar,
}

/// A worker that executes externally submitted tasks on one dedicated
/// thread, in submission order, each task resolving its own completion
/// handle.
///
/// `notify` never blocks; tasks are totally ordered by the order in which
/// `notify` calls acquire the queue lock, regardless of producer thread.
/// Processing is strictly sequential and single-consumer, which gives the
/// work contract an implicit mutual-exclusion guarantee over any state it
/// touches.
///
/// On stop, the task currently executing runs to completion and resolves
/// normally; tasks still queued are resolved with [`TaskError::Cancelled`]
/// so no caller is left waiting on work that will never happen. Dropping an
/// `ActiveWorker` requests stop and joins the backing thread.
pub struct ActiveWorker<C: WorkContract> {
    channel: Arc<Channel<C::In, C::Out>>,
    contract: Mutex<Option<C>>,
    thread: Mutex<ThreadHandle>,
}

impl<C: WorkContract> ActiveWorker<C> {
    /// Create a worker around `contract` with default settings.
    pub fn new(contract: C) -> Self {
        Self {
            channel: Arc::new(Channel {
                lifecycle: Lifecycle::new(),
                queue: Mutex::new(VecDeque::new()),
                ready: Condvar::new(),
            }),
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

    /// Submit a task carrying `input` and return its completion handle.
    ///
    /// Safe to call from any number of threads; returns immediately. Tasks
    /// submitted before `run` are queued and executed once the worker
    /// starts. After stop has been requested, the returned handle resolves
    /// with [`TaskError::Cancelled`] instead of queueing work that can
    /// never run.
    pub fn notify(&self, input: C::In) -> CompletionHandle<C::Out> {
        let (promise, handle) = completion_pair();

        let mut queue = self.channel.queue.lock();
        let rejected = match self.channel.lifecycle.current() {
            RunState::Stopping | RunState::Stopped => Some(promise),
            RunState::NotStarted | RunState::Running => {
                queue.push_back(Task { input, promise });
                self.channel.ready.notify_one();
                None
            }
        };
        drop(queue);
        // Dropping an unresolved promise outside the lock resolves the
        // handle with Cancelled.
        drop(rejected);

        handle
    }

    /// Start the dedicated consumer thread.
    ///
    /// Returns a completion handle resolved with `Ok(())` when the consumer
    /// loop exits after a stop. A panicking work contract fails only the
    /// affected task's handle; the consumer thread keeps draining.
    ///
    /// # Errors
    ///
    /// [`WorkerError::AlreadyRunning`] on any call after the first;
    /// [`WorkerError::Spawn`] if the OS refuses the thread, in which case
    /// the instance is left stopped.
    pub fn run(&self) -> Result<CompletionHandle<()>, WorkerError> {
        if !self.channel.lifecycle.try_start() {
            return Err(WorkerError::AlreadyRunning);
        }
        let Some(mut contract) = self.contract.lock().take() else {
            return Err(WorkerError::AlreadyRunning);
        };

        let channel = Arc::clone(&self.channel);
        let started = self.thread.lock().start(move || {
            debug!("active worker started");
            loop {
                let dequeued = {
                    let mut queue = channel.queue.lock();
                    loop {
                        if !channel.lifecycle.is_running() {
                            break None;
                        }
                        if let Some(task) = queue.pop_front() {
                            break Some(task);
                        }
                        channel.ready.wait(&mut queue);
                    }
                };
                let Some(Task { input, promise }) = dequeued else {
                    break;
                };

                match catch_unwind(AssertUnwindSafe(|| contract.work(input))) {
                    Ok(output) => promise.resolve(output),
                    Err(payload) => {
                        warn!("work contract panicked; failing the task");
                        promise.fail(TaskError::Panicked(panic_message(payload.as_ref())));
                    }
                }
            }

            channel.lifecycle.enter_stopped();
            // Cancel everything still queued so no caller hangs. Producers
            // that lost the race observe Stopping/Stopped under the lock
            // and cancel their own submissions.
            let abandoned: Vec<_> = channel.queue.lock().drain(..).collect();
            if !abandoned.is_empty() {
                debug!(count = abandoned.len(), "cancelling tasks queued at stop");
            }
            drop(abandoned);
            debug!("active worker exiting");
        });

        match started {
            Ok(completion) => Ok(completion),
            Err(error) => {
                self.channel.lifecycle.enter_stopped();
                Err(error)
            }
        }
    }

    /// Request cooperative termination and wake the consumer if it is
    /// blocked on an empty queue. Non-blocking and idempotent. The task in
    /// execution (if any) completes and resolves normally; queued tasks are
    /// cancelled.
    pub fn stop(&self) {
        let queue = self.channel.queue.lock();
        if self.channel.lifecycle.request_stop() {
            self.channel.ready.notify_one();
        }
        drop(queue);
    }

    /// True iff `run` has been called and stop has not yet been requested.
    #[must_use]
    pub fn status(&self) -> bool {
        self.channel.lifecycle.is_running()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.channel.lifecycle.current()
    }

    /// Number of tasks currently waiting in the queue.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.channel.queue.lock().len()
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

impl<C> ActiveWorker<C>
where
    C: WorkContract<In = ()>,
{
    /// Submit an input-less task.
    pub fn trigger(&self) -> CompletionHandle<C::Out> {
        self.notify(())
    }
}

impl<C: WorkContract> Drop for ActiveWorker<C> {
    fn drop(&mut self) {
        self.stop();
        self.thread.lock().join();
    }
}

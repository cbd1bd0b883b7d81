//! One-shot completion handles and their resolving side.
//!
//! A [`Promise`] / [`CompletionHandle`] pair represents the eventual outcome
//! of a single unit of asynchronous work. The worker resolves the promise
//! exactly once; the caller observes the outcome by blocking (`wait`,
//! `wait_for`), polling (`try_take`), or awaiting the handle as a
//! `std::future::Future`.
//!
//! # Design
//!
//! - **No polling**: blocking waiters sleep on a `parking_lot::Condvar`
//!   paired with the slot's mutex; async waiters park their `Waker` in the
//!   slot and are woken on resolution.
//! - **Exactly-once resolution**: `resolve`/`fail` consume the promise, so a
//!   second resolution does not type-check.
//! - **No abandoned waiters**: dropping an unresolved promise resolves the
//!   handle with [`TaskError::Cancelled`], so a caller blocked on `wait`
//!   can never hang on work that will no longer happen.

use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::error::TaskError;

/// Slot state shared between a promise and its handle.
enum Slot<T> {
    /// Not yet resolved; holds the waker of a pending `.await`, if any.
    Pending(Option<Waker>),
    /// Resolved, outcome not yet consumed.
    Ready(Result<T, TaskError>),
    /// Resolved and consumed.
    Taken,
}

impl<T> Slot<T> {
    /// Move a ready outcome out, leaving the slot `Taken`.
    fn take_ready(&mut self) -> Option<Result<T, TaskError>> {
        if matches!(self, Self::Ready(_)) {
            if let Self::Ready(outcome) = mem::replace(self, Self::Taken) {
                return Some(outcome);
            }
        }
        None
    }
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

/// Create a connected promise/handle pair.
#[must_use]
pub fn completion_pair<T>() -> (Promise<T>, CompletionHandle<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot::Pending(None)),
        ready: Condvar::new(),
    });
    (
        Promise {
            shared: Arc::clone(&shared),
            done: false,
        },
        CompletionHandle { shared },
    )
}

/// The resolving side of a one-shot completion pair.
///
/// Held by the worker that will produce the outcome. Resolution consumes the
/// promise; if the promise is dropped unresolved, the paired handle observes
/// [`TaskError::Cancelled`].
pub struct Promise<T> {
    shared: Arc<Shared<T>>,
    done: bool,
}

impl<T> Promise<T> {
    /// Resolve the paired handle with a value.
    pub fn resolve(mut self, value: T) {
        self.complete(Ok(value));
    }

    /// Resolve the paired handle with a failure outcome.
    pub fn fail(mut self, error: TaskError) {
        self.complete(Err(error));
    }

    fn complete(&mut self, outcome: Result<T, TaskError>) {
        self.done = true;
        let mut slot = self.shared.slot.lock();
        if let Slot::Pending(waker) = &mut *slot {
            let waker = waker.take();
            *slot = Slot::Ready(outcome);
            self.shared.ready.notify_all();
            drop(slot);
            if let Some(waker) = waker {
                waker.wake();
            }
        }
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        if !self.done {
            self.complete(Err(TaskError::Cancelled));
        }
    }
}

/// The observing side of a one-shot completion pair.
///
/// Resolves exactly once with `Result<T, TaskError>`. The outcome can be
/// awaited (`CompletionHandle` implements `Future`), blocked on (`wait`,
/// `wait_for`), or polled without blocking (`try_take`).
pub struct CompletionHandle<T> {
    shared: Arc<Shared<T>>,
}

impl<T> CompletionHandle<T> {
    /// Block the calling thread until the outcome is available.
    pub fn wait(self) -> Result<T, TaskError> {
        let mut slot = self.shared.slot.lock();
        loop {
            if let Some(outcome) = slot.take_ready() {
                return outcome;
            }
            if matches!(*slot, Slot::Taken) {
                return Err(TaskError::Cancelled);
            }
            self.shared.ready.wait(&mut slot);
        }
    }

    /// Block until the outcome is available or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Timeout`] if the handle did not resolve in time.
    pub fn wait_for(self, timeout: Duration) -> Result<T, TaskError> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.shared.slot.lock();
        loop {
            if let Some(outcome) = slot.take_ready() {
                return outcome;
            }
            if matches!(*slot, Slot::Taken) {
                return Err(TaskError::Cancelled);
            }
            if self.shared.ready.wait_until(&mut slot, deadline).timed_out() {
                return slot.take_ready().unwrap_or(Err(TaskError::Timeout));
            }
        }
    }

    /// Take the outcome if it is already available, without blocking.
    pub fn try_take(&mut self) -> Option<Result<T, TaskError>> {
        self.shared.slot.lock().take_ready()
    }

    /// Whether the paired promise has been resolved (or dropped).
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(*self.shared.slot.lock(), Slot::Pending(_))
    }
}

impl<T> Future for CompletionHandle<T> {
    type Output = Result<T, TaskError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.shared.slot.lock();
        if let Some(outcome) = slot.take_ready() {
            return Poll::Ready(outcome);
        }
        match &mut *slot {
            Slot::Pending(waker) => {
                *waker = Some(cx.waker().clone());
                Poll::Pending
            }
            // Polled again after the outcome was consumed.
            Slot::Ready(_) | Slot::Taken => Poll::Ready(Err(TaskError::Cancelled)),
        }
    }
}

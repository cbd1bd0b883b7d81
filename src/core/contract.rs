//! Work contracts supplied by users of the workers.
//!
//! A contract is an injected strategy: the worker owns the thread and the
//! queue, the contract owns the domain logic. Composition (rather than
//! inheritance from a worker base) keeps the queue and completion-handle
//! plumbing independent of what the work actually does.

use std::marker::PhantomData;

/// The unit of work a `LoopWorker` repeats.
///
/// `work` is invoked continuously on the dedicated thread until the worker
/// is stopped; it should represent one bounded iteration, not an internal
/// loop of its own. Implemented by any `FnMut() + Send` closure.
pub trait LoopContract: Send + 'static {
    /// Perform one iteration of work.
    fn work(&mut self);
}

impl<F> LoopContract for F
where
    F: FnMut() + Send + 'static,
{
    fn work(&mut self) {
        self();
    }
}

/// The operation an `ActiveWorker` applies to each submitted task.
///
/// `In` and `Out` cover the four input/output shapes of an active object:
/// use `()` for "no input" or "no output". The worker guarantees `work` is
/// only ever invoked from its single consumer thread, one task at a time,
/// so implementations get mutual exclusion over their own state for free.
pub trait WorkContract: Send + 'static {
    /// Input consumed by one task.
    type In: Send + 'static;
    /// Output delivered through the task's completion handle.
    type Out: Send + 'static;

    /// Process one task.
    fn work(&mut self, input: Self::In) -> Self::Out;
}

/// Adapt a closure into a [`WorkContract`].
///
/// A blanket impl for `FnMut(In) -> Out` is not expressible (the closure's
/// argument and return types cannot be inferred as associated types), so
/// this wrapper does the lifting instead.
pub fn work_fn<In, Out, F>(f: F) -> impl WorkContract<In = In, Out = Out>
where
    F: FnMut(In) -> Out + Send + 'static,
    In: Send + 'static,
    Out: Send + 'static,
{
    FnContract {
        f,
        _marker: PhantomData,
    }
}

struct FnContract<F, In, Out> {
    f: F,
    _marker: PhantomData<fn(In) -> Out>,
}

impl<F, In, Out> WorkContract for FnContract<F, In, Out>
where
    F: FnMut(In) -> Out + Send + 'static,
    In: Send + 'static,
    Out: Send + 'static,
{
    type In = In;
    type Out = Out;

    fn work(&mut self, input: In) -> Out {
        (self.f)(input)
    }
}

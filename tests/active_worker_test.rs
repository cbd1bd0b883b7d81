//! Integration tests for `ActiveWorker`
//!
//! These tests validate the active-object semantics:
//! - FIFO execution in notify order, across producer threads
//! - All four input/output contract shapes
//! - Exactly-once resolution of every completion handle
//! - Stop semantics: in-flight task completes, queued tasks cancel
//! - Per-task failure isolation when the contract panics
//! - Awaiting handles from an async context

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use threadwork::{
    work_fn, ActiveWorker, RunState, TaskError, WorkContract, WorkerConfig, WorkerError,
};

// ============================================================================
// TEST CONTRACTS
// ============================================================================

/// In = i32, Out = i32: squares its input.
struct Square;

impl WorkContract for Square {
    type In = i32;
    type Out = i32;

    fn work(&mut self, input: i32) -> i32 {
        input * input
    }
}

/// In = i32, Out = (): records the sequence of inputs it saw.
struct Recorder {
    seen: Arc<Mutex<Vec<i32>>>,
}

impl WorkContract for Recorder {
    type In = i32;
    type Out = ();

    fn work(&mut self, input: i32) {
        self.seen.lock().push(input);
    }
}

/// In = (), Out = usize: hands out an incrementing sequence number.
struct Sequencer {
    next: usize,
}

impl WorkContract for Sequencer {
    type In = ();
    type Out = usize;

    fn work(&mut self, (): ()) -> usize {
        let current = self.next;
        self.next += 1;
        current
    }
}

/// In = (), Out = (): counts invocations.
struct Pulse {
    count: Arc<AtomicUsize>,
}

impl WorkContract for Pulse {
    type In = ();
    type Out = ();

    fn work(&mut self, (): ()) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

/// Blocks on a channel inside every task, so the test controls exactly when
/// each execution finishes.
struct Gated {
    release: mpsc::Receiver<()>,
}

impl WorkContract for Gated {
    type In = i32;
    type Out = i32;

    fn work(&mut self, input: i32) -> i32 {
        self.release.recv().expect("gate sender alive");
        input
    }
}

/// Panics on negative inputs, echoes the rest.
struct Picky;

impl WorkContract for Picky {
    type In = i32;
    type Out = i32;

    fn work(&mut self, input: i32) -> i32 {
        assert!(input >= 0, "negative input");
        input
    }
}

// ============================================================================
// FIFO AND CONTRACT SHAPES
// ============================================================================

#[test]
fn test_square_results_in_notify_order() {
    threadwork::util::init_tracing();
    let worker = ActiveWorker::new(Square);
    let run = worker.run().expect("run");

    assert_eq!(worker.notify(3).wait_for(Duration::from_secs(5)), Ok(9));
    assert_eq!(worker.notify(4).wait_for(Duration::from_secs(5)), Ok(16));

    let handles: Vec<_> = (0..6).map(|i| worker.notify(i)).collect();
    // Awaiting out of order still observes each task's own result.
    for (i, handle) in handles.into_iter().enumerate().rev() {
        let expected = i32::try_from(i).expect("small index");
        assert_eq!(
            handle.wait_for(Duration::from_secs(5)),
            Ok(expected * expected)
        );
    }

    worker.stop();
    assert_eq!(run.wait_for(Duration::from_secs(5)), Ok(()));
    assert!(!worker.status());
}

#[test]
fn test_fifo_order_per_producer() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let worker = Arc::new(ActiveWorker::new(Recorder {
        seen: Arc::clone(&seen),
    }));
    let run = worker.run().expect("run");

    // Producer A submits hundreds, producer B submits thousands.
    let spawn_producer = |base: i32| {
        let worker = Arc::clone(&worker);
        thread::spawn(move || {
            (0..50)
                .map(|i| worker.notify(base + i))
                .collect::<Vec<_>>()
        })
    };
    let a = spawn_producer(100);
    let b = spawn_producer(1000);

    for handle in a
        .join()
        .expect("producer a")
        .into_iter()
        .chain(b.join().expect("producer b"))
    {
        assert_eq!(handle.wait_for(Duration::from_secs(5)), Ok(()));
    }

    worker.stop();
    assert_eq!(run.wait_for(Duration::from_secs(5)), Ok(()));

    // Total interleaving is scheduler-dependent, but each producer's own
    // submissions must appear in its submission order.
    let log = seen.lock();
    assert_eq!(log.len(), 100);
    let of_producer =
        |base: i32| -> Vec<i32> { log.iter().copied().filter(|v| v / 100 == base / 100).collect() };
    assert_eq!(of_producer(100), (0..50).map(|i| 100 + i).collect::<Vec<_>>());
    assert_eq!(
        of_producer(1000),
        (0..50).map(|i| 1000 + i).collect::<Vec<_>>()
    );
}

#[test]
fn test_unit_contract_resolves_exactly_once_each() {
    let count = Arc::new(AtomicUsize::new(0));
    let worker = ActiveWorker::new(Pulse {
        count: Arc::clone(&count),
    });
    let run = worker.run().expect("run");

    let handles: Vec<_> = (0..20).map(|_| worker.trigger()).collect();
    for handle in handles {
        assert_eq!(handle.wait_for(Duration::from_secs(5)), Ok(()));
    }
    assert_eq!(count.load(Ordering::Relaxed), 20);

    worker.stop();
    assert_eq!(run.wait_for(Duration::from_secs(5)), Ok(()));
}

#[test]
fn test_input_only_contract_sees_last_value() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let worker = ActiveWorker::new(Recorder {
        seen: Arc::clone(&seen),
    });
    let run = worker.run().expect("run");

    for value in 0..=5 {
        assert_eq!(
            worker.notify(value).wait_for(Duration::from_secs(5)),
            Ok(())
        );
    }

    worker.stop();
    assert_eq!(run.wait_for(Duration::from_secs(5)), Ok(()));
    assert_eq!(*seen.lock(), vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_output_only_contract_sequences() {
    let worker = ActiveWorker::new(Sequencer { next: 0 });
    let run = worker.run().expect("run");

    let handles: Vec<_> = (0..5).map(|_| worker.trigger()).collect();
    let observed: Vec<_> = handles
        .into_iter()
        .map(|h| h.wait_for(Duration::from_secs(5)).expect("sequence number"))
        .collect();
    assert_eq!(observed, vec![0, 1, 2, 3, 4]);

    worker.stop();
    assert_eq!(run.wait_for(Duration::from_secs(5)), Ok(()));
}

#[test]
fn test_work_fn_closure_contract() {
    let worker = ActiveWorker::new(work_fn(|x: u64| x + 1));
    let run = worker.run().expect("run");
    assert_eq!(worker.notify(41).wait_for(Duration::from_secs(5)), Ok(42));
    worker.stop();
    assert_eq!(run.wait_for(Duration::from_secs(5)), Ok(()));
}

// ============================================================================
// STOP AND CANCELLATION
// ============================================================================

#[test]
fn test_stop_completes_inflight_and_cancels_queued() {
    let (gate, release) = mpsc::channel();
    let worker = ActiveWorker::new(Gated { release });
    let run = worker.run().expect("run");

    let first = worker.notify(1);
    // Wait until the consumer has dequeued the first task and is blocked on
    // the gate, so the later submissions are definitely still queued.
    while worker.queued() > 0 {
        thread::sleep(Duration::from_millis(1));
    }
    let second = worker.notify(2);
    let third = worker.notify(3);

    worker.stop();
    assert!(!worker.status());

    // The in-flight task still runs to completion once released.
    gate.send(()).expect("consumer listening");
    assert_eq!(first.wait_for(Duration::from_secs(5)), Ok(1));

    // Queued-but-undispatched tasks resolve as cancelled, never hang.
    assert_eq!(
        second.wait_for(Duration::from_secs(5)),
        Err(TaskError::Cancelled)
    );
    assert_eq!(
        third.wait_for(Duration::from_secs(5)),
        Err(TaskError::Cancelled)
    );

    assert_eq!(run.wait_for(Duration::from_secs(5)), Ok(()));
    assert_eq!(worker.state(), RunState::Stopped);
}

#[test]
fn test_notify_after_stop_resolves_cancelled() {
    let worker = ActiveWorker::new(Square);
    let run = worker.run().expect("run");
    worker.stop();
    assert_eq!(run.wait_for(Duration::from_secs(5)), Ok(()));

    assert_eq!(
        worker.notify(7).wait_for(Duration::from_secs(5)),
        Err(TaskError::Cancelled)
    );
}

#[test]
fn test_notify_before_run_executes_after_start() {
    let worker = ActiveWorker::new(Square);
    let early = worker.notify(6);
    assert_eq!(worker.queued(), 1);

    let run = worker.run().expect("run");
    assert_eq!(early.wait_for(Duration::from_secs(5)), Ok(36));

    worker.stop();
    assert_eq!(run.wait_for(Duration::from_secs(5)), Ok(()));
}

#[test]
fn test_drop_without_run_cancels_queued() {
    let worker = ActiveWorker::new(Square);
    let handle = worker.notify(5);
    drop(worker);
    assert_eq!(
        handle.wait_for(Duration::from_secs(5)),
        Err(TaskError::Cancelled)
    );
}

#[test]
fn test_double_run_rejected() {
    let worker = ActiveWorker::new(Square);
    let run = worker.run().expect("first run");
    assert!(matches!(worker.run(), Err(WorkerError::AlreadyRunning)));
    worker.stop();
    assert_eq!(run.wait_for(Duration::from_secs(5)), Ok(()));
}

// ============================================================================
// FAILURE ISOLATION
// ============================================================================

#[test]
fn test_panic_fails_task_not_worker() {
    let worker = ActiveWorker::new(Picky);
    let run = worker.run().expect("run");

    match worker.notify(-1).wait_for(Duration::from_secs(5)) {
        Err(TaskError::Panicked(message)) => assert!(message.contains("negative input")),
        other => panic!("expected panicked outcome, got {other:?}"),
    }

    // The consumer thread survived and keeps processing.
    assert!(worker.status());
    assert_eq!(worker.notify(3).wait_for(Duration::from_secs(5)), Ok(3));

    worker.stop();
    assert_eq!(run.wait_for(Duration::from_secs(5)), Ok(()));
}

// ============================================================================
// ASYNC OBSERVATION
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_await_task_handle() {
    let worker = ActiveWorker::new(Square);
    let run = worker.run().expect("run");

    assert_eq!(worker.notify(6).await, Ok(36));
    assert_eq!(worker.notify(7).await, Ok(49));

    worker.stop();
    assert_eq!(run.await, Ok(()));
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn test_with_config_applies_name() {
    let config = WorkerConfig::new().with_name("active-cfg");
    let worker = ActiveWorker::with_config(Square, config).expect("valid config");
    assert_eq!(worker.get_name(), "active-cfg");

    let run = worker.run().expect("run");
    assert_eq!(worker.notify(2).wait_for(Duration::from_secs(5)), Ok(4));
    worker.stop();
    assert_eq!(run.wait_for(Duration::from_secs(5)), Ok(()));
}

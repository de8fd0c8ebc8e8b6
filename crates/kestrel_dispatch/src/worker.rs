//! # Worker Threads
//!
//! ```text
//!            dispatch            worker wakes
//!   Idle ─────────────> Assigned ────────────> Running
//!    ^                                            │
//!    └──────────────── task returns ──────────────┘
//!    │
//!    └── shutdown ──> ShuttingDown (thread exits)
//! ```
//!
//! A worker only observes shutdown while it has no task, so anything
//! already assigned runs to completion first.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::TaskFailure;
use crate::pool::{PoolPhase, Shared, TaskHandler};

/// Lifecycle of one worker thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkerPhase {
    /// Waiting for a task.
    Idle,
    /// A task has been handed over but not picked up yet.
    Assigned,
    /// Executing a task.
    Running,
    /// Exiting.
    ShuttingDown,
}

/// Per-worker slot inside the pool state.
pub(crate) struct WorkerSlot<T> {
    pub(crate) phase: WorkerPhase,
    pub(crate) task: Option<T>,
}

impl<T> WorkerSlot<T> {
    pub(crate) const fn idle() -> Self {
        Self {
            phase: WorkerPhase::Idle,
            task: None,
        }
    }
}

/// Worker thread main loop.
pub(crate) fn worker_loop<T: Send + 'static>(
    index: usize,
    shared: Arc<Shared<T>>,
    handler: Arc<dyn TaskHandler<T>>,
) {
    tracing::debug!(worker = index, "worker started");

    loop {
        let task = {
            let mut state = shared.state.lock();
            loop {
                let slot = &mut state.workers[index];
                if let Some(task) = slot.task.take() {
                    slot.phase = WorkerPhase::Running;
                    break task;
                }
                if state.phase == PoolPhase::Stopped {
                    state.workers[index].phase = WorkerPhase::ShuttingDown;
                    tracing::debug!(worker = index, "worker exiting");
                    return;
                }
                shared.work_ready.wait(&mut state);
            }
        };

        let outcome = run_task(handler.as_ref(), task, Some(index));

        let mut state = shared.state.lock();
        state.workers[index].phase = WorkerPhase::Idle;
        state.in_flight -= 1;
        state.record(outcome);
        shared.worker_idle.notify_one();
        if state.in_flight == 0 {
            shared.drained.notify_all();
        }
    }
}

/// Runs one task, converting errors and panics into a [`TaskFailure`].
pub(crate) fn run_task<T: 'static>(
    handler: &dyn TaskHandler<T>,
    task: T,
    worker: Option<usize>,
) -> Result<(), TaskFailure> {
    match panic::catch_unwind(AssertUnwindSafe(|| handler.perform(task))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(TaskFailure {
            worker,
            message: err.to_string(),
            panicked: false,
        }),
        Err(payload) => Err(TaskFailure {
            worker,
            message: panic_message(payload.as_ref()),
            panicked: true,
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}

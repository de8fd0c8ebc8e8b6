//! # Dispatch Pool
//!
//! A fixed set of worker threads fed one task at a time.
//!
//! ```text
//!   caller ── dispatch(task) ──> first Idle worker ──> handler.perform(task)
//!      │                                                      │
//!      └── wait_for_completion() <── in_flight == 0 <─────────┘
//! ```
//!
//! All state lives behind one mutex. Three condvars signal the
//! transitions: a task was assigned, a worker went idle, the pool drained.
//!
//! ## Lifecycle
//!
//! `Uninitialized` until [`DispatchPool::start`] (or the first dispatch)
//! spawns the workers, `Ready` while running, `Stopped` after
//! [`DispatchPool::shutdown`]. Parallelism is only configurable while
//! `Uninitialized`.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use crate::config::DispatchConfig;
use crate::error::{DispatchError, DispatchResult, TaskError, TaskFailure};
use crate::stats::DispatchStats;
use crate::worker::{self, WorkerPhase, WorkerSlot};

/// The operation a pool performs on each dispatched task.
pub trait TaskHandler<T>: Send + Sync + 'static {
    /// Performs one task.
    ///
    /// # Errors
    ///
    /// Any error is captured by the pool and reported from
    /// [`DispatchPool::wait_for_completion`].
    fn perform(&self, task: T) -> Result<(), TaskError>;
}

impl<T, F> TaskHandler<T> for F
where
    F: Fn(T) -> Result<(), TaskError> + Send + Sync + 'static,
{
    fn perform(&self, task: T) -> Result<(), TaskError> {
        self(task)
    }
}

/// Pool lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolPhase {
    /// No workers spawned yet.
    Uninitialized,
    /// Workers running.
    Ready,
    /// Shut down. Terminal.
    Stopped,
}

pub(crate) struct PoolState<T> {
    pub(crate) phase: PoolPhase,
    pub(crate) workers: Vec<WorkerSlot<T>>,
    pub(crate) in_flight: usize,
    failures: Vec<TaskFailure>,
    stats: DispatchStats,
    threads: Vec<JoinHandle<()>>,
}

impl<T> PoolState<T> {
    /// Records the outcome of a finished task.
    pub(crate) fn record(&mut self, outcome: Result<(), TaskFailure>) {
        match outcome {
            Ok(()) => self.stats.completed += 1,
            Err(failure) => {
                tracing::warn!(%failure, "task failed");
                self.stats.failed += 1;
                self.failures.push(failure);
            }
        }
    }
}

pub(crate) struct Shared<T> {
    pub(crate) state: Mutex<PoolState<T>>,
    /// A task was assigned, or the pool is stopping.
    pub(crate) work_ready: Condvar,
    /// A worker returned to `Idle`.
    pub(crate) worker_idle: Condvar,
    /// `in_flight` reached zero.
    pub(crate) drained: Condvar,
}

/// Fixed-size worker-thread pool.
///
/// Dropping the pool shuts it down, joining every worker.
pub struct DispatchPool<T: Send + 'static> {
    config: DispatchConfig,
    handler: Arc<dyn TaskHandler<T>>,
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> DispatchPool<T> {
    /// Creates a pool. No threads are spawned until [`Self::start`] or the
    /// first [`Self::dispatch`].
    pub fn new(config: DispatchConfig, handler: impl TaskHandler<T>) -> Self {
        let shared = Shared {
            state: Mutex::new(PoolState {
                phase: PoolPhase::Uninitialized,
                workers: Vec::new(),
                in_flight: 0,
                failures: Vec::new(),
                stats: DispatchStats::default(),
                threads: Vec::new(),
            }),
            work_ready: Condvar::new(),
            worker_idle: Condvar::new(),
            drained: Condvar::new(),
        };

        Self {
            config,
            handler: Arc::new(handler),
            shared: Arc::new(shared),
        }
    }

    /// The pool's configuration.
    #[must_use]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Caps the number of worker threads.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::AlreadyStarted`] once workers exist or after shutdown.
    /// - [`DispatchError::InvalidParallelism`] for zero.
    pub fn configure(&mut self, max_parallelism: usize) -> DispatchResult<()> {
        if self.shared.state.lock().phase != PoolPhase::Uninitialized {
            return Err(DispatchError::AlreadyStarted);
        }
        if max_parallelism == 0 {
            return Err(DispatchError::InvalidParallelism);
        }
        self.config.max_parallelism = Some(max_parallelism);
        Ok(())
    }

    /// Spawns the workers. Does nothing if they are already running.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::ShutDown`] after [`Self::shutdown`].
    /// - [`DispatchError::InvalidParallelism`] for a zero cap.
    /// - [`DispatchError::Spawn`] if not a single worker could be spawned.
    pub fn start(&self) -> DispatchResult<()> {
        let mut state = self.shared.state.lock();
        match state.phase {
            PoolPhase::Ready => return Ok(()),
            PoolPhase::Stopped => return Err(DispatchError::ShutDown),
            PoolPhase::Uninitialized => {}
        }
        self.config.validate()?;

        let count = self.config.worker_count();
        state.workers = (0..count).map(|_| WorkerSlot::idle()).collect();

        for index in 0..count {
            let shared = Arc::clone(&self.shared);
            let handler = Arc::clone(&self.handler);
            let spawned = thread::Builder::new()
                .name(format!("{}-{index}", self.config.thread_name_prefix))
                .spawn(move || worker::worker_loop(index, shared, handler));

            match spawned {
                Ok(handle) => state.threads.push(handle),
                Err(err) => {
                    // Only spawned workers keep a slot.
                    state.workers.truncate(index);
                    if index == 0 {
                        return Err(DispatchError::Spawn(err.to_string()));
                    }
                    tracing::warn!(spawned = index, requested = count, %err, "worker spawn failed");
                    break;
                }
            }
        }

        state.phase = PoolPhase::Ready;
        tracing::info!(
            workers = state.workers.len(),
            prefix = %self.config.thread_name_prefix,
            "dispatch pool started"
        );
        Ok(())
    }

    /// Hands a task to the first idle worker, blocking until one is idle.
    ///
    /// A synchronous pool runs the task on the caller's thread instead.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::ShutDown`] after [`Self::shutdown`].
    /// - Any error from the implicit [`Self::start`].
    pub fn dispatch(&self, task: T) -> DispatchResult<()> {
        if self.config.synchronous {
            return self.dispatch_synchronous(task);
        }
        self.start()?;

        let mut state = self.shared.state.lock();
        loop {
            if state.phase == PoolPhase::Stopped {
                return Err(DispatchError::ShutDown);
            }
            if let Some(slot) = state
                .workers
                .iter_mut()
                .find(|slot| slot.phase == WorkerPhase::Idle)
            {
                slot.phase = WorkerPhase::Assigned;
                slot.task = Some(task);
                state.in_flight += 1;
                state.stats.dispatched += 1;
                self.shared.work_ready.notify_all();
                return Ok(());
            }
            self.shared.worker_idle.wait(&mut state);
        }
    }

    /// Runs a task on the caller's thread.
    ///
    /// A failure is recorded alongside worker failures and reported by the
    /// next [`Self::wait_for_completion`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ShutDown`] after [`Self::shutdown`].
    pub fn dispatch_synchronous(&self, task: T) -> DispatchResult<()> {
        {
            let mut state = self.shared.state.lock();
            if state.phase == PoolPhase::Stopped {
                return Err(DispatchError::ShutDown);
            }
            state.stats.synchronous += 1;
        }

        let outcome = worker::run_task(self.handler.as_ref(), task, None);
        self.shared.state.lock().record(outcome);
        Ok(())
    }

    /// Blocks until no task is in flight.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::TasksFailed`] with every failure captured
    /// since the previous call. The failures are cleared.
    pub fn wait_for_completion(&self) -> DispatchResult<()> {
        let mut state = self.shared.state.lock();
        while state.in_flight > 0 {
            self.shared.drained.wait(&mut state);
        }

        if state.failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::TasksFailed(std::mem::take(&mut state.failures)))
        }
    }

    /// Returns true if no task is in flight. Only a snapshot.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.shared.state.lock().in_flight == 0
    }

    /// Number of worker threads, or the number that would be started.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        let state = self.shared.state.lock();
        match state.phase {
            PoolPhase::Uninitialized if !self.config.synchronous => self.config.worker_count(),
            _ => state.workers.len(),
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> PoolPhase {
        self.shared.state.lock().phase
    }

    /// Snapshot of every worker's phase.
    #[must_use]
    pub fn worker_phases(&self) -> Vec<WorkerPhase> {
        self.shared
            .state
            .lock()
            .workers
            .iter()
            .map(|slot| slot.phase)
            .collect()
    }

    /// Task counters.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        self.shared.state.lock().stats
    }

    /// Stops the pool. Workers finish their current task, then exit and are
    /// joined. Calling it again does nothing.
    pub fn shutdown(&self) {
        let threads = {
            let mut state = self.shared.state.lock();
            if state.phase == PoolPhase::Stopped {
                return;
            }
            state.phase = PoolPhase::Stopped;
            self.shared.work_ready.notify_all();
            self.shared.worker_idle.notify_all();
            std::mem::take(&mut state.threads)
        };

        let workers = threads.len();
        for handle in threads {
            if handle.join().is_err() {
                tracing::warn!("worker thread panicked outside a task");
            }
        }

        let stats = self.stats();
        tracing::info!(
            workers,
            dispatched = stats.dispatched,
            completed = stats.completed,
            failed = stats.failed,
            "dispatch pool stopped"
        );
    }
}

impl<T: Send + 'static> Drop for DispatchPool<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<T: Send + 'static> std::fmt::Debug for DispatchPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchPool")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_pool(config: DispatchConfig) -> (DispatchPool<usize>, Arc<AtomicUsize>) {
        let total = Arc::new(AtomicUsize::new(0));
        let sum = Arc::clone(&total);
        let pool = DispatchPool::new(config, move |n: usize| -> Result<(), TaskError> {
            sum.fetch_add(n, Ordering::SeqCst);
            Ok(())
        });
        (pool, total)
    }

    #[test]
    fn test_lazy_start() {
        let (pool, total) = counting_pool(DispatchConfig::default().with_max_parallelism(2));
        assert_eq!(pool.phase(), PoolPhase::Uninitialized);
        assert!(pool.worker_phases().is_empty());

        pool.dispatch(5).unwrap();
        assert_eq!(pool.phase(), PoolPhase::Ready);
        pool.wait_for_completion().unwrap();

        assert_eq!(total.load(Ordering::SeqCst), 5);
        assert!(pool.is_idle());
        assert!(pool
            .worker_phases()
            .iter()
            .all(|phase| *phase == WorkerPhase::Idle));
    }

    #[test]
    fn test_configure_only_before_start() {
        let (mut pool, _) = counting_pool(DispatchConfig::default());
        assert_eq!(pool.configure(0), Err(DispatchError::InvalidParallelism));
        pool.configure(1).unwrap();
        assert_eq!(pool.worker_count(), 1);

        pool.start().unwrap();
        assert_eq!(pool.configure(2), Err(DispatchError::AlreadyStarted));
        assert_eq!(pool.worker_count(), 1);
    }

    #[test]
    fn test_wait_when_idle_returns_immediately() {
        let (pool, _) = counting_pool(DispatchConfig::default());
        assert!(pool.wait_for_completion().is_ok());
        assert_eq!(pool.phase(), PoolPhase::Uninitialized);
    }

    #[test]
    fn test_synchronous_config_never_spawns() {
        let (pool, total) = counting_pool(DispatchConfig::synchronous());
        for n in 1..=10 {
            pool.dispatch(n).unwrap();
        }
        pool.wait_for_completion().unwrap();

        assert_eq!(total.load(Ordering::SeqCst), 55);
        assert_eq!(pool.phase(), PoolPhase::Uninitialized);
        assert_eq!(pool.worker_count(), 0);

        let stats = pool.stats();
        assert_eq!(stats.synchronous, 10);
        assert_eq!(stats.dispatched, 0);
        assert_eq!(stats.completed, 10);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (pool, _) = counting_pool(DispatchConfig::default().with_max_parallelism(2));
        pool.start().unwrap();
        pool.shutdown();
        pool.shutdown();

        assert_eq!(pool.phase(), PoolPhase::Stopped);
        assert!(pool
            .worker_phases()
            .iter()
            .all(|phase| *phase == WorkerPhase::ShuttingDown));
        assert_eq!(pool.dispatch(1), Err(DispatchError::ShutDown));
        assert_eq!(pool.dispatch_synchronous(1), Err(DispatchError::ShutDown));
        assert_eq!(pool.start(), Err(DispatchError::ShutDown));
    }
}

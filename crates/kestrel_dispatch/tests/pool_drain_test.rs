//! Integration tests for the dispatch pool: drain, equivalence, failures.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kestrel_dispatch::{
    DispatchConfig, DispatchError, DispatchPool, PoolPhase, TaskError, WorkerPhase,
};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[test]
fn test_drain_with_random_sleeps() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xD15_A7C4);
    let config = DispatchConfig::default().with_max_parallelism(4);
    let workers = config.worker_count();

    let seen = Arc::new(Mutex::new(HashSet::new()));
    let sink = Arc::clone(&seen);
    let pool: DispatchPool<(usize, u64)> = DispatchPool::new(config, move |(id, sleep_us): (usize, u64)| {
        thread::sleep(Duration::from_micros(sleep_us));
        sink.lock().insert(id);
        Ok::<(), TaskError>(())
    });

    for round in 0..=4 * workers {
        seen.lock().clear();
        for id in 0..round {
            pool.dispatch((id, rng.gen_range(0..500))).unwrap();
        }
        pool.wait_for_completion().unwrap();

        assert!(pool.is_idle());
        let seen = seen.lock();
        assert_eq!(seen.len(), round);
        assert!((0..round).all(|id| seen.contains(&id)));
    }

    let stats = pool.stats();
    assert_eq!(stats.dispatched, stats.completed);
    assert_eq!(stats.failed, 0);
}

#[test]
fn test_synchronous_matches_threaded() {
    let run = |config: DispatchConfig| {
        let total = Arc::new(AtomicU64::new(0));
        let sum = Arc::clone(&total);
        let pool: DispatchPool<u64> = DispatchPool::new(config, move |n: u64| -> Result<(), TaskError> {
            sum.fetch_add(n * n, Ordering::SeqCst);
            Ok(())
        });
        for n in 0..1_000 {
            pool.dispatch(n).unwrap();
        }
        pool.wait_for_completion().unwrap();
        total.load(Ordering::SeqCst)
    };

    let threaded = run(DispatchConfig::default());
    let synchronous = run(DispatchConfig::synchronous());
    assert_eq!(threaded, synchronous);
    assert_eq!(threaded, (0..1_000u64).map(|n| n * n).sum::<u64>());
}

#[test]
fn test_failures_are_reported_and_pool_survives() {
    let completed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completed);
    let pool: DispatchPool<u32> = DispatchPool::new(
        DispatchConfig::default().with_max_parallelism(2),
        move |n: u32| -> Result<(), TaskError> {
            match n {
                13 => Err(TaskError::new("unlucky")),
                666 => panic!("cursed task"),
                _ => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }
        },
    );

    for n in [1, 13, 2, 666, 3] {
        pool.dispatch(n).unwrap();
    }

    let Err(DispatchError::TasksFailed(failures)) = pool.wait_for_completion() else {
        panic!("expected captured failures");
    };
    assert_eq!(failures.len(), 2);
    assert!(failures
        .iter()
        .any(|f| !f.panicked && f.message == "unlucky" && f.worker.is_some()));
    assert!(failures
        .iter()
        .any(|f| f.panicked && f.message == "cursed task"));

    // Failures are drained by the wait that reported them.
    assert!(pool.wait_for_completion().is_ok());

    for n in 100..110 {
        pool.dispatch(n).unwrap();
    }
    pool.wait_for_completion().unwrap();
    assert_eq!(completed.load(Ordering::SeqCst), 13);
    assert!(pool
        .worker_phases()
        .iter()
        .all(|phase| *phase == WorkerPhase::Idle));
}

#[test]
fn test_synchronous_failure_shares_the_failure_slot() {
    let pool: DispatchPool<bool> = DispatchPool::new(DispatchConfig::default(), |fail: bool| {
        if fail {
            Err(TaskError::from("caller-side failure"))
        } else {
            Ok(())
        }
    });

    pool.dispatch_synchronous(false).unwrap();
    pool.dispatch_synchronous(true).unwrap();

    let Err(DispatchError::TasksFailed(failures)) = pool.wait_for_completion() else {
        panic!("expected captured failure");
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].worker, None);
    assert_eq!(failures[0].message, "caller-side failure");
    assert_eq!(pool.stats().synchronous, 2);
}

#[test]
fn test_reconfigure_after_start_is_rejected() {
    let mut pool: DispatchPool<()> =
        DispatchPool::new(DispatchConfig::default(), |(): ()| Ok::<(), TaskError>(()));
    pool.dispatch(()).unwrap();
    assert_eq!(pool.configure(1), Err(DispatchError::AlreadyStarted));
    pool.wait_for_completion().unwrap();
}

#[test]
fn test_shutdown_finishes_in_flight_tasks() {
    let done = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&done);
    let pool: DispatchPool<u64> = DispatchPool::new(
        DispatchConfig::default().with_max_parallelism(2),
        move |sleep_ms: u64| -> Result<(), TaskError> {
            thread::sleep(Duration::from_millis(sleep_ms));
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
    );

    pool.dispatch(20).unwrap();
    pool.dispatch(20).unwrap();
    pool.shutdown();

    assert_eq!(done.load(Ordering::SeqCst), 2);
    assert_eq!(pool.phase(), PoolPhase::Stopped);
    assert_eq!(pool.dispatch(1), Err(DispatchError::ShutDown));
    pool.shutdown();
}

#[test]
fn test_threads_are_named() {
    let names = Arc::new(Mutex::new(HashSet::new()));
    let sink = Arc::clone(&names);
    let config = DispatchConfig {
        thread_name_prefix: "frame-solver".to_string(),
        ..DispatchConfig::default().with_max_parallelism(2)
    };
    let pool: DispatchPool<()> = DispatchPool::new(config, move |(): ()| -> Result<(), TaskError> {
        let name = thread::current().name().unwrap_or_default().to_string();
        sink.lock().insert(name);
        Ok(())
    });

    for _ in 0..32 {
        pool.dispatch(()).unwrap();
    }
    pool.wait_for_completion().unwrap();

    assert!(names
        .lock()
        .iter()
        .all(|name| name.starts_with("frame-solver-")));
}

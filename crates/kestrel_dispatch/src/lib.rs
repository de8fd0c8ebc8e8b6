//! # Kestrel Dispatch
//!
//! Fixed-size worker-thread pool used to fan per-frame work out across
//! cores:
//! - `min(cap, cores)` named OS threads, spawned once
//! - `dispatch` blocks until a worker is idle, `wait_for_completion` drains
//! - Task errors and panics are captured and reported, workers survive them
//! - A synchronous mode runs everything on the caller's thread
//!
//! ## Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! use kestrel_dispatch::{DispatchConfig, DispatchPool, TaskError};
//!
//! let total = Arc::new(AtomicU64::new(0));
//! let sum = Arc::clone(&total);
//! let pool: DispatchPool<u64> = DispatchPool::new(DispatchConfig::default(), move |n: u64| -> Result<(), TaskError> {
//!     sum.fetch_add(n, Ordering::Relaxed);
//!     Ok(())
//! });
//!
//! for n in 1..=100 {
//!     pool.dispatch(n).unwrap();
//! }
//! pool.wait_for_completion().unwrap();
//! assert_eq!(total.load(Ordering::Relaxed), 5050);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod pool;
mod stats;
mod worker;

pub use config::DispatchConfig;
pub use error::{DispatchError, DispatchResult, TaskError, TaskFailure};
pub use pool::{DispatchPool, PoolPhase, TaskHandler};
pub use stats::DispatchStats;
pub use worker::WorkerPhase;

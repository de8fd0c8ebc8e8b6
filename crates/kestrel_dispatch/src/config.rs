//! # Dispatch Configuration

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, DispatchResult};

/// Configuration for a [`crate::DispatchPool`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Upper bound on worker threads. `None` means one per core.
    pub max_parallelism: Option<usize>,
    /// Run every dispatched task on the caller's thread.
    pub synchronous: bool,
    /// Worker threads are named `{prefix}-{index}`.
    pub thread_name_prefix: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_parallelism: None,
            synchronous: false,
            thread_name_prefix: "kestrel-worker".to_string(),
        }
    }
}

impl DispatchConfig {
    /// A config whose pool never spawns threads.
    #[must_use]
    pub fn synchronous() -> Self {
        Self {
            synchronous: true,
            ..Self::default()
        }
    }

    /// Sets the worker cap.
    #[must_use]
    pub fn with_max_parallelism(mut self, max_parallelism: usize) -> Self {
        self.max_parallelism = Some(max_parallelism);
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidParallelism`] for a cap of zero.
    pub fn validate(&self) -> DispatchResult<()> {
        if self.max_parallelism == Some(0) {
            return Err(DispatchError::InvalidParallelism);
        }
        Ok(())
    }

    /// Number of workers a pool with this config starts:
    /// `min(cap, available cores)`, at least one.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        let cores = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        self.max_parallelism
            .map_or(cores, |cap| cap.min(cores))
            .max(1)
    }
}

//! Task counters.

/// Counters accumulated over a pool's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Tasks handed to worker threads.
    pub dispatched: u64,
    /// Tasks that returned `Ok`.
    pub completed: u64,
    /// Tasks that returned an error or panicked.
    pub failed: u64,
    /// Tasks run on the caller's thread.
    pub synchronous: u64,
}

impl DispatchStats {
    /// Tasks that have finished, successfully or not.
    #[must_use]
    pub const fn finished(&self) -> u64 {
        self.completed + self.failed
    }
}

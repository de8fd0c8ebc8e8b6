//! # Dispatch Error Types

use std::fmt;

use thiserror::Error;

/// Errors returned by the dispatch pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Parallelism can only change before the first worker starts.
    #[error("pool already started, parallelism is fixed")]
    AlreadyStarted,

    /// A pool needs at least one worker.
    #[error("parallelism must be at least 1")]
    InvalidParallelism,

    /// The pool has been shut down.
    #[error("pool has been shut down")]
    ShutDown,

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),

    /// One or more tasks failed since the last wait.
    #[error("{} task(s) failed", .0.len())]
    TasksFailed(Vec<TaskFailure>),
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Error returned by a task handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TaskError {
    message: String,
}

impl TaskError {
    /// Creates a task error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for TaskError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for TaskError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// A captured task failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    /// Worker index, or `None` for a task run on the caller's thread.
    pub worker: Option<usize>,
    /// The task's error message or panic payload.
    pub message: String,
    /// Whether the task panicked rather than returning an error.
    pub panicked: bool,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.panicked { "panicked" } else { "failed" };
        match self.worker {
            Some(worker) => write!(f, "task on worker {worker} {kind}: {}", self.message),
            None => write!(f, "synchronous task {kind}: {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display() {
        let failure = TaskFailure {
            worker: Some(2),
            message: "bad ray".to_string(),
            panicked: false,
        };
        assert_eq!(failure.to_string(), "task on worker 2 failed: bad ray");

        let failure = TaskFailure {
            worker: None,
            message: "boom".to_string(),
            panicked: true,
        };
        assert_eq!(failure.to_string(), "synchronous task panicked: boom");
    }

    #[test]
    fn test_tasks_failed_counts() {
        let err = DispatchError::TasksFailed(vec![
            TaskFailure {
                worker: Some(0),
                message: String::new(),
                panicked: false,
            };
            3
        ]);
        assert_eq!(err.to_string(), "3 task(s) failed");
    }
}

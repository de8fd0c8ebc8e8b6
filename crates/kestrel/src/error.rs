//! # Pipeline Error Types

use kestrel_dispatch::DispatchError;

use crate::frame::FrameInput;
use thiserror::Error;

/// Errors from loading or validating a configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {message}")]
    Read {
        /// Path that was read.
        path: String,
        /// I/O error message.
        message: String,
    },

    /// The file is not valid TOML for this schema.
    #[error("invalid config syntax: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from running the frame pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The dispatch pool refused work.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A reader still holds the previous frame. Carries the rejected input
    /// so the caller can resubmit it.
    #[error("frame data is still held by a reader, cannot index frame {}", .0.frame_number)]
    FrameInUse(Box<FrameInput>),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

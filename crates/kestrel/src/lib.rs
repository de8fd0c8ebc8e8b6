//! # Kestrel
//!
//! Per-frame motion capture data pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        KESTREL                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────┐          ┌──────────────────┐         │
//! │  │  kestrel_core    │          │ kestrel_dispatch │         │
//! │  │  • Uid / labels  │          │  • worker pool   │         │
//! │  │  • entities      │          │  • drain / wait  │         │
//! │  │  • bundles       │          │  • sync fallback │         │
//! │  └────────┬─────────┘          └────────┬─────────┘         │
//! │           └───────────┬─────────────────┘                   │
//! │                       v                                     │
//! │              ┌──────────────────┐                           │
//! │              │  FramePipeline   │──> FrameEvent channel     │
//! │              └──────────────────┘                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration
//! - `events`: bounded frame event channel
//! - `frame`: frame input, indexed frame, per-frame report
//! - `pipeline`: frame stages fanned out over the dispatch pool

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod pipeline;

pub use kestrel_core as core;
pub use kestrel_dispatch as dispatch;

pub use config::{BundleConfig, KestrelConfig, PipelineConfig};
pub use error::{ConfigError, ConfigResult, PipelineError, PipelineResult};
pub use events::{EventBus, EventReceiver, EventSender, FrameEvent};
pub use frame::{FrameData, FrameInput, FrameReport};
pub use pipeline::{FramePipeline, FrameStage};

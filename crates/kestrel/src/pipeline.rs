//! # Frame Pipeline
//!
//! ```text
//!   FrameInput ──> index (set_* on every bundle) ──> stage.plan()
//!                                                       │
//!        ┌──────────────── BundleView chunks ───────────┘
//!        v
//!   DispatchPool ──> stage.process(&frame, view)  (N workers)
//!        │
//!        └──> wait_for_completion ──> FrameReport + events
//! ```
//!
//! The frame is shared with workers through an `Arc`. Indexing the next
//! frame requires sole ownership again, so a reader that keeps a frame
//! handle across submits gets [`PipelineError::FrameInUse`] instead of a
//! frame changing under its feet.

use std::sync::Arc;
use std::time::Instant;

use kestrel_core::bundle::BundleView;
use kestrel_dispatch::{DispatchError, DispatchPool, DispatchStats, TaskError};

use crate::config::KestrelConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::events::{EventBus, EventReceiver, EventSender, FrameEvent};
use crate::frame::{FrameData, FrameInput, FrameReport};

/// Per-frame processing fanned out over the dispatch pool.
pub trait FrameStage: Send + Sync + 'static {
    /// Name used in events and logs.
    fn name(&self) -> &str;

    /// Splits the frame into independent units of work.
    ///
    /// Defaults to every camera ray in chunks of `chunk_size`.
    fn plan(&self, frame: &FrameData, chunk_size: usize) -> Vec<BundleView> {
        frame.rays.all_view().chunks(chunk_size).collect()
    }

    /// Processes one unit of work. Runs on a worker thread.
    ///
    /// # Errors
    ///
    /// Errors are collected into the frame's [`FrameReport`].
    fn process(&self, frame: &FrameData, view: BundleView) -> Result<(), TaskError>;
}

struct StageTask {
    frame: Arc<FrameData>,
    view: BundleView,
}

/// Indexes frames and runs one stage over each.
pub struct FramePipeline<S: FrameStage> {
    config: KestrelConfig,
    stage: Arc<S>,
    frame: Arc<FrameData>,
    pool: DispatchPool<StageTask>,
    bus: EventBus,
    events: EventSender,
    spare: FrameInput,
}

impl<S: FrameStage> FramePipeline<S> {
    /// Creates a pipeline. Worker threads start with the first frame.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Config`] if the configuration is invalid.
    pub fn new(config: KestrelConfig, stage: S) -> PipelineResult<Self> {
        config.validate()?;

        let stage = Arc::new(stage);
        let worker_stage = Arc::clone(&stage);
        let pool = DispatchPool::new(config.dispatch.clone(), move |task: StageTask| {
            worker_stage.process(&task.frame, task.view)
        });

        let bus = EventBus::new(config.pipeline.event_capacity);
        let events = bus.sender();

        tracing::debug!(
            stage = stage.name(),
            workers = pool.worker_count(),
            chunk_size = config.pipeline.chunk_size,
            "frame pipeline created"
        );

        Ok(Self {
            frame: Arc::new(FrameData::with_capacity(&config.bundles)),
            config,
            stage,
            pool,
            bus,
            events,
            spare: FrameInput::default(),
        })
    }

    /// Indexes a frame and runs the stage over it.
    ///
    /// Stage failures do not fail the submit: they are reported in
    /// [`FrameReport::failures`] and as a [`FrameEvent::StageFailed`].
    ///
    /// # Errors
    ///
    /// - [`PipelineError::FrameInUse`] if a handle from [`Self::frame_handle`]
    ///   is still alive. The input is handed back inside the error.
    /// - [`PipelineError::Dispatch`] if the pool has been shut down.
    pub fn submit(&mut self, input: FrameInput) -> PipelineResult<FrameReport> {
        let started = Instant::now();

        let Some(frame) = Arc::get_mut(&mut self.frame) else {
            return Err(PipelineError::FrameInUse(Box::new(input)));
        };
        self.spare = frame.index(input);

        let mut report = FrameReport::from_frame(&self.frame);
        self.events.send(FrameEvent::FrameIndexed {
            frame_number: report.frame_number,
            timecode: self.frame.timecode,
            rays: report.rays,
            markers: report.markers,
            rigid_bodies: report.rigid_bodies,
        });

        let stage_started = Instant::now();
        let views = self.stage.plan(&self.frame, self.config.pipeline.chunk_size);
        for view in views.into_iter().filter(|view| !view.is_empty()) {
            self.pool.dispatch(StageTask {
                frame: Arc::clone(&self.frame),
                view,
            })?;
            report.chunks += 1;
        }

        match self.pool.wait_for_completion() {
            Ok(()) => {
                self.events.send(FrameEvent::StageCompleted {
                    frame_number: report.frame_number,
                    stage: self.stage.name().to_string(),
                    chunks: report.chunks,
                    elapsed: stage_started.elapsed(),
                });
            }
            Err(DispatchError::TasksFailed(failures)) => {
                tracing::warn!(
                    frame = report.frame_number,
                    stage = self.stage.name(),
                    failed = failures.len(),
                    "stage tasks failed"
                );
                self.events.send(FrameEvent::StageFailed {
                    frame_number: report.frame_number,
                    stage: self.stage.name().to_string(),
                    failures: failures.clone(),
                });
                report.failures = failures;
            }
            Err(err) => return Err(err.into()),
        }

        report.elapsed = started.elapsed();
        tracing::debug!(
            frame = report.frame_number,
            rays = report.rays,
            markers = report.markers,
            chunks = report.chunks,
            elapsed_us = u64::try_from(report.elapsed.as_micros()).unwrap_or(u64::MAX),
            "frame processed"
        );
        Ok(report)
    }

    /// Hands back the previous frame's vectors, emptied, for the caller to
    /// fill with the next frame.
    pub fn recycle(&mut self) -> FrameInput {
        let mut input = std::mem::take(&mut self.spare);
        input.clear();
        input
    }

    /// The most recently indexed frame.
    #[must_use]
    pub fn frame(&self) -> &FrameData {
        &self.frame
    }

    /// A shared handle on the current frame.
    ///
    /// Drop it before the next [`Self::submit`].
    #[must_use]
    pub fn frame_handle(&self) -> Arc<FrameData> {
        Arc::clone(&self.frame)
    }

    /// A receiver for pipeline events.
    #[must_use]
    pub fn events(&self) -> EventReceiver {
        self.bus.receiver()
    }

    /// The stage.
    #[must_use]
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &KestrelConfig {
        &self.config
    }

    /// Dispatch counters.
    #[must_use]
    pub fn dispatch_stats(&self) -> DispatchStats {
        self.pool.stats()
    }

    /// Number of worker threads.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    /// Stops the worker threads. Later submits fail.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}

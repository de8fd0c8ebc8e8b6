//! # Frame Events
//!
//! Bounded channel carrying pipeline notifications to whoever is watching
//! (UI, recorders, the replay tool).
//!
//! ```text
//! ┌──────────────┐  FrameIndexed    ┌─────────┐      ┌──────────┐
//! │ FramePipeline│─ StageCompleted ─>│ channel │─────>│ consumer │
//! └──────────────┘  StageFailed     └─────────┘      └──────────┘
//! ```
//!
//! Sending never blocks the frame loop. A full channel drops the event.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use kestrel_core::TimeCode;
use kestrel_dispatch::TaskFailure;

/// Notifications emitted by the frame pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameEvent {
    /// A frame was handed to the bundles and partitioned.
    FrameIndexed {
        /// Frame number.
        frame_number: u64,
        /// Timecode, if the sync source supplied one.
        timecode: Option<TimeCode>,
        /// Camera rays in the frame.
        rays: usize,
        /// Markers in the frame.
        markers: usize,
        /// Rigid bodies in the frame.
        rigid_bodies: usize,
    },

    /// Every task of a stage finished successfully.
    StageCompleted {
        /// Frame number.
        frame_number: u64,
        /// Stage name.
        stage: String,
        /// Tasks dispatched.
        chunks: usize,
        /// Wall time from dispatch to drain.
        elapsed: Duration,
    },

    /// At least one task of a stage failed.
    StageFailed {
        /// Frame number.
        frame_number: u64,
        /// Stage name.
        stage: String,
        /// Every captured failure.
        failures: Vec<TaskFailure>,
    },
}

impl FrameEvent {
    /// Frame the event belongs to.
    #[must_use]
    pub const fn frame_number(&self) -> u64 {
        match self {
            Self::FrameIndexed { frame_number, .. }
            | Self::StageCompleted { frame_number, .. }
            | Self::StageFailed { frame_number, .. } => *frame_number,
        }
    }
}

/// Bounded event channel.
pub struct EventBus {
    sender: Sender<FrameEvent>,
    receiver: Receiver<FrameEvent>,
}

impl EventBus {
    /// Creates a bus holding at most `capacity` undelivered events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates a sender handle.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle. Receivers share one queue.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Creates a connected sender/receiver pair.
    #[must_use]
    pub fn create_pair(capacity: usize) -> (EventSender, EventReceiver) {
        let bus = Self::new(capacity);
        (bus.sender(), bus.receiver())
    }
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<FrameEvent>,
}

impl EventSender {
    /// Sends an event without blocking.
    ///
    /// Returns `false` if the event was dropped.
    #[inline]
    pub fn send(&self, event: FrameEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(frame = event.frame_number(), "event channel full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Sends an event, waiting for room.
    #[inline]
    pub fn send_blocking(&self, event: FrameEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<FrameEvent>,
}

impl EventReceiver {
    /// Takes every pending event.
    #[inline]
    #[must_use]
    pub fn drain(&self) -> Vec<FrameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Takes one event, if any.
    #[inline]
    #[must_use]
    pub fn try_recv(&self) -> Option<FrameEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns true if events are pending.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}

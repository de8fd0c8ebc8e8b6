//! # Frame Data
//!
//! [`FrameInput`] is what the device layer produces each frame.
//! [`FrameData`] is the indexed form the stages read.

use std::time::Duration;

use kestrel_core::bundle::{MarkerBundle, RayBundle, RigidBodyBundle};
use kestrel_core::entity::{CameraRay, Marker, RigidBody};
use kestrel_core::id::Uid;
use kestrel_core::TimeCode;
use kestrel_dispatch::TaskFailure;

use crate::config::BundleConfig;

/// One frame of raw solver output.
///
/// Vectors handed back by [`crate::FramePipeline::recycle`] keep their
/// capacity, so filling them again does not allocate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Frame number.
    pub frame_number: u64,
    /// Timecode, if the sync source supplied one.
    pub timecode: Option<TimeCode>,
    /// Every camera ray.
    pub rays: Vec<CameraRay>,
    /// Every marker.
    pub markers: Vec<Marker>,
    /// Every rigid body solve.
    pub rigid_bodies: Vec<RigidBody>,
    /// Selected marker ids, in selection order.
    pub marker_selection: Vec<Uid>,
    /// Selected rigid body ids, in selection order.
    pub rigid_body_selection: Vec<Uid>,
}

impl FrameInput {
    /// An empty input for `frame_number`.
    #[must_use]
    pub fn new(frame_number: u64) -> Self {
        Self {
            frame_number,
            ..Self::default()
        }
    }

    /// Empties every vector, keeping capacity.
    pub fn clear(&mut self) {
        self.timecode = None;
        self.rays.clear();
        self.markers.clear();
        self.rigid_bodies.clear();
        self.marker_selection.clear();
        self.rigid_body_selection.clear();
    }
}

/// The indexed frame shared read-only with the stage workers.
#[derive(Clone, Debug, Default)]
pub struct FrameData {
    /// Frame number.
    pub frame_number: u64,
    /// Timecode, if any.
    pub timecode: Option<TimeCode>,
    /// Camera rays.
    pub rays: RayBundle,
    /// Markers.
    pub markers: MarkerBundle,
    /// Rigid bodies.
    pub rigid_bodies: RigidBodyBundle,
}

impl FrameData {
    /// Empty frame with bundles sized from `config`.
    #[must_use]
    pub fn with_capacity(config: &BundleConfig) -> Self {
        Self {
            frame_number: 0,
            timecode: None,
            rays: RayBundle::with_capacity(config.ray_capacity),
            markers: MarkerBundle::with_capacity(config.marker_capacity),
            rigid_bodies: RigidBodyBundle::with_capacity(config.rigid_body_capacity),
        }
    }

    /// Indexes `input`, returning it with every vector emptied.
    pub(crate) fn index(&mut self, input: FrameInput) -> FrameInput {
        let FrameInput {
            frame_number,
            timecode,
            rays,
            markers,
            rigid_bodies,
            mut marker_selection,
            mut rigid_body_selection,
        } = input;

        self.frame_number = frame_number;
        self.timecode = timecode;
        let rays = self.rays.set_rays(rays);
        let markers = self.markers.set_markers(markers, &marker_selection);
        let rigid_bodies = self
            .rigid_bodies
            .set_rigid_bodies(rigid_bodies, &rigid_body_selection);
        marker_selection.clear();
        rigid_body_selection.clear();

        FrameInput {
            frame_number,
            timecode: None,
            rays,
            markers,
            rigid_bodies,
            marker_selection,
            rigid_body_selection,
        }
    }
}

/// Summary of one submitted frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Frame number.
    pub frame_number: u64,
    /// Camera rays.
    pub rays: usize,
    /// Rays assigned to a reconstruction.
    pub assigned_rays: usize,
    /// Rays not assigned.
    pub unassigned_rays: usize,
    /// Distinct reconstructions.
    pub reconstructions: usize,
    /// Markers.
    pub markers: usize,
    /// Labeled markers.
    pub labeled_markers: usize,
    /// Unlabeled markers.
    pub unlabeled_markers: usize,
    /// Selected markers.
    pub selected_markers: usize,
    /// Rigid bodies.
    pub rigid_bodies: usize,
    /// Tracked rigid bodies.
    pub tracked_rigid_bodies: usize,
    /// Untracked rigid bodies.
    pub untracked_rigid_bodies: usize,
    /// Selected rigid bodies.
    pub selected_rigid_bodies: usize,
    /// Stage tasks dispatched.
    pub chunks: usize,
    /// Stage task failures.
    pub failures: Vec<TaskFailure>,
    /// Wall time of the whole submit.
    pub elapsed: Duration,
}

impl FrameReport {
    /// Partition counts of `frame`. Chunks, failures and timing are left
    /// for the caller to fill in.
    #[must_use]
    pub fn from_frame(frame: &FrameData) -> Self {
        Self {
            frame_number: frame.frame_number,
            rays: frame.rays.len(),
            assigned_rays: frame.rays.assigned().len(),
            unassigned_rays: frame.rays.unassigned().len(),
            reconstructions: frame.rays.reconstruction_count(),
            markers: frame.markers.len(),
            labeled_markers: frame.markers.labeled().len(),
            unlabeled_markers: frame.markers.unlabeled().len(),
            selected_markers: frame.markers.selected().len(),
            rigid_bodies: frame.rigid_bodies.len(),
            tracked_rigid_bodies: frame.rigid_bodies.tracked().len(),
            untracked_rigid_bodies: frame.rigid_bodies.untracked().len(),
            selected_rigid_bodies: frame.rigid_bodies.selected().len(),
            ..Self::default()
        }
    }

    /// Returns true if no stage task failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

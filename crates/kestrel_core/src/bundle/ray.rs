//! # Ray Bundle
//!
//! All camera rays of one frame, grouped by reconstruction.
//!
//! ```text
//! rays:   [ 0 0 0 | 2 2 | 5 | 9 9 9 ]
//!           unassigned  assigned ---->
//! groups: (0, 0..3) (2, 3..5) (5, 5..6) (9, 6..9)
//! ```
//!
//! `set_rays` sorts once and rebuilds the group table in a single pass.
//! Every query afterwards is a slice: O(1), or O(log k) for a keyed
//! reconstruction lookup.

use std::ops::Range;

use super::view::{BundleKind, BundleView, ViewStorage};
use crate::entity::CameraRay;

/// One frame's camera rays with precomputed reconstruction groups.
#[derive(Clone, Debug, Default)]
pub struct RayBundle {
    /// All rays, ordered by ascending reconstruction id.
    rays: Vec<CameraRay>,
    /// Contiguous range of each reconstruction id present this frame.
    groups: Vec<(u32, Range<usize>)>,
    /// Bumped by every `set_rays`/`clear`.
    generation: u64,
}

impl RayBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty bundle with room for `capacity` rays.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rays: Vec::with_capacity(capacity),
            groups: Vec::new(),
            generation: 0,
        }
    }

    /// Replaces the bundle contents with this frame's rays.
    ///
    /// Returns the previous frame's storage, emptied, so the caller can fill
    /// it next frame without allocating.
    pub fn set_rays(&mut self, rays: Vec<CameraRay>) -> Vec<CameraRay> {
        let mut previous = std::mem::replace(&mut self.rays, rays);
        previous.clear();

        self.rays.sort_unstable_by_key(|ray| {
            (ray.reconstruction_id(), ray.camera_id(), ray.id())
        });
        self.rebuild_groups();
        self.generation += 1;

        tracing::trace!(
            rays = self.rays.len(),
            reconstructions = self.reconstruction_count(),
            generation = self.generation,
            "ray bundle rebuilt"
        );

        previous
    }

    /// Empties the bundle, keeping its capacity.
    pub fn clear(&mut self) {
        self.rays.clear();
        self.groups.clear();
        self.generation += 1;
    }

    fn rebuild_groups(&mut self) {
        self.groups.clear();
        let mut start = 0;
        for (index, ray) in self.rays.iter().enumerate().skip(1) {
            let previous = self.rays[index - 1].reconstruction_id();
            if ray.reconstruction_id() != previous {
                self.groups.push((previous, start..index));
                start = index;
            }
        }
        if let Some(last) = self.rays.last() {
            self.groups
                .push((last.reconstruction_id(), start..self.rays.len()));
        }
    }

    /// Returns true if there are no rays.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rays.is_empty()
    }

    /// Number of rays.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rays.len()
    }

    /// Generation counter, bumped by every `set_rays`/`clear`.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Every ray of the frame.
    #[inline]
    #[must_use]
    pub fn all(&self) -> &[CameraRay] {
        &self.rays
    }

    /// Rays contributing to the given reconstruction. Empty if the id is
    /// absent this frame.
    #[must_use]
    pub fn reconstruction(&self, reconstruction_id: u32) -> &[CameraRay] {
        &self.rays[self.group_range(reconstruction_id)]
    }

    /// Rays not assigned to any reconstruction.
    #[inline]
    #[must_use]
    pub fn unassigned(&self) -> &[CameraRay] {
        self.reconstruction(CameraRay::UNASSIGNED)
    }

    /// Rays assigned to some reconstruction.
    #[inline]
    #[must_use]
    pub fn assigned(&self) -> &[CameraRay] {
        &self.rays[self.unassigned_end()..]
    }

    /// Returns true if any ray is assigned.
    #[inline]
    #[must_use]
    pub fn has_assigned(&self) -> bool {
        self.unassigned_end() != self.rays.len()
    }

    /// Returns true if any ray is unassigned.
    #[inline]
    #[must_use]
    pub fn has_unassigned(&self) -> bool {
        !self.unassigned().is_empty()
    }

    /// Returns true if any ray contributes to the reconstruction.
    #[inline]
    #[must_use]
    pub fn has_reconstruction(&self, reconstruction_id: u32) -> bool {
        !self.group_range(reconstruction_id).is_empty()
    }

    /// Distinct assigned reconstruction ids, ascending.
    pub fn reconstruction_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| *id != CameraRay::UNASSIGNED)
    }

    /// Number of distinct assigned reconstructions.
    #[must_use]
    pub fn reconstruction_count(&self) -> usize {
        self.reconstruction_ids().count()
    }

    /// View over every ray.
    #[must_use]
    pub fn all_view(&self) -> BundleView {
        self.view(0..self.rays.len())
    }

    /// View over the assigned rays.
    #[must_use]
    pub fn assigned_view(&self) -> BundleView {
        self.view(self.unassigned_end()..self.rays.len())
    }

    /// View over the unassigned rays.
    #[must_use]
    pub fn unassigned_view(&self) -> BundleView {
        self.view(self.group_range(CameraRay::UNASSIGNED))
    }

    /// View over one reconstruction's rays.
    #[must_use]
    pub fn reconstruction_view(&self, reconstruction_id: u32) -> BundleView {
        self.view(self.group_range(reconstruction_id))
    }

    /// Resolves a view taken from this bundle. `None` if the view is stale
    /// or belongs to another bundle.
    #[must_use]
    pub fn resolve(&self, view: &BundleView) -> Option<&[CameraRay]> {
        view.slice(BundleKind::Rays, self.generation, |storage| match storage {
            ViewStorage::Primary => Some(self.rays.as_slice()),
            _ => None,
        })
    }

    fn view(&self, range: Range<usize>) -> BundleView {
        BundleView::new(BundleKind::Rays, ViewStorage::Primary, self.generation, range)
    }

    fn group_range(&self, reconstruction_id: u32) -> Range<usize> {
        self.groups
            .binary_search_by_key(&reconstruction_id, |(id, _)| *id)
            .map_or(0..0, |index| self.groups[index].1.clone())
    }

    fn unassigned_end(&self) -> usize {
        self.group_range(CameraRay::UNASSIGNED).end
    }
}

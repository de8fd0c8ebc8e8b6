//! # Rigid Body Bundle
//!
//! ```text
//! primary:      [ untracked ... | tracked ... ]
//! by_selection: [ unselected .. | selected .. ]
//! ```
//!
//! Unlike rays and markers, the primary storage is itself partitioned, so
//! `all()` lists untracked bodies first.

use super::partition::{collect_selection_order, Partitioned};
use super::view::{BundleKind, BundleView, ViewStorage};
use crate::entity::RigidBody;
use crate::id::Uid;

/// One frame's rigid body solves with tracked and selected partitions.
#[derive(Clone, Debug)]
pub struct RigidBodyBundle {
    primary: Partitioned<RigidBody>,
    by_selection: Partitioned<RigidBody>,
    selection_order: Vec<RigidBody>,
    generation: u64,
}

impl RigidBodyBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty bundle with room for `capacity` bodies.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            primary: Partitioned::with_capacity(capacity),
            by_selection: Partitioned::with_capacity(capacity),
            selection_order: Vec::new(),
            generation: 0,
        }
    }

    /// Replaces the bundle contents with this frame's rigid bodies.
    ///
    /// The bodies are copied into the partitioned storage; the incoming
    /// vector is handed back emptied so the caller can refill it.
    pub fn set_rigid_bodies(
        &mut self,
        mut rigid_bodies: Vec<RigidBody>,
        selection_order: &[Uid],
    ) -> Vec<RigidBody> {
        self.primary.rebuild(&rigid_bodies, |body| body.tracked);
        self.by_selection
            .rebuild(&rigid_bodies, |body| body.selected);
        collect_selection_order(
            &rigid_bodies,
            selection_order,
            |body| body.id,
            |body| body.selected,
            &mut self.selection_order,
        );
        self.generation += 1;
        rigid_bodies.clear();

        tracing::trace!(
            rigid_bodies = self.primary.len(),
            tracked = self.tracked().len(),
            generation = self.generation,
            "rigid body bundle rebuilt"
        );

        rigid_bodies
    }

    /// Empties the bundle, keeping its capacity.
    pub fn clear(&mut self) {
        self.primary.clear();
        self.by_selection.clear();
        self.selection_order.clear();
        self.generation += 1;
    }

    /// Returns true if there are no rigid bodies.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primary.len() == 0
    }

    /// Number of rigid bodies.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    /// Generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Every rigid body, untracked first.
    #[inline]
    #[must_use]
    pub fn all(&self) -> &[RigidBody] {
        self.primary.all()
    }

    /// Bodies solved this frame.
    #[inline]
    #[must_use]
    pub fn tracked(&self) -> &[RigidBody] {
        self.primary.upper()
    }

    /// Bodies not solved this frame.
    #[inline]
    #[must_use]
    pub fn untracked(&self) -> &[RigidBody] {
        self.primary.lower()
    }

    /// Selected bodies.
    #[inline]
    #[must_use]
    pub fn selected(&self) -> &[RigidBody] {
        self.by_selection.upper()
    }

    /// Unselected bodies.
    #[inline]
    #[must_use]
    pub fn unselected(&self) -> &[RigidBody] {
        self.by_selection.lower()
    }

    /// Bodies in user selection order.
    #[inline]
    #[must_use]
    pub fn selection_order(&self) -> &[RigidBody] {
        &self.selection_order
    }

    /// Returns true if any body is tracked.
    #[inline]
    #[must_use]
    pub fn has_tracked(&self) -> bool {
        !self.tracked().is_empty()
    }

    /// Returns true if any body is selected.
    #[inline]
    #[must_use]
    pub fn has_selected(&self) -> bool {
        !self.selected().is_empty()
    }

    /// First body of the selection order, else the first selected body.
    #[must_use]
    pub fn primary_selected(&self) -> Option<&RigidBody> {
        self.selection_order
            .first()
            .or_else(|| self.selected().first())
    }

    /// Finds a body by id.
    #[must_use]
    pub fn find(&self, id: Uid) -> Option<&RigidBody> {
        self.primary.all().iter().find(|body| body.id == id)
    }

    /// View over every body.
    #[must_use]
    pub fn all_view(&self) -> BundleView {
        self.view(ViewStorage::Primary, 0..self.primary.len())
    }

    /// View over the tracked bodies.
    #[must_use]
    pub fn tracked_view(&self) -> BundleView {
        self.view(ViewStorage::Primary, self.primary.boundary()..self.primary.len())
    }

    /// View over the untracked bodies.
    #[must_use]
    pub fn untracked_view(&self) -> BundleView {
        self.view(ViewStorage::Primary, 0..self.primary.boundary())
    }

    /// View over the selected bodies.
    #[must_use]
    pub fn selected_view(&self) -> BundleView {
        self.view(
            ViewStorage::BySelection,
            self.by_selection.boundary()..self.by_selection.len(),
        )
    }

    /// View over the bodies in selection order.
    #[must_use]
    pub fn selection_order_view(&self) -> BundleView {
        self.view(ViewStorage::SelectionOrder, 0..self.selection_order.len())
    }

    /// Resolves a view taken from this bundle.
    #[must_use]
    pub fn resolve(&self, view: &BundleView) -> Option<&[RigidBody]> {
        view.slice(BundleKind::RigidBodies, self.generation, |storage| match storage {
            ViewStorage::Primary => Some(self.primary.all()),
            ViewStorage::BySelection => Some(self.by_selection.all()),
            ViewStorage::SelectionOrder => Some(self.selection_order.as_slice()),
            ViewStorage::ByLabel => None,
        })
    }

    fn view(&self, storage: ViewStorage, range: std::ops::Range<usize>) -> BundleView {
        BundleView::new(BundleKind::RigidBodies, storage, self.generation, range)
    }
}

impl Default for RigidBodyBundle {
    fn default() -> Self {
        Self::new()
    }
}

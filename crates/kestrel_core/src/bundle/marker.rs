//! # Marker Bundle
//!
//! All markers of one frame plus two partitioned copies:
//!
//! ```text
//! by_label:     [ unlabeled ... | labeled ... ]
//! by_selection: [ unselected .. | selected .. ]
//! selection_order: markers in the order the user selected them
//! ```

use super::partition::{collect_selection_order, Partitioned};
use super::view::{BundleKind, BundleView, ViewStorage};
use crate::entity::Marker;
use crate::id::Uid;

/// One frame's markers with labeled and selected partitions.
#[derive(Clone, Debug)]
pub struct MarkerBundle {
    /// Markers in the order they were handed in.
    all: Vec<Marker>,
    by_label: Partitioned<Marker>,
    by_selection: Partitioned<Marker>,
    /// Caller-supplied selection order, never re-sorted.
    selection_order: Vec<Marker>,
    generation: u64,
}

impl MarkerBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty bundle with room for `capacity` markers.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            all: Vec::with_capacity(capacity),
            by_label: Partitioned::with_capacity(capacity),
            by_selection: Partitioned::with_capacity(capacity),
            selection_order: Vec::new(),
            generation: 0,
        }
    }

    /// Replaces the bundle contents with this frame's markers.
    ///
    /// `selection_order` lists the ids of selected markers in the order they
    /// were selected. Returns the previous frame's storage, emptied.
    pub fn set_markers(&mut self, markers: Vec<Marker>, selection_order: &[Uid]) -> Vec<Marker> {
        let mut previous = std::mem::replace(&mut self.all, markers);
        previous.clear();

        self.by_label.rebuild(&self.all, Marker::is_labeled);
        self.by_selection.rebuild(&self.all, |marker| marker.selected);
        collect_selection_order(
            &self.all,
            selection_order,
            |marker| marker.id,
            |marker| marker.selected,
            &mut self.selection_order,
        );
        self.generation += 1;

        tracing::trace!(
            markers = self.all.len(),
            labeled = self.labeled().len(),
            selected = self.selected().len(),
            generation = self.generation,
            "marker bundle rebuilt"
        );

        previous
    }

    /// Empties the bundle, keeping its capacity.
    pub fn clear(&mut self) {
        self.all.clear();
        self.by_label.clear();
        self.by_selection.clear();
        self.selection_order.clear();
        self.generation += 1;
    }

    /// Returns true if there are no markers.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Number of markers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.all.len()
    }

    /// Generation counter, bumped by every `set_markers`/`clear`.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Every marker of the frame.
    #[inline]
    #[must_use]
    pub fn all(&self) -> &[Marker] {
        &self.all
    }

    /// Markers whose id is a label naming a real entity.
    #[inline]
    #[must_use]
    pub fn labeled(&self) -> &[Marker] {
        self.by_label.upper()
    }

    /// Markers that are not labeled.
    #[inline]
    #[must_use]
    pub fn unlabeled(&self) -> &[Marker] {
        self.by_label.lower()
    }

    /// Selected markers, in storage order.
    #[inline]
    #[must_use]
    pub fn selected(&self) -> &[Marker] {
        self.by_selection.upper()
    }

    /// Markers that are not selected.
    #[inline]
    #[must_use]
    pub fn unselected(&self) -> &[Marker] {
        self.by_selection.lower()
    }

    /// Markers in user selection order.
    #[inline]
    #[must_use]
    pub fn selection_order(&self) -> &[Marker] {
        &self.selection_order
    }

    /// Returns true if any marker is labeled.
    #[inline]
    #[must_use]
    pub fn has_labeled(&self) -> bool {
        !self.labeled().is_empty()
    }

    /// Returns true if any marker is unlabeled.
    #[inline]
    #[must_use]
    pub fn has_unlabeled(&self) -> bool {
        !self.unlabeled().is_empty()
    }

    /// Returns true if any marker is selected.
    #[inline]
    #[must_use]
    pub fn has_selected(&self) -> bool {
        !self.selected().is_empty()
    }

    /// The marker the user selected first, falling back to the first
    /// selected marker in storage order.
    #[must_use]
    pub fn primary_selected(&self) -> Option<&Marker> {
        self.selection_order
            .first()
            .or_else(|| self.selected().first())
    }

    /// Finds a marker by id.
    #[must_use]
    pub fn find(&self, id: Uid) -> Option<&Marker> {
        self.all.iter().find(|marker| marker.id == id)
    }

    /// View over every marker.
    #[must_use]
    pub fn all_view(&self) -> BundleView {
        self.view(ViewStorage::Primary, 0..self.all.len())
    }

    /// View over the labeled markers.
    #[must_use]
    pub fn labeled_view(&self) -> BundleView {
        self.view(ViewStorage::ByLabel, self.by_label.boundary()..self.by_label.len())
    }

    /// View over the unlabeled markers.
    #[must_use]
    pub fn unlabeled_view(&self) -> BundleView {
        self.view(ViewStorage::ByLabel, 0..self.by_label.boundary())
    }

    /// View over the selected markers.
    #[must_use]
    pub fn selected_view(&self) -> BundleView {
        self.view(
            ViewStorage::BySelection,
            self.by_selection.boundary()..self.by_selection.len(),
        )
    }

    /// View over the markers in selection order.
    #[must_use]
    pub fn selection_order_view(&self) -> BundleView {
        self.view(ViewStorage::SelectionOrder, 0..self.selection_order.len())
    }

    /// Resolves a view taken from this bundle. `None` if the view is stale
    /// or belongs to another bundle.
    #[must_use]
    pub fn resolve(&self, view: &BundleView) -> Option<&[Marker]> {
        view.slice(BundleKind::Markers, self.generation, |storage| {
            Some(match storage {
                ViewStorage::Primary => self.all.as_slice(),
                ViewStorage::ByLabel => self.by_label.all(),
                ViewStorage::BySelection => self.by_selection.all(),
                ViewStorage::SelectionOrder => self.selection_order.as_slice(),
            })
        })
    }

    fn view(&self, storage: ViewStorage, range: std::ops::Range<usize>) -> BundleView {
        BundleView::new(BundleKind::Markers, storage, self.generation, range)
    }
}

impl Default for MarkerBundle {
    fn default() -> Self {
        Self::new()
    }
}

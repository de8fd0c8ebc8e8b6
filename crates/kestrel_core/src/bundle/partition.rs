//! Stable two-way partition with a single boundary index.

use std::collections::HashMap;

use crate::id::Uid;

/// An owned copy of a frame's entities, arranged so that every entity
/// failing the predicate comes before every entity satisfying it.
///
/// Rebuilding reuses the existing allocation.
#[derive(Clone, Debug)]
pub(crate) struct Partitioned<T> {
    items: Vec<T>,
    boundary: usize,
}

impl<T: Clone> Partitioned<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            boundary: 0,
        }
    }

    /// Refills from `source`, preserving relative order within each half.
    pub(crate) fn rebuild(&mut self, source: &[T], predicate: impl Fn(&T) -> bool) {
        self.items.clear();
        self.items
            .extend(source.iter().filter(|item| !predicate(item)).cloned());
        self.boundary = self.items.len();
        self.items
            .extend(source.iter().filter(|item| predicate(item)).cloned());
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.boundary = 0;
    }

    pub(crate) fn all(&self) -> &[T] {
        &self.items
    }

    /// Entities failing the predicate.
    pub(crate) fn lower(&self) -> &[T] {
        &self.items[..self.boundary]
    }

    /// Entities satisfying the predicate.
    pub(crate) fn upper(&self) -> &[T] {
        &self.items[self.boundary..]
    }

    pub(crate) fn boundary(&self) -> usize {
        self.boundary
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}

/// Copies the entities named in `order` into `out`, in that order.
///
/// Only entities passing `is_selected` are kept. Ids absent from `source`
/// are skipped; duplicates keep their first occurrence only.
pub(crate) fn collect_selection_order<T: Clone>(
    source: &[T],
    order: &[Uid],
    id_of: impl Fn(&T) -> Uid,
    is_selected: impl Fn(&T) -> bool,
    out: &mut Vec<T>,
) {
    out.clear();
    if order.is_empty() {
        return;
    }

    let mut by_id: HashMap<Uid, usize> = HashMap::with_capacity(order.len());
    for (index, entity) in source.iter().enumerate() {
        if is_selected(entity) {
            by_id.entry(id_of(entity)).or_insert(index);
        }
    }

    // Removing on first hit drops later duplicates.
    out.extend(
        order
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(|index| source[index].clone()),
    );
}

//! # Bundle Views
//!
//! Slices borrowed from a bundle cannot outlive the next `set`, so stale use
//! is impossible by construction. Worker threads, however, need something
//! `'static` they can carry next to an `Arc` of the bundle. A [`BundleView`]
//! is that: an index range tagged with the bundle kind, the storage it
//! indexes and the generation it was taken from. Resolving it against a
//! bundle that has since been refilled yields `None`.

use std::ops::Range;

/// Which bundle a view was taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BundleKind {
    /// [`super::RayBundle`]
    Rays,
    /// [`super::MarkerBundle`]
    Markers,
    /// [`super::RigidBodyBundle`]
    RigidBodies,
}

/// Which internal copy of a bundle a view indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewStorage {
    /// The bundle's primary ordering.
    Primary,
    /// The labeled/unlabeled ordering (markers).
    ByLabel,
    /// The selected/unselected ordering.
    BySelection,
    /// The caller-supplied selection order.
    SelectionOrder,
}

/// A generation-tagged index range into one of a bundle's internal copies.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BundleView {
    kind: BundleKind,
    storage: ViewStorage,
    generation: u64,
    range: Range<usize>,
}

impl BundleView {
    pub(crate) const fn new(
        kind: BundleKind,
        storage: ViewStorage,
        generation: u64,
        range: Range<usize>,
    ) -> Self {
        Self {
            kind,
            storage,
            generation,
            range,
        }
    }

    /// Bundle this view belongs to.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> BundleKind {
        self.kind
    }

    /// Internal copy this view indexes.
    #[inline]
    #[must_use]
    pub const fn storage(&self) -> ViewStorage {
        self.storage
    }

    /// Generation of the bundle when the view was taken.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Index range into the storage.
    #[inline]
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Number of entities covered.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Returns true if the view covers nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Splits the view into consecutive sub-views of at most `chunk_size`
    /// entities. A `chunk_size` of zero is treated as one.
    pub fn chunks(&self, chunk_size: usize) -> impl Iterator<Item = Self> + '_ {
        let step = chunk_size.max(1);
        self.range.clone().step_by(step).map(move |start| {
            let end = (start + step).min(self.range.end);
            Self::new(self.kind, self.storage, self.generation, start..end)
        })
    }

    /// Resolves the view against a slice, checking kind, storage and generation.
    pub(crate) fn slice<'a, T>(
        &self,
        kind: BundleKind,
        generation: u64,
        storage: impl FnOnce(ViewStorage) -> Option<&'a [T]>,
    ) -> Option<&'a [T]> {
        if self.kind != kind || self.generation != generation {
            return None;
        }
        storage(self.storage)?.get(self.range.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_cover_range() {
        let view = BundleView::new(BundleKind::Rays, ViewStorage::Primary, 3, 2..12);
        let chunks: Vec<_> = view.chunks(4).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].range(), 2..6);
        assert_eq!(chunks[1].range(), 6..10);
        assert_eq!(chunks[2].range(), 10..12);
        assert!(chunks.iter().all(|c| c.generation() == 3));
    }

    #[test]
    fn test_empty_view_has_no_chunks() {
        let view = BundleView::new(BundleKind::Markers, ViewStorage::ByLabel, 0, 5..5);
        assert!(view.is_empty());
        assert_eq!(view.chunks(8).count(), 0);
    }

    #[test]
    fn test_zero_chunk_size() {
        let view = BundleView::new(BundleKind::Rays, ViewStorage::Primary, 0, 0..3);
        assert_eq!(view.chunks(0).count(), 3);
    }

    #[test]
    fn test_slice_checks_generation_and_kind() {
        let data = [1, 2, 3, 4];
        let view = BundleView::new(BundleKind::Rays, ViewStorage::Primary, 1, 1..3);
        let lookup = |_: ViewStorage| Some(&data[..]);

        assert_eq!(view.slice(BundleKind::Rays, 1, lookup), Some(&data[1..3]));
        assert_eq!(view.slice(BundleKind::Rays, 2, lookup), None);
        assert_eq!(view.slice(BundleKind::Markers, 1, lookup), None);
    }
}

//! 3D markers.

use serde::{Deserialize, Serialize};

use crate::id::{self, DecodedLabel, EntityType, Uid};
use crate::math::Vec3;

/// A reconstructed 3D marker for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Identifier. Either a random tracking id or an encoded label.
    pub id: Uid,
    /// World-space position.
    pub position: Vec3,
    /// Estimated marker diameter.
    pub size: f32,
    /// Mean reconstruction residual.
    pub residual: f32,
    /// Selection state.
    pub selected: bool,
}

impl Marker {
    /// Creates an unselected marker.
    #[must_use]
    pub const fn new(id: Uid, position: Vec3) -> Self {
        Self {
            id,
            position,
            size: 0.0,
            residual: 0.0,
            selected: false,
        }
    }

    /// Returns the same marker with the selection flag set.
    #[must_use]
    pub const fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// The decoded label, if the id is one.
    #[inline]
    #[must_use]
    pub fn label(&self) -> Option<DecodedLabel> {
        id::decode(self.id).ok()
    }

    /// Returns true if the id decodes to a label naming a real entity.
    #[inline]
    #[must_use]
    pub fn is_labeled(&self) -> bool {
        self.label()
            .is_some_and(|label| label.entity_type != EntityType::None)
    }
}

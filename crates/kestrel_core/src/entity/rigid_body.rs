//! Rigid body solve results.

use serde::{Deserialize, Serialize};

use crate::id::Uid;
use crate::math::{Quaternion, Vec3};

/// Maximum number of markers a rigid body reports on.
pub const MAX_RIGID_BODY_MARKERS: usize = 20;

/// Per-marker sub-result of a rigid body solve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyMarker {
    /// World-space calculated marker location.
    pub position: Vec3,
    /// Whether this marker was found this frame.
    pub tracked: bool,
    /// Fit quality, 0..=1.
    pub quality: f32,
}

/// A rigid body solve result for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    /// Identifier (usually an encoded rigid body label).
    pub id: Uid,
    /// Selection state.
    pub selected: bool,
    /// Number of valid entries in `markers`.
    pub marker_count: usize,
    /// Whether the body was solved this frame.
    pub tracked: bool,
    /// Frames since the body was last tracked.
    pub frames_untracked: u32,
    /// World-space position.
    pub position: Vec3,
    /// World-space orientation.
    pub orientation: Quaternion,
    /// Per-marker results; only the first `marker_count` are meaningful.
    pub markers: [RigidBodyMarker; MAX_RIGID_BODY_MARKERS],
    /// Mean error per marker.
    pub error_per_marker: f32,
}

impl RigidBody {
    /// Creates an untracked, unselected body at the origin.
    #[must_use]
    pub fn new(id: Uid) -> Self {
        Self {
            id,
            selected: false,
            marker_count: 0,
            tracked: false,
            frames_untracked: 0,
            position: Vec3::ZERO,
            orientation: Quaternion::IDENTITY,
            markers: [RigidBodyMarker::default(); MAX_RIGID_BODY_MARKERS],
            error_per_marker: 0.0,
        }
    }

    /// The meaningful per-marker results.
    #[must_use]
    pub fn markers(&self) -> &[RigidBodyMarker] {
        &self.markers[..self.marker_count.min(MAX_RIGID_BODY_MARKERS)]
    }

    /// Per-marker results that were tracked this frame.
    pub fn tracked_markers(&self) -> impl Iterator<Item = &RigidBodyMarker> {
        self.markers().iter().filter(|m| m.tracked)
    }

    /// Expresses a world-space point in this body's local frame.
    #[must_use]
    pub fn world_to_rigid_body(&self, world: Vec3) -> Vec3 {
        self.orientation.conjugate().rotate(world - self.position)
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(Uid::INVALID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_respect_count() {
        let mut body = RigidBody::new(Uid::new(1, 1));
        body.marker_count = 3;
        body.markers[0].tracked = true;
        body.markers[2].tracked = true;
        body.markers[5].tracked = true;

        assert_eq!(body.markers().len(), 3);
        assert_eq!(body.tracked_markers().count(), 2);
    }

    #[test]
    fn test_world_to_rigid_body() {
        let mut body = RigidBody::new(Uid::new(1, 1));
        body.position = Vec3::new(1.0, 0.0, 0.0);
        body.orientation = Quaternion::from_axis_angle(Vec3::Z, std::f32::consts::FRAC_PI_2);

        let local = body.world_to_rigid_body(Vec3::new(1.0, 1.0, 0.0));
        assert!(local.distance(Vec3::X) < 1e-5);
    }
}

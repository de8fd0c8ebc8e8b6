//! Camera rays.

use serde::{Deserialize, Serialize};

use crate::math::{Vec2, Vec3};

/// A ray that emanates from a camera and may be assigned to a 3D
/// reconstruction.
///
/// Everything except the reconstruction assignment and the length is fixed
/// at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraRay {
    id: i32,
    camera_id: i32,
    reconstruction_id: u32,
    image_position: Vec2,
    image_area: f32,
    origin: Vec3,
    direction: Vec3,
    length: f32,
}

impl CameraRay {
    /// Reconstruction id of a ray that is not assigned to anything.
    pub const UNASSIGNED: u32 = 0;

    /// Creates a new ray.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        id: i32,
        camera_id: i32,
        reconstruction_id: u32,
        image_position: Vec2,
        image_area: f32,
        origin: Vec3,
        direction: Vec3,
        length: f32,
    ) -> Self {
        Self {
            id,
            camera_id,
            reconstruction_id,
            image_position,
            image_area,
            origin,
            direction,
            length,
        }
    }

    /// Ray id, unique among the rays of one frame.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> i32 {
        self.id
    }

    /// Serial of the camera this ray came from.
    #[inline]
    #[must_use]
    pub const fn camera_id(&self) -> i32 {
        self.camera_id
    }

    /// Reconstruction this ray is assigned to, 0 if none.
    #[inline]
    #[must_use]
    pub const fn reconstruction_id(&self) -> u32 {
        self.reconstruction_id
    }

    /// Assigns the ray to a reconstruction (0 unassigns it).
    #[inline]
    pub fn set_reconstruction_id(&mut self, id: u32) {
        self.reconstruction_id = id;
    }

    /// Returns true if the ray is assigned to a reconstruction.
    #[inline]
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.reconstruction_id != Self::UNASSIGNED
    }

    /// 2D centroid in the camera image.
    #[inline]
    #[must_use]
    pub const fn image_position(&self) -> Vec2 {
        self.image_position
    }

    /// Pixel area of the centroid in the camera image.
    #[inline]
    #[must_use]
    pub const fn image_area(&self) -> f32 {
        self.image_area
    }

    /// 3D origin.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Normalized 3D direction.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Ray length.
    #[inline]
    #[must_use]
    pub const fn length(&self) -> f32 {
        self.length
    }

    /// Sets the ray length.
    #[inline]
    pub fn set_length(&mut self, length: f32) {
        self.length = length;
    }

    /// Point at distance `t` along the ray.
    #[inline]
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Far end of the ray.
    #[inline]
    #[must_use]
    pub fn end_point(&self) -> Vec3 {
        self.point_at(self.length)
    }

    /// Returns true if both records describe the same ray (same id and camera).
    #[inline]
    #[must_use]
    pub const fn same_ray(&self, other: &Self) -> bool {
        self.id == other.id && self.camera_id == other.camera_id
    }
}

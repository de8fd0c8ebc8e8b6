//! # Per-Frame Entity Records
//!
//! The records produced upstream every frame and indexed by the bundles.
//! They are plain values: the bundles copy and reorder them freely.

mod marker;
mod ray;
mod rigid_body;

pub use marker::Marker;
pub use ray::CameraRay;
pub use rigid_body::{RigidBody, RigidBodyMarker, MAX_RIGID_BODY_MARKERS};

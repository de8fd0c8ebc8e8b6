//! # Kestrel Core
//!
//! Per-frame data organization for the motion capture pipeline:
//! - 128-bit identifiers and the label codec that packs
//!   (entity type, entity index, member index) into them
//! - Camera ray, marker and rigid body records
//! - Partitioned bundles answering every per-frame query in O(1)
//!
//! ## Architecture Rules
//!
//! 1. **One frame per bundle** - `set_*` replaces everything, no merging
//! 2. **Partition once** - all ordering work happens in `set_*`
//! 3. **Reuse storage** - previous frame vectors are handed back emptied
//!
//! ## Example
//!
//! ```rust
//! use kestrel_core::bundle::MarkerBundle;
//! use kestrel_core::entity::Marker;
//! use kestrel_core::id::{encode, EntityType, Uid};
//! use kestrel_core::math::Vec3;
//!
//! let label = encode(EntityType::MarkerSet, 3, 1).unwrap();
//! let mut markers = MarkerBundle::new();
//! let spare = markers.set_markers(
//!     vec![Marker::new(label, Vec3::ZERO), Marker::new(Uid::generate(), Vec3::X)],
//!     &[],
//! );
//!
//! assert_eq!(markers.labeled().len(), 1);
//! assert_eq!(markers.unlabeled().len(), 1);
//! assert!(spare.is_empty());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bundle;
pub mod entity;
pub mod id;
pub mod math;
pub mod timecode;

pub use bundle::{BundleKind, BundleView, MarkerBundle, RayBundle, RigidBodyBundle, ViewStorage};
pub use entity::{CameraRay, Marker, RigidBody, RigidBodyMarker, MAX_RIGID_BODY_MARKERS};
pub use id::{DecodedLabel, EntityType, Label, LabelError, LabelResult, Uid};
pub use math::{Quaternion, Vec2, Vec3};
pub use timecode::TimeCode;

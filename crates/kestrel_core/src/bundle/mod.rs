//! # Partitioned Bundles
//!
//! Each bundle owns exactly one frame's entities. `set_*` does all the
//! ordering work once, after which every query is a slice:
//!
//! | bundle              | partitions                                   |
//! |---------------------|----------------------------------------------|
//! | [`RayBundle`]       | by reconstruction id (unassigned first)      |
//! | [`MarkerBundle`]    | labeled, selected, selection order           |
//! | [`RigidBodyBundle`] | tracked (primary), selected, selection order |
//!
//! Storage is reused across frames. `set_*` hands the previous frame's
//! vector back emptied so the producer can refill it without allocating.

mod marker;
mod partition;
mod ray;
mod rigid_body;
mod view;

pub use marker::MarkerBundle;
pub use ray::RayBundle;
pub use rigid_body::RigidBodyBundle;
pub use view::{BundleKind, BundleView, ViewStorage};

//! Partition properties of the bundles over randomized frames.

use std::collections::HashSet;

use kestrel_core::bundle::{MarkerBundle, RayBundle, RigidBodyBundle};
use kestrel_core::entity::{CameraRay, Marker, RigidBody};
use kestrel_core::id::{self, EntityType, Uid};
use kestrel_core::math::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_rays(rng: &mut ChaCha8Rng, count: usize) -> Vec<CameraRay> {
    (0..count)
        .map(|i| {
            let reconstruction = if rng.gen_bool(0.2) { 0 } else { rng.gen_range(1..40) };
            CameraRay::new(
                i32::try_from(i).unwrap(),
                rng.gen_range(0..8),
                reconstruction,
                Vec2::ZERO,
                1.0,
                Vec3::ZERO,
                Vec3::Z,
                1.0,
            )
        })
        .collect()
}

fn random_markers(rng: &mut ChaCha8Rng, count: usize) -> Vec<Marker> {
    (0..count)
        .map(|i| {
            let id = if rng.gen_bool(0.5) {
                id::encode(EntityType::MarkerSet, 0, u32::try_from(i).unwrap()).unwrap()
            } else {
                Uid::generate()
            };
            Marker::new(id, Vec3::ZERO).with_selected(rng.gen_bool(0.3))
        })
        .collect()
}

#[test]
fn test_ray_groups_are_contiguous_and_complete() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut bundle = RayBundle::with_capacity(512);
    let mut buffer = Vec::new();

    for _ in 0..20 {
        let count = rng.gen_range(0..500);
        buffer.extend(random_rays(&mut rng, count));
        buffer = bundle.set_rays(buffer);
        assert!(buffer.is_empty());

        assert_eq!(bundle.len(), count);
        assert_eq!(bundle.assigned().len() + bundle.unassigned().len(), count);
        assert!(bundle.unassigned().iter().all(|r| !r.is_assigned()));

        let mut covered = bundle.unassigned().len();
        let mut previous = None;
        for reconstruction in bundle.reconstruction_ids() {
            assert!(previous < Some(reconstruction));
            previous = Some(reconstruction);

            let group = bundle.reconstruction(reconstruction);
            assert!(!group.is_empty());
            assert!(group.iter().all(|r| r.reconstruction_id() == reconstruction));
            covered += group.len();
        }
        assert_eq!(covered, count);
        assert!(bundle.reconstruction(1_000).is_empty());
    }
}

#[test]
fn test_marker_partitions_hold_every_marker_once() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut bundle = MarkerBundle::with_capacity(256);

    for _ in 0..20 {
        let count = rng.gen_range(0..256);
        let markers = random_markers(&mut rng, count);
        let expected: HashSet<Uid> = markers.iter().map(|m| m.id).collect();
        let selection: Vec<Uid> = markers
            .iter()
            .filter(|m| m.selected)
            .map(|m| m.id)
            .rev()
            .collect();

        bundle.set_markers(markers, &selection);

        let labeled: HashSet<Uid> = bundle.labeled().iter().map(|m| m.id).collect();
        let unlabeled: HashSet<Uid> = bundle.unlabeled().iter().map(|m| m.id).collect();
        assert!(labeled.is_disjoint(&unlabeled));
        assert_eq!(&labeled | &unlabeled, expected);
        assert!(bundle.labeled().iter().all(Marker::is_labeled));

        assert!(bundle.selected().iter().all(|m| m.selected));
        assert!(bundle.unselected().iter().all(|m| !m.selected));
        assert_eq!(bundle.selection_order().len(), selection.len());
        let order: Vec<Uid> = bundle.selection_order().iter().map(|m| m.id).collect();
        assert_eq!(order, selection);
    }
}

#[test]
fn test_rigid_bodies_untracked_first() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut bundle = RigidBodyBundle::with_capacity(64);

    let bodies: Vec<RigidBody> = (0..64)
        .map(|_| {
            let mut body = RigidBody::new(Uid::generate());
            body.tracked = rng.gen_bool(0.7);
            body
        })
        .collect();
    let tracked = bodies.iter().filter(|b| b.tracked).count();

    bundle.set_rigid_bodies(bodies, &[]);

    assert_eq!(bundle.tracked().len(), tracked);
    let boundary = bundle.untracked().len();
    assert!(bundle.all()[..boundary].iter().all(|b| !b.tracked));
    assert!(bundle.all()[boundary..].iter().all(|b| b.tracked));
}

#[test]
fn test_storage_cycles_without_growth() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let mut bundle = RayBundle::with_capacity(300);
    let mut spare = Vec::with_capacity(300);

    spare.extend(random_rays(&mut rng, 300));
    spare = bundle.set_rays(spare);
    let capacity = spare.capacity();

    for _ in 0..10 {
        spare.extend(random_rays(&mut rng, 300));
        spare = bundle.set_rays(spare);
        assert!(spare.capacity() >= 300);
        assert!(spare.capacity() <= capacity.max(300));
    }
}

#[test]
fn test_set_after_empty_is_idempotent() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let markers = random_markers(&mut rng, 100);
    let selection: Vec<Uid> = markers.iter().filter(|m| m.selected).map(|m| m.id).collect();

    let mut bundle = MarkerBundle::new();
    bundle.set_markers(Vec::new(), &[]);
    assert!(bundle.is_empty());
    assert!(bundle.labeled().is_empty());

    bundle.set_markers(markers.clone(), &selection);
    let first = (
        bundle.labeled().to_vec(),
        bundle.unlabeled().to_vec(),
        bundle.selected().to_vec(),
        bundle.selection_order().to_vec(),
    );

    bundle.set_markers(markers.clone(), &selection);
    let second = (
        bundle.labeled().to_vec(),
        bundle.unlabeled().to_vec(),
        bundle.selected().to_vec(),
        bundle.selection_order().to_vec(),
    );

    assert_eq!(first, second);
    assert_eq!(bundle.all(), markers.as_slice());
    assert_eq!(
        bundle.selected().len() + bundle.unselected().len(),
        bundle.labeled().len() + bundle.unlabeled().len()
    );
}

#[test]
fn test_rigid_body_selection_partition_is_complete() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let mut bundle = RigidBodyBundle::with_capacity(64);

    for _ in 0..10 {
        let count = rng.gen_range(0..64);
        let bodies: Vec<RigidBody> = (0..count)
            .map(|_| {
                let mut body = RigidBody::new(Uid::generate());
                body.tracked = rng.gen_bool(0.5);
                body.selected = rng.gen_bool(0.3);
                body
            })
            .collect();
        let expected: HashSet<Uid> = bodies.iter().map(|b| b.id).collect();
        // Name every body, flagged or not.
        let order: Vec<Uid> = bodies.iter().rev().map(|b| b.id).collect();

        bundle.set_rigid_bodies(bodies, &order);

        let selected: HashSet<Uid> = bundle.selected().iter().map(|b| b.id).collect();
        let unselected: HashSet<Uid> = bundle.unselected().iter().map(|b| b.id).collect();
        assert!(selected.is_disjoint(&unselected));
        assert_eq!(&selected | &unselected, expected);
        assert!(bundle.selected().iter().all(|b| b.selected));
        assert!(bundle.unselected().iter().all(|b| !b.selected));

        assert_eq!(bundle.selection_order().len(), bundle.selected().len());
        assert!(bundle.selection_order().iter().all(|b| selected.contains(&b.id)));
        assert_eq!(bundle.has_selected(), !selected.is_empty());
        if let Some(primary) = bundle.primary_selected() {
            assert!(selected.contains(&primary.id));
        }
    }
}

#[test]
fn test_ray_set_after_empty_is_idempotent() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let rays = random_rays(&mut rng, 200);
    let mut bundle = RayBundle::new();

    let spare = bundle.set_rays(Vec::new());
    assert!(spare.is_empty());
    assert!(bundle.is_empty());
    assert_eq!(bundle.reconstruction_count(), 0);

    bundle.set_rays(rays.clone());
    let first_all = bundle.all().to_vec();
    let first_groups: Vec<(u32, Vec<CameraRay>)> = bundle
        .reconstruction_ids()
        .map(|id| (id, bundle.reconstruction(id).to_vec()))
        .collect();
    let first_unassigned = bundle.unassigned().to_vec();

    bundle.set_rays(rays);
    let second_groups: Vec<(u32, Vec<CameraRay>)> = bundle
        .reconstruction_ids()
        .map(|id| (id, bundle.reconstruction(id).to_vec()))
        .collect();

    assert_eq!(bundle.all(), first_all.as_slice());
    assert_eq!(second_groups, first_groups);
    assert_eq!(bundle.unassigned(), first_unassigned.as_slice());
}

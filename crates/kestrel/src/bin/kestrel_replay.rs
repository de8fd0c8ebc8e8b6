//! # Kestrel Replay
//!
//! Drives the frame pipeline with seeded synthetic frames and logs a
//! summary per frame. Useful for profiling the bundles and the pool
//! without capture hardware.
//!
//! ```bash
//! kestrel_replay --frames 600 --seed 7
//! kestrel_replay --config kestrel.toml
//! RUST_LOG=debug kestrel_replay
//! ```

use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};

use kestrel::core::bundle::BundleView;
use kestrel::core::entity::{CameraRay, Marker, RigidBody};
use kestrel::core::id::{encode, EntityType, Uid};
use kestrel::core::math::{Quaternion, Vec2, Vec3};
use kestrel::core::TimeCode;
use kestrel::dispatch::TaskError;
use kestrel::{FrameData, FrameEvent, FrameInput, FramePipeline, FrameStage, KestrelConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CAMERAS: i32 = 12;
const FRAME_RATE: u64 = 30;

/// Accumulates the length of every assigned ray, in micrometres.
struct RayLengthStage {
    total_um: AtomicU64,
}

impl FrameStage for RayLengthStage {
    fn name(&self) -> &str {
        "ray_length"
    }

    fn plan(&self, frame: &FrameData, chunk_size: usize) -> Vec<BundleView> {
        frame.rays.assigned_view().chunks(chunk_size).collect()
    }

    fn process(&self, frame: &FrameData, view: BundleView) -> Result<(), TaskError> {
        let rays = frame
            .rays
            .resolve(&view)
            .ok_or_else(|| TaskError::new("stale ray view"))?;

        let mut total = 0.0_f64;
        for ray in rays {
            let length = ray.origin().distance(ray.end_point());
            if !length.is_finite() {
                return Err(TaskError::new(format!("ray {} has no finite length", ray.id())));
            }
            total += f64::from(length);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let micrometres = (total * 1_000_000.0) as u64;
        self.total_um.fetch_add(micrometres, Ordering::Relaxed);
        Ok(())
    }
}

struct Options {
    config: KestrelConfig,
    frames: u64,
    seed: u64,
}

fn parse_args() -> Result<Options, Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    let value_of = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
    };

    let config = match value_of("--config") {
        Some(path) => KestrelConfig::load(path)?,
        None => KestrelConfig::default(),
    };
    let frames = value_of("--frames").map_or(Ok(120), |s| s.parse())?;
    let seed = value_of("--seed").map_or(Ok(0), |s| s.parse())?;

    Ok(Options {
        config,
        frames,
        seed,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn timecode_for(frame_number: u64) -> TimeCode {
    let seconds = frame_number / FRAME_RATE;
    TimeCode::from_parts(
        (seconds / 3600 % 24) as u8,
        (seconds / 60 % 60) as u8,
        (seconds % 60) as u8,
        (frame_number % FRAME_RATE) as u8,
        0,
        false,
    )
}

/// Fills `input` with a plausible frame.
fn synthesize(rng: &mut ChaCha8Rng, config: &KestrelConfig, input: &mut FrameInput) {
    let bundles = &config.bundles;
    let marker_count = rng.gen_range(bundles.marker_capacity / 2..=bundles.marker_capacity);

    input.markers.extend((0..marker_count).map(|i| {
        let id = if rng.gen_bool(0.8) {
            let member = u32::try_from(i).unwrap_or(u32::MAX);
            encode(EntityType::MarkerSet, 0, member).unwrap_or(Uid::INVALID)
        } else {
            Uid::new(rng.gen(), rng.gen())
        };
        let position = Vec3::new(rng.gen_range(-2.0..2.0), rng.gen_range(0.0..2.0), rng.gen_range(-2.0..2.0));
        Marker::new(id, position).with_selected(rng.gen_bool(0.02))
    }));
    input.marker_selection.extend(
        input
            .markers
            .iter()
            .filter(|m| m.selected)
            .map(|m| m.id),
    );

    let ray_count = rng.gen_range(bundles.ray_capacity / 2..=bundles.ray_capacity);
    let reconstructions = u32::try_from(marker_count).unwrap_or(u32::MAX).max(1);
    input.rays.extend((0..ray_count).map(|i| {
        let camera = rng.gen_range(0..CAMERAS);
        let origin = Vec3::new(f32::from(u8::try_from(camera).unwrap_or(0)), 3.0, -4.0);
        let reconstruction = if rng.gen_bool(0.15) {
            CameraRay::UNASSIGNED
        } else {
            rng.gen_range(1..=reconstructions)
        };
        CameraRay::new(
            i32::try_from(i).unwrap_or(i32::MAX),
            camera,
            reconstruction,
            Vec2::new(rng.gen_range(0.0..1280.0), rng.gen_range(0.0..1024.0)),
            rng.gen_range(4.0..40.0),
            origin,
            Vec3::new(0.0, -0.6, 0.8),
            rng.gen_range(1.0..8.0),
        )
    }));

    let body_count = rng.gen_range(0..=bundles.rigid_body_capacity / 4);
    input.rigid_bodies.extend((0..body_count).map(|i| {
        let index = u32::try_from(i).unwrap_or(u32::MAX);
        let mut body = RigidBody::new(encode(EntityType::RigidBody, index, 0).unwrap_or(Uid::INVALID));
        body.tracked = rng.gen_bool(0.9);
        body.selected = i == 0;
        body.position = Vec3::new(rng.gen_range(-2.0..2.0), 1.0, rng.gen_range(-2.0..2.0));
        body.orientation = Quaternion::from_axis_angle(Vec3::Y, rng.gen_range(0.0..std::f32::consts::TAU));
        body
    }));
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let options = parse_args()?;
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let config = options.config.clone();

    let stage = RayLengthStage {
        total_um: AtomicU64::new(0),
    };
    let mut pipeline = FramePipeline::new(options.config, stage)?;
    let events = pipeline.events();

    tracing::info!(
        frames = options.frames,
        seed = options.seed,
        workers = pipeline.worker_count(),
        "replay starting"
    );

    let mut failed_frames = 0_u64;
    for frame_number in 0..options.frames {
        let mut input = pipeline.recycle();
        input.frame_number = frame_number;
        input.timecode = Some(timecode_for(frame_number));
        synthesize(&mut rng, &config, &mut input);

        let report = pipeline.submit(input)?;
        if !report.is_clean() {
            failed_frames += 1;
        }

        for event in events.drain() {
            match event {
                FrameEvent::FrameIndexed { timecode, rays, markers, rigid_bodies, .. } => {
                    tracing::debug!(
                        frame = frame_number,
                        timecode = %timecode.unwrap_or_default(),
                        rays,
                        markers,
                        rigid_bodies,
                        "frame indexed"
                    );
                }
                FrameEvent::StageCompleted { chunks, elapsed, .. } => {
                    tracing::debug!(frame = frame_number, chunks, ?elapsed, "stage completed");
                }
                FrameEvent::StageFailed { failures, .. } => {
                    for failure in failures {
                        tracing::warn!(frame = frame_number, %failure, "stage task failed");
                    }
                }
            }
        }

        if frame_number % FRAME_RATE == 0 {
            tracing::info!(
                frame = report.frame_number,
                rays = report.rays,
                reconstructions = report.reconstructions,
                labeled = report.labeled_markers,
                tracked = report.tracked_rigid_bodies,
                chunks = report.chunks,
                elapsed = ?report.elapsed,
                "frame summary"
            );
        }
    }

    let stats = pipeline.dispatch_stats();
    #[allow(clippy::cast_precision_loss)]
    let total_m = pipeline.stage().total_um.load(Ordering::Relaxed) as f64 / 1_000_000.0;
    tracing::info!(
        frames = options.frames,
        failed_frames,
        tasks = stats.dispatched,
        failed_tasks = stats.failed,
        total_ray_length_m = total_m,
        "replay finished"
    );

    pipeline.shutdown();
    Ok(())
}

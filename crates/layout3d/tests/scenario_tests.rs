//! End-to-end scenarios with literal expected values.
//!
//! Each test skips cleanly when no adapter is available.

use glam::Vec3;
use layout3d::{EdgeList, GpuLayout3D, LayoutParams, Particle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn gpu() -> Option<(wgpu::Device, wgpu::Queue)> {
    layout3d::gpu::create_headless_device()
}

/// Positions and velocities keyed by pid.
fn state_by_pid(
    engine: &GpuLayout3D,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Vec<(Vec3, Vec3)> {
    let meta = engine.read_meta(device, queue).unwrap();
    let positions = engine.read_positions(device, queue).unwrap();
    let velocities = engine.read_velocities(device, queue).unwrap();
    let mut out = vec![(Vec3::ZERO, Vec3::ZERO); meta.len()];
    for (slot, m) in meta.iter().enumerate() {
        out[m.pid as usize] = (positions[slot], velocities[slot]);
    }
    out
}

/// Edgeless three-particle graph: a tick must run the whole pipeline
/// without disturbing positions.
#[test]
fn test_sentinel_allocation() {
    let Some((device, queue)) = gpu() else {
        println!("SKIP: No GPU adapter available");
        return;
    };

    let particles = vec![
        Particle::new(Vec3::new(0.0, 0.0, 0.0), 0),
        Particle::new(Vec3::new(1.0, 0.0, 0.0), 1),
        Particle::new(Vec3::new(0.0, 1.0, 0.0), 2),
    ];
    let edges = EdgeList::empty(3);
    let mut engine =
        GpuLayout3D::new(&device, &LayoutParams::default(), &particles, &edges).unwrap();

    engine.tick(&device, &queue);
    assert_eq!(engine.pass_count(), 1);

    let state = state_by_pid(&engine, &device, &queue);
    for p in &particles {
        let (pos, _) = state[p.pid as usize];
        assert!(
            (pos - p.position).length() < 1e-6,
            "pid {} drifted to {:?}",
            p.pid,
            pos
        );
    }
}

/// Two-body repulsion with a single logical spring 0-2, seeded as two
/// directed edges. The window of 1 slot keeps slot 2 out of slot 0's
/// gravity sum.
#[test]
fn test_two_body_repulsion() {
    let Some((device, queue)) = gpu() else {
        println!("SKIP: No GPU adapter available");
        return;
    };

    let particles = vec![
        Particle::new(Vec3::new(0.0, 0.0, 0.0), 0),
        Particle::new(Vec3::new(1.0, 0.0, 0.0), 1),
        Particle::new(Vec3::new(0.0, 1.0, 0.0), 2),
    ];
    let edges = EdgeList::from_pairs(3, &[(0, 2), (2, 0)]);
    let params = LayoutParams {
        dt: 0.1,
        gravity: -1.0,
        spring_k: 1.0,
        damping: 0.002,
        gravity_window: 1,
        ..LayoutParams::default()
    };
    let mut engine = GpuLayout3D::new(&device, &params, &particles, &edges).unwrap();

    engine.tick(&device, &queue);

    let state = state_by_pid(&engine, &device, &queue);
    let (p0, v0) = state[0];
    let (_, v1) = state[1];
    let (_, v2) = state[2];

    let expected_v0 = Vec3::new(-0.0998, 0.0998, 0.0);
    let expected_p0 = Vec3::new(-0.00998, 0.00998, 0.0);
    assert!(
        (v0 - expected_v0).length() < 1e-4,
        "particle 0 velocity {:?}, expected {:?}",
        v0,
        expected_v0
    );
    assert!(
        (p0 - expected_p0).length() < 1e-4,
        "particle 0 position {:?}, expected {:?}",
        p0,
        expected_p0
    );
    assert!(v1.x > 0.0, "particle 1 should be pushed to +x, got {:?}", v1);
    assert!(v2.y < 0.0, "particle 2 should be pulled to -y, got {:?}", v2);
}

/// Sun-Earth in SI units for one year of semi-implicit Euler. The orbit
/// must close to within 0.1% in radius and 0.02 rad in phase.
#[test]
fn test_sun_earth_orbit() {
    let Some((device, queue)) = gpu() else {
        println!("SKIP: No GPU adapter available");
        return;
    };

    const AU: f32 = 1.496e11;
    const YEAR: f32 = 3.15576e7;
    let steps = 60_000usize;

    let particles = vec![
        Particle::new(Vec3::ZERO, 0).with_mass(1.989e30),
        Particle::new(Vec3::new(AU, 0.0, 0.0), 1)
            .with_velocity(Vec3::new(0.0, 29_782.0, 0.0))
            .with_mass(5.972e24),
    ];
    let edges = EdgeList::empty(2);
    let params = LayoutParams {
        dt: YEAR / steps as f32,
        gravity: 6.6743e-11,
        eps: 1000.0,
        damping: 0.0,
        spring_k: 0.0,
        ..LayoutParams::default()
    };
    let mut engine = GpuLayout3D::new(&device, &params, &particles, &edges).unwrap();

    engine.step_n(&device, &queue, steps);

    let state = state_by_pid(&engine, &device, &queue);
    let (earth, _) = state[1];
    let radius = earth.length();
    let angle = earth.y.atan2(earth.x);

    assert!(
        (radius - AU).abs() < 0.001 * AU,
        "orbit radius drifted to {:.4e}",
        radius
    );
    assert!(
        angle.abs() < 0.02,
        "orbit phase off by {} rad after one year",
        angle
    );
}

/// An edgeless store stays empty while positions evolve under the
/// near-field term alone.
#[test]
fn test_empty_edge_store() {
    let Some((device, queue)) = gpu() else {
        println!("SKIP: No GPU adapter available");
        return;
    };

    let mut rng = ChaCha8Rng::seed_from_u64(29);
    let particles: Vec<Particle> = (0..100)
        .map(|i| {
            Particle::new(
                Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                ),
                i,
            )
        })
        .collect();
    let edges = EdgeList::empty(100);
    let mut engine =
        GpuLayout3D::new(&device, &LayoutParams::default(), &particles, &edges).unwrap();

    engine.step_n(&device, &queue, 100);

    let offsets = engine.read_offsets(&device, &queue).unwrap();
    assert!(offsets.iter().all(|&o| o == 0), "offsets must stay zero");
    assert!(engine.read_store(&device, &queue).unwrap().is_empty());

    let state = state_by_pid(&engine, &device, &queue);
    let mut max_displacement = 0.0f32;
    for p in &particles {
        let (pos, _) = state[p.pid as usize];
        assert!(pos.is_finite(), "pid {} went non-finite", p.pid);
        max_displacement = max_displacement.max((pos - p.position).length());
    }
    assert!(
        max_displacement > 1e-6,
        "near-field term should move particles, max displacement {}",
        max_displacement
    );
}

/// A single particle sees no forces; position advances by v * dt * (1 - damping).
#[test]
fn test_single_particle_drifts() {
    let Some((device, queue)) = gpu() else {
        println!("SKIP: No GPU adapter available");
        return;
    };

    let start = Vec3::new(0.5, -0.2, 0.3);
    let velocity = Vec3::new(1.0, 2.0, 3.0);
    let particles = vec![Particle::new(start, 0).with_velocity(velocity)];
    let edges = EdgeList::empty(1);
    let params = LayoutParams::default();
    let expected_vel = velocity * (1.0 - params.damping);
    let expected_pos = start + expected_vel * params.dt;

    let mut engine = GpuLayout3D::new(&device, &params, &particles, &edges).unwrap();
    engine.tick(&device, &queue);

    let state = state_by_pid(&engine, &device, &queue);
    let (pos, vel) = state[0];
    assert!(
        (vel - expected_vel).length() < 1e-6,
        "velocity {:?}, expected {:?}",
        vel,
        expected_vel
    );
    assert!(
        (pos - expected_pos).length() < 1e-6,
        "position {:?}, expected {:?}",
        pos,
        expected_pos
    );
}

/// Identity round-trip over randomized positions and shuffled pids.
#[test]
fn test_identity_round_trip_random_pids() {
    let Some((device, queue)) = gpu() else {
        println!("SKIP: No GPU adapter available");
        return;
    };

    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let n = 1000u32;
    let mut pids: Vec<u32> = (0..n).collect();
    for i in (1..n as usize).rev() {
        let j = rng.gen_range(0..=i);
        pids.swap(i, j);
    }
    let particles: Vec<Particle> = pids
        .iter()
        .map(|&pid| {
            Particle::new(
                Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                ),
                pid,
            )
        })
        .collect();
    let edges = EdgeList::empty(n as usize);
    let mut engine =
        GpuLayout3D::new(&device, &LayoutParams::default(), &particles, &edges).unwrap();

    engine.tick(&device, &queue);

    let meta = engine.read_meta(&device, &queue).unwrap();
    let identity = engine.read_identity(&device, &queue).unwrap();
    for (slot, m) in meta.iter().enumerate() {
        assert_eq!(identity[m.pid as usize], slot as u32);
    }
}

/// The engine rejects malformed seeds instead of uploading them.
#[test]
fn test_construction_rejects_bad_seed() {
    let Some((device, _queue)) = gpu() else {
        println!("SKIP: No GPU adapter available");
        return;
    };

    let particles = vec![
        Particle::new(Vec3::ZERO, 0),
        Particle::new(Vec3::X, 0),
    ];
    let edges = EdgeList::empty(2);
    let result = GpuLayout3D::new(&device, &LayoutParams::default(), &particles, &edges);
    assert!(matches!(
        result,
        Err(layout3d::SeedError::DuplicatePid { pid: 0 })
    ));

    let no_particles: Vec<Particle> = Vec::new();
    let result = GpuLayout3D::new(
        &device,
        &LayoutParams::default(),
        &no_particles,
        &EdgeList::empty(0),
    );
    assert!(matches!(result, Err(layout3d::SeedError::NoParticles)));
}

//! Sun-Earth sanity run in SI units: one simulated year, then a report of
//! how well the orbit closed.
//!
//! Usage: cargo run --release --example orbit

use glam::Vec3;
use layout3d::{EdgeList, GpuLayout3D, LayoutParams, Particle};

const AU: f32 = 1.496e11;
const YEAR: f32 = 3.15576e7;
const STEPS: usize = 60_000;

fn main() {
    env_logger::init();

    let Some((device, queue)) = layout3d::gpu::create_headless_device() else {
        eprintln!("No GPU adapter available");
        return;
    };

    let particles = vec![
        Particle::new(Vec3::ZERO, 0).with_mass(1.989e30),
        Particle::new(Vec3::new(AU, 0.0, 0.0), 1)
            .with_velocity(Vec3::new(0.0, 29_782.0, 0.0))
            .with_mass(5.972e24),
    ];
    let params = LayoutParams {
        dt: YEAR / STEPS as f32,
        gravity: 6.6743e-11,
        eps: 1000.0,
        damping: 0.0,
        spring_k: 0.0,
        ..LayoutParams::default()
    };
    let mut engine = GpuLayout3D::new(&device, &params, &particles, &EdgeList::empty(2))
        .expect("seed rejected");

    println!("Integrating one year in {} steps of {:.1} s", STEPS, params.dt);
    engine.step_n(&device, &queue, STEPS);

    let meta = engine.read_meta(&device, &queue).expect("readback failed");
    let positions = engine.read_positions(&device, &queue).expect("readback failed");
    let earth_slot = meta.iter().position(|m| m.pid == 1).unwrap();
    let earth = positions[earth_slot];

    let radius = earth.length();
    let angle = earth.y.atan2(earth.x);
    println!("Earth after one year: {:?}", earth);
    println!(
        "radius {:.4e} m ({:+.4}% of 1 AU), phase {:+.4} rad",
        radius,
        (radius - AU) / AU * 100.0,
        angle
    );
}

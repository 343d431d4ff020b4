//! Headless relaxation of a random graph with timing stats.
//!
//! Usage: cargo run --release --example relaxation

use layout3d::{graph, GpuLayout3D, LayoutParams};
use std::time::Instant;

const PARTICLES: usize = 20_000;
const EDGES_PER_NODE: usize = 3;
const TICKS: usize = 200;

fn main() {
    env_logger::init();

    let Some((device, queue)) = layout3d::gpu::create_headless_device() else {
        eprintln!("No GPU adapter available");
        return;
    };

    let (particles, edges) = graph::random_graph(PARTICLES, EDGES_PER_NODE, 42);
    println!(
        "Relaxing {} particles, {} directed edges for {} ticks",
        particles.len(),
        edges.edge_count(),
        TICKS
    );

    let params = LayoutParams {
        boundary_strength: 5e-6,
        ..LayoutParams::default()
    };
    let mut engine =
        GpuLayout3D::new(&device, &params, &particles, &edges).expect("seed rejected");

    let start = Instant::now();
    engine.step_n(&device, &queue, TICKS);
    let positions = engine.read_positions(&device, &queue).expect("readback failed");
    let elapsed = start.elapsed();

    let mut mean_radius = 0.0f64;
    let mut max_radius = 0.0f32;
    let mut displacement = 0.0f64;
    for (seeded, now) in particles.iter().zip(&positions) {
        let r = now.length();
        mean_radius += r as f64;
        max_radius = max_radius.max(r);
        displacement += (*now - seeded.position).length() as f64;
    }
    mean_radius /= positions.len() as f64;
    displacement /= positions.len() as f64;

    println!("{} ticks in {:.2?} ({:.1} ticks/s)", TICKS, elapsed, TICKS as f64 / elapsed.as_secs_f64());
    println!("mean radius {:.3}, max radius {:.3}", mean_radius, max_radius);
    println!("mean displacement from seed {:.3}", displacement);

    let offsets = engine.read_offsets(&device, &queue).expect("readback failed");
    println!(
        "CSR intact: offsets[0] = {}, offsets[N] = {} (expected {})",
        offsets[0],
        offsets[offsets.len() - 1],
        edges.edge_count()
    );
}

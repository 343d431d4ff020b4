//! GPU force-directed 3D graph layout.
//!
//! Computes an iterative force-directed layout for a large sparse graph
//! whose vertices are particles with persistent identity and whose edges
//! live in a compressed-sparse-row store over particle slots. Every tick
//! runs entirely on the GPU as a sequence of compute kernels: integrate
//! motion under near-field gravity plus edge springs, re-sort particles
//! along a space-filling curve for spatial locality, then rebuild the CSR
//! offsets and relocate the edge store to follow the sorted owners.
//!
//! # Example
//!
//! ```no_run
//! use layout3d::{gpu, GpuLayout3D, LayoutParams};
//!
//! let (device, queue) = gpu::create_headless_device().expect("no GPU adapter");
//!
//! let (particles, edges) = layout3d::graph::random_graph(10_000, 3, 42);
//! let mut engine =
//!     GpuLayout3D::new(&device, &LayoutParams::default(), &particles, &edges).unwrap();
//!
//! for _ in 0..200 {
//!     engine.tick(&device, &queue);
//! }
//!
//! let positions = engine.read_positions(&device, &queue).unwrap();
//! println!("first particle at {:?}", positions[0]);
//! ```

pub mod gpu;
pub mod graph;
pub mod params;
pub mod sfc;

pub use glam::Vec3;
pub use gpu::layout_3d::GpuLayout3D;
pub use graph::{EdgeList, Particle, ParticleMeta, SeedError, EMPTY_EDGE};
pub use params::{LayoutParams, SORT_SPAN};

//! CPU-side seed model: particles, the CSR edge list, and validation.
//!
//! The engine takes ownership of nothing here; these types describe the
//! initial state that gets packed into GPU buffers at construction. Edges
//! are directed CSR adjacencies over *physical slots*; an undirected spring
//! is seeded as two directed edges.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Sentinel edge-store entry meaning "no edge". The float-texture original
/// used `-1.0`; on the integer side that is `u32::MAX`.
pub const EMPTY_EDGE: u32 = u32::MAX;

/// A seed particle. The pid is its persistent identity: slots change every
/// tick, pids never do.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    pub pid: u32,
    pub tint: u32,
}

impl Particle {
    /// Create a unit-mass particle at rest.
    pub fn new(position: Vec3, pid: u32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            mass: 1.0,
            pid,
            tint: 0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_tint(mut self, tint: u32) -> Self {
        self.tint = tint;
        self
    }
}

/// Packed per-particle record as it lives on the GPU.
///
/// `edge_ptr` mirrors this slot's start offset in the edge store and is
/// refreshed by the CSR rebuild every tick.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleMeta {
    pub pid: u32,
    pub mass: f32,
    pub tint: u32,
    pub edge_ptr: u32,
}

/// Compressed-sparse-row edge store.
///
/// Slot `p` owns `store[offsets[p]..offsets[p + 1]]`; `offsets` has one
/// trailing sentinel entry equal to the total edge count.
#[derive(Debug, Clone, Default)]
pub struct EdgeList {
    pub offsets: Vec<u32>,
    pub store: Vec<u32>,
}

impl EdgeList {
    /// An edge list with no edges for `n` particles.
    pub fn empty(n: usize) -> Self {
        Self {
            offsets: vec![0; n + 1],
            store: Vec::new(),
        }
    }

    /// Build CSR from directed `(owner_slot, target_slot)` pairs.
    pub fn from_pairs(n: usize, pairs: &[(u32, u32)]) -> Self {
        let mut counts = vec![0u32; n];
        for &(owner, _) in pairs {
            counts[owner as usize] += 1;
        }
        let mut offsets = vec![0u32; n + 1];
        for i in 0..n {
            offsets[i + 1] = offsets[i] + counts[i];
        }
        let mut cursor = offsets[..n].to_vec();
        let mut store = vec![EMPTY_EDGE; pairs.len()];
        for &(owner, target) in pairs {
            let slot = &mut cursor[owner as usize];
            store[*slot as usize] = target;
            *slot += 1;
        }
        Self { offsets, store }
    }

    pub fn edge_count(&self) -> usize {
        self.store.len()
    }

    /// Check the CSR invariants against a particle count.
    pub fn validate(&self, particle_count: usize) -> Result<(), SeedError> {
        if self.offsets.len() != particle_count + 1 {
            return Err(SeedError::OffsetCountMismatch {
                expected: particle_count + 1,
                got: self.offsets.len(),
            });
        }
        if self.offsets[0] != 0 {
            return Err(SeedError::NonMonotonicOffsets { index: 0 });
        }
        for i in 0..particle_count {
            if self.offsets[i + 1] < self.offsets[i] {
                return Err(SeedError::NonMonotonicOffsets { index: i + 1 });
            }
        }
        if self.offsets[particle_count] as usize != self.store.len() {
            return Err(SeedError::EdgeTotalMismatch {
                declared: self.offsets[particle_count],
                actual: self.store.len(),
            });
        }
        for (edge, &target) in self.store.iter().enumerate() {
            if target != EMPTY_EDGE && target as usize >= particle_count {
                return Err(SeedError::TargetOutOfRange { edge, target });
            }
        }
        Ok(())
    }
}

/// Seed validation failure, reported at engine construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    NoParticles,
    OffsetCountMismatch { expected: usize, got: usize },
    NonMonotonicOffsets { index: usize },
    EdgeTotalMismatch { declared: u32, actual: usize },
    TargetOutOfRange { edge: usize, target: u32 },
    PidOutOfRange { pid: u32 },
    DuplicatePid { pid: u32 },
    InvalidStride,
}

impl std::fmt::Display for SeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedError::NoParticles => write!(f, "at least one particle is required"),
            SeedError::OffsetCountMismatch { expected, got } => {
                write!(f, "offset array must have {} entries, got {}", expected, got)
            }
            SeedError::NonMonotonicOffsets { index } => {
                write!(f, "offsets decrease at index {}", index)
            }
            SeedError::EdgeTotalMismatch { declared, actual } => {
                write!(f, "offsets declare {} edges but the store holds {}", declared, actual)
            }
            SeedError::TargetOutOfRange { edge, target } => {
                write!(f, "edge {} targets out-of-range slot {}", edge, target)
            }
            SeedError::PidOutOfRange { pid } => {
                write!(f, "pid {} exceeds the particle count", pid)
            }
            SeedError::DuplicatePid { pid } => write!(f, "pid {} is not unique", pid),
            SeedError::InvalidStride => {
                write!(f, "coarse-map stride must be between 1 and 256")
            }
        }
    }
}

impl std::error::Error for SeedError {}

/// Validate particles + edges together: CSR invariants plus pid density
/// (pids must be unique and below N so the identity map can index by pid).
pub fn validate_seed(particles: &[Particle], edges: &EdgeList) -> Result<(), SeedError> {
    if particles.is_empty() {
        return Err(SeedError::NoParticles);
    }
    edges.validate(particles.len())?;
    let mut seen = vec![false; particles.len()];
    for particle in particles {
        let pid = particle.pid;
        if pid as usize >= particles.len() {
            return Err(SeedError::PidOutOfRange { pid });
        }
        if seen[pid as usize] {
            return Err(SeedError::DuplicatePid { pid });
        }
        seen[pid as usize] = true;
    }
    Ok(())
}

/// Particles on a jittered shell with each slot linked to its `neighbors`
/// successors (both directions), the classic smoke-test topology.
pub fn ring_lattice(n: usize, neighbors: usize, seed: u64) -> (Vec<Particle>, EdgeList) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let particles = (0..n)
        .map(|i| {
            let theta = (i as f32 / n as f32) * std::f32::consts::TAU;
            let jitter = Vec3::new(
                rng.gen_range(-0.05..0.05),
                rng.gen_range(-0.05..0.05),
                rng.gen_range(-0.05..0.05),
            );
            let pos = Vec3::new(theta.cos(), theta.sin(), 0.0) + jitter;
            Particle::new(pos, i as u32)
        })
        .collect();

    let mut pairs = Vec::with_capacity(n * neighbors * 2);
    for i in 0..n {
        for k in 1..=neighbors {
            let j = (i + k) % n;
            if i == j {
                continue;
            }
            pairs.push((i as u32, j as u32));
            pairs.push((j as u32, i as u32));
        }
    }
    (particles, EdgeList::from_pairs(n, &pairs))
}

/// Random positions in the unit cube with `edges_per_node` random
/// undirected links per particle.
pub fn random_graph(n: usize, edges_per_node: usize, seed: u64) -> (Vec<Particle>, EdgeList) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let particles = (0..n)
        .map(|i| {
            let pos = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            Particle::new(pos, i as u32)
        })
        .collect();

    let mut pairs = Vec::with_capacity(n * edges_per_node * 2);
    for i in 0..n {
        for _ in 0..edges_per_node {
            let j = rng.gen_range(0..n);
            if i == j {
                continue;
            }
            pairs.push((i as u32, j as u32));
            pairs.push((j as u32, i as u32));
        }
    }
    (particles, EdgeList::from_pairs(n, &pairs))
}

//! GPU buffer set shared by every kernel.
//!
//! Particle arrays keep fixed roles: the integrator writes the scratch
//! copy, the reshuffle gathers it back into the current copy. Offsets and
//! store ping-pong instead: on a tick with parity `q`, index `q` is the
//! live ("old") side and `q ^ 1` receives the rebuilt layout. Kernels
//! prebuild one bind group per parity so the swap is a host-side index
//! flip.

use std::sync::Arc;

/// Index of the live particle arrays.
pub(crate) const CURRENT: usize = 0;
/// Index of the integrator's output arrays.
pub(crate) const SCRATCH: usize = 1;

pub(crate) struct LayoutBuffers {
    /// xyz position + SFC key in w.
    pub positions: [Arc<wgpu::Buffer>; 2],
    /// xyz velocity, w unused.
    pub velocities: [Arc<wgpu::Buffer>; 2],
    /// Packed pid/mass/tint/edge_ptr records.
    pub meta: [Arc<wgpu::Buffer>; 2],
    /// CSR start offsets, N + 1 entries; ping-pong by tick parity.
    pub offsets: [Arc<wgpu::Buffer>; 2],
    /// CSR edge targets; ping-pong by tick parity.
    pub store: [Arc<wgpu::Buffer>; 2],
    /// Per-span sort permutation, one u32 per slot in the sorted region.
    pub atlas: Arc<wgpu::Buffer>,
    /// PID -> current physical slot.
    pub identity: Arc<wgpu::Buffer>,
    /// Edge-index -> owner acceleration lookup.
    pub coarse: Arc<wgpu::Buffer>,
    /// Hillis-Steele scan ping-pong pair.
    pub scan: [Arc<wgpu::Buffer>; 2],
}

//! GPU uniform structs, one per kernel.
//!
//! These `#[repr(C)]` structs are uploaded to uniform buffers; layouts must
//! match the WGSL structs field for field and pad to 16-byte multiples.

use bytemuck::{Pod, Zeroable};

/// Physics integrator parameters.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct IntegrateParams {
    pub particle_count: u32,
    pub gravity_window: u32,
    pub dt: f32,
    pub gravity: f32,
    pub spring_k: f32,
    pub eps: f32,
    pub damping: f32,
    pub boundary_strength: f32,
    pub sfc_level0: u32,
    pub sfc_level1: u32,
    pub _pad0: u32,
    pub _pad1: u32,
}

/// Shared shape for every kernel that decodes the sort atlas: the sort
/// encoder, the reshuffle gather and the CSR seed/finalize passes.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct SpanParams {
    pub particle_count: u32,
    pub sort_offset: u32,
    pub span_count: u32,
    pub _pad0: u32,
}

/// One Hillis-Steele scan pass.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct ScanStepParams {
    pub element_count: u32,
    pub step: u32,
    pub _pad0: u32,
    pub _pad1: u32,
}

/// Identity mirror parameters.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct IdentityParams {
    pub particle_count: u32,
    pub _pad0: u32,
    pub _pad1: u32,
    pub _pad2: u32,
}

/// Coarse-map build parameters.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct CoarseMapParams {
    pub coarse_count: u32,
    pub stride: u32,
    pub particle_count: u32,
    pub search_steps: u32,
}

/// Edge relocation parameters.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct RelocateParams {
    pub edge_count: u32,
    pub stride: u32,
    pub sort_offset: u32,
    pub span_count: u32,
    pub particle_count: u32,
    pub _pad0: u32,
    pub _pad1: u32,
    pub _pad2: u32,
}

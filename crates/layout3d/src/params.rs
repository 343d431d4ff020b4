//! Engine parameters.

/// Particle slots sorted together in one bitonic pass. The rolling offset
/// alternates between 0 and half a span each tick so particles mix across
/// span seams.
pub const SORT_SPAN: u32 = 128;

/// Tunable simulation parameters.
///
/// All of these feed per-tick uniforms and may be changed between ticks
/// through [`crate::GpuLayout3D::set_params`], except `coarse_stride`,
/// which sizes a buffer and is captured at construction.
#[derive(Debug, Clone)]
pub struct LayoutParams {
    /// Integration step in seconds. A zero step reshuffles and relocates
    /// without touching positions or velocities.
    pub dt: f32,
    /// Near-field gravitational constant; negative repels.
    pub gravity: f32,
    /// Spring constant applied along CSR edges.
    pub spring_k: f32,
    /// Floor on the squared pair distance, clamping the gravity
    /// singularity.
    pub eps: f32,
    /// Velocity damping factor per tick.
    pub damping: f32,
    /// Half-width of the slot window scanned for near-field gravity.
    pub gravity_window: u32,
    /// Cells per axis of the coarse SFC level; rounded up to a power of
    /// two. The second level refines by another factor of resolution/2.
    pub sfc_resolution: f32,
    /// Edge spacing of the coarse edge-owner map, in 1..=256.
    pub coarse_stride: u32,
    /// Strength of the optional restraint pulling particles back toward
    /// the unit-sphere region; 0 disables it.
    pub boundary_strength: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            dt: 0.016,
            gravity: -0.0001,
            spring_k: 1.0,
            eps: 0.1,
            damping: 0.002,
            gravity_window: 16,
            sfc_resolution: 64.0,
            coarse_stride: 128,
            boundary_strength: 0.0,
        }
    }
}

//! GPU force-directed 3D layout engine.
//!
//! `GpuLayout3D` owns every buffer and kernel of the per-tick pipeline:
//!
//! 1. Integrate: gravity window + edge springs, writes scratch state with
//!    fresh SFC keys
//! 2. Span sort: chunked bitonic sort of the keys into the atlas
//! 3. Reshuffle: gather scratch back into current through the atlas
//! 4. Identity mirror: rebuild the PID -> slot inverse map
//! 5. CSR scan: recompute edge start offsets for the sorted order
//! 6. Coarse map: edge-index -> owner lookup over the new offsets
//! 7. Relocate: rewrite the edge store against the new slots
//!
//! All seven kernels are issued in one queue submission per tick; the
//! offsets/store ping-pong swap is a parity flip gated by the explicit pass
//! counter.

pub(crate) mod buffers;
mod readback;

use crate::graph::{validate_seed, EdgeList, Particle, ParticleMeta, SeedError, EMPTY_EDGE};
use crate::params::{LayoutParams, SORT_SPAN};
use crate::sfc;
use buffers::LayoutBuffers;
use std::sync::Arc;
use wgpu::util::DeviceExt;

use super::coarse_map::GpuCoarseMap;
use super::csr_scan::{scan_pass_count, GpuCsrScan};
use super::edge_relocate::GpuEdgeRelocate;
use super::identity_map::GpuIdentityMap;
use super::integrate_3d::GpuIntegrate3D;
use super::reshuffle::GpuReshuffle;
use super::span_sort::GpuSpanSort;

/// Number of spans covering `[offset, n)`.
fn spans_for(n: u32, offset: u32) -> u32 {
    if n > offset {
        (n - offset).div_ceil(SORT_SPAN)
    } else {
        0
    }
}

/// GPU-resident layout engine with fixed particle and edge counts.
pub struct GpuLayout3D {
    particle_count: u32,
    edge_count: u32,
    coarse_stride: u32,
    params: LayoutParams,
    /// Ticks issued so far; its parity selects the rolling sort offset and
    /// the live offsets/store side.
    pass: u32,
    /// Span counts per sort-offset parity.
    span_counts: [u32; 2],
    buffers: LayoutBuffers,
    integrate: GpuIntegrate3D,
    span_sort: GpuSpanSort,
    reshuffle: GpuReshuffle,
    identity: GpuIdentityMap,
    csr_scan: GpuCsrScan,
    coarse_map: GpuCoarseMap,
    relocate: GpuEdgeRelocate,
}

impl GpuLayout3D {
    /// Validate the seed, upload it and build the full pipeline.
    pub fn new(
        device: &wgpu::Device,
        params: &LayoutParams,
        particles: &[Particle],
        edges: &EdgeList,
    ) -> Result<Self, SeedError> {
        validate_seed(particles, edges)?;
        // The relocation walk is bounded by 256 steps, so the stride must
        // not put an edge farther than that from its coarse guess.
        if params.coarse_stride == 0 || params.coarse_stride > 256 {
            return Err(SeedError::InvalidStride);
        }

        let particle_count = particles.len() as u32;
        let edge_count = edges.edge_count() as u32;
        let span_counts = [
            spans_for(particle_count, 0),
            spans_for(particle_count, SORT_SPAN / 2),
        ];
        let coarse_count = edge_count.div_ceil(params.coarse_stride).max(1);

        let positions: Vec<[f32; 4]> = particles
            .iter()
            .map(|p| {
                let key = sfc::sfc_key(p.position, params.sfc_resolution);
                [p.position.x, p.position.y, p.position.z, key]
            })
            .collect();
        let velocities: Vec<[f32; 4]> = particles
            .iter()
            .map(|p| [p.velocity.x, p.velocity.y, p.velocity.z, 0.0])
            .collect();
        let meta: Vec<ParticleMeta> = particles
            .iter()
            .enumerate()
            .map(|(slot, p)| ParticleMeta {
                pid: p.pid,
                mass: p.mass,
                tint: p.tint,
                edge_ptr: edges.offsets[slot],
            })
            .collect();
        let mut identity = vec![EMPTY_EDGE; particle_count as usize];
        for (slot, p) in particles.iter().enumerate() {
            identity[p.pid as usize] = slot as u32;
        }
        // Storage bindings reject zero-size buffers; pad the edge store.
        let mut store = edges.store.clone();
        if store.is_empty() {
            store.push(EMPTY_EDGE);
        }

        let storage = wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_DST
            | wgpu::BufferUsages::COPY_SRC;
        let init_buffer = |label: &str, contents: &[u8]| {
            Arc::new(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: storage,
            }))
        };

        let atlas_len = (span_counts[0].max(span_counts[1]) * SORT_SPAN).max(SORT_SPAN);
        let buffers = LayoutBuffers {
            positions: [
                init_buffer("Positions", bytemuck::cast_slice(&positions)),
                init_buffer("Positions Scratch", bytemuck::cast_slice(&positions)),
            ],
            velocities: [
                init_buffer("Velocities", bytemuck::cast_slice(&velocities)),
                init_buffer("Velocities Scratch", bytemuck::cast_slice(&velocities)),
            ],
            meta: [
                init_buffer("Meta", bytemuck::cast_slice(&meta)),
                init_buffer("Meta Scratch", bytemuck::cast_slice(&meta)),
            ],
            offsets: [
                init_buffer("Edge Offsets A", bytemuck::cast_slice(&edges.offsets)),
                init_buffer("Edge Offsets B", bytemuck::cast_slice(&edges.offsets)),
            ],
            store: [
                init_buffer("Edge Store A", bytemuck::cast_slice(&store)),
                init_buffer("Edge Store B", bytemuck::cast_slice(&store)),
            ],
            atlas: init_buffer(
                "Sort Atlas",
                &vec![0u8; (atlas_len as usize) * std::mem::size_of::<u32>()],
            ),
            identity: init_buffer("Identity Map", bytemuck::cast_slice(&identity)),
            coarse: init_buffer(
                "Coarse Map",
                &vec![0u8; (coarse_count as usize) * std::mem::size_of::<u32>()],
            ),
            scan: [
                init_buffer(
                    "Scan A",
                    &vec![0u8; (particle_count as usize) * std::mem::size_of::<u32>()],
                ),
                init_buffer(
                    "Scan B",
                    &vec![0u8; (particle_count as usize) * std::mem::size_of::<u32>()],
                ),
            ],
        };

        let integrate = GpuIntegrate3D::new(device, &buffers);
        let span_sort = GpuSpanSort::new(device, &buffers);
        let reshuffle = GpuReshuffle::new(device, &buffers);
        let identity = GpuIdentityMap::new(device, &buffers, particle_count);
        let csr_scan = GpuCsrScan::new(device, &buffers, particle_count);
        let coarse_map = GpuCoarseMap::new(
            device,
            &buffers,
            particle_count,
            coarse_count,
            params.coarse_stride,
        );
        let relocate = GpuEdgeRelocate::new(device, &buffers);

        log::info!(
            "layout3d engine: {} particles, {} edges, {} spans, {} scan passes",
            particle_count,
            edge_count,
            span_counts[0],
            scan_pass_count(particle_count),
        );

        Ok(Self {
            particle_count,
            edge_count,
            coarse_stride: params.coarse_stride,
            params: params.clone(),
            pass: 0,
            span_counts,
            buffers,
            integrate,
            span_sort,
            reshuffle,
            identity,
            csr_scan,
            coarse_map,
            relocate,
        })
    }

    /// Run one simulation tick: all seven kernels in submission order, then
    /// flip the offsets/store parity.
    pub fn tick(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let parity = (self.pass % 2) as usize;
        let sort_offset = (self.pass % 2) * (SORT_SPAN / 2);
        let spans = self.span_counts[parity];
        let n = self.particle_count;

        self.integrate.prepare(queue, &self.params, n);
        self.span_sort.prepare(queue, n, sort_offset, spans);
        self.reshuffle.prepare(queue, n, sort_offset, spans);
        self.csr_scan.prepare(queue, n, sort_offset, spans);
        if self.edge_count > 0 {
            self.relocate.prepare(
                queue,
                self.edge_count,
                self.coarse_stride,
                sort_offset,
                spans,
                n,
            );
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Layout Tick Encoder"),
        });
        self.integrate.encode(&mut encoder, parity, n);
        self.span_sort.encode(&mut encoder, spans);
        self.reshuffle.encode(&mut encoder, n);
        self.identity.encode(&mut encoder, n);
        self.csr_scan.encode(&mut encoder, parity, n);
        if self.edge_count > 0 {
            self.coarse_map.encode(&mut encoder, parity);
            self.relocate.encode(&mut encoder, parity, self.edge_count);
        }
        queue.submit(std::iter::once(encoder.finish()));

        self.pass += 1;
    }

    /// Run `n` ticks back to back.
    pub fn step_n(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, n: usize) {
        for _ in 0..n {
            self.tick(device, queue);
        }
    }

    /// Ticks issued since construction.
    pub fn pass_count(&self) -> u32 {
        self.pass
    }

    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    pub fn edge_count(&self) -> u32 {
        self.edge_count
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    /// GPU handle to the current positions (xyz + SFC key per particle),
    /// e.g. for a renderer sharing the device.
    pub fn position_buffer(&self) -> &Arc<wgpu::Buffer> {
        &self.buffers.positions[buffers::CURRENT]
    }

    /// GPU handle to the current velocities.
    pub fn velocity_buffer(&self) -> &Arc<wgpu::Buffer> {
        &self.buffers.velocities[buffers::CURRENT]
    }

    /// Replace the simulation parameters for subsequent ticks.
    ///
    /// `coarse_stride` sizes a buffer and stays as constructed.
    pub fn set_params(&mut self, params: LayoutParams) {
        self.params = LayoutParams {
            coarse_stride: self.coarse_stride,
            ..params
        };
    }

    /// Index of the live offsets/store side for the next tick.
    pub(crate) fn live_side(&self) -> usize {
        (self.pass % 2) as usize
    }
}

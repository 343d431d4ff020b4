//! CSR prefix-sum rebuild.
//!
//! Three sub-stages share one shader module and bind group layout: seed the
//! per-slot edge counts through the atlas, run `ceil(log2 N)` Hillis-Steele
//! scan passes over the ping-pong scan pair, then finalize exclusive
//! offsets into the inactive offsets buffer. Per-pass step uniforms and all
//! bind groups are created once at construction; nothing allocates per
//! tick.

use super::layout_3d::buffers::{LayoutBuffers, CURRENT};
use super::params::{ScanStepParams, SpanParams};
use super::pipeline_builder::PipelineBuilder;
use super::workgroups_for;
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// Smallest p with 2^p >= n.
pub(crate) fn scan_pass_count(n: u32) -> u32 {
    let mut passes = 0u32;
    while (1u64 << passes) < n as u64 {
        passes += 1;
    }
    passes
}

pub(crate) struct GpuCsrScan {
    seed_pipeline: wgpu::ComputePipeline,
    scan_pipeline: wgpu::ComputePipeline,
    finalize_pipeline: wgpu::ComputePipeline,
    span_params_buffer: wgpu::Buffer,
    /// By tick parity: which offsets buffer is the live input.
    seed_groups: [wgpu::BindGroup; 2],
    /// One group per scan pass, alternating the scan pair.
    scan_groups: Vec<wgpu::BindGroup>,
    finalize_groups: [wgpu::BindGroup; 2],
    _step_buffers: Vec<wgpu::Buffer>,
}

impl GpuCsrScan {
    pub fn new(device: &wgpu::Device, buffers: &LayoutBuffers, particle_count: u32) -> Self {
        let (pipelines, layout) = PipelineBuilder::new(device)
            .shader_source(include_str!("shaders/csr_scan.wgsl"))
            .label("csr_scan")
            .uniform_buffer()
            .uniform_buffer()
            .storage_buffers(&[true, true, true])
            .storage_buffers(&[false, false, false])
            .build_multi(&["seed_counts", "scan_step", "finalize_offsets"]);
        let mut pipelines = pipelines.into_iter();
        let seed_pipeline = pipelines.next().unwrap();
        let scan_pipeline = pipelines.next().unwrap();
        let finalize_pipeline = pipelines.next().unwrap();

        let span_params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("CSR Span Params"),
            size: std::mem::size_of::<SpanParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let passes = scan_pass_count(particle_count);
        // Entry 0 doubles as the dummy step binding for seed and finalize.
        let step_buffers: Vec<wgpu::Buffer> = (0..passes.max(1))
            .map(|pass| {
                let params = ScanStepParams {
                    element_count: particle_count,
                    step: 1 << pass,
                    _pad0: 0,
                    _pad1: 0,
                };
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Scan Step Params"),
                    contents: bytemuck::bytes_of(&params),
                    usage: wgpu::BufferUsages::UNIFORM,
                })
            })
            .collect();

        // Every group binds the full layout; unused slots get a buffer that
        // cannot alias the slots the entry point touches.
        let make_group = |label: &str,
                          step: &wgpu::Buffer,
                          offsets_old: &Arc<wgpu::Buffer>,
                          scan_in: &Arc<wgpu::Buffer>,
                          scan_out: &Arc<wgpu::Buffer>,
                          offsets_new: &Arc<wgpu::Buffer>| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: span_params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: step.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffers.atlas.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: offsets_old.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: scan_in.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 5,
                        resource: scan_out.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 6,
                        resource: offsets_new.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 7,
                        resource: buffers.meta[CURRENT].as_entire_binding(),
                    },
                ],
            })
        };

        // Seed writes scan[0].
        let seed_groups = [0usize, 1].map(|parity| {
            make_group(
                "CSR Seed Bind Group",
                &step_buffers[0],
                &buffers.offsets[parity],
                &buffers.scan[1],
                &buffers.scan[0],
                &buffers.offsets[parity ^ 1],
            )
        });

        // Pass p reads scan[p % 2] and writes the other buffer.
        let scan_groups = (0..passes as usize)
            .map(|pass| {
                make_group(
                    "CSR Scan Bind Group",
                    &step_buffers[pass],
                    &buffers.offsets[0],
                    &buffers.scan[pass % 2],
                    &buffers.scan[(pass + 1) % 2],
                    &buffers.offsets[1],
                )
            })
            .collect();

        // The inclusive result lands in scan[passes % 2].
        let final_scan = (passes % 2) as usize;
        let finalize_groups = [0usize, 1].map(|parity| {
            make_group(
                "CSR Finalize Bind Group",
                &step_buffers[0],
                &buffers.offsets[parity],
                &buffers.scan[final_scan],
                &buffers.scan[final_scan ^ 1],
                &buffers.offsets[parity ^ 1],
            )
        });

        Self {
            seed_pipeline,
            scan_pipeline,
            finalize_pipeline,
            span_params_buffer,
            seed_groups,
            scan_groups,
            finalize_groups,
            _step_buffers: step_buffers,
        }
    }

    pub fn prepare(
        &self,
        queue: &wgpu::Queue,
        particle_count: u32,
        sort_offset: u32,
        span_count: u32,
    ) {
        let params = SpanParams {
            particle_count,
            sort_offset,
            span_count,
            _pad0: 0,
        };
        queue.write_buffer(&self.span_params_buffer, 0, bytemuck::bytes_of(&params));
    }

    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        parity: usize,
        particle_count: u32,
    ) {
        let workgroups = workgroups_for(particle_count);
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("CSR Seed Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.seed_pipeline);
            pass.set_bind_group(0, &self.seed_groups[parity], &[]);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }
        for group in &self.scan_groups {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("CSR Scan Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.scan_pipeline);
            pass.set_bind_group(0, group, &[]);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("CSR Finalize Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.finalize_pipeline);
            pass.set_bind_group(0, &self.finalize_groups[parity], &[]);
            pass.dispatch_workgroups(workgroups_for(particle_count + 1), 1, 1);
        }
    }
}

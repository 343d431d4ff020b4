//! Physics integrator kernel.
//!
//! One dispatch per tick reads the current particle arrays plus the live
//! CSR side and writes the scratch arrays with refreshed SFC keys.

use super::layout_3d::buffers::{LayoutBuffers, CURRENT, SCRATCH};
use super::params::IntegrateParams;
use super::pipeline_builder::PipelineBuilder;
use super::workgroups_for;
use crate::params::LayoutParams;
use crate::sfc;

pub(crate) struct GpuIntegrate3D {
    pipeline: wgpu::ComputePipeline,
    params_buffer: wgpu::Buffer,
    /// One bind group per tick parity (live offsets/store side).
    bind_groups: [wgpu::BindGroup; 2],
}

impl GpuIntegrate3D {
    pub fn new(device: &wgpu::Device, buffers: &LayoutBuffers) -> Self {
        let (pipeline, layout) = PipelineBuilder::new(device)
            .shader_source(include_str!("shaders/integrate_3d.wgsl"))
            .label("integrate_3d")
            .entry_point("integrate")
            .uniform_buffer()
            .storage_buffers(&[true, true, true, true, true])
            .storage_buffers(&[false, false, false])
            .build();

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Integrate Params"),
            size: std::mem::size_of::<IntegrateParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_groups = [0usize, 1].map(|parity| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Integrate Bind Group"),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffers.positions[CURRENT].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffers.velocities[CURRENT].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: buffers.meta[CURRENT].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: buffers.offsets[parity].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 5,
                        resource: buffers.store[parity].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 6,
                        resource: buffers.positions[SCRATCH].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 7,
                        resource: buffers.velocities[SCRATCH].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 8,
                        resource: buffers.meta[SCRATCH].as_entire_binding(),
                    },
                ],
            })
        });

        Self {
            pipeline,
            params_buffer,
            bind_groups,
        }
    }

    pub fn prepare(&self, queue: &wgpu::Queue, params: &LayoutParams, particle_count: u32) {
        let (sfc_level0, sfc_level1) = sfc::sfc_levels(params.sfc_resolution);
        let uniforms = IntegrateParams {
            particle_count,
            gravity_window: params.gravity_window,
            dt: params.dt,
            gravity: params.gravity,
            spring_k: params.spring_k,
            eps: params.eps,
            damping: params.damping,
            boundary_strength: params.boundary_strength,
            sfc_level0,
            sfc_level1,
            _pad0: 0,
            _pad1: 0,
        };
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        parity: usize,
        particle_count: u32,
    ) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Integrate Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[parity], &[]);
        pass.dispatch_workgroups(workgroups_for(particle_count), 1, 1);
    }
}

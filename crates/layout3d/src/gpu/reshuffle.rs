//! Particle reshuffle kernel: atlas-directed gather of all three particle
//! arrays from scratch back into current.

use super::layout_3d::buffers::{LayoutBuffers, CURRENT, SCRATCH};
use super::params::SpanParams;
use super::pipeline_builder::PipelineBuilder;
use super::workgroups_for;

pub(crate) struct GpuReshuffle {
    pipeline: wgpu::ComputePipeline,
    params_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuReshuffle {
    pub fn new(device: &wgpu::Device, buffers: &LayoutBuffers) -> Self {
        let (pipeline, layout) = PipelineBuilder::new(device)
            .shader_source(include_str!("shaders/reshuffle.wgsl"))
            .label("reshuffle")
            .entry_point("reshuffle")
            .uniform_buffer()
            .storage_buffers(&[true, true, true, true])
            .storage_buffers(&[false, false, false])
            .build();

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Reshuffle Params"),
            size: std::mem::size_of::<SpanParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Reshuffle Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.atlas.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffers.positions[SCRATCH].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: buffers.velocities[SCRATCH].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: buffers.meta[SCRATCH].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: buffers.positions[CURRENT].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: buffers.velocities[CURRENT].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: buffers.meta[CURRENT].as_entire_binding(),
                },
            ],
        });

        Self {
            pipeline,
            params_buffer,
            bind_group,
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
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));
    }

    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, particle_count: u32) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Reshuffle Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.dispatch_workgroups(workgroups_for(particle_count), 1, 1);
    }
}

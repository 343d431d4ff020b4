//! Edge relocation kernel: rewrites the store into the sorted layout.

use super::layout_3d::buffers::{LayoutBuffers, SCRATCH};
use super::params::RelocateParams;
use super::pipeline_builder::PipelineBuilder;
use super::workgroups_for;

pub(crate) struct GpuEdgeRelocate {
    pipeline: wgpu::ComputePipeline,
    params_buffer: wgpu::Buffer,
    /// By tick parity: live store/offsets side in, rebuilt side out.
    bind_groups: [wgpu::BindGroup; 2],
}

impl GpuEdgeRelocate {
    pub fn new(device: &wgpu::Device, buffers: &LayoutBuffers) -> Self {
        let (pipeline, layout) = PipelineBuilder::new(device)
            .shader_source(include_str!("shaders/edge_relocate.wgsl"))
            .label("edge_relocate")
            .entry_point("relocate_edges")
            .uniform_buffer()
            .storage_buffers(&[true, true, true, true, true, true, true])
            .storage_buffer(false)
            .build();

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Relocate Params"),
            size: std::mem::size_of::<RelocateParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_groups = [0usize, 1].map(|parity| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Relocate Bind Group"),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffers.store[parity].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffers.offsets[parity].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: buffers.offsets[parity ^ 1].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: buffers.coarse.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 5,
                        resource: buffers.atlas.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 6,
                        resource: buffers.meta[SCRATCH].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 7,
                        resource: buffers.identity.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 8,
                        resource: buffers.store[parity ^ 1].as_entire_binding(),
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

    pub fn prepare(
        &self,
        queue: &wgpu::Queue,
        edge_count: u32,
        stride: u32,
        sort_offset: u32,
        span_count: u32,
        particle_count: u32,
    ) {
        let params = RelocateParams {
            edge_count,
            stride,
            sort_offset,
            span_count,
            particle_count,
            _pad0: 0,
            _pad1: 0,
            _pad2: 0,
        };
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));
    }

    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, parity: usize, edge_count: u32) {
        if edge_count == 0 {
            return;
        }
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Relocate Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[parity], &[]);
        pass.dispatch_workgroups(workgroups_for(edge_count), 1, 1);
    }
}

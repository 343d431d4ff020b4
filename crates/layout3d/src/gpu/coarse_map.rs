//! Coarse edge-owner map kernel.

use super::layout_3d::buffers::LayoutBuffers;
use super::params::CoarseMapParams;
use super::pipeline_builder::PipelineBuilder;
use super::workgroups_for;
use wgpu::util::DeviceExt;

pub(crate) struct GpuCoarseMap {
    pipeline: wgpu::ComputePipeline,
    coarse_count: u32,
    /// By tick parity: which offsets buffer holds the rebuilt layout.
    bind_groups: [wgpu::BindGroup; 2],
    _params_buffer: wgpu::Buffer,
}

impl GpuCoarseMap {
    pub fn new(
        device: &wgpu::Device,
        buffers: &LayoutBuffers,
        particle_count: u32,
        coarse_count: u32,
        stride: u32,
    ) -> Self {
        let (pipeline, layout) = PipelineBuilder::new(device)
            .shader_source(include_str!("shaders/coarse_map.wgsl"))
            .label("coarse_map")
            .entry_point("build_coarse_map")
            .uniform_buffer()
            .storage_buffer(true)
            .storage_buffer(false)
            .build();

        // The bisection interval halves each step; log2(N + 1) + 1 steps
        // always reach a single candidate.
        let search_steps = 32 - (particle_count + 1).leading_zeros() + 1;
        let params = CoarseMapParams {
            coarse_count,
            stride,
            particle_count,
            search_steps,
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Coarse Map Params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_groups = [0usize, 1].map(|parity| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Coarse Map Bind Group"),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffers.offsets[parity ^ 1].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffers.coarse.as_entire_binding(),
                    },
                ],
            })
        });

        Self {
            pipeline,
            coarse_count,
            bind_groups,
            _params_buffer: params_buffer,
        }
    }

    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, parity: usize) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Coarse Map Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[parity], &[]);
        pass.dispatch_workgroups(workgroups_for(self.coarse_count), 1, 1);
    }
}

//! Sort encoder kernel: one bitonic workgroup per 128-slot span.

use super::layout_3d::buffers::{LayoutBuffers, SCRATCH};
use super::params::SpanParams;
use super::pipeline_builder::PipelineBuilder;

pub(crate) struct GpuSpanSort {
    pipeline: wgpu::ComputePipeline,
    params_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuSpanSort {
    pub fn new(device: &wgpu::Device, buffers: &LayoutBuffers) -> Self {
        let (pipeline, layout) = PipelineBuilder::new(device)
            .shader_source(include_str!("shaders/span_sort.wgsl"))
            .label("span_sort")
            .entry_point("sort_spans")
            .uniform_buffer()
            .storage_buffer(true)
            .storage_buffer(false)
            .build();

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Span Sort Params"),
            size: std::mem::size_of::<SpanParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Span Sort Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.positions[SCRATCH].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffers.atlas.as_entire_binding(),
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

    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, span_count: u32) {
        if span_count == 0 {
            return;
        }
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Span Sort Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.dispatch_workgroups(span_count, 1, 1);
    }
}

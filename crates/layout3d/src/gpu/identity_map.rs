//! Identity mirror kernel: clear + scatter of the PID -> slot inverse map.

use super::layout_3d::buffers::{LayoutBuffers, CURRENT};
use super::params::IdentityParams;
use super::pipeline_builder::PipelineBuilder;
use super::workgroups_for;
use wgpu::util::DeviceExt;

pub(crate) struct GpuIdentityMap {
    clear_pipeline: wgpu::ComputePipeline,
    mirror_pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    // Kept alive for the bind group.
    _params_buffer: wgpu::Buffer,
}

impl GpuIdentityMap {
    pub fn new(device: &wgpu::Device, buffers: &LayoutBuffers, particle_count: u32) -> Self {
        let (pipelines, layout) = PipelineBuilder::new(device)
            .shader_source(include_str!("shaders/identity_map.wgsl"))
            .label("identity_map")
            .uniform_buffer()
            .storage_buffer(true)
            .storage_buffer(false)
            .build_multi(&["clear_identity", "mirror_identity"]);
        let mut pipelines = pipelines.into_iter();
        let clear_pipeline = pipelines.next().unwrap();
        let mirror_pipeline = pipelines.next().unwrap();

        let params = IdentityParams {
            particle_count,
            _pad0: 0,
            _pad1: 0,
            _pad2: 0,
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Identity Params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Identity Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.meta[CURRENT].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffers.identity.as_entire_binding(),
                },
            ],
        });

        Self {
            clear_pipeline,
            mirror_pipeline,
            bind_group,
            _params_buffer: params_buffer,
        }
    }

    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, particle_count: u32) {
        let workgroups = workgroups_for(particle_count);
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Identity Clear Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.clear_pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Identity Mirror Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.mirror_pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }
    }
}

//! Synchronous diagnostic readback.
//!
//! Each call copies one GPU buffer into a staging buffer, blocks on the map
//! and returns a typed vector. Tests and diagnostics only; nothing in the
//! tick path reads back.

use super::buffers::CURRENT;
use super::GpuLayout3D;
use crate::gpu::{await_buffer_map, GpuError};
use crate::graph::ParticleMeta;
use glam::Vec3;
use std::sync::mpsc;

impl GpuLayout3D {
    fn read_buffer(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        buffer: &wgpu::Buffer,
        bytes: u64,
    ) -> Result<Vec<u8>, GpuError> {
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback Staging"),
            size: bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
        encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, bytes);
        queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::Maintain::Wait);
        await_buffer_map(rx)?;

        let data = slice.get_mapped_range().to_vec();
        staging.unmap();
        Ok(data)
    }

    /// Current particle positions in slot order.
    pub fn read_positions(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<Vec3>, GpuError> {
        let bytes = self.particle_count() as u64 * 16;
        let data = self.read_buffer(device, queue, &self.buffers.positions[CURRENT], bytes)?;
        let rows: &[[f32; 4]] = bytemuck::cast_slice(&data);
        Ok(rows.iter().map(|r| Vec3::new(r[0], r[1], r[2])).collect())
    }

    /// Current SFC keys in slot order.
    pub fn read_sfc_keys(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<f32>, GpuError> {
        let bytes = self.particle_count() as u64 * 16;
        let data = self.read_buffer(device, queue, &self.buffers.positions[CURRENT], bytes)?;
        let rows: &[[f32; 4]] = bytemuck::cast_slice(&data);
        Ok(rows.iter().map(|r| r[3]).collect())
    }

    /// Current particle velocities in slot order.
    pub fn read_velocities(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<Vec3>, GpuError> {
        let bytes = self.particle_count() as u64 * 16;
        let data = self.read_buffer(device, queue, &self.buffers.velocities[CURRENT], bytes)?;
        let rows: &[[f32; 4]] = bytemuck::cast_slice(&data);
        Ok(rows.iter().map(|r| Vec3::new(r[0], r[1], r[2])).collect())
    }

    /// Packed pid/mass/tint/edge_ptr records in slot order.
    pub fn read_meta(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<ParticleMeta>, GpuError> {
        let bytes = self.particle_count() as u64 * std::mem::size_of::<ParticleMeta>() as u64;
        let data = self.read_buffer(device, queue, &self.buffers.meta[CURRENT], bytes)?;
        Ok(bytemuck::cast_slice(&data).to_vec())
    }

    /// Live CSR start offsets (N + 1 entries).
    pub fn read_offsets(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<u32>, GpuError> {
        let bytes = (self.particle_count() as u64 + 1) * 4;
        let side = self.live_side();
        let data = self.read_buffer(device, queue, &self.buffers.offsets[side], bytes)?;
        Ok(bytemuck::cast_slice(&data).to_vec())
    }

    /// Live edge store (E entries; empty when the graph has no edges).
    pub fn read_store(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<u32>, GpuError> {
        if self.edge_count() == 0 {
            return Ok(Vec::new());
        }
        let bytes = self.edge_count() as u64 * 4;
        let side = self.live_side();
        let data = self.read_buffer(device, queue, &self.buffers.store[side], bytes)?;
        Ok(bytemuck::cast_slice(&data).to_vec())
    }

    /// PID -> physical slot map.
    pub fn read_identity(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<u32>, GpuError> {
        let bytes = self.particle_count() as u64 * 4;
        let data = self.read_buffer(device, queue, &self.buffers.identity, bytes)?;
        Ok(bytemuck::cast_slice(&data).to_vec())
    }
}

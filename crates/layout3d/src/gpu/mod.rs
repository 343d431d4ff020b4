//! GPU device plumbing and the per-kernel compute modules.

pub mod layout_3d;
pub mod pipeline_builder;

pub(crate) mod coarse_map;
pub(crate) mod csr_scan;
pub(crate) mod edge_relocate;
pub(crate) mod identity_map;
pub(crate) mod integrate_3d;
pub(crate) mod params;
pub(crate) mod reshuffle;
pub(crate) mod span_sort;

use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag indicating the GPU device was lost.
static GPU_DEVICE_LOST: AtomicBool = AtomicBool::new(false);

/// Check if the GPU device has been lost.
pub fn is_device_lost() -> bool {
    GPU_DEVICE_LOST.load(Ordering::SeqCst)
}

/// Reset the device-lost flag (call after recreating the device).
pub fn reset_device_lost() {
    GPU_DEVICE_LOST.store(false, Ordering::SeqCst);
}

/// GPU error type for buffer operations.
#[derive(Debug)]
pub enum GpuError {
    DeviceLost,
    BufferMapFailed(wgpu::BufferAsyncError),
    ChannelDisconnected,
}

impl std::fmt::Display for GpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuError::DeviceLost => write!(f, "GPU device lost"),
            GpuError::BufferMapFailed(e) => write!(f, "Buffer map failed: {:?}", e),
            GpuError::ChannelDisconnected => write!(f, "Channel disconnected"),
        }
    }
}

impl std::error::Error for GpuError {}

/// Wait for a buffer map operation to complete, returning Result instead of
/// panicking.
pub fn await_buffer_map(
    rx: std::sync::mpsc::Receiver<Result<(), wgpu::BufferAsyncError>>,
) -> Result<(), GpuError> {
    if is_device_lost() {
        return Err(GpuError::DeviceLost);
    }
    match rx.recv() {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            log::error!("Buffer map failed: {:?}", e);
            Err(GpuError::BufferMapFailed(e))
        }
        Err(_) => {
            log::error!("Buffer map channel disconnected - possible device lost");
            GPU_DEVICE_LOST.store(true, Ordering::SeqCst);
            Err(GpuError::ChannelDisconnected)
        }
    }
}

/// Create a surface-free device and queue suitable for the compute
/// pipeline. Returns `None` when no adapter is available, so callers (and
/// GPU tests) can skip cleanly.
pub fn create_headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))?;

    log::info!("Using GPU: {:?}", adapter.get_info());

    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("Layout Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
            memory_hints: wgpu::MemoryHints::Performance,
        },
        None,
    ))
    .ok()?;

    device.on_uncaptured_error(Box::new(|error| {
        log::error!("GPU uncaptured error: {:?}", error);
        if matches!(error, wgpu::Error::OutOfMemory { .. }) {
            GPU_DEVICE_LOST.store(true, Ordering::SeqCst);
        }
    }));
    reset_device_lost();

    Some((device, queue))
}

/// Linear dispatch size for a 256-wide workgroup.
pub(crate) fn workgroups_for(count: u32) -> u32 {
    count.div_ceil(256)
}

use crate::{Result, SeleneError};
use std::sync::Arc;

/// Device/queue pair shared by every pass.
///
/// The surrounding renderer usually owns the device and hands us clones; the
/// headless constructor exists for tools and GPU tests.
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self { device, queue }
    }

    /// Create a context without a window or surface.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn headless() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| SeleneError::GpuDevice("no suitable adapter found".into()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("selene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .map_err(|e| SeleneError::GpuDevice(e.to_string()))?;

        log::info!("Selene headless context on {:?}", adapter.get_info().name);
        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    pub fn begin_frame(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    pub fn submit(&self, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

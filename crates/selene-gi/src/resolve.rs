//! Indirect resolve pass: integrates merged cascade-0 radiance per pixel and
//! temporally accumulates against the previous frame slot's output. The
//! history texture is an explicit read-only borrow of a slot that retired
//! F-1 frames ago, never shared mutable state.

use glam::UVec2;
use selene_core::{bgl_storage_texture, bgl_texture, bgl_uniform, FrameInputs, StorageTarget};

use crate::layout::dispatch_grid;
use crate::pyramid::create_pipeline;

const WORKGROUP: u32 = 8;

pub struct IndirectResolvePass {
    pipeline: wgpu::ComputePipeline,
    bgl: wgpu::BindGroupLayout,
}

impl IndirectResolvePass {
    pub fn new(device: &wgpu::Device) -> Self {
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gi_resolve_bgl"),
            entries: &[
                bgl_uniform(0, wgpu::ShaderStages::COMPUTE),
                bgl_uniform(1, wgpu::ShaderStages::COMPUTE),
                bgl_texture(2, wgpu::ShaderStages::COMPUTE),
                bgl_texture(3, wgpu::ShaderStages::COMPUTE),
                bgl_texture(4, wgpu::ShaderStages::COMPUTE),
                bgl_texture(5, wgpu::ShaderStages::COMPUTE),
                bgl_texture(6, wgpu::ShaderStages::COMPUTE),
                bgl_storage_texture(
                    7,
                    wgpu::ShaderStages::COMPUTE,
                    wgpu::TextureFormat::Rgba16Float,
                ),
            ],
        });
        let pipeline = create_pipeline(
            device,
            "gi_resolve",
            include_str!("../shaders/gi_resolve.wgsl"),
            &bgl,
        );
        Self { pipeline, bgl }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        frame_params: &wgpu::Buffer,
        resolve_params: &wgpu::Buffer,
        cascade0: &wgpu::TextureView,
        inputs: &FrameInputs,
        history_gi: &wgpu::TextureView,
        output: &StorageTarget,
        screen: UVec2,
    ) {
        let grid = dispatch_grid(screen, WORKGROUP);
        if grid.x == 0 || grid.y == 0 {
            log::debug!("gi resolve skipped (degenerate screen)");
            return;
        }

        let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gi_resolve_bg"),
            layout: &self.bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: resolve_params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(cascade0),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(inputs.gbuffer.position),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(inputs.gbuffer.normal),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(history_gi),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::TextureView(inputs.prev_position),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: wgpu::BindingResource::TextureView(&output.write_view),
                },
            ],
        });

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("gi_resolve"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bg, &[]);
        pass.dispatch_workgroups(grid.x, grid.y, 1);
    }
}

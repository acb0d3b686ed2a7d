//! Cascade radiance build pass: one dispatch per cascade, each marching its
//! own ray interval against the depth pyramid. Cascades are independent of
//! each other here; each depends only on the pyramid and the direct-light
//! buffer from the same frame.

use glam::UVec2;
use selene_core::{bgl_storage_texture, bgl_texture, bgl_uniform, FrameInputs, StorageTarget};

use crate::layout::dispatch_grid;
use crate::pyramid::create_pipeline;

const WORKGROUP: u32 = 8;

pub struct CascadeBuildPass {
    pipeline: wgpu::ComputePipeline,
    bgl: wgpu::BindGroupLayout,
}

impl CascadeBuildPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gi_cascade_build_bgl"),
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
            "gi_cascade_build",
            include_str!("../shaders/cascade_build.wgsl"),
            &bgl,
        );
        Self { pipeline, bgl }
    }

    /// Record one cascade's build dispatch. A degenerate atlas or an empty
    /// ray segment skips the cascade entirely, leaving its cleared state.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        frame_params: &wgpu::Buffer,
        cascade_params: &wgpu::Buffer,
        pyramid_view: &wgpu::TextureView,
        inputs: &FrameInputs,
        atlas: &StorageTarget,
        atlas_size: UVec2,
        segment_len: f32,
        cascade_index: u32,
    ) {
        let grid = dispatch_grid(atlas_size, WORKGROUP);
        if grid.x == 0 || grid.y == 0 || segment_len <= 0.0 {
            log::debug!("cascade {cascade_index} build skipped (grid {grid:?}, segment {segment_len})");
            return;
        }

        let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gi_cascade_build_bg"),
            layout: &self.bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: cascade_params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(pyramid_view),
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
                    resource: wgpu::BindingResource::TextureView(inputs.gbuffer.albedo),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::TextureView(inputs.direct_light),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: wgpu::BindingResource::TextureView(&atlas.write_view),
                },
            ],
        });

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("gi_cascade_build"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bg, &[]);
        pass.dispatch_workgroups(grid.x, grid.y, 1);
    }
}

//! Cascade merge pass, strictly coarse to fine. Each cascade gets its own
//! compute pass; the pass drop is the barrier that makes cascade c+1's merged
//! writes visible before cascade c reads them.

use glam::UVec2;
use selene_core::{bgl_storage_texture, bgl_texture, bgl_uniform};

use crate::layout::dispatch_grid;
use crate::pyramid::create_pipeline;

const WORKGROUP: u32 = 8;

pub struct CascadeMergePass {
    pipeline: wgpu::ComputePipeline,
    bgl: wgpu::BindGroupLayout,
}

impl CascadeMergePass {
    pub fn new(device: &wgpu::Device) -> Self {
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gi_cascade_merge_bgl"),
            entries: &[
                bgl_uniform(0, wgpu::ShaderStages::COMPUTE),
                bgl_texture(1, wgpu::ShaderStages::COMPUTE),
                bgl_texture(2, wgpu::ShaderStages::COMPUTE),
                bgl_storage_texture(
                    3,
                    wgpu::ShaderStages::COMPUTE,
                    wgpu::TextureFormat::Rgba16Float,
                ),
            ],
        });
        let pipeline = create_pipeline(
            device,
            "gi_cascade_merge",
            include_str!("../shaders/cascade_merge.wgsl"),
            &bgl,
        );
        Self { pipeline, bgl }
    }

    /// Merge the coarser cascade's (already merged) atlas into this one.
    /// Skipped on an empty grid; the unmerged build output then stands.
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        merge_params: &wgpu::Buffer,
        fine_atlas: &wgpu::TextureView,
        coarse_atlas: &wgpu::TextureView,
        out_atlas: &wgpu::TextureView,
        fine_atlas_size: UVec2,
        cascade_index: u32,
    ) {
        let grid = dispatch_grid(fine_atlas_size, WORKGROUP);
        if grid.x == 0 || grid.y == 0 {
            log::debug!("cascade {cascade_index} merge skipped (empty grid)");
            return;
        }

        let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gi_cascade_merge_bg"),
            layout: &self.bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: merge_params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(fine_atlas),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(coarse_atlas),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(out_atlas),
                },
            ],
        });

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("gi_cascade_merge"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bg, &[]);
        pass.dispatch_workgroups(grid.x, grid.y, 1);
    }
}

//! Depth pyramid builder: a linearize seed pass over the raw depth buffer,
//! then one min-reduce compute pass per mip level. Each level runs in its own
//! compute pass so the pass boundary orders level `m` before `m + 1`.

use glam::UVec2;
use selene_core::{bgl_depth_texture, bgl_storage_texture, bgl_texture, bgl_uniform, MipChain};

use crate::layout::{dispatch_grid, pyramid_level_size};

const WORKGROUP: u32 = 8;

pub struct DepthPyramidPass {
    linearize_pipeline: wgpu::ComputePipeline,
    linearize_bgl: wgpu::BindGroupLayout,
    reduce_pipeline: wgpu::ComputePipeline,
    reduce_bgl: wgpu::BindGroupLayout,
}

impl DepthPyramidPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let linearize_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gi_depth_linearize_bgl"),
            entries: &[
                bgl_depth_texture(0, wgpu::ShaderStages::COMPUTE),
                bgl_storage_texture(1, wgpu::ShaderStages::COMPUTE, wgpu::TextureFormat::R32Float),
                bgl_uniform(2, wgpu::ShaderStages::COMPUTE),
            ],
        });
        let reduce_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gi_depth_reduce_bgl"),
            entries: &[
                bgl_texture(0, wgpu::ShaderStages::COMPUTE),
                bgl_storage_texture(1, wgpu::ShaderStages::COMPUTE, wgpu::TextureFormat::R32Float),
                bgl_uniform(2, wgpu::ShaderStages::COMPUTE),
            ],
        });

        let linearize_pipeline = create_pipeline(
            device,
            "gi_depth_linearize",
            include_str!("../shaders/depth_linearize.wgsl"),
            &linearize_bgl,
        );
        let reduce_pipeline = create_pipeline(
            device,
            "gi_depth_reduce",
            include_str!("../shaders/depth_reduce.wgsl"),
            &reduce_bgl,
        );

        Self {
            linearize_pipeline,
            linearize_bgl,
            reduce_pipeline,
            reduce_bgl,
        }
    }

    /// Record the seed pass plus one reduce pass per remaining level.
    /// `reduce_params` holds one pre-filled uniform buffer per reduce step.
    pub fn record(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        raw_depth: &wgpu::TextureView,
        pyramid: &MipChain,
        linearize_params: &wgpu::Buffer,
        reduce_params: &[wgpu::Buffer],
    ) {
        let screen = UVec2::new(pyramid.width, pyramid.height);
        let grid = dispatch_grid(screen, WORKGROUP);
        if grid.x == 0 || grid.y == 0 {
            log::debug!("depth pyramid skipped: degenerate screen {screen:?}");
            return;
        }

        let seed_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gi_depth_linearize_bg"),
            layout: &self.linearize_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(raw_depth),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&pyramid.level_views[0]),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: linearize_params.as_entire_binding(),
                },
            ],
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("gi_depth_linearize"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.linearize_pipeline);
            pass.set_bind_group(0, &seed_bg, &[]);
            pass.dispatch_workgroups(grid.x, grid.y, 1);
        }

        for m in 1..pyramid.levels {
            let dst = pyramid_level_size(screen, m);
            let grid = dispatch_grid(dst, WORKGROUP);
            let bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("gi_depth_reduce_bg"),
                layout: &self.reduce_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(
                            &pyramid.level_views[(m - 1) as usize],
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(
                            &pyramid.level_views[m as usize],
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: reduce_params[(m - 1) as usize].as_entire_binding(),
                    },
                ],
            });
            // One pass per level: level m-1's writes are visible before m reads.
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("gi_depth_reduce"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.reduce_pipeline);
            pass.set_bind_group(0, &bg, &[]);
            pass.dispatch_workgroups(grid.x, grid.y, 1);
        }
    }
}

pub(crate) fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    bgl: &wgpu::BindGroupLayout,
) -> wgpu::ComputePipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bgl],
        push_constant_ranges: &[],
    });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        module: &module,
        entry_point: "cs_main",
        compilation_options: Default::default(),
        cache: None,
    })
}

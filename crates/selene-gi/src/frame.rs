//! Per-frame-slot resources. Every transient image is duplicated once per
//! frame in flight so frame i never touches a resource frame i-1 or i+1 is
//! still using; the rotating slot index is the only synchronization for that
//! hazard class.

use glam::UVec2;
use selene_core::{create_mip_chain, create_storage_target, MipChain, StorageTarget};
use wgpu::util::DeviceExt;

use crate::config::GiConfig;
use crate::layout::{atlas_size, pyramid_level_count, pyramid_level_size};
use crate::uniforms::ReduceParams;

pub struct FrameSlot {
    pub pyramid: MipChain,
    pub linearize_params: wgpu::Buffer,
    pub reduce_params: Vec<wgpu::Buffer>,
    /// Build output, one atlas per cascade.
    pub atlases: Vec<StorageTarget>,
    /// Merge destinations for cascades 0..N-1; the top cascade merges nowhere.
    pub merged: Vec<StorageTarget>,
    pub gi_output: StorageTarget,
}

impl FrameSlot {
    pub fn new(device: &wgpu::Device, config: &GiConfig, screen: UVec2, slot: u32) -> Self {
        let levels = pyramid_level_count(screen.x, screen.y, config.max_pyramid_levels);
        // Degenerate screens still get 1x1 allocations; dispatch sizing is
        // what actually skips the work.
        let alloc = screen.max(UVec2::ONE);

        let pyramid = create_mip_chain(
            device,
            &format!("gi_depth_pyramid_{slot}"),
            alloc.x,
            alloc.y,
            levels,
            wgpu::TextureFormat::R32Float,
        );
        let linearize_params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gi_linearize_params"),
            size: std::mem::size_of::<crate::uniforms::LinearizeParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let reduce_params = (1..levels)
            .map(|m| {
                let src = pyramid_level_size(alloc, m - 1);
                let dst = pyramid_level_size(alloc, m);
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("gi_reduce_params"),
                    contents: bytemuck::bytes_of(&ReduceParams {
                        src_size: src.to_array(),
                        dst_size: dst.to_array(),
                    }),
                    usage: wgpu::BufferUsages::UNIFORM,
                })
            })
            .collect();

        let atlases = (0..config.cascade_count)
            .map(|c| {
                let dims = atlas_size(screen, config.base_stride, config.base_tile, c)
                    .max(UVec2::ONE);
                create_storage_target(
                    device,
                    &format!("gi_cascade_{c}_atlas_{slot}"),
                    dims.x,
                    dims.y,
                    wgpu::TextureFormat::Rgba16Float,
                )
            })
            .collect();
        let merged = (0..config.cascade_count.saturating_sub(1))
            .map(|c| {
                let dims = atlas_size(screen, config.base_stride, config.base_tile, c)
                    .max(UVec2::ONE);
                create_storage_target(
                    device,
                    &format!("gi_cascade_{c}_merged_{slot}"),
                    dims.x,
                    dims.y,
                    wgpu::TextureFormat::Rgba16Float,
                )
            })
            .collect();

        let gi_output = create_storage_target(
            device,
            &format!("gi_output_{slot}"),
            alloc.x,
            alloc.y,
            wgpu::TextureFormat::Rgba16Float,
        );

        Self {
            pyramid,
            linearize_params,
            reduce_params,
            atlases,
            merged,
            gi_output,
        }
    }

    /// The view the resolver integrates: cascade 0 after merging, or the bare
    /// build output when there is only one cascade.
    pub fn resolved_cascade0(&self) -> &wgpu::TextureView {
        match self.merged.first() {
            Some(m) => &m.read_view,
            None => &self.atlases[0].read_view,
        }
    }
}

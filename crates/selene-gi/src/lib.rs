//! Screen-space radiance cascades global illumination.
//!
//! Per frame, in fixed order on one command stream: depth pyramid (linearize
//! seed + min-reduce chain), per-cascade radiance build (hierarchical ray
//! march), coarse-to-fine merge, then a temporally accumulated per-pixel
//! resolve. Every stage is a compute dispatch; ordering between stages comes
//! from call order plus compute-pass boundaries, and the host never blocks
//! mid-sequence.

use glam::UVec2;
use selene_core::{FrameInputs, GpuContext, Result};
use wgpu::util::DeviceExt;

pub use bands::{cascade_bands, CascadeBand};
pub use config::{GiConfig, GiQuality};
pub use frame::FrameSlot;

mod bands;
mod cascade;
mod config;
mod frame;
pub mod layout;
mod merge;
mod pyramid;
pub mod reference;
mod resolve;
mod uniforms;

use cascade::CascadeBuildPass;
use merge::CascadeMergePass;
use pyramid::DepthPyramidPass;
use resolve::IndirectResolvePass;
use uniforms::{CascadeParams, FrameUniforms, LinearizeParams, MergeParams, ResolveParams};

pub struct GiRenderer {
    config: GiConfig,
    screen: UVec2,
    pyramid_pass: DepthPyramidPass,
    build_pass: CascadeBuildPass,
    merge_pass: CascadeMergePass,
    resolve_pass: IndirectResolvePass,
    frame_params: wgpu::Buffer,
    cascade_params: Vec<wgpu::Buffer>,
    merge_params: Vec<wgpu::Buffer>,
    resolve_params: wgpu::Buffer,
    slots: Vec<FrameSlot>,
    frame_counter: u64,
}

impl GiRenderer {
    /// Build pipelines and all per-slot resources. Resource-creation failures
    /// are fatal here, never during per-frame recording.
    pub fn new(ctx: &GpuContext, config: GiConfig, width: u32, height: u32) -> Result<Self> {
        config.validate()?;
        let device = &ctx.device;
        let screen = UVec2::new(width, height);

        log::info!(
            "Initializing radiance cascades GI: {} cascades, base interval {}, {}x{}, {} frame slots",
            config.cascade_count,
            config.base_interval,
            width,
            height,
            config.frames_in_flight,
        );

        let pyramid_pass = DepthPyramidPass::new(device);
        let build_pass = CascadeBuildPass::new(device);
        let merge_pass = CascadeMergePass::new(device);
        let resolve_pass = IndirectResolvePass::new(device);

        let frame_params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gi_frame_params"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let cascade_params = (0..config.cascade_count)
            .map(|_| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("gi_cascade_params"),
                    size: std::mem::size_of::<CascadeParams>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let (slots, merge_params, resolve_params) = Self::screen_resources(device, &config, screen);

        Ok(Self {
            config,
            screen,
            pyramid_pass,
            build_pass,
            merge_pass,
            resolve_pass,
            frame_params,
            cascade_params,
            merge_params,
            resolve_params,
            slots,
            frame_counter: 0,
        })
    }

    fn screen_resources(
        device: &wgpu::Device,
        config: &GiConfig,
        screen: UVec2,
    ) -> (Vec<FrameSlot>, Vec<wgpu::Buffer>, wgpu::Buffer) {
        let slots = (0..config.frames_in_flight)
            .map(|slot| FrameSlot::new(device, config, screen, slot))
            .collect();

        let merge_params = (0..config.cascade_count.saturating_sub(1))
            .map(|c| {
                let params = MergeParams {
                    fine_atlas_size: layout::atlas_size(
                        screen,
                        config.base_stride,
                        config.base_tile,
                        c,
                    )
                    .to_array(),
                    fine_probe_count: layout::probe_count(screen, config.base_stride, c)
                        .to_array(),
                    coarse_probe_count: layout::probe_count(screen, config.base_stride, c + 1)
                        .to_array(),
                    fine_tile: layout::tile_size(config.base_tile, c),
                    coarse_tile: layout::tile_size(config.base_tile, c + 1),
                };
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("gi_merge_params"),
                    contents: bytemuck::bytes_of(&params),
                    usage: wgpu::BufferUsages::UNIFORM,
                })
            })
            .collect();

        let resolve_params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gi_resolve_params"),
            contents: bytemuck::bytes_of(&ResolveParams {
                probe_count: layout::probe_count(screen, config.base_stride, 0).to_array(),
                stride: config.base_stride,
                tile: config.base_tile,
            }),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        (slots, merge_params, resolve_params)
    }

    /// Recreate every screen-sized resource. History is gone afterwards, so
    /// the next frame takes the no-history branch for every pixel.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.screen = UVec2::new(width, height);
        let (slots, merge_params, resolve_params) =
            Self::screen_resources(device, &self.config, self.screen);
        self.slots = slots;
        self.merge_params = merge_params;
        self.resolve_params = resolve_params;
        self.frame_counter = 0;
        log::info!("GI resized to {}x{}", width, height);
    }

    /// Record this frame's full GI sequence into `encoder`.
    pub fn record(
        &mut self,
        ctx: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        inputs: &FrameInputs,
    ) {
        let device = &ctx.device;
        let queue = &ctx.queue;
        let cfg = &self.config;
        let f = cfg.frames_in_flight as u64;
        let slot_idx = (self.frame_counter % f) as usize;
        let prev_idx = ((self.frame_counter + f - 1) % f) as usize;
        let slot = &self.slots[slot_idx];
        let prev_slot = &self.slots[prev_idx];

        // Bands are derived from two constants and recomputed each frame.
        let bands = cascade_bands(cfg.cascade_count, cfg.base_interval);

        let camera = &inputs.camera;
        let camera_pos = camera.view.inverse().w_axis;
        queue.write_buffer(
            &self.frame_params,
            0,
            bytemuck::bytes_of(&FrameUniforms {
                view_proj: camera.view_proj().to_cols_array_2d(),
                prev_view_proj: camera.prev_view_proj.to_cols_array_2d(),
                camera_pos: camera_pos.to_array(),
                planes: [camera.near, camera.far, 0.0, 0.0],
                screen: self.screen.to_array(),
                frame_index: self.frame_counter as u32,
                history_valid: u32::from(self.frame_counter > 0),
                pyramid_levels: slot.pyramid.levels,
                _pad: [0; 3],
                params: [
                    cfg.temporal_blend,
                    cfg.reprojection_tolerance,
                    cfg.gi_intensity,
                    cfg.ambient,
                ],
            }),
        );
        queue.write_buffer(
            &slot.linearize_params,
            0,
            bytemuck::bytes_of(&LinearizeParams {
                size: self.screen.to_array(),
                near: camera.near,
                far: camera.far,
            }),
        );
        for (c, band) in bands.iter().enumerate() {
            let c = c as u32;
            let overlap = if c == 0 {
                0.0
            } else {
                bands[c as usize - 1].length * cfg.overlap_fraction
            };
            queue.write_buffer(
                &self.cascade_params[c as usize],
                0,
                bytemuck::bytes_of(&CascadeParams {
                    atlas_size: layout::atlas_size(self.screen, cfg.base_stride, cfg.base_tile, c)
                        .to_array(),
                    probe_count: layout::probe_count(self.screen, cfg.base_stride, c).to_array(),
                    stride: layout::probe_stride(cfg.base_stride, c),
                    tile: layout::tile_size(cfg.base_tile, c),
                    cascade_index: c,
                    _pad: 0,
                    band: [band.start, band.length, overlap, cfg.base_interval],
                }),
            );
        }

        // Stage 1: depth pyramid, levels strictly in order.
        self.pyramid_pass.record(
            device,
            encoder,
            inputs.depth,
            &slot.pyramid,
            &slot.linearize_params,
            &slot.reduce_params,
        );

        // Stage 2: build each cascade's radiance atlas. Independent of each
        // other, issued sequentially to bound transient memory pressure.
        for (c, band) in bands.iter().enumerate() {
            let dims = layout::atlas_size(self.screen, cfg.base_stride, cfg.base_tile, c as u32);
            self.build_pass.record(
                device,
                encoder,
                &self.frame_params,
                &self.cascade_params[c],
                &slot.pyramid.full_view,
                inputs,
                &slot.atlases[c],
                dims,
                band.length,
                c as u32,
            );
        }

        // Stage 3: merge, coarsest-but-one down to 0. The top cascade's build
        // output seeds the chain.
        let n = cfg.cascade_count as usize;
        let mut coarse = &slot.atlases[n - 1].read_view;
        for c in (0..n.saturating_sub(1)).rev() {
            let dims = layout::atlas_size(self.screen, cfg.base_stride, cfg.base_tile, c as u32);
            self.merge_pass.record(
                device,
                encoder,
                &self.merge_params[c],
                &slot.atlases[c].read_view,
                coarse,
                &slot.merged[c].write_view,
                dims,
                c as u32,
            );
            coarse = &slot.merged[c].read_view;
        }

        // Stage 4: per-pixel resolve against the previous slot's history.
        self.resolve_pass.record(
            device,
            encoder,
            &self.frame_params,
            &self.resolve_params,
            slot.resolved_cascade0(),
            inputs,
            &prev_slot.gi_output.read_view,
            &slot.gi_output,
            self.screen,
        );

        self.frame_counter += 1;
    }

    /// The most recently resolved GI image, for the compositing stage.
    pub fn output_view(&self) -> &wgpu::TextureView {
        let f = self.config.frames_in_flight as u64;
        let last = if self.frame_counter == 0 {
            0
        } else {
            ((self.frame_counter - 1) % f) as usize
        };
        &self.slots[last].gi_output.read_view
    }

    pub fn config(&self) -> &GiConfig {
        &self.config
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }
}

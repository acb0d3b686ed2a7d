//! GPU-side parameter blocks. Field order and padding must match the WGSL
//! struct declarations in `shaders/` exactly; the layout tests below pin the
//! byte sizes.

use bytemuck::{Pod, Zeroable};

/// Per-frame globals bound to the build and resolve passes.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub prev_view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    /// x = near, y = far
    pub planes: [f32; 4],
    pub screen: [u32; 2],
    pub frame_index: u32,
    pub history_valid: u32,
    pub pyramid_levels: u32,
    pub _pad: [u32; 3],
    /// x = temporal blend, y = reprojection tolerance, z = gi intensity, w = ambient
    pub params: [f32; 4],
}

/// Seed pass: projective depth to camera-space distance.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct LinearizeParams {
    pub size: [u32; 2],
    pub near: f32,
    pub far: f32,
}

/// One downsample step of the depth pyramid.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct ReduceParams {
    pub src_size: [u32; 2],
    pub dst_size: [u32; 2],
}

/// Per-cascade parameters for the radiance build pass.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct CascadeParams {
    pub atlas_size: [u32; 2],
    pub probe_count: [u32; 2],
    pub stride: u32,
    pub tile: u32,
    pub cascade_index: u32,
    pub _pad: u32,
    /// x = interval start, y = interval length, z = overlap, w = base march step
    pub band: [f32; 4],
}

/// Parameters for merging cascade `c+1` into cascade `c`.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct MergeParams {
    pub fine_atlas_size: [u32; 2],
    pub fine_probe_count: [u32; 2],
    pub coarse_probe_count: [u32; 2],
    pub fine_tile: u32,
    pub coarse_tile: u32,
}

/// Cascade-0 geometry for the resolve pass.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct ResolveParams {
    pub probe_count: [u32; 2],
    pub stride: u32,
    pub tile: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    // WGSL uniform layouts are fixed; a silent size drift here corrupts every
    // downstream binding.
    #[test]
    fn uniform_block_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 208);
        assert_eq!(std::mem::size_of::<LinearizeParams>(), 16);
        assert_eq!(std::mem::size_of::<ReduceParams>(), 16);
        assert_eq!(std::mem::size_of::<CascadeParams>(), 48);
        assert_eq!(std::mem::size_of::<MergeParams>(), 32);
        assert_eq!(std::mem::size_of::<ResolveParams>(), 16);
    }
}

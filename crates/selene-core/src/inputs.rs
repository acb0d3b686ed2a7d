use crate::CameraState;

/// Views into the geometric buffer produced by the external geometry pass.
///
/// Position stores world-space XYZ with W = 1 where geometry was rasterized
/// and W = 0 for background texels.
pub struct GeometryInputs<'a> {
    pub position: &'a wgpu::TextureView,
    pub normal: &'a wgpu::TextureView,
    pub albedo: &'a wgpu::TextureView,
    pub material: &'a wgpu::TextureView,
}

/// Everything the GI subsystem consumes for one frame. All views are borrowed
/// from the surrounding renderer; the subsystem never owns caller resources.
pub struct FrameInputs<'a> {
    /// Raw projective depth (`Depth32Float`) from the geometry pass.
    pub depth: &'a wgpu::TextureView,
    pub gbuffer: GeometryInputs<'a>,
    /// Pre-albedo direct incident radiance.
    pub direct_light: &'a wgpu::TextureView,
    /// Previous frame's world-position image, for temporal reprojection.
    pub prev_position: &'a wgpu::TextureView,
    pub camera: CameraState,
}

/// A 2D storage texture plus the two views the compute passes need: one for
/// sampling (`texture_2d<f32>`) and one for storage writes.
pub struct StorageTarget {
    pub texture: wgpu::Texture,
    pub read_view: wgpu::TextureView,
    pub write_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

pub fn create_storage_target(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> StorageTarget {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::STORAGE_BINDING
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let read_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let write_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    StorageTarget {
        texture,
        read_view,
        write_view,
        width,
        height,
    }
}

/// A single image with a full mip chain, one write view per level and one
/// read view spanning the whole chain. Level `m` is half the size of `m - 1`.
pub struct MipChain {
    pub texture: wgpu::Texture,
    /// Samples every level via `textureLoad(tex, coord, level)`.
    pub full_view: wgpu::TextureView,
    /// One single-level view per mip, for binding as read input or storage output.
    pub level_views: Vec<wgpu::TextureView>,
    pub width: u32,
    pub height: u32,
    pub levels: u32,
}

pub fn create_mip_chain(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    levels: u32,
    format: wgpu::TextureFormat,
) -> MipChain {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: levels,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let full_view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        base_mip_level: 0,
        mip_level_count: Some(levels),
        ..Default::default()
    });
    let level_views = (0..levels)
        .map(|m| {
            texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some(label),
                base_mip_level: m,
                mip_level_count: Some(1),
                ..Default::default()
            })
        })
        .collect();
    MipChain {
        texture,
        full_view,
        level_views,
        width,
        height,
        levels,
    }
}

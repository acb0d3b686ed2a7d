//! Pure sizing math for the depth pyramid and the cascade atlases, kept free
//! of any GPU context so it can be unit tested directly.

use glam::UVec2;

/// Mip levels for a pyramid over a `width x height` image, capped at
/// `max_levels`. A degenerate resolution still yields the seed level.
pub fn pyramid_level_count(width: u32, height: u32, max_levels: u32) -> u32 {
    let longest = width.max(height).max(1);
    let full = 32 - longest.leading_zeros(); // floor(log2(longest)) + 1
    full.min(max_levels).max(1)
}

/// Size of mip level `m`, halving each step and never reaching zero.
pub fn pyramid_level_size(screen: UVec2, level: u32) -> UVec2 {
    UVec2::new(
        (screen.x >> level).max(1),
        (screen.y >> level).max(1),
    )
}

/// Probe stride in screen pixels at cascade `c`. Doubles per cascade: coarser
/// spatial sampling as angular sampling densifies.
pub fn probe_stride(base_stride: u32, cascade: u32) -> u32 {
    base_stride << cascade
}

/// Directional tile edge in texels at cascade `c`. Doubles per cascade, so
/// the direction count quadruples.
pub fn tile_size(base_tile: u32, cascade: u32) -> u32 {
    base_tile << cascade
}

/// Probes along each screen axis at cascade `c`.
pub fn probe_count(screen: UVec2, base_stride: u32, cascade: u32) -> UVec2 {
    let stride = probe_stride(base_stride, cascade);
    UVec2::new(screen.x.div_ceil(stride), screen.y.div_ceil(stride))
}

/// Atlas pixel dimensions at cascade `c`: the probe grid times the tile edge.
/// Zero exactly when the screen dimension is zero.
pub fn atlas_size(screen: UVec2, base_stride: u32, base_tile: u32, cascade: u32) -> UVec2 {
    probe_count(screen, base_stride, cascade) * tile_size(base_tile, cascade)
}

/// Workgroup grid for a dispatch over `size` with `workgroup` sized groups.
/// A zero dimension means the caller must skip the dispatch entirely.
pub fn dispatch_grid(size: UVec2, workgroup: u32) -> UVec2 {
    UVec2::new(size.x.div_ceil(workgroup), size.y.div_ceil(workgroup))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_count_matches_log2_of_longest_axis() {
        assert_eq!(pyramid_level_count(1920, 1080, 16), 11); // log2(1920)=10
        assert_eq!(pyramid_level_count(1024, 1024, 16), 11);
        assert_eq!(pyramid_level_count(1, 1, 16), 1);
        assert_eq!(pyramid_level_count(0, 0, 16), 1);
    }

    #[test]
    fn level_count_respects_cap() {
        assert_eq!(pyramid_level_count(4096, 4096, 8), 8);
        assert_eq!(pyramid_level_count(4096, 4096, 1), 1);
    }

    #[test]
    fn level_sizes_halve_and_clamp_to_one() {
        let screen = UVec2::new(640, 480);
        assert_eq!(pyramid_level_size(screen, 0), UVec2::new(640, 480));
        assert_eq!(pyramid_level_size(screen, 1), UVec2::new(320, 240));
        assert_eq!(pyramid_level_size(screen, 10), UVec2::new(1, 1));
    }

    #[test]
    fn stride_and_tile_double_per_cascade() {
        for c in 0..6 {
            assert_eq!(probe_stride(4, c), 4 << c);
            assert_eq!(tile_size(2, c), 2 << c);
        }
    }

    #[test]
    fn atlas_dims_are_probe_grid_times_tile() {
        let screen = UVec2::new(1280, 720);
        for c in 0..5 {
            let stride = probe_stride(4, c);
            let tile = tile_size(2, c);
            let expected = UVec2::new(
                screen.x.div_ceil(stride) * tile,
                screen.y.div_ceil(stride) * tile,
            );
            let got = atlas_size(screen, 4, 2, c);
            assert_eq!(got, expected);
            assert!(got.x >= tile && got.y >= tile);
        }
    }

    #[test]
    fn atlas_covers_at_least_one_tile_for_tiny_screens() {
        let got = atlas_size(UVec2::new(3, 2), 8, 4, 0);
        assert_eq!(got, UVec2::new(4, 4));
    }

    #[test]
    fn degenerate_screen_yields_empty_dispatch() {
        assert_eq!(atlas_size(UVec2::ZERO, 4, 2, 0), UVec2::ZERO);
        assert_eq!(dispatch_grid(UVec2::ZERO, 8), UVec2::ZERO);
    }

    #[test]
    fn dispatch_grid_rounds_up() {
        assert_eq!(dispatch_grid(UVec2::new(17, 8), 8), UVec2::new(3, 1));
        assert_eq!(dispatch_grid(UVec2::new(8, 8), 8), UVec2::new(1, 1));
    }
}

//! CPU mirror of the per-texel shader math.
//!
//! Each function here reproduces one stage's texel computation exactly as
//! the WGSL writes it, so host-side tests can check stage semantics and
//! multi-frame behavior without a GPU. Keep any edit to a shader's math in
//! lockstep with its mirror below.

use glam::{Mat4, UVec2, Vec2, Vec3, Vec4, Vec4Swizzles};

/// R2 low-discrepancy offset in [-0.5, 0.5), mirrors `frame_jitter`.
pub fn frame_jitter(index: u32) -> Vec2 {
    let f = index as f32;
    Vec2::new((f * 0.7548776662).fract(), (f * 0.5698402910).fract()) - Vec2::splat(0.5)
}

/// Tile texel to hemisphere direction around `n`, mirrors `tile_dir`.
pub fn tile_dir(local: UVec2, tile: u32, n: Vec3, jitter: Vec2) -> Vec3 {
    let uv = (local.as_vec2() + Vec2::splat(0.5) + jitter * 0.99) / tile as f32;
    let phi = std::f32::consts::TAU * uv.x;
    let cos_t = uv.y.clamp(0.0, 1.0);
    let sin_t = (1.0 - cos_t * cos_t).max(0.0).sqrt();
    let d = Vec3::new(phi.cos() * sin_t, phi.sin() * sin_t, cos_t);
    let sign_z = if n.z >= 0.0 { 1.0 } else { -1.0 };
    let a = -1.0 / (sign_z + n.z);
    let b = n.x * n.y * a;
    let t = Vec3::new(1.0 + sign_z * n.x * n.x * a, sign_z * b, -sign_z * n.x);
    let bt = Vec3::new(b, sign_z + n.y * n.y * a, -n.y);
    (t * d.x + bt * d.y + n * d.z).normalize()
}

/// Reverse the projection's depth mapping, mirrors `depth_linearize.wgsl`.
pub fn linearize_depth(d: f32, near: f32, far: f32) -> f32 {
    near * far / (far - d * (far - near)).max(1e-6)
}

/// One min-reduce level over a row-major grid, mirrors `depth_reduce.wgsl`.
/// Level sizes floor-halve, so the footprint widens to three taps on an
/// odd-sized axis; the trailing row/column must still reach coarser levels.
pub fn min_reduce(src: &[f32], src_size: UVec2) -> (Vec<f32>, UVec2) {
    let dst_size = (src_size / 2).max(UVec2::ONE);
    let span = UVec2::new(2 + (src_size.x & 1), 2 + (src_size.y & 1));
    let tap = |x: u32, y: u32| {
        let x = x.min(src_size.x - 1);
        let y = y.min(src_size.y - 1);
        src[(y * src_size.x + x) as usize]
    };
    let mut dst = Vec::with_capacity((dst_size.x * dst_size.y) as usize);
    for y in 0..dst_size.y {
        for x in 0..dst_size.x {
            let (sx, sy) = (x * 2, y * 2);
            let mut m = tap(sx, sy);
            for dy in 0..span.y {
                for dx in 0..span.x {
                    m = m.min(tap(sx + dx, sy + dy));
                }
            }
            dst.push(m);
        }
    }
    (dst, dst_size)
}

/// One merge texel: fine sample plus the averaged coarse 2x2 block, weighted
/// by the fine sample's unresolved coverage. Mirrors `cascade_merge.wgsl`.
pub fn merge_texel(fine: Vec4, coarse_block: [Vec4; 4]) -> Vec4 {
    let acc = (coarse_block[0] + coarse_block[1] + coarse_block[2] + coarse_block[3]) * 0.25;
    let w = 1.0 - fine.w;
    let radiance = fine.xyz() + acc.xyz() * w;
    let coverage = (fine.w + acc.w * w).min(1.0);
    radiance.extend(coverage)
}

/// Cosine-weighted integral over a probe's directional tile, mirrors the
/// resolve loop. `sample` yields the cascade-0 texel for a tile coordinate.
pub fn integrate_tile(
    tile: u32,
    n: Vec3,
    jitter: Vec2,
    intensity: f32,
    sample: impl Fn(UVec2) -> Vec4,
) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut weight_sum = 0.0;
    for y in 0..tile {
        for x in 0..tile {
            let local = UVec2::new(x, y);
            let dir = tile_dir(local, tile, n, jitter);
            let w = n.dot(dir).max(0.0);
            sum += sample(local).xyz() * w;
            weight_sum += w;
        }
    }
    if weight_sum > 0.0 {
        sum / weight_sum * intensity
    } else {
        Vec3::ZERO
    }
}

pub struct TemporalParams {
    pub blend: f32,
    pub tolerance: f32,
}

/// The resolve stage's temporal half, mirrors `gi_resolve.wgsl` after the
/// integration loop. `fetch` yields the stored world position (w flags
/// geometry) and GI color at a reprojected pixel. Returns the blended color.
pub fn temporal_resolve(
    raw: Vec3,
    surface: Vec3,
    history_valid: bool,
    prev_view_proj: Mat4,
    screen: UVec2,
    params: &TemporalParams,
    fetch: impl Fn(UVec2) -> (Vec4, Vec3),
) -> Vec3 {
    if !history_valid {
        return raw;
    }
    let clip = prev_view_proj * surface.extend(1.0);
    if clip.w <= 0.0 {
        return raw;
    }
    let ndc = clip.xy() / clip.w;
    let uv = ndc * Vec2::new(0.5, -0.5) + Vec2::splat(0.5);
    if !(0.0..1.0).contains(&uv.x) || !(0.0..1.0).contains(&uv.y) {
        return raw;
    }
    let prev_px = (uv * screen.as_vec2()).as_uvec2().min(screen - UVec2::ONE);
    let (prev_pos, hist) = fetch(prev_px);
    let disocclusion = prev_pos.xyz().distance(surface) > params.tolerance;
    if prev_pos.w > 0.5 && !disocclusion {
        raw.lerp(hist, params.blend)
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: u32 = 4;

    #[test]
    fn nearest_surface_wins_reduction() {
        // 4x4 with one near value; it must survive to the 1x1 apex.
        let mut grid = vec![50.0_f32; 16];
        grid[9] = 2.5;
        let (l1, s1) = min_reduce(&grid, UVec2::splat(4));
        let (l2, s2) = min_reduce(&l1, s1);
        assert_eq!(s2, UVec2::ONE);
        assert_eq!(l2[0], 2.5);
    }

    #[test]
    fn odd_size_reduction_clamps_edges() {
        // 3x3: the widened footprint reaches the last column.
        let grid = vec![9.0, 9.0, 1.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0];
        let (dst, size) = min_reduce(&grid, UVec2::splat(3));
        assert_eq!(size, UVec2::ONE);
        assert_eq!(dst[0], 1.0);
    }

    #[test]
    fn thin_occluder_in_trailing_column_survives_reduction() {
        // Floor-halved levels drop the last row/column of an odd source from
        // plain 2x2 footprints; a near surface there must still reach the
        // coarser level or the marcher skips straight through it.
        let mut grid = vec![9.0_f32; 9];
        grid[5] = 1.0; // column 2, row 1
        let (dst, size) = min_reduce(&grid, UVec2::splat(3));
        assert_eq!(size, UVec2::ONE);
        assert_eq!(dst[0], 1.0);

        // Same for the trailing row of a 5x3 level.
        let mut wide = vec![9.0_f32; 15];
        wide[2 * 5 + 3] = 1.0; // row 2, column 3
        let (dst, size) = min_reduce(&wide, UVec2::new(5, 3));
        assert_eq!(size, UVec2::new(2, 1));
        assert_eq!(dst[1], 1.0);
    }

    #[test]
    fn merge_is_identity_at_full_coverage() {
        let fine = Vec4::new(0.3, 0.5, 0.1, 1.0);
        let coarse = [Vec4::new(10.0, 10.0, 10.0, 1.0); 4];
        let out = merge_texel(fine, coarse);
        assert!((out - fine).abs().max_element() < 1e-6);
    }

    #[test]
    fn merge_passes_coarse_through_empty_fine() {
        let coarse = [Vec4::new(0.2, 0.4, 0.6, 1.0); 4];
        let out = merge_texel(Vec4::ZERO, coarse);
        assert!((out - Vec4::new(0.2, 0.4, 0.6, 1.0)).abs().max_element() < 1e-6);
    }

    #[test]
    fn merge_coverage_saturates() {
        let fine = Vec4::new(0.1, 0.1, 0.1, 0.7);
        let coarse = [Vec4::new(0.0, 0.0, 0.0, 1.0); 4];
        assert!(merge_texel(fine, coarse).w <= 1.0);
    }

    #[test]
    fn tile_dirs_stay_in_hemisphere() {
        for n in [Vec3::Y, Vec3::Z, Vec3::NEG_Z, Vec3::new(0.6, -0.48, 0.64)] {
            let n = n.normalize();
            for f in 0..8 {
                let j = frame_jitter(f);
                for y in 0..TILE {
                    for x in 0..TILE {
                        let d = tile_dir(UVec2::new(x, y), TILE, n, j);
                        assert!(n.dot(d) >= -1e-4, "dir left hemisphere of {n:?}");
                        assert!((d.length() - 1.0).abs() < 1e-4);
                    }
                }
            }
        }
    }

    #[test]
    fn linearized_depth_spans_near_to_far() {
        let (near, far) = (0.1, 500.0);
        assert!((linearize_depth(0.0, near, far) - near).abs() < 1e-4);
        assert!((linearize_depth(1.0, near, far) - far).abs() < 0.5);
        let mid = linearize_depth(0.5, near, far);
        assert!(mid > near && mid < far);
    }

    #[test]
    fn first_frame_ignores_history() {
        let raw = Vec3::new(0.4, 0.2, 0.1);
        let out = temporal_resolve(
            raw,
            Vec3::new(1.0, 0.0, 3.0),
            false,
            Mat4::IDENTITY,
            UVec2::splat(64),
            &TemporalParams { blend: 0.9, tolerance: 0.1 },
            &|_| (Vec4::new(1.0, 0.0, 3.0, 1.0), Vec3::splat(100.0)),
        );
        assert_eq!(out, raw);
    }

    #[test]
    fn disocclusion_rejects_history() {
        let raw = Vec3::splat(0.25);
        let surface = Vec3::new(0.1, 0.1, 0.5);
        let params = TemporalParams { blend: 0.9, tolerance: 0.1 };
        // Reprojection lands in-frame under an orthographic-style matrix.
        let prev_vp = Mat4::IDENTITY;

        // Same surface point last frame: history is accepted.
        let hist = Vec3::splat(0.75);
        let accepted = temporal_resolve(
            raw,
            surface,
            true,
            prev_vp,
            UVec2::splat(64),
            &params,
            &|_| (surface.extend(1.0), hist),
        );
        assert!((accepted - raw.lerp(hist, 0.9)).abs().max_element() < 1e-6);

        // The stored point is 10 units off, far past the tolerance, so the
        // output falls back to the raw integral.
        let far_point = surface + Vec3::new(10.0, 0.0, 0.0);
        let rejected = temporal_resolve(
            raw,
            surface,
            true,
            prev_vp,
            UVec2::splat(64),
            &params,
            &|_| (far_point.extend(1.0), hist),
        );
        assert_eq!(rejected, raw);
    }

    #[test]
    fn background_history_is_rejected() {
        let raw = Vec3::splat(0.5);
        let surface = Vec3::new(0.0, 0.0, 0.2);
        let out = temporal_resolve(
            raw,
            surface,
            true,
            Mat4::IDENTITY,
            UVec2::splat(64),
            &TemporalParams { blend: 0.9, tolerance: 0.1 },
            &|_| (surface.extend(0.0), Vec3::splat(9.0)),
        );
        assert_eq!(out, raw);
    }

    // Analytic corner scene: floor plane y = 0 with a lit wall at x = 0
    // rising above it. A shading point on the floor near the corner sees the
    // wall over part of its hemisphere; integration plus the temporal blend
    // must settle instead of flickering with the per-frame jitter.
    fn corner_raw(frame: u32, point: Vec3, wall_radiance: Vec3) -> Vec3 {
        let n = Vec3::Y;
        let jitter = frame_jitter(frame);
        integrate_tile(TILE, n, jitter, 1.0, |local| {
            let dir = tile_dir(local, TILE, n, jitter);
            // Ray from the floor point toward the wall plane x = 0.
            if dir.x < -1e-4 {
                let t = -point.x / dir.x;
                let hit_y = point.y + dir.y * t;
                if hit_y > 0.0 && hit_y < 4.0 {
                    return wall_radiance.extend(1.0);
                }
            }
            Vec4::ZERO
        })
    }

    #[test]
    fn corner_receives_more_bounce_than_open_floor() {
        let wall = Vec3::new(0.8, 0.6, 0.4);
        let near = corner_raw(0, Vec3::new(0.2, 0.0, 0.0), wall);
        let far = corner_raw(0, Vec3::new(30.0, 0.0, 0.0), wall);
        assert!(near.max_element() > far.max_element());
        assert!(near.max_element() > 0.0);
    }

    #[test]
    fn temporal_blend_converges_at_corner() {
        let wall = Vec3::splat(1.0);
        let point = Vec3::new(0.5, 0.0, 0.0);
        let params = TemporalParams { blend: 0.9, tolerance: 0.1 };

        // Static scene, perfect reprojection: each frame EMA-blends the
        // jittered integral into the previous resolve.
        let mut resolved = Vec::new();
        let mut prev = Vec3::ZERO;
        for frame in 0..5u32 {
            let raw = corner_raw(frame, point, wall);
            let color = temporal_resolve(
                raw,
                point,
                frame > 0,
                Mat4::IDENTITY,
                UVec2::splat(64),
                &params,
                &|_| (point.extend(1.0), prev),
            );
            resolved.push(color);
            prev = color;
        }

        let luminance = |c: Vec3| (c.x + c.y + c.z) / 3.0;
        let variance = |window: &[Vec3]| {
            let vals: Vec<f32> = window.iter().copied().map(luminance).collect();
            let mean = vals.iter().sum::<f32>() / vals.len() as f32;
            vals.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / vals.len() as f32
        };
        let early = variance(&resolved[0..3]);
        let late = variance(&resolved[2..5]);
        assert!(
            late < early,
            "resolve did not settle: early var {early}, late var {late}"
        );
    }
}

/// World-space ray-distance interval marched by one cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeBand {
    pub start: f32,
    pub length: f32,
}

/// Compute the ray interval for every cascade.
///
/// Angular resolution quadruples per cascade, so the integrated distance must
/// also quadruple to keep the penumbra condition fixed: cascade `c` covers
/// `[L*scale(c), L*4^(c+1))` with `scale(0) = 0` so cascade 0 starts at the
/// surface. Pure and idempotent; recomputed once per frame.
pub fn cascade_bands(cascade_count: u32, base_interval: f32) -> Vec<CascadeBand> {
    (0..cascade_count)
        .map(|c| {
            let scale = if c == 0 { 0.0 } else { 4.0f32.powi(c as i32) };
            let next = 4.0f32.powi(c as i32 + 1);
            CascadeBand {
                start: base_interval * scale,
                length: base_interval * (next - scale),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_tile_the_interval_without_gaps() {
        for &(n, l) in &[(2u32, 0.5f32), (4, 1.0), (6, 0.25), (8, 3.0)] {
            let bands = cascade_bands(n, l);
            assert_eq!(bands.len(), n as usize);
            assert_eq!(bands[0].start, 0.0);
            for c in 0..(n as usize - 1) {
                let end = bands[c].start + bands[c].length;
                assert!(
                    (end - bands[c + 1].start).abs() <= end.abs() * 1e-6,
                    "gap between cascade {} and {}: {} vs {}",
                    c,
                    c + 1,
                    end,
                    bands[c + 1].start
                );
            }
        }
    }

    #[test]
    fn band_length_quadruples_from_cascade_one() {
        let bands = cascade_bands(6, 1.0);
        for c in 1..bands.len() - 1 {
            let ratio = bands[c + 1].length / bands[c].length;
            assert!(
                (ratio - 4.0).abs() < 1e-5,
                "cascade {} length ratio {}",
                c,
                ratio
            );
        }
    }

    #[test]
    fn cascade_zero_reaches_from_surface_to_base_times_four() {
        let bands = cascade_bands(3, 2.0);
        assert_eq!(bands[0].start, 0.0);
        assert_eq!(bands[0].length, 8.0);
        assert_eq!(bands[1].start, 8.0);
    }

    #[test]
    fn idempotent_for_identical_constants() {
        assert_eq!(cascade_bands(6, 1.5), cascade_bands(6, 1.5));
    }
}

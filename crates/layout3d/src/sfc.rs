//! Space-filling-curve keys for spatial locality.
//!
//! A 3D position is folded onto the unit square through an octahedral
//! (butterfly) map, then indexed by a two-level hierarchical Hilbert curve.
//! Ascending key order is the locality proxy the near-field gravity window
//! relies on: after a sort, slot neighbours are spatial neighbours.
//!
//! This is the CPU mirror of the WGSL functions in
//! `gpu/shaders/integrate_3d.wgsl`; the engine seeds initial keys with it
//! and the tests compare against it. Both sides must stay bit-compatible.

use glam::Vec3;

/// Hilbert index of cell `(x, y)` on a `side * side` grid.
///
/// `side` must be a power of two; cells walk the curve so that consecutive
/// indices are always grid neighbours.
pub fn hilbert_index(side: u32, x: u32, y: u32) -> u32 {
    let mut x = x;
    let mut y = y;
    let mut d = 0u32;
    let mut s = side / 2;
    while s > 0 {
        let rx = u32::from(x & s != 0);
        let ry = u32::from(y & s != 0);
        d += s * s * ((3 * rx) ^ ry);
        if ry == 0 {
            if rx == 1 {
                x = side - 1 - x;
                y = side - 1 - y;
            }
            std::mem::swap(&mut x, &mut y);
        }
        s /= 2;
    }
    d
}

/// Inverse of [`hilbert_index`]: cell `(x, y)` for curve position `d`.
pub fn hilbert_cell(side: u32, d: u32) -> (u32, u32) {
    let mut x = 0u32;
    let mut y = 0u32;
    let mut t = d;
    let mut s = 1u32;
    while s < side {
        let rx = (t / 2) & 1;
        let ry = (t ^ rx) & 1;
        if ry == 0 {
            if rx == 1 {
                x = s - 1 - x;
                y = s - 1 - y;
            }
            std::mem::swap(&mut x, &mut y);
        }
        x += s * rx;
        y += s * ry;
        t /= 4;
        s *= 2;
    }
    (x, y)
}

/// Octahedral fold of a position's direction onto `[0, 1]^2`.
///
/// The lower hemisphere is reflected over the square's diagonal seams so
/// the whole sphere of directions tiles the square. The origin maps to the
/// square's centre.
pub fn octahedral_fold(p: Vec3) -> (f32, f32) {
    let n = p.x.abs() + p.y.abs() + p.z.abs();
    if n == 0.0 {
        return (0.5, 0.5);
    }
    let mut u = p.x / n;
    let mut v = p.y / n;
    if p.z < 0.0 {
        let fu = (1.0 - v.abs()) * if u >= 0.0 { 1.0 } else { -1.0 };
        let fv = (1.0 - u.abs()) * if v >= 0.0 { 1.0 } else { -1.0 };
        u = fu;
        v = fv;
    }
    (u * 0.5 + 0.5, v * 0.5 + 0.5)
}

/// Grid sides for the two Hilbert levels derived from the configured
/// resolution: `resolution` cells per axis at the coarse level, half that
/// within each coarse cell. The default 64.0 yields an effective 2048x2048
/// grid.
pub(crate) fn sfc_levels(resolution: f32) -> (u32, u32) {
    let r0 = (resolution.round().max(2.0) as u32).next_power_of_two();
    let r1 = (r0 / 2).max(1);
    (r0, r1)
}

/// SFC key of a position in `[0, 1)`.
pub fn sfc_key(p: Vec3, resolution: f32) -> f32 {
    let (r0, r1) = sfc_levels(resolution);
    let (u, v) = octahedral_fold(p);

    let g0 = r0 as f32;
    let x0 = ((u * g0) as u32).min(r0 - 1);
    let y0 = ((v * g0) as u32).min(r0 - 1);
    let d0 = hilbert_index(r0, x0, y0);

    let fx = u * g0 - x0 as f32;
    let fy = v * g0 - y0 as f32;
    let g1 = r1 as f32;
    let x1 = ((fx * g1) as u32).min(r1 - 1);
    let y1 = ((fy * g1) as u32).min(r1 - 1);
    let d1 = hilbert_index(r1, x1, y1);

    let cells1 = (r1 * r1) as f32;
    (d0 as f32 * cells1 + d1 as f32) / ((r0 * r0) as f32 * cells1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hilbert_round_trip() {
        let side = 16;
        for d in 0..side * side {
            let (x, y) = hilbert_cell(side, d);
            assert_eq!(hilbert_index(side, x, y), d);
        }
    }

    #[test]
    fn test_hilbert_neighbours() {
        // Consecutive curve positions are grid neighbours.
        let side = 32;
        let mut prev = hilbert_cell(side, 0);
        for d in 1..side * side {
            let cell = hilbert_cell(side, d);
            let manhattan =
                cell.0.abs_diff(prev.0) + cell.1.abs_diff(prev.1);
            assert_eq!(manhattan, 1, "jump at d={}", d);
            prev = cell;
        }
    }

    #[test]
    fn test_fold_stays_in_square() {
        let dirs = [
            Vec3::X,
            Vec3::Y,
            Vec3::Z,
            Vec3::NEG_X,
            Vec3::NEG_Y,
            Vec3::NEG_Z,
            Vec3::new(1.0, 2.0, -3.0),
            Vec3::new(-0.3, 0.7, 0.2),
        ];
        for dir in dirs {
            let (u, v) = octahedral_fold(dir);
            assert!((0.0..=1.0).contains(&u), "u out of range for {:?}", dir);
            assert!((0.0..=1.0).contains(&v), "v out of range for {:?}", dir);
        }
    }

    #[test]
    fn test_fold_is_radius_invariant() {
        let p = Vec3::new(0.4, -1.3, 2.2);
        assert_eq!(octahedral_fold(p), octahedral_fold(p * 7.5));
    }

    #[test]
    fn test_key_range_and_determinism() {
        let p = Vec3::new(0.2, -0.9, 0.4);
        let key = sfc_key(p, 64.0);
        assert!((0.0..1.0).contains(&key));
        assert_eq!(key, sfc_key(p, 64.0));
    }

    #[test]
    fn test_origin_key_is_finite() {
        let key = sfc_key(Vec3::ZERO, 64.0);
        assert!(key.is_finite());
        assert!((0.0..1.0).contains(&key));
    }

    #[test]
    fn test_levels_default() {
        assert_eq!(sfc_levels(64.0), (64, 32));
        assert_eq!(sfc_levels(2.0), (2, 1));
        assert_eq!(sfc_levels(100.0), (128, 64));
    }
}

//! # Cubic Interpolation
//!
//! Keys cubic convolution (`a = -0.5`) over a 4×4×4 neighbourhood.
//! Taps beyond the border are clamped to the edge voxel; points outside the
//! volume read as zero.

use glam::DVec3;
use tomo_geometry::WorldView;

const KEYS_A: f64 = -0.5;

/// Weights of the taps at offsets `-1, 0, 1, 2` for fractional offset `t`.
///
/// The weights sum to one for every `t`, so constant volumes are reproduced
/// exactly.
#[inline]
pub fn keys_weights(t: f64) -> [f64; 4] {
    let a = KEYS_A;
    let t2 = t * t;
    let t3 = t2 * t;
    [
        a * t3 - 2.0 * a * t2 + a * t,
        (a + 2.0) * t3 - (a + 3.0) * t2 + 1.0,
        -(a + 2.0) * t3 + (2.0 * a + 3.0) * t2 - a * t,
        -a * t3 + a * t2,
    ]
}

/// Interpolates the volume at a world position given in voxel units.
pub fn sample_cubic<T>(view: &WorldView<'_, T>, point: DVec3) -> f64
where
    T: Copy + Into<f64>,
{
    let shape = view.shape();
    let coords = point.to_array();
    let mut base = [0isize; 3];
    let mut weights = [[0.0; 4]; 3];
    for axis in 0..3 {
        let c = coords[axis];
        let last = shape[axis] as f64 - 1.0;
        if !(c >= 0.0 && c <= last) {
            return 0.0;
        }
        let floor = c.floor();
        base[axis] = floor as isize;
        weights[axis] = keys_weights(c - floor);
    }

    let clamp = |i: isize, axis: usize| i.clamp(0, shape[axis] as isize - 1) as usize;
    let mut value = 0.0;
    for (dz, wz) in weights[2].iter().enumerate() {
        let z = clamp(base[2] + dz as isize - 1, 2);
        for (dy, wy) in weights[1].iter().enumerate() {
            let y = clamp(base[1] + dy as isize - 1, 1);
            let wyz = wy * wz;
            for (dx, wx) in weights[0].iter().enumerate() {
                let x = clamp(base[0] + dx as isize - 1, 0);
                value += wx * wyz * view.get(x, y, z).into();
            }
        }
    }
    value
}

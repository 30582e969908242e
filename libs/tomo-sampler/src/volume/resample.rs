//! # Volume Resampling
//!
//! Cubic-interpolated resampling of a volume along fitted geometry.
//!
//! Both resamplers share one path: the display-ordered input is wrapped in a
//! world view on entry, samples are computed in world order, and the result
//! is transposed back to display order on exit. Output voxels are `spacing`
//! pixels apart on every axis.
//!
//! | geometry | world result `(x, y, z)` | display result |
//! |---|---|---|
//! | surface | `(cols, rows, depth)` | `(depth, rows, cols)` |
//! | filament | `(normal, binormal, station)` | `(station, binormal, normal)` |

use super::interp::sample_cubic;
use crate::error::{positive, SampleError, SampleResult};
use glam::DVec3;
use rayon::prelude::*;
use tomo_geometry::{HelicalFilament, SurfaceGrid, Volume};
use tracing::debug;

/// Number of samples across a slab: `max(1, round(thickness / spacing))`.
///
/// # Example
///
/// ```rust
/// use tomo_sampler::volume::resample::slab_count;
///
/// assert_eq!(slab_count(200.0, 5.0), 40);
/// assert_eq!(slab_count(1.0, 5.0), 1);
/// ```
pub fn slab_count(thickness: f64, spacing: f64) -> usize {
    ((thickness / spacing).round() as usize).max(1)
}

/// Signed offset of slab sample `i` of `count`, centered on the geometry.
#[inline]
fn slab_offset(i: usize, count: usize, spacing: f64) -> f64 {
    (i as f64 - (count - 1) as f64 * 0.5) * spacing
}

/// Resamples a slab of `thickness` along the surface normals.
///
/// The grid is resampled at `spacing` first, which is stored on the grid.
/// With `masked`, every sample of a grid vertex outside the validity mask is
/// zero.
///
/// # Arguments
///
/// * `volume` - Display-ordered input volume
/// * `grid` - Surface to follow, updated in place
/// * `spacing` - In-plane and depth spacing (pixels)
/// * `thickness` - Slab thickness (pixels)
/// * `masked` - Zero samples outside the validity mask
pub fn resample_along_surface<T>(
    volume: &Volume<T>,
    grid: &mut SurfaceGrid,
    spacing: f64,
    thickness: f64,
    masked: bool,
) -> SampleResult<Volume<f32>>
where
    T: Copy + Into<f64> + Sync,
{
    let spacing = positive("spacing", spacing)?;
    let thickness = positive("thickness", thickness)?;
    grid.set_separation(spacing)?;
    let samples = grid.samples()?;

    let depth = slab_count(thickness, spacing);
    let (rows, cols) = (samples.rows(), samples.cols());
    let positions = samples.positions();
    let normals = samples.normals();
    let mask = samples.mask();

    let result = resample_world(volume, [cols, rows, depth], spacing, |col, row, d| {
        let index = samples.index(row, col);
        if masked && !mask[index] {
            return None;
        }
        Some(positions[index] + normals[index] * slab_offset(d, depth, spacing))
    })?;

    debug!(rows, cols, depth, masked, "resampled volume along surface");
    Ok(result)
}

/// Resamples a square `thickness × thickness` cross-section swept along a
/// filament at constant arclength `spacing`.
pub fn resample_along_filament<T>(
    volume: &Volume<T>,
    filament: &HelicalFilament,
    spacing: f64,
    thickness: f64,
) -> SampleResult<Volume<f32>>
where
    T: Copy + Into<f64> + Sync,
{
    let spacing = positive("spacing", spacing)?;
    let thickness = positive("thickness", thickness)?;
    let stations = filament.stations(spacing)?;
    let frames = filament.frames_at(&stations);
    let width = slab_count(thickness, spacing);

    let result = resample_world(volume, [width, width, frames.len()], spacing, |a, b, s| {
        let frame = &frames[s];
        Some(
            frame.position
                + frame.normal * slab_offset(a, width, spacing)
                + frame.binormal * slab_offset(b, width, spacing),
        )
    })?;

    debug!(stations = frames.len(), width, "resampled volume along filament");
    Ok(result)
}

/// Evaluates `point_at(x, y, z)` over a world-ordered output grid and
/// returns the display-ordered result. `None` samples are zero.
fn resample_world<T, F>(
    volume: &Volume<T>,
    world_shape: [usize; 3],
    spacing: f64,
    point_at: F,
) -> SampleResult<Volume<f32>>
where
    T: Copy + Into<f64> + Sync,
    F: Fn(usize, usize, usize) -> Option<DVec3> + Sync,
{
    if volume.shape().contains(&0) {
        return Err(SampleError::InvalidVolume {
            message: format!("volume has empty shape {:?}", volume.shape()),
        });
    }
    let [nx, ny, nz] = world_shape;
    if nx * ny * nz == 0 {
        return Err(SampleError::InvalidVolume {
            message: format!("empty output shape {world_shape:?}"),
        });
    }

    let view = volume.world();
    let mut data = vec![0.0f32; nx * ny * nz];
    // One chunk per (x, y) column; chunks are written in place, so the
    // result does not depend on scheduling.
    data.par_chunks_mut(nz).enumerate().for_each(|(column, out)| {
        let (x, y) = (column / ny, column % ny);
        for (z, value) in out.iter_mut().enumerate() {
            if let Some(point) = point_at(x, y, z) {
                *value = sample_cubic(&view, point) as f32;
            }
        }
    });

    let scale = volume.scale().map(|s| s * spacing);
    Ok(Volume::from_world(data, world_shape, scale)?)
}

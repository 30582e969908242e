//! # Particle Sampling
//!
//! Dense particle positions with orientations derived from fitted geometry.
//! Every orientation is a rotation matrix whose columns are the particle's
//! x, y and z axes in world coordinates.

use crate::error::{positive, SampleError, SampleResult};
use glam::{DMat3, DVec3};
use std::f64::consts::TAU;
use tomo_geometry::frames::frame_from_normal;
use tomo_geometry::{HelicalFilament, Sphere, SurfaceGrid};
use tracing::debug;

/// Particle positions with one orientation each (world coordinates).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleSet {
    /// Particle positions.
    pub positions: Vec<DVec3>,
    /// Particle orientations, parallel to `positions`.
    pub orientations: Vec<DMat3>,
}

impl ParticleSet {
    /// Returns the number of particles.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if no particle was sampled.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Appends the particles of another set.
    pub fn extend(&mut self, other: ParticleSet) {
        self.positions.extend(other.positions);
        self.orientations.extend(other.orientations);
    }
}

// =============================================================================
// SURFACE
// =============================================================================

/// Samples one particle per surface grid vertex.
///
/// The grid is resampled at `spacing` first; a changed spacing is stored on
/// the grid, so later calls on the same grid observe it. Orientations have z
/// along the surface normal.
///
/// # Arguments
///
/// * `grid` - Surface to sample, updated in place
/// * `spacing` - Particle spacing (pixels)
/// * `masked` - Drop vertices outside the grid's validity mask
pub fn sample_surface(grid: &mut SurfaceGrid, spacing: f64, masked: bool) -> SampleResult<ParticleSet> {
    if grid.set_separation(spacing)? {
        debug!(spacing, revision = grid.revision(), "surface separation changed");
    }
    let samples = grid.samples()?;

    let mut particles = ParticleSet::default();
    for ((&position, &orientation), &valid) in samples
        .positions()
        .iter()
        .zip(samples.orientations())
        .zip(samples.mask())
    {
        if masked && !valid {
            continue;
        }
        particles.positions.push(position);
        particles.orientations.push(orientation);
    }

    debug!(
        particles = particles.len(),
        total = samples.positions().len(),
        masked,
        "sampled surface"
    );
    Ok(particles)
}

// =============================================================================
// FILAMENT
// =============================================================================

/// Helical lattice parameters.
///
/// Angles are in degrees when `degrees` is set, radians otherwise; lengths
/// are in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelicalParams {
    /// Arclength advance between consecutive steps.
    pub rise: f64,
    /// Rotation added per step.
    pub twist: f64,
    /// Rotation of the first step.
    pub twist_offset: f64,
    /// Distance of particles from the axis.
    pub radial_offset: f64,
    /// Copies per step, evenly spread around the axis.
    pub symmetry_order: u32,
    /// Whether angles are given in degrees.
    pub degrees: bool,
}

impl HelicalParams {
    /// Untwisted, on-axis lattice with the given rise.
    pub fn with_rise(rise: f64) -> Self {
        Self {
            rise,
            twist: 0.0,
            twist_offset: 0.0,
            radial_offset: 0.0,
            symmetry_order: 1,
            degrees: true,
        }
    }
}

/// Samples a helical lattice along a filament.
///
/// Steps are taken every `rise` along the axis, starting at its first point.
/// At step `i` copy `k` is rotated about the axis by
/// `twist_offset + i·twist + k·(full turn / symmetry_order)` and displaced by
/// `radial_offset` in that direction. Output is step-major.
///
/// Orientations have z along the axis tangent and x along the radial
/// direction.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use tomo_geometry::HelicalFilament;
/// use tomo_sampler::{sample_filament, HelicalParams};
///
/// let filament = HelicalFilament::new(&[DVec3::ZERO, DVec3::new(0.0, 0.0, 100.0)]).unwrap();
/// let particles = sample_filament(&filament, &HelicalParams::with_rise(10.0)).unwrap();
/// assert_eq!(particles.len(), 11);
/// ```
pub fn sample_filament(filament: &HelicalFilament, params: &HelicalParams) -> SampleResult<ParticleSet> {
    let rise = positive("rise", params.rise)?;
    if params.symmetry_order == 0 {
        return Err(SampleError::invalid_parameter("symmetry_order", "must be >= 1"));
    }
    if !params.radial_offset.is_finite() || !params.twist.is_finite() || !params.twist_offset.is_finite() {
        return Err(SampleError::invalid_parameter("twist", "angles and offsets must be finite"));
    }

    let to_radians = |angle: f64| if params.degrees { angle.to_radians() } else { angle };
    let twist = to_radians(params.twist);
    let offset = to_radians(params.twist_offset);
    let order = params.symmetry_order as usize;
    let symmetry_step = TAU / order as f64;

    let stations = filament.stations(rise)?;
    let frames = filament.frames_at(&stations);

    let mut particles = ParticleSet {
        positions: Vec::with_capacity(frames.len() * order),
        orientations: Vec::with_capacity(frames.len() * order),
    };
    for (step, frame) in frames.iter().enumerate() {
        for copy in 0..order {
            let angle = offset + step as f64 * twist + copy as f64 * symmetry_step;
            let radial = frame.normal * angle.cos() + frame.binormal * angle.sin();
            particles.positions.push(frame.position + radial * params.radial_offset);
            particles.orientations.push(DMat3::from_cols(
                radial,
                frame.tangent.cross(radial),
                frame.tangent,
            ));
        }
    }

    debug!(
        steps = frames.len(),
        symmetry_order = order,
        particles = particles.len(),
        "sampled filament"
    );
    Ok(particles)
}

// =============================================================================
// SPHERE
// =============================================================================

/// Samples a sphere quasi-uniformly at a target spacing.
///
/// The count is `round(4πr² / spacing²)`; orientations have z pointing
/// outward along the radius.
pub fn sample_sphere(sphere: &Sphere, spacing: f64) -> SampleResult<ParticleSet> {
    let positions = sphere.surface_points(spacing)?;
    let orientations = positions
        .iter()
        .map(|&p| {
            let outward = sphere.outward(p);
            frame_from_normal(outward, outward.any_orthonormal_vector())
        })
        .collect();
    debug!(points = positions.len(), radius = sphere.radius, spacing, "sampled sphere");
    Ok(ParticleSet {
        positions,
        orientations,
    })
}

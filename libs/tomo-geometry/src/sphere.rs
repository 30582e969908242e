//! # Sphere
//!
//! Spheres picked as `(center, rim)` point pairs, and a deterministic
//! quasi-uniform point lattice on their surface.

use crate::error::{ensure_positive, GeometryError, GeometryResult};
use config::constants::{EPSILON, MIN_SPHERE_POINTS};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// A sphere given by center and radius (world coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Sphere center.
    pub center: DVec3,
    /// Sphere radius.
    pub radius: f64,
}

impl Sphere {
    /// Creates a sphere, rejecting non-positive radii.
    pub fn new(center: DVec3, radius: f64) -> GeometryResult<Self> {
        if !center.is_finite() {
            return Err(GeometryError::degenerate("sphere center is not finite"));
        }
        if radius.is_nan() || radius <= EPSILON {
            return Err(GeometryError::degenerate(format!(
                "sphere radius must be positive: {radius}"
            )));
        }
        Ok(Self { center, radius })
    }

    /// Creates a sphere from a center pick and a pick on its rim.
    pub fn from_pair(center: DVec3, rim: DVec3) -> GeometryResult<Self> {
        Self::new(center, center.distance(rim))
    }

    /// Surface area `4πr²`.
    #[inline]
    pub fn area(&self) -> f64 {
        4.0 * PI * self.radius * self.radius
    }

    /// Number of lattice points for a target spacing: `area / spacing²`.
    pub fn point_count(&self, spacing: f64) -> GeometryResult<usize> {
        let spacing = ensure_positive("spacing", spacing)?;
        let count = (self.area() / (spacing * spacing)).round() as usize;
        Ok(count.max(MIN_SPHERE_POINTS))
    }

    /// Quasi-uniform surface points at a target spacing (Fibonacci lattice).
    ///
    /// # Example
    ///
    /// ```rust
    /// use glam::DVec3;
    /// use tomo_geometry::sphere::Sphere;
    ///
    /// let sphere = Sphere::new(DVec3::ZERO, 10.0).unwrap();
    /// let points = sphere.surface_points(2.0).unwrap();
    /// assert_eq!(points.len(), 314);
    /// ```
    pub fn surface_points(&self, spacing: f64) -> GeometryResult<Vec<DVec3>> {
        let count = self.point_count(spacing)?;
        Ok(fibonacci_directions(count)
            .into_iter()
            .map(|d| self.center + d * self.radius)
            .collect())
    }

    /// Outward unit normal at a point on (or near) the surface.
    #[inline]
    pub fn outward(&self, point: DVec3) -> DVec3 {
        (point - self.center).normalize_or_zero()
    }
}

/// Unit vectors on a Fibonacci spiral, pole to pole.
fn fibonacci_directions(count: usize) -> Vec<DVec3> {
    let golden_ratio = (1.0 + 5.0_f64.sqrt()) * 0.5;
    let last = (count.max(2) - 1) as f64;
    (0..count)
        .map(|i| {
            let theta = TAU * (i as f64 / golden_ratio);
            let cos_phi = 1.0 - 2.0 * (i as f64 / last);
            let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
            DVec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
        })
        .collect()
}

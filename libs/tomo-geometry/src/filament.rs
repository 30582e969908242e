//! # Helical Filament
//!
//! A spline path through ordered picks, used as the axis of helical
//! lattices and as the sweep path for filament resampling.

use crate::error::{ensure_positive, GeometryResult};
use crate::frames::parallel_transport;
use crate::spline::SplineCurve;
use glam::{DMat3, DVec3};

/// A spline axis supporting helical-symmetric sampling.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use tomo_geometry::filament::HelicalFilament;
///
/// let filament = HelicalFilament::new(&[DVec3::ZERO, DVec3::new(0.0, 0.0, 100.0)]).unwrap();
/// assert_eq!(filament.sample(5).len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct HelicalFilament {
    spline: SplineCurve,
}

/// Local frame on the filament axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisFrame {
    /// Position on the axis.
    pub position: DVec3,
    /// Unit tangent (filament direction).
    pub tangent: DVec3,
    /// Unit normal, transported along the axis with minimal twist.
    pub normal: DVec3,
    /// `tangent × normal`.
    pub binormal: DVec3,
}

impl AxisFrame {
    /// Frame as a rotation with x = normal, y = binormal, z = tangent.
    pub fn rotation(&self) -> DMat3 {
        DMat3::from_cols(self.normal, self.binormal, self.tangent)
    }
}

impl HelicalFilament {
    /// Fits a filament through ordered world points.
    ///
    /// Consecutive duplicates are removed before fitting.
    pub fn new(points: &[DVec3]) -> GeometryResult<Self> {
        let spline = SplineCurve::fit(points, false)?;
        Ok(Self { spline })
    }

    /// Returns the underlying spline.
    #[inline]
    pub fn spline(&self) -> &SplineCurve {
        &self.spline
    }

    /// Returns the arclength of the filament axis.
    #[inline]
    pub fn length(&self) -> f64 {
        self.spline.length()
    }

    /// Samples `count` points evenly along the axis, endpoints included.
    pub fn sample(&self, count: usize) -> Vec<DVec3> {
        self.spline.sample_evenly(count)
    }

    /// Arclength stations `0, spacing, 2·spacing, …` along the axis.
    pub fn stations(&self, spacing: f64) -> GeometryResult<Vec<f64>> {
        let spacing = ensure_positive("spacing", spacing)?;
        Ok(self.spline.stations_at_spacing(spacing))
    }

    /// Returns minimal-twist frames at the given arclength stations.
    pub fn frames_at(&self, stations: &[f64]) -> Vec<AxisFrame> {
        let tangents: Vec<DVec3> = stations
            .iter()
            .map(|&s| self.spline.tangent_at_length(s))
            .collect();
        stations
            .iter()
            .zip(tangents.iter())
            .zip(parallel_transport(&tangents))
            .map(|((&s, &tangent), (normal, binormal))| AxisFrame {
                position: self.spline.point_at_length(s),
                tangent,
                normal,
                binormal,
            })
            .collect()
    }
}

//! # Surface Grid
//!
//! A quad surface interpolated through an ordered stack of boundary lines.
//!
//! ## Construction
//!
//! ```text
//! boundary lines ──spline──▶ stations along u ──column splines──▶ grid (v × u)
//! ```
//!
//! 1. Every boundary line gets its own spline (u direction)
//! 2. Lines are resampled at common stations: open lines at fixed physical
//!    offsets around their midpoint, closed lines at evenly spaced fractions
//!    of their perimeter (phase-aligned to the previous line)
//! 3. Each station column gets a spline across the lines (v direction),
//!    resampled at the grid separation
//! 4. Normals are `∂u × ∂v`; an optional inside point flips the grid so
//!    normals point away from it
//!
//! ## Validity mask
//!
//! A station beyond an open line's own extent is extrapolated by clamping and
//! is marked invalid; an interpolated grid sample is valid only when both
//! lines bracketing it are valid at its column.
//!
//! ## Parameters and caching
//!
//! `separation` is coupled to the sampled grid. Changing it through
//! [`SurfaceGrid::set_separation`] bumps [`SurfaceGrid::revision`] and drops
//! the cached samples; they are recomputed on next access.

use crate::error::{ensure_positive, GeometryError, GeometryResult};
use crate::frames::frame_from_normal;
use crate::spline::SplineCurve;
use config::constants::{
    spacing_is_close, EPSILON, MIN_SURFACE_LINES, STATION_EXTENT_RTOL, STEP_COUNT_RTOL,
};
use glam::{DMat3, DVec3};
use tracing::debug;

/// A spline-interpolated quad surface parameterized by sample separation.
#[derive(Debug, Clone)]
pub struct SurfaceGrid {
    lines: Vec<SplineCurve>,
    separation: f64,
    closed: bool,
    inside_point: Option<DVec3>,
    revision: u64,
    cache: Option<GridSamples>,
}

/// Dense samples of a [`SurfaceGrid`] at its current separation.
///
/// Samples are stored row-major: `rows` along v (across lines), `cols` along
/// u (along lines).
#[derive(Debug, Clone, PartialEq)]
pub struct GridSamples {
    rows: usize,
    cols: usize,
    wraps: bool,
    positions: Vec<DVec3>,
    normals: Vec<DVec3>,
    orientations: Vec<DMat3>,
    mask: Vec<bool>,
}

impl SurfaceGrid {
    /// Fits a surface through ordered world-space boundary lines.
    ///
    /// # Arguments
    ///
    /// * `lines` - Boundary polylines, ordered across the surface
    /// * `separation` - Target sample spacing (pixels)
    /// * `closed` - Whether every line is a closed loop
    /// * `inside_point` - Optional point the normals should face away from
    ///
    /// # Errors
    ///
    /// Fit failures ([`GeometryError::is_fit_failure`]) for lines with fewer
    /// than two distinct points, fewer than two usable lines, or coincident
    /// lines.
    pub fn new(
        lines: &[Vec<DVec3>],
        separation: f64,
        closed: bool,
        inside_point: Option<DVec3>,
    ) -> GeometryResult<Self> {
        let separation = ensure_positive("separation", separation)?;
        if lines.len() < MIN_SURFACE_LINES {
            return Err(GeometryError::InsufficientLines {
                expected: MIN_SURFACE_LINES,
                actual: lines.len(),
            });
        }

        let lines = lines
            .iter()
            .map(|line| SplineCurve::fit(line, closed))
            .collect::<GeometryResult<Vec<_>>>()?;

        let mut grid = Self {
            lines,
            separation,
            closed,
            inside_point,
            revision: 0,
            cache: None,
        };
        // Sample eagerly so degenerate stacks fail at construction.
        grid.samples()?;
        Ok(grid)
    }

    /// Returns the current sample separation.
    #[inline]
    pub fn separation(&self) -> f64 {
        self.separation
    }

    /// Returns how many times the separation has changed since construction.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns true if the boundary lines are closed loops.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the inside point used to orient normals.
    #[inline]
    pub fn inside_point(&self) -> Option<DVec3> {
        self.inside_point
    }

    /// Returns the fitted boundary lines.
    #[inline]
    pub fn lines(&self) -> &[SplineCurve] {
        &self.lines
    }

    /// Re-synchronizes the separation with a requested spacing.
    ///
    /// Returns `true` if the spacing differed (within `isclose` tolerances) and
    /// the cached samples were invalidated.
    pub fn set_separation(&mut self, spacing: f64) -> GeometryResult<bool> {
        let spacing = ensure_positive("separation", spacing)?;
        if spacing_is_close(self.separation, spacing) {
            return Ok(false);
        }
        debug!(from = self.separation, to = spacing, "surface grid separation changed");
        self.separation = spacing;
        self.revision += 1;
        self.cache = None;
        Ok(true)
    }

    /// Returns true if samples for the current separation are cached.
    #[inline]
    pub fn is_sampled(&self) -> bool {
        self.cache.is_some()
    }

    /// Returns the samples at the current separation, computing them if needed.
    pub fn samples(&mut self) -> GeometryResult<&GridSamples> {
        let samples = match self.cache.take() {
            Some(samples) => samples,
            None => self.compute_samples()?,
        };
        Ok(self.cache.insert(samples))
    }

    // -------------------------------------------------------------------------
    // Sampling
    // -------------------------------------------------------------------------

    fn compute_samples(&self) -> GeometryResult<GridSamples> {
        let (control, valid) = if self.closed {
            self.closed_stations()
        } else {
            self.open_stations()
        };
        let cols = control[0].len();

        // Column splines across the lines.
        let mut columns = Vec::with_capacity(cols);
        let mut mean_length = 0.0;
        for j in 0..cols {
            let column: Vec<DVec3> = control.iter().map(|row| row[j]).collect();
            let spline = SplineCurve::fit(&column, false)?;
            mean_length += spline.length() / cols as f64;
            columns.push((spline, chord_fractions(&column)));
        }

        let rows = ((mean_length / self.separation).round() as usize + 1).max(2);
        let mut positions = vec![DVec3::ZERO; rows * cols];
        let mut mask = vec![true; rows * cols];
        for (j, (spline, fractions)) in columns.iter().enumerate() {
            for (k, point) in spline.sample_evenly(rows).into_iter().enumerate() {
                positions[k * cols + j] = point;
                let f = k as f64 / (rows - 1) as f64;
                let upper = fractions
                    .partition_point(|&x| x < f)
                    .clamp(1, fractions.len() - 1);
                mask[k * cols + j] = valid[upper - 1][j] && valid[upper][j];
            }
        }

        let mut samples = GridSamples::from_positions(rows, cols, self.closed, positions, mask);
        if let Some(inside) = self.inside_point {
            if samples.faces_toward(inside) {
                samples = samples.reversed_columns();
            }
        }

        debug!(
            rows,
            cols,
            separation = self.separation,
            valid = samples.valid_count(),
            "sampled surface grid"
        );
        Ok(samples)
    }

    /// Stations for open lines: fixed physical offsets around each midpoint.
    fn open_stations(&self) -> (Vec<Vec<DVec3>>, Vec<Vec<bool>>) {
        let longest = self.lines.iter().map(SplineCurve::length).fold(0.0, f64::max);
        let cols = ((longest / self.separation + STEP_COUNT_RTOL).floor() as usize + 1).max(2);
        let half_span = (cols - 1) as f64 * 0.5;
        let tolerance = self.separation * STATION_EXTENT_RTOL;

        let mut control = Vec::with_capacity(self.lines.len());
        let mut valid = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            let length = line.length();
            let mut row = Vec::with_capacity(cols);
            let mut row_valid = Vec::with_capacity(cols);
            for j in 0..cols {
                let s = length * 0.5 + (j as f64 - half_span) * self.separation;
                row_valid.push(s >= -tolerance && s <= length + tolerance);
                row.push(line.point_at_length(s));
            }
            control.push(row);
            valid.push(row_valid);
        }
        (control, valid)
    }

    /// Stations for closed lines: even fractions, phase-aligned line to line.
    fn closed_stations(&self) -> (Vec<Vec<DVec3>>, Vec<Vec<bool>>) {
        let cols = self
            .lines
            .iter()
            .map(|line| (line.length() / self.separation).ceil() as usize)
            .max()
            .unwrap_or(0)
            .max(3);

        let mut control: Vec<Vec<DVec3>> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            let row = line.sample_evenly(cols);
            let row = match control.last() {
                Some(previous) => align_loop(previous, row),
                None => row,
            };
            control.push(row);
        }
        let valid = vec![vec![true; cols]; self.lines.len()];
        (control, valid)
    }
}

impl GridSamples {
    fn from_positions(
        rows: usize,
        cols: usize,
        wraps: bool,
        positions: Vec<DVec3>,
        mask: Vec<bool>,
    ) -> Self {
        let mut normals = Vec::with_capacity(rows * cols);
        let mut orientations = Vec::with_capacity(rows * cols);
        for k in 0..rows {
            for j in 0..cols {
                let du = derivative(&positions, cols, wraps, |jj| k * cols + jj, j);
                let dv = derivative(&positions, rows, false, |kk| kk * cols + j, k);
                let normal = du.cross(dv).normalize_or_zero();
                normals.push(normal);
                orientations.push(frame_from_normal(normal, du));
            }
        }
        Self {
            rows,
            cols,
            wraps,
            positions,
            normals,
            orientations,
            mask,
        }
    }

    /// Number of rows (v direction, across lines).
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (u direction, along lines).
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns true if the u direction wraps around (closed lines).
    #[inline]
    pub fn wraps(&self) -> bool {
        self.wraps
    }

    /// Sample positions, row-major.
    #[inline]
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    /// Unit surface normals, row-major.
    #[inline]
    pub fn normals(&self) -> &[DVec3] {
        &self.normals
    }

    /// Orientation frames with z along the normal, row-major.
    #[inline]
    pub fn orientations(&self) -> &[DMat3] {
        &self.orientations
    }

    /// Validity mask, row-major.
    #[inline]
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Number of samples inside the validity mask.
    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// Row-major index of the sample at `(row, col)`.
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// True if most normals point toward `point`.
    fn faces_toward(&self, point: DVec3) -> bool {
        let votes: f64 = self
            .positions
            .iter()
            .zip(&self.normals)
            .map(|(p, n)| n.dot(*p - point).signum())
            .sum();
        votes < 0.0
    }

    /// Mirrors the u direction, which flips every normal.
    fn reversed_columns(self) -> Self {
        let mut positions = Vec::with_capacity(self.positions.len());
        let mut mask = Vec::with_capacity(self.mask.len());
        for k in 0..self.rows {
            for j in (0..self.cols).rev() {
                positions.push(self.positions[k * self.cols + j]);
                mask.push(self.mask[k * self.cols + j]);
            }
        }
        Self::from_positions(self.rows, self.cols, self.wraps, positions, mask)
    }
}

/// Finite-difference derivative along one grid direction.
fn derivative(
    positions: &[DVec3],
    len: usize,
    wraps: bool,
    at: impl Fn(usize) -> usize,
    i: usize,
) -> DVec3 {
    if wraps {
        let prev = (i + len - 1) % len;
        let next = (i + 1) % len;
        return positions[at(next)] - positions[at(prev)];
    }
    let prev = i.saturating_sub(1);
    let next = (i + 1).min(len - 1);
    positions[at(next)] - positions[at(prev)]
}

/// Cumulative chord length of a polyline, normalized to `[0, 1]`.
fn chord_fractions(points: &[DVec3]) -> Vec<f64> {
    let mut fractions = Vec::with_capacity(points.len());
    let mut total = 0.0;
    fractions.push(0.0);
    for pair in points.windows(2) {
        total += pair[0].distance(pair[1]);
        fractions.push(total);
    }
    if total > EPSILON {
        for f in &mut fractions {
            *f /= total;
        }
    }
    fractions
}

/// Rotates (and possibly reverses) a closed loop to best match `reference`.
fn align_loop(reference: &[DVec3], row: Vec<DVec3>) -> Vec<DVec3> {
    let n = row.len();
    let reversed: Vec<DVec3> = row.iter().rev().copied().collect();

    let mut best = (f64::INFINITY, false, 0);
    for (is_reversed, candidate) in [(false, &row), (true, &reversed)] {
        for shift in 0..n {
            let cost: f64 = (0..n)
                .map(|i| reference[i].distance_squared(candidate[(i + shift) % n]))
                .sum();
            if cost < best.0 {
                best = (cost, is_reversed, shift);
            }
        }
    }

    let source = if best.1 { &reversed } else { &row };
    (0..n).map(|i| source[(i + best.2) % n]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn straight_lines(count: usize, length: f64, gap: f64) -> Vec<Vec<DVec3>> {
        (0..count)
            .map(|i| {
                let y = i as f64 * gap;
                vec![DVec3::new(0.0, y, 0.0), DVec3::new(length, y, 0.0)]
            })
            .collect()
    }

    fn ring(z: f64, radius: f64, count: usize, phase: f64) -> Vec<DVec3> {
        (0..count)
            .map(|i| {
                let a = phase + TAU * i as f64 / count as f64;
                DVec3::new(radius * a.cos(), radius * a.sin(), z)
            })
            .collect()
    }

    #[test]
    fn test_planar_grid_dimensions() {
        let mut grid = SurfaceGrid::new(&straight_lines(3, 100.0, 10.0), 10.0, false, None).unwrap();
        let samples = grid.samples().unwrap();
        assert_eq!(samples.cols(), 11);
        assert_eq!(samples.rows(), 3);
        assert_eq!(samples.positions().len(), 33);
        assert_eq!(samples.valid_count(), 33);
        for n in samples.normals() {
            assert_relative_eq!(n.z.abs(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_inside_point_orients_normals() {
        let lines = straight_lines(3, 100.0, 10.0);
        let mut above = SurfaceGrid::new(&lines, 10.0, false, Some(DVec3::new(50.0, 10.0, 20.0))).unwrap();
        let mut below = SurfaceGrid::new(&lines, 10.0, false, Some(DVec3::new(50.0, 10.0, -20.0))).unwrap();
        assert!(above.samples().unwrap().normals().iter().all(|n| n.z < 0.0));
        assert!(below.samples().unwrap().normals().iter().all(|n| n.z > 0.0));
    }

    #[test]
    fn test_shorter_line_is_masked() {
        let lines = vec![
            vec![DVec3::new(0.0, 0.0, 0.0), DVec3::new(100.0, 0.0, 0.0)],
            vec![DVec3::new(25.0, 10.0, 0.0), DVec3::new(75.0, 10.0, 0.0)],
        ];
        let mut grid = SurfaceGrid::new(&lines, 10.0, false, None).unwrap();
        let samples = grid.samples().unwrap();
        assert_eq!(samples.cols(), 11);
        // Only the five central stations fall inside the 50-long line.
        assert_eq!(samples.valid_count(), samples.rows() * 5);
        assert!(!samples.mask()[0]);
        assert!(samples.mask()[samples.index(0, 5)]);
    }

    #[test]
    fn test_separation_change_invalidates_cache() {
        let mut grid = SurfaceGrid::new(&straight_lines(2, 100.0, 10.0), 10.0, false, None).unwrap();
        assert!(grid.is_sampled());
        assert!(!grid.set_separation(10.0 + 1e-9).unwrap());
        assert_eq!(grid.revision(), 0);

        assert!(grid.set_separation(5.0).unwrap());
        assert_eq!(grid.revision(), 1);
        assert!(!grid.is_sampled());
        assert_eq!(grid.samples().unwrap().cols(), 21);
        assert!(grid.is_sampled());
    }

    #[test]
    fn test_closed_tube_aligns_phases() {
        let lines = vec![ring(0.0, 20.0, 16, 0.0), ring(10.0, 20.0, 16, 1.3), ring(20.0, 20.0, 16, 2.1)];
        let mut grid = SurfaceGrid::new(&lines, 5.0, true, None).unwrap();
        let samples = grid.samples().unwrap();
        assert!(samples.wraps());
        assert_eq!(samples.cols(), (TAU * 20.0 / 5.0).ceil() as usize);
        // Aligned columns drift by less than one station between the ends.
        for j in 0..samples.cols() {
            let a = samples.positions()[samples.index(0, j)];
            let b = samples.positions()[samples.index(samples.rows() - 1, j)];
            assert!(DVec3::new(a.x - b.x, a.y - b.y, 0.0).length() < 5.0);
        }
        // Tube normals are radial.
        for (p, n) in samples.positions().iter().zip(samples.normals()) {
            let radial = DVec3::new(p.x, p.y, 0.0).normalize();
            assert!(n.dot(radial).abs() > 0.9);
        }
    }

    #[test]
    fn test_single_line_fails() {
        let err = SurfaceGrid::new(&straight_lines(1, 10.0, 1.0), 1.0, false, None).unwrap_err();
        assert!(err.is_fit_failure());
    }

    #[test]
    fn test_degenerate_line_fails() {
        let lines = vec![vec![DVec3::ZERO, DVec3::X * 10.0], vec![DVec3::ONE, DVec3::ONE]];
        let err = SurfaceGrid::new(&lines, 1.0, false, None).unwrap_err();
        assert!(err.is_fit_failure());
    }
}

//! # Spline Curves
//!
//! Interpolating cubic splines through ordered 3D points.
//!
//! ## Algorithm
//!
//! 1. Drop consecutive duplicate points (the chord-length parameter must be
//!    strictly increasing)
//! 2. Parameterize by cumulative chord length
//! 3. Solve the natural cubic spline tridiagonal system per axis (Thomas
//!    algorithm, all three axes at once as `DVec3`)
//! 4. Tabulate arclength so positions can be addressed by distance along the
//!    curve
//!
//! Closed curves are fitted on a sequence padded with
//! [`CLOSED_SPLINE_PADDING`] wrapped points on both ends; only the parameter
//! range of the original loop is used.

use crate::error::{GeometryError, GeometryResult};
use config::constants::{
    ARC_LENGTH_SAMPLES_PER_SEGMENT, CLOSED_SPLINE_PADDING, EPSILON, MIN_SPLINE_POINTS,
    STEP_COUNT_RTOL,
};
use glam::DVec3;

/// A cubic spline curve addressed by arclength.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use tomo_geometry::spline::SplineCurve;
///
/// let curve = SplineCurve::fit(&[DVec3::ZERO, DVec3::new(0.0, 0.0, 100.0)], false).unwrap();
/// assert!((curve.length() - 100.0).abs() < 1e-9);
/// let mid = curve.point_at_length(50.0);
/// assert!((mid.z - 50.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct SplineCurve {
    /// Chord-length parameter at every fitted point.
    knots: Vec<f64>,
    /// Fitted points (padded for closed curves).
    values: Vec<DVec3>,
    /// Second derivatives at every knot.
    second: Vec<DVec3>,
    /// Parameter range covered by the curve.
    domain: (f64, f64),
    /// Arclength lookup: parameters and cumulative lengths.
    arc_params: Vec<f64>,
    arc_lengths: Vec<f64>,
    /// Distinct input points the curve interpolates.
    control: Vec<DVec3>,
    closed: bool,
}

impl SplineCurve {
    /// Fewest distinct points [`SplineCurve::fit`] accepts.
    #[inline]
    pub fn min_points(closed: bool) -> usize {
        if closed {
            MIN_SPLINE_POINTS + 1
        } else {
            MIN_SPLINE_POINTS
        }
    }

    /// Fits a spline through `points`.
    ///
    /// # Arguments
    ///
    /// * `points` - Ordered world points
    /// * `closed` - Whether the curve returns to its first point
    ///
    /// # Errors
    ///
    /// Fails with [`GeometryError::InsufficientPoints`] when fewer than two
    /// distinct points remain (three for closed curves).
    pub fn fit(points: &[DVec3], closed: bool) -> GeometryResult<Self> {
        if points.iter().any(|p| !p.is_finite()) {
            return Err(GeometryError::degenerate("non-finite point in curve"));
        }

        let mut control = dedup_consecutive(points);
        if closed {
            while control.len() > 1 && control[0].distance(control[control.len() - 1]) < EPSILON {
                control.pop();
            }
        }

        let required = Self::min_points(closed);
        if control.len() < required {
            return Err(GeometryError::InsufficientPoints {
                expected: required,
                actual: control.len(),
            });
        }

        let (values, first) = if closed {
            let n = control.len();
            let pad = CLOSED_SPLINE_PADDING.min(n);
            let seq: Vec<DVec3> = (0..n + 2 * pad + 1)
                .map(|i| control[(i + n - pad) % n])
                .collect();
            (seq, pad)
        } else {
            (control.clone(), 0)
        };

        let knots = chord_lengths(&values);
        let last = if closed { first + control.len() } else { values.len() - 1 };
        let domain = (knots[first], knots[last]);
        if domain.1 - domain.0 < EPSILON {
            return Err(GeometryError::degenerate("curve has zero length"));
        }

        let second = natural_second_derivatives(&knots, &values);
        let mut curve = Self {
            knots,
            values,
            second,
            domain,
            arc_params: Vec::new(),
            arc_lengths: Vec::new(),
            control,
            closed,
        };
        curve.tabulate_arclength(last - first);
        Ok(curve)
    }

    /// Returns the total arclength.
    #[inline]
    pub fn length(&self) -> f64 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Returns true if the curve is closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the distinct points the curve interpolates.
    #[inline]
    pub fn control_points(&self) -> &[DVec3] {
        &self.control
    }

    /// Returns the position at arclength `s`.
    ///
    /// Open curves clamp `s` to `[0, length]`, closed curves wrap it.
    pub fn point_at_length(&self, s: f64) -> DVec3 {
        self.evaluate(self.param_at_length(s))
    }

    /// Returns the unit tangent at arclength `s`.
    pub fn tangent_at_length(&self, s: f64) -> DVec3 {
        self.derivative(self.param_at_length(s)).normalize_or_zero()
    }

    /// Samples `count` points evenly spaced in arclength.
    ///
    /// Open curves include both endpoints; closed curves omit the repeated
    /// start point.
    pub fn sample_evenly(&self, count: usize) -> Vec<DVec3> {
        self.even_stations(count)
            .into_iter()
            .map(|s| self.point_at_length(s))
            .collect()
    }

    /// Arclength stations of [`Self::sample_evenly`].
    pub fn even_stations(&self, count: usize) -> Vec<f64> {
        let length = self.length();
        match count {
            0 => Vec::new(),
            1 => vec![0.0],
            _ => {
                let divisions = if self.closed { count } else { count - 1 };
                (0..count)
                    .map(|i| length * i as f64 / divisions as f64)
                    .collect()
            }
        }
    }

    /// Arclength stations `0, spacing, 2·spacing, …` up to the curve length.
    pub fn stations_at_spacing(&self, spacing: f64) -> Vec<f64> {
        let length = self.length();
        if spacing <= 0.0 || !spacing.is_finite() {
            return vec![0.0];
        }
        let steps = ((length + spacing * STEP_COUNT_RTOL) / spacing).floor() as usize;
        (0..=steps).map(|i| i as f64 * spacing).collect()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn param_at_length(&self, s: f64) -> f64 {
        let length = self.length();
        let s = if self.closed && length > 0.0 {
            s.rem_euclid(length)
        } else {
            s.clamp(0.0, length)
        };

        let idx = self.arc_lengths.partition_point(|&l| l < s);
        if idx == 0 {
            return self.arc_params[0];
        }
        if idx >= self.arc_lengths.len() {
            return self.domain.1;
        }
        let (l0, l1) = (self.arc_lengths[idx - 1], self.arc_lengths[idx]);
        let (t0, t1) = (self.arc_params[idx - 1], self.arc_params[idx]);
        if l1 - l0 < EPSILON {
            t0
        } else {
            t0 + (t1 - t0) * (s - l0) / (l1 - l0)
        }
    }

    fn tabulate_arclength(&mut self, segments: usize) {
        let samples = segments.max(1) * ARC_LENGTH_SAMPLES_PER_SEGMENT;
        let (t_start, t_end) = self.domain;
        let mut params = Vec::with_capacity(samples + 1);
        let mut lengths = Vec::with_capacity(samples + 1);

        let mut previous = self.evaluate(t_start);
        let mut total = 0.0;
        params.push(t_start);
        lengths.push(0.0);
        for k in 1..=samples {
            let t = t_start + (t_end - t_start) * k as f64 / samples as f64;
            let point = self.evaluate(t);
            total += point.distance(previous);
            previous = point;
            params.push(t);
            lengths.push(total);
        }

        self.arc_params = params;
        self.arc_lengths = lengths;
    }

    fn segment(&self, t: f64) -> usize {
        let idx = self.knots.partition_point(|&k| k <= t);
        idx.saturating_sub(1).min(self.knots.len() - 2)
    }

    fn evaluate(&self, t: f64) -> DVec3 {
        let i = self.segment(t);
        let h = self.knots[i + 1] - self.knots[i];
        let a = self.knots[i + 1] - t;
        let b = t - self.knots[i];
        let (m0, m1) = (self.second[i], self.second[i + 1]);
        let (p0, p1) = (self.values[i], self.values[i + 1]);

        m0 * (a * a * a / (6.0 * h))
            + m1 * (b * b * b / (6.0 * h))
            + (p0 / h - m0 * (h / 6.0)) * a
            + (p1 / h - m1 * (h / 6.0)) * b
    }

    fn derivative(&self, t: f64) -> DVec3 {
        let i = self.segment(t);
        let h = self.knots[i + 1] - self.knots[i];
        let a = self.knots[i + 1] - t;
        let b = t - self.knots[i];
        let (m0, m1) = (self.second[i], self.second[i + 1]);
        let (p0, p1) = (self.values[i], self.values[i + 1]);

        -m0 * (a * a / (2.0 * h)) + m1 * (b * b / (2.0 * h)) - (p0 / h - m0 * (h / 6.0))
            + (p1 / h - m1 * (h / 6.0))
    }
}

/// Removes consecutive points closer than [`EPSILON`].
pub fn dedup_consecutive(points: &[DVec3]) -> Vec<DVec3> {
    let mut out: Vec<DVec3> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().map_or(true, |last| last.distance(p) >= EPSILON) {
            out.push(p);
        }
    }
    out
}

fn chord_lengths(points: &[DVec3]) -> Vec<f64> {
    let mut knots = Vec::with_capacity(points.len());
    let mut total = 0.0;
    knots.push(0.0);
    for pair in points.windows(2) {
        total += pair[0].distance(pair[1]);
        knots.push(total);
    }
    knots
}

/// Solves for second derivatives with natural end conditions.
fn natural_second_derivatives(knots: &[f64], values: &[DVec3]) -> Vec<DVec3> {
    let n = values.len();
    let mut second = vec![DVec3::ZERO; n];
    if n < 3 {
        return second;
    }

    // Thomas algorithm on the interior unknowns 1..n-1.
    let mut diag = vec![0.0; n];
    let mut rhs = vec![DVec3::ZERO; n];
    let mut upper = vec![0.0; n];
    for i in 1..n - 1 {
        let h0 = knots[i] - knots[i - 1];
        let h1 = knots[i + 1] - knots[i];
        diag[i] = 2.0 * (h0 + h1);
        upper[i] = h1;
        rhs[i] = ((values[i + 1] - values[i]) / h1 - (values[i] - values[i - 1]) / h0) * 6.0;
        if i > 1 {
            let w = h0 / diag[i - 1];
            diag[i] -= w * upper[i - 1];
            rhs[i] = rhs[i] - rhs[i - 1] * w;
        }
    }

    second[n - 2] = rhs[n - 2] / diag[n - 2];
    for i in (1..n - 2).rev() {
        second[i] = (rhs[i] - second[i + 1] * upper[i]) / diag[i];
    }
    second
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn circle(radius: f64, count: usize) -> Vec<DVec3> {
        (0..count)
            .map(|i| {
                let a = TAU * i as f64 / count as f64;
                DVec3::new(radius * a.cos(), radius * a.sin(), 0.0)
            })
            .collect()
    }

    #[test]
    fn test_straight_line_is_exact() {
        let curve = SplineCurve::fit(&[DVec3::ZERO, DVec3::new(0.0, 0.0, 100.0)], false).unwrap();
        assert_relative_eq!(curve.length(), 100.0, epsilon = 1e-9);
        for s in [0.0, 10.0, 37.5, 100.0] {
            assert_relative_eq!(curve.point_at_length(s).z, s, epsilon = 1e-9);
        }
        assert_relative_eq!(curve.tangent_at_length(20.0).z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolates_control_points() {
        let pts = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(10.0, 5.0, 0.0),
            DVec3::new(20.0, 0.0, 3.0),
            DVec3::new(30.0, -4.0, 1.0),
        ];
        let curve = SplineCurve::fit(&pts, false).unwrap();
        for (i, p) in pts.iter().enumerate() {
            let fitted = curve.evaluate(curve.knots[i]);
            assert_relative_eq!(fitted.distance(*p), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_drops_consecutive_duplicates() {
        let pts = vec![DVec3::ZERO, DVec3::ZERO, DVec3::X, DVec3::X, DVec3::new(2.0, 0.0, 0.0)];
        let curve = SplineCurve::fit(&pts, false).unwrap();
        assert_eq!(curve.control_points().len(), 3);
    }

    #[test]
    fn test_single_distinct_point_fails() {
        let err = SplineCurve::fit(&[DVec3::ONE, DVec3::ONE], false).unwrap_err();
        assert_eq!(err, GeometryError::InsufficientPoints { expected: 2, actual: 1 });
    }

    #[test]
    fn test_closed_circle_length() {
        let curve = SplineCurve::fit(&circle(10.0, 24), true).unwrap();
        assert!(curve.is_closed());
        assert_relative_eq!(curve.length(), TAU * 10.0, max_relative = 1e-3);
        // Wrapping: one full turn returns to the start.
        let start = curve.point_at_length(0.0);
        let wrapped = curve.point_at_length(curve.length() * 2.0);
        assert_relative_eq!(start.distance(wrapped), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_closed_curve_drops_repeated_start() {
        let mut pts = circle(5.0, 8);
        pts.push(pts[0]);
        let curve = SplineCurve::fit(&pts, true).unwrap();
        assert_eq!(curve.control_points().len(), 8);
    }

    #[test]
    fn test_stations_include_far_endpoint() {
        let curve = SplineCurve::fit(&[DVec3::ZERO, DVec3::new(100.0, 0.0, 0.0)], false).unwrap();
        let stations = curve.stations_at_spacing(10.0);
        assert_eq!(stations.len(), 11);
        assert_relative_eq!(stations[10], 100.0);
    }

    #[test]
    fn test_even_samples_closed_skip_endpoint() {
        let curve = SplineCurve::fit(&circle(10.0, 16), true).unwrap();
        let samples = curve.sample_evenly(8);
        assert_eq!(samples.len(), 8);
        assert!(samples[0].distance(samples[7]) > 1.0);
    }
}

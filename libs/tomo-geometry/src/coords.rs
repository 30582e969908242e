//! # Coordinate Convention
//!
//! The viewer addresses volumes as `(z, y, x)` while every model in this
//! workspace works in `(x, y, z)`. Conversion is a reversal of the last axis
//! and must happen exactly once per boundary crossing: display points become
//! [`DVec3`] world points on the way in, and world points become
//! [`DisplayPoint`]s on the way out.

use glam::DVec3;

/// A point in display order `(z, y, x)`.
pub type DisplayPoint = [f64; 3];

/// Reverses the ordering of the last axis.
///
/// `invert` is an involution: applying it twice returns the input.
///
/// # Example
///
/// ```rust
/// use tomo_geometry::coords::Invert;
///
/// let p = [1.0, 2.0, 3.0];
/// assert_eq!(p.invert(), [3.0, 2.0, 1.0]);
/// assert_eq!(p.invert().invert(), p);
/// ```
pub trait Invert {
    /// Returns a copy with the last axis reversed.
    fn invert(&self) -> Self;
}

impl<T: Copy, const N: usize> Invert for [T; N] {
    fn invert(&self) -> Self {
        let mut out = *self;
        out.reverse();
        out
    }
}

impl Invert for DVec3 {
    fn invert(&self) -> Self {
        DVec3::new(self.z, self.y, self.x)
    }
}

impl<T: Invert> Invert for Vec<T> {
    fn invert(&self) -> Self {
        self.iter().map(Invert::invert).collect()
    }
}

/// Converts a display-ordered point into a world point.
#[inline]
pub fn to_world(point: DisplayPoint) -> DVec3 {
    DVec3::from_array(point.invert())
}

/// Converts a world point into display order.
#[inline]
pub fn to_display(point: DVec3) -> DisplayPoint {
    point.to_array().invert()
}

/// Converts a batch of display-ordered points into world points.
pub fn to_world_all(points: &[DisplayPoint]) -> Vec<DVec3> {
    points.iter().copied().map(to_world).collect()
}

/// Converts a batch of world points into display order.
pub fn to_display_all(points: &[DVec3]) -> Vec<DisplayPoint> {
    points.iter().copied().map(to_display).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert_is_involutive_for_arrays() {
        let batch: Vec<[f64; 3]> = (0..20)
            .map(|i| {
                let f = i as f64;
                [f * 0.5 - 3.0, f.sin() * 7.0, -f * f]
            })
            .collect();
        assert_eq!(batch.invert().invert(), batch);
    }

    #[test]
    fn test_invert_is_involutive_for_other_lengths() {
        let p2 = [1, 2];
        let p4 = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(p2.invert(), [2, 1]);
        assert_eq!(p4.invert().invert(), p4);
    }

    #[test]
    fn test_invert_faces_reverses_winding() {
        let face: [u32; 3] = [0, 1, 2];
        assert_eq!(face.invert(), [2, 1, 0]);
    }

    #[test]
    fn test_world_display_round_trip() {
        let display = [10.0, 20.0, 30.0];
        let world = to_world(display);
        assert_eq!(world, DVec3::new(30.0, 20.0, 10.0));
        assert_eq!(to_display(world), display);
        assert_eq!(world.invert().invert(), world);
    }

    #[test]
    fn test_batch_conversion() {
        let display = vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let world = to_world_all(&display);
        assert_eq!(world[1], DVec3::new(6.0, 5.0, 4.0));
        assert_eq!(to_display_all(&world), display);
    }
}

//! # Orientation Frames
//!
//! Rotation matrices for sampled particles. A frame is a [`DMat3`] whose
//! columns are the particle's x, y and z axes in world coordinates; the z
//! axis is the direction the particle "points" (surface normal, filament
//! axis, sphere radius).

use config::constants::EPSILON;
use glam::{DMat3, DQuat, DVec3};

/// Builds a right-handed frame with `z` along `normal`.
///
/// `reference` picks the in-plane x direction; it is projected into the plane
/// orthogonal to `normal`, falling back to an arbitrary orthonormal vector
/// when the two are parallel.
pub fn frame_from_normal(normal: DVec3, reference: DVec3) -> DMat3 {
    let z = normal.normalize_or_zero();
    if z == DVec3::ZERO {
        return DMat3::IDENTITY;
    }
    let projected = reference - z * reference.dot(z);
    let x = if projected.length_squared() > EPSILON {
        projected.normalize()
    } else {
        z.any_orthonormal_vector()
    };
    let y = z.cross(x);
    DMat3::from_cols(x, y, z)
}

/// Propagates a normal along a sequence of unit tangents with minimal twist.
///
/// Returns one `(normal, binormal)` pair per tangent. The first normal is an
/// arbitrary vector orthogonal to the first tangent; every later one is the
/// previous normal rotated by the arc between consecutive tangents.
pub fn parallel_transport(tangents: &[DVec3]) -> Vec<(DVec3, DVec3)> {
    let mut frames = Vec::with_capacity(tangents.len());
    let Some(&first) = tangents.first() else {
        return frames;
    };

    let mut previous_tangent = first;
    let mut normal = first.any_orthonormal_vector();
    for &tangent in tangents {
        if previous_tangent.dot(tangent) > -1.0 + EPSILON {
            normal = DQuat::from_rotation_arc(previous_tangent, tangent) * normal;
        }
        // Re-orthogonalize against drift.
        normal = (normal - tangent * normal.dot(tangent)).normalize_or_zero();
        if normal == DVec3::ZERO {
            normal = tangent.any_orthonormal_vector();
        }
        frames.push((normal, tangent.cross(normal)));
        previous_tangent = tangent;
    }
    frames
}

/// Intrinsic ZYZ Euler rotation (RELION convention), angles in degrees.
///
/// # Example
///
/// ```rust
/// use glam::{DMat3, DVec3};
/// use tomo_geometry::frames::euler_zyz_degrees;
///
/// let m = euler_zyz_degrees(90.0, 0.0, 0.0);
/// assert!((m * DVec3::X - DVec3::Y).length() < 1e-12);
/// ```
pub fn euler_zyz_degrees(rot: f64, tilt: f64, psi: f64) -> DMat3 {
    let q = DQuat::from_rotation_z(rot.to_radians())
        * DQuat::from_rotation_y(tilt.to_radians())
        * DQuat::from_rotation_z(psi.to_radians());
    DMat3::from_quat(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_rotation(m: DMat3) {
        assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-9);
        let should_be_identity = m.transpose() * m;
        for (a, b) in should_be_identity
            .to_cols_array()
            .iter()
            .zip(DMat3::IDENTITY.to_cols_array())
        {
            assert_relative_eq!(*a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_frame_from_normal_is_rotation() {
        let m = frame_from_normal(DVec3::new(1.0, 2.0, 3.0), DVec3::X);
        assert_rotation(m);
        assert_relative_eq!(m.z_axis.dot(DVec3::new(1.0, 2.0, 3.0).normalize()), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_from_parallel_reference_falls_back() {
        let m = frame_from_normal(DVec3::Z, DVec3::Z);
        assert_rotation(m);
    }

    #[test]
    fn test_parallel_transport_straight_is_constant() {
        let frames = parallel_transport(&[DVec3::Z; 5]);
        assert_eq!(frames.len(), 5);
        for f in &frames {
            assert_relative_eq!(f.0.distance(frames[0].0), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_parallel_transport_stays_orthogonal() {
        let tangents: Vec<DVec3> = (0..20)
            .map(|i| {
                let a = i as f64 * 0.1;
                DVec3::new(a.cos(), a.sin(), 0.5).normalize()
            })
            .collect();
        for (t, (n, b)) in tangents.iter().zip(parallel_transport(&tangents)) {
            assert_relative_eq!(t.dot(n), 0.0, epsilon = 1e-9);
            assert_relative_eq!(b.length(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_euler_zyz_is_rotation() {
        assert_rotation(euler_zyz_degrees(30.0, 60.0, 120.0));
    }
}

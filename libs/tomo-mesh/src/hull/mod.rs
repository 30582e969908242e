//! # Convex Hull
//!
//! QuickHull algorithm for computing 3D convex hulls.
//!
//! ## Algorithm Overview
//!
//! QuickHull is a divide-and-conquer algorithm:
//! 1. Find extreme points to form initial simplex (tetrahedron)
//! 2. For each face, find the farthest point outside
//! 3. Create new faces from that point to the horizon edges
//! 4. Repeat until no points remain outside
//!
//! Sphere meshes are the hull of their surface samples.

mod quickhull;

#[cfg(test)]
mod tests;

pub use quickhull::convex_hull;

use crate::error::MeshResult;
use crate::mesh::Mesh;
use glam::DVec3;

/// Computes the hull of points and orients every face away from `center`.
///
/// QuickHull already winds faces outward; the explicit pass pins the
/// orientation to the owning geometry rather than to the hull centroid.
///
/// # Arguments
///
/// * `points` - Points on (or around) a convex body
/// * `center` - A point strictly inside the body
///
/// # Example
///
/// ```rust,ignore
/// let mesh = hull_around(&sphere.surface_points(spacing)?, sphere.center)?;
/// ```
pub fn hull_around(points: &[DVec3], center: DVec3) -> MeshResult<Mesh> {
    let mut mesh = convex_hull(points)?;
    let inward: Vec<usize> = (0..mesh.triangle_count())
        .filter(|&index| {
            let v0 = mesh.vertex(mesh.triangle(index)[0]);
            mesh.face_normal(index).dot(v0 - center) < 0.0
        })
        .collect();
    for index in inward {
        mesh.flip_face(index);
    }
    Ok(mesh)
}

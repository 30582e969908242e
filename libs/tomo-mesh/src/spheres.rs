//! # Sphere Meshes
//!
//! Each sphere is sampled at `radius / divisor` and hulled. Faces are then
//! oriented against the sphere center so every normal points outward.

use crate::colormap::{merge_colored, ColoredMesh};
use crate::error::{MeshError, MeshResult};
use crate::hull::hull_around;
use config::constants::PickingConfig;
use tomo_geometry::{Color, Sphere};
use tracing::debug;

/// Meshes spheres at the default density.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use tomo_geometry::Sphere;
/// use tomo_mesh::mesh_spheres;
///
/// let sphere = Sphere::new(DVec3::ZERO, 10.0).unwrap();
/// let colored = mesh_spheres(&[sphere], &[[1.0, 1.0, 1.0, 1.0]]).unwrap();
/// assert!(colored.mesh.validate());
/// ```
pub fn mesh_spheres(spheres: &[Sphere], colors: &[Color]) -> MeshResult<ColoredMesh> {
    mesh_spheres_with(spheres, colors, &PickingConfig::default())
}

/// Meshes spheres using the density divisor of `config`.
pub fn mesh_spheres_with(
    spheres: &[Sphere],
    colors: &[Color],
    config: &PickingConfig,
) -> MeshResult<ColoredMesh> {
    if spheres.is_empty() {
        return Err(MeshError::invalid_input("no spheres to mesh"));
    }
    if spheres.len() != colors.len() {
        return Err(MeshError::invalid_input(format!(
            "{} spheres but {} colors",
            spheres.len(),
            colors.len()
        )));
    }

    let parts = spheres
        .iter()
        .map(|sphere| {
            let points = sphere.surface_points(sphere.radius / config.sphere_mesh_divisor)?;
            hull_around(&points, sphere.center)
        })
        .collect::<MeshResult<Vec<_>>>()?;
    let colored = merge_colored(parts, colors);

    debug!(
        spheres = spheres.len(),
        vertices = colored.mesh.vertex_count(),
        triangles = colored.mesh.triangle_count(),
        "meshed spheres"
    );
    Ok(colored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    const WHITE: Color = [1.0, 1.0, 1.0, 1.0];

    #[test]
    fn test_sphere_mesh_density_is_scale_free() {
        let small = Sphere::new(DVec3::ZERO, 2.0).unwrap();
        let large = Sphere::new(DVec3::splat(100.0), 40.0).unwrap();
        let a = mesh_spheres(&[small], &[WHITE]).unwrap();
        let b = mesh_spheres(&[large], &[WHITE]).unwrap();
        // round(4π · 10²) samples regardless of radius.
        assert_eq!(a.mesh.vertex_count(), 1257);
        assert_eq!(a.mesh.vertex_count(), b.mesh.vertex_count());
    }

    #[test]
    fn test_every_sphere_face_points_outward() {
        let spheres = [
            Sphere::new(DVec3::new(0.0, 0.0, 0.0), 5.0).unwrap(),
            Sphere::new(DVec3::new(20.0, 0.0, 0.0), 3.0).unwrap(),
        ];
        let config = PickingConfig::new(10, 10, 4.0).unwrap();
        let colored = mesh_spheres_with(&spheres, &[WHITE, [1.0, 0.0, 0.0, 1.0]], &config).unwrap();
        let mesh = &colored.mesh;
        let values = mesh.values().unwrap();
        for (index, tri) in mesh.triangles().iter().enumerate() {
            let owner = if values[tri[0] as usize] == 0.0 { &spheres[0] } else { &spheres[1] };
            let v0 = mesh.vertex(tri[0]);
            assert!(mesh.face_normal(index).dot(v0 - owner.center) > 0.0);
        }
    }

    #[test]
    fn test_spheres_require_matching_colors() {
        let sphere = Sphere::new(DVec3::ZERO, 1.0).unwrap();
        assert!(mesh_spheres(&[sphere], &[]).is_err());
        assert!(mesh_spheres(&[], &[]).is_err());
    }
}

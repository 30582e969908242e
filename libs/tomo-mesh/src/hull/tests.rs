//! # Hull Integration Tests
//!
//! Tests for hulls of sphere samples.

use super::*;
use tomo_geometry::Sphere;

#[test]
fn test_hull_of_sphere_samples_keeps_every_point() {
    let sphere = Sphere::new(DVec3::new(10.0, 20.0, 30.0), 5.0).unwrap();
    let points = sphere.surface_points(1.0).unwrap();
    let mesh = hull_around(&points, sphere.center).unwrap();

    // Every sample lies on the sphere, so all are hull vertices.
    assert_eq!(mesh.vertex_count(), points.len());
    // Closed triangulated sphere: F = 2V - 4.
    assert_eq!(mesh.triangle_count(), 2 * points.len() - 4);
    assert!(mesh.validate());
}

#[test]
fn test_hull_around_faces_outward() {
    let sphere = Sphere::new(DVec3::ZERO, 3.0).unwrap();
    let mesh = hull_around(&sphere.surface_points(0.5).unwrap(), sphere.center).unwrap();
    for (index, tri) in mesh.triangles().iter().enumerate() {
        let v0 = mesh.vertex(tri[0]);
        assert!(mesh.face_normal(index).dot(v0 - sphere.center) > 0.0);
    }
}

#[test]
fn test_hull_preserves_bounding_box() {
    let sphere = Sphere::new(DVec3::ZERO, 4.0).unwrap();
    let mesh = hull_around(&sphere.surface_points(0.4).unwrap(), sphere.center).unwrap();
    let (min, max) = mesh.vertices().iter().fold(
        (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
        |(min, max), v| (min.min(*v), max.max(*v)),
    );
    assert!(min.cmpge(DVec3::splat(-4.0 - 1e-9)).all());
    assert!(max.cmple(DVec3::splat(4.0 + 1e-9)).all());
    assert!(max.z > 3.9 && min.z < -3.9);
}

#[test]
fn test_hull_of_collinear_samples_fails() {
    let points: Vec<DVec3> = (0..6).map(|i| DVec3::X * i as f64).collect();
    assert!(hull_around(&points, DVec3::ZERO).is_err());
}

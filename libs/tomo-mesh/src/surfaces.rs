//! # Surface Meshes
//!
//! Triangulates sampled surface grids. Each grid quad
//!
//! ```text
//! a=(k, j) ── b=(k, j+1)
//!    │            │
//! d=(k+1, j) ─ c=(k+1, j+1)
//! ```
//!
//! becomes triangles `(a, b, c)` and `(a, c, d)`, whose right-hand normal is
//! `∂u × ∂v`, the grid normal. Grids of closed lines also join the last
//! column to the first.

use crate::colormap::{merge_colored, ColoredMesh};
use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use tomo_geometry::{Color, GridSamples, SurfaceGrid};
use tracing::debug;

/// Triangulates every grid and merges the results.
///
/// Vertex values index `colors`, one entry per grid; see
/// [`crate::colormap::model_value`].
///
/// # Errors
///
/// Fails when no grid is given, when `colors` does not match `grids`, or when
/// a grid cannot be sampled.
pub fn mesh_surfaces(grids: &mut [SurfaceGrid], colors: &[Color]) -> MeshResult<ColoredMesh> {
    if grids.is_empty() {
        return Err(MeshError::invalid_input("no surface grids to mesh"));
    }
    if grids.len() != colors.len() {
        return Err(MeshError::invalid_input(format!(
            "{} surface grids but {} colors",
            grids.len(),
            colors.len()
        )));
    }

    let parts = grids
        .iter_mut()
        .map(|grid| Ok(triangulate_grid(grid.samples()?)))
        .collect::<MeshResult<Vec<_>>>()?;
    let colored = merge_colored(parts, colors);

    debug!(
        grids = grids.len(),
        vertices = colored.mesh.vertex_count(),
        triangles = colored.mesh.triangle_count(),
        "meshed surfaces"
    );
    Ok(colored)
}

/// Triangulates one sampled grid. Vertices keep the row-major sample order.
pub fn triangulate_grid(samples: &GridSamples) -> Mesh {
    let (rows, cols) = (samples.rows(), samples.cols());
    let quad_cols = if samples.wraps() { cols } else { cols.saturating_sub(1) };
    let mut mesh = Mesh::with_capacity(rows * cols, 2 * rows.saturating_sub(1) * quad_cols);

    for &position in samples.positions() {
        mesh.add_vertex(position);
    }

    for k in 0..rows.saturating_sub(1) {
        for j in 0..quad_cols {
            let next = (j + 1) % cols;
            let a = samples.index(k, j) as u32;
            let b = samples.index(k, next) as u32;
            let c = samples.index(k + 1, next) as u32;
            let d = samples.index(k + 1, j) as u32;
            mesh.add_triangle(a, b, c);
            mesh.add_triangle(a, c, d);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    const GREY: Color = [0.5, 0.5, 0.5, 1.0];

    fn straight_lines(count: usize, length: f64, gap: f64, z: f64) -> Vec<Vec<DVec3>> {
        (0..count)
            .map(|i| {
                let y = i as f64 * gap;
                vec![DVec3::new(0.0, y, z), DVec3::new(length, y, z)]
            })
            .collect()
    }

    #[test]
    fn test_open_grid_triangle_count() {
        let mut grid = SurfaceGrid::new(&straight_lines(3, 100.0, 10.0, 0.0), 10.0, false, None).unwrap();
        let samples = grid.samples().unwrap();
        let mesh = triangulate_grid(samples);
        assert_eq!(mesh.vertex_count(), samples.rows() * samples.cols());
        assert_eq!(
            mesh.triangle_count(),
            2 * (samples.rows() - 1) * (samples.cols() - 1)
        );
        assert!(mesh.validate());
    }

    #[test]
    fn test_faces_follow_grid_normals() {
        let inside = DVec3::new(50.0, 10.0, 20.0);
        let mut grid =
            SurfaceGrid::new(&straight_lines(3, 100.0, 10.0, 0.0), 10.0, false, Some(inside)).unwrap();
        let samples = grid.samples().unwrap();
        let mesh = triangulate_grid(samples);
        for (index, tri) in mesh.triangles().iter().enumerate() {
            let normal = mesh.face_normal(index);
            assert!(normal.dot(samples.normals()[tri[0] as usize]) > 0.0);
            // Away from the inside point.
            assert!(normal.dot(mesh.vertex(tri[0]) - inside) > 0.0);
        }
    }

    #[test]
    fn test_closed_grid_wraps_columns() {
        let ring = |z: f64| -> Vec<DVec3> {
            (0..24)
                .map(|i| {
                    let t = std::f64::consts::TAU * i as f64 / 24.0;
                    DVec3::new(20.0 * t.cos(), 20.0 * t.sin(), z)
                })
                .collect()
        };
        let lines = vec![ring(0.0), ring(10.0), ring(20.0)];
        let mut grid = SurfaceGrid::new(&lines, 5.0, true, Some(DVec3::new(0.0, 0.0, 10.0))).unwrap();
        let samples = grid.samples().unwrap();
        let mesh = triangulate_grid(samples);
        assert_eq!(mesh.triangle_count(), 2 * (samples.rows() - 1) * samples.cols());
        // Tube faces point away from the axis.
        for (index, tri) in mesh.triangles().iter().enumerate() {
            let p = mesh.vertex(tri[0]);
            assert!(mesh.face_normal(index).dot(DVec3::new(p.x, p.y, 0.0)) > 0.0);
        }
    }

    #[test]
    fn test_mesh_surfaces_offsets_and_ids() {
        let mut grids = vec![
            SurfaceGrid::new(&straight_lines(2, 50.0, 10.0, 0.0), 10.0, false, None).unwrap(),
            SurfaceGrid::new(&straight_lines(2, 50.0, 10.0, 30.0), 10.0, false, None).unwrap(),
        ];
        let colors = [[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0]];
        let colored = mesh_surfaces(&mut grids, &colors).unwrap();

        let per_grid = colored.mesh.vertex_count() / 2;
        let values = colored.mesh.values().unwrap();
        assert!(values[..per_grid].iter().all(|&v| v == 0.0));
        assert!(values[per_grid..].iter().all(|&v| v == 0.5));
        // Second grid's faces reference its own vertices.
        let last = colored.mesh.triangle(colored.mesh.triangle_count() - 1);
        assert!(last.iter().all(|&i| i as usize >= per_grid));
        assert_eq!(colored.colormap, colors.to_vec());
    }

    #[test]
    fn test_single_color_values_avoid_background() {
        let mut grids = vec![
            SurfaceGrid::new(&straight_lines(2, 50.0, 10.0, 0.0), 10.0, false, None).unwrap(),
        ];
        let colored = mesh_surfaces(&mut grids, &[GREY]).unwrap();
        assert!(colored.mesh.values().unwrap().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_mismatched_colors_rejected() {
        let mut grids = vec![
            SurfaceGrid::new(&straight_lines(2, 50.0, 10.0, 0.0), 10.0, false, None).unwrap(),
        ];
        assert!(matches!(
            mesh_surfaces(&mut grids, &[GREY, GREY]),
            Err(MeshError::InvalidInput { .. })
        ));
        assert!(mesh_surfaces(&mut [], &[]).is_err());
    }
}

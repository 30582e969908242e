//! # QuickHull Algorithm
//!
//! 3D convex hull computation using the QuickHull algorithm.
//! Based on the original algorithm by Barber, Dobkin, and Huhdanpaa.
//!
//! ## Algorithm Steps
//!
//! 1. Find 6 extreme points (min/max on each axis)
//! 2. Build initial tetrahedron from 4 non-coplanar points
//! 3. Assign remaining points to faces they're outside of
//! 4. For each face with outside points:
//!    a. Find farthest point
//!    b. Find horizon edges (boundary of visible faces)
//!    c. Create new faces from horizon to farthest point
//!    d. Reassign outside points to new faces
//! 5. Repeat until no faces have outside points
//!
//! Ordered collections keep the output identical from run to run; hull
//! vertices keep the relative order of the input points.

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use config::constants::EPSILON;
use glam::DVec3;
use std::collections::{BTreeMap, BTreeSet};

/// Plane tolerance relative to the extent of the point cloud.
const RELATIVE_TOLERANCE: f64 = 1e-9;

/// Computes the convex hull of a set of 3D points.
///
/// # Arguments
///
/// * `points` - Points to compute hull of (at least 4 non-coplanar)
///
/// # Returns
///
/// A closed mesh with outward winding.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use tomo_mesh::hull::convex_hull;
///
/// let points = vec![
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(1.0, 0.0, 0.0),
///     DVec3::new(0.0, 1.0, 0.0),
///     DVec3::new(0.0, 0.0, 1.0),
/// ];
/// let hull = convex_hull(&points).unwrap();
/// assert_eq!(hull.triangle_count(), 4);
/// ```
pub fn convex_hull(points: &[DVec3]) -> MeshResult<Mesh> {
    if points.len() < 4 {
        return Err(MeshError::degenerate("Convex hull requires at least 4 points"));
    }

    let unique_points = remove_duplicates(points);
    if unique_points.len() < 4 {
        return Err(MeshError::degenerate(
            "Convex hull requires at least 4 unique points",
        ));
    }

    let (min, max) = unique_points
        .iter()
        .fold((unique_points[0], unique_points[0]), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
    let tolerance = EPSILON.max((max - min).max_element() * RELATIVE_TOLERANCE);

    let faces = build_initial_simplex(&unique_points, tolerance)?;
    let final_faces = quickhull_iterate(faces, &unique_points, tolerance);

    Ok(faces_to_mesh(&final_faces, &unique_points))
}

/// A face of the convex hull (triangle).
#[derive(Debug, Clone)]
struct HullFace {
    /// Indices of the three vertices
    vertices: [usize; 3],
    /// Outward-pointing unit normal
    normal: DVec3,
    /// Distance from origin along normal
    distance: f64,
    /// Points outside this face (indices into points array)
    outside_points: Vec<usize>,
}

impl HullFace {
    fn new(v0: usize, v1: usize, v2: usize, points: &[DVec3]) -> Self {
        let p0 = points[v0];
        let normal = (points[v1] - p0).cross(points[v2] - p0).normalize_or_zero();
        Self {
            vertices: [v0, v1, v2],
            normal,
            distance: normal.dot(p0),
            outside_points: Vec::new(),
        }
    }

    fn signed_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.distance
    }

    fn is_outside(&self, point: DVec3, tolerance: f64) -> bool {
        self.signed_distance(point) > tolerance
    }

    /// Farthest outside point; ties resolve to the lowest index.
    fn farthest_point(&self, points: &[DVec3]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &idx in &self.outside_points {
            let d = self.signed_distance(points[idx]);
            if best.map_or(true, |(_, bd)| d > bd) {
                best = Some((idx, d));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

/// Removes duplicate points within EPSILON tolerance, keeping first occurrences.
fn remove_duplicates(points: &[DVec3]) -> Vec<DVec3> {
    let mut unique: Vec<DVec3> = Vec::with_capacity(points.len());
    for p in points {
        if !unique.iter().any(|u| u.distance(*p) < EPSILON) {
            unique.push(*p);
        }
    }
    unique
}

/// Builds the initial tetrahedron from extreme points.
fn build_initial_simplex(points: &[DVec3], tolerance: f64) -> MeshResult<Vec<HullFace>> {
    let mut extremes = [0usize; 6];
    for (i, p) in points.iter().enumerate() {
        for axis in 0..3 {
            if p[axis] < points[extremes[2 * axis]][axis] {
                extremes[2 * axis] = i;
            }
            if p[axis] > points[extremes[2 * axis + 1]][axis] {
                extremes[2 * axis + 1] = i;
            }
        }
    }

    let (p0, p1) = find_farthest_pair(&extremes, points);
    let p2 = find_farthest_from_line(p0, p1, points, tolerance)?;
    let p3 = find_farthest_from_plane(p0, p1, p2, points, tolerance)?;

    let centroid = (points[p0] + points[p1] + points[p2] + points[p3]) / 4.0;
    let mut faces = vec![
        create_face_outward(p0, p1, p2, centroid, points),
        create_face_outward(p0, p2, p3, centroid, points),
        create_face_outward(p0, p3, p1, centroid, points),
        create_face_outward(p1, p3, p2, centroid, points),
    ];

    let used = [p0, p1, p2, p3];
    for idx in (0..points.len()).filter(|i| !used.contains(i)) {
        assign_to_face(&mut faces, idx, points, tolerance);
    }

    Ok(faces)
}

fn assign_to_face(faces: &mut [HullFace], idx: usize, points: &[DVec3], tolerance: f64) {
    if let Some(face) = faces.iter_mut().find(|f| f.is_outside(points[idx], tolerance)) {
        face.outside_points.push(idx);
    }
}

/// Finds the pair of points with maximum distance.
fn find_farthest_pair(indices: &[usize], points: &[DVec3]) -> (usize, usize) {
    let mut max_dist = 0.0;
    let mut best = (indices[0], indices[1]);

    for (i, &a) in indices.iter().enumerate() {
        for &b in indices.iter().skip(i + 1) {
            let dist = points[a].distance_squared(points[b]);
            if dist > max_dist {
                max_dist = dist;
                best = (a, b);
            }
        }
    }
    best
}

/// Finds the point farthest from a line.
fn find_farthest_from_line(
    p0: usize,
    p1: usize,
    points: &[DVec3],
    tolerance: f64,
) -> MeshResult<usize> {
    let line_dir = (points[p1] - points[p0]).normalize_or_zero();
    let mut max_dist = tolerance;
    let mut best = None;

    for (i, p) in points.iter().enumerate() {
        if i == p0 || i == p1 {
            continue;
        }
        let v = *p - points[p0];
        let dist = (v - v.dot(line_dir) * line_dir).length();
        if dist > max_dist {
            max_dist = dist;
            best = Some(i);
        }
    }

    best.ok_or_else(|| MeshError::degenerate("All points are collinear"))
}

/// Finds the point farthest from a plane.
fn find_farthest_from_plane(
    p0: usize,
    p1: usize,
    p2: usize,
    points: &[DVec3],
    tolerance: f64,
) -> MeshResult<usize> {
    let normal = (points[p1] - points[p0])
        .cross(points[p2] - points[p0])
        .normalize_or_zero();

    let mut max_dist = tolerance;
    let mut best = None;

    for (i, p) in points.iter().enumerate() {
        if i == p0 || i == p1 || i == p2 {
            continue;
        }
        let dist = normal.dot(*p - points[p0]).abs();
        if dist > max_dist {
            max_dist = dist;
            best = Some(i);
        }
    }

    best.ok_or_else(|| MeshError::degenerate("All points are coplanar"))
}

/// Creates a face whose normal points away from `centroid`.
fn create_face_outward(
    v0: usize,
    v1: usize,
    v2: usize,
    centroid: DVec3,
    points: &[DVec3],
) -> HullFace {
    let face = HullFace::new(v0, v1, v2, points);
    let face_center = (points[v0] + points[v1] + points[v2]) / 3.0;
    if face.normal.dot(centroid - face_center) > 0.0 {
        HullFace::new(v0, v2, v1, points)
    } else {
        face
    }
}

/// Main QuickHull iteration.
fn quickhull_iterate(mut faces: Vec<HullFace>, points: &[DVec3], tolerance: f64) -> Vec<HullFace> {
    // Every iteration consumes one outside point.
    let max_iterations = points.len() * 2;

    for _ in 0..max_iterations {
        let Some(face_idx) = faces.iter().position(|f| !f.outside_points.is_empty()) else {
            break;
        };
        let Some(farthest) = faces[face_idx].farthest_point(points) else {
            break;
        };
        let apex = points[farthest];

        let visible: Vec<usize> = faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_outside(apex, tolerance))
            .map(|(i, _)| i)
            .collect();
        if visible.is_empty() {
            faces[face_idx].outside_points.retain(|&p| p != farthest);
            continue;
        }

        let horizon = find_horizon_edges(&faces, &visible);

        let mut reassign: BTreeSet<usize> = BTreeSet::new();
        for &idx in &visible {
            reassign.extend(faces[idx].outside_points.iter().copied());
        }
        reassign.remove(&farthest);

        // Remove in descending order so earlier indices stay valid.
        for &idx in visible.iter().rev() {
            faces.remove(idx);
        }

        let centroid = compute_centroid(&faces, points);
        let first_new = faces.len();
        for (e0, e1) in horizon {
            faces.push(create_face_outward(e0, e1, farthest, centroid, points));
        }

        for idx in reassign {
            assign_to_face(&mut faces[first_new..], idx, points, tolerance);
        }
    }

    faces
}

/// Finds horizon edges from visible faces, in the winding of the visible face.
fn find_horizon_edges(faces: &[HullFace], visible: &[usize]) -> Vec<(usize, usize)> {
    let mut edge_count: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    let edges_of = |idx: usize| {
        let v = faces[idx].vertices;
        [(v[0], v[1]), (v[1], v[2]), (v[2], v[0])]
    };

    for &idx in visible {
        for (a, b) in edges_of(idx) {
            *edge_count.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }

    // Horizon edges appear exactly once among visible faces
    visible
        .iter()
        .flat_map(|&idx| edges_of(idx))
        .filter(|&(a, b)| edge_count[&(a.min(b), a.max(b))] == 1)
        .collect()
}

/// Computes the centroid of the current hull vertices.
fn compute_centroid(faces: &[HullFace], points: &[DVec3]) -> DVec3 {
    let seen: BTreeSet<usize> = faces.iter().flat_map(|f| f.vertices).collect();
    if seen.is_empty() {
        return DVec3::ZERO;
    }
    seen.iter().map(|&v| points[v]).sum::<DVec3>() / seen.len() as f64
}

/// Converts hull faces to a mesh, keeping hull vertices in input order.
fn faces_to_mesh(faces: &[HullFace], points: &[DVec3]) -> Mesh {
    let used_vertices: BTreeSet<usize> = faces.iter().flat_map(|f| f.vertices).collect();

    let mut vertex_map: BTreeMap<usize, u32> = BTreeMap::new();
    let mut mesh = Mesh::with_capacity(used_vertices.len(), faces.len());
    for v in used_vertices {
        vertex_map.insert(v, mesh.add_vertex(points[v]));
    }

    for face in faces {
        let [v0, v1, v2] = face.vertices.map(|v| vertex_map[&v]);
        mesh.add_triangle(v0, v1, v2);
    }

    mesh
}

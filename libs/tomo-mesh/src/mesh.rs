//! # Mesh Data Structure
//!
//! Core mesh representation with vertices, triangles, and optional per-vertex
//! scalar values used for colormap lookup.

use config::constants::EPSILON;
use glam::DVec3;
use tomo_geometry::coords::{to_display, DisplayPoint};

/// A triangle mesh with vertices and indices.
///
/// Vertices are in world order `(x, y, z)`. Display export happens once, in
/// [`Mesh::to_display`].
///
/// # Example
///
/// ```rust
/// use tomo_mesh::Mesh;
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// mesh.add_triangle(0, 1, 2);
/// assert!(mesh.validate());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions
    vertices: Vec<DVec3>,
    /// Triangle indices (3 indices per triangle)
    triangles: Vec<[u32; 3]>,
    /// Optional per-vertex values (colormap coordinates)
    values: Option<Vec<f64>>,
}

/// Mesh arrays in display order, ready for the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayMesh {
    /// Display-ordered vertices `(z, y, x)`.
    pub vertices: Vec<DisplayPoint>,
    /// Faces, wound so that normals stay outward in display space.
    pub faces: Vec<[u32; 3]>,
    /// Per-vertex values.
    pub values: Vec<f64>,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            values: None,
        }
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
            values: None,
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Adds a triangle by vertex indices.
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32) {
        self.triangles.push([v0, v1, v2]);
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a reference to the triangles.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the vertex at the given index.
    #[inline]
    pub fn vertex(&self, index: u32) -> DVec3 {
        self.vertices[index as usize]
    }

    /// Returns the triangle at the given index.
    #[inline]
    pub fn triangle(&self, index: usize) -> [u32; 3] {
        self.triangles[index]
    }

    /// Unnormalized face normal by right-hand winding.
    #[inline]
    pub fn face_normal(&self, index: usize) -> DVec3 {
        let [a, b, c] = self.triangles[index].map(|i| self.vertices[i as usize]);
        (b - a).cross(c - a)
    }

    /// Sets per-vertex values.
    pub fn set_values(&mut self, values: Vec<f64>) {
        self.values = Some(values);
    }

    /// Sets one value for all vertices.
    pub fn set_uniform_value(&mut self, value: f64) {
        self.values = Some(vec![value; self.vertices.len()]);
    }

    /// Returns the per-vertex values.
    pub fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    /// Reverses the winding of one triangle.
    #[inline]
    pub fn flip_face(&mut self, index: usize) {
        self.triangles[index].swap(1, 2);
    }

    /// Merges another mesh into this one.
    ///
    /// Values are kept only when both meshes carry them.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;
        let was_empty = self.is_empty();

        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|tri| [tri[0] + offset, tri[1] + offset, tri[2] + offset]),
        );

        self.values = match (self.values.take(), &other.values) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend_from_slice(theirs);
                Some(mine)
            }
            (None, Some(theirs)) if was_empty => Some(theirs.clone()),
            _ => None,
        };
    }

    /// Validates the mesh for correctness.
    ///
    /// Checks:
    /// - All triangle indices are valid
    /// - No degenerate triangles (repeated index or zero area)
    /// - Values, if present, match the vertex count
    pub fn validate(&self) -> bool {
        let vertex_count = self.vertices.len() as u32;

        if let Some(values) = &self.values {
            if values.len() != self.vertices.len() {
                return false;
            }
        }

        self.triangles.iter().enumerate().all(|(index, tri)| {
            tri.iter().all(|&v| v < vertex_count)
                && tri[0] != tri[1]
                && tri[1] != tri[2]
                && tri[0] != tri[2]
                && self.face_normal(index).length() > EPSILON
        })
    }

    /// Converts the mesh into display order.
    ///
    /// Reversing the axis order mirrors the mesh, so face winding is reversed
    /// too and outward normals stay outward.
    pub fn to_display(&self) -> DisplayMesh {
        DisplayMesh {
            vertices: self.vertices.iter().copied().map(to_display).collect(),
            faces: self.triangles.iter().map(|&[a, b, c]| [a, c, b]).collect(),
            values: self
                .values
                .clone()
                .unwrap_or_else(|| vec![0.0; self.vertices.len()]),
        }
    }
}

//! # Tomo Mesh
//!
//! Display meshes for fitted geometry.
//!
//! ## Architecture
//!
//! ```text
//! tomo-geometry (SurfaceGrid, Sphere) → tomo-mesh (Mesh + colormap values)
//! ```
//!
//! ## Algorithms
//!
//! - **Surfaces**: quad grid triangulation, wrapped for closed grids
//! - **Spheres**: QuickHull of Fibonacci samples, faces oriented by center
//!
//! Every face is wound so its right-hand normal points away from the interior
//! of the geometry it came from.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tomo_mesh::mesh_surfaces;
//!
//! let colored = mesh_surfaces(&mut outcome.items, &outcome.colors)?;
//! let display = colored.mesh.to_display();
//! ```

pub mod colormap;
pub mod error;
pub mod hull;
pub mod mesh;
pub mod spheres;
pub mod surfaces;

pub use colormap::ColoredMesh;
pub use error::{MeshError, MeshResult};
pub use mesh::{DisplayMesh, Mesh};
pub use spheres::{mesh_spheres, mesh_spheres_with};
pub use surfaces::{mesh_surfaces, triangulate_grid};

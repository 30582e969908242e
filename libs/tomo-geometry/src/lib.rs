//! # Tomo Geometry
//!
//! Geometric models fitted through sparse tomogram annotations.
//!
//! ## Architecture
//!
//! ```text
//! annotations (display z,y,x) ──builder──▶ SurfaceGrid / HelicalFilament / Sphere (world x,y,z)
//! ```
//!
//! ## Modules
//!
//! - **coords**: display/world axis convention
//! - **spline**: arclength-parameterized cubic splines
//! - **frames**: orientation frames and Euler rotations
//! - **surface**: spline-interpolated quad surfaces with validity mask
//! - **filament**: helical filament axes
//! - **sphere**: spheres and Fibonacci sampling
//! - **volume**: dense display-ordered volumes and their world view
//! - **contours**: per-slice label boundaries
//! - **builder**: annotation groups to models, skipping degenerate groups
//!
//! ## Usage
//!
//! ```rust
//! use tomo_geometry::{build_filament, build_spheres};
//!
//! let filament = build_filament(&[[0.0, 0.0, 0.0], [100.0, 0.0, 0.0]]).unwrap();
//! assert!((filament.length() - 100.0).abs() < 1e-6);
//!
//! let spheres = build_spheres(&[[0.0, 0.0, 0.0], [0.0, 0.0, 5.0]]).unwrap();
//! assert_eq!(spheres.len(), 1);
//! ```

pub mod builder;
pub mod contours;
pub mod coords;
pub mod error;
pub mod filament;
pub mod frames;
pub mod sphere;
pub mod spline;
pub mod surface;
pub mod volume;

pub use builder::{
    build_filament, build_spheres, build_surfaces, build_surfaces_from_labels,
    build_surfaces_from_polylines, AnnotationSource, BuildOutcome, Color, LabelParams,
    PolylineGroup, SurfaceOptions,
};
pub use coords::{to_display, to_world, DisplayPoint, Invert};
pub use error::{GeometryError, GeometryResult};
pub use filament::{AxisFrame, HelicalFilament};
pub use sphere::Sphere;
pub use spline::SplineCurve;
pub use surface::{GridSamples, SurfaceGrid};
pub use volume::{Volume, WorldView};

//! # Tomo Sampler
//!
//! Dense samples derived from fitted geometry.
//!
//! ## Architecture
//!
//! ```text
//! SurfaceGrid / HelicalFilament / Sphere ──particles──▶ ParticleSet (world)
//! Volume (display) + geometry ──volume::resample──▶ Volume<f32> (display)
//! ```
//!
//! Sampling a surface at a new spacing updates the grid it was given; the
//! next caller holding the same grid sees the new separation.
//!
//! ## Usage
//!
//! ```rust
//! use glam::DVec3;
//! use tomo_geometry::Sphere;
//! use tomo_sampler::sample_sphere;
//!
//! let sphere = Sphere::new(DVec3::ZERO, 10.0).unwrap();
//! let particles = sample_sphere(&sphere, 2.0).unwrap();
//! assert_eq!(particles.len(), 314);
//! ```

pub mod error;
pub mod particles;
pub mod volume;

pub use error::{SampleError, SampleResult};
pub use particles::{sample_filament, sample_sphere, sample_surface, HelicalParams, ParticleSet};
pub use volume::{resample_along_filament, resample_along_surface};

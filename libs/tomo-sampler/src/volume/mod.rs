//! # Volume Sampling
//!
//! Cubic interpolation and geometry-following resampling of dense volumes.

pub mod interp;
pub mod resample;

pub use interp::sample_cubic;
pub use resample::{resample_along_filament, resample_along_surface, slab_count};

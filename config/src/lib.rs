//! # Config Crate
//!
//! Centralized configuration constants for the tomogram picking pipeline.
//! Every default parameter and numeric tolerance used by the geometry,
//! mesh, sampler and layer crates is defined here.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{DEFAULT_SURFACE_SPACING_A, LABEL_SLICING_STEP};
//!
//! // Physical spacing is converted to pixels by the layer scale.
//! let scale = 10.0;
//! let spacing_px = DEFAULT_SURFACE_SPACING_A / scale;
//! assert_eq!(spacing_px, 5.0);
//! assert_eq!(LABEL_SLICING_STEP, 10);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Physical Units**: User-facing defaults are in Ångström
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;

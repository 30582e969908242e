//! # Configuration Constants
//!
//! Centralized values shared across the picking pipeline. Each public item
//! documents its purpose so downstream crates stay declarative and avoid
//! scattering literals.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Spline**: Arclength tables and closed-curve padding
//! - **Actions**: Default user parameters (Ångström)
//! - **Labels**: Contour extraction from segmentations
//! - **Meshing**: Sphere hull density and colormap handling

use std::fmt;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons in geometry kernels.
///
/// # Examples
/// ```
/// use config::constants::EPSILON;
/// assert!(EPSILON < 1.0e-6);
/// ```
pub const EPSILON: f64 = 1e-10;

/// Relative tolerance used when deciding whether a requested spacing differs
/// from the one a geometry is currently sampled at.
///
/// Matches `numpy.isclose` defaults.
pub const SEPARATION_RTOL: f64 = 1e-5;

/// Absolute tolerance paired with [`SEPARATION_RTOL`].
pub const SEPARATION_ATOL: f64 = 1e-8;

/// Tolerance, relative to a sampling step, applied when counting how many
/// whole steps fit into a length.
///
/// Keeps the far endpoint when a length is an exact multiple of the step.
pub const STEP_COUNT_RTOL: f64 = 1e-9;

/// Tolerance, relative to the separation, for deciding whether an open-line
/// station still lies on the line it was sampled from.
pub const STATION_EXTENT_RTOL: f64 = 1e-6;

/// Returns true if two spacings are equal within the separation tolerances.
///
/// # Examples
/// ```
/// use config::constants::spacing_is_close;
/// assert!(spacing_is_close(5.0, 5.0 + 1e-9));
/// assert!(!spacing_is_close(5.0, 5.1));
/// ```
pub fn spacing_is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= SEPARATION_ATOL + SEPARATION_RTOL * b.abs()
}

// =============================================================================
// SPLINE CONSTANTS
// =============================================================================

/// Number of arclength table entries per spline segment.
///
/// Arclength is inverted by interpolating this table, so larger values
/// trade memory for accuracy on strongly curved segments.
pub const ARC_LENGTH_SAMPLES_PER_SEGMENT: usize = 64;

/// Number of points wrapped around each end of a closed curve before fitting.
///
/// The natural end conditions of the padded fit fall outside the used
/// parameter range, which keeps the seam smooth.
pub const CLOSED_SPLINE_PADDING: usize = 3;

/// Minimum number of distinct points a curve fit accepts.
pub const MIN_SPLINE_POINTS: usize = 2;

/// Minimum number of boundary lines a surface fit accepts.
pub const MIN_SURFACE_LINES: usize = 2;

// =============================================================================
// ACTION DEFAULTS (Ångström)
// =============================================================================

/// Default surface sampling spacing used by the "Generate" surface action.
pub const DEFAULT_SURFACE_SPACING_A: f64 = 50.0;

/// Default particle spacing for surface and sphere particle actions.
pub const DEFAULT_PARTICLE_SPACING_A: f64 = 50.0;

/// Default in-plane spacing used when resampling volumes.
pub const DEFAULT_RESAMPLE_SPACING_A: f64 = 5.0;

/// Default thickness of resampled slabs and filament cross-sections.
pub const DEFAULT_RESAMPLE_THICKNESS_A: f64 = 200.0;

/// Default helical rise for filament particles.
pub const DEFAULT_RISE_A: f64 = 50.0;

/// Default cyclic symmetry order for filament particles.
pub const DEFAULT_SYMMETRY_ORDER: u32 = 1;

/// Number of path samples per picked point when displaying a filament.
///
/// # Examples
/// ```
/// use config::constants::FILAMENT_PATH_SAMPLES_PER_POINT;
/// let picks = 4;
/// assert_eq!(picks * FILAMENT_PATH_SAMPLES_PER_POINT, 200);
/// ```
pub const FILAMENT_PATH_SAMPLES_PER_POINT: usize = 50;

// =============================================================================
// LABEL CONSTANTS
// =============================================================================

/// Slice interval along the slicing axis when extracting label contours.
pub const LABEL_SLICING_STEP: usize = 10;

/// Keep every n-th contour vertex when extracting label contours.
pub const LABEL_SAMPLING_STEP: usize = 10;

/// Axis of the display-ordered label volume that label contours are sliced along.
pub const LABEL_SLICING_AXIS: usize = 0;

// =============================================================================
// MESH CONSTANTS
// =============================================================================

/// Sphere display meshes are sampled at `radius / SPHERE_MESH_SPACING_DIVISOR`.
pub const SPHERE_MESH_SPACING_DIVISOR: f64 = 10.0;

/// Minimum number of points placed on a sphere, enough for a closed hull.
pub const MIN_SPHERE_POINTS: usize = 4;

/// Shift applied to normalized colormap values when only one color exists.
///
/// Viewers prepend a transparent background entry at index 0 of a
/// single-color colormap.
pub const SINGLE_COLOR_VALUE_SHIFT: f64 = 1.0;

/// Default vertex color (RGBA).
pub const DEFAULT_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

/// Hue increment between generated label surface colors (golden ratio).
pub const LABEL_COLOR_HUE_STEP: f32 = 0.618_034;

// =============================================================================
// GLOBAL CONFIG
// =============================================================================

/// Immutable snapshot of the sampling defaults shared between crates.
///
/// # Examples
/// ```
/// use config::constants::PickingConfig;
/// let config = PickingConfig::default();
/// assert_eq!(config.slicing_step, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickingConfig {
    /// Slice interval used when extracting contours from label volumes.
    pub slicing_step: usize,
    /// Contour subsampling step used when extracting label contours.
    pub sampling_step: usize,
    /// Density divisor for sphere display meshes.
    pub sphere_mesh_divisor: f64,
}

impl PickingConfig {
    /// Builds a configuration, rejecting values that cannot drive sampling.
    ///
    /// # Examples
    /// ```
    /// use config::constants::PickingConfig;
    /// let cfg = PickingConfig::new(5, 2, 10.0).expect("valid config");
    /// assert_eq!(cfg.sampling_step, 2);
    /// ```
    pub fn new(
        slicing_step: usize,
        sampling_step: usize,
        sphere_mesh_divisor: f64,
    ) -> Result<Self, ConfigError> {
        if slicing_step == 0 {
            return Err(ConfigError::InvalidStep("slicing_step"));
        }
        if sampling_step == 0 {
            return Err(ConfigError::InvalidStep("sampling_step"));
        }
        if sphere_mesh_divisor <= 0.0 {
            return Err(ConfigError::InvalidDivisor(sphere_mesh_divisor));
        }
        Ok(Self {
            slicing_step,
            sampling_step,
            sphere_mesh_divisor,
        })
    }
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            slicing_step: LABEL_SLICING_STEP,
            sampling_step: LABEL_SAMPLING_STEP,
            sphere_mesh_divisor: SPHERE_MESH_SPACING_DIVISOR,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when a slicing or sampling step is zero.
    InvalidStep(&'static str),
    /// Raised when the sphere mesh divisor is zero or negative.
    InvalidDivisor(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidStep(name) => write!(f, "{name} must be >= 1"),
            ConfigError::InvalidDivisor(value) => {
                write!(f, "sphere mesh divisor must be positive: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

//! # Geometry Errors
//!
//! Error types for geometry construction.

use thiserror::Error;

/// Errors that can occur while fitting or building geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Not enough distinct points to fit a curve.
    #[error("Insufficient points: expected at least {expected}, got {actual}")]
    InsufficientPoints { expected: usize, actual: usize },

    /// Not enough boundary lines to fit a surface.
    #[error("Insufficient lines: expected at least {expected}, got {actual}")]
    InsufficientLines { expected: usize, actual: usize },

    /// Degenerate input (zero length, non-finite values).
    #[error("Degenerate geometry: {message}")]
    Degenerate { message: String },

    /// A parameter is out of its valid range.
    #[error("Invalid parameter `{name}`: {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// Every group of a batch failed to fit.
    #[error("No {kind} could be generated ({skipped} group(s) skipped)")]
    NoGeometryGenerated { kind: &'static str, skipped: usize },
}

impl GeometryError {
    /// Creates a degenerate geometry error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::Degenerate {
            message: message.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// Returns true if the error is a per-group fit failure that batch
    /// builders skip instead of propagating.
    pub fn is_fit_failure(&self) -> bool {
        matches!(
            self,
            Self::InsufficientPoints { .. } | Self::InsufficientLines { .. } | Self::Degenerate { .. }
        )
    }
}

/// Result type alias for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Checks that a spacing-like parameter is finite and strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> GeometryResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::invalid_parameter(
            name,
            format!("must be positive and finite, got {value}"),
        ))
    }
}

// =============================================================================
// TESTS
// =============================================================================

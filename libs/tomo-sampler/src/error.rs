//! # Sampling Errors
//!
//! Error types for particle sampling and volume resampling.

use thiserror::Error;
use tomo_geometry::GeometryError;

/// Errors that can occur while sampling geometry or volumes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    /// The geometry rejected the request
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// A parameter is out of its valid range
    #[error("Invalid parameter `{name}`: {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// The volume cannot be resampled
    #[error("Invalid volume: {message}")]
    InvalidVolume { message: String },
}

impl SampleError {
    /// Creates an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

/// Result type alias for sampling operations.
pub type SampleResult<T> = Result<T, SampleError>;

/// Checks that a length-like parameter is finite and strictly positive.
pub(crate) fn positive(name: &'static str, value: f64) -> SampleResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SampleError::invalid_parameter(
            name,
            format!("must be positive and finite, got {value}"),
        ))
    }
}

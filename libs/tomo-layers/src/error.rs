//! # Layer Errors
//!
//! Error types for layer bookkeeping and user actions.

use crate::layer::LayerId;
use thiserror::Error;
use tomo_geometry::GeometryError;
use tomo_mesh::MeshError;
use tomo_sampler::SampleError;

/// Errors that can occur while running a layer action.
#[derive(Debug, Error)]
pub enum LayerError {
    /// No layer with this id in the store
    #[error("Unknown layer: {0}")]
    UnknownLayer(LayerId),

    /// The layer does not carry what the action needs
    #[error("{layer} is not a valid input for {operation}: {reason}")]
    InvalidInput {
        layer: LayerId,
        operation: &'static str,
        reason: String,
    },

    /// The layer carries no experiment id
    #[error("{0} has no experiment id")]
    MissingExperimentId(LayerId),

    /// The layer was not produced by a particle export
    #[error("{0} is not a particles layer")]
    NotParticles(LayerId),

    /// A selected row is out of range
    #[error("Selected row {index} out of range for {len} particles")]
    InvalidSelection { index: usize, len: usize },

    /// A parameter in physical units is unusable
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// Geometry construction failed
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Mesh generation failed
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// Sampling or resampling failed
    #[error("Sampling error: {0}")]
    Sample(#[from] SampleError),

    /// A layer record could not be rendered
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LayerError {
    /// Creates an invalid input error.
    pub fn invalid_input(layer: LayerId, operation: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            layer,
            operation,
            reason: reason.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

/// Result type alias for layer operations.
pub type LayerResult<T> = Result<T, LayerError>;

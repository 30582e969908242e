//! # Particle Export
//!
//! Turns sampled particles into a points layer and a companion vectors
//! layer. This is where particle positions cross back from world to display
//! order.

use crate::error::{LayerError, LayerResult};
use crate::layer::{
    FeatureRow, LayerData, LayerProperties, ParticleRows, Payload, RenderingHints,
};
use glam::{DMat3, DVec3};
use tomo_geometry::{to_display, Color};
use tracing::debug;

/// The two layers produced by one export.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleLayers {
    /// One row per particle with position, orientation and features.
    pub points: LayerData,
    /// Display position and orientation z-axis of every particle.
    pub vectors: LayerData,
}

/// Exports particles of one experiment.
#[derive(Debug, Clone)]
pub struct ParticleExporter<'a> {
    experiment_id: &'a str,
    scale: f64,
    color_cycle: Option<(&'a str, &'a [Color])>,
}

impl<'a> ParticleExporter<'a> {
    /// Exporter for an experiment whose pixels are `scale` wide.
    pub fn new(experiment_id: &'a str, scale: f64) -> Self {
        Self {
            experiment_id,
            scale,
            color_cycle: None,
        }
    }

    /// Colors points by the feature column `key`, cycling through `colors`.
    pub fn with_color_cycle(mut self, key: &'a str, colors: &'a [Color]) -> Self {
        self.color_cycle = Some((key, colors));
        self
    }

    /// Builds the points and vectors layers.
    ///
    /// # Arguments
    ///
    /// * `positions` - World positions (pixels)
    /// * `orientations` - World orientations, one per position
    /// * `features` - Optional feature row per position
    /// * `name_suffix` - Originating action, e.g. `"surface picked"`
    ///
    /// # Errors
    ///
    /// Fails when the inputs differ in length, or when the color cycle key is
    /// missing from a feature row.
    pub fn export(
        &self,
        positions: &[DVec3],
        orientations: &[DMat3],
        features: Option<Vec<FeatureRow>>,
        name_suffix: &str,
    ) -> LayerResult<ParticleLayers> {
        let count = positions.len();
        if orientations.len() != count {
            return Err(LayerError::invalid_parameter(
                "orientations",
                format!("{} orientations for {count} positions", orientations.len()),
            ));
        }
        let features = features.unwrap_or_else(|| vec![FeatureRow::new(); count]);
        if features.len() != count {
            return Err(LayerError::invalid_parameter(
                "features",
                format!("{} feature rows for {count} positions", features.len()),
            ));
        }

        let mut hints = RenderingHints::default();
        if let Some((key, colors)) = self.color_cycle {
            if features.iter().any(|row| !row.contains_key(key)) {
                return Err(LayerError::invalid_parameter(
                    "color_cycle",
                    format!("feature column '{key}' missing"),
                ));
            }
            hints.face_color = Some(key.to_string());
            hints.color_cycle = Some(colors.to_vec());
        }

        let display: Vec<_> = positions.iter().copied().map(to_display).collect();
        let vectors = display
            .iter()
            .zip(orientations)
            .map(|(&p, m)| [p, to_display(m.z_axis)])
            .collect();

        let scale = [self.scale; 3];
        let id = self.experiment_id;
        let points = LayerData::new(
            Payload::Particles(ParticleRows {
                positions: display,
                orientations: orientations.to_vec(),
                features,
            }),
            LayerProperties::new(format!("{id} - particle positions ({name_suffix})"), scale)
                .with_experiment_id(id)
                .with_hints(hints),
        );
        let vectors = LayerData::new(
            Payload::Vectors(vectors),
            LayerProperties::new(format!("{id} - particle orientations ({name_suffix})"), scale)
                .with_experiment_id(id),
        );

        debug!(particles = count, suffix = name_suffix, "exported particles");
        Ok(ParticleLayers { points, vectors })
    }
}

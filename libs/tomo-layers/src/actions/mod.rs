//! # Picking Actions
//!
//! The user-triggered operations of the picking tool. Each action reads its
//! input layers from a [`LayerStore`], runs one geometry, mesh or sampling
//! step and inserts the resulting layers.
//!
//! Parameters are given in physical units (Å, degrees). Lengths are
//! converted to pixels with the first scale component of the input layer.
//!
//! | action | input | output |
//! |---|---|---|
//! | [`generate_surface`] | shapes or labels | surface + grids |
//! | [`surface_particles`] | surface | points + vectors |
//! | [`resample_surface`] | surface + image | one image per grid |
//! | [`generate_filament`] | points | shapes path + filament |
//! | [`filament_particles`] | filament | points + vectors |
//! | [`resample_filament`] | filament + image | image |
//! | [`generate_spheres`] | points | surface + spheres |
//! | [`sphere_particles`] | spheres | points + vectors |
//! | [`rotate_particles`] | particles | updated in place |

mod filament;
mod rotate;
mod sphere;
mod surface;

pub use filament::{filament_particles, generate_filament, resample_filament, FilamentParticleParams};
pub use rotate::rotate_particles;
pub use sphere::{generate_spheres, sphere_particles};
pub use surface::{generate_surface, resample_surface, surface_particles};

use crate::error::{LayerError, LayerResult};
use crate::export::ParticleLayers;
use crate::layer::{LayerData, LayerId, LayerProperties, Payload};
use crate::store::LayerStore;
use glam::DVec3;
use tomo_geometry::{to_world, DisplayPoint, Volume};

/// Ids of the two layers inserted by a particle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleLayerIds {
    pub points: LayerId,
    pub vectors: LayerId,
}

/// Experiment id and pixel size of an input layer.
struct InputInfo {
    experiment_id: String,
    scale: [f64; 3],
}

impl InputInfo {
    fn of(id: LayerId, layer: &LayerData) -> LayerResult<Self> {
        let experiment_id = layer
            .experiment_id()
            .ok_or(LayerError::MissingExperimentId(id))?
            .to_string();
        Ok(Self {
            experiment_id,
            scale: layer.properties().scale,
        })
    }

    /// Converts a length in Å to pixels.
    fn pixels(&self, name: &'static str, angstrom: f64) -> LayerResult<f64> {
        let pixel = self.scale[0];
        if !(pixel.is_finite() && pixel > 0.0) {
            return Err(LayerError::invalid_parameter(
                "scale",
                format!("pixel size must be positive, got {pixel}"),
            ));
        }
        let value = angstrom / pixel;
        if !(value.is_finite() && value > 0.0) {
            return Err(LayerError::invalid_parameter(
                name,
                format!("must be positive, got {angstrom} Å"),
            ));
        }
        Ok(value)
    }

    /// Converts a thickness in Å to a whole number of pixels.
    fn whole_pixels(&self, name: &'static str, angstrom: f64) -> LayerResult<f64> {
        let value = self.pixels(name, angstrom)?.round();
        if value < 1.0 {
            return Err(LayerError::invalid_parameter(
                name,
                format!("{angstrom} Å is less than one pixel"),
            ));
        }
        Ok(value)
    }

    fn properties(&self, name: String) -> LayerProperties {
        LayerProperties::new(name, self.scale).with_experiment_id(self.experiment_id.clone())
    }
}

/// Picks of a points layer.
fn points_of<'a>(
    layer: &'a LayerData,
    id: LayerId,
    operation: &'static str,
) -> LayerResult<&'a [DisplayPoint]> {
    match layer.payload() {
        Payload::Points(points) => Ok(points),
        _ => Err(LayerError::invalid_input(id, operation, "expected a points layer")),
    }
}

/// Volume of an image layer.
fn image_of<'a>(
    layer: &'a LayerData,
    id: LayerId,
    operation: &'static str,
) -> LayerResult<&'a Volume<f32>> {
    match layer.payload() {
        Payload::Image(volume) => Ok(volume),
        _ => Err(LayerError::invalid_input(id, operation, "expected an image layer")),
    }
}

/// First pick of an inside-points layer, in world order.
fn inside_point(
    store: &LayerStore,
    id: LayerId,
    operation: &'static str,
) -> LayerResult<DVec3> {
    let points = points_of(store.get(id)?, id, operation)?;
    points
        .first()
        .copied()
        .map(to_world)
        .ok_or_else(|| LayerError::invalid_input(id, operation, "no inside point picked"))
}

fn insert_particles(store: &mut LayerStore, layers: ParticleLayers) -> ParticleLayerIds {
    ParticleLayerIds {
        points: store.insert(layers.points),
        vectors: store.insert(layers.vectors),
    }
}

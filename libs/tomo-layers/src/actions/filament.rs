use super::{image_of, insert_particles, points_of, InputInfo, ParticleLayerIds};
use crate::error::{LayerError, LayerResult};
use crate::export::ParticleExporter;
use crate::layer::{
    LayerData, LayerId, LayerProperties, Payload, RenderingHints, ShapeType, ShapesPayload,
};
use crate::store::{Geometry, LayerStore};
use config::constants::{
    DEFAULT_COLOR, DEFAULT_RISE_A, DEFAULT_SYMMETRY_ORDER, FILAMENT_PATH_SAMPLES_PER_POINT,
};
use tomo_geometry::build_filament;
use tomo_geometry::coords::to_display_all;
use tomo_sampler::{resample_along_filament, sample_filament, HelicalParams};
use tracing::info;

/// Helical lattice parameters in physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilamentParticleParams {
    /// Axial rise per step (Å).
    pub rise_a: f64,
    /// Twist per step (degrees).
    pub twist_deg: f64,
    /// Twist of the first step (degrees).
    pub twist_offset_deg: f64,
    /// Distance from the axis (Å).
    pub radius_a: f64,
    /// Copies per step.
    pub symmetry_order: u32,
}

impl Default for FilamentParticleParams {
    fn default() -> Self {
        Self {
            rise_a: DEFAULT_RISE_A,
            twist_deg: 0.0,
            twist_offset_deg: 0.0,
            radius_a: 0.0,
            symmetry_order: DEFAULT_SYMMETRY_ORDER,
        }
    }
}

/// Fits a filament through a points layer and adds its path.
///
/// The path is the fitted axis sampled at
/// [`FILAMENT_PATH_SAMPLES_PER_POINT`] positions per pick.
pub fn generate_filament(store: &mut LayerStore, picks: LayerId) -> LayerResult<LayerId> {
    const OPERATION: &str = "generate_filament";
    let layer = store.get(picks)?;
    let input = InputInfo::of(picks, layer)?;
    let points = points_of(layer, picks, OPERATION)?;
    let filament = build_filament(points)?;

    let path = to_display_all(&filament.sample(points.len() * FILAMENT_PATH_SAMPLES_PER_POINT));
    let shapes = ShapesPayload {
        paths: vec![path],
        group_ids: vec![0],
        colors: vec![DEFAULT_COLOR],
    };
    let hints = RenderingHints {
        shape_type: Some(ShapeType::Path),
        ..RenderingHints::default()
    };
    let properties = input
        .properties(format!("{} - filament", input.experiment_id))
        .with_hints(hints);

    let length = filament.length();
    let layer = LayerData::new(Payload::Shapes(shapes), properties);
    let id = store.insert_with_geometry(layer, Geometry::HelicalFilament(filament));
    info!(%id, length, "generated filament");
    Ok(id)
}

/// Samples a helical lattice of particles along a filament layer.
pub fn filament_particles(
    store: &mut LayerStore,
    filament: LayerId,
    params: &FilamentParticleParams,
) -> LayerResult<ParticleLayerIds> {
    const OPERATION: &str = "filament_particles";
    let input = InputInfo::of(filament, store.get(filament)?)?;
    let axis = store
        .geometry(filament, OPERATION)?
        .helical_filament()
        .ok_or_else(|| LayerError::invalid_input(filament, OPERATION, "expected a filament"))?;

    let helical = HelicalParams {
        rise: input.pixels("rise", params.rise_a)?,
        twist: params.twist_deg,
        twist_offset: params.twist_offset_deg,
        radial_offset: params.radius_a / input.scale[0],
        symmetry_order: params.symmetry_order,
        degrees: true,
    };
    let particles = sample_filament(axis, &helical)?;

    let layers = ParticleExporter::new(&input.experiment_id, input.scale[0]).export(
        &particles.positions,
        &particles.orientations,
        None,
        "filament picked",
    )?;
    let ids = insert_particles(store, layers);
    info!(%filament, particles = particles.len(), "sampled filament particles");
    Ok(ids)
}

/// Resamples an image in a square cross-section swept along a filament.
///
/// # Arguments
///
/// * `spacing_a` - Spacing along and across the axis (Å)
/// * `thickness_a` - Cross-section width (Å), rounded to whole pixels
pub fn resample_filament(
    store: &mut LayerStore,
    filament: LayerId,
    image: LayerId,
    spacing_a: f64,
    thickness_a: f64,
) -> LayerResult<LayerId> {
    const OPERATION: &str = "resample_filament";
    let input = InputInfo::of(filament, store.get(filament)?)?;
    let volume = image_of(store.get(image)?, image, OPERATION)?;
    let spacing = input.pixels("spacing", spacing_a)?;
    let thickness = input.whole_pixels("thickness", thickness_a)?;
    let axis = store
        .geometry(filament, OPERATION)?
        .helical_filament()
        .ok_or_else(|| LayerError::invalid_input(filament, OPERATION, "expected a filament"))?;

    let resampled = resample_along_filament(volume, axis, spacing, thickness)?;

    let name = format!("{} - filament resampled", input.experiment_id);
    let mut properties =
        LayerProperties::new(name, resampled.scale()).with_experiment_id(&input.experiment_id);
    properties.metadata.stack = Some(false);
    let id = store.insert(LayerData::new(Payload::Image(resampled), properties));
    info!(%filament, %image, %id, spacing, thickness, "resampled along filament");
    Ok(id)
}

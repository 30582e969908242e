use super::{insert_particles, points_of, InputInfo, ParticleLayerIds};
use crate::error::{LayerError, LayerResult};
use crate::export::ParticleExporter;
use crate::layer::{LayerData, LayerId, Payload, RenderingHints, Shading};
use crate::store::{Geometry, LayerStore};
use tomo_geometry::build_spheres;
use tomo_mesh::mesh_spheres_with;
use tomo_sampler::{sample_sphere, ParticleSet};
use tracing::info;

/// Builds spheres from pairs of picks and adds their hull meshes.
///
/// Picks are read pairwise as `(center, point on the rim)`.
pub fn generate_spheres(store: &mut LayerStore, picks: LayerId) -> LayerResult<LayerId> {
    const OPERATION: &str = "generate_spheres";
    let layer = store.get(picks)?;
    let input = InputInfo::of(picks, layer)?;
    let outcome = build_spheres(points_of(layer, picks, OPERATION)?)?;
    let colored = mesh_spheres_with(&outcome.items, &outcome.colors, store.config())?;

    let hints = RenderingHints {
        shading: Some(Shading::Flat),
        colormap: Some(colored.colormap),
        ..RenderingHints::default()
    };
    let mut properties = input
        .properties(format!("{} - surface", input.experiment_id))
        .with_hints(hints);
    properties.metadata.colors = Some(outcome.colors);

    let (spheres, skipped) = (outcome.items.len(), outcome.skipped);
    let layer = LayerData::new(Payload::Surface(colored.mesh.to_display().into()), properties);
    let id = store.insert_with_geometry(layer, Geometry::Spheres(outcome.items));
    info!(%id, spheres, skipped, "generated spheres");
    Ok(id)
}

/// Samples particles evenly over every sphere of a spheres layer.
pub fn sphere_particles(
    store: &mut LayerStore,
    spheres: LayerId,
    spacing_a: f64,
) -> LayerResult<ParticleLayerIds> {
    const OPERATION: &str = "sphere_particles";
    let input = InputInfo::of(spheres, store.get(spheres)?)?;
    let spacing = input.pixels("spacing", spacing_a)?;
    let models = store
        .geometry(spheres, OPERATION)?
        .spheres()
        .ok_or_else(|| LayerError::invalid_input(spheres, OPERATION, "expected spheres"))?;

    let mut particles = ParticleSet::default();
    for sphere in models {
        particles.extend(sample_sphere(sphere, spacing)?);
    }

    let layers = ParticleExporter::new(&input.experiment_id, input.scale[0]).export(
        &particles.positions,
        &particles.orientations,
        None,
        "spheres picked",
    )?;
    let ids = insert_particles(store, layers);
    info!(%spheres, particles = particles.len(), "sampled sphere particles");
    Ok(ids)
}

use super::{image_of, insert_particles, inside_point, InputInfo, ParticleLayerIds};
use crate::error::{LayerError, LayerResult};
use crate::export::ParticleExporter;
use crate::layer::{
    FeatureRow, FeatureValue, LayerData, LayerId, LayerProperties, Payload, RenderingHints,
    Shading,
};
use crate::store::{Geometry, LayerStore};
use tomo_geometry::{
    build_surfaces_from_labels, build_surfaces_from_polylines, LabelParams, SurfaceGrid,
};
use tomo_mesh::mesh_surfaces;
use tomo_sampler::{resample_along_surface, sample_surface, ParticleSet};
use tracing::info;

/// Fits surfaces through an annotation layer and adds their mesh.
///
/// Shapes layers give one surface per path group, labels layers one per
/// label. Groups that cannot be fitted are skipped.
///
/// # Arguments
///
/// * `annotations` - Shapes or labels layer
/// * `inside` - Optional points layer; its first pick orients the normals
/// * `spacing_a` - Sample separation (Å)
/// * `closed` - Whether boundary lines are closed loops
///
/// # Returns
///
/// Id of the new surface layer, which owns the fitted grids.
pub fn generate_surface(
    store: &mut LayerStore,
    annotations: LayerId,
    inside: Option<LayerId>,
    spacing_a: f64,
    closed: bool,
) -> LayerResult<LayerId> {
    const OPERATION: &str = "generate_surface";
    let inside_point = match inside {
        Some(id) => Some(inside_point(store, id, OPERATION)?),
        None => None,
    };
    let layer = store.get(annotations)?;
    let input = InputInfo::of(annotations, layer)?;
    let separation = input.pixels("spacing", spacing_a)?;

    let mut outcome = match layer.payload() {
        Payload::Shapes(shapes) => {
            build_surfaces_from_polylines(&shapes.groups(), separation, inside_point, closed)?
        }
        Payload::Labels(volume) => build_surfaces_from_labels(
            volume,
            separation,
            LabelParams::from_config(store.config()),
            inside_point,
            closed,
        )?,
        _ => {
            return Err(LayerError::invalid_input(
                annotations,
                OPERATION,
                "expected a shapes or labels layer",
            ))
        }
    };
    let colored = mesh_surfaces(&mut outcome.items, &outcome.colors)?;

    let hints = RenderingHints {
        shading: Some(Shading::Smooth),
        colormap: Some(colored.colormap),
        ..RenderingHints::default()
    };
    let mut properties = input
        .properties(format!("{} - surface", input.experiment_id))
        .with_hints(hints);
    properties.metadata.colors = Some(outcome.colors);

    let (grids, skipped) = (outcome.items.len(), outcome.skipped);
    let layer = LayerData::new(Payload::Surface(colored.mesh.to_display().into()), properties);
    let id = store.insert_with_geometry(layer, Geometry::SurfaceGrids(outcome.items));
    info!(%id, grids, skipped, "generated surfaces");
    Ok(id)
}

/// Samples particles on every grid of a surface layer.
///
/// The new spacing is stored on the grids. Particles carry a `surface_id`
/// feature colored by the surface colors.
pub fn surface_particles(
    store: &mut LayerStore,
    surface: LayerId,
    spacing_a: f64,
    masked: bool,
) -> LayerResult<ParticleLayerIds> {
    const OPERATION: &str = "surface_particles";
    let (geometry, view) = store.geometry_mut(surface, OPERATION)?;
    let source = view.get(surface)?;
    let input = InputInfo::of(surface, source)?;
    let colors = source.properties().metadata.colors.clone().unwrap_or_default();
    let spacing = input.pixels("spacing", spacing_a)?;
    let grids = geometry
        .surface_grids_mut()
        .ok_or_else(|| LayerError::invalid_input(surface, OPERATION, "expected surface grids"))?;

    let per_grid = update_grids(grids, |grid| Ok(sample_surface(grid, spacing, masked)?))?;
    let mut particles = ParticleSet::default();
    let mut features = Vec::new();
    for (i, sampled) in per_grid.into_iter().enumerate() {
        let row = FeatureRow::from([("surface_id".to_string(), FeatureValue::Int(i as i64))]);
        features.extend(std::iter::repeat(row).take(sampled.len()));
        particles.extend(sampled);
    }

    let mut exporter = ParticleExporter::new(&input.experiment_id, input.scale[0]);
    if !colors.is_empty() {
        exporter = exporter.with_color_cycle("surface_id", &colors);
    }
    let layers = exporter.export(
        &particles.positions,
        &particles.orientations,
        Some(features),
        "surface picked",
    )?;
    let ids = insert_particles(store, layers);
    info!(%surface, particles = particles.len(), masked, "sampled surface particles");
    Ok(ids)
}

/// Resamples an image in a slab along every grid of a surface layer.
///
/// # Arguments
///
/// * `spacing_a` - In-plane and depth spacing (Å)
/// * `thickness_a` - Slab thickness (Å), rounded to whole pixels
/// * `masked` - Zero samples outside each grid's validity mask
///
/// # Returns
///
/// One image layer per grid, in grid order.
pub fn resample_surface(
    store: &mut LayerStore,
    surface: LayerId,
    image: LayerId,
    spacing_a: f64,
    thickness_a: f64,
    masked: bool,
) -> LayerResult<Vec<LayerId>> {
    const OPERATION: &str = "resample_surface";
    let (geometry, view) = store.geometry_mut(surface, OPERATION)?;
    let input = InputInfo::of(surface, view.get(surface)?)?;
    let volume = image_of(view.get(image)?, image, OPERATION)?;
    let spacing = input.pixels("spacing", spacing_a)?;
    let thickness = input.whole_pixels("thickness", thickness_a)?;
    let grids = geometry
        .surface_grids_mut()
        .ok_or_else(|| LayerError::invalid_input(surface, OPERATION, "expected surface grids"))?;

    let resampled = update_grids(grids, |grid| {
        Ok(resample_along_surface(volume, grid, spacing, thickness, masked)?)
    })?;

    let ids: Vec<LayerId> = resampled
        .into_iter()
        .enumerate()
        .map(|(i, volume)| {
            let name = format!("{} - surface_{i} resampled", input.experiment_id);
            let mut properties =
                LayerProperties::new(name, volume.scale()).with_experiment_id(&input.experiment_id);
            properties.metadata.stack = Some(false);
            store.insert(LayerData::new(Payload::Image(volume), properties))
        })
        .collect();
    info!(%surface, %image, outputs = ids.len(), spacing, thickness, "resampled along surface");
    Ok(ids)
}

/// Runs `f` on copies of every grid and stores them back only if all succeed.
fn update_grids<T>(
    grids: &mut Vec<SurfaceGrid>,
    mut f: impl FnMut(&mut SurfaceGrid) -> LayerResult<T>,
) -> LayerResult<Vec<T>> {
    let mut updated = grids.clone();
    let outputs = updated
        .iter_mut()
        .map(&mut f)
        .collect::<LayerResult<Vec<_>>>()?;
    *grids = updated;
    Ok(outputs)
}

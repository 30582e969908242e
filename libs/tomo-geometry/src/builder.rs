//! # Geometry Builder
//!
//! Turns annotation primitives into geometry models.
//!
//! Batch builders fit one model per annotation group. A group that cannot be
//! fitted (too few distinct points, coincident lines) is skipped with a
//! warning; the batch fails only when nothing could be built.
//!
//! Every builder takes display-ordered input and converts it to world order
//! exactly once.

use crate::contours::label_paths_3d;
use crate::coords::{to_world_all, DisplayPoint};
use crate::error::{GeometryError, GeometryResult};
use crate::filament::HelicalFilament;
use crate::sphere::Sphere;
use crate::spline::{dedup_consecutive, SplineCurve};
use crate::surface::SurfaceGrid;
use crate::volume::Volume;
use config::constants::{
    PickingConfig, DEFAULT_COLOR, LABEL_COLOR_HUE_STEP, LABEL_SLICING_AXIS, MIN_SURFACE_LINES,
};
use glam::DVec3;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// RGBA color attached to a geometry group.
pub type Color = [f32; 4];

// =============================================================================
// INPUT TYPES
// =============================================================================

/// Polylines belonging to one surface annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineGroup {
    /// Annotation group id.
    pub surface_id: u32,
    /// Display-ordered boundary polylines, in any order.
    pub lines: Vec<Vec<DisplayPoint>>,
    /// Annotation color of the group.
    pub color: Color,
}

/// Contour extraction parameters for label volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelParams {
    /// Display axis the volume is sliced along.
    pub axis: usize,
    /// Slice interval.
    pub slicing_step: usize,
    /// Keep every n-th contour vertex.
    pub sampling_step: usize,
}

impl LabelParams {
    /// Label parameters taken from a picking configuration.
    pub fn from_config(config: &PickingConfig) -> Self {
        Self {
            axis: LABEL_SLICING_AXIS,
            slicing_step: config.slicing_step,
            sampling_step: config.sampling_step,
        }
    }
}

impl Default for LabelParams {
    fn default() -> Self {
        Self::from_config(&PickingConfig::default())
    }
}

/// Where surface annotations come from.
#[derive(Debug, Clone)]
pub enum AnnotationSource {
    /// Hand-drawn polylines grouped by surface id.
    Polylines(Vec<PolylineGroup>),
    /// A segmented label volume (display order, 0 is background).
    LabelVolume(Volume<u32>, LabelParams),
}

/// Surface fitting options shared by every annotation source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOptions {
    /// Sample separation (pixels).
    pub separation: f64,
    /// World point the surface normals face away from.
    pub inside_point: Option<DVec3>,
    /// Whether boundary lines are closed loops.
    pub closed: bool,
}

// =============================================================================
// OUTCOME
// =============================================================================

/// Models built from a batch of annotation groups.
#[derive(Debug, Clone)]
pub struct BuildOutcome<G> {
    /// Successfully built models, in group order.
    pub items: Vec<G>,
    /// One color per built model.
    pub colors: Vec<Color>,
    /// Number of groups skipped as degenerate.
    pub skipped: usize,
}

impl<G> BuildOutcome<G> {
    /// Collects per-group results, skipping fit failures.
    ///
    /// Errors that are not fit failures (invalid parameters) abort the batch.
    /// An empty result is escalated to [`GeometryError::NoGeometryGenerated`].
    fn collect(
        kind: &'static str,
        results: impl IntoIterator<Item = (u32, Color, GeometryResult<G>)>,
    ) -> GeometryResult<Self> {
        let mut outcome = Self {
            items: Vec::new(),
            colors: Vec::new(),
            skipped: 0,
        };
        for (group, color, result) in results {
            match result {
                Ok(item) => {
                    outcome.items.push(item);
                    outcome.colors.push(color);
                }
                Err(err) if err.is_fit_failure() => {
                    warn!(kind, group, error = %err, "skipping degenerate group");
                    outcome.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }
        if outcome.items.is_empty() {
            return Err(GeometryError::NoGeometryGenerated {
                kind,
                skipped: outcome.skipped,
            });
        }
        debug!(kind, built = outcome.items.len(), skipped = outcome.skipped, "built geometry");
        Ok(outcome)
    }

    /// Returns the number of built models.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing was built.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

/// Builds surfaces from either annotation source.
pub fn build_surfaces(
    source: &AnnotationSource,
    options: &SurfaceOptions,
) -> GeometryResult<BuildOutcome<SurfaceGrid>> {
    match source {
        AnnotationSource::Polylines(groups) => build_surfaces_from_polylines(
            groups,
            options.separation,
            options.inside_point,
            options.closed,
        ),
        AnnotationSource::LabelVolume(volume, params) => build_surfaces_from_labels(
            volume,
            options.separation,
            *params,
            options.inside_point,
            options.closed,
        ),
    }
}

/// Fits one [`SurfaceGrid`] per polyline group.
///
/// Member polylines are ordered by the leading display coordinate of their
/// first point, so lines drawn on different slices stack in slice order.
///
/// # Errors
///
/// [`GeometryError::NoGeometryGenerated`] when every group is degenerate.
pub fn build_surfaces_from_polylines(
    groups: &[PolylineGroup],
    separation: f64,
    inside_point: Option<DVec3>,
    closed: bool,
) -> GeometryResult<BuildOutcome<SurfaceGrid>> {
    let results = groups.iter().map(|group| {
        let mut ordered: Vec<&Vec<DisplayPoint>> = group.lines.iter().collect();
        ordered.sort_by(|a, b| leading_coordinate(a).total_cmp(&leading_coordinate(b)));
        let lines: Vec<Vec<DVec3>> = ordered
            .into_iter()
            .map(|line| dedup_consecutive(&to_world_all(line)))
            .collect();
        let grid = SurfaceGrid::new(&lines, separation, closed, inside_point);
        (group.surface_id, group.color, grid)
    });
    BuildOutcome::collect("surface", results)
}

/// Fits one [`SurfaceGrid`] per label of a segmented volume.
///
/// Labels carry no annotation color; each surface gets a distinct generated
/// color instead.
///
/// Contour lines with too few points left after subsampling (the tips of a
/// round label) are dropped. A label that spans fewer than two slices along
/// `params.axis`, such as a flat segmentation lying in one slice, is sliced
/// again along the remaining display axes until one gives enough lines.
pub fn build_surfaces_from_labels(
    volume: &Volume<u32>,
    separation: f64,
    params: LabelParams,
    inside_point: Option<DVec3>,
    closed: bool,
) -> GeometryResult<BuildOutcome<SurfaceGrid>> {
    let stacks = label_line_stacks(volume, params, closed)?;
    let results = stacks.into_iter().enumerate().map(|(ordinal, (label, lines))| {
        let grid = SurfaceGrid::new(&lines, separation, closed, inside_point);
        (label, label_color(ordinal), grid)
    });
    BuildOutcome::collect("surface", results)
}

/// World-ordered contour stacks per label, in label order.
fn label_line_stacks(
    volume: &Volume<u32>,
    params: LabelParams,
    closed: bool,
) -> GeometryResult<Vec<(u32, Vec<Vec<DVec3>>)>> {
    let min_points = SplineCurve::min_points(closed);
    let stacks_along = |axis: usize| -> GeometryResult<BTreeMap<u32, Vec<Vec<DVec3>>>> {
        let paths = label_paths_3d(volume, axis, params.slicing_step, params.sampling_step)?;
        Ok(paths
            .into_iter()
            .map(|paths| {
                let lines: Vec<Vec<DVec3>> = paths
                    .lines
                    .iter()
                    .map(|line| dedup_consecutive(&to_world_all(line)))
                    .filter(|line| line.len() >= min_points)
                    .collect();
                (paths.label, lines)
            })
            .collect())
    };

    let mut stacks: BTreeMap<u32, Vec<Vec<DVec3>>> = volume
        .data()
        .iter()
        .filter(|&&label| label != 0)
        .map(|&label| (label, Vec::new()))
        .collect();
    stacks.extend(stacks_along(params.axis)?);

    for axis in (0..3).filter(|&axis| axis != params.axis) {
        if stacks.values().all(|lines| lines.len() >= MIN_SURFACE_LINES) {
            break;
        }
        for (label, lines) in stacks_along(axis)? {
            let Some(current) = stacks.get_mut(&label) else {
                continue;
            };
            if current.len() < MIN_SURFACE_LINES && lines.len() > current.len() {
                debug!(label, axis, lines = lines.len(), "re-sliced thin label");
                *current = lines;
            }
        }
    }
    Ok(stacks.into_iter().collect())
}

/// Fits a [`HelicalFilament`] through display-ordered picks.
pub fn build_filament(points: &[DisplayPoint]) -> GeometryResult<HelicalFilament> {
    let world = dedup_consecutive(&to_world_all(points));
    let filament = HelicalFilament::new(&world)?;
    debug!(points = world.len(), length = filament.length(), "built filament");
    Ok(filament)
}

/// Builds spheres from picks consumed pairwise as `(center, rim)`.
///
/// A trailing unpaired pick is ignored. Pairs with coincident picks are
/// skipped like degenerate surface groups.
pub fn build_spheres(points: &[DisplayPoint]) -> GeometryResult<BuildOutcome<Sphere>> {
    if points.len() % 2 == 1 {
        warn!(points = points.len(), "ignoring unpaired sphere pick");
    }
    let world = to_world_all(points);
    let results = world.chunks_exact(2).enumerate().map(|(pair, chunk)| {
        (pair as u32, DEFAULT_COLOR, Sphere::from_pair(chunk[0], chunk[1]))
    });
    BuildOutcome::collect("sphere", results)
}

fn leading_coordinate(line: &[DisplayPoint]) -> f64 {
    line.first().map_or(f64::INFINITY, |p| p[0])
}

/// Distinct opaque color for the n-th generated surface.
///
/// Hues advance by the golden ratio so neighbouring ordinals stay far apart.
pub fn label_color(ordinal: usize) -> Color {
    let hue = (ordinal as f32 * LABEL_COLOR_HUE_STEP).fract();
    let [r, g, b] = hsv_to_rgb(hue, 0.65, 0.95);
    [r, g, b, 1.0]
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let sector = h * 6.0;
    let i = sector.floor();
    let f = sector - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (i as i32).rem_euclid(6) {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

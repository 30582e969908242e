//! # Layer Records
//!
//! The uniform record exchanged with the viewer: a payload, its properties
//! and the kind of layer the viewer should create for it.
//!
//! All coordinates in a record are display-ordered `(z, y, x)`. Geometry
//! fitted behind a layer is not part of the record; the
//! [`LayerStore`](crate::store::LayerStore) owns it and the record only names
//! its kind in [`Metadata::geometry`].

use crate::error::LayerResult;
use config::constants::DEFAULT_COLOR;
use glam::DMat3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tomo_geometry::{Color, DisplayPoint, PolylineGroup, Volume};
use tomo_mesh::DisplayMesh;

// =============================================================================
// IDS AND KINDS
// =============================================================================

/// Handle of a layer inside a [`LayerStore`](crate::store::LayerStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub(crate) u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer #{}", self.0)
    }
}

/// Kind of viewer layer a record becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Points,
    Vectors,
    Shapes,
    Surface,
    Image,
    Labels,
}

/// Kind of geometry the store keeps behind a generated layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    SurfaceGrids,
    HelicalFilament,
    Spheres,
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// One value of a particle feature table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Tabular attributes of one particle, keyed by column name.
pub type FeatureRow = BTreeMap<String, FeatureValue>;

/// Polylines drawn in a shapes layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapesPayload {
    /// Display-ordered polylines.
    pub paths: Vec<Vec<DisplayPoint>>,
    /// Annotation group of each path.
    pub group_ids: Vec<u32>,
    /// Edge color of each path.
    pub colors: Vec<Color>,
}

impl ShapesPayload {
    /// Groups the paths by id, in order of first appearance.
    ///
    /// A group takes the color of its first path.
    pub fn groups(&self) -> Vec<PolylineGroup> {
        let mut groups: Vec<PolylineGroup> = Vec::new();
        for (i, path) in self.paths.iter().enumerate() {
            let id = self.group_ids.get(i).copied().unwrap_or_default();
            match groups.iter_mut().find(|g| g.surface_id == id) {
                Some(group) => group.lines.push(path.clone()),
                None => groups.push(PolylineGroup {
                    surface_id: id,
                    lines: vec![path.clone()],
                    color: self.colors.get(i).copied().unwrap_or(DEFAULT_COLOR),
                }),
            }
        }
        groups
    }
}

/// Exported particles, one row each.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParticleRows {
    /// Display-ordered positions.
    pub positions: Vec<DisplayPoint>,
    /// World-frame orientation of each particle; columns are its axes.
    pub orientations: Vec<DMat3>,
    /// Feature row of each particle.
    pub features: Vec<FeatureRow>,
}

impl ParticleRows {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Triangle mesh arrays of a surface layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfacePayload {
    pub vertices: Vec<DisplayPoint>,
    pub faces: Vec<[u32; 3]>,
    pub values: Vec<f64>,
}

impl From<DisplayMesh> for SurfacePayload {
    fn from(mesh: DisplayMesh) -> Self {
        Self {
            vertices: mesh.vertices,
            faces: mesh.faces,
            values: mesh.values,
        }
    }
}

/// Array-like content of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    /// Annotation picks.
    Points(Vec<DisplayPoint>),
    /// Exported particles.
    Particles(ParticleRows),
    /// `[position, direction]` pairs.
    Vectors(Vec<[DisplayPoint; 2]>),
    Shapes(ShapesPayload),
    Surface(SurfacePayload),
    Image(Volume<f32>),
    Labels(Volume<u32>),
}

impl Payload {
    /// Layer kind the payload is shown as.
    pub fn kind(&self) -> LayerKind {
        match self {
            Payload::Points(_) | Payload::Particles(_) => LayerKind::Points,
            Payload::Vectors(_) => LayerKind::Vectors,
            Payload::Shapes(_) => LayerKind::Shapes,
            Payload::Surface(_) => LayerKind::Surface,
            Payload::Image(_) => LayerKind::Image,
            Payload::Labels(_) => LayerKind::Labels,
        }
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

/// Provenance and geometry bookkeeping of a layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Experiment the layer belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<String>,
    /// Geometry owned by the store for this layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryKind>,
    /// One color per fitted model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<Color>>,
    /// Whether an image is a stack of independent slices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<bool>,
}

/// Surface shading mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shading {
    Flat,
    Smooth,
}

/// Shape primitive of a shapes layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Path,
}

/// How the viewer should draw a layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderingHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shading: Option<Shading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<ShapeType>,
    /// Colors indexed by surface vertex values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colormap: Option<Vec<Color>>,
    /// Feature column that picks the point color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_color: Option<String>,
    /// Colors cycled through by `face_color` values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_cycle: Option<Vec<Color>>,
}

/// Name, metadata, scale and hints of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerProperties {
    pub name: String,
    pub metadata: Metadata,
    /// Display-ordered physical scale.
    pub scale: [f64; 3],
    pub hints: RenderingHints,
}

impl LayerProperties {
    /// Properties of a layer named `name` with no metadata or hints.
    pub fn new(name: impl Into<String>, scale: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            metadata: Metadata::default(),
            scale,
            hints: RenderingHints::default(),
        }
    }

    /// Sets the experiment id.
    pub fn with_experiment_id(mut self, experiment_id: impl Into<String>) -> Self {
        self.metadata.experiment_id = Some(experiment_id.into());
        self
    }

    /// Replaces the rendering hints.
    pub fn with_hints(mut self, hints: RenderingHints) -> Self {
        self.hints = hints;
        self
    }
}

// =============================================================================
// LAYER DATA
// =============================================================================

/// A `(payload, properties, kind)` record handed to the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerData {
    payload: Payload,
    properties: LayerProperties,
    kind: LayerKind,
}

impl LayerData {
    /// Wraps a payload; the kind follows from it.
    pub fn new(payload: Payload, properties: LayerProperties) -> Self {
        let kind = payload.kind();
        Self {
            payload,
            properties,
            kind,
        }
    }

    /// An annotation points layer.
    pub fn points(points: Vec<DisplayPoint>, experiment_id: &str, scale: [f64; 3]) -> Self {
        let properties = LayerProperties::new(format!("{experiment_id} - points"), scale)
            .with_experiment_id(experiment_id);
        Self::new(Payload::Points(points), properties)
    }

    /// An annotation shapes layer.
    pub fn shapes(shapes: ShapesPayload, experiment_id: &str, scale: [f64; 3]) -> Self {
        let properties = LayerProperties::new(format!("{experiment_id} - shapes"), scale)
            .with_experiment_id(experiment_id);
        Self::new(Payload::Shapes(shapes), properties)
    }

    /// A segmentation layer, scaled like its volume.
    pub fn labels(volume: Volume<u32>, experiment_id: &str) -> Self {
        let properties = LayerProperties::new(format!("{experiment_id} - labels"), volume.scale())
            .with_experiment_id(experiment_id);
        Self::new(Payload::Labels(volume), properties)
    }

    /// A tomogram layer, scaled like its volume.
    pub fn image(volume: Volume<f32>, experiment_id: &str) -> Self {
        let properties = LayerProperties::new(experiment_id, volume.scale())
            .with_experiment_id(experiment_id);
        Self::new(Payload::Image(volume), properties)
    }

    #[inline]
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[inline]
    pub fn properties(&self) -> &LayerProperties {
        &self.properties
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.properties.name
    }

    /// Experiment id from the metadata, if any.
    pub fn experiment_id(&self) -> Option<&str> {
        self.properties.metadata.experiment_id.as_deref()
    }

    pub(crate) fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }

    pub(crate) fn properties_mut(&mut self) -> &mut LayerProperties {
        &mut self.properties
    }

    /// Renders the record as JSON for the viewer.
    pub fn to_json(&self) -> LayerResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

//! # Layer Store
//!
//! Owns every layer record together with the geometry fitted behind it.
//!
//! A generated layer and its geometry share one [`LayerId`]. Sample and
//! resample actions look the geometry up by that id and may update it in
//! place (a new sample separation, for instance), so two actions run in
//! sequence on the same layer observe each other's changes. Geometry is never
//! shared between layers.

use crate::error::{LayerError, LayerResult};
use crate::layer::{GeometryKind, LayerData, LayerId};
use config::constants::PickingConfig;
use std::collections::BTreeMap;
use tomo_geometry::{HelicalFilament, Sphere, SurfaceGrid};
use tracing::debug;

/// Geometry behind a generated layer.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// One grid per fitted surface annotation.
    SurfaceGrids(Vec<SurfaceGrid>),
    /// The spline axis of a picked filament.
    HelicalFilament(HelicalFilament),
    /// One sphere per center/rim pick pair.
    Spheres(Vec<Sphere>),
}

impl Geometry {
    /// Metadata tag of this geometry.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::SurfaceGrids(_) => GeometryKind::SurfaceGrids,
            Geometry::HelicalFilament(_) => GeometryKind::HelicalFilament,
            Geometry::Spheres(_) => GeometryKind::Spheres,
        }
    }

    /// Grids of a surface layer, for resynchronizing their separation.
    pub fn surface_grids_mut(&mut self) -> Option<&mut Vec<SurfaceGrid>> {
        match self {
            Geometry::SurfaceGrids(grids) => Some(grids),
            _ => None,
        }
    }

    /// Filament axis, if this is filament geometry.
    pub fn helical_filament(&self) -> Option<&HelicalFilament> {
        match self {
            Geometry::HelicalFilament(filament) => Some(filament),
            _ => None,
        }
    }

    /// Spheres, if this is sphere geometry.
    pub fn spheres(&self) -> Option<&[Sphere]> {
        match self {
            Geometry::Spheres(spheres) => Some(spheres),
            _ => None,
        }
    }
}

/// Read access to every layer while one geometry is borrowed mutably.
#[derive(Debug, Clone, Copy)]
pub struct LayerView<'a> {
    layers: &'a BTreeMap<LayerId, LayerData>,
}

impl<'a> LayerView<'a> {
    /// Looks up a layer by id.
    pub fn get(&self, id: LayerId) -> LayerResult<&'a LayerData> {
        self.layers.get(&id).ok_or(LayerError::UnknownLayer(id))
    }
}

/// Layers and the geometry they own.
#[derive(Debug, Default)]
pub struct LayerStore {
    layers: BTreeMap<LayerId, LayerData>,
    geometry: BTreeMap<LayerId, Geometry>,
    next_id: u64,
    config: PickingConfig,
}

impl LayerStore {
    /// Creates an empty store with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given configuration.
    pub fn with_config(config: PickingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Picking defaults used by actions on this store.
    #[inline]
    pub fn config(&self) -> &PickingConfig {
        &self.config
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if the store holds no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Adds a layer without geometry.
    pub fn insert(&mut self, layer: LayerData) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        debug!(%id, name = layer.name(), "inserted layer");
        self.layers.insert(id, layer);
        id
    }

    /// Adds a generated layer and takes ownership of its geometry.
    ///
    /// The layer's metadata records the geometry kind.
    pub fn insert_with_geometry(&mut self, mut layer: LayerData, geometry: Geometry) -> LayerId {
        layer.properties_mut().metadata.geometry = Some(geometry.kind());
        let id = self.insert(layer);
        self.geometry.insert(id, geometry);
        id
    }

    /// Returns the layer with the given id.
    pub fn get(&self, id: LayerId) -> LayerResult<&LayerData> {
        self.layers.get(&id).ok_or(LayerError::UnknownLayer(id))
    }

    pub(crate) fn get_mut(&mut self, id: LayerId) -> LayerResult<&mut LayerData> {
        self.layers.get_mut(&id).ok_or(LayerError::UnknownLayer(id))
    }

    /// Removes a layer and drops its geometry.
    pub fn remove(&mut self, id: LayerId) -> Option<LayerData> {
        self.geometry.remove(&id);
        self.layers.remove(&id)
    }

    /// Iterates over all layers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &LayerData)> {
        self.layers.iter().map(|(id, layer)| (*id, layer))
    }

    /// Geometry owned by a layer.
    ///
    /// # Errors
    ///
    /// [`LayerError::UnknownLayer`] for an unknown id,
    /// [`LayerError::InvalidInput`] when the layer owns no geometry.
    pub fn geometry(&self, id: LayerId, operation: &'static str) -> LayerResult<&Geometry> {
        self.get(id)?;
        self.geometry
            .get(&id)
            .ok_or_else(|| no_geometry(id, operation))
    }

    /// Geometry owned by a layer, mutable, with read access to every layer.
    pub fn geometry_mut(
        &mut self,
        id: LayerId,
        operation: &'static str,
    ) -> LayerResult<(&mut Geometry, LayerView<'_>)> {
        let view = LayerView {
            layers: &self.layers,
        };
        view.get(id)?;
        let geometry = self
            .geometry
            .get_mut(&id)
            .ok_or_else(|| no_geometry(id, operation))?;
        Ok((geometry, view))
    }
}

fn no_geometry(id: LayerId, operation: &'static str) -> LayerError {
    LayerError::invalid_input(id, operation, "layer carries no geometry")
}

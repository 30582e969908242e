//! # Tomo Layers
//!
//! Viewer-facing layer records and the picking actions that produce them.
//!
//! ## Architecture
//!
//! ```text
//! annotation layers ──actions──▶ tomo-geometry ──▶ tomo-mesh / tomo-sampler
//!         ▲                                                  │
//!         └──────────── LayerStore (records + geometry) ◀────┘
//! ```
//!
//! A generate action stores the fitted geometry under the id of the layer it
//! creates. Later sample and resample actions find it through that id.
//!
//! ## Usage
//!
//! ```rust
//! use tomo_layers::{actions, LayerData, LayerStore};
//!
//! let mut store = LayerStore::new();
//! let picks = store.insert(LayerData::points(
//!     vec![[0.0, 0.0, 0.0], [0.0, 0.0, 10.0]],
//!     "TS_01",
//!     [1.0; 3],
//! ));
//! let spheres = actions::generate_spheres(&mut store, picks).unwrap();
//! let particles = actions::sphere_particles(&mut store, spheres, 2.0).unwrap();
//! assert_eq!(store.get(spheres).unwrap().name(), "TS_01 - surface");
//! assert_eq!(
//!     store.get(particles.points).unwrap().name(),
//!     "TS_01 - particle positions (spheres picked)"
//! );
//! ```

pub mod actions;
pub mod error;
pub mod export;
pub mod layer;
pub mod store;

pub use actions::ParticleLayerIds;
pub use error::{LayerError, LayerResult};
pub use export::{ParticleExporter, ParticleLayers};
pub use layer::{
    FeatureRow, FeatureValue, GeometryKind, LayerData, LayerId, LayerKind, LayerProperties,
    Metadata, ParticleRows, Payload, RenderingHints, Shading, ShapeType, ShapesPayload,
    SurfacePayload,
};
pub use store::{Geometry, LayerStore, LayerView};

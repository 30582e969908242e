use crate::error::{LayerError, LayerResult};
use crate::layer::{LayerId, Payload};
use crate::store::LayerStore;
use tomo_geometry::frames::euler_zyz_degrees;
use tracing::info;

/// Overwrites the orientation of selected particle rows.
///
/// The new orientation is the intrinsic ZYZ rotation `(rot, tilt, psi)` in
/// degrees. The selection is checked in full before any row changes.
///
/// # Errors
///
/// [`LayerError::NotParticles`] when the layer has no experiment id or holds
/// no particle rows, [`LayerError::InvalidSelection`] for an out-of-range row.
pub fn rotate_particles(
    store: &mut LayerStore,
    particles: LayerId,
    selection: &[usize],
    rot: f64,
    tilt: f64,
    psi: f64,
) -> LayerResult<()> {
    let layer = store.get_mut(particles)?;
    if layer.experiment_id().is_none() {
        return Err(LayerError::NotParticles(particles));
    }
    let Payload::Particles(rows) = layer.payload_mut() else {
        return Err(LayerError::NotParticles(particles));
    };
    let len = rows.len();
    if let Some(&index) = selection.iter().find(|&&i| i >= len) {
        return Err(LayerError::InvalidSelection { index, len });
    }

    let orientation = euler_zyz_degrees(rot, tilt, psi);
    for &index in selection {
        rows.orientations[index] = orientation;
    }
    info!(%particles, rows = selection.len(), rot, tilt, psi, "rotated particles");
    Ok(())
}

//! # Colormap Values
//!
//! Meshes of several models share one colormap with one entry per model.
//! Every vertex carries `ordinal / count`, which indexes that colormap.

use crate::mesh::Mesh;
use config::constants::SINGLE_COLOR_VALUE_SHIFT;
use tomo_geometry::Color;

/// A merged mesh together with the colormap its values index.
#[derive(Debug, Clone, PartialEq)]
pub struct ColoredMesh {
    /// Merged mesh with one value per vertex.
    pub mesh: Mesh,
    /// One color per source model.
    pub colormap: Vec<Color>,
}

/// Number of distinct colors, compared bitwise.
pub fn distinct_colors(colors: &[Color]) -> usize {
    let mut keys: Vec<[u32; 4]> = colors.iter().map(|c| c.map(f32::to_bits)).collect();
    keys.sort_unstable();
    keys.dedup();
    keys.len()
}

/// Colormap value of the model at `ordinal` out of `count`.
///
/// Values lie in `[0, 1)`. With a single distinct color they are shifted by
/// [`SINGLE_COLOR_VALUE_SHIFT`] so they never land on the background entry
/// the viewer reserves at index 0.
///
/// # Example
///
/// ```rust
/// use tomo_mesh::colormap::model_value;
///
/// assert_eq!(model_value(1, 4, false), 0.25);
/// assert_eq!(model_value(0, 1, true), 1.0);
/// ```
pub fn model_value(ordinal: usize, count: usize, single_color: bool) -> f64 {
    let value = ordinal as f64 / count.max(1) as f64;
    if single_color {
        value + SINGLE_COLOR_VALUE_SHIFT
    } else {
        value
    }
}

/// Merges per-model meshes, tagging each vertex with its model value.
pub(crate) fn merge_colored(parts: Vec<Mesh>, colors: &[Color]) -> ColoredMesh {
    let single_color = distinct_colors(colors) == 1;
    let count = parts.len();
    let mut merged = Mesh::new();
    for (ordinal, mut part) in parts.into_iter().enumerate() {
        part.set_uniform_value(model_value(ordinal, count, single_color));
        merged.merge(&part);
    }
    ColoredMesh {
        mesh: merged,
        colormap: colors.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_colors() {
        let red = [1.0, 0.0, 0.0, 1.0];
        let blue = [0.0, 0.0, 1.0, 1.0];
        assert_eq!(distinct_colors(&[red, red]), 1);
        assert_eq!(distinct_colors(&[red, blue, red]), 2);
        assert_eq!(distinct_colors(&[]), 0);
    }

    #[test]
    fn test_values_normalized_below_one() {
        let values: Vec<f64> = (0..3).map(|i| model_value(i, 3, false)).collect();
        assert_eq!(values[0], 0.0);
        assert!(values.iter().all(|&v| (0.0..1.0).contains(&v)));
    }

    #[test]
    fn test_single_color_shifts_every_model() {
        assert_eq!(model_value(0, 2, true), 1.0);
        assert_eq!(model_value(1, 2, true), 1.5);
    }
}

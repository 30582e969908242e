//! # Label Contours
//!
//! Extracts boundary paths from a segmented label volume, slice by slice.
//!
//! ## Algorithm
//!
//! For every non-zero label and every `slicing_step`-th slice along `axis`:
//! 1. Threshold the slice to a binary mask of that label (zero padded)
//! 2. Run marching squares on pixel centers; every crossing lies on a cell
//!    edge midpoint, keyed on a doubled integer grid
//! 3. Chain segments into closed loops and keep the longest
//! 4. Keep every `sampling_step`-th vertex
//!
//! Paths are returned in display order, grouped per label.

use crate::coords::DisplayPoint;
use crate::error::{GeometryError, GeometryResult};
use crate::volume::Volume;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Contour lines of one label, one per slice that contains it.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPaths {
    /// Label value.
    pub label: u32,
    /// Display-ordered paths, ordered by slice index.
    pub lines: Vec<Vec<DisplayPoint>>,
}

/// Extracts per-slice contour paths for every label in `volume`.
///
/// # Arguments
///
/// * `volume` - Display-ordered label volume (0 is background)
/// * `axis` - Display axis to slice along
/// * `slicing_step` - Slice interval
/// * `sampling_step` - Keep every n-th contour vertex
pub fn label_paths_3d(
    volume: &Volume<u32>,
    axis: usize,
    slicing_step: usize,
    sampling_step: usize,
) -> GeometryResult<Vec<LabelPaths>> {
    if slicing_step == 0 {
        return Err(GeometryError::invalid_parameter("slicing_step", "must be >= 1"));
    }
    if sampling_step == 0 {
        return Err(GeometryError::invalid_parameter("sampling_step", "must be >= 1"));
    }
    if axis > 2 {
        return Err(GeometryError::invalid_parameter("axis", format!("must be 0, 1 or 2, got {axis}")));
    }

    let labels: BTreeSet<u32> = volume.data().iter().copied().filter(|&l| l != 0).collect();
    let (a, b) = match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    };

    let mut paths: BTreeMap<u32, Vec<Vec<DisplayPoint>>> = BTreeMap::new();
    for index in (0..volume.shape()[axis]).step_by(slicing_step) {
        let (rows, cols, values) = volume.slice(axis, index)?;
        for &label in &labels {
            let mask: Vec<bool> = values.iter().map(|&v| v == label).collect();
            let Some(contour) = longest_contour(&mask, rows, cols) else {
                continue;
            };
            let line: Vec<DisplayPoint> = contour
                .into_iter()
                .step_by(sampling_step)
                .map(|(r, c)| {
                    let mut p = [0.0; 3];
                    p[axis] = index as f64;
                    p[a] = r;
                    p[b] = c;
                    p
                })
                .collect();
            paths.entry(label).or_default().push(line);
        }
    }

    debug!(labels = paths.len(), axis, slicing_step, sampling_step, "extracted label contours");
    Ok(paths
        .into_iter()
        .map(|(label, lines)| LabelPaths { label, lines })
        .collect())
}

/// Doubled-grid key of a cell edge midpoint in the padded mask.
type EdgeKey = (i64, i64);

/// Returns the longest closed boundary of a binary mask as `(row, col)` points.
pub fn longest_contour(mask: &[bool], rows: usize, cols: usize) -> Option<Vec<(f64, f64)>> {
    contours(mask, rows, cols)
        .into_iter()
        .enumerate()
        // Ties keep the first loop found.
        .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then(ib.cmp(ia)))
        .map(|(_, contour)| contour)
}

/// Returns every closed boundary of a binary mask.
pub fn contours(mask: &[bool], rows: usize, cols: usize) -> Vec<Vec<(f64, f64)>> {
    // Padding guarantees every boundary is a closed loop.
    let inside = |r: i64, c: i64| -> bool {
        if r < 1 || c < 1 || r > rows as i64 || c > cols as i64 {
            return false;
        }
        mask[(r as usize - 1) * cols + (c as usize - 1)]
    };

    let mut adjacency: BTreeMap<EdgeKey, Vec<EdgeKey>> = BTreeMap::new();
    for r in 0..=rows as i64 {
        for c in 0..=cols as i64 {
            let case = (inside(r, c) as u8) << 3
                | (inside(r, c + 1) as u8) << 2
                | (inside(r + 1, c + 1) as u8) << 1
                | inside(r + 1, c) as u8;

            let top = (2 * r, 2 * c + 1);
            let right = (2 * r + 1, 2 * c + 2);
            let bottom = (2 * r + 2, 2 * c + 1);
            let left = (2 * r + 1, 2 * c);

            let segments: &[(EdgeKey, EdgeKey)] = match case {
                1 | 14 => &[(left, bottom)],
                2 | 13 => &[(bottom, right)],
                3 | 12 => &[(left, right)],
                4 | 11 => &[(top, right)],
                5 => &[(top, right), (left, bottom)],
                6 | 9 => &[(top, bottom)],
                7 | 8 => &[(left, top)],
                10 => &[(left, top), (bottom, right)],
                _ => &[],
            };
            for &(p, q) in segments {
                adjacency.entry(p).or_default().push(q);
                adjacency.entry(q).or_default().push(p);
            }
        }
    }

    let mut visited: BTreeSet<EdgeKey> = BTreeSet::new();
    let mut loops = Vec::new();
    for &start in adjacency.keys() {
        if visited.contains(&start) {
            continue;
        }
        let mut contour = Vec::new();
        let mut current = start;
        loop {
            visited.insert(current);
            contour.push(((current.0 as f64) * 0.5 - 1.0, (current.1 as f64) * 0.5 - 1.0));
            let next = adjacency
                .get(&current)
                .and_then(|neighbors| neighbors.iter().find(|n| !visited.contains(n)));
            match next {
                Some(&n) => current = n,
                None => break,
            }
        }
        loops.push(contour);
    }
    loops
}

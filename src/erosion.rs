//! Erosion - two interchangeable strategies over the filled surface.
//!
//! Both strategies read a pre-round snapshot and write a fresh buffer, so
//! per-cell results are independent of processing order and runs are
//! reproducible. SimpleDowncut is a single pass over river cells driven by
//! flux; NeighborBased iterates the whole grid on topology alone.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_ELEVATION, STABLE_HIGHER_NEIGHBORS};
use crate::graph::TerrainGraph;
use crate::settings::HydrologySettings;

/// Erosion model, selected once at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErosionStrategy {
    /// Leave the filled surface untouched.
    None,
    /// Single flux-driven downcut pass over river cells.
    SimpleDowncut,
    /// Iterative topology-driven smoothing of the whole grid.
    NeighborBased,
}

/// Apply the configured erosion strategy to the filled surface and return
/// the final elevations.
pub fn apply(
    graph: &TerrainGraph,
    filled: &[u8],
    flux: &[f32],
    river_of: &[Option<usize>],
    settings: &HydrologySettings,
) -> Vec<u8> {
    match settings.erosion {
        ErosionStrategy::None => filled.to_vec(),
        ErosionStrategy::SimpleDowncut => simple_downcut(graph, filled, flux, river_of, settings),
        ErosionStrategy::NeighborBased => neighbor_based(graph, filled, settings),
    }
}

/// Downcut each river cell in proportion to its flux relative to the mean
/// flux of its higher neighbors.
///
/// All reads go to the pre-erosion snapshot; each cell writes only its own
/// slot of the output, so the pass parallelizes cleanly.
fn simple_downcut(
    graph: &TerrainGraph,
    filled: &[u8],
    flux: &[f32],
    river_of: &[Option<usize>],
    settings: &HydrologySettings,
) -> Vec<u8> {
    let max_downcut = settings.max_downcut;
    (0..graph.num_cells())
        .into_par_iter()
        .map(|id| {
            let elevation = filled[id];
            if river_of[id].is_none()
                || !graph.is_land(id)
                || elevation < settings.min_erosion_height
                || flux[id] <= 0.0
            {
                return elevation;
            }

            let higher: Vec<usize> = graph
                .neighbors(id)
                .iter()
                .copied()
                .filter(|&n| filled[n] > elevation)
                .collect();
            if higher.is_empty() {
                return elevation;
            }

            let contributing: Vec<f32> = higher
                .iter()
                .map(|&n| flux[n])
                .filter(|&f| f > 0.0)
                .collect();
            let avg_higher_flux = if contributing.is_empty() {
                1.0
            } else {
                contributing.iter().sum::<f32>() / contributing.len() as f32
            };

            let power = flux[id] / avg_higher_flux;
            let downcut = (power.floor() as i64).clamp(0, max_downcut as i64) as u8;

            // Floor at sea level without ever raising a cell.
            let floor = settings.sea_level.min(elevation);
            elevation.saturating_sub(downcut).max(floor)
        })
        .collect()
}

/// Iteratively relax every land cell toward three higher neighbors.
///
/// Each round reads only the previous round's buffer and clamps land cells
/// back into the elevation band; the double buffer is what keeps results
/// order-independent.
fn neighbor_based(graph: &TerrainGraph, filled: &[u8], settings: &HydrologySettings) -> Vec<u8> {
    let n = graph.num_cells();
    let sea = settings.sea_level as f32;
    let ceiling = MAX_ELEVATION as f32;

    let mut previous: Vec<f32> = filled.iter().map(|&e| e as f32).collect();

    for _ in 0..settings.erosion_iterations {
        let next: Vec<f32> = (0..n)
            .into_par_iter()
            .map(|id| {
                if !graph.is_land(id) {
                    return previous[id];
                }
                let higher = graph
                    .neighbors(id)
                    .iter()
                    .filter(|&&nb| previous[nb] > previous[id])
                    .count() as f32;
                let delta = settings.erosion_amount * (higher - STABLE_HIGHER_NEIGHBORS);
                (previous[id] + delta).clamp(sea, ceiling)
            })
            .collect();
        previous = next;
    }

    previous
        .iter()
        .enumerate()
        .map(|(id, &value)| {
            if graph.is_land(id) {
                value.round().clamp(0.0, ceiling) as u8
            } else {
                filled[id]
            }
        })
        .collect()
}

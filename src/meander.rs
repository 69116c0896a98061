//! Meandering - densifying river polylines into terrain-aware curves.

use glam::Vec2;
use rand::Rng;

use crate::constants::*;
use crate::graph::TerrainGraph;
use crate::rivers::River;
use crate::settings::HydrologySettings;

/// Build the meandered path for one river.
///
/// Every consecutive pair of cell centers gains `k` interpolated points,
/// each offset perpendicular to the segment by a sine wave whose amplitude
/// shrinks with distance from the source and with segment steepness. Cell
/// centers themselves are kept at zero offset, so the path begins exactly
/// at the source center and ends exactly at the mouth center.
///
/// One phase origin is drawn from the stage RNG per river, which is the
/// only randomness the pipeline consumes.
pub fn build<R: Rng>(
    river: &River,
    graph: &TerrainGraph,
    elevation: &[u8],
    settings: &HydrologySettings,
    rng: &mut R,
) -> Vec<Vec2> {
    let cells = &river.cells;
    let phase_origin = rng.gen_range(0.0..std::f32::consts::TAU);

    match cells.len() {
        0 => return Vec::new(),
        1 => return vec![graph.cell(cells[0]).center],
        _ => {}
    }

    let points_per_segment = settings.meander_points_per_segment as usize;
    let mut path = Vec::with_capacity(cells.len() + (cells.len() - 1) * points_per_segment);
    path.push(graph.cell(cells[0]).center);

    for segment in 0..cells.len() - 1 {
        let a = graph.cell(cells[segment]).center;
        let b = graph.cell(cells[segment + 1]).center;
        let direction = b - a;
        let length = direction.length();

        if length <= f32::EPSILON {
            path.push(b);
            continue;
        }

        let perpendicular = Vec2::new(-direction.y, direction.x) / length;
        let slope =
            (elevation[cells[segment]] as f32 - elevation[cells[segment + 1]] as f32).abs();
        let amplitude = settings.meandering_factor
            * MEANDER_AMPLITUDE_FRACTION
            * length
            * distance_decay(segment)
            * terrain_damping(slope);

        for point in 1..=points_per_segment {
            let t = point as f32 / (points_per_segment + 1) as f32;
            let along = segment as f32 + t;
            let offset = amplitude * (phase_origin + along * MEANDER_PHASE_STEP).sin();
            path.push(a + direction * t + perpendicular * offset);
        }
        path.push(b);
    }

    path
}

/// Amplitude falloff with distance from the source, non-increasing.
fn distance_decay(segment: usize) -> f32 {
    1.0 / (1.0 + MEANDER_DECAY_RATE * segment as f32)
}

/// Amplitude damping with segment steepness.
fn terrain_damping(slope: f32) -> f32 {
    1.0 / (1.0 + MEANDER_SLOPE_DAMPING * slope)
}

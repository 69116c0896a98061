//! Flow accumulation over the downstream forest.

use std::collections::VecDeque;

use crate::drainage::Drainage;
use crate::graph::TerrainGraph;

/// Accumulate flux through the drainage forest.
///
/// Every cell contributes one unit of rainfall. Cells are processed in
/// dependency order with a pending-inflow count per cell: a cell is ready
/// once all of its upstream contributors have been folded in, so each cell
/// is visited exactly once and no cycles are possible given the strict
/// descent of the drainage stage.
///
/// The ready queue is seeded in ascending id order and drained FIFO, which
/// fixes the floating-point summation order and keeps repeated runs
/// byte-identical.
///
/// Flux is meaningful for land cells (always >= 1). Ocean cells accumulate
/// the inflow of rivers draining into them but are never river candidates.
pub fn accumulate(graph: &TerrainGraph, drainage: &Drainage) -> Vec<f32> {
    let n = graph.num_cells();

    let mut pending = vec![0usize; n];
    for down in drainage.downstream.iter().flatten() {
        pending[*down] += 1;
    }

    let mut flux = vec![1.0f32; n];
    let mut ready: VecDeque<usize> = (0..n).filter(|&id| pending[id] == 0).collect();
    let mut processed = 0usize;

    while let Some(id) = ready.pop_front() {
        processed += 1;
        if let Some(down) = drainage.downstream[id] {
            flux[down] += flux[id];
            pending[down] -= 1;
            if pending[down] == 0 {
                ready.push_back(down);
            }
        }
    }

    debug_assert_eq!(processed, n, "drainage forest contains a cycle");

    flux
}

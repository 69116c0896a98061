//! River extraction - tracing flux channels into river entities.
//!
//! Algorithm:
//! 1. Threshold flux to pick candidate cells. Flux is non-decreasing
//!    downstream, so everything below a candidate is also a candidate
//! 2. Trace downstream from each source (a candidate with no candidate
//!    upstream), claiming cells, until the ocean, a sink, or a cell claimed
//!    by an earlier trace
//! 3. At a junction the branch with the higher flux keeps the main stem:
//!    either the arriving trace stops one cell short and becomes a
//!    tributary, or it takes over the incumbent's downstream course and the
//!    incumbent is demoted
//! 4. Classify the survivors: width from mouth flux, kind from width,
//!    seasonal from mean precipitation along the path

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::drainage::Drainage;
use crate::graph::TerrainGraph;
use crate::settings::HydrologySettings;

/// River class, derived from the pre-reduction width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiverKind {
    /// Width 1-2.
    Stream,
    /// Width 3-8.
    River,
    /// Width 9 and up.
    Major,
}

impl RiverKind {
    /// Classify a pre-reduction width.
    pub fn from_width(width: u8) -> Self {
        if width <= STREAM_WIDTH_MAX {
            RiverKind::Stream
        } else if width <= RIVER_WIDTH_MAX {
            RiverKind::River
        } else {
            RiverKind::Major
        }
    }
}

/// A traced river channel.
///
/// Cells run from source to mouth and never repeat. The mouth is an ocean
/// cell for rivers reaching the sea, or a sink cell for rivers ending in a
/// closed basin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct River {
    /// Stable index of this river in the extraction output.
    pub id: usize,

    /// Cell path from source to mouth.
    pub cells: Vec<usize>,

    /// First cell of the path.
    pub source: usize,

    /// Last cell of the path.
    pub mouth: usize,

    /// Stored width, 1-20. Already reduced for seasonal rivers.
    pub width: u8,

    /// Class, always derived from the pre-reduction width.
    pub kind: RiverKind,

    /// Main stem this river joins at its mouth, if any.
    pub parent: Option<usize>,

    /// Whether mean precipitation along the path is below the seasonal
    /// threshold.
    pub seasonal: bool,

    /// Display name from the naming collaborator, if one was installed.
    pub name: Option<String>,

    /// Meandered path, populated by the meander stage when enabled.
    pub path: Vec<Vec2>,
}

/// Extraction output: the rivers plus the per-cell ownership marker.
pub struct Extraction {
    /// All traced rivers, ids dense and ascending in trace order.
    pub rivers: Vec<River>,

    /// For each cell, the river that owns it.
    pub river_of: Vec<Option<usize>>,
}

/// Extract rivers from the accumulated flux.
pub fn extract(
    graph: &TerrainGraph,
    drainage: &Drainage,
    flux: &[f32],
    settings: &HydrologySettings,
) -> Extraction {
    let n = graph.num_cells();

    let candidate: Vec<bool> = (0..n)
        .map(|id| graph.is_land(id) && flux[id] >= settings.river_threshold)
        .collect();

    // A source is a candidate no other candidate drains into.
    let mut has_candidate_inflow = vec![false; n];
    for id in 0..n {
        if candidate[id] {
            if let Some(down) = drainage.downstream[id] {
                has_candidate_inflow[down] = true;
            }
        }
    }

    let mut owner: Vec<Option<usize>> = vec![None; n];
    let mut traces: Vec<Vec<usize>> = Vec::new();

    for start in 0..n {
        if !candidate[start] || has_candidate_inflow[start] || owner[start].is_some() {
            continue;
        }
        let id = traces.len();
        let mut cells = vec![start];
        owner[start] = Some(id);
        let mut current = start;

        loop {
            // A sink ends the trace; the mouth cell seeds a lake later.
            let Some(next) = drainage.downstream[current] else {
                break;
            };

            if let Some(incumbent) = owner[next] {
                junction(&mut traces, &mut owner, id, incumbent, next, &mut cells, flux);
                break;
            }

            cells.push(next);
            owner[next] = Some(id);
            if graph.is_ocean(next) {
                break;
            }
            current = next;
        }

        traces.push(cells);
    }

    assemble(graph, drainage, flux, settings, traces, owner)
}

/// Resolve a junction where a trace reaches a cell claimed by an earlier
/// river.
///
/// The branch carrying more flux into the junction keeps the main stem. If
/// that is the arriving trace, it takes over the incumbent's cells from the
/// junction down and the incumbent is truncated to its upstream remainder;
/// ties keep the incumbent. The losing branch stops one cell short of the
/// junction and is linked as a tributary during assembly.
fn junction(
    traces: &mut [Vec<usize>],
    owner: &mut [Option<usize>],
    arriving: usize,
    incumbent: usize,
    at: usize,
    cells: &mut Vec<usize>,
    flux: &[f32],
) {
    let incumbent_cells = &mut traces[incumbent];
    let position = incumbent_cells
        .iter()
        .position(|&cell| cell == at)
        .expect("junction cell is claimed by the incumbent");

    // A trace can only reach another river mid-course: sources have no
    // candidate upstream, so a junction at position 0 cannot occur.
    if position == 0 {
        return;
    }

    let arriving_flux = flux[*cells.last().expect("trace starts non-empty")];
    let incumbent_flux = flux[incumbent_cells[position - 1]];

    if arriving_flux > incumbent_flux {
        let tail = incumbent_cells.split_off(position);
        for &cell in &tail {
            owner[cell] = Some(arriving);
        }
        cells.extend(tail);
    }
}

/// Turn raw traces into classified rivers with dense ids.
fn assemble(
    graph: &TerrainGraph,
    drainage: &Drainage,
    flux: &[f32],
    settings: &HydrologySettings,
    traces: Vec<Vec<usize>>,
    owner: Vec<Option<usize>>,
) -> Extraction {
    let n = graph.num_cells();

    // Drop traces with fewer than two land cells: coastal stubs that leave
    // land immediately, and stems truncated to nothing by a takeover.
    let mut remap: FxHashMap<usize, usize> = FxHashMap::default();
    let mut kept: Vec<Vec<usize>> = Vec::new();
    for (provisional, cells) in traces.into_iter().enumerate() {
        let land_cells = cells.iter().filter(|&&c| graph.is_land(c)).count();
        if land_cells < 2 {
            continue;
        }
        remap.insert(provisional, kept.len());
        kept.push(cells);
    }

    let mut river_of: Vec<Option<usize>> = vec![None; n];
    for id in 0..n {
        if let Some(provisional) = owner[id] {
            river_of[id] = remap.get(&provisional).copied();
        }
    }

    let rivers = kept
        .into_iter()
        .enumerate()
        .map(|(id, cells)| {
            let source = cells[0];
            let mouth = *cells.last().expect("kept traces have cells");

            // Tributary link: the cell just past the mouth, when it exists
            // and belongs to another river, is the junction into the parent.
            let parent = match drainage.downstream[mouth] {
                Some(next) if graph.is_land(mouth) => {
                    river_of[next].filter(|&other| other != id)
                }
                _ => None,
            };

            let raw_width = scale_width(flux[mouth]);
            let kind = RiverKind::from_width(raw_width);

            let land: Vec<usize> = cells
                .iter()
                .copied()
                .filter(|&c| graph.is_land(c))
                .collect();
            let mean_precipitation = land
                .iter()
                .map(|&c| graph.cell(c).precipitation as f32)
                .sum::<f32>()
                / land.len() as f32;
            let seasonal = mean_precipitation < settings.seasonal_precipitation_threshold;

            let width = if seasonal {
                ((raw_width as f32 * SEASONAL_WIDTH_FACTOR).round() as u8).max(MIN_RIVER_WIDTH)
            } else {
                raw_width
            };

            River {
                id,
                cells,
                source,
                mouth,
                width,
                kind,
                parent,
                seasonal,
                name: None,
                path: Vec::new(),
            }
        })
        .collect();

    Extraction { rivers, river_of }
}

/// Map mouth flux to a stored width on the logarithmic scale.
fn scale_width(flux: f32) -> u8 {
    let width = (1.0 + flux).ln().round() as i64;
    width.clamp(MIN_RIVER_WIDTH as i64, MAX_RIVER_WIDTH as i64) as u8
}

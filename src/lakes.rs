//! Lake resolution - closed-basin classification from the water balance.
//!
//! Runs after erosion settles the final elevations. Sink cells from the
//! drainage stage (plus any below-sea-level land the upstream classifier
//! left unflagged) flood-fill into lake components; each component is
//! weighed as inflow against evaporation to decide whether it spills.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::drainage::Drainage;
use crate::graph::TerrainGraph;
use crate::rivers::River;
use crate::settings::HydrologySettings;

/// Lake water type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LakeKind {
    /// Open basin with an outlet; water cycles through.
    Freshwater,
    /// Closed basin; evaporation concentrates salts.
    Saltwater,
}

/// A lake occupying one component of retained basin cells.
///
/// Created once, after erosion; never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lake {
    /// Stable index of this lake.
    pub id: usize,

    /// Member cells, ascending.
    pub cells: Vec<usize>,

    /// Land cells adjacent to a member, ascending.
    pub shoreline: Vec<usize>,

    /// Spill cell for open lakes, `None` for closed basins.
    pub outlet: Option<usize>,

    /// Water entering the lake: river mouths plus direct precipitation.
    pub inflow: f32,

    /// Water leaving the lake surface, never negative.
    pub evaporation: f32,

    /// Surface area in cells.
    pub area: usize,

    /// Mean temperature over the member cells.
    pub temperature: f32,

    /// Mean precipitation over the member cells.
    pub precipitation: f32,

    /// Whether evaporation meets or exceeds inflow.
    pub closed: bool,

    /// Saltwater for closed basins, freshwater otherwise.
    pub kind: LakeKind,
}

/// Group retained basins into lakes and classify them.
pub fn resolve(
    graph: &TerrainGraph,
    drainage: &Drainage,
    flux: &[f32],
    elevation: &[u8],
    rivers: &[River],
    settings: &HydrologySettings,
) -> (Vec<Lake>, Vec<Option<usize>>) {
    let n = graph.num_cells();

    let seed: Vec<bool> = (0..n)
        .map(|id| {
            graph.is_land(id)
                && (drainage.downstream[id].is_none() || elevation[id] < settings.sea_level)
        })
        .collect();

    let mut lake_of: Vec<Option<usize>> = vec![None; n];
    let mut components: Vec<Vec<usize>> = Vec::new();

    // Flood-fill contiguous seed cells into components, ascending start id
    for start in 0..n {
        if !seed[start] || lake_of[start].is_some() {
            continue;
        }
        let lake_id = components.len();
        let mut members = Vec::new();
        let mut queue = VecDeque::new();
        lake_of[start] = Some(lake_id);
        queue.push_back(start);

        while let Some(id) = queue.pop_front() {
            members.push(id);
            for &neighbor in graph.neighbors(id) {
                if seed[neighbor] && lake_of[neighbor].is_none() {
                    lake_of[neighbor] = Some(lake_id);
                    queue.push_back(neighbor);
                }
            }
        }

        members.sort_unstable();
        components.push(members);
    }

    // River inflow per component: every river whose mouth lies in the lake
    let mut river_inflow = vec![0.0f32; components.len()];
    for river in rivers {
        if let Some(lake_id) = lake_of[river.mouth] {
            river_inflow[lake_id] += flux[river.mouth];
        }
    }

    let lakes = components
        .into_iter()
        .enumerate()
        .map(|(id, cells)| build_lake(graph, elevation, settings, id, cells, river_inflow[id], &lake_of))
        .collect();

    (lakes, lake_of)
}

fn build_lake(
    graph: &TerrainGraph,
    elevation: &[u8],
    settings: &HydrologySettings,
    id: usize,
    cells: Vec<usize>,
    river_inflow: f32,
    lake_of: &[Option<usize>],
) -> Lake {
    let area = cells.len();

    let mut shoreline: Vec<usize> = cells
        .iter()
        .flat_map(|&member| graph.neighbors(member).iter().copied())
        .filter(|&n| graph.is_land(n) && lake_of[n] != Some(id))
        .collect();
    shoreline.sort_unstable();
    shoreline.dedup();

    let temperature = cells
        .iter()
        .map(|&c| graph.cell(c).temperature as f32)
        .sum::<f32>()
        / area as f32;
    let precipitation = cells
        .iter()
        .map(|&c| graph.cell(c).precipitation as f32)
        .sum::<f32>()
        / area as f32;

    let inflow = river_inflow + precipitation * area as f32 * LAKE_PRECIPITATION_INFLOW;

    let temp_factor = (temperature + EVAPORATION_TEMP_OFFSET).max(0.0) / EVAPORATION_TEMP_SCALE;
    let evaporation = (area as f32 * temp_factor * settings.base_evaporation_rate
        - precipitation * area as f32 * EVAPORATION_PRECIPITATION_REDUCTION)
        .max(0.0);

    let closed = evaporation >= inflow;

    // Open lakes spill over the lowest shoreline cell; ties break by the
    // ascending sort above.
    let outlet = if closed {
        None
    } else {
        shoreline
            .iter()
            .copied()
            .min_by_key(|&cell| (elevation[cell], cell))
    };

    Lake {
        id,
        cells,
        shoreline,
        outlet,
        inflow,
        evaporation,
        area,
        temperature,
        precipitation,
        closed,
        kind: if closed {
            LakeKind::Saltwater
        } else {
            LakeKind::Freshwater
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drainage;
    use crate::flux::accumulate;
    use crate::graph::fixtures::grid;
    use crate::graph::Cell;
    use crate::rivers;

    /// 5x5 grid with an interior pit that fills to a single-cell sink.
    fn basin_graph(temperature: i8, precipitation: u8) -> TerrainGraph {
        let mut elevation = [0u8; 25];
        for row in 1..4 {
            for col in 1..4 {
                elevation[row * 5 + col] = 50;
            }
        }
        elevation[12] = 30;
        let base = grid(5, 5, &elevation);
        let cells: Vec<Cell> = base
            .cells()
            .iter()
            .cloned()
            .map(|mut cell| {
                cell.temperature = temperature;
                cell.precipitation = precipitation;
                cell
            })
            .collect();
        TerrainGraph::new(cells, DEFAULT_SEA_LEVEL)
    }

    fn resolve_all(
        graph: &TerrainGraph,
        settings: &HydrologySettings,
    ) -> (Vec<Lake>, Vec<Option<usize>>) {
        let drained = drainage::resolve(graph).unwrap();
        let flux = accumulate(graph, &drained);
        let extraction = rivers::extract(graph, &drained, &flux, settings);
        resolve(
            graph,
            &drained,
            &flux,
            &drained.filled,
            &extraction.rivers,
            settings,
        )
    }

    #[test]
    fn arid_basin_is_closed_saltwater() {
        let graph = basin_graph(30, 2);
        let settings = HydrologySettings::default();
        let (lakes, lake_of) = resolve_all(&graph, &settings);

        assert_eq!(lakes.len(), 1);
        let lake = &lakes[0];
        assert_eq!(lake.cells, vec![12]);
        assert_eq!(lake.area, 1);
        assert!(lake.closed);
        assert_eq!(lake.kind, LakeKind::Saltwater);
        assert_eq!(lake.outlet, None);
        assert!(lake.evaporation >= lake.inflow);
        assert_eq!(lake_of[12], Some(0));
    }

    #[test]
    fn wet_basin_is_open_with_lowest_outlet() {
        let graph = basin_graph(5, 90);
        let settings = HydrologySettings::default();
        let (lakes, _) = resolve_all(&graph, &settings);

        assert_eq!(lakes.len(), 1);
        let lake = &lakes[0];
        assert!(!lake.closed);
        assert_eq!(lake.kind, LakeKind::Freshwater);
        // All shoreline cells sit at the same filled elevation; the tie
        // breaks to the lowest id.
        assert_eq!(lake.outlet, Some(7));
        assert!(lake.inflow > lake.evaporation);
    }

    #[test]
    fn shoreline_excludes_members_and_ocean() {
        let graph = basin_graph(15, 50);
        let settings = HydrologySettings::default();
        let (lakes, _) = resolve_all(&graph, &settings);

        let lake = &lakes[0];
        assert_eq!(lake.shoreline, vec![7, 11, 13, 17]);
        for &cell in &lake.shoreline {
            assert!(graph.is_land(cell));
            assert!(!lake.cells.contains(&cell));
        }
    }

    #[test]
    fn evaporation_never_negative() {
        // Freezing, saturated climate drives the balance hard negative
        // before the floor.
        let graph = basin_graph(-30, 100);
        let settings = HydrologySettings::default();
        let (lakes, _) = resolve_all(&graph, &settings);
        assert_eq!(lakes[0].evaporation, 0.0);
    }

    #[test]
    fn closure_matches_water_balance() {
        for (temperature, precipitation) in [(30, 2), (5, 90), (15, 50), (-10, 10)] {
            let graph = basin_graph(temperature, precipitation);
            let settings = HydrologySettings::default();
            let (lakes, _) = resolve_all(&graph, &settings);
            for lake in &lakes {
                assert_eq!(lake.closed, lake.evaporation >= lake.inflow);
                if lake.closed {
                    assert_eq!(lake.outlet, None);
                    assert_eq!(lake.kind, LakeKind::Saltwater);
                }
            }
        }
    }
}

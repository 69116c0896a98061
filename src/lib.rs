//! Hydrological network generation over an irregular terrain cell graph.
//!
//! The pipeline derives drainage, rivers, erosion, and lakes from a
//! tessellated heightmap, in strict stage order:
//!
//! 1. Drainage - priority-flood depression filling and flow directions
//! 2. Flow accumulation - per-cell flux over the drainage forest
//! 3. River extraction - tracing flux channels into river entities
//! 4. Erosion - flux-driven downcut or topology-driven relaxation
//! 5. Lakes - closed-basin classification from the water balance
//! 6. Meandering - densifying river polylines into curves
//!
//! Each stage consumes only the previous stage's output plus the immutable
//! [`TerrainGraph`], and the whole run is deterministic: the same graph,
//! settings, and seed reproduce byte-identical output.

mod constants;
mod drainage;
mod erosion;
mod error;
mod flux;
mod graph;
mod lakes;
mod meander;
mod rivers;
mod settings;

pub use constants::*;
pub use erosion::ErosionStrategy;
pub use error::HydrologyError;
pub use graph::{Cell, TerrainGraph};
pub use lakes::{Lake, LakeKind};
pub use rivers::{River, RiverKind};
pub use settings::HydrologySettings;

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// RNG sub-stream offsets, one per stage in pipeline order. Only the
/// meander stage draws randomness today, but every stage owns an offset so
/// adding a draw later never shifts another stage's stream.
const MEANDER_RNG_STREAM: u64 = 5;

/// Output of a hydrology run.
///
/// Rivers and lakes are the entities downstream generators consume; the
/// per-cell arrays are the feature markers and final elevations they key
/// off. Intermediate flow state (in-degree tables, trace ownership) is
/// discarded.
pub struct Hydrology {
    /// Final per-cell elevation, post depression filling and erosion.
    pub elevation: Vec<u8>,

    /// Depression-filled elevation from the drainage stage.
    pub filled: Vec<u8>,

    /// Downstream neighbor per cell; `None` for ocean cells and sinks.
    pub downstream: Vec<Option<usize>>,

    /// Accumulated flux per cell.
    pub flux: Vec<f32>,

    /// All traced rivers.
    pub rivers: Vec<River>,

    /// All lakes.
    pub lakes: Vec<Lake>,

    /// For each cell, the river that owns it.
    pub river_of: Vec<Option<usize>>,

    /// For each cell, the lake it belongs to.
    pub lake_of: Vec<Option<usize>>,
}

impl Hydrology {
    /// Run the full pipeline over a terrain graph.
    pub fn generate(
        graph: &TerrainGraph,
        settings: &HydrologySettings,
    ) -> Result<Self, HydrologyError> {
        settings.validate()?;

        let drained = timed("drainage", || drainage::resolve(graph))?;
        let flux = timed("flow accumulation", || flux::accumulate(graph, &drained));
        let extraction = timed("river extraction", || {
            rivers::extract(graph, &drained, &flux, settings)
        });
        let elevation = timed("erosion", || {
            erosion::apply(graph, &drained.filled, &flux, &extraction.river_of, settings)
        });
        let (lakes, lake_of) = timed("lake resolution", || {
            lakes::resolve(
                graph,
                &drained,
                &flux,
                &elevation,
                &extraction.rivers,
                settings,
            )
        });

        let mut rivers = extraction.rivers;
        if settings.meandering_enabled {
            let mut rng = ChaCha8Rng::seed_from_u64(settings.seed.wrapping_add(MEANDER_RNG_STREAM));
            timed("meandering", || {
                for river in &mut rivers {
                    let path = meander::build(river, graph, &elevation, settings, &mut rng);
                    river.path = path;
                }
            });
        }

        Ok(Self {
            elevation,
            filled: drained.filled,
            downstream: drained.downstream,
            flux,
            rivers,
            lakes,
            river_of: extraction.river_of,
            lake_of,
        })
    }

    /// Check if a cell carries a river.
    pub fn has_river(&self, cell: usize) -> bool {
        self.river_of[cell].is_some()
    }

    /// Get the river flowing through a cell.
    pub fn river(&self, cell: usize) -> Option<&River> {
        self.river_of[cell].map(|id| &self.rivers[id])
    }

    /// Get the lake a cell belongs to.
    pub fn lake(&self, cell: usize) -> Option<&Lake> {
        self.lake_of[cell].map(|id| &self.lakes[id])
    }

    /// Get the downstream cell water flows to.
    pub fn downstream(&self, cell: usize) -> Option<usize> {
        self.downstream[cell]
    }

    /// Attach display names from an external naming collaborator.
    ///
    /// The namer is called once per river with (id, width, kind); returning
    /// `None` leaves the river unnamed, which is not an error.
    pub fn name_rivers<F>(&mut self, mut namer: F)
    where
        F: FnMut(usize, u8, RiverKind) -> Option<String>,
    {
        for river in &mut self.rivers {
            river.name = namer(river.id, river.width, river.kind);
        }
    }
}

/// Run a stage closure, logging its elapsed time.
fn timed<T>(name: &'static str, stage: impl FnOnce() -> T) -> T {
    log::debug!("{name}...");
    let start = Instant::now();
    let output = stage();
    log::info!("{name}: {:.3?}", start.elapsed());
    output
}

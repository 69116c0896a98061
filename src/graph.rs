//! Terrain cell graph - the read-only substrate for all hydrology stages.

use std::collections::VecDeque;

use glam::Vec2;

/// A single terrain cell of the tessellation.
///
/// Cells are stored in an arena indexed by `id` and refer to each other by
/// index, never by pointer. All fields except elevation are immutable inputs;
/// elevation is rewritten only by the drainage and erosion stages, and only
/// through the pipeline's output buffers.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Stable index of this cell in the graph arena.
    pub id: usize,

    /// Center point of the cell.
    pub center: Vec2,

    /// Elevation in the 0-100 band. 0-19 is ocean depth, 20-100 is land.
    pub elevation: u8,

    /// Whether the cell lies on the map border.
    pub is_border: bool,

    /// Indices of adjacent cells. Adjacency is symmetric.
    pub neighbors: Vec<usize>,

    /// Annual precipitation at the cell.
    pub precipitation: u8,

    /// Mean temperature at the cell, degrees.
    pub temperature: i8,

    /// Population, carried for downstream naming collaborators.
    /// Never read by the hydrology core.
    pub population: f32,
}

/// The cell graph: arena of cells plus the ocean classification.
pub struct TerrainGraph {
    cells: Vec<Cell>,
    is_ocean: Vec<bool>,
}

impl TerrainGraph {
    /// Build a graph, classifying ocean cells from elevation and border
    /// connectivity: a below-sea-level cell is ocean when its connected
    /// below-sea-level component touches a border cell. Enclosed depressions
    /// below sea level stay land and become lake candidates.
    pub fn new(cells: Vec<Cell>, sea_level: u8) -> Self {
        let is_ocean = classify_ocean(&cells, sea_level);
        Self { cells, is_ocean }
    }

    /// Build a graph with ocean flags already classified by the upstream
    /// terrain generator.
    pub fn with_ocean(cells: Vec<Cell>, is_ocean: Vec<bool>) -> Self {
        assert_eq!(cells.len(), is_ocean.len(), "one ocean flag per cell");
        Self { cells, is_ocean }
    }

    /// Number of cells in the graph.
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// All cells, in id order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Get a cell by id.
    pub fn cell(&self, id: usize) -> &Cell {
        &self.cells[id]
    }

    /// Get the neighbors of a cell.
    pub fn neighbors(&self, id: usize) -> &[usize] {
        &self.cells[id].neighbors
    }

    /// Raw elevation of a cell.
    pub fn elevation(&self, id: usize) -> u8 {
        self.cells[id].elevation
    }

    /// Check if a cell is ocean.
    pub fn is_ocean(&self, id: usize) -> bool {
        self.is_ocean[id]
    }

    /// Check if a cell is land (anything not ocean, including enclosed
    /// below-sea-level depressions).
    pub fn is_land(&self, id: usize) -> bool {
        !self.is_ocean[id]
    }
}

/// Classify ocean cells: connected below-sea-level components that touch
/// the map border.
fn classify_ocean(cells: &[Cell], sea_level: u8) -> Vec<bool> {
    let n = cells.len();
    let mut is_ocean = vec![false; n];
    let mut queue = VecDeque::new();

    // Seed with below-sea-level border cells
    for cell in cells {
        if cell.is_border && cell.elevation < sea_level {
            is_ocean[cell.id] = true;
            queue.push_back(cell.id);
        }
    }

    // Spread through below-sea-level neighbors
    while let Some(id) = queue.pop_front() {
        for &neighbor in &cells[id].neighbors {
            if !is_ocean[neighbor] && cells[neighbor].elevation < sea_level {
                is_ocean[neighbor] = true;
                queue.push_back(neighbor);
            }
        }
    }

    is_ocean
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::constants::DEFAULT_SEA_LEVEL;

    /// Build a `width` x `height` grid graph with 4-adjacency, row-major
    /// ids, and the given per-cell elevations. Cells on the outer ring are
    /// border cells. Climate fields default to temperate values.
    pub fn grid(width: usize, height: usize, elevation: &[u8]) -> TerrainGraph {
        assert_eq!(elevation.len(), width * height);
        let mut cells = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                let id = row * width + col;
                let mut neighbors = Vec::new();
                if row > 0 {
                    neighbors.push(id - width);
                }
                if col > 0 {
                    neighbors.push(id - 1);
                }
                if col + 1 < width {
                    neighbors.push(id + 1);
                }
                if row + 1 < height {
                    neighbors.push(id + width);
                }
                cells.push(Cell {
                    id,
                    center: Vec2::new(col as f32, row as f32),
                    elevation: elevation[id],
                    is_border: row == 0 || col == 0 || row + 1 == height || col + 1 == width,
                    neighbors,
                    precipitation: 50,
                    temperature: 15,
                    population: 0.0,
                });
            }
        }
        TerrainGraph::new(cells, DEFAULT_SEA_LEVEL)
    }

    /// Build a graph from explicit (elevation, neighbors) pairs, with the
    /// given ids marked as border cells.
    pub fn custom(layout: &[(u8, &[usize])], border: &[usize]) -> TerrainGraph {
        let cells = layout
            .iter()
            .enumerate()
            .map(|(id, &(elevation, neighbors))| Cell {
                id,
                center: Vec2::new(id as f32, 0.0),
                elevation,
                is_border: border.contains(&id),
                neighbors: neighbors.to_vec(),
                precipitation: 50,
                temperature: 15,
                population: 0.0,
            })
            .collect();
        TerrainGraph::new(cells, DEFAULT_SEA_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::grid;

    #[test]
    fn ocean_requires_border_connectivity() {
        // 5x5 grid: border ring at 0, interior land at 30 except the center
        // dropped below sea level.
        let mut elevation = [0u8; 25];
        for row in 1..4 {
            for col in 1..4 {
                elevation[row * 5 + col] = 30;
            }
        }
        elevation[12] = 10; // enclosed depression

        let graph = grid(5, 5, &elevation);

        // The border-connected component is ocean.
        assert!(graph.is_ocean(0));
        assert!(graph.is_ocean(2));
        // The enclosed depression stays land despite being below sea level.
        assert!(graph.is_land(12));
        assert!(graph.is_land(6));
    }

    #[test]
    fn adjacency_is_symmetric() {
        let graph = grid(4, 4, &[25; 16]);
        for id in 0..graph.num_cells() {
            for &neighbor in graph.neighbors(id) {
                assert!(
                    graph.neighbors(neighbor).contains(&id),
                    "cell {neighbor} missing back-edge to {id}"
                );
            }
        }
    }
}

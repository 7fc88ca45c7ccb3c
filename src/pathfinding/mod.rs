mod astar;

use glam::{IVec2, Vec2};
use serde::Deserialize;

use crate::grid::BlockingGrid;
use crate::tilemap::TileMap;

pub use astar::{DIAGONAL_COST, ORTHOGONAL_COST};

/// Neighbourhood used by the search.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Movement {
    /// 4-neighbour, unit steps.
    #[default]
    Cardinal,
    /// 8-neighbour, diagonal steps cost √2.
    Octile,
}

/// Shortest-path search over a map's blocking grid.
///
/// Owns its grid; rebuild it with [`Pathfinder::rebuild`] after the source
/// layers change.
#[derive(Clone, Debug)]
pub struct Pathfinder {
    grid: BlockingGrid,
    movement: Movement,
}

impl Pathfinder {
    pub fn new(grid: BlockingGrid, movement: Movement) -> Self {
        Self { grid, movement }
    }

    /// Pathfinder over the map's blocking layers, or `None` when the map
    /// defines no blocking layer.
    pub fn from_map(map: &TileMap, movement: Movement) -> Option<Self> {
        map.blocking_grid().map(|grid| Self::new(grid, movement))
    }

    /// Re-derive the grid from the map. A map that lost its blocking layers
    /// leaves the pathfinder fully open.
    pub fn rebuild(&mut self, map: &TileMap) {
        self.grid = map
            .blocking_grid()
            .unwrap_or_else(|| BlockingGrid::open(map.width, map.height));
    }

    pub fn grid(&self) -> &BlockingGrid {
        &self.grid
    }

    pub fn movement(&self) -> Movement {
        self.movement
    }

    /// Cells from `start` (exclusive) to `goal` (inclusive).
    /// Empty when already there or when no path exists.
    pub fn search(&self, start: IVec2, goal: IVec2) -> Vec<IVec2> {
        let path = astar::search(&self.grid, self.movement, start, goal);
        if path.is_empty() {
            tracing::debug!(?start, ?goal, "no path");
        } else {
            tracing::debug!(?start, ?goal, steps = path.len(), "path found");
        }
        path
    }

    /// Search from a continuous actor position (possibly mid-step) to a cell.
    pub fn search_from(&self, from: Vec2, goal: IVec2) -> Vec<IVec2> {
        self.search(nearest_cell(from), goal)
    }
}

/// The grid cell an actor at `p` stands on. Actors rest on whole cells, so
/// this rounds.
#[inline]
pub fn nearest_cell(p: Vec2) -> IVec2 {
    p.round().as_ivec2()
}

/// The grid cell containing the point `p`, e.g. a tap position.
#[inline]
pub fn containing_cell(p: Vec2) -> IVec2 {
    p.floor().as_ivec2()
}

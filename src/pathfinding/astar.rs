use std::cmp::Reverse;
use std::collections::BinaryHeap;

use glam::IVec2;

use crate::geometry::{distance_octile, CARDINALS, DIAGONALS};
use crate::grid::BlockingGrid;

use super::Movement;

/// Cost of an orthogonal step.
pub const ORTHOGONAL_COST: u32 = 1000;
/// Cost of a diagonal step: `ORTHOGONAL_COST * √2`, rounded.
pub const DIAGONAL_COST: u32 = 1414;

// =============================================================================
// A* OVER A BLOCKING GRID
// =============================================================================

/// Shortest path from `start` to `goal` over the passable cells of `grid`.
///
/// The returned cells exclude `start` and end with `goal`, so the length is
/// the number of steps. Empty when `start == goal`, when either end is out of
/// bounds, when `goal` is blocking, or when no path exists. `start` itself
/// may be blocking (the actor is already standing there).
///
/// Costs are integers and the open set is ordered by `(f, h, cell index)`,
/// so a given grid and query always yields the same path.
pub(crate) fn search(grid: &BlockingGrid, movement: Movement, start: IVec2, goal: IVec2) -> Vec<IVec2> {
    if start == goal || !grid.in_bounds(start) || grid.is_blocked(goal) {
        return Vec::new();
    }
    let (Some(start_idx), Some(goal_idx)) = (grid.index_of(start), grid.index_of(goal)) else {
        return Vec::new();
    };

    let size = grid.cells().len();
    let width = grid.width() as usize;
    let mut g_score = vec![u32::MAX; size];
    let mut came_from = vec![usize::MAX; size];
    let mut closed = vec![false; size];

    let heuristic = |cell: IVec2| match movement {
        Movement::Cardinal => {
            let d = (cell - goal).abs();
            (d.x + d.y) as u32 * ORTHOGONAL_COST
        }
        Movement::Octile => distance_octile(cell, goal, ORTHOGONAL_COST, DIAGONAL_COST),
    };

    // (f_score, h_score, index), wrapped in Reverse for a min-heap.
    let mut open: BinaryHeap<Reverse<(u32, u32, usize)>> = BinaryHeap::new();
    g_score[start_idx] = 0;
    let h = heuristic(start);
    open.push(Reverse((h, h, start_idx)));

    while let Some(Reverse((_, _, current_idx))) = open.pop() {
        if current_idx == goal_idx {
            return reconstruct_path(&came_from, start_idx, goal_idx, width);
        }
        if closed[current_idx] {
            continue;
        }
        closed[current_idx] = true;

        let current = IVec2::new((current_idx % width) as i32, (current_idx / width) as i32);
        let current_g = g_score[current_idx];

        for (step, cost) in neighbours(grid, movement, current) {
            let next = current + step;
            let Some(next_idx) = grid.index_of(next) else {
                continue;
            };
            if closed[next_idx] {
                continue;
            }
            let new_g = current_g + cost;
            if new_g < g_score[next_idx] {
                g_score[next_idx] = new_g;
                came_from[next_idx] = current_idx;
                let h = heuristic(next);
                open.push(Reverse((new_g + h, h, next_idx)));
            }
        }
    }

    Vec::new()
}

/// Passable neighbour offsets of `cell` with their step cost, in a fixed
/// enumeration order. Diagonals may not cut a blocked corner.
fn neighbours(grid: &BlockingGrid, movement: Movement, cell: IVec2) -> Vec<(IVec2, u32)> {
    let mut out = Vec::with_capacity(8);
    for step in CARDINALS {
        if !grid.is_blocked(cell + step) {
            out.push((step, ORTHOGONAL_COST));
        }
    }
    if movement == Movement::Octile {
        for step in DIAGONALS {
            let corner_a = IVec2::new(cell.x + step.x, cell.y);
            let corner_b = IVec2::new(cell.x, cell.y + step.y);
            if !grid.is_blocked(cell + step) && !grid.is_blocked(corner_a) && !grid.is_blocked(corner_b) {
                out.push((step, DIAGONAL_COST));
            }
        }
    }
    out
}

/// Walk `came_from` back from the goal. The start cell is not included.
fn reconstruct_path(came_from: &[usize], start: usize, goal: usize, width: usize) -> Vec<IVec2> {
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(IVec2::new((current % width) as i32, (current / width) as i32));
        current = came_from[current];
    }
    path.reverse();
    path
}

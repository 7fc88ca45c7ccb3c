// =============================================================================
// GEOMETRY.RS: grid distances, neighbour tables and tile-unit rectangles
//
// Shared by the pathfinder (step costs, heuristics), the motion code
// (facing from a travel vector) and the trigger map (area containment).
// =============================================================================

use glam::{IVec2, Vec2};

/// Calculate Manhattan distance between two cells.
/// The number of steps a 4-directional walker needs on an open grid.
#[inline]
pub fn distance_manhattan(a: IVec2, b: IVec2) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Calculate Chebyshev distance between two cells.
/// The number of steps an 8-directional walker needs on an open grid.
#[inline]
pub fn distance_chebyshev(a: IVec2, b: IVec2) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Octile distance scaled by the given orthogonal and diagonal step costs.
///
/// This is the exact shortest-path cost on an obstacle-free 8-connected grid,
/// so it is an admissible (and consistent) A* heuristic for that model.
#[inline]
pub fn distance_octile(a: IVec2, b: IVec2, orthogonal: u32, diagonal: u32) -> u32 {
    let dx = (a.x - b.x).unsigned_abs();
    let dy = (a.y - b.y).unsigned_abs();
    let (long, short) = if dx > dy { (dx, dy) } else { (dy, dx) };
    (long - short) * orthogonal + short * diagonal
}

// =============================================================================
// NEIGHBOUR TABLES
// =============================================================================

/// The 4 cardinal directions as (dx, dy) offsets, in search enumeration order.
pub const CARDINALS: [IVec2; 4] = [
    IVec2::new(0, -1), // N
    IVec2::new(1, 0),  // E
    IVec2::new(0, 1),  // S
    IVec2::new(-1, 0), // W
];

/// The 4 diagonal directions as (dx, dy) offsets.
pub const DIAGONALS: [IVec2; 4] = [
    IVec2::new(1, -1),  // NE
    IVec2::new(1, 1),   // SE
    IVec2::new(-1, 1),  // SW
    IVec2::new(-1, -1), // NW
];

// =============================================================================
// RECTANGLES
// =============================================================================

/// Axis-aligned rectangle in tile units, half-open on the max edges.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// `min <= p < max` on both axes.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

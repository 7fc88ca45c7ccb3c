use glam::{IVec2, Vec2};
use tileview::geometry::*;
use tileview::grid::{BlockingGrid, Grid};

#[test]
fn test_manhattan_distance() {
    assert_eq!(distance_manhattan(IVec2::ZERO, IVec2::new(3, 4)), 7);
    assert_eq!(distance_manhattan(IVec2::ZERO, IVec2::ZERO), 0);
    assert_eq!(distance_manhattan(IVec2::new(-1, -1), IVec2::new(1, 1)), 4);
}

#[test]
fn test_chebyshev_distance() {
    assert_eq!(distance_chebyshev(IVec2::ZERO, IVec2::new(3, 4)), 4);
    assert_eq!(distance_chebyshev(IVec2::ZERO, IVec2::new(3, 3)), 3);
}

#[test]
fn test_octile_reduces_to_manhattan_on_an_axis() {
    let a = IVec2::new(2, 7);
    let b = IVec2::new(2, 1);
    assert_eq!(distance_octile(a, b, 10, 14), 10 * distance_manhattan(a, b) as u32);
}

#[test]
fn test_neighbour_tables_are_unit_steps() {
    for d in CARDINALS {
        assert_eq!(distance_manhattan(IVec2::ZERO, d), 1);
    }
    for d in DIAGONALS {
        assert_eq!(distance_manhattan(IVec2::ZERO, d), 2);
        assert_eq!(distance_chebyshev(IVec2::ZERO, d), 1);
    }
}

#[test]
fn test_rect_size_and_bounds() {
    let r = Rect::new(9.0, 9.0, 1.0, 1.0);
    assert_eq!(r.size(), Vec2::ONE);
    assert!(r.contains(Vec2::new(9.5, 9.5)));
    assert!(!r.contains(Vec2::new(10.0, 9.5)));
}

#[test]
fn test_grid_set_and_read_back() {
    let mut grid = BlockingGrid::open(4, 3);
    grid.set_blocked(IVec2::new(3, 2), true);
    grid.set_blocked(IVec2::new(9, 9), true);
    assert!(grid.is_blocked(IVec2::new(3, 2)));
    assert_eq!(grid.cells().iter().filter(|&&b| b).count(), 1);
    assert_eq!(grid.index_of(IVec2::new(3, 2)), Some(11));
}

#[test]
fn test_grid_filled_dimensions() {
    let grid = Grid::filled(5, 2, 7u8);
    assert_eq!((grid.width(), grid.height()), (5, 2));
    assert!(grid.cells().iter().all(|&v| v == 7));
    assert!(!grid.in_bounds(IVec2::new(0, 2)));
}

//! Grid A* with a per-query heuristic table
//!
//! Manhattan heuristic, uniform step cost, 4-directional expansion. Two
//! behaviors here are load-bearing for gameplay compatibility:
//! - a node already closed is never reopened, even if a cheaper route to it
//!   turns up later (harmless here: the heuristic is admissible and step
//!   costs are uniform);
//! - the next node to expand is the lowest total cost found by a front-to-
//!   back scan of the open list, so tie order is unspecified and callers
//!   must not rely on which of several equal-length routes is returned.

use ahash::{AHashMap, AHashSet};

use crate::core::types::Cell;
use crate::grid::OccupancySource;
use crate::pathfinding::path::{Path, PathNode};

/// Uniform cost of one 4-directional step
const STEP_COST: f32 = 10.0;

/// Finds a route from `start` to `goal`.
///
/// Returns an empty path when the goal is unreachable or equals the start;
/// an empty path is not a fault and callers treat it as "stay idle" or
/// "pick a new behavior".
pub fn find_path(grid: &dyn OccupancySource, start: Cell, goal: Cell) -> Path {
    if start == goal || !grid.in_bounds(goal.0, goal.1) || !grid.in_bounds(start.0, start.1) {
        return Path::empty();
    }

    let heuristics = heuristic_table(grid, goal);
    let h_of = |cell: Cell| heuristics[(cell.1 * grid.width() + cell.0) as usize];

    let mut arena: Vec<PathNode> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut open_by_cell: AHashMap<Cell, usize> = AHashMap::new();
    let mut closed: AHashSet<Cell> = AHashSet::new();

    arena.push(PathNode::new(start, None, STEP_COST, h_of(start)));
    open.push(0);
    open_by_cell.insert(start, 0);

    while !open.is_empty() {
        // Lowest total cost wins; earliest-inserted wins ties.
        let mut best = 0;
        for (pos, &idx) in open.iter().enumerate() {
            if arena[idx].f < arena[open[best]].f {
                best = pos;
            }
        }
        let current = open.swap_remove(best);
        let current_cell = arena[current].cell;
        open_by_cell.remove(&current_cell);
        closed.insert(current_cell);

        if arena[current].h == 0.0 {
            return trace(arena, current);
        }

        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let cell = (current_cell.0 + dx, current_cell.1 + dy);

            if !grid.in_bounds(cell.0, cell.1) || grid.is_obstacle(cell.0, cell.1) {
                continue;
            }
            if closed.contains(&cell) {
                // Closed nodes are never reopened.
                continue;
            }

            let g = arena[current].g + STEP_COST;

            match open_by_cell.get(&cell) {
                Some(&idx) => {
                    if arena[idx].g > g {
                        // Relax in place through the cheaper parent.
                        arena[idx].g = g;
                        arena[idx].f = g + arena[idx].h;
                        arena[idx].parent = Some(current);
                    }
                }
                None => {
                    arena.push(PathNode::new(cell, Some(current), g, h_of(cell)));
                    open.push(arena.len() - 1);
                    open_by_cell.insert(cell, arena.len() - 1);
                }
            }
        }
    }

    tracing::debug!(?start, ?goal, "goal unreachable, returning empty path");
    Path::empty()
}

/// Ancestor chain from the goal node back toward (excluding) the start
fn trace(arena: Vec<PathNode>, goal_idx: usize) -> Path {
    let mut route = Vec::new();
    let mut current = goal_idx;

    while arena[current].parent.is_some() {
        route.push(current);
        current = arena[current].parent.unwrap();
    }

    Path::from_search(arena, route)
}

/// Manhattan-distance heuristic for every cell, computed once per query
fn heuristic_table(grid: &dyn OccupancySource, goal: Cell) -> Vec<f32> {
    let mut table = vec![0.0; (grid.width() * grid.height()) as usize];

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            table[(y * grid.width() + x) as usize] =
                ((goal.0 - x).abs() + (goal.1 - y).abs()) as f32;
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridMap;
    use proptest::prelude::*;

    #[test]
    fn test_straight_line_path() {
        let grid = GridMap::new(10, 10);
        let path = find_path(&grid, (0, 0), (5, 0));

        assert_eq!(path.len(), 5);
        let cells: Vec<_> = path.cells().collect();
        assert_eq!(cells.last(), Some(&(5, 0)));

        // Every step is axis-aligned and one cell long.
        let mut prev = (0, 0);
        for cell in cells {
            let (dx, dy) = (cell.0 - prev.0, cell.1 - prev.1);
            assert_eq!(dx.abs() + dy.abs(), 1);
            prev = cell;
        }
    }

    #[test]
    fn test_path_excludes_start() {
        let grid = GridMap::new(10, 10);
        let path = find_path(&grid, (2, 2), (4, 2));
        assert!(path.cells().all(|c| c != (2, 2)));
    }

    #[test]
    fn test_path_around_obstacle() {
        let mut grid = GridMap::new(10, 10);
        for y in 0..5 {
            grid.set_obstacle(3, y, true);
        }

        let path = find_path(&grid, (0, 0), (6, 0));
        assert!(!path.is_empty());
        assert!(path.cells().all(|(x, y)| !(x == 3 && y < 5)));
        // Detour is longer than the blocked straight line.
        assert!(path.len() > 6);
    }

    #[test]
    fn test_walled_off_goal_returns_empty() {
        let mut grid = GridMap::new(10, 10);
        for (x, y) in [(4, 4), (4, 5), (4, 6), (5, 4), (5, 6), (6, 4), (6, 5), (6, 6)] {
            grid.set_obstacle(x, y, true);
        }

        let path = find_path(&grid, (0, 0), (5, 5));
        assert!(path.is_empty());
    }

    #[test]
    fn test_same_start_and_goal_is_empty() {
        let grid = GridMap::new(10, 10);
        assert!(find_path(&grid, (3, 3), (3, 3)).is_empty());
    }

    #[test]
    fn test_out_of_bounds_goal_is_empty() {
        let grid = GridMap::new(10, 10);
        assert!(find_path(&grid, (0, 0), (20, 20)).is_empty());
    }

    #[test]
    fn test_consumption_order_walks_from_start() {
        let grid = GridMap::new(10, 10);
        let mut path = find_path(&grid, (0, 0), (3, 0));

        // next_node is always the step adjacent to the walker, not the goal.
        let first = path.next_node().unwrap().cell;
        assert_eq!((first.0 - 0).abs() + (first.1 - 0).abs(), 1);

        while path.next_node().is_some() {
            path.advance();
        }
        assert!(path.is_empty());
    }

    proptest! {
        #[test]
        fn prop_open_grid_path_length_is_manhattan(
            sx in 0i32..12, sy in 0i32..12, gx in 0i32..12, gy in 0i32..12
        ) {
            prop_assume!((sx, sy) != (gx, gy));
            let grid = GridMap::new(12, 12);
            let path = find_path(&grid, (sx, sy), (gx, gy));
            prop_assert_eq!(path.len() as i32, (gx - sx).abs() + (gy - sy).abs());
        }

        #[test]
        fn prop_fully_walled_goal_is_empty(gx in 2i32..10, gy in 2i32..10) {
            let mut grid = GridMap::new(12, 12);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    if (dx, dy) != (0, 0) {
                        grid.set_obstacle(gx + dx, gy + dy, true);
                    }
                }
            }
            let path = find_path(&grid, (0, 0), (gx, gy));
            prop_assert!(path.is_empty());
        }
    }
}

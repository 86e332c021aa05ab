//! Static occupancy grid
//!
//! The map is an integer lattice where each cell is either free or a wall.
//! The core never parses map assets; obstacle data arrives through the
//! `OccupancySource` trait and is queried by bounding rectangle, never by
//! scanning the whole map.

use crate::core::types::Rect;

/// Side length of a wall cell in world units
pub const WALL_SIZE: f32 = 1.0;

/// Read-only per-tick view of static obstacles
pub trait OccupancySource {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn is_obstacle(&self, x: i32, y: i32) -> bool;

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width() && y >= 0 && y < self.height()
    }
}

/// Dense boolean occupancy grid
#[derive(Debug, Clone)]
pub struct GridMap {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl GridMap {
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0);
        Self {
            width,
            height,
            cells: vec![false; (width * height) as usize],
        }
    }

    pub fn set_obstacle(&mut self, x: i32, y: i32, blocked: bool) {
        if x >= 0 && x < self.width && y >= 0 && y < self.height {
            self.cells[(y * self.width + x) as usize] = blocked;
        }
    }

    /// Builds a grid from rows of `#` (wall) and `.` (free).
    ///
    /// Rows are given top-down for readability; the first line becomes the
    /// highest y coordinate. Used by tests and the headless runner.
    pub fn from_ascii(art: &str) -> Self {
        let rows: Vec<&str> = art.lines().filter(|l| !l.trim().is_empty()).collect();
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.trim().len()).max().unwrap_or(0) as i32;

        let mut grid = Self::new(width.max(1), height.max(1));
        for (row_idx, row) in rows.iter().enumerate() {
            let y = height - 1 - row_idx as i32;
            for (x, ch) in row.trim().chars().enumerate() {
                if ch == '#' {
                    grid.set_obstacle(x as i32, y, true);
                }
            }
        }
        grid
    }
}

impl OccupancySource for GridMap {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn is_obstacle(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return false;
        }
        self.cells[(y * self.width + x) as usize]
    }
}

/// Returns unit rectangles for every wall cell inside the given inclusive
/// cell range, clamped to the map bounds.
pub fn walls_in_rect(
    grid: &dyn OccupancySource,
    start_x: i32,
    start_y: i32,
    end_x: i32,
    end_y: i32,
) -> Vec<Rect> {
    let mut walls = Vec::new();

    let start_x = start_x.max(0);
    let start_y = start_y.max(0);
    let end_x = end_x.min(grid.width() - 1);
    let end_y = end_y.min(grid.height() - 1);

    for x in start_x..=end_x {
        for y in start_y..=end_y {
            if grid.is_obstacle(x, y) {
                walls.push(Rect::new(x as f32, y as f32, WALL_SIZE, WALL_SIZE));
            }
        }
    }

    walls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_has_no_walls() {
        let grid = GridMap::new(10, 10);
        assert!(walls_in_rect(&grid, 0, 0, 9, 9).is_empty());
    }

    #[test]
    fn test_set_and_query_obstacle() {
        let mut grid = GridMap::new(10, 10);
        grid.set_obstacle(3, 4, true);
        assert!(grid.is_obstacle(3, 4));
        assert!(!grid.is_obstacle(4, 3));
    }

    #[test]
    fn test_walls_in_rect_filters_region() {
        let mut grid = GridMap::new(10, 10);
        grid.set_obstacle(2, 2, true);
        grid.set_obstacle(8, 8, true);

        let walls = walls_in_rect(&grid, 0, 0, 4, 4);
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0], Rect::new(2.0, 2.0, WALL_SIZE, WALL_SIZE));
    }

    #[test]
    fn test_walls_in_rect_clamps_out_of_bounds() {
        let mut grid = GridMap::new(5, 5);
        grid.set_obstacle(0, 0, true);

        let walls = walls_in_rect(&grid, -3, -3, 20, 20);
        assert_eq!(walls.len(), 1);
    }

    #[test]
    fn test_out_of_bounds_is_not_obstacle() {
        let grid = GridMap::new(5, 5);
        assert!(!grid.is_obstacle(-1, 0));
        assert!(!grid.is_obstacle(5, 0));
    }

    #[test]
    fn test_from_ascii_orientation() {
        // Top line of the art is the top of the map.
        let grid = GridMap::from_ascii(
            "####\n\
             #..#\n\
             ####",
        );
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert!(grid.is_obstacle(0, 0));
        assert!(grid.is_obstacle(0, 2));
        assert!(!grid.is_obstacle(1, 1));
        assert!(!grid.is_obstacle(2, 1));
    }
}

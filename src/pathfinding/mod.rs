//! A* pathfinding over the occupancy grid

pub mod astar;
pub mod path;

pub use astar::find_path;
pub use path::{Path, PathNode};

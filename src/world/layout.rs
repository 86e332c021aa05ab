//! Externally supplied map tables
//!
//! Spawn rectangles, waypoint routes, camping spots and the rescue zone are
//! opaque configuration handed to the core by whatever loads the map. The
//! core only draws among them uniformly at random.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{Rect, Vec2};
use crate::grid::OccupancySource;

/// A spot to hold, with the facing to hold it at
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CampSpot {
    pub position: Vec2,
    /// Facing to hold while camping (degrees)
    pub facing: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapLayout {
    pub defender_spawn: Rect,
    pub attacker_spawn: Rect,
    pub civilian_spawns: Vec<Vec2>,

    /// Number of AI defenders spawned besides the player
    pub defender_count: usize,
    pub attacker_count: usize,

    /// Waypoint routes for exploring agents
    pub routes: Vec<Vec<Vec2>>,
    pub camp_spots: Vec<CampSpot>,

    pub rescue_zone: Rect,
}

impl MapLayout {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Initialization-time sanity check; failures here are fatal, unlike
    /// anything inside the simulation loop.
    pub fn validate(&self, grid: &dyn OccupancySource) -> Result<()> {
        if self.routes.is_empty() || self.routes.iter().any(|r| r.is_empty()) {
            return Err(SimError::InvalidLayout("no usable waypoint routes".into()));
        }
        if self.camp_spots.is_empty() {
            return Err(SimError::InvalidLayout("no camping spots".into()));
        }
        if self.attacker_count == 0 {
            return Err(SimError::InvalidLayout("attacker team is empty".into()));
        }

        let map = Rect::new(0.0, 0.0, grid.width() as f32, grid.height() as f32);
        for (name, rect) in [
            ("defender spawn", &self.defender_spawn),
            ("attacker spawn", &self.attacker_spawn),
            ("rescue zone", &self.rescue_zone),
        ] {
            if !map.overlaps(rect) {
                return Err(SimError::InvalidLayout(format!("{name} lies outside the map")));
            }
        }

        for point in &self.civilian_spawns {
            let (x, y) = point.cell();
            if !grid.in_bounds(x, y) || grid.is_obstacle(x, y) {
                return Err(SimError::InvalidLayout(format!(
                    "civilian spawn at ({}, {}) is blocked or out of bounds",
                    point.x, point.y
                )));
            }
        }

        Ok(())
    }
}

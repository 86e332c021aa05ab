//! Simulation configuration with documented constants
//!
//! All tunable values are collected here with explanations of their purpose
//! and how they interact with each other.

/// Configuration for the simulation systems
///
/// The defaults assume a tick rate around 60 Hz, agents about one cell
/// wide, and weapons that out-range detection only slightly.
#[derive(Debug, Clone)]
pub struct SimConfig {
    // === MOVEMENT ===
    /// Per-axis velocity cap (cells/second)
    ///
    /// Applied to each axis independently, not to the vector norm, so
    /// diagonal movement is faster than axis-aligned movement.
    pub max_speed: f32,

    /// Fixed walking speed for AI-driven agents (cells/second)
    ///
    /// AI agents do not accelerate; path following sets each velocity axis
    /// directly to this value.
    pub ai_speed: f32,

    /// Acceleration applied by player movement input (cells/second^2)
    pub input_acceleration: f32,

    /// Velocity damping factor applied once per tick
    ///
    /// Values close to 1.0 make agents glide; values close to 0.0 stop them
    /// almost immediately.
    pub damping: f32,

    /// Distance at which a path node counts as reached (cells)
    pub path_reach_distance: f32,

    /// Degrees an agent can turn in one tick
    pub rotation_step: f32,

    // === PERCEPTION ===
    /// Radius within which hostile agents can be detected (cells)
    pub detection_range: f32,

    /// Half-angle of the forward field-of-view cone (degrees)
    ///
    /// 90 degrees gives a 180-degree forward arc.
    pub fov_half_angle: f32,

    // === COMBAT ===
    /// Distance at which an agent stops approaching and opens fire (cells)
    ///
    /// Must stay below `shot_range` or agents will fire from positions
    /// their shots cannot reach.
    pub firing_range: f32,

    /// Maximum facing error before the weapon may fire (degrees)
    pub facing_threshold: f32,

    /// Maximum distance a shot can travel (cells)
    pub shot_range: f32,

    /// Time a reload keeps the weapon unavailable (seconds)
    pub reload_duration: f32,

    // === BEHAVIOR ===
    /// How long an agent holds a camping spot before picking a new one (seconds)
    pub camp_duration: f32,

    /// Distance within which a civilian can be taken onto an escort chain (cells)
    pub rescue_radius: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_speed: 4.0,
            ai_speed: 3.0,
            input_acceleration: 20.0,
            damping: 0.9,
            path_reach_distance: 1.0,
            rotation_step: 10.0,
            detection_range: 10.0,
            fov_half_angle: 90.0,
            firing_range: 7.0,
            facing_threshold: 5.0,
            shot_range: 12.0,
            reload_duration: 2.0,
            camp_duration: 20.0,
            rescue_radius: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firing_range_within_shot_range() {
        let config = SimConfig::default();
        assert!(config.firing_range < config.shot_range);
    }

    #[test]
    fn test_ai_speed_below_cap() {
        let config = SimConfig::default();
        assert!(config.ai_speed <= config.max_speed);
    }

    #[test]
    fn test_damping_is_fractional() {
        let config = SimConfig::default();
        assert!(config.damping > 0.0 && config.damping < 1.0);
    }
}

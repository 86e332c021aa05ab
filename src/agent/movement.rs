//! Motion integration and collision response.
//!
//! Collision resolution runs in two passes, X then Y. Each pass sweeps the
//! agent's bounds along one axis, gathers candidate walls and other agents'
//! bounds in the swept region, and zeroes that axis's velocity on any
//! overlap before the position update. A perfectly diagonal approach into a
//! corner can slip one frame of detection; kept as an approximation.

use crate::core::config::SimConfig;
use crate::core::types::{Rect, Vec2};
use crate::world::agent::Agent;
use crate::world::world::World;

/// Applies acceleration, damping and the per-axis speed clamp.
///
/// The clamp is per axis rather than on the vector length, so diagonal
/// movement is up to sqrt(2) faster than axis-aligned movement. Intentional
/// simplification.
pub fn update_velocity(agent: &mut Agent, config: &SimConfig, dt: f32) {
    agent.velocity += agent.acceleration * dt;
    agent.velocity = agent.velocity * config.damping;

    agent.velocity.x = agent.velocity.x.clamp(-config.max_speed, config.max_speed);
    agent.velocity.y = agent.velocity.y.clamp(-config.max_speed, config.max_speed);
}

/// Moves the agent by `velocity * dt`, one axis at a time.
///
/// Any overlap with a wall or another agent's bounds zeroes that axis's
/// velocity and records the blocking rectangle on the world for debug
/// introspection.
pub fn integrate(agent: &mut Agent, world: &mut World, dt: f32) {
    let step_x = Vec2::new(agent.velocity.x * dt, 0.0);
    move_axis(agent, world, step_x);

    let step_y = Vec2::new(0.0, agent.velocity.y * dt);
    move_axis(agent, world, step_y);
}

fn move_axis(agent: &mut Agent, world: &mut World, step: Vec2) {
    if step.x == 0.0 && step.y == 0.0 {
        return;
    }

    let moved = Rect::new(
        agent.bounds.x + step.x,
        agent.bounds.y + step.y,
        agent.bounds.width,
        agent.bounds.height,
    );

    if let Some(blocker) = find_blocker(agent, world, &moved) {
        world.push_collision(blocker);
        if step.x != 0.0 {
            agent.velocity.x = 0.0;
        } else {
            agent.velocity.y = 0.0;
        }
        return;
    }

    agent.set_position(agent.position + step);
}

fn find_blocker(agent: &Agent, world: &World, moved: &Rect) -> Option<Rect> {
    let start_x = moved.x.min(agent.bounds.x).floor() as i32 - 1;
    let start_y = moved.y.min(agent.bounds.y).floor() as i32 - 1;
    let end_x = (moved.x.max(agent.bounds.x) + moved.width).ceil() as i32 + 1;
    let end_y = (moved.y.max(agent.bounds.y) + moved.height).ceil() as i32 + 1;

    for wall in world.walls_in_rect(start_x, start_y, end_x, end_y) {
        if moved.overlaps(&wall) {
            return Some(wall);
        }
    }

    for other in world.agents() {
        if other.id == agent.id || other.is_dying() {
            continue;
        }
        if moved.overlaps(&other.bounds) {
            return Some(other.bounds);
        }
    }

    None
}

/// Deadband below which an axis counts as aligned with the target
const PURSUIT_DEADBAND: f32 = 0.05;

/// Velocity for AI path following: each axis runs at the full walk speed
/// toward the target independently, or rests once within the deadband.
pub fn pursuit_velocity(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    let axis = |delta: f32| {
        if delta.abs() < PURSUIT_DEADBAND {
            0.0
        } else {
            speed.copysign(delta)
        }
    };
    Vec2::new(axis(to.x - from.x), axis(to.y - from.y))
}

/// Steps the current facing toward the desired facing, snapping once the
/// remaining error drops below the step. Angles are degrees in [0, 360).
pub fn step_rotation(agent: &mut Agent, step: f32) {
    let mut diff = agent.desired_facing - agent.facing;
    while diff > 180.0 {
        diff -= 360.0;
    }
    while diff < -180.0 {
        diff += 360.0;
    }

    if diff.abs() <= step {
        agent.facing = agent.desired_facing;
    } else if diff > 0.0 {
        agent.facing += step;
    } else {
        agent.facing -= step;
    }

    agent.facing = agent.facing.rem_euclid(360.0);
}

/// Remaining facing error in degrees, normalized to [-180, 180].
pub fn facing_error(agent: &Agent) -> f32 {
    let mut diff = agent.desired_facing - agent.facing;
    while diff > 180.0 {
        diff -= 360.0;
    }
    while diff < -180.0 {
        diff += 360.0;
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Rect;
    use crate::grid::GridMap;
    use crate::world::agent::Team;
    use crate::world::layout::{CampSpot, MapLayout};

    fn open_layout() -> MapLayout {
        MapLayout {
            defender_spawn: Rect::new(0.0, 0.0, 2.0, 2.0),
            attacker_spawn: Rect::new(0.0, 0.0, 2.0, 2.0),
            civilian_spawns: vec![],
            defender_count: 0,
            attacker_count: 1,
            routes: vec![vec![Vec2::new(1.0, 1.0)]],
            camp_spots: vec![CampSpot { position: Vec2::new(1.0, 1.0), facing: 0.0 }],
            rescue_zone: Rect::new(0.0, 0.0, 1.0, 1.0),
        }
    }

    fn test_world(grid: GridMap) -> World {
        World::new(grid, open_layout(), 9).unwrap()
    }

    #[test]
    fn test_damping_slows_agent() {
        let mut world = test_world(GridMap::new(10, 10));
        let id = world.spawn_agent(Team::Defender, Vec2::new(5.0, 5.0), false).unwrap();
        let mut agent = world.agent(id).unwrap().clone();
        agent.velocity = Vec2::new(2.0, 0.0);

        let config = SimConfig::default();
        update_velocity(&mut agent, &config, 1.0 / 60.0);
        assert!(agent.velocity.x < 2.0);
    }

    #[test]
    fn test_velocity_clamped_per_axis() {
        let mut world = test_world(GridMap::new(10, 10));
        let id = world.spawn_agent(Team::Defender, Vec2::new(5.0, 5.0), false).unwrap();
        let mut agent = world.agent(id).unwrap().clone();
        agent.acceleration = Vec2::new(1000.0, -1000.0);

        let config = SimConfig::default();
        for _ in 0..60 {
            update_velocity(&mut agent, &config, 1.0 / 60.0);
        }
        assert!(agent.velocity.x <= config.max_speed);
        assert!(agent.velocity.y >= -config.max_speed);
    }

    #[test]
    fn test_open_floor_movement() {
        let mut world = test_world(GridMap::new(10, 10));
        let id = world.spawn_agent(Team::Defender, Vec2::new(5.0, 5.0), false).unwrap();
        let mut agent = world.agent(id).unwrap().clone();
        agent.velocity = Vec2::new(1.0, 0.0);

        integrate(&mut agent, &mut world, 1.0);
        assert!((agent.position.x - 6.0).abs() < 1e-5);
        assert!((agent.position.y - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_wall_blocks_axis_and_zeroes_velocity() {
        let mut grid = GridMap::new(10, 10);
        grid.set_obstacle(6, 5, true);
        let mut world = test_world(grid);
        let id = world.spawn_agent(Team::Defender, Vec2::new(5.0, 5.0), false).unwrap();
        let mut agent = world.agent(id).unwrap().clone();
        agent.velocity = Vec2::new(2.0, 0.5);

        integrate(&mut agent, &mut world, 1.0);
        assert_eq!(agent.velocity.x, 0.0);
        assert!((agent.position.x - 5.0).abs() < 1e-5);
        // Y pass still ran.
        assert!(agent.position.y > 5.0);
        assert!(!world.collisions().is_empty());
    }

    #[test]
    fn test_agents_block_each_other() {
        let mut world = test_world(GridMap::new(10, 10));
        let mover = world.spawn_agent(Team::Defender, Vec2::new(3.0, 5.0), false).unwrap();
        world.spawn_agent(Team::Defender, Vec2::new(4.2, 5.0), false).unwrap();

        let mut agent = world.agent(mover).unwrap().clone();
        agent.velocity = Vec2::new(2.0, 0.0);
        integrate(&mut agent, &mut world, 1.0);
        assert_eq!(agent.velocity.x, 0.0);
        assert!((agent.position.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_pursuit_runs_each_axis_at_full_speed() {
        let v = pursuit_velocity(Vec2::new(2.0, 8.5), Vec2::new(5.0, 7.0), 3.0);
        assert_eq!(v.x, 3.0);
        assert_eq!(v.y, -3.0);
    }

    #[test]
    fn test_pursuit_rests_aligned_axis() {
        let v = pursuit_velocity(Vec2::new(4.0, 4.01), Vec2::new(9.0, 4.0), 3.0);
        assert_eq!(v.x, 3.0);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn test_rotation_steps_toward_desired() {
        let mut world = test_world(GridMap::new(10, 10));
        let id = world.spawn_agent(Team::Defender, Vec2::new(5.0, 5.0), false).unwrap();
        let mut agent = world.agent(id).unwrap().clone();
        agent.facing = 0.0;
        agent.desired_facing = 45.0;

        step_rotation(&mut agent, 10.0);
        assert!((agent.facing - 10.0).abs() < 1e-5);
        for _ in 0..10 {
            step_rotation(&mut agent, 10.0);
        }
        assert!((agent.facing - 45.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_takes_short_way_around() {
        let mut world = test_world(GridMap::new(10, 10));
        let id = world.spawn_agent(Team::Defender, Vec2::new(5.0, 5.0), false).unwrap();
        let mut agent = world.agent(id).unwrap().clone();
        agent.facing = 350.0;
        agent.desired_facing = 10.0;

        step_rotation(&mut agent, 10.0);
        assert!((agent.facing - 0.0).abs() < 1e-5 || (agent.facing - 360.0).abs() < 1e-5);
        step_rotation(&mut agent, 10.0);
        assert!((agent.facing - 10.0).abs() < 1e-5);
    }
}

//! Perception: detection radius, field-of-view cone, wall occlusion
//!
//! All functions here are pure reads of the world; running the targeting
//! step twice in the same tick with no world change yields the same result.

use crate::core::config::SimConfig;
use crate::core::types::{AgentId, Vec2};
use crate::world::agent::{Agent, AGENT_SIZE};
use crate::world::world::World;

/// Finds the nearest hostile the agent can currently see.
///
/// Teammates, civilians and the agent itself are never candidates. A
/// candidate must be inside the detection radius, inside the forward FOV
/// cone, and not occluded by a wall.
pub fn find_visible_hostile(agent: &Agent, world: &World, config: &SimConfig) -> Option<AgentId> {
    world
        .agents()
        .iter()
        .filter(|other| other.id != agent.id)
        .filter(|other| other.team != agent.team && other.team.is_combatant())
        .filter(|other| agent.position.distance(&other.position) <= config.detection_range)
        .filter(|other| in_fov(agent, other.position, config.fov_half_angle))
        .filter(|other| is_visible(agent, world, other.position))
        .min_by(|a, b| {
            agent
                .position
                .distance(&a.position)
                .partial_cmp(&agent.position.distance(&b.position))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|other| other.id)
}

/// Whether a point lies within the agent's forward FOV cone.
///
/// Angles are degrees in [0, 360); the cone is centered on the current
/// facing and may wrap past 0/360.
pub fn in_fov(agent: &Agent, point: Vec2, half_angle: f32) -> bool {
    let mut lower = agent.facing - half_angle;
    if lower < 0.0 {
        lower += 360.0;
    }

    let mut upper = agent.facing + half_angle;
    if upper > 360.0 {
        upper -= 360.0;
    }

    let angle = angle_to(agent, point);

    if lower > upper {
        // Cone wraps around 0 degrees.
        angle <= upper || angle >= lower
    } else {
        angle >= lower && angle <= upper
    }
}

/// Whether the straight line from the agent to the target point is clear of
/// walls.
///
/// Walls are gathered from the bounding rectangle of the two points and
/// tested against the sight ray; any wall closer than the target occludes
/// it.
pub fn is_visible(agent: &Agent, world: &World, target: Vec2) -> bool {
    let origin = agent.center();
    let dir = target - agent.position;

    let (start_x, end_x) = ordered(agent.position.x as i32, target.x as i32);
    let (start_y, end_y) = ordered(agent.position.y as i32, target.y as i32);

    let target_distance = agent.position.distance(&target);

    world
        .walls_in_rect(start_x, start_y, end_x, end_y)
        .into_iter()
        .filter(|wall| wall.intersects_ray(origin, dir))
        .all(|wall| agent.position.distance(&Vec2::new(wall.x, wall.y)) >= target_distance)
}

/// Facing angle from the agent toward a point, in degrees [0, 360).
///
/// Matches the renderer's sprite convention: the magnitude of the atan2
/// angle, mirrored below the agent's vertical center.
pub fn angle_to(agent: &Agent, point: Vec2) -> f32 {
    let delta = point - agent.position;
    let mut angle = delta.y.atan2(delta.x).to_degrees().abs();

    if point.y <= agent.position.y + AGENT_SIZE / 2.0 {
        angle = 360.0 - angle;
    }

    angle % 360.0
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

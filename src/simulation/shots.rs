//! Shot events and their resolution
//!
//! A shot is an instantaneous ray, not a persisting projectile: it is
//! created with a recoil-perturbed direction during an agent's weapon
//! update and resolved against walls and agents at the start of the next
//! tick, then discarded. That one-tick latency between fire and impact is
//! part of the game's timing and must not be collapsed.

use rand::Rng;

use crate::core::types::{AgentId, Rect, Vec2};
use crate::simulation::effects::{EffectRequest, EffectSink};
use crate::world::agent::{Agent, Job, Team};
use crate::world::world::{BloodDecal, World};

/// One weapon discharge, resolved within a single tick
#[derive(Debug, Clone, Copy)]
pub struct Shot {
    pub shooter: AgentId,
    pub shooter_team: Team,
    pub start: Vec2,
    /// Direction scaled to the maximum range, so `start + dir` is the end
    pub dir: Vec2,
    pub range: f32,
    pub damage: f32,
}

impl Shot {
    /// Builds a shot from the shooter's facing plus a uniform recoil offset
    pub fn from_shooter(shooter: &Agent, range: f32, rng: &mut impl Rng) -> Option<Self> {
        let weapon = shooter.weapon?;

        let recoil = weapon.kind.recoil();
        let mut angle = shooter.facing + rng.gen_range(-recoil..=recoil);
        if angle >= 360.0 {
            angle -= 360.0;
        } else if angle < 0.0 {
            angle += 360.0;
        }

        let radians = angle.to_radians();
        let start = shooter.center();

        Some(Self {
            shooter: shooter.id,
            shooter_team: shooter.team,
            start,
            dir: Vec2::new(radians.cos() * range, radians.sin() * range),
            range,
            damage: weapon.kind.damage(),
        })
    }

    pub fn end(&self) -> Vec2 {
        self.start + self.dir
    }
}

/// Resolves and discards every pending shot.
///
/// For each shot the closest candidate within range wins: either a wall cell
/// or an agent's bounding box. A hit agent takes damage only across teams,
/// but always learns where the shot came from.
pub fn resolve_shots(world: &mut World, effects: &mut dyn EffectSink) {
    for shot in world.take_shots() {
        resolve_shot(world, &shot, effects);
    }
}

fn resolve_shot(world: &mut World, shot: &Shot, effects: &mut dyn EffectSink) {
    let wall_hit = nearest_wall_hit(world, shot);
    let victim_id = nearest_victim(world, shot);

    match victim_id {
        Some(victim_id) => {
            let victim_pos = match world.agent(victim_id) {
                Some(victim) => victim.position,
                None => return,
            };

            // The closer of wall and victim decides what the shot hit.
            let hit = match wall_hit {
                Some(wall) if shot.start.distance(&wall) < shot.start.distance(&victim_pos) => {
                    wall
                }
                _ => victim_pos,
            };

            if shot.start.distance(&hit) >= shot.range {
                return;
            }

            if hit == victim_pos {
                apply_agent_hit(world, shot, victim_id, effects);
            } else {
                world.push_collision(Rect::new(hit.x, hit.y, 1.0, 1.0));
                effects.emit(EffectRequest::Impact { position: hit });
            }
        }
        None => {
            if let Some(wall) = wall_hit {
                if shot.start.distance(&wall) < shot.range {
                    world.push_collision(Rect::new(wall.x, wall.y, 1.0, 1.0));
                    effects.emit(EffectRequest::Impact { position: wall });
                }
            }
        }
    }
}

fn apply_agent_hit(
    world: &mut World,
    shot: &Shot,
    victim_id: AgentId,
    effects: &mut dyn EffectSink,
) {
    // Where the victim should go looking for the shooter: the shooter's
    // current position if still alive, otherwise where the shot came from.
    let shooter_pos = world
        .agent(shot.shooter)
        .map(|shooter| shooter.position)
        .unwrap_or(shot.start);

    let mut dropped_path = None;
    {
        let Some(victim) = world.agent_mut(victim_id) else {
            return;
        };

        mark_awareness(&mut dropped_path, victim, shot, shooter_pos);

        if victim.team != shot.shooter_team {
            victim.take_damage(shot.damage);
        }
    }

    if let Some(path) = dropped_path {
        world.remove_path(path);
    }

    let victim = match world.agent(victim_id) {
        Some(v) => v,
        None => return,
    };
    let victim_pos = victim.position;

    world.push_collision(victim.bounds);
    let decal = BloodDecal::new(victim_pos, world.rng_mut());
    effects.emit(EffectRequest::Blood {
        position: decal.position,
        rotation: decal.rotation,
        scale: decal.scale,
    });
    world.push_blood(decal);
    effects.emit(EffectRequest::AgentHit { agent: victim_id, position: victim_pos });
}

/// A hit always reveals awareness of the shooter, even on a same-team hit;
/// only an agent without a current target link switches to chasing.
fn mark_awareness(
    dropped_path: &mut Option<crate::core::types::PathId>,
    victim: &mut Agent,
    shot: &Shot,
    shooter_pos: Vec2,
) {
    if victim.perceived_target.is_some() {
        return;
    }

    if victim.job != Job::Investigate {
        *dropped_path = victim.path.take();
    }
    victim.job = Job::Investigate;
    victim.perceived_target = Some(shot.shooter);
    victim.target = Some(shooter_pos);
}

/// Closest wall cell intersected by the shot's ray, if any
fn nearest_wall_hit(world: &World, shot: &Shot) -> Option<Vec2> {
    let end = shot.end();
    let (start_x, end_x) = ordered(shot.start.x as i32, end.x as i32);
    let (start_y, end_y) = ordered(shot.start.y as i32, end.y as i32);

    world
        .walls_in_rect(start_x, start_y, end_x, end_y)
        .into_iter()
        .filter(|wall| wall.intersects_ray(shot.start, shot.dir))
        .map(|wall| Vec2::new(wall.x, wall.y))
        .min_by(|a, b| {
            shot.start
                .distance(a)
                .partial_cmp(&shot.start.distance(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Closest agent whose bounds intersect the shot's ray, shooter excluded
fn nearest_victim(world: &World, shot: &Shot) -> Option<AgentId> {
    world
        .agents()
        .iter()
        .filter(|agent| agent.id != shot.shooter)
        .filter(|agent| agent.bounds.intersects_ray(shot.start, shot.dir))
        .min_by(|a, b| {
            shot.start
                .distance(&a.position)
                .partial_cmp(&shot.start.distance(&b.position))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|agent| agent.id)
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

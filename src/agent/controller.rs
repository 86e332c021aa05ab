//! Per-agent behavior: input handling for the playable agent, the job state
//! machine (camp, explore, investigate) and engagement logic for AI
//! combatants, escort following for civilians, weapon timers, and motion.
//!
//! One controller per agent, holding the AI scratch state that does not
//! belong in the world record: fire and camp timers, the drawn camp spot,
//! the remaining route, and the last path goal for lazy recomputation.

use rand::Rng;
use tracing::debug;

use crate::agent::input::InputState;
use crate::agent::movement;
use crate::agent::perception;
use crate::core::config::SimConfig;
use crate::core::types::{AgentId, Vec2};
use crate::pathfinding::find_path;
use crate::simulation::effects::{EffectRequest, EffectSink};
use crate::simulation::shots::Shot;
use crate::world::agent::{Agent, Job, Locomotion, Team, WeaponState};
use crate::world::layout::CampSpot;
use crate::world::world::World;

pub struct AgentController {
    agent: AgentId,
    playable: bool,

    fire_timer: f32,
    reload_timer: f32,
    camp_timer: f32,
    camp_spot: Option<CampSpot>,
    /// Remaining route waypoints, in reverse travel order
    route: Option<Vec<Vec2>>,
    /// Goal cell of the currently registered path
    last_goal: Option<(i32, i32)>,
}

impl AgentController {
    pub fn new(agent: AgentId, playable: bool) -> Self {
        Self {
            agent,
            playable,
            fire_timer: 0.0,
            reload_timer: 0.0,
            camp_timer: 0.0,
            camp_spot: None,
            route: None,
            last_goal: None,
        }
    }

    pub fn agent_id(&self) -> AgentId {
        self.agent
    }

    /// Advances this agent by one tick. Side effects only.
    pub fn update(
        &mut self,
        world: &mut World,
        config: &SimConfig,
        input: &mut InputState,
        effects: &mut dyn EffectSink,
        dt: f32,
    ) {
        let Some(index) = world.index_of(self.agent) else {
            return;
        };

        let mut agent = world.agents()[index].clone();

        if agent.health() <= 0.0 {
            world.kill(self.agent, effects);
            return;
        }

        agent.state_time += dt;

        if self.playable {
            self.update_playable(&mut agent, world, config, input, effects);
        } else {
            self.update_ai(&mut agent, world, config, effects, dt);
        }

        self.update_weapon(&mut agent, world, config, effects, dt);

        movement::update_velocity(&mut agent, config, dt);
        movement::integrate(&mut agent, world, dt);

        if agent.state != Locomotion::Dying {
            agent.state = if agent.velocity.length() < 0.01 {
                Locomotion::Idle
            } else {
                Locomotion::Walking
            };
        }

        if !self.playable {
            movement::step_rotation(&mut agent, config.rotation_step);
        }

        world.replace(index, agent);
    }

    fn update_playable(
        &mut self,
        agent: &mut Agent,
        world: &mut World,
        config: &SimConfig,
        input: &mut InputState,
        effects: &mut dyn EffectSink,
    ) {
        let mut accel = Vec2::default();
        if input.left {
            accel.x -= config.input_acceleration;
        }
        if input.right {
            accel.x += config.input_acceleration;
        }
        if input.down {
            accel.y -= config.input_acceleration;
        }
        if input.up {
            accel.y += config.input_acceleration;
        }
        agent.acceleration = accel;

        if input.reload && agent.weapon_state() != WeaponState::Reloading {
            agent.set_weapon_state(WeaponState::Reloading);
            self.reload_timer = 0.0;
        } else if agent.weapon_state() != WeaponState::Reloading {
            agent.set_weapon_state(if input.fire {
                WeaponState::Firing
            } else {
                WeaponState::Idle
            });
        }

        if input.take_interact() {
            self.try_capture(agent, world, config, effects);
        }
    }

    /// Attaches the nearest free civilian within reach to the end of this
    /// agent's escort chain.
    fn try_capture(
        &mut self,
        agent: &mut Agent,
        world: &mut World,
        config: &SimConfig,
        effects: &mut dyn EffectSink,
    ) {
        let candidate = world
            .agents()
            .iter()
            .filter(|other| other.team == Team::Civilian)
            .filter(|other| !other.rescued && !other.is_dying())
            .filter(|other| other.chain_prev.is_none())
            .filter(|other| agent.position.distance(&other.position) <= config.rescue_radius)
            .min_by(|a, b| {
                agent
                    .position
                    .distance(&a.position)
                    .partial_cmp(&agent.position.distance(&b.position))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|other| (other.id, other.position));

        let Some((civilian, position)) = candidate else {
            return;
        };

        // Walk to the chain end; the walk starts from this agent's own link,
        // which lives on the working copy rather than the stored record.
        let end = match agent.chain_next {
            None => self.agent,
            Some(next) => world.chain_end(next),
        };

        if end == self.agent {
            agent.chain_next = Some(civilian);
        } else if let Some(tail) = world.agent_mut(end) {
            tail.chain_next = Some(civilian);
        }

        if let Some(captive) = world.agent_mut(civilian) {
            captive.chain_prev = Some(end);
        }

        debug!(rescuer = ?self.agent, ?civilian, "civilian joined escort chain");
        effects.emit(EffectRequest::Rescue { agent: civilian, position });
    }

    fn update_ai(
        &mut self,
        agent: &mut Agent,
        world: &mut World,
        config: &SimConfig,
        effects: &mut dyn EffectSink,
        dt: f32,
    ) {
        if agent.team == Team::Civilian {
            self.update_civilian(agent, world, config, effects);
            return;
        }

        // The link mirrors current visibility: it is re-resolved every tick
        // and cleared as soon as no hostile qualifies. Hit awareness keeps
        // steering through the job and last-known-position fields instead.
        let visible = perception::find_visible_hostile(agent, world, config);
        agent.perceived_target = visible;

        match visible {
            Some(seen) => {
                if let Some(hostile) = world.agent(seen) {
                    agent.target = Some(hostile.position);
                }
                self.ai_attack(agent, world, config);
            }
            None => {
                agent.set_weapon_state(WeaponState::Idle);
                if agent.job == Job::None {
                    agent.job = if world.rng_mut().gen_bool(0.5) {
                        Job::Camp
                    } else {
                        Job::Explore
                    };
                }
                match agent.job {
                    Job::Camp => self.ai_camp(agent, world, config, dt),
                    Job::Explore => self.ai_explore(agent, world, config),
                    Job::Investigate => self.ai_investigate(agent, world, config),
                    Job::None => {}
                }
            }
        }
    }

    fn ai_attack(&mut self, agent: &mut Agent, world: &mut World, config: &SimConfig) {
        let target = agent
            .perceived_target
            .and_then(|id| world.agent(id))
            .filter(|hostile| !hostile.is_dying())
            .map(|hostile| (hostile.position, hostile.center()));

        let Some((position, center)) = target else {
            agent.perceived_target = None;
            agent.set_weapon_state(WeaponState::Idle);
            return;
        };

        agent.target = Some(position);

        if agent.position.distance(&position) <= config.firing_range {
            self.drop_path(agent, world);
            agent.desired_facing = perception::angle_to(agent, center);
            if movement::facing_error(agent).abs() < config.facing_threshold {
                agent.set_weapon_state(WeaponState::Firing);
            } else {
                agent.set_weapon_state(WeaponState::Idle);
            }
        } else {
            agent.set_weapon_state(WeaponState::Idle);
            self.ai_get_path(agent, world, position);
            self.ai_follow_path(agent, world, config);
        }
    }

    fn ai_camp(&mut self, agent: &mut Agent, world: &mut World, config: &SimConfig, dt: f32) {
        let spot = match self.camp_spot {
            Some(spot) => spot,
            None => {
                let spot = world.random_camp_spot();
                self.camp_spot = Some(spot);
                self.camp_timer = 0.0;
                spot
            }
        };

        self.ai_get_path(agent, world, spot.position);
        let walking = self.ai_follow_path(agent, world, config);

        if !walking {
            agent.desired_facing = spot.facing;
            self.camp_timer += dt;
            if self.camp_timer > config.camp_duration {
                self.camp_spot = None;
            }
        }
    }

    fn ai_explore(&mut self, agent: &mut Agent, world: &mut World, config: &SimConfig) {
        if self.route.is_none() {
            let mut route = world.random_route();
            route.reverse();
            self.route = Some(route);
        }

        if agent.path.is_none() {
            let next = self.route.as_mut().and_then(|route| route.pop());
            match next {
                Some(waypoint) => {
                    self.ai_get_path(agent, world, waypoint);
                }
                None => {
                    self.route = None;
                    agent.job = Job::None;
                    return;
                }
            }
        }

        self.ai_follow_path(agent, world, config);
    }

    fn ai_investigate(&mut self, agent: &mut Agent, world: &mut World, config: &SimConfig) {
        let Some(target) = agent.target else {
            agent.job = Job::None;
            agent.perceived_target = None;
            return;
        };

        self.ai_get_path(agent, world, target);
        let walking = self.ai_follow_path(agent, world, config);

        if !walking {
            agent.job = Job::None;
            agent.target = None;
            agent.perceived_target = None;
        }
    }

    fn update_civilian(
        &mut self,
        agent: &mut Agent,
        world: &mut World,
        config: &SimConfig,
        effects: &mut dyn EffectSink,
    ) {
        if agent.rescued {
            return;
        }

        // The zone rescues anyone standing in it, chained or not.
        if agent.bounds.overlaps(&world.rescue_zone()) {
            agent.rescued = true;
            world.increment_rescue();
            world.relink_neighbors(agent.chain_prev, agent.chain_next);
            agent.chain_prev = None;
            agent.chain_next = None;
            self.drop_path(agent, world);
            agent.velocity = Vec2::default();
            tracing::info!(agent = ?self.agent, "civilian rescued");
            effects.emit(EffectRequest::Rescue { agent: self.agent, position: agent.position });
            return;
        }

        let Some(leader) = agent.chain_prev else {
            return;
        };

        match world.agent(leader).map(|l| l.position) {
            Some(position) => {
                self.ai_get_path(agent, world, position);
                self.ai_follow_path(agent, world, config);
            }
            None => {
                agent.chain_prev = None;
            }
        }
    }

    /// Registers a path toward the goal, recomputing only when the goal cell
    /// changed since the last query. An unreachable goal leaves the agent
    /// pathless.
    fn ai_get_path(&mut self, agent: &mut Agent, world: &mut World, goal: Vec2) {
        let goal_cell = goal.cell();
        if self.last_goal == Some(goal_cell) && agent.path.is_some() {
            return;
        }

        self.drop_path(agent, world);
        self.last_goal = Some(goal_cell);

        let path = find_path(world.grid(), agent.position.cell(), goal_cell);
        if path.is_empty() {
            return;
        }
        agent.path = Some(world.add_path(path));
    }

    /// Walks the registered path node by node. Returns whether the agent is
    /// still en route.
    fn ai_follow_path(&mut self, agent: &mut Agent, world: &mut World, config: &SimConfig) -> bool {
        let Some(path_id) = agent.path else {
            agent.velocity = Vec2::default();
            return false;
        };

        loop {
            let next = world
                .path(path_id)
                .and_then(|path| path.next_node())
                .map(|node| node.cell);

            let Some(cell) = next else {
                self.drop_path(agent, world);
                agent.velocity = Vec2::default();
                return false;
            };

            let waypoint = Vec2::new(cell.0 as f32, cell.1 as f32);
            if agent.position.distance(&waypoint) < config.path_reach_distance {
                if let Some(path) = world.path_mut(path_id) {
                    path.advance();
                }
                continue;
            }

            agent.velocity = movement::pursuit_velocity(agent.position, waypoint, config.ai_speed);
            agent.desired_facing = perception::angle_to(agent, waypoint);
            return true;
        }
    }

    fn drop_path(&mut self, agent: &mut Agent, world: &mut World) {
        if let Some(path_id) = agent.path.take() {
            world.remove_path(path_id);
        }
        self.last_goal = None;
    }

    fn update_weapon(
        &mut self,
        agent: &mut Agent,
        world: &mut World,
        config: &SimConfig,
        effects: &mut dyn EffectSink,
        dt: f32,
    ) {
        let Some(weapon) = agent.weapon else {
            return;
        };

        self.fire_timer += dt;

        match weapon.state {
            WeaponState::Firing => {
                if self.fire_timer > weapon.kind.fire_interval() {
                    if let Some(shot) = Shot::from_shooter(agent, config.shot_range, world.rng_mut())
                    {
                        world.push_shot(shot);
                        effects.emit(EffectRequest::WeaponFired {
                            weapon: weapon.kind,
                            position: agent.position,
                        });
                    }
                    self.fire_timer = 0.0;
                }
            }
            WeaponState::Reloading => {
                self.reload_timer += dt;
                if self.reload_timer > config.reload_duration {
                    agent.set_weapon_state(WeaponState::Idle);
                    self.reload_timer = 0.0;
                }
            }
            WeaponState::Idle => {}
        }
    }
}

//! Authoritative entity store
//!
//! Owns the live and dead agent sets, the active-path registry, pending shot
//! events and transient decals, and answers the spatial queries the other
//! components need. Mutation is only safe because the simulation is strictly
//! single-threaded; agents are updated one at a time in a fixed order.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, PathId, Rect, Vec2};
use crate::grid::{self, GridMap, OccupancySource};
use crate::pathfinding::Path;
use crate::simulation::effects::{EffectRequest, EffectSink};
use crate::simulation::shots::Shot;
use crate::world::agent::{Agent, Locomotion, Team};
use crate::world::layout::{CampSpot, MapLayout};

/// Attempts to place an agent in its spawn rectangle before giving up
const SPAWN_ATTEMPTS: usize = 128;

/// A splatter decal left where an agent was hit
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BloodDecal {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: f32,
}

impl BloodDecal {
    const OFFSET: f32 = 0.1;

    pub fn new(position: Vec2, rng: &mut impl Rng) -> Self {
        Self {
            position: Vec2::new(
                position.x + rng.gen_range(-Self::OFFSET..=Self::OFFSET),
                position.y + rng.gen_range(-Self::OFFSET..=Self::OFFSET),
            ),
            rotation: rng.gen_range(0.0..360.0),
            scale: rng.gen_range(0.3..1.0),
        }
    }
}

pub struct World {
    grid: GridMap,
    layout: MapLayout,

    /// Live agents in fixed update order
    agents: Vec<Agent>,
    dead: Vec<Agent>,
    player: Option<AgentId>,

    /// Active paths, in creation order for the debug overlay
    paths: Vec<(PathId, Path)>,
    next_path_id: u64,

    shots: Vec<Shot>,
    blood: Vec<BloodDecal>,
    /// Collision rectangles resolved this tick, for the debug overlay
    collisions: Vec<Rect>,

    rescue_count: u32,

    rng: ChaCha8Rng,
}

impl World {
    pub fn new(grid: GridMap, layout: MapLayout, seed: u64) -> Result<Self> {
        layout.validate(&grid)?;

        Ok(Self {
            grid,
            layout,
            agents: Vec::new(),
            dead: Vec::new(),
            player: None,
            paths: Vec::new(),
            next_path_id: 0,
            shots: Vec::new(),
            blood: Vec::new(),
            collisions: Vec::new(),
            rescue_count: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Spawns the player, both AI teams and the civilians per the layout
    /// tables.
    pub fn populate(&mut self) -> Result<()> {
        let player = self.spawn_in_rect(Team::Defender, self.layout.defender_spawn, true)?;
        self.player = Some(player);

        for _ in 0..self.layout.defender_count {
            self.spawn_in_rect(Team::Defender, self.layout.defender_spawn, false)?;
        }
        for _ in 0..self.layout.attacker_count {
            self.spawn_in_rect(Team::Attacker, self.layout.attacker_spawn, false)?;
        }
        for spawn in self.layout.civilian_spawns.clone() {
            self.spawn_agent(Team::Civilian, spawn, false)?;
        }

        tracing::info!(
            defenders = self.team_count(Team::Defender),
            attackers = self.team_count(Team::Attacker),
            civilians = self.team_count(Team::Civilian),
            "world populated"
        );

        Ok(())
    }

    /// Creates an agent at an exact position.
    ///
    /// Combatant roles must carry a weapon; a role config without one is
    /// rejected here rather than discovered mid-tick.
    pub fn spawn_agent(&mut self, team: Team, position: Vec2, playable: bool) -> Result<AgentId> {
        let agent = Agent::new(team, position, playable, &mut self.rng);
        if team.is_combatant() && agent.weapon.is_none() {
            return Err(SimError::MissingWeapon(agent.id));
        }

        let id = agent.id;
        self.agents.push(agent);
        if playable && self.player.is_none() {
            self.player = Some(id);
        }
        Ok(id)
    }

    /// Places an agent at a random free position inside a spawn rectangle,
    /// re-rolling while it overlaps a wall or an existing agent.
    fn spawn_in_rect(&mut self, team: Team, rect: Rect, playable: bool) -> Result<AgentId> {
        let max_x = rect.x + rect.width - 1.0;
        let max_y = rect.y + rect.height - 1.0;

        for _ in 0..SPAWN_ATTEMPTS {
            let position = Vec2::new(
                self.rng.gen_range(rect.x..=max_x.max(rect.x)),
                self.rng.gen_range(rect.y..=max_y.max(rect.y)),
            );
            let bounds = Rect::new(
                position.x,
                position.y,
                crate::world::agent::BOUNDS_SIZE,
                crate::world::agent::BOUNDS_SIZE,
            );
            let in_wall = self
                .walls_in_rect(
                    position.x.floor() as i32 - 1,
                    position.y.floor() as i32 - 1,
                    position.x.ceil() as i32 + 1,
                    position.y.ceil() as i32 + 1,
                )
                .iter()
                .any(|wall| wall.overlaps(&bounds));

            if !in_wall && self.agents.iter().all(|a| !a.bounds.overlaps(&bounds)) {
                return self.spawn_agent(team, position, playable);
            }
        }

        Err(SimError::InvalidLayout(format!("spawn rectangle {rect:?} is too crowded")))
    }

    /* Agents */

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.agents.iter().position(|a| a.id == id)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    /// Writes an updated agent back into its live slot
    pub(crate) fn replace(&mut self, index: usize, agent: Agent) {
        self.agents[index] = agent;
    }

    pub fn player_id(&self) -> Option<AgentId> {
        self.player
    }

    pub fn player(&self) -> Option<&Agent> {
        self.player.and_then(|id| self.agent(id))
    }

    pub fn team_count(&self, team: Team) -> usize {
        self.agents.iter().filter(|a| a.team == team).count()
    }

    /// True when every living civilian has been rescued (vacuously true if
    /// none are left alive)
    pub fn all_civilians_rescued(&self) -> bool {
        self.agents.iter().filter(|a| a.team == Team::Civilian).all(|a| a.rescued)
    }

    /// Transitions an agent to `Dying` exactly once: unlinks it from any
    /// escort chain, drops its path, and moves it to the dead set.
    pub fn kill(&mut self, id: AgentId, effects: &mut dyn EffectSink) {
        let Some(index) = self.index_of(id) else {
            return;
        };

        let mut agent = self.agents.remove(index);
        agent.state = Locomotion::Dying;
        agent.state_time = 0.0;
        agent.perceived_target = None;

        self.relink_neighbors(agent.chain_prev, agent.chain_next);
        agent.chain_prev = None;
        agent.chain_next = None;

        if let Some(path) = agent.path.take() {
            self.remove_path(path);
        }

        tracing::info!(?id, team = ?agent.team, "agent died");
        effects.emit(EffectRequest::AgentDied { agent: id, position: agent.center() });

        self.dead.push(agent);
    }

    pub fn dead(&self) -> &[Agent] {
        &self.dead
    }

    /* Escort chains */

    /// Reconnects the neighbors of a removed chain member
    pub(crate) fn relink_neighbors(&mut self, prev: Option<AgentId>, next: Option<AgentId>) {
        if let Some(prev_id) = prev {
            if let Some(agent) = self.agent_mut(prev_id) {
                agent.chain_next = next;
            }
        }
        if let Some(next_id) = next {
            if let Some(agent) = self.agent_mut(next_id) {
                agent.chain_prev = prev;
            }
        }
    }

    /// Walks forward links to the last member of a chain.
    ///
    /// The walk is bounded by the live-agent count, so a corrupted cyclic
    /// chain cannot hang the simulation.
    pub fn chain_end(&self, start: AgentId) -> AgentId {
        let mut current = start;
        for _ in 0..self.agents.len() {
            match self.agent(current).and_then(|a| a.chain_next) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /* Paths */

    pub fn add_path(&mut self, path: Path) -> PathId {
        let id = PathId(self.next_path_id);
        self.next_path_id += 1;
        self.paths.push((id, path));
        id
    }

    pub fn remove_path(&mut self, id: PathId) {
        self.paths.retain(|(pid, _)| *pid != id);
    }

    pub fn path(&self, id: PathId) -> Option<&Path> {
        self.paths.iter().find(|(pid, _)| *pid == id).map(|(_, p)| p)
    }

    pub fn path_mut(&mut self, id: PathId) -> Option<&mut Path> {
        self.paths.iter_mut().find(|(pid, _)| *pid == id).map(|(_, p)| p)
    }

    pub fn active_paths(&self) -> &[(PathId, Path)] {
        &self.paths
    }

    /* Shots, decals, debug */

    pub fn push_shot(&mut self, shot: Shot) {
        self.shots.push(shot);
    }

    /// Drains the batch of shots fired since the last resolution pass
    pub fn take_shots(&mut self) -> Vec<Shot> {
        std::mem::take(&mut self.shots)
    }

    pub fn pending_shots(&self) -> &[Shot] {
        &self.shots
    }

    pub fn push_blood(&mut self, decal: BloodDecal) {
        self.blood.push(decal);
    }

    pub fn blood(&self) -> &[BloodDecal] {
        &self.blood
    }

    pub fn push_collision(&mut self, rect: Rect) {
        self.collisions.push(rect);
    }

    /// Collision rectangles resolved during the current tick
    pub fn collisions(&self) -> &[Rect] {
        &self.collisions
    }

    pub fn clear_collisions(&mut self) {
        self.collisions.clear();
    }

    /* Rescue */

    pub fn rescue_count(&self) -> u32 {
        self.rescue_count
    }

    pub fn increment_rescue(&mut self) {
        self.rescue_count += 1;
    }

    pub fn rescue_zone(&self) -> Rect {
        self.layout.rescue_zone
    }

    /* Map */

    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    pub fn layout(&self) -> &MapLayout {
        &self.layout
    }

    /// All wall rectangles inside the given inclusive cell range
    pub fn walls_in_rect(&self, start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> Vec<Rect> {
        grid::walls_in_rect(&self.grid, start_x, start_y, end_x, end_y)
    }

    /// Obstacle rectangles for the whole map, for the debug overlay
    pub fn obstacle_rects(&self) -> Vec<Rect> {
        self.walls_in_rect(0, 0, self.grid.width() - 1, self.grid.height() - 1)
    }

    /* Randomness */

    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Uniform draw from the layout's waypoint routes
    pub fn random_route(&mut self) -> Vec<Vec2> {
        let index = self.rng.gen_range(0..self.layout.routes.len());
        self.layout.routes[index].clone()
    }

    /// Uniform draw from the layout's camping spots
    pub fn random_camp_spot(&mut self) -> CampSpot {
        let index = self.rng.gen_range(0..self.layout.camp_spots.len());
        self.layout.camp_spots[index]
    }
}

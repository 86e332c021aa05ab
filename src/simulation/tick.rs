//! Per-tick orchestration
//!
//! A tick runs in fixed order: clear debug state, check the round outcome,
//! resolve last tick's shots, then advance every agent controller. Shots
//! spawned during the agent pass sit in the world until the next tick, so
//! there is always one tick of latency between trigger pull and impact.

use tracing::info;

use crate::agent::{AgentController, InputState};
use crate::core::config::SimConfig;
use crate::core::types::Tick;
use crate::simulation::effects::EffectSink;
use crate::simulation::shots::resolve_shots;
use crate::world::agent::Team;
use crate::world::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

pub struct Simulation {
    world: World,
    controllers: Vec<AgentController>,
    config: SimConfig,
    state: GameState,
    tick: Tick,
}

impl Simulation {
    /// Wraps a populated world; one controller per live agent, in the
    /// world's iteration order.
    pub fn new(world: World, config: SimConfig) -> Self {
        let controllers = world
            .agents()
            .iter()
            .map(|agent| AgentController::new(agent.id, agent.playable))
            .collect();

        Self {
            world,
            controllers,
            config,
            state: GameState::Playing,
            tick: 0,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Advances one tick. A terminal state is sticky: once the round is won
    /// or lost the world stops changing.
    pub fn update(
        &mut self,
        dt: f32,
        input: &mut InputState,
        effects: &mut dyn EffectSink,
    ) -> GameState {
        if self.state != GameState::Playing {
            return self.state;
        }

        self.world.clear_collisions();
        self.check_outcome();

        resolve_shots(&mut self.world, effects);

        for controller in &mut self.controllers {
            controller.update(&mut self.world, &self.config, input, effects, dt);
        }

        self.tick += 1;
        self.state
    }

    fn check_outcome(&mut self) {
        if self.world.team_count(Team::Attacker) == 0 || self.world.all_civilians_rescued() {
            info!(tick = self.tick, "round won");
            self.state = GameState::Won;
            return;
        }

        let player_gone = match self.world.player_id() {
            Some(id) => self.world.agent(id).is_none(),
            None => false,
        };
        if player_gone || self.world.team_count(Team::Defender) == 0 {
            info!(tick = self.tick, "round lost");
            self.state = GameState::Lost;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Rect, Vec2};
    use crate::grid::GridMap;
    use crate::simulation::effects::{NullSink, RecordingSink};
    use crate::simulation::shots::Shot;
    use crate::world::layout::{CampSpot, MapLayout};

    const DT: f32 = 1.0 / 60.0;

    fn layout(defenders: usize, attackers: usize) -> MapLayout {
        MapLayout {
            defender_spawn: Rect::new(1.0, 1.0, 4.0, 4.0),
            attacker_spawn: Rect::new(14.0, 14.0, 4.0, 4.0),
            // At least one civilian, so the rescue goal is never vacuously met.
            civilian_spawns: vec![Vec2::new(10.0, 10.0)],
            defender_count: defenders,
            attacker_count: attackers,
            routes: vec![vec![Vec2::new(10.0, 10.0)]],
            camp_spots: vec![CampSpot { position: Vec2::new(2.0, 2.0), facing: 0.0 }],
            rescue_zone: Rect::new(1.0, 1.0, 2.0, 2.0),
        }
    }

    fn populated(defenders: usize, attackers: usize) -> World {
        let mut world =
            World::new(GridMap::new(20, 20), layout(defenders, attackers), 17).unwrap();
        world.populate().unwrap();
        world
    }

    #[test]
    fn test_win_when_no_attackers_remain() {
        let mut world = populated(1, 1);
        let attacker = world
            .agents()
            .iter()
            .find(|a| a.team == Team::Attacker)
            .map(|a| a.id)
            .unwrap();
        let mut sink = NullSink;
        world.kill(attacker, &mut sink);

        let mut sim = Simulation::new(world, SimConfig::default());
        let mut input = InputState::default();
        let state = sim.update(DT, &mut input, &mut sink);
        assert_eq!(state, GameState::Won);
    }

    #[test]
    fn test_lose_when_player_dies() {
        let mut world = populated(1, 1);
        let player = world.player_id().unwrap();
        let mut sink = NullSink;
        world.kill(player, &mut sink);

        let mut sim = Simulation::new(world, SimConfig::default());
        let mut input = InputState::default();
        let state = sim.update(DT, &mut input, &mut sink);
        assert_eq!(state, GameState::Lost);
    }

    #[test]
    fn test_terminal_state_is_sticky() {
        let mut world = populated(1, 1);
        let player = world.player_id().unwrap();
        let mut sink = NullSink;
        world.kill(player, &mut sink);

        let mut sim = Simulation::new(world, SimConfig::default());
        let mut input = InputState::default();
        sim.update(DT, &mut input, &mut sink);
        let tick_after = sim.tick();
        sim.update(DT, &mut input, &mut sink);
        assert_eq!(sim.tick(), tick_after);
        assert_eq!(sim.state(), GameState::Lost);
    }

    #[test]
    fn test_pending_shot_resolves_on_next_tick() {
        let world = populated(1, 1);
        let mut sim = Simulation::new(world, SimConfig::default());

        let shooter = sim.world().player_id().unwrap();
        let shooter_agent = sim.world().agent(shooter).unwrap();
        let victim = sim
            .world()
            .agents()
            .iter()
            .find(|a| a.team == Team::Attacker)
            .unwrap();

        let start = shooter_agent.center();
        let dir = victim.center() - start;
        let shot = Shot {
            shooter,
            shooter_team: Team::Defender,
            start,
            dir,
            range: dir.length() + 1.0,
            damage: 10.0,
        };
        sim.world_mut().push_shot(shot);

        let mut input = InputState::default();
        let mut effects = RecordingSink::default();
        sim.update(DT, &mut input, &mut effects);

        assert!(sim.world().pending_shots().is_empty());
        let hits = effects
            .count_of(|e| matches!(e, crate::simulation::effects::EffectRequest::AgentHit { .. }));
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_playing_round_keeps_ticking() {
        let world = populated(2, 2);
        let mut sim = Simulation::new(world, SimConfig::default());
        let mut input = InputState::default();
        let mut sink = NullSink;

        for _ in 0..30 {
            sim.update(DT, &mut input, &mut sink);
        }
        assert_eq!(sim.tick(), 30);
    }
}

//! Agents and their carried state
//!
//! One agent record covers all three roles; role-specific defaults (body
//! variant count, starting weapon) come from a closed config lookup instead
//! of a type hierarchy.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, PathId, Rect, Vec2};

/// Visual footprint of an agent in world units
pub const AGENT_SIZE: f32 = 1.0;
/// Collision bounds, slightly smaller than the footprint so agents can pass
/// through one-cell gaps
pub const BOUNDS_SIZE: f32 = 0.875;
pub const HEALTH_MAX: f32 = 100.0;

/// Team an agent fights for (or doesn't)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Attacker,
    Defender,
    Civilian,
}

impl Team {
    pub fn is_combatant(self) -> bool {
        !matches!(self, Team::Civilian)
    }

    pub fn role(self) -> RoleConfig {
        match self {
            Team::Attacker => RoleConfig {
                body_variants: 4,
                default_weapon: Some(WeaponKind::AssaultRifle),
            },
            Team::Defender => RoleConfig {
                body_variants: 4,
                default_weapon: Some(WeaponKind::SilencedCarbine),
            },
            Team::Civilian => RoleConfig { body_variants: 8, default_weapon: None },
        }
    }
}

/// Role-specific read-only defaults
#[derive(Debug, Clone, Copy)]
pub struct RoleConfig {
    pub body_variants: u32,
    pub default_weapon: Option<WeaponKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    SilencedCarbine,
    AssaultRifle,
}

impl WeaponKind {
    pub fn damage(self) -> f32 {
        match self {
            WeaponKind::SilencedCarbine => 10.0,
            WeaponKind::AssaultRifle => 10.0,
        }
    }

    /// Maximum angular deviation added to a shot (degrees)
    pub fn recoil(self) -> f32 {
        match self {
            WeaponKind::SilencedCarbine => 5.0,
            WeaponKind::AssaultRifle => 10.0,
        }
    }

    /// Minimum time between shots (seconds)
    pub fn fire_interval(self) -> f32 {
        match self {
            WeaponKind::SilencedCarbine => 0.1,
            WeaponKind::AssaultRifle => 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponState {
    #[default]
    Idle,
    Firing,
    Reloading,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub state: WeaponState,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        Self { kind, state: WeaponState::Idle }
    }
}

/// High-level behavior goal for AI agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Job {
    /// Transient sentinel; a real job is drawn on the next AI update
    #[default]
    None,
    Camp,
    Explore,
    Investigate,
}

/// Locomotion state, independent of the behavior job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locomotion {
    #[default]
    Idle,
    Walking,
    /// Terminal; entered exactly once when health reaches zero
    Dying,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub team: Team,
    pub playable: bool,

    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub bounds: Rect,

    /// Current facing (degrees, [0, 360))
    pub facing: f32,
    /// Facing the agent is turning toward
    pub desired_facing: f32,

    health: f32,

    pub state: Locomotion,
    pub job: Job,
    pub state_time: f32,

    pub weapon: Option<Weapon>,

    /// Active route through the world's path registry
    pub path: Option<PathId>,
    /// Point the agent is currently trying to reach
    pub target: Option<Vec2>,

    /// Hostile the agent currently intends to engage or last detected
    pub perceived_target: Option<AgentId>,

    /// Next agent down the escort chain (toward the captives)
    pub chain_next: Option<AgentId>,
    /// Previous agent up the escort chain (toward the leader)
    pub chain_prev: Option<AgentId>,
    pub rescued: bool,

    /// Body variant index for the external renderer
    pub body: u32,
}

impl Agent {
    pub fn new(team: Team, position: Vec2, playable: bool, rng: &mut impl Rng) -> Self {
        let role = team.role();
        let mut agent = Self {
            id: AgentId::new(),
            team,
            playable,
            position,
            velocity: Vec2::default(),
            acceleration: Vec2::default(),
            bounds: Rect::new(position.x, position.y, BOUNDS_SIZE, BOUNDS_SIZE),
            facing: 0.0,
            desired_facing: 0.0,
            health: HEALTH_MAX,
            state: Locomotion::Idle,
            job: Job::None,
            state_time: 0.0,
            weapon: role.default_weapon.map(Weapon::new),
            path: None,
            target: None,
            perceived_target: None,
            chain_next: None,
            chain_prev: None,
            rescued: false,
            body: rng.gen_range(0..role.body_variants),
        };
        agent.set_position(position);
        agent
    }

    /// Moves the agent and keeps its bounds in sync
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.bounds.x = position.x;
        self.bounds.y = position.y;
    }

    /// Center point of the agent's footprint
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.position.x + AGENT_SIZE / 2.0, self.position.y + AGENT_SIZE / 2.0)
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    /// Applies damage, clamping health at zero. There is no heal path.
    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount).clamp(0.0, HEALTH_MAX);
    }

    pub fn is_dying(&self) -> bool {
        self.state == Locomotion::Dying
    }

    pub fn weapon_state(&self) -> WeaponState {
        self.weapon.map(|w| w.state).unwrap_or_default()
    }

    pub fn set_weapon_state(&mut self, state: WeaponState) {
        if let Some(weapon) = &mut self.weapon {
            weapon.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_roles_have_expected_weapons() {
        let mut rng = rng();
        let attacker = Agent::new(Team::Attacker, Vec2::default(), false, &mut rng);
        let defender = Agent::new(Team::Defender, Vec2::default(), false, &mut rng);
        let civilian = Agent::new(Team::Civilian, Vec2::default(), false, &mut rng);

        assert_eq!(attacker.weapon.map(|w| w.kind), Some(WeaponKind::AssaultRifle));
        assert_eq!(defender.weapon.map(|w| w.kind), Some(WeaponKind::SilencedCarbine));
        assert!(civilian.weapon.is_none());
    }

    #[test]
    fn test_body_variant_within_role_range() {
        let mut rng = rng();
        for _ in 0..32 {
            let civilian = Agent::new(Team::Civilian, Vec2::default(), false, &mut rng);
            assert!(civilian.body < Team::Civilian.role().body_variants);
        }
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut rng = rng();
        let mut agent = Agent::new(Team::Attacker, Vec2::default(), false, &mut rng);
        agent.take_damage(250.0);
        assert_eq!(agent.health(), 0.0);
    }

    #[test]
    fn test_health_never_increases_from_damage() {
        let mut rng = rng();
        let mut agent = Agent::new(Team::Defender, Vec2::default(), false, &mut rng);
        let mut last = agent.health();
        for _ in 0..20 {
            agent.take_damage(7.5);
            assert!(agent.health() <= last);
            last = agent.health();
        }
    }

    #[test]
    fn test_bounds_follow_position() {
        let mut rng = rng();
        let mut agent = Agent::new(Team::Defender, Vec2::new(1.0, 1.0), false, &mut rng);
        agent.set_position(Vec2::new(4.0, 9.0));
        assert_eq!(agent.bounds.x, 4.0);
        assert_eq!(agent.bounds.y, 9.0);
        assert_eq!(agent.bounds.width, BOUNDS_SIZE);
    }

    #[test]
    fn test_civilian_weapon_state_defaults_idle() {
        let mut rng = rng();
        let mut civilian = Agent::new(Team::Civilian, Vec2::default(), false, &mut rng);
        assert_eq!(civilian.weapon_state(), WeaponState::Idle);
        // Setting a state without a weapon is a no-op, not a panic.
        civilian.set_weapon_state(WeaponState::Firing);
        assert_eq!(civilian.weapon_state(), WeaponState::Idle);
    }

    #[test]
    fn test_teams_hostility() {
        assert!(Team::Attacker.is_combatant());
        assert!(Team::Defender.is_combatant());
        assert!(!Team::Civilian.is_combatant());
    }
}

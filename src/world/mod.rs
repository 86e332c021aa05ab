//! Entity store, agents and map tables

pub mod agent;
pub mod layout;
pub mod world;

pub use agent::{
    Agent, Job, Locomotion, RoleConfig, Team, Weapon, WeaponKind, WeaponState, AGENT_SIZE,
    BOUNDS_SIZE, HEALTH_MAX,
};
pub use layout::{CampSpot, MapLayout};
pub use world::{BloodDecal, World};

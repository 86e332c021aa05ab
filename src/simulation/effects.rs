//! Effect requests for the external renderer/audio layer
//!
//! The core never touches a sound or sprite API; it emits fire-and-forget
//! requests through an injected sink and never waits for acknowledgment.

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, Vec2};
use crate::world::agent::WeaponKind;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectRequest {
    /// Play the fire sound for this weapon type
    WeaponFired { weapon: WeaponKind, position: Vec2 },
    /// An agent was hit by a shot
    AgentHit { agent: AgentId, position: Vec2 },
    /// An agent died; play a death sound
    AgentDied { agent: AgentId, position: Vec2 },
    /// Spawn a blood splatter decal
    Blood { position: Vec2, rotation: f32, scale: f32 },
    /// A shot hit a wall
    Impact { position: Vec2 },
    /// A civilian joined an escort chain or reached the rescue zone
    Rescue { agent: AgentId, position: Vec2 },
}

/// Consumer of effect requests, injected per tick
pub trait EffectSink {
    fn emit(&mut self, effect: EffectRequest);
}

/// Discards everything; for headless runs and benchmarks
pub struct NullSink;

impl EffectSink for NullSink {
    fn emit(&mut self, _effect: EffectRequest) {}
}

/// Records everything; for tests
#[derive(Default)]
pub struct RecordingSink {
    pub effects: Vec<EffectRequest>,
}

impl EffectSink for RecordingSink {
    fn emit(&mut self, effect: EffectRequest) {
        self.effects.push(effect);
    }
}

impl RecordingSink {
    pub fn count_of(&self, matcher: impl Fn(&EffectRequest) -> bool) -> usize {
        self.effects.iter().filter(|e| matcher(e)).count()
    }
}

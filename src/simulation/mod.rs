//! Tick orchestration, shot resolution, and effect requests

pub mod effects;
pub mod shots;
pub mod tick;

pub use effects::{EffectRequest, EffectSink, NullSink, RecordingSink};
pub use shots::{resolve_shots, Shot};
pub use tick::{GameState, Simulation};

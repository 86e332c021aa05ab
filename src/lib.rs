//! Dustline - Tactical Shooter Simulation Core
//!
//! Real-time agent simulation for a top-down hostage-rescue shooter:
//! grid A* pathfinding, per-agent perception and behavior, and a
//! deterministic shot/collision resolver. Rendering, audio and raw input
//! stay outside; the core talks to them through the `OccupancySource`
//! trait, per-tick `InputState`, and an injected `EffectSink`.

pub mod agent;
pub mod core;
pub mod grid;
pub mod pathfinding;
pub mod simulation;
pub mod world;

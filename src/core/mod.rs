//! Core types, errors and configuration

pub mod config;
pub mod error;
pub mod types;

pub use config::SimConfig;
pub use error::{Result, SimError};
pub use types::{AgentId, Cell, PathId, Rect, Tick, Vec2};

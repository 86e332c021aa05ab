//! Per-agent behavior: input, perception, motion, and the job state machine

pub mod controller;
pub mod input;
pub mod movement;
pub mod perception;

pub use controller::AgentController;
pub use input::{Button, InputState};

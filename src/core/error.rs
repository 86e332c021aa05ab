use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Combatant created without a weapon: {0:?}")]
    MissingWeapon(crate::core::types::AgentId),

    #[error("Invalid map layout: {0}")]
    InvalidLayout(String),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

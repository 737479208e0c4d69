use gn_core::{AgentId, FloorId, NavError};
use gn_grid::GridError;
use gn_movement::MovementError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("world configuration error: {0}")]
    Config(String),

    #[error("floor {0} does not exist")]
    FloorOutOfRange(FloorId),

    #[error("agent {agent} is on {actual}, request targets {requested}")]
    FloorMismatch {
        agent:     AgentId,
        actual:    FloorId,
        requested: FloorId,
    },

    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    #[error(transparent)]
    Nav(#[from] NavError),

    #[error("movement error: {0}")]
    Movement(MovementError),
}

pub type WorldResult<T> = Result<T, WorldError>;

impl From<MovementError> for WorldError {
    fn from(e: MovementError) -> Self {
        match e {
            MovementError::UnknownAgent(id)    => WorldError::AgentNotFound(id),
            MovementError::FloorOutOfRange(f)  => WorldError::FloorOutOfRange(f),
            MovementError::InvalidSettings(s)  => WorldError::Config(s),
            MovementError::Nav(n)              => WorldError::Nav(n),
            other                              => WorldError::Movement(other),
        }
    }
}

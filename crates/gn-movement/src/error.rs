use gn_core::{AgentId, FloorId, NavError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MovementError {
    #[error("agent {0} is not registered")]
    UnknownAgent(AgentId),

    #[error("invalid agent settings: {0}")]
    InvalidSettings(String),

    #[error("floor {0} does not exist")]
    FloorOutOfRange(FloorId),

    #[error("agent {0} may not step diagonally")]
    DiagonalDisallowed(AgentId),

    #[error("agent id space exhausted")]
    IdsExhausted,

    #[error(transparent)]
    Nav(#[from] NavError),
}

pub type MovementResult<T> = Result<T, MovementError>;

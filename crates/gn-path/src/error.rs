use gn_core::{GridPosition, NavError};
use thiserror::Error;

/// Why a search produced no usable path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathFailure {
    #[error("start {0} is out of bounds")]
    StartOutOfBounds(GridPosition),

    #[error("target {0} is out of bounds")]
    TargetOutOfBounds(GridPosition),

    #[error("target {0} is blocked")]
    TargetBlocked(GridPosition),

    #[error("target {to} is unreachable from {from}")]
    Unreachable { from: GridPosition, to: GridPosition },

    #[error("path needs {needed} waypoints but capacity is {capacity}")]
    PathTooLong { needed: usize, capacity: usize },
}

pub type PathResult<T> = Result<T, PathFailure>;

impl From<PathFailure> for NavError {
    fn from(f: PathFailure) -> Self {
        match f {
            PathFailure::StartOutOfBounds(p) | PathFailure::TargetOutOfBounds(p) => {
                NavError::OutOfBounds(p)
            }
            PathFailure::TargetBlocked(p) => NavError::BlockedByTerrain(p),
            PathFailure::Unreachable { from, to } => NavError::NoPathExists { from, to },
            PathFailure::PathTooLong { needed, capacity } => {
                NavError::PathTooLong { needed, capacity }
            }
        }
    }
}

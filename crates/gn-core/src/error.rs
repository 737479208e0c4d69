//! Engine-wide error taxonomy.
//!
//! Sub-crates define their own error enums and convert into `NavError` via
//! `From` impls when a caller needs the single flat classification.
//! Occupancy races are not errors and never appear here.

use thiserror::Error;

use crate::{AgentId, GridPosition};

/// Flat classification of every failure the navigation core can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("position {0} is out of bounds")]
    OutOfBounds(GridPosition),

    #[error("position {0} is blocked by terrain")]
    BlockedByTerrain(GridPosition),

    #[error("position {pos} is blocked by {blocker:?}")]
    BlockedByEntity {
        pos:     GridPosition,
        blocker: Option<AgentId>,
    },

    #[error("no path exists from {from} to {to}")]
    NoPathExists { from: GridPosition, to: GridPosition },

    #[error("path needs {needed} waypoints but capacity is {capacity}")]
    PathTooLong { needed: usize, capacity: usize },

    #[error("{what} mismatch: expected {expected}, got {got}")]
    InvalidDimensions {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { expected: u32, computed: u32 },

    #[error("malformed map data: {0}")]
    Malformed(String),
}

/// Shorthand result type for the navigation core.
pub type NavResult<T> = Result<T, NavError>;

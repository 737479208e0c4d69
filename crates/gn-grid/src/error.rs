//! Grid-subsystem error type.

use thiserror::Error;

use gn_core::{FloorId, NavError};

/// Errors produced by `gn-grid`.
///
/// Every variant is structural: a load that hits one of these aborts before
/// touching live tile storage.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("{what} mismatch: expected {expected}, got {got}")]
    InvalidDimensions {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("checksum mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { expected: u32, computed: u32 },

    #[error("corrupt map data: {0}")]
    Corrupt(String),

    #[error("unsupported map format version {0}")]
    UnsupportedVersion(u8),

    #[error("floor {0} does not exist")]
    FloorOutOfRange(FloorId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GridResult<T> = Result<T, GridError>;

impl From<GridError> for NavError {
    fn from(e: GridError) -> Self {
        match e {
            GridError::InvalidDimensions { expected, got, what } => {
                NavError::InvalidDimensions { expected, got, what }
            }
            GridError::ChecksumMismatch { expected, computed } => {
                NavError::ChecksumMismatch { expected, computed }
            }
            other => NavError::Malformed(other.to_string()),
        }
    }
}

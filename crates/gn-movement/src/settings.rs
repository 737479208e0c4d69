//! Per-agent movement configuration.

use gn_path::MAX_WAYPOINTS;

use crate::{MovementError, MovementResult};

/// Step timing and path limits for one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentSettings {
    /// Ticks to cross one cardinal step.
    pub cardinal_step_ticks: u32,

    /// Ticks to cross one diagonal step.  Must be `>= cardinal_step_ticks`.
    pub diagonal_step_ticks: u32,

    /// `false` restricts both searches and directional steps to N/E/S/W.
    pub allow_diagonal: bool,

    /// Waypoint buffer capacity, `1..=MAX_WAYPOINTS`.
    pub max_waypoints: usize,

    /// Consecutive failed claims tolerated before the request fails with
    /// `BlockedByEntity`.
    pub max_block_retries: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            cardinal_step_ticks: 4,
            diagonal_step_ticks: 6,
            allow_diagonal:      true,
            max_waypoints:       64,
            max_block_retries:   8,
        }
    }
}

impl AgentSettings {
    /// Check the invariants the arbiter relies on.
    pub fn validate(&self) -> MovementResult<()> {
        if self.cardinal_step_ticks == 0 || self.diagonal_step_ticks == 0 {
            return Err(MovementError::InvalidSettings("step durations must be non-zero".into()));
        }
        if self.diagonal_step_ticks < self.cardinal_step_ticks {
            return Err(MovementError::InvalidSettings(format!(
                "diagonal_step_ticks ({}) < cardinal_step_ticks ({})",
                self.diagonal_step_ticks, self.cardinal_step_ticks,
            )));
        }
        if self.max_waypoints == 0 || self.max_waypoints > MAX_WAYPOINTS {
            return Err(MovementError::InvalidSettings(format!(
                "max_waypoints must be in 1..={MAX_WAYPOINTS}, got {}",
                self.max_waypoints,
            )));
        }
        Ok(())
    }

    /// Duration of a step in `diagonal` or cardinal direction.
    #[inline]
    pub fn step_ticks(&self, diagonal: bool) -> u32 {
        if diagonal { self.diagonal_step_ticks } else { self.cardinal_step_ticks }
    }
}

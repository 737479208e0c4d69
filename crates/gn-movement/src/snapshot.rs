use gn_core::{AgentId, Direction, FloorId, GridPosition, Tick};

use crate::{NavAgent, PathStatus};

/// Per-tick movement summary suitable for broadcasting to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementSnapshot {
    pub agent:           AgentId,
    pub floor:           FloorId,
    pub cell:            GridPosition,
    /// Step target while moving, otherwise `cell`.
    pub target:          GridPosition,
    pub is_moving:       bool,
    pub direction:       Option<Direction>,
    pub ticks_remaining: u64,
    pub status:          PathStatus,
}

impl MovementSnapshot {
    pub fn of(agent: &NavAgent, now: Tick) -> Self {
        let m = &agent.movement;
        Self {
            agent:           agent.id,
            floor:           agent.floor,
            cell:            agent.cell,
            target:          if m.moving { m.target } else { agent.cell },
            is_moving:       m.moving,
            direction:       if m.moving { m.direction } else { None },
            ticks_remaining: m.ticks_remaining(now),
            status:          agent.request.status,
        }
    }
}

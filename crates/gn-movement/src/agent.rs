//! One agent's navigation record.

use gn_core::{AgentId, FloorId, GridPosition, Tick};
use gn_path::{PathFlags, WaypointBuffer};

use crate::{AgentSettings, MovementState, PathRequestState, PathStatus};

/// Everything the arbiter tracks for a single agent.
///
/// `cell` is the cell the agent legitimately occupies.  While a step is in
/// flight the agent additionally holds a claim on `movement.target`.
#[derive(Debug, Clone)]
pub struct NavAgent {
    pub id:        AgentId,
    pub floor:     FloorId,
    pub cell:      GridPosition,
    pub settings:  AgentSettings,
    pub movement:  MovementState,
    pub request:   PathRequestState,
    pub waypoints: WaypointBuffer,

    /// Destination of the current request.
    pub goal:  Option<GridPosition>,
    /// Search flags of the current request.
    pub flags: PathFlags,

    /// Agent holding the next waypoint while waiting, if one was seen.
    pub waiting_for:   Option<AgentId>,
    /// Consecutive ticks the next claim has failed.
    pub blocked_ticks: u32,

    /// `true` if the in-flight step consumes the current waypoint.  Cleared
    /// when a new path replaces the buffer mid-step.
    pub(crate) step_from_waypoint: bool,
}

impl NavAgent {
    pub fn new(
        id:       AgentId,
        cell:     GridPosition,
        floor:    FloorId,
        settings: AgentSettings,
        now:      Tick,
    ) -> Self {
        Self {
            id,
            floor,
            cell,
            settings,
            movement:      MovementState::stationary(cell, now),
            request:       PathRequestState { last_update: now, ..Default::default() },
            waypoints:     WaypointBuffer::new(settings.max_waypoints),
            goal:          None,
            flags:         PathFlags::empty(),
            waiting_for:   None,
            blocked_ticks: 0,
            step_from_waypoint: false,
        }
    }

    #[inline]
    pub fn status(&self) -> PathStatus {
        self.request.status
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.movement.moving
    }

    /// `true` while the last claim on the next waypoint failed.
    #[inline]
    pub fn is_waiting(&self) -> bool {
        self.blocked_ticks > 0
    }

    /// The cell new paths and steps start from: the step target while a
    /// step is in flight, otherwise the current cell.
    #[inline]
    pub fn origin(&self) -> GridPosition {
        if self.movement.moving { self.movement.target } else { self.cell }
    }

    /// Search flags with the agent's diagonal policy applied.
    #[inline]
    pub fn effective_flags(&self) -> PathFlags {
        if self.settings.allow_diagonal {
            self.flags
        } else {
            self.flags | PathFlags::CARDINAL_ONLY
        }
    }

    pub(crate) fn clear_wait(&mut self) {
        self.waiting_for   = None;
        self.blocked_ticks = 0;
    }
}

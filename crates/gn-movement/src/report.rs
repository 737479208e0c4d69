//! What happened during one arbiter tick.

use gn_core::{AgentId, Direction, GridPosition, NavError, Tick};

/// One observable transition.
#[derive(Debug, Clone, PartialEq)]
pub enum MovementEvent {
    /// A search succeeded and the agent is `Ready`.
    PathResolved { agent: AgentId, steps: usize, partial: bool },
    /// A timed step began.
    StepStarted { agent: AgentId, from: GridPosition, to: GridPosition, direction: Direction, end_tick: Tick },
    /// A timed step finished; the agent now stands on `cell`.
    StepCompleted { agent: AgentId, cell: GridPosition },
    /// The next cell is held by another agent.
    Blocked { agent: AgentId, cell: GridPosition, blocker: Option<AgentId>, blocked_ticks: u32 },
    /// The agent reached the end of its waypoints.
    Completed { agent: AgentId, cell: GridPosition },
    /// The request failed.
    Failed { agent: AgentId, reason: NavError },
}

/// Summary of one `MovementArbiter::tick`.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick:            Tick,
    /// Searches run this tick.
    pub paths_resolved:  usize,
    /// Requests still `Pending` because of the per-tick cap.
    pub paths_deferred:  usize,
    pub steps_started:   usize,
    pub steps_completed: usize,
    pub events:          Vec<MovementEvent>,
}

impl TickReport {
    pub(crate) fn new(tick: Tick) -> Self {
        Self { tick, ..Default::default() }
    }

    /// Agents that raised `Completed` this tick.
    pub fn completed(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.events.iter().filter_map(|e| match e {
            MovementEvent::Completed { agent, .. } => Some(*agent),
            _ => None,
        })
    }

    /// Agents whose request failed this tick, with the reason.
    pub fn failed(&self) -> impl Iterator<Item = (AgentId, &NavError)> + '_ {
        self.events.iter().filter_map(|e| match e {
            MovementEvent::Failed { agent, reason } => Some((*agent, reason)),
            _ => None,
        })
    }

    /// Agents that could not claim their next cell this tick.
    pub fn blocked(&self) -> impl Iterator<Item = (AgentId, Option<AgentId>)> + '_ {
        self.events.iter().filter_map(|e| match e {
            MovementEvent::Blocked { agent, blocker, .. } => Some((*agent, *blocker)),
            _ => None,
        })
    }
}

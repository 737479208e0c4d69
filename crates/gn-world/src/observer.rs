//! World observer trait for progress reporting and event collection.

use gn_core::{AgentId, Direction, GridPosition, NavError, Tick};
use gn_movement::{MovementEvent, TickReport};

/// Callbacks invoked by [`NavWorld::run_ticks`][crate::NavWorld::run_ticks].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
pub trait NavObserver {
    /// Called before the arbiter runs.
    fn on_tick_start(&mut self, _tick: Tick) {}

    fn on_path_resolved(&mut self, _tick: Tick, _agent: AgentId, _steps: usize, _partial: bool) {}

    fn on_step_started(
        &mut self,
        _tick:      Tick,
        _agent:     AgentId,
        _from:      GridPosition,
        _to:        GridPosition,
        _direction: Direction,
    ) {}

    fn on_step_completed(&mut self, _tick: Tick, _agent: AgentId, _cell: GridPosition) {}

    /// The agent could not claim `cell`; `blocker` holds it if known.
    fn on_blocked(&mut self, _tick: Tick, _agent: AgentId, _cell: GridPosition, _blocker: Option<AgentId>) {}

    fn on_completed(&mut self, _tick: Tick, _agent: AgentId, _cell: GridPosition) {}

    fn on_failed(&mut self, _tick: Tick, _agent: AgentId, _reason: &NavError) {}

    /// Called after every event of the tick has been delivered.
    fn on_tick_end(&mut self, _tick: Tick, _report: &TickReport) {}
}

/// A [`NavObserver`] that does nothing.
pub struct NoopObserver;

impl NavObserver for NoopObserver {}

/// Deliver every event in `report`, in order.
pub(crate) fn dispatch<O: NavObserver + ?Sized>(observer: &mut O, report: &TickReport) {
    let t = report.tick;
    for event in &report.events {
        match *event {
            MovementEvent::PathResolved { agent, steps, partial } => {
                observer.on_path_resolved(t, agent, steps, partial)
            }
            MovementEvent::StepStarted { agent, from, to, direction, .. } => {
                observer.on_step_started(t, agent, from, to, direction)
            }
            MovementEvent::StepCompleted { agent, cell } => observer.on_step_completed(t, agent, cell),
            MovementEvent::Blocked { agent, cell, blocker, .. } => {
                observer.on_blocked(t, agent, cell, blocker)
            }
            MovementEvent::Completed { agent, cell } => observer.on_completed(t, agent, cell),
            MovementEvent::Failed { agent, ref reason } => observer.on_failed(t, agent, reason),
        }
    }
}

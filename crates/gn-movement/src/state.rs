//! Per-agent movement and request state.

use gn_core::{Direction, GridPosition, NavError, Tick};

// ── MovementState ─────────────────────────────────────────────────────────────

/// The timed step an agent is currently taking, if any.
///
/// While `moving`, the agent logically stays at `start` and already holds a
/// claim on `target`; at `end_tick` the arbiter finalises the step and the
/// agent's cell becomes `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementState {
    pub start:      GridPosition,
    pub target:     GridPosition,
    pub start_tick: Tick,
    pub end_tick:   Tick,
    pub moving:     bool,
    pub direction:  Option<Direction>,
}

impl MovementState {
    /// Not moving, standing on `cell`.
    #[inline]
    pub fn stationary(cell: GridPosition, tick: Tick) -> Self {
        Self {
            start:      cell,
            target:     cell,
            start_tick: tick,
            end_tick:   tick,
            moving:     false,
            direction:  None,
        }
    }

    /// Fraction of the step completed at `now`, in `[0.0, 1.0]`.
    ///
    /// Returns `1.0` when stationary or when `now >= end_tick`.
    pub fn progress(&self, now: Tick) -> f32 {
        if !self.moving || self.end_tick <= self.start_tick {
            return 1.0;
        }
        let elapsed = now.since(self.start_tick) as f32;
        let total   = (self.end_tick - self.start_tick) as f32;
        (elapsed / total).min(1.0)
    }

    /// Ticks until the step finalises (`0` when stationary).
    #[inline]
    pub fn ticks_remaining(&self, now: Tick) -> u64 {
        if self.moving { self.end_tick.since(now) } else { 0 }
    }
}

// ── PathStatus ────────────────────────────────────────────────────────────────

/// Lifecycle of an agent's current movement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathStatus {
    #[default]
    Idle,
    /// Queued; the search has not run yet.
    Pending,
    /// The search is running for this agent.
    Computing,
    /// Waypoints are ready; the next step has not started.
    Ready,
    /// Stepping along the waypoints.
    Following,
    /// Reached the end of the path.  Raised for one tick.
    Completed,
    /// The search or a step failed; see `PathRequestState::fail_reason`.
    Failed,
}

impl PathStatus {
    /// `true` for states in which the arbiter advances the agent.
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, PathStatus::Ready | PathStatus::Following)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PathStatus::Idle      => "idle",
            PathStatus::Pending   => "pending",
            PathStatus::Computing => "computing",
            PathStatus::Ready     => "ready",
            PathStatus::Following => "following",
            PathStatus::Completed => "completed",
            PathStatus::Failed    => "failed",
        }
    }
}

impl std::fmt::Display for PathStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── PathRequestState ──────────────────────────────────────────────────────────

/// Status, failure reason, and retry bookkeeping for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathRequestState {
    pub status:      PathStatus,
    pub fail_reason: Option<NavError>,
    /// Failures since the target last changed.  Retry policy belongs to the
    /// caller.
    pub attempts:    u32,
    pub last_update: Tick,
}

impl PathRequestState {
    #[inline]
    pub fn set(&mut self, status: PathStatus, now: Tick) {
        self.status      = status;
        self.last_update = now;
    }

    pub fn fail(&mut self, reason: NavError, now: Tick) {
        self.status      = PathStatus::Failed;
        self.fail_reason = Some(reason);
        self.attempts    = self.attempts.saturating_add(1);
        self.last_update = now;
    }
}

//! The per-tick movement state machine.

use std::collections::VecDeque;

use gn_core::{AgentId, Direction, FloorId, GridPosition, NavError, TerrainView, Tick};
use gn_path::{PathEngine, PathFlags};
use tracing::{debug, trace, warn};

use crate::{
    AgentSettings, MovementError, MovementEvent, MovementResult, MovementSnapshot, MovementState,
    NavAgent, NavSpace, PathStatus, TickReport,
};

/// Owns every agent's navigation record and advances them tick by tick.
///
/// Agents live in a `Vec` indexed by `AgentId`; ids are handed out
/// sequentially and never reused, so removed agents leave a `None` hole.
/// Iteration is always in ascending id order, which makes the claim order
/// (and therefore contention outcomes) reproducible.
#[derive(Debug)]
pub struct MovementArbiter {
    agents:                Vec<Option<NavAgent>>,
    live:                  usize,
    pending:               VecDeque<AgentId>,
    max_requests_per_tick: usize,
}

impl MovementArbiter {
    pub fn new(max_requests_per_tick: usize) -> Self {
        Self {
            agents: Vec::new(),
            live: 0,
            pending: VecDeque::new(),
            max_requests_per_tick: max_requests_per_tick.max(1),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Live agents.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[inline]
    pub fn max_requests_per_tick(&self) -> usize {
        self.max_requests_per_tick
    }

    pub fn set_max_requests_per_tick(&mut self, cap: usize) {
        self.max_requests_per_tick = cap.max(1);
    }

    #[inline]
    pub fn agent(&self, id: AgentId) -> Option<&NavAgent> {
        self.agents.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    fn agent_mut(&mut self, id: AgentId) -> MovementResult<&mut NavAgent> {
        self.agents
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(MovementError::UnknownAgent(id))
    }

    /// Live agents in ascending id order.
    pub fn agents(&self) -> impl Iterator<Item = &NavAgent> {
        self.agents.iter().flatten()
    }

    /// Requests still waiting for a search.
    pub fn pending_len(&self) -> usize {
        self.pending
            .iter()
            .filter(|&&id| self.agent(id).is_some_and(|a| a.status() == PathStatus::Pending))
            .count()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Register a new agent standing on `cell` and claim the cell.
    ///
    /// # Errors
    ///
    /// `InvalidSettings`, `FloorOutOfRange`, or `Nav` wrapping
    /// `OutOfBounds` / `BlockedByTerrain` / `BlockedByEntity`.
    pub fn spawn<S: NavSpace>(
        &mut self,
        space:    &S,
        cell:     GridPosition,
        floor:    FloorId,
        settings: AgentSettings,
        now:      Tick,
    ) -> MovementResult<AgentId> {
        settings.validate()?;
        let terrain = space.terrain(floor).ok_or(MovementError::FloorOutOfRange(floor))?;
        let occ     = space.occupancy(floor).ok_or(MovementError::FloorOutOfRange(floor))?;
        if !terrain.in_bounds(cell) {
            return Err(NavError::OutOfBounds(cell).into());
        }
        if terrain.is_blocked(cell) {
            return Err(NavError::BlockedByTerrain(cell).into());
        }

        let id = AgentId::try_from(self.agents.len()).map_err(|_| MovementError::IdsExhausted)?;
        if id == AgentId::INVALID {
            return Err(MovementError::IdsExhausted);
        }
        if !occ.try_occupy(&terrain, cell, id) {
            return Err(NavError::BlockedByEntity { pos: cell, blocker: occ.occupant(cell) }.into());
        }

        self.agents.push(Some(NavAgent::new(id, cell, floor, settings, now)));
        self.live += 1;
        debug!(agent = %id, %cell, floor = floor.0, "agent spawned");
        Ok(id)
    }

    /// Unregister `id`, releasing its cell and any in-flight step claim.
    pub fn remove<S: NavSpace>(&mut self, space: &S, id: AgentId) -> MovementResult<NavAgent> {
        let agent = self
            .agents
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(MovementError::UnknownAgent(id))?;
        self.live -= 1;

        if let Some(occ) = space.occupancy(agent.floor) {
            occ.release(agent.cell, id);
            if agent.movement.moving {
                occ.release(agent.movement.target, id);
            }
        }
        debug!(agent = %id, cell = %agent.cell, "agent removed");
        Ok(agent)
    }

    // ── Requests ──────────────────────────────────────────────────────────

    /// Queue a search to `target`.  Any previous path is discarded.
    ///
    /// A step already in flight still completes; the new path starts from
    /// that step's target.
    pub fn request_path(
        &mut self,
        id:     AgentId,
        target: GridPosition,
        flags:  PathFlags,
        now:    Tick,
    ) -> MovementResult<()> {
        let agent = self.agent_mut(id)?;
        let queued = agent.status() == PathStatus::Pending;
        reset_request(agent, Some(target), flags);
        agent.request.set(PathStatus::Pending, now);
        if !queued {
            self.pending.push_back(id);
        }
        Ok(())
    }

    /// Step one cell in `dir` without searching.  Returns the target cell.
    ///
    /// Walkability is checked when the step starts, like any waypoint.
    pub fn request_directional_step(
        &mut self,
        id:  AgentId,
        dir: Direction,
        now: Tick,
    ) -> MovementResult<GridPosition> {
        let agent = self.agent_mut(id)?;
        if dir.is_diagonal() && !agent.settings.allow_diagonal {
            return Err(MovementError::DiagonalDisallowed(id));
        }
        let to = agent.origin().step(dir);
        reset_request(agent, Some(to), PathFlags::empty());
        agent.waypoints.assign_single(to);
        agent.request.set(PathStatus::Ready, now);
        Ok(to)
    }

    /// Cancel all movement.  The agent stays on its current cell; an
    /// in-flight step's claim is released and the waypoints are dropped.
    pub fn stop<S: NavSpace>(&mut self, space: &S, id: AgentId, now: Tick) -> MovementResult<()> {
        let agent = self.agent_mut(id)?;
        if agent.movement.moving && agent.movement.target != agent.cell {
            if let Some(occ) = space.occupancy(agent.floor) {
                occ.release(agent.movement.target, id);
            }
        }
        agent.movement = MovementState::stationary(agent.cell, now);
        reset_request(agent, None, PathFlags::empty());
        agent.request.set(PathStatus::Idle, now);
        Ok(())
    }

    // ── Snapshots ─────────────────────────────────────────────────────────

    pub fn snapshot_of(&self, id: AgentId, now: Tick) -> Option<MovementSnapshot> {
        self.agent(id).map(|a| MovementSnapshot::of(a, now))
    }

    /// One snapshot per live agent, ascending id order.
    pub fn snapshot(&self, now: Tick) -> Vec<MovementSnapshot> {
        self.agents().map(|a| MovementSnapshot::of(a, now)).collect()
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance every agent to `now`.
    pub fn tick<S: NavSpace>(&mut self, now: Tick, space: &S, engine: &mut PathEngine) -> TickReport {
        let mut report = TickReport::new(now);
        self.expire_completed(now);
        self.drain_requests(now, space, engine, &mut report);
        self.finalize_steps(now, space, &mut report);
        self.start_steps(now, space, &mut report);
        report
    }

    /// `Completed` is visible for exactly one tick.
    fn expire_completed(&mut self, now: Tick) {
        for agent in self.agents.iter_mut().flatten() {
            if agent.status() == PathStatus::Completed && agent.request.last_update < now {
                agent.request.set(PathStatus::Idle, now);
            }
        }
    }

    fn drain_requests<S: NavSpace>(
        &mut self,
        now:    Tick,
        space:  &S,
        engine: &mut PathEngine,
        report: &mut TickReport,
    ) {
        let mut budget = self.max_requests_per_tick;
        while budget > 0 {
            let Some(id) = self.pending.pop_front() else {
                break;
            };
            let Some(agent) = self.agents.get_mut(id.index()).and_then(Option::as_mut) else {
                continue;
            };
            if agent.status() != PathStatus::Pending {
                continue;
            }
            budget -= 1;
            report.paths_resolved += 1;
            agent.request.set(PathStatus::Computing, now);

            let origin = agent.origin();
            let Some(goal) = agent.goal else {
                agent.request.set(PathStatus::Idle, now);
                continue;
            };
            let flags = agent.effective_flags();
            let result = match space.terrain(agent.floor) {
                Some(terrain) => engine
                    .find_path(&terrain, origin, goal, flags, &mut agent.waypoints)
                    .map_err(NavError::from),
                None => Err(NavError::OutOfBounds(origin)),
            };

            match result {
                Ok(out) => {
                    agent.request.fail_reason = None;
                    agent.request.set(PathStatus::Ready, now);
                    debug!(agent = %id, %origin, %goal, steps = out.steps, partial = out.partial, "path resolved");
                    report.events.push(MovementEvent::PathResolved {
                        agent:   id,
                        steps:   out.steps,
                        partial: out.partial,
                    });
                }
                Err(reason) => {
                    debug!(agent = %id, %origin, %goal, %reason, "path failed");
                    fail(agent, reason, now, report);
                }
            }
        }
        report.paths_deferred = self.pending_len();
    }

    fn finalize_steps<S: NavSpace>(&mut self, now: Tick, space: &S, report: &mut TickReport) {
        for agent in self.agents.iter_mut().flatten() {
            if !agent.movement.moving || agent.movement.end_tick > now {
                continue;
            }
            let from = agent.cell;
            let to   = agent.movement.target;
            if let Some(occ) = space.occupancy(agent.floor) {
                occ.release(from, agent.id);
            }
            agent.cell     = to;
            agent.movement = MovementState::stationary(to, now);
            if agent.step_from_waypoint {
                agent.waypoints.advance();
                agent.step_from_waypoint = false;
            }
            report.steps_completed += 1;
            trace!(agent = %agent.id, %from, %to, "step finalised");
            report.events.push(MovementEvent::StepCompleted { agent: agent.id, cell: to });
        }
    }

    /// Verify, claim, then start: in that order, for every standing agent
    /// with waypoints left.
    fn start_steps<S: NavSpace>(&mut self, now: Tick, space: &S, report: &mut TickReport) {
        for agent in self.agents.iter_mut().flatten() {
            if agent.movement.moving || !agent.status().is_active() {
                continue;
            }
            let Some(next) = agent.waypoints.current() else {
                agent.clear_wait();
                agent.request.attempts = 0;
                agent.request.set(PathStatus::Completed, now);
                debug!(agent = %agent.id, cell = %agent.cell, "path completed");
                report.events.push(MovementEvent::Completed { agent: agent.id, cell: agent.cell });
                continue;
            };
            let (Some(terrain), Some(occ)) = (space.terrain(agent.floor), space.occupancy(agent.floor))
            else {
                continue;
            };

            let Some(dir) = agent.cell.direction_to(next) else {
                let reason = NavError::NoPathExists { from: agent.cell, to: next };
                fail(agent, reason, now, report);
                continue;
            };
            if !terrain.in_bounds(next) {
                fail(agent, NavError::OutOfBounds(next), now, report);
                continue;
            }
            if !step_is_walkable(&terrain, agent.cell, dir) {
                fail(agent, NavError::BlockedByTerrain(next), now, report);
                continue;
            }

            if occ.try_occupy(&terrain, next, agent.id) {
                let ticks = agent.settings.step_ticks(dir.is_diagonal()) as u64;
                agent.movement = MovementState {
                    start:      agent.cell,
                    target:     next,
                    start_tick: now,
                    end_tick:   now + ticks,
                    moving:     true,
                    direction:  Some(dir),
                };
                agent.step_from_waypoint = true;
                agent.clear_wait();
                agent.request.set(PathStatus::Following, now);
                report.steps_started += 1;
                trace!(agent = %agent.id, from = %agent.cell, to = %next, dir = %dir, ticks, "step started");
                report.events.push(MovementEvent::StepStarted {
                    agent:     agent.id,
                    from:      agent.cell,
                    to:        next,
                    direction: dir,
                    end_tick:  now + ticks,
                });
                continue;
            }

            let blocker = occ.occupant(next).filter(|&b| b != agent.id);
            agent.waiting_for    = blocker;
            agent.blocked_ticks += 1;
            if agent.blocked_ticks > agent.settings.max_block_retries {
                warn!(
                    agent = %agent.id,
                    cell = %next,
                    blocker = ?blocker,
                    retries = agent.settings.max_block_retries,
                    "block retries exhausted",
                );
                let reason = NavError::BlockedByEntity { pos: next, blocker };
                fail(agent, reason, now, report);
            } else {
                report.events.push(MovementEvent::Blocked {
                    agent:         agent.id,
                    cell:          next,
                    blocker,
                    blocked_ticks: agent.blocked_ticks,
                });
            }
        }
    }
}

impl Default for MovementArbiter {
    fn default() -> Self {
        Self::new(64)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Drop the current path and start a new request toward `goal`.
fn reset_request(agent: &mut NavAgent, goal: Option<GridPosition>, flags: PathFlags) {
    if agent.goal != goal {
        agent.request.attempts = 0;
    }
    agent.goal  = goal;
    agent.flags = flags;
    agent.request.fail_reason = None;
    agent.waypoints.invalidate();
    agent.step_from_waypoint = false;
    agent.clear_wait();
}

/// Mark the request failed and drop the path.
fn fail(agent: &mut NavAgent, reason: NavError, now: Tick, report: &mut TickReport) {
    agent.waypoints.invalidate();
    agent.clear_wait();
    agent.request.fail(reason.clone(), now);
    report.events.push(MovementEvent::Failed { agent: agent.id, reason });
}

/// Destination walkable and, for diagonals, neither corner blocked.
fn step_is_walkable<T: TerrainView + ?Sized>(terrain: &T, from: GridPosition, dir: Direction) -> bool {
    if terrain.is_blocked(from.step(dir)) {
        return false;
    }
    match dir.corner_components() {
        Some((a, b)) => !terrain.is_blocked(from.step(a)) && !terrain.is_blocked(from.step(b)),
        None => true,
    }
}

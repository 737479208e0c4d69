//! Unit tests for gn-movement.

use gn_core::{AgentId, Direction, FloorId, GridPosition, NavError, TerrainView, Tick};
use gn_grid::CollisionCache;
use gn_occupancy::{OccupancyIndex, OccupancyMode};
use gn_path::{PathEngine, PathFlags};

use crate::{AgentSettings, MovementArbiter, MovementEvent, NavSpace, PathStatus, TickReport};

// ── Helpers ───────────────────────────────────────────────────────────────────

const F0: FloorId = FloorId::GROUND;

fn p(x: i32, y: i32) -> GridPosition {
    GridPosition::new(x, y)
}

/// Single-floor space: a collision bitset plus an occupancy index.
struct Space {
    cache: CollisionCache,
    occ:   OccupancyIndex,
}

impl NavSpace for Space {
    fn terrain(&self, floor: FloorId) -> Option<impl TerrainView + '_> {
        (floor == F0).then_some(&self.cache)
    }

    fn occupancy(&self, floor: FloorId) -> Option<&OccupancyIndex> {
        (floor == F0).then_some(&self.occ)
    }
}

/// Arbiter + space + engine driven one tick at a time from `Tick(0)`.
struct Harness {
    space:   Space,
    arb:     MovementArbiter,
    engine:  PathEngine,
    now:     Tick,
    reports: Vec<TickReport>,
}

impl Harness {
    fn open(width: u32, height: u32) -> Self {
        Self {
            space:   Space {
                cache: CollisionCache::empty(width, height),
                occ:   OccupancyIndex::new(width, height, OccupancyMode::Exclusive),
            },
            arb:     MovementArbiter::new(64),
            engine:  PathEngine::new(width, height),
            now:     Tick::ZERO,
            reports: Vec::new(),
        }
    }

    fn spawn(&mut self, cell: GridPosition, settings: AgentSettings) -> AgentId {
        self.arb.spawn(&self.space, cell, F0, settings, self.now).unwrap()
    }

    fn request(&mut self, id: AgentId, target: GridPosition) {
        self.arb.request_path(id, target, PathFlags::empty(), self.now).unwrap();
    }

    /// Run the current tick, then advance the clock.
    fn step(&mut self) -> &TickReport {
        let report = self.arb.tick(self.now, &self.space, &mut self.engine);
        self.now = self.now.next();
        self.reports.push(report);
        self.reports.last().unwrap()
    }

    fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    fn status(&self, id: AgentId) -> PathStatus {
        self.arb.agent(id).unwrap().status()
    }

    fn cell(&self, id: AgentId) -> GridPosition {
        self.arb.agent(id).unwrap().cell
    }

    fn events_for(&self, id: AgentId) -> Vec<(Tick, MovementEvent)> {
        self.reports
            .iter()
            .flat_map(|r| r.events.iter().map(move |e| (r.tick, e.clone())))
            .filter(|(_, e)| event_agent(e) == id)
            .collect()
    }
}

fn event_agent(e: &MovementEvent) -> AgentId {
    match e {
        MovementEvent::PathResolved { agent, .. }
        | MovementEvent::StepStarted { agent, .. }
        | MovementEvent::StepCompleted { agent, .. }
        | MovementEvent::Blocked { agent, .. }
        | MovementEvent::Completed { agent, .. }
        | MovementEvent::Failed { agent, .. } => *agent,
    }
}

fn cardinal(ticks: u32) -> AgentSettings {
    AgentSettings {
        cardinal_step_ticks: ticks,
        diagonal_step_ticks: ticks + ticks / 2,
        ..AgentSettings::default()
    }
}

// ── Settings & state ──────────────────────────────────────────────────────────

#[cfg(test)]
mod settings {
    use super::*;
    use crate::MovementError;

    #[test]
    fn default_is_valid() {
        assert!(AgentSettings::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_settings() {
        let bad = [
            AgentSettings { cardinal_step_ticks: 0, ..AgentSettings::default() },
            AgentSettings { cardinal_step_ticks: 6, diagonal_step_ticks: 5, ..AgentSettings::default() },
            AgentSettings { max_waypoints: 0, ..AgentSettings::default() },
            AgentSettings { max_waypoints: gn_path::MAX_WAYPOINTS + 1, ..AgentSettings::default() },
        ];
        for s in bad {
            assert!(matches!(s.validate(), Err(MovementError::InvalidSettings(_))), "{s:?}");
        }
    }

    #[test]
    fn step_ticks_by_direction() {
        let s = cardinal(4);
        assert_eq!(s.step_ticks(false), 4);
        assert_eq!(s.step_ticks(true), 6);
    }
}

#[cfg(test)]
mod movement_state {
    use crate::MovementState;

    use super::*;

    #[test]
    fn stationary_progress_is_one() {
        let s = MovementState::stationary(p(1, 1), Tick(3));
        assert_eq!(s.progress(Tick(3)), 1.0);
        assert_eq!(s.ticks_remaining(Tick(3)), 0);
    }

    #[test]
    fn progress_and_remaining_mid_step() {
        let s = MovementState {
            start:      p(0, 0),
            target:     p(1, 0),
            start_tick: Tick(10),
            end_tick:   Tick(14),
            moving:     true,
            direction:  Some(Direction::East),
        };
        assert_eq!(s.progress(Tick(10)), 0.0);
        assert!((s.progress(Tick(11)) - 0.25).abs() < 1e-6);
        assert_eq!(s.progress(Tick(20)), 1.0);
        assert_eq!(s.ticks_remaining(Tick(11)), 3);
        assert_eq!(s.ticks_remaining(Tick(20)), 0);
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;
    use crate::MovementError;

    #[test]
    fn spawn_claims_cell_and_ids_are_sequential() {
        let mut h = Harness::open(4, 4);
        let a = h.spawn(p(0, 0), AgentSettings::default());
        let b = h.spawn(p(1, 0), AgentSettings::default());
        assert_eq!((a, b), (AgentId(0), AgentId(1)));
        assert_eq!(h.space.occ.occupant(p(0, 0)), Some(a));
        assert_eq!(h.arb.len(), 2);
    }

    #[test]
    fn spawn_rejections() {
        let mut h = Harness::open(4, 4);
        h.space.cache.set_blocked(p(2, 2), true);
        let a = h.spawn(p(0, 0), AgentSettings::default());
        let s = AgentSettings::default();

        assert_eq!(
            h.arb.spawn(&h.space, p(0, 0), F0, s, h.now),
            Err(MovementError::from(NavError::BlockedByEntity { pos: p(0, 0), blocker: Some(a) })),
        );
        assert_eq!(
            h.arb.spawn(&h.space, p(2, 2), F0, s, h.now),
            Err(MovementError::from(NavError::BlockedByTerrain(p(2, 2)))),
        );
        assert_eq!(
            h.arb.spawn(&h.space, p(4, 0), F0, s, h.now),
            Err(MovementError::from(NavError::OutOfBounds(p(4, 0)))),
        );
        assert_eq!(
            h.arb.spawn(&h.space, p(1, 1), FloorId(3), s, h.now),
            Err(MovementError::FloorOutOfRange(FloorId(3))),
        );
        let bad = AgentSettings { diagonal_step_ticks: 1, cardinal_step_ticks: 2, ..s };
        assert!(matches!(
            h.arb.spawn(&h.space, p(1, 1), F0, bad, h.now),
            Err(MovementError::InvalidSettings(_)),
        ));
        assert_eq!(h.arb.len(), 1);
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut h = Harness::open(4, 4);
        let a = h.spawn(p(0, 0), AgentSettings::default());
        h.arb.remove(&h.space, a).unwrap();
        assert!(!h.space.occ.is_occupied(p(0, 0)));
        let b = h.spawn(p(0, 0), AgentSettings::default());
        assert_ne!(a, b);
        assert_eq!(h.arb.remove(&h.space, a).err(), Some(MovementError::UnknownAgent(a)));
    }

    #[test]
    fn remove_mid_step_releases_both_cells() {
        let mut h = Harness::open(4, 1);
        let a = h.spawn(p(0, 0), cardinal(4));
        h.request(a, p(3, 0));
        h.step();
        assert!(h.space.occ.is_occupied(p(1, 0)));
        h.arb.remove(&h.space, a).unwrap();
        assert_eq!(h.space.occ.occupied_cells(), 0);
    }

    #[test]
    fn unknown_agent_requests_fail() {
        let mut h = Harness::open(4, 4);
        let ghost = AgentId(42);
        assert_eq!(
            h.arb.request_path(ghost, p(1, 1), PathFlags::empty(), h.now),
            Err(MovementError::UnknownAgent(ghost)),
        );
        assert!(h.arb.stop(&h.space, ghost, h.now).is_err());
    }
}

// ── Following a path ──────────────────────────────────────────────────────────

#[cfg(test)]
mod following {
    use super::*;

    #[test]
    fn ten_by_ten_row_end_to_end() {
        let mut h = Harness::open(10, 10);
        let a = h.spawn(p(0, 0), cardinal(4));
        h.request(a, p(9, 0));

        // Step k (1-based) starts at tick 4(k-1) and ends at tick 4k.
        h.run(33);
        assert_eq!(h.cell(a), p(8, 0));
        assert_eq!(h.space.occ.occupant(p(8, 0)), Some(a));
        assert_eq!(h.space.occ.occupant(p(9, 0)), Some(a));

        h.run(10);
        assert_eq!(h.cell(a), p(9, 0));
        assert_eq!(h.space.occ.occupant(p(9, 0)), Some(a));
        assert_eq!(h.space.occ.occupant(p(8, 0)), None);
        assert_eq!(h.space.occ.occupied_cells(), 1);

        let events = h.events_for(a);
        let starts: Vec<_> = events
            .iter()
            .filter_map(|(t, e)| match e {
                MovementEvent::StepStarted { to, end_tick, direction, .. } => Some((*t, *to, *end_tick, *direction)),
                _ => None,
            })
            .collect();
        assert_eq!(starts.len(), 9);
        for (k, (t, to, end, dir)) in starts.into_iter().enumerate() {
            assert_eq!(t, Tick(4 * k as u64));
            assert_eq!(end, t + 4);
            assert_eq!(to, p(k as i32 + 1, 0));
            assert_eq!(dir, Direction::East);
        }

        let completed: Vec<_> = events
            .iter()
            .filter(|(_, e)| matches!(e, MovementEvent::Completed { .. }))
            .collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].0, Tick(36));
        assert_eq!(h.status(a), PathStatus::Idle);
    }

    #[test]
    fn completed_is_raised_for_one_tick() {
        let mut h = Harness::open(3, 1);
        let a = h.spawn(p(0, 0), cardinal(1));
        h.request(a, p(1, 0));
        h.step();
        h.step();
        assert_eq!(h.status(a), PathStatus::Completed);
        h.step();
        assert_eq!(h.status(a), PathStatus::Idle);
    }

    #[test]
    fn request_and_first_step_in_same_tick() {
        let mut h = Harness::open(5, 5);
        let a = h.spawn(p(2, 2), cardinal(3));
        h.request(a, p(2, 4));
        let report = h.step().clone();
        assert_eq!(report.paths_resolved, 1);
        assert_eq!(report.steps_started, 1);
        assert_eq!(h.status(a), PathStatus::Following);
        assert!(h.arb.agent(a).unwrap().is_moving());
    }

    #[test]
    fn zero_step_path_completes_immediately() {
        let mut h = Harness::open(5, 5);
        let a = h.spawn(p(2, 2), cardinal(3));
        h.request(a, p(2, 2));
        let report = h.step().clone();
        assert_eq!(report.completed().collect::<Vec<_>>(), vec![a]);
        assert_eq!(h.cell(a), p(2, 2));
    }

    #[test]
    fn diagonal_steps_use_diagonal_duration() {
        let mut h = Harness::open(5, 5);
        let a = h.spawn(p(0, 0), cardinal(4));
        h.request(a, p(1, 1));
        h.step();
        let m = h.arb.agent(a).unwrap().movement;
        assert_eq!(m.direction, Some(Direction::SouthEast));
        assert_eq!(m.end_tick - m.start_tick, 6);
    }

    #[test]
    fn cardinal_only_agents_never_step_diagonally() {
        let mut h = Harness::open(5, 5);
        let settings = AgentSettings { allow_diagonal: false, ..cardinal(1) };
        let a = h.spawn(p(0, 0), settings);
        h.request(a, p(3, 3));
        h.run(20);
        assert_eq!(h.cell(a), p(3, 3));
        for (_, e) in h.events_for(a) {
            if let MovementEvent::StepStarted { direction, .. } = e {
                assert!(!direction.is_diagonal());
            }
        }
    }

    #[test]
    fn request_cap_defers_overflow() {
        let mut h = Harness::open(8, 8);
        h.arb.set_max_requests_per_tick(2);
        let ids: Vec<_> = (0..5).map(|x| h.spawn(p(x, 0), cardinal(2))).collect();
        for &id in &ids {
            h.request(id, p(id.0 as i32, 7));
        }
        let r = h.step().clone();
        assert_eq!((r.paths_resolved, r.paths_deferred), (2, 3));
        assert_eq!(h.status(ids[4]), PathStatus::Pending);
        let r = h.step().clone();
        assert_eq!((r.paths_resolved, r.paths_deferred), (2, 1));
        let r = h.step().clone();
        assert_eq!((r.paths_resolved, r.paths_deferred), (1, 0));
    }

    #[test]
    fn new_request_mid_step_starts_from_step_target() {
        let mut h = Harness::open(6, 1);
        let a = h.spawn(p(0, 0), cardinal(4));
        h.request(a, p(5, 0));
        h.step();
        // Mid-step toward (1,0): redirect back to (0,0).
        h.request(a, p(0, 0));
        h.run(10);
        assert_eq!(h.cell(a), p(0, 0));
        assert_eq!(h.space.occ.occupied_cells(), 1);
        let visited: Vec<_> = h
            .events_for(a)
            .into_iter()
            .filter_map(|(_, e)| match e {
                MovementEvent::StepCompleted { cell, .. } => Some(cell),
                _ => None,
            })
            .collect();
        assert_eq!(visited, vec![p(1, 0), p(0, 0)]);
    }

    #[test]
    fn partial_paths_stop_at_capacity() {
        let mut h = Harness::open(10, 1);
        let settings = AgentSettings { max_waypoints: 3, ..cardinal(1) };
        let a = h.spawn(p(0, 0), settings);
        h.arb.request_path(a, p(9, 0), PathFlags::ALLOW_PARTIAL, h.now).unwrap();
        h.run(10);
        assert_eq!(h.cell(a), p(3, 0));
        assert!(h.arb.agent(a).unwrap().waypoints.is_partial());
    }
}

// ── Contention ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod contention {
    use super::*;

    #[test]
    fn waits_for_blocker_then_resumes_without_repath() {
        let mut h = Harness::open(10, 10);
        let settings = AgentSettings { max_block_retries: 50, ..cardinal(4) };
        let a = h.spawn(p(6, 5), settings);
        let b = h.spawn(p(4, 5), settings);
        h.request(b, p(6, 5));

        // B reaches (5,5) at tick 4 and is blocked by A from then on.
        h.run(7);
        let agent_b = h.arb.agent(b).unwrap();
        assert_eq!(agent_b.cell, p(5, 5));
        assert!(agent_b.is_waiting());
        assert_eq!(agent_b.waiting_for, Some(a));
        assert_eq!(agent_b.blocked_ticks, 3);
        assert_eq!(agent_b.status(), PathStatus::Following);

        // A steps east at tick 7 and vacates (6,5) at tick 11.
        h.arb.request_directional_step(a, Direction::East, h.now).unwrap();
        h.run(4);
        assert!(h.arb.agent(b).unwrap().is_waiting());
        let report = h.step().clone();
        assert_eq!(report.tick, Tick(11));
        assert!(report.events.contains(&MovementEvent::StepStarted {
            agent:     b,
            from:      p(5, 5),
            to:        p(6, 5),
            direction: Direction::East,
            end_tick:  Tick(15),
        }));
        assert!(!h.arb.agent(b).unwrap().is_waiting());

        let resolves = h
            .events_for(b)
            .iter()
            .filter(|(_, e)| matches!(e, MovementEvent::PathResolved { .. }))
            .count();
        assert_eq!(resolves, 1);

        h.run(4);
        assert_eq!(h.cell(b), p(6, 5));
        assert_eq!(h.cell(a), p(7, 5));
    }

    #[test]
    fn retry_budget_exhaustion_fails_with_blocker() {
        let mut h = Harness::open(10, 10);
        let settings = AgentSettings { max_block_retries: 2, ..cardinal(1) };
        let a = h.spawn(p(6, 5), settings);
        let b = h.spawn(p(5, 5), settings);
        h.request(b, p(6, 5));

        h.run(2);
        assert_eq!(h.status(b), PathStatus::Ready);
        h.step();
        let agent_b = h.arb.agent(b).unwrap();
        assert_eq!(agent_b.status(), PathStatus::Failed);
        assert_eq!(
            agent_b.request.fail_reason,
            Some(NavError::BlockedByEntity { pos: p(6, 5), blocker: Some(a) }),
        );
        assert_eq!(agent_b.request.attempts, 1);
        assert!(!agent_b.waypoints.is_valid());
        assert_eq!(h.space.occ.occupant(p(5, 5)), Some(b));

        // Retrying the same target keeps counting attempts.
        h.request(b, p(6, 5));
        h.run(3);
        assert_eq!(h.arb.agent(b).unwrap().request.attempts, 2);
    }

    #[test]
    fn lower_id_wins_a_contested_cell() {
        let mut h = Harness::open(3, 3);
        let a = h.spawn(p(0, 1), cardinal(2));
        let b = h.spawn(p(2, 1), cardinal(2));
        h.request(a, p(1, 1));
        h.request(b, p(1, 1));
        let report = h.step().clone();
        assert_eq!(report.steps_started, 1);
        assert_eq!(report.blocked().collect::<Vec<_>>(), vec![(b, Some(a))]);
        assert_eq!(h.space.occ.occupant(p(1, 1)), Some(a));
    }
}

// ── Failures & control ────────────────────────────────────────────────────────

#[cfg(test)]
mod control {
    use super::*;
    use crate::MovementError;

    #[test]
    fn search_failure_sets_reason_and_attempts() {
        let mut h = Harness::open(5, 5);
        h.space.cache.set_blocked(p(4, 4), true);
        let a = h.spawn(p(0, 0), cardinal(1));
        h.request(a, p(4, 4));
        h.step();
        assert_eq!(h.status(a), PathStatus::Failed);
        let req = &h.arb.agent(a).unwrap().request;
        assert_eq!(req.fail_reason, Some(NavError::BlockedByTerrain(p(4, 4))));
        assert_eq!(req.attempts, 1);

        h.request(a, p(4, 4));
        h.step();
        assert_eq!(h.arb.agent(a).unwrap().request.attempts, 2);

        h.request(a, p(1, 0));
        assert_eq!(h.arb.agent(a).unwrap().request.attempts, 0);
    }

    #[test]
    fn terrain_change_on_next_waypoint_fails_step() {
        let mut h = Harness::open(5, 1);
        let a = h.spawn(p(0, 0), cardinal(2));
        h.request(a, p(4, 0));
        h.run(2);
        h.space.cache.set_blocked(p(2, 0), true);
        h.step();
        let agent = h.arb.agent(a).unwrap();
        assert_eq!(agent.cell, p(1, 0));
        assert_eq!(agent.status(), PathStatus::Failed);
        assert_eq!(agent.request.fail_reason, Some(NavError::BlockedByTerrain(p(2, 0))));
    }

    #[test]
    fn stop_mid_step_keeps_current_cell() {
        let mut h = Harness::open(5, 1);
        let a = h.spawn(p(0, 0), cardinal(4));
        h.request(a, p(4, 0));
        h.run(2);
        h.arb.stop(&h.space, a, h.now).unwrap();
        let agent = h.arb.agent(a).unwrap();
        assert_eq!(agent.cell, p(0, 0));
        assert!(!agent.is_moving());
        assert!(!agent.waypoints.is_valid());
        assert_eq!(agent.status(), PathStatus::Idle);
        assert_eq!(h.space.occ.occupant(p(1, 0)), None);
        h.run(10);
        assert_eq!(h.cell(a), p(0, 0));
    }

    #[test]
    fn stop_cancels_pending_request() {
        let mut h = Harness::open(5, 1);
        let a = h.spawn(p(0, 0), cardinal(1));
        h.request(a, p(4, 0));
        h.arb.stop(&h.space, a, h.now).unwrap();
        let r = h.step().clone();
        assert_eq!(r.paths_resolved, 0);
        assert_eq!(h.status(a), PathStatus::Idle);
    }

    #[test]
    fn directional_steps() {
        let mut h = Harness::open(3, 3);
        h.space.cache.set_blocked(p(1, 0), true);
        let a = h.spawn(p(1, 1), cardinal(1));
        let straight = AgentSettings { allow_diagonal: false, ..cardinal(1) };
        let b = h.spawn(p(0, 2), straight);

        assert_eq!(h.arb.request_directional_step(a, Direction::South, h.now), Ok(p(1, 2)));
        h.run(2);
        assert_eq!(h.cell(a), p(1, 2));

        assert_eq!(
            h.arb.request_directional_step(b, Direction::NorthEast, h.now),
            Err(MovementError::DiagonalDisallowed(b)),
        );
        h.arb.request_directional_step(b, Direction::West, h.now).unwrap();
        h.step();
        assert_eq!(
            h.arb.agent(b).unwrap().request.fail_reason,
            Some(NavError::OutOfBounds(p(-1, 2))),
        );
    }

    #[test]
    fn directional_diagonal_cannot_cut_corners() {
        let mut h = Harness::open(3, 3);
        h.space.cache.set_blocked(p(1, 1), true);
        let a = h.spawn(p(0, 1), cardinal(1));
        h.arb.request_directional_step(a, Direction::NorthEast, h.now).unwrap();
        h.step();
        assert_eq!(
            h.arb.agent(a).unwrap().request.fail_reason,
            Some(NavError::BlockedByTerrain(p(1, 0))),
        );
        assert_eq!(h.cell(a), p(0, 1));
    }

    #[test]
    fn snapshot_reports_in_flight_step() {
        let mut h = Harness::open(5, 5);
        let a = h.spawn(p(0, 0), cardinal(4));
        let b = h.spawn(p(4, 4), cardinal(4));
        h.request(a, p(0, 3));
        h.step();
        h.step();
        let snaps = h.arb.snapshot(h.now);
        assert_eq!(snaps.len(), 2);
        let sa = snaps[0];
        assert_eq!((sa.agent, sa.cell, sa.target), (a, p(0, 0), p(0, 1)));
        assert!(sa.is_moving);
        assert_eq!(sa.direction, Some(Direction::South));
        assert_eq!(sa.ticks_remaining, 2);
        let sb = h.arb.snapshot_of(b, h.now).unwrap();
        assert_eq!((sb.cell, sb.target, sb.is_moving, sb.ticks_remaining), (p(4, 4), p(4, 4), false, 0));
    }
}

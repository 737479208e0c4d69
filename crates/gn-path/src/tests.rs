//! Unit tests for gn-path.

use gn_core::{GridPosition, TerrainView};

use crate::{PathEngine, PathFailure, PathFlags, WaypointBuffer};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn p(x: i32, y: i32) -> GridPosition {
    GridPosition::new(x, y)
}

/// Hand-drawn terrain: `#` is blocked, a digit is a movement cost, anything
/// else costs 1.
struct Ascii {
    width:  u32,
    height: u32,
    cells:  Vec<u8>,
}

impl Ascii {
    fn new(rows: &[&str]) -> Self {
        let width = rows[0].len() as u32;
        let cells = rows.iter().flat_map(|r| r.bytes()).collect();
        Self { width, height: rows.len() as u32, cells }
    }

    fn open(width: u32, height: u32) -> Self {
        Self { width, height, cells: vec![b'.'; (width * height) as usize] }
    }

    fn at(&self, pos: GridPosition) -> Option<u8> {
        pos.in_bounds(self.width, self.height).then(|| self.cells[pos.row_major(self.width)])
    }
}

impl TerrainView for Ascii {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_blocked(&self, pos: GridPosition) -> bool {
        self.at(pos).is_none_or(|c| c == b'#')
    }

    fn movement_cost(&self, pos: GridPosition) -> u8 {
        match self.at(pos) {
            Some(c @ b'1'..=b'9') => c - b'0',
            _ => 1,
        }
    }
}

fn solve(
    terrain: &Ascii,
    from:    GridPosition,
    to:      GridPosition,
    flags:   PathFlags,
) -> Result<Vec<GridPosition>, PathFailure> {
    let mut engine = PathEngine::for_terrain(terrain);
    let mut buf = WaypointBuffer::default();
    engine.find_path(terrain, from, to, flags, &mut buf)?;
    Ok(buf.as_slice().to_vec())
}

/// Every consecutive pair is one king-move apart.
fn assert_contiguous(start: GridPosition, path: &[GridPosition]) {
    let mut prev = start;
    for &step in path {
        assert!(prev.direction_to(step).is_some(), "{prev} -> {step} is not a single step");
        prev = step;
    }
}

// ── Basic searches ────────────────────────────────────────────────────────────

#[cfg(test)]
mod search {
    use super::*;

    #[test]
    fn straight_corridor() {
        let t = Ascii::open(10, 1);
        let path = solve(&t, p(0, 0), p(9, 0), PathFlags::empty()).unwrap();
        assert_eq!(path.len(), 9);
        assert_eq!(path.first(), Some(&p(1, 0)));
        assert_eq!(path.last(), Some(&p(9, 0)));
        assert_contiguous(p(0, 0), &path);
    }

    #[test]
    fn open_ten_by_ten_row_is_nine_cardinal_steps() {
        let t = Ascii::open(10, 10);
        let path = solve(&t, p(0, 0), p(9, 0), PathFlags::empty()).unwrap();
        assert_eq!(path, (1..=9).map(|x| p(x, 0)).collect::<Vec<_>>());
    }

    #[test]
    fn start_equals_target_is_zero_steps() {
        let t = Ascii::open(4, 4);
        let mut engine = PathEngine::for_terrain(&t);
        let mut buf = WaypointBuffer::default();
        let out = engine.find_path(&t, p(2, 2), p(2, 2), PathFlags::empty(), &mut buf).unwrap();
        assert_eq!(out.steps, 0);
        assert!(buf.is_valid());
        assert!(buf.is_finished());
        assert_eq!(buf.current(), None);
    }

    #[test]
    fn diagonal_shortcut_when_allowed() {
        let t = Ascii::open(5, 5);
        let path = solve(&t, p(0, 0), p(4, 4), PathFlags::empty()).unwrap();
        assert_eq!(path, vec![p(1, 1), p(2, 2), p(3, 3), p(4, 4)]);
    }

    #[test]
    fn cardinal_only_never_steps_diagonally() {
        let t = Ascii::open(5, 5);
        let path = solve(&t, p(0, 0), p(3, 3), PathFlags::CARDINAL_ONLY).unwrap();
        assert_eq!(path.len(), 6);
        let mut prev = p(0, 0);
        for &step in &path {
            let dir = prev.direction_to(step).unwrap();
            assert!(!dir.is_diagonal());
            prev = step;
        }
    }

    #[test]
    fn routes_around_walls() {
        let t = Ascii::new(&[
            ".....",
            ".###.",
            "...#.",
            "####.",
            ".....",
        ]);
        let path = solve(&t, p(0, 2), p(0, 4), PathFlags::empty()).unwrap();
        assert_eq!(path.last(), Some(&p(0, 4)));
        assert_contiguous(p(0, 2), &path);
        assert!(path.iter().all(|&c| !t.is_blocked(c)));
    }

    #[test]
    fn prefers_cheap_terrain() {
        let t = Ascii::new(&[
            ".....",
            ".999.",
            ".....",
        ]);
        let path = solve(&t, p(0, 1), p(4, 1), PathFlags::empty()).unwrap();
        assert!(path.iter().all(|&c| t.movement_cost(c) == 1));
    }

    #[test]
    fn blocked_start_is_tolerated() {
        let t = Ascii::new(&["#..."]);
        let path = solve(&t, p(0, 0), p(3, 0), PathFlags::empty()).unwrap();
        assert_eq!(path, vec![p(1, 0), p(2, 0), p(3, 0)]);
    }
}

// ── Corner cutting ────────────────────────────────────────────────────────────

#[cfg(test)]
mod corners {
    use super::*;

    #[test]
    fn both_corners_blocked_rejects_diagonal() {
        let t = Ascii::new(&[
            ".#.",
            "#..",
            "...",
        ]);
        assert_eq!(
            solve(&t, p(0, 0), p(1, 1), PathFlags::empty()),
            Err(PathFailure::Unreachable { from: p(0, 0), to: p(1, 1) }),
        );
    }

    #[test]
    fn one_corner_blocked_goes_around() {
        let t = Ascii::new(&[
            ".#.",
            "...",
            "...",
        ]);
        let path = solve(&t, p(0, 0), p(1, 1), PathFlags::empty()).unwrap();
        assert_eq!(path, vec![p(0, 1), p(1, 1)]);
    }

    #[test]
    fn no_step_ever_cuts_a_corner() {
        let t = Ascii::new(&[
            "..#....",
            ".#..#..",
            "...#...",
            ".#...#.",
            "...#...",
        ]);
        let path = solve(&t, p(0, 0), p(6, 4), PathFlags::empty()).unwrap();
        let mut prev = p(0, 0);
        for &step in &path {
            let dir = prev.direction_to(step).unwrap();
            if let Some((a, b)) = dir.corner_components() {
                assert!(!t.is_blocked(prev.step(a)) && !t.is_blocked(prev.step(b)));
            }
            prev = step;
        }
    }
}

// ── Failure reasons ───────────────────────────────────────────────────────────

#[cfg(test)]
mod failures {
    use super::*;
    use gn_core::NavError;

    #[test]
    fn out_of_bounds_endpoints() {
        let t = Ascii::open(4, 4);
        assert_eq!(
            solve(&t, p(-1, 0), p(1, 1), PathFlags::empty()),
            Err(PathFailure::StartOutOfBounds(p(-1, 0))),
        );
        assert_eq!(
            solve(&t, p(0, 0), p(4, 0), PathFlags::empty()),
            Err(PathFailure::TargetOutOfBounds(p(4, 0))),
        );
    }

    #[test]
    fn blocked_target() {
        let t = Ascii::new(&["..#"]);
        assert_eq!(
            solve(&t, p(0, 0), p(2, 0), PathFlags::empty()),
            Err(PathFailure::TargetBlocked(p(2, 0))),
        );
    }

    #[test]
    fn walled_off_target_is_unreachable() {
        let t = Ascii::new(&[
            "..#..",
            "..#..",
            "..#..",
        ]);
        assert!(matches!(
            solve(&t, p(0, 0), p(4, 2), PathFlags::empty()),
            Err(PathFailure::Unreachable { .. }),
        ));
    }

    #[test]
    fn failure_invalidates_buffer() {
        let t = Ascii::new(&["..#"]);
        let mut engine = PathEngine::for_terrain(&t);
        let mut buf = WaypointBuffer::default();
        engine.find_path(&t, p(0, 0), p(1, 0), PathFlags::empty(), &mut buf).unwrap();
        assert!(buf.is_valid());
        assert!(engine.find_path(&t, p(0, 0), p(2, 0), PathFlags::empty(), &mut buf).is_err());
        assert!(!buf.is_valid());
        assert!(buf.is_empty());
    }

    #[test]
    fn too_long_without_partial_fails() {
        let t = Ascii::open(10, 1);
        let mut engine = PathEngine::for_terrain(&t);
        let mut buf = WaypointBuffer::new(4);
        assert_eq!(
            engine.find_path(&t, p(0, 0), p(9, 0), PathFlags::empty(), &mut buf),
            Err(PathFailure::PathTooLong { needed: 9, capacity: 4 }),
        );
    }

    #[test]
    fn too_long_with_partial_truncates() {
        let t = Ascii::open(10, 1);
        let mut engine = PathEngine::for_terrain(&t);
        let mut buf = WaypointBuffer::new(4);
        let out = engine
            .find_path(&t, p(0, 0), p(9, 0), PathFlags::ALLOW_PARTIAL, &mut buf)
            .unwrap();
        assert_eq!((out.steps, out.full_len, out.partial), (4, 9, true));
        assert!(buf.is_partial());
        assert_eq!(buf.as_slice(), &[p(1, 0), p(2, 0), p(3, 0), p(4, 0)]);
    }

    #[test]
    fn converts_into_nav_error() {
        assert_eq!(
            NavError::from(PathFailure::TargetBlocked(p(1, 1))),
            NavError::BlockedByTerrain(p(1, 1)),
        );
        assert_eq!(
            NavError::from(PathFailure::Unreachable { from: p(0, 0), to: p(1, 1) }),
            NavError::NoPathExists { from: p(0, 0), to: p(1, 1) },
        );
        assert_eq!(
            NavError::from(PathFailure::StartOutOfBounds(p(-1, 0))),
            NavError::OutOfBounds(p(-1, 0)),
        );
    }
}

// ── Engine reuse & determinism ────────────────────────────────────────────────

#[cfg(test)]
mod reuse {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn random_terrain(seed: u64, w: u32, h: u32, density: f64) -> Ascii {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut t = Ascii::open(w, h);
        for c in t.cells.iter_mut() {
            *c = if rng.gen_bool(density) { b'#' } else { b'0' + rng.gen_range(1..=3) };
        }
        t.cells[0] = b'1';
        let last = t.cells.len() - 1;
        t.cells[last] = b'1';
        t
    }

    /// Unit-cost cardinal BFS distance, the reference for optimality.
    fn bfs_len(t: &Ascii, from: GridPosition, to: GridPosition) -> Option<usize> {
        use std::collections::VecDeque;
        let mut dist = vec![usize::MAX; t.cell_count()];
        let mut queue = VecDeque::from([from]);
        dist[from.row_major(t.width)] = 0;
        while let Some(c) = queue.pop_front() {
            let d = dist[c.row_major(t.width)];
            if c == to {
                return Some(d);
            }
            for dir in gn_core::Direction::CARDINAL {
                let n = c.step(dir);
                if !t.is_blocked(n) && dist[n.row_major(t.width)] == usize::MAX {
                    dist[n.row_major(t.width)] = d + 1;
                    queue.push_back(n);
                }
            }
        }
        None
    }

    #[test]
    fn identical_inputs_give_identical_paths() {
        let t = random_terrain(7, 40, 40, 0.25);
        let goal = p(39, 39);
        let first = solve(&t, p(0, 0), goal, PathFlags::empty());

        let mut engine = PathEngine::for_terrain(&t);
        let mut buf = WaypointBuffer::default();
        for _ in 0..5 {
            let res = engine.find_path(&t, p(0, 0), goal, PathFlags::empty(), &mut buf);
            match &first {
                Ok(path) => {
                    assert!(res.is_ok());
                    assert_eq!(buf.as_slice(), path.as_slice());
                }
                Err(e) => assert_eq!(res.err(), Some(*e)),
            }
        }
    }

    #[test]
    fn cardinal_paths_match_bfs_length_on_unit_grids() {
        for seed in 0..20 {
            let mut t = random_terrain(seed, 16, 16, 0.3);
            for c in t.cells.iter_mut().filter(|c| **c != b'#') {
                *c = b'.';
            }
            let res = solve(&t, p(0, 0), p(15, 15), PathFlags::CARDINAL_ONLY | PathFlags::ALLOW_PARTIAL);
            match bfs_len(&t, p(0, 0), p(15, 15)) {
                Some(d) => assert_eq!(res.map(|v| v.len()), Ok(d.min(crate::MAX_WAYPOINTS)), "seed {seed}"),
                None => assert!(matches!(res, Err(PathFailure::Unreachable { .. })), "seed {seed}"),
            }
        }
    }

    #[test]
    fn generation_wrap_keeps_results_correct() {
        let t = Ascii::new(&[
            "....",
            ".##.",
            "....",
        ]);
        let mut engine = PathEngine::for_terrain(&t);
        let mut buf = WaypointBuffer::default();
        engine.pool_mut().set_generation(u32::MAX - 1);
        for _ in 0..4 {
            engine.find_path(&t, p(0, 1), p(3, 1), PathFlags::empty(), &mut buf).unwrap();
            assert_eq!(buf.len(), 5);
        }
        assert!(engine.generation() >= 1 && engine.generation() < 5);
    }

    #[test]
    fn engine_refits_to_new_terrain_size() {
        let small = Ascii::open(3, 3);
        let large = Ascii::open(12, 7);
        let mut engine = PathEngine::for_terrain(&small);
        let mut buf = WaypointBuffer::default();
        engine.find_path(&small, p(0, 0), p(2, 2), PathFlags::empty(), &mut buf).unwrap();
        engine.find_path(&large, p(0, 0), p(11, 6), PathFlags::empty(), &mut buf).unwrap();
        assert_eq!(buf.last(), Some(p(11, 6)));
        assert_eq!(engine.searches(), 2);
    }

    #[test]
    fn works_over_grid_floor_view() {
        use gn_core::FloorId;
        use gn_grid::{AddressingMode, CollisionCache, FloorView, TerrainType, Tile, TileGrid};

        let mut grid = TileGrid::new(6, 3, 1, AddressingMode::Compact).unwrap();
        for y in 0..2 {
            grid.set(p(3, y), FloorId::GROUND, Tile::of(TerrainType::Wall));
        }
        let cache = CollisionCache::build(&grid, FloorId::GROUND);
        let view = FloorView::new(&grid, &cache, FloorId::GROUND);

        let mut engine = PathEngine::for_terrain(&view);
        let mut buf = WaypointBuffer::default();
        engine.find_path(&view, p(0, 0), p(5, 0), PathFlags::empty(), &mut buf).unwrap();
        assert!(buf.as_slice().contains(&p(3, 2)));
    }
}

// ── Batch ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod batch {
    use super::*;
    use crate::{PathQuery, solve_batch};

    #[test]
    fn batch_matches_individual_searches_in_order() {
        let t = Ascii::new(&[
            "........",
            ".######.",
            "........",
            "###.####",
            "........",
        ]);
        let queries: Vec<PathQuery> = (0..8)
            .map(|x| PathQuery {
                start:    p(x, 0),
                target:   p(7 - x, 4),
                flags:    PathFlags::empty(),
                capacity: 64,
            })
            .chain([PathQuery {
                start:    p(0, 0),
                target:   p(1, 1),
                flags:    PathFlags::empty(),
                capacity: 64,
            }])
            .collect();

        let results = solve_batch(&t, &queries);
        assert_eq!(results.len(), queries.len());
        for (q, (res, buf)) in queries.iter().zip(&results) {
            match solve(&t, q.start, q.target, q.flags) {
                Ok(path) => {
                    assert!(res.is_ok());
                    assert_eq!(buf.as_slice(), path.as_slice());
                }
                Err(e) => assert_eq!(res.as_ref().err(), Some(&e)),
            }
        }
        assert_eq!(results[8].0, Err(PathFailure::TargetBlocked(p(1, 1))));
    }
}

// ── WaypointBuffer ────────────────────────────────────────────────────────────

#[cfg(test)]
mod waypoints {
    use super::*;
    use crate::MAX_WAYPOINTS;

    #[test]
    fn capacity_is_clamped() {
        assert_eq!(WaypointBuffer::new(0).capacity(), 1);
        assert_eq!(WaypointBuffer::new(10_000).capacity(), MAX_WAYPOINTS);
    }

    #[test]
    fn assign_truncates_and_flags_partial() {
        let mut buf = WaypointBuffer::new(2);
        assert_eq!(buf.assign(&[p(1, 0), p(2, 0), p(3, 0)], false), 2);
        assert!(buf.is_partial());
        assert_eq!(buf.as_slice(), &[p(1, 0), p(2, 0)]);
    }

    #[test]
    fn cursor_walks_the_path() {
        let mut buf = WaypointBuffer::new(8);
        buf.assign(&[p(1, 0), p(2, 0), p(3, 0)], false);
        assert_eq!(buf.current(), Some(p(1, 0)));
        assert!(buf.advance());
        assert_eq!(buf.current(), Some(p(2, 0)));
        assert_eq!(buf.remaining_slice(), &[p(2, 0), p(3, 0)]);
        assert!(buf.advance());
        assert!(!buf.advance());
        assert!(buf.is_finished());
        assert_eq!(buf.current(), None);
        assert!(!buf.advance());
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn invalidate_and_reassign() {
        let mut buf = WaypointBuffer::new(8);
        buf.assign_single(p(4, 4));
        buf.invalidate();
        assert!(!buf.is_valid());
        assert_eq!(buf.current(), None);
        buf.assign_single(p(5, 5));
        assert_eq!(buf.current(), Some(p(5, 5)));
        assert!(!buf.is_partial());
    }
}

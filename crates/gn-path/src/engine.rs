//! Reusable A* search.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f32::consts::SQRT_2;

use gn_core::{Direction, GridPosition, TerrainView};
use tracing::trace;

use crate::node::{NO_PARENT, NodePool};
use crate::{PathFailure, PathFlags, PathResult, WaypointBuffer};

// ── PathOutcome ───────────────────────────────────────────────────────────────

/// Summary of a successful search.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathOutcome {
    /// Steps written into the waypoint buffer.
    pub steps:    usize,
    /// Steps in the full path (`> steps` only when truncated).
    pub full_len: usize,
    /// `true` if the buffer holds a truncated prefix.
    pub partial:  bool,
    /// Accumulated movement cost of the full path.
    pub cost:     f32,
    /// Nodes expanded by the search.
    pub expanded: u32,
}

// ── Open set ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
struct OpenEntry {
    f:   f32,
    h:   f32,
    seq: u64,
    idx: u32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    /// Reversed so `BinaryHeap` pops the lowest `f`, then lowest `h`, then
    /// earliest insertion.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

// ── PathEngine ────────────────────────────────────────────────────────────────

/// A* search state reused across calls.
///
/// Owns a node pool sized to the grid plus the open heap and a scratch
/// trail, so repeated searches allocate nothing once warmed up.  One engine
/// serves one thread; use one per worker for parallel searches.
pub struct PathEngine {
    width:    u32,
    height:   u32,
    pool:     NodePool,
    open:     BinaryHeap<OpenEntry>,
    seq:      u64,
    trail:    Vec<GridPosition>,
    searches: u64,
}

impl PathEngine {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pool:     NodePool::new(width as usize * height as usize),
            open:     BinaryHeap::new(),
            seq:      0,
            trail:    Vec::new(),
            searches: 0,
        }
    }

    /// Engine sized for `terrain`.
    pub fn for_terrain<T: TerrainView + ?Sized>(terrain: &T) -> Self {
        Self::new(terrain.width(), terrain.height())
    }

    /// Searches run so far.
    #[inline]
    pub fn searches(&self) -> u64 {
        self.searches
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.pool.generation()
    }

    #[cfg(test)]
    pub(crate) fn pool_mut(&mut self) -> &mut NodePool {
        &mut self.pool
    }

    fn fit_to(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            self.width  = width;
            self.height = height;
            self.pool.resize(width as usize * height as usize);
        }
    }

    #[inline]
    fn index(&self, p: GridPosition) -> usize {
        p.row_major(self.width)
    }

    #[inline]
    fn position(&self, idx: u32) -> GridPosition {
        GridPosition::new((idx % self.width) as i32, (idx / self.width) as i32)
    }

    /// Search from `start` to `target` and write the path into `out`.
    ///
    /// The start cell may be blocked; every other cell on the path must be
    /// walkable.  On failure `out` is invalidated.
    ///
    /// # Errors
    ///
    /// A [`PathFailure`] naming the reason.  `PathTooLong` is returned only
    /// when the path exceeds `out.capacity()` and `ALLOW_PARTIAL` is unset.
    pub fn find_path<T: TerrainView + ?Sized>(
        &mut self,
        terrain: &T,
        start:   GridPosition,
        target:  GridPosition,
        flags:   PathFlags,
        out:     &mut WaypointBuffer,
    ) -> PathResult<PathOutcome> {
        out.invalidate();
        self.searches += 1;

        if !terrain.in_bounds(start) {
            return Err(PathFailure::StartOutOfBounds(start));
        }
        if !terrain.in_bounds(target) {
            return Err(PathFailure::TargetOutOfBounds(target));
        }
        if start == target {
            out.assign(&[], false);
            return Ok(PathOutcome { steps: 0, full_len: 0, partial: false, cost: 0.0, expanded: 0 });
        }
        if terrain.is_blocked(target) {
            return Err(PathFailure::TargetBlocked(target));
        }

        self.fit_to(terrain.width(), terrain.height());
        let cardinal_only = flags.contains(PathFlags::CARDINAL_ONLY);
        let directions: &[Direction] =
            if cardinal_only { &Direction::CARDINAL } else { &Direction::ALL };
        let heuristic = |p: GridPosition| estimate(p, target, cardinal_only);

        self.pool.begin_search();
        self.open.clear();
        self.seq = 0;

        let start_idx  = self.index(start);
        let target_idx = self.index(target);
        let h0 = heuristic(start);
        self.pool.visit(start_idx, h0).g = 0.0;
        self.push(start_idx as u32, 0.0, h0);

        let mut expanded = 0u32;
        while let Some(entry) = self.open.pop() {
            let idx = entry.idx as usize;
            let node = self.pool.visit(idx, entry.h);
            if node.closed {
                continue;
            }
            node.closed = true;
            let g = node.g;
            expanded += 1;

            if idx == target_idx {
                return self.finish(start_idx, target_idx, flags, out, g, expanded, start, target);
            }

            let pos = self.position(entry.idx);
            for &dir in directions {
                let next = pos.step(dir);
                if terrain.is_blocked(next) {
                    continue;
                }
                let base = if let Some((a, b)) = dir.corner_components() {
                    if terrain.is_blocked(pos.step(a)) || terrain.is_blocked(pos.step(b)) {
                        continue;
                    }
                    SQRT_2
                } else {
                    1.0
                };
                let ng = g + base * terrain.movement_cost(next).max(1) as f32;
                let next_idx = self.index(next);
                let h = heuristic(next);
                let n = self.pool.visit(next_idx, h);
                if n.closed || ng >= n.g {
                    continue;
                }
                n.g      = ng;
                n.parent = entry.idx;
                self.push(next_idx as u32, ng, h);
            }
        }

        trace!(%start, %target, expanded, "search exhausted");
        Err(PathFailure::Unreachable { from: start, to: target })
    }

    #[inline]
    fn push(&mut self, idx: u32, g: f32, h: f32) {
        self.open.push(OpenEntry { f: g + h, h, seq: self.seq, idx });
        self.seq += 1;
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &mut self,
        start_idx:  usize,
        target_idx: usize,
        flags:      PathFlags,
        out:        &mut WaypointBuffer,
        cost:       f32,
        expanded:   u32,
        start:      GridPosition,
        target:     GridPosition,
    ) -> PathResult<PathOutcome> {
        self.trail.clear();
        let mut idx = target_idx;
        while idx != start_idx {
            self.trail.push(self.position(idx as u32));
            let parent = self.pool.get(idx).parent;
            if parent == NO_PARENT {
                break;
            }
            idx = parent as usize;
        }
        self.trail.reverse();

        let full_len = self.trail.len();
        let capacity = out.capacity();
        if full_len > capacity && !flags.contains(PathFlags::ALLOW_PARTIAL) {
            return Err(PathFailure::PathTooLong { needed: full_len, capacity });
        }
        let steps = out.assign(&self.trail, false);
        trace!(%start, %target, steps, full_len, expanded, "path found");
        Ok(PathOutcome { steps, full_len, partial: steps < full_len, cost, expanded })
    }
}

impl std::fmt::Debug for PathEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathEngine")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("generation", &self.pool.generation())
            .field("searches", &self.searches)
            .finish()
    }
}

/// Admissible distance estimate for the active direction set.
#[inline]
pub fn estimate(from: GridPosition, to: GridPosition, cardinal_only: bool) -> f32 {
    let dx = (from.x - to.x).unsigned_abs() as f32;
    let dy = (from.y - to.y).unsigned_abs() as f32;
    if cardinal_only {
        dx + dy
    } else {
        let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
        (hi - lo) + SQRT_2 * lo
    }
}

//! Atomic per-cell occupancy slots.

use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;

use gn_core::{AgentId, GridPosition, GridRect, TerrainView};

/// Slot value of an unoccupied cell.
pub const FREE: i64 = -1;

/// Bounded result buffer for area queries.  Inline up to 16 ids.
pub type OccupantBuf = SmallVec<[AgentId; 16]>;

type Overflow = SmallVec<[AgentId; 4]>;

// ── OccupancyMode ─────────────────────────────────────────────────────────────

/// How many agents a cell may hold.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OccupancyMode {
    /// At most one agent per cell.
    #[default]
    Exclusive,
    /// Up to `max_per_cell` agents; the first holds the primary slot, the
    /// rest sit in the overflow set.
    Shared { max_per_cell: u8 },
}

// ── OccupancyIndex ────────────────────────────────────────────────────────────

/// Cell → occupant map for one floor.
///
/// All mutating methods take `&self`; share the index across threads with
/// `Arc` or a scoped borrow.
pub struct OccupancyIndex {
    width:    u32,
    height:   u32,
    mode:     OccupancyMode,
    slots:    Vec<AtomicI64>,
    overflow: DashMap<usize, Overflow, FxBuildHasher>,
}

impl OccupancyIndex {
    pub fn new(width: u32, height: u32, mode: OccupancyMode) -> Self {
        let n = width as usize * height as usize;
        Self {
            width,
            height,
            mode,
            slots:    (0..n).map(|_| AtomicI64::new(FREE)).collect(),
            overflow: DashMap::with_hasher(FxBuildHasher),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn mode(&self) -> OccupancyMode {
        self.mode
    }

    #[inline]
    fn slot_index(&self, pos: GridPosition) -> Option<usize> {
        pos.in_bounds(self.width, self.height).then(|| pos.row_major(self.width))
    }

    // ── Claims ────────────────────────────────────────────────────────────

    /// Claim `pos` for `agent`.
    ///
    /// Succeeds only if the cell is walkable in `terrain` and free (or, in
    /// shared mode, below capacity).  A `false` return means another agent
    /// won the race; it is not an error.  Re-claiming a cell the agent
    /// already holds succeeds without changing anything.
    pub fn try_occupy<T: TerrainView + ?Sized>(
        &self,
        terrain: &T,
        pos:     GridPosition,
        agent:   AgentId,
    ) -> bool {
        let Some(i) = self.slot_index(pos) else {
            return false;
        };
        if terrain.is_blocked(pos) {
            return false;
        }
        let id = agent.to_slot();
        match self.slots[i].compare_exchange(FREE, id, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => true,
            Err(current) if current == id => true,
            Err(_) => match self.mode {
                OccupancyMode::Exclusive => false,
                OccupancyMode::Shared { max_per_cell } => self.join_overflow(i, agent, max_per_cell),
            },
        }
    }

    fn join_overflow(&self, i: usize, agent: AgentId, max_per_cell: u8) -> bool {
        let id = agent.to_slot();
        let mut entry = self.overflow.entry(i).or_default();
        // The primary may have been released while we waited for the shard.
        match self.slots[i].compare_exchange(FREE, id, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => return true,
            Err(current) if current == id => return true,
            Err(_) => {}
        }
        if entry.contains(&agent) {
            return true;
        }
        if 1 + entry.len() >= max_per_cell as usize {
            return false;
        }
        entry.push(agent);
        true
    }

    /// Release `pos` if `agent` holds it.
    ///
    /// The primary slot is cleared with a compare-and-swap from `agent`, so a
    /// stale release never evicts a different occupant.  Returns `true` if
    /// the agent was removed.
    pub fn release(&self, pos: GridPosition, agent: AgentId) -> bool {
        let Some(i) = self.slot_index(pos) else {
            return false;
        };
        let id = agent.to_slot();
        if self.slots[i]
            .compare_exchange(id, FREE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            if matches!(self.mode, OccupancyMode::Shared { .. }) {
                self.promote_overflow(i);
            }
            return true;
        }
        self.leave_overflow(i, agent)
    }

    /// Move the first overflow occupant of cell `i` into the primary slot.
    fn promote_overflow(&self, i: usize) {
        let emptied = {
            let Some(mut entry) = self.overflow.get_mut(&i) else {
                return;
            };
            if let Some(&next) = entry.first() {
                if self.slots[i]
                    .compare_exchange(FREE, next.to_slot(), Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    entry.remove(0);
                }
            }
            entry.is_empty()
        };
        if emptied {
            self.overflow.remove_if(&i, |_, v| v.is_empty());
        }
    }

    fn leave_overflow(&self, i: usize, agent: AgentId) -> bool {
        let (removed, emptied) = {
            let Some(mut entry) = self.overflow.get_mut(&i) else {
                return false;
            };
            match entry.iter().position(|&a| a == agent) {
                Some(k) => {
                    entry.remove(k);
                    (true, entry.is_empty())
                }
                None => (false, false),
            }
        };
        if emptied {
            self.overflow.remove_if(&i, |_, v| v.is_empty());
        }
        removed
    }

    /// Claim `to`, then release `from`.
    ///
    /// Observers may briefly see the agent in both cells but never in
    /// neither.  Returns `false` (with nothing changed) if `to` could not be
    /// claimed.
    pub fn try_move<T: TerrainView + ?Sized>(
        &self,
        terrain: &T,
        from:    GridPosition,
        to:      GridPosition,
        agent:   AgentId,
    ) -> bool {
        if from == to {
            return self.holds(from, agent);
        }
        if !self.try_occupy(terrain, to, agent) {
            return false;
        }
        self.release(from, agent);
        true
    }

    /// Clear `pos` regardless of who holds it.  Cleanup and error-recovery
    /// only.  Returns the evicted primary occupant.
    pub fn force_release(&self, pos: GridPosition) -> Option<AgentId> {
        let i = self.slot_index(pos)?;
        self.overflow.remove(&i);
        AgentId::from_slot(self.slots[i].swap(FREE, Ordering::AcqRel))
    }

    /// Free every cell.
    pub fn clear(&self) {
        for slot in &self.slots {
            slot.store(FREE, Ordering::Release);
        }
        self.overflow.clear();
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Primary occupant of `pos`.
    #[inline]
    pub fn occupant(&self, pos: GridPosition) -> Option<AgentId> {
        let i = self.slot_index(pos)?;
        AgentId::from_slot(self.slots[i].load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_occupied(&self, pos: GridPosition) -> bool {
        let Some(i) = self.slot_index(pos) else {
            return false;
        };
        self.slots[i].load(Ordering::Acquire) != FREE
            || self.overflow.get(&i).is_some_and(|e| !e.is_empty())
    }

    /// `true` if `agent` is the primary or an overflow occupant of `pos`.
    pub fn holds(&self, pos: GridPosition, agent: AgentId) -> bool {
        let Some(i) = self.slot_index(pos) else {
            return false;
        };
        self.slots[i].load(Ordering::Acquire) == agent.to_slot()
            || self.overflow.get(&i).is_some_and(|e| e.contains(&agent))
    }

    /// Every occupant of `pos`, primary first.
    pub fn occupants_at(&self, pos: GridPosition) -> OccupantBuf {
        let mut out = OccupantBuf::new();
        self.collect_cell(pos, usize::MAX, &mut out);
        out
    }

    fn collect_cell(&self, pos: GridPosition, limit: usize, out: &mut OccupantBuf) {
        let Some(i) = self.slot_index(pos) else {
            return;
        };
        if out.len() >= limit {
            return;
        }
        if let Some(a) = AgentId::from_slot(self.slots[i].load(Ordering::Acquire)) {
            out.push(a);
        }
        if let Some(entry) = self.overflow.get(&i) {
            for &a in entry.iter() {
                if out.len() >= limit {
                    break;
                }
                out.push(a);
            }
        }
    }

    /// Occupants inside `rect`, scanned row by row, at most `limit` ids.
    pub fn occupants_in_rect(&self, rect: GridRect, limit: usize) -> OccupantBuf {
        let mut out = OccupantBuf::new();
        let Some(r) = rect.clip(self.width, self.height) else {
            return out;
        };
        'rows: for y in r.min.y..=r.max.y {
            for x in r.min.x..=r.max.x {
                if out.len() >= limit {
                    break 'rows;
                }
                self.collect_cell(GridPosition::new(x, y), limit, &mut out);
            }
        }
        out
    }

    /// Occupants within Euclidean `radius` cells of `center`, at most
    /// `limit` ids.
    pub fn occupants_in_radius(
        &self,
        center: GridPosition,
        radius: u32,
        limit:  usize,
    ) -> OccupantBuf {
        let mut out = OccupantBuf::new();
        let r = radius.min(i32::MAX as u32) as i32;
        let Some(rect) = GridRect::around(center, r).clip(self.width, self.height) else {
            return out;
        };
        let r_sq = (r as i64) * (r as i64);
        'rows: for y in rect.min.y..=rect.max.y {
            for x in rect.min.x..=rect.max.x {
                if out.len() >= limit {
                    break 'rows;
                }
                let p = GridPosition::new(x, y);
                if p.distance_sq(center) <= r_sq {
                    self.collect_cell(p, limit, &mut out);
                }
            }
        }
        out
    }

    /// Number of cells with a primary occupant.
    pub fn occupied_cells(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.load(Ordering::Relaxed) != FREE)
            .count()
    }
}

impl std::fmt::Debug for OccupancyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OccupancyIndex")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("mode", &self.mode)
            .field("occupied_cells", &self.occupied_cells())
            .finish()
    }
}

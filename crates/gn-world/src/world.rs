//! The `NavWorld` facade.

use gn_core::{AgentId, Direction, FloorId, GridPosition, GridRect, NavError, TerrainView, Tick};
use gn_grid::{CollisionCache, FloorView, MapEncoding, MapSnapshot, Tile, TileGrid};
use gn_movement::{
    AgentSettings, MovementArbiter, MovementSnapshot, NavAgent, NavSpace, PathStatus, TickReport,
};
use gn_occupancy::{OccupancyIndex, OccupantBuf};
use gn_path::{PathEngine, PathFlags, PathOutcome, PathQuery, PathResult, WaypointBuffer};
use tracing::{debug, info};

use crate::observer::dispatch;
use crate::{NavObserver, WorldConfig, WorldError, WorldResult};

// ── Space view ────────────────────────────────────────────────────────────────

/// Borrowed per-floor storage handed to the arbiter for one tick.
struct WorldSpace<'a> {
    grid:      &'a TileGrid,
    caches:    &'a [CollisionCache],
    occupancy: &'a [OccupancyIndex],
}

impl NavSpace for WorldSpace<'_> {
    fn terrain(&self, floor: FloorId) -> Option<impl TerrainView + '_> {
        self.caches
            .get(floor.index())
            .map(|cache| FloorView::new(self.grid, cache, floor))
    }

    fn occupancy(&self, floor: FloorId) -> Option<&OccupancyIndex> {
        self.occupancy.get(floor.index())
    }
}

// ── NavWorld ──────────────────────────────────────────────────────────────────

/// Authoritative navigation state for one map.
///
/// Terrain edits (`set_tile`, `fill_layer`, `load_map`) and ticks need
/// `&mut self` and are expected on the simulation thread.  Occupancy is
/// atomic per cell, so read-only queries through `&NavWorld` may run from
/// other threads.
///
/// Create via [`WorldBuilder`][crate::WorldBuilder].
pub struct NavWorld {
    pub(crate) config:    WorldConfig,
    pub(crate) grid:      TileGrid,
    pub(crate) caches:    Vec<CollisionCache>,
    pub(crate) occupancy: Vec<OccupancyIndex>,
    pub(crate) engine:    PathEngine,
    pub(crate) arbiter:   MovementArbiter,
    pub(crate) now:       Tick,
}

impl NavWorld {
    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The tick the next call to [`tick`](Self::tick) will process.
    #[inline]
    pub fn now(&self) -> Tick {
        self.now
    }

    #[inline]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn collision(&self, floor: FloorId) -> Option<&CollisionCache> {
        self.caches.get(floor.index())
    }

    pub fn occupancy(&self, floor: FloorId) -> Option<&OccupancyIndex> {
        self.occupancy.get(floor.index())
    }

    #[inline]
    pub fn arbiter(&self) -> &MovementArbiter {
        &self.arbiter
    }

    #[inline]
    pub fn agent(&self, id: AgentId) -> Option<&NavAgent> {
        self.arbiter.agent(id)
    }

    #[inline]
    pub fn agent_count(&self) -> usize {
        self.arbiter.len()
    }

    fn cache(&self, floor: FloorId) -> WorldResult<&CollisionCache> {
        self.caches.get(floor.index()).ok_or(WorldError::FloorOutOfRange(floor))
    }

    fn occ(&self, floor: FloorId) -> Option<&OccupancyIndex> {
        self.occupancy.get(floor.index())
    }

    // ── Agent lifecycle ───────────────────────────────────────────────────

    /// Insert an agent on `cell` and claim the cell.
    pub fn add_agent(
        &mut self,
        cell:     GridPosition,
        floor:    FloorId,
        settings: AgentSettings,
    ) -> WorldResult<AgentId> {
        let space = WorldSpace { grid: &self.grid, caches: &self.caches, occupancy: &self.occupancy };
        Ok(self.arbiter.spawn(&space, cell, floor, settings, self.now)?)
    }

    /// [`add_agent`](Self::add_agent) with the configured default settings.
    pub fn add_default_agent(&mut self, cell: GridPosition, floor: FloorId) -> WorldResult<AgentId> {
        let settings = self.config.default_agent;
        self.add_agent(cell, floor, settings)
    }

    /// Remove an agent and release every cell it holds.
    pub fn remove_agent(&mut self, id: AgentId) -> WorldResult<()> {
        let space = WorldSpace { grid: &self.grid, caches: &self.caches, occupancy: &self.occupancy };
        self.arbiter.remove(&space, id)?;
        Ok(())
    }

    // ── Movement requests ─────────────────────────────────────────────────

    /// Queue a path search for `id` to `target` on `floor`.
    ///
    /// Cross-floor requests are rejected with `FloorMismatch`.
    pub fn request_path_to(
        &mut self,
        id:     AgentId,
        target: GridPosition,
        floor:  FloorId,
        flags:  PathFlags,
    ) -> WorldResult<()> {
        let agent = self.arbiter.agent(id).ok_or(WorldError::AgentNotFound(id))?;
        if agent.floor != floor {
            return Err(WorldError::FloorMismatch { agent: id, actual: agent.floor, requested: floor });
        }
        self.arbiter.request_path(id, target, flags, self.now)?;
        Ok(())
    }

    /// Step one cell in `dir` without searching.  Returns the target cell.
    pub fn request_directional_step(&mut self, id: AgentId, dir: Direction) -> WorldResult<GridPosition> {
        Ok(self.arbiter.request_directional_step(id, dir, self.now)?)
    }

    /// Cancel all movement for `id`.
    pub fn stop_movement(&mut self, id: AgentId) -> WorldResult<()> {
        let space = WorldSpace { grid: &self.grid, caches: &self.caches, occupancy: &self.occupancy };
        self.arbiter.stop(&space, id, self.now)?;
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `false` for blocked, out-of-bounds, or missing-floor cells.
    pub fn is_walkable(&self, pos: GridPosition, floor: FloorId) -> bool {
        self.caches.get(floor.index()).is_some_and(|c| !c.is_blocked(pos))
    }

    pub fn is_occupied(&self, pos: GridPosition, floor: FloorId) -> bool {
        self.occ(floor).is_some_and(|o| o.is_occupied(pos))
    }

    pub fn get_occupant(&self, pos: GridPosition, floor: FloorId) -> Option<AgentId> {
        self.occ(floor)?.occupant(pos)
    }

    /// Occupants of `rect`, row-major, at most `limit`.
    pub fn occupants_in_rect(&self, rect: GridRect, floor: FloorId, limit: usize) -> OccupantBuf {
        self.occ(floor)
            .map(|o| o.occupants_in_rect(rect, limit))
            .unwrap_or_default()
    }

    /// Occupants within Euclidean `radius` of `center`, at most `limit`.
    pub fn occupants_in_radius(
        &self,
        center: GridPosition,
        radius: u32,
        floor:  FloorId,
        limit:  usize,
    ) -> OccupantBuf {
        self.occ(floor)
            .map(|o| o.occupants_in_radius(center, radius, limit))
            .unwrap_or_default()
    }

    pub fn any_blocked_in_area(&self, rect: GridRect, floor: FloorId) -> WorldResult<bool> {
        Ok(self.cache(floor)?.any_blocked_in_area(rect))
    }

    pub fn count_blocked_in_area(&self, rect: GridRect, floor: FloorId) -> WorldResult<u64> {
        Ok(self.cache(floor)?.count_blocked_in_area(rect))
    }

    /// Per-agent movement summary at the current tick.
    pub fn snapshot(&self) -> Vec<MovementSnapshot> {
        self.arbiter.snapshot(self.now)
    }

    pub fn snapshot_of(&self, id: AgentId) -> Option<MovementSnapshot> {
        self.arbiter.snapshot_of(id, self.now)
    }

    // ── Ad-hoc searches ───────────────────────────────────────────────────

    /// Search without an agent, using the world's engine.
    pub fn find_path(
        &mut self,
        from:     GridPosition,
        to:       GridPosition,
        floor:    FloorId,
        flags:    PathFlags,
        capacity: usize,
    ) -> WorldResult<WaypointBuffer> {
        let cache = self.caches.get(floor.index()).ok_or(WorldError::FloorOutOfRange(floor))?;
        let view = FloorView::new(&self.grid, cache, floor);
        let mut buf = WaypointBuffer::new(capacity);
        self.engine
            .find_path(&view, from, to, flags, &mut buf)
            .map_err(NavError::from)?;
        Ok(buf)
    }

    /// Many independent searches on one floor.  Runs in parallel with the
    /// `parallel` feature; output order matches `queries`.
    pub fn find_paths(
        &self,
        queries: &[PathQuery],
        floor:   FloorId,
    ) -> WorldResult<Vec<(PathResult<PathOutcome>, WaypointBuffer)>> {
        let cache = self.cache(floor)?;
        let view = FloorView::new(&self.grid, cache, floor);
        Ok(gn_path::solve_batch(&view, queries))
    }

    // ── Terrain edits ─────────────────────────────────────────────────────

    /// Write one tile and refresh the matching collision bit.
    ///
    /// Returns `true` if the cell's blocked state changed.  Agents already
    /// standing on a newly blocked cell stay there; their next step is
    /// re-checked against terrain as usual.
    pub fn set_tile(&mut self, pos: GridPosition, floor: FloorId, tile: Tile) -> WorldResult<bool> {
        let cache = self
            .caches
            .get_mut(floor.index())
            .ok_or(WorldError::FloorOutOfRange(floor))?;
        let changed = self.grid.set(pos, floor, tile);
        cache.apply_cell(&self.grid, floor, pos);
        if changed {
            debug!(%pos, floor = floor.0, blocked = tile.is_blocked(), "tile blocked state changed");
        }
        Ok(changed)
    }

    /// Overwrite every cell of `floor` with `tile`.
    pub fn fill_layer(&mut self, floor: FloorId, tile: Tile) -> WorldResult<()> {
        let cache = self
            .caches
            .get_mut(floor.index())
            .ok_or(WorldError::FloorOutOfRange(floor))?;
        self.grid.fill_layer(floor, tile);
        cache.apply_from_grid(&self.grid, floor);
        Ok(())
    }

    // ── Map I/O ───────────────────────────────────────────────────────────

    /// Replace all terrain from `snapshot`.
    ///
    /// Validation (dimensions, checksum, tile bytes) happens before any
    /// cell changes; on error the live map is untouched.  Occupancy is left
    /// as is.
    pub fn load_map(&mut self, snapshot: &MapSnapshot) -> WorldResult<()> {
        self.grid.load_snapshot(snapshot)?;
        self.rebuild_caches();
        Ok(())
    }

    /// Replace one floor from row-major bytes.
    pub fn load_row_major(&mut self, floor: FloorId, bytes: &[u8]) -> WorldResult<()> {
        let cache = self
            .caches
            .get_mut(floor.index())
            .ok_or(WorldError::FloorOutOfRange(floor))?;
        self.grid.load_row_major(floor, bytes)?;
        cache.apply_from_grid(&self.grid, floor);
        info!(floor = floor.0, bytes = bytes.len(), "loaded row-major layer");
        Ok(())
    }

    pub fn export_map(&self, encoding: MapEncoding) -> WorldResult<MapSnapshot> {
        Ok(self.grid.export_snapshot(encoding)?)
    }

    pub fn export_row_major(&self, floor: FloorId) -> WorldResult<Vec<u8>> {
        self.cache(floor)?;
        Ok(self.grid.export_row_major(floor))
    }

    fn rebuild_caches(&mut self) {
        for (f, cache) in self.caches.iter_mut().enumerate() {
            cache.apply_from_grid(&self.grid, FloorId(f as u8));
        }
    }

    /// Clear `pos` regardless of owner.  Error recovery only: the evicted
    /// agent's record still names the cell.
    pub fn force_release_cell(&self, pos: GridPosition, floor: FloorId) -> Option<AgentId> {
        self.occ(floor)?.force_release(pos)
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Process the current tick and advance the clock.
    pub fn tick(&mut self) -> TickReport {
        let now = self.now;
        let space = WorldSpace { grid: &self.grid, caches: &self.caches, occupancy: &self.occupancy };
        let report = self.arbiter.tick(now, &space, &mut self.engine);
        self.now = now.next();
        report
    }

    /// Run exactly `n` ticks, delivering events to `observer`.
    pub fn run_ticks<O: NavObserver + ?Sized>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            observer.on_tick_start(self.now);
            let report = self.tick();
            dispatch(observer, &report);
            observer.on_tick_end(report.tick, &report);
        }
    }

    /// Tick until no agent is pending, moving, or ready, or `max_ticks`
    /// elapse.  Returns the number of ticks run.
    pub fn run_until_idle<O: NavObserver + ?Sized>(&mut self, max_ticks: u64, observer: &mut O) -> u64 {
        for n in 0..max_ticks {
            if self.is_settled() {
                return n;
            }
            self.run_ticks(1, observer);
        }
        max_ticks
    }

    fn is_settled(&self) -> bool {
        self.arbiter.agents().all(|a| {
            !a.is_moving()
                && matches!(a.status(), PathStatus::Idle | PathStatus::Completed | PathStatus::Failed)
        })
    }
}

impl std::fmt::Debug for NavWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavWorld")
            .field("width", &self.grid.width())
            .field("height", &self.grid.height())
            .field("floors", &self.grid.floors())
            .field("agents", &self.arbiter.len())
            .field("now", &self.now)
            .finish()
    }
}

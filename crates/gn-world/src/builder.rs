//! Fluent builder for constructing a [`NavWorld`].

use gn_core::{FloorId, Tick};
use gn_grid::{CollisionCache, MapSnapshot, TileGrid};
use gn_movement::MovementArbiter;
use gn_occupancy::OccupancyIndex;
use gn_path::PathEngine;
use tracing::info;

use crate::{NavWorld, WorldConfig, WorldError, WorldResult};

/// Fluent builder for [`NavWorld`].
///
/// # Terrain sources (pick at most one)
///
/// | Method           | Effect                                              |
/// |------------------|-----------------------------------------------------|
/// | `.grid(g)`       | Use a prepared `TileGrid` (dimensions must match)   |
/// | `.map(snapshot)` | Decode and validate a persisted `MapSnapshot`       |
/// | *(neither)*      | All-`Ground` grid of the configured size            |
///
/// # Example
///
/// ```rust,ignore
/// let snapshot = MapSnapshot::from_bytes(&bytes)?;
/// let world = WorldBuilder::new(config)
///     .map(snapshot)
///     .start_tick(Tick(100))
///     .build()?;
/// ```
pub struct WorldBuilder {
    config:     WorldConfig,
    grid:       Option<TileGrid>,
    snapshot:   Option<MapSnapshot>,
    start_tick: Tick,
}

impl WorldBuilder {
    pub fn new(config: WorldConfig) -> Self {
        Self { config, grid: None, snapshot: None, start_tick: Tick::ZERO }
    }

    /// Use `grid` as the terrain.  Its size and floor count must match the
    /// config.
    pub fn grid(mut self, grid: TileGrid) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Load terrain from `snapshot`.  Its size and floor count must match
    /// the config.
    pub fn map(mut self, snapshot: MapSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// First tick the world will process.  Default `Tick(0)`.
    pub fn start_tick(mut self, tick: Tick) -> Self {
        self.start_tick = tick;
        self
    }

    /// Validate inputs, derive collision caches and occupancy indexes, and
    /// return a ready world.
    pub fn build(self) -> WorldResult<NavWorld> {
        let config = self.config;
        config.validate()?;

        let grid = match (self.grid, self.snapshot) {
            (Some(_), Some(_)) => {
                return Err(WorldError::Config("both a grid and a map snapshot were supplied".into()));
            }
            (Some(grid), None) => grid,
            (None, Some(snapshot)) => {
                let mut grid = TileGrid::new(config.width, config.height, config.floors, config.addressing)?;
                grid.load_snapshot(&snapshot)?;
                grid
            }
            (None, None) => TileGrid::new(config.width, config.height, config.floors, config.addressing)?,
        };
        if (grid.width(), grid.height(), grid.floors()) != (config.width, config.height, config.floors) {
            return Err(WorldError::Config(format!(
                "grid is {}x{}x{}, config expects {}x{}x{}",
                grid.width(), grid.height(), grid.floors(),
                config.width, config.height, config.floors,
            )));
        }

        // ── Derived per-floor state ───────────────────────────────────────
        let caches: Vec<CollisionCache> = (0..config.floors)
            .map(|f| CollisionCache::build(&grid, FloorId(f)))
            .collect();
        let occupancy: Vec<OccupancyIndex> = (0..config.floors)
            .map(|_| OccupancyIndex::new(config.width, config.height, config.occupancy))
            .collect();

        info!(
            width = config.width,
            height = config.height,
            floors = config.floors,
            addressing = ?config.addressing,
            occupancy = ?config.occupancy,
            grid_bytes = grid.memory_bytes(),
            blocked = caches.iter().map(CollisionCache::blocked_count).sum::<u64>(),
            "nav world built"
        );

        Ok(NavWorld {
            config,
            engine:    PathEngine::new(config.width, config.height),
            arbiter:   MovementArbiter::new(config.max_path_requests_per_tick),
            grid,
            caches,
            occupancy,
            now:       self.start_tick,
        })
    }
}

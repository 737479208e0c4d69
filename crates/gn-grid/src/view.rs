//! [`TerrainView`] over one floor: walkability from the cache, cost from the
//! grid.

use gn_core::{FloorId, GridPosition, TerrainView};

use crate::{CollisionCache, TileGrid};

/// Borrowed view of a single floor.
///
/// Blocked tests go through the row-major bitset (one word load), costs
/// through the Morton-ordered tile storage.
#[derive(Copy, Clone)]
pub struct FloorView<'a> {
    pub grid:  &'a TileGrid,
    pub cache: &'a CollisionCache,
    pub floor: FloorId,
}

impl<'a> FloorView<'a> {
    pub fn new(grid: &'a TileGrid, cache: &'a CollisionCache, floor: FloorId) -> Self {
        debug_assert_eq!(grid.width(), cache.width());
        debug_assert_eq!(grid.height(), cache.height());
        Self { grid, cache, floor }
    }
}

impl TerrainView for FloorView<'_> {
    #[inline]
    fn width(&self) -> u32 {
        self.cache.width()
    }

    #[inline]
    fn height(&self) -> u32 {
        self.cache.height()
    }

    #[inline]
    fn is_blocked(&self, pos: GridPosition) -> bool {
        self.cache.is_blocked(pos)
    }

    #[inline]
    fn movement_cost(&self, pos: GridPosition) -> u8 {
        self.grid.movement_cost(pos, self.floor)
    }
}

/// A bare cache is a uniform-cost terrain.
impl TerrainView for CollisionCache {
    #[inline]
    fn width(&self) -> u32 {
        CollisionCache::width(self)
    }

    #[inline]
    fn height(&self) -> u32 {
        CollisionCache::height(self)
    }

    #[inline]
    fn is_blocked(&self, pos: GridPosition) -> bool {
        CollisionCache::is_blocked(self, pos)
    }

    #[inline]
    fn movement_cost(&self, _pos: GridPosition) -> u8 {
        1
    }
}

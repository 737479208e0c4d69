//! Read-only terrain seam shared by occupancy, pathfinding, and movement.
//!
//! Storage lives in `gn-grid`; everything downstream only needs to ask
//! "is this cell blocked?" and "what does stepping onto it cost?".  Keeping
//! the question behind a trait lets the pathfinder and arbiter be tested
//! against tiny hand-written grids.

use crate::GridPosition;

/// Walkability and movement-cost view of one floor.
///
/// Implementations must report out-of-bounds positions as blocked.
pub trait TerrainView {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// `true` if the cell cannot be entered (terrain or out of bounds).
    fn is_blocked(&self, pos: GridPosition) -> bool;

    /// Cost multiplier for entering `pos`.  Must be `>= 1` for walkable
    /// cells so the A* heuristic stays admissible.
    fn movement_cost(&self, pos: GridPosition) -> u8;

    #[inline]
    fn in_bounds(&self, pos: GridPosition) -> bool {
        pos.in_bounds(self.width(), self.height())
    }

    #[inline]
    fn is_walkable(&self, pos: GridPosition) -> bool {
        !self.is_blocked(pos)
    }

    #[inline]
    fn cell_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }
}

impl<T: TerrainView + ?Sized> TerrainView for &T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn is_blocked(&self, pos: GridPosition) -> bool {
        (**self).is_blocked(pos)
    }

    fn movement_cost(&self, pos: GridPosition) -> u8 {
        (**self).movement_cost(pos)
    }
}

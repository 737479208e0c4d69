//! Row-major blocked-cell bitset derived from a [`TileGrid`] floor.
//!
//! One bit per cell, bit `x + y * width`, packed into `u64` words.  The
//! cache is row-major regardless of the grid's Morton addressing, which lets
//! rectangle scans handle each row as one contiguous bit range:
//!
//! ```text
//!   row y, columns x0..=x1  →  bits [y*w + x0, y*w + x1]
//!   first word: mask off low bits, last word: mask off high bits,
//!   words in between: count_ones() / != 0 directly
//! ```
//!
//! so `count_blocked_in_area` costs O(rows × (cols / 64 + 2)) rather than
//! O(cells).

use gn_core::{FloorId, GridPosition, GridRect};

use crate::TileGrid;

/// 1-bit-per-cell mirror of a floor's blocked state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionCache {
    width:   u32,
    height:  u32,
    words:   Vec<u64>,
}

impl CollisionCache {
    /// An all-walkable cache of the given size.
    pub fn empty(width: u32, height: u32) -> Self {
        let bits = width as usize * height as usize;
        Self { width, height, words: vec![0; bits.div_ceil(64)] }
    }

    /// Build from one floor of `grid`.
    pub fn build(grid: &TileGrid, floor: FloorId) -> Self {
        let mut cache = Self::empty(grid.width(), grid.height());
        cache.fill_from(grid, floor);
        cache
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    // ── Refresh ───────────────────────────────────────────────────────────

    /// Re-read a single cell from `grid`.  Out-of-bounds is a no-op.
    pub fn apply_cell(&mut self, grid: &TileGrid, floor: FloorId, pos: GridPosition) {
        if pos.in_bounds(self.width, self.height) {
            self.set_bit(pos.row_major(self.width), grid.is_blocked(pos, floor));
        }
    }

    /// Rebuild the whole cache from `grid`, resizing if the grid changed size.
    pub fn apply_from_grid(&mut self, grid: &TileGrid, floor: FloorId) {
        if grid.width() != self.width || grid.height() != self.height {
            *self = Self::empty(grid.width(), grid.height());
        } else {
            self.words.fill(0);
        }
        self.fill_from(grid, floor);
    }

    fn fill_from(&mut self, grid: &TileGrid, floor: FloorId) {
        let w = self.width;
        grid.for_each_cell(floor, |pos, tile| {
            if tile.is_blocked() {
                let bit = pos.row_major(w);
                self.words[bit / 64] |= 1u64 << (bit % 64);
            }
        });
    }

    /// Directly set a cell's blocked bit.  Out-of-bounds is a no-op.
    pub fn set_blocked(&mut self, pos: GridPosition, blocked: bool) {
        if pos.in_bounds(self.width, self.height) {
            self.set_bit(pos.row_major(self.width), blocked);
        }
    }

    #[inline]
    fn set_bit(&mut self, bit: usize, on: bool) {
        let mask = 1u64 << (bit % 64);
        if on {
            self.words[bit / 64] |= mask;
        } else {
            self.words[bit / 64] &= !mask;
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// O(1) blocked test.  Out-of-bounds is blocked.
    #[inline]
    pub fn is_blocked(&self, pos: GridPosition) -> bool {
        if !pos.in_bounds(self.width, self.height) {
            return true;
        }
        let bit = pos.row_major(self.width);
        self.words[bit / 64] & (1u64 << (bit % 64)) != 0
    }

    /// `true` if any cell of `rect` is blocked.  Parts of `rect` outside
    /// the grid count as blocked.
    pub fn any_blocked_in_area(&self, rect: GridRect) -> bool {
        let Some(clipped) = rect.clip(self.width, self.height) else {
            return rect.area() > 0;
        };
        if clipped != rect {
            return true;
        }
        (clipped.min.y..=clipped.max.y).any(|y| {
            let (start, end) = self.row_span(y, clipped.min.x, clipped.max.x);
            self.any_in_span(start, end)
        })
    }

    /// Number of blocked cells in `rect`.  Parts of `rect` outside the grid
    /// count as blocked; the total saturates at `u64::MAX`.
    pub fn count_blocked_in_area(&self, rect: GridRect) -> u64 {
        let Some(clipped) = rect.clip(self.width, self.height) else {
            return rect.area();
        };
        let total = rect.area();
        // A true area never equals u64::MAX; that value means it saturated.
        if total == u64::MAX {
            return u64::MAX;
        }
        let outside = total - clipped.area();
        let inside: u64 = (clipped.min.y..=clipped.max.y)
            .map(|y| {
                let (start, end) = self.row_span(y, clipped.min.x, clipped.max.x);
                self.count_in_span(start, end) as u64
            })
            .sum();
        outside + inside
    }

    /// Total blocked cells on the floor.
    pub fn blocked_count(&self) -> u64 {
        self.words.iter().map(|w| w.count_ones() as u64).sum()
    }

    #[inline]
    fn row_span(&self, y: i32, x0: i32, x1: i32) -> (usize, usize) {
        let row = y as usize * self.width as usize;
        (row + x0 as usize, row + x1 as usize)
    }

    /// Word-parallel popcount over inclusive bit range `[start, end]`.
    fn count_in_span(&self, start: usize, end: usize) -> u32 {
        let (sw, ew) = (start / 64, end / 64);
        let lo = !0u64 << (start % 64);
        let hi = !0u64 >> (63 - end % 64);
        if sw == ew {
            return (self.words[sw] & lo & hi).count_ones();
        }
        let mut n = (self.words[sw] & lo).count_ones() + (self.words[ew] & hi).count_ones();
        for w in &self.words[sw + 1..ew] {
            n += w.count_ones();
        }
        n
    }

    fn any_in_span(&self, start: usize, end: usize) -> bool {
        let (sw, ew) = (start / 64, end / 64);
        let lo = !0u64 << (start % 64);
        let hi = !0u64 >> (63 - end % 64);
        if sw == ew {
            return self.words[sw] & lo & hi != 0;
        }
        self.words[sw] & lo != 0
            || self.words[ew] & hi != 0
            || self.words[sw + 1..ew].iter().any(|&w| w != 0)
    }
}

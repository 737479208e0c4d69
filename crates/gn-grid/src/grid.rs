//! Multi-floor tile storage in Morton order.
//!
//! # Data layout
//!
//! All floors share one [`MortonLayout`].  Tiles for floor `f` occupy
//! `cells[f * slots .. (f + 1) * slots]`, and within a floor each cell lives
//! at `layout.encode(x, y)`.  Padded layouts leave some slots unused; those
//! hold [`Tile::BLOCKED`] and are never addressed by an in-bounds position.
//!
//! # Bounds policy
//!
//! Reads outside the grid (or on a floor that does not exist) return
//! [`Tile::BLOCKED`]; writes there are ignored.  Hot-path movement code can
//! therefore treat "edge of the map" and "wall" identically.

use gn_core::{FloorId, GridPosition};

use crate::morton::{AddressingMode, MortonLayout, MAX_SIDE};
use crate::{GridError, GridResult, Tile};

/// Static per-floor terrain storage.
#[derive(Clone, Debug)]
pub struct TileGrid {
    layout: MortonLayout,
    floors: u8,
    cells:  Vec<Tile>,
}

impl TileGrid {
    /// Allocate a `width × height × floors` grid filled with `Tile::default()`.
    ///
    /// # Errors
    ///
    /// `InvalidDimensions` if any dimension is zero or a side exceeds
    /// [`MAX_SIDE`].
    pub fn new(width: u32, height: u32, floors: u8, mode: AddressingMode) -> GridResult<Self> {
        validate_side(width, "grid width")?;
        validate_side(height, "grid height")?;
        if floors == 0 {
            return Err(GridError::InvalidDimensions { expected: 1, got: 0, what: "floor count" });
        }

        let layout = MortonLayout::new(width, height, mode);
        let slots  = layout.slot_count();
        let mut cells = vec![Tile::BLOCKED; slots * floors as usize];
        for f in 0..floors as usize {
            for y in 0..height {
                for x in 0..width {
                    cells[f * slots + layout.encode(x, y)] = Tile::default();
                }
            }
        }

        Ok(Self { layout, floors, cells })
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn width(&self) -> u32 {
        self.layout.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.layout.height()
    }

    #[inline]
    pub fn floors(&self) -> u8 {
        self.floors
    }

    /// Logical cells per floor (`width × height`).
    #[inline]
    pub fn cells_per_floor(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    #[inline]
    pub fn addressing(&self) -> AddressingMode {
        self.layout.mode()
    }

    #[inline]
    pub fn layout(&self) -> &MortonLayout {
        &self.layout
    }

    #[inline]
    pub fn has_floor(&self, floor: FloorId) -> bool {
        floor.0 < self.floors
    }

    /// Approximate heap footprint: tiles plus permutation tables.
    pub fn memory_bytes(&self) -> usize {
        self.cells.len() * std::mem::size_of::<Tile>() + self.layout.memory_bytes()
    }

    // ── Cell access ───────────────────────────────────────────────────────

    /// Physical index of `(pos, floor)`, or `None` when out of bounds.
    #[inline]
    fn slot(&self, pos: GridPosition, floor: FloorId) -> Option<usize> {
        if !self.has_floor(floor) || !pos.in_bounds(self.width(), self.height()) {
            return None;
        }
        let base = floor.index() * self.layout.slot_count();
        Some(base + self.layout.encode(pos.x as u32, pos.y as u32))
    }

    /// Tile at `pos`, or [`Tile::BLOCKED`] out of bounds.
    #[inline]
    pub fn get(&self, pos: GridPosition, floor: FloorId) -> Tile {
        match self.slot(pos, floor) {
            Some(i) => self.cells[i],
            None    => Tile::BLOCKED,
        }
    }

    /// Overwrite the tile at `pos`.  Out-of-bounds writes are ignored.
    ///
    /// Returns `true` if the blocked state of the cell changed, so callers
    /// know whether a collision-cache update is needed.
    #[inline]
    pub fn set(&mut self, pos: GridPosition, floor: FloorId, tile: Tile) -> bool {
        match self.slot(pos, floor) {
            Some(i) => {
                let was_blocked = self.cells[i].is_blocked();
                self.cells[i] = tile;
                was_blocked != tile.is_blocked()
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_blocked(&self, pos: GridPosition, floor: FloorId) -> bool {
        self.get(pos, floor).is_blocked()
    }

    #[inline]
    pub fn movement_cost(&self, pos: GridPosition, floor: FloorId) -> u8 {
        self.get(pos, floor).cost()
    }

    /// Set every in-bounds cell of `floor` to `tile`.  No-op for a missing
    /// floor.
    pub fn fill_layer(&mut self, floor: FloorId, tile: Tile) {
        if !self.has_floor(floor) {
            return;
        }
        let (w, h) = (self.width(), self.height());
        let base = floor.index() * self.layout.slot_count();
        for y in 0..h {
            for x in 0..w {
                let i = base + self.layout.encode(x, y);
                self.cells[i] = tile;
            }
        }
    }

    // ── Row-major interchange ─────────────────────────────────────────────

    /// Replace `floor` from row-major persisted bytes (`x + y * width`).
    ///
    /// Every byte is decoded before any cell is written, so a corrupt input
    /// leaves the floor untouched.
    pub fn load_row_major(&mut self, floor: FloorId, bytes: &[u8]) -> GridResult<()> {
        if !self.has_floor(floor) {
            return Err(GridError::FloorOutOfRange(floor));
        }
        let expected = self.cells_per_floor();
        if bytes.len() != expected {
            return Err(GridError::InvalidDimensions {
                expected,
                got:  bytes.len(),
                what: "row-major layer length",
            });
        }

        let decoded = bytes
            .iter()
            .map(|&b| Tile::from_byte(b))
            .collect::<GridResult<Vec<Tile>>>()?;

        let w = self.width();
        let base = floor.index() * self.layout.slot_count();
        for (cell, tile) in decoded.into_iter().enumerate() {
            let (x, y) = (cell as u32 % w, cell as u32 / w);
            let i = base + self.layout.encode(x, y);
            self.cells[i] = tile;
        }
        Ok(())
    }

    /// Export `floor` as row-major persisted bytes.  Empty for a missing floor.
    pub fn export_row_major(&self, floor: FloorId) -> Vec<u8> {
        if !self.has_floor(floor) {
            return Vec::new();
        }
        let (w, h) = (self.width(), self.height());
        let base = floor.index() * self.layout.slot_count();
        let mut out = Vec::with_capacity(self.cells_per_floor());
        for y in 0..h {
            for x in 0..w {
                out.push(self.cells[base + self.layout.encode(x, y)].to_byte());
            }
        }
        out
    }

    /// Visit every in-bounds cell of `floor` in storage (Morton) order.
    pub fn for_each_cell<F>(&self, floor: FloorId, mut f: F)
    where
        F: FnMut(GridPosition, &Tile),
    {
        if !self.has_floor(floor) {
            return;
        }
        let slots = self.layout.slot_count();
        let base  = floor.index() * slots;
        for slot in 0..slots {
            let (x, y) = self.layout.decode(slot);
            if x < self.width() && y < self.height() {
                f(GridPosition::new(x as i32, y as i32), &self.cells[base + slot]);
            }
        }
    }
}

fn validate_side(side: u32, what: &'static str) -> GridResult<()> {
    if side == 0 || side > MAX_SIDE {
        return Err(GridError::InvalidDimensions {
            expected: MAX_SIDE as usize,
            got:      side as usize,
            what,
        });
    }
    Ok(())
}

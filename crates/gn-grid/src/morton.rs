//! Locality-preserving (Morton / Z-order) cell addressing.
//!
//! # Why Z-order
//!
//! Interleaving the bits of `x` and `y` places every aligned 2^k × 2^k block
//! of cells in a contiguous run of storage.  A 3×3 neighbourhood lookup
//! (the pathfinder's inner loop) therefore touches one or two cache lines
//! instead of three separate rows.
//!
//! # Two addressing modes
//!
//! | Mode      | Storage slots         | Address computation                   |
//! |-----------|-----------------------|---------------------------------------|
//! | `Compact` | `width × height`      | table lookup (rank of the Morton code) |
//! | `Padded`  | `side²`, side = 2^k   | direct bit interleave, no table       |
//!
//! `Compact` wastes no memory but needs two `u32` permutation tables built
//! once at construction.  `Padded` needs no tables but rounds the side up to
//! the next power of two.  The choice is invisible to callers apart from
//! [`MortonLayout::memory_bytes`].

/// Largest supported grid side.  Keeps padded slot counts within `u32`.
pub const MAX_SIDE: u32 = 1 << 15;

// ── Bit interleave primitives ─────────────────────────────────────────────────

/// Spread the low 32 bits of `v` so that bit `i` lands at bit `2i`.
#[inline]
pub fn part1by1(v: u32) -> u64 {
    let mut x = v as u64;
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8))  & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4))  & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2))  & 0x3333_3333_3333_3333;
    x = (x | (x << 1))  & 0x5555_5555_5555_5555;
    x
}

/// Inverse of [`part1by1`]: gather every even bit into the low 32 bits.
#[inline]
pub fn compact1by1(v: u64) -> u32 {
    let mut x = v & 0x5555_5555_5555_5555;
    x = (x | (x >> 1))  & 0x3333_3333_3333_3333;
    x = (x | (x >> 2))  & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x >> 4))  & 0x00FF_00FF_00FF_00FF;
    x = (x | (x >> 8))  & 0x0000_FFFF_0000_FFFF;
    x = (x | (x >> 16)) & 0x0000_0000_FFFF_FFFF;
    x as u32
}

/// Morton code of `(x, y)`: x bits at even positions, y bits at odd.
#[inline]
pub fn encode(x: u32, y: u32) -> u64 {
    part1by1(x) | (part1by1(y) << 1)
}

#[inline]
pub fn decode(code: u64) -> (u32, u32) {
    (compact1by1(code), compact1by1(code >> 1))
}

// ── AddressingMode ────────────────────────────────────────────────────────────

/// Storage addressing strategy, fixed at grid construction.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressingMode {
    /// Exact `width × height` slots, remapped through a rank table.
    #[default]
    Compact,
    /// Power-of-two square, addressed by raw Morton code.
    Padded,
}

// ── MortonLayout ──────────────────────────────────────────────────────────────

/// Bijective mapping between in-bounds `(x, y)` and a physical storage slot.
///
/// Owned by one grid instance; there is no global table.
#[derive(Clone, Debug)]
pub struct MortonLayout {
    mode:   AddressingMode,
    width:  u32,
    height: u32,
    /// Padded side length (power of two).  Equals `max(width, height)`
    /// rounded up; unused in compact mode except for diagnostics.
    side:   u32,
    /// Compact only: row-major offset → slot.
    slot_of: Vec<u32>,
    /// Compact only: slot → row-major offset.
    cell_of: Vec<u32>,
}

impl MortonLayout {
    /// Build a layout for a `width × height` grid.
    ///
    /// Caller guarantees `1 <= width, height <= MAX_SIDE`.
    pub fn new(width: u32, height: u32, mode: AddressingMode) -> Self {
        let side = width.max(height).max(1).next_power_of_two();
        let (slot_of, cell_of) = match mode {
            AddressingMode::Padded  => (Vec::new(), Vec::new()),
            AddressingMode::Compact => rank_tables(width, height),
        };
        Self { mode, width, height, side, slot_of, cell_of }
    }

    #[inline]
    pub fn mode(&self) -> AddressingMode {
        self.mode
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of physical slots per floor.
    #[inline]
    pub fn slot_count(&self) -> usize {
        match self.mode {
            AddressingMode::Compact => self.width as usize * self.height as usize,
            AddressingMode::Padded  => self.side as usize * self.side as usize,
        }
    }

    /// Storage slot for an in-bounds `(x, y)`.
    #[inline]
    pub fn encode(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        match self.mode {
            AddressingMode::Padded  => encode(x, y) as usize,
            AddressingMode::Compact => {
                self.slot_of[x as usize + y as usize * self.width as usize] as usize
            }
        }
    }

    /// Cell coordinates stored at `slot`.
    ///
    /// In padded mode slots outside the logical grid decode to coordinates
    /// with `x >= width` or `y >= height`.
    #[inline]
    pub fn decode(&self, slot: usize) -> (u32, u32) {
        match self.mode {
            AddressingMode::Padded  => decode(slot as u64),
            AddressingMode::Compact => {
                let cell = self.cell_of[slot];
                (cell % self.width, cell / self.width)
            }
        }
    }

    /// Bytes held by the permutation tables.
    pub fn memory_bytes(&self) -> usize {
        (self.slot_of.len() + self.cell_of.len()) * std::mem::size_of::<u32>()
    }
}

/// Rank every in-bounds cell by its Morton code.
///
/// Returns `(slot_of, cell_of)`: row-major offset → rank, and its inverse.
fn rank_tables(width: u32, height: u32) -> (Vec<u32>, Vec<u32>) {
    let n = width as usize * height as usize;
    let mut order: Vec<(u64, u32)> = Vec::with_capacity(n);
    for y in 0..height {
        for x in 0..width {
            order.push((encode(x, y), x + y * width));
        }
    }
    // Morton codes are unique per cell, so the sort is a total order.
    order.sort_unstable_by_key(|&(code, _)| code);

    let mut slot_of = vec![0u32; n];
    let mut cell_of = Vec::with_capacity(n);
    for (rank, &(_, cell)) in order.iter().enumerate() {
        slot_of[cell as usize] = rank as u32;
        cell_of.push(cell);
    }
    (slot_of, cell_of)
}

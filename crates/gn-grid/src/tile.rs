//! Per-cell terrain data.
//!
//! Walkability and cost are separate fields: the collision mask alone
//! decides whether a cell can be entered, and `cost` is a multiplier read
//! only for walkable cells.  Nothing infers one from the other.
//!
//! # Persisted byte layout
//!
//! ```text
//!   bit 7 ........ 4 3 ........ 0
//!     collision mask   terrain type
//! ```
//!
//! The cost is not persisted; it is re-derived from the terrain type on load.

use bitflags::bitflags;

use crate::{GridError, GridResult};

// ── TerrainType ───────────────────────────────────────────────────────────────

/// Terrain kind.  Fits in the low nibble of the persisted byte.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TerrainType {
    /// Nothing here; used for the out-of-bounds sentinel.
    Void     = 0,
    #[default]
    Ground   = 1,
    Grass    = 2,
    Road     = 3,
    Sand     = 4,
    Shallows = 5,
    Swamp    = 6,
    Water    = 7,
    Rock     = 8,
    Wall     = 9,
}

impl TerrainType {
    /// Movement cost multiplier derived from the terrain kind.
    pub fn base_cost(self) -> u8 {
        match self {
            TerrainType::Void     => u8::MAX,
            TerrainType::Road     => 1,
            TerrainType::Ground   => 1,
            TerrainType::Grass    => 1,
            TerrainType::Sand     => 2,
            TerrainType::Shallows => 3,
            TerrainType::Swamp    => 4,
            TerrainType::Water    => 1,
            TerrainType::Rock     => 1,
            TerrainType::Wall     => 1,
        }
    }

    /// Collision mask a freshly painted cell of this terrain gets.
    pub fn default_mask(self) -> CollisionMask {
        match self {
            TerrainType::Void  => CollisionMask::SOLID,
            TerrainType::Water => CollisionMask::LIQUID,
            TerrainType::Rock | TerrainType::Wall => {
                CollisionMask::SOLID | CollisionMask::BLOCKS_SIGHT
            }
            _ => CollisionMask::empty(),
        }
    }

    pub fn from_u8(v: u8) -> Option<TerrainType> {
        Some(match v {
            0 => TerrainType::Void,
            1 => TerrainType::Ground,
            2 => TerrainType::Grass,
            3 => TerrainType::Road,
            4 => TerrainType::Sand,
            5 => TerrainType::Shallows,
            6 => TerrainType::Swamp,
            7 => TerrainType::Water,
            8 => TerrainType::Rock,
            9 => TerrainType::Wall,
            _ => return None,
        })
    }
}

// ── CollisionMask ─────────────────────────────────────────────────────────────

bitflags! {
    /// Collision layers of a cell.  Only the low nibble is persisted.
    #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CollisionMask: u8 {
        /// Impassable for walking agents.
        const SOLID        = 0b0001;
        /// Deep liquid; impassable for walking agents.
        const LIQUID       = 0b0010;
        /// Blocks line of sight only.
        const BLOCKS_SIGHT = 0b0100;
        /// Walkable but agents may not be spawned here.
        const NO_SPAWN     = 0b1000;
    }
}

impl CollisionMask {
    /// Layers that make a cell impassable for movement.
    pub const MOVEMENT_BLOCKERS: CollisionMask =
        CollisionMask::SOLID.union(CollisionMask::LIQUID);

    #[inline]
    pub fn blocks_movement(self) -> bool {
        self.intersects(Self::MOVEMENT_BLOCKERS)
    }
}

// ── Tile ──────────────────────────────────────────────────────────────────────

/// One grid cell's terrain data.
///
/// Movement cost is not stored: it is always [`TerrainType::base_cost`], so
/// the packed byte carries everything a tile holds.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    pub terrain:   TerrainType,
    pub collision: CollisionMask,
}

impl Tile {
    /// Returned for every out-of-bounds read.
    pub const BLOCKED: Tile = Tile {
        terrain:   TerrainType::Void,
        collision: CollisionMask::SOLID,
    };

    /// Tile with the given collision mask.  `Void` is always `SOLID`.
    pub fn new(terrain: TerrainType, mut collision: CollisionMask) -> Self {
        if terrain == TerrainType::Void {
            collision |= CollisionMask::SOLID;
        }
        Self { terrain, collision }
    }

    /// Tile with the terrain's default collision mask.
    pub fn of(terrain: TerrainType) -> Self {
        Self::new(terrain, terrain.default_mask())
    }

    /// Movement cost multiplier, derived from the terrain.
    #[inline]
    pub fn cost(&self) -> u8 {
        self.terrain.base_cost()
    }

    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.collision.blocks_movement()
    }

    /// Pack into the persisted byte (mask high nibble, terrain low nibble).
    #[inline]
    pub fn to_byte(self) -> u8 {
        ((self.collision.bits() & 0x0F) << 4) | (self.terrain as u8 & 0x0F)
    }

    /// Unpack a persisted byte.  Unknown terrain values are corrupt data.
    pub fn from_byte(b: u8) -> GridResult<Tile> {
        let terrain = TerrainType::from_u8(b & 0x0F)
            .ok_or_else(|| GridError::Corrupt(format!("unknown terrain type {}", b & 0x0F)))?;
        let collision = CollisionMask::from_bits_truncate(b >> 4);
        Ok(Tile::new(terrain, collision))
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::of(TerrainType::Ground)
    }
}

//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into per-agent `Vec`s, but callers should prefer the
//! `.index()` helpers for clarity.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Identifier of a navigating agent.
    ///
    /// Ids are handed out sequentially by the world and never reused, so a
    /// stale occupancy release can never match a newer agent.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a floor (vertical layer) within a `TileGrid`.
    pub struct FloorId(u8);
}

impl AgentId {
    /// Value stored in an occupancy slot for this agent.
    ///
    /// Occupancy slots are signed so that `-1` can mark a free cell; every
    /// valid `u32` id maps to a non-negative `i64`.
    #[inline(always)]
    pub fn to_slot(self) -> i64 {
        self.0 as i64
    }

    /// Inverse of [`to_slot`](Self::to_slot).  Negative values are free cells.
    #[inline(always)]
    pub fn from_slot(raw: i64) -> Option<AgentId> {
        u32::try_from(raw).ok().map(AgentId)
    }
}

impl FloorId {
    pub const GROUND: FloorId = FloorId(0);
}

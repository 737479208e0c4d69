//! Grid coordinates, step directions, and rectangular regions.
//!
//! Coordinates are signed so that callers can express out-of-bounds probes
//! (`x = -1`) without wrapping; every storage layer treats such positions as
//! blocked rather than failing.

use std::fmt;

// ── GridPosition ──────────────────────────────────────────────────────────────

/// An integer `(x, y)` cell coordinate.  Value type, compared field-wise.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `dir`.  Saturates at the `i32`
    /// limits, which are never inside a grid.
    #[inline]
    pub fn step(self, dir: Direction) -> GridPosition {
        let (dx, dy) = dir.delta();
        GridPosition::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// `true` if the position lies inside a `width × height` grid.
    #[inline]
    pub fn in_bounds(self, width: u32, height: u32) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as u32) < width && (self.y as u32) < height
    }

    /// Row-major offset (`x + y * width`).  Caller guarantees `in_bounds`.
    #[inline]
    pub fn row_major(self, width: u32) -> usize {
        self.x as usize + self.y as usize * width as usize
    }

    /// Direction of the single step from `self` to `other`, if they are
    /// 8-neighbours.
    pub fn direction_to(self, other: GridPosition) -> Option<Direction> {
        let dx = other.x.checked_sub(self.x)?;
        let dy = other.y.checked_sub(self.y)?;
        Direction::from_delta(dx, dy)
    }

    /// Squared Euclidean distance in cells.
    #[inline]
    pub fn distance_sq(self, other: GridPosition) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// One of the eight grid step directions.  `y` grows southwards.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Cardinal directions in a fixed order (used for neighbour expansion).
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// All eight directions, cardinals first.  Expansion order is part of
    /// the pathfinder's deterministic tie-break.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North     => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East      => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South     => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West      => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        Some(match (dx, dy) {
            (0, -1)  => Direction::North,
            (1, -1)  => Direction::NorthEast,
            (1, 0)   => Direction::East,
            (1, 1)   => Direction::SouthEast,
            (0, 1)   => Direction::South,
            (-1, 1)  => Direction::SouthWest,
            (-1, 0)  => Direction::West,
            (-1, -1) => Direction::NorthWest,
            _ => return None,
        })
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        let (dx, dy) = self.delta();
        dx != 0 && dy != 0
    }

    /// The two cardinal components of a diagonal (the "corner" cells).
    /// Returns `None` for cardinal directions.
    pub fn corner_components(self) -> Option<(Direction, Direction)> {
        match self {
            Direction::NorthEast => Some((Direction::North, Direction::East)),
            Direction::SouthEast => Some((Direction::South, Direction::East)),
            Direction::SouthWest => Some((Direction::South, Direction::West)),
            Direction::NorthWest => Some((Direction::North, Direction::West)),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North     => "n",
            Direction::NorthEast => "ne",
            Direction::East      => "e",
            Direction::SouthEast => "se",
            Direction::South     => "s",
            Direction::SouthWest => "sw",
            Direction::West      => "w",
            Direction::NorthWest => "nw",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── GridRect ──────────────────────────────────────────────────────────────────

/// Inclusive rectangle of cells: `min.x..=max.x` × `min.y..=max.y`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridRect {
    pub min: GridPosition,
    pub max: GridPosition,
}

impl GridRect {
    /// Rectangle spanning two corners in any order.
    pub fn from_corners(a: GridPosition, b: GridPosition) -> Self {
        Self {
            min: GridPosition::new(a.x.min(b.x), a.y.min(b.y)),
            max: GridPosition::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Square of side `2 * radius + 1` centred on `center`, saturating at
    /// the `i32` coordinate limits.
    pub fn around(center: GridPosition, radius: i32) -> Self {
        let r = radius.max(0);
        Self {
            min: GridPosition::new(center.x.saturating_sub(r), center.y.saturating_sub(r)),
            max: GridPosition::new(center.x.saturating_add(r), center.y.saturating_add(r)),
        }
    }

    #[inline]
    pub fn contains(&self, p: GridPosition) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Intersect with a `width × height` grid.  Returns `None` when nothing
    /// of the rectangle lies inside.
    pub fn clip(&self, width: u32, height: u32) -> Option<GridRect> {
        if width == 0 || height == 0 {
            return None;
        }
        let min_x = self.min.x.max(0);
        let min_y = self.min.y.max(0);
        let max_x = self.max.x.min(width as i32 - 1);
        let max_y = self.max.y.min(height as i32 - 1);
        if min_x > max_x || min_y > max_y {
            return None;
        }
        Some(GridRect {
            min: GridPosition::new(min_x, min_y),
            max: GridPosition::new(max_x, max_y),
        })
    }

    /// Number of cells covered, saturating at `u64::MAX`.
    pub fn area(&self) -> u64 {
        if self.min.x > self.max.x || self.min.y > self.max.y {
            return 0;
        }
        let w = (self.max.x as i64 - self.min.x as i64 + 1) as u64;
        let h = (self.max.y as i64 - self.min.y as i64 + 1) as u64;
        w.saturating_mul(h)
    }
}

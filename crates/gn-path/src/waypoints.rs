//! Fixed-capacity inline path storage.

use std::fmt;

use gn_core::GridPosition;

/// Hard upper bound on waypoints per buffer.
pub const MAX_WAYPOINTS: usize = 128;

/// Ordered path steps plus a consumption cursor, stored inline.
///
/// The buffer is rewritten wholesale for every new path and advanced one
/// step at a time while the agent follows it.  `capacity` is the per-agent
/// limit (at most [`MAX_WAYPOINTS`]) that the path engine honours.
#[derive(Clone)]
pub struct WaypointBuffer {
    points:   [GridPosition; MAX_WAYPOINTS],
    len:      u16,
    cursor:   u16,
    capacity: u16,
    valid:    bool,
    partial:  bool,
}

impl WaypointBuffer {
    /// Empty, invalid buffer.  `capacity` is clamped to `1..=MAX_WAYPOINTS`.
    pub fn new(capacity: usize) -> Self {
        Self {
            points:   [GridPosition::default(); MAX_WAYPOINTS],
            len:      0,
            cursor:   0,
            capacity: capacity.clamp(1, MAX_WAYPOINTS) as u16,
            valid:    false,
            partial:  false,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor as usize
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// `true` if the path was truncated to fit the capacity.
    #[inline]
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// `true` once every waypoint has been consumed.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.len
    }

    /// Steps not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        (self.len - self.cursor.min(self.len)) as usize
    }

    /// The waypoint the agent should move to next.
    #[inline]
    pub fn current(&self) -> Option<GridPosition> {
        if self.valid && !self.is_finished() {
            Some(self.points[self.cursor as usize])
        } else {
            None
        }
    }

    /// Last waypoint of the path, if any.
    #[inline]
    pub fn last(&self) -> Option<GridPosition> {
        self.as_slice().last().copied()
    }

    /// Consume the current waypoint.  Returns `true` while more remain.
    pub fn advance(&mut self) -> bool {
        if self.cursor < self.len {
            self.cursor += 1;
        }
        !self.is_finished()
    }

    pub fn as_slice(&self) -> &[GridPosition] {
        &self.points[..self.len as usize]
    }

    pub fn remaining_slice(&self) -> &[GridPosition] {
        &self.points[self.cursor.min(self.len) as usize..self.len as usize]
    }

    /// Replace the contents with `steps` (truncated to capacity) and mark
    /// the buffer valid.  Returns the number of steps stored.
    pub fn assign(&mut self, steps: &[GridPosition], partial: bool) -> usize {
        let n = steps.len().min(self.capacity());
        self.points[..n].copy_from_slice(&steps[..n]);
        self.len     = n as u16;
        self.cursor  = 0;
        self.valid   = true;
        self.partial = partial || n < steps.len();
        n
    }

    /// Replace the contents with a single step.
    pub fn assign_single(&mut self, step: GridPosition) {
        self.assign(&[step], false);
    }

    /// Drop the path; the buffer becomes empty and invalid.
    pub fn invalidate(&mut self) {
        self.len     = 0;
        self.cursor  = 0;
        self.valid   = false;
        self.partial = false;
    }

    /// Change the per-agent limit.  Invalidates the current path.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.clamp(1, MAX_WAYPOINTS) as u16;
        self.invalidate();
    }
}

impl Default for WaypointBuffer {
    fn default() -> Self {
        Self::new(MAX_WAYPOINTS)
    }
}

impl PartialEq for WaypointBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
            && self.cursor == other.cursor
            && self.capacity == other.capacity
            && self.valid == other.valid
            && self.partial == other.partial
    }
}

impl Eq for WaypointBuffer {}

impl fmt::Debug for WaypointBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaypointBuffer")
            .field("points", &self.as_slice())
            .field("cursor", &self.cursor)
            .field("capacity", &self.capacity)
            .field("valid", &self.valid)
            .field("partial", &self.partial)
            .finish()
    }
}

//! `gn-path` — A* pathfinding over any [`TerrainView`][gn_core::TerrainView].
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`engine`]    | `PathEngine` — reusable A* search with a node pool           |
//! | [`node`]      | `PathNode`, `NodePool` — generation-stamped search arena     |
//! | [`waypoints`] | `WaypointBuffer` — fixed-capacity inline path + cursor       |
//! | [`flags`]     | `PathFlags` — partial-path and cardinal-only request flags   |
//! | [`batch`]     | `PathQuery`, `solve_batch` — many searches in one call       |
//! | [`error`]     | `PathFailure`, `PathResult<T>`                               |
//!
//! # Search model
//!
//! Steps cost `1.0` cardinally and `√2` diagonally, multiplied by the
//! entered cell's movement cost.  The heuristic is octile distance for
//! 8-directional searches and Manhattan distance for cardinal-only ones;
//! both are admissible because every walkable cell costs at least `1`.
//!
//! Diagonal steps are rejected when either orthogonal corner cell is
//! blocked.  The open set is a binary heap ordered by `f`, then lower `h`,
//! then insertion order, so identical inputs give identical paths.
//!
//! Paths exclude the start cell.  `start == target` succeeds with zero
//! steps.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                       |
//! |------------|--------------------------------------------------------------|
//! | `parallel` | `solve_batch` runs on Rayon, one `PathEngine` per worker.    |
//! | `serde`    | Serde derives on `PathFlags`.                                |

pub mod batch;
pub mod engine;
pub mod error;
pub mod flags;
pub mod node;
pub mod waypoints;

#[cfg(test)]
mod tests;

pub use batch::{PathQuery, solve_batch};
pub use engine::{PathEngine, PathOutcome};
pub use error::{PathFailure, PathResult};
pub use flags::PathFlags;
pub use node::{NodePool, PathNode};
pub use waypoints::{MAX_WAYPOINTS, WaypointBuffer};

//! `gn-core` — foundational types for the `gridnav` tile-grid navigation engine.
//!
//! This crate is a dependency of every other `gn-*` crate.  It has no `gn-*`
//! dependencies and only `thiserror` (plus optional `serde`) from outside.
//!
//! # What lives here
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`ids`]       | `AgentId`, `FloorId`                                      |
//! | [`geo`]       | `GridPosition`, `Direction`, `GridRect`                   |
//! | [`time`]      | `Tick`                                                    |
//! | [`terrain`]   | `TerrainView` — read-only walkability/cost seam           |
//! | [`error`]     | `NavError`, `NavResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod error;
pub mod geo;
pub mod ids;
pub mod terrain;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{NavError, NavResult};
pub use geo::{Direction, GridPosition, GridRect};
pub use ids::{AgentId, FloorId};
pub use terrain::TerrainView;
pub use time::Tick;

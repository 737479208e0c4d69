//! `gn-world` — the navigation core's single entry point.
//!
//! [`NavWorld`] owns the tile grid, one collision cache and one occupancy
//! index per floor, a path engine, and the movement arbiter, and exposes
//! them through the narrow spawn / move / query surface external systems
//! use.
//!
//! # Tick loop
//!
//! ```text
//! world.tick():
//!   ① expire Completed  — agents that finished last tick return to Idle
//!   ② search            — up to max_path_requests_per_tick pending requests
//!   ③ finalise          — steps with end_tick <= now release their origin
//!   ④ start             — ascending AgentId: verify → claim → start step
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | `NavWorld::find_paths` runs on Rayon's thread pool.        |
//! | `serde`    | Serde derives on `WorldConfig` and all snapshot types.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use gn_core::{FloorId, GridPosition};
//! use gn_path::PathFlags;
//! use gn_world::{NoopObserver, WorldBuilder, WorldConfig};
//!
//! let mut world = WorldBuilder::new(WorldConfig::default()).build()?;
//! let settings = world.config().default_agent;
//! let id = world.add_agent(GridPosition::new(0, 0), FloorId::GROUND, settings)?;
//! world.request_path_to(id, GridPosition::new(9, 0), FloorId::GROUND, PathFlags::empty())?;
//! world.run_ticks(40, &mut NoopObserver);
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod world;


pub use builder::WorldBuilder;
pub use config::WorldConfig;
pub use error::{WorldError, WorldResult};
pub use observer::{NavObserver, NoopObserver};
pub use world::NavWorld;

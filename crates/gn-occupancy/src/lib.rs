//! `gn-occupancy` — which agent holds which cell.
//!
//! # Crate layout
//!
//! | Module    | Contents                                               |
//! |-----------|--------------------------------------------------------|
//! | [`index`] | `OccupancyIndex`, `OccupancyMode`, `OccupantBuf`       |
//!
//! # Concurrency model
//!
//! Each cell is one `AtomicI64` holding an agent id or [`FREE`].  Claims and
//! releases are single compare-and-swap operations; there is no cell-wide or
//! grid-wide lock on the primary slot, so a network thread can insert an
//! agent while the simulation thread is mid-tick.  Reads are eventually
//! consistent with concurrent writers, but two agents can never both win
//! the same primary slot.
//!
//! In [`OccupancyMode::Shared`] the extra occupants of a cell live in a
//! sharded overflow map; only that path takes a (per-shard) lock.

pub mod index;


pub use index::{FREE, OccupancyIndex, OccupancyMode, OccupantBuf};

//! `gn-grid` — static terrain storage, collision cache, and map codec.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`morton`]    | Bit-interleave encode/decode, `AddressingMode`, `MortonLayout`  |
//! | [`tile`]      | `Tile`, `TerrainType`, `CollisionMask`                          |
//! | [`grid`]      | `TileGrid` — multi-floor tile storage in Morton order           |
//! | [`collision`] | `CollisionCache` — row-major 1-bit-per-cell blocked mirror      |
//! | [`view`]      | `FloorView` — `TerrainView` over grid + cache for one floor     |
//! | [`codec`]     | Row-major interchange, RLE, zlib, CRC-32, `MapSnapshot`         |
//! | [`error`]     | `GridError`, `GridResult<T>`                                    |
//!
//! # Coherence rule
//!
//! `TileGrid` and `CollisionCache` are separate structures.  Any code that
//! changes collision state in the grid must apply the same cell (or the
//! whole floor) to the cache before the next read; `gn-world` does this in
//! one call.  Neither structure is internally synchronised.

pub mod codec;
pub mod collision;
pub mod error;
pub mod grid;
pub mod morton;
pub mod tile;
pub mod view;


pub use codec::{MapEncoding, MapSnapshot};
pub use collision::CollisionCache;
pub use error::{GridError, GridResult};
pub use grid::TileGrid;
pub use morton::{AddressingMode, MortonLayout};
pub use tile::{CollisionMask, TerrainType, Tile};
pub use view::FloorView;

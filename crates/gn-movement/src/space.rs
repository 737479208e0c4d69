//! Seam between the arbiter and the world's per-floor storage.

use gn_core::{FloorId, TerrainView};
use gn_occupancy::OccupancyIndex;

/// Per-floor terrain and occupancy, as seen by the arbiter.
///
/// Both methods return `None` for floors that do not exist.
pub trait NavSpace {
    fn terrain(&self, floor: FloorId) -> Option<impl TerrainView + '_>;

    fn occupancy(&self, floor: FloorId) -> Option<&OccupancyIndex>;
}

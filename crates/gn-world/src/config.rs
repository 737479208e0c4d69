//! World-wide configuration.

use gn_grid::AddressingMode;
use gn_grid::morton::MAX_SIDE;
use gn_movement::AgentSettings;
use gn_occupancy::OccupancyMode;

use crate::{WorldError, WorldResult};

/// Everything needed to construct a [`NavWorld`][crate::NavWorld].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Grid width in cells.
    pub width: u32,

    /// Grid height in cells.
    pub height: u32,

    /// Number of vertical layers.
    pub floors: u8,

    /// Tile storage layout.  Affects memory only.
    pub addressing: AddressingMode,

    /// Agents allowed per cell.
    pub occupancy: OccupancyMode,

    /// Searches run per tick; the rest stay `Pending`.
    pub max_path_requests_per_tick: usize,

    /// Settings handed out by [`NavWorld::add_default_agent`][crate::NavWorld::add_default_agent].
    pub default_agent: AgentSettings,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width:                      64,
            height:                     64,
            floors:                     1,
            addressing:                 AddressingMode::Compact,
            occupancy:                  OccupancyMode::Exclusive,
            max_path_requests_per_tick: 64,
            default_agent:              AgentSettings::default(),
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> WorldResult<()> {
        for (side, name) in [(self.width, "width"), (self.height, "height")] {
            if side == 0 || side > MAX_SIDE {
                return Err(WorldError::Config(format!(
                    "{name} must be in 1..={MAX_SIDE}, got {side}"
                )));
            }
        }
        if self.floors == 0 {
            return Err(WorldError::Config("floors must be at least 1".into()));
        }
        if self.max_path_requests_per_tick == 0 {
            return Err(WorldError::Config("max_path_requests_per_tick must be at least 1".into()));
        }
        if let OccupancyMode::Shared { max_per_cell: 0 } = self.occupancy {
            return Err(WorldError::Config("shared occupancy needs max_per_cell >= 1".into()));
        }
        self.default_agent.validate()?;
        Ok(())
    }
}

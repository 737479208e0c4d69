//! Many independent searches in one call.
//!
//! With the `parallel` feature each Rayon worker builds its own
//! [`PathEngine`] (`map_init`), since an engine's node pool cannot be
//! shared.  Output order always matches input order.

use gn_core::{GridPosition, TerrainView};

use crate::{PathEngine, PathFlags, PathOutcome, PathResult, WaypointBuffer};

/// One request in a batch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PathQuery {
    pub start:    GridPosition,
    pub target:   GridPosition,
    pub flags:    PathFlags,
    /// Waypoint capacity for this request's buffer.
    pub capacity: usize,
}

/// Solve every query against `terrain`.
pub fn solve_batch<T>(
    terrain: &T,
    queries: &[PathQuery],
) -> Vec<(PathResult<PathOutcome>, WaypointBuffer)>
where
    T: TerrainView + Sync + ?Sized,
{
    let solve = |engine: &mut PathEngine, q: &PathQuery| {
        let mut buf = WaypointBuffer::new(q.capacity);
        let res = engine.find_path(terrain, q.start, q.target, q.flags, &mut buf);
        (res, buf)
    };

    #[cfg(not(feature = "parallel"))]
    {
        let mut engine = PathEngine::for_terrain(terrain);
        queries.iter().map(|q| solve(&mut engine, q)).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        queries
            .par_iter()
            .map_init(|| PathEngine::for_terrain(terrain), solve)
            .collect()
    }
}

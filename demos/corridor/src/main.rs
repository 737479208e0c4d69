//! corridor — two groups of agents swap ends of a walled corridor.
//!
//! The corridor narrows to a single cell at its midpoint, so the groups
//! contend for the gap and take turns.  Pass a JSON `WorldConfig` path as
//! the first argument to override the defaults in `corridor.json`; set
//! `RUST_LOG=gn_movement=debug` for per-step logs.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gn_core::{AgentId, FloorId, GridPosition, NavError, Tick};
use gn_grid::{MapEncoding, MapSnapshot, TerrainType, Tile};
use gn_movement::TickReport;
use gn_path::PathFlags;
use gn_world::{NavObserver, NavWorld, WorldBuilder, WorldConfig};

// ── Constants ─────────────────────────────────────────────────────────────────

const PER_SIDE:  i32 = 3;
const MAX_TICKS: u64 = 2_000;
const FLOOR:     FloorId = FloorId::GROUND;

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Progress {
    completed: usize,
    failed:    usize,
    blocked:   u64,
}

impl NavObserver for Progress {
    fn on_blocked(&mut self, _tick: Tick, _agent: AgentId, _cell: GridPosition, _blocker: Option<AgentId>) {
        self.blocked += 1;
    }

    fn on_completed(&mut self, tick: Tick, agent: AgentId, cell: GridPosition) {
        self.completed += 1;
        info!(%tick, %agent, %cell, "arrived");
    }

    fn on_failed(&mut self, tick: Tick, agent: AgentId, reason: &NavError) {
        self.failed += 1;
        warn!(%tick, %agent, %reason, "gave up");
    }

    fn on_tick_end(&mut self, tick: Tick, report: &TickReport) {
        if report.paths_deferred > 0 {
            info!(%tick, deferred = report.paths_deferred, "path budget exhausted");
        }
    }
}

// ── Map ───────────────────────────────────────────────────────────────────────

/// Wall the outer rows and pinch the middle column down to one open cell.
fn carve_corridor(world: &mut NavWorld) -> Result<()> {
    let (w, h) = (world.config().width as i32, world.config().height as i32);
    if w < 2 * PER_SIDE + 3 || h < 3 {
        bail!("corridor needs at least {}x3 cells, got {w}x{h}", 2 * PER_SIDE + 3);
    }
    let wall = Tile::of(TerrainType::Wall);
    for x in 0..w {
        world.set_tile(GridPosition::new(x, 0), FLOOR, wall)?;
        world.set_tile(GridPosition::new(x, h - 1), FLOOR, wall)?;
    }
    let mid = w / 2;
    for y in 1..h - 1 {
        if y != h / 2 {
            world.set_tile(GridPosition::new(mid, y), FLOOR, wall)?;
        }
    }
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/corridor.json").to_string());
    let config = load_config(Path::new(&config_path))?;
    info!(path = %config_path, width = config.width, height = config.height, "config loaded");

    let mut world = WorldBuilder::new(config).build()?;
    carve_corridor(&mut world)?;

    // Persist and reload the map to exercise the codec end to end.
    let bytes = world.export_map(MapEncoding::Rle)?.to_bytes()?;
    world.load_map(&MapSnapshot::from_bytes(&bytes)?)?;
    info!(bytes = bytes.len(), "map round-tripped");

    let (w, h) = (config.width as i32, config.height as i32);
    let lanes: Vec<i32> = (1..h - 1).collect();
    let mut agents = Vec::new();
    for i in 0..PER_SIDE {
        let y = lanes[i as usize % lanes.len()];
        let west = world.add_default_agent(GridPosition::new(i, y), FLOOR)?;
        let east = world.add_default_agent(GridPosition::new(w - 1 - i, y), FLOOR)?;
        agents.push((west, GridPosition::new(w - 1 - i, y)));
        agents.push((east, GridPosition::new(i, y)));
    }
    for &(id, goal) in &agents {
        world.request_path_to(id, goal, FLOOR, PathFlags::empty())?;
    }

    let mut progress = Progress::default();
    let t0 = Instant::now();
    let ticks = world.run_until_idle(MAX_TICKS, &mut progress);
    let elapsed = t0.elapsed();

    println!("\n── Result ─────────────────────────────────────────────");
    println!("ticks       : {ticks}");
    println!("completed   : {}/{}", progress.completed, agents.len());
    println!("failed      : {}", progress.failed);
    println!("blocked     : {} agent-ticks", progress.blocked);
    println!("wall time   : {elapsed:.2?}");
    println!();
    for snap in world.snapshot() {
        println!(
            "{:>12}  cell {:<10} status {}",
            snap.agent.to_string(),
            snap.cell.to_string(),
            snap.status,
        );
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<WorldConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: WorldConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

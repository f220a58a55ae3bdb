//! Headless maze session.
//!
//! Drives the player through the maze the way the game loop would: one
//! movement attempt and one viewport query per tick. Chunks are generated
//! in the background while the walk continues.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use maze_world::{ChunkGenerator, GenerationService, Viewport, WorldQuery};
use tracing::{debug, info, warn};

use crate::config::MazeConfig;
use crate::player::{MoveOutcome, Player};
use crate::render::{placeholder_count, render_ascii};

/// How long warm-up waits for the start area.
const WARMUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Chance per tick (out of 256) that the wander picks a new heading.
const TURN_CHANCE: u8 = 12;

const DIRECTIONS: [(f64, f64); 4] = [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)];

/// Summary of a finished session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Ticks simulated
    pub ticks: u32,
    /// Successful moves
    pub moves: u32,
    /// Moves rejected by walls
    pub blocked: u32,
    /// Placeholder cells seen across all frames
    pub placeholders_seen: u64,
    /// Last frame
    pub final_frame: String,
}

/// Runs a session for `config.ticks` ticks and shuts generation down.
pub fn run(config: &MazeConfig) -> Result<SessionReport> {
    info!("Configuration:");
    info!("  Seed: {} ({:?})", config.seed, config.noise_kind);
    info!("  Chunk size: {} cells", config.chunk_size);
    info!(
        "  Frequency: {}, threshold: {}, smoothing: {}",
        config.noise_frequency, config.threshold, config.smoothing_window
    );

    let generator = ChunkGenerator::new(config.generator_config());
    let service = Arc::new(GenerationService::new(generator));
    let world = WorldQuery::new(Arc::clone(&service));

    let report = walk(config, &world);
    let stats = service.stats();
    info!(
        "Generation: {} requests, {} hits, {} generated, {} cached, {} pending",
        stats.requests, stats.cache_hits, stats.generated, stats.cached, stats.pending
    );

    service.shutdown()?;
    report
}

fn walk(config: &MazeConfig, world: &WorldQuery) -> Result<SessionReport> {
    let cell_size = config.cell_size;
    let mut player = Player::new(config.player_start_x, config.player_start_y, config.player_speed);

    let start = player.cell(cell_size)?;
    let start_chunk = start.try_to_chunk_coord(config.chunk_size)?;
    let queued = world.service().prefetch(start_chunk, config.prefetch_radius)?;
    debug!("Warming {queued} chunks around {start_chunk}");
    if !world.service().wait_idle(WARMUP_TIMEOUT) {
        warn!("Start area not ready after {WARMUP_TIMEOUT:?}, continuing with placeholders");
    }

    let tick = (config.tick_rate > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(config.tick_rate)));
    let mut rng = fastrand::Rng::with_seed(u64::from(config.seed));
    let mut heading = DIRECTIONS[rng.usize(..DIRECTIONS.len())];
    let mut report = SessionReport::default();

    for _ in 0..config.ticks {
        let frame_start = Instant::now();

        if rng.u8(..) < TURN_CHANCE {
            heading = DIRECTIONS[rng.usize(..DIRECTIONS.len())];
        }
        match player.try_move(heading.0, heading.1, world, cell_size)? {
            MoveOutcome::Moved => report.moves += 1,
            MoveOutcome::Blocked => {
                report.blocked += 1;
                heading = DIRECTIONS[rng.usize(..DIRECTIONS.len())];
            },
        }

        let viewport = Viewport::centered_on(
            player.x,
            player.y,
            config.player_size,
            config.view_width,
            config.view_height,
            cell_size,
        )?;
        let grid = world.visible_cells(&viewport)?;
        report.placeholders_seen += placeholder_count(&grid) as u64;
        report.ticks += 1;

        if let Some(tick) = tick {
            if let Some(rest) = tick.checked_sub(frame_start.elapsed()) {
                thread::sleep(rest);
            }
        }
    }

    let viewport = Viewport::centered_on(
        player.x,
        player.y,
        config.player_size,
        config.view_width,
        config.view_height,
        cell_size,
    )?;
    let grid = world.visible_cells(&viewport)?;
    report.final_frame = render_ascii(&grid, Some(player.cell(cell_size)?));

    info!(
        "Walked {} ticks: {} moves, {} blocked, player at ({:.1}, {:.1})",
        report.ticks, report.moves, report.blocked, player.x, player.y
    );
    Ok(report)
}

//! # Mazeworld
//!
//! Headless driver for the infinite procedural maze.
//!
//! Loads the maze configuration, walks a player through the world while
//! chunks generate in the background, and prints the final view.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod player;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{MazeConfig, CONFIG_FILE};

/// Command line options.
#[derive(Debug, Parser)]
#[command(name = "mazeworld", version, about = "Walk an infinite procedural maze")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Override the world seed
    #[arg(long)]
    seed: Option<u32>,

    /// Override the number of ticks to simulate
    #[arg(long)]
    ticks: Option<u32>,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    write_config: bool,
}

/// Log directives applied on top of `RUST_LOG`: this binary and the world
/// crate at info level.
fn default_directives() -> [String; 2] {
    [
        format!("{}=info", env!("CARGO_CRATE_NAME")),
        "maze_world=info".to_string(),
    ]
}

/// Main entry point.
fn main() -> Result<()> {
    let mut filter = EnvFilter::from_default_env();
    for directive in default_directives() {
        filter = filter.add_directive(directive.parse()?);
    }
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let args = Args::parse();

    info!("Mazeworld starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = MazeConfig::load_from(&args.config);
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        config.ticks = ticks;
    }
    config.validate();

    if args.write_config {
        config.save_to(&args.config)?;
        return Ok(());
    }

    let report = app::run(&config)?;
    print!("{}", report.final_frame);
    info!(
        "{} placeholder cells drawn over {} ticks",
        report.placeholders_seen, report.ticks
    );

    info!("Mazeworld shutdown complete");
    Ok(())
}

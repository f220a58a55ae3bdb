//! Maze configuration.
//!
//! Every tunable constant of the maze lives here: generation parameters,
//! the world-to-pixel cell size, and the headless session settings.
//! Configuration can be loaded from and saved to a TOML file.

use maze_world::{GeneratorConfig, NoiseKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{info, warn};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "mazeworld.toml";

/// Maze configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    // === Generation ===
    /// World seed
    pub seed: u32,
    /// Chunk size in cells
    pub chunk_size: u32,
    /// Noise input scale per cell
    pub noise_frequency: f64,
    /// Wall threshold on `|noise|`
    pub threshold: f64,
    /// Median filter window side
    pub smoothing_window: u32,
    /// Noise algorithm
    pub noise_kind: NoiseKind,

    // === View ===
    /// Pixels per maze cell
    pub cell_size: f64,
    /// View width in pixels
    pub view_width: u32,
    /// View height in pixels
    pub view_height: u32,

    // === Player ===
    /// Pixels moved per step
    pub player_speed: f64,
    /// Side of the player marker in pixels; the view centres on it
    pub player_size: u32,
    /// Start X in pixels
    pub player_start_x: f64,
    /// Start Y in pixels
    pub player_start_y: f64,

    // === Session ===
    /// Ticks per second (0 = unthrottled)
    pub tick_rate: u32,
    /// Number of ticks to simulate
    pub ticks: u32,
    /// Chunks warmed around the start position
    pub prefetch_radius: u32,
}

impl Default for MazeConfig {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        Self {
            seed: generator.seed,
            chunk_size: generator.chunk_size,
            noise_frequency: generator.frequency,
            threshold: generator.threshold,
            smoothing_window: generator.smoothing_window,
            noise_kind: generator.noise_kind,

            cell_size: 20.0,
            view_width: 800,
            view_height: 600,

            player_speed: 8.0,
            player_size: 15,
            player_start_x: 30.0,
            player_start_y: 30.0,

            tick_rate: 60,
            ticks: 600,
            prefetch_radius: 2,
        }
    }
}

impl MazeConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        let mut generator = self.generator_config();
        generator.validate();
        self.chunk_size = generator.chunk_size;
        self.noise_frequency = generator.frequency;
        self.threshold = generator.threshold;
        self.smoothing_window = generator.smoothing_window;

        if !self.cell_size.is_finite() {
            self.cell_size = Self::default().cell_size;
        }
        self.cell_size = self.cell_size.clamp(1.0, 256.0);
        self.view_width = self.view_width.clamp(64, 7680);
        self.view_height = self.view_height.clamp(64, 4320);

        if !self.player_speed.is_finite() {
            self.player_speed = Self::default().player_speed;
        }
        self.player_speed = self.player_speed.clamp(0.5, self.cell_size);
        self.player_size = self.player_size.min(self.view_width.min(self.view_height));
        if !self.player_start_x.is_finite() || !self.player_start_y.is_finite() {
            let defaults = Self::default();
            self.player_start_x = defaults.player_start_x;
            self.player_start_y = defaults.player_start_y;
        }

        self.tick_rate = self.tick_rate.min(1000);
        self.prefetch_radius = self.prefetch_radius.min(16);
    }

    /// Generation parameters for the chunk generator.
    #[must_use]
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            seed: self.seed,
            chunk_size: self.chunk_size,
            frequency: self.noise_frequency,
            threshold: self.threshold,
            smoothing_window: self.smoothing_window,
            noise_kind: self.noise_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = MazeConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.chunk_size, 4);
        assert_eq!(config.smoothing_window, 4);
        assert!((config.cell_size - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.generator_config(), GeneratorConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = MazeConfig::default();

        config.chunk_size = 0;
        config.cell_size = f64::NAN;
        config.player_speed = 500.0;
        config.threshold = -1.0;
        config.player_size = 10_000;

        config.validate();

        assert_eq!(config.chunk_size, 1);
        assert!((config.cell_size - 20.0).abs() < f64::EPSILON);
        assert!((config.player_speed - 20.0).abs() < f64::EPSILON);
        assert!(config.threshold.abs() < f64::EPSILON);
        assert_eq!(config.player_size, 600);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("maze.toml");

        let mut config = MazeConfig::default();
        config.seed = 7;
        config.chunk_size = 16;
        config.noise_kind = NoiseKind::Perlin;

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = MazeConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = MazeConfig::load_from("/nonexistent/path/mazeworld.toml");
        assert_eq!(config, MazeConfig::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("partial.toml");
        fs::write(&config_path, "seed = 99\nnoise_kind = \"perlin\"\n").expect("write failed");

        let loaded = MazeConfig::load_from(&config_path);
        assert_eq!(loaded.seed, 99);
        assert_eq!(loaded.noise_kind, NoiseKind::Perlin);
        assert_eq!(loaded.chunk_size, 4);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "seed = \"not a number\"").expect("write failed");

        assert_eq!(MazeConfig::load_from(&config_path), MazeConfig::default());
    }
}

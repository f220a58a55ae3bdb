//! Procedural maze generation.

use maze_common::{ChunkCoord, LocalCoord, WorldCoord};
use serde::{Deserialize, Serialize};

use crate::chunk::{CellState, Chunk};
use crate::noise_field::{NoiseKind, NoiseSynthesizer};
use crate::smoothing::median_filter;

/// Largest supported chunk side, bounded by the `u16` local coordinates.
pub const MAX_CHUNK_SIZE: u32 = 1024;

/// Anything that can turn a chunk coordinate into a finished chunk.
///
/// The streaming service only talks to this trait, so it can run any
/// generator (or an instrumented one in tests) on its worker thread.
pub trait ChunkSource: Send + Sync {
    /// Side length of the chunks this source produces.
    fn chunk_size(&self) -> u32;

    /// Builds the chunk at `coord`. Must be deterministic.
    fn generate(&self, coord: ChunkCoord) -> Chunk;
}

/// World generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// World seed
    pub seed: u32,
    /// Chunk size in cells
    pub chunk_size: u32,
    /// Noise input scale per world cell (smaller = wider corridors)
    pub frequency: f64,
    /// Cells with `|noise| >= threshold` become walls
    pub threshold: f64,
    /// Side of the median filter window (1 disables smoothing)
    pub smoothing_window: u32,
    /// Noise algorithm
    pub noise_kind: NoiseKind,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            chunk_size: 4,
            frequency: 0.05,
            threshold: 0.2,
            smoothing_window: 4,
            noise_kind: NoiseKind::OpenSimplex,
        }
    }
}

impl GeneratorConfig {
    /// Clamps values into the ranges the generator supports.
    pub fn validate(&mut self) {
        self.chunk_size = self.chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self.smoothing_window = self.smoothing_window.clamp(1, 16);
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            self.frequency = Self::default().frequency;
        }
        if !self.threshold.is_finite() {
            self.threshold = Self::default().threshold;
        }
        self.threshold = self.threshold.clamp(0.0, 1.0);
    }
}

/// Noise-threshold maze generator.
#[derive(Debug, Clone)]
pub struct ChunkGenerator {
    /// Configuration
    config: GeneratorConfig,
    /// Terrain noise
    noise: NoiseSynthesizer,
}

impl ChunkGenerator {
    /// Creates a new generator with the given config.
    #[must_use]
    pub fn new(mut config: GeneratorConfig) -> Self {
        config.validate();
        let noise = NoiseSynthesizer::new(config.seed, config.noise_kind);
        Self { config, noise }
    }

    /// Creates a generator with default config.
    #[must_use]
    pub fn with_seed(seed: u32) -> Self {
        Self::new(GeneratorConfig {
            seed,
            ..Default::default()
        })
    }

    /// Returns the generator configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Noise input point for a world cell.
    ///
    /// Depends only on the world position, which keeps the raw field
    /// seamless across chunk borders.
    #[must_use]
    pub fn noise_input(&self, world: WorldCoord) -> [f64; 2] {
        [
            world.x as f64 * self.config.frequency,
            world.y as f64 * self.config.frequency,
        ]
    }

    /// Raw noise value at a world cell.
    #[must_use]
    pub fn sample_world(&self, world: WorldCoord) -> f64 {
        let [x, y] = self.noise_input(world);
        self.noise.sample(x, y)
    }

    /// Raw noise values for every cell of a chunk, row-major.
    #[must_use]
    pub fn raw_field(&self, coord: ChunkCoord) -> Vec<f64> {
        let size = self.config.chunk_size;
        (0..(size * size) as usize)
            .map(|index| {
                let local = LocalCoord::from_index(index, size);
                self.sample_world(coord.world_of(local, size))
            })
            .collect()
    }

    /// Thresholds a noise value. Bands near zero become corridors.
    #[must_use]
    pub fn classify(&self, value: f64) -> CellState {
        if value.abs() >= self.config.threshold {
            CellState::Blocked
        } else {
            CellState::Walkable
        }
    }

    /// Generates a chunk at the given coordinate.
    ///
    /// Smoothing sees only this chunk's cells, so walls may not line up
    /// exactly across chunk borders.
    #[must_use]
    pub fn generate_chunk(&self, coord: ChunkCoord) -> Chunk {
        let size = self.config.chunk_size;
        let binary: Vec<CellState> = self
            .raw_field(coord)
            .into_iter()
            .map(|value| self.classify(value))
            .collect();
        let smoothed = median_filter(&binary, size, self.config.smoothing_window);
        Chunk::from_fn(coord, size, |local| smoothed[local.to_index(size)])
    }
}

impl ChunkSource for ChunkGenerator {
    fn chunk_size(&self) -> u32 {
        self.config.chunk_size
    }

    fn generate(&self, coord: ChunkCoord) -> Chunk {
        self.generate_chunk(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_deterministic() {
        let gen1 = ChunkGenerator::with_seed(42);
        let gen2 = ChunkGenerator::with_seed(42);

        for coord in [ChunkCoord::new(0, 0), ChunkCoord::new(-3, 7)] {
            assert_eq!(gen1.generate_chunk(coord), gen2.generate_chunk(coord));
        }
    }

    #[test]
    fn test_different_seeds_different_terrain() {
        let config = GeneratorConfig {
            chunk_size: 32,
            smoothing_window: 1,
            ..Default::default()
        };
        let gen1 = ChunkGenerator::new(GeneratorConfig { seed: 42, ..config.clone() });
        let gen2 = ChunkGenerator::new(GeneratorConfig { seed: 999, ..config });

        let coord = ChunkCoord::new(2, 1);
        assert_ne!(gen1.raw_field(coord), gen2.raw_field(coord));
    }

    #[test]
    fn test_raw_field_is_seamless() {
        let generator = ChunkGenerator::with_seed(42);
        let size = generator.config().chunk_size;
        let coord = ChunkCoord::new(-2, 5);
        let field = generator.raw_field(coord);

        for (index, value) in field.iter().enumerate() {
            let local = LocalCoord::from_index(index, size);
            let world = coord.world_of(local, size);
            assert_eq!(value.to_bits(), generator.sample_world(world).to_bits());
        }

        // The cell just right of this chunk's last column is the first
        // column of the east neighbour; both chunks must agree on the
        // noise input for their shared edge.
        let east = ChunkCoord::new(coord.x + 1, coord.y);
        let edge = coord.world_of(LocalCoord::new(size as u16 - 1, 0), size);
        let next = east.world_of(LocalCoord::new(0, 0), size);
        assert_eq!(next.x, edge.x + 1);
        let [ex, _] = generator.noise_input(edge);
        let [nx, _] = generator.noise_input(next);
        assert!((nx - ex - generator.config().frequency).abs() < 1e-12);
    }

    #[test]
    fn test_classify_threshold() {
        let generator = ChunkGenerator::with_seed(1);
        assert_eq!(generator.classify(0.0), CellState::Walkable);
        assert_eq!(generator.classify(0.199), CellState::Walkable);
        assert_eq!(generator.classify(-0.199), CellState::Walkable);
        assert_eq!(generator.classify(0.2), CellState::Blocked);
        assert_eq!(generator.classify(-0.75), CellState::Blocked);
    }

    #[test]
    fn test_generated_chunk_is_full() {
        let generator = ChunkGenerator::with_seed(42);
        let chunk = generator.generate_chunk(ChunkCoord::new(0, 0));
        assert_eq!(chunk.size(), 4);
        assert_eq!(chunk.cells().len(), 16);
    }

    #[test]
    fn test_validate_clamps() {
        let mut config = GeneratorConfig {
            chunk_size: 0,
            frequency: f64::NAN,
            threshold: 3.0,
            smoothing_window: 0,
            ..Default::default()
        };
        config.validate();
        assert_eq!(config.chunk_size, 1);
        assert_eq!(config.smoothing_window, 1);
        assert!((config.frequency - 0.05).abs() < f64::EPSILON);
        assert!((config.threshold - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_large_world_has_open_and_closed_space() {
        let generator = ChunkGenerator::new(GeneratorConfig {
            chunk_size: 64,
            ..Default::default()
        });
        let chunk = generator.generate_chunk(ChunkCoord::new(0, 0));
        let blocked = chunk.blocked_count();
        assert!(blocked > 0, "no walls generated");
        assert!(blocked < chunk.cells().len(), "no corridors generated");
    }
}

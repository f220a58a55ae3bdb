//! Seeded coherent noise used as the raw terrain field.

use noise::{NoiseFn, OpenSimplex, Perlin};
use serde::{Deserialize, Serialize};

/// Coherent noise algorithm backing the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// OpenSimplex gradient noise
    #[default]
    OpenSimplex,
    /// Classic Perlin gradient noise
    Perlin,
}

#[derive(Clone)]
enum Backend {
    OpenSimplex(OpenSimplex),
    Perlin(Perlin),
}

/// Deterministic 2D scalar field parameterized by a seed.
///
/// Output lies roughly in `[-1, 1]` and is continuous in its inputs. The
/// synthesizer holds only immutable permutation tables, so a single
/// instance can be sampled from any number of threads.
#[derive(Clone)]
pub struct NoiseSynthesizer {
    seed: u32,
    kind: NoiseKind,
    backend: Backend,
}

impl NoiseSynthesizer {
    /// Creates a synthesizer for the given seed and algorithm.
    #[must_use]
    pub fn new(seed: u32, kind: NoiseKind) -> Self {
        let backend = match kind {
            NoiseKind::OpenSimplex => Backend::OpenSimplex(OpenSimplex::new(seed)),
            NoiseKind::Perlin => Backend::Perlin(Perlin::new(seed)),
        };
        Self {
            seed,
            kind,
            backend,
        }
    }

    /// Samples the field at a point.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        match &self.backend {
            Backend::OpenSimplex(n) => n.get([x, y]),
            Backend::Perlin(n) => n.get([x, y]),
        }
    }

    /// Returns the seed.
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// Returns the algorithm.
    #[must_use]
    pub const fn kind(&self) -> NoiseKind {
        self.kind
    }
}

impl std::fmt::Debug for NoiseSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseSynthesizer")
            .field("seed", &self.seed)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

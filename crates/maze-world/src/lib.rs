//! # Maze World
//!
//! Infinite procedural maze for Mazeworld.
//!
//! This crate handles:
//! - Seeded noise synthesis
//! - Chunk generation (thresholding and median smoothing)
//! - Background generation with an append-only chunk cache
//! - The world query façade used by movement and rendering

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod cache;
pub mod chunk;
pub mod generation;
pub mod noise_field;
pub mod query;
pub mod smoothing;
pub mod streaming;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cache::*;
    pub use crate::chunk::*;
    pub use crate::generation::*;
    pub use crate::noise_field::*;
    pub use crate::query::*;
    pub use crate::streaming::*;
}

pub use prelude::*;

//! # Maze Common
//!
//! Common types shared by the Mazeworld crates:
//! - Coordinate types (world, chunk, local)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coords_conversion() {
        let world = WorldCoord::new(100, 200);
        let chunk = world.try_to_chunk_coord(32).expect("in range");
        let local = world.to_local_coord(32);

        assert_eq!(chunk, ChunkCoord::new(3, 6));
        assert_eq!(local, LocalCoord::new(4, 8));
    }

    #[test]
    fn test_error_display() {
        let err = MazeError::InvalidCoordinate { x: 1.5, y: f64::NAN };
        assert_eq!(err.to_string(), "Invalid coordinate (1.5, NaN)");
    }
}

//! Coordinate types for world, chunk, and local positions.
//!
//! World coordinates may be negative, so every conversion uses floor
//! division (`div_euclid`) and the non-negative modulus (`rem_euclid`).

use serde::{Deserialize, Serialize};

use crate::error::{MazeError, MazeResult};

/// World coordinate of a single maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldCoord {
    /// X coordinate in cell space
    pub x: i64,
    /// Y coordinate in cell space
    pub y: i64,
}

impl WorldCoord {
    /// Creates a new world coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Converts a pixel-space position into the cell that contains it.
    ///
    /// Rejects non-finite positions, a non-positive cell size, and results
    /// that do not fit the cell grid.
    pub fn from_pixels(px: f64, py: f64, cell_size: f64) -> MazeResult<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(MazeError::InvalidCellSize(cell_size));
        }
        let invalid = || MazeError::InvalidCoordinate { x: px, y: py };
        let x = pixel_to_cell(px, cell_size).ok_or_else(invalid)?;
        let y = pixel_to_cell(py, cell_size).ok_or_else(invalid)?;
        Ok(Self { x, y })
    }

    /// Converts to the coordinate of the chunk containing this cell.
    ///
    /// Fails with [`MazeError::InvalidCoordinate`] when the chunk lies
    /// outside the `i32` chunk grid.
    pub fn try_to_chunk_coord(self, chunk_size: u32) -> MazeResult<ChunkCoord> {
        let size = i64::from(chunk_size);
        let invalid = || MazeError::InvalidCoordinate {
            x: self.x as f64,
            y: self.y as f64,
        };
        let x = i32::try_from(self.x.div_euclid(size)).map_err(|_| invalid())?;
        let y = i32::try_from(self.y.div_euclid(size)).map_err(|_| invalid())?;
        Ok(ChunkCoord { x, y })
    }

    /// Converts to local coordinate within a chunk.
    #[must_use]
    pub const fn to_local_coord(self, chunk_size: u32) -> LocalCoord {
        let size = chunk_size as i64;
        LocalCoord {
            x: self.x.rem_euclid(size) as u16,
            y: self.y.rem_euclid(size) as u16,
        }
    }
}

fn pixel_to_cell(value: f64, cell_size: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let cell = (value / cell_size).floor();
    // i64::MAX is not representable as f64; the bound is exclusive.
    if cell < i64::MIN as f64 || cell >= i64::MAX as f64 {
        return None;
    }
    Some(cell as i64)
}

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// X coordinate in chunk space
    pub x: i32,
    /// Y coordinate in chunk space
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts to world coordinate (top-left corner of chunk).
    #[must_use]
    pub const fn to_world_coord(self, chunk_size: u32) -> WorldCoord {
        WorldCoord {
            x: (self.x as i64) * (chunk_size as i64),
            y: (self.y as i64) * (chunk_size as i64),
        }
    }

    /// Returns the world coordinate of a local cell of this chunk.
    #[must_use]
    pub const fn world_of(self, local: LocalCoord, chunk_size: u32) -> WorldCoord {
        let origin = self.to_world_coord(chunk_size);
        WorldCoord {
            x: origin.x + local.x as i64,
            y: origin.y + local.y as i64,
        }
    }

    /// Iterates the chunks in the square of the given radius around `self`,
    /// row by row, starting at the top-left corner.
    pub fn square(self, radius: u32) -> impl Iterator<Item = ChunkCoord> {
        let r = radius as i32;
        (-r..=r).flat_map(move |dy| (-r..=r).map(move |dx| ChunkCoord::new(self.x + dx, self.y + dy)))
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Local coordinate within a chunk (0 to chunk_size-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalCoord {
    /// X coordinate within chunk
    pub x: u16,
    /// Y coordinate within chunk
    pub y: u16,
}

impl LocalCoord {
    /// Creates a new local coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Converts to linear index for array access.
    #[must_use]
    pub const fn to_index(self, chunk_size: u32) -> usize {
        (self.y as usize) * (chunk_size as usize) + (self.x as usize)
    }

    /// Creates from linear index.
    #[must_use]
    pub const fn from_index(index: usize, chunk_size: u32) -> Self {
        let size = chunk_size as usize;
        Self {
            x: (index % size) as u16,
            y: (index / size) as u16,
        }
    }
}

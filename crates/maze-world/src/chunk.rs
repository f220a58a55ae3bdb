//! Chunk data structure.

use maze_common::{ChunkCoord, LocalCoord};
use serde::{Deserialize, Serialize};

/// State of a single generated maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum CellState {
    /// Open floor
    #[default]
    Walkable,
    /// Wall
    Blocked,
}

impl CellState {
    /// Returns true for walls.
    #[must_use]
    pub const fn is_blocked(self) -> bool {
        matches!(self, Self::Blocked)
    }

    /// ASCII glyph used by debug dumps.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Walkable => '.',
            Self::Blocked => '#',
        }
    }
}

/// A square tile of generated cells.
///
/// Chunks are built in one piece by the generator and never modified
/// afterwards, which is what lets the cache hand out shared references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk coordinate
    coord: ChunkCoord,
    /// Chunk size (width and height in cells)
    size: u32,
    /// Cell data (size × size cells, row-major)
    cells: Vec<CellState>,
}

impl Chunk {
    /// Creates a chunk where every cell has the same state.
    #[must_use]
    pub fn filled(coord: ChunkCoord, size: u32, state: CellState) -> Self {
        let cell_count = (size * size) as usize;
        Self {
            coord,
            size,
            cells: vec![state; cell_count],
        }
    }

    /// Creates a chunk by evaluating `f` for each local cell.
    #[must_use]
    pub fn from_fn(coord: ChunkCoord, size: u32, mut f: impl FnMut(LocalCoord) -> CellState) -> Self {
        let cell_count = (size * size) as usize;
        let cells = (0..cell_count)
            .map(|index| f(LocalCoord::from_index(index, size)))
            .collect();
        Self { coord, size, cells }
    }

    /// Returns the chunk coordinate.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns the chunk size.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Gets a cell at local coordinates.
    #[must_use]
    pub fn get_cell(&self, local: LocalCoord) -> Option<CellState> {
        if u32::from(local.x) >= self.size || u32::from(local.y) >= self.size {
            return None;
        }
        self.cells.get(local.to_index(self.size)).copied()
    }

    /// Returns a slice of all cells.
    #[must_use]
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// Number of wall cells.
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_blocked()).count()
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.size.max(1) as usize) {
            let line: String = row.iter().map(|c| c.glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_chunk() {
        let chunk = Chunk::filled(ChunkCoord::new(1, 2), 4, CellState::Blocked);
        assert_eq!(chunk.coord(), ChunkCoord::new(1, 2));
        assert_eq!(chunk.cells().len(), 16);
        assert_eq!(chunk.blocked_count(), 16);
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let chunk = Chunk::from_fn(ChunkCoord::new(0, 0), 3, |local| {
            if local.y == 0 {
                CellState::Blocked
            } else {
                CellState::Walkable
            }
        });
        assert_eq!(chunk.get_cell(LocalCoord::new(2, 0)), Some(CellState::Blocked));
        assert_eq!(chunk.get_cell(LocalCoord::new(0, 1)), Some(CellState::Walkable));
        assert_eq!(chunk.to_string(), "###\n...\n...\n");
    }

    #[test]
    fn test_get_cell_out_of_bounds() {
        let chunk = Chunk::filled(ChunkCoord::new(0, 0), 4, CellState::Walkable);
        assert_eq!(chunk.get_cell(LocalCoord::new(4, 0)), None);
        assert_eq!(chunk.get_cell(LocalCoord::new(0, 4)), None);
    }
}

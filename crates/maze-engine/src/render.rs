//! Headless ASCII rendering of the visible maze.

use maze_common::WorldCoord;
use maze_world::{CellQuery, VisibleGrid};

/// Glyph drawn at the player's cell.
pub const PLAYER_GLYPH: char = '@';

/// Draws the grid, one text line per row. Placeholder cells are drawn as
/// `?` so pending chunks are visible in the dump.
#[must_use]
pub fn render_ascii(grid: &VisibleGrid, player: Option<WorldCoord>) -> String {
    let mut out = String::with_capacity(grid.cells.len() + grid.viewport.height as usize);
    for (row_index, row) in grid.rows().enumerate() {
        let y = grid.viewport.start_y + row_index as i64;
        for (col_index, cell) in row.iter().enumerate() {
            let x = grid.viewport.start_x + col_index as i64;
            if player == Some(WorldCoord::new(x, y)) {
                out.push(PLAYER_GLYPH);
            } else {
                out.push(cell.glyph());
            }
        }
        out.push('\n');
    }
    out
}

/// Number of cells still waiting on generation.
#[must_use]
pub fn placeholder_count(grid: &VisibleGrid) -> usize {
    grid.cells
        .iter()
        .filter(|c| **c == CellQuery::Placeholder)
        .count()
}

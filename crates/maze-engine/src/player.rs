//! Player movement against the maze.

use maze_common::{MazeResult, WorldCoord};
use maze_world::WorldQuery;

/// Result of a movement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Position updated
    Moved,
    /// Target cell is a wall; position unchanged
    Blocked,
}

/// Player position in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    /// X position in pixels
    pub x: f64,
    /// Y position in pixels
    pub y: f64,
    /// Pixels moved per step
    pub speed: f64,
}

impl Player {
    /// Creates a player at a pixel position.
    #[must_use]
    pub const fn new(x: f64, y: f64, speed: f64) -> Self {
        Self { x, y, speed }
    }

    /// Cell currently containing the player.
    pub fn cell(&self, cell_size: f64) -> MazeResult<WorldCoord> {
        WorldCoord::from_pixels(self.x, self.y, cell_size)
    }

    /// Steps one `speed` length along `(dx, dy)` unless the target cell is
    /// a wall. Cells that are still generating count as open.
    pub fn try_move(&mut self, dx: f64, dy: f64, world: &WorldQuery, cell_size: f64) -> MazeResult<MoveOutcome> {
        let new_x = self.x + dx * self.speed;
        let new_y = self.y + dy * self.speed;

        if !world.cell_at_pixel(new_x, new_y, cell_size)?.is_passable() {
            return Ok(MoveOutcome::Blocked);
        }

        self.x = new_x;
        self.y = new_y;
        Ok(MoveOutcome::Moved)
    }
}

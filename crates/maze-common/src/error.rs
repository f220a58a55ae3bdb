//! Error types for Mazeworld.

use thiserror::Error;

/// Top-level error type for maze operations.
///
/// A chunk that is still generating is not an error; it is reported as a
/// pending request or a placeholder cell.
#[derive(Debug, Error)]
pub enum MazeError {
    /// Position cannot be mapped onto the cell grid
    #[error("Invalid coordinate ({x}, {y})")]
    InvalidCoordinate {
        /// X position as given
        x: f64,
        /// Y position as given
        y: f64,
    },

    /// Cell size must be finite and positive
    #[error("Invalid cell size: {0}")]
    InvalidCellSize(f64),

    /// Generation worker thread could not be started
    #[error("Failed to spawn generation worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// Generation worker panicked before it could be joined
    #[error("Generation worker panicked")]
    WorkerPanicked,

    /// Generation service has been shut down
    #[error("Generation service stopped")]
    ServiceStopped,
}

/// Result type alias for maze operations.
pub type MazeResult<T> = Result<T, MazeError>;

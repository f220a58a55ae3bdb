//! World query façade used by movement and rendering.
//!
//! Translates world cells into chunk lookups and applies the placeholder
//! policy: a cell whose chunk is still generating is reported as
//! [`CellQuery::Placeholder`], which is passable. Ungenerated space never
//! blocks the player.

use std::sync::Arc;

use maze_common::{MazeError, MazeResult, WorldCoord};

use crate::chunk::CellState;
use crate::streaming::{ChunkRequest, GenerationService};

/// What the world reports for a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellQuery {
    /// Generated open floor
    Walkable,
    /// Generated wall
    Wall,
    /// Chunk not generated yet; treated as open floor
    Placeholder,
}

impl CellQuery {
    /// Returns true unless the cell is a generated wall.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// ASCII glyph for headless rendering.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Walkable => '.',
            Self::Wall => '#',
            Self::Placeholder => '?',
        }
    }
}

impl From<CellState> for CellQuery {
    fn from(state: CellState) -> Self {
        match state {
            CellState::Walkable => Self::Walkable,
            CellState::Blocked => Self::Wall,
        }
    }
}

/// Rectangle of world cells visible to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Leftmost visible cell
    pub start_x: i64,
    /// Topmost visible cell
    pub start_y: i64,
    /// Width in cells
    pub width: u32,
    /// Height in cells
    pub height: u32,
}

impl Viewport {
    /// Computes the visible cells for a view whose top-left pixel is
    /// `(left, top)`. One extra cell is kept on every side so partially
    /// visible cells at the borders are included.
    pub fn from_camera(left: f64, top: f64, view_width: u32, view_height: u32, cell_size: f64) -> MazeResult<Self> {
        let corner = WorldCoord::from_pixels(left, top, cell_size)?;
        let width = (f64::from(view_width) / cell_size) as u32 + 2;
        let height = (f64::from(view_height) / cell_size) as u32 + 2;
        let start = |cell: i64, extent: u32| {
            cell.checked_sub(1)
                .filter(|start| start.checked_add(i64::from(extent)).is_some())
        };
        match (start(corner.x, width), start(corner.y, height)) {
            (Some(start_x), Some(start_y)) => Ok(Self {
                start_x,
                start_y,
                width,
                height,
            }),
            _ => Err(MazeError::InvalidCoordinate { x: left, y: top }),
        }
    }

    /// Computes the viewport that keeps a square marker of `marker_size`
    /// pixels, drawn with its top-left corner at `(px, py)`, centred in the
    /// view. Half sizes are rounded down.
    pub fn centered_on(
        px: f64,
        py: f64,
        marker_size: u32,
        view_width: u32,
        view_height: u32,
        cell_size: f64,
    ) -> MazeResult<Self> {
        let half_marker = f64::from(marker_size / 2);
        let left = px + half_marker - f64::from(view_width / 2);
        let top = py + half_marker - f64::from(view_height / 2);
        Self::from_camera(left, top, view_width, view_height, cell_size)
    }

    /// Iterates the visible world cells row by row.
    pub fn cells(&self) -> impl Iterator<Item = WorldCoord> + '_ {
        (0..i64::from(self.height)).flat_map(move |dy| {
            (0..i64::from(self.width)).map(move |dx| WorldCoord::new(self.start_x + dx, self.start_y + dy))
        })
    }

    /// Checks if a world cell is inside the viewport.
    #[must_use]
    pub fn contains(&self, world: WorldCoord) -> bool {
        let dx = world.x - self.start_x;
        let dy = world.y - self.start_y;
        (0..i64::from(self.width)).contains(&dx) && (0..i64::from(self.height)).contains(&dy)
    }
}

/// Cell states for every cell of a viewport, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleGrid {
    /// Area covered
    pub viewport: Viewport,
    /// One entry per visible cell
    pub cells: Vec<CellQuery>,
}

impl VisibleGrid {
    /// Gets the state of a world cell inside the viewport.
    #[must_use]
    pub fn get(&self, world: WorldCoord) -> Option<CellQuery> {
        if !self.viewport.contains(world) {
            return None;
        }
        let dx = (world.x - self.viewport.start_x) as usize;
        let dy = (world.y - self.viewport.start_y) as usize;
        self.cells.get(dy * self.viewport.width as usize + dx).copied()
    }

    /// Rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[CellQuery]> {
        self.cells.chunks(self.viewport.width.max(1) as usize)
    }
}

/// Public entry point for gameplay code asking about world cells.
#[derive(Clone)]
pub struct WorldQuery {
    service: Arc<GenerationService>,
    chunk_size: u32,
}

impl WorldQuery {
    /// Creates a façade over a generation service.
    #[must_use]
    pub fn new(service: Arc<GenerationService>) -> Self {
        let chunk_size = service.chunk_size();
        Self {
            service,
            chunk_size,
        }
    }

    /// Returns the underlying service.
    #[must_use]
    pub fn service(&self) -> &Arc<GenerationService> {
        &self.service
    }

    /// Returns the state of the cell at `(world_x, world_y)`.
    ///
    /// Queues the enclosing chunk if it is unknown and answers
    /// [`CellQuery::Placeholder`] until it is committed.
    pub fn cell_state(&self, world_x: i64, world_y: i64) -> MazeResult<CellQuery> {
        self.cell_at(WorldCoord::new(world_x, world_y))
    }

    /// Returns the state of a world cell.
    ///
    /// Cells whose chunk falls outside the chunk grid are rejected before
    /// any chunk is requested.
    pub fn cell_at(&self, world: WorldCoord) -> MazeResult<CellQuery> {
        let chunk_coord = world.try_to_chunk_coord(self.chunk_size)?;
        let local = world.to_local_coord(self.chunk_size);

        match self.service.request(chunk_coord)? {
            ChunkRequest::Ready(chunk) => chunk
                .get_cell(local)
                .map(CellQuery::from)
                .ok_or(MazeError::InvalidCoordinate {
                    x: world.x as f64,
                    y: world.y as f64,
                }),
            ChunkRequest::Pending => Ok(CellQuery::Placeholder),
        }
    }

    /// Returns the state of the cell containing a pixel position.
    ///
    /// Non-finite positions are rejected before any chunk is requested.
    pub fn cell_at_pixel(&self, px: f64, py: f64, cell_size: f64) -> MazeResult<CellQuery> {
        let world = WorldCoord::from_pixels(px, py, cell_size)?;
        self.cell_at(world)
    }

    /// Checks if the cell can be entered.
    pub fn is_passable(&self, world: WorldCoord) -> MazeResult<bool> {
        Ok(self.cell_at(world)?.is_passable())
    }

    /// Queries every cell in a viewport.
    pub fn visible_cells(&self, viewport: &Viewport) -> MazeResult<VisibleGrid> {
        let cells = viewport
            .cells()
            .map(|world| self.cell_at(world))
            .collect::<MazeResult<Vec<_>>>()?;
        Ok(VisibleGrid {
            viewport: *viewport,
            cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::ChunkGenerator;
    use maze_common::ChunkCoord;
    use proptest::prelude::*;
    use std::time::Duration;

    fn query() -> WorldQuery {
        WorldQuery::new(Arc::new(GenerationService::new(ChunkGenerator::with_seed(42))))
    }

    #[test]
    fn test_unknown_cell_is_placeholder() {
        let query = query();
        assert_eq!(query.cell_state(0, 0).expect("query failed"), CellQuery::Placeholder);
        assert!(query.is_passable(WorldCoord::new(0, 0)).expect("query failed"));
    }

    #[test]
    fn test_ready_cell_matches_chunk() {
        let query = query();
        let world = WorldCoord::new(-5, 6);
        query.cell_at(world).expect("query failed");

        let chunk_coord = world.try_to_chunk_coord(4).expect("in range");
        assert_eq!(chunk_coord, ChunkCoord::new(-2, 1));
        let chunk = query
            .service()
            .wait_for(chunk_coord, Duration::from_secs(5))
            .expect("chunk not generated");

        let expected = chunk
            .get_cell(world.to_local_coord(4))
            .map(CellQuery::from)
            .expect("local cell in range");
        assert_eq!(query.cell_at(world).expect("query failed"), expected);
        assert_ne!(expected, CellQuery::Placeholder);
    }

    #[test]
    fn test_pixel_query_rejects_nan() {
        let query = query();
        let result = query.cell_at_pixel(f64::NAN, 10.0, 20.0);
        assert!(matches!(result, Err(MazeError::InvalidCoordinate { .. })));
        assert_eq!(query.service().stats().requests, 0);
    }

    #[test]
    fn test_cell_beyond_chunk_grid_is_rejected() {
        let query = query();
        query.cell_state(0, 0).expect("query failed");
        query
            .service()
            .wait_for(ChunkCoord::new(0, 0), Duration::from_secs(5))
            .expect("chunk not generated");

        // Would land on chunk (0, 0) if the chunk index wrapped.
        let far = query.cell_state(1 << 34, 0);
        assert!(matches!(far, Err(MazeError::InvalidCoordinate { .. })));
        let far_pixel = query.cell_at_pixel((1i64 << 34) as f64 * 20.0, 0.0, 20.0);
        assert!(matches!(far_pixel, Err(MazeError::InvalidCoordinate { .. })));
        assert_eq!(query.service().stats().requests, 1);
    }

    #[test]
    fn test_viewport_matches_draw_window() {
        // 800x600 view, 20px cells, centred on (30, 30).
        let viewport = Viewport::centered_on(30.0, 30.0, 15, 800, 600, 20.0).expect("valid viewport");
        assert_eq!(viewport.start_x, -20);
        assert_eq!(viewport.start_y, -15);
        assert_eq!(viewport.width, 42);
        assert_eq!(viewport.height, 32);
        assert!(viewport.contains(WorldCoord::new(1, 1)));
        assert!(!viewport.contains(WorldCoord::new(22, 1)));
    }

    #[test]
    fn test_viewport_accounts_for_marker_size() {
        // Camera left edge is 15 + 7 - 400 = -378, i.e. cell -19.
        let viewport = Viewport::centered_on(15.0, 15.0, 15, 800, 600, 20.0).expect("valid viewport");
        assert_eq!(viewport.start_x, -20);
        assert_eq!(viewport.start_y, -15);

        // Without a marker the left edge is -385, one cell further left.
        let bare = Viewport::centered_on(15.0, 15.0, 0, 800, 600, 20.0).expect("valid viewport");
        assert_eq!(bare.start_x, -21);
    }

    #[test]
    fn test_viewport_at_grid_edge_is_rejected() {
        let result = Viewport::from_camera(i64::MIN as f64, 0.0, 800, 600, 1.0);
        assert!(matches!(result, Err(MazeError::InvalidCoordinate { .. })));
    }

    #[test]
    fn test_visible_cells_never_walls_before_generation() {
        let query = query();
        let viewport = Viewport {
            start_x: -3,
            start_y: -3,
            width: 6,
            height: 6,
        };
        let grid = query.visible_cells(&viewport).expect("query failed");
        assert_eq!(grid.cells.len(), 36);
        assert_eq!(grid.rows().count(), 6);
        assert!(grid.cells.iter().all(|c| *c == CellQuery::Placeholder));
        assert_eq!(grid.get(WorldCoord::new(2, 2)), Some(CellQuery::Placeholder));
        assert_eq!(grid.get(WorldCoord::new(3, 2)), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_fresh_chunk_never_reports_false_walls(x in -10_000i64..10_000, y in -10_000i64..10_000) {
            let generator = ChunkGenerator::with_seed(42);
            let query = query();
            prop_assert_eq!(query.cell_state(x, y).expect("query failed"), CellQuery::Placeholder);

            // While the worker catches up each cell is either a placeholder
            // or exactly what the generator produces.
            let chunk_coord = WorldCoord::new(x, y).try_to_chunk_coord(4).expect("in range");
            let expected = generator.generate_chunk(chunk_coord);
            let origin = chunk_coord.to_world_coord(4);
            for dy in 0..4 {
                for dx in 0..4 {
                    let world = WorldCoord::new(origin.x + dx, origin.y + dy);
                    let state = query.cell_at(world).expect("query failed");
                    if state != CellQuery::Placeholder {
                        let cell = expected.get_cell(world.to_local_coord(4)).expect("local cell in range");
                        prop_assert_eq!(state, CellQuery::from(cell));
                    }
                }
            }
        }
    }
}

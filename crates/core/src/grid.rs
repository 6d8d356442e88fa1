//! Grid module - the 10x20 playfield
//!
//! Each cell is either empty or filled with a color. Cells are stored in a flat
//! row-major array for cache locality; the grid never changes size.
//! Coordinates are `(row, col)`: row 0 is the top, col 0 the left edge.

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::types::{Cell, GRID_HEIGHT, GRID_WIDTH};

/// Total number of cells on the grid
const GRID_SIZE: usize = GRID_WIDTH * GRID_HEIGHT;

/// Errors raised by direct cell access
///
/// These signal a caller bug (bad shape or position arithmetic), not a game event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the grid")]
    OutOfBounds { row: i32, col: i32 },
}

/// The playfield - 20 rows x 10 columns using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    /// Row-major cells (row * WIDTH + col)
    cells: [Cell; GRID_SIZE],
}

impl Grid {
    /// Create a grid with every cell empty
    pub fn empty() -> Self {
        Self {
            cells: [Cell::Empty; GRID_SIZE],
        }
    }

    /// Build a grid from a 2D array of rows (top row first)
    pub fn from_rows(rows: [[Cell; GRID_WIDTH]; GRID_HEIGHT]) -> Self {
        let mut grid = Self::empty();
        for (r, row) in rows.iter().enumerate() {
            let start = r * GRID_WIDTH;
            grid.cells[start..start + GRID_WIDTH].copy_from_slice(row);
        }
        grid
    }

    /// Calculate flat index from (row, col) coordinates
    #[inline(always)]
    fn index(row: i32, col: i32) -> Option<usize> {
        if row < 0 || row >= GRID_HEIGHT as i32 || col < 0 || col >= GRID_WIDTH as i32 {
            return None;
        }
        Some(row as usize * GRID_WIDTH + col as usize)
    }

    pub fn width(&self) -> usize {
        GRID_WIDTH
    }

    pub fn height(&self) -> usize {
        GRID_HEIGHT
    }

    /// Get the cell at (row, col)
    pub fn cell_at(&self, row: i32, col: i32) -> Result<Cell, GridError> {
        Self::index(row, col)
            .map(|idx| self.cells[idx])
            .ok_or(GridError::OutOfBounds { row, col })
    }

    /// Replace the cell at (row, col)
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> Result<(), GridError> {
        let idx = Self::index(row, col).ok_or(GridError::OutOfBounds { row, col })?;
        self.cells[idx] = cell;
        Ok(())
    }

    /// Check if (row, col) is inside the grid and filled
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        Self::index(row, col).is_some_and(|idx| self.cells[idx].is_occupied())
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, row: usize) -> bool {
        self.row(row)
            .is_some_and(|cells| cells.iter().all(Cell::is_occupied))
    }

    /// Cells of one row, left to right; `None` below the bottom row
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        if row >= GRID_HEIGHT {
            return None;
        }
        let start = row * GRID_WIDTH;
        Some(&self.cells[start..start + GRID_WIDTH])
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(GRID_WIDTH)
    }

    /// Number of filled cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// Clear all full rows and return their indices (bottom to top)
    ///
    /// Remaining rows keep their relative order and settle toward the bottom;
    /// the freed rows at the top become empty. Two-pointer pass, no allocation.
    pub fn clear_full_rows(&mut self) -> ArrayVec<usize, GRID_HEIGHT> {
        let mut cleared_rows = ArrayVec::new();
        let mut write_row = GRID_HEIGHT;

        for read_row in (0..GRID_HEIGHT).rev() {
            if self.is_row_full(read_row) {
                cleared_rows.push(read_row);
            } else {
                write_row -= 1;
                if write_row != read_row {
                    let src = read_row * GRID_WIDTH;
                    self.cells
                        .copy_within(src..src + GRID_WIDTH, write_row * GRID_WIDTH);
                }
            }
        }

        self.cells[..write_row * GRID_WIDTH].fill(Cell::Empty);
        cleared_rows
    }

    /// Reference to the internal row-major cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

//! Scoring module - line clears, score, level and gravity progression
//!
//! Rules:
//! - A row is complete when every cell is filled; complete rows are removed and
//!   the rows above settle down, new empty rows appear at the top.
//! - Line clear points are `{1: 100, 2: 300, 3: 500, 4: 800}` times the level
//!   in effect when the piece locked.
//! - The level is `lines / 10 + 1`.
//! - Gravity starts at 1000ms per row and speeds up by 100ms per level, down
//!   to a 100ms floor.

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::types::{
    BASE_DROP_MS, DROP_INTERVAL_MIN_MS, DROP_INTERVAL_STEP_MS, GRID_HEIGHT, INITIAL_LEVEL,
    LINES_PER_LEVEL, LINE_SCORES,
};

/// Result of clearing complete rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClear {
    pub grid: Grid,
    /// Number of complete rows removed
    pub cleared: u32,
    /// Indices of the removed rows in the input grid, bottom to top
    pub rows: ArrayVec<usize, GRID_HEIGHT>,
}

/// Remove every complete row from a copy of the grid
pub fn clear_lines(grid: &Grid) -> LineClear {
    let mut grid = grid.clone();
    let rows = grid.clear_full_rows();
    LineClear {
        cleared: rows.len() as u32,
        grid,
        rows,
    }
}

/// Points for clearing `cleared` lines at `level`
///
/// Counts outside 1..=4 score nothing.
pub fn score_for(cleared: u32, level: u32) -> u32 {
    match cleared {
        1..=4 => LINE_SCORES[cleared as usize].saturating_mul(level),
        _ => 0,
    }
}

/// Level reached after `total_lines` cleared lines
pub fn level_for(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + INITIAL_LEVEL
}

/// Gravity interval (milliseconds per row) for a level
pub fn drop_interval_for(level: u32) -> u32 {
    let speedup = level
        .saturating_sub(INITIAL_LEVEL)
        .saturating_mul(DROP_INTERVAL_STEP_MS);
    BASE_DROP_MS.saturating_sub(speedup).max(DROP_INTERVAL_MIN_MS)
}

/// Score, line and level counters of one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Progress {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub drop_interval_ms: u32,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            score: 0,
            lines: 0,
            level: INITIAL_LEVEL,
            drop_interval_ms: drop_interval_for(INITIAL_LEVEL),
        }
    }

    /// Account for a lock that cleared `cleared` lines; returns the points earned
    ///
    /// Points use the level before the clear. A lock without clears changes nothing.
    pub fn record_clear(&mut self, cleared: u32) -> u32 {
        if cleared == 0 {
            return 0;
        }
        let points = score_for(cleared, self.level);
        self.score = self.score.saturating_add(points);
        self.lines = self.lines.saturating_add(cleared);
        self.level = level_for(self.lines);
        self.drop_interval_ms = drop_interval_for(self.level);
        points
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

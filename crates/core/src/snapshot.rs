use crate::collision::merge;
use crate::grid::Grid;
use crate::pieces::Piece;
use crate::types::{Position, SessionState};

/// The falling piece and where it is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub piece: Piece,
    pub position: Position,
}

/// Immutable copy of everything a renderer needs after an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Locked cells only; never contains the falling piece
    pub grid: Grid,
    pub active: Option<ActivePiece>,
    pub next: Option<Piece>,
    pub state: SessionState,
    pub paused: bool,
    /// Increments on every start; lets drivers notice restarts
    pub episode_id: u32,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub drop_interval_ms: u32,
}

impl GameSnapshot {
    /// Grid with the falling piece drawn on top
    pub fn preview(&self) -> Grid {
        match self.active {
            Some(active) => merge(&self.grid, &active.piece, active.position),
            None => self.grid.clone(),
        }
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            grid: Grid::empty(),
            active: None,
            next: None,
            state: SessionState::Idle,
            paused: false,
            episode_id: 0,
            score: 0,
            lines: 0,
            level: crate::types::INITIAL_LEVEL,
            drop_interval_ms: crate::types::BASE_DROP_MS,
        }
    }
}

//! Game session module - the state machine a driver talks to
//!
//! A session owns the grid, the falling piece, the pending next piece and the
//! score counters. Drivers call it from a single thread: a gravity timer calls
//! [`GameSession::tick`], an input layer calls [`GameSession::apply_action`].
//!
//! The raw operations (`spawn_piece`, `move_piece`, `rotate`, `soft_drop`,
//! `hard_drop`) do exactly one thing each. `tick` and `apply_action` are the
//! decision points: after running their operation they spawn a new piece if the
//! session is playing and has none.

use crate::collision::{check_collision, merge, rotate_with_wall_kick};
use crate::grid::Grid;
use crate::pieces::{spawn_position, Piece};
use crate::rng::{PieceSource, RandomPieces};
use crate::scoring::{clear_lines, LineClear, Progress};
use crate::snapshot::{ActivePiece, GameSnapshot};
use crate::types::{GameAction, SessionState};

/// What a one-row drop did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Not playing, or no falling piece
    Rejected,
    /// The piece moved down one row
    Moved,
    /// The piece could not move and was locked into the grid
    Locked,
}

/// Emitted every time a piece locks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub lines_cleared: u32,
    pub points: u32,
    /// Level after the lock
    pub level: u32,
    pub level_up: bool,
}

/// A single game: idle until started, then playing until a spawn is blocked
#[derive(Debug, Clone)]
pub struct GameSession<S = RandomPieces> {
    grid: Grid,
    active: Option<ActivePiece>,
    next: Option<Piece>,
    source: S,
    state: SessionState,
    progress: Progress,
    episode_id: u32,
    /// Pieces spawned in the current game
    pieces_spawned: u32,
    /// Last lock event (consumed by observers)
    last_event: Option<LockEvent>,
}

impl GameSession<RandomPieces> {
    /// Create an idle session whose pieces are determined by `seed`
    pub fn new(seed: u64) -> Self {
        Self::with_source(RandomPieces::seeded(seed))
    }
}

impl<S: PieceSource> GameSession<S> {
    /// Create an idle session drawing pieces from `source`
    pub fn with_source(source: S) -> Self {
        Self {
            grid: Grid::empty(),
            active: None,
            next: None,
            source,
            state: SessionState::Idle,
            progress: Progress::new(),
            episode_id: 0,
            pieces_spawned: 0,
            last_event: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn paused(&self) -> bool {
        self.state == SessionState::Paused
    }

    pub fn game_over(&self) -> bool {
        self.state == SessionState::GameOver
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn active(&self) -> Option<ActivePiece> {
        self.active
    }

    pub fn next_piece(&self) -> Option<Piece> {
        self.next
    }

    pub fn score(&self) -> u32 {
        self.progress.score
    }

    pub fn lines(&self) -> u32 {
        self.progress.lines
    }

    pub fn level(&self) -> u32 {
        self.progress.level
    }

    pub fn drop_interval_ms(&self) -> u32 {
        self.progress.drop_interval_ms
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn pieces_spawned(&self) -> u32 {
        self.pieces_spawned
    }

    /// Replace the locked cells, e.g. to set up a puzzle after `start`
    pub fn replace_grid(&mut self, grid: Grid) {
        self.grid = grid;
    }

    /// Grid with the falling piece drawn on top; the real grid is untouched
    pub fn preview(&self) -> Grid {
        match self.active {
            Some(active) => merge(&self.grid, &active.piece, active.position),
            None => self.grid.clone(),
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            grid: self.grid.clone(),
            active: self.active,
            next: self.next,
            state: self.state,
            paused: self.paused(),
            episode_id: self.episode_id,
            score: self.progress.score,
            lines: self.progress.lines,
            level: self.progress.level,
            drop_interval_ms: self.progress.drop_interval_ms,
        }
    }

    /// Take and clear the last lock event
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    /// Start (or restart) a game from any state
    ///
    /// Resets the grid and counters, draws the next piece and leaves no falling
    /// piece, so the next decision point spawns one.
    pub fn start(&mut self) {
        self.grid = Grid::empty();
        self.progress = Progress::new();
        self.active = None;
        self.next = Some(self.source.next_piece());
        self.set_state(SessionState::Playing);
        self.episode_id = self.episode_id.wrapping_add(1);
        self.pieces_spawned = 0;
        self.last_event = None;
        log::info!("game {} started", self.episode_id);
    }

    /// Bring the pending next piece into play at the spawn position
    ///
    /// Returns false if not playing or if the spawn position is blocked; a
    /// blocked spawn ends the game.
    pub fn spawn_piece(&mut self) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }

        let piece = match self.next {
            Some(piece) => piece,
            None => self.source.next_piece(),
        };
        let position = spawn_position(&piece.shape);

        if check_collision(&self.grid, &piece, position) {
            self.active = None;
            self.set_state(SessionState::GameOver);
            log::info!(
                "game {} over: score {}, lines {}, level {}",
                self.episode_id,
                self.progress.score,
                self.progress.lines,
                self.progress.level
            );
            return false;
        }

        self.next = Some(self.source.next_piece());
        self.active = Some(ActivePiece { piece, position });
        self.pieces_spawned = self.pieces_spawned.wrapping_add(1);
        log::debug!("spawned {:?} at {:?}", piece.kind, position);
        true
    }

    /// Try to shift the falling piece
    pub fn move_piece(&mut self, row_delta: i32, col_delta: i32) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let target = active.position.offset(row_delta, col_delta);
        if check_collision(&self.grid, &active.piece, target) {
            log::trace!("move ({}, {}) rejected", row_delta, col_delta);
            return false;
        }

        self.active = Some(ActivePiece {
            position: target,
            ..active
        });
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.move_piece(0, -1)
    }

    pub fn move_right(&mut self) -> bool {
        self.move_piece(0, 1)
    }

    /// Rotate the falling piece clockwise, kicking one column if needed
    pub fn rotate(&mut self) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        match rotate_with_wall_kick(&self.grid, &active.piece, active.position) {
            Some((piece, position)) => {
                self.active = Some(ActivePiece { piece, position });
                true
            }
            None => {
                log::trace!("rotation of {:?} rejected", active.piece.kind);
                false
            }
        }
    }

    /// Move the piece down one row, locking it if it has landed
    pub fn soft_drop(&mut self) -> DropOutcome {
        if self.state != SessionState::Playing || self.active.is_none() {
            return DropOutcome::Rejected;
        }
        if self.move_piece(1, 0) {
            return DropOutcome::Moved;
        }
        self.lock_piece();
        DropOutcome::Locked
    }

    /// Drop the piece as far as it goes
    ///
    /// Returns the number of rows travelled, or `None` when rejected. A piece
    /// that could not move at all locks immediately; one that did move is left
    /// resting and locks on the next soft drop or gravity tick.
    pub fn hard_drop(&mut self) -> Option<u32> {
        if self.state != SessionState::Playing || self.active.is_none() {
            return None;
        }

        let mut rows = 0;
        while self.move_piece(1, 0) {
            rows += 1;
        }
        if rows == 0 {
            self.lock_piece();
        }
        Some(rows)
    }

    pub fn pause(&mut self) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }
        self.set_state(SessionState::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != SessionState::Paused {
            return false;
        }
        self.set_state(SessionState::Playing);
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.state {
            SessionState::Playing => self.pause(),
            SessionState::Paused => self.resume(),
            _ => false,
        }
    }

    /// Gravity tick: drop the falling piece one row, then spawn if needed
    pub fn tick(&mut self) -> DropOutcome {
        let outcome = self.soft_drop();
        self.spawn_if_needed();
        outcome
    }

    /// Apply a driver command, then spawn if needed
    ///
    /// Returns whether the command was accepted.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        let accepted = match action {
            GameAction::MoveLeft => self.move_left(),
            GameAction::MoveRight => self.move_right(),
            GameAction::SoftDrop => self.soft_drop() != DropOutcome::Rejected,
            GameAction::HardDrop => self.hard_drop().is_some(),
            GameAction::Rotate => self.rotate(),
            GameAction::Start => {
                self.start();
                true
            }
            GameAction::Pause => self.pause(),
            GameAction::Resume => self.resume(),
            GameAction::TogglePause => self.toggle_pause(),
        };
        if !accepted {
            log::trace!("{} rejected in state {}", action.as_str(), self.state.as_str());
        }
        self.spawn_if_needed();
        accepted
    }

    fn set_state(&mut self, state: SessionState) {
        log::debug!("state {} -> {}", self.state.as_str(), state.as_str());
        self.state = state;
    }

    fn spawn_if_needed(&mut self) {
        if self.state == SessionState::Playing && self.active.is_none() {
            self.spawn_piece();
        }
    }

    /// Merge the falling piece, clear lines and update the counters
    fn lock_piece(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        let merged = merge(&self.grid, &active.piece, active.position);
        let LineClear {
            grid,
            cleared,
            rows,
        } = clear_lines(&merged);
        self.grid = grid;

        let level_before = self.progress.level;
        let points = self.progress.record_clear(cleared);
        let level_up = self.progress.level != level_before;

        log::debug!(
            "locked {:?} at {:?}, cleared rows {:?}",
            active.piece.kind,
            active.position,
            rows.as_slice()
        );
        if level_up {
            log::info!(
                "level {} reached, gravity {}ms",
                self.progress.level,
                self.progress.drop_interval_ms
            );
        }

        self.last_event = Some(LockEvent {
            lines_cleared: cleared,
            points,
            level: self.progress.level,
            level_up,
        });
    }
}

impl Default for GameSession<RandomPieces> {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequencePieces;
    use crate::types::{Cell, Color, PieceKind, Position, GRID_WIDTH};

    fn session_of(kinds: &[PieceKind]) -> GameSession<SequencePieces> {
        GameSession::with_source(SequencePieces::new(kinds.to_vec()))
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = GameSession::new(12345);

        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.paused());
        assert_eq!(session.score(), 0);
        assert_eq!(session.lines(), 0);
        assert_eq!(session.level(), 1);
        assert_eq!(session.drop_interval_ms(), 1000);
        assert!(session.active().is_none());
        assert!(session.next_piece().is_none());
    }

    #[test]
    fn test_operations_rejected_while_idle() {
        let mut session = GameSession::new(12345);
        assert!(!session.spawn_piece());
        assert!(!session.move_piece(1, 0));
        assert!(!session.rotate());
        assert_eq!(session.soft_drop(), DropOutcome::Rejected);
        assert_eq!(session.hard_drop(), None);
        assert!(!session.pause());
        assert!(!session.resume());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_start_draws_next_without_spawning() {
        let mut session = session_of(&[PieceKind::T, PieceKind::O]);
        session.start();

        assert_eq!(session.state(), SessionState::Playing);
        assert!(session.active().is_none());
        assert_eq!(session.next_piece().map(|p| p.kind), Some(PieceKind::T));
        assert_eq!(session.episode_id(), 1);
    }

    #[test]
    fn test_spawn_moves_next_into_play() {
        let mut session = session_of(&[PieceKind::T, PieceKind::O]);
        session.start();

        assert!(session.spawn_piece());
        let active = session.active().unwrap();
        assert_eq!(active.piece.kind, PieceKind::T);
        assert_eq!(active.position, Position::new(0, 3));
        assert_eq!(session.next_piece().map(|p| p.kind), Some(PieceKind::O));
        assert_eq!(session.pieces_spawned(), 1);
    }

    #[test]
    fn test_apply_start_spawns_immediately() {
        let mut session = GameSession::new(12345);
        assert!(session.apply_action(GameAction::Start));
        assert!(session.active().is_some());
        assert!(session.next_piece().is_some());
    }

    #[test]
    fn test_blocked_spawn_ends_game() {
        let mut session = session_of(&[PieceKind::O]);
        session.start();
        let mut grid = Grid::empty();
        grid.set(1, 4, Cell::Filled(Color::Red)).unwrap();
        session.replace_grid(grid);

        assert!(!session.spawn_piece());
        assert_eq!(session.state(), SessionState::GameOver);
        assert!(session.active().is_none());

        // Nothing but start leaves game over
        assert!(!session.apply_action(GameAction::Resume));
        assert!(!session.apply_action(GameAction::MoveLeft));
        assert_eq!(session.state(), SessionState::GameOver);
        assert!(session.apply_action(GameAction::Start));
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.grid().occupied_count(), 0);
    }

    #[test]
    fn test_move_piece() {
        let mut session = session_of(&[PieceKind::O]);
        session.apply_action(GameAction::Start);
        let start = session.active().unwrap().position;

        assert!(session.move_right());
        assert_eq!(session.active().unwrap().position, start.offset(0, 1));
        assert!(session.move_left());
        assert_eq!(session.active().unwrap().position, start);

        // O spawns at col 4; four moves reach the left wall
        for _ in 0..4 {
            assert!(session.move_left());
        }
        assert!(!session.move_left());
        assert_eq!(session.active().unwrap().position.col, 0);
    }

    #[test]
    fn test_rotate_changes_shape() {
        let mut session = session_of(&[PieceKind::T]);
        session.apply_action(GameAction::Start);
        session.move_piece(2, 0);

        assert!(session.rotate());
        let shape = session.active().unwrap().piece.shape;
        assert_eq!((shape.rows(), shape.cols()), (3, 2));
    }

    #[test]
    fn test_rotation_blocked_everywhere_is_rejected() {
        let mut session = session_of(&[PieceKind::I]);
        session.apply_action(GameAction::Start);
        // Horizontal I at row 0, cols 3..=6; the vertical bar would need rows 0..=3
        let mut grid = Grid::empty();
        for col in 0..GRID_WIDTH as i32 {
            grid.set(2, col, Cell::Filled(Color::Blue)).unwrap();
        }
        session.replace_grid(grid);

        let before = session.active();
        assert!(!session.rotate());
        assert_eq!(session.active(), before);
    }

    #[test]
    fn test_soft_drop_locks_on_floor() {
        let mut session = session_of(&[PieceKind::O, PieceKind::T]);
        session.apply_action(GameAction::Start);

        for _ in 0..18 {
            assert_eq!(session.soft_drop(), DropOutcome::Moved);
        }
        assert_eq!(session.soft_drop(), DropOutcome::Locked);
        assert!(session.active().is_none());
        assert_eq!(session.grid().occupied_count(), 4);
        assert!(session.grid().is_occupied(19, 4));

        let event = session.take_last_event().unwrap();
        assert_eq!(event.lines_cleared, 0);
        assert_eq!(event.points, 0);
        assert!(session.take_last_event().is_none());
    }

    #[test]
    fn test_tick_locks_then_spawns() {
        let mut session = session_of(&[PieceKind::O, PieceKind::T]);
        session.apply_action(GameAction::Start);
        for _ in 0..18 {
            session.tick();
        }
        assert_eq!(session.tick(), DropOutcome::Locked);
        assert_eq!(session.active().unwrap().piece.kind, PieceKind::T);
        assert_eq!(session.pieces_spawned(), 2);
    }

    #[test]
    fn test_hard_drop_rests_then_locks() {
        let mut session = session_of(&[PieceKind::O]);
        session.apply_action(GameAction::Start);

        assert_eq!(session.hard_drop(), Some(18));
        assert_eq!(session.active().unwrap().position.row, 18);
        assert_eq!(session.grid().occupied_count(), 0);

        // Already resting: a second hard drop locks in place
        assert_eq!(session.hard_drop(), Some(0));
        assert!(session.active().is_none());
        assert_eq!(session.grid().occupied_count(), 4);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut session = session_of(&[PieceKind::O]);
        session.apply_action(GameAction::Start);

        assert!(session.pause());
        assert!(session.paused());
        assert_eq!(session.state(), SessionState::Paused);
        assert!(!session.move_left());
        assert_eq!(session.tick(), DropOutcome::Rejected);
        assert!(!session.pause());

        assert!(session.resume());
        assert_eq!(session.state(), SessionState::Playing);
        assert!(session.move_left());

        assert!(session.apply_action(GameAction::TogglePause));
        assert!(session.paused());
        assert!(session.apply_action(GameAction::TogglePause));
        assert!(!session.paused());
    }

    #[test]
    fn test_line_clear_updates_counters() {
        let mut session = session_of(&[PieceKind::I]);
        session.apply_action(GameAction::Start);

        // Bottom row filled except cols 3..=6, where the I lands
        let mut grid = Grid::empty();
        for col in (0..3).chain(7..10) {
            grid.set(19, col, Cell::Filled(Color::Green)).unwrap();
        }
        session.replace_grid(grid);

        assert_eq!(session.hard_drop(), Some(19));
        assert_eq!(session.soft_drop(), DropOutcome::Locked);

        let event = session.take_last_event().unwrap();
        assert_eq!(event.lines_cleared, 1);
        assert_eq!(event.points, 100);
        assert!(!event.level_up);
        assert_eq!(session.score(), 100);
        assert_eq!(session.lines(), 1);
        assert_eq!(session.grid().occupied_count(), 0);
    }

    #[test]
    fn test_preview_does_not_touch_grid() {
        let mut session = session_of(&[PieceKind::O]);
        session.apply_action(GameAction::Start);

        let preview = session.preview();
        assert_eq!(preview.occupied_count(), 4);
        assert_eq!(session.grid().occupied_count(), 0);
        assert_eq!(session.snapshot().preview(), preview);
    }

    #[test]
    fn test_injected_rng_drives_piece_sequence() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        fn draws<S: PieceSource>(mut session: GameSession<S>) -> Vec<PieceKind> {
            (0..30)
                .map(|_| {
                    session.start();
                    session.next_piece().unwrap().kind
                })
                .collect()
        }

        let injected = draws(GameSession::with_source(RandomPieces::new(
            ChaCha8Rng::seed_from_u64(77),
        )));
        let again = draws(GameSession::with_source(RandomPieces::new(
            ChaCha8Rng::seed_from_u64(77),
        )));
        assert_eq!(injected, again);
        assert_eq!(injected, draws(GameSession::new(77)));
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut session = session_of(&[PieceKind::O]);
        session.apply_action(GameAction::Start);
        session.hard_drop();
        session.hard_drop();
        session.pause();

        session.apply_action(GameAction::Start);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.grid().occupied_count(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.level(), 1);
        assert_eq!(session.episode_id(), 2);
        assert_eq!(session.pieces_spawned(), 1);
    }
}

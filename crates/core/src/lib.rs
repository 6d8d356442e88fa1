//! Core game logic - pure, deterministic, and testable
//!
//! All rules of the falling-block game live here. Nothing in this crate knows
//! about terminals, input devices or wall-clock time, so the same seed always
//! produces the same game.
//!
//! # Module Structure
//!
//! - [`pieces`]: the seven piece kinds, their shape matrices and colors
//! - [`grid`]: the 10x20 grid of locked cells
//! - [`collision`]: legality checks, clockwise rotation with a one-column kick, merging
//! - [`scoring`]: line clears, points, level and gravity progression
//! - [`rng`]: where new pieces come from
//! - [`session`]: the game state machine drivers talk to
//! - [`snapshot`]: immutable copies of session state for renderers
//! - [`gravity`]: elapsed time to gravity ticks
//!
//! # Game Rules
//!
//! - Pieces spawn at the top, horizontally centered, and the pending next piece
//!   is always known in advance.
//! - Rotation is clockwise only. A blocked rotation tries one column left, then
//!   one column right, before giving up.
//! - A piece that cannot move down locks in place; complete rows are then
//!   cleared and score `{100, 300, 500, 800}` times the current level.
//! - Every 10 lines raise the level; gravity speeds up by 100ms per level down
//!   to a 100ms floor.
//! - The game ends when a new piece cannot spawn.
//!
//! # Example
//!
//! ```
//! use blockfall_core::GameSession;
//! use blockfall_types::{GameAction, SessionState};
//!
//! let mut game = GameSession::new(12345);
//! game.apply_action(GameAction::Start);
//! assert_eq!(game.state(), SessionState::Playing);
//! assert!(game.active().is_some());
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::Rotate);
//! game.apply_action(GameAction::HardDrop);
//! assert_eq!(game.score(), 0);
//! ```

pub mod collision;
pub mod gravity;
pub mod grid;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use collision::{check_collision, merge, rotate, rotate_with_wall_kick};
pub use gravity::GravityTimer;
pub use grid::{Grid, GridError};
pub use pieces::{get_shape, spawn_position, Piece, PieceShape};
pub use rng::{PieceSource, RandomPieces, SequencePieces};
pub use scoring::{clear_lines, drop_interval_for, level_for, score_for, LineClear, Progress};
pub use session::{DropOutcome, GameSession, LockEvent};
pub use snapshot::{ActivePiece, GameSnapshot};

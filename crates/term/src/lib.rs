//! Terminal game renderer.
//!
//! A small, game-oriented rendering layer: a [`GameView`] paints a
//! [`core::GameSnapshot`](crate::core::GameSnapshot) into a [`FrameBuffer`],
//! and a [`TerminalRenderer`] flushes framebuffers to the terminal, sending
//! only the runs of glyphs that changed since the previous frame.
//!
//! Grid cells are drawn 2 columns wide by default to compensate for the aspect
//! ratio of terminal glyphs.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use blockfall_core as core;
pub use blockfall_types as types;

pub use fb::{CellStyle, FrameBuffer, Glyph, Rgb};
pub use game_view::{AnchorY, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};

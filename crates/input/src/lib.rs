//! Terminal input module
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`]. The mapping is
//! stateless: every key press is one command, and key repeat comes from the
//! terminal itself.

pub mod map;

pub use blockfall_types as types;

pub use map::{handle_key_event, should_quit};

//! RNG module - where new pieces come from
//!
//! A session draws pieces from a [`PieceSource`]. The default source picks
//! kinds uniformly with a seeded ChaCha8 generator, so a seed fully determines
//! the piece sequence. [`SequencePieces`] replays a fixed list, which is what
//! scripted setups and tests use.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::pieces::{random_piece, Piece};
use crate::types::PieceKind;

/// Supplier of fresh pieces
pub trait PieceSource {
    fn next_piece(&mut self) -> Piece;
}

/// Uniform random pieces from an injected generator
#[derive(Debug, Clone)]
pub struct RandomPieces<R = ChaCha8Rng> {
    rng: R,
}

impl RandomPieces<ChaCha8Rng> {
    /// Deterministic source for the given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomPieces<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> PieceSource for RandomPieces<R> {
    fn next_piece(&mut self) -> Piece {
        random_piece(&mut self.rng)
    }
}

/// Cycles through a fixed list of kinds
#[derive(Debug, Clone)]
pub struct SequencePieces {
    kinds: Vec<PieceKind>,
    index: usize,
}

impl SequencePieces {
    /// An empty list falls back to I pieces.
    pub fn new(kinds: impl Into<Vec<PieceKind>>) -> Self {
        let mut kinds = kinds.into();
        if kinds.is_empty() {
            kinds.push(PieceKind::I);
        }
        Self { kinds, index: 0 }
    }
}

impl PieceSource for SequencePieces {
    fn next_piece(&mut self) -> Piece {
        let kind = self.kinds[self.index % self.kinds.len()];
        self.index = self.index.wrapping_add(1);
        Piece::new(kind)
    }
}

use crate::prelude::*;

pub mod coord;
mod cubie;
mod facie;
mod pocket;
mod surface;

pub use cubie::{permutation_parity, CornerCube, CubieCube};
pub use facie::{corner_facelets, facelets};
pub use pocket::PocketCube;
pub use surface::{NxnMove, StickerCube};

/// A puzzle configuration. Values are immutable; `apply` returns the successor.
pub trait PuzzleState: Sized + Clone + core::fmt::Debug + Eq {
    type Move: PuzzleMove;

    fn solved() -> Self;

    /// `move_` must be legal in `self` (see [`PuzzleState::is_legal`]).
    fn apply(self, move_: Self::Move) -> Self;

    fn is_legal(&self, _move: &Self::Move) -> bool {
        true
    }

    fn apply_all(self, moves: impl IntoIterator<Item = Self::Move>) -> Self {
        moves.into_iter().fold(self, |state, m| state.apply(m))
    }

    fn is_solved(&self) -> bool {
        *self == Self::solved()
    }
}

pub trait PuzzleMove: Copy + Eq + core::fmt::Debug + core::fmt::Display + Send + Sync {
    fn inverse(&self) -> Self;

    /// The sequence undoing `moves`.
    fn invert_sequence(moves: &[Self]) -> Vec<Self> {
        moves.iter().rev().map(|m| m.inverse()).collect()
    }
}

impl PuzzleMove for Move {
    fn inverse(&self) -> Move {
        Move::inverse(*self)
    }
}

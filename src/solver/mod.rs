use crate::prelude::*;

mod kociemba;
pub use kociemba::*;

mod naive_iddfs;
pub use naive_iddfs::*;

mod pocket;
pub use pocket::*;

mod prune;
pub use prune::*;

mod square_one;
pub use square_one::*;

/// Finds a sequence taking a state back to solved.
pub trait Solver: Send + Sync {
    type State: PuzzleState;

    /// Puzzle id reported in errors.
    fn puzzle(&self) -> &'static str;

    /// At most `max_length` moves in the puzzle's metric, or `BudgetExceeded`.
    fn solve(
        &self,
        state: &Self::State,
        max_length: usize,
        budget: &SearchBudget,
    ) -> Result<Vec<<Self::State as PuzzleState>::Move>>;
}

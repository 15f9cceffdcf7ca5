use crate::prelude::*;

/// Plain iterative deepening over a move alphabet, no tables. Only for
/// shallow questions: "is this state within k moves of solved?"
pub struct NaiveIddfs<S: PuzzleState> {
    moves: Vec<S::Move>,
}

impl<S: PuzzleState> NaiveIddfs<S> {
    pub fn new(moves: impl IntoIterator<Item = S::Move>) -> Self {
        NaiveIddfs {
            moves: moves.into_iter().collect(),
        }
    }

    /// A shortest solution of at most `max_depth` moves.
    pub fn solve_within(&self, state: &S, max_depth: usize) -> Option<Vec<S::Move>> {
        (0..=max_depth).find_map(|depth| {
            let mut stack = Vec::with_capacity(depth);
            self.find_solution(depth, state, &mut stack)
        })
    }

    fn find_solution(
        &self,
        remaining_moves: usize,
        state: &S,
        move_stack: &mut Vec<S::Move>,
    ) -> Option<Vec<S::Move>> {
        if remaining_moves == 0 {
            return state.is_solved().then(|| move_stack.clone());
        }

        for &m in &self.moves {
            if !state.is_legal(&m) || move_stack.last() == Some(&m.inverse()) {
                continue;
            }
            move_stack.push(m);
            let found = self.find_solution(remaining_moves - 1, &state.clone().apply(m), move_stack);
            move_stack.pop();
            if found.is_some() {
                return found;
            }
        }
        None
    }
}

use crate::prelude::*;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Instant;

/// Searches count nodes between polls of the clock and the cancel flag.
pub const NODES_PER_CHECK: u64 = 1 << 12;

/// Limits on one scramble request. Searches poll [`SearchBudget::check`] at
/// every deepening step and every [`NODES_PER_CHECK`] nodes inside one, so a
/// request stops soon after the deadline passes or the flag is raised.
#[derive(Debug, Clone, Default)]
pub struct SearchBudget {
    deadline: Option<Instant>,
    cancelled: Option<Arc<AtomicBool>>,
}

impl SearchBudget {
    pub fn unlimited() -> SearchBudget {
        SearchBudget::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> SearchBudget {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> SearchBudget {
        self.deadline = Some(deadline);
        self
    }

    /// Raising `flag` from any thread cancels every search sharing it.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> SearchBudget {
        self.cancelled = Some(flag);
        self
    }

    pub fn check(&self, puzzle: &str) -> Result<()> {
        if let Some(flag) = &self.cancelled {
            if flag.load(Ordering::Relaxed) {
                return Err(ScrambleError::Cancelled {
                    puzzle: puzzle.to_string(),
                });
            }
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Err(ScrambleError::budget(puzzle, "deadline passed"))
            }
            _ => Ok(()),
        }
    }

    /// Counts one search node, checking the budget every
    /// [`NODES_PER_CHECK`] nodes.
    pub fn tick(&self, puzzle: &str, nodes: &mut u64) -> Result<()> {
        *nodes += 1;
        if *nodes % NODES_PER_CHECK == 0 {
            self.check(puzzle)
        } else {
            Ok(())
        }
    }
}

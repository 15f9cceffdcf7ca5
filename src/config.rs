use crate::prelude::*;

use std::collections::HashMap;
use std::path::PathBuf;

/// Length limits for one puzzle's scrambles, in the puzzle's own metric
/// (face turns, block turns, or Square-1 slashes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScramblePolicy {
    /// Shorter results are thrown away and resampled.
    pub min_length: usize,
    /// Search ceiling. Also the walk length for cubes scrambled by random moves.
    pub max_length: usize,
}

impl ScramblePolicy {
    pub const fn new(min_length: usize, max_length: usize) -> ScramblePolicy {
        ScramblePolicy {
            min_length,
            max_length,
        }
    }

    pub fn allows(&self, length: usize) -> bool {
        (self.min_length..=self.max_length).contains(&length)
    }
}

/// Engine settings.
///
/// - `table_cache`: directory for persisted pruning tables. `None` builds
///   everything in memory on each start.
/// - `timeout`: per-request wall clock limit, `None` for no limit.
/// - `max_attempts`: samples drawn before a request gives up.
/// - `square_one_candidates`: phase-1 solutions tried per Square-1 state.
/// - `puzzles`: which puzzles get tables. Ids outside this list are unknown.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub table_cache: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub max_attempts: usize,
    pub square_one_candidates: usize,
    pub puzzles: Vec<PuzzleKind>,
    policies: HashMap<PuzzleKind, ScramblePolicy>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            table_cache: None,
            timeout: Some(Duration::from_secs(30)),
            max_attempts: 100,
            square_one_candidates: 4,
            puzzles: PuzzleKind::all().collect(),
            policies: HashMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn with_table_cache(mut self, dir: impl Into<PathBuf>) -> Self {
        self.table_cache = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_square_one_candidates(mut self, candidates: usize) -> Self {
        self.square_one_candidates = candidates.max(1);
        self
    }

    pub fn with_puzzles(mut self, puzzles: impl IntoIterator<Item = PuzzleKind>) -> Self {
        self.puzzles = puzzles.into_iter().collect();
        self
    }

    pub fn with_policy(mut self, kind: PuzzleKind, policy: ScramblePolicy) -> Self {
        self.policies.insert(kind, policy);
        self
    }

    /// The override for `kind`, else its built-in default.
    pub fn policy(&self, kind: PuzzleKind) -> ScramblePolicy {
        self.policies
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_policy())
    }

    pub fn budget(&self) -> SearchBudget {
        match self.timeout {
            Some(timeout) => SearchBudget::unlimited().with_timeout(timeout),
            None => SearchBudget::unlimited(),
        }
    }
}

use std::io;

/// Everything that can go wrong between engine start-up and a finished scramble.
///
/// `InvalidState` and `UnreachableTarget` are modelling bugs and abort
/// [`Engine::new`](crate::Engine::new). The rest are per-request outcomes and
/// never touch the shared tables.
#[derive(thiserror::Error, Debug)]
pub enum ScrambleError {
    #[error("invalid {coordinate} coordinate {value} (expected < {size})")]
    InvalidState {
        coordinate: &'static str,
        value: usize,
        size: usize,
    },

    #[error("{table}: {missing} of {size} coordinates unreachable from the target")]
    UnreachableTarget {
        table: String,
        missing: usize,
        size: usize,
    },

    #[error("{puzzle}: no scramble found within budget ({reason})")]
    BudgetExceeded { puzzle: String, reason: String },

    #[error("{puzzle}: request cancelled")]
    Cancelled { puzzle: String },

    #[error("unknown puzzle {0:?}")]
    UnknownPuzzle(String),

    #[error("invalid move {token:?}: {reason}")]
    InvalidMove { token: String, reason: String },

    #[error("table cache: {0}")]
    TableCache(#[from] CacheError),
}

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid magic or version")]
    MagicOrVersion,
    #[error("file too short or malformed")]
    Malformed,
    #[error("checksum mismatch")]
    Checksum,
    #[error("stale table for {family}: fingerprint {found:08x}, expected {expected:08x}")]
    Stale {
        family: String,
        found: u32,
        expected: u32,
    },
}

pub type Result<T, E = ScrambleError> = core::result::Result<T, E>;

impl ScrambleError {
    pub(crate) fn invalid_move(token: &str, reason: impl Into<String>) -> Self {
        ScrambleError::InvalidMove {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn budget(puzzle: &str, reason: impl Into<String>) -> Self {
        ScrambleError::BudgetExceeded {
            puzzle: puzzle.to_string(),
            reason: reason.into(),
        }
    }

    /// True for outcomes a caller can retry with a fresh request.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            ScrambleError::InvalidState { .. } | ScrambleError::UnreachableTarget { .. }
        )
    }
}

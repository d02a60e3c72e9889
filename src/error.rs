//! Error type shared by every fallible puzzle operation.

use thiserror::Error;

/// Errors surfaced by the transition engine, the solver and the generator.
///
/// None of these are transient: a valid configuration is always solvable,
/// so `UnreachableSolution` means the configuration itself is bad and must
/// not be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    /// The operation does not apply to this state or configuration.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The search exhausted every reachable state without solving the puzzle.
    #[error("no solution reachable after expanding {explored} states")]
    UnreachableSolution { explored: usize },
    /// The caller raised the cancellation flag during a search.
    #[error("search cancelled")]
    CancellationRequested,
}

impl PuzzleError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidState(reason.into())
    }
}

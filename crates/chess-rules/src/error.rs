//! Error types for rule queries.

use chess_core::Color;
use thiserror::Error;

/// Board states the rules refuse to classify.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RulesError {
    /// Every position in a game has exactly one king per side.
    #[error("{0} king not found on the board")]
    KingNotFound(Color),
}

//! Game status classification.

use crate::attacks::is_square_attacked;
use crate::legality::has_valid_move;
use crate::RulesError;
use chess_core::{BoardView, Color, LastMove};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of the side about to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Not in check, with at least one legal move.
    Playing,
    /// In check, with at least one legal move.
    Check,
    /// In check with no legal move. The side to move has lost.
    Checkmate,
    /// Not in check but without a legal move. The game is drawn.
    Stalemate,
}

impl GameStatus {
    /// Classifies from whether the king is attacked and whether any legal
    /// move exists.
    pub const fn classify(in_check: bool, has_move: bool) -> Self {
        match (in_check, has_move) {
            (false, true) => GameStatus::Playing,
            (false, false) => GameStatus::Stalemate,
            (true, true) => GameStatus::Check,
            (true, false) => GameStatus::Checkmate,
        }
    }

    /// Returns true if the game cannot continue.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }

    /// Returns the lowercase name used across the web boundary.
    pub const fn as_str(self) -> &'static str {
        match self {
            GameStatus::Playing => "playing",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `color`'s king is attacked by the opponent.
pub fn is_in_check<B: BoardView + ?Sized>(color: Color, board: &B) -> Result<bool, RulesError> {
    let king = board.king(color).ok_or(RulesError::KingNotFound(color))?;
    Ok(is_square_attacked(king.coord(), color.opposite(), board))
}

/// Determines the status of `player`, the side about to move.
///
/// Stops enumerating as soon as one piece has a legal move.
pub fn game_status<B: BoardView + ?Sized>(
    player: Color,
    board: &B,
    last_move: Option<&LastMove>,
) -> Result<GameStatus, RulesError> {
    let in_check = is_in_check(player, board)?;
    let has_move = board
        .pieces()
        .iter()
        .filter(|p| p.color == player)
        .any(|p| has_valid_move(p, board, last_move));
    Ok(GameStatus::classify(in_check, has_move))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Board;

    fn status(fen: &str) -> Result<GameStatus, RulesError> {
        let (board, side, last_move) = Board::from_fen(fen).unwrap();
        game_status(side, &board, last_move.as_ref())
    }

    #[test]
    fn classification_table() {
        assert_eq!(GameStatus::classify(false, true), GameStatus::Playing);
        assert_eq!(GameStatus::classify(false, false), GameStatus::Stalemate);
        assert_eq!(GameStatus::classify(true, true), GameStatus::Check);
        assert_eq!(GameStatus::classify(true, false), GameStatus::Checkmate);
    }

    #[test]
    fn initial_position_is_playing() {
        assert_eq!(game_status(Color::White, &Board::standard(), None), Ok(GameStatus::Playing));
        assert_eq!(game_status(Color::Black, &Board::standard(), None), Ok(GameStatus::Playing));
    }

    #[test]
    fn fools_mate() {
        assert_eq!(
            status("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"),
            Ok(GameStatus::Checkmate)
        );
    }

    #[test]
    fn check_with_escape() {
        assert_eq!(
            status("rnbqkbnr/ppp2ppp/8/1B1pp3/4P3/8/PPPP1PPP/RNBQK1NR b KQkq - 1 3"),
            Ok(GameStatus::Check)
        );
    }

    #[test]
    fn stalemate() {
        assert_eq!(status("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"), Ok(GameStatus::Stalemate));
    }

    #[test]
    fn en_passant_can_be_the_only_escape() {
        // White's b-pawn just double-pushed with check. Capturing it en
        // passant is black's only legal move.
        assert_eq!(
            status("8/3B4/3Q4/k7/1Pp5/8/8/7K b - b3 0 1"),
            Ok(GameStatus::Check)
        );
        assert_eq!(
            status("8/3B4/3Q4/k7/1Pp5/8/8/7K b - - 0 1"),
            Ok(GameStatus::Checkmate)
        );
    }

    #[test]
    fn missing_king_is_an_error() {
        assert_eq!(
            status("8/8/8/8/8/8/8/K7 b - - 0 1"),
            Err(RulesError::KingNotFound(Color::Black))
        );
        assert_eq!(
            is_in_check(Color::White, &Board::default()),
            Err(RulesError::KingNotFound(Color::White))
        );
    }

    #[test]
    fn display_names() {
        assert_eq!(GameStatus::Checkmate.to_string(), "checkmate");
        assert!(GameStatus::Stalemate.is_terminal());
        assert!(!GameStatus::Check.is_terminal());
    }
}

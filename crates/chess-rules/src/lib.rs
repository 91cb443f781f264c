//! Chess legality engine.
//!
//! This crate provides, in layers:
//! - [`attacks`] - which squares a piece's movement pattern reaches, and
//!   whether a square is attacked by a color
//! - [`legality`] - full move validation, including castling, en passant and
//!   the rule that a move may not leave one's own king in check
//! - [`status`] - classification of the side to move as playing, in check,
//!   checkmated or stalemated
//! - [`Game`] - a board-state manager that applies validated moves and
//!   sequences turns
//!
//! # Architecture
//!
//! Every query borrows a [`BoardView`](chess_core::BoardView) and keeps no
//! state between calls. The attack layer never calls into move legality,
//! which is what lets the legality layer ask "is my king attacked" without
//! recursing into itself. Self-check is tested by playing the move on an
//! owned copy of the board and discarding it.
//!
//! # Example
//!
//! ```
//! use chess_core::{Board, BoardView, Color, Coord};
//! use chess_rules::{game_status, is_valid_move, valid_moves, GameStatus};
//!
//! let board = Board::standard();
//! let pawn = board.piece_at(Coord::new(6, 4)).unwrap();
//! assert!(is_valid_move(&pawn, Coord::new(4, 4), &board, None));
//! assert_eq!(valid_moves(&pawn, &board, None).len(), 2);
//! assert_eq!(game_status(Color::White, &board, None), Ok(GameStatus::Playing));
//! ```

pub mod attacks;
mod error;
mod game;
pub mod legality;
pub mod status;

pub use attacks::{attacks, is_square_attacked};
pub use error::RulesError;
pub use game::{Game, GameError, MoveOutcome};
pub use legality::{en_passant_capture, is_valid_move, valid_moves, validate_move, MoveKind};
pub use status::{game_status, is_in_check, GameStatus};

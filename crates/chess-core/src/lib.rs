//! Core types for chess.
//!
//! This crate provides the data model the rules operate on:
//! - [`Piece`], [`PieceKind`] and [`Color`] for piece records
//! - [`Coord`] for (row, column) board coordinates
//! - [`Board`] snapshots and the [`BoardView`] lookup trait
//! - [`LastMove`], the record that authorizes en passant
//! - FEN setup and serialization

mod board;
mod color;
mod coord;
mod fen;
mod last_move;
mod piece;

pub use board::{Board, BoardError, BoardView};
pub use color::Color;
pub use coord::Coord;
pub use fen::{FenError, FenPosition};
pub use last_move::LastMove;
pub use piece::{Piece, PieceId, PieceKind};

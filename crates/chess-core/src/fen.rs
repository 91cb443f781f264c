//! FEN (Forsyth-Edwards Notation) setup and serialization.
//!
//! FEN ranks are listed from rank 8 down, which is exactly row 0 to row 7
//! of the board, so the placement field maps onto rows in order.

use crate::{Board, BoardView, Color, Coord, LastMove, Piece, PieceKind};
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// A position set up from FEN.
///
/// The castling field is folded into the `has_moved` flags of kings and
/// rooks, and the en passant field into the [`LastMove`] double push that
/// authorizes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenPosition {
    pub board: Board,
    pub side_to_move: Color,
    pub last_move: Option<LastMove>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl FenPosition {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    ///
    /// Piece ids are assigned in reading order starting at 1, so the
    /// starting position gets the same ids as [`Board::standard`].
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let mut pieces = parse_placement(parts[0])?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        apply_castling_rights(&mut pieces, parts[2])?;

        let board =
            Board::new(pieces).map_err(|e| FenError::InvalidPiecePlacement(e.to_string()))?;

        let last_move = parse_en_passant(&board, side_to_move, parts[3])?;

        let halfmove_clock = parts[4]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;

        let fullmove_number = parts[5]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;

        Ok(FenPosition {
            board,
            side_to_move,
            last_move,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Converts the position back to a FEN string.
    pub fn to_fen(&self) -> String {
        let en_passant = self
            .last_move
            .and_then(|m| m.skipped_square())
            .and_then(|sq| sq.to_algebraic())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} {} {} {} {} {}",
            placement(&self.board),
            self.side_to_move.to_fen_char(),
            castling_rights(&self.board),
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl Board {
    /// Parses a FEN string into a board, the side to move, and the last move
    /// implied by its en passant field.
    pub fn from_fen(fen: &str) -> Result<(Board, Color, Option<LastMove>), FenError> {
        let position = FenPosition::parse(fen)?;
        Ok((position.board, position.side_to_move, position.last_move))
    }

    /// Returns the piece placement field for this board.
    pub fn to_fen_placement(&self) -> String {
        placement(self)
    }
}

fn parse_placement(field: &str) -> Result<Vec<Piece>, FenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::InvalidPiecePlacement(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    let mut pieces = Vec::new();
    let mut next_id = 1;
    for (row, rank) in ranks.iter().enumerate() {
        let mut col: u32 = 0;
        for c in rank.chars() {
            if let Some(skip) = c.to_digit(10) {
                col += skip;
            } else if let Some((kind, color)) = PieceKind::from_fen_char(c) {
                if col < 8 {
                    pieces.push(Piece::new(next_id, kind, color, row as i8, col as i8));
                    next_id += 1;
                }
                col += 1;
            } else {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "invalid character '{}' in rank {}",
                    c,
                    8 - row
                )));
            }
        }
        if col != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "rank {} has {} squares, expected 8",
                8 - row,
                col
            )));
        }
    }
    Ok(pieces)
}

/// Marks every king and rook as moved unless a castling right keeps it fresh.
fn apply_castling_rights(pieces: &mut [Piece], field: &str) -> Result<(), FenError> {
    for piece in pieces.iter_mut() {
        if matches!(piece.kind, PieceKind::King | PieceKind::Rook) {
            piece.has_moved = true;
        }
    }
    if field == "-" {
        return Ok(());
    }

    for c in field.chars() {
        let (color, rook_col) = match c {
            'K' => (Color::White, 7),
            'Q' => (Color::White, 0),
            'k' => (Color::Black, 7),
            'q' => (Color::Black, 0),
            _ => {
                return Err(FenError::InvalidCastlingRights(format!(
                    "invalid character '{}'",
                    c
                )))
            }
        };
        let rank = color.back_rank();
        let mut found = 0;
        for piece in pieces.iter_mut().filter(|p| p.color == color) {
            let home = match piece.kind {
                PieceKind::King => Coord::new(rank, 4),
                PieceKind::Rook => Coord::new(rank, rook_col),
                _ => continue,
            };
            if piece.coord() == home {
                piece.has_moved = false;
                found += 1;
            }
        }
        if found != 2 {
            return Err(FenError::InvalidCastlingRights(format!(
                "'{}' needs an unmoved king and rook on their home squares",
                c
            )));
        }
    }
    Ok(())
}

fn parse_en_passant(
    board: &Board,
    side_to_move: Color,
    field: &str,
) -> Result<Option<LastMove>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    let invalid = || FenError::InvalidEnPassantSquare(field.to_string());

    let skipped = Coord::from_algebraic(field).ok_or_else(invalid)?;
    let pusher = side_to_move.opposite();
    // The skipped square sits one row in front of the pusher's start row.
    if skipped.row != pusher.pawn_start_row() + pusher.pawn_direction() {
        return Err(invalid());
    }
    let end = skipped.offset(pusher.pawn_direction(), 0);
    let pawn = board
        .piece_at(end)
        .filter(|p| p.kind == PieceKind::Pawn && p.color == pusher)
        .ok_or_else(invalid)?;
    Ok(Some(LastMove::new(&pawn, Coord::new(pusher.pawn_start_row(), end.col))))
}

fn placement(board: &Board) -> String {
    let mut out = String::new();
    for row in 0..8i8 {
        if row > 0 {
            out.push('/');
        }
        let mut empty = 0;
        for col in 0..8i8 {
            match board.piece_at(Coord::new(row, col)) {
                Some(p) => {
                    if empty > 0 {
                        out.push_str(&empty.to_string());
                        empty = 0;
                    }
                    out.push(p.kind.to_fen_char(p.color));
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push_str(&empty.to_string());
        }
    }
    out
}

fn castling_rights(board: &Board) -> String {
    let fresh = |kind: PieceKind, color: Color, col: i8| {
        board
            .piece_at(Coord::new(color.back_rank(), col))
            .is_some_and(|p| p.kind == kind && p.color == color && !p.has_moved)
    };

    let mut out = String::new();
    for color in Color::ALL {
        if !fresh(PieceKind::King, color, 4) {
            continue;
        }
        for (rook_col, letter) in [(7, 'k'), (0, 'q')] {
            if fresh(PieceKind::Rook, color, rook_col) {
                out.push(match color {
                    Color::White => letter.to_ascii_uppercase(),
                    Color::Black => letter,
                });
            }
        }
    }
    if out.is_empty() {
        out.push('-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_matches_standard_board() {
        let position = FenPosition::parse(FenPosition::STARTPOS).unwrap();
        assert_eq!(position.board, Board::standard());
        assert_eq!(position.side_to_move, Color::White);
        assert_eq!(position.last_move, None);
        assert_eq!(position.halfmove_clock, 0);
        assert_eq!(position.fullmove_number, 1);
    }

    #[test]
    fn roundtrip() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let parsed = FenPosition::parse(fen).unwrap();
        assert_eq!(parsed.to_fen(), fen);
    }

    #[test]
    fn en_passant_field_becomes_double_push() {
        let fen = "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 3";
        let (board, side, last_move) = Board::from_fen(fen).unwrap();
        assert_eq!(side, Color::Black);
        let last_move = last_move.unwrap();
        assert!(last_move.is_double_pawn_push);
        assert_eq!(last_move.from(), Coord::new(6, 4));
        assert_eq!(last_move.to(), Coord::new(4, 4));
        assert_eq!(board.piece_by_id(last_move.piece_id).unwrap().coord(), Coord::new(4, 4));
    }

    #[test]
    fn castling_field_sets_has_moved() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1";
        let (board, _, _) = Board::from_fen(fen).unwrap();
        let at = |row, col| board.piece_at(Coord::new(row, col)).unwrap();
        assert!(!at(7, 4).has_moved);
        assert!(!at(7, 7).has_moved);
        assert!(at(7, 0).has_moved);
        assert!(!at(0, 4).has_moved);
        assert!(!at(0, 0).has_moved);
        assert!(at(0, 7).has_moved);
        assert_eq!(castling_rights(&board), "Kq");
    }

    #[test]
    fn castling_right_without_rook_is_rejected() {
        assert!(matches!(
            FenPosition::parse("4k3/8/8/8/8/8/8/4K3 w K - 0 1"),
            Err(FenError::InvalidCastlingRights(_))
        ));
    }

    #[test]
    fn invalid_fen() {
        assert!(matches!(
            FenPosition::parse("invalid"),
            Err(FenError::InvalidPartCount(_))
        ));
        assert!(matches!(
            FenPosition::parse("8/8/8/8/8/8/8/8 x - - 0 1"),
            Err(FenError::InvalidActiveColor(_))
        ));
    }

    #[test]
    fn invalid_piece_placement() {
        assert!(matches!(
            FenPosition::parse("8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            FenPosition::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            FenPosition::parse("rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
    }

    #[test]
    fn en_passant_needs_a_pushed_pawn() {
        // Right rank, but no black pawn on d5.
        assert!(matches!(
            FenPosition::parse("4k3/8/8/8/8/8/8/4K3 w - d6 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
        // Wrong rank for the side to move.
        assert!(matches!(
            FenPosition::parse("4k3/8/8/3p4/8/8/8/4K3 w - d3 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
        assert!(FenPosition::parse("4k3/8/8/3p4/8/8/8/4K3 w - d6 0 1").is_ok());
    }

    #[test]
    fn invalid_clocks() {
        assert!(matches!(
            FenPosition::parse("4k3/8/8/8/8/8/8/4K3 w - - x 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            FenPosition::parse("4k3/8/8/8/8/8/8/4K3 w - - 0 -1"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
    }
}

//! Board snapshots and the lookup seam the rules read through.

use crate::{Color, Coord, Piece, PieceId, PieceKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when building or mutating a [`Board`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("duplicate piece id {0}")]
    DuplicateId(PieceId),

    #[error("square {0} is already occupied")]
    SquareOccupied(Coord),

    #[error("piece {id} is off the board at {at}")]
    OffBoard { id: PieceId, at: Coord },

    #[error("piece {0} not found")]
    PieceNotFound(PieceId),

    #[error("cannot promote piece {id}: {reason}")]
    InvalidPromotion { id: PieceId, reason: String },
}

/// Read-only access to one instant of the game.
///
/// `pieces` is the unordered snapshot and `piece_at` the square lookup that
/// must agree with it. The default lookup scans the snapshot; implementors
/// with an indexed representation can override it.
pub trait BoardView {
    /// All pieces currently on the board.
    fn pieces(&self) -> &[Piece];

    /// The piece on `at`, if any.
    fn piece_at(&self, at: Coord) -> Option<Piece> {
        self.pieces().iter().find(|p| p.coord() == at).copied()
    }

    /// The piece with the given id, if it is still on the board.
    fn piece_by_id(&self, id: PieceId) -> Option<Piece> {
        self.pieces().iter().find(|p| p.id == id).copied()
    }

    /// The king of `color`, if present.
    fn king(&self, color: Color) -> Option<Piece> {
        self.pieces()
            .iter()
            .find(|p| p.kind == PieceKind::King && p.color == color)
            .copied()
    }
}

/// An owned board snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    pieces: Vec<Piece>,
}

impl Board {
    /// Builds a board, checking that ids and squares are unique and that
    /// every piece stands on the board.
    pub fn new(pieces: Vec<Piece>) -> Result<Self, BoardError> {
        for (i, piece) in pieces.iter().enumerate() {
            if !piece.coord().is_on_board() {
                return Err(BoardError::OffBoard {
                    id: piece.id,
                    at: piece.coord(),
                });
            }
            for other in &pieces[..i] {
                if other.id == piece.id {
                    return Err(BoardError::DuplicateId(piece.id));
                }
                if other.coord() == piece.coord() {
                    return Err(BoardError::SquareOccupied(piece.coord()));
                }
            }
        }
        Ok(Board { pieces })
    }

    /// An independent copy of any view, taken without validation.
    ///
    /// Used for simulation, where the copy is mutated and discarded.
    pub fn snapshot<V: BoardView + ?Sized>(view: &V) -> Self {
        Board {
            pieces: view.pieces().to_vec(),
        }
    }

    /// The standard starting position.
    ///
    /// Ids run 1-8 along black's back rank, 9-16 for black pawns, 17-24 for
    /// white pawns and 25-32 along white's back rank.
    pub fn standard() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut pieces = Vec::with_capacity(32);
        let mut next_id = 1;
        let rows = [
            (0, Color::Black, None),
            (1, Color::Black, Some(PieceKind::Pawn)),
            (6, Color::White, Some(PieceKind::Pawn)),
            (7, Color::White, None),
        ];
        for (row, color, fill) in rows {
            for col in 0..8i8 {
                let kind = fill.unwrap_or(BACK_RANK[col as usize]);
                pieces.push(Piece::new(next_id, kind, color, row, col));
                next_id += 1;
            }
        }
        Board { pieces }
    }

    /// Number of pieces on the board.
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Returns true if the board holds no pieces.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Iterates over the pieces of one color.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(move |p| p.color == color)
    }

    /// Moves a piece to an empty square and marks it as moved.
    pub fn move_piece(&mut self, id: PieceId, to: Coord) -> Result<(), BoardError> {
        if !to.is_on_board() {
            return Err(BoardError::OffBoard { id, at: to });
        }
        if let Some(occupant) = self.piece_at(to) {
            if occupant.id != id {
                return Err(BoardError::SquareOccupied(to));
            }
        }
        let piece = self
            .pieces
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(BoardError::PieceNotFound(id))?;
        piece.row = to.row;
        piece.col = to.col;
        piece.has_moved = true;
        Ok(())
    }

    /// Removes a piece by id and returns it.
    pub fn remove_piece(&mut self, id: PieceId) -> Result<Piece, BoardError> {
        let index = self
            .pieces
            .iter()
            .position(|p| p.id == id)
            .ok_or(BoardError::PieceNotFound(id))?;
        Ok(self.pieces.remove(index))
    }

    /// Removes whatever stands on `at`.
    pub fn remove_piece_at(&mut self, at: Coord) -> Option<Piece> {
        let index = self.pieces.iter().position(|p| p.coord() == at)?;
        Some(self.pieces.remove(index))
    }

    /// Sets a piece's square without any checks or bookkeeping.
    ///
    /// Returns false if no piece has that id.
    pub fn relocate(&mut self, id: PieceId, to: Coord) -> bool {
        match self.pieces.iter_mut().find(|p| p.id == id) {
            Some(piece) => {
                piece.row = to.row;
                piece.col = to.col;
                true
            }
            None => false,
        }
    }

    /// Turns a pawn standing on its promotion row into `kind`.
    pub fn promote_pawn(&mut self, id: PieceId, kind: PieceKind) -> Result<(), BoardError> {
        let piece = self
            .pieces
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(BoardError::PieceNotFound(id))?;
        let reason = if piece.kind != PieceKind::Pawn {
            Some(format!("it is a {}", piece.kind))
        } else if piece.row != piece.color.promotion_row() {
            Some(format!("pawn is not on its promotion row (row {})", piece.row))
        } else if !kind.is_promotion_target() {
            Some(format!("cannot promote to {}", kind))
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(BoardError::InvalidPromotion { id, reason });
        }
        piece.kind = kind;
        Ok(())
    }

    /// Renders the board with rank and file labels, white at the bottom.
    ///
    /// With `glyphs` set, pieces are drawn as Unicode chess symbols;
    /// otherwise as FEN letters.
    pub fn diagram(&self, glyphs: bool) -> String {
        let mut out = String::new();
        for row in 0..8i8 {
            out.push_str(&format!("{} ", 8 - row));
            for col in 0..8i8 {
                let c = match self.piece_at(Coord::new(row, col)) {
                    Some(p) if glyphs => p.kind.glyph(p.color),
                    Some(p) => p.kind.to_fen_char(p.color),
                    None => '.',
                };
                out.push(' ');
                out.push(c);
            }
            out.push('\n');
        }
        out.push_str("   a b c d e f g h\n");
        out
    }
}

impl BoardView for Board {
    fn pieces(&self) -> &[Piece] {
        &self.pieces
    }
}

impl BoardView for [Piece] {
    fn pieces(&self) -> &[Piece] {
        self
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diagram(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout() {
        let board = Board::standard();
        assert_eq!(board.len(), 32);
        assert_eq!(
            board.piece_at(Coord::new(7, 4)).map(|p| (p.id, p.kind, p.color)),
            Some((29, PieceKind::King, Color::White))
        );
        assert_eq!(
            board.piece_at(Coord::new(0, 3)).map(|p| (p.id, p.kind)),
            Some((4, PieceKind::Queen))
        );
        assert_eq!(board.piece_at(Coord::new(1, 0)).map(|p| p.id), Some(9));
        assert_eq!(board.piece_at(Coord::new(6, 7)).map(|p| p.id), Some(24));
        assert!(board.piece_at(Coord::new(4, 4)).is_none());
        assert_eq!(board.king(Color::Black).map(|k| k.id), Some(5));
        assert_eq!(board.pieces_of(Color::White).count(), 16);
    }

    #[test]
    fn rejects_duplicates() {
        let a = Piece::new(1, PieceKind::King, Color::White, 7, 4);
        let b = Piece::new(1, PieceKind::King, Color::Black, 0, 4);
        assert_eq!(Board::new(vec![a, b]), Err(BoardError::DuplicateId(1)));

        let c = Piece::new(2, PieceKind::Rook, Color::Black, 7, 4);
        assert_eq!(
            Board::new(vec![a, c]),
            Err(BoardError::SquareOccupied(Coord::new(7, 4)))
        );
    }

    #[test]
    fn rejects_off_board_pieces() {
        let p = Piece::new(3, PieceKind::Knight, Color::White, 8, 1);
        assert!(matches!(
            Board::new(vec![p]),
            Err(BoardError::OffBoard { id: 3, .. })
        ));
    }

    #[test]
    fn move_piece_marks_moved() {
        let mut board = Board::standard();
        board.remove_piece(30).unwrap();
        board.move_piece(32, Coord::new(7, 5)).unwrap();
        let rook = board.piece_by_id(32).unwrap();
        assert_eq!(rook.coord(), Coord::new(7, 5));
        assert!(rook.has_moved);
    }

    #[test]
    fn move_piece_onto_occupied_square_fails() {
        let mut board = Board::standard();
        assert_eq!(
            board.move_piece(25, Coord::new(6, 0)),
            Err(BoardError::SquareOccupied(Coord::new(6, 0)))
        );
        assert_eq!(
            board.move_piece(99, Coord::new(4, 0)),
            Err(BoardError::PieceNotFound(99))
        );
    }

    #[test]
    fn snapshot_is_independent() {
        let board = Board::standard();
        let mut copy = Board::snapshot(&board);
        copy.remove_piece_at(Coord::new(6, 4));
        assert!(copy.relocate(29, Coord::new(4, 4)));
        assert_eq!(board.len(), 32);
        assert_eq!(board.king(Color::White).unwrap().coord(), Coord::new(7, 4));
    }

    #[test]
    fn promotion_rules() {
        let pawn = Piece::new(17, PieceKind::Pawn, Color::White, 0, 0);
        let stuck = Piece::new(18, PieceKind::Pawn, Color::White, 3, 1);
        let mut board = Board::new(vec![pawn, stuck]).unwrap();

        assert!(matches!(
            board.promote_pawn(17, PieceKind::King),
            Err(BoardError::InvalidPromotion { id: 17, .. })
        ));
        assert!(matches!(
            board.promote_pawn(18, PieceKind::Queen),
            Err(BoardError::InvalidPromotion { id: 18, .. })
        ));
        board.promote_pawn(17, PieceKind::Knight).unwrap();
        assert_eq!(board.piece_by_id(17).unwrap().kind, PieceKind::Knight);
    }

    #[test]
    fn diagram_has_white_at_bottom() {
        let text = Board::standard().diagram(false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8  r n b q k b n r");
        assert_eq!(lines[7], "1  R N B Q K B N R");
        assert_eq!(lines[8], "   a b c d e f g h");
    }

    #[test]
    fn slice_is_a_view() {
        let pieces = [Piece::new(1, PieceKind::King, Color::White, 7, 4)];
        assert_eq!(pieces[..].king(Color::White).map(|k| k.id), Some(1));
        assert!(pieces[..].king(Color::Black).is_none());
    }
}

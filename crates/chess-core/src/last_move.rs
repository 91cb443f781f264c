//! Record of the most recently completed move.

use crate::{Coord, Piece, PieceId, PieceKind};
use serde::{Deserialize, Serialize};

/// The half-move that was just played.
///
/// The rules only consult it to authorize en passant. The caller produces a
/// fresh record after every applied move and hands it to the next query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMove {
    pub piece_id: PieceId,
    pub start_row: i8,
    pub start_col: i8,
    pub end_row: i8,
    pub end_col: i8,
    /// Piece type after the move, i.e. after any promotion.
    pub piece_type: PieceKind,
    pub is_double_pawn_push: bool,
}

impl LastMove {
    /// Builds the record for `piece` (already standing on its destination)
    /// having arrived from `from`.
    pub fn new(piece: &Piece, from: Coord) -> Self {
        LastMove {
            piece_id: piece.id,
            start_row: from.row,
            start_col: from.col,
            end_row: piece.row,
            end_col: piece.col,
            piece_type: piece.kind,
            is_double_pawn_push: piece.kind == PieceKind::Pawn
                && piece.row.abs_diff(from.row) == 2
                && piece.col == from.col,
        }
    }

    /// Returns the origin square.
    #[inline]
    pub const fn from(&self) -> Coord {
        Coord::new(self.start_row, self.start_col)
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(&self) -> Coord {
        Coord::new(self.end_row, self.end_col)
    }

    /// Returns the square a pawn passed over on a double push.
    pub fn skipped_square(&self) -> Option<Coord> {
        self.is_double_pawn_push
            .then(|| Coord::new((self.start_row + self.end_row) / 2, self.end_col))
    }
}

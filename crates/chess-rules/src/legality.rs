//! Full move validation.
//!
//! A move is checked in order: the mover must be on the board as given, the
//! move must match a movement shape (capture, pawn advance, en passant or
//! castling), and finally the move is simulated on a private copy of the
//! board to make sure it does not leave the mover's own king attacked.

use crate::attacks::{attacks, castling_rook, is_square_attacked};
use chess_core::{Board, BoardView, Coord, LastMove, Piece, PieceId, PieceKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How a legal move affects the board beyond relocating the mover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MoveKind {
    /// A move onto an empty square.
    Quiet,
    /// A pawn's two-square advance from its starting row.
    DoublePush,
    /// A capture of the piece standing on the target square.
    Capture { captured: Coord },
    /// A pawn capture of the pawn beside it that just double-pushed.
    #[serde(rename_all = "camelCase")]
    EnPassant { captured: Coord },
    /// A king's two-square step, taking the rook over the crossed square.
    #[serde(rename_all = "camelCase")]
    Castle {
        rook: PieceId,
        rook_from: Coord,
        rook_to: Coord,
    },
}

impl MoveKind {
    /// Returns the square of the piece this move removes, if any.
    #[inline]
    pub const fn captured_square(&self) -> Option<Coord> {
        match *self {
            MoveKind::Capture { captured } | MoveKind::EnPassant { captured } => Some(captured),
            _ => None,
        }
    }

    /// Returns true if this move captures something.
    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.captured_square().is_some()
    }
}

/// Returns true if `piece` may legally move to `target`.
///
/// `last_move` is only consulted for en passant. The board is never
/// modified; self-check is tested on an independent copy.
pub fn is_valid_move<B: BoardView + ?Sized>(
    piece: &Piece,
    target: Coord,
    board: &B,
    last_move: Option<&LastMove>,
) -> bool {
    validate_move(piece, target, board, last_move).is_some()
}

/// Validates a move and classifies it.
///
/// Returns `None` for any illegal move, including queries for a piece that
/// is not on `board` at the square it claims.
pub fn validate_move<B: BoardView + ?Sized>(
    piece: &Piece,
    target: Coord,
    board: &B,
    last_move: Option<&LastMove>,
) -> Option<MoveKind> {
    if !target.is_on_board() || !piece.coord().is_on_board() {
        return None;
    }
    let piece = board
        .piece_by_id(piece.id)
        .filter(|p| p.coord() == piece.coord() && p.kind == piece.kind && p.color == piece.color)?;

    let kind = move_shape(&piece, target, board, last_move)?;

    if !leaves_king_safe(&piece, target, kind, board) {
        return None;
    }

    match kind {
        MoveKind::Castle { rook_from, .. } => {
            debug!(king = piece.id, %target, %rook_from, "castling accepted");
        }
        MoveKind::EnPassant { captured } => {
            debug!(pawn = piece.id, %target, %captured, "en passant accepted");
        }
        _ => {}
    }
    Some(kind)
}

/// Returns every square `piece` may legally move to, scanning row-major.
pub fn valid_moves<B: BoardView + ?Sized>(
    piece: &Piece,
    board: &B,
    last_move: Option<&LastMove>,
) -> Vec<Coord> {
    Coord::all()
        .filter(|&sq| is_valid_move(piece, sq, board, last_move))
        .collect()
}

/// Returns true if `piece` has at least one legal move.
pub fn has_valid_move<B: BoardView + ?Sized>(
    piece: &Piece,
    board: &B,
    last_move: Option<&LastMove>,
) -> bool {
    Coord::all().any(|sq| is_valid_move(piece, sq, board, last_move))
}

/// Returns the square of the pawn `pawn` would capture by moving en passant
/// to `target`, or `None` if that is not an en passant capture.
///
/// The capture is only available right after the opposing pawn's double push
/// landed beside `pawn`, and only against that pawn. Self-check is not
/// considered here.
pub fn en_passant_capture<B: BoardView + ?Sized>(
    pawn: &Piece,
    target: Coord,
    board: &B,
    last_move: Option<&LastMove>,
) -> Option<Coord> {
    let last = last_move.filter(|m| m.is_double_pawn_push)?;
    let from = pawn.coord();
    if !from.is_on_board() || !target.is_on_board() {
        return None;
    }
    if pawn.kind != PieceKind::Pawn
        || from.row != pawn.color.en_passant_row()
        || target.row != from.row + pawn.color.pawn_direction()
        || (target.col - from.col).abs() != 1
        || board.piece_at(target).is_some()
        || last.end_row != from.row
        || last.end_col != target.col
    {
        return None;
    }

    let captured = Coord::new(from.row, target.col);
    board.piece_at(captured).filter(|victim| {
        victim.id == last.piece_id && victim.kind == PieceKind::Pawn && victim.is_enemy_of(pawn)
    })?;
    Some(captured)
}

/// Matches the move against every movement shape, ignoring self-check.
fn move_shape<B: BoardView + ?Sized>(
    piece: &Piece,
    target: Coord,
    board: &B,
    last_move: Option<&LastMove>,
) -> Option<MoveKind> {
    let from = piece.coord();
    let occupant = board.piece_at(target);
    if occupant.is_some_and(|o| o.color == piece.color) {
        return None;
    }

    match piece.kind {
        PieceKind::Pawn => pawn_shape(piece, target, occupant.is_some(), board, last_move),
        PieceKind::King if target.row == from.row && (target.col - from.col).abs() == 2 => {
            let rook = castling_rook(piece, target, board)?;
            Some(MoveKind::Castle {
                rook: rook.id,
                rook_from: rook.coord(),
                rook_to: from.offset(0, (target.col - from.col).signum()),
            })
        }
        _ if attacks(piece, target, board) => Some(match occupant {
            Some(_) => MoveKind::Capture { captured: target },
            None => MoveKind::Quiet,
        }),
        _ => None,
    }
}

fn pawn_shape<B: BoardView + ?Sized>(
    pawn: &Piece,
    target: Coord,
    occupied: bool,
    board: &B,
    last_move: Option<&LastMove>,
) -> Option<MoveKind> {
    if attacks(pawn, target, board) {
        // Diagonal steps must capture, either normally or en passant.
        return if occupied {
            Some(MoveKind::Capture { captured: target })
        } else {
            en_passant_capture(pawn, target, board, last_move)
                .map(|captured| MoveKind::EnPassant { captured })
        };
    }

    let from = pawn.coord();
    let dir = pawn.color.pawn_direction();
    if target.col != from.col || occupied {
        return None;
    }
    if target.row == from.row + dir {
        return Some(MoveKind::Quiet);
    }
    if from.row == pawn.color.pawn_start_row()
        && target.row == from.row + 2 * dir
        && board.piece_at(from.offset(dir, 0)).is_none()
    {
        return Some(MoveKind::DoublePush);
    }
    None
}

/// Plays the move on a private copy of the board and checks whether the
/// mover's king is attacked afterwards.
///
/// A missing king rejects the move.
fn leaves_king_safe<B: BoardView + ?Sized>(
    piece: &Piece,
    target: Coord,
    kind: MoveKind,
    board: &B,
) -> bool {
    let mut sim = Board::snapshot(board);
    if let Some(captured) = kind.captured_square() {
        sim.remove_piece_at(captured);
    }
    if !sim.relocate(piece.id, target) {
        panic!(
            "piece {} disappeared from its own simulated board moving to {}",
            piece.id, target
        );
    }
    if let MoveKind::Castle { rook, rook_to, .. } = kind {
        sim.relocate(rook, rook_to);
    }

    match sim.king(piece.color) {
        Some(king) => !is_square_attacked(king.coord(), piece.color.opposite(), &sim),
        None => {
            warn!(color = %piece.color, "no king on the board, rejecting move");
            false
        }
    }
}

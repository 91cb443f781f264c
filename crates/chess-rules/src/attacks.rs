//! Attack detection for all piece types.
//!
//! Everything here is pure geometry plus path occupancy. Nothing in this
//! module consults move legality, so [`is_square_attacked`] can be called
//! from the legality engine without recursing back into it.

use chess_core::{BoardView, Color, Coord, Piece, PieceKind};

/// Returns true if `piece`'s movement pattern reaches `target`.
///
/// Turn order, the target's occupant and self-check are all ignored. A piece
/// never attacks its own square, and off-board squares are never attacked.
/// For kings a two-square step along the back rank counts when castling that
/// way is fully available (see [`castling_rook`]).
pub fn attacks<B: BoardView + ?Sized>(piece: &Piece, target: Coord, board: &B) -> bool {
    let from = piece.coord();
    if !from.is_on_board() || !target.is_on_board() || from == target {
        return false;
    }

    let d_row = target.row - from.row;
    let d_col = target.col - from.col;

    match piece.kind {
        PieceKind::Pawn => d_col.abs() == 1 && d_row == piece.color.pawn_direction(),
        PieceKind::Knight => {
            (d_row.abs() == 2 && d_col.abs() == 1) || (d_row.abs() == 1 && d_col.abs() == 2)
        }
        PieceKind::Rook => is_straight(d_row, d_col) && path_clear(from, target, board),
        PieceKind::Bishop => is_diagonal(d_row, d_col) && path_clear(from, target, board),
        PieceKind::Queen => {
            (is_straight(d_row, d_col) || is_diagonal(d_row, d_col))
                && path_clear(from, target, board)
        }
        PieceKind::King => {
            if d_row.abs() <= 1 && d_col.abs() <= 1 {
                true
            } else {
                castling_rook(piece, target, board).is_some()
            }
        }
    }
}

/// Returns true if any piece of `by` attacks `target`.
pub fn is_square_attacked<B: BoardView + ?Sized>(target: Coord, by: Color, board: &B) -> bool {
    board
        .pieces()
        .iter()
        .filter(|p| p.color == by)
        .any(|p| attacks(p, target, board))
}

/// Returns every square `piece` attacks, in row-major order.
pub fn attacked_squares<B: BoardView + ?Sized>(piece: &Piece, board: &B) -> Vec<Coord> {
    Coord::all().filter(|&sq| attacks(piece, sq, board)).collect()
}

/// Checks a castling attempt of `king` onto `target` and returns the rook
/// it castles with.
///
/// Requires an unmoved king on its back rank stepping two files sideways,
/// an unmoved rook of the same color in the corner on that side, empty
/// squares between them, and no enemy attack on the king's square, the square
/// it crosses, or its destination.
///
/// The attack test looks at squares on this king's back rank. The enemy
/// king's own castling branch only fires for targets on the enemy back rank,
/// so the nested query cannot come back here.
pub fn castling_rook<B: BoardView + ?Sized>(
    king: &Piece,
    target: Coord,
    board: &B,
) -> Option<Piece> {
    let from = king.coord();
    if !from.is_on_board() || !target.is_on_board() {
        return None;
    }
    let d_col = target.col - from.col;
    if king.kind != PieceKind::King
        || king.has_moved
        || from.row != king.color.back_rank()
        || target.row != from.row
        || d_col.abs() != 2
    {
        return None;
    }

    let dir = d_col.signum();
    let rook_col = if dir > 0 { 7 } else { 0 };
    let rook = board
        .piece_at(Coord::new(from.row, rook_col))
        .filter(|r| r.kind == PieceKind::Rook && r.color == king.color && !r.has_moved)?;

    let mut col = from.col + dir;
    while col != rook_col {
        if board.piece_at(Coord::new(from.row, col)).is_some() {
            return None;
        }
        col += dir;
    }

    let enemy = king.color.opposite();
    let crossed = from.offset(0, dir);
    if [from, crossed, target]
        .into_iter()
        .any(|sq| is_square_attacked(sq, enemy, board))
    {
        return None;
    }

    Some(rook)
}

#[inline]
fn is_straight(d_row: i8, d_col: i8) -> bool {
    d_row == 0 || d_col == 0
}

#[inline]
fn is_diagonal(d_row: i8, d_col: i8) -> bool {
    d_row.abs() == d_col.abs()
}

/// Returns true if every square strictly between `from` and `to` is empty.
///
/// Callers guarantee the two squares share a rank, file, or diagonal.
fn path_clear<B: BoardView + ?Sized>(from: Coord, to: Coord, board: &B) -> bool {
    let step_row = (to.row - from.row).signum();
    let step_col = (to.col - from.col).signum();
    let mut sq = from.offset(step_row, step_col);
    while sq != to {
        if board.piece_at(sq).is_some() {
            return false;
        }
        sq = sq.offset(step_row, step_col);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Board;

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).unwrap().0
    }

    fn at(board: &Board, name: &str) -> Piece {
        board
            .piece_at(Coord::from_algebraic(name).unwrap())
            .unwrap_or_else(|| panic!("no piece on {}", name))
    }

    fn sq(name: &str) -> Coord {
        Coord::from_algebraic(name).unwrap()
    }

    #[test]
    fn pawn_attacks_diagonally_forward_only() {
        let b = board("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        let white = at(&b, "e4");
        assert!(attacks(&white, sq("d5"), &b));
        assert!(attacks(&white, sq("f5"), &b));
        assert!(!attacks(&white, sq("e5"), &b));
        assert!(!attacks(&white, sq("d3"), &b));

        let black = at(&b, "d5");
        assert!(attacks(&black, sq("e4"), &b));
        assert!(attacks(&black, sq("c4"), &b));
        assert!(!attacks(&black, sq("e6"), &b));
    }

    #[test]
    fn knight_jumps_over_pieces() {
        let b = Board::standard();
        let knight = at(&b, "g1");
        assert!(attacks(&knight, sq("f3"), &b));
        assert!(attacks(&knight, sq("h3"), &b));
        assert!(attacks(&knight, sq("e2"), &b));
        assert!(!attacks(&knight, sq("g3"), &b));
        assert_eq!(attacked_squares(&knight, &b).len(), 3);
    }

    #[test]
    fn sliders_are_blocked() {
        let b = board("4k3/8/8/8/8/1p6/8/R2QK2B w - - 0 1");
        let rook = at(&b, "a1");
        assert!(attacks(&rook, sq("a8"), &b));
        assert!(attacks(&rook, sq("d1"), &b));
        assert!(!attacks(&rook, sq("e1"), &b));
        assert!(!attacks(&rook, sq("b2"), &b));

        let bishop = at(&b, "h1");
        assert!(attacks(&bishop, sq("a8"), &b));
        assert!(!attacks(&bishop, sq("h8"), &b));

        let queen = at(&b, "d1");
        assert!(attacks(&queen, sq("b3"), &b));
        assert!(!attacks(&queen, sq("a4"), &b));
        assert!(attacks(&queen, sq("h5"), &b));
        assert!(attacks(&queen, sq("d8"), &b));
        assert!(!attacks(&queen, sq("e3"), &b));
    }

    #[test]
    fn never_attacks_own_square_or_off_board() {
        let b = Board::standard();
        for piece in chess_core::BoardView::pieces(&b) {
            assert!(!attacks(piece, piece.coord(), &b));
            assert!(!attacks(piece, Coord::new(-1, piece.col), &b));
            assert!(!attacks(piece, Coord::new(piece.row, 8), &b));
        }
    }

    #[test]
    fn off_board_piece_attacks_nothing() {
        let stray = Piece::new(99, PieceKind::Queen, Color::White, 9, 9);
        let b = Board::standard();
        assert!(attacked_squares(&stray, &b).is_empty());
    }

    #[test]
    fn square_attacked_by_color() {
        let b = Board::standard();
        assert!(is_square_attacked(sq("f3"), Color::White, &b));
        assert!(is_square_attacked(sq("e3"), Color::White, &b));
        assert!(!is_square_attacked(sq("e4"), Color::White, &b));
        assert!(is_square_attacked(sq("e6"), Color::Black, &b));
        assert!(!is_square_attacked(sq("e6"), Color::White, &b));
    }

    #[test]
    fn king_castling_shape() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let king = at(&b, "e1");
        assert!(attacks(&king, sq("g1"), &b));
        assert!(attacks(&king, sq("c1"), &b));
        assert_eq!(castling_rook(&king, sq("g1"), &b).map(|r| r.coord()), Some(sq("h1")));
        assert!(!attacks(&king, sq("e3"), &b));
    }

    #[test]
    fn castling_blocked_by_attack_on_crossed_square() {
        let b = board("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq - 0 1");
        let king = at(&b, "e1");
        assert!(castling_rook(&king, sq("g1"), &b).is_none());
        assert!(castling_rook(&king, sq("c1"), &b).is_some());
    }

    #[test]
    fn queenside_castling_needs_knight_square_empty() {
        let b = board("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1");
        let king = at(&b, "e1");
        assert!(castling_rook(&king, sq("c1"), &b).is_none());
        assert!(castling_rook(&king, sq("g1"), &b).is_some());
    }

    #[test]
    fn castling_query_with_extreme_coordinates() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let king = at(&b, "e1");
        assert!(castling_rook(&king, Coord::new(7, i8::MIN), &b).is_none());
        assert!(castling_rook(&king, Coord::new(7, i8::MAX), &b).is_none());

        let stray = Piece::new(40, PieceKind::King, Color::White, 7, i8::MIN);
        assert!(castling_rook(&stray, sq("g1"), &b).is_none());
        assert!(!attacks(&stray, sq("g1"), &b));
    }

    #[test]
    fn castling_needs_unmoved_pieces() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1");
        let white_king = at(&b, "e1");
        assert!(castling_rook(&white_king, sq("g1"), &b).is_some());
        assert!(castling_rook(&white_king, sq("c1"), &b).is_none());

        let black_king = at(&b, "e8");
        assert!(castling_rook(&black_king, sq("c8"), &b).is_some());
        assert!(castling_rook(&black_king, sq("g8"), &b).is_none());
    }
}

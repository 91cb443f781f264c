//! Full game management: applying moves and sequencing turns.
//!
//! The rules themselves are stateless. [`Game`] is the caller that owns the
//! board, whose turn it is, and the last-move record, and keeps them
//! consistent after each validated move.

use crate::attacks::is_square_attacked;
use crate::legality::{valid_moves, validate_move, MoveKind};
use crate::status::{game_status, GameStatus};
use crate::RulesError;
use chess_core::{
    Board, BoardError, BoardView, Color, Coord, FenError, FenPosition, LastMove, Piece, PieceId,
    PieceKind,
};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Error type for game operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// The game has already ended.
    #[error("game is over ({0})")]
    GameOver(GameStatus),
    /// No piece with that id is on the board.
    #[error("piece {0} not found")]
    PieceNotFound(PieceId),
    /// The piece belongs to the side not on move.
    #[error("piece {piece} cannot move: it is {to_move}'s turn")]
    NotYourTurn { piece: PieceId, to_move: Color },
    /// The move is not legal in the current position.
    #[error("illegal move: piece {piece} from {from} to {to}")]
    IllegalMove { piece: PieceId, from: Coord, to: Coord },
    /// Pawns may only promote to knight, bishop, rook or queen.
    #[error("cannot promote to {0}")]
    InvalidPromotion(PieceKind),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// What a completed move did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    pub piece_id: PieceId,
    pub from: Coord,
    pub to: Coord,
    pub kind: MoveKind,
    pub captured: Option<Piece>,
    pub promoted_to: Option<PieceKind>,
    /// Status of the side that moves next.
    pub status: GameStatus,
}

/// A chess game in progress.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    side_to_move: Color,
    last_move: Option<LastMove>,
    status: GameStatus,
    /// Pieces taken by each color, indexed by [`Color::index`].
    captured: [Vec<Piece>; 2],
    ply: usize,
    /// Half-moves since the last pawn move or capture.
    halfmove_clock: u32,
    /// Starts at 1 and increments after each black move.
    fullmove_number: u32,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game with the standard starting position.
    pub fn new() -> Self {
        Game {
            board: Board::standard(),
            side_to_move: Color::White,
            last_move: None,
            status: GameStatus::Playing,
            captured: [Vec::new(), Vec::new()],
            ply: 0,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Creates a game from an arbitrary board.
    ///
    /// Fails if either king is missing.
    pub fn from_board(
        board: Board,
        side_to_move: Color,
        last_move: Option<LastMove>,
    ) -> Result<Self, GameError> {
        let other = side_to_move.opposite();
        if board.king(other).is_none() {
            return Err(RulesError::KingNotFound(other).into());
        }
        let status = game_status(side_to_move, &board, last_move.as_ref())?;
        Ok(Game {
            board,
            side_to_move,
            last_move,
            status,
            captured: [Vec::new(), Vec::new()],
            ply: 0,
            halfmove_clock: 0,
            fullmove_number: 1,
        })
    }

    /// Creates a game from a FEN string, keeping its move counters.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let position = FenPosition::parse(fen)?;
        let mut game = Self::from_board(position.board, position.side_to_move, position.last_move)?;
        game.halfmove_clock = position.halfmove_clock;
        game.fullmove_number = position.fullmove_number;
        Ok(game)
    }

    /// Returns the current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the side to move.
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Returns the record of the previous half-move.
    pub fn last_move(&self) -> Option<&LastMove> {
        self.last_move.as_ref()
    }

    /// Returns the status of the side to move.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns true once checkmate or stalemate is reached.
    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the side that delivered checkmate, if any.
    pub fn winner(&self) -> Option<Color> {
        (self.status == GameStatus::Checkmate).then(|| self.side_to_move.opposite())
    }

    /// Returns the pieces `color` has captured, in capture order.
    pub fn captured_by(&self, color: Color) -> &[Piece] {
        &self.captured[color.index()]
    }

    /// Returns the number of half-moves played in this game.
    pub fn ply_count(&self) -> usize {
        self.ply
    }

    /// Returns the half-moves played since the last pawn move or capture.
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Returns the FEN fullmove number.
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Returns the current position as a FEN string.
    pub fn to_fen(&self) -> String {
        FenPosition {
            board: self.board.clone(),
            side_to_move: self.side_to_move,
            last_move: self.last_move,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_fen()
    }

    /// Returns true if `color` attacks `at` in the current position.
    pub fn is_square_attacked(&self, at: Coord, color: Color) -> bool {
        is_square_attacked(at, color, &self.board)
    }

    /// Returns the legal destinations of a piece.
    ///
    /// Empty for unknown pieces, pieces of the side not on move, and after
    /// the game has ended.
    pub fn legal_moves_for(&self, id: PieceId) -> Vec<Coord> {
        match self.board.piece_by_id(id) {
            Some(piece) if piece.color == self.side_to_move && !self.is_over() => {
                valid_moves(&piece, &self.board, self.last_move.as_ref())
            }
            _ => Vec::new(),
        }
    }

    /// Returns true if the piece may move to `to` now.
    pub fn is_legal(&self, id: PieceId, to: Coord) -> bool {
        self.legal_moves_for(id).contains(&to)
    }

    /// Validates and plays a move.
    ///
    /// A pawn reaching its last row becomes `promotion`, or a queen when no
    /// choice is given. The board is only changed when the whole move
    /// succeeds.
    pub fn make_move(
        &mut self,
        id: PieceId,
        to: Coord,
        promotion: Option<PieceKind>,
    ) -> Result<MoveOutcome, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver(self.status));
        }
        if let Some(kind) = promotion.filter(|k| !k.is_promotion_target()) {
            return Err(GameError::InvalidPromotion(kind));
        }
        let piece = self
            .board
            .piece_by_id(id)
            .ok_or(GameError::PieceNotFound(id))?;
        if piece.color != self.side_to_move {
            return Err(GameError::NotYourTurn {
                piece: id,
                to_move: self.side_to_move,
            });
        }
        let from = piece.coord();
        let kind = validate_move(&piece, to, &self.board, self.last_move.as_ref())
            .ok_or(GameError::IllegalMove { piece: id, from, to })?;

        let mut board = self.board.clone();
        let captured = kind
            .captured_square()
            .and_then(|sq| board.remove_piece_at(sq));
        board.move_piece(id, to)?;
        if let MoveKind::Castle { rook, rook_to, .. } = kind {
            board.move_piece(rook, rook_to)?;
        }

        let promoted_to = if piece.kind == PieceKind::Pawn && to.row == piece.color.promotion_row()
        {
            let choice = promotion.unwrap_or(PieceKind::Queen);
            board.promote_pawn(id, choice)?;
            Some(choice)
        } else {
            None
        };

        let moved = board.piece_by_id(id).ok_or(GameError::PieceNotFound(id))?;
        let last_move = LastMove::new(&moved, from);
        let next = self.side_to_move.opposite();
        let status = game_status(next, &board, Some(&last_move))?;

        self.board = board;
        self.last_move = Some(last_move);
        self.side_to_move = next;
        self.status = status;
        self.ply += 1;
        if piece.kind == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if piece.color == Color::Black {
            self.fullmove_number += 1;
        }
        if let Some(taken) = captured {
            self.captured[piece.color.index()].push(taken);
        }

        info!(
            piece = id,
            kind = %piece.kind,
            %from,
            %to,
            captured = captured.map(|p| p.id),
            %status,
            "move applied"
        );
        if status.is_terminal() {
            info!(%status, winner = ?self.winner(), "game over");
        }

        Ok(MoveOutcome {
            piece_id: id,
            from,
            to,
            kind,
            captured,
            promoted_to,
            status,
        })
    }
}

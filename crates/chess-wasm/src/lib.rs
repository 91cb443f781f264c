//! WebAssembly bindings for the chess rules.
//!
//! The 3D board frontend owns rendering, picking and animation; it asks this
//! module which squares to highlight, whether a drop is legal, and what the
//! board looks like after a move.
//!
//! # Usage
//!
//! ```javascript
//! import init, { ChessGame } from 'chess-wasm';
//!
//! await init();
//!
//! const game = new ChessGame();
//! const targets = game.validMoves(21);      // [{row: 4, col: 4}, {row: 5, col: 4}]
//! const outcome = game.makeMove(21, 4, 4);  // {pieceId: 21, kind: {kind: "doublePush"}, ...}
//! console.log(game.status(), game.currentPlayer());
//! ```

use chess_core::{BoardView, Color, Coord, PieceId, PieceKind};
use chess_rules::{Game, MoveOutcome};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

/// A chess game that can be driven from JavaScript.
#[wasm_bindgen]
pub struct ChessGame {
    game: Game,
}

#[wasm_bindgen]
impl ChessGame {
    /// Creates a new game with the standard starting position.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        ChessGame { game: Game::new() }
    }

    /// Creates a game from a FEN string.
    ///
    /// Returns an error if the FEN is invalid or a king is missing.
    #[wasm_bindgen(js_name = fromFen)]
    pub fn from_fen(fen: &str) -> Result<ChessGame, JsError> {
        let game = Game::from_fen(fen).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(ChessGame { game })
    }

    /// Returns the current position as a FEN string.
    #[wasm_bindgen(js_name = toFen)]
    pub fn to_fen(&self) -> String {
        self.game.to_fen()
    }

    /// Returns every piece record on the board.
    #[wasm_bindgen(js_name = boardState)]
    pub fn board_state(&self) -> Result<JsValue, JsError> {
        to_js(self.game.board().pieces())
    }

    /// Returns the piece on a square, or null.
    #[wasm_bindgen(js_name = pieceAt)]
    pub fn piece_at(&self, row: i8, col: i8) -> Result<JsValue, JsError> {
        to_js(&self.game.board().piece_at(Coord::new(row, col)))
    }

    /// Returns the legal destinations of a piece as `{row, col}` objects.
    #[wasm_bindgen(js_name = validMoves)]
    pub fn valid_moves(&self, piece_id: PieceId) -> Result<JsValue, JsError> {
        to_js(&self.game.legal_moves_for(piece_id))
    }

    /// Returns true if the piece may move to the square now.
    #[wasm_bindgen(js_name = isValidMove)]
    pub fn is_valid_move(&self, piece_id: PieceId, row: i8, col: i8) -> bool {
        self.game.is_legal(piece_id, Coord::new(row, col))
    }

    /// Plays a move and returns what happened.
    ///
    /// `promotion` is one of "queen", "rook", "bishop", "knight" (or the
    /// piece letter); pawns reaching the last row become queens otherwise.
    #[wasm_bindgen(js_name = makeMove)]
    pub fn make_move(
        &mut self,
        piece_id: PieceId,
        row: i8,
        col: i8,
        promotion: Option<String>,
    ) -> Result<JsValue, JsError> {
        let outcome = self
            .play(piece_id, row, col, promotion.as_deref())
            .map_err(|e| JsError::new(&e))?;
        to_js(&outcome)
    }

    /// Returns "playing", "check", "checkmate" or "stalemate".
    pub fn status(&self) -> String {
        self.game.status().to_string()
    }

    /// Returns the side to move ("white" or "black").
    #[wasm_bindgen(js_name = currentPlayer)]
    pub fn current_player(&self) -> String {
        color_name(self.game.side_to_move()).to_string()
    }

    /// Returns the previous half-move record, or null at the start.
    #[wasm_bindgen(js_name = lastMove)]
    pub fn last_move(&self) -> Result<JsValue, JsError> {
        to_js(&self.game.last_move())
    }

    /// Returns the pieces captured by "white" or "black".
    #[wasm_bindgen(js_name = capturedBy)]
    pub fn captured_by(&self, color: &str) -> Result<JsValue, JsError> {
        let color = parse_color(color).map_err(|e| JsError::new(&e))?;
        to_js(self.game.captured_by(color))
    }

    /// Returns true if `color` ("white" or "black") attacks the square.
    #[wasm_bindgen(js_name = isSquareAttacked)]
    pub fn is_square_attacked(&self, row: i8, col: i8, color: &str) -> Result<bool, JsError> {
        let color = parse_color(color).map_err(|e| JsError::new(&e))?;
        Ok(self.game.is_square_attacked(Coord::new(row, col), color))
    }

    /// Resets the game to the starting position.
    pub fn reset(&mut self) {
        self.game = Game::new();
    }
}

impl ChessGame {
    fn play(
        &mut self,
        piece_id: PieceId,
        row: i8,
        col: i8,
        promotion: Option<&str>,
    ) -> Result<MoveOutcome, String> {
        let promotion = promotion.map(str::parse::<PieceKind>).transpose()?;
        self.game
            .make_move(piece_id, Coord::new(row, col), promotion)
            .map_err(|e| e.to_string())
    }
}

impl Default for ChessGame {
    fn default() -> Self {
        Self::new()
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsError::new(&e.to_string()))
}

fn parse_color(name: &str) -> Result<Color, String> {
    match name {
        "white" | "w" => Ok(Color::White),
        "black" | "b" => Ok(Color::Black),
        other => Err(format!("unknown color '{}'", other)),
    }
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

//! Browser-side checks for the JavaScript surface. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use chess_core::{Piece, PieceKind};
use chess_wasm::ChessGame;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn board_state_lists_all_pieces() {
    let game = ChessGame::new();
    let pieces: Vec<Piece> = serde_wasm_bindgen::from_value(game.board_state().unwrap()).unwrap();
    assert_eq!(pieces.len(), 32);
    assert_eq!(pieces.iter().filter(|p| p.kind == PieceKind::Pawn).count(), 16);
}

#[wasm_bindgen_test]
fn empty_square_is_null() {
    let game = ChessGame::new();
    assert!(game.piece_at(4, 4).unwrap().is_null());
    assert!(!game.piece_at(6, 4).unwrap().is_null());
}

#[wasm_bindgen_test]
fn make_move_then_last_move() {
    let mut game = ChessGame::new();
    assert!(game.last_move().unwrap().is_null());
    game.make_move(21, 4, 4, None).unwrap();
    assert!(!game.last_move().unwrap().is_null());
    assert_eq!(game.current_player(), "black");
}

#[wasm_bindgen_test]
fn illegal_move_is_an_error() {
    let mut game = ChessGame::new();
    assert!(game.make_move(21, 3, 4, None).is_err());
    assert!(ChessGame::from_fen("not a fen").is_err());
}

#[wasm_bindgen_test]
fn square_attack_by_color_name() {
    let game = ChessGame::new();
    assert!(game.is_square_attacked(5, 4, "white").unwrap());
    assert!(!game.is_square_attacked(4, 4, "black").unwrap());
    assert!(game.is_square_attacked(4, 4, "green").is_err());
}

//! Parsing of lines typed during `chess play`.

use chess_core::{Coord, PieceKind};
use thiserror::Error;

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Move the piece on `from` to `to`.
    Move {
        from: Coord,
        to: Coord,
        promotion: Option<PieceKind>,
    },
    /// List the destinations of the piece on a square.
    Moves(Coord),
    Board,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("empty input")]
    Empty,
    #[error("not a square: '{0}'")]
    BadSquare(String),
    #[error("not a promotion piece: '{0}'")]
    BadPromotion(String),
    #[error("unrecognized input: '{0}' (type 'help')")]
    Unrecognized(String),
}

/// Parses a square name such as `e4`.
pub fn parse_square(text: &str) -> Result<Coord, InputError> {
    Coord::from_algebraic(&text.to_ascii_lowercase())
        .ok_or_else(|| InputError::BadSquare(text.to_string()))
}

/// Parses a line like `e2 e4`, `e2e4`, `e7e8q`, `e7 e8 knight`, `moves g1`,
/// `board`, `help` or `quit`.
pub fn parse_input(line: &str) -> Result<Input, InputError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => Err(InputError::Empty),
        ["quit" | "exit" | "q"] => Ok(Input::Quit),
        ["board"] => Ok(Input::Board),
        ["help" | "?"] => Ok(Input::Help),
        ["moves", square] => Ok(Input::Moves(parse_square(square)?)),
        [from, to] => move_input(from, to, None),
        [from, to, promotion] => move_input(from, to, Some(promotion)),
        [compact] if compact.is_ascii() && (compact.len() == 4 || compact.len() == 5) => {
            let (from, rest) = compact.split_at(2);
            let (to, promotion) = rest.split_at(2);
            let promotion = (!promotion.is_empty()).then_some(promotion);
            move_input(from, to, promotion)
        }
        _ => Err(InputError::Unrecognized(line.trim().to_string())),
    }
}

fn move_input(from: &str, to: &str, promotion: Option<&str>) -> Result<Input, InputError> {
    let promotion = promotion
        .map(|text| match text.parse::<PieceKind>() {
            Ok(kind) if kind.is_promotion_target() => Ok(kind),
            _ => Err(InputError::BadPromotion(text.to_string())),
        })
        .transpose()?;
    Ok(Input::Move {
        from: parse_square(from)?,
        to: parse_square(to)?,
        promotion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Coord {
        Coord::from_algebraic(name).unwrap()
    }

    #[test]
    fn spaced_and_compact_moves() {
        let expected = Input::Move {
            from: sq("e2"),
            to: sq("e4"),
            promotion: None,
        };
        assert_eq!(parse_input("e2 e4"), Ok(expected));
        assert_eq!(parse_input("  e2e4\n"), Ok(expected));
        assert_eq!(parse_input("E2E4"), Ok(expected));
    }

    #[test]
    fn promotion_suffix() {
        let expected = Input::Move {
            from: sq("e7"),
            to: sq("e8"),
            promotion: Some(PieceKind::Knight),
        };
        assert_eq!(parse_input("e7e8n"), Ok(expected));
        assert_eq!(parse_input("e7 e8 knight"), Ok(expected));
        assert_eq!(
            parse_input("e7e8k"),
            Err(InputError::BadPromotion("k".to_string()))
        );
    }

    #[test]
    fn commands() {
        assert_eq!(parse_input("quit"), Ok(Input::Quit));
        assert_eq!(parse_input("board"), Ok(Input::Board));
        assert_eq!(parse_input("help"), Ok(Input::Help));
        assert_eq!(parse_input("moves g1"), Ok(Input::Moves(sq("g1"))));
    }

    #[test]
    fn rejects_nonsense() {
        assert_eq!(parse_input("   "), Err(InputError::Empty));
        assert_eq!(
            parse_input("z9 e4"),
            Err(InputError::BadSquare("z9".to_string()))
        );
        assert!(matches!(
            parse_input("castle kingside now please"),
            Err(InputError::Unrecognized(_))
        ));
        assert!(matches!(parse_input("e2e"), Err(InputError::Unrecognized(_))));
    }
}

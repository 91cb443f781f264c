//! Board coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A (row, column) pair on the board.
///
/// Row 0 is black's back rank (rank 8) and column 0 is the a-file. Both
/// components are signed so that off-board targets can be represented and
/// rejected instead of wrapping.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: i8,
    pub col: i8,
}

impl Coord {
    /// Creates a coordinate.
    #[inline]
    pub const fn new(row: i8, col: i8) -> Self {
        Coord { row, col }
    }

    /// Returns true if both components lie in 0..=7.
    #[inline]
    pub const fn is_on_board(self) -> bool {
        self.row >= 0 && self.row < 8 && self.col >= 0 && self.col < 8
    }

    /// Returns the coordinate shifted by the given deltas.
    #[inline]
    pub const fn offset(self, d_row: i8, d_col: i8) -> Self {
        Coord::new(self.row + d_row, self.col + d_col)
    }

    /// Iterates over all 64 squares in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..8).flat_map(|row| (0..8).map(move |col| Coord::new(row, col)))
    }

    /// Parses a square from algebraic notation (e.g., "e4").
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return None;
        }
        Some(Coord::new(7 - (rank - b'1') as i8, (file - b'a') as i8))
    }

    /// Returns the algebraic notation, or `None` when off the board.
    pub fn to_algebraic(self) -> Option<String> {
        if !self.is_on_board() {
            return None;
        }
        let file = (b'a' + self.col as u8) as char;
        let rank = (b'8' - self.row as u8) as char;
        Some(format!("{}{}", file, rank))
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_algebraic() {
            Some(name) => write!(f, "Coord({}, {} = {})", self.row, self.col, name),
            None => write!(f, "Coord({}, {})", self.row, self.col),
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_algebraic() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "[{}, {}]", self.row, self.col),
        }
    }
}

impl From<(i8, i8)> for Coord {
    fn from((row, col): (i8, i8)) -> Self {
        Coord::new(row, col)
    }
}

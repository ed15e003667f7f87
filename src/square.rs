use std::fmt;

use serde::{Deserialize, Serialize};

/// A board square, 0..63, row-major from a8 (0) to h1 (63).
/// `row = index / 8` (row 0 is rank 8), `col = index % 8` (col 0 is file a).
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Square(u8);

impl Square {
    pub fn new(index: usize) -> Option<Square> {
        (index < 64).then_some(Square(index as u8))
    }

    pub fn from_row_col(row: usize, col: usize) -> Option<Square> {
        if row < 8 && col < 8 {
            Some(Square((row * 8 + col) as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn row(self) -> usize {
        self.index() / 8
    }

    pub fn col(self) -> usize {
        self.index() % 8
    }

    /// Step by a row/column delta. Returns `None` when the step leaves the
    /// board, so a ray or jump can never wrap from one edge file to the other.
    pub fn offset(self, dr: i32, dc: i32) -> Option<Square> {
        let r = self.row() as i32 + dr;
        let c = self.col() as i32 + dc;
        if (0..8).contains(&r) && (0..8).contains(&c) {
            Square::from_row_col(r as usize, c as usize)
        } else {
            None
        }
    }

    /// Parses `e4`-style coordinates.
    pub fn from_algebraic(s: &str) -> Option<Square> {
        let mut chars = s.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        let col = file as usize - 'a' as usize;
        let row = 7 - (rank as usize - '1' as usize);
        Square::from_row_col(row, col)
    }

    pub fn to_algebraic(self) -> String {
        self.to_string()
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.col() as u8) as char;
        let rank = (b'8' - self.row() as u8) as char;
        write!(f, "{file}{rank}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_layout_starts_at_a8() {
        assert_eq!(Square::from_algebraic("a8"), Square::new(0));
        assert_eq!(Square::from_algebraic("h1"), Square::new(63));
        assert_eq!(Square::from_algebraic("e2"), Square::new(52));
        assert_eq!(Square::from_algebraic("e4").map(Square::index), Some(36));
        assert_eq!(Square::new(44).map(|s| s.to_string()).as_deref(), Some("e3"));
    }

    #[test]
    fn offset_rejects_file_wraparound() {
        let h4 = Square::from_algebraic("h4").unwrap();
        assert_eq!(h4.offset(0, 1), None);
        assert_eq!(h4.offset(-1, 1), None);
        let a1 = Square::from_algebraic("a1").unwrap();
        assert_eq!(a1.offset(1, 0), None);
        assert_eq!(a1.offset(-2, 1), Square::from_algebraic("b3"));
    }

    #[test]
    fn malformed_coordinates_are_rejected() {
        for bad in ["", "e", "i1", "a9", "a0", "e44", "E4"] {
            assert_eq!(Square::from_algebraic(bad), None, "{bad}");
        }
        assert_eq!(Square::new(64), None);
    }
}

use serde::{Deserialize, Serialize};

use crate::error::NotationError;
use crate::piece::{Color, Piece, PieceType};
use crate::square::Square;

/// The 8×8 grid and what occupies each square. Row 0 is rank 8.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board { squares: [[None; 8]; 8] }
    }

    /// Standard starting layout.
    pub fn initial() -> Self {
        const BACK: [PieceType; 8] = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        let mut squares = [[None; 8]; 8];
        for color in [Color::White, Color::Black] {
            for (col, pt) in BACK.iter().enumerate() {
                squares[color.back_row()][col] = Some(Piece::new(*pt, color));
            }
            for sq in &mut squares[color.pawn_row()] {
                *sq = Some(Piece::new(PieceType::Pawn, color));
            }
        }
        Board { squares }
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.row()][sq.col()]
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    /// Place (or clear, with `None`) a square. Used when building positions.
    pub fn put(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.row()][sq.col()] = piece;
    }

    /// Returns a new board with the piece on `from` relocated to `to`,
    /// replacing whatever stood there. `promote_to` changes the moved
    /// piece's type on arrival.
    pub fn with_piece_moved(&self, from: Square, to: Square, promote_to: Option<PieceType>) -> Board {
        let mut next = self.clone();
        let moved = next.piece_at(from).map(|p| match promote_to {
            Some(pt) => Piece::new(pt, p.color),
            None => p,
        });
        next.put(from, None);
        next.put(to, moved);
        next
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.is(PieceType::King, color))
            .map(|(sq, _)| sq)
    }

    /// Placement field of the position notation: ranks 8 to 1, `/`-separated,
    /// runs of empty squares collapsed to their count.
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for (row, rank) in self.squares.iter().enumerate() {
            let mut empty = 0;
            for sq in rank {
                match sq {
                    Some(p) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(p.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if row != 7 {
                out.push('/');
            }
        }
        out
    }

    pub fn from_placement(field: &str) -> Result<Board, NotationError> {
        let ranks: Vec<&str> = field.split('/').collect();
        if ranks.len() != 8 {
            return Err(NotationError::RankCount(ranks.len()));
        }

        let mut board = Board::empty();
        for (row, rank) in ranks.iter().enumerate() {
            let mut col = 0usize;
            for c in rank.chars() {
                if let Some(run) = c.to_digit(10) {
                    if run == 0 {
                        return Err(NotationError::PieceLetter(c));
                    }
                    col += run as usize;
                } else {
                    let piece = Piece::from_char(c).ok_or(NotationError::PieceLetter(c))?;
                    if col < 8 {
                        board.squares[row][col] = Some(piece);
                    }
                    col += 1;
                }
                if col > 8 {
                    break;
                }
            }
            if col != 8 {
                return Err(NotationError::RankWidth { rank: 8 - row, squares: col });
            }
        }
        Ok(board)
    }

    /// Text diagram for terminal front ends, rank 8 at the top.
    pub fn diagram(&self) -> String {
        let mut out = String::new();
        for (row, rank) in self.squares.iter().enumerate() {
            out.push_str(&format!("{} ", 8 - row));
            for sq in rank {
                out.push(' ');
                out.push(sq.map(|p| p.to_char()).unwrap_or('.'));
            }
            out.push('\n');
        }
        out.push_str("   a b c d e f g h\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn initial_layout_has_white_at_the_bottom() {
        let board = Board::initial();
        assert_eq!(board.piece_at(sq("e1")), Some(Piece::new(PieceType::King, Color::White)));
        assert_eq!(board.piece_at(sq("d8")), Some(Piece::new(PieceType::Queen, Color::Black)));
        assert_eq!(board.piece_at(sq("e2")), Some(Piece::new(PieceType::Pawn, Color::White)));
        assert!(board.is_empty(sq("e4")));
        assert_eq!(board.pieces().count(), 32);
    }

    #[test]
    fn placement_collapses_empty_runs() {
        assert_eq!(Board::initial().placement(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
        let moved = Board::initial().with_piece_moved(sq("e2"), sq("e4"), None);
        assert_eq!(moved.placement(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
    }

    #[test]
    fn with_piece_moved_leaves_the_source_untouched() {
        let board = Board::initial();
        let next = board.with_piece_moved(sq("g1"), sq("f3"), None);
        assert!(board.is_empty(sq("f3")));
        assert!(next.is_empty(sq("g1")));
        assert_eq!(next.piece_at(sq("f3")), Some(Piece::new(PieceType::Knight, Color::White)));
    }

    #[test]
    fn with_piece_moved_can_promote() {
        let mut board = Board::empty();
        board.put(sq("b7"), Some(Piece::new(PieceType::Pawn, Color::White)));
        board.put(sq("a8"), Some(Piece::new(PieceType::Rook, Color::Black)));
        let next = board.with_piece_moved(sq("b7"), sq("a8"), Some(PieceType::Knight));
        assert_eq!(next.piece_at(sq("a8")), Some(Piece::new(PieceType::Knight, Color::White)));
        assert_eq!(next.pieces().count(), 1);
    }

    #[test]
    fn placement_import_rejects_short_and_long_ranks() {
        assert_eq!(
            Board::from_placement("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"),
            Err(NotationError::RankWidth { rank: 7, squares: 7 })
        );
        assert!(matches!(
            Board::from_placement("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR"),
            Err(NotationError::RankWidth { rank: 6, .. })
        ));
        assert_eq!(Board::from_placement("8/8/8"), Err(NotationError::RankCount(3)));
        assert_eq!(
            Board::from_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX"),
            Err(NotationError::PieceLetter('X'))
        );
    }

    #[test]
    fn find_king_locates_each_side() {
        let board = Board::initial();
        assert_eq!(board.find_king(Color::White), Some(sq("e1")));
        assert_eq!(board.find_king(Color::Black), Some(sq("e8")));
        assert_eq!(Board::empty().find_king(Color::White), None);
    }
}

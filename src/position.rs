use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::NotationError;
use crate::piece::Color;
use crate::square::Square;

/// Standard starting position.
pub const START_NOTATION: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Which castlings are still allowed. A right survives while the king and the
/// rook have never moved, whether or not the path is currently blocked.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        CastlingRights {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn none() -> Self {
        CastlingRights {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    /// The king moved: both of its flags go.
    pub fn revoke_king(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// Something left or landed on `sq`. If it is a rook's home corner the
    /// matching flag goes, covering both a rook move and a rook capture.
    pub fn touch(&mut self, sq: Square) {
        match (sq.row(), sq.col()) {
            (7, 0) => self.white_queenside = false,
            (7, 7) => self.white_kingside = false,
            (0, 0) => self.black_queenside = false,
            (0, 7) => self.black_kingside = false,
            _ => {}
        }
    }

    /// Castling field: letters in K, Q, k, q order, or `-`.
    pub fn to_field(&self) -> String {
        let mut out = String::new();
        if self.white_kingside {
            out.push('K');
        }
        if self.white_queenside {
            out.push('Q');
        }
        if self.black_kingside {
            out.push('k');
        }
        if self.black_queenside {
            out.push('q');
        }
        if out.is_empty() {
            out.push('-');
        }
        out
    }

    pub fn from_field(field: &str) -> Result<Self, NotationError> {
        let mut rights = CastlingRights::none();
        if field == "-" {
            return Ok(rights);
        }
        if field.is_empty() {
            return Err(NotationError::Castling(field.to_string()));
        }
        for c in field.chars() {
            let flag = match c {
                'K' => &mut rights.white_kingside,
                'Q' => &mut rights.white_queenside,
                'k' => &mut rights.black_kingside,
                'q' => &mut rights.black_queenside,
                _ => return Err(NotationError::Castling(field.to_string())),
            };
            if *flag {
                return Err(NotationError::Castling(field.to_string()));
            }
            *flag = true;
        }
        Ok(rights)
    }
}

/// A complete game state. Values are never mutated once built; moving
/// produces a new `Position` (see [`crate::execute::apply`]).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    board: Board,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self::initial()
    }
}

impl Position {
    pub fn new(
        board: Board,
        side_to_move: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Self {
        Position {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number: fullmove_number.max(1),
        }
    }

    pub fn initial() -> Self {
        Position::new(Board::initial(), Color::White, CastlingRights::all(), None, 0, 1)
    }

    /// A position with the given board and side to move and no castling rights.
    /// Handy for composing test positions.
    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        Position::new(board, side_to_move, CastlingRights::none(), None, 0, 1)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Identity for repetition counting: placement, side to move, castling
    /// rights and en-passant target. The clocks are left out.
    pub fn position_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.board.hash(&mut hasher);
        self.side_to_move.hash(&mut hasher);
        self.castling.hash(&mut hasher);
        self.en_passant.hash(&mut hasher);
        hasher.finish()
    }

    /// The 6-field position notation string.
    pub fn to_notation(&self) -> String {
        let ep = self
            .en_passant
            .map(|sq| sq.to_algebraic())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} {} {} {} {} {}",
            self.board.placement(),
            self.side_to_move.to_char(),
            self.castling.to_field(),
            ep,
            self.halfmove_clock,
            self.fullmove_number,
        )
    }

    pub fn from_notation(text: &str) -> Result<Position, NotationError> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(NotationError::FieldCount(fields.len()));
        }

        let board = Board::from_placement(fields[0])?;

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(NotationError::SideToMove(other.to_string())),
        };

        let castling = CastlingRights::from_field(fields[2])?;

        let en_passant = match fields[3] {
            "-" => None,
            s => {
                let sq = Square::from_algebraic(s)
                    .ok_or_else(|| NotationError::EnPassant(s.to_string()))?;
                // The skipped square lies behind the pawn that just moved:
                // rank 6 when White is to reply, rank 3 when Black is.
                let expected_row = match side_to_move {
                    Color::White => 2,
                    Color::Black => 5,
                };
                if sq.row() != expected_row {
                    return Err(NotationError::EnPassant(s.to_string()));
                }
                Some(sq)
            }
        };

        let halfmove_clock = fields[4]
            .parse::<u32>()
            .map_err(|_| NotationError::Counter(fields[4].to_string()))?;
        let fullmove_number = fields[5]
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| NotationError::Counter(fields[5].to_string()))?;

        Ok(Position {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_notation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_position_exports_standard_notation() {
        assert_eq!(Position::initial().to_notation(), START_NOTATION);
    }

    #[test]
    fn notation_round_trips() {
        for text in [
            START_NOTATION,
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/8/8/8/8/8/8/K6k b - - 37 81",
            "4k3/8/8/8/8/8/8/4K2R w K - 3 12",
        ] {
            let pos = Position::from_notation(text).unwrap();
            assert_eq!(pos.to_notation(), text);
            assert_eq!(Position::from_notation(&pos.to_notation()).unwrap(), pos);
        }
    }

    #[test]
    fn castling_letters_keep_canonical_order() {
        let rights = CastlingRights::from_field("qK").unwrap();
        assert_eq!(rights.to_field(), "Kq");
        assert_eq!(CastlingRights::none().to_field(), "-");
        assert!(CastlingRights::from_field("KK").is_err());
        assert!(CastlingRights::from_field("X").is_err());
    }

    #[test]
    fn rook_corners_revoke_their_own_flag() {
        let mut rights = CastlingRights::all();
        rights.touch(Square::from_algebraic("h1").unwrap());
        assert_eq!(rights.to_field(), "Qkq");
        rights.touch(Square::from_algebraic("a8").unwrap());
        assert_eq!(rights.to_field(), "Qk");
        rights.touch(Square::from_algebraic("e4").unwrap());
        assert_eq!(rights.to_field(), "Qk");
        rights.revoke_king(Color::Black);
        assert_eq!(rights.to_field(), "Q");
    }

    #[test]
    fn position_hash_ignores_the_clocks() {
        let a = Position::from_notation("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let b = Position::from_notation("4k3/8/8/8/8/8/8/4K2R w K - 17 40").unwrap();
        let c = Position::from_notation("4k3/8/8/8/8/8/8/4K2R w - - 0 1").unwrap();
        let d = Position::from_notation("4k3/8/8/8/8/8/8/4K2R b K - 0 1").unwrap();
        assert_eq!(a.position_hash(), b.position_hash());
        assert_ne!(a.position_hash(), c.position_hash());
        assert_ne!(a.position_hash(), d.position_hash());
    }

    #[test]
    fn malformed_notation_is_rejected() {
        assert_eq!(Position::from_notation("8/8/8/8/8/8/8/8 w -"), Err(NotationError::FieldCount(3)));
        assert!(matches!(
            Position::from_notation("8/8/8/8/8/8/8/K6k x - - 0 1"),
            Err(NotationError::SideToMove(_))
        ));
        assert!(matches!(
            Position::from_notation("8/8/8/8/8/8/8/K6k w - e4 0 1"),
            Err(NotationError::EnPassant(_))
        ));
        // Rank 6 belongs to a black double step, so White must be the one to reply.
        assert!(matches!(
            Position::from_notation("4k3/2pp4/8/8/8/8/8/4K3 b - d6 0 1"),
            Err(NotationError::EnPassant(_))
        ));
        assert!(matches!(
            Position::from_notation("4k3/8/8/8/4P3/8/8/4K3 w - e3 0 1"),
            Err(NotationError::EnPassant(_))
        ));
        assert!(matches!(
            Position::from_notation("8/8/8/8/8/8/8/K6k w - - -1 1"),
            Err(NotationError::Counter(_))
        ));
        assert!(matches!(
            Position::from_notation("8/8/8/8/8/8/8/K6k w - - 0 0"),
            Err(NotationError::Counter(_))
        ));
    }
}

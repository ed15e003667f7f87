use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChessError;
use crate::piece::PieceType;
use crate::square::Square;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move { from, to, promotion: None }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: PieceType) -> Self {
        Move { from, to, promotion: Some(promotion) }
    }

    /// Coordinate notation, e.g. "e2e4", "a7a8q".
    pub fn to_uci(&self) -> String {
        let promo = self.promotion.map(|pt| pt.to_char().to_string()).unwrap_or_default();
        format!("{}{}{promo}", self.from, self.to)
    }

    /// Parse coordinate notation as returned by the move oracle.
    pub fn from_uci(s: &str) -> Result<Move, ChessError> {
        let invalid = || ChessError::InvalidMoveString { text: s.to_string() };
        let s_trim = s.trim();
        if !s_trim.is_ascii() || !(4..=5).contains(&s_trim.len()) {
            return Err(invalid());
        }
        let from = Square::from_algebraic(&s_trim[0..2]).ok_or_else(invalid)?;
        let to = Square::from_algebraic(&s_trim[2..4]).ok_or_else(invalid)?;
        let promotion = match s_trim[4..].chars().next() {
            None => None,
            Some(c) => {
                let pt = PieceType::from_char(c)
                    .filter(|pt| pt.is_promotion_target())
                    .ok_or_else(invalid)?;
                Some(pt)
            }
        };
        Ok(Move { from, to, promotion })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_promotion_moves() {
        let mv = Move::from_uci("e7e5").unwrap();
        assert_eq!(mv.from.index(), 12);
        assert_eq!(mv.to.index(), 28);
        assert_eq!(mv.promotion, None);

        let mv = Move::from_uci("e7e8q").unwrap();
        assert_eq!(mv.promotion, Some(PieceType::Queen));
        assert_eq!(mv.to_uci(), "e7e8q");

        assert_eq!(Move::from_uci("b2b1N").unwrap().promotion, Some(PieceType::Knight));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "e2", "e2e", "e2e9", "z2e4", "e7e8k", "e7e8p", "e7e8qq", "é2e4"] {
            assert!(
                matches!(Move::from_uci(bad), Err(ChessError::InvalidMoveString { .. })),
                "{bad}"
            );
        }
    }
}

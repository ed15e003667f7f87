use serde::Serialize;

use crate::attacks::is_king_in_check;
use crate::error::ChessResult;
use crate::movegen::has_any_legal_move;
use crate::piece::{Color, PieceType};
use crate::position::Position;

/// Whether play can continue from a position, and if not, why.
#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Color },
    Stalemate,
    /// A hundred half-moves without a pawn move or capture.
    FiftyMoveRule,
    InsufficientMaterial,
    /// The same position came up for the third time.
    ThreefoldRepetition,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        self != GameStatus::Ongoing
    }

    pub fn describe(self) -> &'static str {
        match self {
            GameStatus::Ongoing => "In progress",
            GameStatus::Checkmate { winner: Color::White } => "White wins",
            GameStatus::Checkmate { winner: Color::Black } => "Black wins",
            GameStatus::Stalemate => "Draw — stalemate",
            GameStatus::FiftyMoveRule => "Draw — 50 move rule",
            GameStatus::InsufficientMaterial => "Draw — insufficient material",
            GameStatus::ThreefoldRepetition => "Draw by repetition",
        }
    }
}

/// Classify `position` from the point of view of the side to move.
pub fn status(position: &Position) -> ChessResult<GameStatus> {
    let side = position.side_to_move();
    if !has_any_legal_move(position, side)? {
        return Ok(if is_king_in_check(position, side)? {
            GameStatus::Checkmate { winner: side.opposite() }
        } else {
            GameStatus::Stalemate
        });
    }
    if position.halfmove_clock() >= 100 {
        return Ok(GameStatus::FiftyMoveRule);
    }
    if has_insufficient_material(position) {
        return Ok(GameStatus::InsufficientMaterial);
    }
    Ok(GameStatus::Ongoing)
}

/// Like [`status`], but also declares a draw once `position` has occurred
/// three times. `history` holds [`Position::position_hash`] of every position
/// of the game so far, the current one included.
pub fn status_with_history(position: &Position, history: &[u64]) -> ChessResult<GameStatus> {
    let s = status(position)?;
    if s == GameStatus::Ongoing && is_threefold_repetition(position, history) {
        return Ok(GameStatus::ThreefoldRepetition);
    }
    Ok(s)
}

pub fn is_threefold_repetition(position: &Position, history: &[u64]) -> bool {
    let current = position.position_hash();
    history.iter().filter(|&&h| h == current).count() >= 3
}

/// King vs king, or king and a single minor piece vs a bare king.
pub fn has_insufficient_material(position: &Position) -> bool {
    let mut white = Vec::new();
    let mut black = Vec::new();
    for (_, p) in position.board().pieces() {
        if p.piece_type == PieceType::King {
            continue;
        }
        match p.color {
            Color::White => white.push(p.piece_type),
            Color::Black => black.push(p.piece_type),
        }
    }
    let minor = |pt: &PieceType| matches!(pt, PieceType::Bishop | PieceType::Knight);
    match (white.as_slice(), black.as_slice()) {
        ([], []) => true,
        ([only], []) | ([], [only]) => minor(only),
        _ => false,
    }
}

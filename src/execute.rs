use log::debug;

use crate::error::{ChessError, ChessResult};
use crate::movegen::legal_moves;
use crate::moves::Move;
use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::square::Square;

/// Validate `mv` against the legal moves of the piece on `mv.from` and return
/// the position after it. The input position is left as it was.
///
/// A pawn reaching the last rank becomes `mv.promotion`, or a queen when no
/// choice was given.
pub fn apply(position: &Position, mv: Move) -> ChessResult<Position> {
    let illegal = || ChessError::IllegalMove { from: mv.from, to: mv.to };

    let piece = position.board().piece_at(mv.from).ok_or_else(illegal)?;
    if piece.color != position.side_to_move() {
        return Err(ChessError::OutOfTurn);
    }
    if !legal_moves(position, mv.from)?.contains(&mv.to) {
        return Err(illegal());
    }

    let promotes = piece.piece_type == PieceType::Pawn && mv.to.row() == piece.color.promotion_row();
    match mv.promotion {
        Some(pt) if !promotes || !pt.is_promotion_target() => return Err(illegal()),
        _ => {}
    }

    let next = play_unchecked(position, mv);
    debug!("{:?} played {mv}: {}", piece.color, next.to_notation());
    Ok(next)
}

/// Carry out a move without any legality check. Used for the scratch
/// positions of check filtering and, after validation, by [`apply`].
pub(crate) fn play_unchecked(position: &Position, mv: Move) -> Position {
    let board = position.board();
    let Some(piece) = board.piece_at(mv.from) else {
        return position.clone();
    };
    let captured = board.piece_at(mv.to);
    let is_pawn = piece.piece_type == PieceType::Pawn;

    let promote_to = (is_pawn && mv.to.row() == piece.color.promotion_row())
        .then(|| mv.promotion.unwrap_or(PieceType::Queen));
    let mut next = board.with_piece_moved(mv.from, mv.to, promote_to);

    // En passant: the captured pawn sits beside the mover, not on the target.
    let en_passant_capture = is_pawn
        && captured.is_none()
        && mv.from.col() != mv.to.col()
        && position.en_passant() == Some(mv.to);
    if en_passant_capture {
        if let Some(victim) = Square::from_row_col(mv.from.row(), mv.to.col()) {
            if board.piece_at(victim).is_some_and(|p| p.is(PieceType::Pawn, piece.color.opposite())) {
                next.put(victim, None);
            }
        }
    }

    // Castling: the rook jumps to the square the king crossed.
    let is_king = piece.piece_type == PieceType::King;
    let file_shift = mv.to.col() as i32 - mv.from.col() as i32;
    if is_king && file_shift.abs() == 2 {
        let (rook_col, rook_dest) = if file_shift > 0 { (7, 5) } else { (0, 3) };
        let rook_from = Square::from_row_col(mv.from.row(), rook_col);
        let rook_to = Square::from_row_col(mv.from.row(), rook_dest);
        if let (Some(rf), Some(rt)) = (rook_from, rook_to) {
            next = next.with_piece_moved(rf, rt, None);
        }
    }

    let mut castling = position.castling();
    if is_king {
        castling.revoke_king(piece.color);
    }
    castling.touch(mv.from);
    castling.touch(mv.to);

    let en_passant = if is_pawn && mv.from.row().abs_diff(mv.to.row()) == 2 {
        Square::from_row_col((mv.from.row() + mv.to.row()) / 2, mv.from.col())
    } else {
        None
    };

    let halfmove_clock = if is_pawn || captured.is_some() {
        0
    } else {
        position.halfmove_clock().saturating_add(1)
    };

    let fullmove_number = match piece.color {
        Color::Black => position.fullmove_number().saturating_add(1),
        Color::White => position.fullmove_number(),
    };

    Position::new(
        next,
        position.side_to_move().opposite(),
        castling,
        en_passant,
        halfmove_clock,
        fullmove_number,
    )
}

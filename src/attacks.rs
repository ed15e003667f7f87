// Attack detection.
//
// Works backwards from the target square: "is X attacked by C" holds exactly
// when a C piece sits where it could strike X, so each piece pattern is
// walked outward from X instead of enumerating every attacker's moves.

use log::error;

use crate::error::{ChessError, ChessResult};
use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::square::Square;

pub(crate) const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

pub(crate) const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

pub(crate) const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub(crate) const ORTHOGONALS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Is `target` attacked by any piece of `by`?
pub fn is_attacked(position: &Position, target: Square, by: Color) -> bool {
    let board = position.board();
    let holds = |sq: Square, types: &[PieceType]| {
        board
            .piece_at(sq)
            .map(|p| p.color == by && types.contains(&p.piece_type))
            .unwrap_or(false)
    };

    // A `by` pawn attacks diagonally forward, so look one row behind the target.
    let back = -by.forward();
    for dc in [-1, 1] {
        if let Some(sq) = target.offset(back, dc) {
            if holds(sq, &[PieceType::Pawn]) {
                return true;
            }
        }
    }

    for &(dr, dc) in &KNIGHT_OFFSETS {
        if let Some(sq) = target.offset(dr, dc) {
            if holds(sq, &[PieceType::Knight]) {
                return true;
            }
        }
    }

    if ray_hits(position, target, &DIAGONALS, by, &[PieceType::Bishop, PieceType::Queen]) {
        return true;
    }
    if ray_hits(position, target, &ORTHOGONALS, by, &[PieceType::Rook, PieceType::Queen]) {
        return true;
    }

    for &(dr, dc) in &KING_OFFSETS {
        if let Some(sq) = target.offset(dr, dc) {
            if holds(sq, &[PieceType::King]) {
                return true;
            }
        }
    }

    false
}

/// Walk each ray until the first occupied square; it attacks if it is one of
/// `sliders` belonging to `by`.
fn ray_hits(
    position: &Position,
    target: Square,
    directions: &[(i32, i32)],
    by: Color,
    sliders: &[PieceType],
) -> bool {
    for &(dr, dc) in directions {
        let mut cursor = target.offset(dr, dc);
        while let Some(sq) = cursor {
            if let Some(p) = position.board().piece_at(sq) {
                if p.color == by && sliders.contains(&p.piece_type) {
                    return true;
                }
                break;
            }
            cursor = sq.offset(dr, dc);
        }
    }
    false
}

/// Is `color`'s king attacked? A missing king means the position is corrupt.
pub fn is_king_in_check(position: &Position, color: Color) -> ChessResult<bool> {
    let king = position.board().find_king(color).ok_or_else(|| {
        error!("no {color:?} king on board: {}", position.to_notation());
        ChessError::invariant(format!("{color:?} king is missing from the board"))
    })?;
    Ok(is_attacked(position, king, color.opposite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::piece::Piece;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn position_with(pieces: &[(&str, PieceType, Color)]) -> Position {
        let mut board = Board::empty();
        for &(s, pt, c) in pieces {
            board.put(sq(s), Some(Piece::new(pt, c)));
        }
        Position::from_board(board, Color::White)
    }

    #[test]
    fn pawn_attacks_only_diagonally_forward() {
        let pos = position_with(&[("e4", PieceType::Pawn, Color::White)]);
        assert!(is_attacked(&pos, sq("d5"), Color::White));
        assert!(is_attacked(&pos, sq("f5"), Color::White));
        assert!(!is_attacked(&pos, sq("e5"), Color::White));
        assert!(!is_attacked(&pos, sq("d3"), Color::White));

        let pos = position_with(&[("e5", PieceType::Pawn, Color::Black)]);
        assert!(is_attacked(&pos, sq("d4"), Color::Black));
        assert!(!is_attacked(&pos, sq("d6"), Color::Black));
    }

    #[test]
    fn pawn_on_edge_file_does_not_wrap() {
        // A white pawn on h4 must not "attack" a6 on the far side of the board.
        let pos = position_with(&[("h4", PieceType::Pawn, Color::White)]);
        assert!(is_attacked(&pos, sq("g5"), Color::White));
        assert!(!is_attacked(&pos, sq("a6"), Color::White));
        assert!(!is_attacked(&pos, sq("a5"), Color::White));
    }

    #[test]
    fn knight_jumps_and_does_not_wrap() {
        let pos = position_with(&[("h1", PieceType::Knight, Color::Black)]);
        assert!(is_attacked(&pos, sq("g3"), Color::Black));
        assert!(is_attacked(&pos, sq("f2"), Color::Black));
        assert!(!is_attacked(&pos, sq("a2"), Color::Black));
        assert!(!is_attacked(&pos, sq("b3"), Color::Black));
    }

    #[test]
    fn sliders_are_blocked_by_the_first_piece() {
        let pos = position_with(&[
            ("a1", PieceType::Rook, Color::White),
            ("a4", PieceType::Pawn, Color::Black),
            ("h8", PieceType::Bishop, Color::White),
        ]);
        assert!(is_attacked(&pos, sq("a3"), Color::White));
        assert!(is_attacked(&pos, sq("a4"), Color::White));
        assert!(!is_attacked(&pos, sq("a5"), Color::White));
        assert!(is_attacked(&pos, sq("h1"), Color::White));
        assert!(is_attacked(&pos, sq("b2"), Color::White));
        // Bishop on h8 reaches a1's diagonal only through b2, which is empty.
        assert!(is_attacked(&pos, sq("a1"), Color::White));
        assert!(!is_attacked(&pos, sq("h7"), Color::White));
    }

    #[test]
    fn horizontal_rays_stop_at_the_rank_edge() {
        let pos = position_with(&[("h5", PieceType::Rook, Color::Black)]);
        assert!(is_attacked(&pos, sq("a5"), Color::Black));
        assert!(!is_attacked(&pos, sq("a4"), Color::Black));
        assert!(!is_attacked(&pos, sq("a6"), Color::Black));
    }

    #[test]
    fn queen_combines_both_ray_sets() {
        let pos = position_with(&[("d4", PieceType::Queen, Color::White)]);
        for target in ["d8", "a4", "h8", "a1", "g1", "d1"] {
            assert!(is_attacked(&pos, sq(target), Color::White), "{target}");
        }
        assert!(!is_attacked(&pos, sq("e6"), Color::White));
    }

    #[test]
    fn king_attacks_adjacent_squares() {
        let pos = position_with(&[("a8", PieceType::King, Color::Black)]);
        assert!(is_attacked(&pos, sq("b7"), Color::Black));
        assert!(!is_attacked(&pos, sq("h7"), Color::Black));
        assert!(!is_attacked(&pos, sq("c8"), Color::Black));
    }

    #[test]
    fn attack_query_is_repeatable() {
        let pos = Position::initial();
        for target in Square::all() {
            for by in [Color::White, Color::Black] {
                assert_eq!(is_attacked(&pos, target, by), is_attacked(&pos, target, by));
            }
        }
    }

    #[test]
    fn check_detection_reports_missing_king() {
        let pos = position_with(&[("e1", PieceType::King, Color::White)]);
        assert_eq!(is_king_in_check(&pos, Color::White), Ok(false));
        assert!(matches!(
            is_king_in_check(&pos, Color::Black),
            Err(ChessError::InternalInvariantViolation { .. })
        ));
    }

    #[test]
    fn check_from_a_rook() {
        let pos = position_with(&[
            ("e1", PieceType::King, Color::White),
            ("e8", PieceType::Rook, Color::Black),
        ]);
        assert_eq!(is_king_in_check(&pos, Color::White), Ok(true));
    }
}

// =============================================================================
// Legal move generation
//
// Candidates are produced per piece pattern (pseudo-legal), then every one is
// played on a scratch copy of the position and kept only if the mover's king
// is not left in check. The scratch copy is dropped afterwards; the input
// position is never touched.
//
// Generation does not look at the side to move: any piece can be asked for
// its destinations. Only en-passant depends on whose turn it is, because the
// target square belongs to the reply of the side to move.
// =============================================================================

use crate::attacks::{is_attacked, is_king_in_check, DIAGONALS, KING_OFFSETS, KNIGHT_OFFSETS, ORTHOGONALS};
use crate::error::ChessResult;
use crate::execute::play_unchecked;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};
use crate::position::Position;
use crate::square::Square;

/// Legal destination squares for the piece on `from` (empty square ⇒ none).
pub fn legal_moves(position: &Position, from: Square) -> ChessResult<Vec<Square>> {
    let piece = match position.board().piece_at(from) {
        Some(p) => p,
        None => return Ok(Vec::new()),
    };

    let mut candidates = Vec::new();
    match piece.piece_type {
        PieceType::Pawn => pawn_candidates(position, from, piece.color, &mut candidates),
        PieceType::Knight => step_candidates(position, from, piece.color, &KNIGHT_OFFSETS, &mut candidates),
        PieceType::Bishop => ray_candidates(position, from, piece.color, &DIAGONALS, &mut candidates),
        PieceType::Rook => ray_candidates(position, from, piece.color, &ORTHOGONALS, &mut candidates),
        PieceType::Queen => {
            ray_candidates(position, from, piece.color, &ORTHOGONALS, &mut candidates);
            ray_candidates(position, from, piece.color, &DIAGONALS, &mut candidates);
        }
        PieceType::King => {
            step_candidates(position, from, piece.color, &KING_OFFSETS, &mut candidates);
            castling_candidates(position, from, piece.color, &mut candidates);
        }
    }

    let mut legal = Vec::with_capacity(candidates.len());
    for to in candidates {
        if keeps_king_safe(position, piece, Move::new(from, to))? {
            legal.push(to);
        }
    }
    Ok(legal)
}

/// Every legal move for `color`, with each promotion expanded into the four
/// possible piece choices.
pub fn all_legal_moves(position: &Position, color: Color) -> ChessResult<Vec<Move>> {
    let mut moves = Vec::new();
    let own: Vec<(Square, Piece)> = position
        .board()
        .pieces()
        .filter(|(_, p)| p.color == color)
        .collect();

    for (from, piece) in own {
        for to in legal_moves(position, from)? {
            if piece.piece_type == PieceType::Pawn && to.row() == color.promotion_row() {
                for pt in PieceType::PROMOTIONS {
                    moves.push(Move::with_promotion(from, to, pt));
                }
            } else {
                moves.push(Move::new(from, to));
            }
        }
    }
    Ok(moves)
}

pub fn has_any_legal_move(position: &Position, color: Color) -> ChessResult<bool> {
    let own: Vec<Square> = position
        .board()
        .pieces()
        .filter(|(_, p)| p.color == color)
        .map(|(sq, _)| sq)
        .collect();
    for from in own {
        if !legal_moves(position, from)?.is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Play the candidate on a scratch copy and test the mover's king.
fn keeps_king_safe(position: &Position, piece: Piece, mv: Move) -> ChessResult<bool> {
    let scratch = play_unchecked(position, mv);
    Ok(!is_king_in_check(&scratch, piece.color)?)
}

fn is_own(position: &Position, sq: Square, color: Color) -> bool {
    position.board().piece_at(sq).map(|p| p.color == color).unwrap_or(false)
}

fn is_enemy(position: &Position, sq: Square, color: Color) -> bool {
    position.board().piece_at(sq).map(|p| p.color != color).unwrap_or(false)
}

fn pawn_candidates(position: &Position, from: Square, color: Color, out: &mut Vec<Square>) {
    let board = position.board();
    let dir = color.forward();

    // Single push, then double push from the starting row through two empty squares.
    if let Some(one) = from.offset(dir, 0).filter(|sq| board.is_empty(*sq)) {
        out.push(one);
        if from.row() == color.pawn_row() {
            if let Some(two) = one.offset(dir, 0).filter(|sq| board.is_empty(*sq)) {
                out.push(two);
            }
        }
    }

    for dc in [-1, 1] {
        let Some(target) = from.offset(dir, dc) else {
            continue;
        };
        let capture = is_enemy(position, target, color);
        // The pawn being taken en passant stands beside the mover.
        let passed_pawn = Square::from_row_col(from.row(), target.col())
            .and_then(|sq| board.piece_at(sq))
            .map(|p| p.is(PieceType::Pawn, color.opposite()))
            .unwrap_or(false);
        let en_passant = position.en_passant() == Some(target)
            && position.side_to_move() == color
            && board.is_empty(target)
            && passed_pawn;
        if capture || en_passant {
            out.push(target);
        }
    }
}

fn step_candidates(
    position: &Position,
    from: Square,
    color: Color,
    offsets: &[(i32, i32)],
    out: &mut Vec<Square>,
) {
    for &(dr, dc) in offsets {
        if let Some(to) = from.offset(dr, dc) {
            if !is_own(position, to, color) {
                out.push(to);
            }
        }
    }
}

fn ray_candidates(
    position: &Position,
    from: Square,
    color: Color,
    directions: &[(i32, i32)],
    out: &mut Vec<Square>,
) {
    for &(dr, dc) in directions {
        let mut cursor = from.offset(dr, dc);
        while let Some(to) = cursor {
            match position.board().piece_at(to) {
                Some(p) if p.color == color => break,
                Some(_) => {
                    out.push(to);
                    break;
                }
                None => out.push(to),
            }
            cursor = to.offset(dr, dc);
        }
    }
}

/// Kingside/queenside castling destinations for a king on its home square.
/// The king may not start on, or pass through, an attacked square; the
/// landing square is covered by the general check filter.
fn castling_candidates(position: &Position, from: Square, color: Color, out: &mut Vec<Square>) {
    let row = color.back_row();
    if from.row() != row || from.col() != 4 {
        return;
    }
    let enemy = color.opposite();
    if is_attacked(position, from, enemy) {
        return;
    }

    let rights = position.castling();
    let sides = [
        // (right held, rook col, squares that must be empty, squares the king crosses)
        (rights.kingside(color), 7, &[5usize, 6][..], &[5usize, 6][..]),
        (rights.queenside(color), 0, &[1usize, 2, 3][..], &[3usize, 2][..]),
    ];

    for (allowed, rook_col, between, transit) in sides {
        if !allowed {
            continue;
        }
        let square = |col: usize| Square::from_row_col(row, col);
        let rook_home = square(rook_col)
            .and_then(|sq| position.board().piece_at(sq))
            .map(|p| p.is(PieceType::Rook, color))
            .unwrap_or(false);
        if !rook_home {
            continue;
        }
        let clear = between
            .iter()
            .filter_map(|&c| square(c))
            .all(|sq| position.board().is_empty(sq));
        let safe = transit
            .iter()
            .filter_map(|&c| square(c))
            .all(|sq| !is_attacked(position, sq, enemy));
        if clear && safe {
            if let Some(dest) = square(transit[transit.len() - 1]) {
                out.push(dest);
            }
        }
    }
}

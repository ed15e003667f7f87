use oracle_chess::attacks::{is_attacked, is_king_in_check};
use oracle_chess::execute::apply;
use oracle_chess::movegen::{all_legal_moves, legal_moves};
use oracle_chess::piece::{Color, PieceType};
use oracle_chess::{Move, Position, Square};
use proptest::prelude::*;

/// Play the game steered by `choices` (each picks among the legal moves),
/// returning every position reached, the initial one included.
fn playout(choices: &[usize]) -> Vec<(Position, Option<Move>)> {
    let mut position = Position::initial();
    let mut seen = vec![(position.clone(), None)];
    for &choice in choices {
        let moves = all_legal_moves(&position, position.side_to_move()).unwrap();
        if moves.is_empty() {
            break;
        }
        let mv = moves[choice % moves.len()];
        position = apply(&position, mv).unwrap();
        seen.push((position.clone(), Some(mv)));
    }
    seen
}

fn arb_choices() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<usize>(), 0..80)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]

    #[test]
    fn legal_moves_never_leave_own_king_in_check(choices in arb_choices()) {
        for (position, _) in playout(&choices) {
            let mover = position.side_to_move();
            for mv in all_legal_moves(&position, mover).unwrap() {
                let next = apply(&position, mv).unwrap();
                prop_assert!(!is_king_in_check(&next, mover).unwrap(), "{} {}", position, mv);
            }
        }
    }

    #[test]
    fn notation_round_trips(choices in arb_choices()) {
        for (position, _) in playout(&choices) {
            let text = position.to_notation();
            let back = Position::from_notation(&text).unwrap();
            prop_assert_eq!(back.to_notation(), text);
            prop_assert_eq!(back, position);
        }
    }

    #[test]
    fn attack_queries_are_repeatable(choices in arb_choices(), target in 0usize..64) {
        let target = Square::new(target).unwrap();
        for (position, _) in playout(&choices) {
            for by in [Color::White, Color::Black] {
                let first = is_attacked(&position, target, by);
                prop_assert_eq!(first, is_attacked(&position, target, by));
            }
        }
    }

    #[test]
    fn destinations_never_hold_a_friendly_piece(choices in arb_choices()) {
        for (position, _) in playout(&choices) {
            for (from, piece) in position.board().pieces() {
                for to in legal_moves(&position, from).unwrap() {
                    let friendly = position
                        .board()
                        .piece_at(to)
                        .map(|p| p.color == piece.color)
                        .unwrap_or(false);
                    prop_assert!(!friendly, "{} {}{}", position, from, to);
                }
            }
        }
    }

    #[test]
    fn clocks_follow_pawn_moves_and_captures(choices in arb_choices()) {
        let seen = playout(&choices);
        for pair in seen.windows(2) {
            let (before, _) = &pair[0];
            let (after, mv) = &pair[1];
            let Some(mv) = mv else { continue };
            let moved = before.board().piece_at(mv.from).unwrap();
            let reset = moved.piece_type == PieceType::Pawn || before.board().piece_at(mv.to).is_some();
            if reset {
                prop_assert_eq!(after.halfmove_clock(), 0);
            } else {
                prop_assert_eq!(after.halfmove_clock(), before.halfmove_clock() + 1);
            }
            let expected_fullmove = match moved.color {
                Color::Black => before.fullmove_number() + 1,
                Color::White => before.fullmove_number(),
            };
            prop_assert_eq!(after.fullmove_number(), expected_fullmove);
        }
    }
}

#[test]
fn opening_pawn_and_idle_king() {
    let start = Position::initial();
    let e2 = Square::new(52).unwrap();
    let mut targets: Vec<usize> = legal_moves(&start, e2).unwrap().iter().map(|s| s.index()).collect();
    targets.sort();
    assert_eq!(targets, vec![36, 44]);

    let black_king = Square::from_algebraic("e8").unwrap();
    assert!(legal_moves(&start, black_king).unwrap().is_empty());
}

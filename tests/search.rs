use kibitz::chess::board::Board;
use kibitz::chess::moves::Move;
use kibitz::evaluation::{EvaluationWeights, StandardBoardEvaluator};
use kibitz::search::{MiniMax, MoveStrategy};
use pretty_assertions::assert_eq;

fn play(moves: &[&str]) -> Board {
    let mut board = Board::starting();
    for uci in moves {
        let next_move = Move::from_uci(&board, uci).unwrap();
        board = board
            .current_player()
            .make_move(&next_move)
            .board
            .into_owned();
    }
    board
}

#[test]
fn fools_mate_is_found() {
    let board = play(&["f2f3", "e7e5", "g2g4"]);
    let best = MiniMax::new(2).execute(&board);
    assert_eq!(best.to_string(), "d8h4");
    let next = best.execute(&board);
    assert!(next.current_player().is_in_checkmate());
}

#[test]
fn back_rank_mate_is_found() {
    let board = Board::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
    assert_eq!(MiniMax::new(2).execute(&board).to_string(), "a1a8");
}

#[test]
fn custom_weights_still_find_mate() {
    let board = play(&["f2f3", "e7e5", "g2g4"]);
    let evaluator = StandardBoardEvaluator::new(EvaluationWeights {
        check_bonus: 0,
        castle_bonus: 0,
        ..EvaluationWeights::default()
    });
    let strategy = MiniMax::with_evaluator(2, evaluator);
    assert_eq!(strategy.depth(), 2);
    assert_eq!(strategy.execute(&board).to_string(), "d8h4");
}

#[test]
fn search_is_deterministic() {
    let board = play(&["e2e4", "e7e5", "g1f3"]);
    let strategy = MiniMax::new(2);
    let first = strategy.execute(&board);
    assert_ne!(first, Move::NULL);
    assert!(board.current_player().legal_moves().contains(&first));
    for _ in 0..3 {
        assert_eq!(strategy.execute(&board), first);
        assert_eq!(strategy.execute(&board.clone()), first);
    }
}

#[test]
fn mated_side_has_no_move() {
    let board = play(&["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(MiniMax::new(3).execute(&board), Move::NULL);
}

//! Implementation of [Minimax] algorithm with [Alpha-Beta pruning].
//!
//! White maximizes the evaluation, Black minimizes it. Moves are explored in
//! the order [`crate::chess::player::Player::legal_moves`] lists them and a
//! move only replaces the best one found so far if it is strictly better, so
//! among equally valued moves the first one wins.
//!
//! [Minimax]: https://en.wikipedia.org/wiki/Minimax
//! [Alpha-Beta pruning]: https://en.wikipedia.org/wiki/Alpha%E2%80%93beta_pruning

use std::time::Instant;

use tracing::{debug, info};

use crate::chess::board::Board;
use crate::chess::moves::Move;
use crate::evaluation::{BoardEvaluator, StandardBoardEvaluator, Value};
use crate::search::{Depth, MoveStrategy};

/// Depth-bounded minimax search with alpha-beta pruning over a pluggable
/// static evaluator.
#[derive(Clone, Debug)]
pub struct MiniMax<E = StandardBoardEvaluator> {
    depth: Depth,
    evaluator: E,
}

impl MiniMax {
    /// Searches `depth` plies deep with [`StandardBoardEvaluator`].
    ///
    /// # Panics
    ///
    /// Panics if `depth` is 0.
    #[must_use]
    pub fn new(depth: Depth) -> Self {
        Self::with_evaluator(depth, StandardBoardEvaluator::default())
    }
}

impl<E: BoardEvaluator> MiniMax<E> {
    /// # Panics
    ///
    /// Panics if `depth` is 0.
    #[must_use]
    pub fn with_evaluator(depth: Depth, evaluator: E) -> Self {
        assert!(depth > 0, "search depth should be at least 1 ply");
        Self { depth, evaluator }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn depth(&self) -> Depth {
        self.depth
    }
}

impl<E: BoardEvaluator> MoveStrategy for MiniMax<E> {
    fn execute(&self, board: &Board) -> Move {
        let started = Instant::now();
        let mut search = Search {
            evaluator: &self.evaluator,
            nodes: 0,
        };
        let player = board.current_player();
        let maximizing = player.alliance().is_white();
        let mut alpha = Value::MIN;
        let mut beta = Value::MAX;
        let mut best: Option<(Move, Value)> = None;
        for candidate in player.legal_moves() {
            let transition = player.make_move(candidate);
            if !transition.status.is_done() {
                continue;
            }
            let value = if maximizing {
                search.min(&transition.board, self.depth - 1, alpha, beta)
            } else {
                search.max(&transition.board, self.depth - 1, alpha, beta)
            };
            debug!(%candidate, value, "root move");
            let improves = best.map_or(true, |(_, best_value)| {
                if maximizing {
                    value > best_value
                } else {
                    value < best_value
                }
            });
            if improves {
                best = Some((*candidate, value));
                if maximizing {
                    alpha = value;
                } else {
                    beta = value;
                }
            }
        }
        let elapsed = started.elapsed().as_millis();
        match best {
            Some((best_move, value)) => {
                info!(
                    %best_move,
                    value,
                    depth = self.depth,
                    nodes = search.nodes,
                    elapsed_ms = elapsed,
                    "search finished"
                );
                best_move
            },
            None => {
                info!(nodes = search.nodes, elapsed_ms = elapsed, "no legal moves");
                Move::NULL
            },
        }
    }
}

/// State of a single search: the evaluator and visited node counter.
struct Search<'e, E> {
    evaluator: &'e E,
    nodes: u64,
}

impl<E: BoardEvaluator> Search<'_, E> {
    fn is_leaf(board: &Board, depth: Depth) -> bool {
        let player = board.current_player();
        depth == 0 || player.is_in_checkmate() || player.is_in_stalemate()
    }

    /// Value of `board` with White to choose.
    fn max(&mut self, board: &Board, depth: Depth, mut alpha: Value, beta: Value) -> Value {
        self.nodes += 1;
        if Self::is_leaf(board, depth) {
            return self.evaluator.evaluate(board, depth);
        }
        let player = board.current_player();
        let mut highest = Value::MIN;
        for candidate in player.legal_moves() {
            let transition = player.make_move(candidate);
            if !transition.status.is_done() {
                continue;
            }
            highest = highest.max(self.min(&transition.board, depth - 1, alpha, beta));
            alpha = alpha.max(highest);
            if beta <= alpha {
                break;
            }
        }
        highest
    }

    /// Value of `board` with Black to choose.
    fn min(&mut self, board: &Board, depth: Depth, alpha: Value, mut beta: Value) -> Value {
        self.nodes += 1;
        if Self::is_leaf(board, depth) {
            return self.evaluator.evaluate(board, depth);
        }
        let player = board.current_player();
        let mut lowest = Value::MAX;
        for candidate in player.legal_moves() {
            let transition = player.make_move(candidate);
            if !transition.status.is_done() {
                continue;
            }
            lowest = lowest.min(self.max(&transition.board, depth - 1, alpha, beta));
            beta = beta.min(lowest);
            if beta <= alpha {
                break;
            }
        }
        lowest
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::evaluation::material::material_advantage;

    /// Scores material only, which makes search outcomes easy to predict.
    struct Material;

    impl BoardEvaluator for Material {
        fn evaluate(&self, board: &Board, _depth: Depth) -> Value {
            material_advantage(board)
        }
    }

    /// Plain minimax without pruning.
    fn reference(board: &Board, depth: Depth, evaluator: &impl BoardEvaluator) -> Value {
        let player = board.current_player();
        if depth == 0 || player.is_in_checkmate() || player.is_in_stalemate() {
            return evaluator.evaluate(board, depth);
        }
        let values = player
            .legal_moves()
            .iter()
            .map(|candidate| reference(&candidate.execute(board), depth - 1, evaluator));
        if player.alliance().is_white() {
            values.max().unwrap()
        } else {
            values.min().unwrap()
        }
    }

    #[test]
    #[should_panic(expected = "search depth should be at least 1 ply")]
    fn zero_depth() {
        let _ = MiniMax::new(0);
    }

    #[test]
    fn captures_free_material() {
        // The knight on d5 is unprotected.
        let board = Board::from_fen("4k3/8/8/3n4/8/8/8/3RK3 w - - 0 1").unwrap();
        let strategy = MiniMax::with_evaluator(1, Material);
        assert_eq!(strategy.execute(&board).to_string(), "d1d5");
    }

    #[test]
    fn avoids_losing_material() {
        // Taking the pawn on d5 loses the rook to the pawn on e6.
        let board = Board::from_fen("4k3/8/4p3/3p4/8/8/8/3RK3 w - - 0 1").unwrap();
        let greedy = MiniMax::with_evaluator(1, Material).execute(&board);
        assert_eq!(greedy.to_string(), "d1d5");
        let careful = MiniMax::with_evaluator(2, Material).execute(&board);
        assert_ne!(careful.to_string(), "d1d5");
    }

    #[test]
    fn ties_go_to_the_first_move() {
        // Nothing can be captured: every move is worth the same.
        let board = Board::starting();
        let first = board.current_player().legal_moves()[0];
        assert_eq!(MiniMax::with_evaluator(2, Material).execute(&board), first);
        let board = Move::from_uci(&board, "e2e4").unwrap().execute(&board);
        let first = board.current_player().legal_moves()[0];
        assert_eq!(MiniMax::with_evaluator(1, Material).execute(&board), first);
    }

    #[test]
    fn pruning_matches_plain_minimax() {
        let board = Board::from_fen("r3k2r/1p6/8/3q4/4P3/2N5/5PP1/R3K2R w KQkq - 0 1").unwrap();
        let evaluator = StandardBoardEvaluator::default();
        let mut search = Search {
            evaluator: &evaluator,
            nodes: 0,
        };
        for depth in 1..=2 {
            assert_eq!(
                search.max(&board, depth, Value::MIN, Value::MAX),
                reference(&board, depth, &evaluator)
            );
        }
    }

    #[test]
    fn no_moves() {
        let board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(MiniMax::new(2).execute(&board), Move::NULL);
    }
}

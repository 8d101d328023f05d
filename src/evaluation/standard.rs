//! Material, mobility and king safety bonuses.

use crate::chess::board::Board;
use crate::chess::player::Player;
use crate::evaluation::material::piece_value;
use crate::evaluation::{BoardEvaluator, Value};
use crate::search::Depth;

/// Bonuses awarded by [`StandardBoardEvaluator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvaluationWeights {
    /// Awarded when the opponent is in check.
    pub check_bonus: Value,
    /// Awarded when the opponent is checkmated, scaled by the remaining depth.
    pub checkmate_bonus: Value,
    /// Multiplier applied to the remaining depth when scaling the checkmate
    /// bonus.
    pub depth_bonus: Value,
    /// Awarded once the king has castled.
    pub castle_bonus: Value,
}

impl Default for EvaluationWeights {
    fn default() -> Self {
        Self {
            check_bonus: 50,
            checkmate_bonus: 10_000,
            depth_bonus: 100,
            castle_bonus: 60,
        }
    }
}

/// Scores each side by material, the number of legal moves and bonuses for
/// checking, mating and having castled; the result is White's score minus
/// Black's.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardBoardEvaluator {
    weights: EvaluationWeights,
}

impl StandardBoardEvaluator {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(weights: EvaluationWeights) -> Self {
        Self { weights }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn weights(&self) -> &EvaluationWeights {
        &self.weights
    }

    fn score_player(&self, player: Player<'_>, depth: Depth) -> Value {
        let weights = &self.weights;
        let mobility = Value::try_from(player.legal_moves().len()).unwrap_or(Value::MAX);
        let opponent = player.opponent();
        let mut score = piece_value(player.active_pieces()) + mobility;
        if opponent.is_in_check() {
            score += weights.check_bonus;
        }
        if opponent.is_in_checkmate() {
            score += weights.checkmate_bonus * self.depth_factor(depth);
        }
        if player.has_castled() {
            score += weights.castle_bonus;
        }
        score
    }

    /// Mates found with more search depth left are closer to the root.
    fn depth_factor(&self, depth: Depth) -> Value {
        if depth == 0 {
            1
        } else {
            self.weights.depth_bonus * Value::from(depth)
        }
    }
}

impl BoardEvaluator for StandardBoardEvaluator {
    fn evaluate(&self, board: &Board, depth: Depth) -> Value {
        self.score_player(board.white_player(), depth) - self.score_player(board.black_player(), depth)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chess::moves::Move;

    fn play(board: &Board, moves: &[&str]) -> Board {
        moves.iter().fold(board.clone(), |board, uci| {
            Move::from_uci(&board, uci).unwrap().execute(&board)
        })
    }

    #[test]
    fn symmetric_position_is_balanced() {
        let evaluator = StandardBoardEvaluator::default();
        assert_eq!(evaluator.evaluate(&Board::starting(), 0), 0);
        assert_eq!(evaluator.evaluate(&Board::starting(), 3), 0);
    }

    #[test]
    fn mobility() {
        let evaluator = StandardBoardEvaluator::default();
        let board = play(&Board::starting(), &["e2e4"]);
        // 30 legal moves for White against 20 for Black.
        assert_eq!(evaluator.evaluate(&board, 0), 10);
    }

    #[test]
    fn check_bonus() {
        let evaluator = StandardBoardEvaluator::default();
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1").unwrap();
        assert!(board.black_player().is_in_check());
        assert!(!board.black_player().is_in_checkmate());
        let white = board.white_player();
        let mobility = Value::try_from(white.legal_moves().len()).unwrap();
        assert_eq!(
            evaluator.score_player(white, 0),
            10_000 + 500 + mobility + 50
        );
    }

    #[test]
    fn checkmate_bonus_scales_with_depth() {
        let evaluator = StandardBoardEvaluator::default();
        let board = play(&Board::starting(), &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert!(board.white_player().is_in_checkmate());
        let shallow = evaluator.evaluate(&board, 0);
        let deep = evaluator.evaluate(&board, 2);
        assert_eq!(shallow - deep, 10_000 * 200 - 10_000);
        assert!(deep < -1_000_000);
    }

    #[test]
    fn castle_bonus() {
        let evaluator = StandardBoardEvaluator::new(EvaluationWeights {
            castle_bonus: 1000,
            ..EvaluationWeights::default()
        });
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let castled = Move::from_uci(&board, "e1g1").unwrap().execute(&board);
        let walked = Board::from_fen("4k3/8/8/8/8/8/8/5RK1 b - - 0 1").unwrap();
        assert_eq!(castled.fen(), walked.fen());
        assert_eq!(
            evaluator.evaluate(&castled, 0) - evaluator.evaluate(&walked, 0),
            1000
        );
    }
}

//! This module implements "static" [evaluation], i.e. predicting the relative
//! value/score of given board without [`crate::search`].
//!
//! Values are in centipawn units and always from White's point of view:
//! positive values favour White, negative ones favour Black.
//!
//! [evaluation]: https://www.chessprogramming.org/Evaluation

use crate::chess::board::Board;
use crate::search::Depth;

pub mod material;
mod standard;

pub use standard::{EvaluationWeights, StandardBoardEvaluator};

/// Evaluation relative value in centipawn (100 CP = 1 "pawn") units.
pub type Value = i32;

/// Static evaluation used at the leaves of the search tree.
pub trait BoardEvaluator {
    /// Scores `board` with `depth` plies of search left. Terminal positions
    /// reached early have more depth left, which lets evaluators prefer
    /// shorter mates.
    fn evaluate(&self, board: &Board, depth: Depth) -> Value;
}

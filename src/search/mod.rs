//! Move selection: [`MoveStrategy`] is what drivers call to pick a move,
//! [`MiniMax`] is the depth-bounded game tree search implementing it.

use crate::chess::board::Board;
use crate::chess::moves::Move;

mod minimax;

pub use minimax::MiniMax;

/// Search depth in plies.
pub type Depth = u8;

/// Depth used when the driver does not ask for a specific one.
pub const DEFAULT_DEPTH: Depth = 3;

/// Picks a move for the side to move.
pub trait MoveStrategy {
    /// Returns the chosen move or [`Move::NULL`] if the side to move has no
    /// legal moves.
    fn execute(&self, board: &Board) -> Move;
}

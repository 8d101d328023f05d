//! [Perft] (*per*formance *t*esting) is a technique for checking correctness of
//! move generation: the number of leaf nodes of the legal move tree at a given
//! depth is compared against known values.
//!
//! [Perft]: https://www.chessprogramming.org/Perft

use crate::chess::board::Board;

/// Counts leaf nodes of the legal move tree of the side to move, `depth` plies
/// deep. Only queen promotions exist, which only matters for positions where
/// pawns can promote within `depth` plies.
#[must_use]
pub fn perft(board: &Board, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = board.current_player().legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .iter()
        .map(|next_move| perft(&next_move.execute(board), depth - 1))
        .sum()
}

/// Perft split by the root moves, in generation order. Handy for pinning down
/// which subtree diverges from a reference.
#[must_use]
pub fn divide(board: &Board, depth: u8) -> Vec<(String, u64)> {
    assert!(depth > 0, "divide needs at least one ply");
    board
        .current_player()
        .legal_moves()
        .iter()
        .map(|next_move| {
            (
                next_move.to_string(),
                perft(&next_move.execute(board), depth - 1),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn starting_position() {
        let board = Board::starting();
        assert_eq!(perft(&board, 0), 1);
        assert_eq!(perft(&board, 1), 20);
        assert_eq!(perft(&board, 2), 400);
    }

    #[test]
    fn divide_sums_up() {
        let board = Board::starting();
        let split = divide(&board, 2);
        assert_eq!(split.len(), 20);
        assert!(split.iter().all(|(_, nodes)| *nodes == 20));
        assert_eq!(split[0].0, "a2a3");
        assert_eq!(split.iter().map(|(_, nodes)| nodes).sum::<u64>(), perft(&board, 2));
    }
}

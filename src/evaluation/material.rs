//! Provides a very basic implementation of evaluation based on material
//! advantage using "[standard piece valuations]".
//!
//! While not very useful on its own, it is stable (will not change because of
//! the fixed piece "values"), easy to understand and deterministic.
//!
//! [standard piece valuations]: https://en.wikipedia.org/wiki/Chess_piece_relative_value

use crate::chess::board::Board;
use crate::chess::core::Alliance;
use crate::chess::piece::Piece;
use crate::evaluation::Value;

/// Sum of [`crate::chess::core::PieceKind::value`] over `pieces`, kings
/// included.
#[must_use]
pub fn piece_value(pieces: &[Piece]) -> Value {
    pieces.iter().map(|piece| piece.kind.value()).sum()
}

/// White's material minus Black's material.
#[must_use]
pub fn material_advantage(board: &Board) -> Value {
    piece_value(board.pieces(Alliance::White)) - piece_value(board.pieces(Alliance::Black))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position() {
        let board = Board::starting();
        assert_eq!(material_advantage(&board), 0);
        assert_eq!(piece_value(board.white_pieces()), 13_900);
    }

    #[test]
    fn white_advantage() {
        assert_eq!(
            material_advantage(
                &Board::from_fen("rnb1kbnr/ppp2p1p/6p1/3pN1B1/3P4/2N5/PPP1PPPP/R2QKB1R b KQkq - 0 5")
                    .unwrap()
            ),
            1000
        );
    }

    #[test]
    fn black_advantage() {
        assert_eq!(
            material_advantage(
                &Board::from_fen("rn1qkbnr/ppp1pppp/8/8/2BP4/4P3/PP3PPP/RbBQK1NR w KQkq - 0 5")
                    .unwrap()
            ),
            -300
        );
    }
}

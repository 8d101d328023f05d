//! A single cell of the board.

use std::fmt;

use crate::chess::core::{Square, BOARD_SIZE};
use crate::chess::piece::Piece;

/// One of the 64 board cells, either empty or holding a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    #[allow(missing_docs)]
    Empty(Square),
    #[allow(missing_docs)]
    Occupied(Square, Piece),
}

/// Every empty tile, indexed by square. Boards share these instead of
/// constructing new ones.
pub const EMPTY_TILES: [Tile; BOARD_SIZE as usize] = {
    let mut tiles = [Tile::Empty(Square::A8); BOARD_SIZE as usize];
    let mut index = 0;
    while index < BOARD_SIZE {
        tiles[index as usize] = Tile::Empty(Square::from_index(index));
        index += 1;
    }
    tiles
};

impl Tile {
    /// Returns the shared empty tile for `square` or a new occupied one.
    #[must_use]
    pub const fn new(square: Square, piece: Option<Piece>) -> Self {
        match piece {
            Some(piece) => Self::Occupied(square, piece),
            None => EMPTY_TILES[square.index()],
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn square(&self) -> Square {
        match self {
            Self::Empty(square) | Self::Occupied(square, _) => *square,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn piece(&self) -> Option<Piece> {
        match self {
            Self::Empty(_) => None,
            Self::Occupied(_, piece) => Some(*piece),
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty(_) => write!(f, "-"),
            Self::Occupied(_, piece) => write!(f, "{piece}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::chess::core::{Alliance, PieceKind};

    #[test]
    fn empty_tiles_are_indexed_by_square() {
        for square in Square::iter() {
            let tile = EMPTY_TILES[square.index()];
            assert_eq!(tile.square(), square);
            assert!(tile.is_empty());
            assert_eq!(Tile::new(square, None), tile);
        }
    }

    #[test]
    fn occupied_tile() {
        let knight = Piece::new(PieceKind::Knight, Alliance::Black, Square::G8);
        let tile = Tile::new(Square::G8, Some(knight));
        assert!(!tile.is_empty());
        assert_eq!(tile.piece(), Some(knight));
        assert_eq!(tile.to_string(), "n");
        assert_eq!(EMPTY_TILES[0].to_string(), "-");
    }
}

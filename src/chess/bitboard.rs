//! [`Bitboard`] is a set of squares packed into a single [u64]. The board
//! itself is square-centric (see [`crate::chess::board`]); bitboards are used
//! where set semantics pay off: the squares attacked by each side and the
//! rank/file masks used by the movement rules.
//!
//! [Bitboard]: https://www.chessprogramming.org/Bitboards

use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::chess::core::Square;

/// Represents a set of squares. Each bit corresponds to one of 64 squares of
/// the chess board.
///
/// Mirroring [`Square`] semantics, the least significant bit corresponds to
/// A8, and the most significant bit - to H1.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Bitboard {
    bits: u64,
}

impl Bitboard {
    /// Constructs Bitboard from pre-calculated bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    /// Constructs a bitboard representing empty set of squares.
    #[must_use]
    pub const fn empty() -> Self {
        Self::from_bits(0)
    }

    /// Returns true if this bitboard contains given square.
    #[must_use]
    pub const fn contains(self, square: Square) -> bool {
        (self.bits & (1u64 << square as u8)) != 0
    }
}

impl BitOr for Bitboard {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits.bitor(rhs.bits))
    }
}

impl BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits.bitor_assign(rhs.bits);
    }
}

impl BitAnd for Bitboard {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits.bitand(rhs.bits))
    }
}

impl From<Square> for Bitboard {
    fn from(square: Square) -> Self {
        Self::from_bits(1u64 << square as u8)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<T: IntoIterator<Item = Square>>(squares: T) -> Self {
        squares
            .into_iter()
            .fold(Self::empty(), |set, square| set | Self::from(square))
    }
}

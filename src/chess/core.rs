//! Chess primitives commonly used within [`crate::chess`].

use std::fmt::{self, Write};
use std::mem;
use std::ops::Not;

use anyhow::bail;
use itertools::Itertools;

use crate::chess::bitboard::Bitboard;

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// Board squares in row-major order, starting from the top-left corner as seen
/// from White's side of the board:
///
/// ```
/// use kibitz::chess::core::Square;
///
/// assert_eq!(Square::A8 as u8, 0);
/// assert_eq!(Square::H8 as u8, 7);
/// assert_eq!(Square::E4 as u8, 36);
/// assert_eq!(Square::A1 as u8, 56);
/// assert_eq!(Square::H1 as u8, 63);
/// ```
///
/// Square is a compact representation using only one byte.
///
/// ```
/// use kibitz::chess::core::Square;
///
/// assert_eq!(std::mem::size_of::<Square>(), 1);
/// ```
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
#[rustfmt::skip]
#[allow(missing_docs)]
pub enum Square {
    A8, B8, C8, D8, E8, F8, G8, H8,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A1, B1, C1, D1, E1, F1, G1, H1,
}

impl Square {
    /// Connects file (column) and rank (row) to form a full square.
    #[must_use]
    pub const fn new(file: File, rank: Rank) -> Self {
        Self::from_index((BOARD_WIDTH - 1 - rank as u8) * BOARD_WIDTH + file as u8)
    }

    /// # Panics
    ///
    /// Panics if `index` is outside of `0..BOARD_SIZE`.
    #[must_use]
    pub(crate) const fn from_index(index: u8) -> Self {
        assert!(index < BOARD_SIZE, "square index out of range");
        unsafe { mem::transmute(index) }
    }

    /// Position of the square in the tile sequence of a board.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns file (column) on which the square is located.
    #[must_use]
    pub const fn file(self) -> File {
        unsafe { mem::transmute(self as u8 % BOARD_WIDTH) }
    }

    /// Returns rank (row) on which the square is located.
    #[must_use]
    pub const fn rank(self) -> Rank {
        unsafe { mem::transmute(BOARD_WIDTH - 1 - self as u8 / BOARD_WIDTH) }
    }

    /// Adds a raw coordinate offset to the square. Returns `None` when the
    /// result falls off the board. Wrapping around the left and right edges is
    /// not detected here: movement rules exclude those offsets per column.
    #[must_use]
    pub fn offset(self, offset: i8) -> Option<Self> {
        let candidate = self as i8 + offset;
        if (0..BOARD_SIZE as i8).contains(&candidate) {
            Some(Self::from_index(candidate as u8))
        } else {
            None
        }
    }
}

impl TryFrom<u8> for Square {
    type Error = anyhow::Error;

    /// Creates a square given its position on the board.
    ///
    /// # Errors
    ///
    /// If given square index is outside 0..[`BOARD_SIZE`] range.
    fn try_from(square_index: u8) -> anyhow::Result<Self> {
        if square_index < BOARD_SIZE {
            Ok(Self::from_index(square_index))
        } else {
            bail!("square index should be in 0..BOARD_SIZE, got {square_index}")
        }
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    /// Parses algebraic notation, e.g. "e4".
    fn try_from(square: &str) -> anyhow::Result<Self> {
        let Some((file, rank)) = square.chars().collect_tuple() else {
            bail!(
                "square should be two-char, got {square} with {} chars",
                square.chars().count()
            )
        };
        Ok(Self::new(file.try_into()?, rank.try_into()?))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// Represents a column (vertical row) of the chessboard. In chess notation, it
/// is normally represented with a lowercase letter.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
#[allow(missing_docs)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    /// Returns a pre-calculated bitboard mask with 1s set for squares of the
    /// given file.
    #[must_use]
    pub const fn mask(self) -> Bitboard {
        Bitboard::from_bits(0x0101_0101_0101_0101 << self as u8)
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char((b'a' + *self as u8) as char)
    }
}

impl TryFrom<char> for File {
    type Error = anyhow::Error;

    fn try_from(file: char) -> anyhow::Result<Self> {
        match file {
            'a'..='h' => Ok(unsafe { mem::transmute(file as u8 - b'a') }),
            _ => bail!("file should be within 'a'..='h', got '{file}'"),
        }
    }
}

impl TryFrom<u8> for File {
    type Error = anyhow::Error;

    fn try_from(column: u8) -> anyhow::Result<Self> {
        match column {
            0..=7 => Ok(unsafe { mem::transmute(column) }),
            _ => bail!("file should be within 0..BOARD_WIDTH, got {column}"),
        }
    }
}

/// Represents a horizontal row of the chessboard. In chess notation, it is
/// represented with a number. The implementation assumes zero-based values
/// (i.e. rank 1 would be 0).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
#[allow(missing_docs)]
pub enum Rank {
    One = 0,
    Two = 1,
    Three = 2,
    Four = 3,
    Five = 4,
    Six = 5,
    Seven = 6,
    Eight = 7,
}

impl Rank {
    /// Returns a pre-calculated bitboard mask with 1s set for squares of the
    /// given rank.
    #[must_use]
    pub const fn mask(self) -> Bitboard {
        Bitboard::from_bits(0xFF << ((BOARD_WIDTH - 1 - self as u8) * BOARD_WIDTH))
    }

    /// The rank pieces of `alliance` (except pawns) start on.
    #[must_use]
    pub const fn backrank(alliance: Alliance) -> Self {
        match alliance {
            Alliance::White => Self::One,
            Alliance::Black => Self::Eight,
        }
    }

    /// The rank pawns of `alliance` start on and may jump from.
    #[must_use]
    pub const fn pawns_starting(alliance: Alliance) -> Self {
        match alliance {
            Alliance::White => Self::Two,
            Alliance::Black => Self::Seven,
        }
    }
}

impl TryFrom<char> for Rank {
    type Error = anyhow::Error;

    fn try_from(rank: char) -> anyhow::Result<Self> {
        match rank {
            '1'..='8' => Ok(unsafe { mem::transmute(rank as u8 - b'1') }),
            _ => bail!("rank should be within '1'..='8', got '{rank}'"),
        }
    }
}

impl TryFrom<u8> for Rank {
    type Error = anyhow::Error;

    fn try_from(row: u8) -> anyhow::Result<Self> {
        match row {
            0..=7 => Ok(unsafe { mem::transmute(row) }),
            _ => bail!("rank should be within 0..BOARD_WIDTH, got {row}"),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8 + 1)
    }
}

/// A standard game of chess is played between two sides: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
pub enum Alliance {
    White,
    Black,
}

impl Alliance {
    /// "Flips" the color.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Rank step a pawn of this side advances by: White moves towards a8
    /// (decreasing indices), Black towards h1.
    #[must_use]
    pub const fn direction(self) -> i8 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn opposite_direction(self) -> i8 {
        -self.direction()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_white(self) -> bool {
        matches!(self, Self::White)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_black(self) -> bool {
        matches!(self, Self::Black)
    }

    /// Whether a pawn of this side reaching `square` gets promoted.
    #[must_use]
    pub const fn is_promotion_square(self, square: Square) -> bool {
        Rank::backrank(self.opponent()).mask().contains(square)
    }

    /// Picks the value belonging to this side.
    #[must_use]
    pub fn choose<T>(self, white: T, black: T) -> T {
        match self {
            Self::White => white,
            Self::Black => black,
        }
    }
}

impl Not for Alliance {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.opponent()
    }
}

impl TryFrom<&str> for Alliance {
    type Error = anyhow::Error;

    fn try_from(alliance: &str) -> anyhow::Result<Self> {
        match alliance {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("side to move should be 'w' or 'b', got '{alliance}'"),
        }
    }
}

impl fmt::Display for Alliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match self {
            Self::White => 'w',
            Self::Black => 'b',
        })
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Material value in centipawns, following the "[standard piece
    /// valuations]". The king is priced high enough to dominate everything
    /// else; both sides always have exactly one so it cancels out.
    ///
    /// [standard piece valuations]: https://en.wikipedia.org/wiki/Chess_piece_relative_value
    #[must_use]
    pub const fn value(self) -> i32 {
        match self {
            Self::Pawn => 100,
            Self::Knight | Self::Bishop => 300,
            Self::Rook => 500,
            Self::Queen => 900,
            Self::King => 10_000,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_king(self) -> bool {
        matches!(self, Self::King)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_rook(self) -> bool {
        matches!(self, Self::Rook)
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    #[must_use]
    pub const fn symbol(self, alliance: Alliance) -> char {
        let symbol = match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        };
        match alliance {
            Alliance::White => symbol.to_ascii_uppercase(),
            Alliance::Black => symbol,
        }
    }

    /// Parses a FEN piece letter into its owner and kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the letter is not one of "KQRBNPkqrbnp".
    pub fn from_symbol(symbol: char) -> anyhow::Result<(Alliance, Self)> {
        let alliance = if symbol.is_ascii_uppercase() {
            Alliance::White
        } else {
            Alliance::Black
        };
        let kind = match symbol.to_ascii_lowercase() {
            'p' => Self::Pawn,
            'n' => Self::Knight,
            'b' => Self::Bishop,
            'r' => Self::Rook,
            'q' => Self::Queen,
            'k' => Self::King,
            _ => bail!("piece symbol should be within \"KQRBNPkqrbnp\", got '{symbol}'"),
        };
        Ok((alliance, kind))
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.symbol(Alliance::Black))
    }
}

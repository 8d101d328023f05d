//! Immutable board snapshot and the [`Builder`] that is the only way to create
//! one.
//!
//! A [`Board`] is never modified after construction: playing a move produces a
//! new board (see [`crate::chess::moves::Move::execute`]). Everything each side
//! needs to answer "am I in check", "can I castle" and "which moves are legal"
//! is computed once, when the board is built.

use std::fmt::{self, Write};

use anyhow::bail;
use arrayvec::ArrayVec;
use strum::IntoEnumIterator;

use crate::chess::bitboard::Bitboard;
use crate::chess::core::{Alliance, File, PieceKind, Rank, Square, BOARD_SIZE, BOARD_WIDTH};
use crate::chess::moves::Move;
use crate::chess::piece::Piece;
use crate::chess::player::{Player, PlayerState};
use crate::chess::tile::{Tile, EMPTY_TILES};

/// Upper bound on the number of pieces one side can have.
pub const MAX_PIECES: usize = 16;

/// Pieces on the back rank in the initial position, by file.
pub(crate) const BACK_RANK: [PieceKind; BOARD_WIDTH as usize] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

pub(crate) type PieceList = ArrayVec<Piece, MAX_PIECES>;

/// Piece placement, side to move and en passant state plus per-side data
/// derived from them.
///
/// Boards are cheap to share between threads: all derived data is either
/// computed eagerly or memoised through [`std::sync::OnceLock`].
#[derive(Clone)]
pub struct Board {
    tiles: [Tile; BOARD_SIZE as usize],
    white_pieces: PieceList,
    black_pieces: PieceList,
    en_passant_pawn: Option<Piece>,
    side_to_move: Alliance,
    white: PlayerState,
    black: PlayerState,
}

impl Board {
    /// Creates the board corresponding to the initial position, White to
    /// move.
    #[must_use]
    pub fn starting() -> Self {
        let mut builder = Builder::new();
        for alliance in Alliance::iter() {
            for file in File::iter() {
                let _ = builder
                    .set_piece(Piece::new(
                        BACK_RANK[file as usize],
                        alliance,
                        Square::new(file, Rank::backrank(alliance)),
                    ))
                    .set_piece(Piece::new(
                        PieceKind::Pawn,
                        alliance,
                        Square::new(file, Rank::pawns_starting(alliance)),
                    ));
            }
        }
        builder.build()
    }

    fn new(builder: &Builder) -> anyhow::Result<Self> {
        let mut tiles = EMPTY_TILES;
        let mut white_pieces = PieceList::new();
        let mut black_pieces = PieceList::new();
        for (tile, piece) in tiles.iter_mut().zip(builder.pieces.iter()) {
            let Some(piece) = piece else {
                continue;
            };
            *tile = Tile::new(piece.square, Some(*piece));
            let pieces = match piece.alliance {
                Alliance::White => &mut white_pieces,
                Alliance::Black => &mut black_pieces,
            };
            if pieces.try_push(*piece).is_err() {
                bail!(
                    "{} should have at most {MAX_PIECES} pieces",
                    piece.alliance.choose("white", "black")
                );
            }
        }
        let white_king = find_king(&white_pieces, Alliance::White)?;
        let black_king = find_king(&black_pieces, Alliance::Black)?;
        if let Some(pawn) = builder.en_passant_pawn {
            if pawn.kind != PieceKind::Pawn {
                bail!("en passant piece should be a pawn, got {pawn:?}");
            }
            if tiles[pawn.square.index()].piece() != Some(pawn) {
                bail!("en passant pawn should be on the board: {pawn:?}");
            }
        }
        let mut board = Self {
            tiles,
            white_pieces,
            black_pieces,
            en_passant_pawn: builder.en_passant_pawn,
            side_to_move: builder.side_to_move,
            white: PlayerState::new(white_king),
            black: PlayerState::new(black_king),
        };
        let white_attacks = board.calc_attacks(Alliance::White);
        let black_attacks = board.calc_attacks(Alliance::Black);
        board.white.attacks = white_attacks;
        board.white.in_check = black_attacks.contains(white_king.square);
        board.black.attacks = black_attacks;
        board.black.in_check = white_attacks.contains(black_king.square);
        board.white.castle_moves = board.white_player().calc_castle_moves();
        board.black.castle_moves = board.black_player().calc_castle_moves();
        Ok(board)
    }

    fn calc_attacks(&self, alliance: Alliance) -> Bitboard {
        let mut scratch = Vec::new();
        let mut attacks = Bitboard::empty();
        for piece in self.pieces(alliance) {
            attacks |= piece.attacks(self, &mut scratch);
        }
        attacks
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn tile(&self, square: Square) -> &Tile {
        &self.tiles[square.index()]
    }

    /// All 64 tiles in a8..h1 order.
    #[must_use]
    pub const fn tiles(&self) -> &[Tile; BOARD_SIZE as usize] {
        &self.tiles
    }

    /// Active white pieces in tile order.
    #[must_use]
    pub fn white_pieces(&self) -> &[Piece] {
        &self.white_pieces
    }

    /// Active black pieces in tile order.
    #[must_use]
    pub fn black_pieces(&self) -> &[Piece] {
        &self.black_pieces
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn pieces(&self, alliance: Alliance) -> &[Piece] {
        alliance.choose(&self.white_pieces, &self.black_pieces)
    }

    /// White pieces followed by black pieces.
    pub fn all_active_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.white_pieces.iter().chain(self.black_pieces.iter())
    }

    /// The pawn that has just jumped two squares and may be captured en
    /// passant on this ply.
    #[must_use]
    pub const fn en_passant_pawn(&self) -> Option<Piece> {
        self.en_passant_pawn
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn side_to_move(&self) -> Alliance {
        self.side_to_move
    }

    pub(crate) const fn state(&self, alliance: Alliance) -> &PlayerState {
        match alliance {
            Alliance::White => &self.white,
            Alliance::Black => &self.black,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn player(&self, alliance: Alliance) -> Player<'_> {
        Player::new(self, alliance)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn white_player(&self) -> Player<'_> {
        self.player(Alliance::White)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn black_player(&self) -> Player<'_> {
        self.player(Alliance::Black)
    }

    /// The player whose turn it is.
    #[must_use]
    pub const fn current_player(&self) -> Player<'_> {
        self.player(self.side_to_move)
    }

    /// Legal moves of White followed by legal moves of Black.
    pub fn all_legal_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.white_player()
            .legal_moves()
            .iter()
            .chain(self.black_player().legal_moves())
            .copied()
    }
}

fn find_king(pieces: &[Piece], alliance: Alliance) -> anyhow::Result<Piece> {
    let mut kings = pieces.iter().filter(|piece| piece.kind.is_king());
    match (kings.next(), kings.count()) {
        (Some(king), 0) => Ok(*king),
        (None, _) => bail!("expected 1 {} king, got 0", alliance.choose("white", "black")),
        (Some(_), extra) => bail!(
            "expected 1 {} king, got {}",
            alliance.choose("white", "black"),
            extra + 1
        ),
    }
}

impl PartialEq for Board {
    /// Boards are equal when the pieces, side to move and en passant pawn are
    /// the same; everything else is derived from those.
    fn eq(&self, other: &Self) -> bool {
        self.tiles == other.tiles
            && self.side_to_move == other.side_to_move
            && self.en_passant_pawn == other.en_passant_pawn
    }
}

impl Eq for Board {}

impl fmt::Display for Board {
    /// Prints the board in FEN format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}

impl fmt::Debug for Board {
    /// Dumps the board in a simple format ('.' for empty square, FEN algebraic
    /// symbol for piece) a-la Stockfish "debug" command in UCI mode.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for square in Square::iter() {
            match self.tile(square).piece() {
                Some(piece) => f.write_char(piece.symbol()),
                None => f.write_char('.'),
            }?;
            if square.file() != File::H {
                f.write_str(SQUARE_SEPARATOR)?;
            } else if square.rank() != Rank::One {
                f.write_str(LINE_SEPARATOR)?;
            }
        }
        Ok(())
    }
}

const LINE_SEPARATOR: &str = "\n";
const SQUARE_SEPARATOR: &str = " ";

/// Accumulates the pieces, side to move and en passant pawn of a future
/// [`Board`].
///
/// ```
/// use kibitz::chess::board::Builder;
/// use kibitz::chess::core::{Alliance, PieceKind, Square};
/// use kibitz::chess::piece::Piece;
///
/// let board = Builder::new()
///     .set_piece(Piece::new(PieceKind::King, Alliance::White, Square::E1))
///     .set_piece(Piece::new(PieceKind::King, Alliance::Black, Square::E8))
///     .set_side_to_move(Alliance::Black)
///     .build();
/// assert_eq!(board.to_string(), "4k3/8/8/8/8/8/8/4K3 b - - 0 1");
/// ```
#[derive(Clone, Debug)]
pub struct Builder {
    pieces: [Option<Piece>; BOARD_SIZE as usize],
    side_to_move: Alliance,
    en_passant_pawn: Option<Piece>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Empty board, White to move.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pieces: [None; BOARD_SIZE as usize],
            side_to_move: Alliance::White,
            en_passant_pawn: None,
        }
    }

    /// Places the piece on its square, replacing whatever was there.
    pub fn set_piece(&mut self, piece: Piece) -> &mut Self {
        self.pieces[piece.square.index()] = Some(piece);
        self
    }

    /// The piece placed on `square` so far.
    #[must_use]
    pub const fn piece(&self, square: Square) -> Option<Piece> {
        self.pieces[square.index()]
    }

    #[allow(missing_docs)]
    pub fn set_side_to_move(&mut self, alliance: Alliance) -> &mut Self {
        self.side_to_move = alliance;
        self
    }

    /// The pawn that can be captured en passant on the next ply. It has to be
    /// placed with [`Builder::set_piece`] as well.
    pub fn set_en_passant_pawn(&mut self, pawn: Piece) -> &mut Self {
        self.en_passant_pawn = Some(pawn);
        self
    }

    /// Finalizes the board.
    ///
    /// # Panics
    ///
    /// Panics if either side has no king or more than one, or the placement
    /// is otherwise invalid (see [`Builder::try_build`]).
    #[must_use]
    pub fn build(&self) -> Board {
        match self.try_build() {
            Ok(board) => board,
            Err(e) => panic!("{e}"),
        }
    }

    /// Finalizes the board.
    ///
    /// # Errors
    ///
    /// Returns an error if either side does not have exactly one king, has
    /// more than [`MAX_PIECES`] pieces or the en passant pawn is not on the
    /// board.
    pub fn try_build(&self) -> anyhow::Result<Board> {
        Board::new(self)
    }
}

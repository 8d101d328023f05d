//! Pieces and their movement rules.
//!
//! Each non-pawn [`PieceKind`] is described by a [`MovementRule`]: a table of
//! raw square offsets, the offsets that would wrap around the left or right
//! edge of the board from a given file, and whether the piece slides. Pawns
//! are special-cased.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::chess::bitboard::Bitboard;
use crate::chess::board::Board;
use crate::chess::core::{Alliance, File, PieceKind, Rank, Square, BOARD_WIDTH};
use crate::chess::moves::Move;
use crate::chess::tile::Tile;

/// A chess piece standing on a particular square. Pieces are values: moving a
/// piece produces a new [`Piece`] with the updated square and moved flag.
///
/// Equality and hashing are structural over kind, alliance, square and the
/// moved flag. Whether the king has castled is carried along but does not
/// participate.
#[derive(Clone, Copy, Debug, Eq)]
pub struct Piece {
    #[allow(missing_docs)]
    pub kind: PieceKind,
    #[allow(missing_docs)]
    pub alliance: Alliance,
    #[allow(missing_docs)]
    pub square: Square,
    /// Whether the piece left its initial square at least once.
    pub has_moved: bool,
    /// Only meaningful for kings.
    pub has_castled: bool,
}

impl Piece {
    /// Creates a piece that has not moved yet.
    #[must_use]
    pub const fn new(kind: PieceKind, alliance: Alliance, square: Square) -> Self {
        Self {
            kind,
            alliance,
            square,
            has_moved: false,
            has_castled: false,
        }
    }

    /// Same piece with the moved flag set to `has_moved`.
    #[must_use]
    pub const fn with_moved(self, has_moved: bool) -> Self {
        Self { has_moved, ..self }
    }

    /// Post-move representation of the piece: the new square and the moved
    /// flag set.
    #[must_use]
    pub const fn moved_to(self, square: Square) -> Self {
        Self {
            square,
            has_moved: true,
            ..self
        }
    }

    pub(crate) const fn castled(self) -> Self {
        Self {
            has_castled: true,
            ..self
        }
    }

    /// FEN letter of the piece.
    #[must_use]
    pub const fn symbol(&self) -> char {
        self.kind.symbol(self.alliance)
    }

    /// Moves of this piece that do not leave its own king attacked. The king
    /// also lists the castle moves computed for its side.
    ///
    /// Capturing the enemy king is never a move: it only shows up as an
    /// attacked square when the side not to move gives check.
    #[must_use]
    pub fn calc_legal_moves(&self, board: &Board) -> Vec<Move> {
        let player = board.player(self.alliance);
        let mut moves = Vec::new();
        self.calc_pseudo_legal_moves(board, &mut moves);
        if self.kind.is_king() {
            moves.extend_from_slice(player.castle_moves());
        }
        moves.retain(|candidate| {
            !candidate.captured().is_some_and(|captured| captured.kind.is_king())
                && player.is_safe(candidate)
        });
        moves
    }

    /// Appends moves obeying the movement rules of the piece, ignoring
    /// whether they leave the own king attacked. Castling is handled by the
    /// player.
    pub(crate) fn calc_pseudo_legal_moves(&self, board: &Board, moves: &mut Vec<Move>) {
        if self.kind == PieceKind::Pawn {
            self.calc_pawn_moves(board, moves);
            return;
        }
        let rule = MovementRule::of(self.kind);
        for &offset in rule.offsets {
            let mut current = self.square;
            while !rule.is_excluded(current.file(), offset) {
                let Some(next) = current.offset(offset) else {
                    break;
                };
                match board.tile(next) {
                    Tile::Empty(_) => moves.push(Move::passive(*self, next)),
                    Tile::Occupied(_, occupant) => {
                        if occupant.alliance != self.alliance {
                            moves.push(Move::attack(*self, next, *occupant));
                        }
                        break;
                    },
                }
                if !rule.sliding {
                    break;
                }
                current = next;
            }
        }
    }

    fn calc_pawn_moves(&self, board: &Board, moves: &mut Vec<Move>) {
        let step = self.alliance.direction() * BOARD_WIDTH as i8;
        let promoting = |candidate: Move, destination: Square| {
            if self.alliance.is_promotion_square(destination) {
                candidate.promoted()
            } else {
                candidate
            }
        };
        if let Some(forward) = self.square.offset(step) {
            if board.tile(forward).is_empty() {
                moves.push(promoting(Move::pawn_move(*self, forward), forward));
                if let Some(jump) = forward.offset(step) {
                    if !self.has_moved
                        && self.square.rank() == Rank::pawns_starting(self.alliance)
                        && board.tile(jump).is_empty()
                    {
                        moves.push(Move::pawn_jump(*self, jump));
                    }
                }
            }
        }
        for destination in self.pawn_diagonals() {
            match board.tile(destination) {
                Tile::Occupied(_, occupant) => {
                    if occupant.alliance != self.alliance {
                        moves.push(promoting(
                            Move::pawn_attack(*self, destination, *occupant),
                            destination,
                        ));
                    }
                },
                Tile::Empty(_) => {
                    let Some(pawn) = board.en_passant_pawn() else {
                        continue;
                    };
                    if pawn.alliance != self.alliance
                        && destination.offset(-step) == Some(pawn.square)
                    {
                        moves.push(Move::en_passant(*self, destination, pawn));
                    }
                },
            }
        }
    }

    /// Both squares a pawn captures on, excluding the ones that would wrap
    /// around the board edge.
    fn pawn_diagonals(&self) -> impl Iterator<Item = Square> + '_ {
        let direction = self.alliance.direction();
        [7, 9].into_iter().filter_map(move |distance: i8| {
            let offset = distance * direction;
            // Moving "left" (towards the A file) from White's point of view is
            // -9 for White and +7 for Black.
            let wraps = matches!(
                (offset, self.square.file()),
                (-9 | 7, File::A) | (-7 | 9, File::H)
            );
            if wraps {
                None
            } else {
                self.square.offset(offset)
            }
        })
    }

    /// Squares this piece attacks: every destination of its pseudo-legal moves,
    /// except for pawns which attack both diagonals regardless of what stands
    /// there and never attack with pushes.
    pub(crate) fn attacks(&self, board: &Board, scratch: &mut Vec<Move>) -> Bitboard {
        if self.kind == PieceKind::Pawn {
            return self.pawn_diagonals().collect();
        }
        scratch.clear();
        self.calc_pseudo_legal_moves(board, scratch);
        scratch.iter().filter_map(Move::destination).collect()
    }
}

impl PartialEq for Piece {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.alliance == other.alliance
            && self.square == other.square
            && self.has_moved == other.has_moved
    }
}

impl Hash for Piece {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.alliance.hash(state);
        self.square.hash(state);
        self.has_moved.hash(state);
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Movement rule of a non-pawn piece kind.
#[derive(Debug)]
pub(crate) struct MovementRule {
    /// Raw square index deltas, in the order moves are generated.
    pub(crate) offsets: &'static [i8],
    /// Offsets that are not allowed from a square on the given file because
    /// they would wrap around to the opposite edge of the board.
    exclusions: &'static [(File, &'static [i8])],
    /// Sliding pieces repeat the offset until blocked.
    pub(crate) sliding: bool,
}

const KNIGHT: MovementRule = MovementRule {
    offsets: &[-17, -15, -10, -6, 6, 10, 15, 17],
    exclusions: &[
        (File::A, &[-17, -10, 6, 15]),
        (File::B, &[-10, 6]),
        (File::G, &[-6, 10]),
        (File::H, &[-15, -6, 10, 17]),
    ],
    sliding: false,
};

const BISHOP: MovementRule = MovementRule {
    offsets: &[-9, -7, 7, 9],
    exclusions: &[(File::A, &[-9, 7]), (File::H, &[-7, 9])],
    sliding: true,
};

const ROOK: MovementRule = MovementRule {
    offsets: &[-8, -1, 1, 8],
    exclusions: &[(File::A, &[-1]), (File::H, &[1])],
    sliding: true,
};

const ROYAL_OFFSETS: &[i8] = &[-9, -8, -7, -1, 1, 7, 8, 9];
const ROYAL_EXCLUSIONS: &[(File, &[i8])] = &[(File::A, &[-9, -1, 7]), (File::H, &[-7, 1, 9])];

const QUEEN: MovementRule = MovementRule {
    offsets: ROYAL_OFFSETS,
    exclusions: ROYAL_EXCLUSIONS,
    sliding: true,
};

const KING: MovementRule = MovementRule {
    offsets: ROYAL_OFFSETS,
    exclusions: ROYAL_EXCLUSIONS,
    sliding: false,
};

impl MovementRule {
    /// # Panics
    ///
    /// Pawns have no offset table.
    pub(crate) const fn of(kind: PieceKind) -> &'static Self {
        match kind {
            PieceKind::Knight => &KNIGHT,
            PieceKind::Bishop => &BISHOP,
            PieceKind::Rook => &ROOK,
            PieceKind::Queen => &QUEEN,
            PieceKind::King => &KING,
            PieceKind::Pawn => panic!("pawn movement is not table-driven"),
        }
    }

    fn is_excluded(&self, file: File, offset: i8) -> bool {
        self.exclusions
            .iter()
            .any(|(excluded_file, offsets)| *excluded_file == file && offsets.contains(&offset))
    }
}

//! [`Move`] describes a single ply and produces the successor [`Board`].

use std::fmt;

use anyhow::{bail, Context};

use crate::chess::board::{Board, Builder};
use crate::chess::core::{PieceKind, Square};
use crate::chess::piece::Piece;

/// Discriminates the flavours of moves. Promotions are not a separate kind:
/// see [`Move::promotion`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// The sentinel returned when no move matches.
    Null,
    /// Non-pawn piece moving to an empty square.
    Passive,
    /// Non-pawn piece capturing an enemy piece.
    Attack,
    /// Pawn advancing a single square.
    PawnMove,
    /// Pawn advancing two squares from its starting rank.
    PawnJump,
    /// Pawn capturing diagonally.
    PawnAttack,
    /// Pawn capturing a pawn that has just jumped past it.
    EnPassantAttack,
    #[allow(missing_docs)]
    KingSideCastle,
    #[allow(missing_docs)]
    QueenSideCastle,
}

impl MoveKind {
    /// Whether the move takes an opponent piece.
    #[must_use]
    pub const fn is_attack(self) -> bool {
        matches!(self, Self::Attack | Self::PawnAttack | Self::EnPassantAttack)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_castle(self) -> bool {
        matches!(self, Self::KingSideCastle | Self::QueenSideCastle)
    }
}

/// The rook taking part in a castle move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CastleRook {
    #[allow(missing_docs)]
    pub rook: Piece,
    #[allow(missing_docs)]
    pub from: Square,
    #[allow(missing_docs)]
    pub to: Square,
}

/// A single ply. Moves do not reference the board they were generated for:
/// [`Move::execute`] receives it explicitly and never modifies it.
///
/// Equality is structural, two moves generated independently for the same
/// board compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    piece: Option<Piece>,
    destination: Option<Square>,
    captured: Option<Piece>,
    castle: Option<CastleRook>,
    promotion: Option<PieceKind>,
}

impl Move {
    /// Sentinel for "no move", e.g. when [`Move::create`] finds no match or
    /// the search has nothing to play.
    pub const NULL: Self = Self {
        kind: MoveKind::Null,
        piece: None,
        destination: None,
        captured: None,
        castle: None,
        promotion: None,
    };

    const fn new(kind: MoveKind, piece: Piece, destination: Square) -> Self {
        Self {
            kind,
            piece: Some(piece),
            destination: Some(destination),
            captured: None,
            castle: None,
            promotion: None,
        }
    }

    const fn capturing(self, captured: Piece) -> Self {
        Self {
            captured: Some(captured),
            ..self
        }
    }

    pub(crate) const fn passive(piece: Piece, destination: Square) -> Self {
        Self::new(MoveKind::Passive, piece, destination)
    }

    pub(crate) const fn attack(piece: Piece, destination: Square, captured: Piece) -> Self {
        Self::new(MoveKind::Attack, piece, destination).capturing(captured)
    }

    pub(crate) const fn pawn_move(pawn: Piece, destination: Square) -> Self {
        Self::new(MoveKind::PawnMove, pawn, destination)
    }

    pub(crate) const fn pawn_jump(pawn: Piece, destination: Square) -> Self {
        Self::new(MoveKind::PawnJump, pawn, destination)
    }

    pub(crate) const fn pawn_attack(pawn: Piece, destination: Square, captured: Piece) -> Self {
        Self::new(MoveKind::PawnAttack, pawn, destination).capturing(captured)
    }

    pub(crate) const fn en_passant(pawn: Piece, destination: Square, captured: Piece) -> Self {
        Self::new(MoveKind::EnPassantAttack, pawn, destination).capturing(captured)
    }

    pub(crate) const fn castle(
        kind: MoveKind,
        king: Piece,
        destination: Square,
        castle: CastleRook,
    ) -> Self {
        Self {
            castle: Some(castle),
            ..Self::new(kind, king, destination)
        }
    }

    /// Wraps a pawn move reaching the last rank: the pawn becomes a queen.
    pub(crate) const fn promoted(self) -> Self {
        Self {
            promotion: Some(PieceKind::Queen),
            ..self
        }
    }

    /// Finds the move of either side going from `from` to `to` among all
    /// legal moves on the board. Returns [`Move::NULL`] if there is none.
    #[must_use]
    pub fn create(board: &Board, from: Square, to: Square) -> Self {
        board
            .all_legal_moves()
            .find(|candidate| {
                candidate.source() == Some(from) && candidate.destination() == Some(to)
            })
            .unwrap_or(Self::NULL)
    }

    /// Resolves a move written in UCI long algebraic notation (e.g. "e2e4",
    /// "e7e8q", "e1g1" for castling). Only queen promotions exist, so the
    /// promotion suffix can be omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is malformed or there is no such legal
    /// move on the board.
    pub fn from_uci(board: &Board, uci: &str) -> anyhow::Result<Self> {
        let uci = uci.trim();
        if !(4..=5).contains(&uci.len()) || !uci.is_ascii() {
            bail!("move should look like \"e2e4\" or \"e7e8q\", got \"{uci}\"");
        }
        let from = Square::try_from(&uci[..2]).with_context(|| format!("source in {uci}"))?;
        let to = Square::try_from(&uci[2..4]).with_context(|| format!("destination in {uci}"))?;
        match &uci[4..] {
            "" | "q" => {},
            promotion => bail!("only queen promotions are supported, got '{promotion}'"),
        }
        let found = Self::create(board, from, to);
        if found == Self::NULL {
            bail!("no legal move {uci} on board {board}");
        }
        Ok(found)
    }

    /// Builds the board after this move is played on `board`.
    ///
    /// Every piece of both sides is carried over except the moved one, the
    /// captured one and the rook taking part in castling. The moved piece (and
    /// the rook) are placed on their destinations with the moved flag set,
    /// and the side to move flips. Only a pawn jump leaves an en passant pawn
    /// behind.
    ///
    /// # Panics
    ///
    /// Panics when called on [`Move::NULL`].
    #[must_use]
    pub fn execute(&self, board: &Board) -> Board {
        let (Some(piece), Some(destination)) = (self.piece, self.destination) else {
            panic!("cannot execute the null move");
        };
        let vacated = [
            Some(piece.square),
            self.captured.map(|captured| captured.square),
            self.castle.map(|castle| castle.from),
        ];
        let mut builder = Builder::new();
        for remaining in board
            .all_active_pieces()
            .filter(|remaining| !vacated.contains(&Some(remaining.square)))
        {
            let _ = builder.set_piece(*remaining);
        }
        let mut moved = match self.promotion {
            Some(kind) => Piece::new(kind, piece.alliance, destination).with_moved(true),
            None => piece.moved_to(destination),
        };
        if let Some(castle) = self.castle {
            moved = moved.castled();
            let _ = builder.set_piece(castle.rook.moved_to(castle.to));
        }
        let _ = builder
            .set_piece(moved)
            .set_side_to_move(piece.alliance.opponent());
        if self.kind == MoveKind::PawnJump {
            let _ = builder.set_en_passant_pawn(moved);
        }
        builder.build()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// The piece making the move, as it stood before moving.
    #[must_use]
    pub const fn piece(&self) -> Option<Piece> {
        self.piece
    }

    /// Square the moved piece starts from.
    #[must_use]
    pub const fn source(&self) -> Option<Square> {
        match self.piece {
            Some(piece) => Some(piece.square),
            None => None,
        }
    }

    /// Square the moved piece lands on (the king's square for castles).
    #[must_use]
    pub const fn destination(&self) -> Option<Square> {
        self.destination
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn captured(&self) -> Option<Piece> {
        self.captured
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn castle_rook(&self) -> Option<CastleRook> {
        self.castle
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn promotion(&self) -> Option<PieceKind> {
        self.promotion
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_attack(&self) -> bool {
        self.kind.is_attack()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_castle(&self) -> bool {
        self.kind.is_castle()
    }
}

impl fmt::Display for Move {
    /// Prints the move in UCI format: source and destination squares followed
    /// by the promotion piece, if any.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(source), Some(destination)) = (self.source(), self.destination) else {
            return write!(f, "0000");
        };
        write!(f, "{source}{destination}")?;
        if let Some(promotion) = self.promotion {
            write!(f, "{promotion}")?;
        }
        Ok(())
    }
}

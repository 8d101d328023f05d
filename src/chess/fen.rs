//! [Forsyth-Edwards Notation] import and export for [`Board`].
//!
//! FEN does not store whether a piece has moved, so the flags are derived from
//! the placement and the castling rights, the same way for both sides:
//!
//! - A pawn is unmoved iff it stands on its starting rank.
//! - A king is unmoved iff it stands on its initial square and its side keeps
//!   at least one castling right.
//! - A rook in the corner is unmoved iff the matching castling right is
//!   present. Every other rook has moved.
//! - Knights, bishops and queens are unmoved iff they stand on their initial
//!   squares.
//!
//! [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation

use std::fmt::{self, Write};

use anyhow::{bail, Context};
use strum::IntoEnumIterator;
use tracing::trace;

use crate::chess::board::{Board, Builder, BACK_RANK};
use crate::chess::core::{Alliance, File, PieceKind, Rank, Square, BOARD_WIDTH};
use crate::chess::piece::Piece;

bitflags::bitflags! {
    /// Track the ability to [castle] each side (kingside is often referred to
    /// as O-O or h-side castle, queenside -- O-O-O or a-side castle). When the
    /// king moves, player loses ability to castle both sides. When the rook
    /// moves, player loses ability to castle its corresponding side.
    ///
    /// [castle]: https://www.chessprogramming.org/Castling
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CastleRights: u8 {
        #[allow(missing_docs)]
        const WHITE_SHORT = 0b1000;
        #[allow(missing_docs)]
        const WHITE_LONG = 0b0100;
        #[allow(missing_docs)]
        const BLACK_SHORT = 0b0010;
        #[allow(missing_docs)]
        const BLACK_LONG = 0b0001;
    }
}

/// FEN letters in the order they have to appear in.
const CASTLE_LETTERS: [(char, CastleRights); 4] = [
    ('K', CastleRights::WHITE_SHORT),
    ('Q', CastleRights::WHITE_LONG),
    ('k', CastleRights::BLACK_SHORT),
    ('q', CastleRights::BLACK_LONG),
];

impl CastleRights {
    /// Rights of `alliance` to castle king side.
    #[must_use]
    pub const fn short(alliance: Alliance) -> Self {
        match alliance {
            Alliance::White => Self::WHITE_SHORT,
            Alliance::Black => Self::BLACK_SHORT,
        }
    }

    /// Rights of `alliance` to castle queen side.
    #[must_use]
    pub const fn long(alliance: Alliance) -> Self {
        match alliance {
            Alliance::White => Self::WHITE_LONG,
            Alliance::Black => Self::BLACK_LONG,
        }
    }

    fn of(board: &Board) -> Self {
        let mut rights = Self::empty();
        for alliance in Alliance::iter() {
            let player = board.player(alliance);
            if player.is_king_side_castle_capable() {
                rights |= Self::short(alliance);
            }
            if player.is_queen_side_castle_capable() {
                rights |= Self::long(alliance);
            }
        }
        rights
    }
}

impl TryFrom<&str> for CastleRights {
    type Error = anyhow::Error;

    /// Parses [`CastleRights`] for both players from the FEN format.
    ///
    /// # Errors
    ///
    /// Returns [`anyhow::Error`] if given pattern does not match
    ///
    /// [`CastleRights`] := (K)? (Q)? (k)? (q)? | -
    fn try_from(input: &str) -> anyhow::Result<Self> {
        if input == "-" {
            return Ok(Self::empty());
        }
        if input.is_empty() {
            bail!("castling rights should be '-' or a subset of \"KQkq\", got nothing");
        }
        let mut rights = Self::empty();
        let mut letters = CASTLE_LETTERS.iter();
        for symbol in input.chars() {
            // Letters are consumed in order, so duplicates and reordering fail
            // to find a match.
            match letters.find(|(letter, _)| *letter == symbol) {
                Some((_, flag)) => rights |= *flag,
                None => bail!("castling rights should be a subset of \"KQkq\", got \"{input}\""),
            }
        }
        Ok(rights)
    }
}

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_char('-');
        }
        for (letter, flag) in CASTLE_LETTERS {
            if self.contains(flag) {
                f.write_char(letter)?;
            }
        }
        Ok(())
    }
}

fn is_unmoved(kind: PieceKind, alliance: Alliance, square: Square, rights: CastleRights) -> bool {
    let on_backrank = square.rank() == Rank::backrank(alliance);
    match kind {
        PieceKind::Pawn => square.rank() == Rank::pawns_starting(alliance),
        PieceKind::King => {
            on_backrank
                && square.file() == File::E
                && rights.intersects(CastleRights::short(alliance) | CastleRights::long(alliance))
        },
        PieceKind::Rook => {
            on_backrank
                && match square.file() {
                    File::H => rights.contains(CastleRights::short(alliance)),
                    File::A => rights.contains(CastleRights::long(alliance)),
                    _ => false,
                }
        },
        PieceKind::Knight | PieceKind::Bishop | PieceKind::Queen => {
            on_backrank && BACK_RANK[square.file() as usize] == kind
        },
    }
}

impl Board {
    /// Parses board from Forsyth-Edwards Notation. It will also accept trimmed
    /// FEN (EPD with 4 parts).
    ///
    /// FEN ::=
    ///       Piece Placement
    ///   ' ' Side to move
    ///   ' ' Castling ability
    ///   ' ' En passant target square
    ///   ' ' Halfmove clock
    ///   ' ' Fullmove counter
    ///
    /// The clocks are validated but not stored: the board does not track
    /// them.
    ///
    /// NOTE: This expects properly-formatted inputs: no extra symbols or
    /// additional whitespace. Use the `TryFrom<&str>` implementation for
    /// cleaning up the input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid FEN or describes an
    /// invalid board (see [`Builder::try_build`]).
    pub fn from_fen(input: &str) -> anyhow::Result<Self> {
        let mut parts = input.split(' ');
        let Some(placement) = parts.next() else {
            bail!("incorrect FEN: missing pieces placement");
        };
        let mut pieces = Vec::new();
        let mut ranks = Rank::iter().rev();
        for rank_fen in placement.split('/') {
            let Some(rank) = ranks.next() else {
                bail!("incorrect FEN: expected 8 ranks, got {placement}");
            };
            let mut file: u8 = 0;
            for symbol in rank_fen.chars() {
                if file >= BOARD_WIDTH {
                    bail!("incorrect FEN: rank {rank_fen} exceeds {BOARD_WIDTH} files");
                }
                match symbol {
                    '0' => bail!("increment can not be 0"),
                    '1'..='8' => {
                        file += symbol as u8 - b'0';
                        continue;
                    },
                    _ => (),
                }
                let (alliance, kind) = PieceKind::from_symbol(symbol)?;
                pieces.push((kind, alliance, Square::new(file.try_into()?, rank)));
                file += 1;
            }
            if file != BOARD_WIDTH {
                bail!("incorrect FEN: rank size should be exactly {BOARD_WIDTH}, got {rank_fen} of length {file}");
            }
        }
        if ranks.next().is_some() {
            bail!("incorrect FEN: there should be 8 ranks, got {placement}");
        }
        let side_to_move: Alliance = match parts.next() {
            Some(value) => value.try_into()?,
            None => bail!("incorrect FEN: missing side to move"),
        };
        let rights: CastleRights = match parts.next() {
            Some(value) => value.try_into()?,
            None => bail!("incorrect FEN: missing castling rights"),
        };
        let en_passant_target = match parts.next() {
            Some("-") => None,
            Some(value) => Some(Square::try_from(value)?),
            None => bail!("incorrect FEN: missing en passant square"),
        };
        // Clocks are optional (EPD), but come in pairs.
        if let Some(halfmove) = parts.next() {
            let Some(fullmove) = parts.next() else {
                bail!("incorrect FEN: missing fullmove counter");
            };
            for (name, value) in [("halfmove clock", halfmove), ("fullmove counter", fullmove)] {
                let _: u16 = value
                    .parse()
                    .with_context(|| format!("incorrect FEN: {name} can not be parsed {value}"))?;
            }
        }
        if parts.next().is_some() {
            bail!("trailing symbols are not allowed in FEN");
        }

        let mut builder = Builder::new();
        for (kind, alliance, square) in pieces {
            let _ = builder.set_piece(
                Piece::new(kind, alliance, square)
                    .with_moved(!is_unmoved(kind, alliance, square, rights)),
            );
        }
        let _ = builder.set_side_to_move(side_to_move);
        if let Some(target) = en_passant_target {
            let pushed = side_to_move.opponent();
            let pawn = target
                .offset(pushed.direction() * BOARD_WIDTH as i8)
                .and_then(|square| builder.piece(square))
                .filter(|piece| piece.kind == PieceKind::Pawn && piece.alliance == pushed);
            let Some(pawn) = pawn else {
                bail!("en passant square is not beyond pushed pawn: {target}");
            };
            let _ = builder.set_en_passant_pawn(pawn);
        }
        let board = builder.try_build()?;
        trace!(fen = input, "parsed board");
        Ok(board)
    }

    /// Dumps the board in Forsyth-Edwards Notation. Clocks are not tracked and
    /// always written as "0 1".
    #[must_use]
    pub fn fen(&self) -> String {
        let mut result = String::new();
        for rank in Rank::iter().rev() {
            let mut empty_squares = 0;
            for file in File::iter() {
                match self.tile(Square::new(file, rank)).piece() {
                    Some(piece) => {
                        if empty_squares != 0 {
                            result.push_str(&empty_squares.to_string());
                            empty_squares = 0;
                        }
                        result.push(piece.symbol());
                    },
                    None => empty_squares += 1,
                }
            }
            if empty_squares != 0 {
                result.push_str(&empty_squares.to_string());
            }
            if rank != Rank::One {
                const RANK_SEPARATOR: char = '/';
                result.push(RANK_SEPARATOR);
            }
        }
        let en_passant_target = self.en_passant_pawn().and_then(|pawn| {
            pawn.square
                .offset(pawn.alliance.opposite_direction() * BOARD_WIDTH as i8)
        });
        let _ = write!(
            result,
            " {} {} {} 0 1",
            self.side_to_move(),
            CastleRights::of(self),
            en_passant_target.map_or_else(|| String::from("-"), |square| square.to_string())
        );
        result
    }
}

impl TryFrom<&str> for Board {
    type Error = anyhow::Error;

    /// Parses FEN, tolerating surrounding whitespace and a "fen " or "epd "
    /// prefix.
    fn try_from(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        for prefix in ["fen ", "epd "] {
            if let Some(stripped) = input.strip_prefix(prefix) {
                return Self::from_fen(stripped.trim());
            }
        }
        Self::from_fen(input)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn castle_rights() {
        assert_eq!(CastleRights::try_from("-").unwrap(), CastleRights::empty());
        assert_eq!(CastleRights::try_from("KQkq").unwrap(), CastleRights::all());
        assert_eq!(
            CastleRights::try_from("Kq").unwrap(),
            CastleRights::WHITE_SHORT | CastleRights::BLACK_LONG
        );
        assert!(CastleRights::try_from("qk").is_err());
        assert!(CastleRights::try_from("KK").is_err());
        assert!(CastleRights::try_from("").is_err());
        assert!(CastleRights::try_from("X").is_err());
        assert_eq!(CastleRights::all().to_string(), "KQkq");
        assert_eq!(CastleRights::empty().to_string(), "-");
        assert_eq!(CastleRights::BLACK_SHORT.to_string(), "k");
    }

    #[test]
    fn starting_position() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert_eq!(Board::starting().fen(), fen);
        assert_eq!(Board::from_fen(fen).unwrap(), Board::starting());
        assert_eq!(
            Board::try_from(" fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - \n")
                .unwrap(),
            Board::starting()
        );
    }

    #[test]
    fn moved_flags_are_symmetric() {
        let board = Board::from_fen("r3k2r/p6p/8/8/8/8/P6P/R3K2R w Kq - 0 1").unwrap();
        let moved = |square: Square| board.tile(square).piece().unwrap().has_moved;
        assert!(!moved(Square::E1));
        assert!(!moved(Square::H1));
        assert!(moved(Square::A1));
        assert!(!moved(Square::E8));
        assert!(!moved(Square::A8));
        assert!(moved(Square::H8));
        assert!(!moved(Square::A2));
        assert!(!moved(Square::H7));
        assert_eq!(board.to_string(), "r3k2r/p6p/8/8/8/8/P6P/R3K2R w Kq - 0 1");

        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b - - 0 1").unwrap();
        assert!(board.all_active_pieces().all(|piece| piece.has_moved));
    }

    #[test]
    fn en_passant() {
        let fen = "rnbqkbnr/pppp1ppp/8/8/3pP3/8/PPP2PPP/RNBQKBNR b KQkq e3 0 1";
        let board = Board::from_fen(fen).unwrap();
        let pawn = board.en_passant_pawn().unwrap();
        assert_eq!(pawn.square, Square::E4);
        assert_eq!(pawn.alliance, Alliance::White);
        assert_eq!(board.to_string(), fen);

        assert!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq e3 0 1").is_err()
        );
    }

    #[test]
    fn clocks() {
        assert!(Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 12 40").is_ok());
        assert!(Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").is_ok());
        assert!(Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0").is_err());
        assert!(Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - x 1").is_err());
        assert!(Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1 extra").is_err());
    }

    #[test]
    fn malformed_placement() {
        for fen in [
            "4k3/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/9/8/8/8/8/8/4K3 w - - 0 1",
            "4k4/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K2 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1",
            "4k3/8/8/8/8/8/8/4X3 w - - 0 1",
            "4k3/8/8/8/8/8/8/03K4 w - - 0 1",
            "4k3/8/8/8/8/8/8/8 w - - 0 1",
            "",
        ] {
            assert!(Board::from_fen(fen).is_err(), "{fen}");
        }
    }
}

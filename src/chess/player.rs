//! Per-side view of a [`Board`]: king, check status, castling and the legal
//! move protocol.

use std::borrow::Cow;
use std::sync::OnceLock;

use arrayvec::ArrayVec;

use crate::chess::bitboard::Bitboard;
use crate::chess::board::Board;
use crate::chess::core::{Alliance, Square};
use crate::chess::moves::{CastleRook, Move, MoveKind};
use crate::chess::piece::Piece;

/// Data a [`Board`] stores for each side. Everything except the legal moves is
/// computed when the board is built; legal moves need to play every candidate
/// move on a new board, so they are computed on first use.
#[derive(Clone, Debug)]
pub(crate) struct PlayerState {
    pub(crate) king: Piece,
    /// Squares the side's pieces attack.
    pub(crate) attacks: Bitboard,
    pub(crate) in_check: bool,
    pub(crate) castle_moves: ArrayVec<Move, 2>,
    legal_moves: OnceLock<Vec<Move>>,
}

impl PlayerState {
    pub(crate) fn new(king: Piece) -> Self {
        Self {
            king,
            attacks: Bitboard::empty(),
            in_check: false,
            castle_moves: ArrayVec::new(),
            legal_moves: OnceLock::new(),
        }
    }
}

/// Squares involved in castling to one side.
struct CastleRule {
    kind: MoveKind,
    king_from: Square,
    king_to: Square,
    rook_from: Square,
    rook_to: Square,
    /// Squares between the king and the rook.
    between: &'static [Square],
    /// Squares the king passes through or lands on.
    transit: &'static [Square],
}

const WHITE_KING_SIDE: CastleRule = CastleRule {
    kind: MoveKind::KingSideCastle,
    king_from: Square::E1,
    king_to: Square::G1,
    rook_from: Square::H1,
    rook_to: Square::F1,
    between: &[Square::F1, Square::G1],
    transit: &[Square::F1, Square::G1],
};

const WHITE_QUEEN_SIDE: CastleRule = CastleRule {
    kind: MoveKind::QueenSideCastle,
    king_from: Square::E1,
    king_to: Square::C1,
    rook_from: Square::A1,
    rook_to: Square::D1,
    between: &[Square::D1, Square::C1, Square::B1],
    transit: &[Square::D1, Square::C1],
};

const BLACK_KING_SIDE: CastleRule = CastleRule {
    kind: MoveKind::KingSideCastle,
    king_from: Square::E8,
    king_to: Square::G8,
    rook_from: Square::H8,
    rook_to: Square::F8,
    between: &[Square::F8, Square::G8],
    transit: &[Square::F8, Square::G8],
};

const BLACK_QUEEN_SIDE: CastleRule = CastleRule {
    kind: MoveKind::QueenSideCastle,
    king_from: Square::E8,
    king_to: Square::C8,
    rook_from: Square::A8,
    rook_to: Square::D8,
    between: &[Square::D8, Square::C8, Square::B8],
    transit: &[Square::D8, Square::C8],
};

/// One side of a [`Board`]. This is a cheap view: all data lives in the board.
#[derive(Clone, Copy)]
pub struct Player<'a> {
    board: &'a Board,
    alliance: Alliance,
}

impl<'a> Player<'a> {
    pub(crate) const fn new(board: &'a Board, alliance: Alliance) -> Self {
        Self { board, alliance }
    }

    const fn state(&self) -> &'a PlayerState {
        self.board.state(self.alliance)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn alliance(&self) -> Alliance {
        self.alliance
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn board(&self) -> &'a Board {
        self.board
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn king(&self) -> Piece {
        self.state().king
    }

    /// Pieces of this side in tile order.
    #[must_use]
    pub fn active_pieces(&self) -> &'a [Piece] {
        self.board.pieces(self.alliance)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn opponent(&self) -> Self {
        Self::new(self.board, self.alliance.opponent())
    }

    /// Squares attacked by the pieces of this side.
    #[must_use]
    pub const fn attacks(&self) -> Bitboard {
        self.state().attacks
    }

    /// Whether an opponent piece attacks the king.
    #[must_use]
    pub const fn is_in_check(&self) -> bool {
        self.state().in_check
    }

    /// Castle moves available to this side. They are part of
    /// [`Player::legal_moves`] too.
    #[must_use]
    pub fn castle_moves(&self) -> &'a [Move] {
        &self.state().castle_moves
    }

    /// Every legal move of this side, piece by piece in tile order. The king
    /// lists its castle moves (king side first) after the regular ones.
    #[must_use]
    pub fn legal_moves(&self) -> &'a [Move] {
        let board = self.board;
        self.state().legal_moves.get_or_init(|| {
            self.active_pieces()
                .iter()
                .flat_map(|piece| piece.calc_legal_moves(board))
                .collect()
        })
    }

    /// Plays a move obeying the movement rules of its piece and returns the
    /// resulting board unless it leaves the mover's king attacked.
    fn try_execute(&self, candidate: &Move) -> Option<Board> {
        let board = candidate.execute(self.board);
        if board.player(self.alliance).is_in_check() {
            None
        } else {
            Some(board)
        }
    }

    /// Whether playing a pseudo-legal move keeps the own king out of check.
    #[must_use]
    pub fn is_safe(&self, candidate: &Move) -> bool {
        self.try_execute(candidate).is_some()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_move_legal(&self, candidate: &Move) -> bool {
        self.legal_moves().contains(candidate)
    }

    /// Attempts to play `candidate`.
    ///
    /// Moves that are not among [`Player::legal_moves`] are
    /// [`MoveStatus::Illegal`]; moves leaving the king attacked are
    /// [`MoveStatus::LeavesPlayerInCheck`]. In both cases the transition holds
    /// the original board.
    #[must_use]
    pub fn make_move(&self, candidate: &Move) -> MoveTransition<'a> {
        if !self.is_move_legal(candidate) {
            return MoveTransition {
                board: Cow::Borrowed(self.board),
                mv: *candidate,
                status: MoveStatus::Illegal,
            };
        }
        match self.try_execute(candidate) {
            Some(board) => MoveTransition {
                board: Cow::Owned(board),
                mv: *candidate,
                status: MoveStatus::Done,
            },
            None => MoveTransition {
                board: Cow::Borrowed(self.board),
                mv: *candidate,
                status: MoveStatus::LeavesPlayerInCheck,
            },
        }
    }

    /// Whether any legal move (castling included) exists.
    fn has_escape_moves(&self) -> bool {
        !self.legal_moves().is_empty()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_in_checkmate(&self) -> bool {
        self.is_in_check() && !self.has_escape_moves()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_in_stalemate(&self) -> bool {
        !self.is_in_check() && !self.has_escape_moves()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn has_castled(&self) -> bool {
        self.state().king.has_castled
    }

    /// King and the king side rook are on their initial squares and have not
    /// moved. Says nothing about attacked or occupied squares.
    #[must_use]
    pub fn is_king_side_castle_capable(&self) -> bool {
        self.is_castle_capable(self.rules()[0])
    }

    /// King and the queen side rook are on their initial squares and have not
    /// moved. Says nothing about attacked or occupied squares.
    #[must_use]
    pub fn is_queen_side_castle_capable(&self) -> bool {
        self.is_castle_capable(self.rules()[1])
    }

    const fn rules(&self) -> [&'static CastleRule; 2] {
        match self.alliance {
            Alliance::White => [&WHITE_KING_SIDE, &WHITE_QUEEN_SIDE],
            Alliance::Black => [&BLACK_KING_SIDE, &BLACK_QUEEN_SIDE],
        }
    }

    fn castle_rook(&self, rule: &CastleRule) -> Option<Piece> {
        self.board
            .tile(rule.rook_from)
            .piece()
            .filter(|rook| rook.kind.is_rook() && rook.alliance == self.alliance && !rook.has_moved)
    }

    fn is_castle_capable(&self, rule: &CastleRule) -> bool {
        let king = self.king();
        king.square == rule.king_from
            && !king.has_moved
            && !king.has_castled
            && self.castle_rook(rule).is_some()
    }

    /// Castle moves respecting every rule except the final self-check test.
    pub(crate) fn calc_castle_moves(&self) -> ArrayVec<Move, 2> {
        let mut moves = ArrayVec::new();
        if self.is_in_check() {
            return moves;
        }
        let opponent_attacks = self.opponent().attacks();
        for rule in self.rules() {
            if !self.is_castle_capable(rule) {
                continue;
            }
            let Some(rook) = self.castle_rook(rule) else {
                continue;
            };
            if rule
                .between
                .iter()
                .any(|&square| !self.board.tile(square).is_empty())
                || rule
                    .transit
                    .iter()
                    .any(|&square| opponent_attacks.contains(square))
            {
                continue;
            }
            moves.push(Move::castle(
                rule.kind,
                self.king(),
                rule.king_to,
                CastleRook {
                    rook,
                    from: rule.rook_from,
                    to: rule.rook_to,
                },
            ));
        }
        moves
    }
}

/// Outcome of [`Player::make_move`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveStatus {
    /// The move was played.
    Done,
    /// The move is not among the player's legal moves.
    Illegal,
    /// Playing the move would leave the player's own king attacked.
    LeavesPlayerInCheck,
}

impl MoveStatus {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

/// The board after an attempted move: the successor board when the move was
/// played, the original one otherwise.
#[derive(Clone, Debug)]
pub struct MoveTransition<'a> {
    #[allow(missing_docs)]
    pub board: Cow<'a, Board>,
    #[allow(missing_docs)]
    pub mv: Move,
    #[allow(missing_docs)]
    pub status: MoveStatus,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(fen: &str) -> Board {
        Board::from_fen(fen).unwrap()
    }

    fn castle_kinds(player: Player<'_>) -> Vec<MoveKind> {
        player
            .legal_moves()
            .iter()
            .filter(|candidate| candidate.is_castle())
            .map(Move::kind)
            .collect()
    }

    #[test]
    fn starting_position() {
        let board = Board::starting();
        for player in [board.white_player(), board.black_player()] {
            assert_eq!(player.legal_moves().len(), 20);
            assert!(!player.is_in_check());
            assert!(!player.is_in_checkmate());
            assert!(!player.is_in_stalemate());
            assert!(!player.has_castled());
            assert!(player.is_king_side_castle_capable());
            assert!(player.is_queen_side_castle_capable());
            assert!(player.castle_moves().is_empty());
        }
    }

    #[test]
    fn castling_both_sides() {
        let board = parse("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(
            castle_kinds(board.white_player()),
            vec![MoveKind::KingSideCastle, MoveKind::QueenSideCastle]
        );
        assert_eq!(
            castle_kinds(board.black_player()),
            vec![MoveKind::KingSideCastle, MoveKind::QueenSideCastle]
        );
        // Castle moves come right after the regular king moves.
        let king_moves: Vec<String> = board
            .white_player()
            .legal_moves()
            .iter()
            .filter(|candidate| candidate.piece().is_some_and(|piece| piece.kind.is_king()))
            .map(ToString::to_string)
            .collect();
        assert_eq!(king_moves, vec!["e1d2", "e1e2", "e1f2", "e1d1", "e1f1", "e1g1", "e1c1"]);
    }

    #[test]
    fn castling_through_attacked_squares() {
        // Black rook on f8 attacks f1: no king side castling. b1 may be
        // attacked, the king does not pass it.
        let board = parse("1r2kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert_eq!(
            castle_kinds(board.white_player()),
            vec![MoveKind::QueenSideCastle]
        );
        // Landing square attacked.
        let board = parse("4k3/8/8/8/8/8/8/R3K1rR w KQ - 0 1");
        assert!(board.white_player().is_in_check());
        assert!(castle_kinds(board.white_player()).is_empty());
        // A pawn attacks the transit squares even though it could not move
        // there.
        let board = parse("4k3/8/8/8/8/8/6p1/R3K2R w KQ - 0 1");
        assert_eq!(
            castle_kinds(board.white_player()),
            vec![MoveKind::QueenSideCastle]
        );
    }

    #[test]
    fn castling_requires_empty_squares_and_unmoved_pieces() {
        let board = parse("4k3/8/8/8/8/8/8/RN2K1NR w KQ - 0 1");
        assert!(castle_kinds(board.white_player()).is_empty());
        assert!(board.white_player().is_king_side_castle_capable());
        // Without the rights the pieces count as moved.
        let board = parse("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert!(castle_kinds(board.white_player()).is_empty());
        assert!(!board.white_player().is_king_side_castle_capable());
        assert!(!board.white_player().is_queen_side_castle_capable());
        let board = parse("4k3/8/8/8/8/8/8/R3K2R w K - 0 1");
        assert_eq!(
            castle_kinds(board.white_player()),
            vec![MoveKind::KingSideCastle]
        );
    }

    #[test]
    fn no_castling_out_of_check() {
        let board = parse("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1");
        assert!(board.white_player().is_in_check());
        assert!(board.white_player().castle_moves().is_empty());
    }

    #[test]
    fn illegal_moves_keep_the_board() {
        let board = Board::starting();
        let black_reply = Move::create(&board, Square::E7, Square::E5);
        let transition = board.white_player().make_move(&black_reply);
        assert_eq!(transition.status, MoveStatus::Illegal);
        assert!(matches!(transition.board, Cow::Borrowed(_)));
        assert_eq!(*transition.board, board);

        let transition = board.white_player().make_move(&Move::NULL);
        assert_eq!(transition.status, MoveStatus::Illegal);
    }

    #[test]
    fn pinned_piece_leaves_player_in_check() {
        // The knight on e2 is pinned by the rook on e8.
        let board = parse("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        let knight = board.tile(Square::E2).piece().unwrap();
        let mut pseudo_legal = Vec::new();
        knight.calc_pseudo_legal_moves(&board, &mut pseudo_legal);
        assert_eq!(pseudo_legal.len(), 6);
        assert!(knight.calc_legal_moves(&board).is_empty());
        let player = board.white_player();
        for candidate in &pseudo_legal {
            assert!(!player.is_safe(candidate));
            // Not legal in the first place.
            assert_eq!(player.make_move(candidate).status, MoveStatus::Illegal);
        }
    }

    #[test]
    fn legal_move_is_done() {
        let board = Board::starting();
        let player = board.current_player();
        let transition = player.make_move(&player.legal_moves()[0]);
        assert!(transition.status.is_done());
        assert!(matches!(transition.board, Cow::Owned(_)));
        assert_eq!(transition.board.side_to_move(), Alliance::Black);
        assert_eq!(transition.mv, player.legal_moves()[0]);
    }

    #[test]
    fn checkmate_and_stalemate() {
        // Back rank mate.
        let board = parse("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let mate = Move::from_uci(&board, "a1a8").unwrap();
        let after = mate.execute(&board);
        assert!(after.black_player().is_in_checkmate());
        assert!(!after.black_player().is_in_stalemate());
        assert!(!after.white_player().is_in_checkmate());

        let board = parse("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(board.black_player().is_in_stalemate());
        assert!(!board.black_player().is_in_checkmate());
    }

    #[test]
    fn legal_moves_are_memoised() {
        let board = Board::starting();
        let first = board.white_player().legal_moves();
        let second = board.white_player().legal_moves();
        assert_eq!(first.as_ptr(), second.as_ptr());
        assert_eq!(first, board.clone().white_player().legal_moves());
    }
}

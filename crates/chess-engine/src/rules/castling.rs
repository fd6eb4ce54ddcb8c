//! Castling rights bookkeeping and castling move generation.

use crate::movegen::{is_square_attacked, MoveList};
use crate::Board;
use chess_core::{Color, File, Move, PieceKind, Special, Square, Wing};

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates new castling rights from flags.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    const fn flag(color: Color, wing: Wing) -> u8 {
        match (color, wing) {
            (Color::White, Wing::Kingside) => Self::WHITE_KINGSIDE,
            (Color::White, Wing::Queenside) => Self::WHITE_QUEENSIDE,
            (Color::Black, Wing::Kingside) => Self::BLACK_KINGSIDE,
            (Color::Black, Wing::Queenside) => Self::BLACK_QUEENSIDE,
        }
    }

    /// Builds rights from a list of (color, wing) pairs.
    pub fn from_pairs(pairs: &[(Color, Wing)]) -> Self {
        pairs
            .iter()
            .fold(Self::NONE, |acc, &(c, w)| CastlingRights(acc.0 | Self::flag(c, w)))
    }

    /// Lists the rights still held, in "KQkq" order.
    pub fn to_pairs(self) -> Vec<(Color, Wing)> {
        Color::ALL
            .into_iter()
            .flat_map(|c| Wing::ALL.into_iter().map(move |w| (c, w)))
            .filter(|&(c, w)| self.has(c, w))
            .collect()
    }

    /// Returns true if `color` may still castle on `wing`.
    #[inline]
    pub const fn has(self, color: Color, wing: Wing) -> bool {
        (self.0 & Self::flag(color, wing)) != 0
    }

    /// Removes one wing's right for a color.
    #[inline]
    pub fn remove(&mut self, color: Color, wing: Wing) {
        self.0 &= !Self::flag(color, wing);
    }

    /// Removes castling rights for a color.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.remove(color, Wing::Kingside);
        self.remove(color, Wing::Queenside);
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Applies the revocations caused by a move of a `kind` piece of `color`.
    ///
    /// A king move clears both of its color's rights. Any move leaving or
    /// landing on a rook's home corner clears that corner's right, which
    /// covers both the rook moving away and the rook being captured there.
    pub fn update(&mut self, kind: PieceKind, color: Color, from: Square, to: Square) {
        if kind == PieceKind::King {
            self.remove_color(color);
        }
        for owner in Color::ALL {
            for wing in Wing::ALL {
                let corner = CastlingPath::new(owner, wing).rook_from;
                if from == corner || to == corner {
                    self.remove(owner, wing);
                }
            }
        }
    }
}

/// Fixed squares involved in one castling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingPath {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

impl CastlingPath {
    pub fn new(color: Color, wing: Wing) -> Self {
        let rank = color.back_rank();
        let sq = |file| Square::new(file, rank);
        match wing {
            Wing::Kingside => CastlingPath {
                king_from: sq(File::E),
                king_to: sq(File::G),
                rook_from: sq(File::H),
                rook_to: sq(File::F),
            },
            Wing::Queenside => CastlingPath {
                king_from: sq(File::E),
                king_to: sq(File::C),
                rook_from: sq(File::A),
                rook_to: sq(File::D),
            },
        }
    }

    /// Squares strictly between king and rook; all must be empty.
    fn between(&self) -> impl Iterator<Item = Square> {
        let (lo, hi) = if self.king_from < self.rook_from {
            (self.king_from, self.rook_from)
        } else {
            (self.rook_from, self.king_from)
        };
        (lo.index() + 1..hi.index()).filter_map(|i| Square::from_index(i as u8))
    }

    /// Squares the king crosses, destination included; none may be attacked.
    fn transit(&self) -> impl Iterator<Item = Square> {
        let step: i8 = if self.king_to > self.king_from { 1 } else { -1 };
        let from = self.king_from;
        (1..=2).map(move |n| from.offset(step * n))
    }
}

/// Pushes every castling move `color` is currently eligible for.
pub fn generate_castling(board: &Board, rights: CastlingRights, color: Color, moves: &mut MoveList) {
    let Some(king) = board.king(color) else {
        return;
    };
    if king.has_moved {
        return;
    }
    let them = color.opposite();
    let mut in_check: Option<bool> = None;

    for wing in Wing::ALL {
        if !rights.has(color, wing) {
            continue;
        }
        let path = CastlingPath::new(color, wing);
        if king.square != path.king_from {
            continue;
        }
        let rook = match board.piece_at(path.rook_from) {
            Some(p) if p.kind == PieceKind::Rook && p.color == color && !p.has_moved => p,
            _ => continue,
        };
        if !path.between().all(|sq| board.is_empty(sq)) {
            continue;
        }
        let checked =
            *in_check.get_or_insert_with(|| is_square_attacked(board, path.king_from, them));
        if checked {
            return;
        }
        if path.transit().any(|sq| is_square_attacked(board, sq, them)) {
            continue;
        }
        moves.push(Move::new(
            king.id,
            path.king_from,
            path.king_to,
            None,
            Special::Castling {
                wing,
                rook: rook.id,
                rook_from: path.rook_from,
                rook_to: path.rook_to,
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    fn castles(fen: &str) -> Vec<String> {
        let position = Position::from_fen(fen).unwrap();
        let mut moves = MoveList::new();
        generate_castling(
            position.board(),
            position.castling,
            position.side_to_move,
            &mut moves,
        );
        moves.as_slice().iter().map(|m| m.to_uci()).collect()
    }

    #[test]
    fn castling_rights_flags() {
        let mut rights = CastlingRights::ALL;
        assert!(rights.has(Color::White, Wing::Kingside));
        rights.remove(Color::White, Wing::Queenside);
        assert!(!rights.has(Color::White, Wing::Queenside));
        assert!(rights.has(Color::Black, Wing::Queenside));
        rights.remove_color(Color::Black);
        assert_eq!(rights.raw(), CastlingRights::WHITE_KINGSIDE);
        assert_eq!(rights.to_pairs(), vec![(Color::White, Wing::Kingside)]);
    }

    #[test]
    fn pairs_roundtrip() {
        let pairs = vec![(Color::White, Wing::Queenside), (Color::Black, Wing::Kingside)];
        assert_eq!(CastlingRights::from_pairs(&pairs).to_pairs(), pairs);
        assert_eq!(CastlingRights::from_pairs(&[]), CastlingRights::NONE);
    }

    #[test]
    fn king_move_revokes_both() {
        let mut rights = CastlingRights::ALL;
        rights.update(PieceKind::King, Color::White, Square::E1, Square::F1);
        assert!(!rights.has(Color::White, Wing::Kingside));
        assert!(!rights.has(Color::White, Wing::Queenside));
        assert!(rights.has(Color::Black, Wing::Kingside));
    }

    #[test]
    fn rook_move_and_corner_capture_revoke_one_wing() {
        let mut rights = CastlingRights::ALL;
        rights.update(
            PieceKind::Rook,
            Color::White,
            Square::H1,
            Square::from_algebraic("h4").unwrap(),
        );
        assert!(!rights.has(Color::White, Wing::Kingside));
        assert!(rights.has(Color::White, Wing::Queenside));

        rights.update(
            PieceKind::Bishop,
            Color::White,
            Square::from_algebraic("g7").unwrap(),
            Square::A8,
        );
        assert!(!rights.has(Color::Black, Wing::Queenside));
        assert!(rights.has(Color::Black, Wing::Kingside));
    }

    #[test]
    fn both_wings_available() {
        let moves = castles("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        assert_eq!(moves, vec!["e1g1", "e1c1"]);
        let moves = castles("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R b KQkq - 0 1");
        assert_eq!(moves, vec!["e8g8", "e8c8"]);
    }

    #[test]
    fn each_condition_disqualifies() {
        // Right missing
        assert_eq!(
            castles("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w Qkq - 0 1"),
            vec!["e1c1"]
        );
        // Piece in between
        assert_eq!(
            castles("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/RN2K2R w KQkq - 0 1"),
            vec!["e1g1"]
        );
        // Rook missing from its corner
        assert_eq!(
            castles("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K3 w KQkq - 0 1"),
            vec!["e1c1"]
        );
        // Transit square attacked
        assert_eq!(
            castles("r3k2r/pppppppp/8/8/8/5r2/PPPPP1PP/R3K2R w KQkq - 0 1"),
            vec!["e1c1"]
        );
        // Destination attacked
        assert_eq!(
            castles("r3k2r/pppppppp/8/8/8/2r5/PP1PPPPP/R3K2R w KQkq - 0 1"),
            vec!["e1g1"]
        );
        // King in check
        assert!(castles("r3k2r/pppppppp/8/8/8/4r3/PPPP1PPP/R3K2R w KQkq - 0 1").is_empty());
    }

    #[test]
    fn b_file_attack_does_not_block_queenside() {
        // b1 is crossed by the rook only, so an attack there is allowed
        assert_eq!(
            castles("r3k2r/pppppppp/8/8/8/1r6/P1PPPPPP/R3K2R w KQkq - 0 1"),
            vec!["e1g1", "e1c1"]
        );
    }

    #[test]
    fn moved_king_cannot_castle() {
        let mut position =
            Position::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let king = position.board().king(Color::White).unwrap().id;
        position.board_mut().set_moved(king, true);
        let mut moves = MoveList::new();
        generate_castling(position.board(), position.castling, Color::White, &mut moves);
        assert!(moves.is_empty());
    }
}

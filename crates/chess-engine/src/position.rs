//! Chess position representation and reversible move application.

use crate::rules::{en_passant_target, CastlingRights};
use crate::Board;
use chess_core::{Color, Fen, FenError, Move, PieceKind, Special, Square};

/// State needed to take back one move.
///
/// Everything a [`Move`] cannot describe by itself: the scalar fields of
/// the position before the move and the moved flags that were overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo {
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    had_moved: bool,
    rook_had_moved: bool,
}

/// Complete chess position state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,

    /// The side to move.
    pub side_to_move: Color,

    /// Castling rights.
    pub castling: CastlingRights,

    /// En passant target square (if any).
    pub en_passant: Option<Square>,

    /// Halfmoves since the last capture or pawn move.
    pub halfmove_clock: u32,

    /// Fullmove number (starts at 1, increments after Black's move).
    pub fullmove_number: u32,
}

impl Position {
    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Position {
            board: Board::standard(),
            side_to_move: Color::White,
            castling: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Parses a position from FEN.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = Fen::parse(fen)?;
        let mut board = Board::empty();
        for &(square, kind, color) in &parsed.placement {
            board.add_piece(kind, color, square);
        }
        Ok(Position {
            board,
            side_to_move: parsed.side_to_move,
            castling: CastlingRights::from_pairs(&parsed.castling),
            en_passant: parsed.en_passant,
            halfmove_clock: parsed.halfmove_clock,
            fullmove_number: parsed.fullmove_number,
        })
    }

    /// Converts the position to FEN.
    pub fn to_fen(&self) -> String {
        let fen = Fen {
            placement: self
                .board
                .live_pieces()
                .map(|p| (p.square, p.kind, p.color))
                .collect(),
            side_to_move: self.side_to_move,
            castling: self.castling.to_pairs(),
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        };
        fen.to_string()
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Returns the kind and color of the piece on `sq`, decoded from the grid.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(PieceKind, Color)> {
        PieceKind::from_signed_value(self.board.cell(sq))
    }

    /// Applies a move in place and returns what is needed to take it back.
    ///
    /// The move must have been generated for this position. The moving
    /// side is taken from the moving piece, so moves of either color can
    /// be simulated.
    pub fn make_move(&mut self, mv: Move) -> Undo {
        let mover = *self.board.piece(mv.piece());
        let mut undo = Undo {
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            had_moved: mover.has_moved,
            rook_had_moved: false,
        };

        self.en_passant = en_passant_target(mv, mover.color);

        if let Some(victim) = mv.captured() {
            self.board.capture(victim);
        }
        self.board.relocate(mover.id, mv.to());
        self.board.set_moved(mover.id, true);

        match mv.special() {
            Special::Castling { rook, rook_to, .. } => {
                undo.rook_had_moved = self.board.piece(rook).has_moved;
                self.board.relocate(rook, rook_to);
                self.board.set_moved(rook, true);
            }
            Special::Promotion(kind) => self.board.set_kind(mover.id, kind),
            Special::DoublePawnPush | Special::EnPassant { .. } | Special::None => {}
        }

        self.castling
            .update(mover.kind, mover.color, mv.from(), mv.to());

        if mover.kind == PieceKind::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if mover.color == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = mover.color.opposite();

        undo
    }

    /// Reverses `mv`, which must be the last move applied with `undo`.
    pub fn unmake_move(&mut self, mv: Move, undo: Undo) {
        match mv.special() {
            Special::Promotion(_) => self.board.set_kind(mv.piece(), PieceKind::Pawn),
            Special::Castling {
                rook, rook_from, ..
            } => {
                self.board.relocate(rook, rook_from);
                self.board.set_moved(rook, undo.rook_had_moved);
            }
            _ => {}
        }

        self.board.relocate(mv.piece(), mv.from());
        self.board.set_moved(mv.piece(), undo.had_moved);

        if let Some(victim) = mv.captured() {
            self.board.uncapture(victim);
        }

        self.side_to_move = undo.side_to_move;
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::legal_moves;
    use chess_core::CoordinateMove;
    use chess_core::Wing;

    fn find(position: &mut Position, uci: &str) -> Move {
        let wanted = CoordinateMove::parse(uci).unwrap();
        let color = position.side_to_move;
        legal_moves(position, color)
            .as_slice()
            .iter()
            .copied()
            .find(|m| wanted.matches(*m))
            .unwrap()
    }

    #[test]
    fn startpos_fen_roundtrip() {
        let position = Position::startpos();
        assert_eq!(position.to_fen(), Fen::STARTPOS);
        assert_eq!(Position::from_fen(Fen::STARTPOS).unwrap().to_fen(), Fen::STARTPOS);
    }

    #[test]
    fn custom_fen_roundtrip() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
    }

    #[test]
    fn piece_at() {
        let position = Position::startpos();
        assert_eq!(
            position.piece_at(Square::E1),
            Some((PieceKind::King, Color::White))
        );
        assert_eq!(
            position.piece_at(Square::D8),
            Some((PieceKind::Queen, Color::Black))
        );
        assert_eq!(position.piece_at(Square::E4), None);
        assert_eq!(position.piece_at(Square::BORDER), None);
        assert_eq!(position.piece_at(Square::A1.offset(-1)), None);
    }

    #[test]
    fn double_push_sets_en_passant() {
        let mut position = Position::startpos();
        let mv = find(&mut position, "e2e4");
        assert_eq!(mv.special(), Special::DoublePawnPush);
        position.make_move(mv);
        assert_eq!(position.side_to_move, Color::Black);
        assert_eq!(position.en_passant, Square::from_algebraic("e3"));
        assert_eq!(
            position.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );

        let reply = find(&mut position, "g8f6");
        position.make_move(reply);
        assert_eq!(position.en_passant, None);
        assert_eq!(position.fullmove_number, 2);
        assert_eq!(position.halfmove_clock, 1);
    }

    #[test]
    fn make_unmake_restores_everything() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let mut position = Position::from_fen(fen).unwrap();
        let original = position.clone();
        let moves = legal_moves(&mut position, Color::White);
        assert_eq!(position, original);
        for &mv in moves.as_slice() {
            let undo = position.make_move(mv);
            assert!(position.board().is_synchronized(), "after {}", mv);
            position.unmake_move(mv, undo);
            assert_eq!(position, original, "undo of {}", mv);
        }
    }

    #[test]
    fn castling_moves_rook_and_revokes_rights() {
        let mut position =
            Position::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let before = position.clone();
        let mv = find(&mut position, "e1g1");
        let undo = position.make_move(mv);
        assert_eq!(
            position.piece_at(Square::G1),
            Some((PieceKind::King, Color::White))
        );
        assert_eq!(
            position.piece_at(Square::F1),
            Some((PieceKind::Rook, Color::White))
        );
        assert_eq!(position.piece_at(Square::H1), None);
        assert!(!position.castling.has(Color::White, Wing::Kingside));
        assert!(!position.castling.has(Color::White, Wing::Queenside));
        assert!(position.castling.has(Color::Black, Wing::Kingside));

        position.unmake_move(mv, undo);
        assert_eq!(position, before);
    }

    #[test]
    fn en_passant_removes_pawn() {
        let mut position =
            Position::from_fen("rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 1")
                .unwrap();
        let mv = find(&mut position, "f5e6");
        assert!(matches!(mv.special(), Special::EnPassant { .. }));
        position.make_move(mv);
        assert_eq!(position.piece_at(Square::from_algebraic("e5").unwrap()), None);
        assert_eq!(
            position.piece_at(Square::from_algebraic("e6").unwrap()),
            Some((PieceKind::Pawn, Color::White))
        );
        assert!(position.board().is_synchronized());
    }

    #[test]
    fn promotion_changes_kind() {
        let mut position = Position::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        let before = position.clone();
        let mv = find(&mut position, "a7a8n");
        let undo = position.make_move(mv);
        assert_eq!(
            position.piece_at(Square::A8),
            Some((PieceKind::Knight, Color::White))
        );
        assert_eq!(position.board().cell(Square::A8), 2);
        position.unmake_move(mv, undo);
        assert_eq!(position, before);
    }
}

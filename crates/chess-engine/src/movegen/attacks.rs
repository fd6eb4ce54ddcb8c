//! Attack detection on the mailbox grid.
//!
//! Offsets are grid deltas: one rank is 10 cells, one file is 1 cell. A
//! step that lands on [`OFF_BOARD`] has left the board.

use crate::board::{Board, Piece};
use chess_core::{Color, PieceKind, Square, EMPTY, OFF_BOARD};

pub(crate) const KNIGHT_OFFSETS: [i8; 8] = [21, 19, 12, 8, -8, -12, -19, -21];
pub(crate) const KING_OFFSETS: [i8; 8] = [10, -10, 1, -1, 11, 9, -9, -11];
pub(crate) const ROOK_DIRECTIONS: [i8; 4] = [10, -10, 1, -1];
pub(crate) const BISHOP_DIRECTIONS: [i8; 4] = [11, 9, -9, -11];

/// Stepping offsets for a piece kind. Pawns are handled separately.
pub(crate) fn offsets(kind: PieceKind) -> &'static [i8] {
    match kind {
        PieceKind::Knight => &KNIGHT_OFFSETS,
        PieceKind::Bishop => &BISHOP_DIRECTIONS,
        PieceKind::Rook => &ROOK_DIRECTIONS,
        PieceKind::Queen | PieceKind::King => &KING_OFFSETS,
        PieceKind::Pawn => &[],
    }
}

/// The two diagonal capture offsets of a pawn of `color`.
#[inline]
pub(crate) fn pawn_capture_offsets(color: Color) -> [i8; 2] {
    let push = color.pawn_push();
    [push - 1, push + 1]
}

/// Returns true if any live piece of `by` attacks `square`.
///
/// Works backwards from the target: a knight of `by` attacks it iff one
/// stands a knight's jump away, a rook or queen iff one is the first piece
/// met along a file or rank, and so on.
pub fn is_square_attacked(board: &Board, square: Square, by: Color) -> bool {
    if !square.is_on_board() {
        return false;
    }

    // Pawns of `by` capture toward the target, so look the opposite way.
    let pawn = PieceKind::Pawn.signed_value(by);
    if pawn_capture_offsets(by)
        .iter()
        .any(|&d| board.cell(square.offset(-d)) == pawn)
    {
        return true;
    }

    let knight = PieceKind::Knight.signed_value(by);
    if KNIGHT_OFFSETS
        .iter()
        .any(|&d| board.cell(square.offset(d)) == knight)
    {
        return true;
    }

    let king = PieceKind::King.signed_value(by);
    if KING_OFFSETS
        .iter()
        .any(|&d| board.cell(square.offset(d)) == king)
    {
        return true;
    }

    let queen = PieceKind::Queen.signed_value(by);
    let rook = PieceKind::Rook.signed_value(by);
    let bishop = PieceKind::Bishop.signed_value(by);
    ray_hits(board, square, &ROOK_DIRECTIONS, |c| c == rook || c == queen)
        || ray_hits(board, square, &BISHOP_DIRECTIONS, |c| c == bishop || c == queen)
}

/// Returns true if the first occupied cell along any direction satisfies `hit`.
fn ray_hits(board: &Board, from: Square, directions: &[i8], hit: impl Fn(i8) -> bool) -> bool {
    for &d in directions {
        let mut sq = from.offset(d);
        loop {
            let cell = board.cell(sq);
            if cell == EMPTY {
                sq = sq.offset(d);
                continue;
            }
            if cell != OFF_BOARD && hit(cell) {
                return true;
            }
            break;
        }
    }
    false
}

/// Returns true if the king of `color` is attacked.
///
/// A side without a king is never in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .king(color)
        .is_some_and(|king| is_square_attacked(board, king.square, color.opposite()))
}

/// Calls `f` with every square `piece` attacks.
///
/// Sliding attacks include the first occupied square of each ray; pawn
/// attacks are the two forward diagonals whatever stands there.
pub fn for_each_attack(board: &Board, piece: &Piece, mut f: impl FnMut(Square)) {
    if piece.captured || !piece.square.is_on_board() {
        return;
    }
    match piece.kind {
        PieceKind::Pawn => {
            for d in pawn_capture_offsets(piece.color) {
                let target = piece.square.offset(d);
                if target.is_on_board() {
                    f(target);
                }
            }
        }
        kind if kind.is_slider() => {
            for &d in offsets(kind) {
                let mut target = piece.square.offset(d);
                while board.cell(target) != OFF_BOARD {
                    f(target);
                    if board.cell(target) != EMPTY {
                        break;
                    }
                    target = target.offset(d);
                }
            }
        }
        kind => {
            for &d in offsets(kind) {
                let target = piece.square.offset(d);
                if target.is_on_board() {
                    f(target);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn attacks_of(fen: &str, from: &str) -> Vec<String> {
        let position = Position::from_fen(fen).unwrap();
        let piece = position.board().piece_at(sq(from)).unwrap();
        let mut out = Vec::new();
        for_each_attack(position.board(), piece, |t| out.push(t.to_algebraic()));
        out.sort();
        out
    }

    #[test]
    fn startpos_attacks() {
        let position = Position::startpos();
        let board = position.board();
        assert!(is_square_attacked(board, sq("e3"), Color::White));
        assert!(is_square_attacked(board, sq("f3"), Color::White));
        assert!(!is_square_attacked(board, sq("e4"), Color::White));
        assert!(is_square_attacked(board, sq("f6"), Color::Black));
        assert!(!is_in_check(board, Color::White));
        assert!(!is_in_check(board, Color::Black));
    }

    #[test]
    fn pawn_attacks_are_diagonal_only() {
        let fen = "4k3/8/8/8/4P3/8/8/4K3 w - - 0 1";
        let position = Position::from_fen(fen).unwrap();
        let board = position.board();
        assert!(is_square_attacked(board, sq("d5"), Color::White));
        assert!(is_square_attacked(board, sq("f5"), Color::White));
        assert!(!is_square_attacked(board, sq("e5"), Color::White));
        assert_eq!(attacks_of(fen, "e4"), vec!["d5", "f5"]);
    }

    #[test]
    fn edge_pawn_has_one_attack() {
        assert_eq!(attacks_of("4k3/8/8/8/8/8/P7/4K3 w - - 0 1", "a2"), vec!["b3"]);
        assert_eq!(attacks_of("4k3/7p/8/8/8/8/8/4K3 w - - 0 1", "h7"), vec!["g6"]);
    }

    #[test]
    fn knight_in_corner() {
        assert_eq!(
            attacks_of("4k3/8/8/8/8/8/8/N3K3 w - - 0 1", "a1"),
            vec!["b3", "c2"]
        );
    }

    #[test]
    fn sliders_stop_at_first_piece() {
        let fen = "4k3/8/8/8/1p1R2P1/8/8/4K3 w - - 0 1";
        let attacks = attacks_of(fen, "d4");
        // Blocked left by the pawn on b4 (included), right by own pawn on g4 (included)
        assert!(attacks.contains(&"b4".to_string()));
        assert!(!attacks.contains(&"a4".to_string()));
        assert!(attacks.contains(&"g4".to_string()));
        assert!(!attacks.contains(&"h4".to_string()));
        assert!(attacks.contains(&"d8".to_string()));
        assert!(attacks.contains(&"d1".to_string()));
        assert_eq!(attacks.len(), 2 + 3 + 4 + 3);

        let position = Position::from_fen(fen).unwrap();
        assert!(!is_square_attacked(position.board(), sq("a4"), Color::White));
        assert!(is_square_attacked(position.board(), sq("b4"), Color::White));
    }

    #[test]
    fn check_detection() {
        let position = Position::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1").unwrap();
        assert!(is_in_check(position.board(), Color::White));
        assert!(!is_in_check(position.board(), Color::Black));

        let blocked = Position::from_fen("4k3/8/8/8/8/4N3/4r3/4K3 w - - 0 1").unwrap();
        assert!(is_in_check(blocked.board(), Color::White));

        let screened = Position::from_fen("4k3/4r3/8/8/8/4N3/8/4K3 w - - 0 1").unwrap();
        assert!(!is_in_check(screened.board(), Color::White));
    }

    #[test]
    fn diagonal_and_knight_checks() {
        let bishop = Position::from_fen("4k3/8/8/b7/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(is_in_check(bishop.board(), Color::White));
        let knight = Position::from_fen("4k3/8/8/8/8/3n4/8/4K3 w - - 0 1").unwrap();
        assert!(is_in_check(knight.board(), Color::White));
        let pawn = Position::from_fen("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1").unwrap();
        assert!(is_in_check(pawn.board(), Color::White));
        let pawn_ahead = Position::from_fen("4k3/8/8/8/8/8/4p3/4K3 w - - 0 1").unwrap();
        assert!(!is_in_check(pawn_ahead.board(), Color::White));
    }
}
